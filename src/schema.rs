//! Entity schemas and the deserializer.
//!
//! A [`Schema`] is the ordered list of [`Field`]s declared once per entity.
//! [`Schema::new`] is a `const fn` that validates the schema, so placing it in
//! a `static` turns a malformed schema into a compile error:
//!
//! - exactly one field is the primary key,
//! - the primary key is required,
//! - field names are unique.
//!
//! Entities implement [`Model`]. [`Model::deserialize`] first walks the
//! schema in declaration order, checking every present value against its
//! field kind ([`Schema::validate`]), and returns the first failure. Only a
//! payload that passed is handed to [`Model::from_object`], wrapped in an
//! [`Object`] that reads each attribute through its descriptor. No partial
//! entity is ever produced.
//!
//! ```
//! use iconfinder::field::Field;
//! use iconfinder::schema::{Model, Object, Schema};
//! use iconfinder::SchemaError;
//! use serde_json::json;
//!
//! const TAG_FIELDS: &[Field] = &[
//!     Field::string("slug").primary_key(),
//!     Field::integer("uses").optional(),
//! ];
//! static TAG: Schema = Schema::new("Tag", TAG_FIELDS);
//!
//! struct Tag {
//!     slug: String,
//!     uses: Option<i64>,
//! }
//!
//! impl Model for Tag {
//!     fn schema() -> &'static Schema {
//!         &TAG
//!     }
//!
//!     fn from_object(object: Object<'_>) -> Result<Self, SchemaError> {
//!         Ok(Self {
//!             slug: object.required("slug")?,
//!             uses: object.optional("uses")?,
//!         })
//!     }
//! }
//!
//! let tag = Tag::deserialize(&json!({"slug": "arrow"})).unwrap();
//! assert_eq!(tag.slug, "arrow");
//! assert_eq!(tag.uses, None);
//! ```

use crate::error::{json_type, SchemaError};
use crate::field::{Field, FieldType};
use serde_json::{Map, Value};

/// The declared fields of one entity.
#[derive(Debug)]
pub struct Schema {
    name: &'static str,
    fields: &'static [Field],
    primary_key: usize,
}

impl Schema {
    /// Creates a schema, validating it.
    ///
    /// # Panics
    ///
    /// Panics (at compile time when used in a `static` or `const`) if the
    /// fields do not declare exactly one primary key, if the primary key is
    /// optional, or if two fields share a name.
    pub const fn new(name: &'static str, fields: &'static [Field]) -> Self {
        let mut primary_key = None;
        let mut i = 0;
        while i < fields.len() {
            let field = &fields[i];
            if field.primary_key {
                if primary_key.is_some() {
                    panic!("schema declares more than one primary key");
                }
                if !field.required {
                    panic!("primary key field must be required");
                }
                primary_key = Some(i);
            }

            let mut j = 0;
            while j < i {
                if str_eq(fields[j].name, field.name) {
                    panic!("schema declares a field name twice");
                }
                j += 1;
            }
            i += 1;
        }

        match primary_key {
            Some(primary_key) => Self {
                name,
                fields,
                primary_key,
            },
            None => panic!("schema declares no primary key"),
        }
    }

    /// The entity name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The fields in declaration order.
    pub fn fields(&self) -> &'static [Field] {
        self.fields
    }

    /// The primary key field.
    pub fn primary_key(&self) -> &'static Field {
        &self.fields[self.primary_key]
    }

    /// Looks up a declared field by name.
    pub fn field(&self, name: &str) -> Option<&'static Field> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Checks `object` against every field in declaration order.
    ///
    /// Returns the first missing required field or the first value that does
    /// not match its field kind.
    pub fn validate(&self, object: &Map<String, Value>) -> Result<(), SchemaError> {
        self.fields.iter().try_for_each(|field| match field.lookup(object)? {
            Some(value) => field.check(value),
            None => Ok(()),
        })
    }
}

const fn str_eq(a: &str, b: &str) -> bool {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    let mut i = 0;
    while i < a.len() {
        if a[i] != b[i] {
            return false;
        }
        i += 1;
    }
    true
}

/// A JSON object paired with the schema it is read with.
#[derive(Debug, Clone, Copy)]
pub struct Object<'a> {
    schema: &'static Schema,
    map: &'a Map<String, Value>,
}

impl<'a> Object<'a> {
    /// Pairs `map` with `schema`.
    pub fn new(schema: &'static Schema, map: &'a Map<String, Value>) -> Self {
        Self { schema, map }
    }

    /// The schema the object is read with.
    pub fn schema(&self) -> &'static Schema {
        self.schema
    }

    /// Reads a field that must be present.
    pub fn required<T: FieldType>(&self, name: &'static str) -> Result<T, SchemaError> {
        self.optional(name)?
            .ok_or(SchemaError::MissingField { field: name })
    }

    /// Reads a field whose absence yields `None`.
    ///
    /// Whether absence is an error is decided by the descriptor: reading a
    /// required field through this method still fails when it is missing.
    pub fn optional<T: FieldType>(&self, name: &'static str) -> Result<Option<T>, SchemaError> {
        self.descriptor(name)?.decode(self.map)
    }

    fn descriptor(&self, name: &'static str) -> Result<&'static Field, SchemaError> {
        self.schema
            .field(name)
            .ok_or(SchemaError::UndeclaredField {
                entity: self.schema.name,
                field: name,
            })
    }
}

/// A type deserialized from a JSON object through a [`Schema`].
pub trait Model: Sized {
    /// The schema of this type.
    fn schema() -> &'static Schema;

    /// Builds a value from an object. Attributes may be read in any order.
    fn from_object(object: Object<'_>) -> Result<Self, SchemaError>;

    /// Deserializes a payload, validating it against the schema first.
    fn deserialize(payload: &Value) -> Result<Self, SchemaError> {
        let schema = Self::schema();
        let map = payload.as_object().ok_or(SchemaError::NotAnObject {
            entity: schema.name,
            actual: json_type(payload),
        })?;
        schema.validate(map)?;
        Self::from_object(Object::new(schema, map))
    }
}
