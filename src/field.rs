//! Field descriptors.
//!
//! A [`Field`] describes one attribute of an entity: the key it is read from,
//! whether it is required, whether it is the primary key, and its
//! [`FieldKind`]. Descriptors are plain `Copy` values built by `const fn`s, so
//! they live in `static` schemas and are shared freely.
//!
//! The descriptor's kind is authoritative. [`Field::check`] validates a JSON
//! value against the kind alone, and [`Field::decode`] refuses to convert into
//! a native type the kind does not map to. Conversion itself is done by the
//! [`FieldType`] trait and never coerces: a string `"5"` is not an integer, an
//! integer `5` is not a float.

use crate::datetime::{self, DateTimeError};
use crate::error::SchemaError;
use crate::schema::{Model, Object, Schema};
use chrono::NaiveDateTime;
use serde_json::{Map, Value};
use std::fmt;

/// Returns the schema of a nested entity.
///
/// A function pointer rather than a reference, so schemas may refer to each
/// other in any order.
pub type SchemaFn = fn() -> &'static Schema;

/// The kind of a field, with kind-specific parameters.
#[derive(Debug, Clone, Copy)]
pub enum FieldKind {
    /// A JSON string.
    String,
    /// A JSON integer.
    Integer,
    /// A JSON floating point number.
    Float,
    /// A JSON boolean.
    Boolean,
    /// A JSON string drawn from a closed set of wire tokens.
    Enum(&'static [&'static str]),
    /// An ISO-8601 UTC date/time string.
    DateTime,
    /// A JSON object deserialized with the given schema.
    Nested(SchemaFn),
    /// A JSON array of objects, each deserialized with the given schema.
    NestedList(SchemaFn),
    /// A JSON object whose schema is picked by marker keys.
    Polymorphic(&'static [Variant]),
}

impl FieldKind {
    /// Short name of the kind.
    pub const fn label(&self) -> &'static str {
        match self {
            FieldKind::String => "string",
            FieldKind::Integer => "integer",
            FieldKind::Float => "float",
            FieldKind::Boolean => "boolean",
            FieldKind::Enum(_) => "enum",
            FieldKind::DateTime => "datetime",
            FieldKind::Nested(_) => "nested-entity",
            FieldKind::NestedList(_) => "nested-entity-list",
            FieldKind::Polymorphic(_) => "polymorphic",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One alternative of a polymorphic field: if `marker` is a key of the
/// payload object, the object is deserialized with `schema`.
#[derive(Debug, Clone, Copy)]
pub struct Variant {
    marker: &'static str,
    schema: SchemaFn,
}

impl Variant {
    /// Creates a variant selected by the presence of `marker`.
    pub const fn new(marker: &'static str, schema: SchemaFn) -> Self {
        Self { marker, schema }
    }

    /// The key whose presence selects this variant.
    pub fn marker(&self) -> &'static str {
        self.marker
    }

    /// The schema applied when this variant is selected.
    pub fn schema(&self) -> &'static Schema {
        (self.schema)()
    }
}

/// Describes one attribute of an entity.
///
/// # Examples
///
/// ```
/// use iconfinder::field::{Field, FieldKind};
///
/// const ID: Field = Field::integer("license_id").primary_key();
/// const URL: Field = Field::string("url").optional();
///
/// assert!(ID.is_required() && ID.is_primary_key());
/// assert!(!URL.is_required());
/// assert!(matches!(URL.kind(), FieldKind::String));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Field {
    pub(crate) name: &'static str,
    pub(crate) kind: FieldKind,
    pub(crate) required: bool,
    pub(crate) primary_key: bool,
}

impl Field {
    const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            required: true,
            primary_key: false,
        }
    }

    /// A required string field.
    pub const fn string(name: &'static str) -> Self {
        Self::new(name, FieldKind::String)
    }

    /// A required integer field.
    pub const fn integer(name: &'static str) -> Self {
        Self::new(name, FieldKind::Integer)
    }

    /// A required floating point field.
    pub const fn float(name: &'static str) -> Self {
        Self::new(name, FieldKind::Float)
    }

    /// A required boolean field.
    pub const fn boolean(name: &'static str) -> Self {
        Self::new(name, FieldKind::Boolean)
    }

    /// A required enum field accepting the given wire tokens.
    pub const fn enumeration(name: &'static str, tokens: &'static [&'static str]) -> Self {
        Self::new(name, FieldKind::Enum(tokens))
    }

    /// A required UTC date/time field.
    pub const fn datetime(name: &'static str) -> Self {
        Self::new(name, FieldKind::DateTime)
    }

    /// A required nested entity field.
    pub const fn nested(name: &'static str, schema: SchemaFn) -> Self {
        Self::new(name, FieldKind::Nested(schema))
    }

    /// A required list of nested entities.
    pub const fn nested_list(name: &'static str, schema: SchemaFn) -> Self {
        Self::new(name, FieldKind::NestedList(schema))
    }

    /// A required polymorphic field. Variants are tried in order.
    pub const fn polymorphic(name: &'static str, variants: &'static [Variant]) -> Self {
        Self::new(name, FieldKind::Polymorphic(variants))
    }

    /// Marks the field optional: a missing or `null` value yields `None`.
    pub const fn optional(self) -> Self {
        Self {
            required: false,
            ..self
        }
    }

    /// Marks the field as the primary key of its schema.
    pub const fn primary_key(self) -> Self {
        Self {
            primary_key: true,
            ..self
        }
    }

    /// The payload key.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The field kind.
    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    /// Whether a missing value is an error.
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Whether this is the primary key of its schema.
    pub fn is_primary_key(&self) -> bool {
        self.primary_key
    }

    /// Looks the field up in `object`.
    ///
    /// Absent keys and explicit `null` are both missing. Missing required
    /// fields are an error; missing optional fields yield `None`.
    pub fn lookup<'a>(
        &self,
        object: &'a Map<String, Value>,
    ) -> Result<Option<&'a Value>, SchemaError> {
        match object.get(self.name) {
            None | Some(Value::Null) if self.required => {
                Err(SchemaError::MissingField { field: self.name })
            }
            None | Some(Value::Null) => Ok(None),
            Some(value) => Ok(Some(value)),
        }
    }

    /// Looks the field up in `object`, checks it against the kind and
    /// converts it to `T`.
    ///
    /// Fails with [`SchemaError::IncompatibleType`] if `T` is not a native
    /// type of this field's kind, whether or not the value is present.
    pub fn decode<T: FieldType>(
        &self,
        object: &Map<String, Value>,
    ) -> Result<Option<T>, SchemaError> {
        if !T::accepts(&self.kind) {
            return Err(SchemaError::IncompatibleType {
                field: self.name,
                kind: self.kind.label(),
            });
        }

        match self.lookup(object)? {
            Some(value) => {
                self.check(value)?;
                T::from_json(self, value).map(Some)
            }
            None => Ok(None),
        }
    }

    /// Validates a present (non-null) value against the field kind.
    ///
    /// Nested, list and polymorphic values are validated recursively against
    /// their schemas.
    pub fn check(&self, value: &Value) -> Result<(), SchemaError> {
        match self.kind {
            FieldKind::String if value.is_string() => Ok(()),
            FieldKind::String => Err(self.mismatch("string", value)),
            FieldKind::Integer if value.is_i64() || value.is_u64() => Ok(()),
            FieldKind::Integer => Err(self.mismatch("integer", value)),
            FieldKind::Float if value.is_f64() => Ok(()),
            FieldKind::Float => Err(self.mismatch("float", value)),
            FieldKind::Boolean if value.is_boolean() => Ok(()),
            FieldKind::Boolean => Err(self.mismatch("boolean", value)),
            FieldKind::Enum(tokens) => {
                let token = value
                    .as_str()
                    .ok_or_else(|| self.mismatch("enum string", value))?;
                if tokens.contains(&token) {
                    Ok(())
                } else {
                    Err(SchemaError::InvalidEnumValue {
                        field: self.name,
                        value: token.to_string(),
                    })
                }
            }
            FieldKind::DateTime => parse_datetime(self, value).map(drop),
            FieldKind::Nested(schema) => {
                let object = value
                    .as_object()
                    .ok_or_else(|| self.mismatch("object", value))?;
                schema().validate(object)
            }
            FieldKind::NestedList(schema) => {
                let elements = value
                    .as_array()
                    .ok_or_else(|| self.mismatch("array", value))?;
                elements.iter().try_for_each(|element| {
                    let object = element
                        .as_object()
                        .ok_or_else(|| self.mismatch("array of objects", element))?;
                    schema().validate(object)
                })
            }
            FieldKind::Polymorphic(_) => {
                let (variant, object) = self.resolve_variant(value)?;
                variant.schema().validate(object)
            }
        }
    }

    /// Picks the variant of a polymorphic field matching `value`.
    ///
    /// The first variant whose marker key is present wins.
    pub fn resolve_variant<'a>(
        &self,
        value: &'a Value,
    ) -> Result<(&'static Variant, &'a Map<String, Value>), SchemaError> {
        let object = value
            .as_object()
            .ok_or_else(|| SchemaError::type_mismatch(self.name, "object", value))?;
        let variants: &'static [Variant] = match self.kind {
            FieldKind::Polymorphic(variants) => variants,
            _ => &[],
        };

        variants
            .iter()
            .find(|variant| object.contains_key(variant.marker))
            .map(|variant| (variant, object))
            .ok_or_else(|| SchemaError::UnresolvedPolymorphicType {
                field: self.name,
                value: value.clone(),
            })
    }

    fn mismatch(&self, expected: &'static str, value: &Value) -> SchemaError {
        SchemaError::type_mismatch(self.name, expected, value)
    }
}

/// A native type a field value converts into.
pub trait FieldType: Sized {
    /// Whether values of `kind` convert into this type.
    fn accepts(kind: &FieldKind) -> bool;

    /// Converts a present (non-null) JSON value read for `field`.
    fn from_json(field: &Field, value: &Value) -> Result<Self, SchemaError>;
}

fn is_schema(schema: SchemaFn, expected: &'static Schema) -> bool {
    std::ptr::eq(schema(), expected)
}

impl FieldType for String {
    fn accepts(kind: &FieldKind) -> bool {
        matches!(kind, FieldKind::String)
    }

    fn from_json(field: &Field, value: &Value) -> Result<Self, SchemaError> {
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| field.mismatch("string", value))
    }
}

impl FieldType for i64 {
    fn accepts(kind: &FieldKind) -> bool {
        matches!(kind, FieldKind::Integer)
    }

    fn from_json(field: &Field, value: &Value) -> Result<Self, SchemaError> {
        value.as_i64().ok_or_else(|| field.mismatch("integer", value))
    }
}

impl FieldType for u64 {
    fn accepts(kind: &FieldKind) -> bool {
        matches!(kind, FieldKind::Integer)
    }

    fn from_json(field: &Field, value: &Value) -> Result<Self, SchemaError> {
        value
            .as_u64()
            .ok_or_else(|| field.mismatch("non-negative integer", value))
    }
}

impl FieldType for f64 {
    fn accepts(kind: &FieldKind) -> bool {
        matches!(kind, FieldKind::Float)
    }

    fn from_json(field: &Field, value: &Value) -> Result<Self, SchemaError> {
        match value {
            Value::Number(n) if n.is_f64() => n.as_f64(),
            _ => None,
        }
        .ok_or_else(|| field.mismatch("float", value))
    }
}

impl FieldType for bool {
    fn accepts(kind: &FieldKind) -> bool {
        matches!(kind, FieldKind::Boolean)
    }

    fn from_json(field: &Field, value: &Value) -> Result<Self, SchemaError> {
        value.as_bool().ok_or_else(|| field.mismatch("boolean", value))
    }
}

fn parse_datetime(field: &Field, value: &Value) -> Result<NaiveDateTime, SchemaError> {
    let text = value
        .as_str()
        .ok_or_else(|| field.mismatch("datetime string", value))?;

    datetime::parse_iso8601_utc(text).map_err(|err| match err {
        DateTimeError::NonUtc(_) => SchemaError::NonUtcDateTime {
            field: field.name,
            value: text.to_string(),
        },
        _ => SchemaError::InvalidDateTime {
            field: field.name,
            value: text.to_string(),
        },
    })
}

impl FieldType for NaiveDateTime {
    fn accepts(kind: &FieldKind) -> bool {
        matches!(kind, FieldKind::DateTime)
    }

    fn from_json(field: &Field, value: &Value) -> Result<Self, SchemaError> {
        parse_datetime(field, value)
    }
}

impl<M: Model> FieldType for M {
    fn accepts(kind: &FieldKind) -> bool {
        matches!(kind, FieldKind::Nested(schema) if is_schema(*schema, M::schema()))
    }

    fn from_json(field: &Field, value: &Value) -> Result<Self, SchemaError> {
        let object = value
            .as_object()
            .ok_or_else(|| field.mismatch("object", value))?;
        M::from_object(Object::new(M::schema(), object))
    }
}

impl<M: Model> FieldType for Vec<M> {
    fn accepts(kind: &FieldKind) -> bool {
        matches!(kind, FieldKind::NestedList(schema) if is_schema(*schema, M::schema()))
    }

    fn from_json(field: &Field, value: &Value) -> Result<Self, SchemaError> {
        let elements = value
            .as_array()
            .ok_or_else(|| field.mismatch("array", value))?;

        elements
            .iter()
            .map(|element| {
                let object = element
                    .as_object()
                    .ok_or_else(|| field.mismatch("array of objects", element))?;
                M::from_object(Object::new(M::schema(), object))
            })
            .collect()
    }
}

/// A closed enumeration with a wire-token table.
pub trait WireEnum: Copy + 'static {
    /// Every accepted token.
    const TOKENS: &'static [&'static str];

    /// Maps a token to a member.
    fn from_wire(token: &str) -> Option<Self>;

    /// Maps a member to its token.
    fn wire(self) -> &'static str;
}

/// Whether `kind` is an enum field declared with exactly `E`'s tokens.
///
/// [`WireEnum`] types implement [`FieldType::accepts`] by calling this.
pub fn accepts_wire_enum<E: WireEnum>(kind: &FieldKind) -> bool {
    matches!(kind, FieldKind::Enum(tokens) if *tokens == E::TOKENS)
}

/// Converts an enum field value through the enum's wire-token table.
///
/// The token must also appear in the tokens declared on `field`.
/// [`WireEnum`] types implement [`FieldType::from_json`] by calling this.
pub fn decode_wire_enum<E: WireEnum>(field: &Field, value: &Value) -> Result<E, SchemaError> {
    let token = value
        .as_str()
        .ok_or_else(|| field.mismatch("enum string", value))?;
    let declared = match field.kind {
        FieldKind::Enum(tokens) => tokens.contains(&token),
        _ => false,
    };

    declared
        .then(|| E::from_wire(token))
        .flatten()
        .ok_or_else(|| SchemaError::InvalidEnumValue {
            field: field.name,
            value: token.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("not an object: {}", other),
        }
    }

    #[test]
    fn test_missing_and_null_are_the_same() {
        let required = Field::string("name");
        let optional = Field::string("name").optional();

        for payload in [json!({}), json!({"name": null})] {
            let payload = object(payload);
            assert_eq!(
                required.decode::<String>(&payload),
                Err(SchemaError::MissingField { field: "name" })
            );
            assert_eq!(optional.decode::<String>(&payload), Ok(None));
        }
    }

    #[test]
    fn test_string_field() {
        let field = Field::string("name");
        let payload = object(json!({"name": "Flat", "other": 5}));
        assert_eq!(field.decode::<String>(&payload), Ok(Some("Flat".to_string())));

        let payload = object(json!({"name": 5}));
        assert_eq!(
            field.decode::<String>(&payload),
            Err(SchemaError::TypeMismatch {
                field: "name",
                expected: "string",
                actual: "integer",
            })
        );
    }

    #[test]
    fn test_integer_field_rejects_booleans_floats_and_strings() {
        let field = Field::integer("count");
        assert_eq!(field.decode::<i64>(&object(json!({"count": -3}))), Ok(Some(-3)));

        for (value, actual) in [(json!(true), "boolean"), (json!(3.0), "float"), (json!("3"), "string")] {
            assert_eq!(
                field.decode::<i64>(&object(json!({ "count": value }))),
                Err(SchemaError::TypeMismatch {
                    field: "count",
                    expected: "integer",
                    actual,
                })
            );
        }
    }

    #[test]
    fn test_unsigned_integer_field_rejects_negatives() {
        let field = Field::integer("total_count");
        assert_eq!(field.decode::<u64>(&object(json!({"total_count": 7}))), Ok(Some(7)));
        assert!(matches!(
            field.decode::<u64>(&object(json!({"total_count": -1}))),
            Err(SchemaError::TypeMismatch { field: "total_count", .. })
        ));
    }

    #[test]
    fn test_float_field_requires_a_float() {
        let field = Field::float("price");
        assert_eq!(field.decode::<f64>(&object(json!({"price": 2.5}))), Ok(Some(2.5)));
        assert_eq!(
            field.decode::<f64>(&object(json!({"price": 2}))),
            Err(SchemaError::TypeMismatch {
                field: "price",
                expected: "float",
                actual: "integer",
            })
        );
    }

    #[test]
    fn test_boolean_field() {
        let field = Field::boolean("is_designer");
        assert_eq!(
            field.decode::<bool>(&object(json!({"is_designer": false}))),
            Ok(Some(false))
        );
        assert!(field
            .decode::<bool>(&object(json!({"is_designer": 0})))
            .is_err());
    }

    #[test]
    fn test_datetime_field() {
        let field = Field::datetime("published_at");
        let zulu = field
            .decode::<NaiveDateTime>(&object(json!({"published_at": "2013-05-07T10:20:30Z"})))
            .unwrap()
            .unwrap();
        let naive = field
            .decode::<NaiveDateTime>(&object(json!({"published_at": "2013-05-07T10:20:30"})))
            .unwrap()
            .unwrap();
        assert_eq!(zulu, naive);

        assert_eq!(
            field.decode::<NaiveDateTime>(&object(json!({"published_at": "2013-05-07T10:20:30+02:00"}))),
            Err(SchemaError::NonUtcDateTime {
                field: "published_at",
                value: "2013-05-07T10:20:30+02:00".to_string(),
            })
        );
        assert!(matches!(
            field.decode::<NaiveDateTime>(&object(json!({"published_at": "soon"}))),
            Err(SchemaError::InvalidDateTime { .. })
        ));
        assert!(matches!(
            field.decode::<NaiveDateTime>(&object(json!({"published_at": 1367922030}))),
            Err(SchemaError::TypeMismatch { expected: "datetime string", .. })
        ));
    }

    #[test]
    fn test_polymorphic_resolution_is_ordered() {
        fn schema() -> &'static Schema {
            crate::models::User::schema()
        }
        const VARIANTS: &[Variant] = &[Variant::new("a", schema), Variant::new("b", schema)];
        let field = Field::polymorphic("owner", VARIANTS);

        let value = json!({"b": 1, "a": 2});
        let (variant, _) = field.resolve_variant(&value).unwrap();
        assert_eq!(variant.marker(), "a");

        let value = json!({"b": 1});
        let (variant, _) = field.resolve_variant(&value).unwrap();
        assert_eq!(variant.marker(), "b");

        let value = json!({"c": 1});
        assert_eq!(
            field.resolve_variant(&value).map(|(v, _)| v.marker()),
            Err(SchemaError::UnresolvedPolymorphicType {
                field: "owner",
                value: json!({"c": 1}),
            })
        );

        assert!(matches!(
            field.resolve_variant(&json!("a")),
            Err(SchemaError::TypeMismatch { expected: "object", .. })
        ));
    }

    #[test]
    fn test_enum_tokens_come_from_the_descriptor() {
        use crate::models::IconSetType;

        let narrowed = Field::enumeration("type", &["vector"]);
        assert_eq!(
            narrowed.decode::<IconSetType>(&object(json!({"type": "raster"}))),
            Err(SchemaError::IncompatibleType {
                field: "type",
                kind: "enum",
            })
        );
        assert_eq!(
            decode_wire_enum::<IconSetType>(&narrowed, &json!("raster")),
            Err(SchemaError::InvalidEnumValue {
                field: "type",
                value: "raster".to_string(),
            })
        );
        assert_eq!(
            decode_wire_enum::<IconSetType>(&narrowed, &json!("vector")),
            Ok(IconSetType::Vector)
        );
        assert_eq!(
            narrowed.check(&json!("raster")),
            Err(SchemaError::InvalidEnumValue {
                field: "type",
                value: "raster".to_string(),
            })
        );
    }

    #[test]
    fn test_decode_refuses_types_the_kind_does_not_map_to() {
        // Refused even when the value is absent.
        let price = Field::float("price").optional();
        assert_eq!(
            price.decode::<i64>(&object(json!({}))),
            Err(SchemaError::IncompatibleType {
                field: "price",
                kind: "float",
            })
        );
        assert!(matches!(
            Field::integer("count").decode::<String>(&object(json!({"count": 1}))),
            Err(SchemaError::IncompatibleType { field: "count", .. })
        ));
    }

    #[test]
    fn test_check_nested_kinds() {
        let styles = Field::nested_list("styles", crate::models::Style::schema);
        assert_eq!(
            styles.check(&json!({})),
            Err(SchemaError::TypeMismatch {
                field: "styles",
                expected: "array",
                actual: "object",
            })
        );
        assert_eq!(
            styles.check(&json!([{"identifier": "flat"}])),
            Err(SchemaError::MissingField { field: "name" })
        );
        assert_eq!(styles.check(&json!([])), Ok(()));

        let owner = Field::nested("owner", crate::models::User::schema);
        assert!(matches!(
            owner.check(&json!("jdoe")),
            Err(SchemaError::TypeMismatch { expected: "object", .. })
        ));
    }

    #[test]
    fn test_builders() {
        const FIELD: Field = Field::integer("id").primary_key().optional();
        assert_eq!(FIELD.name(), "id");
        assert!(FIELD.is_primary_key());
        assert!(!FIELD.is_required());
        assert_eq!(FIELD.kind().label(), "integer");
        assert_eq!(Field::nested_list("styles", crate::models::Style::schema).kind().to_string(), "nested-entity-list");
    }
}
