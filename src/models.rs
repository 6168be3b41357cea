//! Entities of the Iconfinder API.
//!
//! Each entity declares its [`Schema`] once, as a `static`, and reads its
//! attributes through it. Attributes are write-once: they are set by
//! deserialization and exposed through accessors.

use crate::capability::{Entity, ListableByCursor, Retrievable};
use crate::error::SchemaError;
use crate::field::{
    accepts_wire_enum, decode_wire_enum, Field, FieldKind, FieldType, Variant, WireEnum,
};
use crate::schema::{Model, Object, Schema};
use chrono::NaiveDateTime;
use serde_json::Value;
use std::fmt;

const USER_FIELDS: &[Field] = &[
    Field::integer("user_id").primary_key(),
    Field::string("username"),
    Field::string("location").optional(),
    Field::string("name"),
    Field::string("social_twitter").optional(),
    Field::string("social_dribbble").optional(),
    Field::string("social_behance").optional(),
    Field::string("website_url").optional(),
    Field::string("company").optional(),
    Field::boolean("is_designer"),
    Field::integer("iconsets_count"),
    Field::string("email").optional(),
    Field::string("first_name").optional(),
    Field::string("last_name").optional(),
];
static USER: Schema = Schema::new("User", USER_FIELDS);

const AUTHOR_FIELDS: &[Field] = &[
    Field::integer("author_id").primary_key(),
    Field::string("name"),
    Field::string("website_url"),
    Field::integer("iconsets_count"),
];
static AUTHOR: Schema = Schema::new("Author", AUTHOR_FIELDS);

const CATEGORY_FIELDS: &[Field] = &[
    Field::string("identifier").primary_key(),
    Field::string("name"),
];
static CATEGORY: Schema = Schema::new("Category", CATEGORY_FIELDS);

const STYLE_FIELDS: &[Field] = &[
    Field::string("identifier").primary_key(),
    Field::string("name"),
];
static STYLE: Schema = Schema::new("Style", STYLE_FIELDS);

const LICENSE_FIELDS: &[Field] = &[
    Field::integer("license_id").primary_key(),
    Field::string("name"),
    Field::string("url").optional(),
    Field::enumeration("scope", LicenseScope::TOKENS),
];
static LICENSE: Schema = Schema::new("License", LICENSE_FIELDS);

const OWNER_VARIANTS: &[Variant] = &[
    Variant::new("user_id", User::schema),
    Variant::new("author_id", Author::schema),
];

const ICON_SET_FIELDS: &[Field] = &[
    Field::integer("iconset_id").primary_key(),
    Field::string("identifier"),
    Field::string("name"),
    Field::enumeration("type", IconSetType::TOKENS),
    Field::boolean("is_premium"),
    Field::datetime("published_at"),
    Field::integer("icons_count"),
    Field::float("price").optional(),
    Field::nested("license", License::schema).optional(),
    Field::nested_list("styles", Style::schema).optional(),
    Field::nested_list("categories", Category::schema).optional(),
    Field::polymorphic("author", OWNER_VARIANTS).optional(),
];
static ICON_SET: Schema = Schema::new("IconSet", ICON_SET_FIELDS);

/// A registered user. Users who publish icon sets are designers.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    user_id: i64,
    username: String,
    location: Option<String>,
    name: String,
    social_twitter: Option<String>,
    social_dribbble: Option<String>,
    social_behance: Option<String>,
    website_url: Option<String>,
    company: Option<String>,
    is_designer: bool,
    iconsets_count: i64,
    email: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
    last_modified: Option<NaiveDateTime>,
}

impl User {
    pub fn user_id(&self) -> i64 {
        self.user_id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn social_twitter(&self) -> Option<&str> {
        self.social_twitter.as_deref()
    }

    pub fn social_dribbble(&self) -> Option<&str> {
        self.social_dribbble.as_deref()
    }

    pub fn social_behance(&self) -> Option<&str> {
        self.social_behance.as_deref()
    }

    pub fn website_url(&self) -> Option<&str> {
        self.website_url.as_deref()
    }

    pub fn company(&self) -> Option<&str> {
        self.company.as_deref()
    }

    pub fn is_designer(&self) -> bool {
        self.is_designer
    }

    pub fn iconsets_count(&self) -> i64 {
        self.iconsets_count
    }

    /// Only present when the credentials belong to this user.
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    pub fn first_name(&self) -> Option<&str> {
        self.first_name.as_deref()
    }

    pub fn last_name(&self) -> Option<&str> {
        self.last_name.as_deref()
    }
}

impl Model for User {
    fn schema() -> &'static Schema {
        &USER
    }

    fn from_object(object: Object<'_>) -> Result<Self, SchemaError> {
        Ok(Self {
            user_id: object.required("user_id")?,
            username: object.required("username")?,
            location: object.optional("location")?,
            name: object.required("name")?,
            social_twitter: object.optional("social_twitter")?,
            social_dribbble: object.optional("social_dribbble")?,
            social_behance: object.optional("social_behance")?,
            website_url: object.optional("website_url")?,
            company: object.optional("company")?,
            is_designer: object.required("is_designer")?,
            iconsets_count: object.required("iconsets_count")?,
            email: object.optional("email")?,
            first_name: object.optional("first_name")?,
            last_name: object.optional("last_name")?,
            last_modified: None,
        })
    }
}

impl Entity for User {
    type Key = i64;
    const ENDPOINT: &'static str = "users";

    fn primary_key(&self) -> &i64 {
        &self.user_id
    }

    fn last_modified(&self) -> Option<NaiveDateTime> {
        self.last_modified
    }

    fn with_last_modified(self, last_modified: Option<NaiveDateTime>) -> Self {
        Self {
            last_modified,
            ..self
        }
    }
}

impl Retrievable for User {}

/// An icon author without a user account.
#[derive(Debug, Clone, PartialEq)]
pub struct Author {
    author_id: i64,
    name: String,
    website_url: String,
    iconsets_count: i64,
    last_modified: Option<NaiveDateTime>,
}

impl Author {
    pub fn author_id(&self) -> i64 {
        self.author_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn website_url(&self) -> &str {
        &self.website_url
    }

    pub fn iconsets_count(&self) -> i64 {
        self.iconsets_count
    }
}

impl Model for Author {
    fn schema() -> &'static Schema {
        &AUTHOR
    }

    fn from_object(object: Object<'_>) -> Result<Self, SchemaError> {
        Ok(Self {
            author_id: object.required("author_id")?,
            name: object.required("name")?,
            website_url: object.required("website_url")?,
            iconsets_count: object.required("iconsets_count")?,
            last_modified: None,
        })
    }
}

impl Entity for Author {
    type Key = i64;
    const ENDPOINT: &'static str = "authors";

    fn primary_key(&self) -> &i64 {
        &self.author_id
    }

    fn last_modified(&self) -> Option<NaiveDateTime> {
        self.last_modified
    }

    fn with_last_modified(self, last_modified: Option<NaiveDateTime>) -> Self {
        Self {
            last_modified,
            ..self
        }
    }
}

impl Retrievable for Author {}

/// A category icon sets are filed under.
#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    identifier: String,
    name: String,
    last_modified: Option<NaiveDateTime>,
}

impl Category {
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Model for Category {
    fn schema() -> &'static Schema {
        &CATEGORY
    }

    fn from_object(object: Object<'_>) -> Result<Self, SchemaError> {
        Ok(Self {
            identifier: object.required("identifier")?,
            name: object.required("name")?,
            last_modified: None,
        })
    }
}

impl Entity for Category {
    type Key = String;
    const ENDPOINT: &'static str = "categories";

    fn primary_key(&self) -> &String {
        &self.identifier
    }

    fn last_modified(&self) -> Option<NaiveDateTime> {
        self.last_modified
    }

    fn with_last_modified(self, last_modified: Option<NaiveDateTime>) -> Self {
        Self {
            last_modified,
            ..self
        }
    }
}

impl Retrievable for Category {}

impl ListableByCursor for Category {
    const COLLECTION_KEY: &'static str = "categories";
}

/// A visual style, such as "flat" or "glyph".
#[derive(Debug, Clone, PartialEq)]
pub struct Style {
    identifier: String,
    name: String,
    last_modified: Option<NaiveDateTime>,
}

impl Style {
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Model for Style {
    fn schema() -> &'static Schema {
        &STYLE
    }

    fn from_object(object: Object<'_>) -> Result<Self, SchemaError> {
        Ok(Self {
            identifier: object.required("identifier")?,
            name: object.required("name")?,
            last_modified: None,
        })
    }
}

impl Entity for Style {
    type Key = String;
    const ENDPOINT: &'static str = "styles";

    fn primary_key(&self) -> &String {
        &self.identifier
    }

    fn last_modified(&self) -> Option<NaiveDateTime> {
        self.last_modified
    }

    fn with_last_modified(self, last_modified: Option<NaiveDateTime>) -> Self {
        Self {
            last_modified,
            ..self
        }
    }
}

impl Retrievable for Style {}

impl ListableByCursor for Style {
    const COLLECTION_KEY: &'static str = "styles";
}

/// What a license permits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LicenseScope {
    /// Free for any use.
    Free,
    /// Free, provided the author is credited. Sent as `"attribution"`.
    FreeWithAttribution,
    /// Commercial use.
    Commercial,
}

impl WireEnum for LicenseScope {
    const TOKENS: &'static [&'static str] = &["free", "attribution", "commercial"];

    fn from_wire(token: &str) -> Option<Self> {
        match token {
            "free" => Some(LicenseScope::Free),
            "attribution" => Some(LicenseScope::FreeWithAttribution),
            "commercial" => Some(LicenseScope::Commercial),
            _ => None,
        }
    }

    fn wire(self) -> &'static str {
        match self {
            LicenseScope::Free => "free",
            LicenseScope::FreeWithAttribution => "attribution",
            LicenseScope::Commercial => "commercial",
        }
    }
}

impl FieldType for LicenseScope {
    fn accepts(kind: &FieldKind) -> bool {
        accepts_wire_enum::<Self>(kind)
    }

    fn from_json(field: &Field, value: &Value) -> Result<Self, SchemaError> {
        decode_wire_enum(field, value)
    }
}

impl fmt::Display for LicenseScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire())
    }
}

/// A license icon sets are published under.
#[derive(Debug, Clone, PartialEq)]
pub struct License {
    license_id: i64,
    name: String,
    url: Option<String>,
    scope: LicenseScope,
    last_modified: Option<NaiveDateTime>,
}

impl License {
    pub fn license_id(&self) -> i64 {
        self.license_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Link to the full license text.
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn scope(&self) -> LicenseScope {
        self.scope
    }
}

impl Model for License {
    fn schema() -> &'static Schema {
        &LICENSE
    }

    fn from_object(object: Object<'_>) -> Result<Self, SchemaError> {
        Ok(Self {
            license_id: object.required("license_id")?,
            name: object.required("name")?,
            url: object.optional("url")?,
            scope: object.required("scope")?,
            last_modified: None,
        })
    }
}

impl Entity for License {
    type Key = i64;
    const ENDPOINT: &'static str = "licenses";

    fn primary_key(&self) -> &i64 {
        &self.license_id
    }

    fn last_modified(&self) -> Option<NaiveDateTime> {
        self.last_modified
    }

    fn with_last_modified(self, last_modified: Option<NaiveDateTime>) -> Self {
        Self {
            last_modified,
            ..self
        }
    }
}

impl Retrievable for License {}

/// Whether an icon set is drawn as vectors or bitmaps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IconSetType {
    Vector,
    Raster,
}

impl WireEnum for IconSetType {
    const TOKENS: &'static [&'static str] = &["vector", "raster"];

    fn from_wire(token: &str) -> Option<Self> {
        match token {
            "vector" => Some(IconSetType::Vector),
            "raster" => Some(IconSetType::Raster),
            _ => None,
        }
    }

    fn wire(self) -> &'static str {
        match self {
            IconSetType::Vector => "vector",
            IconSetType::Raster => "raster",
        }
    }
}

impl FieldType for IconSetType {
    fn accepts(kind: &FieldKind) -> bool {
        accepts_wire_enum::<Self>(kind)
    }

    fn from_json(field: &Field, value: &Value) -> Result<Self, SchemaError> {
        decode_wire_enum(field, value)
    }
}

impl fmt::Display for IconSetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire())
    }
}

/// The publisher of an icon set: a user account or a bare author record.
///
/// Resolved by the payload's key: `user_id` selects [`User`], otherwise
/// `author_id` selects [`Author`].
#[derive(Debug, Clone, PartialEq)]
pub enum Owner {
    User(User),
    Author(Author),
}

impl Owner {
    /// The display name of the owner.
    pub fn name(&self) -> &str {
        match self {
            Owner::User(user) => user.name(),
            Owner::Author(author) => author.name(),
        }
    }
}

impl FieldType for Owner {
    fn accepts(kind: &FieldKind) -> bool {
        matches!(kind, FieldKind::Polymorphic(variants)
            if variants.iter().map(Variant::marker).eq(OWNER_VARIANTS.iter().map(Variant::marker)))
    }

    fn from_json(field: &Field, value: &Value) -> Result<Self, SchemaError> {
        let (variant, object) = field.resolve_variant(value)?;
        let object = Object::new(variant.schema(), object);

        match variant.marker() {
            "user_id" => User::from_object(object).map(Owner::User),
            "author_id" => Author::from_object(object).map(Owner::Author),
            _ => Err(SchemaError::UnresolvedPolymorphicType {
                field: field.name(),
                value: value.clone(),
            }),
        }
    }
}

/// A published set of icons.
#[derive(Debug, Clone, PartialEq)]
pub struct IconSet {
    iconset_id: i64,
    identifier: String,
    name: String,
    iconset_type: IconSetType,
    is_premium: bool,
    published_at: NaiveDateTime,
    icons_count: i64,
    price: Option<f64>,
    license: Option<License>,
    styles: Option<Vec<Style>>,
    categories: Option<Vec<Category>>,
    author: Option<Owner>,
    last_modified: Option<NaiveDateTime>,
}

impl IconSet {
    pub fn iconset_id(&self) -> i64 {
        self.iconset_id
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The `type` attribute.
    pub fn iconset_type(&self) -> IconSetType {
        self.iconset_type
    }

    pub fn is_premium(&self) -> bool {
        self.is_premium
    }

    /// Publication time, naive UTC.
    pub fn published_at(&self) -> NaiveDateTime {
        self.published_at
    }

    pub fn icons_count(&self) -> i64 {
        self.icons_count
    }

    /// Price of a premium set.
    pub fn price(&self) -> Option<f64> {
        self.price
    }

    pub fn license(&self) -> Option<&License> {
        self.license.as_ref()
    }

    pub fn styles(&self) -> Option<&[Style]> {
        self.styles.as_deref()
    }

    pub fn categories(&self) -> Option<&[Category]> {
        self.categories.as_deref()
    }

    pub fn author(&self) -> Option<&Owner> {
        self.author.as_ref()
    }
}

impl Model for IconSet {
    fn schema() -> &'static Schema {
        &ICON_SET
    }

    fn from_object(object: Object<'_>) -> Result<Self, SchemaError> {
        Ok(Self {
            iconset_id: object.required("iconset_id")?,
            identifier: object.required("identifier")?,
            name: object.required("name")?,
            iconset_type: object.required("type")?,
            is_premium: object.required("is_premium")?,
            published_at: object.required("published_at")?,
            icons_count: object.required("icons_count")?,
            price: object.optional("price")?,
            license: object.optional("license")?,
            styles: object.optional("styles")?,
            categories: object.optional("categories")?,
            author: object.optional("author")?,
            last_modified: None,
        })
    }
}

impl Entity for IconSet {
    type Key = i64;
    const ENDPOINT: &'static str = "iconsets";

    fn primary_key(&self) -> &i64 {
        &self.iconset_id
    }

    fn last_modified(&self) -> Option<NaiveDateTime> {
        self.last_modified
    }

    fn with_last_modified(self, last_modified: Option<NaiveDateTime>) -> Self {
        Self {
            last_modified,
            ..self
        }
    }
}

impl Retrievable for IconSet {}

impl ListableByCursor for IconSet {
    const COLLECTION_KEY: &'static str = "iconsets";
}
