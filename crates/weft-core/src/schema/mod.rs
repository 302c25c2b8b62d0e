//! Type engine
//!
//! Typed schema nodes ([`PropType`]) and named property collections
//! ([`ObjectSchema`]) parsed from JSON definitions. A definition may be
//! merged over a base definition; attributes that come from the base are
//! remembered as inherited so that a diff export shows only what was
//! declared locally.

mod inference;
mod object_schema;
mod prop_type;
mod value_type;

pub use object_schema::ObjectSchema;
pub use prop_type::PropType;
pub use value_type::{TypeSpec, ValueType};

/// JSON attribute names understood in definitions
pub mod keys {
    pub const TYPE: &str = "type";
    pub const MINIMUM: &str = "minimum";
    pub const MAXIMUM: &str = "maximum";
    pub const MIN_LENGTH: &str = "minLength";
    pub const MAX_LENGTH: &str = "maxLength";
    pub const PROPERTIES: &str = "properties";
    pub const ITEMS: &str = "items";
    pub const ENUM: &str = "enum";
    pub const DEFAULT: &str = "default";
    pub const ADDITIONAL_PROPERTIES: &str = "additionalProperties";
    pub const REQUIRED: &str = "required";
}
