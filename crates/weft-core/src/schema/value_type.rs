use serde_json::Value;

use crate::errors::{Result, WeftError, WeftErrorKind};

/// Type tag of a schema node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    Boolean,
    Int,
    Double,
    String,
    Object,
    Array,
}

impl ValueType {
    /// The name used for this type in JSON definitions
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueType::Boolean => "boolean",
            ValueType::Int => "integer",
            ValueType::Double => "number",
            ValueType::String => "string",
            ValueType::Object => "object",
            ValueType::Array => "array",
        }
    }

    /// Look up a type by its JSON name
    pub fn from_type_str(name: &str) -> Option<ValueType> {
        match name {
            "boolean" => Some(ValueType::Boolean),
            "integer" => Some(ValueType::Int),
            "number" => Some(ValueType::Double),
            "string" => Some(ValueType::String),
            "object" => Some(ValueType::Object),
            "array" => Some(ValueType::Array),
            _ => None,
        }
    }

    /// The type a JSON value naturally carries, if it maps to one
    pub fn of_json(value: &Value) -> Option<ValueType> {
        match value {
            Value::Bool(_) => Some(ValueType::Boolean),
            Value::Number(n) if n.is_f64() => Some(ValueType::Double),
            Value::Number(_) => Some(ValueType::Int),
            Value::String(_) => Some(ValueType::String),
            Value::Object(_) => Some(ValueType::Object),
            Value::Array(_) => Some(ValueType::Array),
            Value::Null => None,
        }
    }
}

impl std::fmt::Display for ValueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resolved type name: a primitive, or an array with an optional item type.
///
/// This is the parsed form of the `"integer"` / `"array.string"` shorthand
/// and the result of type inference. Arrays of arrays are not expressible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeSpec {
    pub value_type: ValueType,
    pub item_type: Option<ValueType>,
}

impl TypeSpec {
    pub fn of(value_type: ValueType) -> Self {
        Self {
            value_type,
            item_type: None,
        }
    }

    pub fn array_of(item_type: ValueType) -> Self {
        Self {
            value_type: ValueType::Array,
            item_type: Some(item_type),
        }
    }

    /// Parse a shorthand type name such as `"integer"` or `"array.number"`
    ///
    /// # Errors
    ///
    /// Returns `unknown_type` for unrecognized names, a non-array type with an
    /// item suffix, or an array nested inside an array.
    pub fn parse(name: &str) -> Result<TypeSpec> {
        let unknown = || {
            WeftError::new(WeftErrorKind::UnknownType).with_message(format!("Unknown type {}", name))
        };
        let (primary, item) = match name.split_once('.') {
            Some((primary, item)) => (primary, Some(item)),
            None => (name, None),
        };
        let value_type = ValueType::from_type_str(primary).ok_or_else(unknown)?;
        match item {
            None => Ok(TypeSpec::of(value_type)),
            Some(item) if value_type == ValueType::Array => {
                match ValueType::from_type_str(item) {
                    Some(ValueType::Array) | None => Err(unknown()),
                    Some(item_type) => Ok(TypeSpec::array_of(item_type)),
                }
            }
            Some(_) => Err(unknown()),
        }
    }
}

impl std::fmt::Display for TypeSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.item_type {
            Some(item) => write!(f, "{}.{}", self.value_type, item),
            None => write!(f, "{}", self.value_type),
        }
    }
}
