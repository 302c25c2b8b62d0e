use serde_json::{Map, Value};

use super::inference;
use super::keys;
use super::object_schema::ObjectSchema;
use super::value_type::{TypeSpec, ValueType};
use crate::errors::{json_kind_name, type_mismatch, Result, WeftError, WeftErrorKind};

/// An attribute value together with where it came from.
///
/// `inherited` attributes were copied from a base schema during a merge and
/// are left out of diff-mode exports.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Inheritable<T> {
    pub(crate) value: T,
    pub(crate) inherited: bool,
}

impl<T: Clone> Inheritable<T> {
    pub(crate) fn local(value: T) -> Self {
        Self {
            value,
            inherited: false,
        }
    }

    pub(crate) fn to_inherited(&self) -> Self {
        Self {
            value: self.value.clone(),
            inherited: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
struct Constraints {
    minimum: Option<Inheritable<Value>>,
    maximum: Option<Inheritable<Value>>,
    min_length: Option<Inheritable<u64>>,
    max_length: Option<Inheritable<u64>>,
    one_of: Option<Inheritable<Vec<Value>>>,
}

impl Constraints {
    fn to_inherited(&self) -> Self {
        Self {
            minimum: self.minimum.as_ref().map(Inheritable::to_inherited),
            maximum: self.maximum.as_ref().map(Inheritable::to_inherited),
            min_length: self.min_length.as_ref().map(Inheritable::to_inherited),
            max_length: self.max_length.as_ref().map(Inheritable::to_inherited),
            one_of: self.one_of.as_ref().map(Inheritable::to_inherited),
        }
    }

    fn is_local<T>(c: &Option<Inheritable<T>>) -> bool {
        matches!(c, Some(c) if !c.inherited)
    }

    fn has_local(&self) -> bool {
        Self::is_local(&self.minimum)
            || Self::is_local(&self.maximum)
            || Self::is_local(&self.min_length)
            || Self::is_local(&self.max_length)
            || Self::is_local(&self.one_of)
    }

    /// True when the enumeration is the only locally declared constraint
    fn only_local_is_one_of(&self) -> bool {
        Self::is_local(&self.one_of)
            && !Self::is_local(&self.minimum)
            && !Self::is_local(&self.maximum)
            && !Self::is_local(&self.min_length)
            && !Self::is_local(&self.max_length)
    }
}

/// Nested schema of an object node.
///
/// `extra_declared` and `required_declared` record whether
/// `additionalProperties` and `required` were set on this node itself, so a
/// diff export repeats them even when the property set is inherited.
#[derive(Debug, Clone, PartialEq)]
struct ObjectNode {
    schema: Inheritable<ObjectSchema>,
    extra_declared: bool,
    required_declared: bool,
}

impl ObjectNode {
    fn is_local(&self) -> bool {
        !self.schema.inherited || self.extra_declared || self.required_declared
    }
}

#[derive(Debug, Clone, PartialEq)]
enum PropKind {
    Boolean,
    Int,
    Double,
    String,
    Object(ObjectNode),
    Array(Option<Inheritable<Box<PropType>>>),
}

/// A typed schema node.
///
/// Built from one of three JSON forms: a type name string (`"integer"`,
/// `"array.string"`), a list of allowed values, or a full object definition.
/// Objects own their nested [`ObjectSchema`]; arrays own their item type.
#[derive(Debug, Clone, PartialEq)]
pub struct PropType {
    kind: PropKind,
    constraints: Constraints,
    default: Option<Inheritable<Value>>,
    required: bool,
    based_on_schema: bool,
    inherited: bool,
}

impl PropType {
    /// Create an unconstrained node of the given type.
    ///
    /// Objects start as free-form (extra properties allowed); arrays start
    /// without an item type.
    pub fn new(value_type: ValueType) -> Self {
        let kind = match value_type {
            ValueType::Boolean => PropKind::Boolean,
            ValueType::Int => PropKind::Int,
            ValueType::Double => PropKind::Double,
            ValueType::String => PropKind::String,
            ValueType::Object => {
                let mut schema = ObjectSchema::new();
                schema.set_extra_properties_allowed(true);
                // implicit free-form schema, not declared by anyone
                PropKind::Object(ObjectNode {
                    schema: Inheritable {
                        value: schema,
                        inherited: true,
                    },
                    extra_declared: false,
                    required_declared: false,
                })
            }
            ValueType::Array => PropKind::Array(None),
        };
        Self {
            kind,
            constraints: Constraints::default(),
            default: None,
            required: false,
            based_on_schema: false,
            inherited: false,
        }
    }

    fn create(spec: TypeSpec) -> Self {
        let mut prop = Self::new(spec.value_type);
        if let (PropKind::Array(items), Some(item_type)) = (&mut prop.kind, spec.item_type) {
            *items = Some(Inheritable::local(Box::new(PropType::new(item_type))));
        }
        prop
    }

    /// Parse a JSON definition, merging it over `base` when given.
    ///
    /// # Errors
    ///
    /// - `unknown_type` for unrecognized type names or JSON values that are
    ///   not a string, list or object
    /// - `no_type_info` when the type cannot be determined and there is no base
    /// - `param_type_changed` when the definition's type differs from `base`
    /// - `invalid_object_schema` wrapping a failure in a nested object
    /// - `type_mismatch` / `invalid_parameter_value` for malformed constraints
    pub fn from_json(value: &Value, base: Option<&PropType>) -> Result<PropType> {
        match value {
            Value::String(name) => {
                let spec = TypeSpec::parse(name)?;
                Self::build(spec, &Map::new(), base)
            }
            Value::Array(list) => {
                let spec =
                    inference::detect_array_type(list, base, true).ok_or_else(no_type_info)?;
                let mut dict = Map::new();
                dict.insert(keys::ENUM.to_string(), Value::Array(list.clone()));
                Self::build(spec, &dict, base)
            }
            Value::Object(dict) => {
                let spec = match dict.get(keys::TYPE) {
                    Some(Value::String(name)) => TypeSpec::parse(name)?,
                    Some(_) => return Err(no_type_info()),
                    None => match inference::detect_object_type(dict, base) {
                        Some(spec) => spec,
                        None => base
                            .map(|b| TypeSpec::of(b.value_type()))
                            .ok_or_else(no_type_info)?,
                    },
                };
                Self::build(spec, dict, base)
            }
            other => Err(WeftError::new(WeftErrorKind::UnknownType).with_message(format!(
                "Unexpected JSON value type: {}",
                json_kind_name(other)
            ))),
        }
    }

    fn build(spec: TypeSpec, dict: &Map<String, Value>, base: Option<&PropType>) -> Result<PropType> {
        let mut prop = Self::create(spec);
        prop.apply_json(dict, base)?;
        Ok(prop)
    }

    fn apply_json(&mut self, dict: &Map<String, Value>, base: Option<&PropType>) -> Result<()> {
        if let Some(base) = base {
            if base.value_type() != self.value_type() {
                return Err(WeftError::new(WeftErrorKind::ParamTypeChanged).with_message(format!(
                    "Redefining a property of type {} as {}",
                    base.value_type(),
                    self.value_type()
                )));
            }
            self.based_on_schema = true;
            self.constraints = base.constraints.to_inherited();
            self.default = base.default.as_ref().map(Inheritable::to_inherited);
            self.required = base.required;
        }

        match self.value_type() {
            ValueType::Int | ValueType::Double => {
                if let Some(v) = self.parse_bound(dict, keys::MINIMUM)? {
                    self.constraints.minimum = Some(Inheritable::local(v));
                }
                if let Some(v) = self.parse_bound(dict, keys::MAXIMUM)? {
                    self.constraints.maximum = Some(Inheritable::local(v));
                }
            }
            ValueType::String => {
                if let Some(v) = parse_length(dict, keys::MIN_LENGTH)? {
                    self.constraints.min_length = Some(Inheritable::local(v));
                }
                if let Some(v) = parse_length(dict, keys::MAX_LENGTH)? {
                    self.constraints.max_length = Some(Inheritable::local(v));
                }
            }
            ValueType::Object => self.apply_object(dict, base)?,
            ValueType::Array => self.apply_array(dict, base)?,
            ValueType::Boolean => {}
        }

        if let Some(list) = dict.get(keys::ENUM) {
            let Value::Array(list) = list else {
                return Err(type_mismatch(format!(
                    "Expected a list for '{}', got {}",
                    keys::ENUM,
                    json_kind_name(list)
                )));
            };
            let bare = self.bare();
            for item in list {
                bare.validate_value(item).map_err(|e| {
                    e.wrap(
                        WeftErrorKind::InvalidPropValue,
                        format!("Invalid enumeration value {}", item),
                    )
                })?;
            }
            self.constraints.one_of = Some(Inheritable::local(list.clone()));
        }

        if let Some(default) = dict.get(keys::DEFAULT) {
            self.validate_value(default).map_err(|e| {
                e.wrap(
                    WeftErrorKind::InvalidPropValue,
                    format!("Invalid default value {}", default),
                )
            })?;
            self.default = Some(Inheritable::local(default.clone()));
        }

        Ok(())
    }

    fn parse_bound(&self, dict: &Map<String, Value>, key: &str) -> Result<Option<Value>> {
        let Some(raw) = dict.get(key) else {
            return Ok(None);
        };
        let converted = match self.value_type() {
            ValueType::Int => raw.as_i64().map(Value::from),
            _ => raw.as_f64().map(Value::from),
        };
        converted.map(Some).ok_or_else(|| {
            type_mismatch(format!(
                "Unable to convert value {} into {} for '{}'",
                raw,
                self.value_type(),
                key
            ))
        })
    }

    fn apply_object(&mut self, dict: &Map<String, Value>, base: Option<&PropType>) -> Result<()> {
        let base_schema = base.and_then(PropType::object_schema);
        let PropKind::Object(node) = &mut self.kind else {
            return Ok(());
        };

        match dict.get(keys::PROPERTIES) {
            Some(Value::Object(props)) => {
                let parsed = ObjectSchema::from_json(props, base_schema).map_err(|e| {
                    e.wrap(
                        WeftErrorKind::InvalidObjectSchema,
                        "Error parsing object property schema",
                    )
                })?;
                node.schema = Inheritable::local(parsed);
            }
            Some(other) => {
                return Err(type_mismatch(format!(
                    "Expected an object for '{}', got {}",
                    keys::PROPERTIES,
                    json_kind_name(other)
                )))
            }
            None => {
                if let Some(base_schema) = base_schema {
                    node.schema = Inheritable {
                        value: base_schema.to_inherited(),
                        inherited: true,
                    };
                }
            }
        }

        if let Some(extra) = dict.get(keys::ADDITIONAL_PROPERTIES) {
            let allowed = extra.as_bool().ok_or_else(|| {
                type_mismatch(format!(
                    "Expected a boolean for '{}'",
                    keys::ADDITIONAL_PROPERTIES
                ))
            })?;
            node.schema.value.set_extra_properties_allowed(allowed);
            node.extra_declared = true;
        }

        if let Some(required) = dict.get(keys::REQUIRED) {
            let names = required.as_array().ok_or_else(|| {
                type_mismatch(format!("Expected a list for '{}'", keys::REQUIRED))
            })?;
            for name in names {
                let name = name.as_str().ok_or_else(|| {
                    type_mismatch(format!("Expected property names in '{}'", keys::REQUIRED))
                })?;
                node.schema.value.mark_prop_required(name)?;
            }
            node.required_declared = true;
        }
        Ok(())
    }

    fn apply_array(&mut self, dict: &Map<String, Value>, base: Option<&PropType>) -> Result<()> {
        let base_item = base.and_then(PropType::item_type);
        let PropKind::Array(items) = &mut self.kind else {
            return Ok(());
        };

        if let Some(items_json) = dict.get(keys::ITEMS) {
            let item = PropType::from_json(items_json, base_item)?;
            *items = Some(Inheritable::local(Box::new(item)));
        } else if let Some(existing) = items.as_mut() {
            if let Some(base_item) = base_item {
                existing.value.apply_json(&Map::new(), Some(base_item))?;
            }
        } else if let Some(base_item) = base_item {
            *items = Some(Inheritable {
                value: Box::new(base_item.clone()),
                inherited: true,
            });
        } else {
            return Err(no_type_info().with_message("Array item type is not specified"));
        }
        Ok(())
    }

    /// A copy with the type-level structure but no constraints or default
    fn bare(&self) -> PropType {
        Self {
            kind: self.kind.clone(),
            constraints: Constraints::default(),
            default: None,
            required: false,
            based_on_schema: false,
            inherited: false,
        }
    }

    /// Mark this node (and every attribute on it) as carried over from a base
    pub(crate) fn mark_inherited(&mut self) {
        self.inherited = true;
        self.based_on_schema = true;
        self.constraints = self.constraints.to_inherited();
        if let Some(default) = self.default.as_mut() {
            default.inherited = true;
        }
        match &mut self.kind {
            PropKind::Object(node) => {
                node.schema.inherited = true;
                node.extra_declared = false;
                node.required_declared = false;
            }
            PropKind::Array(Some(items)) => items.inherited = true,
            _ => {}
        }
    }

    pub(crate) fn set_required(&mut self, required: bool) {
        self.required = required;
    }

    // ---- Accessors ----

    /// The node's type tag
    pub fn value_type(&self) -> ValueType {
        match self.kind {
            PropKind::Boolean => ValueType::Boolean,
            PropKind::Int => ValueType::Int,
            PropKind::Double => ValueType::Double,
            PropKind::String => ValueType::String,
            PropKind::Object(_) => ValueType::Object,
            PropKind::Array(_) => ValueType::Array,
        }
    }

    /// Nested schema of an object node
    pub fn object_schema(&self) -> Option<&ObjectSchema> {
        match &self.kind {
            PropKind::Object(node) => Some(&node.schema.value),
            _ => None,
        }
    }

    /// Item type of an array node
    pub fn item_type(&self) -> Option<&PropType> {
        match &self.kind {
            PropKind::Array(Some(items)) => Some(&items.value),
            _ => None,
        }
    }

    pub fn minimum(&self) -> Option<&Value> {
        self.constraints.minimum.as_ref().map(|c| &c.value)
    }

    pub fn maximum(&self) -> Option<&Value> {
        self.constraints.maximum.as_ref().map(|c| &c.value)
    }

    pub fn min_length(&self) -> Option<u64> {
        self.constraints.min_length.as_ref().map(|c| c.value)
    }

    pub fn max_length(&self) -> Option<u64> {
        self.constraints.max_length.as_ref().map(|c| c.value)
    }

    /// Enumerated set of allowed values, if any
    pub fn one_of(&self) -> Option<&[Value]> {
        self.constraints.one_of.as_ref().map(|c| c.value.as_slice())
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref().map(|d| &d.value)
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    /// True when this node was merged over a base schema node
    pub fn is_based_on_schema(&self) -> bool {
        self.based_on_schema
    }

    /// True when this node was carried over from a base without being mentioned
    pub fn is_inherited(&self) -> bool {
        self.inherited
    }

    fn kind_overridden(&self) -> bool {
        match &self.kind {
            PropKind::Object(node) => node.is_local(),
            PropKind::Array(Some(items)) => !items.inherited,
            _ => false,
        }
    }

    /// True when anything on this node was declared locally
    pub fn has_overridden_attributes(&self) -> bool {
        self.constraints.has_local()
            || matches!(&self.default, Some(d) if !d.inherited)
            || self.kind_overridden()
    }

    // ---- Serialization ----

    /// Serialize back to JSON.
    ///
    /// `full` emits every resolved attribute. Otherwise only locally declared
    /// attributes are emitted, in the most compact form that parses back to
    /// the same node.
    pub fn to_json(&self, full: bool) -> Value {
        if !full && !self.has_overridden_attributes() {
            if self.based_on_schema {
                return Value::Object(Map::new());
            }
            return Value::String(self.value_type().as_str().to_string());
        }

        if !full && self.enum_shorthand_applies() {
            if let Some(list) = self.one_of() {
                return Value::Array(list.to_vec());
            }
        }

        let mut dict = Map::new();
        if full || !self.based_on_schema {
            dict.insert(
                keys::TYPE.to_string(),
                Value::String(self.value_type().as_str().to_string()),
            );
        }

        let keep = |inherited: bool| full || !inherited;
        if let Some(c) = self.constraints.minimum.as_ref().filter(|c| keep(c.inherited)) {
            dict.insert(keys::MINIMUM.to_string(), c.value.clone());
        }
        if let Some(c) = self.constraints.maximum.as_ref().filter(|c| keep(c.inherited)) {
            dict.insert(keys::MAXIMUM.to_string(), c.value.clone());
        }
        if let Some(c) = self.constraints.min_length.as_ref().filter(|c| keep(c.inherited)) {
            dict.insert(keys::MIN_LENGTH.to_string(), Value::from(c.value));
        }
        if let Some(c) = self.constraints.max_length.as_ref().filter(|c| keep(c.inherited)) {
            dict.insert(keys::MAX_LENGTH.to_string(), Value::from(c.value));
        }
        if let Some(c) = self.constraints.one_of.as_ref().filter(|c| keep(c.inherited)) {
            dict.insert(keys::ENUM.to_string(), Value::Array(c.value.clone()));
        }

        match &self.kind {
            PropKind::Object(node) => {
                let schema = &node.schema.value;
                if keep(node.schema.inherited) {
                    dict.insert(keys::PROPERTIES.to_string(), schema.to_json(full));
                }
                let extra = schema.extra_properties_allowed();
                if node.extra_declared || (full && extra) {
                    dict.insert(keys::ADDITIONAL_PROPERTIES.to_string(), Value::Bool(extra));
                }
                let required = schema.required_names();
                if node.required_declared || (full && !required.is_empty()) {
                    dict.insert(
                        keys::REQUIRED.to_string(),
                        Value::Array(required.into_iter().map(Value::String).collect()),
                    );
                }
            }
            PropKind::Array(Some(items)) if keep(items.inherited) => {
                dict.insert(keys::ITEMS.to_string(), items.value.to_json(full));
            }
            _ => {}
        }

        if let Some(d) = self.default.as_ref().filter(|d| keep(d.inherited)) {
            dict.insert(keys::DEFAULT.to_string(), d.value.clone());
        }

        Value::Object(dict)
    }

    /// A bare list parses back to this node only if nothing else is local and
    /// the list's first element (or the base) yields the same type.
    fn enum_shorthand_applies(&self) -> bool {
        if !self.constraints.only_local_is_one_of()
            || matches!(&self.default, Some(d) if !d.inherited)
            || self.kind_overridden()
        {
            return false;
        }
        if self.based_on_schema {
            return true;
        }
        let Some(list) = self.one_of() else {
            return false;
        };
        inference::detect_array_type(list, None, true)
            == Some(TypeSpec::of(self.value_type()))
    }

    // ---- Validation ----

    /// Validate a JSON value against this node's type and constraints.
    ///
    /// # Errors
    ///
    /// - `type_mismatch` if the value has the wrong JSON kind
    /// - `out_of_range` for bound, length or enumeration violations
    /// - `invalid_parameter_value` wrapping a failure inside an object or array
    /// - `parameter_missing` / `unexpected_parameter` for object members
    pub fn validate_value(&self, value: &Value) -> Result<()> {
        match &self.kind {
            PropKind::Boolean => {
                if !value.is_boolean() {
                    return Err(self.conversion_error(value));
                }
            }
            PropKind::Int => {
                let v = value.as_i64().ok_or_else(|| self.conversion_error(value))?;
                self.check_range(v as f64, value)?;
            }
            PropKind::Double => {
                let v = value.as_f64().ok_or_else(|| self.conversion_error(value))?;
                self.check_range(v, value)?;
            }
            PropKind::String => {
                let s = value.as_str().ok_or_else(|| self.conversion_error(value))?;
                self.check_length(s)?;
            }
            PropKind::Object(node) => {
                let map = value.as_object().ok_or_else(|| self.conversion_error(value))?;
                node.schema.value.validate_object(map)?;
            }
            PropKind::Array(items) => {
                let list = value.as_array().ok_or_else(|| self.conversion_error(value))?;
                if let Some(items) = items {
                    for (index, item) in list.iter().enumerate() {
                        items.value.validate_value(item).map_err(|e| {
                            e.wrap(
                                WeftErrorKind::InvalidPropValue,
                                format!("Invalid array element at index {}", index),
                            )
                        })?;
                    }
                }
            }
        }

        if let Some(allowed) = self.one_of() {
            if !allowed.iter().any(|a| json_values_equal(a, value)) {
                return Err(WeftError::new(WeftErrorKind::OutOfRange).with_message(format!(
                    "Value {} is invalid. Expected one of {}",
                    value,
                    Value::Array(allowed.to_vec())
                )));
            }
        }
        Ok(())
    }

    fn conversion_error(&self, value: &Value) -> WeftError {
        type_mismatch(format!(
            "Unable to convert value {} into {}",
            value,
            self.value_type()
        ))
    }

    fn check_range(&self, v: f64, raw: &Value) -> Result<()> {
        if let Some(min) = self.minimum().and_then(Value::as_f64) {
            if v < min {
                return Err(out_of_range(format!(
                    "Value {} is out of range. It must not be less than {}",
                    raw, min
                )));
            }
        }
        if let Some(max) = self.maximum().and_then(Value::as_f64) {
            if v > max {
                return Err(out_of_range(format!(
                    "Value {} is out of range. It must not be greater than {}",
                    raw, max
                )));
            }
        }
        Ok(())
    }

    fn check_length(&self, s: &str) -> Result<()> {
        let len = s.chars().count() as u64;
        if let Some(min) = self.min_length() {
            if len < min {
                return Err(out_of_range(format!(
                    "String '{}' is too short. Minimum length is {}",
                    s, min
                )));
            }
        }
        if let Some(max) = self.max_length() {
            if len > max {
                return Err(out_of_range(format!(
                    "String '{}' is too long. Maximum length is {}",
                    s, max
                )));
            }
        }
        Ok(())
    }
}

fn no_type_info() -> WeftError {
    WeftError::new(WeftErrorKind::NoTypeInfo).with_message("Unable to determine parameter type")
}

fn out_of_range(message: String) -> WeftError {
    WeftError::new(WeftErrorKind::OutOfRange).with_message(message)
}

fn parse_length(dict: &Map<String, Value>, key: &str) -> Result<Option<u64>> {
    match dict.get(key) {
        None => Ok(None),
        Some(raw) => raw.as_u64().map(Some).ok_or_else(|| {
            type_mismatch(format!(
                "Expected a non-negative integer for '{}', got {}",
                key, raw
            ))
        }),
    }
}

/// JSON equality where `1` and `1.0` are the same number
pub(crate) fn json_values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_i64(), y.as_i64()) {
            (Some(x), Some(y)) => x == y,
            _ => x.as_f64() == y.as_f64(),
        },
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(x, y)| json_values_equal(x, y))
        }
        (Value::Object(x), Value::Object(y)) => {
            x.len() == y.len()
                && x
                    .iter()
                    .all(|(k, v)| y.get(k).is_some_and(|w| json_values_equal(v, w)))
        }
        _ => a == b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bare_drops_constraints_but_keeps_items() {
        let prop = PropType::from_json(&json!({"items": {"maximum": 3}, "default": [1]}), None)
            .unwrap();
        let bare = prop.bare();
        assert!(bare.default_value().is_none());
        assert_eq!(bare.item_type().unwrap().maximum(), Some(&json!(3)));
    }

    #[test]
    fn test_json_values_equal_mixes_int_and_float() {
        assert!(json_values_equal(&json!(1), &json!(1.0)));
        assert!(json_values_equal(&json!([1, {"a": 2}]), &json!([1.0, {"a": 2}])));
        assert!(!json_values_equal(&json!("1"), &json!(1)));
    }

    #[test]
    fn test_mark_inherited_clears_local_attributes() {
        let mut prop = PropType::from_json(&json!({"minimum": 1, "default": 2}), None).unwrap();
        assert!(prop.has_overridden_attributes());
        prop.mark_inherited();
        assert!(!prop.has_overridden_attributes());
        assert_eq!(prop.to_json(false), json!({}));
        assert_eq!(
            prop.to_json(true),
            json!({"type": "integer", "minimum": 1, "default": 2})
        );
    }
}
