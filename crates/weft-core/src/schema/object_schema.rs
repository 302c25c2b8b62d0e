use std::collections::BTreeMap;

use serde_json::{Map, Value};

use super::prop_type::PropType;
use crate::errors::{json_kind_name, type_mismatch, Result, WeftError, WeftErrorKind};

/// Named properties of an object, plus whether unknown keys are tolerated.
///
/// Properties are kept sorted by name so exports are deterministic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectSchema {
    properties: BTreeMap<String, PropType>,
    extra_properties_allowed: bool,
}

impl ObjectSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a property definition
    pub fn add_prop(&mut self, name: impl Into<String>, prop: PropType) {
        self.properties.insert(name.into(), prop);
    }

    pub fn get_prop(&self, name: &str) -> Option<&PropType> {
        self.properties.get(name)
    }

    pub fn props(&self) -> &BTreeMap<String, PropType> {
        &self.properties
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    pub fn extra_properties_allowed(&self) -> bool {
        self.extra_properties_allowed
    }

    pub fn set_extra_properties_allowed(&mut self, allowed: bool) {
        self.extra_properties_allowed = allowed;
    }

    /// Flag an existing property as required.
    ///
    /// # Errors
    ///
    /// `unknown_property` if `name` is not defined in this schema.
    pub fn mark_prop_required(&mut self, name: &str) -> Result<()> {
        let prop = self.properties.get_mut(name).ok_or_else(|| {
            WeftError::new(WeftErrorKind::UnknownProperty)
                .with_property(name)
                .with_message(format!("Unknown property '{}'", name))
        })?;
        prop.set_required(true);
        Ok(())
    }

    /// Names of required properties, sorted
    pub fn required_names(&self) -> Vec<String> {
        self.properties
            .iter()
            .filter(|(_, p)| p.is_required())
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// A copy whose every property is marked as carried over from a base,
    /// for reuse when a definition leaves a schema out entirely
    pub fn to_inherited(&self) -> ObjectSchema {
        let mut schema = self.clone();
        for prop in schema.properties.values_mut() {
            prop.mark_inherited();
        }
        schema
    }

    /// Parse `{name: definition}`, merging each property over the same-named
    /// property of `base`.
    ///
    /// The result holds exactly the properties named in `dict`; base
    /// properties that are not mentioned are dropped.
    ///
    /// # Errors
    ///
    /// `invalid_parameter_definition` naming the first property that failed to
    /// parse, wrapping the underlying cause.
    pub fn from_json(dict: &Map<String, Value>, base: Option<&ObjectSchema>) -> Result<ObjectSchema> {
        let mut schema = ObjectSchema::new();
        for (name, definition) in dict {
            let base_prop = base.and_then(|b| b.get_prop(name));
            let prop = PropType::from_json(definition, base_prop).map_err(|e| {
                e.wrap(
                    WeftErrorKind::InvalidPropDef,
                    format!("Error in definition of property '{}'", name),
                )
                .with_property(name.clone())
            })?;
            schema.properties.insert(name.clone(), prop);
        }
        Ok(schema)
    }

    /// Like [`ObjectSchema::from_json`] for an arbitrary JSON value.
    ///
    /// # Errors
    ///
    /// `type_mismatch` if `value` is not a JSON object.
    pub fn from_json_value(value: &Value, base: Option<&ObjectSchema>) -> Result<ObjectSchema> {
        let dict = value.as_object().ok_or_else(|| {
            type_mismatch(format!(
                "Expected an object schema, got {}",
                json_kind_name(value)
            ))
        })?;
        Self::from_json(dict, base)
    }

    /// Serialize as `{name: definition}`.
    ///
    /// In diff mode, properties carried over untouched from a base are left out.
    pub fn to_json(&self, full: bool) -> Value {
        let dict = self
            .properties
            .iter()
            .filter(|(_, p)| full || !p.is_inherited())
            .map(|(name, p)| (name.clone(), p.to_json(full)))
            .collect::<Map<_, _>>();
        Value::Object(dict)
    }

    /// Validate an object value against this schema.
    ///
    /// # Errors
    ///
    /// - `invalid_parameter_value` wrapping the failure of a named member
    /// - `unexpected_parameter` for a key with no definition when extras are not allowed
    /// - `parameter_missing` for a required member with no value and no default
    pub fn validate_object(&self, value: &Map<String, Value>) -> Result<()> {
        for (name, member) in value {
            match self.properties.get(name) {
                Some(prop) => prop.validate_value(member).map_err(|e| {
                    e.wrap(
                        WeftErrorKind::InvalidPropValue,
                        format!("Invalid value for property '{}'", name),
                    )
                    .with_property(name.clone())
                })?,
                None if self.extra_properties_allowed => {}
                None => {
                    return Err(WeftError::new(WeftErrorKind::UnexpectedProperty)
                        .with_property(name.clone())
                        .with_message(format!("Unexpected parameter '{}'", name)))
                }
            }
        }

        for (name, prop) in &self.properties {
            if prop.is_required() && prop.default_value().is_none() && !value.contains_key(name) {
                return Err(WeftError::new(WeftErrorKind::PropertyMissing)
                    .with_property(name.clone())
                    .with_message(format!("Required parameter missing: {}", name)));
            }
        }
        Ok(())
    }
}
