use serde_json::{Map, Value};

use crate::errors::{Result, WeftError, WeftErrorKind};
use crate::schema::ObjectSchema;

/// Schema and current values of one state package.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatePackage {
    name: String,
    types: ObjectSchema,
    values: Map<String, Value>,
}

impl StatePackage {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            types: ObjectSchema::new(),
            values: Map::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn types(&self) -> &ObjectSchema {
        &self.types
    }

    /// Merge `{property: definition}` into this package's schema.
    ///
    /// A property may be redefined with the same type; its stored value is
    /// dropped if it no longer validates.
    ///
    /// # Errors
    ///
    /// `invalid_parameter_definition` for an unparsable definition or, wrapping
    /// `param_type_changed`, for a redefinition with a different type.
    pub fn add_schema_from_json(&mut self, dict: &Map<String, Value>) -> Result<()> {
        let parsed = ObjectSchema::from_json(dict, None)?;

        for (name, prop) in parsed.props() {
            if let Some(existing) = self.types.get_prop(name) {
                if existing.value_type() != prop.value_type() {
                    return Err(WeftError::new(WeftErrorKind::ParamTypeChanged)
                        .with_message(format!(
                            "Redefining a property of type {} as {}",
                            existing.value_type(),
                            prop.value_type()
                        ))
                        .wrap(
                            WeftErrorKind::InvalidPropDef,
                            format!("Error in definition of property '{}'", name),
                        )
                        .with_property(name.clone()));
                }
            }
        }

        for (name, prop) in parsed.props() {
            let stale = self
                .values
                .get(name)
                .is_some_and(|v| prop.validate_value(v).is_err());
            if stale {
                tracing::debug!(package = %self.name, property = %name, "dropping value that no longer validates");
                self.values.remove(name);
            }
            self.types.add_prop(name.clone(), prop.clone());
        }
        Ok(())
    }

    /// Check `value` against the definition of `property`.
    ///
    /// # Errors
    ///
    /// `property_not_defined` for an undeclared property; otherwise the
    /// validation failure wrapped in `invalid_parameter_value`.
    pub fn validate_property_value(&self, property: &str, value: &Value) -> Result<()> {
        let prop = self.types.get_prop(property).ok_or_else(|| {
            WeftError::new(WeftErrorKind::PropertyNotDefined)
                .with_package(self.name.clone())
                .with_property(property)
                .with_message(format!(
                    "State property '{}.{}' is not defined",
                    self.name, property
                ))
        })?;
        prop.validate_value(value).map_err(|e| {
            e.wrap(
                WeftErrorKind::InvalidPropValue,
                format!("Invalid value for property '{}'", property),
            )
            .with_package(self.name.clone())
            .with_property(property)
        })
    }

    /// Validate and store a single value
    ///
    /// # Errors
    ///
    /// See [`StatePackage::validate_property_value`].
    pub fn set_property_value(&mut self, property: &str, value: Value) -> Result<()> {
        self.validate_property_value(property, &value)?;
        self.values.insert(property.to_string(), value);
        Ok(())
    }

    /// Validate every entry of `{property: value}`, then store them all
    ///
    /// # Errors
    ///
    /// See [`StatePackage::validate_property_value`]. Nothing is stored on error.
    pub fn add_values_from_json(&mut self, dict: &Map<String, Value>) -> Result<()> {
        for (property, value) in dict {
            self.validate_property_value(property, value)?;
        }
        for (property, value) in dict {
            self.values.insert(property.clone(), value.clone());
        }
        Ok(())
    }

    pub fn get_property_value(&self, property: &str) -> Option<&Value> {
        self.values.get(property)
    }

    /// Current values as `{property: value}`
    pub fn get_values_as_json(&self) -> Value {
        Value::Object(self.values.clone())
    }
}
