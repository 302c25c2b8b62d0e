use std::collections::BTreeMap;
use std::fmt;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use weft_core_types::UpdateId;

use super::state_change_queue::{StateChange, StateChangeQueue};
use super::state_package::StatePackage;
use crate::config::StateConfig;
use crate::errors::{json_kind_name, type_mismatch, Result, WeftError, WeftErrorKind};
use crate::logging_facility::elapsed_ms;
use crate::{log_op_end, log_op_error, log_op_start};

/// Callback invoked after every successful state mutation
pub type StateChangedCallback = Box<dyn Fn() + Send + Sync>;

/// Package-scoped device state with a drainable change log.
///
/// Property names are addressed as `"package.property"`. Every successful
/// mutation call records exactly one [`StateChange`] and notifies every
/// observer exactly once. Properties must be declared before they can be set.
pub struct StateManager {
    packages: BTreeMap<String, StatePackage>,
    queue: StateChangeQueue,
    on_changed: Vec<StateChangedCallback>,
}

impl StateManager {
    pub fn new() -> Self {
        Self::with_config(&StateConfig::default())
    }

    pub fn with_config(config: &StateConfig) -> Self {
        Self {
            packages: BTreeMap::new(),
            queue: StateChangeQueue::new(config.max_queue_size),
            on_changed: Vec::new(),
        }
    }

    /// Register an observer.
    ///
    /// The callback runs once right away so it can pick up the current state,
    /// then once per successful mutation call.
    pub fn add_on_state_changed_callback<F>(&mut self, callback: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        callback();
        self.on_changed.push(Box::new(callback));
    }

    /// Register a callback for server acknowledgements
    pub fn add_on_state_updated_callback<F>(&mut self, callback: F)
    where
        F: Fn(UpdateId) + Send + Sync + 'static,
    {
        self.queue.add_on_state_updated_callback(callback);
    }

    /// Merge `{package: {property: definition}}` into the schema.
    ///
    /// The schema is unchanged if any package fails.
    ///
    /// # Errors
    ///
    /// - `type_mismatch` if `json` or a package entry is not an object
    /// - `invalid_package` for an empty package name
    /// - `invalid_parameter_definition` for a bad or type-changing property
    pub fn load_state_definition(&mut self, json: &Value) -> Result<()> {
        log_op_start!("load_state_definition");
        let start = Instant::now();

        let result = self.stage_definition(json).map(|staged| {
            let count = staged.len();
            self.packages.extend(staged);
            count
        });

        match result {
            Ok(count) => {
                log_op_end!(
                    "load_state_definition",
                    duration_ms = elapsed_ms(start),
                    package_count = count
                );
                Ok(())
            }
            Err(e) => {
                log_op_error!("load_state_definition", &e, duration_ms = elapsed_ms(start));
                Err(e)
            }
        }
    }

    fn stage_definition(&self, json: &Value) -> Result<BTreeMap<String, StatePackage>> {
        let packages = as_package_map(json)?;
        let mut staged = BTreeMap::new();
        for (name, dict) in packages {
            check_package_name(name)?;
            let dict = as_package_entry(name, dict)?;
            let mut package = self
                .packages
                .get(name)
                .cloned()
                .unwrap_or_else(|| StatePackage::new(name.clone()));
            package
                .add_schema_from_json(dict)
                .map_err(|e| e.with_package(name.clone()))?;
            staged.insert(name.clone(), package);
        }
        Ok(staged)
    }

    /// Assign initial values `{package: {property: value}}`.
    ///
    /// Values are validated but no change is recorded and no observer runs.
    ///
    /// # Errors
    ///
    /// - `type_mismatch` if `json` or a package entry is not an object
    /// - `invalid_package` for an empty package name
    /// - `property_not_defined` for an unknown package or property
    /// - `invalid_parameter_value` for a value that fails validation
    pub fn load_state_defaults(&mut self, json: &Value) -> Result<()> {
        log_op_start!("load_state_defaults");
        let start = Instant::now();

        let result = self.stage_values(json).map(|staged| {
            self.packages.extend(staged);
        });

        match &result {
            Ok(()) => {
                log_op_end!("load_state_defaults", duration_ms = elapsed_ms(start));
            }
            Err(e) => {
                log_op_error!("load_state_defaults", e, duration_ms = elapsed_ms(start));
            }
        }
        result
    }

    fn stage_values(&self, json: &Value) -> Result<BTreeMap<String, StatePackage>> {
        let packages = as_package_map(json)?;
        let mut staged = BTreeMap::new();
        for (name, dict) in packages {
            check_package_name(name)?;
            let dict = as_package_entry(name, dict)?;
            let mut package = self.find_package(name)?.clone();
            package.add_values_from_json(dict)?;
            staged.insert(name.clone(), package);
        }
        Ok(staged)
    }

    /// Current values of every package; packages without values appear as `{}`
    pub fn get_state(&self) -> Value {
        let state = self
            .packages
            .iter()
            .map(|(name, package)| (name.clone(), package.get_values_as_json()))
            .collect::<Map<_, _>>();
        Value::Object(state)
    }

    /// Value of `"package.property"`, if one has been set
    pub fn get_property(&self, name: &str) -> Option<&Value> {
        let (package, property) = name.split_once('.')?;
        self.packages.get(package)?.get_property_value(property)
    }

    /// Set a single property.
    ///
    /// # Errors
    ///
    /// - `property_name_missing` for an empty name or empty property part
    /// - `package_name_missing` when the name has no `package.` prefix
    /// - `property_not_defined` for an unknown package or property
    /// - `invalid_parameter_value` for a value that fails validation
    pub fn set_property_value(
        &mut self,
        name: &str,
        value: Value,
        timestamp: DateTime<Utc>,
    ) -> Result<()> {
        log_op_start!("set_property_value", property = name);
        let start = Instant::now();

        let result = parse_property_name(name).and_then(|(package, property)| {
            let mut props = Map::new();
            props.insert(property.to_string(), value);
            let mut patch = BTreeMap::new();
            patch.insert(package.to_string(), props);
            self.apply_patch(patch, timestamp)
        });

        match &result {
            Ok(()) => {
                log_op_end!("set_property_value", duration_ms = elapsed_ms(start));
            }
            Err(e) => {
                log_op_error!("set_property_value", e, duration_ms = elapsed_ms(start));
            }
        }
        result
    }

    /// Set several properties from `{package: {property: value}}` as one change.
    ///
    /// Nothing is applied unless every value validates. An input with no
    /// properties records nothing.
    ///
    /// # Errors
    ///
    /// - `type_mismatch` if `json` or a package entry is not an object
    /// - `property_not_defined` for an unknown package or property
    /// - `invalid_parameter_value` for a value that fails validation
    pub fn set_properties(&mut self, json: &Value, timestamp: DateTime<Utc>) -> Result<()> {
        log_op_start!("set_properties");
        let start = Instant::now();

        let result = as_package_map(json).and_then(|packages| {
            let mut patch = BTreeMap::new();
            for (name, dict) in packages {
                let dict = as_package_entry(name, dict)?;
                if !dict.is_empty() {
                    patch.insert(name.clone(), dict.clone());
                }
            }
            self.apply_patch(patch, timestamp)
        });

        match &result {
            Ok(()) => {
                log_op_end!("set_properties", duration_ms = elapsed_ms(start));
            }
            Err(e) => {
                log_op_error!("set_properties", e, duration_ms = elapsed_ms(start));
            }
        }
        result
    }

    fn apply_patch(
        &mut self,
        patch: BTreeMap<String, Map<String, Value>>,
        timestamp: DateTime<Utc>,
    ) -> Result<()> {
        if patch.is_empty() {
            return Ok(());
        }

        for (package, props) in &patch {
            let state_package = self.find_package(package)?;
            for (property, value) in props {
                state_package.validate_property_value(property, value)?;
            }
        }

        let mut changed = Map::new();
        for (package, props) in patch {
            if let Some(state_package) = self.packages.get_mut(&package) {
                for (property, value) in &props {
                    state_package.set_property_value(property, value.clone())?;
                }
            }
            changed.insert(package, Value::Object(props));
        }

        self.queue
            .notify_properties_updated(timestamp, Value::Object(changed));
        for callback in &self.on_changed {
            callback();
        }
        Ok(())
    }

    fn find_package(&self, name: &str) -> Result<&StatePackage> {
        self.packages.get(name).ok_or_else(|| {
            WeftError::new(WeftErrorKind::PropertyNotDefined)
                .with_package(name)
                .with_message(format!("Unknown state property package '{}'", name))
        })
    }

    /// Drain the change log.
    ///
    /// Returns the id of the last recorded change together with every change
    /// recorded since the previous drain, oldest first.
    pub fn get_and_clear_recorded_state_changes(&mut self) -> (UpdateId, Vec<StateChange>) {
        log_op_start!("get_and_clear_recorded_state_changes");
        let start = Instant::now();

        let changes = self.queue.get_and_clear_recorded_state_changes();
        let update_id = self.queue.last_state_change_id();

        log_op_end!(
            "get_and_clear_recorded_state_changes",
            duration_ms = elapsed_ms(start),
            change_count = changes.len(),
            update_id = update_id.get()
        );
        (update_id, changes)
    }

    /// Tell acknowledgement observers the server has caught up to `update_id`
    pub fn notify_state_updated_on_server(&self, update_id: UpdateId) {
        tracing::debug!(update_id = update_id.get(), "state acknowledged by server");
        self.queue.notify_state_updated_on_server(update_id);
    }

    /// Id of the most recently recorded change
    pub fn last_state_change_id(&self) -> UpdateId {
        self.queue.last_state_change_id()
    }

    /// Fully resolved schema of every package
    pub fn get_state_definition_json(&self) -> Value {
        let defs = self
            .packages
            .iter()
            .map(|(name, package)| (name.clone(), package.types().to_json(true)))
            .collect::<Map<_, _>>();
        Value::Object(defs)
    }

    pub fn package(&self, name: &str) -> Option<&StatePackage> {
        self.packages.get(name)
    }
}

impl Default for StateManager {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for StateManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateManager")
            .field("packages", &self.packages)
            .field("queue", &self.queue)
            .field("on_changed", &self.on_changed.len())
            .finish()
    }
}

/// Split `"package.property"`
fn parse_property_name(name: &str) -> Result<(&str, &str)> {
    if name.is_empty() {
        return Err(WeftError::new(WeftErrorKind::PropertyNameMissing)
            .with_message("State property name not specified"));
    }
    let Some((package, property)) = name.split_once('.') else {
        return Err(WeftError::new(WeftErrorKind::PackageNameMissing)
            .with_property(name)
            .with_message(format!("Package name is missing in the property name '{}'", name)));
    };
    if package.is_empty() {
        return Err(WeftError::new(WeftErrorKind::PackageNameMissing)
            .with_property(name)
            .with_message(format!("Package name is missing in the property name '{}'", name)));
    }
    if property.is_empty() {
        return Err(WeftError::new(WeftErrorKind::PropertyNameMissing)
            .with_package(package)
            .with_message(format!("State property name not specified in '{}'", name)));
    }
    Ok((package, property))
}

fn check_package_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(WeftError::new(WeftErrorKind::InvalidPackage)
            .with_message("State package name is empty"));
    }
    Ok(())
}

fn as_package_map(json: &Value) -> Result<&Map<String, Value>> {
    json.as_object().ok_or_else(|| {
        type_mismatch(format!(
            "Expected an object of state packages, got {}",
            json_kind_name(json)
        ))
    })
}

fn as_package_entry<'a>(name: &str, dict: &'a Value) -> Result<&'a Map<String, Value>> {
    dict.as_object().ok_or_else(|| {
        type_mismatch(format!(
            "Expected an object for state package, got {}",
            json_kind_name(dict)
        ))
        .with_package(name)
    })
}
