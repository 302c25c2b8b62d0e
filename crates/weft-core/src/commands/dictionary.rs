use std::collections::{BTreeMap, BTreeSet};
use std::time::Instant;

use serde_json::{Map, Value};

use super::definition::CommandDefinition;
use super::user_role::UserRole;
use super::visibility::CommandVisibility;
use crate::errors::{json_kind_name, type_mismatch, Result, WeftError, WeftErrorKind};
use crate::logging_facility::elapsed_ms;
use crate::schema::ObjectSchema;
use crate::{log_op_end, log_op_error, log_op_start};

const KEY_PARAMETERS: &str = "parameters";
const KEY_PROGRESS: &str = "progress";
const KEY_RESULTS: &str = "results";
const KEY_VISIBILITY: &str = "visibility";
const KEY_MINIMAL_ROLE: &str = "minimalRole";

/// Catalog of command definitions keyed by `"package.name"`.
///
/// A dictionary may be loaded over a base dictionary (the standard command
/// set). Commands present in the base inherit its schemas and policy; packages
/// present in the base only accept new commands whose names start with `_`.
#[derive(Debug, Clone, Default)]
pub struct CommandDictionary {
    definitions: BTreeMap<String, CommandDefinition>,
}

impl CommandDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load `{package: {name: definition}}` into this dictionary.
    ///
    /// Either every command in `json` is added or none is.
    ///
    /// # Errors
    ///
    /// - `type_mismatch` if `json`, a package entry or a command entry is not an object
    /// - `invalid_command_name` for an empty name, or a new command in a base
    ///   package whose name does not start with `_`
    /// - `invalid_object_schema` wrapping any parameters/progress/results failure
    /// - `invalid_command_visibility` / `invalid_minimal_role` wrapping
    ///   `invalid_parameter_value`
    /// - `invariant_violation` if the command is already in this dictionary
    pub fn load_commands(&mut self, json: &Value, base: Option<&CommandDictionary>) -> Result<()> {
        log_op_start!("load_commands", has_base = base.is_some());
        let start = Instant::now();

        let staged = self.stage_commands(json, base).map_err(|e| {
            log_op_error!("load_commands", &e, duration_ms = elapsed_ms(start));
            e
        })?;

        let count = staged.len();
        self.definitions.extend(staged);

        log_op_end!(
            "load_commands",
            duration_ms = elapsed_ms(start),
            command_count = count
        );
        Ok(())
    }

    fn stage_commands(
        &self,
        json: &Value,
        base: Option<&CommandDictionary>,
    ) -> Result<BTreeMap<String, CommandDefinition>> {
        let packages = json.as_object().ok_or_else(|| {
            type_mismatch(format!(
                "Expected an object of command packages, got {}",
                json_kind_name(json)
            ))
        })?;

        let base_packages = base.map(CommandDictionary::packages).unwrap_or_default();
        let mut staged = BTreeMap::new();

        for (package, commands) in packages {
            let commands = commands.as_object().ok_or_else(|| {
                type_mismatch(format!(
                    "Expected an object of commands, got {}",
                    json_kind_name(commands)
                ))
                .with_package(package.clone())
            })?;

            for (name, definition) in commands {
                let full_name = format!("{}.{}", package, name);
                let command = self
                    .build_command(package, name, definition, base, &base_packages)
                    .map_err(|e| e.with_package(package.clone()).with_command(name.clone()))?;

                if self.definitions.contains_key(&full_name) || staged.contains_key(&full_name) {
                    return Err(WeftError::new(WeftErrorKind::InvariantViolation)
                        .with_package(package.clone())
                        .with_command(name.clone())
                        .with_message(format!(
                            "Definition for command '{}' overrides an earlier definition",
                            full_name
                        )));
                }
                tracing::debug!(command = %full_name, "staged command definition");
                staged.insert(full_name, command);
            }
        }
        Ok(staged)
    }

    fn build_command(
        &self,
        package: &str,
        name: &str,
        definition: &Value,
        base: Option<&CommandDictionary>,
        base_packages: &BTreeSet<String>,
    ) -> Result<CommandDefinition> {
        let definition = definition.as_object().ok_or_else(|| {
            type_mismatch(format!(
                "Expected an object for command definition, got {}",
                json_kind_name(definition)
            ))
        })?;

        if name.is_empty() {
            return Err(WeftError::new(WeftErrorKind::InvalidCommandName)
                .with_message(format!("Unnamed command encountered in package '{}'", package)));
        }

        let base_def = base.and_then(|b| b.find_command(&format!("{}.{}", package, name)));
        if base_def.is_none() && base_packages.contains(package) && !name.starts_with('_') {
            return Err(WeftError::new(WeftErrorKind::InvalidCommandName).with_message(format!(
                "The name of custom command '{}' in standard package '{}' must start with '_'",
                name, package
            )));
        }

        let parameters = build_schema(definition, KEY_PARAMETERS, base_def.map(|d| d.parameters()))?;
        let progress = build_schema(definition, KEY_PROGRESS, base_def.map(|d| d.progress()))?;
        let results = build_schema(definition, KEY_RESULTS, base_def.map(|d| d.results()))?;

        let visibility = match definition.get(KEY_VISIBILITY) {
            Some(raw) => parse_token::<CommandVisibility>(raw).map_err(|e| {
                e.wrap(
                    WeftErrorKind::InvalidCommandVisibility,
                    "Error parsing command visibility",
                )
            })?,
            None => base_def
                .map(CommandDefinition::visibility)
                .unwrap_or_default(),
        };

        let minimal_role = match definition.get(KEY_MINIMAL_ROLE) {
            Some(raw) => parse_token::<UserRole>(raw).map_err(|e| {
                e.wrap(WeftErrorKind::InvalidMinimalRole, "Invalid minimal user role")
            })?,
            None => base_def
                .map(CommandDefinition::minimal_role)
                .unwrap_or_default(),
        };

        Ok(
            CommandDefinition::new(package, name, parameters, progress, results)
                .with_visibility(visibility)
                .with_minimal_role(minimal_role),
        )
    }

    /// Look up a command by `"package.name"`
    pub fn find_command(&self, full_name: &str) -> Option<&CommandDefinition> {
        self.definitions.get(full_name)
    }

    /// Total number of commands
    pub fn get_size(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    pub fn clear(&mut self) {
        self.definitions.clear();
    }

    /// All `"package.name"` keys, sorted
    pub fn get_command_names(&self) -> Vec<String> {
        self.definitions.keys().cloned().collect()
    }

    /// Names of every package that has at least one command
    pub fn packages(&self) -> BTreeSet<String> {
        self.definitions
            .values()
            .map(|d| d.package().to_string())
            .collect()
    }

    /// Export the commands accepted by `filter` as
    /// `{package: {name: {"parameters": .., "minimalRole": ..}}}`.
    ///
    /// With `full` the parameters carry every inherited constraint; otherwise
    /// only what this dictionary declared itself.
    pub fn get_commands_as_json<F>(&self, filter: F, full: bool) -> Value
    where
        F: Fn(&CommandDefinition) -> bool,
    {
        let mut packages = Map::new();
        for definition in self.definitions.values().filter(|d| filter(*d)) {
            let mut command = Map::new();
            command.insert(
                KEY_PARAMETERS.to_string(),
                definition.parameters().to_json(full),
            );
            command.insert(
                KEY_MINIMAL_ROLE.to_string(),
                Value::String(definition.minimal_role().to_string()),
            );

            let package = packages
                .entry(definition.package().to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if let Value::Object(package) = package {
                package.insert(definition.name().to_string(), Value::Object(command));
            }
        }
        Value::Object(packages)
    }
}

fn build_schema(
    definition: &Map<String, Value>,
    key: &str,
    base: Option<&ObjectSchema>,
) -> Result<ObjectSchema> {
    let dict = match definition.get(key) {
        None => return Ok(base.map(ObjectSchema::to_inherited).unwrap_or_default()),
        Some(Value::Object(dict)) => dict,
        Some(other) => {
            return Err(type_mismatch(format!(
                "Expected an object for '{}', got {}",
                key,
                json_kind_name(other)
            ))
            .wrap(
                WeftErrorKind::InvalidObjectSchema,
                format!("Invalid definition for command {}", key),
            ))
        }
    };
    ObjectSchema::from_json(dict, base).map_err(|e| {
        e.wrap(
            WeftErrorKind::InvalidObjectSchema,
            format!("Invalid definition for command {}", key),
        )
    })
}

fn parse_token<T>(raw: &Value) -> Result<T>
where
    T: std::str::FromStr<Err = WeftError>,
{
    let token = raw.as_str().ok_or_else(|| {
        WeftError::new(WeftErrorKind::InvalidPropValue)
            .with_message(format!("Expected a string, got {}", json_kind_name(raw)))
    })?;
    token.parse()
}
