use super::user_role::UserRole;
use super::visibility::CommandVisibility;
use crate::schema::ObjectSchema;

/// A validated command: its three schemas plus access policy.
///
/// Definitions are built once by [`CommandDictionary::load_commands`] and
/// never mutated afterwards.
///
/// [`CommandDictionary::load_commands`]: super::CommandDictionary::load_commands
#[derive(Debug, Clone, PartialEq)]
pub struct CommandDefinition {
    package: String,
    name: String,
    parameters: ObjectSchema,
    progress: ObjectSchema,
    results: ObjectSchema,
    visibility: CommandVisibility,
    minimal_role: UserRole,
}

impl CommandDefinition {
    pub fn new(
        package: impl Into<String>,
        name: impl Into<String>,
        parameters: ObjectSchema,
        progress: ObjectSchema,
        results: ObjectSchema,
    ) -> Self {
        Self {
            package: package.into(),
            name: name.into(),
            parameters,
            progress,
            results,
            visibility: CommandVisibility::default(),
            minimal_role: UserRole::default(),
        }
    }

    pub fn with_visibility(mut self, visibility: CommandVisibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn with_minimal_role(mut self, role: UserRole) -> Self {
        self.minimal_role = role;
        self
    }

    pub fn package(&self) -> &str {
        &self.package
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// `"package.name"`, the key the dictionary stores this command under
    pub fn full_name(&self) -> String {
        format!("{}.{}", self.package, self.name)
    }

    pub fn parameters(&self) -> &ObjectSchema {
        &self.parameters
    }

    pub fn progress(&self) -> &ObjectSchema {
        &self.progress
    }

    pub fn results(&self) -> &ObjectSchema {
        &self.results
    }

    pub fn visibility(&self) -> CommandVisibility {
        self.visibility
    }

    pub fn minimal_role(&self) -> UserRole {
        self.minimal_role
    }
}
