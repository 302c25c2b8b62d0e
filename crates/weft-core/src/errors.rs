/// Result type alias using WeftError
pub type Result<T> = std::result::Result<T, WeftError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Every failure reported by the type engine, the command dictionary and the
/// state manager is classified by one of these kinds. Each kind maps to a
/// stable code that callers (and the cloud/local sync layers) match on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WeftErrorKind {
    // JSON shape
    TypeMismatch,

    // Schema definition
    UnknownType,
    NoTypeInfo,
    InvalidObjectSchema,
    InvalidPropDef,
    ParamTypeChanged,
    UnknownProperty,

    // Value validation
    InvalidPropValue,
    OutOfRange,
    PropertyMissing,
    UnexpectedProperty,

    // Command dictionary
    InvalidCommandName,
    InvalidCommandVisibility,
    InvalidMinimalRole,
    /// A command definition replaced one already present in the dictionary
    InvariantViolation,

    // State manager
    PropertyNameMissing,
    PackageNameMissing,
    PropertyNotDefined,
    InvalidPackage,
}

impl WeftErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            WeftErrorKind::TypeMismatch => "type_mismatch",
            WeftErrorKind::UnknownType => "unknown_type",
            WeftErrorKind::NoTypeInfo => "no_type_info",
            WeftErrorKind::InvalidObjectSchema => "invalid_object_schema",
            WeftErrorKind::InvalidPropDef => "invalid_parameter_definition",
            WeftErrorKind::ParamTypeChanged => "param_type_changed",
            WeftErrorKind::UnknownProperty => "unknown_property",
            WeftErrorKind::InvalidPropValue => "invalid_parameter_value",
            WeftErrorKind::OutOfRange => "out_of_range",
            WeftErrorKind::PropertyMissing => "parameter_missing",
            WeftErrorKind::UnexpectedProperty => "unexpected_parameter",
            WeftErrorKind::InvalidCommandName => "invalid_command_name",
            WeftErrorKind::InvalidCommandVisibility => "invalid_command_visibility",
            WeftErrorKind::InvalidMinimalRole => "invalid_minimal_role",
            WeftErrorKind::InvariantViolation => "invariant_violation",
            WeftErrorKind::PropertyNameMissing => "property_name_missing",
            WeftErrorKind::PackageNameMissing => "package_name_missing",
            WeftErrorKind::PropertyNotDefined => "property_not_defined",
            WeftErrorKind::InvalidPackage => "invalid_package",
        }
    }
}

impl std::fmt::Display for WeftErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Canonical structured error type
///
/// Errors form a chain: the outermost error classifies the failure
/// ("the schema is invalid") and each inner error narrows it down
/// ("property 'delay' is invalid" → "its type changed from integer to string").
#[derive(Debug, Clone, PartialEq)]
pub struct WeftError {
    kind: WeftErrorKind,
    package: Option<String>,
    command: Option<String>,
    property: Option<String>,
    message: String,
    source: Option<Box<WeftError>>,
}

impl WeftError {
    /// Create a new error with the specified kind
    pub fn new(kind: WeftErrorKind) -> Self {
        Self {
            kind,
            package: None,
            command: None,
            property: None,
            message: String::new(),
            source: None,
        }
    }

    /// Add package context
    pub fn with_package(mut self, package: impl Into<String>) -> Self {
        self.package = Some(package.into());
        self
    }

    /// Add command name context
    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = Some(command.into());
        self
    }

    /// Add property name context
    pub fn with_property(mut self, property: impl Into<String>) -> Self {
        self.property = Some(property.into());
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add source error
    pub fn with_source(mut self, source: WeftError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Wrap `self` as the inner cause of a new error of `kind`
    pub fn wrap(self, kind: WeftErrorKind, message: impl Into<String>) -> WeftError {
        WeftError::new(kind).with_message(message).with_source(self)
    }

    /// Get the error kind
    pub fn kind(&self) -> WeftErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Get the package context, if any
    pub fn package(&self) -> Option<&str> {
        self.package.as_deref()
    }

    /// Get the command name context, if any
    pub fn command(&self) -> Option<&str> {
        self.command.as_deref()
    }

    /// Get the property name context, if any
    pub fn property(&self) -> Option<&str> {
        self.property.as_deref()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the directly wrapped error, if any
    pub fn inner(&self) -> Option<&WeftError> {
        self.source.as_deref()
    }

    /// Get the innermost error of the chain (the root cause)
    ///
    /// Returns `self` when nothing is wrapped.
    pub fn first_error(&self) -> &WeftError {
        let mut current = self;
        while let Some(inner) = current.inner() {
            current = inner;
        }
        current
    }

    /// Iterate the chain from this error down to the root cause
    pub fn chain(&self) -> impl Iterator<Item = &WeftError> {
        std::iter::successors(Some(self), |e| e.inner())
    }

    /// Check whether any error in the chain has the given kind
    pub fn has_kind(&self, kind: WeftErrorKind) -> bool {
        self.chain().any(|e| e.kind == kind)
    }

    /// True for errors signalling a defect in the loaded definitions rather
    /// than bad runtime input (command redefinition).
    pub fn is_invariant_violation(&self) -> bool {
        self.kind == WeftErrorKind::InvariantViolation
    }
}

impl std::fmt::Display for WeftError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if !self.message.is_empty() {
            write!(f, " {}", self.message)?;
        }
        if let Some(package) = &self.package {
            write!(f, " (package: {})", package)?;
        }
        if let Some(command) = &self.command {
            write!(f, " (command: {})", command)?;
        }
        if let Some(property) = &self.property {
            write!(f, " (property: {})", property)?;
        }
        Ok(())
    }
}

impl std::error::Error for WeftError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

// ========== End Error Facility ==========

/// Shorthand for `type_mismatch`, the error for any JSON value of the wrong kind
pub(crate) fn type_mismatch(message: impl Into<String>) -> WeftError {
    WeftError::new(WeftErrorKind::TypeMismatch).with_message(message)
}

/// Human readable name of a JSON value's kind, used in error messages
pub(crate) fn json_kind_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "Null",
        serde_json::Value::Bool(_) => "Boolean",
        serde_json::Value::Number(n) if n.is_f64() => "Double",
        serde_json::Value::Number(_) => "Integer",
        serde_json::Value::String(_) => "String",
        serde_json::Value::Array(_) => "Array",
        serde_json::Value::Object(_) => "Object",
    }
}
