//! Runtime configuration
//!
//! Every field has a default, so an empty document is a valid configuration.
//!
//! ```toml
//! [state]
//! max_queue_size = 100
//!
//! [logging]
//! profile = "production"
//! ```

use serde::Deserialize;
use thiserror::Error;

use crate::logging_facility::Profile;
use crate::states::DEFAULT_MAX_QUEUE_SIZE;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not parse config TOML: {0}")]
    ParseToml(#[from] toml::de::Error),
    #[error("could not parse config JSON: {0}")]
    ParseJson(#[from] serde_json::Error),
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WeftConfig {
    pub state: StateConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StateConfig {
    /// Bound on undrained state changes; older changes are merged beyond it
    pub max_queue_size: usize,
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            max_queue_size: DEFAULT_MAX_QUEUE_SIZE,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    pub profile: Profile,
}

impl WeftConfig {
    /// Parse a TOML document.
    ///
    /// # Errors
    ///
    /// `ConfigError::ParseToml` for malformed TOML or unknown keys,
    /// `ConfigError::InvalidValue` for out-of-range settings.
    pub fn from_toml_str(raw: &str) -> Result<WeftConfig, ConfigError> {
        let config: WeftConfig = toml::from_str(raw)?;
        config.validate()
    }

    /// Build from an already parsed JSON value.
    ///
    /// # Errors
    ///
    /// `ConfigError::ParseJson` for a value of the wrong shape,
    /// `ConfigError::InvalidValue` for out-of-range settings.
    pub fn from_json_value(value: &serde_json::Value) -> Result<WeftConfig, ConfigError> {
        let config = WeftConfig::deserialize(value)?;
        config.validate()
    }

    fn validate(self) -> Result<WeftConfig, ConfigError> {
        if self.state.max_queue_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "state.max_queue_size",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_is_default() {
        assert_eq!(WeftConfig::from_toml_str("").unwrap(), WeftConfig::default());
    }

    #[test]
    fn test_zero_queue_size_rejected() {
        let err = WeftConfig::from_toml_str("[state]\nmax_queue_size = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }
}
