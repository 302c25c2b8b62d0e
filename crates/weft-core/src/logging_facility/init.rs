//! Subscriber installation for the embedding daemon

use serde::Deserialize;
use std::sync::Once;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// Output profile for the global subscriber
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Profile {
    /// Human-readable lines, debug level
    #[default]
    Development,
    /// JSON lines, info level
    Production,
    /// No output; tests install a capture layer with `init_test_capture()`
    Test,
}

impl Profile {
    /// Filter directive used when `RUST_LOG` is unset
    pub fn default_directive(self) -> &'static str {
        match self {
            Profile::Development => "weft_core=debug",
            Profile::Production | Profile::Test => "weft_core=info",
        }
    }

    fn filter(self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(self.default_directive()))
    }
}

static INIT_ONCE: Once = Once::new();

/// Install the global subscriber for `profile`.
///
/// Only the first call has any effect. If another global subscriber is
/// already installed it is left in place.
///
/// ```
/// use weft_core::logging_facility::{init, Profile};
///
/// init(Profile::Development);
/// ```
pub fn init(profile: Profile) {
    INIT_ONCE.call_once(|| {
        let installed = match profile {
            Profile::Development => tracing_subscriber::fmt()
                .with_env_filter(profile.filter())
                .try_init(),
            Profile::Production => tracing_subscriber::fmt()
                .json()
                .with_env_filter(profile.filter())
                .try_init(),
            Profile::Test => Ok(()),
        };
        if installed.is_err() {
            tracing::debug!(profile = ?profile, "global subscriber already installed");
        }
    });
}

/// [`init`] with the profile named in a loaded configuration
pub fn init_from_config(config: &LoggingConfig) {
    init(config.profile);
}
