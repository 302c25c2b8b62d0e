use std::fmt;
use std::str::FromStr;

use crate::errors::{WeftError, WeftErrorKind};

/// Where a command may be invoked from.
///
/// The two flags are independent. `none` clears both and `all` sets both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CommandVisibility {
    pub local: bool,
    pub cloud: bool,
}

impl CommandVisibility {
    pub const fn new(local: bool, cloud: bool) -> Self {
        Self { local, cloud }
    }

    pub const fn none() -> Self {
        Self::new(false, false)
    }

    pub const fn all() -> Self {
        Self::new(true, true)
    }

    pub fn is_none(&self) -> bool {
        !self.local && !self.cloud
    }

    pub fn is_all(&self) -> bool {
        self.local && self.cloud
    }
}

impl Default for CommandVisibility {
    fn default() -> Self {
        Self::all()
    }
}

impl FromStr for CommandVisibility {
    type Err = WeftError;

    /// Parse `none`, `all`, or a comma-separated subset of `local` and `cloud`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => return Ok(Self::none()),
            "all" => return Ok(Self::all()),
            _ => {}
        }
        let mut visibility = Self::none();
        for token in s.split(',').map(str::trim) {
            match token {
                "local" => visibility.local = true,
                "cloud" => visibility.cloud = true,
                _ => {
                    return Err(WeftError::new(WeftErrorKind::InvalidPropValue)
                        .with_message(format!("Invalid command visibility value '{}'", token)))
                }
            }
        }
        Ok(visibility)
    }
}

impl fmt::Display for CommandVisibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match (self.local, self.cloud) {
            (true, true) => "all",
            (true, false) => "local",
            (false, true) => "cloud",
            (false, false) => "none",
        };
        f.write_str(s)
    }
}
