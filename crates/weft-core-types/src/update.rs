//! Update identifiers for the state change queue

use serde::{Deserialize, Serialize};

/// Monotonically increasing counter identifying a point in the state change
/// stream.
///
/// Every recorded state change advances the counter by one. A sync consumer
/// receives the current value together with the drained changes and later
/// reports it back once the server has acknowledged them.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct UpdateId(u64);

impl UpdateId {
    /// Create an id from its raw counter value
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Raw counter value
    pub const fn get(self) -> u64 {
        self.0
    }

    /// The id that follows this one
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl std::fmt::Display for UpdateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for UpdateId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_is_monotonic() {
        let id = UpdateId::default();
        assert_eq!(id.get(), 0);
        assert!(id.next() > id);
        assert_eq!(id.next().next().get(), 2);
    }

    #[test]
    fn test_serializes_as_plain_number() {
        let json = serde_json::to_string(&UpdateId::new(7)).unwrap();
        assert_eq!(json, "7");
        let back: UpdateId = serde_json::from_str("7").unwrap();
        assert_eq!(back, UpdateId::new(7));
    }
}
