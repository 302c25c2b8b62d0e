use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use weft_core_types::UpdateId;

/// Default bound on the number of undrained changes
pub const DEFAULT_MAX_QUEUE_SIZE: usize = 100;

/// One mutation call's effect on the value tree.
///
/// `changed_properties` has the shape `{package: {property: value}}` and holds
/// only what the call touched.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateChange {
    pub timestamp: DateTime<Utc>,
    pub changed_properties: Value,
}

impl StateChange {
    pub fn new(timestamp: DateTime<Utc>, changed_properties: Value) -> Self {
        Self {
            timestamp,
            changed_properties,
        }
    }

    /// Fold a newer change into this one; the newer values and timestamp win
    fn absorb(&mut self, newer: StateChange) {
        self.timestamp = newer.timestamp;
        let Value::Object(newer_packages) = newer.changed_properties else {
            return;
        };
        if !self.changed_properties.is_object() {
            self.changed_properties = Value::Object(Map::new());
        }
        let Value::Object(packages) = &mut self.changed_properties else {
            return;
        };
        for (package, props) in newer_packages {
            match packages.get_mut(&package) {
                Some(Value::Object(existing)) if props.is_object() => {
                    if let Value::Object(props) = props {
                        existing.extend(props);
                    }
                }
                _ => {
                    packages.insert(package, props);
                }
            }
        }
    }
}

/// Callback invoked with the id the server acknowledged
pub type StateUpdatedCallback = Box<dyn Fn(UpdateId) + Send + Sync>;

/// Timestamp-ordered buffer of changes waiting to be pushed to the server.
///
/// The queue never holds more than `max_queue_size` entries. When a new
/// change would exceed the bound, the two oldest entries are folded into one
/// so that no value is lost, only the granularity of the history.
pub struct StateChangeQueue {
    max_queue_size: usize,
    changes: Vec<StateChange>,
    last_change_id: UpdateId,
    on_state_updated: Vec<StateUpdatedCallback>,
}

impl StateChangeQueue {
    /// Create a queue holding at most `max_queue_size` changes (at least one)
    pub fn new(max_queue_size: usize) -> Self {
        Self {
            max_queue_size: max_queue_size.max(1),
            changes: Vec::new(),
            last_change_id: UpdateId::default(),
            on_state_updated: Vec::new(),
        }
    }

    pub fn max_queue_size(&self) -> usize {
        self.max_queue_size
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    /// Record a change and advance the change id.
    ///
    /// Changes with equal timestamps keep their arrival order.
    pub fn notify_properties_updated(&mut self, timestamp: DateTime<Utc>, changed_properties: Value) {
        let position = self.changes.partition_point(|c| c.timestamp <= timestamp);
        self.changes
            .insert(position, StateChange::new(timestamp, changed_properties));

        while self.changes.len() > self.max_queue_size {
            let newer = self.changes.remove(1);
            self.changes[0].absorb(newer);
            tracing::debug!(
                max_queue_size = self.max_queue_size,
                "state change queue full, merged two oldest changes"
            );
        }
        self.last_change_id = self.last_change_id.next();
    }

    /// Id of the most recently recorded change
    pub fn last_state_change_id(&self) -> UpdateId {
        self.last_change_id
    }

    /// Drain every recorded change, oldest first
    pub fn get_and_clear_recorded_state_changes(&mut self) -> Vec<StateChange> {
        std::mem::take(&mut self.changes)
    }

    pub fn add_on_state_updated_callback<F>(&mut self, callback: F)
    where
        F: Fn(UpdateId) + Send + Sync + 'static,
    {
        self.on_state_updated.push(Box::new(callback));
    }

    /// Report that the server has caught up to `update_id`
    pub fn notify_state_updated_on_server(&self, update_id: UpdateId) {
        for callback in &self.on_state_updated {
            callback(update_id);
        }
    }
}

impl Default for StateChangeQueue {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_QUEUE_SIZE)
    }
}

impl fmt::Debug for StateChangeQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateChangeQueue")
            .field("max_queue_size", &self.max_queue_size)
            .field("changes", &self.changes)
            .field("last_change_id", &self.last_change_id)
            .field("on_state_updated", &self.on_state_updated.len())
            .finish()
    }
}
