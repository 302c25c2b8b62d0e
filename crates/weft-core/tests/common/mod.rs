use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::{json, Value};
use weft_core::{CommandDictionary, StateManager};

/// A fixed instant plus `secs` seconds
#[allow(dead_code)]
pub fn ts(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000, 0).unwrap() + Duration::seconds(secs)
}

/// Load `json` into a fresh dictionary with no base
#[allow(dead_code)]
pub fn load_dictionary(json: Value) -> CommandDictionary {
    let mut dict = CommandDictionary::new();
    dict.load_commands(&json, None).unwrap();
    dict
}

/// State schema shared by the state manager tests
#[allow(dead_code)]
pub fn test_state_definition() -> Value {
    json!({
        "base": {
            "manufacturer": {"type": "string"},
            "serialNumber": {"type": "string"}
        },
        "device": {
            "state_property": {"type": "string"}
        }
    })
}

#[allow(dead_code)]
pub fn test_state_defaults() -> Value {
    json!({
        "base": {
            "manufacturer": "Test Factory",
            "serialNumber": "Test Model"
        }
    })
}

/// Counts observer invocations
#[derive(Clone, Default)]
#[allow(dead_code)]
pub struct CallCounter(Arc<AtomicUsize>);

#[allow(dead_code)]
impl CallCounter {
    pub fn get(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }

    pub fn reset(&self) {
        self.0.store(0, Ordering::SeqCst);
    }

    pub fn callback(&self) -> impl Fn() + Send + Sync + 'static {
        let inner = Arc::clone(&self.0);
        move || {
            inner.fetch_add(1, Ordering::SeqCst);
        }
    }
}

/// A manager with the test schema and defaults loaded and one observer attached
#[allow(dead_code)]
pub fn test_state_manager() -> (StateManager, CallCounter) {
    let mut mgr = StateManager::new();
    let counter = CallCounter::default();
    mgr.add_on_state_changed_callback(counter.callback());
    mgr.load_state_definition(&test_state_definition()).unwrap();
    mgr.load_state_defaults(&test_state_defaults()).unwrap();
    (mgr, counter)
}
