//! State manager
//!
//! Device state is a set of packages, each with its own property schema and
//! current values. Mutations are validated, applied, and recorded in a
//! [`StateChangeQueue`] that a sync consumer drains.

mod state_change_queue;
mod state_manager;
mod state_package;

pub use state_change_queue::{
    StateChange, StateChangeQueue, StateUpdatedCallback, DEFAULT_MAX_QUEUE_SIZE,
};
pub use state_manager::{StateChangedCallback, StateManager};
pub use state_package::StatePackage;
