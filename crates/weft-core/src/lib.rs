//! Weft Core - typed command and state schemas for connected devices
//!
//! This crate provides the in-memory model a device daemon exposes to its
//! cloud and local clients:
//! - A JSON schema type engine with type inference, constraint validation and
//!   merging over a base schema
//! - A command dictionary with naming, visibility and role policy
//! - A state manager with validated mutation and a drainable change queue
//!
//! Nothing here performs I/O or spawns threads.

pub mod commands;
pub mod config;
pub mod errors;
pub mod logging_facility;
pub mod schema;
pub mod states;

// Re-export commonly used types
pub use commands::{CommandDefinition, CommandDictionary, CommandVisibility, UserRole};
pub use config::{ConfigError, WeftConfig};
pub use errors::{Result, WeftError, WeftErrorKind};
pub use schema::{ObjectSchema, PropType, TypeSpec, ValueType};
pub use states::{StateChange, StateChangeQueue, StateManager};
pub use weft_core_types::UpdateId;

#[doc(hidden)]
pub use weft_core_types as core_types;
