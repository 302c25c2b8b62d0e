//! Core types shared across weft facilities
//!
//! This crate provides foundational items used by the error handling,
//! logging and state synchronization layers:
//!
//! - **Schema constants**: Canonical field keys and event names
//! - **Update identifiers**: `UpdateId` marking drain points of the state change queue

pub mod schema;
pub mod update;

pub use update::UpdateId;
