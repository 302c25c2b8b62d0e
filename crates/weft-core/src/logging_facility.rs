//! Structured logging for weft
//!
//! Every public operation that can fail emits a `start` event, then either an
//! `end` event or an `end_error` event carrying the error codes. Events are
//! plain `tracing` events with the field keys from `weft_core_types::schema`.
//!
//! The embedding daemon picks an output profile once:
//!
//! ```rust
//! use weft_core::logging_facility::{init, Profile};
//!
//! init(Profile::Production);
//! ```
//!
//! Tests use [`init_test_capture`] instead and assert on captured events.

pub mod init;
pub mod macros;
pub mod test_capture;

pub use init::{init, init_from_config, Profile};
pub use test_capture::{init_test_capture, CapturedEvent, TestCapture};

/// Milliseconds elapsed since `start`, for the `duration_ms` field
pub(crate) fn elapsed_ms(start: std::time::Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}
