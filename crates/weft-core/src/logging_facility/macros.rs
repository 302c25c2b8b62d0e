//! Operation logging macros
//!
//! Field keys and event names come from `weft_core_types::schema`, reached
//! through `$crate` so callers need no direct dependency on that crate.

#[doc(hidden)]
#[macro_export]
macro_rules! __weft_op_event {
    ($level:ident, $op:expr, $event:expr $(, $($field:tt)*)?) => {
        tracing::$level!(
            component = module_path!(),
            op = $op,
            event = $event,
            $($($field)*)?
        )
    };
}

/// Emit the `start` event of an operation (debug level).
///
/// ```
/// # use weft_core::log_op_start;
/// log_op_start!("load_commands");
/// log_op_start!("set_property_value", property = "device.state");
/// ```
#[macro_export]
macro_rules! log_op_start {
    ($op:expr $(, $($field:tt)*)?) => {
        $crate::__weft_op_event!(
            debug,
            $op,
            $crate::core_types::schema::EVENT_START
            $(, $($field)*)?
        )
    };
}

/// Emit the `end` event of a successful operation.
///
/// ```
/// # use weft_core::log_op_end;
/// log_op_end!("load_commands", duration_ms = 3, command_count = 2);
/// ```
#[macro_export]
macro_rules! log_op_end {
    ($op:expr, duration_ms = $duration:expr $(, $($field:tt)*)?) => {
        $crate::__weft_op_event!(
            info,
            $op,
            $crate::core_types::schema::EVENT_END,
            duration_ms = $duration
            $(, $($field)*)?
        )
    };
}

/// Emit the `end_error` event of a failed operation.
///
/// `err` is a `&WeftError`; both its outer code and the code at the root of
/// its cause chain are recorded.
///
/// ```
/// # use weft_core::log_op_error;
/// use weft_core::errors::{WeftError, WeftErrorKind};
/// let err = WeftError::new(WeftErrorKind::PropertyNotDefined);
/// log_op_error!("set_property_value", &err, duration_ms = 0);
/// ```
#[macro_export]
macro_rules! log_op_error {
    ($op:expr, $err:expr, duration_ms = $duration:expr $(, $($field:tt)*)?) => {{
        let err: &$crate::errors::WeftError = $err;
        $crate::__weft_op_event!(
            warn,
            $op,
            $crate::core_types::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err_kind = ?err.kind(),
            err_code = err.code(),
            err_root_code = err.first_error().code()
            $(, $($field)*)?
        )
    }};
}
