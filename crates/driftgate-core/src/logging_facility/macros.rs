//! Canonical logging macros
//!
//! These macros provide a structured, consistent way to log operations.

/// Log the start of an operation
///
/// # Example
///
/// ```
/// # use driftgate_core::log_op_start;
/// log_op_start!("run_endpoints");
/// log_op_start!("execute_endpoint", endpoint = "Get Balance");
/// ```
#[macro_export]
macro_rules! log_op_start {
    ($op:expr) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = driftgate_core_types::schema::EVENT_START,
        );
    };
    ($op:expr, $($field:tt)*) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = driftgate_core_types::schema::EVENT_START,
            $($field)*
        );
    };
}

/// Log the successful end of an operation
///
/// # Example
///
/// ```
/// # use driftgate_core::log_op_end;
/// log_op_end!("run_endpoints", duration_ms = 42);
/// ```
#[macro_export]
macro_rules! log_op_end {
    ($op:expr, duration_ms = $duration:expr) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = driftgate_core_types::schema::EVENT_END,
            duration_ms = $duration,
        );
    };
    ($op:expr, duration_ms = $duration:expr, $($field:tt)*) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = driftgate_core_types::schema::EVENT_END,
            duration_ms = $duration,
            $($field)*
        );
    };
}

/// Log an operation error
///
/// # Example
///
/// ```
/// # use driftgate_core::log_op_error;
/// # use driftgate_core::errors::{DgError, DgErrorKind};
/// let err = DgError::new(DgErrorKind::Transport).with_message("connection refused");
/// log_op_error!("execute_endpoint", err, duration_ms = 10);
/// ```
#[macro_export]
macro_rules! log_op_error {
    ($op:expr, $err:expr, duration_ms = $duration:expr) => {{
        let dg_err: &$crate::errors::DgError = &$err;
        tracing::error!(
            component = module_path!(),
            op = $op,
            event = driftgate_core_types::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err_kind = ?dg_err.kind(),
            err_code = dg_err.code(),
        );
    }};
    ($op:expr, $err:expr, duration_ms = $duration:expr, $($field:tt)*) => {{
        let dg_err: &$crate::errors::DgError = &$err;
        tracing::error!(
            component = module_path!(),
            op = $op,
            event = driftgate_core_types::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err_kind = ?dg_err.kind(),
            err_code = dg_err.code(),
            $($field)*
        );
    }};
}
