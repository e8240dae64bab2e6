//! Lifecycle event macros for entity operations
//!
//! An entity operation (`entity_find`, `entity_store`, ...) emits exactly one
//! `start` event and then either one `end` or one `end_error` event. Each
//! carries `component` (the calling module) and `op`. The closing event adds
//! `duration_ms`, and errors add `err_kind` / `err_code`. Extra fields such as
//! `table` are appended after the fixed ones.
//!
//! The expansion names `rowmodel_core_types`, so calling crates depend on it.

/// Open an entity operation
///
/// # Example
///
/// ```
/// # use rowmodel_core::log_op_start;
/// log_op_start!("entity_store", table = "bikes");
/// ```
#[macro_export]
macro_rules! log_op_start {
    ($op:expr) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = rowmodel_core_types::schema::EVENT_START,
        );
    };
    ($op:expr, $($field:tt)*) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = rowmodel_core_types::schema::EVENT_START,
            $($field)*
        );
    };
}

/// Close an entity operation that succeeded
///
/// `duration_ms` is required and comes first; row counts and other fields
/// may follow.
///
/// # Example
///
/// ```
/// # use rowmodel_core::log_op_end;
/// log_op_end!("entity_get", duration_ms = 3, table = "rides", row_count = 2);
/// ```
#[macro_export]
macro_rules! log_op_end {
    ($op:expr, duration_ms = $duration:expr) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = rowmodel_core_types::schema::EVENT_END,
            duration_ms = $duration,
        );
    };
    ($op:expr, duration_ms = $duration:expr, $($field:tt)*) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = rowmodel_core_types::schema::EVENT_END,
            duration_ms = $duration,
            $($field)*
        );
    };
}

/// Close an entity operation that failed
///
/// The error may be a `ModelError` or an `ExError`; it is classified through
/// `ExError` so the event carries a stable code rather than a message.
///
/// # Example
///
/// ```
/// # use rowmodel_core::{log_op_error, errors::ModelError};
/// let err = ModelError::PrimaryKeyUnset {
///     table: "rides".to_string(),
///     column: "started_at".to_string(),
/// };
/// log_op_error!("entity_update", err, duration_ms = 1, table = "rides");
/// ```
#[macro_export]
macro_rules! log_op_error {
    ($op:expr, $err:expr, duration_ms = $duration:expr) => {{
        use $crate::errors::ExError;
        let ex_err: ExError = $err.into();
        tracing::error!(
            component = module_path!(),
            op = $op,
            event = rowmodel_core_types::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err_kind = ?ex_err.kind(),
            err_code = ex_err.code(),
        );
    }};
    ($op:expr, $err:expr, duration_ms = $duration:expr, $($field:tt)*) => {{
        use $crate::errors::ExError;
        let ex_err: ExError = $err.into();
        tracing::error!(
            component = module_path!(),
            op = $op,
            event = rowmodel_core_types::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err_kind = ?ex_err.kind(),
            err_code = ex_err.code(),
            $($field)*
        );
    }};
}
