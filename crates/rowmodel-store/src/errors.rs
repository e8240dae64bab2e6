//! Error handling for rowmodel-store
//!
//! Wraps rowmodel-core ExError with store-specific helpers

use rowmodel_core::errors::{ExError, ExErrorKind, ModelError};

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

/// Create a connection-level error from rusqlite::Error
pub fn from_rusqlite(err: rusqlite::Error) -> ExError {
    ExError::new(ExErrorKind::StoreUnavailable)
        .with_op("sqlite")
        .with_message(err.to_string())
}

/// Create a configuration error
pub fn config_error(reason: impl Into<String>) -> ExError {
    ExError::from(ModelError::InvalidConfig {
        message: reason.into(),
    })
    .with_op("config_load")
}

/// Create an IO error
pub fn io_error(operation: &str, err: std::io::Error) -> ExError {
    ModelError::Io {
        operation: operation.to_string(),
        message: err.to_string(),
    }
    .into()
}

/// The store rejected rendered SQL
pub(crate) fn query_failed(sql: &str, err: rusqlite::Error) -> ModelError {
    ModelError::QueryExecutionFailed {
        sql: sql.to_string(),
        message: err.to_string(),
    }
}

/// Table metadata could not be read
pub(crate) fn metadata_unavailable(table: &str, err: rusqlite::Error) -> ModelError {
    ModelError::StoreUnavailable {
        table: table.to_string(),
        message: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rusqlite_errors_classify_as_store_unavailable() {
        let err = from_rusqlite(rusqlite::Error::InvalidQuery);
        assert_eq!(err.kind(), ExErrorKind::StoreUnavailable);
        assert_eq!(err.op(), Some("sqlite"));
    }

    #[test]
    fn test_query_failure_keeps_sql_text() {
        let err: ExError = query_failed("UNDECIDED", rusqlite::Error::InvalidQuery).into();
        assert_eq!(err.kind(), ExErrorKind::QueryExecutionFailed);
        assert_eq!(err.sql(), Some("UNDECIDED"));
    }

    #[test]
    fn test_config_and_io_helpers_carry_kind_and_op() {
        let config = config_error("Unsupported journal_mode: FAST");
        assert_eq!(config.kind(), ExErrorKind::InvalidConfig);
        assert_eq!(config.op(), Some("config_load"));
        assert!(config.message().contains("FAST"));

        let missing = std::io::Error::new(std::io::ErrorKind::NotFound, "rowmodel.toml");
        let io = io_error("config_load", missing);
        assert_eq!(io.kind(), ExErrorKind::Io);
        assert_eq!(io.op(), Some("config_load"));
        assert!(io.message().contains("rowmodel.toml"));
    }
}
