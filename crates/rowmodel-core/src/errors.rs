use thiserror::Error;

/// Result type alias using ModelError
pub type Result<T> = std::result::Result<T, ModelError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code that callers can match on without
/// parsing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    /// Connection or driver failure, including failed schema introspection
    StoreUnavailable,
    /// A value's run-time type does not match the field's declared type
    TypeMismatch,
    /// The field name is not part of the model's schema
    FieldNotFound,
    /// A builder method was called in an incompatible mode
    InvalidQueryState,
    /// The store rejected or failed to execute rendered SQL
    QueryExecutionFailed,

    // Ambient
    InvalidConfig,
    Io,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::StoreUnavailable => "ERR_STORE_UNAVAILABLE",
            ExErrorKind::TypeMismatch => "ERR_TYPE_MISMATCH",
            ExErrorKind::FieldNotFound => "ERR_FIELD_NOT_FOUND",
            ExErrorKind::InvalidQueryState => "ERR_INVALID_QUERY_STATE",
            ExErrorKind::QueryExecutionFailed => "ERR_QUERY_EXECUTION_FAILED",
            ExErrorKind::InvalidConfig => "ERR_INVALID_CONFIG",
            ExErrorKind::Io => "ERR_IO",
        }
    }
}

/// Canonical structured error type
///
/// Carries a classification kind for programmatic handling plus optional
/// context (operation, table, column, rendered SQL) for debugging.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    table: Option<String>,
    column: Option<String>,
    sql: Option<String>,
    message: String,
    source: Option<Box<ExError>>,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            table: None,
            column: None,
            sql: None,
            message: String::new(),
            source: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add table context
    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    /// Add column context
    pub fn with_column(mut self, column: impl Into<String>) -> Self {
        self.column = Some(column.into());
        self
    }

    /// Add the SQL text that was being executed
    pub fn with_sql(mut self, sql: impl Into<String>) -> Self {
        self.sql = Some(sql.into());
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add source error
    pub fn with_source(mut self, source: ExError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn table(&self) -> Option<&str> {
        self.table.as_deref()
    }

    pub fn column(&self) -> Option<&str> {
        self.column.as_deref()
    }

    pub fn sql(&self) -> Option<&str> {
        self.sql.as_deref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the wrapped store error, if any
    pub fn source_error(&self) -> Option<&ExError> {
        self.source.as_deref()
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(table) = &self.table {
            write!(f, " (table: {})", table)?;
        }
        if let Some(column) = &self.column {
            write!(f, " (column: {})", column)?;
        }
        if let Some(sql) = &self.sql {
            write!(f, " (sql: {})", sql)?;
        }
        if let Some(source) = &self.source {
            write!(f, " caused by {}", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|s| s as &(dyn std::error::Error + 'static))
    }
}

// ========== End Error Facility ==========

/// Error taxonomy for model, schema and query-builder operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    /// The store could not be reached or could not describe the table
    #[error("Store unavailable for table {table}: {message}")]
    StoreUnavailable { table: String, message: String },

    /// Assigned value does not match the field's declared type
    #[error("Type mismatch on field {field}: expected {expected}, got {actual}")]
    TypeMismatch {
        field: String,
        expected: String,
        actual: String,
    },

    /// Field is not part of the model's schema
    #[error("Field not found on table {table}: {field}")]
    FieldNotFound { table: String, field: String },

    /// Builder call not allowed in the current mode
    #[error("Cannot {action} while query is in {mode} mode")]
    InvalidQueryState { action: String, mode: String },

    /// Store rejected the rendered SQL
    #[error("Query execution failed: {message} (sql: {sql})")]
    QueryExecutionFailed { sql: String, message: String },

    /// Lookup by primary key on a table that declares none
    #[error("Table {table} has no primary key")]
    NoPrimaryKey { table: String },

    /// Update addressed by a primary-key column that has no value
    #[error("Primary key {column} of table {table} has no value")]
    PrimaryKeyUnset { table: String, column: String },

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("I/O error during {operation}: {message}")]
    Io { operation: String, message: String },
}

impl From<ModelError> for ExError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::StoreUnavailable { table, message } => {
                ExError::new(ExErrorKind::StoreUnavailable)
                    .with_table(table)
                    .with_op("introspect")
                    .with_message(message)
            }

            ModelError::TypeMismatch {
                field,
                expected,
                actual,
            } => ExError::new(ExErrorKind::TypeMismatch)
                .with_column(field)
                .with_message(format!("expected {}, got {}", expected, actual)),

            ModelError::FieldNotFound { table, field } => {
                ExError::new(ExErrorKind::FieldNotFound)
                    .with_table(table)
                    .with_column(field)
                    .with_message("Field not found")
            }

            ModelError::InvalidQueryState { action, mode } => {
                ExError::new(ExErrorKind::InvalidQueryState)
                    .with_op(action.clone())
                    .with_message(format!("Cannot {} while query is in {} mode", action, mode))
            }

            ModelError::QueryExecutionFailed { sql, message } => {
                ExError::new(ExErrorKind::QueryExecutionFailed)
                    .with_sql(sql)
                    .with_message("Store rejected statement")
                    .with_source(ExError::new(ExErrorKind::QueryExecutionFailed).with_message(message))
            }

            ModelError::NoPrimaryKey { table } => ExError::new(ExErrorKind::InvalidQueryState)
                .with_table(table)
                .with_op("find")
                .with_message("Table has no primary key"),

            ModelError::PrimaryKeyUnset { table, column } => {
                ExError::new(ExErrorKind::InvalidQueryState)
                    .with_table(table)
                    .with_column(column)
                    .with_op("update")
                    .with_message("Primary key has no value")
            }

            ModelError::InvalidConfig { message } => {
                ExError::new(ExErrorKind::InvalidConfig).with_message(message)
            }

            ModelError::Io { operation, message } => ExError::new(ExErrorKind::Io)
                .with_op(operation)
                .with_message(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind_codes_are_unique() {
        let kinds = [
            ExErrorKind::StoreUnavailable,
            ExErrorKind::TypeMismatch,
            ExErrorKind::FieldNotFound,
            ExErrorKind::InvalidQueryState,
            ExErrorKind::QueryExecutionFailed,
            ExErrorKind::InvalidConfig,
            ExErrorKind::Io,
        ];
        let mut codes: Vec<_> = kinds.iter().map(|k| k.code()).collect();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), kinds.len());
    }

    #[test]
    fn test_query_failure_wraps_store_message() {
        let err: ExError = ModelError::QueryExecutionFailed {
            sql: "SELECT * FROM nowhere".to_string(),
            message: "no such table: nowhere".to_string(),
        }
        .into();

        assert_eq!(err.kind(), ExErrorKind::QueryExecutionFailed);
        assert_eq!(err.sql(), Some("SELECT * FROM nowhere"));
        let source = err.source_error().unwrap();
        assert_eq!(source.kind(), ExErrorKind::QueryExecutionFailed);
        assert!(source.message().contains("no such table"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_key_errors_classify_as_invalid_query_state() {
        let no_key: ExError = ModelError::NoPrimaryKey {
            table: "log".to_string(),
        }
        .into();
        let unset: ExError = ModelError::PrimaryKeyUnset {
            table: "bikes".to_string(),
            column: "registration".to_string(),
        }
        .into();

        assert_eq!(no_key.kind(), ExErrorKind::InvalidQueryState);
        assert_eq!(unset.kind(), ExErrorKind::InvalidQueryState);
        assert_eq!(unset.column(), Some("registration"));
    }

    #[test]
    fn test_display_includes_code_and_context() {
        let err = ExError::new(ExErrorKind::FieldNotFound)
            .with_table("bikes")
            .with_column("colour")
            .with_message("Field not found");
        let text = err.to_string();
        assert!(text.starts_with("[ERR_FIELD_NOT_FOUND]"));
        assert!(text.contains("(table: bikes)"));
        assert!(text.contains("(column: colour)"));
    }
}
