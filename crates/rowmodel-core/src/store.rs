//! Store boundary
//!
//! The engine never talks to a driver directly. Everything it needs from a
//! SQL store goes through the [`Store`] trait: running rendered SQL text and
//! describing a table's columns and primary key.

use crate::errors::Result;

/// Separator between WHERE predicates in the canonical SQL text
pub const DEFAULT_WHERE_SEPARATOR: &str = ", ";

/// A raw cell as reported by the store, before typed extraction
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl Cell {
    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }
}

/// One result row: column names paired with their cells, in select order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    cells: Vec<(String, Cell)>,
}

impl Row {
    pub fn new(cells: Vec<(String, Cell)>) -> Self {
        Self { cells }
    }

    /// Look up a cell by column name
    ///
    /// Matching is ASCII case-insensitive. Returns `None` when the column was
    /// not part of the projection.
    pub fn get(&self, column: &str) -> Option<&Cell> {
        self.cells
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(column))
            .map(|(_, cell)| cell)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Cell)> {
        self.cells.iter().map(|(name, cell)| (name.as_str(), cell))
    }
}

/// Tabular result of a query
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

impl ResultSet {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Column metadata reported by the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMeta {
    pub name: String,
    /// Declared native type, e.g. `VARCHAR(40)` or `INTEGER`
    pub native_type: String,
}

/// Connection abstraction consumed by the engine
///
/// Implementations are blocking; every call is one round-trip. The engine
/// assumes a handle is used from a single thread at a time.
pub trait Store {
    /// Run SQL text that produces rows
    ///
    /// # Errors
    ///
    /// `QueryExecutionFailed` when the store rejects or fails the statement.
    fn query(&self, sql: &str) -> Result<ResultSet>;

    /// Run SQL text that modifies rows, returning the affected row count
    ///
    /// # Errors
    ///
    /// `QueryExecutionFailed` when the store rejects or fails the statement.
    fn execute(&self, sql: &str) -> Result<usize>;

    /// Describe the columns of `table` in table order
    ///
    /// # Errors
    ///
    /// `StoreUnavailable` when the metadata cannot be read.
    fn columns(&self, table: &str) -> Result<Vec<ColumnMeta>>;

    /// Primary-key column names of `table`, in the order the store reports
    ///
    /// # Errors
    ///
    /// `StoreUnavailable` when the metadata cannot be read.
    fn primary_keys(&self, table: &str) -> Result<Vec<String>>;

    /// Text placed between WHERE predicates in statements sent to this store
    ///
    /// Stores whose dialect rejects the canonical comma-joined form override
    /// this, typically with `" AND "`.
    fn where_separator(&self) -> &'static str {
        DEFAULT_WHERE_SEPARATOR
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_lookup_is_case_insensitive() {
        let row = Row::new(vec![
            ("Registration".to_string(), Cell::Integer(7)),
            ("status".to_string(), Cell::Text("active".to_string())),
        ]);

        assert_eq!(row.get("registration"), Some(&Cell::Integer(7)));
        assert_eq!(row.get("STATUS"), Some(&Cell::Text("active".to_string())));
        assert_eq!(row.get("remarks"), None);
        assert_eq!(row.len(), 2);
    }
}
