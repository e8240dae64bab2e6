//! SQLite binding of the engine's store boundary

#![allow(clippy::result_large_err)]

use rowmodel_core::store::{Cell, ColumnMeta, ResultSet, Row, Store};
use rusqlite::types::ValueRef;
use rusqlite::Connection;

use crate::config::StoreConfig;
use crate::db;
use crate::errors::{metadata_unavailable, query_failed, Result};

/// A [`Store`] over one rusqlite connection
///
/// Rendered SQL is run as-is; nothing is bound as a parameter. Predicates
/// reach SQLite joined with `AND`.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    /// Fresh in-memory database with foreign keys enabled
    ///
    /// # Errors
    ///
    /// `StoreUnavailable` if the connection cannot be opened.
    pub fn open_in_memory() -> Result<Self> {
        Self::from_config(&StoreConfig::default())
    }

    /// Open and configure the database described by `config`
    ///
    /// # Errors
    ///
    /// `StoreUnavailable` if the database cannot be opened or a pragma is
    /// rejected.
    pub fn from_config(config: &StoreConfig) -> Result<Self> {
        Ok(Self::new(db::open_with(config)?))
    }

    /// The underlying connection, for schema setup and ad-hoc SQL
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn into_inner(self) -> Connection {
        self.conn
    }
}

fn to_cell(value: ValueRef<'_>) -> Cell {
    match value {
        ValueRef::Null => Cell::Null,
        ValueRef::Integer(i) => Cell::Integer(i),
        ValueRef::Real(x) => Cell::Real(x),
        ValueRef::Text(bytes) => Cell::Text(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(bytes) => Cell::Blob(bytes.to_vec()),
    }
}

impl Store for SqliteStore {
    fn query(&self, sql: &str) -> rowmodel_core::Result<ResultSet> {
        let mut stmt = self.conn.prepare(sql).map_err(|e| query_failed(sql, e))?;
        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();

        let mut rows = stmt.query([]).map_err(|e| query_failed(sql, e))?;
        let mut result = ResultSet {
            columns: columns.clone(),
            rows: Vec::new(),
        };
        while let Some(row) = rows.next().map_err(|e| query_failed(sql, e))? {
            let mut cells = Vec::with_capacity(columns.len());
            for (idx, name) in columns.iter().enumerate() {
                let value = row.get_ref(idx).map_err(|e| query_failed(sql, e))?;
                cells.push((name.clone(), to_cell(value)));
            }
            result.rows.push(Row::new(cells));
        }

        tracing::debug!(sql = %sql, row_count = result.len(), "query executed");
        Ok(result)
    }

    fn execute(&self, sql: &str) -> rowmodel_core::Result<usize> {
        let affected = self.conn.execute(sql, []).map_err(|e| query_failed(sql, e))?;
        tracing::debug!(sql = %sql, row_count = affected, "statement executed");
        Ok(affected)
    }

    fn columns(&self, table: &str) -> rowmodel_core::Result<Vec<ColumnMeta>> {
        let mut stmt = self
            .conn
            .prepare("SELECT name, type FROM pragma_table_info(?1) ORDER BY cid")
            .map_err(|e| metadata_unavailable(table, e))?;
        let columns = stmt
            .query_map([table], |row| {
                Ok(ColumnMeta {
                    name: row.get(0)?,
                    native_type: row.get(1)?,
                })
            })
            .map_err(|e| metadata_unavailable(table, e))?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| metadata_unavailable(table, e))?;
        Ok(columns)
    }

    fn primary_keys(&self, table: &str) -> rowmodel_core::Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM pragma_table_info(?1) WHERE pk > 0 ORDER BY pk")
            .map_err(|e| metadata_unavailable(table, e))?;
        let keys = stmt
            .query_map([table], |row| row.get(0))
            .map_err(|e| metadata_unavailable(table, e))?
            .collect::<std::result::Result<Vec<String>, _>>()
            .map_err(|e| metadata_unavailable(table, e))?;
        Ok(keys)
    }

    fn where_separator(&self) -> &'static str {
        " AND "
    }
}
