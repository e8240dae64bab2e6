//! One-shot SQL query builder
//!
//! A builder accumulates selected columns, predicates and column/value
//! mutations for one table, commits to a single statement kind, renders it,
//! and resets itself whenever it is executed.
//!
//! ## Modes
//!
//! - `select*` is legal from `Undecided` or `Select`.
//! - `insert*` moves `Undecided` to `Insert` and merges in `Insert`/`Update`.
//! - `update*` moves `Undecided` to `Update`, then merges like `insert*`.
//! - `delete` moves `Undecided` to `Delete`; any other mode is rejected.
//! - `filter*` is legal in every mode and never decides the mode.

use crate::errors::{ModelError, Result};
use crate::predicate::Predicate;
use crate::store::{ResultSet, Store, DEFAULT_WHERE_SEPARATOR};

/// Selection marker for all columns
pub const ALL_COLUMNS: &str = "*";

/// The statement kind a builder has committed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueryMode {
    #[default]
    Undecided,
    Select,
    Insert,
    Update,
    Delete,
}

impl QueryMode {
    /// Leading keyword of the rendered statement
    pub fn keyword(&self) -> &'static str {
        match self {
            QueryMode::Undecided => "UNDECIDED",
            QueryMode::Select => "SELECT",
            QueryMode::Insert => "INSERT",
            QueryMode::Update => "UPDATE",
            QueryMode::Delete => "DELETE",
        }
    }
}

/// Stateful accumulator for one SQL statement against one table
#[derive(Debug, Clone, PartialEq)]
pub struct QueryBuilder {
    table: String,
    selections: Vec<String>,
    predicates: Vec<Predicate>,
    mutations: Vec<(String, Option<String>)>,
    mode: QueryMode,
}

impl QueryBuilder {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            selections: Vec::new(),
            predicates: Vec::new(),
            mutations: Vec::new(),
            mode: QueryMode::Undecided,
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn mode(&self) -> QueryMode {
        self.mode
    }

    pub fn selections(&self) -> &[String] {
        &self.selections
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    pub fn mutations(&self) -> &[(String, Option<String>)] {
        &self.mutations
    }

    /// True when nothing has been accumulated and no mode is decided
    pub fn is_pristine(&self) -> bool {
        self.mode == QueryMode::Undecided
            && self.selections.is_empty()
            && self.predicates.is_empty()
            && self.mutations.is_empty()
    }

    // ===== SELECT =====

    /// Select all columns, replacing any columns selected so far
    ///
    /// # Errors
    ///
    /// `InvalidQueryState` outside `Undecided`/`Select`.
    pub fn select_all(&mut self) -> Result<&mut Self> {
        self.require_selectable("select")?;
        self.mode = QueryMode::Select;
        self.selections.clear();
        self.selections.push(ALL_COLUMNS.to_string());
        Ok(self)
    }

    /// Add one column to the projection
    ///
    /// A no-op once all columns have been selected.
    ///
    /// # Errors
    ///
    /// `InvalidQueryState` outside `Undecided`/`Select`.
    pub fn select(&mut self, column: impl Into<String>) -> Result<&mut Self> {
        self.select_many([column])
    }

    /// Add several columns to the projection
    ///
    /// # Errors
    ///
    /// `InvalidQueryState` outside `Undecided`/`Select`.
    pub fn select_many<I, S>(&mut self, columns: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.require_selectable("select")?;
        if self.selects_all() {
            return Ok(self);
        }
        self.mode = QueryMode::Select;
        for column in columns {
            let column = column.into();
            if !self.selections.contains(&column) {
                self.selections.push(column);
            }
        }
        Ok(self)
    }

    fn selects_all(&self) -> bool {
        self.selections.first().map(String::as_str) == Some(ALL_COLUMNS)
    }

    fn require_selectable(&self, action: &str) -> Result<()> {
        match self.mode {
            QueryMode::Undecided | QueryMode::Select => Ok(()),
            other => Err(self.invalid_state(action, other)),
        }
    }

    // ===== WHERE =====

    pub fn filter(&mut self, predicate: Predicate) -> &mut Self {
        self.predicates.push(predicate);
        self
    }

    pub fn filter_many<I>(&mut self, predicates: I) -> &mut Self
    where
        I: IntoIterator<Item = Predicate>,
    {
        self.predicates.extend(predicates);
        self
    }

    /// Shorthand for `filter(Predicate::eq(column, literal))`
    pub fn filter_eq(&mut self, column: impl Into<String>, literal: impl Into<String>) -> &mut Self {
        self.filter(Predicate::eq(column, literal))
    }

    // ===== INSERT / UPDATE =====

    /// Set one column for an INSERT
    ///
    /// # Errors
    ///
    /// `InvalidQueryState` from `Select` or `Delete`.
    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<String>) -> Result<&mut Self> {
        self.insert_all([(column, Some(value))])
    }

    /// Merge column/value pairs for an INSERT; `None` writes SQL `NULL`
    ///
    /// # Errors
    ///
    /// `InvalidQueryState` from `Select` or `Delete`.
    pub fn insert_all<I, K, V>(&mut self, values: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = (K, Option<V>)>,
        K: Into<String>,
        V: Into<String>,
    {
        if self.mode == QueryMode::Undecided {
            self.mode = QueryMode::Insert;
        }
        self.merge_mutations("insert", values)
    }

    /// Set one column for an UPDATE
    ///
    /// # Errors
    ///
    /// `InvalidQueryState` from `Select` or `Delete`.
    pub fn update(&mut self, column: impl Into<String>, value: impl Into<String>) -> Result<&mut Self> {
        self.update_all([(column, Some(value))])
    }

    /// Merge column/value pairs for an UPDATE; `None` writes SQL `NULL`
    ///
    /// # Errors
    ///
    /// `InvalidQueryState` from `Select` or `Delete`.
    pub fn update_all<I, K, V>(&mut self, values: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = (K, Option<V>)>,
        K: Into<String>,
        V: Into<String>,
    {
        if self.mode == QueryMode::Undecided {
            self.mode = QueryMode::Update;
        }
        self.merge_mutations("update", values)
    }

    fn merge_mutations<I, K, V>(&mut self, action: &str, values: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = (K, Option<V>)>,
        K: Into<String>,
        V: Into<String>,
    {
        if !matches!(self.mode, QueryMode::Insert | QueryMode::Update) {
            return Err(self.invalid_state(action, self.mode));
        }
        for (column, value) in values {
            let column = column.into();
            let value = value.map(Into::into);
            match self.mutations.iter_mut().find(|(c, _)| *c == column) {
                Some(slot) => slot.1 = value,
                None => self.mutations.push((column, value)),
            }
        }
        Ok(self)
    }

    // ===== DELETE =====

    /// Commit to a DELETE constrained by the accumulated predicates
    ///
    /// # Errors
    ///
    /// `InvalidQueryState` unless the builder is `Undecided` or already `Delete`.
    pub fn delete(&mut self) -> Result<&mut Self> {
        if self.mode == QueryMode::Undecided {
            self.mode = QueryMode::Delete;
        }
        if self.mode != QueryMode::Delete {
            return Err(self.invalid_state("delete", self.mode));
        }
        Ok(self)
    }

    fn invalid_state(&self, action: &str, mode: QueryMode) -> ModelError {
        ModelError::InvalidQueryState {
            action: action.to_string(),
            mode: mode.keyword().to_string(),
        }
    }

    // ===== Rendering & execution =====

    /// Render the accumulated state as canonical SQL text
    ///
    /// Predicates are joined with `", "`. An INSERT or UPDATE with no
    /// mutations renders as its bare keyword and has no effect when run.
    pub fn to_sql(&self) -> String {
        self.render(DEFAULT_WHERE_SEPARATOR)
    }

    /// Render the accumulated state in the dialect `store` accepts
    pub fn to_sql_for(&self, store: &dyn Store) -> String {
        self.render(store.where_separator())
    }

    fn render(&self, separator: &str) -> String {
        let mut sql = String::new();
        match self.mode {
            QueryMode::Undecided => sql.push_str(QueryMode::Undecided.keyword()),
            QueryMode::Select => {
                sql.push_str("SELECT");
                if !self.selections.is_empty() {
                    sql.push(' ');
                    sql.push_str(&self.selections.join(", "));
                }
                sql.push_str(" FROM ");
                sql.push_str(&self.table);
                self.push_where(&mut sql, separator);
            }
            QueryMode::Insert if !self.mutations.is_empty() => {
                let columns: Vec<&str> = self.mutations.iter().map(|(c, _)| c.as_str()).collect();
                let values: Vec<String> = self
                    .mutations
                    .iter()
                    .map(|(_, v)| quote_or_null(v.as_deref()))
                    .collect();
                sql.push_str(&format!(
                    "INSERT INTO {} ({}) VALUES ({})",
                    self.table,
                    columns.join(", "),
                    values.join(", ")
                ));
            }
            QueryMode::Update if !self.mutations.is_empty() => {
                let assignments: Vec<String> = self
                    .mutations
                    .iter()
                    .map(|(c, v)| format!("{} = {}", c, quote_or_null(v.as_deref())))
                    .collect();
                sql.push_str(&format!("UPDATE {} SET {}", self.table, assignments.join(", ")));
                self.push_where(&mut sql, separator);
            }
            QueryMode::Insert | QueryMode::Update => sql.push_str(self.mode.keyword()),
            QueryMode::Delete => {
                sql.push_str("DELETE FROM ");
                sql.push_str(&self.table);
                self.push_where(&mut sql, separator);
            }
        }
        sql
    }

    fn push_where(&self, sql: &mut String, separator: &str) {
        if self.predicates.is_empty() {
            return;
        }
        let rendered: Vec<String> = self.predicates.iter().map(Predicate::to_string).collect();
        sql.push_str(" WHERE ");
        sql.push_str(&rendered.join(separator));
    }

    /// Discard all accumulated state and return to `Undecided`
    pub fn reset(&mut self) {
        self.selections.clear();
        self.predicates.clear();
        self.mutations.clear();
        self.mode = QueryMode::Undecided;
    }

    /// Render for `store`, reset, and run the statement as a row-producing query
    ///
    /// The builder is reset before the store is called, so it is fresh
    /// whether or not the store accepts the statement.
    ///
    /// # Errors
    ///
    /// `QueryExecutionFailed` from the store.
    pub fn get(&mut self, store: &dyn Store) -> Result<ResultSet> {
        let sql = self.take_sql(store);
        store.query(&sql)
    }

    /// Render for `store`, reset, and run the statement as a write
    ///
    /// # Errors
    ///
    /// `QueryExecutionFailed` from the store.
    pub fn execute(&mut self, store: &dyn Store) -> Result<usize> {
        let sql = self.take_sql(store);
        store.execute(&sql)
    }

    fn take_sql(&mut self, store: &dyn Store) -> String {
        let sql = self.to_sql_for(store);
        tracing::debug!(table = %self.table, sql = %sql, "query rendered");
        self.reset();
        sql
    }
}

fn quote_or_null(value: Option<&str>) -> String {
    match value {
        Some(v) => format!("'{}'", v),
        None => "NULL".to_string(),
    }
}
