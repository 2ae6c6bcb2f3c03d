//! Database driver abstraction.
//!
//! The gateway talks to the database through these two traits. A driver
//! opens database files; a connection answers schema collection queries and
//! executes SQL. Any backend that can do those things (ODBC, OLE DB, SQLite)
//! can sit behind them.

use std::path::Path;

use indexmap::IndexMap;

use crate::access::error::BackendResult;

/// One result row, keyed by column name in select order.
///
/// Values are rendered as text; SQL `NULL` becomes an empty string.
pub type Row = IndexMap<String, String>;

/// A column as reported by the driver's schema collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSchema {
    /// Column name.
    pub name: String,
    /// Declared base data type without any length suffix.
    pub data_type: String,
    /// Maximum character length, if declared.
    pub max_length: Option<u32>,
    /// Whether the column accepts `NULL`.
    pub nullable: bool,
}

/// A foreign key as reported by the driver's schema collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKeySchema {
    /// Constraint name.
    pub name: String,
    /// Referencing table.
    pub table: String,
    /// Referenced table.
    pub referenced_table: String,
}

/// Opens database files.
pub trait Driver {
    /// Short driver name for logging.
    fn name(&self) -> &'static str;

    /// Opens the database at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened as a database.
    fn open(&self, path: &Path) -> BackendResult<Box<dyn Connection>>;
}

/// An open database connection.
pub trait Connection {
    /// Lists table names in enumeration order.
    ///
    /// # Errors
    ///
    /// Returns an error if the schema collection cannot be read.
    fn table_names(&self) -> BackendResult<Vec<String>>;

    /// Lists the columns of `table`.
    ///
    /// # Errors
    ///
    /// Returns an error if the schema collection cannot be read.
    fn columns(&self, table: &str) -> BackendResult<Vec<ColumnSchema>>;

    /// Lists view (saved query) names.
    ///
    /// # Errors
    ///
    /// Returns an error if the schema collection cannot be read.
    fn view_names(&self) -> BackendResult<Vec<String>>;

    /// Lists foreign keys across all tables.
    ///
    /// # Errors
    ///
    /// Returns an error if the schema collection cannot be read.
    fn foreign_keys(&self) -> BackendResult<Vec<ForeignKeySchema>>;

    /// Executes a statement that returns no rows.
    ///
    /// # Errors
    ///
    /// Returns the driver's error if the statement fails.
    fn execute(&mut self, sql: &str) -> BackendResult<()>;

    /// Runs a query with positional text parameters and returns all rows.
    ///
    /// # Errors
    ///
    /// Returns the driver's error if the query fails.
    fn query(&self, sql: &str, params: &[&str]) -> BackendResult<Vec<Row>>;

    /// Runs a query returning a single integer.
    ///
    /// # Errors
    ///
    /// Returns the driver's error if the query fails or returns no rows.
    fn query_scalar(&self, sql: &str, params: &[&str]) -> BackendResult<i64>;

    /// Closes the connection.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver reports a failure while closing.
    fn close(self: Box<Self>) -> BackendResult<()>;
}
