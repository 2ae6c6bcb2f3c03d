//! SQLite database file driver.
//!
//! Maps the schema collections the gateway needs onto `sqlite_master` and
//! the `pragma_*` table-valued functions. SQLite's own bookkeeping tables
//! (`sqlite_*`) are not reported, the same way an OLE DB provider hides its
//! internal objects.

use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use rusqlite::types::ValueRef;
use rusqlite::{params_from_iter, OpenFlags};

use crate::access::driver::{ColumnSchema, Connection, Driver, ForeignKeySchema, Row};
use crate::access::error::{BackendError, BackendResult};

/// Driver for SQLite database files.
#[derive(Debug, Default, Clone, Copy)]
pub struct SqliteDriver;

impl SqliteDriver {
    /// Creates a new SQLite driver.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Driver for SqliteDriver {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn open(&self, path: &Path) -> BackendResult<Box<dyn Connection>> {
        // The file must already exist; never create one implicitly.
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = rusqlite::Connection::open_with_flags(path, flags)?;

        // SQLite opens lazily, so touch the schema to reject non-database files now.
        conn.query_row("SELECT COUNT(*) FROM sqlite_master", [], |row| {
            row.get::<_, i64>(0)
        })?;

        Ok(Box::new(SqliteConnection { conn }))
    }
}

/// An open SQLite connection.
pub struct SqliteConnection {
    conn: rusqlite::Connection,
}

impl SqliteConnection {
    fn names_of_type(&self, object_type: &str) -> BackendResult<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT name FROM sqlite_master \
             WHERE type = ?1 AND name NOT LIKE 'sqlite\\_%' ESCAPE '\\'",
        )?;
        let names = stmt
            .query_map([object_type], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(names)
    }
}

impl Connection for SqliteConnection {
    fn table_names(&self) -> BackendResult<Vec<String>> {
        self.names_of_type("table")
    }

    fn columns(&self, table: &str) -> BackendResult<Vec<ColumnSchema>> {
        let mut stmt = self
            .conn
            .prepare("SELECT name, type, \"notnull\" FROM pragma_table_info(?1)")?;
        let columns = stmt
            .query_map([table], |row| {
                let name: String = row.get(0)?;
                let declared: String = row.get(1)?;
                let not_null: i64 = row.get(2)?;
                Ok((name, declared, not_null))
            })?
            .map(|row| {
                let (name, declared, not_null) = row?;
                let (data_type, max_length) = split_declared_type(&declared);
                Ok(ColumnSchema {
                    name,
                    data_type,
                    max_length,
                    nullable: not_null == 0,
                })
            })
            .collect::<Result<Vec<_>, rusqlite::Error>>()?;
        Ok(columns)
    }

    fn view_names(&self) -> BackendResult<Vec<String>> {
        self.names_of_type("view")
    }

    fn foreign_keys(&self) -> BackendResult<Vec<ForeignKeySchema>> {
        let mut keys = Vec::new();

        for table in self.table_names()? {
            let mut stmt = self
                .conn
                .prepare("SELECT id, \"table\" FROM pragma_foreign_key_list(?1)")?;
            let rows = stmt
                .query_map([&table], |row| {
                    Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
                })?
                .collect::<Result<Vec<_>, _>>()?;

            // Composite keys produce one row per column with the same id.
            let mut last_id = None;
            for (id, referenced_table) in rows {
                if last_id == Some(id) {
                    continue;
                }
                last_id = Some(id);
                keys.push(ForeignKeySchema {
                    name: format!("FK_{table}_{referenced_table}_{id}"),
                    table: table.clone(),
                    referenced_table,
                });
            }
        }

        Ok(keys)
    }

    fn execute(&mut self, sql: &str) -> BackendResult<()> {
        self.conn.execute_batch(sql)?;
        Ok(())
    }

    fn query(&self, sql: &str, params: &[&str]) -> BackendResult<Vec<Row>> {
        let mut stmt = self.conn.prepare(sql)?;
        let names: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();

        let mut rows = stmt.query(params_from_iter(params.iter()))?;
        let mut result = Vec::new();
        while let Some(row) = rows.next()? {
            let mut record = Row::with_capacity(names.len());
            for (index, name) in names.iter().enumerate() {
                record.insert(name.clone(), render_value(row.get_ref(index)?));
            }
            result.push(record);
        }

        Ok(result)
    }

    fn query_scalar(&self, sql: &str, params: &[&str]) -> BackendResult<i64> {
        let value = self
            .conn
            .query_row(sql, params_from_iter(params.iter()), |row| row.get(0))?;
        Ok(value)
    }

    fn close(self: Box<Self>) -> BackendResult<()> {
        let Self { conn } = *self;
        conn.close().map_err(|(_, e)| BackendError::from(e))
    }
}

/// Renders a column value as text.
fn render_value(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Null => String::new(),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(f) => f.to_string(),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => String::from_utf8_lossy(bytes).into_owned(),
    }
}

fn declared_type_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^\s*([^(]*?)\s*(?:\(\s*(\d+)\s*(?:,\s*\d+\s*)?\))?\s*$")
            .expect("declared type pattern is a valid regex")
    })
}

/// Splits a declared column type such as `text(10)` into `("text", Some(10))`.
fn split_declared_type(declared: &str) -> (String, Option<u32>) {
    declared_type_pattern().captures(declared).map_or_else(
        || (declared.trim().to_string(), None),
        |caps| {
            let base = caps.get(1).map_or("", |m| m.as_str()).to_string();
            let length = caps.get(2).and_then(|m| m.as_str().parse().ok());
            (base, length)
        },
    )
}
