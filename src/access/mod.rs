//! Data-access gateway for desktop database files.
//!
//! [`AccessGateway`] owns the single database connection of the process and
//! translates named operations into driver calls. Every operation returns
//! plain records or a typed [`GatewayError`].
//!
//! # Failure policy
//!
//! Reads run under an explicit [`FailurePolicy`]:
//!
//! - **Propagate**: schema collection reads (tables, queries, relationships).
//!   Driver failures surface as [`GatewayError::BackendError`].
//! - **Degrade**: reads of the `MSysObjects` catalog and row counts. Drivers
//!   commonly lock the catalog down, so a failure yields an empty list, zero
//!   or `false` instead of an error.
//!
//! [`GatewayError::NotConnected`] is never degraded.
//!
//! # Modules
//!
//! - [`driver`] — Driver and connection traits
//! - [`sqlite`] — SQLite database file driver
//! - [`automation`] — Host application automation
//! - [`ddl`] — Statement text
//! - [`models`] — Metadata records
//! - [`error`] — Error types

pub mod automation;
pub mod ddl;
pub mod driver;
pub mod error;
pub mod models;
pub mod sqlite;

pub use automation::{HostAutomation, PlaceholderAutomation};
pub use driver::{Connection, Driver};
pub use error::{BackendError, BackendResult, GatewayError, GatewayResult};
pub use sqlite::SqliteDriver;

use std::path::{Path, PathBuf};

use chrono::Utc;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::access::models::{
    ControlInfo, ControlProperties, FieldInfo, FormExport, ObjectInfo, ObjectKind,
    ObjectMetadata, QueryInfo, RelationshipInfo, ReportExport, SystemTableInfo, TableInfo,
    VbaModule, VbaProject,
};

/// Prefix of temporary tables, hidden from table listings.
pub const TEMP_TABLE_PREFIX: &str = "~";

/// Prefixes that mark system and temporary tables.
pub const SYSTEM_TABLE_PREFIXES: [&str; 2] = [TEMP_TABLE_PREFIX, "MSys"];

/// Name reported for the database's own VBA project.
pub const CURRENT_PROJECT: &str = "CurrentProject";

/// What a read does when the driver fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Return the driver error to the caller.
    Propagate,
    /// Log the error and return the empty value.
    Degrade,
}

/// Stateful handle to one database file.
pub struct AccessGateway {
    /// Opens database files.
    driver: Box<dyn Driver>,
    /// Host application automation backend.
    automation: Box<dyn HostAutomation>,
    /// The open connection, if any.
    connection: Option<Box<dyn Connection>>,
    /// Path of the open database.
    database_path: Option<PathBuf>,
    /// Directories `connect` may open files from. Empty allows any path.
    allowed_paths: Vec<PathBuf>,
}

impl AccessGateway {
    /// Creates a disconnected gateway.
    #[must_use]
    pub fn new(driver: Box<dyn Driver>, automation: Box<dyn HostAutomation>) -> Self {
        Self {
            driver,
            automation,
            connection: None,
            database_path: None,
            allowed_paths: Vec::new(),
        }
    }

    /// Creates a gateway using the SQLite driver and placeholder automation.
    #[must_use]
    pub fn sqlite() -> Self {
        Self::new(
            Box::new(SqliteDriver::new()),
            Box::new(PlaceholderAutomation::new()),
        )
    }

    /// Restricts `connect` to files inside the given directories.
    #[must_use]
    pub fn with_allowed_paths(mut self, allowed_paths: Vec<PathBuf>) -> Self {
        self.allowed_paths = allowed_paths;
        self
    }

    /// Returns the driver name.
    #[must_use]
    pub fn driver_name(&self) -> &'static str {
        self.driver.name()
    }

    // ==================== Connection lifecycle ====================

    /// Opens the database at `path`, closing any open connection first.
    ///
    /// # Errors
    ///
    /// - `AccessDenied` if the path is outside the allowed directories
    /// - `NotFound` if the file does not exist
    /// - `ConnectionError` if the driver cannot open it
    ///
    /// The gateway is disconnected after any failure.
    pub fn connect(&mut self, path: &Path) -> GatewayResult<()> {
        self.disconnect();

        self.validate_path(path)?;

        if !path.is_file() {
            return Err(GatewayError::NotFound {
                path: path.to_path_buf(),
            });
        }

        let connection =
            self.driver
                .open(path)
                .map_err(|e| GatewayError::ConnectionError { message: e.message })?;

        info!(
            path = %path.display(),
            driver = self.driver.name(),
            "Connected to database"
        );

        self.connection = Some(connection);
        self.database_path = Some(path.to_path_buf());
        Ok(())
    }

    /// Closes the connection. Does nothing when already disconnected.
    pub fn disconnect(&mut self) {
        if let Some(connection) = self.connection.take() {
            if let Err(e) = connection.close() {
                warn!(error = %e, "Error while closing database connection");
            }
            info!("Disconnected from database");
        }
        self.database_path = None;
    }

    /// Returns whether a connection is open.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    /// Returns the path of the open database.
    #[must_use]
    pub fn database_path(&self) -> Option<&Path> {
        self.database_path.as_deref()
    }

    /// Checks that `path` lies inside one of the allowed directories.
    fn validate_path(&self, path: &Path) -> GatewayResult<()> {
        if self.allowed_paths.is_empty() {
            return Ok(());
        }

        // A file that doesn't exist yet is judged by its parent directory.
        let canonical_path = if path.exists() {
            path.canonicalize().map_err(|_| GatewayError::AccessDenied)?
        } else {
            let parent = path.parent().ok_or(GatewayError::AccessDenied)?;
            let file_name = path.file_name().ok_or(GatewayError::AccessDenied)?;
            let Ok(canonical_parent) = parent.canonicalize() else {
                // Nothing can be opened there, so report it as missing.
                return Err(GatewayError::NotFound {
                    path: path.to_path_buf(),
                });
            };
            canonical_parent.join(file_name)
        };

        for allowed in &self.allowed_paths {
            let Ok(canonical_allowed) = allowed.canonicalize() else {
                continue;
            };
            if canonical_path.starts_with(&canonical_allowed) {
                return Ok(());
            }
        }

        Err(GatewayError::AccessDenied)
    }

    fn connection(&self) -> GatewayResult<&dyn Connection> {
        self.connection.as_deref().ok_or(GatewayError::NotConnected)
    }

    fn ensure_connected(&self) -> GatewayResult<()> {
        self.connection().map(|_| ())
    }

    /// Runs a read against the open connection under `policy`.
    ///
    /// # Errors
    ///
    /// Returns `NotConnected` when disconnected, whatever the policy. Other
    /// errors are returned only under [`FailurePolicy::Propagate`].
    pub fn read<T, F>(&self, policy: FailurePolicy, operation: &str, op: F) -> GatewayResult<T>
    where
        T: Default,
        F: FnOnce(&dyn Connection) -> GatewayResult<T>,
    {
        let connection = self.connection()?;
        match op(connection) {
            Ok(value) => Ok(value),
            Err(e) if policy == FailurePolicy::Degrade => {
                debug!(operation, error = %e, "Read failed, returning empty result");
                Ok(T::default())
            }
            Err(e) => Err(e),
        }
    }

    fn execute(&mut self, sql: &str) -> GatewayResult<()> {
        let connection = self
            .connection
            .as_mut()
            .ok_or(GatewayError::NotConnected)?;
        debug!(sql, "Executing statement");
        connection.execute(sql)?;
        Ok(())
    }

    // ==================== Schema ====================

    /// Lists user tables with their fields and record counts.
    ///
    /// Each table costs two extra lookups (fields, count). Databases handled
    /// here hold few tables, so this is not batched.
    ///
    /// # Errors
    ///
    /// Returns `NotConnected`, or `BackendError` if the table list cannot be read.
    pub fn list_tables(&self) -> GatewayResult<Vec<TableInfo>> {
        self.read(FailurePolicy::Propagate, "list_tables", |conn| {
            let mut tables = Vec::new();
            for name in conn.table_names()? {
                if name.is_empty() || name.starts_with(TEMP_TABLE_PREFIX) {
                    continue;
                }
                tables.push(TableInfo {
                    fields: table_fields(conn, &name),
                    record_count: record_count(conn, &name),
                    name,
                });
            }
            Ok(tables)
        })
    }

    /// Lists saved queries.
    ///
    /// # Errors
    ///
    /// Returns `NotConnected`, or `BackendError` if the view list cannot be read.
    pub fn list_queries(&self) -> GatewayResult<Vec<QueryInfo>> {
        self.read(FailurePolicy::Propagate, "list_queries", |conn| {
            Ok(conn
                .view_names()?
                .into_iter()
                .filter(|name| !name.is_empty())
                .map(|name| QueryInfo {
                    name,
                    sql: String::new(),
                    query_type: "Query".to_string(),
                })
                .collect())
        })
    }

    /// Lists foreign-key relationships.
    ///
    /// # Errors
    ///
    /// Returns `NotConnected`, or `BackendError` if the key list cannot be read.
    pub fn list_relationships(&self) -> GatewayResult<Vec<RelationshipInfo>> {
        self.read(FailurePolicy::Propagate, "list_relationships", |conn| {
            Ok(conn
                .foreign_keys()?
                .into_iter()
                .map(|key| RelationshipInfo {
                    name: key.name,
                    table: key.table,
                    foreign_table: key.referenced_table,
                    attributes: String::new(),
                })
                .collect())
        })
    }

    /// Creates a table with one `CREATE TABLE` statement.
    ///
    /// # Errors
    ///
    /// Returns `NotConnected`, `InvalidArgument` for unusable names, or
    /// `BackendError` if the driver rejects the statement.
    pub fn create_table(&mut self, table_name: &str, fields: &[FieldInfo]) -> GatewayResult<()> {
        self.ensure_connected()?;
        let sql = ddl::create_table(table_name, fields)?;
        self.execute(&sql)?;
        info!(table = table_name, fields = fields.len(), "Created table");
        Ok(())
    }

    /// Drops a table.
    ///
    /// # Errors
    ///
    /// Returns `NotConnected`, `InvalidArgument` for unusable names, or
    /// `BackendError` if the driver rejects the statement.
    pub fn delete_table(&mut self, table_name: &str) -> GatewayResult<()> {
        self.ensure_connected()?;
        let sql = ddl::drop_table(table_name)?;
        self.execute(&sql)?;
        info!(table = table_name, "Deleted table");
        Ok(())
    }

    /// Counts the rows of a table, or 0 if they cannot be counted.
    ///
    /// # Errors
    ///
    /// Returns `NotConnected` only.
    pub fn table_record_count(&self, table_name: &str) -> GatewayResult<i64> {
        self.read(FailurePolicy::Degrade, "table_record_count", |conn| {
            count_rows(conn, table_name)
        })
    }

    /// Lists system and temporary tables.
    ///
    /// # Errors
    ///
    /// Returns `NotConnected`, or `BackendError` if the table list cannot be read.
    pub fn list_system_tables(&self) -> GatewayResult<Vec<SystemTableInfo>> {
        self.read(FailurePolicy::Propagate, "list_system_tables", |conn| {
            let now = Utc::now();
            Ok(conn
                .table_names()?
                .into_iter()
                .filter(|name| SYSTEM_TABLE_PREFIXES.iter().any(|p| name.starts_with(p)))
                .map(|name| SystemTableInfo {
                    record_count: record_count(conn, &name),
                    name,
                    date_created: now,
                    last_updated: now,
                })
                .collect())
        })
    }

    // ==================== Catalog ====================

    /// Lists catalog objects of one kind.
    ///
    /// # Errors
    ///
    /// Returns `NotConnected` only; catalog failures yield an empty list.
    pub fn list_objects(&self, kind: ObjectKind) -> GatewayResult<Vec<ObjectInfo>> {
        self.read(FailurePolicy::Degrade, kind.label(), |conn| {
            Ok(catalog_names(conn, kind)?
                .into_iter()
                .map(|name| ObjectInfo::new(name, kind))
                .collect())
        })
    }

    /// Lists forms.
    ///
    /// # Errors
    ///
    /// Returns `NotConnected` only.
    pub fn list_forms(&self) -> GatewayResult<Vec<ObjectInfo>> {
        self.list_objects(ObjectKind::Form)
    }

    /// Lists reports.
    ///
    /// # Errors
    ///
    /// Returns `NotConnected` only.
    pub fn list_reports(&self) -> GatewayResult<Vec<ObjectInfo>> {
        self.list_objects(ObjectKind::Report)
    }

    /// Lists macros.
    ///
    /// # Errors
    ///
    /// Returns `NotConnected` only.
    pub fn list_macros(&self) -> GatewayResult<Vec<ObjectInfo>> {
        self.list_objects(ObjectKind::Macro)
    }

    /// Lists modules.
    ///
    /// # Errors
    ///
    /// Returns `NotConnected` only.
    pub fn list_modules(&self) -> GatewayResult<Vec<ObjectInfo>> {
        self.list_objects(ObjectKind::Module)
    }

    /// Lists VBA projects. The database holds a single project whose modules
    /// come from the catalog.
    ///
    /// # Errors
    ///
    /// Returns `NotConnected` only; catalog failures yield an empty list.
    pub fn list_vba_projects(&self) -> GatewayResult<Vec<VbaProject>> {
        self.read(FailurePolicy::Degrade, "list_vba_projects", |conn| {
            let modules = catalog_names(conn, ObjectKind::Module)?
                .into_iter()
                .map(|name| VbaModule {
                    name,
                    module_type: ObjectKind::Module.label().to_string(),
                    has_code: true,
                })
                .collect();
            Ok(vec![VbaProject {
                name: CURRENT_PROJECT.to_string(),
                description: "Current Access Project".to_string(),
                modules,
            }])
        })
    }

    /// Returns every row of the object catalog.
    ///
    /// # Errors
    ///
    /// Returns `NotConnected` only; catalog failures yield an empty list.
    pub fn object_metadata(&self) -> GatewayResult<Vec<ObjectMetadata>> {
        self.read(FailurePolicy::Degrade, "object_metadata", |conn| {
            let column = |row: &driver::Row, key: &str| row.get(key).cloned().unwrap_or_default();
            Ok(conn
                .query(ddl::CATALOG_ALL, &[])?
                .iter()
                .map(|row| ObjectMetadata {
                    name: column(row, "Name"),
                    object_type: column(row, "Type"),
                    flags: column(row, "Flags"),
                    date_created: column(row, "DateCreate"),
                    date_modified: column(row, "DateUpdate"),
                })
                .collect())
        })
    }

    /// Returns whether a form with this name is in the catalog.
    ///
    /// # Errors
    ///
    /// Returns `NotConnected` only; catalog failures yield `false`.
    pub fn form_exists(&self, form_name: &str) -> GatewayResult<bool> {
        self.read(FailurePolicy::Degrade, "form_exists", |conn| {
            let count = conn.query_scalar(
                &ddl::catalog_count_named(ObjectKind::Form),
                &[form_name],
            )?;
            Ok(count > 0)
        })
    }

    // ==================== Host automation ====================

    /// Starts the host application.
    ///
    /// # Errors
    ///
    /// Returns the automation backend's error.
    pub fn launch_app(&mut self) -> GatewayResult<()> {
        self.automation.launch()
    }

    /// Closes the host application.
    ///
    /// # Errors
    ///
    /// Returns the automation backend's error.
    pub fn close_app(&mut self) -> GatewayResult<()> {
        self.automation.close()
    }

    /// Opens a form.
    ///
    /// # Errors
    ///
    /// Returns the automation backend's error.
    pub fn open_form(&mut self, form_name: &str) -> GatewayResult<()> {
        self.automation.open_form(form_name)
    }

    /// Closes a form.
    ///
    /// # Errors
    ///
    /// Returns the automation backend's error.
    pub fn close_form(&mut self, form_name: &str) -> GatewayResult<()> {
        self.automation.close_form(form_name)
    }

    /// Reads a VBA module.
    ///
    /// # Errors
    ///
    /// Returns the automation backend's error.
    pub fn vba_code(&self, project_name: &str, module_name: &str) -> GatewayResult<String> {
        self.automation.vba_code(project_name, module_name)
    }

    /// Replaces a VBA module's code.
    ///
    /// # Errors
    ///
    /// Returns the automation backend's error.
    pub fn set_vba_code(
        &mut self,
        project_name: &str,
        module_name: &str,
        code: &str,
    ) -> GatewayResult<()> {
        self.automation.set_vba_code(project_name, module_name, code)
    }

    /// Adds a procedure to a VBA module.
    ///
    /// # Errors
    ///
    /// Returns the automation backend's error.
    pub fn add_vba_procedure(
        &mut self,
        project_name: &str,
        module_name: &str,
        procedure_name: &str,
        code: &str,
    ) -> GatewayResult<()> {
        self.automation
            .add_vba_procedure(project_name, module_name, procedure_name, code)
    }

    /// Compiles the VBA project.
    ///
    /// # Errors
    ///
    /// Returns the automation backend's error.
    pub fn compile_vba(&mut self) -> GatewayResult<()> {
        self.automation.compile_vba()
    }

    /// Lists the controls on a form.
    ///
    /// # Errors
    ///
    /// Returns `NotConnected` or the automation backend's error.
    pub fn form_controls(&self, form_name: &str) -> GatewayResult<Vec<ControlInfo>> {
        self.ensure_connected()?;
        self.automation.form_controls(form_name)
    }

    /// Reads the properties of a control.
    ///
    /// # Errors
    ///
    /// Returns `NotConnected` or the automation backend's error.
    pub fn control_properties(
        &self,
        form_name: &str,
        control_name: &str,
    ) -> GatewayResult<ControlProperties> {
        self.ensure_connected()?;
        self.automation.control_properties(form_name, control_name)
    }

    /// Sets a property of a control.
    ///
    /// # Errors
    ///
    /// Returns `NotConnected` or the automation backend's error.
    pub fn set_control_property(
        &mut self,
        form_name: &str,
        control_name: &str,
        property_name: &str,
        value: &Value,
    ) -> GatewayResult<()> {
        self.ensure_connected()?;
        self.automation
            .set_control_property(form_name, control_name, property_name, value)
    }

    /// Exports a form as a pretty-printed JSON document.
    ///
    /// # Errors
    ///
    /// Returns `NotConnected` or the automation backend's error.
    pub fn export_form(&self, form_name: &str) -> GatewayResult<String> {
        self.ensure_connected()?;
        let form = FormExport {
            name: form_name.to_string(),
            exported_at: Utc::now(),
            controls: self.automation.form_controls(form_name)?,
            vba: self.automation.vba_code(CURRENT_PROJECT, form_name)?,
        };
        to_document(&form)
    }

    /// Imports a form from an exported document and returns its name.
    ///
    /// # Errors
    ///
    /// Returns `NotConnected`, `InvalidArgument` if the document cannot be
    /// parsed, or the automation backend's error.
    pub fn import_form(&mut self, form_data: &str) -> GatewayResult<String> {
        self.ensure_connected()?;
        let form: FormExport = serde_json::from_str(form_data)
            .map_err(|e| GatewayError::invalid_argument(format!("Invalid form data: {e}")))?;
        self.automation.import_form(&form)?;
        Ok(form.name)
    }

    /// Deletes a form.
    ///
    /// # Errors
    ///
    /// Returns `NotConnected` or the automation backend's error.
    pub fn delete_form(&mut self, form_name: &str) -> GatewayResult<()> {
        self.ensure_connected()?;
        self.automation.delete_form(form_name)
    }

    /// Exports a report as a pretty-printed JSON document.
    ///
    /// # Errors
    ///
    /// Returns `NotConnected` or the automation backend's error.
    pub fn export_report(&self, report_name: &str) -> GatewayResult<String> {
        self.ensure_connected()?;
        // Reports expose the same control surface as forms.
        let report = ReportExport {
            name: report_name.to_string(),
            exported_at: Utc::now(),
            controls: self.automation.form_controls(report_name)?,
        };
        to_document(&report)
    }

    /// Imports a report from an exported document and returns its name.
    ///
    /// # Errors
    ///
    /// Returns `NotConnected`, `InvalidArgument` if the document cannot be
    /// parsed, or the automation backend's error.
    pub fn import_report(&mut self, report_data: &str) -> GatewayResult<String> {
        self.ensure_connected()?;
        let report: ReportExport = serde_json::from_str(report_data)
            .map_err(|e| GatewayError::invalid_argument(format!("Invalid report data: {e}")))?;
        self.automation.import_report(&report)?;
        Ok(report.name)
    }

    /// Deletes a report.
    ///
    /// # Errors
    ///
    /// Returns `NotConnected` or the automation backend's error.
    pub fn delete_report(&mut self, report_name: &str) -> GatewayResult<()> {
        self.ensure_connected()?;
        self.automation.delete_report(report_name)
    }
}

impl Drop for AccessGateway {
    fn drop(&mut self) {
        self.disconnect();
    }
}

fn to_document<T: serde::Serialize>(value: &T) -> GatewayResult<String> {
    serde_json::to_string_pretty(value).map_err(|e| GatewayError::Automation {
        message: format!("failed to serialise export: {e}"),
    })
}

fn count_rows(conn: &dyn Connection, table_name: &str) -> GatewayResult<i64> {
    Ok(conn.query_scalar(&ddl::count_rows(table_name)?, &[])?)
}

/// Row count that falls back to 0.
fn record_count(conn: &dyn Connection, table_name: &str) -> i64 {
    count_rows(conn, table_name).unwrap_or_else(|e| {
        debug!(table = table_name, error = %e, "Could not count rows");
        0
    })
}

/// Field list that falls back to empty.
fn table_fields(conn: &dyn Connection, table_name: &str) -> Vec<FieldInfo> {
    match conn.columns(table_name) {
        Ok(columns) => columns
            .into_iter()
            .map(|column| FieldInfo {
                name: column.name,
                field_type: column.data_type,
                size: column.max_length.unwrap_or(0),
                required: !column.nullable,
                allow_zero_length: true,
            })
            .collect(),
        Err(e) => {
            debug!(table = table_name, error = %e, "Could not read fields");
            Vec::new()
        }
    }
}

fn catalog_names(conn: &dyn Connection, kind: ObjectKind) -> GatewayResult<Vec<String>> {
    Ok(conn
        .query(&ddl::catalog_names(kind), &[])?
        .into_iter()
        .map(|row| row.get("Name").cloned().unwrap_or_default())
        .collect())
}
