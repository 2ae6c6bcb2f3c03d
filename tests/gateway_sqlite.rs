//! Integration tests for the data-access gateway over SQLite database files.

use std::path::PathBuf;

use access_mcp::access::models::FieldInfo;
use access_mcp::access::{AccessGateway, GatewayError};

// =============================================================================
// Helpers
// =============================================================================

/// Creates a database with two related tables, a view and a temporary table.
fn sample_database() -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("shop.db");
    let conn = rusqlite::Connection::open(&path).unwrap();
    conn.execute_batch(
        "CREATE TABLE Customers (ID INTEGER PRIMARY KEY, Name TEXT(40) NOT NULL);
         CREATE TABLE Orders (ID INTEGER, CustomerID INTEGER REFERENCES Customers(ID));
         CREATE TABLE [~TMPCLP42] (X INTEGER);
         CREATE TABLE MSysAccessStorage (ID INTEGER);
         CREATE VIEW ActiveCustomers AS SELECT * FROM Customers;
         INSERT INTO Customers (ID, Name) VALUES (1, 'Ada'), (2, 'Grace');
         INSERT INTO [~TMPCLP42] (X) VALUES (7);",
    )
    .unwrap();
    conn.close().unwrap();
    (dir, path)
}

fn connected() -> (AccessGateway, tempfile::TempDir) {
    let (dir, path) = sample_database();
    let mut gateway = AccessGateway::sqlite();
    gateway.connect(&path).unwrap();
    (gateway, dir)
}

// =============================================================================
// Connection Tests
// =============================================================================

#[test]
fn test_connect_and_disconnect() {
    let (dir, path) = sample_database();
    let mut gateway = AccessGateway::sqlite();
    assert_eq!(gateway.driver_name(), "sqlite");

    gateway.connect(&path).unwrap();
    assert!(gateway.is_connected());
    assert_eq!(gateway.database_path(), Some(path.as_path()));

    gateway.disconnect();
    gateway.disconnect();
    assert!(!gateway.is_connected());
    assert!(gateway.database_path().is_none());
    drop(dir);
}

#[test]
fn test_connect_to_non_database_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("readme.accdb");
    std::fs::write(&path, "plain text that is long enough to not be a database header").unwrap();

    let mut gateway = AccessGateway::sqlite();
    let err = gateway.connect(&path).unwrap_err();
    assert!(matches!(err, GatewayError::ConnectionError { .. }));
    assert!(!gateway.is_connected());
}

#[test]
fn test_connect_outside_allowed_paths() {
    let (_dir, path) = sample_database();
    let allowed = tempfile::tempdir().unwrap();

    let mut gateway = AccessGateway::sqlite().with_allowed_paths(vec![allowed.path().to_path_buf()]);
    let err = gateway.connect(&path).unwrap_err();
    assert!(matches!(err, GatewayError::AccessDenied));
    assert!(!gateway.is_connected());
}

// =============================================================================
// Schema Tests
// =============================================================================

#[test]
fn test_list_tables_skips_temporary_tables() {
    let (gateway, _dir) = connected();

    let tables = gateway.list_tables().unwrap();
    let names: Vec<_> = tables.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["Customers", "Orders", "MSysAccessStorage"]);

    let customers = &tables[0];
    assert_eq!(customers.record_count, 2);
    assert_eq!(customers.fields[1].name, "Name");
    assert_eq!(customers.fields[1].size, 40);
    assert!(customers.fields[1].required);
}

#[test]
fn test_list_queries_and_relationships() {
    let (gateway, _dir) = connected();

    let queries = gateway.list_queries().unwrap();
    assert_eq!(queries.len(), 1);
    assert_eq!(queries[0].name, "ActiveCustomers");
    assert!(queries[0].sql.is_empty());

    let relationships = gateway.list_relationships().unwrap();
    assert_eq!(relationships.len(), 1);
    assert_eq!(relationships[0].table, "Orders");
    assert_eq!(relationships[0].foreign_table, "Customers");
}

#[test]
fn test_list_system_tables() {
    let (gateway, _dir) = connected();

    let tables = gateway.list_system_tables().unwrap();
    let names: Vec<_> = tables.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["~TMPCLP42", "MSysAccessStorage"]);
    assert_eq!(tables[0].record_count, 1);
}

#[test]
fn test_record_count_degrades_to_zero() {
    let (gateway, _dir) = connected();

    assert_eq!(gateway.table_record_count("Customers").unwrap(), 2);
    assert_eq!(gateway.table_record_count("NoSuchTable").unwrap(), 0);
}

#[test]
fn test_create_and_delete_table() {
    let (mut gateway, _dir) = connected();

    let fields = vec![
        FieldInfo {
            name: "SKU".to_string(),
            field_type: "varchar".to_string(),
            size: 12,
            required: true,
            allow_zero_length: false,
        },
        FieldInfo {
            name: "Unit Price".to_string(),
            field_type: "currency".to_string(),
            size: 8,
            required: false,
            allow_zero_length: true,
        },
    ];
    gateway.create_table("Price List", &fields).unwrap();

    let tables = gateway.list_tables().unwrap();
    let created = tables.iter().find(|t| t.name == "Price List").unwrap();
    assert_eq!(created.fields.len(), 2);
    assert_eq!(created.fields[0].field_type, "varchar");
    assert_eq!(created.fields[0].size, 12);
    assert_eq!(created.fields[1].name, "Unit Price");
    assert_eq!(created.fields[1].size, 0);

    let err = gateway.create_table("Price List", &fields).unwrap_err();
    assert!(matches!(err, GatewayError::BackendError(_)));

    gateway.delete_table("Price List").unwrap();
    assert!(gateway
        .list_tables()
        .unwrap()
        .iter()
        .all(|t| t.name != "Price List"));

    let err = gateway.delete_table("Price List").unwrap_err();
    assert!(err.to_string().contains("no such table"));
}

#[test]
fn test_create_table_with_precision_and_scale() {
    let (mut gateway, _dir) = connected();

    let fields = vec![FieldInfo {
        name: "Amount".to_string(),
        field_type: "decimal(10,2)".to_string(),
        size: 0,
        required: true,
        allow_zero_length: false,
    }];
    gateway.create_table("Prices", &fields).unwrap();

    let tables = gateway.list_tables().unwrap();
    let created = tables.iter().find(|t| t.name == "Prices").unwrap();
    assert_eq!(created.fields.len(), 1);
    assert_eq!(created.fields[0].name, "Amount");
    assert_eq!(created.fields[0].field_type, "decimal");
    assert_eq!(created.fields[0].size, 10);
    assert!(created.fields[0].required);
}

#[test]
fn test_rejects_unquotable_table_name() {
    let (mut gateway, _dir) = connected();

    let err = gateway.delete_table("Customers]; DROP TABLE [Orders").unwrap_err();
    assert!(matches!(err, GatewayError::InvalidArgument { .. }));
    assert_eq!(gateway.table_record_count("Orders").unwrap(), 0);
    assert!(gateway.list_tables().unwrap().iter().any(|t| t.name == "Orders"));
}

// =============================================================================
// Catalog Tests
// =============================================================================

#[test]
fn test_catalog_reads_degrade_without_msysobjects() {
    let (gateway, _dir) = connected();

    assert!(gateway.list_forms().unwrap().is_empty());
    assert!(gateway.list_reports().unwrap().is_empty());
    assert!(gateway.list_macros().unwrap().is_empty());
    assert!(gateway.list_modules().unwrap().is_empty());
    assert!(gateway.list_vba_projects().unwrap().is_empty());
    assert!(gateway.object_metadata().unwrap().is_empty());
    assert!(!gateway.form_exists("frmMain").unwrap());
}

#[test]
fn test_catalog_reads_use_msysobjects_when_present() {
    let (dir, path) = sample_database();
    let conn = rusqlite::Connection::open(&path).unwrap();
    conn.execute_batch(
        "CREATE TABLE MSysObjects (Name TEXT, Type INTEGER, Flags INTEGER, DateCreate TEXT, DateUpdate TEXT);
         INSERT INTO MSysObjects VALUES ('frmMain', -32768, 0, '2024-01-01', '2024-02-01');
         INSERT INTO MSysObjects VALUES ('rptSales', -32764, 0, '2024-01-01', '2024-02-01');
         INSERT INTO MSysObjects VALUES ('modUtil', -32761, 0, '2024-01-01', '2024-02-01');",
    )
    .unwrap();
    conn.close().unwrap();

    let mut gateway = AccessGateway::sqlite();
    gateway.connect(&path).unwrap();

    let forms = gateway.list_forms().unwrap();
    assert_eq!(forms.len(), 1);
    assert_eq!(forms[0].name, "frmMain");
    assert_eq!(forms[0].object_type, "Form");

    assert!(gateway.list_macros().unwrap().is_empty());
    assert!(gateway.form_exists("frmMain").unwrap());
    assert!(!gateway.form_exists("rptSales").unwrap());

    let projects = gateway.list_vba_projects().unwrap();
    assert_eq!(projects.len(), 1);
    assert_eq!(projects[0].modules.len(), 1);
    assert_eq!(projects[0].modules[0].name, "modUtil");

    let metadata = gateway.object_metadata().unwrap();
    assert_eq!(metadata.len(), 3);
    assert_eq!(metadata[0].object_type, "-32768");
    assert_eq!(metadata[0].date_modified, "2024-02-01");
    drop(dir);
}
