//! DDL and catalog statement text.

use std::sync::OnceLock;

use regex::Regex;

use crate::access::error::{GatewayError, GatewayResult};
use crate::access::models::{FieldInfo, ObjectKind};

/// Types that take a `(size)` suffix when a size is given.
const VARIABLE_LENGTH_TYPES: [&str; 2] = ["text", "varchar"];

fn identifier_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[^\[\]\p{Cc}]+$").expect("identifier pattern is a valid regex")
    })
}

/// A type name with an optional `(precision)` or `(precision, scale)` suffix.
fn column_type_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z_][A-Za-z0-9_ ]*(\(\s*\d+\s*(,\s*\d+\s*)?\))?$")
            .expect("column type pattern is a valid regex")
    })
}

/// Wraps an object name in brackets after checking it can be quoted safely.
///
/// # Errors
///
/// Returns `InvalidArgument` for empty names or names containing brackets or
/// control characters.
pub fn quote_identifier(name: &str) -> GatewayResult<String> {
    if name.trim().is_empty() || !identifier_pattern().is_match(name) {
        return Err(GatewayError::invalid_argument(format!(
            "Invalid object name '{name}': names must be non-empty and must not contain brackets or control characters"
        )));
    }
    Ok(format!("[{name}]"))
}

/// Builds a single column definition such as `[Title] text(50) NOT NULL`.
///
/// # Errors
///
/// Returns `InvalidArgument` if the column name or type cannot be used.
pub fn column_definition(field: &FieldInfo) -> GatewayResult<String> {
    let field_type = field.field_type.trim();
    if !column_type_pattern().is_match(field_type) {
        return Err(GatewayError::invalid_argument(format!(
            "Invalid type '{}' for field '{}'",
            field.field_type, field.name
        )));
    }

    let mut definition = format!("{} {field_type}", quote_identifier(&field.name)?);
    // Only bare type names match, so an explicit `(n)` in the type wins over `size`.
    let is_variable_length = VARIABLE_LENGTH_TYPES
        .iter()
        .any(|t| t.eq_ignore_ascii_case(field_type));
    if field.size > 0 && is_variable_length {
        definition.push_str(&format!("({})", field.size));
    }
    if field.required {
        definition.push_str(" NOT NULL");
    }
    Ok(definition)
}

/// Builds `CREATE TABLE [name] (...)`.
///
/// # Errors
///
/// Returns `InvalidArgument` if there are no fields or any name is unusable.
pub fn create_table(table_name: &str, fields: &[FieldInfo]) -> GatewayResult<String> {
    if fields.is_empty() {
        return Err(GatewayError::invalid_argument(
            "A table needs at least one field",
        ));
    }

    let columns = fields
        .iter()
        .map(column_definition)
        .collect::<GatewayResult<Vec<_>>>()?;

    Ok(format!(
        "CREATE TABLE {} ({})",
        quote_identifier(table_name)?,
        columns.join(", ")
    ))
}

/// Builds `DROP TABLE [name]`.
///
/// # Errors
///
/// Returns `InvalidArgument` if the name is unusable.
pub fn drop_table(table_name: &str) -> GatewayResult<String> {
    Ok(format!("DROP TABLE {}", quote_identifier(table_name)?))
}

/// Builds `SELECT COUNT(*) FROM [name]`.
///
/// # Errors
///
/// Returns `InvalidArgument` if the name is unusable.
pub fn count_rows(table_name: &str) -> GatewayResult<String> {
    Ok(format!("SELECT COUNT(*) FROM {}", quote_identifier(table_name)?))
}

/// Catalog query listing the names of one object kind.
#[must_use]
pub fn catalog_names(kind: ObjectKind) -> String {
    format!(
        "SELECT Name FROM MSysObjects WHERE Type = {}",
        kind.type_code()
    )
}

/// Catalog query counting objects of one kind with a given name (`?`).
#[must_use]
pub fn catalog_count_named(kind: ObjectKind) -> String {
    format!(
        "SELECT COUNT(*) FROM MSysObjects WHERE Name = ? AND Type = {}",
        kind.type_code()
    )
}

/// Catalog query returning every object row.
pub const CATALOG_ALL: &str = "SELECT * FROM MSysObjects";

#[cfg(test)]
mod tests {
    use super::*;

    fn field(name: &str, field_type: &str, size: u32, required: bool) -> FieldInfo {
        FieldInfo {
            name: name.to_string(),
            field_type: field_type.to_string(),
            size,
            required,
            allow_zero_length: false,
        }
    }

    #[test]
    fn text_fields_get_size_suffix() {
        assert_eq!(
            column_definition(&field("ID", "text", 10, true)).unwrap(),
            "[ID] text(10) NOT NULL"
        );
        assert_eq!(
            column_definition(&field("Code", "VARCHAR", 4, false)).unwrap(),
            "[Code] VARCHAR(4)"
        );
    }

    #[test]
    fn fixed_length_types_ignore_size() {
        assert_eq!(
            column_definition(&field("Qty", "long", 4, false)).unwrap(),
            "[Qty] long"
        );
        assert_eq!(
            column_definition(&field("Notes", "text", 0, false)).unwrap(),
            "[Notes] text"
        );
    }

    #[test]
    fn precision_and_scale_are_kept() {
        assert_eq!(
            column_definition(&field("Price", "decimal(10,2)", 0, true)).unwrap(),
            "[Price] decimal(10,2) NOT NULL"
        );
        assert_eq!(
            column_definition(&field("Rate", "numeric(18, 4)", 8, false)).unwrap(),
            "[Rate] numeric(18, 4)"
        );
        assert_eq!(
            column_definition(&field("Code", "text(5)", 10, false)).unwrap(),
            "[Code] text(5)"
        );
    }

    #[test]
    fn rejects_malformed_types() {
        for bad in ["", "decimal(10,", "decimal(a,b)", "decimal(1,2,3)", "text(5) x", "(10)"] {
            assert!(column_definition(&field("X", bad, 0, false)).is_err(), "{bad}");
        }
    }

    #[test]
    fn create_table_statement() {
        let sql = create_table(
            "Order Lines",
            &[field("ID", "long", 0, true), field("Item", "text", 30, false)],
        )
        .unwrap();
        assert_eq!(
            sql,
            "CREATE TABLE [Order Lines] ([ID] long NOT NULL, [Item] text(30))"
        );
    }

    #[test]
    fn create_table_needs_fields() {
        assert!(create_table("Empty", &[]).is_err());
    }

    #[test]
    fn rejects_unquotable_names() {
        assert!(quote_identifier("bad]name").is_err());
        assert!(quote_identifier("line\nbreak").is_err());
        assert!(quote_identifier("   ").is_err());
        assert!(drop_table("x]; DROP TABLE y; --").is_err());
        assert!(column_definition(&field("ID", "text; DROP", 0, false)).is_err());
    }

    #[test]
    fn catalog_queries_use_type_codes() {
        assert_eq!(
            catalog_names(ObjectKind::Report),
            "SELECT Name FROM MSysObjects WHERE Type = -32764"
        );
        assert!(catalog_count_named(ObjectKind::Form).contains("Type = -32768"));
    }
}
