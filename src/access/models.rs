//! Metadata records returned by gateway operations.
//!
//! These are transient query results. They carry no identity beyond their
//! name and are serialised straight into tool result payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user table with its fields and row count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableInfo {
    /// Table name.
    pub name: String,
    /// Column definitions in declaration order.
    pub fields: Vec<FieldInfo>,
    /// Number of rows (0 when the count could not be read).
    pub record_count: i64,
}

/// A column definition, used both for reading schema and for `create_table`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldInfo {
    /// Column name.
    pub name: String,
    /// Declared data type (e.g. `text`, `long`, `datetime`).
    #[serde(rename = "type")]
    pub field_type: String,
    /// Maximum length for variable-length text types, 0 otherwise.
    #[serde(default)]
    pub size: u32,
    /// Whether the column is `NOT NULL`.
    #[serde(default)]
    pub required: bool,
    /// Whether empty strings are accepted.
    #[serde(default = "default_true")]
    pub allow_zero_length: bool,
}

const fn default_true() -> bool {
    true
}

/// A saved query (view).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryInfo {
    /// Query name.
    pub name: String,
    /// SQL text. Empty because schema listing does not expose it.
    pub sql: String,
    /// Always `"Query"`.
    #[serde(rename = "type")]
    pub query_type: String,
}

/// A foreign-key relationship between two tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelationshipInfo {
    /// Relationship name.
    pub name: String,
    /// Referencing table.
    pub table: String,
    /// Referenced table.
    pub foreign_table: String,
    /// Relationship attributes (not exposed by the driver).
    pub attributes: String,
}

/// Kinds of application objects stored in the `MSysObjects` catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    /// A form.
    Form,
    /// A report.
    Report,
    /// A macro.
    Macro,
    /// A VBA module.
    Module,
}

impl ObjectKind {
    /// The `Type` discriminant used by the catalog for this kind.
    #[must_use]
    pub const fn type_code(self) -> i32 {
        match self {
            Self::Form => -32768,
            Self::Report => -32764,
            Self::Macro => -32766,
            Self::Module => -32761,
        }
    }

    /// Display name reported in the `type` field.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Form => "Form",
            Self::Report => "Report",
            Self::Macro => "Macro",
            Self::Module => "Module",
        }
    }
}

/// A form, report, macro or module listed from the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObjectInfo {
    /// Object name.
    pub name: String,
    /// Fully qualified name (same as `name` for catalog objects).
    pub full_name: String,
    /// Object kind label.
    #[serde(rename = "type")]
    pub object_type: String,
}

impl ObjectInfo {
    /// Creates a catalog object record.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: ObjectKind) -> Self {
        let name = name.into();
        Self {
            full_name: name.clone(),
            name,
            object_type: kind.label().to_string(),
        }
    }
}

/// A VBA project and its modules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VbaProject {
    /// Project name.
    pub name: String,
    /// Project description.
    pub description: String,
    /// Modules in the project.
    pub modules: Vec<VbaModule>,
}

/// A module inside a VBA project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VbaModule {
    /// Module name.
    pub name: String,
    /// Module kind.
    #[serde(rename = "type")]
    pub module_type: String,
    /// Whether the module has code.
    pub has_code: bool,
}

/// A system or temporary table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SystemTableInfo {
    /// Table name.
    pub name: String,
    /// Creation time. The driver does not expose it, so this is the read time.
    pub date_created: DateTime<Utc>,
    /// Last update time. Same caveat as `date_created`.
    pub last_updated: DateTime<Utc>,
    /// Number of rows (0 when the count could not be read).
    pub record_count: i64,
}

/// One row of the object catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObjectMetadata {
    /// Object name.
    pub name: String,
    /// Raw type discriminant.
    #[serde(rename = "type")]
    pub object_type: String,
    /// Raw flags value.
    pub flags: String,
    /// Creation timestamp as stored.
    pub date_created: String,
    /// Modification timestamp as stored.
    pub date_modified: String,
}

/// A control on a form or report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlInfo {
    /// Control name.
    pub name: String,
    /// Control type (e.g. `TextBox`).
    #[serde(rename = "type")]
    pub control_type: String,
    /// Left position in twips.
    pub left: i32,
    /// Top position in twips.
    pub top: i32,
    /// Width in twips.
    pub width: i32,
    /// Height in twips.
    pub height: i32,
    /// Whether the control is visible.
    pub visible: bool,
    /// Whether the control is enabled.
    pub enabled: bool,
}

/// Full property set of a control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ControlProperties {
    /// Geometry and state shared with [`ControlInfo`].
    #[serde(flatten)]
    pub control: ControlInfo,
    /// Background colour as a BGR integer.
    pub back_color: i32,
    /// Foreground colour as a BGR integer.
    pub fore_color: i32,
    /// Font face.
    pub font_name: String,
    /// Font size in points.
    pub font_size: i32,
    /// Bold font.
    pub font_bold: bool,
    /// Italic font.
    pub font_italic: bool,
}

/// Text representation of a form, produced by export and consumed by import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormExport {
    /// Form name.
    pub name: String,
    /// When the export was produced.
    #[serde(default = "Utc::now")]
    pub exported_at: DateTime<Utc>,
    /// Controls on the form.
    #[serde(default)]
    pub controls: Vec<ControlInfo>,
    /// Code-behind module text.
    #[serde(default)]
    pub vba: String,
}

/// Text representation of a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportExport {
    /// Report name.
    pub name: String,
    /// When the export was produced.
    #[serde(default = "Utc::now")]
    pub exported_at: DateTime<Utc>,
    /// Controls on the report.
    #[serde(default)]
    pub controls: Vec<ControlInfo>,
}
