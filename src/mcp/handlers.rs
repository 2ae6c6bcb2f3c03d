//! Tool handlers.
//!
//! Each handler extracts its arguments, calls exactly one gateway operation
//! and returns the payload keys merged into `{"success": true, ...}`.
//! Required-argument checks happen in [`invoke`](crate::mcp::tools::invoke)
//! before a handler runs.

use std::path::Path;

use serde_json::json;

use crate::access::models::FieldInfo;
use crate::mcp::tools::{payload, Tool, ToolArguments, ToolContext, ToolError, ToolOutcome};

/// Builds the full tool catalogue in the order `tools/list` reports it.
#[must_use]
#[allow(clippy::too_many_lines)] // One entry per tool
pub fn catalogue() -> Vec<Tool> {
    let none = || json!({});
    let string = || json!({ "type": "string" });

    vec![
        // Connection
        Tool::new(
            "connect_access",
            "Connect to an Access database. Uses the configured database when no path is given",
            json!({ "database_path": string() }),
            &[],
            connect_access,
        ),
        Tool::new(
            "disconnect_access",
            "Disconnect from the current Access database",
            none(),
            &[],
            disconnect_access,
        ),
        Tool::new(
            "is_connected",
            "Check if connected to an Access database",
            none(),
            &[],
            is_connected,
        ),
        // Schema
        Tool::new(
            "get_tables",
            "Get list of all tables in the database",
            none(),
            &[],
            get_tables,
        ),
        Tool::new(
            "get_queries",
            "Get list of all queries in the database",
            none(),
            &[],
            get_queries,
        ),
        Tool::new(
            "get_relationships",
            "Get list of all relationships in the database",
            none(),
            &[],
            get_relationships,
        ),
        Tool::new(
            "create_table",
            "Create a new table in the database",
            json!({
                "table_name": string(),
                "fields": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "name": { "type": "string" },
                            "type": { "type": "string" },
                            "size": { "type": "integer" },
                            "required": { "type": "boolean" },
                            "allow_zero_length": { "type": "boolean" }
                        }
                    }
                }
            }),
            &["table_name", "fields"],
            create_table,
        ),
        Tool::new(
            "delete_table",
            "Delete a table from the database",
            json!({ "table_name": string() }),
            &["table_name"],
            delete_table,
        ),
        // Application
        Tool::new(
            "launch_access",
            "Launch Microsoft Access application",
            none(),
            &[],
            launch_access,
        ),
        Tool::new(
            "close_access",
            "Close Microsoft Access application",
            none(),
            &[],
            close_access,
        ),
        // Catalog
        Tool::new(
            "get_forms",
            "Get list of all forms in the database",
            none(),
            &[],
            get_forms,
        ),
        Tool::new(
            "get_reports",
            "Get list of all reports in the database",
            none(),
            &[],
            get_reports,
        ),
        Tool::new(
            "get_macros",
            "Get list of all macros in the database",
            none(),
            &[],
            get_macros,
        ),
        Tool::new(
            "get_modules",
            "Get list of all modules in the database",
            none(),
            &[],
            get_modules,
        ),
        Tool::new(
            "open_form",
            "Open a form in Access",
            json!({ "form_name": string() }),
            &["form_name"],
            open_form,
        ),
        Tool::new(
            "close_form",
            "Close a form in Access",
            json!({ "form_name": string() }),
            &["form_name"],
            close_form,
        ),
        // VBA
        Tool::new(
            "get_vba_projects",
            "Get list of VBA projects",
            none(),
            &[],
            get_vba_projects,
        ),
        Tool::new(
            "get_vba_code",
            "Get VBA code from a module",
            json!({ "project_name": string(), "module_name": string() }),
            &["project_name", "module_name"],
            get_vba_code,
        ),
        Tool::new(
            "set_vba_code",
            "Set VBA code in a module",
            json!({
                "project_name": string(),
                "module_name": string(),
                "code": string()
            }),
            &["project_name", "module_name", "code"],
            set_vba_code,
        ),
        Tool::new(
            "add_vba_procedure",
            "Add a VBA procedure to a module",
            json!({
                "project_name": string(),
                "module_name": string(),
                "procedure_name": string(),
                "code": string()
            }),
            &["project_name", "module_name", "procedure_name", "code"],
            add_vba_procedure,
        ),
        Tool::new("compile_vba", "Compile VBA code", none(), &[], compile_vba),
        // Metadata
        Tool::new(
            "get_system_tables",
            "Get list of system tables",
            none(),
            &[],
            get_system_tables,
        ),
        Tool::new(
            "get_object_metadata",
            "Get metadata for database objects",
            none(),
            &[],
            get_object_metadata,
        ),
        Tool::new(
            "form_exists",
            "Check if a form exists",
            json!({ "form_name": string() }),
            &["form_name"],
            form_exists,
        ),
        // Form design
        Tool::new(
            "get_form_controls",
            "Get list of controls in a form",
            json!({ "form_name": string() }),
            &["form_name"],
            get_form_controls,
        ),
        Tool::new(
            "get_control_properties",
            "Get properties of a control",
            json!({ "form_name": string(), "control_name": string() }),
            &["form_name", "control_name"],
            get_control_properties,
        ),
        Tool::new(
            "set_control_property",
            "Set a property of a control",
            json!({
                "form_name": string(),
                "control_name": string(),
                "property_name": string(),
                "value": string()
            }),
            &["form_name", "control_name", "property_name", "value"],
            set_control_property,
        ),
        // Persistence
        Tool::new(
            "export_form_to_text",
            "Export a form to text format",
            json!({ "form_name": string() }),
            &["form_name"],
            export_form_to_text,
        ),
        Tool::new(
            "import_form_from_text",
            "Import a form from text format",
            json!({ "form_data": string() }),
            &["form_data"],
            import_form_from_text,
        ),
        Tool::new(
            "delete_form",
            "Delete a form from the database",
            json!({ "form_name": string() }),
            &["form_name"],
            delete_form,
        ),
        Tool::new(
            "export_report_to_text",
            "Export a report to text format",
            json!({ "report_name": string() }),
            &["report_name"],
            export_report_to_text,
        ),
        Tool::new(
            "import_report_from_text",
            "Import a report from text format",
            json!({ "report_data": string() }),
            &["report_data"],
            import_report_from_text,
        ),
        Tool::new(
            "delete_report",
            "Delete a report from the database",
            json!({ "report_name": string() }),
            &["report_name"],
            delete_report,
        ),
    ]
}

// ==================== Connection ====================

fn connect_access(ctx: &mut ToolContext<'_>, args: &ToolArguments<'_>) -> ToolOutcome {
    let path = match args.optional_str("database_path")? {
        Some(path) => Path::new(path),
        None => ctx
            .default_database
            .ok_or_else(|| ToolError::missing("database_path"))?,
    };

    ctx.gateway.connect(path)?;

    Ok(payload(json!({
        "message": format!("Connected to {}", path.display()),
        "connected": ctx.gateway.is_connected(),
        "database_path": path.display().to_string(),
    })))
}

fn disconnect_access(ctx: &mut ToolContext<'_>, _: &ToolArguments<'_>) -> ToolOutcome {
    ctx.gateway.disconnect();
    Ok(payload(json!({ "message": "Disconnected from database" })))
}

fn is_connected(ctx: &mut ToolContext<'_>, _: &ToolArguments<'_>) -> ToolOutcome {
    Ok(payload(json!({ "connected": ctx.gateway.is_connected() })))
}

// ==================== Schema ====================

fn get_tables(ctx: &mut ToolContext<'_>, _: &ToolArguments<'_>) -> ToolOutcome {
    let tables = ctx.gateway.list_tables()?;
    Ok(payload(json!({ "tables": tables })))
}

fn get_queries(ctx: &mut ToolContext<'_>, _: &ToolArguments<'_>) -> ToolOutcome {
    let queries = ctx.gateway.list_queries()?;
    Ok(payload(json!({ "queries": queries })))
}

fn get_relationships(ctx: &mut ToolContext<'_>, _: &ToolArguments<'_>) -> ToolOutcome {
    let relationships = ctx.gateway.list_relationships()?;
    Ok(payload(json!({ "relationships": relationships })))
}

fn create_table(ctx: &mut ToolContext<'_>, args: &ToolArguments<'_>) -> ToolOutcome {
    let table_name = args.str("table_name")?;
    let fields: Vec<FieldInfo> = args.parse("fields")?;

    ctx.gateway.create_table(table_name, &fields)?;
    Ok(payload(json!({ "message": format!("Created table {table_name}") })))
}

fn delete_table(ctx: &mut ToolContext<'_>, args: &ToolArguments<'_>) -> ToolOutcome {
    let table_name = args.str("table_name")?;

    ctx.gateway.delete_table(table_name)?;
    Ok(payload(json!({ "message": format!("Deleted table {table_name}") })))
}

// ==================== Application ====================

fn launch_access(ctx: &mut ToolContext<'_>, _: &ToolArguments<'_>) -> ToolOutcome {
    ctx.gateway.launch_app()?;
    Ok(payload(json!({ "message": "Access launched successfully" })))
}

fn close_access(ctx: &mut ToolContext<'_>, _: &ToolArguments<'_>) -> ToolOutcome {
    ctx.gateway.close_app()?;
    Ok(payload(json!({ "message": "Access closed successfully" })))
}

// ==================== Catalog ====================

fn get_forms(ctx: &mut ToolContext<'_>, _: &ToolArguments<'_>) -> ToolOutcome {
    let forms = ctx.gateway.list_forms()?;
    Ok(payload(json!({ "forms": forms })))
}

fn get_reports(ctx: &mut ToolContext<'_>, _: &ToolArguments<'_>) -> ToolOutcome {
    let reports = ctx.gateway.list_reports()?;
    Ok(payload(json!({ "reports": reports })))
}

fn get_macros(ctx: &mut ToolContext<'_>, _: &ToolArguments<'_>) -> ToolOutcome {
    let macros = ctx.gateway.list_macros()?;
    Ok(payload(json!({ "macros": macros })))
}

fn get_modules(ctx: &mut ToolContext<'_>, _: &ToolArguments<'_>) -> ToolOutcome {
    let modules = ctx.gateway.list_modules()?;
    Ok(payload(json!({ "modules": modules })))
}

fn open_form(ctx: &mut ToolContext<'_>, args: &ToolArguments<'_>) -> ToolOutcome {
    let form_name = args.str("form_name")?;

    ctx.gateway.open_form(form_name)?;
    Ok(payload(json!({ "message": format!("Opened form {form_name}") })))
}

fn close_form(ctx: &mut ToolContext<'_>, args: &ToolArguments<'_>) -> ToolOutcome {
    let form_name = args.str("form_name")?;

    ctx.gateway.close_form(form_name)?;
    Ok(payload(json!({ "message": format!("Closed form {form_name}") })))
}

// ==================== VBA ====================

fn get_vba_projects(ctx: &mut ToolContext<'_>, _: &ToolArguments<'_>) -> ToolOutcome {
    let projects = ctx.gateway.list_vba_projects()?;
    Ok(payload(json!({ "projects": projects })))
}

fn get_vba_code(ctx: &mut ToolContext<'_>, args: &ToolArguments<'_>) -> ToolOutcome {
    let project_name = args.str("project_name")?;
    let module_name = args.str("module_name")?;

    let code = ctx.gateway.vba_code(project_name, module_name)?;
    Ok(payload(json!({ "code": code })))
}

fn set_vba_code(ctx: &mut ToolContext<'_>, args: &ToolArguments<'_>) -> ToolOutcome {
    let project_name = args.str("project_name")?;
    let module_name = args.str("module_name")?;
    let code = args.str("code")?;

    ctx.gateway.set_vba_code(project_name, module_name, code)?;
    Ok(payload(json!({
        "message": format!("Updated VBA code in {module_name}")
    })))
}

fn add_vba_procedure(ctx: &mut ToolContext<'_>, args: &ToolArguments<'_>) -> ToolOutcome {
    let project_name = args.str("project_name")?;
    let module_name = args.str("module_name")?;
    let procedure_name = args.str("procedure_name")?;
    let code = args.str("code")?;

    ctx.gateway
        .add_vba_procedure(project_name, module_name, procedure_name, code)?;
    Ok(payload(json!({
        "message": format!("Added VBA procedure {procedure_name}")
    })))
}

fn compile_vba(ctx: &mut ToolContext<'_>, _: &ToolArguments<'_>) -> ToolOutcome {
    ctx.gateway.compile_vba()?;
    Ok(payload(json!({ "message": "VBA compiled successfully" })))
}

// ==================== Metadata ====================

fn get_system_tables(ctx: &mut ToolContext<'_>, _: &ToolArguments<'_>) -> ToolOutcome {
    let system_tables = ctx.gateway.list_system_tables()?;
    Ok(payload(json!({ "system_tables": system_tables })))
}

fn get_object_metadata(ctx: &mut ToolContext<'_>, _: &ToolArguments<'_>) -> ToolOutcome {
    let metadata = ctx.gateway.object_metadata()?;
    Ok(payload(json!({ "metadata": metadata })))
}

fn form_exists(ctx: &mut ToolContext<'_>, args: &ToolArguments<'_>) -> ToolOutcome {
    let form_name = args.str("form_name")?;

    let exists = ctx.gateway.form_exists(form_name)?;
    Ok(payload(json!({ "exists": exists })))
}

// ==================== Form design ====================

fn get_form_controls(ctx: &mut ToolContext<'_>, args: &ToolArguments<'_>) -> ToolOutcome {
    let form_name = args.str("form_name")?;

    let controls = ctx.gateway.form_controls(form_name)?;
    Ok(payload(json!({ "controls": controls })))
}

fn get_control_properties(ctx: &mut ToolContext<'_>, args: &ToolArguments<'_>) -> ToolOutcome {
    let form_name = args.str("form_name")?;
    let control_name = args.str("control_name")?;

    let properties = ctx.gateway.control_properties(form_name, control_name)?;
    Ok(payload(json!({ "properties": properties })))
}

fn set_control_property(ctx: &mut ToolContext<'_>, args: &ToolArguments<'_>) -> ToolOutcome {
    let form_name = args.str("form_name")?;
    let control_name = args.str("control_name")?;
    let property_name = args.str("property_name")?;
    // Any JSON value is passed through; the schema advertises a string.
    let value = args.value("value")?;

    ctx.gateway
        .set_control_property(form_name, control_name, property_name, value)?;
    Ok(payload(json!({
        "message": format!("Updated property {property_name}")
    })))
}

// ==================== Persistence ====================

fn export_form_to_text(ctx: &mut ToolContext<'_>, args: &ToolArguments<'_>) -> ToolOutcome {
    let form_name = args.str("form_name")?;

    let form_data = ctx.gateway.export_form(form_name)?;
    Ok(payload(json!({ "form_data": form_data })))
}

fn import_form_from_text(ctx: &mut ToolContext<'_>, args: &ToolArguments<'_>) -> ToolOutcome {
    let form_data = args.str("form_data")?;

    let form_name = ctx.gateway.import_form(form_data)?;
    Ok(payload(json!({ "message": format!("Imported form {form_name}") })))
}

fn delete_form(ctx: &mut ToolContext<'_>, args: &ToolArguments<'_>) -> ToolOutcome {
    let form_name = args.str("form_name")?;

    ctx.gateway.delete_form(form_name)?;
    Ok(payload(json!({ "message": format!("Deleted form {form_name}") })))
}

fn export_report_to_text(ctx: &mut ToolContext<'_>, args: &ToolArguments<'_>) -> ToolOutcome {
    let report_name = args.str("report_name")?;

    let report_data = ctx.gateway.export_report(report_name)?;
    Ok(payload(json!({ "report_data": report_data })))
}

fn import_report_from_text(ctx: &mut ToolContext<'_>, args: &ToolArguments<'_>) -> ToolOutcome {
    let report_data = args.str("report_data")?;

    let report_name = ctx.gateway.import_report(report_data)?;
    Ok(payload(json!({
        "message": format!("Imported report {report_name}")
    })))
}

fn delete_report(ctx: &mut ToolContext<'_>, args: &ToolArguments<'_>) -> ToolOutcome {
    let report_name = args.str("report_name")?;

    ctx.gateway.delete_report(report_name)?;
    Ok(payload(json!({ "message": format!("Deleted report {report_name}") })))
}
