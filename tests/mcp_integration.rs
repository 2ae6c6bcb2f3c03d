//! Integration tests for MCP protocol handling.
//!
//! These tests drive the server end-to-end through in-memory streams: one
//! request per input line, one response per output line.

use std::io;
use std::path::Path;

use serde_json::{json, Value};

use access_mcp::access::AccessGateway;
use access_mcp::mcp::server::{McpServer, ServerState};
use access_mcp::mcp::transport::LineTransport;

// =============================================================================
// Helpers
// =============================================================================

/// Runs the server over `input` and returns the response lines.
async fn run_lines(input: &str, default_database: Option<&Path>) -> Vec<String> {
    let transport = LineTransport::new(input.as_bytes(), Vec::new());
    let mut server = McpServer::new(transport, AccessGateway::sqlite())
        .with_default_database(default_database.map(Path::to_path_buf));

    server.serve().await.expect("serve should end cleanly at EOF");
    assert_eq!(server.state(), ServerState::Closed);

    String::from_utf8(server.into_writer())
        .expect("output is UTF-8")
        .lines()
        .map(str::to_string)
        .collect()
}

/// Builds a `tools/call` request line.
fn call(id: i64, name: &str, arguments: &Value) -> String {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": "tools/call",
        "params": { "name": name, "arguments": arguments }
    })
    .to_string()
}

fn parse(line: &str) -> Value {
    serde_json::from_str(line).expect("response is JSON")
}

/// Creates an empty database file.
fn empty_database(dir: &tempfile::TempDir, name: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, b"").expect("create database file");
    path
}

// =============================================================================
// Protocol Tests
// =============================================================================

#[tokio::test]
async fn test_initialize_response() {
    let lines = run_lines(
        "{\"jsonrpc\":\"2.0\",\"id\":1,\"method\":\"initialize\",\"params\":{}}\n",
        None,
    )
    .await;

    assert_eq!(lines.len(), 1);
    let response = parse(&lines[0]);
    assert_eq!(response["jsonrpc"], "2.0");
    assert_eq!(response["id"], 1);
    assert_eq!(response["result"]["protocolVersion"], "2024-11-05");
    assert_eq!(response["result"]["capabilities"], json!({}));
    assert_eq!(response["result"]["serverInfo"]["name"], "access-mcp");
    assert!(response["result"]["serverInfo"]["version"].is_string());
}

#[tokio::test]
async fn test_get_tables_before_connect_exact_line() {
    let input = format!("{}\n", call(5, "get_tables", &json!({})));
    let lines = run_lines(&input, None).await;

    assert_eq!(
        lines,
        vec![r#"{"jsonrpc":"2.0","id":5,"result":{"success":false,"error":"Not connected to database"}}"#]
    );
}

#[tokio::test]
async fn test_invalid_json_is_dropped_and_loop_continues() {
    let input = format!("not-json\n{}\n", call(2, "is_connected", &json!({})));
    let lines = run_lines(&input, None).await;

    assert_eq!(lines.len(), 1);
    let response = parse(&lines[0]);
    assert_eq!(response["id"], 2);
    assert_eq!(response["result"], json!({ "success": true, "connected": false }));
}

#[tokio::test]
async fn test_invalid_utf8_line_is_dropped_and_loop_continues() {
    let mut input = Vec::new();
    input.extend_from_slice(b"\xff\xfe garbage\n");
    input.extend_from_slice(call(2, "is_connected", &json!({})).as_bytes());
    input.push(b'\n');

    let transport = LineTransport::new(&input[..], Vec::new());
    let mut server = McpServer::new(transport, AccessGateway::sqlite());
    server.serve().await.expect("serve should end cleanly at EOF");
    assert_eq!(server.state(), ServerState::Closed);

    let output = String::from_utf8(server.into_writer()).unwrap();
    let lines: Vec<_> = output.lines().collect();
    assert_eq!(lines.len(), 1);
    let response = parse(lines[0]);
    assert_eq!(response["id"], 2);
    assert_eq!(response["result"], json!({ "success": true, "connected": false }));
}

#[tokio::test]
async fn test_missing_method_gets_no_response() {
    let input = format!(
        "{{\"jsonrpc\":\"2.0\",\"id\":1}}\n{}\n",
        call(2, "is_connected", &json!({}))
    );
    let lines = run_lines(&input, None).await;

    assert_eq!(lines.len(), 1);
    assert_eq!(parse(&lines[0])["id"], 2);
}

#[tokio::test]
async fn test_missing_id_defaults_to_zero() {
    let lines = run_lines("{\"method\":\"tools/list\"}\n", None).await;
    assert_eq!(parse(&lines[0])["id"], 0);
}

#[tokio::test]
async fn test_blank_lines_are_ignored() {
    let input = format!("\n   \n{}\n\n", call(3, "is_connected", &json!({})));
    let lines = run_lines(&input, None).await;
    assert_eq!(lines.len(), 1);
}

#[tokio::test]
async fn test_unknown_tool() {
    let input = format!("{}\n", call(9, "format_disk", &json!({})));
    let lines = run_lines(&input, None).await;

    let response = parse(&lines[0]);
    assert_eq!(response["id"], 9);
    assert_eq!(response["result"], json!({ "error": "Unknown tool: format_disk" }));
}

#[tokio::test]
async fn test_unknown_method() {
    let lines = run_lines("{\"id\":4,\"method\":\"resources/list\"}\n", None).await;

    let response = parse(&lines[0]);
    assert_eq!(response["id"], 4);
    assert_eq!(
        response["result"],
        json!({ "error": "Unknown method: resources/list" })
    );
}

#[tokio::test]
async fn test_tools_call_without_arguments_is_dropped() {
    let input = format!(
        "{{\"id\":1,\"method\":\"tools/call\",\"params\":{{\"name\":\"get_tables\"}}}}\n{}\n",
        call(2, "is_connected", &json!({}))
    );
    let lines = run_lines(&input, None).await;

    assert_eq!(lines.len(), 1);
    assert_eq!(parse(&lines[0])["id"], 2);
}

#[tokio::test]
async fn test_tools_list_is_stable() {
    let input = "{\"id\":1,\"method\":\"tools/list\"}\n{\"id\":2,\"method\":\"tools/list\"}\n";
    let lines = run_lines(input, None).await;

    let first = parse(&lines[0]);
    let second = parse(&lines[1]);
    assert_eq!(first["result"], second["result"]);

    let tools = first["result"]["tools"].as_array().expect("tools array");
    assert_eq!(tools.len(), 33);
    assert_eq!(tools[0]["name"], "connect_access");

    let create = tools
        .iter()
        .find(|t| t["name"] == "create_table")
        .expect("create_table listed");
    assert_eq!(create["required"], json!(["table_name", "fields"]));
    assert_eq!(
        create["inputSchema"]["required"],
        json!(["table_name", "fields"])
    );
}

#[tokio::test]
async fn test_responses_follow_request_order() {
    let input = (1..=5)
        .map(|id| call(id, "is_connected", &json!({})))
        .collect::<Vec<_>>()
        .join("\n");
    let lines = run_lines(&input, None).await;

    let ids: Vec<_> = lines.iter().map(|l| parse(l)["id"].clone()).collect();
    assert_eq!(ids, vec![json!(1), json!(2), json!(3), json!(4), json!(5)]);
}

#[tokio::test]
async fn test_read_error_ends_serve_with_error() {
    let reader = tokio_test::io::Builder::new()
        .read(b"{\"id\":1,\"method\":\"tools/list\"}\n")
        .read_error(io::Error::new(io::ErrorKind::BrokenPipe, "stdin closed"))
        .build();
    let transport = LineTransport::new(tokio::io::BufReader::new(reader), Vec::new());
    let mut server = McpServer::new(transport, AccessGateway::sqlite());

    let err = server.serve().await.unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    assert_eq!(server.state(), ServerState::Closed);

    let output = String::from_utf8(server.into_writer()).unwrap();
    assert_eq!(output.lines().count(), 1);
}

// =============================================================================
// Tool Behaviour Tests
// =============================================================================

#[tokio::test]
async fn test_disconnect_is_idempotent() {
    let input = format!(
        "{}\n{}\n",
        call(1, "disconnect_access", &json!({})),
        call(2, "disconnect_access", &json!({}))
    );
    let lines = run_lines(&input, None).await;

    for line in &lines {
        assert_eq!(
            parse(line)["result"],
            json!({ "success": true, "message": "Disconnected from database" })
        );
    }
}

#[tokio::test]
async fn test_required_argument_missing() {
    let input = format!(
        "{}\n{}\n",
        call(1, "open_form", &json!({})),
        call(2, "get_vba_code", &json!({ "project_name": "CurrentProject", "module_name": "" }))
    );
    let lines = run_lines(&input, None).await;

    assert_eq!(
        parse(&lines[0])["result"],
        json!({ "success": false, "error": "form_name is required" })
    );
    assert_eq!(
        parse(&lines[1])["result"],
        json!({ "success": false, "error": "module_name is required" })
    );
}

#[tokio::test]
async fn test_connect_uses_default_database() {
    let dir = tempfile::tempdir().unwrap();
    let path = empty_database(&dir, "orders.db");

    let input = format!(
        "{}\n{}\n",
        call(1, "connect_access", &json!({})),
        call(2, "is_connected", &json!({}))
    );
    let lines = run_lines(&input, Some(path.as_path())).await;

    let connect = parse(&lines[0]);
    assert_eq!(connect["result"]["success"], true);
    assert_eq!(connect["result"]["connected"], true);
    assert_eq!(
        connect["result"]["database_path"],
        path.display().to_string()
    );
    assert_eq!(parse(&lines[1])["result"]["connected"], true);
}

#[tokio::test]
async fn test_connect_without_any_path() {
    let input = format!("{}\n", call(1, "connect_access", &json!({})));
    let lines = run_lines(&input, None).await;

    assert_eq!(
        parse(&lines[0])["result"],
        json!({ "success": false, "error": "database_path is required" })
    );
}

#[tokio::test]
async fn test_create_list_delete_table_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = empty_database(&dir, "parts.db");
    let path_arg = json!({ "database_path": path.display().to_string() });

    let input = [
        call(1, "connect_access", &path_arg),
        call(
            2,
            "create_table",
            &json!({
                "table_name": "T",
                "fields": [{ "name": "ID", "type": "text", "size": 10, "required": true }]
            }),
        ),
        call(3, "get_tables", &json!({})),
        call(4, "delete_table", &json!({ "table_name": "T" })),
        call(5, "get_tables", &json!({})),
    ]
    .join("\n");
    let lines = run_lines(&input, None).await;
    assert_eq!(lines.len(), 5);

    assert_eq!(parse(&lines[0])["result"]["success"], true);
    assert_eq!(
        parse(&lines[1])["result"],
        json!({ "success": true, "message": "Created table T" })
    );

    let tables = parse(&lines[2])["result"]["tables"].clone();
    let table = tables
        .as_array()
        .unwrap()
        .iter()
        .find(|t| t["name"] == "T")
        .expect("T is listed");
    assert_eq!(table["record_count"], 0);
    let fields = table["fields"].as_array().unwrap();
    assert_eq!(fields.len(), 1);
    assert_eq!(fields[0]["name"], "ID");
    assert_eq!(fields[0]["type"], "text");
    assert_eq!(fields[0]["size"], 10);
    assert_eq!(fields[0]["required"], true);

    assert_eq!(parse(&lines[3])["result"]["success"], true);
    let tables = parse(&lines[4])["result"]["tables"].clone();
    assert!(tables.as_array().unwrap().iter().all(|t| t["name"] != "T"));
}

#[tokio::test]
async fn test_catalog_reads_degrade_to_empty() {
    let dir = tempfile::tempdir().unwrap();
    let path = empty_database(&dir, "catalog.db");

    let input = [
        call(1, "connect_access", &json!({ "database_path": path.display().to_string() })),
        call(2, "get_forms", &json!({})),
        call(3, "form_exists", &json!({ "form_name": "frmMain" })),
        call(4, "get_object_metadata", &json!({})),
    ]
    .join("\n");
    let lines = run_lines(&input, None).await;

    assert_eq!(parse(&lines[1])["result"], json!({ "success": true, "forms": [] }));
    assert_eq!(
        parse(&lines[2])["result"],
        json!({ "success": true, "exists": false })
    );
    assert_eq!(
        parse(&lines[3])["result"],
        json!({ "success": true, "metadata": [] })
    );
}

#[tokio::test]
async fn test_export_then_import_form() {
    let dir = tempfile::tempdir().unwrap();
    let path = empty_database(&dir, "forms.db");

    let input = [
        call(1, "connect_access", &json!({ "database_path": path.display().to_string() })),
        call(2, "export_form_to_text", &json!({ "form_name": "frmOrders" })),
    ]
    .join("\n");
    let lines = run_lines(&input, None).await;
    let form_data = parse(&lines[1])["result"]["form_data"]
        .as_str()
        .expect("form_data is a string")
        .to_string();

    let input = [
        call(1, "connect_access", &json!({ "database_path": path.display().to_string() })),
        call(2, "import_form_from_text", &json!({ "form_data": form_data })),
        call(3, "import_form_from_text", &json!({ "form_data": "garbage" })),
    ]
    .join("\n");
    let lines = run_lines(&input, None).await;

    assert_eq!(
        parse(&lines[1])["result"],
        json!({ "success": true, "message": "Imported form frmOrders" })
    );
    let failed = parse(&lines[2]);
    assert_eq!(failed["result"]["success"], false);
    assert!(failed["result"]["error"]
        .as_str()
        .unwrap()
        .starts_with("Invalid form data"));
}
