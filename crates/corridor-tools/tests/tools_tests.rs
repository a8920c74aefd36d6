use corridor_config::{FileGuardrails, GuardrailsConfig, ShellGuardrails};
use corridor_core::{ToolCall, ToolExecutor};
use corridor_tools::BuiltinTools;
use serde_json::json;
use tempfile::tempdir;

fn call(tool: &str, arguments: serde_json::Value) -> ToolCall {
    ToolCall {
        id: "t-1".into(),
        tool_name: tool.into(),
        arguments,
    }
}

#[tokio::test]
async fn tool_schemas_cover_every_builtin() {
    let tools = BuiltinTools::new(GuardrailsConfig::default());
    let names: Vec<&str> = tools.tools().iter().map(|s| s.name.as_str()).collect();
    for expected in [
        "calc",
        "web_fetch",
        "web_scrape",
        "web_search",
        "search_aggregate",
        "file_read",
        "file_write",
        "list_dir",
        "run_command",
        "open_app",
        "docx_parse",
        "xlsx_parse",
        "pdf_parse",
    ] {
        assert!(names.contains(&expected), "missing schema for {expected}");
    }
}

#[tokio::test]
async fn file_write_then_read_round_trips_through_guardrails() {
    let dir = tempdir().unwrap();
    let guardrails = GuardrailsConfig {
        file: FileGuardrails {
            base_dir: dir.path().to_path_buf(),
            max_bytes: 10_000,
        },
        ..Default::default()
    };
    let tools = BuiltinTools::new(guardrails);

    let write = tools
        .execute(&call("file_write", json!({"path": "note.txt", "text": "hello world"})))
        .await
        .unwrap();
    assert!(!write.is_error);

    let read = tools
        .execute(&call("file_read", json!({"path": "note.txt"})))
        .await
        .unwrap();
    assert!(!read.is_error);
    assert_eq!(read.data["text_preview"], "hello world");
}

#[tokio::test]
async fn run_command_denied_by_default_allowlist() {
    let guardrails = GuardrailsConfig {
        shell: ShellGuardrails {
            allow: vec![],
            deny: vec![],
            timeout_seconds: 5,
        },
        ..Default::default()
    };
    let tools = BuiltinTools::new(guardrails);
    let result = tools
        .execute(&call("run_command", json!({"command": "echo", "args": ["hi"]})))
        .await
        .unwrap();
    assert!(result.is_error);
}

#[tokio::test]
async fn docx_parse_reports_well_shaped_error_for_missing_file() {
    let tools = BuiltinTools::new(GuardrailsConfig::default());
    let result = tools
        .execute(&call("docx_parse", json!({"path": "report.docx"})))
        .await
        .unwrap();
    assert!(!result.is_error);
    assert_eq!(result.data["path"], "report.docx");
    assert_eq!(result.data["paragraph_count"], 0);
    assert!(result.data["error"].is_string());
}
