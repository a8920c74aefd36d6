//! The fixed set of built-in tool schemas and JSON Schema argument
//! validation ahead of dispatch.

use corridor_core::{Result, RouterError, ToolSchema};
use serde_json::{json, Value};

fn schema(name: &str, description: &str, parameters: Value, output_kind: &str) -> ToolSchema {
    ToolSchema {
        name: name.to_string(),
        description: description.to_string(),
        parameters,
        output_kind: Some(output_kind.to_string()),
    }
}

/// The full built-in catalog, in the order tools are offered to the model.
pub fn builtin_schemas() -> Vec<ToolSchema> {
    vec![
        schema(
            "calc",
            "Evaluate a basic arithmetic operation on two numbers",
            json!({
                "type": "object",
                "required": ["op", "a", "b"],
                "properties": {
                    "op": {"type": "string", "enum": ["add", "sub", "mul", "div"]},
                    "a": {"type": "number"},
                    "b": {"type": "number"}
                }
            }),
            "calc",
        ),
        schema(
            "web_fetch",
            "Fetch a URL via HTTP GET or POST",
            json!({
                "type": "object",
                "required": ["url"],
                "properties": {
                    "url": {"type": "string"},
                    "method": {"type": "string", "enum": ["GET", "POST"]},
                    "headers": {"type": "object"},
                    "body": {}
                }
            }),
            "web_fetch",
        ),
        schema(
            "web_scrape",
            "Fetch a URL and extract its title and text content",
            json!({
                "type": "object",
                "required": ["url"],
                "properties": {
                    "url": {"type": "string"},
                    "max_bytes": {"type": "integer", "minimum": 1}
                }
            }),
            "web_scrape",
        ),
        schema(
            "web_search",
            "Search the web via DuckDuckGo's instant-answer API",
            json!({
                "type": "object",
                "required": ["query"],
                "properties": {
                    "query": {"type": "string", "minLength": 1},
                    "limit": {"type": "integer", "minimum": 1},
                    "source": {"type": "string"}
                }
            }),
            "web_search",
        ),
        schema(
            "search_aggregate",
            "Search across multiple sources and merge deduplicated results",
            json!({
                "type": "object",
                "required": ["query"],
                "properties": {
                    "query": {"type": "string", "minLength": 1},
                    "sources": {"type": "array", "items": {"type": "string"}},
                    "per_source_limit": {"type": "integer", "minimum": 1}
                }
            }),
            "search_aggregate",
        ),
        schema(
            "file_read",
            "Read a text file from the sandboxed data directory",
            json!({
                "type": "object",
                "required": ["path"],
                "properties": {
                    "path": {"type": "string"}
                }
            }),
            "file_read",
        ),
        schema(
            "file_write",
            "Write text to a file in the sandboxed data directory",
            json!({
                "type": "object",
                "required": ["path", "text"],
                "properties": {
                    "path": {"type": "string"},
                    "text": {"type": "string"},
                    "overwrite": {"type": "boolean"}
                }
            }),
            "file_write",
        ),
        schema(
            "list_dir",
            "List entries in a sandboxed directory",
            json!({
                "type": "object",
                "required": ["path"],
                "properties": {
                    "path": {"type": "string"},
                    "max_entries": {"type": "integer", "minimum": 1}
                }
            }),
            "list_dir",
        ),
        schema(
            "run_command",
            "Run an allowlisted shell command with a bounded timeout",
            json!({
                "type": "object",
                "required": ["command"],
                "properties": {
                    "command": {"type": "string"},
                    "args": {"type": "array", "items": {"type": "string"}},
                    "timeout_seconds": {"type": "integer", "minimum": 1}
                }
            }),
            "run_command",
        ),
        schema(
            "open_app",
            "Launch an allowlisted application",
            json!({
                "type": "object",
                "required": ["app"],
                "properties": {
                    "app": {"type": "string"},
                    "args": {"type": "array", "items": {"type": "string"}}
                }
            }),
            "open_app",
        ),
        schema(
            "docx_parse",
            "Extract paragraphs, headings, and tables from a .docx file",
            json!({
                "type": "object",
                "required": ["path"],
                "properties": {
                    "path": {"type": "string"},
                    "include_tables": {"type": "boolean"},
                    "max_paragraphs": {"type": "integer", "minimum": 1}
                }
            }),
            "docx_parse",
        ),
        schema(
            "xlsx_parse",
            "Extract rows from a worksheet in an .xlsx file",
            json!({
                "type": "object",
                "required": ["path"],
                "properties": {
                    "path": {"type": "string"},
                    "sheet_index": {"type": "integer", "minimum": 0},
                    "header": {"type": "boolean"},
                    "max_rows": {"type": "integer", "minimum": 1}
                }
            }),
            "xlsx_parse",
        ),
        schema(
            "pdf_parse",
            "Preview text content of a PDF file without full rendering",
            json!({
                "type": "object",
                "required": ["path"],
                "properties": {
                    "path": {"type": "string"},
                    "ocr": {"type": "boolean"},
                    "max_pages": {"type": "integer", "minimum": 1}
                }
            }),
            "pdf_parse",
        ),
    ]
}

/// Validates tool call arguments against a schema's declared JSON Schema.
pub struct ToolRegistry {
    schemas: Vec<ToolSchema>,
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            schemas: builtin_schemas(),
        }
    }

    pub fn schemas(&self) -> &[ToolSchema] {
        &self.schemas
    }

    pub fn find(&self, name: &str) -> Option<&ToolSchema> {
        self.schemas.iter().find(|s| s.name == name)
    }

    /// Validates `arguments` against the named tool's declared parameter
    /// schema. Returns `ToolNotFound` or `ToolArgInvalid`.
    pub fn validate_args(&self, name: &str, arguments: &Value) -> Result<()> {
        let schema = self
            .find(name)
            .ok_or_else(|| RouterError::ToolNotFound(name.to_string()))?;

        let validator = jsonschema::validator_for(&schema.parameters)
            .map_err(|e| RouterError::ToolArgInvalid {
                tool: name.to_string(),
                reason: format!("invalid tool schema: {e}"),
            })?;

        if let Err(first) = validator.validate(arguments) {
            return Err(RouterError::ToolArgInvalid {
                tool: name.to_string(),
                reason: first.to_string(),
            });
        }
        Ok(())
    }
}
