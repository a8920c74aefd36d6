use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Declared shape of a tool discovered from the schema directory: a name,
/// its argument JSON Schema, and the output kind used for result
/// normalization (see `corridor_tools::normalize`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSchema {
    /// Unique name; also the handler lookup key.
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// JSON Schema of the arguments object.
    pub parameters: Value,
    /// Normalization kind, e.g. "calc", "web_fetch", "file_read".
    #[serde(default)]
    pub output_kind: Option<String>,
}

/// A request from the LLM to call a tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub tool_name: String,
    pub arguments: Value,
}

/// The result of executing a tool call, after normalization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    pub tool_call_id: String,
    /// Normalized, stable-shaped payload.
    pub data: Value,
    pub is_error: bool,
}

impl ToolResult {
    pub fn ok(tool_call_id: impl Into<String>, data: Value) -> Self {
        Self {
            tool_call_id: tool_call_id.into(),
            data,
            is_error: false,
        }
    }

    pub fn err(tool_call_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            tool_call_id: tool_call_id.into(),
            data: serde_json::json!({ "error": message.into() }),
            is_error: true,
        }
    }
}

/// Trait implemented by anything that can execute a single tool call.
/// Implementations normalize their own output before returning.
#[async_trait]
pub trait ToolExecutor: Send + Sync {
    fn tools(&self) -> Vec<ToolSchema>;

    async fn execute(&self, call: &ToolCall) -> crate::Result<ToolResult>;
}
