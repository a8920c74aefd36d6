//! Dispatches a validated [`ToolCall`] to its handler and normalizes the
//! result. Handler errors never propagate past `execute` — they become an
//! `is_error` [`ToolResult`] instead.

use async_trait::async_trait;
use corridor_config::GuardrailsConfig;
use corridor_core::{Result, ToolCall, ToolExecutor, ToolResult, ToolSchema};
use serde_json::Value;

use crate::handlers::{app, calc, docs, file, shell, web};
use crate::normalize::normalize_tool_result;
use crate::registry::ToolRegistry;

pub struct BuiltinTools {
    registry: ToolRegistry,
    guardrails: GuardrailsConfig,
    http: reqwest::Client,
    web_search_limiter: web::WebSearchLimiter,
}

impl BuiltinTools {
    pub fn new(guardrails: GuardrailsConfig) -> Self {
        Self {
            registry: ToolRegistry::new(),
            guardrails,
            http: reqwest::Client::new(),
            web_search_limiter: web::WebSearchLimiter::new(),
        }
    }

    async fn dispatch(&self, call: &ToolCall) -> Result<Value> {
        let args = &call.arguments;
        match call.tool_name.as_str() {
            "calc" => calc::run(args),
            "web_fetch" => web::fetch(&self.http, args).await,
            "web_scrape" => web::scrape(&self.http, args).await,
            "web_search" => {
                web::search(&self.http, &self.guardrails.web_search, &self.web_search_limiter, args).await
            }
            "search_aggregate" => {
                web::search_aggregate(
                    &self.http,
                    &self.guardrails.web_search,
                    &self.web_search_limiter,
                    |_query| None,
                    args,
                )
                .await
            }
            "file_read" => file::read(&self.guardrails.file, args).await,
            "file_write" => file::write(&self.guardrails.file, args).await,
            "list_dir" => file::list_dir(&self.guardrails.file, args).await,
            "run_command" => shell::run(&self.guardrails.shell, args).await,
            "open_app" => app::run(&self.guardrails.open_app, args).await,
            "docx_parse" => docs::docx_parse(args),
            "xlsx_parse" => docs::xlsx_parse(args),
            "pdf_parse" => docs::pdf_parse(args),
            other => Err(corridor_core::RouterError::ToolNotFound(other.to_string())),
        }
    }
}

#[async_trait]
impl ToolExecutor for BuiltinTools {
    fn tools(&self) -> Vec<ToolSchema> {
        self.registry.schemas().to_vec()
    }

    async fn execute(&self, call: &ToolCall) -> Result<ToolResult> {
        if let Err(e) = self.registry.validate_args(&call.tool_name, &call.arguments) {
            return Ok(ToolResult::err(call.id.clone(), e.to_string()));
        }

        match self.dispatch(call).await {
            Ok(raw) => {
                let normalized = normalize_tool_result(&call.tool_name, &raw);
                Ok(ToolResult::ok(call.id.clone(), normalized))
            }
            Err(e) => Ok(ToolResult::err(call.id.clone(), e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn call(tool: &str, arguments: Value) -> ToolCall {
        ToolCall {
            id: "call-1".into(),
            tool_name: tool.into(),
            arguments,
        }
    }

    #[tokio::test]
    async fn executes_calc_and_normalizes_result() {
        let tools = BuiltinTools::new(GuardrailsConfig::default());
        let result = tools
            .execute(&call("calc", json!({"op": "add", "a": 12, "b": 34})))
            .await
            .unwrap();
        assert!(!result.is_error);
        assert_eq!(result.data, json!({"result": 46.0}));
    }

    #[tokio::test]
    async fn invalid_args_become_error_result_not_a_propagated_error() {
        let tools = BuiltinTools::new(GuardrailsConfig::default());
        let result = tools.execute(&call("calc", json!({"op": "add"}))).await.unwrap();
        assert!(result.is_error);
    }

    #[tokio::test]
    async fn unknown_tool_is_reported_as_error_result() {
        let tools = BuiltinTools::new(GuardrailsConfig::default());
        let result = tools.execute(&call("mystery", json!({}))).await.unwrap();
        assert!(result.is_error);
    }
}
