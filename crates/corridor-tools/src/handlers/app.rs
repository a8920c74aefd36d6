use corridor_config::OpenAppGuardrails;
use corridor_core::{Result, RouterError};
use serde_json::{json, Value};
use tokio::process::Command;

pub async fn run(guard: &OpenAppGuardrails, arguments: &Value) -> Result<Value> {
    let app = arguments["app"].as_str().unwrap_or("").trim().to_lowercase();
    if app.is_empty() {
        return Ok(json!({ "error": "app required" }));
    }
    if !guard.allowlist.iter().any(|a| a.eq_ignore_ascii_case(&app)) {
        return Err(RouterError::ToolGuardDenied {
            tool: "open_app".into(),
            reason: "app not allowed".into(),
        });
    }

    let args: Vec<String> = arguments["args"]
        .as_array()
        .map(|a| a.iter().filter_map(|v| v.as_str().map(String::from)).collect())
        .unwrap_or_default();

    match Command::new(&app).args(&args).spawn() {
        Ok(_) => Ok(json!({ "started": true, "app": app })),
        Err(e) => Ok(json!({ "error": e.to_string() })),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn rejects_app_not_on_allowlist() {
        let guard = OpenAppGuardrails { allowlist: vec!["notepad".into()] };
        let err = run(&guard, &json!({"app": "calculator"})).await;
        assert!(matches!(err, Err(RouterError::ToolGuardDenied { .. })));
    }

    #[tokio::test]
    async fn rejects_empty_app_name() {
        let guard = OpenAppGuardrails { allowlist: vec![] };
        let out = run(&guard, &json!({"app": ""})).await.unwrap();
        assert_eq!(out["error"], "app required");
    }
}
