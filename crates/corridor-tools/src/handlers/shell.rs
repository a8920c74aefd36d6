use std::time::Duration;

use corridor_config::ShellGuardrails;
use corridor_core::{Result, RouterError};
use serde_json::{json, Value};
use tokio::process::Command;
use tokio::time::timeout;

pub async fn run(guard: &ShellGuardrails, arguments: &Value) -> Result<Value> {
    let command = arguments["command"].as_str().unwrap_or("").trim().to_string();
    if command.is_empty() {
        return Ok(json!({ "error": "command required" }));
    }

    let lower = command.to_lowercase();
    if guard.deny.iter().any(|d| d.eq_ignore_ascii_case(&lower)) {
        return Err(RouterError::ToolGuardDenied {
            tool: "run_command".into(),
            reason: "command denied".into(),
        });
    }
    if !guard.allow.iter().any(|a| a.eq_ignore_ascii_case(&lower)) {
        return Err(RouterError::ToolGuardDenied {
            tool: "run_command".into(),
            reason: "command not allowed".into(),
        });
    }

    let args: Vec<String> = arguments["args"]
        .as_array()
        .map(|a| a.iter().filter_map(|v| v.as_str().map(String::from)).collect())
        .unwrap_or_default();

    let requested_timeout = arguments["timeout_seconds"].as_u64().unwrap_or(5);
    let bounded_timeout = requested_timeout.clamp(1, guard.timeout_seconds);

    let mut cmd = Command::new(&command);
    cmd.args(&args);

    let run = async {
        cmd.output()
            .await
            .map_err(|e| RouterError::ToolExecError {
                tool: "run_command".into(),
                reason: e.to_string(),
            })
    };

    match timeout(Duration::from_secs(bounded_timeout), run).await {
        Ok(Ok(output)) => Ok(json!({
            "returncode": output.status.code(),
            "stdout": truncate(&String::from_utf8_lossy(&output.stdout)),
            "stderr": truncate(&String::from_utf8_lossy(&output.stderr)),
        })),
        Ok(Err(e)) => Ok(json!({ "error": e.to_string() })),
        Err(_) => Ok(json!({ "error": "timeout" })),
    }
}

fn truncate(s: &str) -> String {
    s.chars().take(20_000).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn guard() -> ShellGuardrails {
        ShellGuardrails {
            allow: vec!["echo".into()],
            deny: vec![],
            timeout_seconds: 5,
        }
    }

    #[tokio::test]
    async fn runs_allowlisted_command() {
        let out = run(&guard(), &serde_json::json!({"command": "echo", "args": ["hi"]}))
            .await
            .unwrap();
        assert_eq!(out["returncode"], 0);
        assert!(out["stdout"].as_str().unwrap().contains("hi"));
    }

    #[tokio::test]
    async fn rejects_non_allowlisted_command() {
        let err = run(&guard(), &serde_json::json!({"command": "rm"})).await;
        assert!(matches!(err, Err(RouterError::ToolGuardDenied { .. })));
    }

    #[tokio::test]
    async fn denylist_takes_priority() {
        let g = ShellGuardrails {
            allow: vec!["echo".into()],
            deny: vec!["echo".into()],
            timeout_seconds: 5,
        };
        let err = run(&g, &serde_json::json!({"command": "echo"})).await;
        assert!(matches!(err, Err(RouterError::ToolGuardDenied { .. })));
    }
}
