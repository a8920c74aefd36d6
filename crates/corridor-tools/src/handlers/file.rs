use std::path::{Path, PathBuf};

use corridor_config::FileGuardrails;
use corridor_core::{Result, RouterError};
use serde_json::{json, Value};

fn confine(base_dir: &Path, requested: &str) -> Result<PathBuf> {
    let base = base_dir
        .canonicalize()
        .unwrap_or_else(|_| base_dir.to_path_buf());
    let candidate = base.join(requested);
    let resolved = candidate.canonicalize().unwrap_or(candidate);

    if resolved != base && !resolved.starts_with(&base) {
        return Err(RouterError::ToolGuardDenied {
            tool: "file".into(),
            reason: "path not allowed".into(),
        });
    }
    Ok(resolved)
}

pub async fn read(guard: &FileGuardrails, arguments: &Value) -> Result<Value> {
    let path = arguments["path"]
        .as_str()
        .ok_or_else(|| arg_err("missing 'path'"))?;

    let resolved = confine(&guard.base_dir, path)?;
    match tokio::fs::read_to_string(&resolved).await {
        Ok(text) => Ok(json!({
            "path": resolved.display().to_string(),
            "text": text.chars().take(20_000).collect::<String>(),
        })),
        Err(e) => Ok(json!({ "error": e.to_string() })),
    }
}

pub async fn write(guard: &FileGuardrails, arguments: &Value) -> Result<Value> {
    let path = arguments["path"]
        .as_str()
        .ok_or_else(|| arg_err("missing 'path'"))?;
    let text = arguments["text"].as_str().unwrap_or("");
    let overwrite = arguments["overwrite"].as_bool().unwrap_or(false);

    let resolved = confine(&guard.base_dir, path)?;
    if text.len() > guard.max_bytes {
        return Ok(json!({ "error": "payload_too_large" }));
    }

    if let Some(parent) = resolved.parent() {
        let _ = tokio::fs::create_dir_all(parent).await;
    }

    let result = if overwrite || !resolved.exists() {
        tokio::fs::write(&resolved, text).await
    } else {
        use tokio::io::AsyncWriteExt;
        match tokio::fs::OpenOptions::new().append(true).open(&resolved).await {
            Ok(mut f) => f.write_all(text.as_bytes()).await,
            Err(e) => Err(e),
        }
    };

    match result {
        Ok(()) => Ok(json!({
            "path": resolved.display().to_string(),
            "written_bytes": text.len(),
            "overwrite": overwrite,
        })),
        Err(e) => Ok(json!({ "error": e.to_string() })),
    }
}

pub async fn list_dir(guard: &FileGuardrails, arguments: &Value) -> Result<Value> {
    let path = arguments["path"].as_str().unwrap_or("");
    let max_entries = arguments["max_entries"]
        .as_u64()
        .unwrap_or(100)
        .clamp(1, 1000) as usize;

    let resolved = confine(&guard.base_dir, path)?;
    let mut dir = match tokio::fs::read_dir(&resolved).await {
        Ok(d) => d,
        Err(e) => return Ok(json!({ "error": e.to_string() })),
    };

    let mut items = Vec::new();
    while items.len() < max_entries {
        match dir.next_entry().await {
            Ok(Some(entry)) => {
                let is_dir = entry.file_type().await.map(|t| t.is_dir()).unwrap_or(false);
                items.push(json!({
                    "name": entry.file_name().to_string_lossy(),
                    "is_dir": is_dir,
                }));
            }
            _ => break,
        }
    }

    Ok(json!({
        "path": resolved.display().to_string(),
        "items": items,
    }))
}

fn arg_err(reason: &str) -> RouterError {
    RouterError::ToolArgInvalid {
        tool: "file".into(),
        reason: reason.into(),
    }
}
