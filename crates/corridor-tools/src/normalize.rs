//! Collapses each tool's raw output into a small, stable-shaped JSON object
//! so downstream structured-output prompts see a predictable contract
//! regardless of which tool ran. Unknown tool names, and any tool whose raw
//! output isn't a JSON object, pass through unchanged.

use serde_json::{json, Value};

fn as_object(raw: &Value) -> Value {
    if raw.is_object() {
        raw.clone()
    } else {
        json!({})
    }
}

fn preview(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

fn get_str<'a>(obj: &'a Value, key: &str) -> Option<&'a str> {
    obj.get(key).and_then(Value::as_str)
}

/// Normalize a tool's raw result into the stable per-kind shape.
///
/// `tool_used` is the tool name; `raw` is whatever the handler returned
/// before normalization (already guardrail-checked, but not reshaped).
pub fn normalize_tool_result(tool_used: &str, raw: &Value) -> Value {
    let d = as_object(raw);

    match tool_used {
        "calc" => match raw {
            Value::Object(_) => d.get("result").cloned().map(|v| json!({ "result": v })).unwrap_or_else(|| raw.clone()),
            other => json!({ "result": other }),
        },

        "web_fetch" => {
            let text = get_str(&d, "text").unwrap_or("");
            let mut out = json!({
                "ok": d.get("error").is_none(),
                "status": d.get("status").cloned().unwrap_or(Value::Null),
                "text_preview": if text.is_empty() { Value::Null } else { Value::String(preview(text, 500)) },
            });
            if let Some(err) = d.get("error") {
                out["error"] = err.clone();
            }
            out
        }

        "file_read" => {
            let text = get_str(&d, "text").unwrap_or("");
            json!({
                "path": d.get("path").cloned().unwrap_or(Value::Null),
                "size": if get_str(&d, "text").is_some() { Value::from(text.len()) } else { Value::Null },
                "text_preview": if get_str(&d, "text").is_some() { Value::String(preview(text, 500)) } else { Value::Null },
                "error": d.get("error").cloned().unwrap_or(Value::Null),
            })
        }

        "web_search" => {
            let items = d.get("results").cloned().unwrap_or(json!([]));
            let count = items.as_array().map(|a| a.len()).unwrap_or(0);
            json!({
                "count": count,
                "items": items,
                "source": d.get("source").cloned().unwrap_or(Value::Null),
                "error": d.get("error").cloned().unwrap_or(Value::Null),
            })
        }

        "search_aggregate" => {
            let items = d.get("results").cloned().unwrap_or(json!([]));
            let count = items.as_array().map(|a| a.len()).unwrap_or(0);
            json!({
                "count": count,
                "items": items,
                "sources": d.get("sources").cloned().unwrap_or(json!([])),
                "counts": d.get("counts").cloned().unwrap_or(json!({})),
            })
        }

        "web_scrape" => {
            let content = get_str(&d, "content").unwrap_or("");
            json!({
                "url": d.get("url").cloned().unwrap_or(Value::Null),
                "status": d.get("status").cloned().unwrap_or(Value::Null),
                "title": d.get("title").cloned().unwrap_or(Value::Null),
                "text_preview": if get_str(&d, "content").is_some() { Value::String(preview(content, 500)) } else { Value::Null },
                "error": d.get("error").cloned().unwrap_or(Value::Null),
            })
        }

        "file_write" => json!({
            "path": d.get("path").cloned().unwrap_or(Value::Null),
            "written_bytes": d.get("written_bytes").cloned().unwrap_or(Value::Null),
            "overwrite": d.get("overwrite").cloned().unwrap_or(Value::Null),
            "error": d.get("error").cloned().unwrap_or(Value::Null),
        }),

        "list_dir" => {
            let items = d.get("items").cloned().unwrap_or(json!([]));
            let count = items.as_array().map(|a| a.len()).unwrap_or(0);
            json!({
                "path": d.get("path").cloned().unwrap_or(Value::Null),
                "count": count,
                "items": items,
                "error": d.get("error").cloned().unwrap_or(Value::Null),
            })
        }

        "open_app" => json!({
            "started": d.get("started").and_then(Value::as_bool).unwrap_or(false),
            "app": d.get("app").cloned().unwrap_or(Value::Null),
            "error": d.get("error").cloned().unwrap_or(Value::Null),
        }),

        "docx_parse" => {
            let paragraphs = d.get("paragraphs").and_then(Value::as_array).cloned().unwrap_or_default();
            let sections = d.get("sections").and_then(Value::as_array).cloned().unwrap_or_default();
            let tables = d.get("tables").and_then(Value::as_array).cloned().unwrap_or_default();
            json!({
                "path": d.get("path").cloned().unwrap_or(Value::Null),
                "sections": sections.into_iter().take(10).collect::<Vec<_>>(),
                "paragraph_count": paragraphs.len(),
                "table_count": tables.len(),
                "preview": paragraphs.into_iter().take(5).collect::<Vec<_>>(),
                "error": d.get("error").cloned().unwrap_or(Value::Null),
            })
        }

        "xlsx_parse" => {
            let rows = d.get("rows").and_then(Value::as_array).cloned().unwrap_or_default();
            json!({
                "path": d.get("path").cloned().unwrap_or(Value::Null),
                "sheet_index": d.get("sheet_index").cloned().unwrap_or(Value::Null),
                "rows_count": rows.len(),
                "header": d.get("header").cloned().unwrap_or(Value::Null),
                "preview_rows": rows.into_iter().take(5).collect::<Vec<_>>(),
                "error": d.get("error").cloned().unwrap_or(Value::Null),
            })
        }

        "pdf_parse" => {
            let tp = get_str(&d, "text_preview").map(|t| preview(t, 500));
            json!({
                "path": d.get("path").cloned().unwrap_or(Value::Null),
                "pages": d.get("pages").cloned().unwrap_or(Value::Null),
                "text_preview": tp,
                "error": d.get("error").cloned().unwrap_or(Value::Null),
            })
        }

        _ => raw.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_tool_passes_through() {
        let raw = json!({"anything": 1});
        assert_eq!(normalize_tool_result("mystery", &raw), raw);
    }

    #[test]
    fn calc_wraps_bare_number_as_result() {
        let raw = json!(46);
        let out = normalize_tool_result("calc", &raw);
        assert_eq!(out, json!({"result": 46}));
    }

    #[test]
    fn calc_is_idempotent_on_its_own_output() {
        let raw = json!(46);
        let once = normalize_tool_result("calc", &raw);
        let twice = normalize_tool_result("calc", &once);
        assert_eq!(once, twice);
    }

    #[test]
    fn web_fetch_truncates_and_flags_ok() {
        let raw = json!({"status": 200, "text": "x".repeat(600)});
        let out = normalize_tool_result("web_fetch", &raw);
        assert_eq!(out["ok"], true);
        assert_eq!(out["status"], 200);
        assert_eq!(out["text_preview"].as_str().unwrap().len(), 500);
    }

    #[test]
    fn web_fetch_error_is_carried() {
        let raw = json!({"error": "timeout"});
        let out = normalize_tool_result("web_fetch", &raw);
        assert_eq!(out["ok"], false);
        assert_eq!(out["error"], "timeout");
    }

    #[test]
    fn file_read_reports_byte_size() {
        let raw = json!({"path": "/data/a.txt", "text": "hello"});
        let out = normalize_tool_result("file_read", &raw);
        assert_eq!(out["size"], 5);
        assert_eq!(out["text_preview"], "hello");
    }

    #[test]
    fn list_dir_counts_items() {
        let raw = json!({"path": "/data", "items": [{"name": "a"}, {"name": "b"}]});
        let out = normalize_tool_result("list_dir", &raw);
        assert_eq!(out["count"], 2);
    }

    #[test]
    fn docx_parse_caps_preview_and_sections() {
        let paragraphs: Vec<Value> = (0..20).map(|i| json!(format!("p{i}"))).collect();
        let sections: Vec<Value> = (0..20).map(|i| json!({"level": 1, "title": format!("s{i}")})).collect();
        let raw = json!({"path": "x.docx", "paragraphs": paragraphs, "sections": sections, "tables": []});
        let out = normalize_tool_result("docx_parse", &raw);
        assert_eq!(out["paragraph_count"], 20);
        assert_eq!(out["preview"].as_array().unwrap().len(), 5);
        assert_eq!(out["sections"].as_array().unwrap().len(), 10);
    }

    #[test]
    fn is_idempotent_on_its_own_output() {
        let raw = json!({"status": 200, "text": "hello world"});
        let once = normalize_tool_result("web_fetch", &raw);
        // Re-normalizing an already-normalized shape (no "text" key anymore)
        // degrades gracefully rather than panicking or losing the preview.
        let twice = normalize_tool_result("web_fetch", &once);
        assert_eq!(twice["text_preview"], Value::Null);
        assert_eq!(twice["status"], once["status"]);
    }
}
