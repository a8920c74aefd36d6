use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use corridor_config::WebSearchGuardrails;
use corridor_core::Result;
use regex::Regex;
use serde_json::{json, Value};

const ATTEMPTS: u32 = 3;
const INITIAL_BACKOFF: Duration = Duration::from_millis(300);

/// Tracks `web_search` call timestamps to enforce a per-minute rate limit
/// shared across every call through the same tool executor.
#[derive(Default)]
pub struct WebSearchLimiter {
    timestamps: Mutex<VecDeque<Instant>>,
}

impl WebSearchLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    fn allow(&self, rate_per_minute: u32) -> bool {
        if rate_per_minute == 0 {
            return true;
        }
        let now = Instant::now();
        let mut q = self.timestamps.lock().unwrap();
        while let Some(front) = q.front() {
            if now.duration_since(*front) > Duration::from_secs(60) {
                q.pop_front();
            } else {
                break;
            }
        }
        if q.len() as u32 >= rate_per_minute {
            return false;
        }
        q.push_back(now);
        true
    }
}

async fn with_retry<F, Fut>(mut attempt: F) -> Value
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = std::result::Result<Value, String>>,
{
    let mut backoff = INITIAL_BACKOFF;
    for i in 0..ATTEMPTS {
        match attempt().await {
            Ok(v) => return v,
            Err(e) => {
                if i == ATTEMPTS - 1 {
                    return json!({ "error": e });
                }
                tokio::time::sleep(backoff).await;
                backoff *= 2;
            }
        }
    }
    unreachable!()
}

pub async fn fetch(client: &reqwest::Client, arguments: &Value) -> Result<Value> {
    let url = arguments["url"].as_str().unwrap_or("").to_string();
    let method = arguments["method"].as_str().unwrap_or("GET").to_uppercase();
    let body = arguments.get("body").cloned();

    let out = with_retry(|| {
        let client = client.clone();
        let url = url.clone();
        let method = method.clone();
        let body = body.clone();
        async move {
            let req = if method == "POST" {
                client.post(&url).json(&body.unwrap_or(Value::Null))
            } else {
                client.get(&url)
            };
            let resp = req.send().await.map_err(|e| e.to_string())?;
            let status = resp.status().as_u16();
            let text = resp.text().await.map_err(|e| e.to_string())?;
            Ok(json!({
                "status": status,
                "text": text.chars().take(10_000).collect::<String>(),
            }))
        }
    })
    .await;

    Ok(out)
}

pub async fn scrape(client: &reqwest::Client, arguments: &Value) -> Result<Value> {
    let url = arguments["url"].as_str().unwrap_or("").to_string();
    let max_bytes = arguments["max_bytes"].as_u64().unwrap_or(20_000).min(20_000) as usize;
    let title_re = Regex::new(r"(?is)<title[^>]*>(.*?)</title>").unwrap();

    let out = with_retry(|| {
        let client = client.clone();
        let url = url.clone();
        let title_re = title_re.clone();
        async move {
            let resp = client.get(&url).send().await.map_err(|e| e.to_string())?;
            let status = resp.status().as_u16();
            let text = resp.text().await.map_err(|e| e.to_string())?;
            let title = title_re
                .captures(&text)
                .and_then(|c| c.get(1))
                .map(|m| m.as_str().trim().to_string());
            Ok(json!({
                "url": url,
                "status": status,
                "title": title,
                "content": text.chars().take(max_bytes).collect::<String>(),
            }))
        }
    })
    .await;

    Ok(out)
}

pub async fn search(
    client: &reqwest::Client,
    guard: &WebSearchGuardrails,
    limiter: &WebSearchLimiter,
    arguments: &Value,
) -> Result<Value> {
    let query = arguments["query"].as_str().unwrap_or("").to_string();
    if query.is_empty() {
        return Ok(json!({ "error": "query required" }));
    }
    let source = arguments["source"].as_str().unwrap_or("duckduckgo").to_string();
    let limit = arguments["limit"].as_u64().unwrap_or(5).max(1).min(guard.max_limit as u64) as usize;

    if !limiter.allow(guard.rate_limit_per_minute) {
        return Ok(json!({ "error": "rate_limit_exceeded" }));
    }
    if source != "duckduckgo" {
        return Ok(json!({ "error": format!("unsupported source: {source}") }));
    }

    let out = with_retry(|| {
        let client = client.clone();
        let query = query.clone();
        async move {
            let resp = client
                .get("https://api.duckduckgo.com/")
                .query(&[("q", query.as_str()), ("format", "json"), ("no_redirect", "1"), ("no_html", "1")])
                .send()
                .await
                .map_err(|e| e.to_string())?;
            let data: Value = resp.json().await.map_err(|e| e.to_string())?;
            Ok(json!({ "source": "duckduckgo", "results": extract_ddg_results(&data) }))
        }
    })
    .await;

    let mut out = out;
    if let Some(results) = out.get_mut("results").and_then(Value::as_array_mut) {
        results.truncate(limit);
    }
    Ok(out)
}

fn extract_ddg_results(data: &Value) -> Vec<Value> {
    let mut results = Vec::new();

    if let Some(abstract_text) = data.get("AbstractText").and_then(Value::as_str) {
        if !abstract_text.is_empty() {
            results.push(json!({
                "title": data.get("Heading").and_then(Value::as_str),
                "url": data.get("AbstractURL").and_then(Value::as_str),
                "snippet": abstract_text,
                "type": "abstract",
            }));
        }
    }

    if let Some(topics) = data.get("RelatedTopics").and_then(Value::as_array) {
        for item in topics {
            push_related(&mut results, item);
            if let Some(subtopics) = item.get("Topics").and_then(Value::as_array) {
                for sub in subtopics {
                    push_related(&mut results, sub);
                }
            }
        }
    }

    results
}

fn push_related(results: &mut Vec<Value>, item: &Value) {
    let text = item.get("Text").and_then(Value::as_str);
    let first_url = item.get("FirstURL").and_then(Value::as_str);
    if text.is_some() || first_url.is_some() {
        results.push(json!({
            "title": text.or(first_url),
            "url": first_url,
            "snippet": text,
            "type": "related",
        }));
    }
}

pub async fn search_aggregate(
    client: &reqwest::Client,
    guard: &WebSearchGuardrails,
    limiter: &WebSearchLimiter,
    local_lookup: impl Fn(&str) -> Option<String>,
    arguments: &Value,
) -> Result<Value> {
    let query = arguments["query"].as_str().unwrap_or("").to_string();
    let sources: Vec<String> = arguments["sources"]
        .as_array()
        .map(|a| a.iter().filter_map(|v| v.as_str().map(String::from)).collect())
        .unwrap_or_else(|| vec!["duckduckgo".into(), "local".into()]);
    let per_source_limit = arguments["per_source_limit"].as_u64().unwrap_or(5);

    let mut aggregated: Vec<Value> = Vec::new();
    let mut counts = serde_json::Map::new();

    for src in &sources {
        let items: Vec<Value> = match src.as_str() {
            "duckduckgo" => {
                let args = json!({ "query": query, "limit": per_source_limit, "source": "duckduckgo" });
                let r = search(client, guard, limiter, &args).await?;
                r.get("results").and_then(Value::as_array).cloned().unwrap_or_default()
            }
            "local" => match local_lookup(&query) {
                Some(hit) => vec![json!({ "title": "local", "url": Value::Null, "snippet": hit, "type": "local" })],
                None => vec![],
            },
            _ => vec![],
        };
        counts.insert(src.clone(), json!(items.len()));
        for item in items {
            let key = (item.get("title").cloned(), item.get("url").cloned());
            let already_seen = aggregated
                .iter()
                .any(|existing| (existing.get("title").cloned(), existing.get("url").cloned()) == key);
            if !already_seen {
                aggregated.push(item);
            }
        }
    }

    Ok(json!({
        "sources": sources,
        "counts": counts,
        "results": aggregated,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limiter_blocks_after_threshold() {
        let limiter = WebSearchLimiter::new();
        assert!(limiter.allow(2));
        assert!(limiter.allow(2));
        assert!(!limiter.allow(2));
    }

    #[test]
    fn limiter_unlimited_when_zero() {
        let limiter = WebSearchLimiter::new();
        for _ in 0..50 {
            assert!(limiter.allow(0));
        }
    }

    #[test]
    fn extracts_abstract_and_related_topics() {
        let data = json!({
            "AbstractText": "Rust is a language",
            "Heading": "Rust",
            "AbstractURL": "https://rust-lang.org",
            "RelatedTopics": [
                {"Text": "Cargo", "FirstURL": "https://doc.rust-lang.org/cargo"}
            ]
        });
        let results = extract_ddg_results(&data);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0]["type"], "abstract");
        assert_eq!(results[1]["type"], "related");
    }
}
