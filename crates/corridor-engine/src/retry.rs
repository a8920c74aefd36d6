//! Structured-answer retry loop: coerce a single-turn LLM call
//! into schema-valid JSON that carries the required citation, retrying a
//! bounded number of times with exponential backoff.

use std::time::Duration;

use corridor_core::{OutputPayload, Result, RouterError};
use corridor_llm::{LlmClient, LlmRequest};
use serde_json::Value;

const INITIAL_BACKOFF: Duration = Duration::from_millis(500);
const MAX_BACKOFF: Duration = Duration::from_secs(2);
const MAX_TOKENS: u32 = 1024;

/// Outcome of one structured-retry run: the validated payload plus how long
/// the whole loop took, for the router's per-call latency check.
pub struct RetryOutcome {
    pub payload: OutputPayload,
    pub duration_ms: u64,
}

/// Invoked once per attempt so the caller can emit timeline events without
/// this loop needing to know about sessions or logging.
pub trait RetryObserver {
    fn on_attempt(&mut self, attempt: u32) {
        let _ = attempt;
    }
    fn on_retry(&mut self, attempt: u32, error: &str) {
        let _ = (attempt, error);
    }
    fn on_success(&mut self, attempt: u32) {
        let _ = attempt;
    }
}

impl RetryObserver for () {}

pub async fn run(
    client: &dyn LlmClient,
    model: &str,
    user_prompt: &str,
    citation: &str,
    tool_used: Option<&str>,
    tool_result: &Value,
    schema: &Value,
    max_retries: u32,
    observer: &mut dyn RetryObserver,
) -> Result<RetryOutcome> {
    let validator = jsonschema::validator_for(schema)
        .map_err(|e| RouterError::SchemaInvalid(format!("invalid output schema: {e}")))?;

    let system = format!(
        "You are an enterprise agent. Output only JSON, strictly conforming to this schema:\n{schema}\n\
         Do not output any explanation or surrounding text.\n\
         citations must include the given reference text."
    );
    let mut user = format!(
        "User request: {user_prompt}\nReference: {citation}\nTool: {}\nTool result: {tool_result}",
        tool_used.unwrap_or("none"),
    );

    let started = std::time::Instant::now();
    let mut attempt = 0u32;
    let mut backoff = INITIAL_BACKOFF;
    let mut last_error = None;

    while attempt <= max_retries {
        observer.on_attempt(attempt);

        let request = LlmRequest {
            model: model.to_string(),
            system: Some(system.clone()),
            prompt: user.clone(),
            max_tokens: MAX_TOKENS,
            temperature: 0.0,
        };

        let text = match client.complete(&request).await {
            Ok(resp) if !resp.text.trim().is_empty() => resp.text,
            _ => return Err(RouterError::LlmNone),
        };

        match validate(&validator, &text, citation) {
            Ok(payload) => {
                observer.on_success(attempt);
                return Ok(RetryOutcome {
                    payload,
                    duration_ms: started.elapsed().as_millis() as u64,
                });
            }
            Err(reason) => {
                observer.on_retry(attempt, &reason);
                user.push_str(&format!(
                    "\nPrevious output did not satisfy the schema or citation: {reason}. \
                     Correct it and output only JSON again."
                ));
                last_error = Some(reason);
                attempt += 1;
                if attempt <= max_retries {
                    tokio::time::sleep(backoff).await;
                    backoff = (backoff * 2).min(MAX_BACKOFF);
                }
            }
        }
    }

    Err(RouterError::SchemaInvalid(
        last_error.unwrap_or_else(|| "no valid output produced".into()),
    ))
}

fn validate(
    validator: &jsonschema::Validator,
    text: &str,
    citation: &str,
) -> std::result::Result<OutputPayload, String> {
    let value = extract_json(text).ok_or_else(|| "output is not valid JSON".to_string())?;

    validator
        .validate(&value)
        .map_err(|e| format!("schema violation: {e}"))?;

    let payload: OutputPayload =
        serde_json::from_value(value).map_err(|e| format!("schema violation: {e}"))?;

    if !payload.contains_citation(citation) {
        return Err("citations missing required reference".to_string());
    }

    Ok(payload)
}

/// Parses `text` as JSON; on failure, tries the substring between the
/// first `{` and the last `}`.
fn extract_json(text: &str) -> Option<Value> {
    if let Ok(v) = serde_json::from_str(text) {
        return Some(v);
    }
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    serde_json::from_str(&text[start..=end]).ok()
}
