//! The explain adapter: reads a session's events and summarizes
//! per-provider attempts, successes, and failures, combined with the
//! statically-computed candidate list and effective policy for a tool.

use std::collections::HashMap;

use corridor_core::{Policy, SessionId};
use serde::Serialize;

use crate::circuit::BreakerPhase;
use crate::router::FailoverEngine;

#[derive(Debug, Clone, Serialize)]
pub struct ProviderSummary {
    pub provider: String,
    pub attempts: u32,
    pub successes: u32,
    pub failures: u32,
    pub last_reason_code: Option<String>,
    pub breaker_state: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Explanation {
    pub session_id: SessionId,
    pub candidates: Vec<String>,
    pub effective_policy: Policy,
    pub providers: Vec<ProviderSummary>,
    pub final_event: Option<String>,
}

fn breaker_state_name(phase: BreakerPhase) -> &'static str {
    match phase {
        BreakerPhase::Closed => "closed",
        BreakerPhase::Open => "open",
        BreakerPhase::HalfOpen => "half_open",
    }
}

/// Summarizes one session's timeline against the engine's live circuit
/// state and the statically-resolved candidate list for `tool`.
pub fn explain(
    engine: &FailoverEngine,
    session_id: SessionId,
    tool: Option<&str>,
    env_override: Option<&str>,
    global_policy: &Policy,
    tool_policy_override: Option<&Policy>,
) -> std::io::Result<Explanation> {
    let candidates = engine.candidates(tool, env_override);
    let effective_policy = corridor_core::resolve_effective_policy(global_policy, tool_policy_override);
    let events = engine.timeline().read_session(session_id)?;

    let mut summaries: HashMap<String, ProviderSummary> = HashMap::new();
    let mut final_event = None;

    for event in &events {
        final_event = Some(event.event.clone());
        let provider = event
            .details
            .get("provider")
            .and_then(|v| v.as_str())
            .map(str::to_string);

        let Some(provider) = provider else { continue };
        let entry = summaries.entry(provider.clone()).or_insert_with(|| ProviderSummary {
            provider: provider.clone(),
            attempts: 0,
            successes: 0,
            failures: 0,
            last_reason_code: None,
            breaker_state: breaker_state_name(engine.breaker().phase(&provider)).to_string(),
        });

        match event.event.as_str() {
            "provider_attempt" => entry.attempts += 1,
            "provider_success" => entry.successes += 1,
            "provider_failed" => {
                entry.failures += 1;
                entry.last_reason_code = event
                    .details
                    .get("reason_code")
                    .and_then(|v| v.as_str())
                    .map(str::to_string);
            }
            _ => {}
        }
    }

    // Refresh breaker state after the full pass, since it may have changed
    // across events recorded earlier in the session.
    for summary in summaries.values_mut() {
        summary.breaker_state = breaker_state_name(engine.breaker().phase(&summary.provider)).to_string();
    }

    let mut providers: Vec<ProviderSummary> = summaries.into_values().collect();
    providers.sort_by(|a, b| a.provider.cmp(&b.provider));

    Ok(Explanation {
        session_id,
        candidates,
        effective_policy,
        providers,
        final_event,
    })
}
