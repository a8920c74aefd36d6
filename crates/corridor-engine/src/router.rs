//! The top-level orchestrator: composes the candidate list,
//! attempts providers sequentially through the circuit breaker and policy
//! gate, drives the structured-output retry loop, and emits timeline
//! events for every step.

use std::collections::HashMap;
use std::time::Instant;

use corridor_config::RoutingConfig;
use corridor_core::{
    ErrorKind, OutputPayload, Policy, ProviderRegistry, SessionId, Timeline, TimelineEvent,
};
use corridor_llm::LlmClient;
use serde_json::{json, Map, Value};
use tracing::{debug, info, warn};

use crate::circuit::{Admission, CircuitBreaker};
use crate::degrade;
use crate::policy_gate::PolicyGate;
use crate::retry::{self, RetryObserver};

/// Result of one `attempt` call: a payload only on success, plus the
/// ordered list of tags recording every attempt and skip.
pub struct AttemptResult {
    pub payload: Option<OutputPayload>,
    pub provider: Option<String>,
    pub model: Option<String>,
    pub tried: Vec<String>,
}

pub struct FailoverEngine {
    registry: ProviderRegistry,
    routing: RoutingConfig,
    breaker: CircuitBreaker,
    timeline: Timeline,
    clients: HashMap<String, Box<dyn LlmClient>>,
}

impl FailoverEngine {
    pub fn new(
        registry: ProviderRegistry,
        routing: RoutingConfig,
        timeline: Timeline,
        clients: HashMap<String, Box<dyn LlmClient>>,
    ) -> Self {
        Self {
            registry,
            routing,
            breaker: CircuitBreaker::new(),
            timeline,
            clients,
        }
    }

    pub fn breaker(&self) -> &CircuitBreaker {
        &self.breaker
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    pub fn candidates(&self, tool: Option<&str>, env_override: Option<&str>) -> Vec<String> {
        let ordered = self.routing.candidates_for_tool(tool, env_override);
        self.registry.filter_known(&ordered)
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn attempt(
        &self,
        session_id: SessionId,
        tool: Option<&str>,
        user_prompt: &str,
        citation: &str,
        tool_result: &Value,
        schema: &Value,
        global_policy: &Policy,
        tool_policy_override: Option<&Policy>,
        env_override: Option<&str>,
    ) -> AttemptResult {
        let candidates = self.candidates(tool, env_override);
        let effective_policy = corridor_core::resolve_effective_policy(global_policy, tool_policy_override);
        let breaker_policy = effective_policy.circuit_breaker();

        debug!(%session_id, ?tool, candidates = ?candidates, "attempt loop starting");

        let mut tried = Vec::new();
        let attempt_start = Instant::now();

        for provider_name in &candidates {
            if let Some(total_ms) = effective_policy.max_latency_ms_total {
                let elapsed_ms = attempt_start.elapsed().as_millis() as u64;
                if elapsed_ms >= total_ms {
                    tried.push("sla_timeout_total".to_string());
                    self.emit(session_id, "sla_timeout_total", json_details(&[("elapsed_ms", json!(elapsed_ms))]));
                    warn!(%session_id, elapsed_ms, total_ms, "end-to-end SLA exceeded");

                    return match effective_policy.on_sla_timeout() {
                        corridor_core::OnSlaTimeout::Degrade => {
                            let payload = degrade::build_validated(citation, tool, tool_result, schema)
                                .unwrap_or_else(|_| degrade::build(citation, tool, tool_result));
                            tried.push("sla_degrade".to_string());
                            self.emit(session_id, "sla_degrade_total", Map::new());
                            info!(%session_id, "synthesized degraded payload after SLA timeout");
                            AttemptResult { payload: Some(payload), provider: None, model: None, tried }
                        }
                        corridor_core::OnSlaTimeout::Abort => {
                            warn!(%session_id, "aborting after SLA timeout");
                            AttemptResult { payload: None, provider: None, model: None, tried }
                        }
                    };
                }
            }

            let admission = self.breaker.should_skip(provider_name, breaker_policy.cooldown_seconds);
            match admission {
                Admission::Skip => {
                    tried.push(format!("skip_circuit_open:{provider_name}"));
                    self.emit(session_id, "circuit_skip_open", json_details(&[("provider", json!(provider_name))]));
                    debug!(%session_id, provider = %provider_name, "circuit open, skipping");
                    continue;
                }
                Admission::AllowHalfOpen => {
                    self.emit(session_id, "circuit_half_open", json_details(&[("provider", json!(provider_name))]));
                    debug!(%session_id, provider = %provider_name, "circuit half-open, admitting one attempt");
                }
                Admission::Allow => {}
            }

            let Some(spec) = self.registry.get(provider_name) else {
                continue;
            };

            if let Err(reject) = PolicyGate::allows(spec, &effective_policy) {
                tried.push(format!("skip_policy:{provider_name}"));
                self.emit(session_id, "provider_skip_policy", json_details(&[("provider", json!(provider_name))]));
                debug!(%session_id, provider = %provider_name, reason = %reject, "policy gate rejected provider");
                continue;
            }

            let Some(client) = self.clients.get(provider_name) else {
                continue;
            };

            tried.push(provider_name.clone());
            self.emit(session_id, "provider_attempt", json_details(&[("provider", json!(provider_name))]));
            debug!(%session_id, provider = %provider_name, model = %spec.model, "attempting provider");

            let mut observer = TimelineObserver { engine: self, session_id, model: &spec.model };
            let outcome = retry::run(
                client.as_ref(),
                &spec.model,
                user_prompt,
                citation,
                tool,
                tool_result,
                schema,
                2,
                &mut observer,
            )
            .await;

            match outcome {
                Ok(outcome) => {
                    if let Some(limit_ms) = effective_policy.max_latency_ms {
                        if outcome.duration_ms > limit_ms {
                            self.breaker.record_failure(provider_name, breaker_policy.failure_threshold);
                            self.emit(
                                session_id,
                                "provider_failed",
                                json_details(&[
                                    ("provider", json!(provider_name)),
                                    ("reason_code", json!(ErrorKind::LatencyExceeded.as_str())),
                                    ("duration_ms", json!(outcome.duration_ms)),
                                ]),
                            );
                            tried.push(format!("latency_exceeded:{provider_name}"));
                            warn!(%session_id, provider = %provider_name, duration_ms = outcome.duration_ms, limit_ms, "provider exceeded per-call latency cap");
                            continue;
                        }
                    }

                    self.breaker.record_success(provider_name);
                    self.emit(
                        session_id,
                        "provider_success",
                        json_details(&[("provider", json!(provider_name)), ("duration_ms", json!(outcome.duration_ms))]),
                    );
                    info!(%session_id, provider = %provider_name, duration_ms = outcome.duration_ms, "provider succeeded");
                    return AttemptResult {
                        payload: Some(outcome.payload),
                        provider: Some(provider_name.clone()),
                        model: Some(spec.model.clone()),
                        tried,
                    };
                }
                Err(e) => {
                    self.breaker.record_failure(provider_name, breaker_policy.failure_threshold);
                    let kind = ErrorKind::from(&e);
                    self.emit(
                        session_id,
                        "provider_failed",
                        json_details(&[("provider", json!(provider_name)), ("reason_code", json!(kind.as_str()))]),
                    );
                    debug!(%session_id, provider = %provider_name, reason_code = kind.as_str(), "provider attempt failed");
                    continue;
                }
            }
        }

        self.emit(session_id, "all_providers_failed", Map::new());
        warn!(%session_id, tried = ?tried, "all candidates exhausted without success");
        AttemptResult { payload: None, provider: None, model: None, tried }
    }

    fn emit(&self, session_id: SessionId, event: &str, details: Map<String, Value>) {
        self.timeline.append(&TimelineEvent::new(session_id, event, details));
    }
}

fn json_details(pairs: &[(&str, Value)]) -> Map<String, Value> {
    let mut map = Map::new();
    for (k, v) in pairs {
        map.insert((*k).to_string(), v.clone());
    }
    map
}

struct TimelineObserver<'a> {
    engine: &'a FailoverEngine,
    session_id: SessionId,
    model: &'a str,
}

impl RetryObserver for TimelineObserver<'_> {
    fn on_attempt(&mut self, attempt: u32) {
        self.engine.emit(
            self.session_id,
            "structured_attempt",
            json_details(&[("attempt", json!(attempt)), ("model", json!(self.model))]),
        );
    }

    fn on_retry(&mut self, attempt: u32, error: &str) {
        self.engine.emit(
            self.session_id,
            "structured_retry",
            json_details(&[("attempt", json!(attempt)), ("error", json!(error))]),
        );
    }

    fn on_success(&mut self, attempt: u32) {
        self.engine.emit(
            self.session_id,
            "structured_success",
            json_details(&[("attempt", json!(attempt))]),
        );
    }
}
