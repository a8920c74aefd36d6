use corridor_core::*;
use serde_json::json;
use uuid::Uuid;

// ── Policy merge ────────────────────────────────────────────────

#[test]
fn policy_merge_override_wins_key_by_key() {
    let global = Policy {
        max_latency_ms: Some(2000),
        max_latency_ms_total: Some(10_000),
        max_cost_usd_per_request: Some(0.50),
        required_capabilities: Some(vec!["chat".into()]),
        on_sla_timeout: Some(OnSlaTimeout::Abort),
        circuit_breaker: None,
    };
    let tool_override = Policy {
        max_latency_ms: Some(500),
        max_latency_ms_total: None,
        max_cost_usd_per_request: None,
        required_capabilities: None,
        on_sla_timeout: Some(OnSlaTimeout::Degrade),
        circuit_breaker: None,
    };

    let effective = resolve_effective_policy(&global, Some(&tool_override));
    assert_eq!(effective.max_latency_ms, Some(500));
    assert_eq!(effective.max_latency_ms_total, Some(10_000));
    assert_eq!(effective.max_cost_usd_per_request, Some(0.50));
    assert_eq!(effective.required_capabilities, Some(vec!["chat".into()]));
    assert_eq!(effective.on_sla_timeout(), OnSlaTimeout::Degrade);
}

#[test]
fn policy_merge_with_no_override_returns_global() {
    let global = Policy {
        max_latency_ms: Some(1000),
        ..Default::default()
    };
    let effective = resolve_effective_policy(&global, None);
    assert_eq!(effective.max_latency_ms, Some(1000));
}

#[test]
fn policy_defaults_are_abort_and_threshold_three() {
    let policy = Policy::default();
    assert_eq!(policy.on_sla_timeout(), OnSlaTimeout::Abort);
    assert_eq!(policy.circuit_breaker().failure_threshold, 3);
    assert_eq!(policy.circuit_breaker().cooldown_seconds, 30.0);
}

// ── Provider registry ───────────────────────────────────────────

#[test]
fn registry_filter_known_drops_unknown_preserving_order() {
    let mut registry = ProviderRegistry::default();
    registry.providers.insert(
        "anthropic".into(),
        ProviderSpec {
            name: "anthropic".into(),
            model: "claude-opus-4-6".into(),
            capabilities: vec!["chat".into(), "vision".into()],
            cost: CostRates::default(),
            api_key_env: None,
            base_url: None,
        },
    );
    registry.providers.insert(
        "local".into(),
        ProviderSpec {
            name: "local".into(),
            model: "llama-3".into(),
            capabilities: vec!["chat".into()],
            cost: CostRates::default(),
            api_key_env: None,
            base_url: None,
        },
    );

    let requested = vec!["anthropic".to_string(), "ghost".to_string(), "local".to_string()];
    let filtered = registry.filter_known(&requested);
    assert_eq!(filtered, vec!["anthropic".to_string(), "local".to_string()]);
}

#[test]
fn provider_spec_has_capability() {
    let spec = ProviderSpec {
        name: "anthropic".into(),
        model: "claude-opus-4-6".into(),
        capabilities: vec!["chat".into(), "vision".into()],
        cost: CostRates::default(),
        api_key_env: None,
        base_url: None,
    };
    assert!(spec.has_capability("vision"));
    assert!(!spec.has_capability("audio"));
}

// ── Error taxonomy ──────────────────────────────────────────────

#[test]
fn error_kind_classifies_latency_exceeded() {
    let err = RouterError::LatencyExceeded {
        duration_ms: 3000,
        limit_ms: 2000,
    };
    assert_eq!(ErrorKind::from(&err), ErrorKind::LatencyExceeded);
    assert_eq!(ErrorKind::from(&err).as_str(), "latency_exceeded");
}

#[test]
fn error_kind_classifies_policy_cost() {
    let err = RouterError::PolicyCost {
        estimated: 1.2,
        limit: 0.5,
    };
    assert_eq!(ErrorKind::from(&err), ErrorKind::PolicyCost);
}

#[test]
fn error_display_includes_context() {
    let err = RouterError::ToolGuardDenied {
        tool: "run_command".into(),
        reason: "command not in allow-list".into(),
    };
    let s = err.to_string();
    assert!(s.contains("run_command"));
    assert!(s.contains("allow-list"));
}

// ── Tool types ───────────────────────────────────────────────────

#[test]
fn tool_result_ok_and_err_constructors() {
    let ok = ToolResult::ok("call_1", json!({"value": 4}));
    assert!(!ok.is_error);
    assert_eq!(ok.data["value"], 4);

    let err = ToolResult::err("call_2", "bad argument");
    assert!(err.is_error);
    assert_eq!(err.data["error"], "bad argument");
}

#[test]
fn tool_schema_serde_roundtrip() {
    let schema = ToolSchema {
        name: "calc".into(),
        description: "evaluate an arithmetic expression".into(),
        parameters: json!({"type": "object", "properties": {"expr": {"type": "string"}}}),
        output_kind: Some("calc".into()),
    };
    let raw = serde_json::to_string(&schema).unwrap();
    let restored: ToolSchema = serde_json::from_str(&raw).unwrap();
    assert_eq!(restored.name, "calc");
    assert_eq!(restored.output_kind.as_deref(), Some("calc"));
}

// ── Output payload ───────────────────────────────────────────────

#[test]
fn output_payload_contains_citation() {
    let payload = OutputPayload {
        answer: "42".into(),
        citations: vec!["calc:req-1".into()],
        tool_used: Some("calc".into()),
        tool_result: json!({"value": 42}),
    };
    assert!(payload.contains_citation("calc:req-1"));
    assert!(!payload.contains_citation("calc:req-2"));
}

// ── Timeline events ──────────────────────────────────────────────

#[test]
fn timeline_event_carries_session_and_details() {
    let session_id = Uuid::new_v4();
    let mut details = serde_json::Map::new();
    details.insert("provider".into(), json!("anthropic"));
    let event = TimelineEvent::new(session_id, "provider_attempt", details);
    assert_eq!(event.session_id, session_id);
    assert_eq!(event.event, "provider_attempt");
    assert_eq!(event.details.get("provider").unwrap(), "anthropic");
}
