use corridor_config::{validate_all, ConfigLoader, Severity};
use std::fs;

fn write(dir: &std::path::Path, rel: &str, contents: &str) {
    let path = dir.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

#[test]
fn loader_falls_back_to_defaults_when_files_absent() {
    let dir = tempfile::tempdir().unwrap();
    let loader = ConfigLoader::load(Some(dir.path())).unwrap();
    assert!(loader.registry().providers.is_empty());
    assert!(loader.routing().fallback_chain.is_empty());
    assert_eq!(loader.output_schema()["type"], "object");
}

#[test]
fn loader_parses_registry_and_routing_yaml() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "models/registry.yaml",
        r#"
default_provider: anthropic
providers:
  anthropic:
    name: anthropic
    model: claude-opus-4-6
    capabilities: [chat, vision]
  local:
    name: local
    model: llama-3
    capabilities: [chat]
"#,
    );
    write(
        dir.path(),
        "routing.yaml",
        r#"
default_provider: anthropic
fallback_chain: [anthropic, local]
task_routing:
  by_tool:
    summarize: [local, anthropic]
  fallback_chain:
    web_search: [anthropic]
"#,
    );

    let loader = ConfigLoader::load(Some(dir.path())).unwrap();
    assert_eq!(loader.registry().providers.len(), 2);
    assert_eq!(loader.routing().default_provider.as_deref(), Some("anthropic"));

    let candidates = loader.routing().candidates_for_tool(Some("summarize"), None);
    assert_eq!(candidates, vec!["local".to_string(), "anthropic".to_string()]);

    let candidates = loader.routing().candidates_for_tool(Some("web_search"), None);
    assert_eq!(candidates, vec!["anthropic".to_string()]);
}

#[test]
fn routing_candidates_env_override_wins() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "routing.yaml",
        r#"
default_provider: anthropic
fallback_chain: [anthropic, local]
"#,
    );
    let loader = ConfigLoader::load(Some(dir.path())).unwrap();
    let candidates = loader.routing().candidates_for_tool(None, Some("local"));
    assert_eq!(candidates[0], "local");
}

#[test]
fn routing_tool_override_merges_over_global_policy() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "routing.yaml",
        r#"
policies:
  max_latency_ms: 2000
  on_sla_timeout: abort
task_routing:
  policies:
    quick_tool:
      max_latency_ms: 200
"#,
    );
    write(
        dir.path(),
        "policies/guardrails.yaml",
        r#"
shell:
  allow: ["ls", "cat"]
  deny: ["rm"]
  timeout_seconds: 5
file:
  base_dir: /tmp/sandbox
  max_bytes: 2048
web_search:
  rate_limit_per_minute: 3
"#,
    );
    let loader = ConfigLoader::load(Some(dir.path())).unwrap();
    let routing = loader.routing();

    let effective = routing.tool_policy("quick_tool");
    assert_eq!(effective.max_latency_ms, Some(200));
    assert_eq!(
        effective.on_sla_timeout(),
        corridor_core::OnSlaTimeout::Abort
    );

    let untouched = routing.tool_policy("other_tool");
    assert_eq!(untouched.max_latency_ms, Some(2000));

    let guardrails = loader.guardrails();
    assert_eq!(guardrails.shell.deny, vec!["rm".to_string()]);
    assert_eq!(guardrails.web_search.rate_limit_per_minute, 3);
}

#[test]
fn validate_all_flags_unknown_provider_reference() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "models/registry.yaml",
        r#"
providers:
  anthropic:
    name: anthropic
    model: claude-opus-4-6
"#,
    );
    write(
        dir.path(),
        "routing.yaml",
        r#"
default_provider: ghost
fallback_chain: [anthropic]
"#,
    );
    let loader = ConfigLoader::load(Some(dir.path())).unwrap();
    let issues = validate_all(&loader);
    assert!(issues
        .iter()
        .any(|i| i.severity == Severity::Error && i.field == "routing.default_provider"));
}

#[test]
fn validate_all_warns_on_unsatisfiable_capability() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "models/registry.yaml",
        r#"
providers:
  local:
    name: local
    model: llama-3
    capabilities: [chat]
"#,
    );
    write(
        dir.path(),
        "routing.yaml",
        r#"
policies:
  required_capabilities: [vision]
"#,
    );
    let loader = ConfigLoader::load(Some(dir.path())).unwrap();
    let issues = validate_all(&loader);
    assert!(issues.iter().any(|i| i.severity == Severity::Warning
        && i.field == "routing.policies.required_capabilities"));
}

#[test]
fn output_schema_falls_back_to_builtin_default() {
    let dir = tempfile::tempdir().unwrap();
    let loader = ConfigLoader::load(Some(dir.path())).unwrap();
    let schema = loader.output_schema();
    assert!(schema["required"]
        .as_array()
        .unwrap()
        .iter()
        .any(|v| v == "citations"));
}
