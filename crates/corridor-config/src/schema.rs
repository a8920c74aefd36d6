use std::collections::HashMap;
use std::path::PathBuf;

use corridor_core::{Policy, ProviderRegistry};
use serde::{Deserialize, Serialize};

/// `models/registry.yaml` — the known providers and the process-wide default.
pub type ModelsRegistry = ProviderRegistry;

/// `routing.yaml` — how candidate providers are chosen for a call, and the
/// numeric/boolean policy envelope governing each attempt.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    pub strategy: StrategyConfig,
    pub default_provider: Option<String>,
    pub fallback_chain: Vec<String>,
    pub policies: Policy,
    pub task_routing: TaskRouting,
}

/// Declared selection strategy. `weights` is advisory only: candidate order
/// is never re-sorted by weight (see the router's attempt loop), but a
/// configuration validator checks providers exist and weights roughly sum
/// to 1.0.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyConfig {
    #[serde(rename = "type")]
    pub strategy_type: Option<String>,
    pub weights: HashMap<String, f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskRouting {
    /// tool name -> ordered list of preferred providers, tried in order
    pub by_tool: HashMap<String, Vec<String>>,
    /// tool name -> ordered fallback chain, overriding the global chain
    pub fallback_chain: HashMap<String, Vec<String>>,
    /// tool name -> policy override, shallow-merged over `policies`
    pub policies: HashMap<String, Policy>,
}

impl RoutingConfig {
    /// The effective policy for a tool: global policy merged with that
    /// tool's override, if any.
    pub fn tool_policy(&self, tool: &str) -> Policy {
        match self.task_routing.policies.get(tool) {
            Some(over) => self.policies.merge(over),
            None => self.policies.clone(),
        }
    }

    /// Build the canonical candidate order for a tool call, per the
    /// precedence: environment override shadows all; else `by_tool[tool]`
    /// if present; else `fallback_chain[tool]` if present; else the global
    /// `fallback_chain`; else the configured default provider. Each tier is
    /// exclusive — the first that applies is returned outright, never
    /// merged with a lower tier. `env_override` is the value of
    /// `LLM_PROVIDER`, if set.
    pub fn candidates_for_tool(&self, tool: Option<&str>, env_override: Option<&str>) -> Vec<String> {
        if let Some(p) = env_override {
            return vec![p.to_string()];
        }
        if let Some(tool) = tool {
            if let Some(chain) = self.task_routing.by_tool.get(tool) {
                return chain.clone();
            }
            if let Some(chain) = self.task_routing.fallback_chain.get(tool) {
                return chain.clone();
            }
        }
        if !self.fallback_chain.is_empty() {
            return self.fallback_chain.clone();
        }
        if let Some(p) = &self.default_provider {
            return vec![p.clone()];
        }
        Vec::new()
    }
}

/// `policies/guardrails.yaml` — the concrete guard knobs enforced inside
/// tool handlers. The numeric/boolean policy envelope lives in
/// [`RoutingConfig`], not here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardrailsConfig {
    pub shell: ShellGuardrails,
    pub file: FileGuardrails,
    pub web_search: WebSearchGuardrails,
    pub open_app: OpenAppGuardrails,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellGuardrails {
    pub allow: Vec<String>,
    pub deny: Vec<String>,
    pub timeout_seconds: u64,
}

impl Default for ShellGuardrails {
    fn default() -> Self {
        Self {
            allow: Vec::new(),
            deny: Vec::new(),
            timeout_seconds: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileGuardrails {
    pub base_dir: PathBuf,
    pub max_bytes: usize,
}

impl Default for FileGuardrails {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("."),
            max_bytes: 1_000_000,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct WebSearchGuardrails {
    pub rate_limit_per_minute: u32,
    pub max_limit: u32,
}

impl Default for WebSearchGuardrails {
    fn default() -> Self {
        Self {
            rate_limit_per_minute: 10,
            max_limit: 20,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenAppGuardrails {
    pub allowlist: Vec<String>,
}

/// Fallback used when `policies/output_schema.json` is absent: a minimal
/// schema any [`OutputPayload`] satisfies.
pub fn default_output_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "required": ["answer", "citations"],
        "properties": {
            "answer": { "type": "string" },
            "citations": {
                "type": "array",
                "items": { "type": "string" },
                "minItems": 1
            },
            "tool_used": { "type": ["string", "null"] },
            "tool_result": {}
        }
    })
}
