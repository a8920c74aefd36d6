use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a routing session; ties a request to its timeline.
pub type SessionId = Uuid;

/// A named LLM backend with a model id, capability set, and cost rates.
///
/// Immutable for the lifetime of a run — loaded once at startup from
/// `models/registry.yaml` and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderSpec {
    /// Primary key; must match the key this spec is registered under.
    pub name: String,
    /// Provider-specific model identifier, e.g. "claude-opus-4-6".
    pub model: String,
    #[serde(default)]
    pub capabilities: Vec<String>,
    #[serde(default)]
    pub cost: CostRates,
    #[serde(default)]
    pub api_key_env: Option<String>,
    #[serde(default)]
    pub base_url: Option<String>,
}

impl ProviderSpec {
    pub fn has_capability(&self, cap: &str) -> bool {
        self.capabilities.iter().any(|c| c == cap)
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct CostRates {
    #[serde(default)]
    pub input_per_1k_tokens_usd: f64,
    #[serde(default)]
    pub output_per_1k_tokens_usd: f64,
}

/// What happens when the end-to-end SLA budget is exhausted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OnSlaTimeout {
    Degrade,
    Abort,
}

impl Default for OnSlaTimeout {
    fn default() -> Self {
        OnSlaTimeout::Abort
    }
}

/// Circuit breaker tuning knobs, carried inside a [`Policy`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CircuitBreakerPolicy {
    #[serde(default = "CircuitBreakerPolicy::default_threshold")]
    pub failure_threshold: u32,
    #[serde(default = "CircuitBreakerPolicy::default_cooldown")]
    pub cooldown_seconds: f64,
}

impl CircuitBreakerPolicy {
    fn default_threshold() -> u32 {
        3
    }
    fn default_cooldown() -> f64 {
        30.0
    }
}

impl Default for CircuitBreakerPolicy {
    fn default() -> Self {
        Self {
            failure_threshold: Self::default_threshold(),
            cooldown_seconds: Self::default_cooldown(),
        }
    }
}

/// The effective set of numeric and boolean predicates governing one request.
///
/// Produced by shallow-merging a tool-level override on top of the global
/// policy: every key the override sets wins, everything else falls through.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Policy {
    #[serde(default)]
    pub max_latency_ms: Option<u64>,
    #[serde(default)]
    pub max_latency_ms_total: Option<u64>,
    #[serde(default)]
    pub max_cost_usd_per_request: Option<f64>,
    #[serde(default)]
    pub required_capabilities: Option<Vec<String>>,
    #[serde(default)]
    pub on_sla_timeout: Option<OnSlaTimeout>,
    #[serde(default)]
    pub circuit_breaker: Option<CircuitBreakerPolicy>,
}

impl Policy {
    /// Shallow-merge `override_` on top of `self`: every field the override
    /// sets wins key by key, everything else falls through to the base.
    pub fn merge(&self, override_: &Policy) -> Policy {
        Policy {
            max_latency_ms: override_.max_latency_ms.or(self.max_latency_ms),
            max_latency_ms_total: override_.max_latency_ms_total.or(self.max_latency_ms_total),
            max_cost_usd_per_request: override_
                .max_cost_usd_per_request
                .or(self.max_cost_usd_per_request),
            required_capabilities: override_
                .required_capabilities
                .clone()
                .or_else(|| self.required_capabilities.clone()),
            on_sla_timeout: override_.on_sla_timeout.or(self.on_sla_timeout),
            circuit_breaker: override_.circuit_breaker.or(self.circuit_breaker),
        }
    }

    pub fn on_sla_timeout(&self) -> OnSlaTimeout {
        self.on_sla_timeout.unwrap_or_default()
    }

    pub fn circuit_breaker(&self) -> CircuitBreakerPolicy {
        self.circuit_breaker.unwrap_or_default()
    }
}

/// Resolve the effective policy for a (tool, session) at call entry: global
/// policy overlaid by the tool-level override, shallow-merged key by key.
pub fn resolve_effective_policy(global: &Policy, tool_override: Option<&Policy>) -> Policy {
    match tool_override {
        Some(over) => global.merge(over),
        None => global.clone(),
    }
}

/// A provider registry snapshot: the set of known providers plus the
/// configured default, as loaded from `models/registry.yaml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderRegistry {
    #[serde(default)]
    pub default_provider: Option<String>,
    #[serde(default)]
    pub providers: HashMap<String, ProviderSpec>,
}

impl ProviderRegistry {
    pub fn get(&self, name: &str) -> Option<&ProviderSpec> {
        self.providers.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.providers.contains_key(name)
    }

    /// Filter a candidate list down to names that exist in the registry,
    /// preserving order. Unknown providers are silently dropped.
    pub fn filter_known<'a>(&self, names: impl IntoIterator<Item = &'a String>) -> Vec<String> {
        names
            .into_iter()
            .filter(|n| self.contains(n))
            .cloned()
            .collect()
    }
}
