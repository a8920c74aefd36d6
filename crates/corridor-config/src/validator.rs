use crate::loader::ConfigLoader;

/// A single cross-file configuration issue. Errors block startup; warnings
/// are logged and otherwise ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigIssue {
    pub field: String,
    pub message: String,
    pub severity: Severity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

impl std::fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tag = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "[{}] {}: {}", tag, self.field, self.message)
    }
}

/// Validate a loaded configuration across `models/registry.yaml`,
/// `routing.yaml`, and `policies/guardrails.yaml` together — checks that
/// can't be expressed while parsing a single file in isolation.
pub fn validate_all(loader: &ConfigLoader) -> Vec<ConfigIssue> {
    let mut issues = Vec::new();
    issues.extend(validate_routing(loader));
    issues.extend(validate_policies(loader));
    issues
}

fn validate_routing(loader: &ConfigLoader) -> Vec<ConfigIssue> {
    let mut issues = Vec::new();
    let registry = loader.registry();
    let routing = loader.routing();

    let mut check_ref = |field: String, provider: &str| {
        if !registry.contains(provider) {
            issues.push(ConfigIssue {
                field,
                message: format!("references unknown provider '{provider}'"),
                severity: Severity::Error,
            });
        }
    };

    if let Some(p) = &routing.default_provider {
        check_ref("routing.default_provider".into(), p);
    }
    for p in &routing.fallback_chain {
        check_ref("routing.fallback_chain".into(), p);
    }
    for (tool, chain) in &routing.task_routing.by_tool {
        for p in chain {
            check_ref(format!("routing.task_routing.by_tool[{tool}]"), p);
        }
    }
    for (tool, chain) in &routing.task_routing.fallback_chain {
        for p in chain {
            check_ref(format!("routing.task_routing.fallback_chain[{tool}]"), p);
        }
    }

    if registry.default_provider.is_none() && routing.default_provider.is_none() {
        issues.push(ConfigIssue {
            field: "routing.default_provider".into(),
            message: "no default provider configured anywhere; a call with no matching route will have no candidates".into(),
            severity: Severity::Warning,
        });
    }

    if let Some(stype) = &routing.strategy.strategy_type {
        if stype != "weighted" {
            issues.push(ConfigIssue {
                field: "routing.strategy.type".into(),
                message: format!("'{stype}' is not recognized; supported: [weighted]"),
                severity: Severity::Warning,
            });
        }
    }
    for p in routing.strategy.weights.keys() {
        check_ref("routing.strategy.weights".into(), p);
    }
    if !routing.strategy.weights.is_empty() {
        let total: f64 = routing.strategy.weights.values().sum();
        if !(0.99..=1.01).contains(&total) {
            issues.push(ConfigIssue {
                field: "routing.strategy.weights".into(),
                message: format!("weights sum to {total:.4}; consider normalizing to 1.0"),
                severity: Severity::Warning,
            });
        }
    }

    let both_routed: Vec<&String> = routing
        .task_routing
        .by_tool
        .keys()
        .filter(|tool| routing.task_routing.fallback_chain.contains_key(*tool))
        .collect();
    for tool in both_routed {
        issues.push(ConfigIssue {
            field: format!("routing.task_routing[{tool}]"),
            message: "has both by_tool and a tool-level fallback_chain; by_tool takes precedence".into(),
            severity: Severity::Warning,
        });
    }

    issues
}

fn validate_policies(loader: &ConfigLoader) -> Vec<ConfigIssue> {
    let mut issues = Vec::new();
    let registry = loader.registry();
    let routing = loader.routing();

    if let Some(limit) = routing.policies.max_cost_usd_per_request {
        if limit <= 0.0 {
            issues.push(ConfigIssue {
                field: "routing.policies.max_cost_usd_per_request".into(),
                message: format!("must be positive, got {limit}"),
                severity: Severity::Error,
            });
        }
    }
    if let Some(threshold) = routing.policies.circuit_breaker.map(|cb| cb.failure_threshold) {
        if threshold == 0 {
            issues.push(ConfigIssue {
                field: "routing.policies.circuit_breaker.failure_threshold".into(),
                message: "must be at least 1".into(),
                severity: Severity::Error,
            });
        }
    }

    if let Some(required) = &routing.policies.required_capabilities {
        let satisfiable = registry
            .providers
            .values()
            .any(|spec| required.iter().all(|cap| spec.has_capability(cap)));
        if !satisfiable && !registry.providers.is_empty() {
            issues.push(ConfigIssue {
                field: "routing.policies.required_capabilities".into(),
                message: format!(
                    "no provider in the registry satisfies all of {required:?}"
                ),
                severity: Severity::Warning,
            });
        }
    }

    for (tool, policy) in &routing.task_routing.policies {
        if let Some(required) = &policy.required_capabilities {
            let candidates: Vec<&String> = routing
                .task_routing
                .by_tool
                .get(tool)
                .into_iter()
                .flatten()
                .chain(routing.task_routing.fallback_chain.get(tool).into_iter().flatten())
                .collect();
            let pool: Vec<_> = if candidates.is_empty() {
                registry.providers.values().collect()
            } else {
                candidates
                    .iter()
                    .filter_map(|name: &&String| registry.get(name.as_str()))
                    .collect()
            };
            let satisfiable = pool.iter().any(|spec| required.iter().all(|cap| spec.has_capability(cap)));
            if !satisfiable && !pool.is_empty() {
                issues.push(ConfigIssue {
                    field: format!("routing.task_routing.policies[{tool}].required_capabilities"),
                    message: format!("no candidate provider for '{tool}' satisfies all of {required:?}"),
                    severity: Severity::Warning,
                });
            }
        }
    }

    issues
}
