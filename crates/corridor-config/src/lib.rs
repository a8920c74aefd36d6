//! Configuration system for the routing and reliability engine.
//!
//! Reads `models/registry.yaml`, `routing.yaml`, `policies/guardrails.yaml`,
//! and `policies/output_schema.json` from a config directory, in that set —
//! there is no precedence between them, each owns a distinct concern.
//! Provider API keys additionally fall back to the environment variable
//! named by each provider's `api_key_env`.

pub mod loader;
pub mod schema;
pub mod validator;

pub use loader::ConfigLoader;
pub use schema::{
    default_output_schema, FileGuardrails, GuardrailsConfig, ModelsRegistry, OpenAppGuardrails,
    RoutingConfig, ShellGuardrails, StrategyConfig, TaskRouting, WebSearchGuardrails,
};
pub use validator::{validate_all, ConfigIssue, Severity};
