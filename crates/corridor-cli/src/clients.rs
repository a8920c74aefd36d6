//! Builds one [`LlmClient`] per provider declared in `models/registry.yaml`.
//!
//! The registry schema only carries a model id and credentials, not a
//! backend-type discriminant, so the concrete client is picked by a simple
//! name heuristic. `LLM_BASE_URL` always wins over a provider's own
//! `base_url`, matching the override env vars in the models registry spec.

use std::collections::HashMap;

use corridor_core::ProviderRegistry;
use corridor_llm::{AnthropicClient, LlmClient, LocalClient, OpenAiClient};
use tracing::warn;

pub fn build_clients(registry: &ProviderRegistry) -> HashMap<String, Box<dyn LlmClient>> {
    let global_base_url = std::env::var("LLM_BASE_URL").ok();
    let global_api_key = std::env::var("LLM_API_KEY").ok();

    let mut clients: HashMap<String, Box<dyn LlmClient>> = HashMap::new();
    for (name, spec) in &registry.providers {
        let api_key = spec
            .api_key_env
            .as_deref()
            .and_then(|env_name| std::env::var(env_name).ok())
            .or_else(|| global_api_key.clone());
        let base_url = global_base_url.clone().or_else(|| spec.base_url.clone());

        let lower = name.to_lowercase();
        let client: Box<dyn LlmClient> = if lower.contains("local") || lower.contains("ollama") {
            match base_url {
                Some(url) => Box::new(LocalClient::new(url)),
                None => Box::new(LocalClient::ollama()),
            }
        } else if lower.contains("anthropic") || lower.contains("claude") {
            let Some(key) = api_key else {
                warn!(provider = %name, "no api key resolved, skipping");
                continue;
            };
            let mut client = AnthropicClient::new(key);
            if let Some(url) = base_url {
                client = client.with_base_url(url);
            }
            Box::new(client)
        } else {
            let Some(key) = api_key else {
                warn!(provider = %name, "no api key resolved, skipping");
                continue;
            };
            let mut client = OpenAiClient::new(key);
            if let Some(url) = base_url {
                client = client.with_base_url(url, name.clone());
            }
            Box::new(client)
        };

        clients.insert(name.clone(), client);
    }
    clients
}
