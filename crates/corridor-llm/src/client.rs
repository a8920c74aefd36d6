use async_trait::async_trait;
use corridor_core::Result;
use serde::{Deserialize, Serialize};

/// A single-turn request to an LLM backend: a system prompt (used to embed
/// the structured-output schema) and a user prompt, nothing else. There is
/// no conversation history, no tool-call protocol, and no streaming — the
/// routing engine only ever needs one call in, one completion out.
#[derive(Debug, Clone)]
pub struct LlmRequest {
    /// Provider-specific model identifier, e.g. "claude-opus-4-6".
    pub model: String,
    pub system: Option<String>,
    pub prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// A complete response from an LLM backend.
#[derive(Debug, Clone)]
pub struct LlmResponse {
    pub text: String,
    pub usage: Usage,
}

/// Token usage and estimated cost for one completion.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
    pub estimated_cost_usd: f64,
}

impl Usage {
    pub fn total_tokens(&self) -> u32 {
        self.input_tokens + self.output_tokens
    }
}

/// Trait implemented by each LLM backend (Anthropic, OpenAI, local, mock).
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Name this client is registered under, e.g. "anthropic".
    fn name(&self) -> &str;

    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse>;
}
