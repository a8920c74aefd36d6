use async_trait::async_trait;
use corridor_core::{Result, RouterError};

use crate::client::{LlmClient, LlmRequest, LlmResponse, Usage};

/// OpenAI-compatible chat completions backend (works with OpenAI, Azure,
/// Together, vLLM, etc. by pointing `base_url` elsewhere).
pub struct OpenAiClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    client_name: String,
}

impl OpenAiClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: "https://api.openai.com/v1".into(),
            client_name: "openai".into(),
        }
    }

    pub fn with_base_url(mut self, url: String, name: String) -> Self {
        self.base_url = url;
        self.client_name = name;
        self
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    fn name(&self) -> &str {
        &self.client_name
    }

    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse> {
        let mut messages = Vec::new();
        if let Some(ref system) = request.system {
            messages.push(serde_json::json!({ "role": "system", "content": system }));
        }
        messages.push(serde_json::json!({ "role": "user", "content": request.prompt }));

        let mut body = serde_json::json!({
            "model": &request.model,
            "temperature": request.temperature,
            "messages": messages,
        });

        if uses_max_completion_tokens(&request.model) {
            body["max_completion_tokens"] = serde_json::json!(request.max_tokens);
        } else {
            body["max_tokens"] = serde_json::json!(request.max_tokens);
        }

        let resp = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| RouterError::LlmProvider(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            if status.as_u16() == 429 {
                return Err(RouterError::RateLimited { retry_after_secs: 30 });
            }
            return Err(RouterError::LlmProvider(format!("HTTP {status}: {text}")));
        }

        let data: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| RouterError::LlmProvider(e.to_string()))?;

        let content = data["choices"][0]["message"]["content"]
            .as_str()
            .unwrap_or("")
            .to_string();

        let usage_data = &data["usage"];
        let input_tokens = usage_data["prompt_tokens"].as_u64().unwrap_or(0) as u32;
        let output_tokens = usage_data["completion_tokens"].as_u64().unwrap_or(0) as u32;

        Ok(LlmResponse {
            text: content,
            usage: Usage {
                input_tokens,
                output_tokens,
                estimated_cost_usd: estimate_openai_cost(&request.model, input_tokens, output_tokens),
            },
        })
    }
}

/// Returns true for models that require `max_completion_tokens` instead of `max_tokens`.
fn uses_max_completion_tokens(model: &str) -> bool {
    let m = model.to_lowercase();
    m.starts_with("o1") || m.starts_with("o3") || m.starts_with("o4") || m.contains("gpt-5")
}

/// Estimate cost for OpenAI models (USD per 1M tokens).
fn estimate_openai_cost(model: &str, input_tokens: u32, output_tokens: u32) -> f64 {
    let (input_per_m, output_per_m) = match model {
        m if m.starts_with("gpt-4o-mini") => (0.15, 0.60),
        m if m.starts_with("gpt-4o") => (2.50, 10.00),
        m if m.starts_with("gpt-4-turbo") => (10.00, 30.00),
        m if m.starts_with("gpt-4") => (30.00, 60.00),
        m if m.contains("gpt-5") => (2.50, 10.00),
        m if m.starts_with("o3-mini") => (1.10, 4.40),
        m if m.starts_with("o3") => (10.00, 40.00),
        m if m.starts_with("o1-mini") => (3.00, 12.00),
        m if m.starts_with("o1") => (15.00, 60.00),
        _ => (2.50, 10.00),
    };
    (input_tokens as f64 * input_per_m + output_tokens as f64 * output_per_m) / 1_000_000.0
}
