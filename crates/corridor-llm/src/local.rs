use async_trait::async_trait;
use corridor_core::{Result, RouterError};
use tracing::info;

use crate::client::{LlmClient, LlmRequest, LlmResponse, Usage};

/// Local model backend — wraps Ollama's OpenAI-compatible chat endpoint.
pub struct LocalClient {
    client: reqwest::Client,
    base_url: String,
}

impl LocalClient {
    pub fn new(base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
        }
    }

    pub fn ollama() -> Self {
        Self::new("http://127.0.0.1:11434".into())
    }
}

#[async_trait]
impl LlmClient for LocalClient {
    fn name(&self) -> &str {
        "local"
    }

    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse> {
        let mut messages = Vec::new();
        if let Some(ref system) = request.system {
            messages.push(serde_json::json!({ "role": "system", "content": system }));
        }
        messages.push(serde_json::json!({ "role": "user", "content": request.prompt }));

        let body = serde_json::json!({
            "model": &request.model,
            "messages": messages,
            "stream": false,
            "options": {
                "temperature": request.temperature,
                "num_predict": request.max_tokens,
            }
        });

        let resp = self
            .client
            .post(format!("{}/api/chat", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(|e| RouterError::LlmProvider(format!("local: {e}")))?;

        if !resp.status().is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(RouterError::LlmProvider(format!("local model error: {text}")));
        }

        let data: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| RouterError::LlmProvider(e.to_string()))?;

        let content = data["message"]["content"].as_str().unwrap_or("").to_string();

        Ok(LlmResponse {
            text: content,
            usage: Usage {
                input_tokens: data["prompt_eval_count"].as_u64().unwrap_or(0) as u32,
                output_tokens: data["eval_count"].as_u64().unwrap_or(0) as u32,
                estimated_cost_usd: 0.0,
            },
        })
    }
}

pub async fn health_check(client: &LocalClient) -> Result<()> {
    info!(base_url = %client.base_url, "checking local model health");
    let resp = client
        .client
        .get(format!("{}/api/tags", client.base_url))
        .send()
        .await
        .map_err(|e| RouterError::LlmProvider(format!("local unreachable: {e}")))?;

    if resp.status().is_success() {
        Ok(())
    } else {
        Err(RouterError::LlmProvider("local model server unhealthy".into()))
    }
}
