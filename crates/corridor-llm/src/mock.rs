//! Mock LLM backend for deterministic testing — returns pre-configured
//! responses without making any HTTP calls.

use async_trait::async_trait;
use std::sync::Mutex;

use corridor_core::{Result, RouterError};

use crate::client::{LlmClient, LlmRequest, LlmResponse, Usage};

/// A pre-configured response from the mock backend.
#[derive(Clone)]
pub struct MockResponse {
    pub text: String,
    pub usage: Usage,
    /// If set, the client returns this error instead.
    pub error: Option<String>,
}

impl Default for MockResponse {
    fn default() -> Self {
        Self {
            text: String::new(),
            usage: Usage {
                input_tokens: 100,
                output_tokens: 50,
                estimated_cost_usd: 0.001,
            },
            error: None,
        }
    }
}

impl MockResponse {
    pub fn text(text: &str) -> Self {
        Self {
            text: text.to_string(),
            ..Default::default()
        }
    }

    pub fn error(msg: &str) -> Self {
        Self {
            error: Some(msg.to_string()),
            ..Default::default()
        }
    }
}

/// A mock LLM client that returns queued responses in order.
pub struct MockLlmClient {
    name: String,
    responses: Mutex<Vec<MockResponse>>,
    requests: Mutex<Vec<LlmRequest>>,
}

impl MockLlmClient {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            responses: Mutex::new(Vec::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with_response(self, text: &str) -> Self {
        self.responses.lock().unwrap().push(MockResponse::text(text));
        self
    }

    pub fn with_error(self, error: &str) -> Self {
        self.responses.lock().unwrap().push(MockResponse::error(error));
        self
    }

    pub fn with_mock_response(self, resp: MockResponse) -> Self {
        self.responses.lock().unwrap().push(resp);
        self
    }

    pub fn recorded_requests(&self) -> Vec<LlmRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn next_response(&self) -> MockResponse {
        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            MockResponse::text("(mock: no more queued responses)")
        } else {
            responses.remove(0)
        }
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse> {
        self.requests.lock().unwrap().push(request.clone());
        let mock = self.next_response();

        if let Some(error) = mock.error {
            return Err(RouterError::LlmProvider(error));
        }

        Ok(LlmResponse {
            text: mock.text,
            usage: mock.usage,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn req(prompt: &str) -> LlmRequest {
        LlmRequest {
            model: "mock-model".into(),
            system: None,
            prompt: prompt.into(),
            max_tokens: 256,
            temperature: 0.0,
        }
    }

    #[tokio::test]
    async fn returns_queued_text_response() {
        let client = MockLlmClient::new("mock").with_response("hello");
        let resp = client.complete(&req("hi")).await.unwrap();
        assert_eq!(resp.text, "hello");
    }

    #[tokio::test]
    async fn returns_queued_error() {
        let client = MockLlmClient::new("mock").with_error("HTTP 429: rate limited");
        let result = client.complete(&req("hi")).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn responses_are_returned_in_order() {
        let client = MockLlmClient::new("mock")
            .with_response("first")
            .with_response("second");
        let r1 = client.complete(&req("a")).await.unwrap();
        let r2 = client.complete(&req("b")).await.unwrap();
        assert_eq!(r1.text, "first");
        assert_eq!(r2.text, "second");
    }

    #[tokio::test]
    async fn records_requests_for_assertions() {
        let client = MockLlmClient::new("mock").with_response("ok");
        let _ = client.complete(&req("remember me")).await;
        let recorded = client.recorded_requests();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].prompt, "remember me");
    }
}
