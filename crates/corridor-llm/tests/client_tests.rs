use corridor_llm::{LlmClient, LlmRequest, MockLlmClient, MockResponse};

fn req(prompt: &str) -> LlmRequest {
    LlmRequest {
        model: "mock-model".into(),
        system: Some("respond in JSON".into()),
        prompt: prompt.into(),
        max_tokens: 512,
        temperature: 0.0,
    }
}

#[tokio::test]
async fn mock_client_usable_through_trait_object() {
    let client: Box<dyn LlmClient> = Box::new(MockLlmClient::new("mock").with_response("42"));
    let resp = client.complete(&req("what is the answer")).await.unwrap();
    assert_eq!(resp.text, "42");
    assert_eq!(client.name(), "mock");
}

#[tokio::test]
async fn custom_mock_response_carries_usage() {
    let client = MockLlmClient::new("mock").with_mock_response(MockResponse {
        text: "done".into(),
        usage: corridor_llm::Usage {
            input_tokens: 10,
            output_tokens: 5,
            estimated_cost_usd: 0.0002,
        },
        error: None,
    });
    let resp = client.complete(&req("go")).await.unwrap();
    assert_eq!(resp.usage.total_tokens(), 15);
}
