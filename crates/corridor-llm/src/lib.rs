//! Single-turn LLM backend abstraction: one call in, one completion out.
//! Failover and retry live in `corridor-engine`, not here.

pub mod anthropic;
pub mod client;
pub mod local;
pub mod mock;
pub mod openai;

pub use anthropic::AnthropicClient;
pub use client::{LlmClient, LlmRequest, LlmResponse, Usage};
pub use local::LocalClient;
pub use mock::{MockLlmClient, MockResponse};
pub use openai::OpenAiClient;
