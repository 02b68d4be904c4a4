//! Provider clients
//!
//! Supports OpenAI, Anthropic, Google Gemini and OpenRouter. Every client
//! implements [`ModelClient`] and is assembled locally, without network I/O.

pub mod anthropic;
pub mod google;
pub mod openai;
pub mod openrouter;
mod transport;
pub mod types;

pub use anthropic::AnthropicClient;
pub use google::GoogleClient;
pub use openai::OpenAiClient;
pub use openrouter::OpenRouterClient;
pub use types::{ModelClient, ProviderTag, UnknownProvider};
