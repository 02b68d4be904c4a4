//! llmroute-core - model identifier resolution for LLM backends
//!
//! This crate provides:
//! - Parsing of `"<provider>:<model>"` identifiers and the `fallback` sentinel
//! - Credential lookup from settings and environment variables
//! - Authenticated clients for OpenAI, Anthropic, Google Gemini and OpenRouter
//! - Ordered fallback chains across every configured provider

pub mod credentials;
pub mod error;
pub mod factory;
pub mod fallback;
pub mod handle;
pub mod identifier;
pub mod providers;
pub mod resolver;
pub mod settings;

#[cfg(test)]
mod log_capture;

// Re-export main types for convenience
pub use credentials::{CredentialField, CredentialResolver, CredentialSource, EnvSource, ProcessEnv};
pub use error::{ClientBuildError, ResolveError, Result};
pub use factory::ProviderClientFactory;
pub use fallback::{ChainEntry, FailoverError, FallbackChain, FallbackChainBuilder, FallbackModel};
pub use handle::ModelHandle;
pub use identifier::ModelIdentifier;
pub use providers::{ModelClient, ProviderTag};
pub use resolver::{ModelResolver, get_llm_model};
pub use settings::{ProviderSettings, Settings};
