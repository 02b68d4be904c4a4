//! Provider tags and the client capability every provider implements

use std::fmt;
use std::str::FromStr;

use reqwest::{Method, RequestBuilder};
use serde::{Deserialize, Serialize};
use url::Url;

/// One of the supported LLM backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderTag {
    OpenAi,
    Anthropic,
    Google,
    OpenRouter,
}

impl ProviderTag {
    /// All providers in fallback priority order (index 0 = primary)
    pub const PRIORITY: [ProviderTag; 4] = [
        ProviderTag::OpenAi,
        ProviderTag::Anthropic,
        ProviderTag::Google,
        ProviderTag::OpenRouter,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Anthropic => "anthropic",
            Self::Google => "google",
            Self::OpenRouter => "openrouter",
        }
    }

    /// Prefix accepted in `"<prefix>:<model>"` identifiers
    pub fn identifier_prefix(&self) -> &'static str {
        match self {
            Self::Google => "gemini",
            other => other.as_str(),
        }
    }

    /// Look up a provider by identifier prefix (case-sensitive)
    pub fn from_identifier_prefix(prefix: &str) -> Option<Self> {
        Self::PRIORITY
            .into_iter()
            .find(|tag| tag.identifier_prefix() == prefix)
    }

    /// Tag used in fallback chain entries consumed downstream
    pub fn wire_tag(&self) -> &'static str {
        match self {
            Self::Google => "google-gla",
            other => other.as_str(),
        }
    }

    /// Environment variables holding the API key, tried in order
    pub fn api_key_env_vars(&self) -> &'static [&'static str] {
        match self {
            Self::OpenAi => &["OPENAI_API_KEY"],
            Self::Anthropic => &["ANTHROPIC_API_KEY"],
            Self::Google => &["GOOGLE_API_KEY", "GEMINI_API_KEY"],
            Self::OpenRouter => &["OPENROUTER_API_KEY"],
        }
    }

    /// Environment variables holding a base URL override. OpenRouter has none.
    pub fn base_url_env_vars(&self) -> &'static [&'static str] {
        match self {
            Self::OpenAi => &["OPENAI_BASE_URL"],
            Self::Anthropic => &["ANTHROPIC_BASE_URL"],
            Self::Google => &["GOOGLE_BASE_URL"],
            Self::OpenRouter => &[],
        }
    }

    /// Model used when the settings don't name one
    pub fn default_model(&self) -> &'static str {
        match self {
            Self::OpenAi => "gpt-4o",
            Self::Anthropic => "claude-3-5-sonnet-latest",
            Self::Google => "gemini-2.5-pro",
            Self::OpenRouter => "openai/gpt-4o",
        }
    }

    /// Endpoint root used when no override is in effect
    pub fn default_base_url(&self) -> &'static str {
        match self {
            Self::OpenAi => "https://api.openai.com/v1",
            Self::Anthropic => "https://api.anthropic.com",
            Self::Google => "https://generativelanguage.googleapis.com/v1beta",
            Self::OpenRouter => "https://openrouter.ai/api/v1",
        }
    }
}

impl fmt::Display for ProviderTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string names no known provider
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown provider `{0}` (expected openai, anthropic, google or openrouter)")]
pub struct UnknownProvider(pub String);

impl FromStr for ProviderTag {
    type Err = UnknownProvider;

    /// Accepts tag names as well as the `gemini` alias, case-insensitively
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(Self::OpenAi),
            "anthropic" => Ok(Self::Anthropic),
            "google" | "gemini" => Ok(Self::Google),
            "openrouter" => Ok(Self::OpenRouter),
            _ => Err(UnknownProvider(s.to_string())),
        }
    }
}

/// An authenticated client bound to one provider and one model.
///
/// Implementations never expose the API key; `request` applies it to
/// outgoing requests instead.
pub trait ModelClient: fmt::Debug + Send + Sync {
    fn provider(&self) -> ProviderTag;

    /// Model identifier (e.g. "gpt-4o", "claude-3-5-sonnet-latest")
    fn model(&self) -> &str;

    /// Endpoint root requests are resolved against
    fn base_url(&self) -> &Url;

    /// Path of the provider's generation endpoint, relative to `base_url`
    fn chat_path(&self) -> String;

    /// Start a request against `path` with provider auth headers applied.
    /// No I/O happens until the caller sends it.
    fn request(&self, method: Method, path: &str) -> RequestBuilder;
}
