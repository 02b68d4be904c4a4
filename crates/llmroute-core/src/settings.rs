//! Typed settings consumed by the resolver.
//!
//! Loading (files, env expansion) belongs to the caller; the resolver only
//! borrows an already-built [`Settings`].

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::providers::ProviderTag;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub ai: AiSettings,
    #[serde(default)]
    pub http: HttpSettings,
    #[serde(default)]
    pub providers: ProvidersSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiSettings {
    /// Identifier resolved when the caller passes none
    #[serde(default = "default_ai_model")]
    pub model: String,
    /// Reject unrecognized identifiers instead of defaulting to OpenAI
    #[serde(default)]
    pub strict_model_ids: bool,
}

fn default_ai_model() -> String {
    "openai:gpt-4o".to_string()
}

impl Default for AiSettings {
    fn default() -> Self {
        Self {
            model: default_ai_model(),
            strict_model_ids: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpSettings {
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl HttpSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProvidersSettings {
    #[serde(default)]
    pub openai: ProviderSettings,
    #[serde(default)]
    pub anthropic: ProviderSettings,
    #[serde(default)]
    pub google: ProviderSettings,
    #[serde(default)]
    pub openrouter: ProviderSettings,
}

impl ProvidersSettings {
    pub fn get(&self, tag: ProviderTag) -> &ProviderSettings {
        match tag {
            ProviderTag::OpenAi => &self.openai,
            ProviderTag::Anthropic => &self.anthropic,
            ProviderTag::Google => &self.google,
            ProviderTag::OpenRouter => &self.openrouter,
        }
    }

    pub fn get_mut(&mut self, tag: ProviderTag) -> &mut ProviderSettings {
        match tag {
            ProviderTag::OpenAi => &mut self.openai,
            ProviderTag::Anthropic => &mut self.anthropic,
            ProviderTag::Google => &mut self.google,
            ProviderTag::OpenRouter => &mut self.openrouter,
        }
    }
}

/// Per-provider configuration. Unset fields fall back to the provider's
/// built-in defaults (see [`ProviderTag::default_model`]).
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct ProviderSettings {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub base_url: Option<String>,
}

impl std::fmt::Debug for ProviderSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderSettings")
            .field(
                "api_key",
                &self.api_key.as_deref().map(mask_secret),
            )
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl Settings {
    /// Model name configured for `tag`, or the provider default
    pub fn model_name(&self, tag: ProviderTag) -> &str {
        self.providers
            .get(tag)
            .model
            .as_deref()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| tag.default_model())
    }
}

/// Mask a secret for Debug output and logs.
/// Shows the first 3 and last 4 chars of keys longer than 7 chars, otherwise "***".
pub fn mask_secret(s: &str) -> String {
    if s.is_empty() {
        return "(empty)".to_string();
    }
    let chars: Vec<char> = s.chars().collect();
    if chars.len() > 7 {
        let prefix: String = chars[..3].iter().collect();
        let suffix: String = chars[chars.len() - 4..].iter().collect();
        format!("{}...{}", prefix, suffix)
    } else {
        "***".to_string()
    }
}
