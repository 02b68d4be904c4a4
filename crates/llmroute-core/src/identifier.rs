//! Parsing of `"<provider>:<model>"` identifiers

use std::fmt;

use crate::providers::ProviderTag;

/// The sentinel that requests a failover chain across all configured providers
pub const FALLBACK: &str = "fallback";

/// A parsed model identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelIdentifier {
    Provider {
        provider: ProviderTag,
        model_name: String,
    },
    Fallback,
    /// Input with no known provider prefix. Parsing never fails; the resolver
    /// decides what to do with these.
    Unrecognized(String),
}

impl ModelIdentifier {
    /// Split on the first `:` and match the prefix case-sensitively.
    /// `gemini` selects [`ProviderTag::Google`].
    pub fn parse(raw: &str) -> Self {
        if raw == FALLBACK {
            return Self::Fallback;
        }

        match raw.split_once(':') {
            Some((prefix, model_name)) => match ProviderTag::from_identifier_prefix(prefix) {
                Some(provider) => Self::Provider {
                    provider,
                    model_name: model_name.to_string(),
                },
                None => Self::Unrecognized(raw.to_string()),
            },
            None => Self::Unrecognized(raw.to_string()),
        }
    }

    pub fn provider(&self) -> Option<ProviderTag> {
        match self {
            Self::Provider { provider, .. } => Some(*provider),
            _ => None,
        }
    }
}

impl fmt::Display for ModelIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Provider {
                provider,
                model_name,
            } => write!(f, "{}:{}", provider.identifier_prefix(), model_name),
            Self::Fallback => f.write_str(FALLBACK),
            Self::Unrecognized(raw) => f.write_str(raw),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_openai() {
        assert_eq!(
            ModelIdentifier::parse("openai:gpt-4"),
            ModelIdentifier::Provider {
                provider: ProviderTag::OpenAi,
                model_name: "gpt-4".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_gemini_prefix_maps_to_google() {
        let id = ModelIdentifier::parse("gemini:gemini-1.5-pro");
        assert_eq!(id.provider(), Some(ProviderTag::Google));
        assert_eq!(id.to_string(), "gemini:gemini-1.5-pro");
    }

    #[test]
    fn test_parse_splits_on_first_colon() {
        assert_eq!(
            ModelIdentifier::parse("openrouter:meta-llama/llama-3:free"),
            ModelIdentifier::Provider {
                provider: ProviderTag::OpenRouter,
                model_name: "meta-llama/llama-3:free".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_fallback() {
        assert_eq!(ModelIdentifier::parse("fallback"), ModelIdentifier::Fallback);
        assert_eq!(ModelIdentifier::Fallback.to_string(), "fallback");
    }

    #[test]
    fn test_parse_unrecognized_is_not_an_error() {
        for raw in [
            "bogus",
            "invalid-format",
            "unsupported:model",
            "google:gemini-pro",
            "OpenAI:gpt-4o",
            "Fallback",
            "fallback:x",
            "",
        ] {
            assert_eq!(
                ModelIdentifier::parse(raw),
                ModelIdentifier::Unrecognized(raw.to_string()),
                "input {:?}",
                raw
            );
        }
    }

    #[test]
    fn test_empty_model_name_still_selects_provider() {
        assert_eq!(
            ModelIdentifier::parse("anthropic:").provider(),
            Some(ProviderTag::Anthropic)
        );
    }
}
