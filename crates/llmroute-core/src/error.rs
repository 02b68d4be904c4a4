//! Errors surfaced while resolving a model handle

use thiserror::Error;

use crate::providers::ProviderTag;

/// Failure to turn an identifier into a usable handle.
///
/// Neither variant is retried: both describe the local configuration, not a
/// transient network condition.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// A required credential is absent, no provider is usable for the
    /// fallback chain, or an identifier was rejected.
    #[error("{message} (config key `{config_key}`)")]
    Configuration {
        message: String,
        config_key: String,
        provider: Option<ProviderTag>,
        model: Option<String>,
    },

    /// Assembling the client failed for an otherwise-credentialed provider
    #[error("failed to initialize {provider} model `{model}`")]
    ProviderInit {
        provider: ProviderTag,
        model: String,
        #[source]
        source: ClientBuildError,
    },
}

impl ResolveError {
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration { .. })
    }

    pub fn is_provider_init(&self) -> bool {
        matches!(self, Self::ProviderInit { .. })
    }

    /// Provider the failure relates to, if any
    pub fn provider(&self) -> Option<ProviderTag> {
        match self {
            Self::Configuration { provider, .. } => *provider,
            Self::ProviderInit { provider, .. } => Some(*provider),
        }
    }
}

/// Lower-level cause of a [`ResolveError::ProviderInit`]
#[derive(Debug, Error)]
pub enum ClientBuildError {
    #[error("invalid base URL `{url}`")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("base URL `{0}` must use http or https")]
    UnsupportedScheme(String),

    #[error("base URL `{0}` must not carry a query string or fragment")]
    UnusableBaseUrl(String),

    /// The key holds bytes an HTTP header cannot carry. The key itself is
    /// never part of the message.
    #[error("API key is not a valid HTTP header value")]
    InvalidApiKey(#[source] reqwest::header::InvalidHeaderValue),

    #[error("failed to build HTTP client")]
    Http(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, ResolveError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_configuration_display_names_key() {
        let err = ResolveError::Configuration {
            message: "OpenAI API key not found".to_string(),
            config_key: "providers.openai.api_key".to_string(),
            provider: Some(ProviderTag::OpenAi),
            model: Some("gpt-4o".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "OpenAI API key not found (config key `providers.openai.api_key`)"
        );
        assert!(err.is_configuration());
        assert_eq!(err.provider(), Some(ProviderTag::OpenAi));
    }

    #[test]
    fn test_provider_init_keeps_typed_source() {
        let parse_err = url::Url::parse("not a url").unwrap_err();
        let err = ResolveError::ProviderInit {
            provider: ProviderTag::Anthropic,
            model: "claude".to_string(),
            source: ClientBuildError::InvalidBaseUrl {
                url: "not a url".to_string(),
                source: parse_err,
            },
        };
        assert!(err.is_provider_init());
        let source = err.source().expect("source");
        let build_err = source
            .downcast_ref::<ClientBuildError>()
            .expect("ClientBuildError source");
        assert!(matches!(build_err, ClientBuildError::InvalidBaseUrl { .. }));
        assert!(build_err.source().unwrap().is::<url::ParseError>());
    }
}
