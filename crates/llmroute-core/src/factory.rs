//! Builds an authenticated client for one provider

use tracing::error;

use crate::credentials::CredentialResolver;
use crate::error::{ClientBuildError, ResolveError, Result};
use crate::handle::ModelHandle;
use crate::providers::{
    AnthropicClient, GoogleClient, ModelClient, OpenAiClient, OpenRouterClient, ProviderTag,
};
use crate::settings::Settings;

/// Client factory for a single provider.
///
/// Credential lookup and error wrapping are shared; provider quirks (Google
/// ignoring overrides, OpenRouter's fixed endpoint) live in each client's
/// constructor.
pub struct ProviderClientFactory<'a> {
    provider: ProviderTag,
    settings: &'a Settings,
    credentials: CredentialResolver<'a>,
}

impl<'a> ProviderClientFactory<'a> {
    pub fn new(
        provider: ProviderTag,
        settings: &'a Settings,
        credentials: CredentialResolver<'a>,
    ) -> Self {
        Self {
            provider,
            settings,
            credentials,
        }
    }

    pub fn provider(&self) -> ProviderTag {
        self.provider
    }

    pub fn build(&self) -> Result<ModelHandle> {
        self.build_client().map(ModelHandle::Single)
    }

    /// Like [`build`](Self::build), without the handle wrapper
    pub fn build_client(&self) -> Result<Box<dyn ModelClient>> {
        let provider = self.provider;
        let model = self.settings.model_name(provider).to_string();

        let Some(api_key) = self.credentials.api_key(provider) else {
            error!(
                provider = %provider,
                model = %model,
                "Failed to initialize {} model: API key not found",
                provider
            );
            return Err(ResolveError::Configuration {
                message: format!("{} API key not found", display_name(provider)),
                config_key: format!("providers.{}.api_key", provider),
                provider: Some(provider),
                model: Some(model),
            });
        };

        let base_url = self.credentials.base_url(provider);
        let base_url = base_url.as_deref();
        let timeout = self.settings.http.request_timeout();
        let model_name = model.clone();

        let client: std::result::Result<Box<dyn ModelClient>, ClientBuildError> = match provider {
            ProviderTag::OpenAi => OpenAiClient::new(api_key, model_name, base_url, timeout)
                .map(|c| Box::new(c) as Box<dyn ModelClient>),
            ProviderTag::Anthropic => AnthropicClient::new(api_key, model_name, base_url, timeout)
                .map(|c| Box::new(c) as Box<dyn ModelClient>),
            ProviderTag::Google => GoogleClient::new(api_key, model_name, base_url, timeout)
                .map(|c| Box::new(c) as Box<dyn ModelClient>),
            ProviderTag::OpenRouter => {
                OpenRouterClient::new(api_key, model_name, base_url, timeout)
                    .map(|c| Box::new(c) as Box<dyn ModelClient>)
            }
        };

        client.map_err(|source| {
            error!(
                provider = %provider,
                model = %model,
                "Failed to initialize {} model: {}",
                provider,
                source
            );
            ResolveError::ProviderInit {
                provider,
                model,
                source,
            }
        })
    }
}

fn display_name(provider: ProviderTag) -> &'static str {
    match provider {
        ProviderTag::OpenAi => "OpenAI",
        ProviderTag::Anthropic => "Anthropic",
        ProviderTag::Google => "Google",
        ProviderTag::OpenRouter => "OpenRouter",
    }
}
