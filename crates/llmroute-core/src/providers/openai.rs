//! OpenAI provider (GPT-4o, o3, etc.)

use reqwest::{Method, RequestBuilder};
use std::time::Duration;
use tracing::info;
use url::Url;

use crate::error::ClientBuildError;

use super::transport::{AuthScheme, HttpTransport, same_url};
use super::types::{ModelClient, ProviderTag};

/// OpenAI chat-completions client
pub struct OpenAiClient {
    transport: HttpTransport,
    model: String,
}

impl std::fmt::Debug for OpenAiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiClient")
            .field("base_url", &self.transport.base_url().as_str())
            .field("model", &self.model)
            .finish()
    }
}

impl OpenAiClient {
    /// Build a client, pointing it at `base_url` when an override is given
    pub fn new(
        api_key: String,
        model: String,
        base_url: Option<&str>,
        timeout: Duration,
    ) -> Result<Self, ClientBuildError> {
        let default = ProviderTag::OpenAi.default_base_url();
        let base_url = base_url.unwrap_or(default);
        if !same_url(base_url, default) {
            info!("Using custom OpenAI base URL: {}", base_url);
        }
        Self::with_endpoint(api_key, model, base_url, timeout)
    }

    /// Build a client for any OpenAI-compatible endpoint
    pub(crate) fn with_endpoint(
        api_key: String,
        model: String,
        base_url: &str,
        timeout: Duration,
    ) -> Result<Self, ClientBuildError> {
        Ok(Self {
            transport: HttpTransport::new(&api_key, AuthScheme::Bearer, base_url, timeout)?,
            model,
        })
    }
}

impl ModelClient for OpenAiClient {
    fn provider(&self) -> ProviderTag {
        ProviderTag::OpenAi
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn base_url(&self) -> &Url {
        self.transport.base_url()
    }

    fn chat_path(&self) -> String {
        "chat/completions".to_string()
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.transport.request(method, path)
    }
}
