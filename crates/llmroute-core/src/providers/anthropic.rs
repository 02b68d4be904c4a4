//! Anthropic Claude provider

use reqwest::{Method, RequestBuilder};
use std::time::Duration;
use tracing::info;
use url::Url;

use crate::error::ClientBuildError;

use super::transport::{AuthScheme, HttpTransport, same_url};
use super::types::{ModelClient, ProviderTag};

const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Anthropic Messages API client
pub struct AnthropicClient {
    transport: HttpTransport,
    model: String,
}

impl std::fmt::Debug for AnthropicClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnthropicClient")
            .field("base_url", &self.transport.base_url().as_str())
            .field("model", &self.model)
            .finish()
    }
}

impl AnthropicClient {
    pub fn new(
        api_key: String,
        model: String,
        base_url: Option<&str>,
        timeout: Duration,
    ) -> Result<Self, ClientBuildError> {
        let default = ProviderTag::Anthropic.default_base_url();
        let base_url = base_url.unwrap_or(default);
        if !same_url(base_url, default) {
            info!("Using custom Anthropic base URL: {}", base_url);
        }

        Ok(Self {
            transport: HttpTransport::new(
                &api_key,
                AuthScheme::Header("x-api-key"),
                base_url,
                timeout,
            )?,
            model,
        })
    }
}

impl ModelClient for AnthropicClient {
    fn provider(&self) -> ProviderTag {
        ProviderTag::Anthropic
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn base_url(&self) -> &Url {
        self.transport.base_url()
    }

    fn chat_path(&self) -> String {
        "v1/messages".to_string()
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.transport
            .request(method, path)
            .header("anthropic-version", ANTHROPIC_VERSION)
    }
}
