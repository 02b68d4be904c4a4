//! OpenRouter provider
//!
//! Reuses the OpenAI wire format against OpenRouter's endpoint. The endpoint
//! comes from settings only; no environment variable can redirect it.

use reqwest::{Method, RequestBuilder};
use std::time::Duration;
use tracing::info;
use url::Url;

use crate::error::ClientBuildError;

use super::openai::OpenAiClient;
use super::types::{ModelClient, ProviderTag};

/// OpenRouter client: wraps [`OpenAiClient`] under its own provider tag
pub struct OpenRouterClient {
    inner: OpenAiClient,
}

impl std::fmt::Debug for OpenRouterClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenRouterClient")
            .field("inner", &self.inner)
            .finish()
    }
}

impl OpenRouterClient {
    /// `configured_base_url` is the settings value; `None` selects the fixed default
    pub fn new(
        api_key: String,
        model: String,
        configured_base_url: Option<&str>,
        timeout: Duration,
    ) -> Result<Self, ClientBuildError> {
        let base_url =
            configured_base_url.unwrap_or_else(|| ProviderTag::OpenRouter.default_base_url());
        info!("Using OpenRouter base URL: {}", base_url);

        Ok(Self {
            inner: OpenAiClient::with_endpoint(api_key, model, base_url, timeout)?,
        })
    }
}

impl ModelClient for OpenRouterClient {
    fn provider(&self) -> ProviderTag {
        ProviderTag::OpenRouter
    }

    fn model(&self) -> &str {
        self.inner.model()
    }

    fn base_url(&self) -> &Url {
        self.inner.base_url()
    }

    fn chat_path(&self) -> String {
        self.inner.chat_path()
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.inner.request(method, path)
    }
}
