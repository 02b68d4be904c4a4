//! Google Gemini provider
//!
//! The Gemini endpoint is fixed: base URL overrides are logged and ignored.

use reqwest::{Method, RequestBuilder};
use std::time::Duration;
use tracing::warn;
use url::Url;

use crate::error::ClientBuildError;

use super::transport::{AuthScheme, HttpTransport};
use super::types::{ModelClient, ProviderTag};

/// Google Gemini client
pub struct GoogleClient {
    transport: HttpTransport,
    model: String,
}

impl std::fmt::Debug for GoogleClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleClient")
            .field("model", &self.model)
            .finish()
    }
}

impl GoogleClient {
    pub fn new(
        api_key: String,
        model: String,
        ignored_base_url: Option<&str>,
        timeout: Duration,
    ) -> Result<Self, ClientBuildError> {
        if let Some(url) = ignored_base_url {
            warn!(
                "Google/Gemini does not support a custom base URL; ignoring {}",
                url
            );
        }

        Ok(Self {
            transport: HttpTransport::new(
                &api_key,
                AuthScheme::Header("x-goog-api-key"),
                ProviderTag::Google.default_base_url(),
                timeout,
            )?,
            model,
        })
    }
}

impl ModelClient for GoogleClient {
    fn provider(&self) -> ProviderTag {
        ProviderTag::Google
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn base_url(&self) -> &Url {
        self.transport.base_url()
    }

    fn chat_path(&self) -> String {
        format!("models/{}:generateContent", self.model)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.transport.request(method, path)
    }
}
