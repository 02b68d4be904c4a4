//! HTTP transport shared by all provider clients

use reqwest::header::{AUTHORIZATION, HeaderName, HeaderValue};
use reqwest::{Client, Method, RequestBuilder};
use std::time::Duration;
use url::Url;

use crate::error::ClientBuildError;

/// How a provider expects the API key to be presented
#[derive(Debug, Clone, Copy)]
pub(crate) enum AuthScheme {
    /// `Authorization: Bearer <key>`
    Bearer,
    /// The raw key in the named header
    Header(&'static str),
}

impl AuthScheme {
    /// Encode `api_key` as a sensitive header, rejecting bytes HTTP cannot carry
    fn header(self, api_key: &str) -> Result<(HeaderName, HeaderValue), ClientBuildError> {
        let (name, raw) = match self {
            Self::Bearer => (AUTHORIZATION, format!("Bearer {}", api_key)),
            Self::Header(name) => (HeaderName::from_static(name), api_key.to_string()),
        };
        let mut value = HeaderValue::from_str(&raw).map_err(ClientBuildError::InvalidApiKey)?;
        value.set_sensitive(true);
        Ok((name, value))
    }
}

/// A configured `reqwest::Client` plus the endpoint root and credential it talks to
pub(crate) struct HttpTransport {
    client: Client,
    auth: (HeaderName, HeaderValue),
    base_url: Url,
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("base_url", &self.base_url.as_str())
            .finish()
    }
}

impl HttpTransport {
    pub(crate) fn new(
        api_key: &str,
        scheme: AuthScheme,
        base_url: &str,
        timeout: Duration,
    ) -> Result<Self, ClientBuildError> {
        let base_url = parse_base_url(base_url)?;
        let auth = scheme.header(api_key)?;
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            auth,
            base_url,
        })
    }

    pub(crate) fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `path` appended to the base URL, keeping any path prefix the base carries
    pub(crate) fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Request against `path` with the credential header already attached
    pub(crate) fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let (name, value) = &self.auth;
        self.client
            .request(method, self.url(path))
            .header(name.clone(), value.clone())
    }
}

/// Whether two base URLs name the same root, ignoring a trailing slash
pub(crate) fn same_url(a: &str, b: &str) -> bool {
    a.trim_end_matches('/') == b.trim_end_matches('/')
}

pub(crate) fn parse_base_url(raw: &str) -> Result<Url, ClientBuildError> {
    let url = Url::parse(raw).map_err(|source| ClientBuildError::InvalidBaseUrl {
        url: raw.to_string(),
        source,
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ClientBuildError::UnsupportedScheme(raw.to_string()));
    }
    // Endpoint paths are appended to the base, so it must end in its path
    if url.query().is_some() || url.fragment().is_some() || url.cannot_be_a_base() {
        return Err(ClientBuildError::UnusableBaseUrl(raw.to_string()));
    }
    Ok(url)
}
