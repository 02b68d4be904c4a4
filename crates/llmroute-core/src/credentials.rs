//! Credential lookup: configured value first, then environment variables

use std::collections::HashMap;

use crate::providers::ProviderTag;
use crate::settings::Settings;

/// Read-only view of environment variables
pub trait EnvSource: Send + Sync {
    fn var(&self, name: &str) -> Option<String>;
}

/// The real process environment
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

impl EnvSource for HashMap<String, String> {
    fn var(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialField {
    ApiKey,
    BaseUrl,
}

/// Where a resolved value came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialSource {
    Config,
    Env(&'static str),
}

impl std::fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config => write!(f, "config"),
            Self::Env(var) => write!(f, "env {}", var),
        }
    }
}

/// Resolves API keys and base URL overrides for a provider
#[derive(Clone, Copy)]
pub struct CredentialResolver<'a> {
    settings: &'a Settings,
    env: &'a dyn EnvSource,
}

impl<'a> CredentialResolver<'a> {
    pub fn new(settings: &'a Settings, env: &'a dyn EnvSource) -> Self {
        Self { settings, env }
    }

    /// First non-blank value for `field`, trimmed. `None` means "not configured".
    pub fn resolve(&self, provider: ProviderTag, field: CredentialField) -> Option<String> {
        self.resolve_with_source(provider, field)
            .map(|(value, _)| value)
    }

    /// Like [`resolve`](Self::resolve), also reporting which source won
    pub fn resolve_with_source(
        &self,
        provider: ProviderTag,
        field: CredentialField,
    ) -> Option<(String, CredentialSource)> {
        let configured = self.settings.providers.get(provider);
        let (configured, env_vars) = match field {
            CredentialField::ApiKey => (&configured.api_key, provider.api_key_env_vars()),
            CredentialField::BaseUrl => (&configured.base_url, provider.base_url_env_vars()),
        };

        if let Some(value) = non_blank(configured.as_deref()) {
            return Some((value, CredentialSource::Config));
        }

        env_vars.iter().find_map(|&var| {
            non_blank(self.env.var(var).as_deref())
                .map(|value| (value, CredentialSource::Env(var)))
        })
    }

    pub fn api_key(&self, provider: ProviderTag) -> Option<String> {
        self.resolve(provider, CredentialField::ApiKey)
    }

    pub fn base_url(&self, provider: ProviderTag) -> Option<String> {
        self.resolve(provider, CredentialField::BaseUrl)
    }

    pub fn has_api_key(&self, provider: ProviderTag) -> bool {
        self.api_key(provider).is_some()
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
