//! Fallback chains: ordered failover across every credentialed provider

use std::fmt;
use tracing::{debug, error, info, warn};

use crate::credentials::CredentialResolver;
use crate::error::{ResolveError, Result};
use crate::identifier::FALLBACK;
use crate::providers::ProviderTag;
use crate::settings::Settings;

/// One `"<wire-tag>:<model>"` entry of a fallback chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainEntry {
    pub provider: ProviderTag,
    pub model_name: String,
}

impl ChainEntry {
    pub fn new(provider: ProviderTag, model_name: impl Into<String>) -> Self {
        Self {
            provider,
            model_name: model_name.into(),
        }
    }
}

impl fmt::Display for ChainEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.provider.wire_tag(), self.model_name)
    }
}

/// Non-empty, ordered list of models. Index 0 is the primary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackChain {
    entries: Vec<ChainEntry>,
}

impl FallbackChain {
    /// `None` when `entries` is empty
    pub fn new(entries: Vec<ChainEntry>) -> Option<Self> {
        if entries.is_empty() {
            None
        } else {
            Some(Self { entries })
        }
    }

    pub fn entries(&self) -> &[ChainEntry] {
        &self.entries
    }

    pub fn primary(&self) -> &ChainEntry {
        &self.entries[0]
    }

    /// Entries tried after the primary, in order
    pub fn alternates(&self) -> &[ChainEntry] {
        &self.entries[1..]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries rendered as `"<wire-tag>:<model>"`, primary first
    pub fn model_strings(&self) -> Vec<String> {
        self.entries.iter().map(ToString::to_string).collect()
    }
}

impl fmt::Display for FallbackChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.model_strings().join(" -> "))
    }
}

/// Builds a [`FallbackChain`] from every provider with a usable API key
pub struct FallbackChainBuilder<'a> {
    settings: &'a Settings,
    credentials: CredentialResolver<'a>,
}

impl<'a> FallbackChainBuilder<'a> {
    pub fn new(settings: &'a Settings, credentials: CredentialResolver<'a>) -> Self {
        Self {
            settings,
            credentials,
        }
    }

    /// Walk providers in [`ProviderTag::PRIORITY`] order. Fails when none has a key.
    pub fn build(&self) -> Result<FallbackChain> {
        let entries: Vec<ChainEntry> = ProviderTag::PRIORITY
            .into_iter()
            .filter(|&provider| {
                let usable = self.credentials.has_api_key(provider);
                if !usable {
                    debug!("Skipping {} in fallback chain: no API key", provider);
                }
                usable
            })
            .map(|provider| ChainEntry::new(provider, self.settings.model_name(provider)))
            .collect();

        match FallbackChain::new(entries) {
            Some(chain) => {
                info!("Built fallback chain: {}", chain);
                Ok(chain)
            }
            None => {
                error!(
                    model = FALLBACK,
                    "No LLM providers configured for fallback model"
                );
                Err(ResolveError::Configuration {
                    message: "No LLM providers configured for fallback model".to_string(),
                    config_key: "ai.model".to_string(),
                    provider: None,
                    model: Some(FALLBACK.to_string()),
                })
            }
        }
    }
}

/// Handle for the fallback path: the chain plus the failover walk over it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackModel {
    chain: FallbackChain,
}

impl FallbackModel {
    pub fn new(chain: FallbackChain) -> Self {
        Self { chain }
    }

    pub fn chain(&self) -> &FallbackChain {
        &self.chain
    }

    pub fn primary(&self) -> &ChainEntry {
        self.chain.primary()
    }

    /// Call `attempt` for each entry in order until one succeeds.
    ///
    /// Each entry is tried once; backoff and per-entry retries belong to the caller.
    pub fn failover<T, E, F>(&self, mut attempt: F) -> std::result::Result<T, FailoverError<E>>
    where
        F: FnMut(&ChainEntry) -> std::result::Result<T, E>,
        E: fmt::Display,
    {
        let entries = self.chain.entries();
        let mut failures = Vec::with_capacity(entries.len());

        for (idx, entry) in entries.iter().enumerate() {
            debug!("Trying {} ({}/{})", entry, idx + 1, entries.len());

            match attempt(entry) {
                Ok(value) => {
                    if idx > 0 {
                        info!("Request succeeded on failover model {}", entry);
                    }
                    return Ok(value);
                }
                Err(e) => {
                    warn!("Model {} failed: {}", entry, e);
                    if let Some(next) = entries.get(idx + 1) {
                        info!("Failing over from {} to {}", entry, next);
                    }
                    failures.push((entry.clone(), e));
                }
            }
        }

        Err(FailoverError { failures })
    }
}

/// Every entry of the chain failed; errors are kept in chain order
#[derive(Debug)]
pub struct FailoverError<E> {
    pub failures: Vec<(ChainEntry, E)>,
}

impl<E: fmt::Display> fmt::Display for FailoverError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "all {} models in the fallback chain failed", self.failures.len())?;
        if let Some((entry, err)) = self.failures.last() {
            write!(f, "; last error from {}: {}", entry, err)?;
        }
        Ok(())
    }
}

impl<E: fmt::Debug + fmt::Display> std::error::Error for FailoverError<E> {}
