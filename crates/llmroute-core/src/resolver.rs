//! Entry point: identifier in, model handle out

use tracing::{debug, error, warn};

use crate::credentials::{CredentialResolver, EnvSource, ProcessEnv};
use crate::error::{ResolveError, Result};
use crate::factory::ProviderClientFactory;
use crate::fallback::{FallbackChainBuilder, FallbackModel};
use crate::handle::ModelHandle;
use crate::identifier::ModelIdentifier;
use crate::providers::ProviderTag;
use crate::settings::Settings;

/// Provider used for identifiers with no known prefix
pub const DEFAULT_PROVIDER: ProviderTag = ProviderTag::OpenAi;

/// Resolves model identifiers against borrowed settings and environment.
///
/// Nothing is cached: each call re-reads credentials and builds fresh clients,
/// so rotated keys take effect on the next call.
#[derive(Clone, Copy)]
pub struct ModelResolver<'a> {
    settings: &'a Settings,
    env: &'a dyn EnvSource,
}

impl<'a> ModelResolver<'a> {
    /// Resolver reading the process environment
    pub fn new(settings: &'a Settings) -> Self {
        Self::with_env(settings, &ProcessEnv)
    }

    pub fn with_env(settings: &'a Settings, env: &'a dyn EnvSource) -> Self {
        Self { settings, env }
    }

    pub fn credentials(&self) -> CredentialResolver<'a> {
        CredentialResolver::new(self.settings, self.env)
    }

    pub fn factory(&self, provider: ProviderTag) -> ProviderClientFactory<'a> {
        ProviderClientFactory::new(provider, self.settings, self.credentials())
    }

    pub fn fallback_builder(&self) -> FallbackChainBuilder<'a> {
        FallbackChainBuilder::new(self.settings, self.credentials())
    }

    /// Resolve `identifier`, or `settings.ai.model` when `None`
    pub fn resolve(&self, identifier: Option<&str>) -> Result<ModelHandle> {
        let raw = identifier.unwrap_or(self.settings.ai.model.as_str());

        match ModelIdentifier::parse(raw) {
            ModelIdentifier::Provider {
                provider,
                model_name,
            } => {
                let configured = self.settings.model_name(provider);
                if model_name != configured {
                    debug!(
                        "Identifier {} names model '{}'; using configured {} model '{}'",
                        raw, model_name, provider, configured
                    );
                }
                self.factory(provider).build()
            }
            ModelIdentifier::Fallback => {
                let chain = self.fallback_builder().build()?;
                Ok(ModelHandle::Fallback(FallbackModel::new(chain)))
            }
            ModelIdentifier::Unrecognized(raw) => {
                if self.settings.ai.strict_model_ids {
                    error!(model = %raw, "Rejecting unknown model name '{}'", raw);
                    return Err(ResolveError::Configuration {
                        message: format!(
                            "Unknown model name '{}' (expected <provider>:<model> or fallback)",
                            raw
                        ),
                        config_key: "ai.model".to_string(),
                        provider: None,
                        model: Some(raw),
                    });
                }
                warn!(
                    "Unknown model name '{}', defaulting to {}",
                    raw, DEFAULT_PROVIDER
                );
                self.factory(DEFAULT_PROVIDER).build()
            }
        }
    }
}

/// Resolve against the process environment.
///
/// `model_name` overrides `settings.ai.model`.
pub fn get_llm_model(settings: &Settings, model_name: Option<&str>) -> Result<ModelHandle> {
    ModelResolver::new(settings).resolve(model_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log_capture::capture_logs;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn all_keys() -> HashMap<String, String> {
        env(&[
            ("OPENAI_API_KEY", "openai-key"),
            ("ANTHROPIC_API_KEY", "anthropic-key"),
            ("GOOGLE_API_KEY", "google-key"),
            ("OPENROUTER_API_KEY", "openrouter-key"),
        ])
    }

    #[test]
    fn test_resolve_each_provider() {
        let settings = Settings::default();
        let env = all_keys();
        let resolver = ModelResolver::with_env(&settings, &env);

        let cases = [
            ("openai:gpt-4", ProviderTag::OpenAi, "gpt-4o"),
            (
                "anthropic:claude-3-5-sonnet",
                ProviderTag::Anthropic,
                "claude-3-5-sonnet-latest",
            ),
            ("gemini:gemini-1.5-pro", ProviderTag::Google, "gemini-2.5-pro"),
            ("openrouter:openai/gpt-4o", ProviderTag::OpenRouter, "openai/gpt-4o"),
        ];
        for (id, provider, model) in cases {
            let handle = resolver.resolve(Some(id)).unwrap();
            assert!(!handle.is_fallback());
            assert_eq!(handle.provider(), provider, "{}", id);
            assert_eq!(handle.model_name(), model, "{}", id);
        }
    }

    #[test]
    fn test_google_via_gemini_api_key() {
        let settings = Settings::default();
        let env = env(&[("GEMINI_API_KEY", "g")]);
        let handle = ModelResolver::with_env(&settings, &env)
            .resolve(Some("gemini:gemini-pro"))
            .unwrap();
        assert_eq!(handle.provider(), ProviderTag::Google);
    }

    #[test]
    fn test_missing_credentials_fail_with_resolve_error() {
        let settings = Settings::default();
        let env: HashMap<String, String> = HashMap::new();
        let resolver = ModelResolver::with_env(&settings, &env);
        for id in [
            "openai:gpt-4",
            "anthropic:claude-3",
            "gemini:gemini-pro",
            "openrouter:openai/gpt-4o",
        ] {
            let err = resolver.resolve(Some(id)).unwrap_err();
            assert!(
                err.is_configuration() || err.is_provider_init(),
                "{}: {:?}",
                id,
                err
            );
        }
    }

    #[test]
    fn test_default_identifier_comes_from_settings() {
        let mut settings = Settings::default();
        settings.ai.model = "anthropic:claude".to_string();
        let env = all_keys();
        let handle = ModelResolver::with_env(&settings, &env)
            .resolve(None)
            .unwrap();
        assert_eq!(handle.provider(), ProviderTag::Anthropic);
    }

    #[test]
    fn test_unknown_identifier_defaults_to_openai() {
        let settings = Settings::default();
        let env = all_keys();
        let resolver = ModelResolver::with_env(&settings, &env);
        for id in ["bogus", "invalid-format", "unsupported:model"] {
            let handle = resolver.resolve(Some(id)).unwrap();
            assert_eq!(handle.provider(), ProviderTag::OpenAi, "{}", id);
            assert_eq!(handle.model_name(), "gpt-4o");
        }
    }

    #[test]
    fn test_unknown_identifier_without_openai_key_is_configuration_error() {
        let settings = Settings::default();
        let env = env(&[("ANTHROPIC_API_KEY", "a")]);
        let err = ModelResolver::with_env(&settings, &env)
            .resolve(Some("bogus"))
            .unwrap_err();
        assert!(err.is_configuration());
        assert_eq!(err.provider(), Some(ProviderTag::OpenAi));
    }

    #[test]
    fn test_unknown_identifier_fallthrough_is_logged() {
        let settings = Settings::default();
        let env = all_keys();
        let (handle, logs) =
            capture_logs(|| ModelResolver::with_env(&settings, &env).resolve(Some("bogus")));
        assert_eq!(handle.unwrap().provider(), ProviderTag::OpenAi);
        assert!(logs.contains("WARN"), "{}", logs);
        assert!(
            logs.contains("Unknown model name 'bogus', defaulting to openai"),
            "{}",
            logs
        );
    }

    #[test]
    fn test_keys_never_logged() {
        let settings = Settings::default();
        let mut env = all_keys();
        env.insert("OPENAI_BASE_URL".to_string(), "http://localhost:4000/v1".to_string());
        env.insert("GOOGLE_BASE_URL".to_string(), "https://proxy.example.com".to_string());
        let resolver = ModelResolver::with_env(&settings, &env);

        let ((), logs) = capture_logs(|| {
            for id in [
                "openai:gpt-4o",
                "anthropic:claude",
                "gemini:gemini-2.5-pro",
                "openrouter:openai/gpt-4o",
                "fallback",
                "bogus",
            ] {
                assert!(resolver.resolve(Some(id)).is_ok(), "{}", id);
            }
        });
        assert!(logs.contains("Using custom OpenAI base URL"), "{}", logs);
        assert!(logs.contains("ignoring https://proxy.example.com"), "{}", logs);
        for key in ["openai-key", "anthropic-key", "google-key", "openrouter-key"] {
            assert!(!logs.contains(key), "{} leaked:\n{}", key, logs);
        }
    }

    #[test]
    fn test_strict_mode_rejects_unknown_identifier() {
        let mut settings = Settings::default();
        settings.ai.strict_model_ids = true;
        let env = all_keys();
        let err = ModelResolver::with_env(&settings, &env)
            .resolve(Some("bogus"))
            .unwrap_err();
        match err {
            ResolveError::Configuration {
                config_key, model, ..
            } => {
                assert_eq!(config_key, "ai.model");
                assert_eq!(model.as_deref(), Some("bogus"));
            }
            other => panic!("expected configuration error, got {:?}", other),
        }
    }

    #[test]
    fn test_fallback_with_all_providers() {
        let settings = Settings::default();
        let env = all_keys();
        let handle = ModelResolver::with_env(&settings, &env)
            .resolve(Some("fallback"))
            .unwrap();
        let model = handle.fallback().expect("fallback handle");
        assert_eq!(
            model.chain().model_strings(),
            vec![
                "openai:gpt-4o",
                "anthropic:claude-3-5-sonnet-latest",
                "google-gla:gemini-2.5-pro",
                "openrouter:openai/gpt-4o",
            ]
        );
    }

    #[test]
    fn test_fallback_with_one_provider() {
        let settings = Settings::default();
        let env = env(&[("ANTHROPIC_API_KEY", "a")]);
        let handle = ModelResolver::with_env(&settings, &env)
            .resolve(Some("fallback"))
            .unwrap();
        assert_eq!(handle.binding(), "fallback(anthropic:claude-3-5-sonnet-latest)");
    }

    #[test]
    fn test_fallback_without_providers_is_configuration_error() {
        let settings = Settings::default();
        let env: HashMap<String, String> = HashMap::new();
        let err = ModelResolver::with_env(&settings, &env)
            .resolve(Some("fallback"))
            .unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let settings = Settings::default();
        let env = all_keys();
        let resolver = ModelResolver::with_env(&settings, &env);
        for id in ["openai:gpt-4o", "gemini:x", "fallback", "bogus"] {
            let first = resolver.resolve(Some(id)).unwrap();
            let second = resolver.resolve(Some(id)).unwrap();
            assert_eq!(first.binding(), second.binding(), "{}", id);
        }
    }

    #[test]
    fn test_credential_rotation_picked_up_on_next_call() {
        let settings = Settings::default();
        let before = env(&[("ANTHROPIC_API_KEY", "a")]);
        let after = all_keys();

        let handle = ModelResolver::with_env(&settings, &before)
            .resolve(Some("fallback"))
            .unwrap();
        assert_eq!(handle.fallback().unwrap().chain().len(), 1);

        let handle = ModelResolver::with_env(&settings, &after)
            .resolve(Some("fallback"))
            .unwrap();
        assert_eq!(handle.fallback().unwrap().chain().len(), 4);
    }

    #[test]
    fn test_base_url_override_honored_except_google() {
        let settings = Settings::default();
        let mut env = all_keys();
        for (var, url) in [
            ("OPENAI_BASE_URL", "http://localhost:11434/v1"),
            ("ANTHROPIC_BASE_URL", "http://localhost:9000"),
            ("GOOGLE_BASE_URL", "http://localhost:9001"),
        ] {
            env.insert(var.to_string(), url.to_string());
        }
        let resolver = ModelResolver::with_env(&settings, &env);

        let base = |id: &str| {
            resolver
                .resolve(Some(id))
                .unwrap()
                .client()
                .unwrap()
                .base_url()
                .to_string()
        };
        assert_eq!(base("openai:x"), "http://localhost:11434/v1");
        assert_eq!(base("anthropic:x"), "http://localhost:9000/");
        assert_eq!(
            base("gemini:x"),
            "https://generativelanguage.googleapis.com/v1beta"
        );
    }

    #[test]
    fn test_concurrent_resolution() {
        let settings = Settings::default();
        let env = all_keys();
        let resolver = ModelResolver::with_env(&settings, &env);

        let bindings: Vec<String> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|_| s.spawn(|| resolver.resolve(Some("fallback")).unwrap().binding()))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        assert!(bindings.windows(2).all(|w| w[0] == w[1]));
    }
}
