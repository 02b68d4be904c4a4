use anyhow::{Context, Result};
use llmroute_core::{EnvSource, ProviderTag, Settings};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Allowlist of environment variables that may be expanded in config files.
/// Keeps a modified config from reading arbitrary env vars.
const ALLOWED_ENV_VARS: &[&str] = &[
    "OPENAI_API_KEY",
    "OPENAI_BASE_URL",
    "ANTHROPIC_API_KEY",
    "ANTHROPIC_BASE_URL",
    "GOOGLE_API_KEY",
    "GEMINI_API_KEY",
    "GOOGLE_BASE_URL",
    "OPENROUTER_API_KEY",
    "HOME",
    "USER",
];

/// Non-secret settings that may be overridden from the environment
const MODEL_NAME_OVERRIDES: &[(ProviderTag, &str)] = &[
    (ProviderTag::OpenAi, "OPENAI_MODEL_NAME"),
    (ProviderTag::Anthropic, "ANTHROPIC_MODEL_NAME"),
    (ProviderTag::Google, "GEMINI_MODEL_NAME"),
    (ProviderTag::OpenRouter, "OPENROUTER_MODEL_NAME"),
];

pub const DEFAULT_CONFIG: &str = r#"# llmroute configuration
#
# Identifiers: "openai:<model>", "anthropic:<model>", "gemini:<model>",
# "openrouter:<model>" or "fallback". API keys left unset here are read from
# OPENAI_API_KEY, ANTHROPIC_API_KEY, GOOGLE_API_KEY / GEMINI_API_KEY and
# OPENROUTER_API_KEY.

[ai]
model = "openai:gpt-4o"
strict_model_ids = false

[http]
request_timeout_secs = 30

[providers.openai]
api_key = "${OPENAI_API_KEY}"
model = "gpt-4o"

[providers.anthropic]
api_key = "${ANTHROPIC_API_KEY}"
model = "claude-3-5-sonnet-latest"

[providers.google]
model = "gemini-2.5-pro"

[providers.openrouter]
api_key = "${OPENROUTER_API_KEY}"
model = "openai/gpt-4o"
base_url = "https://openrouter.ai/api/v1"
"#;

pub fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".llmroute")
}

pub fn default_config_path() -> PathBuf {
    config_dir().join("config.toml")
}

/// Load settings from `custom_path` or the default location.
///
/// A missing default file is not an error: everything can come from the
/// environment. A missing explicit path is.
pub fn load(custom_path: &Option<PathBuf>, env: &dyn EnvSource) -> Result<Settings> {
    let mut settings = match custom_path {
        Some(path) => load_file(path, env)?,
        None => {
            let path = default_config_path();
            if path.exists() {
                load_file(&path, env)?
            } else {
                debug!("No config at {}, using defaults", path.display());
                Settings::default()
            }
        }
    };

    apply_env_overrides(&mut settings, env)?;
    Ok(settings)
}

fn load_file(path: &Path, env: &dyn EnvSource) -> Result<Settings> {
    // Config may hold API keys: refuse group/other-readable files
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if let Ok(metadata) = std::fs::metadata(path) {
            let mode = metadata.permissions().mode();
            if mode & 0o077 != 0 {
                return Err(anyhow::anyhow!(
                    "Config file {:?} has overly permissive permissions ({:o}). \
                     It may contain secrets. Fix with: chmod 600 {:?}",
                    path,
                    mode & 0o777,
                    path
                ));
            }
        }
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config at {}", path.display()))?;

    parse(&content, env).with_context(|| format!("Failed to parse config at {}", path.display()))
}

/// Expand allowlisted `${VAR}` references, then parse TOML
pub fn parse(content: &str, env: &dyn EnvSource) -> Result<Settings> {
    let expanded = expand_env_vars(content, env);
    let settings: Settings = toml::from_str(&expanded)?;

    for provider in hardcoded_keys(content) {
        warn!(
            "{} API key is hardcoded in config file. For security, use environment variables: api_key = \"${{{}}}\"",
            provider,
            provider.api_key_env_vars()[0]
        );
    }

    Ok(settings)
}

/// Providers whose API key the raw (unexpanded) file sets literally
fn hardcoded_keys(content: &str) -> Vec<ProviderTag> {
    let Ok(raw) = toml::from_str::<Settings>(content) else {
        return Vec::new();
    };
    ProviderTag::PRIORITY
        .into_iter()
        .filter(|&provider| {
            raw.providers
                .get(provider)
                .api_key
                .as_deref()
                .is_some_and(|key| !key.is_empty() && !key.contains("${"))
        })
        .collect()
}

fn apply_env_overrides(settings: &mut Settings, env: &dyn EnvSource) -> Result<()> {
    if let Some(model) = non_empty(env.var("AI_MODEL")) {
        debug!("AI_MODEL overrides ai.model");
        settings.ai.model = model;
    }

    if let Some(strict) = non_empty(env.var("AI_STRICT_MODEL_IDS")) {
        settings.ai.strict_model_ids = parse_bool(&strict)
            .with_context(|| format!("Invalid AI_STRICT_MODEL_IDS value '{}'", strict))?;
    }

    for &(provider, var) in MODEL_NAME_OVERRIDES {
        if let Some(model) = non_empty(env.var(var)) {
            debug!("{} overrides providers.{}.model", var, provider);
            settings.providers.get_mut(provider).model = Some(model);
        }
    }

    Ok(())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_bool(value: &str) -> Result<bool> {
    match value.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(anyhow::anyhow!("expected true or false")),
    }
}

fn expand_env_vars(s: &str, env: &dyn EnvSource) -> String {
    let mut result = s.to_string();
    let mut pos = 0;
    while pos < result.len() {
        let Some(start) = result[pos..].find("${") else {
            break;
        };
        let abs_start = pos + start;
        let Some(end) = result[abs_start..].find('}') else {
            break;
        };
        let var_name = result[abs_start + 2..abs_start + end].to_string();

        if !ALLOWED_ENV_VARS.contains(&var_name.as_str()) {
            warn!(
                "Skipping expansion of unrecognized env var '{}' in config (not in allowlist)",
                var_name
            );
            // Leave the ${VAR} unexpanded so it's obvious
            pos = abs_start + end + 1;
            continue;
        }

        let value = env.var(&var_name).unwrap_or_default();
        let value_len = value.len();
        result = format!(
            "{}{}{}",
            &result[..abs_start],
            value,
            &result[abs_start + end + 1..]
        );
        pos = abs_start + value_len;
    }
    result
}
