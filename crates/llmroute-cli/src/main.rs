use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use llmroute_core::{
    CredentialField, CredentialResolver, ModelHandle, ModelResolver, ProcessEnv, ProviderTag,
    Settings,
};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod config;

#[derive(Parser)]
#[command(name = "llmroute")]
#[command(version)]
#[command(about = "Resolve LLM model identifiers into provider clients")]
struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a model identifier (defaults to ai.model)
    Resolve {
        /// e.g. "openai:gpt-4o", "gemini:gemini-2.5-pro" or "fallback"
        identifier: Option<String>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the fallback chain in failover order
    Chain {
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show which providers have credentials and where they come from
    Providers,

    /// Show the effective configuration (secrets masked)
    Config,

    /// Write a default config file
    Init,
}

/// Serializable summary of a resolved handle
#[derive(Debug, Serialize)]
struct Resolution {
    binding: String,
    provider: ProviderTag,
    model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    endpoint: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    chain: Vec<String>,
}

impl From<&ModelHandle> for Resolution {
    fn from(handle: &ModelHandle) -> Self {
        Self {
            binding: handle.binding(),
            provider: handle.provider(),
            model: handle.model_name().to_string(),
            endpoint: handle.client().map(|c| {
                format!(
                    "{}/{}",
                    c.base_url().as_str().trim_end_matches('/'),
                    c.chat_path()
                )
            }),
            chain: handle
                .fallback()
                .map(|f| f.chain().model_strings())
                .unwrap_or_default(),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins when set
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if cli.debug { "debug" } else { "info" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Init => cmd_init(),
        Commands::Config => cmd_config(&cli.config),
        Commands::Providers => cmd_providers(&cli.config),
        Commands::Chain { json } => cmd_chain(&cli.config, json),
        Commands::Resolve { identifier, json } => {
            cmd_resolve(&cli.config, identifier.as_deref(), json)
        }
    }
}

fn load_settings(path: &Option<PathBuf>) -> Result<Settings> {
    config::load(path, &ProcessEnv)
}

fn cmd_init() -> Result<()> {
    let config_dir = config::config_dir();
    std::fs::create_dir_all(&config_dir)
        .with_context(|| format!("Failed to create config dir: {}", config_dir.display()))?;

    let config_path = config::default_config_path();
    if config_path.exists() {
        warn!("Config already exists at {}", config_path.display());
        return Ok(());
    }

    std::fs::write(&config_path, config::DEFAULT_CONFIG)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&config_path, std::fs::Permissions::from_mode(0o600))?;
    }
    info!("Created default config at {}", config_path.display());

    println!("Edit {} to configure models and API keys.", config_path.display());
    Ok(())
}

fn cmd_config(path: &Option<PathBuf>) -> Result<()> {
    let settings = load_settings(path)?;
    println!("{:#?}", settings);
    Ok(())
}

fn cmd_providers(path: &Option<PathBuf>) -> Result<()> {
    let settings = load_settings(path)?;
    let credentials = CredentialResolver::new(&settings, &ProcessEnv);

    println!("{:<12} {:<28} {:<28} {}", "PROVIDER", "MODEL", "API KEY", "BASE URL");
    for provider in ProviderTag::PRIORITY {
        let key = match credentials.resolve_with_source(provider, CredentialField::ApiKey) {
            Some((_, source)) => format!("set ({})", source),
            None => "missing".to_string(),
        };
        let base_url = match (
            provider,
            credentials.resolve_with_source(provider, CredentialField::BaseUrl),
        ) {
            (ProviderTag::Google, Some((url, _))) => format!(
                "{} (ignoring {})",
                provider.default_base_url(),
                url
            ),
            (_, Some((url, source))) => format!("{} ({})", url, source),
            (_, None) => provider.default_base_url().to_string(),
        };
        println!(
            "{:<12} {:<28} {:<28} {}",
            provider,
            settings.model_name(provider),
            key,
            base_url
        );
    }
    Ok(())
}

fn cmd_chain(path: &Option<PathBuf>, json: bool) -> Result<()> {
    let settings = load_settings(path)?;
    let chain = ModelResolver::new(&settings).fallback_builder().build()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&chain.model_strings())?);
        return Ok(());
    }

    for (idx, entry) in chain.entries().iter().enumerate() {
        let role = if idx == 0 { "primary" } else { "fallback" };
        println!("{}. {} ({})", idx + 1, entry, role);
    }
    Ok(())
}

fn cmd_resolve(path: &Option<PathBuf>, identifier: Option<&str>, json: bool) -> Result<()> {
    let settings = load_settings(path)?;
    let handle = ModelResolver::new(&settings)
        .resolve(identifier)
        .with_context(|| {
            format!(
                "Failed to resolve model '{}'",
                identifier.unwrap_or(settings.ai.model.as_str())
            )
        })?;
    let resolution = Resolution::from(&handle);

    if json {
        println!("{}", serde_json::to_string_pretty(&resolution)?);
        return Ok(());
    }

    println!("{}", resolution.binding);
    if let Some(endpoint) = &resolution.endpoint {
        println!("  endpoint: {}", endpoint);
    }
    for (idx, entry) in resolution.chain.iter().enumerate() {
        println!("  {}. {}", idx + 1, entry);
    }
    Ok(())
}
