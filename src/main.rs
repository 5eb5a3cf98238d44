//! cdngate - Authenticated Object Upload Gateway
//!
//! Runs the upload gateway in front of an object bucket, or the local
//! emulator used during development.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cdngate::api::{shutdown_signal, Emulator, Gateway, GatewayServer};
use cdngate::auth::digest_hex;
use cdngate::config::Config;
use cdngate::error::{Error, Result};

/// cdngate - Authenticated Object Upload Gateway
#[derive(Parser)]
#[command(name = "cdngate")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "cdngate.toml")]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the authenticated upload gateway
    Serve,

    /// Run the local emulator (static reads + unauthenticated writes)
    Emulate {
        /// Directory to serve and write into (overrides config)
        #[arg(long)]
        root: Option<PathBuf>,
    },

    /// Print the SHA-256 digest of a secret for auth.secret_sha256
    HashSecret {
        /// The upload secret
        secret: String,
    },

    /// Initialize a new configuration file
    Init {
        /// Output path for configuration file
        #[arg(short, long, default_value = "cdngate.toml")]
        output: PathBuf,
    },

    /// Validate configuration file
    Validate,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve => {
            let config = load_config(&cli.config)?;
            init_logging(cli.log_level.as_deref().unwrap_or(&config.logging.level));
            run_serve(config).await
        }
        Commands::Emulate { root } => {
            let config = load_config_or_default(&cli.config)?;
            init_logging(cli.log_level.as_deref().unwrap_or(&config.logging.level));
            run_emulate(config, root).await
        }
        Commands::HashSecret { secret } => {
            println!("{}", digest_hex(&secret));
            Ok(())
        }
        Commands::Init { output } => {
            init_logging(cli.log_level.as_deref().unwrap_or("info"));
            run_init(output)
        }
        Commands::Validate => {
            init_logging(cli.log_level.as_deref().unwrap_or("info"));
            run_validate(&cli.config)
        }
    }
}

/// Initialize logging
fn init_logging(level: &str) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| level.into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn load_config(path: &Path) -> Result<Config> {
    Config::from_file(path)
}

fn load_config_or_default(path: &Path) -> Result<Config> {
    if path.exists() {
        Config::from_file(path)
    } else {
        Ok(Config::default())
    }
}

/// Start the authenticated gateway
async fn run_serve(config: Config) -> Result<()> {
    let verifier = config.verifier()?;
    let store = config.object_store()?;
    tracing::info!(
        "Accepting uploads authenticated against digest {}",
        verifier.reference_hex()
    );

    let gateway = Gateway::new(store, verifier);
    GatewayServer::new(config.server.bind_address.clone(), gateway)
        .run(shutdown_signal())
        .await
}

/// Start the emulated CDN and bucket
async fn run_emulate(config: Config, root: Option<PathBuf>) -> Result<()> {
    let mut emulation = config.emulation;
    if let Some(root) = root {
        emulation.root = root;
    }
    tokio::fs::create_dir_all(&emulation.root).await?;

    tracing::warn!("Emulator accepts unauthenticated writes; do not expose it");
    Emulator::new(emulation).run(shutdown_signal()).await
}

/// Write a default configuration file
fn run_init(output: PathBuf) -> Result<()> {
    if output.exists() {
        return Err(Error::Config(format!(
            "{} already exists, refusing to overwrite",
            output.display()
        )));
    }

    std::fs::write(&output, Config::default().to_toml()?)?;
    tracing::info!("Configuration written to {:?}", output);
    tracing::info!("Set auth.secret_sha256 with `cdngate hash-secret <secret>` before serving");
    Ok(())
}

/// Validate configuration file
fn run_validate(path: &Path) -> Result<()> {
    let config = Config::from_file(path)?;
    config.object_store()?;
    match config.verifier() {
        Ok(_) => tracing::info!("Configuration is valid"),
        Err(e) => tracing::warn!("Configuration is valid for emulation only: {}", e),
    }
    Ok(())
}
