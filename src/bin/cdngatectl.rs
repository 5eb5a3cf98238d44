//! cdngatectl - Command line uploader for cdngate
//!
//! Usage:
//!   cdngatectl put <key> <file>    - Upload a file to <key>
//!   cdngatectl delete <key>        - Remove the object at <key>

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

use cdngate::client::UploadClient;

/// cdngate upload tool
#[derive(Parser)]
#[command(name = "cdngatectl")]
#[command(about = "Upload and delete objects through a cdngate gateway", long_about = None)]
struct Cli {
    /// Gateway (or emulator write endpoint) base URL
    #[arg(short, long, env = "CDNGATE_ENDPOINT", default_value = "http://127.0.0.1:8001")]
    endpoint: String,

    /// Upload secret sent as a bearer token
    #[arg(short, long, env = "CDNGATE_TOKEN", default_value = "")]
    token: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload a file
    Put {
        /// Object key, e.g. users/42/banner.jpg
        key: String,
        /// Local file to upload
        file: PathBuf,
        /// Content type (guessed from the file extension when omitted)
        #[arg(long)]
        content_type: Option<String>,
    },
    /// Delete an object
    Delete {
        /// Object key
        key: String,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let client = UploadClient::new(&cli.endpoint, &cli.token)?;

    match cli.command {
        Commands::Put {
            key,
            file,
            content_type,
        } => {
            let body = tokio::fs::read(&file)
                .await
                .with_context(|| format!("reading {}", file.display()))?;
            let content_type = content_type.unwrap_or_else(|| {
                mime_guess::from_path(&file)
                    .first_or_octet_stream()
                    .essence_str()
                    .to_string()
            });
            let len = body.len();
            client
                .put(&key, body, &content_type)
                .await
                .with_context(|| format!("uploading {}", key))?;
            println!("Uploaded {} ({} bytes, {})", key, len, content_type);
        }
        Commands::Delete { key } => {
            client
                .delete(&key)
                .await
                .with_context(|| format!("deleting {}", key))?;
            println!("Deleted {}", key);
        }
    }

    Ok(())
}
