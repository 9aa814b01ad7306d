//! bookprice - Used-book price lookup by ISBN
//!
//! Run single lookups from the command line or serve them over HTTP.

use anyhow::Result;
use bookprice::commands::LookupCommand;
use bookprice::config::{Config, OutputFormat};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "bookprice",
    version,
    about = "Used-book price lookup by ISBN",
    long_about = "Looks up used-book prices on amazon.co.jp by ISBN, from the command line or over a small REST API."
)]
struct Cli {
    /// Storefront origin (mainly for testing against a mirror)
    #[arg(long, global = true, env = "BOOKPRICE_BASE_URL")]
    base_url: Option<String>,

    /// Proxy URL (e.g., socks5://host:port)
    #[arg(long, global = true, env = "BOOKPRICE_PROXY")]
    proxy: Option<String>,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true)]
    format: Option<OutputFormat>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Look up prices by ISBN
    #[command(alias = "l")]
    Lookup {
        /// ISBN-10 or ISBN-13 values (hyphens allowed)
        #[arg(required = true)]
        isbns: Vec<String>,
    },

    /// Serve the REST API
    Serve {
        /// Bind address
        #[arg(long, env = "BOOKPRICE_HOST")]
        host: Option<String>,

        /// Port
        #[arg(short, long, env = "BOOKPRICE_PORT")]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    // Initialize logging
    let filter = log_filter(cli.verbose, std::env::var(EnvFilter::DEFAULT_ENV).ok());
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();

    // Load config with layered overrides
    let mut config = Config::load(cli.config.as_deref())?.with_env();

    // Apply CLI overrides
    if let Some(base_url) = cli.base_url {
        config.base_url = base_url;
    }
    if let Some(proxy) = cli.proxy {
        config.proxy = Some(proxy);
    }
    if let Some(format) = cli.format {
        config.format = format;
    }

    match cli.command {
        Commands::Lookup { isbns } => {
            let cmd = LookupCommand::new(config);
            let output = cmd.execute(&isbns).await?;
            println!("{}", output);
        }

        Commands::Serve { host, port } => {
            if let Some(host) = host {
                config.host = host;
            }
            if let Some(port) = port {
                config.port = port;
            }

            bookprice::server::run(config).await?;
        }
    }

    Ok(())
}

/// `--verbose` forces debug; otherwise `RUST_LOG` applies, defaulting to warn.
fn log_filter(verbose: bool, rust_log: Option<String>) -> EnvFilter {
    if verbose {
        return EnvFilter::new(Level::DEBUG.to_string());
    }

    rust_log
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(Level::WARN.to_string()))
}
