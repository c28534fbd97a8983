//! VeloHost command-line tool
//!
//! Validates hosting configuration and dry-runs request resolution
//! against the real filesystem.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use velohost::config::directives::DirectiveParser;
use velohost::config::HostingConfig;
use velohost::resolve::{Resolution, VhostResolver};

/// VeloHost - Mass virtual hosting resolution tool
#[derive(Parser)]
#[command(name = "velohost")]
#[command(author = "VeloServe Team")]
#[command(version = velohost::VERSION)]
#[command(about = "Mass virtual hosting resolution tool", long_about = None)]
struct Cli {
    /// Configuration file path (.conf for Apache-style directives, TOML otherwise)
    #[arg(short, long, default_value = "/etc/velohost/velohost.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate the configuration file
    Check,
    /// Resolve a request against the configuration and the real filesystem
    Resolve {
        /// Request hostname (a trailing :port is ignored)
        #[arg(long)]
        host: String,

        /// Request URI path
        #[arg(long, default_value = "/")]
        uri: String,

        /// Print the mapping as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the owning uid/gid of a resolved virtual root
    #[cfg(unix)]
    Owner {
        /// Path to a resolved virtual root
        path: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("velohost={log_level}").into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command {
        Commands::Check => check(&cli.config),
        Commands::Resolve { host, uri, json } => resolve(&cli.config, &host, &uri, json),
        #[cfg(unix)]
        Commands::Owner { path } => owner(&path),
    }
}

fn load_config(path: &Path) -> Result<HostingConfig> {
    let config = if path.extension().is_some_and(|ext| ext == "conf") {
        DirectiveParser::new().parse_file(path)
    } else {
        HostingConfig::load(path)
    };
    config.with_context(|| format!("failed to load {}", path.display()))
}

fn check(path: &Path) -> Result<()> {
    let config = load_config(path)?;
    println!(
        "Configuration is valid: {} document root template(s), {} script alias prefix(es).",
        config.document_roots().len(),
        config.script_aliases().len()
    );
    Ok(())
}

fn resolve(path: &Path, host: &str, uri: &str, json: bool) -> Result<()> {
    let config = load_config(path)?;
    let host = host.split(':').next().unwrap_or(host);
    let resolver = VhostResolver::new(Arc::new(config));

    match resolver.resolve(uri, host) {
        Resolution::Resolved(mapping) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&mapping)?);
            } else {
                println!("filename:     {}", mapping.filename.display());
                println!("virtual root: {}", mapping.virtual_root.display());
                if let Some(handler) = &mapping.handler {
                    println!("handler:      {handler}");
                }
            }
            Ok(())
        }
        Resolution::Declined => bail!("no template resolved for {host} {uri}"),
    }
}

#[cfg(unix)]
fn owner(path: &Path) -> Result<()> {
    match velohost::identity::owner_of(path) {
        Some(identity) => {
            println!("uid={} gid={}", identity.uid, identity.gid);
            Ok(())
        }
        None => bail!("cannot stat {}", path.display()),
    }
}
