//! namecheap-ddns - keeps Namecheap hosts pointed at the current WAN IP.

use clap::{Parser, Subcommand};
use namecheap_ddns::config::Config;
use namecheap_ddns::engine::{fqdn, ReconciliationEngine};
use namecheap_ddns::resolve::{HostIpResolver, HttpWanIpSource, SystemHostIpResolver, WanIpSource};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "namecheap-ddns")]
#[command(about = "Keeps Namecheap dynamic-DNS hosts pointed at the current WAN IP")]
#[command(version)]
struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one reconciliation pass
    Run {
        /// Print the report as JSON instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// Run reconciliation on a timer
    Daemon {
        /// Minutes between runs (defaults to poll_interval_minutes)
        #[arg(short, long)]
        interval: Option<u64>,
    },

    /// Show the WAN IP and each host's currently published IP
    Status,

    /// Validate configuration
    Validate,
}

fn get_config_path(cli_path: Option<PathBuf>) -> PathBuf {
    if let Some(path) = cli_path {
        return path;
    }

    // Default locations
    let candidates = [
        dirs::config_dir().map(|p| p.join("namecheap-ddns/config.toml")),
        Some(PathBuf::from("/etc/namecheap-ddns/config.toml")),
        Some(PathBuf::from("config.toml")),
    ];

    for candidate in candidates.into_iter().flatten() {
        if candidate.exists() {
            return candidate;
        }
    }

    // Return default even if it doesn't exist
    dirs::config_dir()
        .map(|p| p.join("namecheap-ddns/config.toml"))
        .unwrap_or_else(|| PathBuf::from("config.toml"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config_path = get_config_path(cli.config);
    let config = Config::load_from(&config_path)?;

    match cli.command {
        Commands::Run { json } => cmd_run(config, json).await?,
        Commands::Daemon { interval } => cmd_daemon(config, interval).await?,
        Commands::Status => cmd_status(config).await?,
        Commands::Validate => cmd_validate(config)?,
    }

    Ok(())
}

async fn cmd_run(config: Config, json: bool) -> anyhow::Result<()> {
    let engine = ReconciliationEngine::from_config(&config)?;
    let report = engine.run().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", report.summary());
    }

    if !report.is_clean() {
        std::process::exit(1);
    }

    Ok(())
}

async fn cmd_daemon(config: Config, interval: Option<u64>) -> anyhow::Result<()> {
    let minutes = interval.unwrap_or(config.poll_interval_minutes);
    anyhow::ensure!(minutes > 0, "interval must be positive");
    let interval = Duration::from_secs(minutes * 60);

    let engine = ReconciliationEngine::from_config(&config)?;

    tracing::info!(
        "starting namecheap-ddns daemon (interval: {}m)",
        minutes
    );

    // Awaiting each run before sleeping guarantees at most one run in
    // flight; a tick that arrives mid-run is effectively coalesced.
    loop {
        match engine.run().await {
            Ok(report) => {
                if report.updated.is_empty() && report.failed.is_empty() {
                    tracing::info!("all {} hosts up to date", report.unchanged.len());
                } else {
                    tracing::info!(
                        "run complete: {} updated, {} unchanged, {} failed",
                        report.updated.len(),
                        report.unchanged.len(),
                        report.failed.len()
                    );
                }
            }
            Err(e) => tracing::error!("reconciliation run failed: {}", e),
        }

        tokio::time::sleep(interval).await;
    }
}

async fn cmd_status(config: Config) -> anyhow::Result<()> {
    println!("namecheap-ddns Status");
    println!("=====================\n");

    match HttpWanIpSource::new(config.ip_check_url.clone())
        .fetch_wan_ip()
        .await
    {
        Ok(ip) => println!("Current WAN IP: {}", ip),
        Err(e) => println!("Failed to detect WAN IP: {}", e),
    }

    println!("\nHosts:");
    println!("------");

    let resolver = SystemHostIpResolver::new()?;

    for label in &config.hosts {
        let host = fqdn(label, &config.domain);
        match resolver.resolve_host_ip(&host).await {
            Some(ip) => println!("  {}: {}", host, ip),
            None => println!("  {}: (unresolved)", host),
        }
    }

    Ok(())
}

fn cmd_validate(config: Config) -> anyhow::Result<()> {
    match config.validate() {
        Ok(()) => {
            println!("Configuration OK ({} hosts on {})", config.hosts.len(), config.domain);
            Ok(())
        }
        Err(e) => {
            println!("Configuration invalid: {}", e);
            std::process::exit(1);
        }
    }
}
