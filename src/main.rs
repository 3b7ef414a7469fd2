use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ntpscout::config::Config;
use ntpscout::registry::ServerRegistry;

#[derive(Parser)]
#[command(
    name = "ntpscout",
    version,
    about = "NTP server catalog discovery, concurrent reachability probing, and latency ranking",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format (text, json)
    #[arg(long, global = true, default_value = "text")]
    log_format: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the catalog and list server candidates without probing
    Discover {
        /// Print candidates as JSON instead of plain lines
        #[arg(long, default_value = "false")]
        json: bool,
    },

    /// Run the full pipeline: discover, probe, rank, and report
    Probe {
        /// How many best servers to report
        #[arg(short, long)]
        top: Option<usize>,

        /// Print the final results as JSON
        #[arg(long, default_value = "false")]
        json: bool,

        /// Suppress the per-probe progress lines
        #[arg(long, default_value = "false")]
        no_progress: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_tracing(&cli.log_format, cli.verbose)?;

    let config = Config::from_env().context("Failed to load configuration")?;

    match cli.command {
        Commands::Discover { json } => {
            tracing::info!(url = %config.catalog.url, "Starting discover command");
            discover(config, json).await?;
        }

        Commands::Probe {
            top,
            json,
            no_progress,
        } => {
            tracing::info!(
                url = %config.catalog.url,
                top = ?top,
                workers = config.probe.max_workers,
                "Starting probe command"
            );
            probe(config, top, json, !no_progress).await?;
        }
    }

    Ok(())
}

fn setup_tracing(format: &str, verbose: bool) -> Result<()> {
    let env_filter = if verbose {
        tracing_subscriber::EnvFilter::new("ntpscout=debug,info")
    } else {
        tracing_subscriber::EnvFilter::new("ntpscout=info,warn")
    };

    match format {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
    }

    Ok(())
}

async fn discover(config: Config, json: bool) -> Result<()> {
    let registry = ServerRegistry::new(&config)?;

    let candidates = registry
        .discover()
        .await
        .context("Catalog discovery failed")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&candidates)?);
        return Ok(());
    }

    println!("发现 {} 个NTP服务器候选:", candidates.len());
    for candidate in &candidates {
        println!(
            "  {:<30} {} / {}",
            candidate.name,
            candidate.region.label(),
            candidate.category
        );
    }

    Ok(())
}

async fn probe(config: Config, top: Option<usize>, json: bool, show_progress: bool) -> Result<()> {
    let registry = ServerRegistry::new(&config)?;

    let candidates = registry
        .discover()
        .await
        .context("Catalog discovery failed")?;

    if candidates.is_empty() {
        println!("目录中没有可测试的NTP服务器");
        return Ok(());
    }

    let cancel = CancellationToken::new();
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, abandoning queued probes");
            signal_cancel.cancel();
        }
    });

    let results = registry
        .test_all(candidates, show_progress && !json, cancel)
        .await;

    let top_n = top.unwrap_or(config.probe.top_n);
    let best = ServerRegistry::rank_best(&results, top_n);
    let grouped = ServerRegistry::group_by_region_then_category(&results);

    if json {
        let output = serde_json::json!({
            "best": best,
            "grouped": grouped,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("\n=== 响应最快的NTP服务器 ===");
    for (idx, server) in best.iter().enumerate() {
        if let Some(latency) = server.latency_ms {
            println!("{}. {:<30} {latency:.1}ms", idx + 1, server.name());
        }
    }
    if best.is_empty() {
        println!("没有可用的NTP服务器");
    }

    println!("{}", grouped.render());

    Ok(())
}
