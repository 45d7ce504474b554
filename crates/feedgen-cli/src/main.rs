use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use feedgen_pipeline::{read_metrics, run_configured, MetricsDocument, Orchestrator};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "feedgen")]
#[command(about = "Shopping feed generator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Generate feeds for every enabled destination
    Run {
        /// Only generate the named destination (repeatable)
        #[arg(long = "destination", short = 'd')]
        destinations: Vec<String>,
    },
    /// Print the metrics of the last run
    Status {
        #[arg(long, env = "FEEDGEN_OUTPUT_DIR", default_value = "./public")]
        output_dir: PathBuf,
        #[arg(long, env = "FEEDGEN_METRICS_FILENAME", default_value = "feed_metrics.json")]
        metrics_file: String,
    },
    /// Load and validate the feed configuration file
    ValidateConfig {
        #[arg(long, env = "FEEDGEN_CONFIG_PATH", default_value = "./config/feeds.yaml")]
        config: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let level = std::env::var("FEEDGEN_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run { destinations } => run(&destinations).await,
        Commands::Status {
            output_dir,
            metrics_file,
        } => status(&output_dir.join(metrics_file)),
        Commands::ValidateConfig { config } => validate_config(&config),
    }
}

async fn run(destinations: &[String]) -> anyhow::Result<()> {
    let app = feedgen_core::load_app_config()?;
    let config = Arc::new(feedgen_core::load_feed_config(&app.config_path)?);
    let orchestrator = Orchestrator::new(config, app.base_url.clone(), app.output_dir.clone());

    tracing::info!(source = %app.source, ?destinations, "feed run starting");
    let report = run_configured(&app, &orchestrator, destinations).await?;
    for m in &report.destinations {
        println!("{}", summary_line(m));
    }

    let failed = report.failed_destinations();
    if !failed.is_empty() {
        tracing::error!(?failed, "feed run finished with failures");
        anyhow::bail!("feed generation failed for: {}", failed.join(", "));
    }
    tracing::info!(destinations = report.destinations.len(), "feed run finished");
    Ok(())
}

fn status(metrics_path: &Path) -> anyhow::Result<()> {
    match read_metrics(metrics_path)? {
        None => println!("no runs recorded at {}", metrics_path.display()),
        Some(doc) => print_status(&doc),
    }
    Ok(())
}

fn print_status(doc: &MetricsDocument) {
    for m in doc.values() {
        println!("{}", summary_line(m));
        if let Some(error) = &m.error {
            println!("    error: {error}");
        }
    }
}

fn summary_line(m: &feedgen_pipeline::DestinationMetrics) -> String {
    format!(
        "{:<10} {:<7} {} items from {} products ({} skipped), {} bytes in {:.2}s [{}] at {}",
        m.destination,
        if m.success { "ok" } else { "FAILED" },
        m.total_items,
        m.total_products,
        m.skipped_records,
        m.file_size_bytes,
        m.duration_seconds,
        m.data_source,
        m.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
    )
}

fn validate_config(path: &Path) -> anyhow::Result<()> {
    let config = feedgen_core::load_feed_config(path)?;
    println!("{} is valid", path.display());
    for d in &config.destinations {
        println!(
            "  {:<10} {:<6} {:<8} -> {}",
            d.name,
            d.kind.to_string(),
            if d.enabled { "enabled" } else { "disabled" },
            d.feed_filename
        );
    }
    Ok(())
}
