//! shopfloor-kpi - manufacturing KPI analytics service
//!
//! # Usage
//!
//! ```bash
//! # One pipeline run against exported collections
//! shopfloor-kpi run --orders data/NewOrder.json --machines data/macchinari.json
//!
//! # HTTP API plus hourly scheduler
//! shopfloor-kpi serve --addr 0.0.0.0:5000 --interval-minutes 60
//! ```
//!
//! # Environment Variables
//!
//! - `SHOPFLOOR_CONFIG`: Path to `analytics_config.toml`
//! - `OUTPUT_DIR`: Export directory (default: ./analytics_output)
//! - `SCHEDULE_INTERVAL_MINUTES`: Minutes between scheduled runs (default: 60)
//! - `SHOPFLOOR_SERVER_ADDR`: HTTP bind address (default: 0.0.0.0:5000)
//! - `RUST_LOG`: Logging level (default: info)

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use shopfloor_kpi::api::{create_app, ApiState};
use shopfloor_kpi::pipeline::run_scheduler;
use shopfloor_kpi::{AnalyticsConfig, AnalyticsRunner, Exporter, JsonFileSource};

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "shopfloor-kpi")]
#[command(about = "Shop-floor KPI analytics: orders, phases and machines to dashboard tables")]
#[command(version)]
struct CliArgs {
    /// Path to analytics_config.toml (overrides SHOPFLOOR_CONFIG and ./analytics_config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Orders export (JSON array or one document per line)
    #[arg(long, global = true)]
    orders: Option<PathBuf>,

    /// Machines export (JSON array or one document per line)
    #[arg(long, global = true)]
    machines: Option<PathBuf>,

    /// Directory the tables and summary are written to
    #[arg(long, global = true)]
    output_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: SubCommand,
}

#[derive(clap::Subcommand, Debug)]
enum SubCommand {
    /// Run the pipeline once and exit
    Run,

    /// Serve the HTTP API and run the pipeline on a schedule until Ctrl+C
    Serve {
        /// Override the server address (default: "0.0.0.0:5000")
        #[arg(short, long, value_name = "HOST:PORT")]
        addr: Option<String>,

        /// Minutes between scheduled runs
        #[arg(long)]
        interval_minutes: Option<u64>,
    },
}

impl CliArgs {
    /// Config file -> env vars -> CLI flags, validated once at the end.
    fn resolve_config(&self) -> Result<AnalyticsConfig> {
        let mut config = match &self.config {
            Some(path) => AnalyticsConfig::load_from_file(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => AnalyticsConfig::load(),
        };
        config.apply_env_overrides();

        if let Some(orders) = &self.orders {
            config.source.orders_path.clone_from(orders);
        }
        if let Some(machines) = &self.machines {
            config.source.machines_path.clone_from(machines);
        }
        if let Some(dir) = &self.output_dir {
            config.export.output_dir.clone_from(dir);
        }
        if let SubCommand::Serve { addr, interval_minutes } = &self.command {
            if let Some(addr) = addr {
                config.server.addr.clone_from(addr);
            }
            if let Some(minutes) = interval_minutes {
                config.scheduler.interval_minutes = *minutes;
            }
        }

        config.validate().context("Invalid configuration")?;
        Ok(config)
    }
}

fn build_runner(config: &AnalyticsConfig) -> Arc<AnalyticsRunner> {
    let source = JsonFileSource::new(&config.source.orders_path, &config.source.machines_path);
    let exporter = Exporter::new(&config.export.output_dir, config.export.dashboard_dir.clone());
    Arc::new(AnalyticsRunner::new(Box::new(source), exporter))
}

// ============================================================================
// Modes
// ============================================================================

async fn run_once(config: &AnalyticsConfig) -> Result<()> {
    let runner = build_runner(config);
    let summary = runner.run_once().await.context("Analytics run failed")?;

    info!(
        total_orders = summary.total_orders,
        completed_orders = summary.completed_orders,
        active_machines = summary.active_machines,
        total_machines = summary.total_machines,
        on_time_delivery_rate = summary.on_time_delivery_rate,
        total_operators = summary.total_operators,
        bottlenecks = ?summary.bottleneck_machines,
        "Run summary"
    );
    info!(dir = %config.export.output_dir.display(), "Artifacts written");
    Ok(())
}

async fn serve(config: &AnalyticsConfig, cancel_token: CancellationToken) -> Result<()> {
    let runner = build_runner(config);
    let app = create_app(ApiState::new(Arc::clone(&runner)));

    let listener = tokio::net::TcpListener::bind(&config.server.addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.addr))?;
    info!(addr = %config.server.addr, "HTTP API listening");

    let mut task_set: JoinSet<Result<&'static str>> = JoinSet::new();

    let http_cancel = cancel_token.clone();
    task_set.spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                http_cancel.cancelled().await;
                info!("[HttpServer] Received shutdown signal");
            })
            .await
            .context("HTTP server error")?;
        Ok("http-server")
    });

    let interval = Duration::from_secs(config.scheduler.interval_minutes.saturating_mul(60));
    let scheduler_cancel = cancel_token.clone();
    task_set.spawn(async move {
        run_scheduler(runner, interval, scheduler_cancel).await;
        Ok("scheduler")
    });

    // Any task exiting on its own takes the others down with it
    while let Some(joined) = task_set.join_next().await {
        match joined {
            Ok(Ok(name)) => info!(task = name, "Task finished"),
            Ok(Err(e)) => error!(error = %e, "Task failed"),
            Err(e) => error!(error = %e, "Task panicked"),
        }
        cancel_token.cancel();
    }
    Ok(())
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args = CliArgs::parse();
    let config = args.resolve_config()?;

    match args.command {
        SubCommand::Run => run_once(&config).await,
        SubCommand::Serve { .. } => {
            // Graceful shutdown via Ctrl+C
            let cancel_token = CancellationToken::new();
            let shutdown_token = cancel_token.clone();
            tokio::spawn(async move {
                tokio::signal::ctrl_c().await.ok();
                info!("Received Ctrl+C, initiating shutdown...");
                shutdown_token.cancel();
            });
            serve(&config, cancel_token).await
        }
    }
}
