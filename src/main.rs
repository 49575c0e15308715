//! Job Monitor: polls job boards and ATS endpoints, notifies on new postings.
//!
//! Modes: forever (default), `--once`, `--test`. See `README.md`.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use job_monitor::metrics::Metrics;
use job_monitor::notify::Dispatcher;
use job_monitor::{default_registry, MonitorConfig, Posting, Scanner, Scheduler};

#[derive(Parser, Debug)]
#[command(
    name = "job-monitor",
    version,
    about = "Real-time data engineer job monitor"
)]
struct Cli {
    /// Scan once and exit
    #[arg(long, conflicts_with = "test")]
    once: bool,

    /// Send one synthetic posting through every configured transport and exit
    #[arg(long)]
    test: bool,

    /// TOML config file (otherwise $JOB_MONITOR_CONFIG or config/job_monitor.toml)
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Serve Prometheus metrics on this address, e.g. 127.0.0.1:9898
    #[arg(long, value_name = "ADDR")]
    metrics_addr: Option<SocketAddr>,

    /// JSON log lines
    #[arg(long)]
    json: bool,
}

fn init_tracing(json: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("job_monitor=info,warn"));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().compact())
            .init();
    }
}

fn sample_posting() -> Posting {
    Posting::new(
        "Senior Data Engineer [TEST]",
        "ACME Corp",
        "Remote USA",
        "https://example.com/job",
        "Test",
        chrono::Utc::now().to_rfc3339(),
    )
}

async fn send_test_notifications(dispatcher: &Dispatcher) {
    tracing::info!(
        transports = ?dispatcher.item_transports(),
        digest = dispatcher.has_digest(),
        "sending test notifications"
    );
    let p = sample_posting();
    dispatcher.notify_item(&p).await;
    let status = dispatcher.notify_batch(std::slice::from_ref(&p)).await;
    tracing::info!(?status, "test notifications done");
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = ?e, "cannot listen for Ctrl-C, running until killed");
        std::future::pending::<()>().await;
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env in local/dev; a missing file is fine.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_tracing(cli.json);

    let cfg = Arc::new(MonitorConfig::load(cli.config.as_deref())?);
    let dispatcher = Dispatcher::from_config(&cfg);

    if cli.test {
        send_test_notifications(&dispatcher).await;
        return Ok(());
    }

    let _metrics_server = match cli.metrics_addr {
        Some(addr) => Some(Metrics::init()?.serve(addr).await?),
        None => None,
    };

    let registry = default_registry(&cfg)?;
    let scanner = Scanner::new(Arc::clone(&cfg), registry, dispatcher);

    if cli.once {
        scanner.run_scan().await;
        return Ok(());
    }

    let scheduler = Scheduler::from_minutes(cfg.scan.interval_mins);
    tracing::info!(
        sources = scanner.registry().len(),
        interval_mins = cfg.scan.interval_mins,
        recipient = cfg.email.recipient().unwrap_or("(email not configured)"),
        seen_file = %cfg.scan.seen_file.display(),
        "job monitor running, Ctrl-C to stop"
    );
    scheduler.run(&scanner, shutdown_signal()).await;
    Ok(())
}
