use clap::Parser;
use leilao_harvester::config::HarvestConfig;
use leilao_harvester::harvest::{HarvestPipeline, RunState};
use leilao_harvester::net;
use leilao_harvester::registry::{SourceRegistry, SourceSelection};
use leilao_harvester::retry::RetryPolicy;
use leilao_harvester::sink;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Collects property-auction listings from the registered sources into a
/// deduplicated JSON/CSV dataset of upcoming auctions.
#[derive(Parser, Debug)]
#[command(name = "leilao-harvester", version, about)]
struct Cli {
    /// Source names to run (see --list).
    sources: Vec<String>,

    /// Run every registered source.
    #[arg(long, conflicts_with = "sources")]
    all: bool,

    /// Print the registered source names and exit.
    #[arg(long)]
    list: bool,

    /// Maximum number of sources fetching simultaneously.
    #[arg(long, default_value_t = 10)]
    concurrency: usize,

    /// Output directory for auctions.json, auctions.csv and photos/.
    #[arg(long, value_name = "DIR", default_value = "data")]
    data_dir: PathBuf,

    /// Delay before the first retry of a failed network call, in seconds.
    #[arg(long, default_value_t = 2)]
    retry_min_secs: u64,

    /// Ceiling for the doubled retry delays, in seconds.
    #[arg(long, default_value_t = 30)]
    retry_max_secs: u64,

    /// Total attempts per network call, including the first.
    #[arg(long, default_value_t = 5)]
    retry_attempts: u32,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let config = HarvestConfig {
        concurrency: cli.concurrency,
        retry: RetryPolicy {
            min_delay: Duration::from_secs(cli.retry_min_secs),
            max_delay: Duration::from_secs(cli.retry_max_secs),
            max_attempts: cli.retry_attempts,
        },
        data_dir: cli.data_dir,
        ..HarvestConfig::default()
    };

    let client = match net::build_client() {
        Ok(client) => client,
        Err(err) => {
            error!(%err, "failed to build HTTP client");
            return ExitCode::FAILURE;
        }
    };
    let registry = SourceRegistry::builtin(client, config.retry);

    if cli.list {
        for name in registry.names() {
            println!("{name}");
        }
        return ExitCode::SUCCESS;
    }

    let selection = if cli.all {
        SourceSelection::All
    } else if cli.sources.is_empty() {
        error!("no sources requested; pass source names or --all (see --list)");
        return ExitCode::FAILURE;
    } else {
        SourceSelection::Named(cli.sources)
    };

    let data_dir = config.data_dir.clone();
    let pipeline = match HarvestPipeline::new(config, registry) {
        Ok(pipeline) => pipeline,
        Err(err) => {
            error!(%err, "invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    // Ctrl-C cancels the run; whatever was collected is still written.
    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, cancelling run");
            interrupt.cancel();
        }
    });

    let report = match pipeline.run(&selection, &cancel).await {
        Ok(report) => report,
        Err(err) => {
            error!(%err, "harvest aborted");
            return ExitCode::FAILURE;
        }
    };

    let json_path = data_dir.join("auctions.json");
    if let Err(err) = sink::write_json(&report.records, &json_path).await {
        error!(%err, path = %json_path.display(), "failed to write JSON dataset");
        return ExitCode::FAILURE;
    }
    let csv_path = data_dir.join("auctions.csv");
    if let Err(err) = sink::write_csv(&report.records, &csv_path).await {
        error!(%err, path = %csv_path.display(), "failed to write CSV dataset");
        return ExitCode::FAILURE;
    }

    match report.state {
        RunState::Completed => info!(
            records = report.records.len(),
            failed_sources = report.stats.sources_failed,
            "harvest completed"
        ),
        RunState::Cancelled => warn!(
            records = report.records.len(),
            "harvest cancelled, partial results written"
        ),
    }
    ExitCode::SUCCESS
}
