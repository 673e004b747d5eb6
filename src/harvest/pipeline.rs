//! End-to-end harvest run coordinator.
//!
//! [`HarvestPipeline`] drives one full collection: resolve the requested
//! sources against the registry, run them under the bounded executor,
//! aggregate and filter the outcomes, and report counters for the run.

use std::time::Instant;

use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::config::{ConfigError, HarvestConfig};
use crate::executor::HarvestExecutor;
use crate::harvest::filter::aggregate;
use crate::model::Listing;
use crate::registry::{SourceRegistry, SourceSelection};

/// Terminal state of a run. Partial source failure is not a distinct
/// state: a run that attempted every requested source completed, and the
/// failures are visible in the stats and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Completed,
    Cancelled,
}

/// Counters for one run.
#[derive(Debug, Default, Clone)]
pub struct HarvestStats {
    /// Sources the run attempted.
    pub sources_total: usize,
    /// Sources that contributed no records (failed or cancelled).
    pub sources_failed: usize,
    /// Listings fetched before filtering.
    pub records_fetched: usize,
    /// Listings in the final output.
    pub records_kept: usize,
    pub past_dropped: usize,
    pub duplicates_dropped: usize,
    /// Listings kept despite an unparseable date (fail-open).
    pub unparseable_kept: usize,
    pub total_duration_ms: u64,
}

/// Complete harvest result handed to the sinks.
#[derive(Debug)]
pub struct HarvestReport {
    /// Retained, deduplicated listings. Order is unspecified.
    pub records: Vec<Listing>,
    pub state: RunState,
    pub stats: HarvestStats,
}

pub struct HarvestPipeline {
    config: HarvestConfig,
    registry: SourceRegistry,
}

impl HarvestPipeline {
    /// Validates the configuration up front; an invalid configuration
    /// aborts before any source executes.
    pub fn new(config: HarvestConfig, registry: SourceRegistry) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config, registry })
    }

    /// Runs the harvest to completion or cancellation.
    ///
    /// Only configuration-time errors propagate; once sources are running,
    /// their failures are contained and the run itself succeeds. On
    /// cancellation the report carries whatever was collected so far.
    pub async fn run(
        &self,
        selection: &SourceSelection,
        cancel: &CancellationToken,
    ) -> Result<HarvestReport, ConfigError> {
        let started = Instant::now();

        let sources = self.registry.select(selection)?;
        let media_dir = self.config.media_dir();
        tokio::fs::create_dir_all(&media_dir)
            .await
            .map_err(|e| ConfigError::DataDir(format!("{}: {e}", media_dir.display())))?;

        info!(
            sources = sources.len(),
            concurrency = self.config.concurrency,
            "harvest run started"
        );

        let sources_total = sources.len();
        let executor = HarvestExecutor::new(self.config.concurrency);
        let outcomes = executor.run(sources, &media_dir, cancel).await;

        let today = Utc::now().date_naive();
        let summary = aggregate(outcomes, self.config.filter_mode, today);

        let state = if cancel.is_cancelled() {
            RunState::Cancelled
        } else {
            RunState::Completed
        };

        let stats = HarvestStats {
            sources_total,
            sources_failed: summary.sources_failed,
            records_fetched: summary.records_fetched,
            records_kept: summary.records.len(),
            past_dropped: summary.past_dropped,
            duplicates_dropped: summary.duplicates_dropped,
            unparseable_kept: summary.unparseable_kept,
            total_duration_ms: started.elapsed().as_millis() as u64,
        };

        info!(
            state = ?state,
            kept = stats.records_kept,
            fetched = stats.records_fetched,
            failed_sources = stats.sources_failed,
            past_dropped = stats.past_dropped,
            duplicates = stats.duplicates_dropped,
            duration_ms = stats.total_duration_ms,
            "harvest run finished"
        );

        Ok(HarvestReport {
            records: summary.records,
            state,
            stats,
        })
    }
}
