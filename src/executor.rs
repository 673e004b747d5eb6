use crate::model::Listing;
use crate::traits::{FetchError, ListingSource};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// What a single source produced: its listings, or the failure that was
/// contained at this boundary. Exactly one outcome exists per source.
#[derive(Debug)]
pub struct SourceOutcome {
    pub source: String,
    pub result: Result<Vec<Listing>, FetchError>,
}

/// Runs every registered source to completion under a global concurrency
/// ceiling. Failures never cross the executor boundary: a source that
/// errors, panics or gets cancelled is reported as a failed outcome while
/// its siblings keep running.
pub struct HarvestExecutor {
    semaphore: Arc<Semaphore>,
    completed: Arc<AtomicUsize>,
}

impl HarvestExecutor {
    pub fn new(concurrency_limit: usize) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(concurrency_limit)),
            completed: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Sources finished so far. Reporting only; scheduling ignores it.
    pub fn completed_count(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    /// Drives all `sources` concurrently and collects one outcome each,
    /// in no particular order.
    ///
    /// Cancellation: once `cancel` fires, no further source is admitted
    /// through the semaphore and in-flight fetches are abandoned with a
    /// `Cancelled` outcome. Outcomes already produced are kept.
    pub async fn run(
        &self,
        sources: Vec<Arc<dyn ListingSource>>,
        media_dir: &Path,
        cancel: &CancellationToken,
    ) -> Vec<SourceOutcome> {
        let total = sources.len();
        let mut handles = Vec::with_capacity(total);

        for source in sources {
            let name = source.name().to_string();
            let semaphore = self.semaphore.clone();
            let completed = self.completed.clone();
            let cancel = cancel.clone();
            let media_dir = media_dir.to_path_buf();
            let task_name = name.clone();

            let handle = tokio::spawn(async move {
                // Admission gate: cancelled runs start nothing new.
                let _permit = tokio::select! {
                    permit = semaphore.acquire_owned() => match permit {
                        Ok(permit) => permit,
                        Err(_) => {
                            return SourceOutcome {
                                source: task_name,
                                result: Err(FetchError::Cancelled),
                            }
                        }
                    },
                    _ = cancel.cancelled() => {
                        return SourceOutcome {
                            source: task_name,
                            result: Err(FetchError::Cancelled),
                        }
                    }
                };

                info!(source = %task_name, "starting fetch");
                let result = tokio::select! {
                    result = source.fetch(&media_dir) => result,
                    _ = cancel.cancelled() => Err(FetchError::Cancelled),
                };

                let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
                match &result {
                    Ok(listings) => info!(
                        source = %task_name,
                        records = listings.len(),
                        completed = done,
                        total,
                        "source finished"
                    ),
                    Err(err) => warn!(
                        source = %task_name,
                        error = %err,
                        completed = done,
                        total,
                        "source failed"
                    ),
                }
                SourceOutcome {
                    source: task_name,
                    result,
                }
            });
            handles.push((name, handle));
        }

        let mut outcomes = Vec::with_capacity(total);
        for (name, handle) in handles {
            match handle.await {
                Ok(outcome) => outcomes.push(outcome),
                // A panicking source is contained like any other failure.
                Err(join_err) => outcomes.push(SourceOutcome {
                    source: name,
                    result: Err(FetchError::Task(join_err.to_string())),
                }),
            }
        }
        outcomes
    }
}
