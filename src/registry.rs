//! Compiled source registry.
//!
//! Sources are registered explicitly at construction time instead of being
//! discovered by scanning a plugin directory; the `fetch` capability is
//! enforced by the [`ListingSource`](crate::traits::ListingSource) trait.
//! Discovery still skips two kinds of non-participating entries with a
//! warning: names carrying the reserved `_` template prefix, and sources
//! whose configuration is unfilled.

use crate::config::ConfigError;
use crate::retry::RetryPolicy;
use crate::sources;
use crate::traits::ListingSource;
use reqwest::Client;
use std::sync::Arc;
use tracing::warn;

/// Which sources a run should execute.
#[derive(Debug, Clone)]
pub enum SourceSelection {
    All,
    Named(Vec<String>),
}

pub struct SourceRegistry {
    sources: Vec<Arc<dyn ListingSource>>,
}

impl SourceRegistry {
    /// Registers `candidates` in discovery order, skipping template
    /// placeholders and unconfigured entries. Skipping is logged, never an
    /// error: a placeholder in the list must not break the real sources.
    pub fn new(candidates: Vec<Arc<dyn ListingSource>>) -> Self {
        let mut sources: Vec<Arc<dyn ListingSource>> = Vec::with_capacity(candidates.len());
        for source in candidates {
            if source.name().starts_with('_') {
                warn!(source = source.name(), "skipping template source");
                continue;
            }
            if !source.is_configured() {
                warn!(source = source.name(), "skipping unconfigured source");
                continue;
            }
            sources.push(source);
        }
        Self { sources }
    }

    /// All shipped sources, wired to the shared HTTP client.
    pub fn builtin(client: Client, retry: RetryPolicy) -> Self {
        Self::new(vec![
            Arc::new(sources::zukerman::ZukermanSource::new(client.clone(), retry)),
            Arc::new(sources::mega_leiloes::MegaLeiloesSource::new(
                client.clone(),
                retry,
            )),
            Arc::new(sources::lance_total::LanceTotalSource::new(
                client.clone(),
                retry,
            )),
            Arc::new(sources::jucerja::JucerjaSource::new(client.clone(), retry)),
            Arc::new(sources::tjpi::TjpiSource::new(client.clone(), retry)),
            Arc::new(sources::tribunal::TribunalSource::template(client, retry)),
        ])
    }

    /// Registered source names, in discovery order.
    pub fn names(&self) -> Vec<&str> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    /// Resolves a selection to source handles. Requesting a name that is
    /// not registered is a configuration error and aborts before any
    /// source runs.
    pub fn select(
        &self,
        selection: &SourceSelection,
    ) -> Result<Vec<Arc<dyn ListingSource>>, ConfigError> {
        match selection {
            SourceSelection::All => Ok(self.sources.clone()),
            SourceSelection::Named(names) => {
                let mut picked = Vec::with_capacity(names.len());
                for name in names {
                    let source = self
                        .sources
                        .iter()
                        .find(|s| s.name() == name)
                        .ok_or_else(|| ConfigError::UnknownSource(name.clone()))?;
                    picked.push(source.clone());
                }
                Ok(picked)
            }
        }
    }
}
