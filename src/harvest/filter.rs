//! Aggregation and business filtering of per-source outcomes.

use crate::config::FilterMode;
use crate::executor::SourceOutcome;
use crate::model::Listing;
use chrono::NaiveDate;
use std::collections::HashMap;
use tracing::warn;

/// Result of flattening, filtering and deduplicating a run's outcomes.
#[derive(Debug, Default)]
pub struct AggregateSummary {
    /// Retained listings, deduplicated. Order is unspecified.
    pub records: Vec<Listing>,
    /// Sources that contributed no records (failed or cancelled).
    pub sources_failed: usize,
    /// Listings fetched before filtering.
    pub records_fetched: usize,
    pub past_dropped: usize,
    pub duplicates_dropped: usize,
    /// Listings kept despite an unparseable auction date (fail-open).
    pub unparseable_kept: usize,
}

/// Flattens `outcomes` into one record set, applies the business filter for
/// `mode` against `today`, then deduplicates on (`source`, `id`).
///
/// A failed source is logged and counted, never fatal: the run succeeds with
/// whatever the other sources produced. A listing whose date cannot be
/// parsed is kept unconditionally with a warning - losing a listing is worse
/// than including a possibly stale one.
pub fn aggregate(
    outcomes: Vec<SourceOutcome>,
    mode: FilterMode,
    today: NaiveDate,
) -> AggregateSummary {
    let mut summary = AggregateSummary::default();

    let mut fetched: Vec<Listing> = Vec::new();
    for outcome in outcomes {
        match outcome.result {
            Ok(listings) => fetched.extend(listings),
            Err(err) => {
                warn!(source = %outcome.source, error = %err, "source contributed no records");
                summary.sources_failed += 1;
            }
        }
    }
    summary.records_fetched = fetched.len();

    let mut kept: Vec<Listing> = Vec::with_capacity(fetched.len());
    match mode {
        FilterMode::FutureOnly => {
            for listing in fetched {
                match listing.scheduled_date() {
                    Some(date) if date >= today => kept.push(listing),
                    Some(_) => summary.past_dropped += 1,
                    None => {
                        warn!(
                            source = %listing.source,
                            id = %listing.id,
                            scheduled_at = %listing.scheduled_at,
                            "unparseable auction date, keeping listing"
                        );
                        summary.unparseable_kept += 1;
                        kept.push(listing);
                    }
                }
            }
        }
    }

    // Last-write-wins on (source, id): the listing seen later in
    // aggregation order replaces an earlier one with the same identity.
    let before = kept.len();
    let mut by_identity: HashMap<(String, String), Listing> = HashMap::with_capacity(before);
    for listing in kept {
        by_identity.insert((listing.source.clone(), listing.id.clone()), listing);
    }
    summary.duplicates_dropped = before - by_identity.len();
    summary.records = by_identity.into_values().collect();
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::FetchError;

    fn listing(source: &str, id: &str, scheduled_at: &str) -> Listing {
        Listing {
            source: source.to_string(),
            id: id.to_string(),
            title: format!("Lote {id}"),
            scheduled_at: scheduled_at.to_string(),
            location: String::new(),
            price: "R$ 1,00".to_string(),
            media_path: String::new(),
            url: format!("https://example.com/{id}"),
        }
    }

    fn ok(source: &str, listings: Vec<Listing>) -> SourceOutcome {
        SourceOutcome {
            source: source.to_string(),
            result: Ok(listings),
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 6).unwrap()
    }

    #[test]
    fn past_listings_are_dropped_and_future_kept() {
        let outcomes = vec![ok(
            "a",
            vec![
                listing("A", "past", "2026-08-05T00:00:00+00:00"),
                listing("A", "today", "2026-08-06T15:30:00+00:00"),
                listing("A", "future", "2026-12-01T00:00:00+00:00"),
            ],
        )];
        let summary = aggregate(outcomes, FilterMode::FutureOnly, today());
        assert_eq!(summary.records.len(), 2);
        assert_eq!(summary.past_dropped, 1);
        assert!(summary.records.iter().all(|l| l.id != "past"));
    }

    #[test]
    fn unparseable_dates_are_kept_fail_open() {
        let outcomes = vec![ok("a", vec![listing("A", "1", "data a definir")])];
        let summary = aggregate(outcomes, FilterMode::FutureOnly, today());
        assert_eq!(summary.records.len(), 1);
        assert_eq!(summary.unparseable_kept, 1);
    }

    #[test]
    fn failed_sources_are_counted_not_fatal() {
        let outcomes = vec![
            ok("a", vec![listing("A", "1", "2099-01-01T00:00:00+00:00")]),
            SourceOutcome {
                source: "b".to_string(),
                result: Err(FetchError::Transient("down".into())),
            },
        ];
        let summary = aggregate(outcomes, FilterMode::FutureOnly, today());
        assert_eq!(summary.records.len(), 1);
        assert_eq!(summary.sources_failed, 1);
    }

    #[test]
    fn duplicate_identity_resolves_last_write_wins() {
        let mut earlier = listing("A", "1", "2099-01-01T00:00:00+00:00");
        earlier.title = "first seen".to_string();
        let mut later = earlier.clone();
        later.title = "second seen".to_string();

        let outcomes = vec![ok("a", vec![earlier]), ok("a-again", vec![later])];
        let summary = aggregate(outcomes, FilterMode::FutureOnly, today());
        assert_eq!(summary.records.len(), 1);
        assert_eq!(summary.duplicates_dropped, 1);
        assert_eq!(summary.records[0].title, "second seen");
    }

    #[test]
    fn no_duplicate_identities_survive_aggregation() {
        let outcomes = vec![
            ok(
                "a",
                vec![
                    listing("A", "1", "2099-01-01T00:00:00+00:00"),
                    listing("A", "1", "2099-01-02T00:00:00+00:00"),
                    listing("A", "2", "2099-01-01T00:00:00+00:00"),
                ],
            ),
            ok("b", vec![listing("B", "1", "2099-01-01T00:00:00+00:00")]),
        ];
        let summary = aggregate(outcomes, FilterMode::FutureOnly, today());
        let mut identities: Vec<(String, String)> = summary
            .records
            .iter()
            .map(|l| (l.source.clone(), l.id.clone()))
            .collect();
        identities.sort();
        identities.dedup();
        assert_eq!(identities.len(), summary.records.len());
        assert_eq!(summary.records.len(), 3);
    }
}
