use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};

/// One harvested auction listing, normalized across all sources.
///
/// Listings are created by source adapters and never mutated afterwards;
/// the orchestrator only filters and sequences them. Identity for
/// deduplication is the (`source`, `id`) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listing {
    /// Display name of the originating source (e.g., "Zukerman", "TJPI").
    pub source: String,
    /// Source-local identifier of the lot.
    pub id: String,
    /// Human-readable description of the lot.
    pub title: String,
    /// Auction date, RFC 3339 in UTC. May hold an unparseable value when the
    /// source published one; the filter keeps such records (see harvest).
    pub scheduled_at: String,
    /// Region or city, free text. Empty when the source does not publish it.
    pub location: String,
    /// Currency-formatted price text, e.g. "R$ 120.000,00" or "N/A".
    pub price: String,
    /// Relative path to the cached photo under the data directory, or empty.
    pub media_path: String,
    /// Canonical URL of the lot at the source.
    pub url: String,
}

impl Listing {
    /// Deduplication key: listings sharing this pair are the same lot.
    pub fn identity(&self) -> (&str, &str) {
        (&self.source, &self.id)
    }

    /// UTC calendar date of the auction, or `None` when `scheduled_at`
    /// does not parse as RFC 3339.
    pub fn scheduled_date(&self) -> Option<NaiveDate> {
        DateTime::parse_from_rfc3339(&self.scheduled_at)
            .ok()
            .map(|dt| dt.naive_utc().date())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Listing {
        Listing {
            source: "Zukerman".to_string(),
            id: "12345".to_string(),
            title: "Apartamento 2 quartos".to_string(),
            scheduled_at: "2026-09-10T00:00:00+00:00".to_string(),
            location: String::new(),
            price: "R$ 120.000,00".to_string(),
            media_path: "photos/12345.jpg".to_string(),
            url: "https://www.zukerman.com.br/lote-12345".to_string(),
        }
    }

    #[test]
    fn identity_is_source_and_id() {
        let listing = sample();
        assert_eq!(listing.identity(), ("Zukerman", "12345"));
    }

    #[test]
    fn scheduled_date_parses_rfc3339() {
        let listing = sample();
        assert_eq!(
            listing.scheduled_date(),
            NaiveDate::from_ymd_opt(2026, 9, 10)
        );
    }

    #[test]
    fn scheduled_date_is_none_for_garbage() {
        let mut listing = sample();
        listing.scheduled_at = "em breve".to_string();
        assert_eq!(listing.scheduled_date(), None);
    }

    #[test]
    fn listing_serializes_with_all_fields() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["source"], "Zukerman");
        assert_eq!(json["price"], "R$ 120.000,00");
        assert_eq!(json["media_path"], "photos/12345.jpg");
    }
}
