//! Source adapters, one per auction site or feed.
//!
//! Every adapter implements [`ListingSource`](crate::traits::ListingSource):
//! it fetches its site's listing pages, extracts lots into
//! [`Listing`](crate::model::Listing) values and caches photos under the
//! shared media directory. Parsing is done in synchronous helpers that
//! return owned data, keeping the fetch futures `Send`.

pub mod jucerja;
pub mod lance_total;
pub mod mega_leiloes;
pub mod tjpi;
pub mod tribunal;
pub mod zukerman;

use crate::traits::FetchError;
use chrono::{NaiveDate, NaiveTime};
use scraper::ElementRef;

/// Converts the Brazilian `dd/mm/yyyy` date the sites publish to an
/// RFC 3339 UTC midnight timestamp.
pub(crate) fn br_date_to_rfc3339(text: &str) -> Result<String, FetchError> {
    let date = NaiveDate::parse_from_str(text.trim(), "%d/%m/%Y")
        .map_err(|e| FetchError::Parse(format!("bad auction date '{text}': {e}")))?;
    Ok(date.and_time(NaiveTime::MIN).and_utc().to_rfc3339())
}

/// Concatenated, trimmed text content of an element.
pub(crate) fn element_text(el: &ElementRef) -> String {
    el.text().collect::<String>().trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn brazilian_dates_become_utc_midnight() {
        assert_eq!(
            br_date_to_rfc3339("10/05/2025").unwrap(),
            "2025-05-10T00:00:00+00:00"
        );
        assert_eq!(
            br_date_to_rfc3339(" 25/06/2025 ").unwrap(),
            "2025-06-25T00:00:00+00:00"
        );
    }

    #[test]
    fn bad_dates_are_parse_errors() {
        assert!(matches!(
            br_date_to_rfc3339("em breve"),
            Err(FetchError::Parse(_))
        ));
        assert!(matches!(
            br_date_to_rfc3339("31/02/2025"),
            Err(FetchError::Parse(_))
        ));
    }
}
