//! Generic court-auction table source.
//!
//! Most state court portals publish the same four-column table (lot id,
//! description, date, price); a concrete portal is an instance of
//! [`TribunalSource`] with its endpoints filled in. The shipped
//! `_tribunal_template` instance is the unfilled placeholder; the registry
//! skips it at discovery time.

use crate::model::Listing;
use crate::net;
use crate::retry::RetryPolicy;
use crate::sources::{br_date_to_rfc3339, element_text};
use crate::traits::{FetchError, ListingSource};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use reqwest::Client;
use scraper::{Html, Selector};
use std::path::Path;

static ROW: Lazy<Selector> = Lazy::new(|| Selector::parse("table tr").expect("row selector"));
static CELL: Lazy<Selector> = Lazy::new(|| Selector::parse("td").expect("cell selector"));

struct Row {
    id: String,
    title: String,
    date_text: String,
    price: String,
}

fn parse_rows(html: &str) -> Vec<Row> {
    let document = Html::parse_document(html);
    let mut rows = Vec::new();
    for row in document.select(&ROW) {
        let cells: Vec<_> = row.select(&CELL).collect();
        if cells.len() < 4 {
            continue;
        }
        rows.push(Row {
            id: element_text(&cells[0]),
            title: element_text(&cells[1]),
            date_text: element_text(&cells[2]),
            price: element_text(&cells[3]),
        });
    }
    rows
}

pub struct TribunalSource {
    name: String,
    uf: String,
    list_url: String,
    client: Client,
    retry: RetryPolicy,
}

impl TribunalSource {
    /// A configured court portal, e.g. `new("PR", "https://...", client, retry)`.
    pub fn new(uf: &str, list_url: &str, client: Client, retry: RetryPolicy) -> Self {
        Self {
            name: format!("tribunal_{}", uf.to_lowercase()),
            uf: uf.to_uppercase(),
            list_url: list_url.to_string(),
            client,
            retry,
        }
    }

    /// The unfilled placeholder shipped with the registry.
    pub fn template(client: Client, retry: RetryPolicy) -> Self {
        Self {
            name: "_tribunal_template".to_string(),
            uf: "UF".to_string(),
            list_url: String::new(),
            client,
            retry,
        }
    }
}

#[async_trait]
impl ListingSource for TribunalSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_configured(&self) -> bool {
        !self.list_url.is_empty() && !self.list_url.contains("TODO")
    }

    async fn fetch(&self, _media_dir: &Path) -> Result<Vec<Listing>, FetchError> {
        let html = net::get_text(&self.client, &self.retry, &self.list_url).await?;
        let rows = parse_rows(&html);

        let mut listings = Vec::with_capacity(rows.len());
        for row in rows {
            let scheduled_at = br_date_to_rfc3339(&row.date_text)?;
            listings.push(Listing {
                source: format!("TJ{}", self.uf),
                id: row.id,
                title: row.title,
                scheduled_at,
                location: self.uf.clone(),
                price: row.price,
                media_path: String::new(),
                url: self.list_url.clone(),
            });
        }
        Ok(listings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn four_column_rows_are_extracted() {
        let page = r#"
            <table>
              <tr><th>Lote</th><th>Descrição</th><th>Data</th><th>Valor</th></tr>
              <tr><td>12</td><td>Casa no litoral</td><td>15/09/2027</td><td>R$ 300.000,00</td></tr>
            </table>"#;
        let rows = parse_rows(page);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, "12");
        assert_eq!(rows[0].title, "Casa no litoral");
        assert_eq!(rows[0].date_text, "15/09/2027");
        assert_eq!(rows[0].price, "R$ 300.000,00");
    }

    #[test]
    fn template_instance_is_unconfigured_and_reserved() {
        let client = net::build_client().unwrap();
        let template = TribunalSource::template(client, RetryPolicy::default());
        assert!(template.name().starts_with('_'));
        assert!(!template.is_configured());
    }

    #[test]
    fn configured_instance_reports_its_state_name() {
        let client = net::build_client().unwrap();
        let source = TribunalSource::new(
            "pr",
            "https://leiloes.tjpr.example/lista",
            client,
            RetryPolicy::default(),
        );
        assert_eq!(source.name(), "tribunal_pr");
        assert!(source.is_configured());
    }
}
