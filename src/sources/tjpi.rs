//! TJPI - Piauí court auction portal (ASP.NET results grid).

use crate::media;
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

const SOURCE: &str = "TJPI";
const BASE_URL: &str = "https://www2.tjpi.jus.br";
const LIST_PATH: &str = "/leiloes/LeiloesJudiciais.aspx";

static ROW: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("table#ctl00_cphConteudo_gdvLeiloes tr[class^='linha']").expect("row selector")
});
static CELL: Lazy<Selector> = Lazy::new(|| Selector::parse("td").expect("cell selector"));
static LINK: Lazy<Selector> = Lazy::new(|| Selector::parse("a").expect("link selector"));
static IMG: Lazy<Selector> = Lazy::new(|| Selector::parse("img").expect("img selector"));

struct Row {
    id: String,
    title: String,
    date_text: String,
    price: String,
    city: String,
    url: String,
    photo_url: Option<String>,
}

/// Grid columns: lot id, description (with link and thumbnail), auction
/// date, price, city. Rows with fewer cells are grid chrome and skipped.
fn parse_rows(html: &str) -> Vec<Row> {
    let document = Html::parse_document(html);
    let mut rows = Vec::new();

    for row in document.select(&ROW) {
        let cells: Vec<_> = row.select(&CELL).collect();
        if cells.len() < 6 {
            continue;
        }

        let url = cells[1]
            .select(&LINK)
            .next()
            .and_then(|a| a.value().attr("href"))
            .map(|href| format!("{BASE_URL}{href}"))
            .unwrap_or_else(|| format!("{BASE_URL}{LIST_PATH}"));
        let photo_url = cells[1]
            .select(&IMG)
            .next()
            .and_then(|img| img.value().attr("src"))
            .map(|src| format!("{BASE_URL}{src}"));

        rows.push(Row {
            id: element_text(&cells[0]),
            title: element_text(&cells[1]),
            date_text: element_text(&cells[2]),
            price: element_text(&cells[3]),
            city: element_text(&cells[4]),
            url,
            photo_url,
        });
    }
    rows
}

pub struct TjpiSource {
    client: Client,
    retry: RetryPolicy,
}

impl TjpiSource {
    pub fn new(client: Client, retry: RetryPolicy) -> Self {
        Self { client, retry }
    }
}

#[async_trait]
impl ListingSource for TjpiSource {
    fn name(&self) -> &str {
        "tjpi"
    }

    async fn fetch(&self, media_dir: &Path) -> Result<Vec<Listing>, FetchError> {
        let list_url = format!("{BASE_URL}{LIST_PATH}");
        let html = net::get_text(&self.client, &self.retry, &list_url).await?;
        let rows = parse_rows(&html);

        let mut listings = Vec::with_capacity(rows.len());
        for row in rows {
            let scheduled_at = br_date_to_rfc3339(&row.date_text)?;
            let media_path = match &row.photo_url {
                Some(url) => {
                    media::cache_photo(&self.client, &self.retry, url, media_dir).await?
                }
                None => String::new(),
            };
            listings.push(Listing {
                source: SOURCE.to_string(),
                id: row.id,
                title: row.title,
                scheduled_at,
                location: row.city,
                price: row.price,
                media_path,
                url: row.url,
            });
        }
        Ok(listings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <table id="ctl00_cphConteudo_gdvLeiloes">
          <tr class="cabecalho"><td>Lote</td></tr>
          <tr class="linha1">
            <td>2027-044</td>
            <td><a href="/leiloes/lote.aspx?id=44">Fazenda em Teresina</a>
                <img src="/leiloes/fotos/44.jpg"></td>
            <td>22/07/2027</td>
            <td>R$ 1.200.000,00</td>
            <td>Teresina</td>
            <td>1ª praça</td>
          </tr>
          <tr class="linha2">
            <td colspan="6">sem lotes nesta página</td>
          </tr>
        </table>"#;

    #[test]
    fn grid_rows_are_extracted() {
        let rows = parse_rows(PAGE);
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.id, "2027-044");
        assert_eq!(row.title, "Fazenda em Teresina");
        assert_eq!(row.date_text, "22/07/2027");
        assert_eq!(row.city, "Teresina");
        assert_eq!(row.url, "https://www2.tjpi.jus.br/leiloes/lote.aspx?id=44");
        assert_eq!(
            row.photo_url.as_deref(),
            Some("https://www2.tjpi.jus.br/leiloes/fotos/44.jpg")
        );
    }

    #[test]
    fn header_and_short_rows_are_skipped() {
        let rows = parse_rows("<table id=\"ctl00_cphConteudo_gdvLeiloes\"><tr class=\"cabecalho\"><td>x</td></tr></table>");
        assert!(rows.is_empty());
    }
}
