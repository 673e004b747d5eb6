//! Mega Leilões - property search listing with per-lot detail pages.

use crate::media;
use crate::model::Listing;
use crate::net;
use crate::retry::RetryPolicy;
use crate::sources::{br_date_to_rfc3339, element_text};
use crate::traits::{FetchError, ListingSource};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use scraper::{Html, Selector};
use std::collections::BTreeSet;
use std::path::Path;

const SOURCE: &str = "Mega Leilões";
const BASE_URL: &str = "https://www.megaleiloes.com.br";

static LOT_LINK: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a.productLink").expect("lot link selector"));
static LOT_TITLE: Lazy<Selector> =
    Lazy::new(|| Selector::parse("h1.product-title").expect("lot title selector"));
static LOT_DATE: Lazy<Selector> = Lazy::new(|| Selector::parse(".date").expect("date selector"));
static LOT_PRICE: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".price").expect("price selector"));
static LOT_IMG: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".fotorama__active img").expect("image selector"));
static RE_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d{2}/\d{2}/\d{4}").expect("date regex"));

/// Lot URLs from the search page. A set keeps them unique and ordered.
fn parse_lot_urls(html: &str) -> BTreeSet<String> {
    let document = Html::parse_document(html);
    document
        .select(&LOT_LINK)
        .filter_map(|a| a.value().attr("href"))
        .map(|href| format!("{BASE_URL}{href}"))
        .collect()
}

struct Lot {
    title: String,
    date_text: String,
    price: String,
    photo_url: Option<String>,
}

/// Extracts one lot's fields from its detail page. Pages without a title
/// or date block are not property lots and are skipped, as are lots whose
/// date block carries no dd/mm/yyyy date yet.
fn parse_lot(html: &str) -> Option<Lot> {
    let document = Html::parse_document(html);

    let title = document.select(&LOT_TITLE).next()?;
    let date_box = document.select(&LOT_DATE).next()?;
    let date_text = RE_DATE
        .find(&element_text(&date_box))?
        .as_str()
        .to_string();

    let price = document
        .select(&LOT_PRICE)
        .next()
        .map(|el| element_text(&el))
        .unwrap_or_else(|| "N/A".to_string());
    let photo_url = document
        .select(&LOT_IMG)
        .next()
        .and_then(|img| img.value().attr("src"))
        .filter(|src| !src.is_empty())
        .map(str::to_string);

    Some(Lot {
        title: element_text(&title),
        date_text,
        price,
        photo_url,
    })
}

pub struct MegaLeiloesSource {
    client: Client,
    retry: RetryPolicy,
}

impl MegaLeiloesSource {
    pub fn new(client: Client, retry: RetryPolicy) -> Self {
        Self { client, retry }
    }
}

#[async_trait]
impl ListingSource for MegaLeiloesSource {
    fn name(&self) -> &str {
        "mega_leiloes"
    }

    async fn fetch(&self, media_dir: &Path) -> Result<Vec<Listing>, FetchError> {
        // TipoImovel=1 restricts the search to real estate.
        let list_url = format!("{BASE_URL}/busca?TipoImovel=1");
        let html = net::get_text(&self.client, &self.retry, &list_url).await?;
        let lot_urls = parse_lot_urls(&html);

        let mut listings = Vec::with_capacity(lot_urls.len());
        for lot_url in lot_urls {
            let lot_html = net::get_text(&self.client, &self.retry, &lot_url).await?;
            let Some(lot) = parse_lot(&lot_html) else {
                continue;
            };
            let scheduled_at = br_date_to_rfc3339(&lot.date_text)?;
            let media_path = match &lot.photo_url {
                Some(url) => {
                    media::cache_photo(&self.client, &self.retry, url, media_dir).await?
                }
                None => String::new(),
            };
            listings.push(Listing {
                source: SOURCE.to_string(),
                id: lot_url.rsplit('/').next().unwrap_or_default().to_string(),
                title: lot.title,
                scheduled_at,
                location: String::new(),
                price: lot.price,
                media_path,
                url: lot_url,
            });
        }
        Ok(listings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_page_yields_unique_lot_urls() {
        let page = r#"
            <a class="productLink" href="/imoveis/casa-123"></a>
            <a class="productLink" href="/imoveis/apto-456"></a>
            <a class="productLink" href="/imoveis/casa-123"></a>"#;
        let urls = parse_lot_urls(page);
        assert_eq!(urls.len(), 2);
        assert!(urls.contains("https://www.megaleiloes.com.br/imoveis/casa-123"));
    }

    #[test]
    fn lot_page_fields_are_extracted() {
        let page = r#"
            <h1 class="product-title">Casa em Santos</h1>
            <div class="date">1º leilão: 10/05/2027 14:00</div>
            <div class="price">R$ 480.000,00</div>
            <div class="fotorama__active"><img src="https://cdn.megaleiloes.com.br/img/casa.jpg"></div>"#;
        let lot = parse_lot(page).unwrap();
        assert_eq!(lot.title, "Casa em Santos");
        assert_eq!(lot.date_text, "10/05/2027");
        assert_eq!(lot.price, "R$ 480.000,00");
        assert_eq!(
            lot.photo_url.as_deref(),
            Some("https://cdn.megaleiloes.com.br/img/casa.jpg")
        );
    }

    #[test]
    fn lot_without_date_is_skipped() {
        let page = r#"<h1 class="product-title">Casa</h1><div class="date">em breve</div>"#;
        assert!(parse_lot(page).is_none());
    }

    #[test]
    fn missing_price_defaults_to_na() {
        let page = r#"<h1 class="product-title">Casa</h1><div class="date">01/01/2028</div>"#;
        let lot = parse_lot(page).unwrap();
        assert_eq!(lot.price, "N/A");
        assert!(lot.photo_url.is_none());
    }
}
