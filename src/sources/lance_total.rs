//! Lance Total - property card listing.

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

const SOURCE: &str = "Lance Total";
const BASE_URL: &str = "https://www.lancetotal.com.br";

static CARD: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".card-imovel").expect("card selector"));
static LINK: Lazy<Selector> = Lazy::new(|| Selector::parse("a").expect("link selector"));
static TITLE: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".card-title").expect("title selector"));
static DATE: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".leilao-data").expect("date selector"));
static BID: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".valor-lance").expect("bid selector"));
static APPRAISAL: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".valor-avaliacao").expect("appraisal selector"));
static IMG: Lazy<Selector> = Lazy::new(|| Selector::parse("img").expect("img selector"));

struct Card {
    id: String,
    url: String,
    title: String,
    date_text: String,
    price: String,
    photo_url: Option<String>,
}

fn parse_cards(html: &str) -> Result<Vec<Card>, FetchError> {
    let document = Html::parse_document(html);
    let mut cards = Vec::new();

    for card in document.select(&CARD) {
        let Some(link) = card.select(&LINK).next() else {
            continue;
        };
        let href = link.value().attr("href").unwrap_or_default();
        if href.is_empty() {
            continue;
        }

        let title = card
            .select(&TITLE)
            .next()
            .map(|el| element_text(&el))
            .ok_or_else(|| FetchError::Parse("property card without title".into()))?;
        let date_text = card
            .select(&DATE)
            .next()
            .map(|el| element_text(&el))
            .ok_or_else(|| FetchError::Parse("property card without auction date".into()))?;

        // Current bid when the auction is open, appraisal value otherwise.
        let price = card
            .select(&BID)
            .next()
            .or_else(|| card.select(&APPRAISAL).next())
            .map(|el| element_text(&el))
            .unwrap_or_else(|| "N/A".to_string());

        let photo_url = card
            .select(&IMG)
            .next()
            .and_then(|img| {
                img.value()
                    .attr("data-src")
                    .or_else(|| img.value().attr("src"))
            })
            .filter(|src| !src.is_empty())
            .map(|src| {
                if src.starts_with('/') {
                    format!("{BASE_URL}{src}")
                } else {
                    src.to_string()
                }
            });

        cards.push(Card {
            id: href.rsplit('/').next().unwrap_or_default().to_string(),
            url: format!("{BASE_URL}{href}"),
            title,
            date_text,
            price,
            photo_url,
        });
    }
    Ok(cards)
}

pub struct LanceTotalSource {
    client: Client,
    retry: RetryPolicy,
}

impl LanceTotalSource {
    pub fn new(client: Client, retry: RetryPolicy) -> Self {
        Self { client, retry }
    }
}

#[async_trait]
impl ListingSource for LanceTotalSource {
    fn name(&self) -> &str {
        "lance_total"
    }

    async fn fetch(&self, media_dir: &Path) -> Result<Vec<Listing>, FetchError> {
        let list_url = format!("{BASE_URL}/leiloes/imoveis");
        let html = net::get_text(&self.client, &self.retry, &list_url).await?;
        let cards = parse_cards(&html)?;

        let mut listings = Vec::with_capacity(cards.len());
        for card in cards {
            let scheduled_at = br_date_to_rfc3339(&card.date_text)?;
            let media_path = match &card.photo_url {
                Some(url) => {
                    media::cache_photo(&self.client, &self.retry, url, media_dir).await?
                }
                None => String::new(),
            };
            listings.push(Listing {
                source: SOURCE.to_string(),
                id: card.id,
                title: card.title,
                scheduled_at,
                location: String::new(),
                price: card.price,
                media_path,
                url: card.url,
            });
        }
        Ok(listings)
    }
}
