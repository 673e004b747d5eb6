//! Zukerman Leilões - judicial auction card listing.

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

const SOURCE: &str = "Zukerman";
const BASE_URL: &str = "https://www.zukerman.com.br";

static CARD: Lazy<Selector> = Lazy::new(|| Selector::parse(".card").expect("card selector"));
static CARD_LINK: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a.card_produto").expect("card link selector"));
static TITLE: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".titulo-cards").expect("title selector"));
static DATE: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".data-leilao").expect("date selector"));
static PRICE: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".preco-cards").expect("price selector"));
static IMG: Lazy<Selector> = Lazy::new(|| Selector::parse("img").expect("img selector"));

struct Card {
    id: String,
    url: String,
    title: String,
    date_text: String,
    price: String,
    photo_url: Option<String>,
}

/// Extracts lot cards from the listing page. Cards without a lot link are
/// not lots and are skipped; a card missing any required field means the
/// markup changed and the whole page is rejected.
fn parse_cards(html: &str) -> Result<Vec<Card>, FetchError> {
    let document = Html::parse_document(html);
    let mut cards = Vec::new();

    for card in document.select(&CARD) {
        let Some(link) = card.select(&CARD_LINK).next() else {
            continue;
        };
        let href = link.value().attr("href").unwrap_or_default();
        if href.is_empty() {
            continue;
        }
        let id = href.rsplit('-').next().unwrap_or_default().to_string();

        let title = card
            .select(&TITLE)
            .next()
            .map(|el| element_text(&el))
            .ok_or_else(|| FetchError::Parse("lot card without title".into()))?;
        let date_text = card
            .select(&DATE)
            .next()
            .map(|el| element_text(&el))
            .ok_or_else(|| FetchError::Parse("lot card without auction date".into()))?;
        let price = card
            .select(&PRICE)
            .next()
            .map(|el| element_text(&el))
            .ok_or_else(|| FetchError::Parse("lot card without price".into()))?;

        // Photos are lazy-loaded; the real URL sits in data-src.
        let photo_url = card
            .select(&IMG)
            .next()
            .and_then(|img| img.value().attr("data-src"))
            .map(str::to_string);

        cards.push(Card {
            id,
            url: format!("{BASE_URL}{href}"),
            title,
            date_text,
            price,
            photo_url,
        });
    }
    Ok(cards)
}

pub struct ZukermanSource {
    client: Client,
    retry: RetryPolicy,
}

impl ZukermanSource {
    pub fn new(client: Client, retry: RetryPolicy) -> Self {
        Self { client, retry }
    }
}

#[async_trait]
impl ListingSource for ZukermanSource {
    fn name(&self) -> &str {
        "zukerman"
    }

    async fn fetch(&self, media_dir: &Path) -> Result<Vec<Listing>, FetchError> {
        let list_url = format!("{BASE_URL}/index/leiloes-judiciais");
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
