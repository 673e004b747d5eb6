//! JUCERJA - auction notices from the RJ commercial registry's RSS feed.

use crate::model::Listing;
use crate::net;
use crate::retry::RetryPolicy;
use crate::traits::{FetchError, ListingSource};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use quick_xml::de::from_str;
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;
use std::path::Path;

const SOURCE: &str = "JUCERJA";
const BASE_URL: &str = "https://www.jucerja.rj.gov.br";

static RE_PRICE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"R\$ ?[\d\.]+,\d{2}").expect("price regex"));

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    items: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    title: String,
    link: String,
    #[serde(rename = "pubDate")]
    pub_date: String,
}

/// Keeps gazette items that announce an auction ("leilão"/"leilões") and
/// normalizes their publication date to UTC.
fn parse_feed(xml: &str) -> Result<Vec<Listing>, FetchError> {
    let rss: Rss = from_str(xml).map_err(|e| FetchError::Parse(format!("gazette rss: {e}")))?;

    let mut listings = Vec::new();
    for item in rss.channel.items {
        let title = item.title.trim().to_string();
        if !title.to_lowercase().contains("leil") {
            continue;
        }

        let scheduled_at = DateTime::parse_from_rfc2822(item.pub_date.trim())
            .map_err(|e| FetchError::Parse(format!("bad pubDate '{}': {e}", item.pub_date)))?
            .with_timezone(&Utc)
            .to_rfc3339();
        let price = RE_PRICE
            .find(&title)
            .map(|m| m.as_str().to_string())
            .unwrap_or_else(|| "N/A".to_string());
        let link = item.link.trim().to_string();

        listings.push(Listing {
            source: SOURCE.to_string(),
            id: link.rsplit('/').next().unwrap_or_default().to_string(),
            title,
            scheduled_at,
            location: "RJ".to_string(),
            price,
            media_path: String::new(),
            url: link,
        });
    }
    Ok(listings)
}

pub struct JucerjaSource {
    client: Client,
    retry: RetryPolicy,
}

impl JucerjaSource {
    pub fn new(client: Client, retry: RetryPolicy) -> Self {
        Self { client, retry }
    }
}

#[async_trait]
impl ListingSource for JucerjaSource {
    fn name(&self) -> &str {
        "jucerja"
    }

    async fn fetch(&self, _media_dir: &Path) -> Result<Vec<Listing>, FetchError> {
        let rss_url = format!("{BASE_URL}/rss/diarioempresarial.xml");
        let xml = net::get_text(&self.client, &self.retry, &rss_url).await?;
        parse_feed(&xml)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
        <rss version="2.0">
          <channel>
            <title>Diário Empresarial</title>
            <link>https://www.jucerja.rj.gov.br</link>
            <item>
              <title>Edital de leilão judicial - lance mínimo R$ 35.000,00</title>
              <link>https://www.jucerja.rj.gov.br/diario/aviso/8812</link>
              <pubDate>Mon, 10 May 2027 09:00:00 -0300</pubDate>
            </item>
            <item>
              <title>Registro de alteração contratual</title>
              <link>https://www.jucerja.rj.gov.br/diario/aviso/8813</link>
              <pubDate>Mon, 10 May 2027 09:05:00 -0300</pubDate>
            </item>
          </channel>
        </rss>"#;

    #[test]
    fn only_auction_notices_are_kept() {
        let listings = parse_feed(FEED).unwrap();
        assert_eq!(listings.len(), 1);
        let listing = &listings[0];
        assert_eq!(listing.id, "8812");
        assert_eq!(listing.location, "RJ");
        assert_eq!(listing.price, "R$ 35.000,00");
        // -03:00 publication time normalized to UTC.
        assert_eq!(listing.scheduled_at, "2027-05-10T12:00:00+00:00");
    }

    #[test]
    fn notice_without_a_price_defaults_to_na() {
        let feed = FEED.replace("- lance mínimo R$ 35.000,00", "");
        let listings = parse_feed(&feed).unwrap();
        assert_eq!(listings[0].price, "N/A");
    }

    #[test]
    fn malformed_feed_is_a_parse_error() {
        assert!(matches!(
            parse_feed("<html>not rss</html>"),
            Err(FetchError::Parse(_))
        ));
    }
}
