//! Output sinks: the final record set as JSON and CSV files.

use crate::model::Listing;
use std::io;
use std::path::Path;
use tracing::info;

/// CSV header, in the same order as the `Listing` fields.
pub const CSV_COLUMNS: [&str; 8] = [
    "source",
    "id",
    "title",
    "scheduled_at",
    "location",
    "price",
    "media_path",
    "url",
];

/// Writes the record set as a pretty-printed JSON array. Non-ASCII text
/// (street names, "Leilão") is written as-is, not escaped.
pub async fn write_json(records: &[Listing], path: &Path) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    info!(path = %path.display(), records = records.len(), "writing JSON dataset");
    let body = serde_json::to_string_pretty(records)
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
    tokio::fs::write(path, body).await
}

/// Writes the record set as UTF-8 CSV with a BOM, one row per listing,
/// columns in [`CSV_COLUMNS`] order. The BOM keeps spreadsheet apps from
/// misreading accented text.
pub async fn write_csv(records: &[Listing], path: &Path) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    info!(path = %path.display(), records = records.len(), "writing CSV dataset");

    let mut out = String::from("\u{feff}");
    out.push_str(&CSV_COLUMNS.join(","));
    out.push('\n');
    for record in records {
        let fields = [
            record.source.as_str(),
            record.id.as_str(),
            record.title.as_str(),
            record.scheduled_at.as_str(),
            record.location.as_str(),
            record.price.as_str(),
            record.media_path.as_str(),
            record.url.as_str(),
        ];
        let row: Vec<String> = fields.iter().map(|f| csv_escape(f)).collect();
        out.push_str(&row.join(","));
        out.push('\n');
    }
    tokio::fs::write(path, out).await
}

fn csv_escape(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_data_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "leilao_sink_{}_{}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .subsec_nanos()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn sample() -> Listing {
        Listing {
            source: "Zukerman".to_string(),
            id: "9912".to_string(),
            title: "Apartamento, 2 quartos \"reformado\"".to_string(),
            scheduled_at: "2027-05-10T00:00:00+00:00".to_string(),
            location: String::new(),
            price: "R$ 250.000,00".to_string(),
            media_path: "photos/9912.jpg".to_string(),
            url: "https://www.zukerman.com.br/lote/9912".to_string(),
        }
    }

    #[test]
    fn fields_with_commas_and_quotes_are_quoted() {
        assert_eq!(csv_escape("R$ 1.000,00"), "\"R$ 1.000,00\"");
        assert_eq!(csv_escape("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(csv_escape("plain"), "plain");
    }

    #[tokio::test]
    async fn csv_has_bom_header_and_one_row_per_record() {
        let dir = temp_data_dir();
        let path = dir.join("auctions.csv");
        write_csv(&[sample()], &path).await.unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with('\u{feff}'));
        let mut lines = content.trim_start_matches('\u{feff}').lines();
        assert_eq!(lines.next().unwrap(), CSV_COLUMNS.join(","));
        let row = lines.next().unwrap();
        assert!(row.starts_with("Zukerman,9912,"));
        assert!(lines.next().is_none());

        std::fs::remove_dir_all(dir).ok();
    }

    #[tokio::test]
    async fn json_round_trips_the_record_set() {
        let dir = temp_data_dir();
        let path = dir.join("auctions.json");
        write_json(&[sample()], &path).await.unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let parsed: Vec<Listing> = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed, vec![sample()]);
        // Accented text is stored readably, not escaped.
        write_json(
            &[Listing {
                title: "Leilão judicial".to_string(),
                ..sample()
            }],
            &path,
        )
        .await
        .unwrap();
        assert!(std::fs::read_to_string(&path).unwrap().contains("Leilão"));

        std::fs::remove_dir_all(dir).ok();
    }
}
