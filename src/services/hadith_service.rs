use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::warn;

const EDITION: &str = "eng-bukhari";
const TOTAL_HADITH: u32 = 7000;

#[derive(Debug, Serialize, Clone)]
pub struct DailyHadith {
    pub text: String,
    pub book: String,
    pub number: i64,
}

#[derive(Debug, Deserialize)]
struct HadithEntry {
    text: Option<String>,
    hadithnumber: Option<serde_json::Number>,
}

#[derive(Debug, Deserialize)]
struct HadithMetadata {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct HadithResponse {
    hadiths: Option<Vec<HadithEntry>>,
    metadata: Option<HadithMetadata>,
}

/// Everyone sees the same hadith on a given day; the day of year walks
/// through the collection.
pub fn daily_hadith_number(date: NaiveDate) -> u32 {
    (date.ordinal() % TOTAL_HADITH) + 1
}

fn api_base() -> String {
    std::env::var("HADITH_API_URL").unwrap_or_else(|_| {
        "https://cdn.jsdelivr.net/gh/fawazahmed0/hadith-api@1".to_string()
    })
}

pub async fn fetch_daily_hadith(date: NaiveDate) -> Result<DailyHadith, ()> {
    let number = daily_hadith_number(date);
    let base = api_base();
    let base = base.trim_end_matches('/');
    let client = reqwest::Client::new();

    // The CDN serves minified files for most numbers; fall back to the
    // plain file when the minified one is missing.
    let urls = [
        format!("{}/editions/{}/{}.min.json", base, EDITION, number),
        format!("{}/editions/{}/{}.json", base, EDITION, number),
    ];

    let mut last_status = None;
    for url in &urls {
        let resp = match client.get(url).send().await {
            Ok(r) => r,
            Err(e) => {
                warn!("📖 Hadith upstream unreachable: {}", e);
                return Err(());
            }
        };
        if !resp.status().is_success() {
            last_status = Some(resp.status());
            continue;
        }

        let parsed: HadithResponse = match resp.json().await {
            Ok(data) => data,
            Err(e) => {
                warn!("📖 Hadith upstream JSON parse failed: {}", e);
                return Err(());
            }
        };

        return parse_hadith(parsed, number).ok_or(());
    }

    if let Some(status) = last_status {
        warn!("📖 Hadith upstream non-OK: {}", status);
    }
    Err(())
}

fn parse_hadith(resp: HadithResponse, fallback_number: u32) -> Option<DailyHadith> {
    let entry = resp.hadiths?.into_iter().next()?;
    let text = entry.text.filter(|t| !t.trim().is_empty())?;
    let number = entry
        .hadithnumber
        .and_then(|n| n.as_i64())
        .unwrap_or(fallback_number as i64);
    let book = resp
        .metadata
        .and_then(|m| m.name)
        .unwrap_or_else(|| "Sahih al-Bukhari".to_string());

    Some(DailyHadith { text, book, number })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn number_follows_day_of_year() {
        let jan1 = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        assert_eq!(daily_hadith_number(jan1), 2);

        let aug24 = NaiveDate::from_ymd_opt(2026, 8, 24).unwrap();
        assert_eq!(daily_hadith_number(aug24), 237);
    }

    #[test]
    fn number_stays_in_collection_bounds() {
        for year in [2025, 2026, 2028] {
            for day in [1, 100, 365] {
                let date = NaiveDate::from_yo_opt(year, day).unwrap();
                let n = daily_hadith_number(date);
                assert!((1..=TOTAL_HADITH).contains(&n));
            }
        }
    }

    #[test]
    fn parse_takes_first_entry() {
        let resp: HadithResponse = serde_json::from_str(
            r#"{
              "metadata": {"name": "Sahih al-Bukhari"},
              "hadiths": [
                {"hadithnumber": 237, "text": "The reward of deeds depends upon the intentions."}
              ]
            }"#,
        )
        .unwrap();
        let hadith = parse_hadith(resp, 237).unwrap();
        assert_eq!(hadith.number, 237);
        assert_eq!(hadith.book, "Sahih al-Bukhari");
        assert!(hadith.text.contains("intentions"));
    }

    #[test]
    fn parse_rejects_empty_payloads() {
        let resp: HadithResponse = serde_json::from_str(r#"{"hadiths": []}"#).unwrap();
        assert!(parse_hadith(resp, 1).is_none());

        let resp: HadithResponse =
            serde_json::from_str(r#"{"hadiths": [{"hadithnumber": 5, "text": "  "}]}"#).unwrap();
        assert!(parse_hadith(resp, 5).is_none());
    }
}
