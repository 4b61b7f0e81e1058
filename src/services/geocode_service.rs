use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Debug, Serialize, Clone)]
pub struct LocationResult {
    pub display_name: String,
    pub latitude: f64,
    pub longitude: f64,
}

// Nominatim returns coordinates as strings.
#[derive(Debug, Deserialize)]
struct NominatimHit {
    display_name: Option<String>,
    lat: Option<String>,
    lon: Option<String>,
}

pub async fn search_locations(q: &str, limit: usize) -> Result<Vec<LocationResult>, ()> {
    let q = q.trim();
    if q.len() < 2 {
        return Ok(Vec::new());
    }

    let limit = limit.clamp(1, 20);
    let base_url = std::env::var("NOMINATIM_URL")
        .unwrap_or_else(|_| "https://nominatim.openstreetmap.org".to_string());
    let url = format!("{}/search", base_url.trim_end_matches('/'));
    let client = reqwest::Client::new();

    let resp = match client
        .get(&url)
        .query(&[("q", q), ("format", "json"), ("limit", &limit.to_string())])
        // Nominatim's usage policy requires an identifying User-Agent.
        .header("User-Agent", "masjid-finder/0.1")
        .send()
        .await
    {
        Ok(r) => r,
        Err(e) => {
            warn!("📍 Geocoding upstream unreachable: {}", e);
            return Err(());
        }
    };

    if !resp.status().is_success() {
        warn!("📍 Geocoding upstream non-OK: {}", resp.status());
        return Err(());
    }

    let hits: Vec<NominatimHit> = match resp.json().await {
        Ok(data) => data,
        Err(e) => {
            warn!("📍 Geocoding upstream JSON parse failed: {}", e);
            return Err(());
        }
    };

    Ok(parse_hits(hits))
}

fn parse_hits(hits: Vec<NominatimHit>) -> Vec<LocationResult> {
    hits.into_iter()
        .filter_map(|hit| {
            let latitude = hit.lat?.parse().ok()?;
            let longitude = hit.lon?.parse().ok()?;
            Some(LocationResult {
                display_name: hit.display_name.unwrap_or_default(),
                latitude,
                longitude,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_keeps_hits_with_valid_coordinates() {
        let hits: Vec<NominatimHit> = serde_json::from_str(
            r#"[
              {"display_name": "Hyderabad, Telangana, India", "lat": "17.3850", "lon": "78.4866"},
              {"display_name": "Broken", "lat": "not-a-number", "lon": "78.0"},
              {"display_name": "Missing"}
            ]"#,
        )
        .unwrap();

        let results = parse_hits(hits);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].display_name, "Hyderabad, Telangana, India");
        assert!((results[0].latitude - 17.385).abs() < 1e-4);
    }
}
