use chrono::{Local, Timelike, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::database::masjid_repo::{self, MasjidRow, NewMasjid};
use crate::models::PrayerTimes;

#[derive(Debug, Deserialize, Default)]
pub struct MasjidListQuery {
    pub q: Option<String>,
    pub sort: Option<String>, // distance|rating|prayer-time|name
    pub prayer: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub radius_km: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortBy {
    Distance,
    Rating,
    PrayerTime,
    Name,
}

fn parse_sort(input: Option<&str>) -> SortBy {
    match input.unwrap_or("distance") {
        "rating" => SortBy::Rating,
        "prayer-time" => SortBy::PrayerTime,
        "name" => SortBy::Name,
        _ => SortBy::Distance,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PrayerStatusView {
    pub status: String, // active|upcoming
    pub prayer: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minutes_left: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MasjidView {
    pub id: String,
    pub name: String,
    pub address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub facilities: Vec<String>,
    pub prayer_times: PrayerTimes,
    pub rating: f64,
    pub reviews: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prayer_status: Option<PrayerStatusView>,
}

pub async fn build_masjid_list(
    pool: &SqlitePool,
    query: &MasjidListQuery,
) -> sqlx::Result<Vec<MasjidView>> {
    let bbox = match (query.lat, query.lon, query.radius_km) {
        (Some(lat), Some(lon), Some(radius)) => Some(bounding_box(lat, lon, radius)),
        _ => None,
    };

    let rows = masjid_repo::list_active(pool, bbox).await?;
    let now = Local::now();
    let now_min = (now.time().hour() * 60 + now.time().minute()) as i64;
    Ok(build_views(rows, query, now_min))
}

pub async fn load_masjid(pool: &SqlitePool, masjid_id: &str) -> sqlx::Result<Option<MasjidView>> {
    let Some(row) = masjid_repo::get_by_id(pool, masjid_id).await? else {
        return Ok(None);
    };
    let now = Local::now();
    let now_min = (now.time().hour() * 60 + now.time().minute()) as i64;
    Ok(Some(row_to_view(row, now_min)))
}

/// Filters, decorates and sorts the rows. Pure so the ordering rules are
/// testable without a clock or a database.
pub fn build_views(rows: Vec<MasjidRow>, query: &MasjidListQuery, now_min: i64) -> Vec<MasjidView> {
    let needle = query
        .q
        .as_deref()
        .map(|s| s.trim().to_lowercase())
        .unwrap_or_default();
    let sort = parse_sort(query.sort.as_deref());
    let selected_prayer = query.prayer.as_deref().unwrap_or("dhuhr");

    let mut views: Vec<MasjidView> = Vec::new();
    for row in rows {
        if !needle.is_empty()
            && !row.name.to_lowercase().contains(&needle)
            && !row.address.to_lowercase().contains(&needle)
        {
            continue;
        }

        let mut view = row_to_view(row, now_min);

        if let (Some(lat), Some(lon)) = (query.lat, query.lon) {
            let dist = haversine_km(lat, lon, view.latitude, view.longitude);
            if let Some(radius) = query.radius_km {
                if dist > radius {
                    continue;
                }
            }
            view.distance_km = Some(dist);
        }

        views.push(view);
    }

    match sort {
        SortBy::Distance => {
            // Without a caller position there is no distance; keep input order.
            if query.lat.is_some() && query.lon.is_some() {
                views.sort_by(|a, b| {
                    a.distance_km
                        .unwrap_or(f64::MAX)
                        .partial_cmp(&b.distance_km.unwrap_or(f64::MAX))
                        .unwrap_or(std::cmp::Ordering::Equal)
                });
            }
        }
        SortBy::Rating => {
            views.sort_by(|a, b| {
                b.rating
                    .partial_cmp(&a.rating)
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
        }
        SortBy::PrayerTime => {
            views.sort_by(|a, b| {
                let ta = a.prayer_times.time_for(selected_prayer).unwrap_or("00:00");
                let tb = b.prayer_times.time_for(selected_prayer).unwrap_or("00:00");
                ta.cmp(tb)
            });
        }
        SortBy::Name => {
            views.sort_by(|a, b| a.name.cmp(&b.name));
        }
    }

    views
}

fn row_to_view(row: MasjidRow, now_min: i64) -> MasjidView {
    let facilities: Vec<String> = serde_json::from_str(&row.facilities).unwrap_or_default();
    let prayer_times: PrayerTimes =
        serde_json::from_str(&row.prayer_times).unwrap_or_default();
    let prayer_status = prayer_status(&prayer_times, now_min);

    MasjidView {
        id: row.masjid_id,
        name: row.name,
        address: row.address,
        phone: row.phone.filter(|s| !s.trim().is_empty()),
        website: row.website.filter(|s| !s.trim().is_empty()),
        description: row.description.filter(|s| !s.trim().is_empty()),
        latitude: row.latitude,
        longitude: row.longitude,
        facilities,
        prayer_times,
        rating: row.rating,
        reviews: row.reviews,
        user_name: row.user_name.filter(|s| !s.trim().is_empty()),
        distance_km: None,
        prayer_status,
    }
}

pub struct NewMasjidInput {
    pub name: String,
    pub address: String,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub description: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub facilities: Vec<String>,
    pub prayer_times: PrayerTimes,
    pub created_by: Option<String>,
    pub user_name: Option<String>,
}

pub async fn create_masjid(pool: &SqlitePool, input: NewMasjidInput) -> sqlx::Result<MasjidView> {
    let masjid_id = Uuid::new_v4().to_string();
    // Anyone can add; contributors without an id get a fresh anonymous one.
    let created_by = input
        .created_by
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| Uuid::new_v4().to_string());
    let created_at = Utc::now().to_rfc3339();

    let facilities_json = serde_json::to_string(&input.facilities).unwrap_or_else(|_| "[]".into());
    let prayer_times_json = serde_json::to_string(&input.prayer_times)
        .unwrap_or_else(|_| "{}".into());

    masjid_repo::insert_masjid(
        pool,
        NewMasjid {
            masjid_id: &masjid_id,
            name: input.name.trim(),
            address: input.address.trim(),
            phone: input.phone.as_deref().map(str::trim).filter(|s| !s.is_empty()),
            website: input.website.as_deref().map(str::trim).filter(|s| !s.is_empty()),
            description: input
                .description
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty()),
            latitude: input.latitude,
            longitude: input.longitude,
            facilities_json: &facilities_json,
            prayer_times_json: &prayer_times_json,
            created_by: &created_by,
            user_name: input
                .user_name
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty()),
            created_at: &created_at,
        },
    )
    .await?;

    let row = masjid_repo::get_by_id(pool, &masjid_id)
        .await?
        .ok_or(sqlx::Error::RowNotFound)?;
    let now = Local::now();
    let now_min = (now.time().hour() * 60 + now.time().minute()) as i64;
    Ok(row_to_view(row, now_min))
}

pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let to_rad = |deg: f64| deg.to_radians();
    let dlat = to_rad(lat2 - lat1);
    let dlon = to_rad(lon2 - lon1);
    let a = (dlat / 2.0).sin().powi(2)
        + to_rad(lat1).cos() * to_rad(lat2).cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();
    6371.0 * c
}

pub fn bounding_box(lat: f64, lon: f64, radius_km: f64) -> (f64, f64, f64, f64) {
    let lat_change = radius_km / 111.0;
    let lon_change = (radius_km / 111.0) / lat.to_radians().cos().abs();

    (
        lat - lat_change,
        lat + lat_change,
        lon - lon_change,
        lon + lon_change,
    )
}

fn parse_hhmm(time: &str) -> Option<i64> {
    let (h, m) = time.split_once(':')?;
    let h: i64 = h.trim().parse().ok()?;
    let m: i64 = m.trim().parse().ok()?;
    if !(0..24).contains(&h) || !(0..60).contains(&m) {
        return None;
    }
    Some(h * 60 + m)
}

/// A prayer is "upcoming" 1..=30 minutes before its time and "active" within
/// 15 minutes either side. First match in fajr..isha order wins.
pub fn prayer_status(times: &PrayerTimes, now_min: i64) -> Option<PrayerStatusView> {
    for (name, time) in times.daily() {
        let Some(prayer_min) = parse_hhmm(time) else {
            continue;
        };
        let mut diff = prayer_min - now_min;
        // Prayers just after midnight wrap to the next day.
        if diff < -720 {
            diff += 1440;
        }

        if diff > 0 && diff <= 30 {
            return Some(PrayerStatusView {
                status: "upcoming".to_string(),
                prayer: name.to_string(),
                minutes_left: Some(diff),
            });
        }
        if diff.abs() <= 15 {
            return Some(PrayerStatusView {
                status: "active".to_string(),
                prayer: name.to_string(),
                minutes_left: None,
            });
        }
    }
    None
}
