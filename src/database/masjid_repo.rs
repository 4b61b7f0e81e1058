use sqlx::SqlitePool;

#[derive(Debug, sqlx::FromRow, Clone)]
pub struct MasjidRow {
    pub masjid_id: String,
    pub name: String,
    pub address: String,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub description: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub facilities: String,
    pub prayer_times: String,
    pub rating: f64,
    pub reviews: i64,
    pub created_by: String,
    pub user_name: Option<String>,
    pub status: String,
    pub created_at: String,
    pub last_updated: Option<String>,
    pub updated_by: Option<String>,
}

const SQL_LIST_ACTIVE: &str = r#"
SELECT
  masjid_id, name, address, phone, website, description,
  latitude, longitude, facilities, prayer_times,
  rating, reviews, created_by, user_name, status,
  created_at, last_updated, updated_by
FROM masjids
WHERE status = 'active'
  AND (
    ? IS NULL
    OR (
      latitude BETWEEN ? AND ?
      AND longitude BETWEEN ? AND ?
    )
  )
ORDER BY datetime(created_at) ASC
"#;

pub async fn list_active(
    pool: &SqlitePool,
    bbox: Option<(f64, f64, f64, f64)>,
) -> sqlx::Result<Vec<MasjidRow>> {
    let (min_lat, max_lat, min_lon, max_lon) = bbox
        .map(|v| (Some(v.0), Some(v.1), Some(v.2), Some(v.3)))
        .unwrap_or((None, None, None, None));

    sqlx::query_as::<_, MasjidRow>(SQL_LIST_ACTIVE)
        .bind(min_lat)
        .bind(min_lat)
        .bind(max_lat)
        .bind(min_lon)
        .bind(max_lon)
        .fetch_all(pool)
        .await
}

const SQL_GET_BY_ID: &str = r#"
SELECT
  masjid_id, name, address, phone, website, description,
  latitude, longitude, facilities, prayer_times,
  rating, reviews, created_by, user_name, status,
  created_at, last_updated, updated_by
FROM masjids
WHERE masjid_id = ?
"#;

pub async fn get_by_id(pool: &SqlitePool, masjid_id: &str) -> sqlx::Result<Option<MasjidRow>> {
    sqlx::query_as::<_, MasjidRow>(SQL_GET_BY_ID)
        .bind(masjid_id)
        .fetch_optional(pool)
        .await
}

const SQL_INSERT_MASJID: &str = r#"
INSERT INTO masjids (
  masjid_id, name, address, phone, website, description,
  latitude, longitude, facilities, prayer_times,
  rating, reviews, created_by, user_name, status, created_at
) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 0, 0, ?, ?, 'active', ?)
"#;

pub struct NewMasjid<'a> {
    pub masjid_id: &'a str,
    pub name: &'a str,
    pub address: &'a str,
    pub phone: Option<&'a str>,
    pub website: Option<&'a str>,
    pub description: Option<&'a str>,
    pub latitude: f64,
    pub longitude: f64,
    pub facilities_json: &'a str,
    pub prayer_times_json: &'a str,
    pub created_by: &'a str,
    pub user_name: Option<&'a str>,
    pub created_at: &'a str,
}

pub async fn insert_masjid(pool: &SqlitePool, masjid: NewMasjid<'_>) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_INSERT_MASJID)
        .bind(masjid.masjid_id)
        .bind(masjid.name)
        .bind(masjid.address)
        .bind(masjid.phone)
        .bind(masjid.website)
        .bind(masjid.description)
        .bind(masjid.latitude)
        .bind(masjid.longitude)
        .bind(masjid.facilities_json)
        .bind(masjid.prayer_times_json)
        .bind(masjid.created_by)
        .bind(masjid.user_name)
        .bind(masjid.created_at)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

const SQL_UPDATE_RATING: &str = r#"
UPDATE masjids
SET rating = ?, reviews = reviews + 1
WHERE masjid_id = ?
"#;

/// Overwrites the rating and bumps the review count (last write wins).
pub async fn update_rating(pool: &SqlitePool, masjid_id: &str, rating: f64) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_UPDATE_RATING)
        .bind(rating)
        .bind(masjid_id)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

const SQL_UPDATE_PRAYER_TIMES: &str = r#"
UPDATE masjids
SET prayer_times = ?, last_updated = ?, updated_by = ?
WHERE masjid_id = ?
"#;

pub async fn update_prayer_times(
    pool: &SqlitePool,
    masjid_id: &str,
    prayer_times_json: &str,
    last_updated: &str,
    updated_by: &str,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_UPDATE_PRAYER_TIMES)
        .bind(prayer_times_json)
        .bind(last_updated)
        .bind(updated_by)
        .bind(masjid_id)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

#[derive(Debug, sqlx::FromRow)]
pub struct ContributionRow {
    pub name: String,
    pub user_name: Option<String>,
    pub created_by: String,
    pub created_at: String,
}

const SQL_LIST_CONTRIBUTIONS: &str = r#"
SELECT name, user_name, created_by, created_at
FROM masjids
WHERE status = 'active'
ORDER BY datetime(created_at) ASC
"#;

pub async fn list_contributions(pool: &SqlitePool) -> sqlx::Result<Vec<ContributionRow>> {
    sqlx::query_as::<_, ContributionRow>(SQL_LIST_CONTRIBUTIONS)
        .fetch_all(pool)
        .await
}
