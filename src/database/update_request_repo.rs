use sqlx::SqlitePool;

#[derive(Debug, sqlx::FromRow, Clone)]
pub struct UpdateRequestRow {
    pub request_id: String,
    pub masjid_id: String,
    pub masjid_name: String,
    pub name: Option<String>,
    pub phone_number: String,
    pub current_times: String,
    pub requested_times: String,
    pub reason: Option<String>,
    pub status: String,
    pub created_at: String,
    pub processed_at: Option<String>,
}

const SQL_INSERT_REQUEST: &str = r#"
INSERT INTO update_requests (
  request_id, masjid_id, masjid_name, name, phone_number,
  current_times, requested_times, reason, status, created_at
) VALUES (?, ?, ?, ?, ?, ?, ?, ?, 'pending', ?)
"#;

pub struct NewUpdateRequest<'a> {
    pub request_id: &'a str,
    pub masjid_id: &'a str,
    pub masjid_name: &'a str,
    pub name: Option<&'a str>,
    pub phone_number: &'a str,
    pub current_times_json: &'a str,
    pub requested_times_json: &'a str,
    pub reason: Option<&'a str>,
    pub created_at: &'a str,
}

pub async fn insert_request(pool: &SqlitePool, req: NewUpdateRequest<'_>) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_INSERT_REQUEST)
        .bind(req.request_id)
        .bind(req.masjid_id)
        .bind(req.masjid_name)
        .bind(req.name)
        .bind(req.phone_number)
        .bind(req.current_times_json)
        .bind(req.requested_times_json)
        .bind(req.reason)
        .bind(req.created_at)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

const SQL_LIST_ALL: &str = r#"
SELECT
  request_id, masjid_id, masjid_name, name, phone_number,
  current_times, requested_times, reason, status, created_at, processed_at
FROM update_requests
ORDER BY datetime(created_at) DESC
"#;

pub async fn list_all(pool: &SqlitePool) -> sqlx::Result<Vec<UpdateRequestRow>> {
    sqlx::query_as::<_, UpdateRequestRow>(SQL_LIST_ALL)
        .fetch_all(pool)
        .await
}

const SQL_GET_BY_ID: &str = r#"
SELECT
  request_id, masjid_id, masjid_name, name, phone_number,
  current_times, requested_times, reason, status, created_at, processed_at
FROM update_requests
WHERE request_id = ?
"#;

pub async fn get_by_id(pool: &SqlitePool, request_id: &str) -> sqlx::Result<Option<UpdateRequestRow>> {
    sqlx::query_as::<_, UpdateRequestRow>(SQL_GET_BY_ID)
        .bind(request_id)
        .fetch_optional(pool)
        .await
}

const SQL_SET_STATUS: &str = r#"
UPDATE update_requests
SET status = ?, processed_at = ?
WHERE request_id = ? AND status = 'pending'
"#;

/// Marks a pending request approved or rejected. Returns 0 rows when the
/// request was already processed, which callers treat as a conflict.
pub async fn set_status(
    pool: &SqlitePool,
    request_id: &str,
    status: &str,
    processed_at: &str,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_SET_STATUS)
        .bind(status)
        .bind(processed_at)
        .bind(request_id)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}
