use sqlx::SqlitePool;

const SQL_INSERT: &str = r#"
INSERT INTO phone_requests (phone_number, requested_at)
VALUES (?, ?)
"#;

pub async fn insert(pool: &SqlitePool, phone_number: &str, requested_at: &str) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_INSERT)
        .bind(phone_number)
        .bind(requested_at)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

const SQL_COUNT_SINCE: &str = r#"
SELECT COUNT(*)
FROM phone_requests
WHERE phone_number = ?
  AND datetime(requested_at) >= datetime(?)
"#;

/// How many requests a phone number has made since `since` (RFC 3339).
pub async fn count_since(pool: &SqlitePool, phone_number: &str, since: &str) -> sqlx::Result<i64> {
    let (count,): (i64,) = sqlx::query_as(SQL_COUNT_SINCE)
        .bind(phone_number)
        .bind(since)
        .fetch_one(pool)
        .await?;
    Ok(count)
}
