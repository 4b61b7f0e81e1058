use sqlx::{Executor, SqlitePool};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS masjids (
    masjid_id     TEXT PRIMARY KEY,
    name          TEXT NOT NULL,
    address       TEXT NOT NULL,
    phone         TEXT,
    website       TEXT,
    description   TEXT,
    latitude      REAL NOT NULL,
    longitude     REAL NOT NULL,
    facilities    TEXT NOT NULL DEFAULT '[]',
    prayer_times  TEXT NOT NULL,
    rating        REAL NOT NULL DEFAULT 0,
    reviews       INTEGER NOT NULL DEFAULT 0,
    created_by    TEXT NOT NULL,
    user_name     TEXT,
    status        TEXT NOT NULL DEFAULT 'active',
    created_at    TEXT NOT NULL,
    last_updated  TEXT,
    updated_by    TEXT
);

CREATE TABLE IF NOT EXISTS update_requests (
    request_id       TEXT PRIMARY KEY,
    masjid_id        TEXT NOT NULL,
    masjid_name      TEXT NOT NULL,
    name             TEXT,
    phone_number     TEXT NOT NULL,
    current_times    TEXT NOT NULL,
    requested_times  TEXT NOT NULL,
    reason           TEXT,
    status           TEXT NOT NULL DEFAULT 'pending'
                     CHECK(status IN ('pending','approved','rejected')),
    created_at       TEXT NOT NULL,
    processed_at     TEXT
);

CREATE TABLE IF NOT EXISTS phone_requests (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    phone_number  TEXT NOT NULL,
    requested_at  TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_phone_requests_number
    ON phone_requests (phone_number, requested_at);

CREATE TABLE IF NOT EXISTS admins (
    admin_id  TEXT PRIMARY KEY,
    password  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS admin_sessions (
    token       TEXT PRIMARY KEY,
    admin_id    TEXT NOT NULL,
    created_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS admin_notifications (
    notification_id  TEXT PRIMARY KEY,
    kind             TEXT NOT NULL,
    title            TEXT NOT NULL,
    message          TEXT NOT NULL,
    masjid_id        TEXT,
    is_read          INTEGER NOT NULL DEFAULT 0,
    created_at       TEXT NOT NULL
);
"#;

/// Creates all tables when missing. Safe to run on every startup.
pub async fn init(pool: &SqlitePool) -> sqlx::Result<()> {
    pool.execute(SCHEMA).await?;
    Ok(())
}

#[cfg(test)]
pub async fn test_pool() -> SqlitePool {
    // A single connection keeps every query on the same in-memory database.
    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory sqlite");
    init(&pool).await.expect("schema init");
    pool
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn init_is_idempotent() {
        let pool = test_pool().await;
        init(&pool).await.unwrap();

        let count: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM sqlite_master WHERE type = 'table'")
                .fetch_one(&pool)
                .await
                .unwrap();
        assert!(count.0 >= 6);
    }
}
