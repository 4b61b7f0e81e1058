use sqlx::SqlitePool;

const SQL_VERIFY: &str = r#"
SELECT admin_id FROM admins
WHERE admin_id = ? AND password = ?
"#;

pub async fn verify_credentials(
    pool: &SqlitePool,
    admin_id: &str,
    password: &str,
) -> sqlx::Result<Option<String>> {
    let row: Option<(String,)> = sqlx::query_as(SQL_VERIFY)
        .bind(admin_id)
        .bind(password)
        .fetch_optional(pool)
        .await?;
    Ok(row.map(|(id,)| id))
}

const SQL_UPSERT_ADMIN: &str = r#"
INSERT INTO admins (admin_id, password)
VALUES (?, ?)
ON CONFLICT(admin_id) DO UPDATE SET password = excluded.password
"#;

pub async fn upsert_admin(pool: &SqlitePool, admin_id: &str, password: &str) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_UPSERT_ADMIN)
        .bind(admin_id)
        .bind(password)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

const SQL_INSERT_SESSION: &str = r#"
INSERT INTO admin_sessions (token, admin_id, created_at)
VALUES (?, ?, ?)
"#;

pub async fn insert_session(
    pool: &SqlitePool,
    token: &str,
    admin_id: &str,
    created_at: &str,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_INSERT_SESSION)
        .bind(token)
        .bind(admin_id)
        .bind(created_at)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

const SQL_LOAD_SESSION: &str = r#"
SELECT admin_id FROM admin_sessions
WHERE token = ?
"#;

pub async fn load_session(pool: &SqlitePool, token: &str) -> sqlx::Result<Option<String>> {
    let row: Option<(String,)> = sqlx::query_as(SQL_LOAD_SESSION)
        .bind(token)
        .fetch_optional(pool)
        .await?;
    Ok(row.map(|(id,)| id))
}

const SQL_DELETE_SESSION: &str = r#"
DELETE FROM admin_sessions WHERE token = ?
"#;

pub async fn delete_session(pool: &SqlitePool, token: &str) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_DELETE_SESSION)
        .bind(token)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}
