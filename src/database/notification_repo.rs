use sqlx::SqlitePool;

#[derive(Debug, sqlx::FromRow, Clone)]
pub struct NotificationRow {
    pub notification_id: String,
    pub kind: String,
    pub title: String,
    pub message: String,
    pub masjid_id: Option<String>,
    pub is_read: i64,
    pub created_at: String,
}

const SQL_INSERT: &str = r#"
INSERT INTO admin_notifications (
  notification_id, kind, title, message, masjid_id, is_read, created_at
) VALUES (?, ?, ?, ?, ?, 0, ?)
"#;

pub struct NewNotification<'a> {
    pub notification_id: &'a str,
    pub kind: &'a str,
    pub title: &'a str,
    pub message: &'a str,
    pub masjid_id: Option<&'a str>,
    pub created_at: &'a str,
}

pub async fn insert(pool: &SqlitePool, note: NewNotification<'_>) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_INSERT)
        .bind(note.notification_id)
        .bind(note.kind)
        .bind(note.title)
        .bind(note.message)
        .bind(note.masjid_id)
        .bind(note.created_at)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

const SQL_LIST_UNREAD: &str = r#"
SELECT notification_id, kind, title, message, masjid_id, is_read, created_at
FROM admin_notifications
WHERE is_read = 0
ORDER BY datetime(created_at) DESC
"#;

pub async fn list_unread(pool: &SqlitePool) -> sqlx::Result<Vec<NotificationRow>> {
    sqlx::query_as::<_, NotificationRow>(SQL_LIST_UNREAD)
        .fetch_all(pool)
        .await
}
