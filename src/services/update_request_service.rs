use chrono::{DateTime, NaiveTime, Utc};
use serde::Deserialize;
use sqlx::SqlitePool;
use tracing::warn;
use uuid::Uuid;

use crate::database::notification_repo::{self, NewNotification};
use crate::database::phone_request_repo;
use crate::database::update_request_repo::{self, NewUpdateRequest, UpdateRequestRow};
use crate::database::masjid_repo;
use crate::models::PrayerTimes;

pub const MAX_REQUESTS_PER_DAY: i64 = 3;
pub const MAX_REASON_LEN: usize = 500;

#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    #[error("please enter a valid phone number")]
    InvalidPhone,
    #[error("reason must be at most {MAX_REASON_LEN} characters")]
    ReasonTooLong,
    #[error("at least one prayer time must differ from the current times")]
    NoChanges,
    #[error("daily request limit reached for this phone number")]
    DailyLimit,
    #[error("masjid not found")]
    MasjidNotFound,
    #[error("update request not found")]
    RequestNotFound,
    #[error("request was already processed")]
    AlreadyProcessed,
    #[error(transparent)]
    Db(#[from] sqlx::Error),
}

/// Phone numbers: optional leading +, then 10 to 15 of digits, spaces,
/// dashes or parentheses.
pub fn is_valid_phone(phone: &str) -> bool {
    let rest = phone.strip_prefix('+').unwrap_or(phone);
    let len = rest.chars().count();
    (10..=15).contains(&len)
        && rest
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '-' | '(' | ')'))
}

#[derive(Debug, Deserialize)]
pub struct UpdateRequestInput {
    pub name: Option<String>,
    pub phone_number: String,
    pub requested_times: PrayerTimes,
    pub reason: Option<String>,
}

/// Files a prayer-time update request for a masjid and pings the admin
/// inbox. The notification is best effort; a failure there must not lose
/// the request itself.
pub async fn submit(
    pool: &SqlitePool,
    masjid_id: &str,
    input: UpdateRequestInput,
    now: DateTime<Utc>,
) -> Result<String, RequestError> {
    let phone = input.phone_number.trim();
    if !is_valid_phone(phone) {
        return Err(RequestError::InvalidPhone);
    }

    let reason = input
        .reason
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());
    if reason.map(|r| r.chars().count()).unwrap_or(0) > MAX_REASON_LEN {
        return Err(RequestError::ReasonTooLong);
    }

    let masjid = masjid_repo::get_by_id(pool, masjid_id)
        .await?
        .ok_or(RequestError::MasjidNotFound)?;

    let current_times: PrayerTimes =
        serde_json::from_str(&masjid.prayer_times).unwrap_or_default();
    if current_times.changed_from(&input.requested_times).is_empty() {
        return Err(RequestError::NoChanges);
    }

    // The limit covers the current UTC day, so it resets at midnight.
    let midnight = now.date_naive().and_time(NaiveTime::MIN).and_utc();
    if phone_request_repo::count_since(pool, phone, &midnight.to_rfc3339()).await?
        >= MAX_REQUESTS_PER_DAY
    {
        return Err(RequestError::DailyLimit);
    }

    let request_id = Uuid::new_v4().to_string();
    let created_at = now.to_rfc3339();
    let current_json = serde_json::to_string(&current_times).unwrap_or_else(|_| "{}".into());
    let requested_json =
        serde_json::to_string(&input.requested_times).unwrap_or_else(|_| "{}".into());

    // Ledger first: a half-failed submission must still count toward the
    // limit rather than under it.
    phone_request_repo::insert(pool, phone, &created_at).await?;

    update_request_repo::insert_request(
        pool,
        NewUpdateRequest {
            request_id: &request_id,
            masjid_id,
            masjid_name: &masjid.name,
            name: input
                .name
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty()),
            phone_number: phone,
            current_times_json: &current_json,
            requested_times_json: &requested_json,
            reason,
            created_at: &created_at,
        },
    )
    .await?;

    let note = NewNotification {
        notification_id: &Uuid::new_v4().to_string(),
        kind: "new_request",
        title: "New Prayer Time Update Request",
        message: &format!("{} - {}", masjid.name, phone),
        masjid_id: Some(masjid_id),
        created_at: &created_at,
    };
    if let Err(err) = notification_repo::insert(pool, note).await {
        warn!("⚠️ failed to record admin notification: {}", err);
    }

    Ok(request_id)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Approve,
    Reject,
}

impl Decision {
    pub fn parse(input: &str) -> Option<Decision> {
        match input {
            "approve" => Some(Decision::Approve),
            "reject" => Some(Decision::Reject),
            _ => None,
        }
    }

    fn status(self) -> &'static str {
        match self {
            Decision::Approve => "approved",
            Decision::Reject => "rejected",
        }
    }
}

/// Approves or rejects a pending request. Approval applies only the prayers
/// the requester actually changed, measured against the times the request
/// captured, so an older snapshot cannot clobber later edits to the rest.
pub async fn process(
    pool: &SqlitePool,
    request_id: &str,
    decision: Decision,
    now: DateTime<Utc>,
) -> Result<(), RequestError> {
    let request = update_request_repo::get_by_id(pool, request_id)
        .await?
        .ok_or(RequestError::RequestNotFound)?;

    if request.status != "pending" {
        return Err(RequestError::AlreadyProcessed);
    }

    let processed_at = now.to_rfc3339();

    if decision == Decision::Approve {
        let masjid = masjid_repo::get_by_id(pool, &request.masjid_id)
            .await?
            .ok_or(RequestError::MasjidNotFound)?;

        let snapshot: PrayerTimes =
            serde_json::from_str(&request.current_times).unwrap_or_default();
        let requested: PrayerTimes =
            serde_json::from_str(&request.requested_times).unwrap_or_default();
        let changed = snapshot.changed_from(&requested);

        if !changed.is_empty() {
            let live: PrayerTimes =
                serde_json::from_str(&masjid.prayer_times).unwrap_or_default();
            let merged = live.with_times_from(&requested, &changed);
            let merged_json = serde_json::to_string(&merged).unwrap_or_else(|_| "{}".into());
            masjid_repo::update_prayer_times(
                pool,
                &request.masjid_id,
                &merged_json,
                &processed_at,
                "admin",
            )
            .await?;
        }
    }

    let rows = update_request_repo::set_status(
        pool,
        request_id,
        decision.status(),
        &processed_at,
    )
    .await?;
    if rows == 0 {
        return Err(RequestError::AlreadyProcessed);
    }

    Ok(())
}

#[derive(Debug, Clone)]
pub struct ChangeView {
    pub prayer: String,
    pub old_time: String,
    pub new_time: String,
}

/// A request pre-formatted for the admin console template.
#[derive(Debug, Clone)]
pub struct RequestCardView {
    pub request_id: String,
    pub masjid_name: String,
    pub submitted_by: String,
    pub phone_number: String,
    pub reason: String,
    pub status: String,
    pub is_pending: bool,
    pub time_ago: String,
    pub changes: Vec<ChangeView>,
}

#[derive(Debug, Clone, Default)]
pub struct DashboardStats {
    pub total: usize,
    pub pending: usize,
    pub approved: usize,
    pub rejected: usize,
}

pub struct Dashboard {
    pub stats: DashboardStats,
    pub requests: Vec<RequestCardView>,
}

pub async fn load_dashboard(
    pool: &SqlitePool,
    filter: &str,
    search: &str,
) -> sqlx::Result<Dashboard> {
    let rows = update_request_repo::list_all(pool).await?;
    Ok(build_dashboard(rows, filter, search, Utc::now()))
}

pub fn build_dashboard(
    rows: Vec<UpdateRequestRow>,
    filter: &str,
    search: &str,
    now: DateTime<Utc>,
) -> Dashboard {
    let mut stats = DashboardStats {
        total: rows.len(),
        ..Default::default()
    };
    for row in &rows {
        match row.status.as_str() {
            "pending" => stats.pending += 1,
            "approved" => stats.approved += 1,
            "rejected" => stats.rejected += 1,
            _ => {}
        }
    }

    let needle = search.trim().to_lowercase();
    let requests = rows
        .into_iter()
        .filter(|r| filter == "all" || r.status == filter)
        .filter(|r| {
            needle.is_empty()
                || r.masjid_name.to_lowercase().contains(&needle)
                || r.phone_number.contains(&needle)
                || r.reason
                    .as_deref()
                    .is_some_and(|reason| reason.to_lowercase().contains(&needle))
        })
        .map(|r| card_view(r, now))
        .collect();

    Dashboard { stats, requests }
}

fn card_view(row: UpdateRequestRow, now: DateTime<Utc>) -> RequestCardView {
    let snapshot: PrayerTimes = serde_json::from_str(&row.current_times).unwrap_or_default();
    let requested: PrayerTimes = serde_json::from_str(&row.requested_times).unwrap_or_default();
    let changes = snapshot
        .changed_from(&requested)
        .into_iter()
        .map(|prayer| ChangeView {
            prayer: prayer.to_string(),
            old_time: snapshot.time_for(prayer).unwrap_or("").to_string(),
            new_time: requested.time_for(prayer).unwrap_or("").to_string(),
        })
        .collect();

    RequestCardView {
        request_id: row.request_id,
        masjid_name: row.masjid_name,
        submitted_by: row.name.unwrap_or_else(|| "Anonymous".to_string()),
        phone_number: row.phone_number,
        reason: row.reason.unwrap_or_default(),
        is_pending: row.status == "pending",
        status: row.status,
        time_ago: time_ago(&row.created_at, now),
        changes,
    }
}

const TIME_AGO_STEPS: [(&str, i64); 6] = [
    ("year", 31_536_000),
    ("month", 2_592_000),
    ("day", 86_400),
    ("hour", 3_600),
    ("minute", 60),
    ("second", 1),
];

pub fn time_ago(created_at: &str, now: DateTime<Utc>) -> String {
    let Ok(created) = DateTime::parse_from_rfc3339(created_at) else {
        return String::new();
    };
    let seconds = (now - created.with_timezone(&Utc)).num_seconds();
    for (label, secs) in TIME_AGO_STEPS {
        let count = seconds / secs;
        if count >= 1 {
            let plural = if count > 1 { "s" } else { "" };
            return format!("{} {}{} ago", count, label, plural);
        }
    }
    "just now".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::masjid_repo::NewMasjid;
    use crate::database::schema;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 24, 12, 0, 0).unwrap()
    }

    async fn seed_masjid(pool: &SqlitePool, id: &str) {
        masjid_repo::insert_masjid(
            pool,
            NewMasjid {
                masjid_id: id,
                name: "Masjid Al-Noor",
                address: "1 Test Street, Hyderabad",
                phone: None,
                website: None,
                description: None,
                latitude: 17.385,
                longitude: 78.486,
                facilities_json: "[]",
                prayer_times_json:
                    r#"{"fajr":"05:30","dhuhr":"12:15","asr":"15:30","maghrib":"18:10","isha":"19:25"}"#,
                created_by: "anon-1",
                user_name: None,
                created_at: "2026-08-01T10:00:00+00:00",
            },
        )
        .await
        .unwrap();
    }

    fn changed_times() -> PrayerTimes {
        PrayerTimes {
            fajr: "05:15".to_string(),
            ..PrayerTimes::default()
        }
    }

    fn input(phone: &str, times: PrayerTimes) -> UpdateRequestInput {
        UpdateRequestInput {
            name: Some("Jawad".to_string()),
            phone_number: phone.to_string(),
            requested_times: times,
            reason: Some("Seasonal change".to_string()),
        }
    }

    #[test]
    fn phone_validation() {
        assert!(is_valid_phone("+91 98765 4321"));
        assert!(is_valid_phone("9876543210"));
        assert!(is_valid_phone("(040) 123-456"));
        assert!(!is_valid_phone("12345"));
        assert!(!is_valid_phone("98765abc43210"));
        assert!(!is_valid_phone("1234567890123456"));
    }

    #[tokio::test]
    async fn submit_records_request_and_notification() {
        let pool = schema::test_pool().await;
        seed_masjid(&pool, "m1").await;

        let id = submit(&pool, "m1", input("9876543210", changed_times()), now())
            .await
            .unwrap();

        let row = update_request_repo::get_by_id(&pool, &id).await.unwrap().unwrap();
        assert_eq!(row.status, "pending");
        assert_eq!(row.masjid_name, "Masjid Al-Noor");

        let notes = notification_repo::list_unread(&pool).await.unwrap();
        assert_eq!(notes.len(), 1);
        assert!(notes[0].message.contains("Masjid Al-Noor"));
    }

    #[tokio::test]
    async fn submit_rejects_unchanged_times() {
        let pool = schema::test_pool().await;
        seed_masjid(&pool, "m1").await;

        let err = submit(&pool, "m1", input("9876543210", PrayerTimes::default()), now())
            .await
            .unwrap_err();
        assert!(matches!(err, RequestError::NoChanges));
    }

    #[tokio::test]
    async fn submit_enforces_daily_phone_limit() {
        let pool = schema::test_pool().await;
        seed_masjid(&pool, "m1").await;

        for _ in 0..3 {
            submit(&pool, "m1", input("9876543210", changed_times()), now())
                .await
                .unwrap();
        }
        let err = submit(&pool, "m1", input("9876543210", changed_times()), now())
            .await
            .unwrap_err();
        assert!(matches!(err, RequestError::DailyLimit));

        // A different number is unaffected.
        submit(&pool, "m1", input("9999999999", changed_times()), now())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn phone_limit_resets_at_utc_midnight() {
        let pool = schema::test_pool().await;
        seed_masjid(&pool, "m1").await;

        let yesterday_evening = Utc.with_ymd_and_hms(2026, 8, 23, 20, 0, 0).unwrap();
        for _ in 0..3 {
            submit(&pool, "m1", input("9876543210", changed_times()), yesterday_evening)
                .await
                .unwrap();
        }

        // Next morning is a new UTC day, so the counter starts over.
        let next_morning = Utc.with_ymd_and_hms(2026, 8, 24, 10, 0, 0).unwrap();
        submit(&pool, "m1", input("9876543210", changed_times()), next_morning)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn submit_records_phone_ledger_row() {
        let pool = schema::test_pool().await;
        seed_masjid(&pool, "m1").await;

        submit(&pool, "m1", input("9876543210", changed_times()), now())
            .await
            .unwrap();

        let count = crate::database::phone_request_repo::count_since(
            &pool,
            "9876543210",
            "2026-08-24T00:00:00+00:00",
        )
        .await
        .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn approve_applies_only_changed_prayers() {
        let pool = schema::test_pool().await;
        seed_masjid(&pool, "m1").await;

        let id = submit(&pool, "m1", input("9876543210", changed_times()), now())
            .await
            .unwrap();

        // Dhuhr moves after the request was filed; approval must keep it.
        let live = PrayerTimes {
            dhuhr: "12:45".to_string(),
            ..PrayerTimes::default()
        };
        masjid_repo::update_prayer_times(
            &pool,
            "m1",
            &serde_json::to_string(&live).unwrap(),
            "2026-08-24T11:00:00+00:00",
            "admin",
        )
        .await
        .unwrap();

        process(&pool, &id, Decision::Approve, now()).await.unwrap();

        let masjid = masjid_repo::get_by_id(&pool, "m1").await.unwrap().unwrap();
        let times: PrayerTimes = serde_json::from_str(&masjid.prayer_times).unwrap();
        assert_eq!(times.fajr, "05:15");
        assert_eq!(times.dhuhr, "12:45");
        assert_eq!(masjid.updated_by.as_deref(), Some("admin"));
        assert!(masjid.last_updated.is_some());

        let row = update_request_repo::get_by_id(&pool, &id).await.unwrap().unwrap();
        assert_eq!(row.status, "approved");
    }

    #[tokio::test]
    async fn reject_leaves_times_untouched() {
        let pool = schema::test_pool().await;
        seed_masjid(&pool, "m1").await;

        let id = submit(&pool, "m1", input("9876543210", changed_times()), now())
            .await
            .unwrap();
        process(&pool, &id, Decision::Reject, now()).await.unwrap();

        let masjid = masjid_repo::get_by_id(&pool, "m1").await.unwrap().unwrap();
        let times: PrayerTimes = serde_json::from_str(&masjid.prayer_times).unwrap();
        assert_eq!(times.fajr, "05:30");

        let err = process(&pool, &id, Decision::Approve, now()).await.unwrap_err();
        assert!(matches!(err, RequestError::AlreadyProcessed));
    }

    #[test]
    fn dashboard_counts_and_filters() {
        let mk = |id: &str, status: &str, phone: &str| UpdateRequestRow {
            request_id: id.to_string(),
            masjid_id: "m1".to_string(),
            masjid_name: "Masjid Al-Noor".to_string(),
            name: None,
            phone_number: phone.to_string(),
            current_times:
                r#"{"fajr":"05:30","dhuhr":"12:15","asr":"15:30","maghrib":"18:10","isha":"19:25"}"#
                    .to_string(),
            requested_times:
                r#"{"fajr":"05:15","dhuhr":"12:15","asr":"15:30","maghrib":"18:10","isha":"19:25"}"#
                    .to_string(),
            reason: None,
            status: status.to_string(),
            created_at: "2026-08-24T10:00:00+00:00".to_string(),
            processed_at: None,
        };

        let rows = vec![
            mk("r1", "pending", "9876543210"),
            mk("r2", "approved", "9999999999"),
            mk("r3", "rejected", "8888888888"),
        ];

        let board = build_dashboard(rows.clone(), "pending", "", now());
        assert_eq!(board.stats.total, 3);
        assert_eq!(board.stats.pending, 1);
        assert_eq!(board.requests.len(), 1);
        assert_eq!(board.requests[0].time_ago, "2 hours ago");
        assert_eq!(board.requests[0].changes.len(), 1);
        assert_eq!(board.requests[0].changes[0].prayer, "fajr");

        let board = build_dashboard(rows, "all", "9999", now());
        assert_eq!(board.requests.len(), 1);
        assert_eq!(board.requests[0].request_id, "r2");
    }

    #[test]
    fn time_ago_steps() {
        let n = now();
        assert_eq!(time_ago("2026-08-24T11:59:59+00:00", n), "1 second ago");
        assert_eq!(time_ago("2026-08-24T11:30:00+00:00", n), "30 minutes ago");
        assert_eq!(time_ago("2026-08-23T12:00:00+00:00", n), "1 day ago");
        assert_eq!(time_ago("not-a-date", n), "");
    }
}
