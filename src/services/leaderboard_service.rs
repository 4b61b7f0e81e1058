use std::collections::HashMap;

use chrono::{DateTime, Datelike, Duration, Utc};
use serde::Serialize;
use sqlx::SqlitePool;

use crate::database::masjid_repo::{self, ContributionRow};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    All,
    Month,
    Week,
}

impl Period {
    pub fn parse(input: Option<&str>) -> Period {
        match input.unwrap_or("all") {
            "month" => Period::Month,
            "week" => Period::Week,
            _ => Period::All,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LeaderboardEntry {
    pub rank: i64,
    pub user_name: String,
    pub count: i64,
    pub masjids: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LeaderboardView {
    pub total_added: i64,
    pub entries: Vec<LeaderboardEntry>,
}

pub async fn load_leaderboard(pool: &SqlitePool, period: Period) -> sqlx::Result<LeaderboardView> {
    let rows = masjid_repo::list_contributions(pool).await?;
    Ok(build_leaderboard(rows, Utc::now(), period))
}

fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

fn in_period(created_at: &str, now: DateTime<Utc>, period: Period) -> bool {
    if period == Period::All {
        return true;
    }
    let Ok(created) = DateTime::parse_from_rfc3339(created_at) else {
        return false;
    };
    let created = created.with_timezone(&Utc);
    match period {
        Period::All => true,
        Period::Month => created.month() == now.month() && created.year() == now.year(),
        Period::Week => created >= now - Duration::days(7),
    }
}

/// Groups contributions by contributor and ranks the top ten.
///
/// A display name shared by several listings is treated as one person, so
/// grouping falls back to the creator id only when a name is unique.
/// Competition ranking: equal counts share a rank and the next distinct
/// count skips past them.
pub fn build_leaderboard(
    rows: Vec<ContributionRow>,
    now: DateTime<Utc>,
    period: Period,
) -> LeaderboardView {
    let rows: Vec<ContributionRow> = rows
        .into_iter()
        .filter(|r| in_period(&r.created_at, now, period))
        .collect();

    let mut name_count: HashMap<String, i64> = HashMap::new();
    for row in &rows {
        if let Some(name) = row.user_name.as_deref().filter(|n| !n.trim().is_empty()) {
            *name_count.entry(normalize_name(name)).or_insert(0) += 1;
        }
    }

    struct Group {
        user_name: String,
        count: i64,
        masjids: Vec<String>,
    }

    // Vec + index map so groups keep first-seen order before the count sort.
    let mut order: Vec<Group> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for row in &rows {
        let trimmed = row.user_name.as_deref().filter(|n| !n.trim().is_empty());
        let key = match trimmed {
            Some(name) if name_count.get(&normalize_name(name)).copied().unwrap_or(0) > 1 => {
                normalize_name(name)
            }
            _ => {
                if row.created_by.is_empty() {
                    normalize_name(trimmed.unwrap_or("anonymous"))
                } else {
                    row.created_by.clone()
                }
            }
        };
        let display_name = trimmed.unwrap_or("Anonymous").to_string();

        let slot = *index.entry(key).or_insert_with(|| {
            order.push(Group {
                user_name: display_name,
                count: 0,
                masjids: Vec::new(),
            });
            order.len() - 1
        });
        order[slot].count += 1;
        order[slot].masjids.push(row.name.clone());
    }

    order.sort_by(|a, b| b.count.cmp(&a.count));
    order.truncate(10);

    let total_added: i64 = order.iter().map(|g| g.count).sum();

    let mut entries: Vec<LeaderboardEntry> = Vec::with_capacity(order.len());
    let mut last_count: Option<i64> = None;
    let mut last_rank: i64 = 0;
    let mut skip: i64 = 1;
    for group in order {
        let rank = if Some(group.count) == last_count {
            skip += 1;
            last_rank
        } else {
            let rank = last_rank + skip;
            last_rank = rank;
            last_count = Some(group.count);
            skip = 1;
            rank
        };
        entries.push(LeaderboardEntry {
            rank,
            user_name: group.user_name,
            count: group.count,
            masjids: group.masjids,
        });
    }

    // Anonymous contributions count toward totals but never appear by name.
    entries.retain(|e| e.user_name.to_lowercase() != "anonymous");

    LeaderboardView {
        total_added,
        entries,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn row(name: &str, user: Option<&str>, by: &str, at: &str) -> ContributionRow {
        ContributionRow {
            name: name.to_string(),
            user_name: user.map(str::to_string),
            created_by: by.to_string(),
            created_at: at.to_string(),
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 24, 12, 0, 0).unwrap()
    }

    #[test]
    fn shared_names_merge_case_insensitively() {
        let rows = vec![
            row("Masjid A", Some("Ayesha"), "uid-1", "2026-08-20T10:00:00+00:00"),
            row("Masjid B", Some("ayesha "), "uid-2", "2026-08-21T10:00:00+00:00"),
            row("Masjid C", Some("Bilal"), "uid-3", "2026-08-22T10:00:00+00:00"),
        ];
        let board = build_leaderboard(rows, now(), Period::All);
        assert_eq!(board.entries.len(), 2);
        assert_eq!(board.entries[0].user_name, "Ayesha");
        assert_eq!(board.entries[0].count, 2);
        assert_eq!(board.entries[0].masjids, vec!["Masjid A", "Masjid B"]);
    }

    #[test]
    fn unique_names_group_by_creator_id() {
        // Same unique name from two different creators stays two entries.
        let rows = vec![
            row("Masjid A", Some("Omar"), "uid-1", "2026-08-20T10:00:00+00:00"),
            row("Masjid B", Some("Zain"), "uid-2", "2026-08-21T10:00:00+00:00"),
            row("Masjid C", None, "uid-2", "2026-08-22T10:00:00+00:00"),
        ];
        let board = build_leaderboard(rows, now(), Period::All);
        let zain = board.entries.iter().find(|e| e.user_name == "Zain").unwrap();
        assert_eq!(zain.count, 2);
    }

    #[test]
    fn competition_ranking_skips_after_ties() {
        let rows = vec![
            row("A1", Some("Alpha"), "u1", "2026-08-20T10:00:00+00:00"),
            row("A2", Some("Alpha"), "u1", "2026-08-20T11:00:00+00:00"),
            row("B1", Some("Beta"), "u2", "2026-08-20T10:00:00+00:00"),
            row("B2", Some("Beta"), "u2", "2026-08-20T11:00:00+00:00"),
            row("C1", Some("Gamma"), "u3", "2026-08-20T10:00:00+00:00"),
        ];
        let board = build_leaderboard(rows, now(), Period::All);
        let ranks: Vec<i64> = board.entries.iter().map(|e| e.rank).collect();
        assert_eq!(ranks, vec![1, 1, 3]);
    }

    #[test]
    fn distinct_counts_rank_sequentially() {
        let mut rows = Vec::new();
        for (user, n) in [("Alpha", 5), ("Beta", 4), ("Gamma", 3)] {
            for j in 0..n {
                rows.push(row(
                    &format!("{}-{}", user, j),
                    Some(user),
                    user,
                    "2026-08-20T10:00:00+00:00",
                ));
            }
        }
        let board = build_leaderboard(rows, now(), Period::All);
        let ranks: Vec<i64> = board.entries.iter().map(|e| e.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3]);
    }

    #[test]
    fn week_period_keeps_last_seven_days_only() {
        let rows = vec![
            row("Fresh", Some("Omar"), "u1", "2026-08-20T10:00:00+00:00"),
            row("Stale", Some("Omar"), "u1", "2026-08-10T10:00:00+00:00"),
        ];
        let board = build_leaderboard(rows, now(), Period::Week);
        assert_eq!(board.total_added, 1);
        assert_eq!(board.entries[0].masjids, vec!["Fresh"]);
    }

    #[test]
    fn month_period_matches_calendar_month() {
        let rows = vec![
            row("August", Some("Omar"), "u1", "2026-08-01T10:00:00+00:00"),
            row("July", Some("Omar"), "u1", "2026-07-31T10:00:00+00:00"),
        ];
        let board = build_leaderboard(rows, now(), Period::Month);
        assert_eq!(board.entries[0].masjids, vec!["August"]);
    }

    #[test]
    fn anonymous_counts_but_is_not_listed() {
        let rows = vec![
            row("A", None, "u1", "2026-08-20T10:00:00+00:00"),
            row("B", Some("Omar"), "u2", "2026-08-21T10:00:00+00:00"),
        ];
        let board = build_leaderboard(rows, now(), Period::All);
        assert_eq!(board.total_added, 2);
        assert_eq!(board.entries.len(), 1);
        assert_eq!(board.entries[0].user_name, "Omar");
    }

    #[test]
    fn top_ten_cutoff() {
        let mut rows = Vec::new();
        for i in 0..12 {
            let user = format!("User{}", i);
            for j in 0..(12 - i) {
                rows.push(row(
                    &format!("M{}-{}", i, j),
                    Some(&user),
                    &format!("u{}", i),
                    "2026-08-20T10:00:00+00:00",
                ));
            }
        }
        let board = build_leaderboard(rows, now(), Period::All);
        assert_eq!(board.entries.len(), 10);
        assert_eq!(board.entries[0].count, 12);
        assert_eq!(board.entries[9].count, 3);
    }
}
