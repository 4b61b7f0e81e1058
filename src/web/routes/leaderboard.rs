use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use sqlx::SqlitePool;

use crate::services::leaderboard_service::{self, LeaderboardView, Period};
use crate::web::error::AppError;

#[derive(Debug, Deserialize)]
pub struct LeaderboardQuery {
    period: Option<String>, // all|month|week
}

pub async fn get_leaderboard(
    State(pool): State<SqlitePool>,
    Query(query): Query<LeaderboardQuery>,
) -> Result<Json<LeaderboardView>, AppError> {
    let period = Period::parse(query.period.as_deref());
    let board = leaderboard_service::load_leaderboard(&pool, period).await?;
    Ok(Json(board))
}
