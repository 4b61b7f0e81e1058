use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use sqlx::SqlitePool;
use tracing::info;

use crate::database::masjid_repo;
use crate::models::PrayerTimes;
use crate::services::masjid_service::{self, MasjidListQuery, MasjidView, NewMasjidInput};
use crate::web::error::AppError;

pub async fn list_masjids(
    State(pool): State<SqlitePool>,
    Query(query): Query<MasjidListQuery>,
) -> Result<Json<Vec<MasjidView>>, AppError> {
    let views = masjid_service::build_masjid_list(&pool, &query).await?;
    Ok(Json(views))
}

pub async fn get_masjid(
    State(pool): State<SqlitePool>,
    Path(masjid_id): Path<String>,
) -> Result<Json<MasjidView>, AppError> {
    masjid_service::load_masjid(&pool, &masjid_id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("masjid not found".to_string()))
}

#[derive(Debug, Deserialize)]
pub struct CreateMasjidBody {
    pub name: String,
    pub address: String,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub description: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub facilities: Vec<String>,
    pub prayer_times: Option<PrayerTimes>,
    pub created_by: Option<String>,
    pub user_name: Option<String>,
}

pub async fn create_masjid(
    State(pool): State<SqlitePool>,
    Json(body): Json<CreateMasjidBody>,
) -> Result<(StatusCode, Json<MasjidView>), AppError> {
    if body.name.trim().is_empty() {
        return Err(AppError::Validation("name is required".to_string()));
    }
    if body.address.trim().is_empty() {
        return Err(AppError::Validation("address is required".to_string()));
    }
    if !(-90.0..=90.0).contains(&body.latitude) || !(-180.0..=180.0).contains(&body.longitude) {
        return Err(AppError::Validation(
            "coordinates are out of range".to_string(),
        ));
    }

    let view = masjid_service::create_masjid(
        &pool,
        NewMasjidInput {
            name: body.name,
            address: body.address,
            phone: body.phone,
            website: body.website,
            description: body.description,
            latitude: body.latitude,
            longitude: body.longitude,
            facilities: body.facilities,
            prayer_times: body.prayer_times.unwrap_or_default(),
            created_by: body.created_by,
            user_name: body.user_name,
        },
    )
    .await?;

    info!("🕌 New masjid listed: {} ({})", view.name, view.id);
    Ok((StatusCode::CREATED, Json(view)))
}

#[derive(Debug, Deserialize)]
pub struct RatingBody {
    pub rating: f64,
}

pub async fn rate_masjid(
    State(pool): State<SqlitePool>,
    Path(masjid_id): Path<String>,
    Json(body): Json<RatingBody>,
) -> Result<Json<MasjidView>, AppError> {
    if !(1.0..=5.0).contains(&body.rating) {
        return Err(AppError::Validation(
            "rating must be between 1 and 5".to_string(),
        ));
    }

    let rows = masjid_repo::update_rating(&pool, &masjid_id, body.rating).await?;
    if rows == 0 {
        return Err(AppError::NotFound("masjid not found".to_string()));
    }

    masjid_service::load_masjid(&pool, &masjid_id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("masjid not found".to_string()))
}
