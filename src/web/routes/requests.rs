use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde_json::json;
use sqlx::SqlitePool;
use tracing::info;

use crate::services::update_request_service::{self, UpdateRequestInput};
use crate::web::error::AppError;

pub async fn submit_update_request(
    State(pool): State<SqlitePool>,
    Path(masjid_id): Path<String>,
    Json(body): Json<UpdateRequestInput>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    let request_id =
        update_request_service::submit(&pool, &masjid_id, body, Utc::now()).await?;

    info!("🕐 Update request {} filed for masjid {}", request_id, masjid_id);
    Ok((
        StatusCode::CREATED,
        Json(json!({ "request_id": request_id, "status": "pending" })),
    ))
}
