use axum::Json;
use chrono::Local;

use crate::services::hadith_service::{self, DailyHadith};
use crate::web::error::AppError;

pub async fn daily_hadith() -> Result<Json<DailyHadith>, AppError> {
    let today = Local::now().date_naive();
    match hadith_service::fetch_daily_hadith(today).await {
        Ok(hadith) => Ok(Json(hadith)),
        Err(()) => Err(AppError::Upstream),
    }
}
