use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use sqlx::SqlitePool;

use crate::database::admin_repo;
use crate::web::error::AppError;

pub const SESSION_COOKIE: &str = "admin_session";

#[derive(Clone, Debug)]
pub struct AdminUser {
    pub id: String,
}

pub fn session_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::COOKIE)
        .and_then(|hv| hv.to_str().ok())
        .and_then(|cookies| {
            cookies
                .split("; ")
                .find(|c| c.starts_with("admin_session="))
                .and_then(|c| c.strip_prefix("admin_session="))
        })
}

pub async fn require_admin(
    State(pool): State<SqlitePool>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = session_token(request.headers()).map(str::to_owned);
    if let Some(token) = token {
        if let Ok(Some(admin_id)) = admin_repo::load_session(&pool, &token).await {
            request.extensions_mut().insert(AdminUser { id: admin_id });
            return next.run(request).await;
        }
    }

    // API callers get a 401, console pages bounce to the login form.
    if request.uri().path().starts_with("/api/") {
        AppError::Unauthorized.into_response()
    } else {
        Redirect::to("/admin/login").into_response()
    }
}
