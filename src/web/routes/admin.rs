use askama::Template;
use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap},
    response::{Html, IntoResponse, Redirect, Response},
    Extension, Form, Json,
};
use chrono::Utc;
use cookie::Cookie;
use serde::Deserialize;
use sqlx::SqlitePool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::database::{admin_repo, notification_repo};
use crate::services::update_request_service::{
    self, Decision, DashboardStats, RequestCardView, RequestError,
};
use crate::web::error::AppError;
use crate::web::middleware::auth::{session_token, AdminUser, SESSION_COOKIE};

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub error: String,
}

#[derive(Template)]
#[template(path = "admin.html")]
pub struct AdminDashboardTemplate {
    pub admin_id: String,
    pub notice: String,
    pub filter: String,
    pub search: String,
    pub stats: DashboardStats,
    pub requests: Vec<RequestCardView>,
    pub build_id: &'static str,
}

#[derive(Template)]
#[template(path = "error.html")]
struct ErrorTemplate {
    message: String,
}

fn render_error(message: String) -> Html<String> {
    let template = ErrorTemplate { message };
    Html(template.render().unwrap())
}

pub async fn login_page() -> Html<String> {
    let template = LoginTemplate {
        error: String::new(),
    };
    Html(template.render().unwrap())
}

#[derive(Deserialize)]
pub struct LoginForm {
    admin_id: String,
    password: String,
}

pub async fn login_handler(
    State(pool): State<SqlitePool>,
    Form(form): Form<LoginForm>,
) -> Result<Response, Html<String>> {
    let verified = admin_repo::verify_credentials(&pool, form.admin_id.trim(), &form.password)
        .await
        .map_err(|e| render_error(format!("Login failed: {}", e)))?;

    let Some(admin_id) = verified else {
        warn!("🔒 Failed admin login attempt for '{}'", form.admin_id.trim());
        let template = LoginTemplate {
            error: "Invalid admin ID or password".to_string(),
        };
        return Ok(Html(template.render().unwrap()).into_response());
    };

    let token = Uuid::new_v4().to_string();
    admin_repo::insert_session(&pool, &token, &admin_id, &Utc::now().to_rfc3339())
        .await
        .map_err(|e| render_error(format!("Login failed: {}", e)))?;

    let mut session_cookie = Cookie::new(SESSION_COOKIE, token);
    session_cookie.set_path("/");
    session_cookie.set_http_only(true);
    session_cookie.set_same_site(cookie::SameSite::Lax);

    info!("🔑 Admin '{}' logged in", admin_id);
    let mut response = Redirect::to("/admin").into_response();
    response.headers_mut().append(
        header::SET_COOKIE,
        session_cookie.to_string().parse().unwrap(),
    );
    Ok(response)
}

pub async fn logout_handler(
    State(pool): State<SqlitePool>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    if let Some(token) = session_token(&headers) {
        admin_repo::delete_session(&pool, token).await?;
    }

    let mut expired = Cookie::new(SESSION_COOKIE, "");
    expired.set_path("/");
    expired.set_http_only(true);
    expired.set_max_age(cookie::time::Duration::seconds(0));

    let mut response = Redirect::to("/admin/login").into_response();
    response
        .headers_mut()
        .append(header::SET_COOKIE, expired.to_string().parse().unwrap());
    Ok(response)
}

#[derive(Debug, Deserialize)]
pub struct DashboardQuery {
    filter: Option<String>, // all|pending|approved|rejected
    search: Option<String>,
    notice: Option<String>,
}

pub async fn dashboard(
    State(pool): State<SqlitePool>,
    Extension(admin): Extension<AdminUser>,
    Query(query): Query<DashboardQuery>,
) -> Result<Html<String>, Html<String>> {
    let filter = query.filter.unwrap_or_else(|| "all".to_string());
    let search = query.search.unwrap_or_default();

    let board = update_request_service::load_dashboard(&pool, &filter, &search)
        .await
        .map_err(|e| render_error(format!("Could not load requests: {}", e)))?;

    let template = AdminDashboardTemplate {
        admin_id: admin.id,
        notice: query.notice.unwrap_or_default(),
        filter,
        search,
        stats: board.stats,
        requests: board.requests,
        build_id: env!("MASJIDFINDER_BUILD_ID"),
    };
    Ok(Html(template.render().unwrap()))
}

#[derive(Deserialize)]
pub struct ActionForm {
    action: String, // approve|reject
}

pub async fn process_request(
    State(pool): State<SqlitePool>,
    Path(request_id): Path<String>,
    Form(form): Form<ActionForm>,
) -> Result<Redirect, Html<String>> {
    let Some(decision) = Decision::parse(&form.action) else {
        return Err(render_error(format!("Unknown action '{}'", form.action)));
    };

    match update_request_service::process(&pool, &request_id, decision, Utc::now()).await {
        Ok(()) => {
            let notice = match decision {
                Decision::Approve => "approved",
                Decision::Reject => "rejected",
            };
            info!("✅ Request {} {}", request_id, notice);
            Ok(Redirect::to(&format!("/admin?notice={}", notice)))
        }
        Err(RequestError::AlreadyProcessed) => {
            Ok(Redirect::to("/admin?notice=already-processed"))
        }
        Err(err) => Err(render_error(format!("Could not process request: {}", err))),
    }
}

pub async fn list_notifications(
    State(pool): State<SqlitePool>,
) -> Result<Json<serde_json::Value>, AppError> {
    let notes = notification_repo::list_unread(&pool).await?;
    let items: Vec<serde_json::Value> = notes
        .into_iter()
        .map(|n| {
            serde_json::json!({
                "notification_id": n.notification_id,
                "kind": n.kind,
                "title": n.title,
                "message": n.message,
                "masjid_id": n.masjid_id,
                "created_at": n.created_at,
            })
        })
        .collect();
    Ok(Json(serde_json::json!({ "notifications": items })))
}
