use axum::{
    middleware,
    response::Redirect,
    routing::{get, get_service, post},
    Router,
};
use dotenvy::dotenv;
use http::header::{HeaderValue, CACHE_CONTROL};
use sqlx::sqlite::SqlitePoolOptions;
use std::env;
use std::net::SocketAddr;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;

use masjid_finder::database::{admin_repo, schema};
use masjid_finder::web::middleware::auth as auth_middleware;
use masjid_finder::web::routes::{admin, hadith, leaderboard, location, masjids, requests};

#[tokio::main]
async fn main() {
    dotenv().ok();

    tracing_subscriber::fmt::init();

    let db_url = env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://masjid_finder.db".to_string());
    println!("Connecting to database: {}", db_url);

    let pool = SqlitePoolOptions::new()
        .connect(&db_url)
        .await
        .expect("Could not connect to the database");

    schema::init(&pool)
        .await
        .expect("Could not initialise the database schema");

    // Bootstrap admin credentials from the environment on first start.
    if let (Ok(admin_id), Ok(password)) = (env::var("ADMIN_ID"), env::var("ADMIN_PASSWORD")) {
        admin_repo::upsert_admin(&pool, &admin_id, &password)
            .await
            .expect("Could not seed admin account");
        println!("🔑 Admin account '{}' is ready", admin_id);
    }

    // Admin console and admin API behind one session check
    let protected_routes = Router::new()
        .route("/admin", get(admin::dashboard))
        .route("/admin/requests/:request_id", post(admin::process_request))
        .route("/admin/logout", post(admin::logout_handler))
        .route("/api/admin/notifications", get(admin::list_notifications))
        .layer(middleware::from_fn_with_state(
            pool.clone(),
            auth_middleware::require_admin,
        ));

    let app = Router::new()
        // Public routes
        .route("/", get(|| async { Redirect::to("/assets/") }))
        .route("/admin/login", get(admin::login_page).post(admin::login_handler))
        .route(
            "/api/masjids",
            get(masjids::list_masjids).post(masjids::create_masjid),
        )
        .route("/api/masjids/:masjid_id", get(masjids::get_masjid))
        .route("/api/masjids/:masjid_id/rating", post(masjids::rate_masjid))
        .route(
            "/api/masjids/:masjid_id/update-request",
            post(requests::submit_update_request),
        )
        .route("/api/leaderboard", get(leaderboard::get_leaderboard))
        .route("/api/hadith/daily", get(hadith::daily_hadith))
        .route("/api/location/search", get(location::search_locations))
        // Protected routes
        .merge(protected_routes)
        // Static files
        .nest_service(
            "/assets",
            get_service(ServeDir::new("assets")).layer(SetResponseHeaderLayer::if_not_present(
                CACHE_CONTROL,
                HeaderValue::from_static("no-store"),
            )),
        )
        // Layers
        .layer(SetResponseHeaderLayer::if_not_present(
            CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        .layer(CatchPanicLayer::new())
        // State
        .with_state(pool);

    // Start the server (with fallback port)
    let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port: u16 = env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3000);
    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .expect("Could not parse host/port");

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            eprintln!(
                "⚠️  Could not bind {}: {}. Trying fallback {}:{}",
                addr,
                e,
                host,
                port + 1
            );
            let fallback: SocketAddr = format!("{}:{}", host, port + 1)
                .parse()
                .expect("Could not parse fallback address");
            tokio::net::TcpListener::bind(fallback)
                .await
                .expect("Could not bind fallback port")
        }
    };

    let bound_addr = listener.local_addr().expect("No local address");
    println!("🚀 Server running on http://{}", bound_addr);
    println!("🕌 Dashboard at http://{}/assets/", bound_addr);
    println!("📍 Admin console at http://{}/admin", bound_addr);

    axum::serve(listener, app).await.expect("Server error");
}
