use std::sync::{Arc, Mutex};

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use coffeespot::config::AppConfig;
use coffeespot::db;
use coffeespot::handlers;
use coffeespot::services::availability::OperatingWindow;
use coffeespot::services::snapshot::SnapshotFeed;
use coffeespot::services::storage::LocalFileStore;
use coffeespot::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();
    anyhow::ensure!(
        config.open_hour < config.close_hour,
        "BOOKING_OPEN_HOUR must be before BOOKING_CLOSE_HOUR"
    );

    let conn = db::init_db(&config.database_url)?;

    let files = LocalFileStore::new(&config.storage_dir, &config.public_base_url);

    // Deliver the initial full snapshot before serving; until this runs
    // the feed is in its loading state and every slot reads as booked.
    let snapshots = SnapshotFeed::new();
    snapshots.refresh(&conn)?;

    let window = OperatingWindow {
        open_hour: config.open_hour,
        close_hour: config.close_hour,
    };

    let state = Arc::new(AppState {
        db: Arc::new(Mutex::new(conn)),
        config: config.clone(),
        files: Box::new(files),
        snapshots,
        window,
    });

    let app = Router::new()
        .route("/health", get(handlers::health::health))
        .route("/api/catalog", get(handlers::bookings::get_catalog))
        .route("/api/availability", get(handlers::bookings::get_availability))
        .route("/api/bookings", post(handlers::bookings::create_booking))
        .route("/api/bookings/events", get(handlers::bookings::events_stream))
        .route("/api/admin/login", post(handlers::admin::login))
        .route("/api/admin/logout", post(handlers::admin::logout))
        .route("/api/admin/bookings", get(handlers::admin::get_bookings))
        .route("/api/admin/bookings/:id", get(handlers::admin::get_booking))
        .route("/calendar/:booking_id", get(handlers::calendar::download_ics))
        .layer(DefaultBodyLimit::max(10 * 1024 * 1024))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
