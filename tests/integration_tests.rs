use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::routing::{get, post};
use axum::Router;
use tower::ServiceExt;

use coffeespot::config::AppConfig;
use coffeespot::db;
use coffeespot::handlers;
use coffeespot::services::availability::OperatingWindow;
use coffeespot::services::snapshot::SnapshotFeed;
use coffeespot::services::storage::{FileStore, StoredFile};
use coffeespot::state::AppState;

// ── Mock file storage ──

struct MockFileStore {
    stored: Arc<Mutex<Vec<String>>>,
}

impl MockFileStore {
    fn new() -> Self {
        Self {
            stored: Arc::new(Mutex::new(vec![])),
        }
    }
}

#[async_trait]
impl FileStore for MockFileStore {
    async fn store(&self, file_name: &str, _bytes: &[u8]) -> anyhow::Result<StoredFile> {
        let path = format!("agreements/{file_name}");
        self.stored.lock().unwrap().push(path.clone());
        Ok(StoredFile {
            url: format!("http://test/files/{path}"),
            path,
        })
    }

    async fn delete(&self, path: &str) -> anyhow::Result<()> {
        self.stored.lock().unwrap().retain(|p| p != path);
        Ok(())
    }
}

// ── Helpers ──

fn test_config() -> AppConfig {
    AppConfig {
        port: 3000,
        database_url: ":memory:".to_string(),
        admin_password: "test-password".to_string(),
        storage_dir: "storage".to_string(),
        public_base_url: "http://test".to_string(),
        open_hour: 10,
        close_hour: 22,
    }
}

fn test_state() -> Arc<AppState> {
    let conn = db::init_db(":memory:").unwrap();
    let snapshots = SnapshotFeed::new();
    snapshots.refresh(&conn).unwrap();

    Arc::new(AppState {
        db: Arc::new(Mutex::new(conn)),
        config: test_config(),
        files: Box::new(MockFileStore::new()),
        snapshots,
        window: OperatingWindow::default(),
    })
}

/// State whose snapshot feed never received the initial load.
fn loading_state() -> Arc<AppState> {
    let conn = db::init_db(":memory:").unwrap();
    Arc::new(AppState {
        db: Arc::new(Mutex::new(conn)),
        config: test_config(),
        files: Box::new(MockFileStore::new()),
        snapshots: SnapshotFeed::new(),
        window: OperatingWindow::default(),
    })
}

fn test_app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health))
        .route("/api/catalog", get(handlers::bookings::get_catalog))
        .route("/api/availability", get(handlers::bookings::get_availability))
        .route("/api/bookings", post(handlers::bookings::create_booking))
        .route("/api/admin/login", post(handlers::admin::login))
        .route("/api/admin/logout", post(handlers::admin::logout))
        .route("/api/admin/bookings", get(handlers::admin::get_bookings))
        .route("/api/admin/bookings/:id", get(handlers::admin::get_booking))
        .route("/calendar/:booking_id", get(handlers::calendar::download_ics))
        .with_state(state)
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

const BOUNDARY: &str = "test-boundary";

fn multipart_body(fields: &[(&str, &str)], file: Option<(&str, &[u8])>) -> Body {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((file_name, bytes)) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"agreement\"; filename=\"{file_name}\"\r\nContent-Type: application/pdf\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    Body::from(body)
}

fn booking_request(fields: &[(&str, &str)], file: Option<(&str, &[u8])>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/bookings")
        .header(
            "Content-Type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(multipart_body(fields, file))
        .unwrap()
}

fn standard_fields<'a>(date: &'a str, start: &'a str, end: &'a str) -> Vec<(&'a str, &'a str)> {
    vec![
        ("gender", "men"),
        ("category_id", "10cups"),
        ("date", date),
        ("start_time", start),
        ("end_time", end),
        ("name", "Khalid"),
        ("phone", "+97455501234"),
        ("address", "Villa 9, Pearl Street"),
        ("zone", "4"),
        ("street", "Pearl Street"),
        ("building_number", "9"),
    ]
}

async fn submit(app: &Router, date: &str, start: &str, end: &str) -> axum::response::Response {
    app.clone()
        .oneshot(booking_request(
            &standard_fields(date, start, end),
            Some(("signed.pdf", b"%PDF-1.4")),
        ))
        .await
        .unwrap()
}

async fn login(app: &Router) -> String {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/admin/login")
                .header("Content-Type", "application/json")
                .body(Body::from(r#"{"password":"test-password"}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await["token"].as_str().unwrap().to_string()
}

// ── Tests ──

#[tokio::test]
async fn test_health() {
    let app = test_app(test_state());
    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_catalog_for_men_hides_restricted_categories() {
    let app = test_app(test_state());
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/catalog?gender=men")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let entries = body_json(response).await;
    let ids: Vec<&str> = entries
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids.len(), 8);
    assert!(!ids.contains(&"iceCreamServings"));
}

#[tokio::test]
async fn test_catalog_ice_cream_choice_collapses_list() {
    let app = test_app(test_state());
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/catalog?gender=women&ice_cream=true&lang=ar")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let entries = body_json(response).await;
    let entries = entries.as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["id"], "iceCreamServings");
    assert_eq!(entries[0]["label"], "باقة الآيس كريم");
    assert_eq!(entries[0]["quantity_label"], "15 حصة");
}

#[tokio::test]
async fn test_catalog_rejects_unknown_gender() {
    let app = test_app(test_state());
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/catalog?gender=robots")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_availability_on_empty_day() {
    let app = test_app(test_state());
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/availability?date=2025-07-01&category=10cups")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["duration_hours"], 2);
    let slots = body["slots"].as_array().unwrap();
    assert_eq!(slots.len(), 11);
    assert_eq!(slots[0]["startTime"], "10:00");
    assert_eq!(slots[0]["endTime"], "12:00");
    assert_eq!(slots[10]["startTime"], "20:00");
}

#[tokio::test]
async fn test_availability_unknown_category() {
    let app = test_app(test_state());
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/availability?date=2025-07-01&category=9000cups")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_booking_flow_end_to_end() {
    let state = test_state();
    let app = test_app(Arc::clone(&state));

    let response = submit(&app, "2025-07-01", "14:00", "16:00").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["ok"], true);
    let booking_id = body["booking_id"].as_str().unwrap().to_string();

    // The booked interval disappears from availability
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/availability?date=2025-07-01&category=10cups")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let body = body_json(response).await;
    let starts: Vec<&str> = body["slots"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["startTime"].as_str().unwrap())
        .collect();
    assert!(!starts.contains(&"13:00"));
    assert!(!starts.contains(&"14:00"));
    assert!(!starts.contains(&"15:00"));
    assert!(starts.contains(&"12:00"));
    assert!(starts.contains(&"16:00"));

    // Other dates are unaffected
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/availability?date=2025-07-02&category=10cups")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["slots"].as_array().unwrap().len(), 11);

    // Admin sees the booking in the day view
    let token = login(&app).await;
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/admin/bookings?date=2025-07-01")
                .header("Authorization", format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bookings = body_json(response).await;
    let bookings = bookings.as_array().unwrap().clone();
    assert_eq!(bookings.len(), 1);
    assert_eq!(bookings[0]["id"], booking_id.as_str());
    assert_eq!(bookings[0]["customer_name"], "Khalid");
    assert_eq!(bookings[0]["cup_category"]["id"], "10cups");
}

#[tokio::test]
async fn test_double_booking_rejected() {
    let app = test_app(test_state());

    let response = submit(&app, "2025-07-01", "14:00", "16:00").await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = submit(&app, "2025-07-01", "14:00", "16:00").await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = submit(&app, "2025-07-01", "15:00", "17:00").await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // Boundary-touching slot goes through
    let response = submit(&app, "2025-07-01", "16:00", "18:00").await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_loading_snapshot_fails_safe() {
    let app = test_app(loading_state());

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/availability?date=2025-07-01&category=10cups")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let body = body_json(response).await;
    assert!(body["slots"].as_array().unwrap().is_empty());

    let response = submit(&app, "2025-07-01", "10:00", "12:00").await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_booking_validation_errors() {
    let app = test_app(test_state());

    // Bad phone
    let mut fields = standard_fields("2025-07-01", "10:00", "12:00");
    for field in fields.iter_mut() {
        if field.0 == "phone" {
            field.1 = "123";
        }
    }
    let response = app
        .clone()
        .oneshot(booking_request(&fields, Some(("signed.pdf", b"%PDF"))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Missing agreement file
    let fields = standard_fields("2025-07-01", "10:00", "12:00");
    let response = app
        .clone()
        .oneshot(booking_request(&fields, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Slot length doesn't match the 2h package
    let response = submit(&app, "2025-07-01", "10:00", "13:00").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Women-only package refused for men
    let mut fields = standard_fields("2025-07-01", "10:00", "11:00");
    for field in fields.iter_mut() {
        if field.0 == "category_id" {
            field.1 = "iceCreamServings";
        }
    }
    let response = app
        .clone()
        .oneshot(booking_request(&fields, Some(("signed.pdf", b"%PDF"))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_admin_auth_lifecycle() {
    let app = test_app(test_state());

    // Wrong password
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/admin/login")
                .header("Content-Type", "application/json")
                .body(Body::from(r#"{"password":"Lavie@coffee!12345"}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // No token
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/admin/bookings")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Valid session
    let token = login(&app).await;
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/admin/bookings")
                .header("Authorization", format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Logout revokes it
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/admin/logout")
                .header("Authorization", format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/admin/bookings")
                .header("Authorization", format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_booking_detail_and_ics() {
    let app = test_app(test_state());

    let response = submit(&app, "2025-07-01", "10:00", "12:00").await;
    let booking_id = body_json(response).await["booking_id"]
        .as_str()
        .unwrap()
        .to_string();

    let token = login(&app).await;
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/api/admin/bookings/{booking_id}"))
                .header("Authorization", format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let booking = body_json(response).await;
    assert_eq!(booking["start_time"], "10:00");
    assert_eq!(booking["agreement_file_name"], "signed.pdf");

    // .ics export
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/calendar/{booking_id}.ics"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let ics = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(ics.contains("DTSTART:20250701T100000"));
    assert!(ics.contains("DTEND:20250701T120000"));

    // Unknown id
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/calendar/not-a-booking")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_ice_cream_booking_for_women() {
    let app = test_app(test_state());

    let fields = vec![
        ("gender", "women"),
        ("ice_cream", "true"),
        ("category_id", "iceCreamServings"),
        ("date", "2025-07-01"),
        ("start_time", "18:00"),
        ("end_time", "19:00"),
        ("lang", "ar"),
        ("name", "Maryam"),
        ("phone", "+97455512345"),
        ("address", "Villa 7"),
        ("zone", "61"),
        ("street", "Al Waab"),
        ("building_number", "7"),
    ];
    let response = app
        .clone()
        .oneshot(booking_request(&fields, Some(("عقد.pdf", b"%PDF"))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["message"], "تم تأكيد حجزك ليوم 2025-07-01 الساعة 18:00.");
}
