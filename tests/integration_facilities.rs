mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use collegia::config::cors::CorsConfig;
use collegia::config::email::EmailConfig;
use collegia::config::jwt::JwtConfig;
use collegia::config::rate_limit::RateLimitConfig;
use collegia::router::init_router;
use collegia::state::AppState;
use collegia::utils::storage::LocalStorage;
use common::{create_test_account, generate_unique_email};
use http_body_util::BodyExt;
use serde_json::json;
use sqlx::PgPool;
use tower::ServiceExt;
use uuid::Uuid;

async fn setup_test_app(pool: PgPool) -> axum::Router {
    dotenvy::dotenv().ok();
    let state = AppState {
        db: pool.clone(),
        jwt_config: JwtConfig::from_env(),
        email_config: EmailConfig::from_env(),
        cors_config: CorsConfig::from_env(),
        rate_limit_config: RateLimitConfig::from_env(),
        storage: LocalStorage::from_env(),
    };
    init_router(state)
}

async fn get_auth_token(app: axum::Router, email: &str, password: &str) -> String {
    let request = Request::builder()
        .method("POST")
        .uri("/api/auth/login")
        .header("content-type", "application/json")
        .header("x-forwarded-for", "203.0.113.50")
        .body(Body::from(
            serde_json::to_string(&json!({"email": email, "password": password})).unwrap(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
    body["access_token"].as_str().unwrap().to_string()
}

async fn create_facility(pool: &PgPool) -> Uuid {
    sqlx::query_scalar::<_, Uuid>(
        "INSERT INTO facilities (name, capacity) VALUES ($1, 40) RETURNING id",
    )
    .bind(format!("Lab {}", Uuid::new_v4()))
    .fetch_one(pool)
    .await
    .unwrap()
}

fn book_request(
    token: &str,
    facility_id: Uuid,
    date: &str,
    start: &str,
    end: &str,
) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(format!("/api/facilities/{}/book", facility_id))
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {}", token))
        .body(Body::from(
            serde_json::to_string(&json!({
                "booking_date": date,
                "start_time": start,
                "end_time": end,
                "purpose": "Lab session"
            }))
            .unwrap(),
        ))
        .unwrap()
}

#[sqlx::test(migrations = "./migrations")]
async fn test_overlapping_booking_is_rejected(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let email = generate_unique_email();
    create_test_account(&mut tx, &email, "testpass123", "student", None).await;
    tx.commit().await.unwrap();

    let facility = create_facility(&pool).await;

    let app = setup_test_app(pool.clone()).await;
    let token = get_auth_token(app, &email, "testpass123").await;

    // [10:00, 11:00) is free.
    let app = setup_test_app(pool.clone()).await;
    let response = app
        .oneshot(book_request(
            &token,
            facility,
            "2026-09-01",
            "10:00:00",
            "11:00:00",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["status"], "pending");

    // [10:30, 11:30) overlaps the pending booking.
    let app = setup_test_app(pool.clone()).await;
    let response = app
        .oneshot(book_request(
            &token,
            facility,
            "2026-09-01",
            "10:30:00",
            "11:30:00",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // [11:00, 12:00) only touches the boundary and is accepted.
    let app = setup_test_app(pool.clone()).await;
    let response = app
        .oneshot(book_request(
            &token,
            facility,
            "2026-09-01",
            "11:00:00",
            "12:00:00",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    // The same slot on another date is free.
    let app = setup_test_app(pool.clone()).await;
    let response = app
        .oneshot(book_request(
            &token,
            facility,
            "2026-09-02",
            "10:30:00",
            "11:30:00",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_rejected_booking_frees_the_slot(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let student_email = generate_unique_email();
    create_test_account(&mut tx, &student_email, "testpass123", "student", None).await;
    let admin_email = generate_unique_email();
    create_test_account(&mut tx, &admin_email, "testpass123", "admin", None).await;
    tx.commit().await.unwrap();

    let facility = create_facility(&pool).await;

    let app = setup_test_app(pool.clone()).await;
    let student_token = get_auth_token(app, &student_email, "testpass123").await;

    let app = setup_test_app(pool.clone()).await;
    let response = app
        .oneshot(book_request(
            &student_token,
            facility,
            "2026-09-01",
            "10:00:00",
            "11:00:00",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
    let booking_id = body["id"].as_str().unwrap().to_string();

    // Reject it as admin.
    let app = setup_test_app(pool.clone()).await;
    let admin_token = get_auth_token(app, &admin_email, "testpass123").await;

    let app = setup_test_app(pool.clone()).await;
    let request = Request::builder()
        .method("PUT")
        .uri(format!(
            "/api/facilities/{}/bookings/{}/status",
            facility, booking_id
        ))
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {}", admin_token))
        .body(Body::from(
            serde_json::to_string(&json!({"status": "rejected"})).unwrap(),
        ))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Rejected bookings no longer block the slot.
    let app = setup_test_app(pool.clone()).await;
    let response = app
        .oneshot(book_request(
            &student_token,
            facility,
            "2026-09-01",
            "10:00:00",
            "11:00:00",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_booking_rejects_inverted_time_range(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let email = generate_unique_email();
    create_test_account(&mut tx, &email, "testpass123", "student", None).await;
    tx.commit().await.unwrap();

    let facility = create_facility(&pool).await;

    let app = setup_test_app(pool.clone()).await;
    let token = get_auth_token(app, &email, "testpass123").await;

    let app = setup_test_app(pool.clone()).await;
    let response = app
        .oneshot(book_request(
            &token,
            facility,
            "2026-09-01",
            "11:00:00",
            "10:00:00",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_student_cannot_approve_bookings(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let email = generate_unique_email();
    create_test_account(&mut tx, &email, "testpass123", "student", None).await;
    tx.commit().await.unwrap();

    let facility = create_facility(&pool).await;

    let app = setup_test_app(pool.clone()).await;
    let token = get_auth_token(app, &email, "testpass123").await;

    let app = setup_test_app(pool.clone()).await;
    let response = app
        .oneshot(book_request(
            &token,
            facility,
            "2026-09-01",
            "10:00:00",
            "11:00:00",
        ))
        .await
        .unwrap();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
    let booking_id = body["id"].as_str().unwrap().to_string();

    let app = setup_test_app(pool.clone()).await;
    let request = Request::builder()
        .method("PUT")
        .uri(format!(
            "/api/facilities/{}/bookings/{}/status",
            facility, booking_id
        ))
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {}", token))
        .body(Body::from(
            serde_json::to_string(&json!({"status": "approved"})).unwrap(),
        ))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
