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
        .header("x-forwarded-for", "203.0.113.40")
        .body(Body::from(
            serde_json::to_string(&json!({"email": email, "password": password})).unwrap(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
    body["access_token"].as_str().unwrap().to_string()
}

fn delete_account_request(token: &str, id: Uuid) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(format!("/api/accounts/{}", id))
        .header("authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap()
}

fn create_account_request(token: &str, payload: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/accounts")
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {}", token))
        .body(Body::from(serde_json::to_string(payload).unwrap()))
        .unwrap()
}

#[sqlx::test(migrations = "./migrations")]
async fn test_creator_account_cannot_be_deleted_by_anyone(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let creator = create_test_account(
        &mut tx,
        &generate_unique_email(),
        "testpass123",
        "creator",
        None,
    )
    .await;
    let director_email = generate_unique_email();
    create_test_account(&mut tx, &director_email, "testpass123", "director", None).await;
    tx.commit().await.unwrap();

    // Not even another creator-level actor can delete it: try the creator
    // against itself, then the director.
    for email in [&creator.email, &director_email] {
        let app = setup_test_app(pool.clone()).await;
        let token = get_auth_token(app, email, "testpass123").await;

        let app = setup_test_app(pool.clone()).await;
        let response = app
            .oneshot(delete_account_request(&token, creator.id))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN, "actor: {}", email);
    }

    let still_there = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM accounts WHERE id = $1)",
    )
    .bind(creator.id)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert!(still_there);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_admin_can_delete_student_account(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let admin_email = generate_unique_email();
    create_test_account(&mut tx, &admin_email, "testpass123", "admin", None).await;
    let student = create_test_account(
        &mut tx,
        &generate_unique_email(),
        "testpass123",
        "student",
        None,
    )
    .await;
    tx.commit().await.unwrap();

    let app = setup_test_app(pool.clone()).await;
    let token = get_auth_token(app, &admin_email, "testpass123").await;

    let app = setup_test_app(pool.clone()).await;
    let response = app
        .oneshot(delete_account_request(&token, student.id))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_only_creator_assigns_privileged_roles(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let creator_email = generate_unique_email();
    create_test_account(&mut tx, &creator_email, "testpass123", "creator", None).await;
    let director_email = generate_unique_email();
    create_test_account(&mut tx, &director_email, "testpass123", "director", None).await;
    tx.commit().await.unwrap();

    // A director may not assign hod.
    let app = setup_test_app(pool.clone()).await;
    let director_token = get_auth_token(app, &director_email, "testpass123").await;

    let payload = json!({
        "name": "New Hod",
        "email": generate_unique_email(),
        "password": "hodpass12345",
        "role": "hod",
        "department": "CSE"
    });

    let app = setup_test_app(pool.clone()).await;
    let response = app
        .oneshot(create_account_request(&director_token, &payload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // The creator may.
    let app = setup_test_app(pool.clone()).await;
    let creator_token = get_auth_token(app, &creator_email, "testpass123").await;

    let payload = json!({
        "name": "New Hod",
        "email": generate_unique_email(),
        "password": "hodpass12345",
        "role": "hod",
        "department": "CSE"
    });

    let app = setup_test_app(pool.clone()).await;
    let response = app
        .oneshot(create_account_request(&creator_token, &payload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_student_cannot_create_accounts(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let student_email = generate_unique_email();
    create_test_account(&mut tx, &student_email, "testpass123", "student", None).await;
    tx.commit().await.unwrap();

    let app = setup_test_app(pool.clone()).await;
    let token = get_auth_token(app, &student_email, "testpass123").await;

    let payload = json!({
        "name": "Sneaky",
        "email": generate_unique_email(),
        "password": "password1234",
        "role": "student"
    });

    let app = setup_test_app(pool.clone()).await;
    let response = app
        .oneshot(create_account_request(&token, &payload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_profile_requires_token(pool: PgPool) {
    let app = setup_test_app(pool.clone()).await;
    let request = Request::builder()
        .method("GET")
        .uri("/api/accounts/me")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let app = setup_test_app(pool.clone()).await;
    let request = Request::builder()
        .method("GET")
        .uri("/api/accounts/me")
        .header("authorization", "Bearer not-a-real-token")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_change_password_requires_current_password(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let email = generate_unique_email();
    create_test_account(&mut tx, &email, "testpass123", "student", None).await;
    tx.commit().await.unwrap();

    let app = setup_test_app(pool.clone()).await;
    let token = get_auth_token(app, &email, "testpass123").await;

    let app = setup_test_app(pool.clone()).await;
    let request = Request::builder()
        .method("PUT")
        .uri("/api/accounts/me/password")
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {}", token))
        .body(Body::from(
            serde_json::to_string(&json!({
                "current_password": "wrong-password",
                "new_password": "newpass12345"
            }))
            .unwrap(),
        ))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
