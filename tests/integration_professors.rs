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
        .header("x-forwarded-for", "203.0.113.30")
        .body(Body::from(
            serde_json::to_string(&json!({"email": email, "password": password})).unwrap(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
    body["access_token"].as_str().unwrap().to_string()
}

fn professor_payload(email: &str, employee_number: &str, department: &str) -> serde_json::Value {
    json!({
        "name": "Prof Test",
        "email": email,
        "password": "profpass12345",
        "employee_number": employee_number,
        "department": department
    })
}

fn post_professors(token: &str, payload: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/professors")
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {}", token))
        .body(Body::from(serde_json::to_string(payload).unwrap()))
        .unwrap()
}

fn unique_employee_number() -> String {
    format!("E-{}", Uuid::new_v4())
}

#[sqlx::test(migrations = "./migrations")]
async fn test_hod_creates_professor_in_own_department(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let hod_email = generate_unique_email();
    create_test_account(&mut tx, &hod_email, "testpass123", "hod", Some("CSE")).await;
    tx.commit().await.unwrap();

    let app = setup_test_app(pool.clone()).await;
    let token = get_auth_token(app, &hod_email, "testpass123").await;

    let app = setup_test_app(pool.clone()).await;
    let response = app
        .oneshot(post_professors(
            &token,
            &professor_payload(&generate_unique_email(), &unique_employee_number(), "CSE"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["department"], "CSE");
    assert_eq!(body["first_login"], true);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_hod_cannot_create_professor_in_other_department(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let hod_email = generate_unique_email();
    create_test_account(&mut tx, &hod_email, "testpass123", "hod", Some("CSE")).await;
    tx.commit().await.unwrap();

    let app = setup_test_app(pool.clone()).await;
    let token = get_auth_token(app, &hod_email, "testpass123").await;

    let app = setup_test_app(pool.clone()).await;
    let response = app
        .oneshot(post_professors(
            &token,
            &professor_payload(&generate_unique_email(), &unique_employee_number(), "ME"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_director_creates_professor_anywhere(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let director_email = generate_unique_email();
    create_test_account(&mut tx, &director_email, "testpass123", "director", None).await;
    tx.commit().await.unwrap();

    let app = setup_test_app(pool.clone()).await;
    let token = get_auth_token(app, &director_email, "testpass123").await;

    let app = setup_test_app(pool.clone()).await;
    let response = app
        .oneshot(post_professors(
            &token,
            &professor_payload(&generate_unique_email(), &unique_employee_number(), "ME"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_professor_cannot_create_professor(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let prof_email = generate_unique_email();
    create_test_account(&mut tx, &prof_email, "testpass123", "professor", Some("CSE")).await;
    tx.commit().await.unwrap();

    let app = setup_test_app(pool.clone()).await;
    let token = get_auth_token(app, &prof_email, "testpass123").await;

    let app = setup_test_app(pool.clone()).await;
    let response = app
        .oneshot(post_professors(
            &token,
            &professor_payload(&generate_unique_email(), &unique_employee_number(), "CSE"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_duplicate_employee_number_is_conflict(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let director_email = generate_unique_email();
    create_test_account(&mut tx, &director_email, "testpass123", "director", None).await;
    tx.commit().await.unwrap();

    let app = setup_test_app(pool.clone()).await;
    let token = get_auth_token(app, &director_email, "testpass123").await;

    let employee_number = unique_employee_number();

    let app = setup_test_app(pool.clone()).await;
    let response = app
        .oneshot(post_professors(
            &token,
            &professor_payload(&generate_unique_email(), &employee_number, "CSE"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let second_email = generate_unique_email();
    let app = setup_test_app(pool.clone()).await;
    let response = app
        .oneshot(post_professors(
            &token,
            &professor_payload(&second_email, &employee_number, "CSE"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // The rolled-back transaction left no orphan account.
    let orphan = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM accounts WHERE email = $1)",
    )
    .bind(&second_email)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert!(!orphan);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_assign_subject_rejects_duplicates(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let branch = common::create_test_branch(&mut tx, "CSE").await;
    let director_email = generate_unique_email();
    create_test_account(&mut tx, &director_email, "testpass123", "director", None).await;

    let subject_id = sqlx::query_scalar::<_, Uuid>(
        "INSERT INTO subjects (name, code, credits, semester, branch_id)
         VALUES ('Algorithms', $1, 4, 3, $2)
         RETURNING id",
    )
    .bind(format!("SUB-{}", Uuid::new_v4()))
    .bind(branch.id)
    .fetch_one(&mut *tx)
    .await
    .unwrap();
    tx.commit().await.unwrap();

    let app = setup_test_app(pool.clone()).await;
    let token = get_auth_token(app, &director_email, "testpass123").await;

    let app = setup_test_app(pool.clone()).await;
    let response = app
        .oneshot(post_professors(
            &token,
            &professor_payload(&generate_unique_email(), &unique_employee_number(), "CSE"),
        ))
        .await
        .unwrap();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
    let professor_id = body["id"].as_str().unwrap().to_string();

    let assign = json!({
        "subject_id": subject_id,
        "semester": 3,
        "branch_id": branch.id
    });

    let assign_request = |payload: &serde_json::Value| {
        Request::builder()
            .method("POST")
            .uri(format!("/api/professors/{}/subjects", professor_id))
            .header("content-type", "application/json")
            .header("authorization", format!("Bearer {}", token))
            .body(Body::from(serde_json::to_string(payload).unwrap()))
            .unwrap()
    };

    let app = setup_test_app(pool.clone()).await;
    let response = app.oneshot(assign_request(&assign)).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let app = setup_test_app(pool.clone()).await;
    let response = app.oneshot(assign_request(&assign)).await.unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}
