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
use common::{
    count_accounts, count_student_profiles, create_test_account, create_test_branch,
    generate_unique_email, generate_unique_scholar_number,
};
use http_body_util::BodyExt;
use serde_json::json;
use sqlx::PgPool;
use tower::ServiceExt;

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
        .header("x-forwarded-for", "203.0.113.20")
        .body(Body::from(
            serde_json::to_string(&json!({
                "email": email,
                "password": password
            }))
            .unwrap(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
    body["access_token"].as_str().unwrap().to_string()
}

fn student_payload(email: &str, scholar_number: &str, branch_id: uuid::Uuid) -> serde_json::Value {
    json!({
        "name": "Student Test",
        "email": email,
        "password": "studentpass123",
        "scholar_number": scholar_number,
        "current_semester": 1,
        "branch_id": branch_id
    })
}

fn post_students(token: &str, payload: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/students")
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {}", token))
        .body(Body::from(serde_json::to_string(payload).unwrap()))
        .unwrap()
}

#[sqlx::test(migrations = "./migrations")]
async fn test_create_student_as_admin(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let branch = create_test_branch(&mut tx, "CSE").await;
    let admin_email = generate_unique_email();
    create_test_account(&mut tx, &admin_email, "testpass123", "admin", None).await;
    tx.commit().await.unwrap();

    let app = setup_test_app(pool.clone()).await;
    let token = get_auth_token(app, &admin_email, "testpass123").await;

    let app = setup_test_app(pool.clone()).await;
    let student_email = generate_unique_email();
    let scholar_number = generate_unique_scholar_number();

    let response = app
        .oneshot(post_students(
            &token,
            &student_payload(&student_email, &scholar_number, branch.id),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["email"], student_email);
    assert_eq!(body["scholar_number"], scholar_number);

    // The account was created with role=student and a hashed password.
    let (role, password): (String, String) = sqlx::query_as(
        "SELECT role::text, password FROM accounts WHERE email = $1",
    )
    .bind(&student_email)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(role, "student");
    assert_ne!(password, "studentpass123");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_duplicate_scholar_number_is_conflict(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let branch = create_test_branch(&mut tx, "CSE").await;
    let admin_email = generate_unique_email();
    create_test_account(&mut tx, &admin_email, "testpass123", "admin", None).await;
    tx.commit().await.unwrap();

    let app = setup_test_app(pool.clone()).await;
    let token = get_auth_token(app, &admin_email, "testpass123").await;

    let scholar_number = generate_unique_scholar_number();

    let app = setup_test_app(pool.clone()).await;
    let response = app
        .oneshot(post_students(
            &token,
            &student_payload(&generate_unique_email(), &scholar_number, branch.id),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let accounts_before = count_accounts(&pool).await;
    let profiles_before = count_student_profiles(&pool).await;

    // Same scholar number, fresh email: nothing may be persisted.
    let second_email = generate_unique_email();
    let app = setup_test_app(pool.clone()).await;
    let response = app
        .oneshot(post_students(
            &token,
            &student_payload(&second_email, &scholar_number, branch.id),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    assert_eq!(count_accounts(&pool).await, accounts_before);
    assert_eq!(count_student_profiles(&pool).await, profiles_before);

    // No orphan account from the rolled-back transaction.
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
async fn test_duplicate_email_is_conflict(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let branch = create_test_branch(&mut tx, "CSE").await;
    let admin_email = generate_unique_email();
    create_test_account(&mut tx, &admin_email, "testpass123", "admin", None).await;
    tx.commit().await.unwrap();

    let app = setup_test_app(pool.clone()).await;
    let token = get_auth_token(app, &admin_email, "testpass123").await;

    let student_email = generate_unique_email();

    let app = setup_test_app(pool.clone()).await;
    let response = app
        .oneshot(post_students(
            &token,
            &student_payload(&student_email, &generate_unique_scholar_number(), branch.id),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let accounts_before = count_accounts(&pool).await;
    let profiles_before = count_student_profiles(&pool).await;

    let app = setup_test_app(pool.clone()).await;
    let response = app
        .oneshot(post_students(
            &token,
            &student_payload(&student_email, &generate_unique_scholar_number(), branch.id),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    assert_eq!(count_accounts(&pool).await, accounts_before);
    assert_eq!(count_student_profiles(&pool).await, profiles_before);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_create_student_as_student_forbidden(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let branch = create_test_branch(&mut tx, "CSE").await;
    let student_email = generate_unique_email();
    create_test_account(&mut tx, &student_email, "testpass123", "student", None).await;
    tx.commit().await.unwrap();

    let app = setup_test_app(pool.clone()).await;
    let token = get_auth_token(app, &student_email, "testpass123").await;

    let app = setup_test_app(pool.clone()).await;
    let response = app
        .oneshot(post_students(
            &token,
            &student_payload(
                &generate_unique_email(),
                &generate_unique_scholar_number(),
                branch.id,
            ),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_delete_student_removes_account_and_profile(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let branch = create_test_branch(&mut tx, "CSE").await;
    let admin_email = generate_unique_email();
    create_test_account(&mut tx, &admin_email, "testpass123", "admin", None).await;
    tx.commit().await.unwrap();

    let app = setup_test_app(pool.clone()).await;
    let token = get_auth_token(app, &admin_email, "testpass123").await;

    let student_email = generate_unique_email();
    let app = setup_test_app(pool.clone()).await;
    let response = app
        .oneshot(post_students(
            &token,
            &student_payload(&student_email, &generate_unique_scholar_number(), branch.id),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
    let student_id = body["id"].as_str().unwrap().to_string();

    let app = setup_test_app(pool.clone()).await;
    let request = Request::builder()
        .method("DELETE")
        .uri(format!("/api/students/{}", student_id))
        .header("authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Both halves of the pair are gone.
    let account_exists = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM accounts WHERE email = $1)",
    )
    .bind(&student_email)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert!(!account_exists);

    let profile_exists = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM student_profiles WHERE id = $1::uuid)",
    )
    .bind(&student_id)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert!(!profile_exists);

    // Deleting again is a 404.
    let app = setup_test_app(pool.clone()).await;
    let request = Request::builder()
        .method("DELETE")
        .uri(format!("/api/students/{}", student_id))
        .header("authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_update_student_syncs_account(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let branch = create_test_branch(&mut tx, "CSE").await;
    let admin_email = generate_unique_email();
    create_test_account(&mut tx, &admin_email, "testpass123", "admin", None).await;
    tx.commit().await.unwrap();

    let app = setup_test_app(pool.clone()).await;
    let token = get_auth_token(app, &admin_email, "testpass123").await;

    let app = setup_test_app(pool.clone()).await;
    let response = app
        .oneshot(post_students(
            &token,
            &student_payload(
                &generate_unique_email(),
                &generate_unique_scholar_number(),
                branch.id,
            ),
        ))
        .await
        .unwrap();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
    let student_id = body["id"].as_str().unwrap().to_string();
    let account_id = body["account_id"].as_str().unwrap().to_string();

    let new_email = generate_unique_email();
    let app = setup_test_app(pool.clone()).await;
    let request = Request::builder()
        .method("PUT")
        .uri(format!("/api/students/{}", student_id))
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {}", token))
        .body(Body::from(
            serde_json::to_string(&json!({
                "name": "Renamed Student",
                "email": new_email,
                "current_semester": 2
            }))
            .unwrap(),
        ))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // The linked account row was updated in the same transaction.
    let (name, email): (String, String) =
        sqlx::query_as("SELECT name, email FROM accounts WHERE id = $1::uuid")
            .bind(&account_id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(name, "Renamed Student");
    assert_eq!(email, new_email);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_roster_import_reports_per_row_failures(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let branch = create_test_branch(&mut tx, "CSE").await;
    let admin_email = generate_unique_email();
    create_test_account(&mut tx, &admin_email, "testpass123", "admin", None).await;
    tx.commit().await.unwrap();

    let app = setup_test_app(pool.clone()).await;
    let token = get_auth_token(app, &admin_email, "testpass123").await;

    let dup = generate_unique_scholar_number();
    let csv = format!(
        "name,email,password,scholar_number,current_semester\n\
         Alice,{},alicepass123,{},1\n\
         Bob,{},bobpass12345,{},1\n\
         Carol,{},carolpass123,{},1\n",
        generate_unique_email(),
        dup,
        generate_unique_email(),
        generate_unique_scholar_number(),
        generate_unique_email(),
        dup, // duplicate scholar number: this row must fail alone
    );

    let app = setup_test_app(pool.clone()).await;
    let request = Request::builder()
        .method("POST")
        .uri(format!("/api/branches/{}/students/import", branch.id))
        .header("content-type", "text/csv")
        .header("authorization", format!("Bearer {}", token))
        .body(Body::from(csv))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["imported"], 2);
    assert_eq!(body["failures"].as_array().unwrap().len(), 1);
    assert_eq!(body["failures"][0]["line"], 4);

    assert_eq!(count_student_profiles(&pool).await, 2);
}
