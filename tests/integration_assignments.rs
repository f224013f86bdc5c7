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
    create_test_account, create_test_branch, create_test_course, create_test_student,
    enroll_test_student, generate_unique_email, generate_unique_scholar_number,
};
use http_body_util::BodyExt;
use serde_json::json;
use sqlx::PgPool;
use tower::ServiceExt;

const BOUNDARY: &str = "X-COLLEGIA-TEST-BOUNDARY";

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
        .header("x-forwarded-for", "203.0.113.70")
        .body(Body::from(
            serde_json::to_string(&json!({"email": email, "password": password})).unwrap(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
    body["access_token"].as_str().unwrap().to_string()
}

fn text_part(name: &str, value: &str) -> String {
    format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
    )
}

fn file_part(name: &str, filename: &str, content: &str) -> String {
    format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\nContent-Type: text/plain\r\n\r\n{content}\r\n"
    )
}

fn multipart_request(uri: &str, token: &str, parts: String) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .header("authorization", format!("Bearer {}", token))
        .body(Body::from(format!("{parts}--{BOUNDARY}--\r\n")))
        .unwrap()
}

fn assignment_form(due_date: &str) -> String {
    format!(
        "{}{}{}",
        text_part("title", "Problem set 1"),
        text_part("description", "Chapters 1-3"),
        text_part("due_date", due_date)
    )
}

#[sqlx::test(migrations = "./migrations")]
async fn test_assignment_submission_is_once_per_student(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let branch = create_test_branch(&mut tx, "CSE").await;
    let course = create_test_course(&mut tx, branch.id, 1).await;
    let prof_email = generate_unique_email();
    create_test_account(&mut tx, &prof_email, "testpass123", "professor", Some("CSE")).await;
    let student_email = generate_unique_email();
    let (_, student_id) = create_test_student(
        &mut tx,
        &student_email,
        "studentpass123",
        &generate_unique_scholar_number(),
        branch.id,
        1,
    )
    .await;
    enroll_test_student(&mut tx, course, student_id).await;
    tx.commit().await.unwrap();

    // Professor creates the assignment.
    let app = setup_test_app(pool.clone()).await;
    let prof_token = get_auth_token(app, &prof_email, "testpass123").await;

    let app = setup_test_app(pool.clone()).await;
    let response = app
        .oneshot(multipart_request(
            &format!("/api/courses/{}/assignments", course),
            &prof_token,
            assignment_form("2030-01-01T00:00:00Z"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
    let assignment_id = body["id"].as_str().unwrap().to_string();

    // Student submits once.
    let app = setup_test_app(pool.clone()).await;
    let student_token = get_auth_token(app, &student_email, "studentpass123").await;

    let app = setup_test_app(pool.clone()).await;
    let response = app
        .oneshot(multipart_request(
            &format!("/api/assignments/{}/submissions", assignment_id),
            &student_token,
            file_part("file", "report.txt", "my answers"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    // A second submission conflicts.
    let app = setup_test_app(pool.clone()).await;
    let response = app
        .oneshot(multipart_request(
            &format!("/api/assignments/{}/submissions", assignment_id),
            &student_token,
            file_part("file", "report-v2.txt", "updated answers"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let submissions = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM assignment_submissions WHERE assignment_id = $1::uuid",
    )
    .bind(&assignment_id)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(submissions, 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_submission_after_due_date_is_rejected(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let branch = create_test_branch(&mut tx, "CSE").await;
    let course = create_test_course(&mut tx, branch.id, 1).await;
    let prof_email = generate_unique_email();
    create_test_account(&mut tx, &prof_email, "testpass123", "professor", Some("CSE")).await;
    let student_email = generate_unique_email();
    let (_, student_id) = create_test_student(
        &mut tx,
        &student_email,
        "studentpass123",
        &generate_unique_scholar_number(),
        branch.id,
        1,
    )
    .await;
    enroll_test_student(&mut tx, course, student_id).await;
    tx.commit().await.unwrap();

    let app = setup_test_app(pool.clone()).await;
    let prof_token = get_auth_token(app, &prof_email, "testpass123").await;

    let app = setup_test_app(pool.clone()).await;
    let response = app
        .oneshot(multipart_request(
            &format!("/api/courses/{}/assignments", course),
            &prof_token,
            assignment_form("2020-01-01T00:00:00Z"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
    let assignment_id = body["id"].as_str().unwrap().to_string();

    let app = setup_test_app(pool.clone()).await;
    let student_token = get_auth_token(app, &student_email, "studentpass123").await;

    let app = setup_test_app(pool.clone()).await;
    let response = app
        .oneshot(multipart_request(
            &format!("/api/assignments/{}/submissions", assignment_id),
            &student_token,
            file_part("file", "late.txt", "too late"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_only_the_creator_grades_a_submission(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let branch = create_test_branch(&mut tx, "CSE").await;
    let course = create_test_course(&mut tx, branch.id, 1).await;
    let owner_email = generate_unique_email();
    create_test_account(&mut tx, &owner_email, "testpass123", "professor", Some("CSE")).await;
    let other_email = generate_unique_email();
    create_test_account(&mut tx, &other_email, "testpass123", "professor", Some("CSE")).await;
    let student_email = generate_unique_email();
    let (_, student_id) = create_test_student(
        &mut tx,
        &student_email,
        "studentpass123",
        &generate_unique_scholar_number(),
        branch.id,
        1,
    )
    .await;
    enroll_test_student(&mut tx, course, student_id).await;
    tx.commit().await.unwrap();

    let app = setup_test_app(pool.clone()).await;
    let owner_token = get_auth_token(app, &owner_email, "testpass123").await;

    let app = setup_test_app(pool.clone()).await;
    let response = app
        .oneshot(multipart_request(
            &format!("/api/courses/{}/assignments", course),
            &owner_token,
            assignment_form("2030-01-01T00:00:00Z"),
        ))
        .await
        .unwrap();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
    let assignment_id = body["id"].as_str().unwrap().to_string();

    let app = setup_test_app(pool.clone()).await;
    let student_token = get_auth_token(app, &student_email, "studentpass123").await;

    let app = setup_test_app(pool.clone()).await;
    let response = app
        .oneshot(multipart_request(
            &format!("/api/assignments/{}/submissions", assignment_id),
            &student_token,
            file_part("file", "report.txt", "answers"),
        ))
        .await
        .unwrap();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
    let submission_id = body["id"].as_str().unwrap().to_string();

    let grade_request = |token: &str| {
        Request::builder()
            .method("PUT")
            .uri(format!(
                "/api/assignments/{}/submissions/{}/grade",
                assignment_id, submission_id
            ))
            .header("content-type", "application/json")
            .header("authorization", format!("Bearer {}", token))
            .body(Body::from(
                serde_json::to_string(&json!({"grade": 85, "feedback": "Good work"})).unwrap(),
            ))
            .unwrap()
    };

    // Another professor is not the owner.
    let app = setup_test_app(pool.clone()).await;
    let other_token = get_auth_token(app, &other_email, "testpass123").await;

    let app = setup_test_app(pool.clone()).await;
    let response = app.oneshot(grade_request(&other_token)).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // The creator grades it.
    let app = setup_test_app(pool.clone()).await;
    let response = app.oneshot(grade_request(&owner_token)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["grade"], 85);
    assert_eq!(body["feedback"], "Good work");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_unenrolled_student_cannot_submit(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let branch = create_test_branch(&mut tx, "CSE").await;
    let course = create_test_course(&mut tx, branch.id, 1).await;
    let prof_email = generate_unique_email();
    create_test_account(&mut tx, &prof_email, "testpass123", "professor", Some("CSE")).await;
    let student_email = generate_unique_email();
    create_test_student(
        &mut tx,
        &student_email,
        "studentpass123",
        &generate_unique_scholar_number(),
        branch.id,
        1,
    )
    .await;
    tx.commit().await.unwrap();

    let app = setup_test_app(pool.clone()).await;
    let prof_token = get_auth_token(app, &prof_email, "testpass123").await;

    let app = setup_test_app(pool.clone()).await;
    let response = app
        .oneshot(multipart_request(
            &format!("/api/courses/{}/assignments", course),
            &prof_token,
            assignment_form("2030-01-01T00:00:00Z"),
        ))
        .await
        .unwrap();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
    let assignment_id = body["id"].as_str().unwrap().to_string();

    let app = setup_test_app(pool.clone()).await;
    let student_token = get_auth_token(app, &student_email, "studentpass123").await;

    let app = setup_test_app(pool.clone()).await;
    let response = app
        .oneshot(multipart_request(
            &format!("/api/assignments/{}/submissions", assignment_id),
            &student_token,
            file_part("file", "report.txt", "answers"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
