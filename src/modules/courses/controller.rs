use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde_json::json;
use tracing::instrument;
use uuid::Uuid;

use crate::middleware::auth::AuthUser;
use crate::middleware::role::check_any_role;
use crate::modules::accounts::model::AccountRole;
use crate::modules::auth::controller::ErrorResponse;
use crate::modules::courses::model::{Course, CourseDetail, CreateCourseDto, EnrollStudentDto};
use crate::modules::courses::service::CourseService;
use crate::modules::students::model::Student;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::validator::ValidatedJson;

const MANAGE_ROLES: &[AccountRole] = &[
    AccountRole::Admin,
    AccountRole::Director,
    AccountRole::Creator,
];

/// Create a course (a branch+semester grouping)
#[utoipa::path(
    post,
    path = "/api/courses",
    request_body = CreateCourseDto,
    responses(
        (status = 201, description = "Course created", body = Course),
        (status = 400, description = "Semester out of range for branch", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 404, description = "Branch not found", body = ErrorResponse),
        (status = 409, description = "Course already exists", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Courses"
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn create_course(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<CreateCourseDto>,
) -> Result<(StatusCode, Json<Course>), AppError> {
    check_any_role(&auth_user, MANAGE_ROLES)?;
    let course = CourseService::create_course(&state.db, dto).await?;
    Ok((StatusCode::CREATED, Json(course)))
}

/// List courses
#[utoipa::path(
    get,
    path = "/api/courses",
    responses(
        (status = 200, description = "All courses", body = [Course]),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Courses"
)]
#[instrument(skip(state, _auth_user))]
pub async fn get_courses(
    State(state): State<AppState>,
    _auth_user: AuthUser,
) -> Result<Json<Vec<Course>>, AppError> {
    let courses = CourseService::get_courses(&state.db).await?;
    Ok(Json(courses))
}

/// Get a course with subjects and enrollment count
#[utoipa::path(
    get,
    path = "/api/courses/{id}",
    params(("id" = Uuid, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Course details", body = CourseDetail),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Courses"
)]
#[instrument(skip(state, _auth_user))]
pub async fn get_course(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<CourseDetail>, AppError> {
    let course = CourseService::get_course(&state.db, id).await?;
    Ok(Json(course))
}

/// Enroll a student in a course
#[utoipa::path(
    post,
    path = "/api/courses/{id}/enroll",
    params(("id" = Uuid, Path, description = "Course ID")),
    request_body = EnrollStudentDto,
    responses(
        (status = 200, description = "Student enrolled"),
        (status = 400, description = "Branch or semester mismatch", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 404, description = "Course or student not found", body = ErrorResponse),
        (status = 409, description = "Already enrolled", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Courses"
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn enroll_student(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    Json(dto): Json<EnrollStudentDto>,
) -> Result<Json<serde_json::Value>, AppError> {
    check_any_role(&auth_user, MANAGE_ROLES)?;
    CourseService::enroll_student(&state.db, id, dto.student_id).await?;
    Ok(Json(json!({"message": "Student enrolled successfully"})))
}

/// List students enrolled in a course
#[utoipa::path(
    get,
    path = "/api/courses/{id}/students",
    params(("id" = Uuid, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Enrolled students", body = [Student]),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Courses"
)]
#[instrument(skip(state, auth_user))]
pub async fn get_course_students(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Student>>, AppError> {
    check_any_role(
        &auth_user,
        &[
            AccountRole::Professor,
            AccountRole::Hod,
            AccountRole::Admin,
            AccountRole::Director,
            AccountRole::Creator,
        ],
    )?;
    let students = CourseService::get_course_students(&state.db, id).await?;
    Ok(Json(students))
}
