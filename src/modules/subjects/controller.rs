use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde_json::json;
use tracing::instrument;
use uuid::Uuid;

use crate::middleware::auth::AuthUser;
use crate::middleware::role::check_any_role;
use crate::modules::accounts::model::AccountRole;
use crate::modules::auth::controller::ErrorResponse;
use crate::modules::subjects::model::{
    CreateSubjectDto, PaginatedSubjectsResponse, Subject, SubjectFilterParams, UpdateSubjectDto,
};
use crate::modules::subjects::service::SubjectService;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::pagination::PaginationMeta;
use crate::validator::ValidatedJson;

const MANAGE_ROLES: &[AccountRole] = &[
    AccountRole::Admin,
    AccountRole::Hod,
    AccountRole::Director,
    AccountRole::Creator,
];

/// Create a subject
#[utoipa::path(
    post,
    path = "/api/subjects",
    request_body = CreateSubjectDto,
    responses(
        (status = 201, description = "Subject created", body = Subject),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 404, description = "Branch not found", body = ErrorResponse),
        (status = 409, description = "Duplicate code", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Subjects"
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn create_subject(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<CreateSubjectDto>,
) -> Result<(StatusCode, Json<Subject>), AppError> {
    check_any_role(&auth_user, MANAGE_ROLES)?;
    let subject = SubjectService::create_subject(&state.db, dto).await?;
    Ok((StatusCode::CREATED, Json(subject)))
}

/// List subjects
#[utoipa::path(
    get,
    path = "/api/subjects",
    params(
        ("branch_id" = Option<Uuid>, Query, description = "Filter by branch"),
        ("semester" = Option<i32>, Query, description = "Filter by semester"),
        ("page" = Option<i64>, Query, description = "Page number"),
        ("limit" = Option<i64>, Query, description = "Page size")
    ),
    responses(
        (status = 200, description = "Paginated subjects", body = PaginatedSubjectsResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Subjects"
)]
#[instrument(skip(state, _auth_user, params))]
pub async fn get_subjects(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Query(params): Query<SubjectFilterParams>,
) -> Result<Json<PaginatedSubjectsResponse>, AppError> {
    let (subjects, total) = SubjectService::get_subjects(&state.db, &params).await?;
    let meta = PaginationMeta::new(&params.pagination, total);

    Ok(Json(PaginatedSubjectsResponse {
        data: subjects,
        meta,
    }))
}

/// Get a subject by id
#[utoipa::path(
    get,
    path = "/api/subjects/{id}",
    params(("id" = Uuid, Path, description = "Subject ID")),
    responses(
        (status = 200, description = "Subject details", body = Subject),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Subject not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Subjects"
)]
#[instrument(skip(state, _auth_user))]
pub async fn get_subject(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Subject>, AppError> {
    let subject = SubjectService::get_subject(&state.db, id).await?;
    Ok(Json(subject))
}

/// Update a subject
#[utoipa::path(
    put,
    path = "/api/subjects/{id}",
    params(("id" = Uuid, Path, description = "Subject ID")),
    request_body = UpdateSubjectDto,
    responses(
        (status = 200, description = "Subject updated", body = Subject),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 404, description = "Subject not found", body = ErrorResponse),
        (status = 409, description = "Duplicate code", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Subjects"
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn update_subject(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateSubjectDto>,
) -> Result<Json<Subject>, AppError> {
    check_any_role(&auth_user, MANAGE_ROLES)?;
    let subject = SubjectService::update_subject(&state.db, id, dto).await?;
    Ok(Json(subject))
}

/// Delete a subject
#[utoipa::path(
    delete,
    path = "/api/subjects/{id}",
    params(("id" = Uuid, Path, description = "Subject ID")),
    responses(
        (status = 200, description = "Subject deleted"),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 404, description = "Subject not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Subjects"
)]
#[instrument(skip(state, auth_user))]
pub async fn delete_subject(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    check_any_role(&auth_user, MANAGE_ROLES)?;
    SubjectService::delete_subject(&state.db, id).await?;
    Ok(Json(json!({"message": "Subject deleted successfully"})))
}
