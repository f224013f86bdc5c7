use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde_json::json;
use tracing::instrument;
use uuid::Uuid;

use crate::middleware::auth::AuthUser;
use crate::modules::accounts::model::AccountRole;
use crate::modules::auth::controller::ErrorResponse;
use crate::modules::professors::model::{
    AssignSubjectDto, CreateProfessorDto, PaginatedProfessorsResponse, Professor,
    ProfessorFilterParams, SubjectAssignment, UpdateProfessorDto,
};
use crate::modules::professors::service::ProfessorService;
use crate::policy::{self, Action, Target};
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::pagination::PaginationMeta;
use crate::validator::ValidatedJson;

/// Create a professor (account + profile, atomically)
///
/// An hod may only create professors in their own department; directors and
/// the creator are unrestricted.
#[utoipa::path(
    post,
    path = "/api/professors",
    request_body = CreateProfessorDto,
    responses(
        (status = 201, description = "Professor created", body = Professor),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 409, description = "Duplicate email or employee number", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Professors"
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn create_professor(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<CreateProfessorDto>,
) -> Result<(StatusCode, Json<Professor>), AppError> {
    let actor = auth_user.actor()?;
    policy::authorize(
        &actor,
        Action::Create,
        &Target::account(AccountRole::Professor, Some(dto.department.clone())),
    )
    .map_err(|d| AppError::forbidden(d.reason()))?;

    let professor = ProfessorService::create_professor(&state.db, dto).await?;
    Ok((StatusCode::CREATED, Json(professor)))
}

/// List professors
#[utoipa::path(
    get,
    path = "/api/professors",
    params(
        ("department" = Option<String>, Query, description = "Filter by department"),
        ("page" = Option<i64>, Query, description = "Page number"),
        ("limit" = Option<i64>, Query, description = "Page size")
    ),
    responses(
        (status = 200, description = "Paginated professors", body = PaginatedProfessorsResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Professors"
)]
#[instrument(skip(state, auth_user, params))]
pub async fn get_professors(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(mut params): Query<ProfessorFilterParams>,
) -> Result<Json<PaginatedProfessorsResponse>, AppError> {
    if auth_user.role() == AccountRole::Hod {
        params.department = auth_user.department().map(String::from);
    }

    let (professors, total) = ProfessorService::get_professors(&state.db, &params).await?;
    let meta = PaginationMeta::new(&params.pagination, total);

    Ok(Json(PaginatedProfessorsResponse {
        data: professors,
        meta,
    }))
}

/// Get a professor by id
#[utoipa::path(
    get,
    path = "/api/professors/{id}",
    params(("id" = Uuid, Path, description = "Professor ID")),
    responses(
        (status = 200, description = "Professor details", body = Professor),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 404, description = "Professor not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Professors"
)]
#[instrument(skip(state, auth_user))]
pub async fn get_professor(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Professor>, AppError> {
    let professor = ProfessorService::get_professor(&state.db, id).await?;
    authorize_on(&auth_user, Action::Read, &professor)?;
    Ok(Json(professor))
}

/// Update a professor (profile + account, atomically)
#[utoipa::path(
    put,
    path = "/api/professors/{id}",
    params(("id" = Uuid, Path, description = "Professor ID")),
    request_body = UpdateProfessorDto,
    responses(
        (status = 200, description = "Professor updated", body = Professor),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 404, description = "Professor not found", body = ErrorResponse),
        (status = 409, description = "Duplicate email", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Professors"
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn update_professor(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateProfessorDto>,
) -> Result<Json<Professor>, AppError> {
    let existing = ProfessorService::get_professor(&state.db, id).await?;
    authorize_on(&auth_user, Action::Update, &existing)?;

    let professor = ProfessorService::update_professor(&state.db, id, dto).await?;
    Ok(Json(professor))
}

/// Delete a professor (profile + account, atomically)
#[utoipa::path(
    delete,
    path = "/api/professors/{id}",
    params(("id" = Uuid, Path, description = "Professor ID")),
    responses(
        (status = 200, description = "Professor deleted"),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 404, description = "Professor not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Professors"
)]
#[instrument(skip(state, auth_user))]
pub async fn delete_professor(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    let existing = ProfessorService::get_professor(&state.db, id).await?;
    authorize_on(&auth_user, Action::Delete, &existing)?;

    ProfessorService::delete_professor(&state.db, id).await?;
    Ok(Json(json!({"message": "Professor deleted successfully"})))
}

/// Assign a subject to a professor
#[utoipa::path(
    post,
    path = "/api/professors/{id}/subjects",
    params(("id" = Uuid, Path, description = "Professor ID")),
    request_body = AssignSubjectDto,
    responses(
        (status = 201, description = "Subject assigned", body = SubjectAssignment),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 404, description = "Professor or subject not found", body = ErrorResponse),
        (status = 409, description = "Already assigned", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Professors"
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn assign_subject(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<AssignSubjectDto>,
) -> Result<(StatusCode, Json<SubjectAssignment>), AppError> {
    let existing = ProfessorService::get_professor(&state.db, id).await?;
    authorize_on(&auth_user, Action::Update, &existing)?;

    let assignment = ProfessorService::assign_subject(&state.db, id, dto).await?;
    Ok((StatusCode::CREATED, Json(assignment)))
}

/// List a professor's subject assignments
#[utoipa::path(
    get,
    path = "/api/professors/{id}/subjects",
    params(("id" = Uuid, Path, description = "Professor ID")),
    responses(
        (status = 200, description = "Subject assignments", body = [SubjectAssignment]),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Professor not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Professors"
)]
#[instrument(skip(state))]
pub async fn get_subject_assignments(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<SubjectAssignment>>, AppError> {
    let assignments = ProfessorService::get_subject_assignments(&state.db, id).await?;
    Ok(Json(assignments))
}

fn authorize_on(
    auth_user: &AuthUser,
    action: Action,
    professor: &Professor,
) -> Result<(), AppError> {
    let actor = auth_user.actor()?;
    let target = Target {
        owner_id: Some(professor.account_id),
        department: Some(professor.department.clone()),
        role: Some(AccountRole::Professor),
    };
    policy::authorize(&actor, action, &target).map_err(|d| AppError::forbidden(d.reason()))
}
