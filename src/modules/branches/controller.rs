use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde_json::json;
use tracing::instrument;
use uuid::Uuid;

use crate::modules::auth::controller::ErrorResponse;
use crate::modules::branches::model::{
    Branch, BranchFilterParams, CreateBranchDto, PaginatedBranchesResponse, UpdateBranchDto,
};
use crate::modules::branches::service::BranchService;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::pagination::PaginationMeta;
use crate::validator::ValidatedJson;

/// Create a branch
#[utoipa::path(
    post,
    path = "/api/branches",
    request_body = CreateBranchDto,
    responses(
        (status = 201, description = "Branch created", body = Branch),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden - admin only", body = ErrorResponse),
        (status = 409, description = "Duplicate name or code", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Branches"
)]
#[instrument(skip(state, dto))]
pub async fn create_branch(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<CreateBranchDto>,
) -> Result<(StatusCode, Json<Branch>), AppError> {
    let branch = BranchService::create_branch(&state.db, dto).await?;
    Ok((StatusCode::CREATED, Json(branch)))
}

/// List branches
#[utoipa::path(
    get,
    path = "/api/branches",
    params(
        ("department" = Option<String>, Query, description = "Filter by department"),
        ("page" = Option<i64>, Query, description = "Page number"),
        ("limit" = Option<i64>, Query, description = "Page size")
    ),
    responses(
        (status = 200, description = "Paginated branches", body = PaginatedBranchesResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Branches"
)]
#[instrument(skip(state, params))]
pub async fn get_branches(
    State(state): State<AppState>,
    Query(params): Query<BranchFilterParams>,
) -> Result<Json<PaginatedBranchesResponse>, AppError> {
    let (branches, total) = BranchService::get_branches(&state.db, &params).await?;
    let meta = PaginationMeta::new(&params.pagination, total);

    Ok(Json(PaginatedBranchesResponse {
        data: branches,
        meta,
    }))
}

/// Get a branch by id
#[utoipa::path(
    get,
    path = "/api/branches/{id}",
    params(("id" = Uuid, Path, description = "Branch ID")),
    responses(
        (status = 200, description = "Branch details", body = Branch),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Branch not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Branches"
)]
#[instrument(skip(state))]
pub async fn get_branch(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Branch>, AppError> {
    let branch = BranchService::get_branch(&state.db, id).await?;
    Ok(Json(branch))
}

/// Update a branch
#[utoipa::path(
    put,
    path = "/api/branches/{id}",
    params(("id" = Uuid, Path, description = "Branch ID")),
    request_body = UpdateBranchDto,
    responses(
        (status = 200, description = "Branch updated", body = Branch),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden - admin only", body = ErrorResponse),
        (status = 404, description = "Branch not found", body = ErrorResponse),
        (status = 409, description = "Duplicate name or code", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Branches"
)]
#[instrument(skip(state, dto))]
pub async fn update_branch(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateBranchDto>,
) -> Result<Json<Branch>, AppError> {
    let branch = BranchService::update_branch(&state.db, id, dto).await?;
    Ok(Json(branch))
}

/// Delete a branch (refused while students or subjects reference it)
#[utoipa::path(
    delete,
    path = "/api/branches/{id}",
    params(("id" = Uuid, Path, description = "Branch ID")),
    responses(
        (status = 200, description = "Branch deleted"),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden - admin only", body = ErrorResponse),
        (status = 404, description = "Branch not found", body = ErrorResponse),
        (status = 409, description = "Branch still referenced", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Branches"
)]
#[instrument(skip(state))]
pub async fn delete_branch(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    BranchService::delete_branch(&state.db, id).await?;
    Ok(Json(json!({"message": "Branch deleted successfully"})))
}
