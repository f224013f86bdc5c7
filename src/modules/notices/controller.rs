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
use crate::modules::notices::model::{CreateNoticeDto, Notice};
use crate::modules::notices::service::NoticeService;
use crate::policy::{self, Action, Target};
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::validator::ValidatedJson;

/// Post a notice
#[utoipa::path(
    post,
    path = "/api/notices",
    request_body = CreateNoticeDto,
    responses(
        (status = 201, description = "Notice created", body = Notice),
        (status = 400, description = "Class scope missing branch/semester", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Notices"
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn create_notice(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<CreateNoticeDto>,
) -> Result<(StatusCode, Json<Notice>), AppError> {
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

    let notice = NoticeService::create_notice(&state.db, auth_user.account_id()?, dto).await?;
    Ok((StatusCode::CREATED, Json(notice)))
}

/// List notices visible to the authenticated account
#[utoipa::path(
    get,
    path = "/api/notices",
    responses(
        (status = 200, description = "Visible notices", body = [Notice]),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Notices"
)]
#[instrument(skip(state, auth_user))]
pub async fn get_notices(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<Vec<Notice>>, AppError> {
    let notices = NoticeService::get_visible_notices(
        &state.db,
        auth_user.account_id()?,
        auth_user.role(),
    )
    .await?;
    Ok(Json(notices))
}

/// Mark a notice as read
#[utoipa::path(
    put,
    path = "/api/notices/{id}/read",
    params(("id" = Uuid, Path, description = "Notice ID")),
    responses(
        (status = 200, description = "Notice marked read", body = Notice),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Notice not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Notices"
)]
#[instrument(skip(state, _auth_user))]
pub async fn mark_notice_read(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Notice>, AppError> {
    let notice = NoticeService::mark_read(&state.db, id).await?;
    Ok(Json(notice))
}

/// Delete a notice (owner or management)
#[utoipa::path(
    delete,
    path = "/api/notices/{id}",
    params(("id" = Uuid, Path, description = "Notice ID")),
    responses(
        (status = 200, description = "Notice deleted"),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 404, description = "Notice not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Notices"
)]
#[instrument(skip(state, auth_user))]
pub async fn delete_notice(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    let notice = NoticeService::get_notice(&state.db, id).await?;

    let actor = auth_user.actor()?;
    policy::authorize(&actor, Action::Delete, &Target::owned_by(notice.created_by))
        .map_err(|d| AppError::forbidden(d.reason()))?;

    NoticeService::delete_notice(&state.db, id).await?;
    Ok(Json(json!({"message": "Notice deleted successfully"})))
}
