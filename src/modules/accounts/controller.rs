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
use crate::modules::accounts::model::{
    Account, AccountFilterParams, AccountRole, ChangePasswordDto, CreateAccountDto,
    PaginatedAccountsResponse, UpdateProfileDto,
};
use crate::modules::accounts::service::AccountService;
use crate::modules::auth::controller::ErrorResponse;
use crate::policy::{self, Action, Target};
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::pagination::PaginationMeta;
use crate::validator::ValidatedJson;

/// Get the authenticated account's profile
#[utoipa::path(
    get,
    path = "/api/accounts/me",
    responses(
        (status = 200, description = "Account profile", body = Account),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Accounts"
)]
#[instrument(skip(state, auth_user))]
pub async fn get_profile(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<Account>, AppError> {
    let account = AccountService::get_account(&state.db, auth_user.account_id()?).await?;
    Ok(Json(account))
}

/// Update the authenticated account's profile
#[utoipa::path(
    put,
    path = "/api/accounts/me",
    request_body = UpdateProfileDto,
    responses(
        (status = 200, description = "Profile updated", body = Account),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Accounts"
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn update_profile(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<UpdateProfileDto>,
) -> Result<Json<Account>, AppError> {
    let account =
        AccountService::update_profile(&state.db, auth_user.account_id()?, dto).await?;
    Ok(Json(account))
}

/// Change the authenticated account's password
#[utoipa::path(
    put,
    path = "/api/accounts/me/password",
    request_body = ChangePasswordDto,
    responses(
        (status = 200, description = "Password changed"),
        (status = 401, description = "Unauthorized or wrong current password", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Accounts"
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn change_password(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<ChangePasswordDto>,
) -> Result<Json<serde_json::Value>, AppError> {
    AccountService::change_password(&state.db, auth_user.account_id()?, dto).await?;
    Ok(Json(json!({"message": "Password changed successfully"})))
}

/// List accounts (management roles only)
#[utoipa::path(
    get,
    path = "/api/accounts",
    params(
        ("role" = Option<AccountRole>, Query, description = "Filter by role"),
        ("department" = Option<String>, Query, description = "Filter by department"),
        ("page" = Option<i64>, Query, description = "Page number"),
        ("limit" = Option<i64>, Query, description = "Page size")
    ),
    responses(
        (status = 200, description = "Paginated accounts", body = PaginatedAccountsResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Accounts"
)]
#[instrument(skip(state, auth_user, params))]
pub async fn list_accounts(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(mut params): Query<AccountFilterParams>,
) -> Result<Json<PaginatedAccountsResponse>, AppError> {
    check_any_role(
        &auth_user,
        &[
            AccountRole::Admin,
            AccountRole::Hod,
            AccountRole::Director,
            AccountRole::Creator,
        ],
    )?;

    // An hod only ever sees their own department.
    if auth_user.role() == AccountRole::Hod {
        params.department = auth_user.department().map(String::from);
    }

    let (accounts, total) = AccountService::list_accounts(&state.db, &params).await?;
    let meta = PaginationMeta::new(&params.pagination, total);

    Ok(Json(PaginatedAccountsResponse {
        data: accounts,
        meta,
    }))
}

/// Create an account with an explicit role
#[utoipa::path(
    post,
    path = "/api/accounts",
    request_body = CreateAccountDto,
    responses(
        (status = 201, description = "Account created", body = Account),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Role assignment not permitted", body = ErrorResponse),
        (status = 409, description = "Email already exists", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Accounts"
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn create_account(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<CreateAccountDto>,
) -> Result<(StatusCode, Json<Account>), AppError> {
    let actor = auth_user.actor()?;
    policy::authorize(
        &actor,
        Action::Create,
        &Target::account(dto.role, dto.department.clone()),
    )
    .map_err(|d| AppError::forbidden(d.reason()))?;

    let account = AccountService::create_account(&state.db, dto).await?;
    Ok((StatusCode::CREATED, Json(account)))
}

/// Get an account by id
#[utoipa::path(
    get,
    path = "/api/accounts/{id}",
    params(("id" = Uuid, Path, description = "Account ID")),
    responses(
        (status = 200, description = "Account details", body = Account),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 404, description = "Account not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Accounts"
)]
#[instrument(skip(state, auth_user))]
pub async fn get_account(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Account>, AppError> {
    let account = AccountService::get_account(&state.db, id).await?;

    let actor = auth_user.actor()?;
    let target = Target {
        owner_id: Some(account.id),
        department: account.department.clone(),
        role: Some(account.role),
    };
    policy::authorize(&actor, Action::Read, &target)
        .map_err(|d| AppError::forbidden(d.reason()))?;

    Ok(Json(account))
}

/// Delete an account
#[utoipa::path(
    delete,
    path = "/api/accounts/{id}",
    params(("id" = Uuid, Path, description = "Account ID")),
    responses(
        (status = 200, description = "Account deleted"),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden (creator accounts are permanent)", body = ErrorResponse),
        (status = 404, description = "Account not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Accounts"
)]
#[instrument(skip(state, auth_user))]
pub async fn delete_account(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    let account = AccountService::get_account(&state.db, id).await?;

    let actor = auth_user.actor()?;
    let target = Target {
        owner_id: Some(account.id),
        department: account.department.clone(),
        role: Some(account.role),
    };
    policy::authorize(&actor, Action::Delete, &target)
        .map_err(|d| AppError::forbidden(d.reason()))?;

    AccountService::delete_account(&state.db, id).await?;
    Ok(Json(json!({"message": "Account deleted successfully"})))
}
