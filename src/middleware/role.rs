//! Role-gating middleware.
//!
//! Coarse route-level gates in front of feature routers. The fine-grained
//! decisions (ownership, department scoping, role assignment) live in
//! [`crate::policy`]; these layers only keep obviously-unqualified roles
//! away from whole route groups.

use axum::{
    extract::{FromRequestParts, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use uuid::Uuid;

use crate::middleware::auth::AuthUser;
use crate::modules::accounts::model::AccountRole;
use crate::state::AppState;
use crate::utils::errors::AppError;

/// Check that the authenticated account still exists and carries one of the
/// allowed roles.
///
/// A bearer token can outlive its account; a deleted account is not an
/// actor, so a stale token maps to 401 rather than 403.
pub async fn require_roles(
    State(state): State<AppState>,
    req: Request,
    next: Next,
    allowed_roles: Vec<AccountRole>,
) -> Result<Response, AppError> {
    let (mut parts, body) = req.into_parts();

    let auth_user = AuthUser::from_request_parts(&mut parts, &state).await?;
    let account_id = auth_user.account_id()?;

    let exists = sqlx::query_scalar::<_, Uuid>("SELECT id FROM accounts WHERE id = $1")
        .bind(account_id)
        .fetch_optional(&state.db)
        .await
        .map_err(AppError::database)?
        .is_some();

    if !exists {
        return Err(AppError::unauthorized("Account no longer exists"));
    }

    if !allowed_roles.contains(&auth_user.role()) {
        return Err(AppError::forbidden(format!(
            "Access denied. Required one of: {:?}",
            allowed_roles
        )));
    }

    let req = Request::from_parts(parts, body);
    Ok(next.run(req).await)
}

/// Admin-level routes: departmental admins plus the directorate.
pub async fn require_admin(State(state): State<AppState>, req: Request, next: Next) -> Response {
    match require_roles(
        State(state),
        req,
        next,
        vec![
            AccountRole::Admin,
            AccountRole::Director,
            AccountRole::Creator,
        ],
    )
    .await
    {
        Ok(response) => response,
        Err(err) => err.into_response(),
    }
}

/// Leadership routes: hod and above. Gate for professor management.
pub async fn require_leadership(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    match require_roles(
        State(state),
        req,
        next,
        vec![
            AccountRole::Hod,
            AccountRole::Director,
            AccountRole::Creator,
        ],
    )
    .await
    {
        Ok(response) => response,
        Err(err) => err.into_response(),
    }
}

/// In-handler check for routes whose gate depends on the request body.
pub fn check_any_role(auth_user: &AuthUser, allowed_roles: &[AccountRole]) -> Result<(), AppError> {
    if !allowed_roles.contains(&auth_user.role()) {
        return Err(AppError::forbidden(format!(
            "Access denied. Required one of: {:?}",
            allowed_roles
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::auth::model::Claims;

    fn auth_user(role: AccountRole) -> AuthUser {
        AuthUser(Claims {
            sub: Uuid::new_v4().to_string(),
            email: "test@collegia.edu".to_string(),
            role,
            department: None,
            exp: 9999999999,
            iat: 1234567890,
        })
    }

    #[test]
    fn check_any_role_accepts_listed_roles() {
        let user = auth_user(AccountRole::Professor);
        assert!(check_any_role(&user, &[AccountRole::Professor, AccountRole::Hod]).is_ok());
    }

    #[test]
    fn check_any_role_rejects_unlisted_roles() {
        let user = auth_user(AccountRole::Student);
        assert!(check_any_role(&user, &[AccountRole::Professor]).is_err());
    }
}
