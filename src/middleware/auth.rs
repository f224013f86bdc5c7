use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use uuid::Uuid;

use crate::modules::accounts::model::AccountRole;
use crate::modules::auth::model::Claims;
use crate::policy::Actor;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::jwt::verify_token;

/// Extractor that validates the bearer token and provides the authenticated
/// account's claims. Missing, malformed or expired credentials all reject
/// with 401 before the handler runs.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl AuthUser {
    pub fn account_id(&self) -> Result<Uuid, AppError> {
        Uuid::parse_str(&self.0.sub)
            .map_err(|_| AppError::unauthorized("Invalid account ID in token"))
    }

    pub fn role(&self) -> AccountRole {
        self.0.role
    }

    pub fn email(&self) -> &str {
        &self.0.email
    }

    pub fn department(&self) -> Option<&str> {
        self.0.department.as_deref()
    }

    /// The policy-layer view of this principal.
    pub fn actor(&self) -> Result<Actor, AppError> {
        Ok(Actor {
            id: self.account_id()?,
            role: self.0.role,
            department: self.0.department.clone(),
        })
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::unauthorized("Missing authorization header"))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::unauthorized("Invalid authorization header format"))?;

        let claims = verify_token(token, &state.jwt_config)?;

        Ok(AuthUser(claims))
    }
}
