use chrono::{Duration, Utc};
use sqlx::PgPool;
use tracing::{instrument, warn};
use uuid::Uuid;

use crate::config::email::EmailConfig;
use crate::config::jwt::JwtConfig;
use crate::modules::accounts::model::AccountWithPassword;
use crate::utils::email::EmailService;
use crate::utils::errors::AppError;
use crate::utils::jwt::create_access_token;
use crate::utils::password::{hash_password, verify_password};
use crate::utils::token::{generate_reset_token, hash_reset_token};

use super::model::{ForgotPasswordRequest, LoginRequest, LoginResponse, ResetPasswordRequest};

const RESET_TOKEN_TTL_MINUTES: i64 = 30;

pub struct AuthService;

impl AuthService {
    #[instrument(skip(db, dto, jwt_config))]
    pub async fn login(
        db: &PgPool,
        dto: LoginRequest,
        jwt_config: &JwtConfig,
    ) -> Result<LoginResponse, AppError> {
        let account = sqlx::query_as::<_, AccountWithPassword>(
            "SELECT id, name, email, password, role, department, created_at, updated_at
             FROM accounts WHERE email = $1",
        )
        .bind(&dto.email)
        .fetch_optional(db)
        .await
        .map_err(AppError::database)?
        .ok_or_else(|| AppError::unauthorized("Invalid email or password"))?;

        if !verify_password(&dto.password, &account.password)? {
            return Err(AppError::unauthorized("Invalid email or password"));
        }

        let account = account.into_account();
        let access_token = create_access_token(&account, jwt_config)?;

        Ok(LoginResponse {
            access_token,
            account,
        })
    }

    /// Start a password reset.
    ///
    /// Succeeds silently when the email is unknown so the endpoint cannot be
    /// used to probe which addresses have accounts. Only the token's hash is
    /// stored; the raw token goes out in the email. A failed email send is a
    /// real error here: the caller has no other way to get the link.
    #[instrument(skip(db, dto, email_config))]
    pub async fn forgot_password(
        db: &PgPool,
        dto: ForgotPasswordRequest,
        email_config: &EmailConfig,
    ) -> Result<(), AppError> {
        let account = sqlx::query_as::<_, (Uuid, String)>(
            "SELECT id, name FROM accounts WHERE email = $1",
        )
        .bind(&dto.email)
        .fetch_optional(db)
        .await
        .map_err(AppError::database)?;

        let Some((account_id, name)) = account else {
            return Ok(());
        };

        let raw_token = generate_reset_token();
        let token_hash = hash_reset_token(&raw_token);
        let expires_at = Utc::now() + Duration::minutes(RESET_TOKEN_TTL_MINUTES);

        let mut tx = db.begin().await.map_err(AppError::database)?;

        // One live token per account: a new request supersedes earlier ones.
        sqlx::query("DELETE FROM password_reset_tokens WHERE account_id = $1 AND kind = 'reset'")
            .bind(account_id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::database)?;

        sqlx::query(
            "INSERT INTO password_reset_tokens (account_id, token_hash, kind, expires_at)
             VALUES ($1, $2, 'reset', $3)",
        )
        .bind(account_id)
        .bind(&token_hash)
        .bind(expires_at)
        .execute(&mut *tx)
        .await
        .map_err(AppError::database)?;

        tx.commit().await.map_err(AppError::database)?;

        EmailService::new(email_config.clone())
            .send_password_reset_email(&dto.email, &name, &raw_token)
            .await?;

        Ok(())
    }

    /// Redeem a reset token.
    ///
    /// The token must be unused and unexpired; it is consumed only after the
    /// account's password has been updated, inside the same transaction, so
    /// a failed update leaves the token redeemable.
    #[instrument(skip(db, raw_token, dto, email_config))]
    pub async fn reset_password(
        db: &PgPool,
        raw_token: &str,
        dto: ResetPasswordRequest,
        email_config: &EmailConfig,
    ) -> Result<(), AppError> {
        let token_hash = hash_reset_token(raw_token);
        let hashed_password = hash_password(&dto.password)?;

        let mut tx = db.begin().await.map_err(AppError::database)?;

        let token = sqlx::query_as::<_, (Uuid, Uuid)>(
            "SELECT id, account_id FROM password_reset_tokens
             WHERE token_hash = $1 AND used = FALSE AND expires_at > NOW()
             FOR UPDATE",
        )
        .bind(&token_hash)
        .fetch_optional(&mut *tx)
        .await
        .map_err(AppError::database)?;

        let Some((token_id, account_id)) = token else {
            return Err(AppError::bad_request(anyhow::anyhow!(
                "Invalid or expired reset token"
            )));
        };

        let updated = sqlx::query(
            "UPDATE accounts SET password = $1, updated_at = NOW() WHERE id = $2",
        )
        .bind(&hashed_password)
        .bind(account_id)
        .execute(&mut *tx)
        .await
        .map_err(AppError::database)?;

        if updated.rows_affected() == 0 {
            return Err(AppError::bad_request(anyhow::anyhow!(
                "Invalid or expired reset token"
            )));
        }

        sqlx::query("DELETE FROM password_reset_tokens WHERE id = $1")
            .bind(token_id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::database)?;

        tx.commit().await.map_err(AppError::database)?;

        let account = sqlx::query_as::<_, (String, String)>(
            "SELECT name, email FROM accounts WHERE id = $1",
        )
        .bind(account_id)
        .fetch_optional(db)
        .await
        .map_err(AppError::database)?;

        // Confirmation email is best-effort; the reset itself already took.
        if let Some((name, email)) = account {
            if let Err(e) = EmailService::new(email_config.clone())
                .send_password_reset_confirmation(&email, &name)
                .await
            {
                warn!(error = %e.error, "Failed to send reset confirmation email");
            }
        }

        Ok(())
    }
}
