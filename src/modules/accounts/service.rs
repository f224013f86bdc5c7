use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use crate::modules::accounts::model::{
    Account, AccountFilterParams, ChangePasswordDto, CreateAccountDto, UpdateProfileDto,
};
use crate::utils::errors::AppError;
use crate::utils::password::{hash_password, verify_password};

const ACCOUNT_COLUMNS: &str = "id, name, email, role, department, created_at, updated_at";

pub struct AccountService;

impl AccountService {
    #[instrument(skip(db))]
    pub async fn get_account(db: &PgPool, id: Uuid) -> Result<Account, AppError> {
        let account = sqlx::query_as::<_, Account>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await
        .map_err(AppError::database)?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Account not found")))?;

        Ok(account)
    }

    #[instrument(skip(db, params))]
    pub async fn list_accounts(
        db: &PgPool,
        params: &AccountFilterParams,
    ) -> Result<(Vec<Account>, i64), AppError> {
        let accounts = sqlx::query_as::<_, Account>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts
             WHERE ($1::account_role IS NULL OR role = $1)
               AND ($2::text IS NULL OR department = $2)
             ORDER BY name
             LIMIT $3 OFFSET $4"
        ))
        .bind(params.role)
        .bind(params.department.as_deref())
        .bind(params.pagination.limit())
        .bind(params.pagination.offset())
        .fetch_all(db)
        .await
        .map_err(AppError::database)?;

        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM accounts
             WHERE ($1::account_role IS NULL OR role = $1)
               AND ($2::text IS NULL OR department = $2)",
        )
        .bind(params.role)
        .bind(params.department.as_deref())
        .fetch_one(db)
        .await
        .map_err(AppError::database)?;

        Ok((accounts, total))
    }

    #[instrument(skip(db, dto))]
    pub async fn create_account(db: &PgPool, dto: CreateAccountDto) -> Result<Account, AppError> {
        let hashed_password = hash_password(&dto.password)?;

        let account = sqlx::query_as::<_, Account>(&format!(
            "INSERT INTO accounts (name, email, password, role, department)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {ACCOUNT_COLUMNS}"
        ))
        .bind(&dto.name)
        .bind(&dto.email)
        .bind(&hashed_password)
        .bind(dto.role)
        .bind(dto.department.as_deref())
        .fetch_one(db)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::conflict(anyhow::anyhow!(
                        "Account with email {} already exists",
                        dto.email
                    ));
                }
            }
            AppError::database(anyhow::Error::from(e))
        })?;

        Ok(account)
    }

    #[instrument(skip(db, dto))]
    pub async fn update_profile(
        db: &PgPool,
        id: Uuid,
        dto: UpdateProfileDto,
    ) -> Result<Account, AppError> {
        let account = sqlx::query_as::<_, Account>(&format!(
            "UPDATE accounts SET name = $1, updated_at = NOW()
             WHERE id = $2
             RETURNING {ACCOUNT_COLUMNS}"
        ))
        .bind(&dto.name)
        .bind(id)
        .fetch_optional(db)
        .await
        .map_err(AppError::database)?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Account not found")))?;

        Ok(account)
    }

    #[instrument(skip(db, dto))]
    pub async fn change_password(
        db: &PgPool,
        id: Uuid,
        dto: ChangePasswordDto,
    ) -> Result<(), AppError> {
        let current_hash = sqlx::query_scalar::<_, String>(
            "SELECT password FROM accounts WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(db)
        .await
        .map_err(AppError::database)?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Account not found")))?;

        if !verify_password(&dto.current_password, &current_hash)? {
            return Err(AppError::unauthorized("Current password is incorrect"));
        }

        let hashed = hash_password(&dto.new_password)?;

        sqlx::query("UPDATE accounts SET password = $1, updated_at = NOW() WHERE id = $2")
            .bind(&hashed)
            .bind(id)
            .execute(db)
            .await
            .map_err(AppError::database)?;

        Ok(())
    }

    /// Delete an account and any profile row referencing it, as one unit.
    ///
    /// Callers are responsible for the policy check (creator accounts are
    /// never deletable).
    #[instrument(skip(db))]
    pub async fn delete_account(db: &PgPool, id: Uuid) -> Result<(), AppError> {
        let mut tx = db.begin().await.map_err(AppError::database)?;

        sqlx::query("DELETE FROM student_profiles WHERE account_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::database)?;

        sqlx::query("DELETE FROM professor_profiles WHERE account_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::database)?;

        let result = sqlx::query("DELETE FROM accounts WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::database)?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow::anyhow!("Account not found")));
        }

        tx.commit().await.map_err(AppError::database)?;

        Ok(())
    }
}
