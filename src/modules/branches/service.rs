use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use crate::modules::branches::model::{
    Branch, BranchFilterParams, CreateBranchDto, UpdateBranchDto,
};
use crate::utils::errors::AppError;

const BRANCH_COLUMNS: &str =
    "id, name, code, department, capacity, establishment_year, number_of_semesters, created_at, updated_at";

pub struct BranchService;

impl BranchService {
    #[instrument(skip(db, dto))]
    pub async fn create_branch(db: &PgPool, dto: CreateBranchDto) -> Result<Branch, AppError> {
        let branch = sqlx::query_as::<_, Branch>(&format!(
            "INSERT INTO branches
                 (name, code, department, capacity, establishment_year, number_of_semesters)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {BRANCH_COLUMNS}"
        ))
        .bind(&dto.name)
        .bind(&dto.code)
        .bind(&dto.department)
        .bind(dto.capacity)
        .bind(dto.establishment_year)
        .bind(dto.number_of_semesters)
        .fetch_one(db)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::conflict(anyhow::anyhow!(
                        "Branch with this name or code already exists"
                    ));
                }
            }
            AppError::database(anyhow::Error::from(e))
        })?;

        Ok(branch)
    }

    #[instrument(skip(db, params))]
    pub async fn get_branches(
        db: &PgPool,
        params: &BranchFilterParams,
    ) -> Result<(Vec<Branch>, i64), AppError> {
        let branches = sqlx::query_as::<_, Branch>(&format!(
            "SELECT {BRANCH_COLUMNS} FROM branches
             WHERE ($1::text IS NULL OR department = $1)
             ORDER BY code
             LIMIT $2 OFFSET $3"
        ))
        .bind(params.department.as_deref())
        .bind(params.pagination.limit())
        .bind(params.pagination.offset())
        .fetch_all(db)
        .await
        .map_err(AppError::database)?;

        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM branches WHERE ($1::text IS NULL OR department = $1)",
        )
        .bind(params.department.as_deref())
        .fetch_one(db)
        .await
        .map_err(AppError::database)?;

        Ok((branches, total))
    }

    #[instrument(skip(db))]
    pub async fn get_branch(db: &PgPool, id: Uuid) -> Result<Branch, AppError> {
        let branch = sqlx::query_as::<_, Branch>(&format!(
            "SELECT {BRANCH_COLUMNS} FROM branches WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await
        .map_err(AppError::database)?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Branch not found")))?;

        Ok(branch)
    }

    #[instrument(skip(db, dto))]
    pub async fn update_branch(
        db: &PgPool,
        id: Uuid,
        dto: UpdateBranchDto,
    ) -> Result<Branch, AppError> {
        let existing = Self::get_branch(db, id).await?;

        let branch = sqlx::query_as::<_, Branch>(&format!(
            "UPDATE branches
             SET name = $1, code = $2, department = $3, capacity = $4,
                 number_of_semesters = $5, updated_at = NOW()
             WHERE id = $6
             RETURNING {BRANCH_COLUMNS}"
        ))
        .bind(dto.name.unwrap_or(existing.name))
        .bind(dto.code.unwrap_or(existing.code))
        .bind(dto.department.unwrap_or(existing.department))
        .bind(dto.capacity.unwrap_or(existing.capacity))
        .bind(dto.number_of_semesters.unwrap_or(existing.number_of_semesters))
        .bind(id)
        .fetch_one(db)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::conflict(anyhow::anyhow!(
                        "Branch with this name or code already exists"
                    ));
                }
            }
            AppError::database(anyhow::Error::from(e))
        })?;

        Ok(branch)
    }

    /// Delete a branch, refusing while anything still references it.
    ///
    /// The cascade check and the delete run in one transaction so a student
    /// enrolled concurrently cannot be orphaned.
    #[instrument(skip(db))]
    pub async fn delete_branch(db: &PgPool, id: Uuid) -> Result<(), AppError> {
        let mut tx = db.begin().await.map_err(AppError::database)?;

        let student_count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM student_profiles WHERE branch_id = $1",
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await
        .map_err(AppError::database)?;

        if student_count > 0 {
            return Err(AppError::conflict(anyhow::anyhow!(
                "Branch has {} enrolled students and cannot be deleted",
                student_count
            )));
        }

        let subject_count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM subjects WHERE branch_id = $1")
                .bind(id)
                .fetch_one(&mut *tx)
                .await
                .map_err(AppError::database)?;

        if subject_count > 0 {
            return Err(AppError::conflict(anyhow::anyhow!(
                "Branch has {} subjects and cannot be deleted",
                subject_count
            )));
        }

        let result = sqlx::query("DELETE FROM branches WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::database)?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow::anyhow!("Branch not found")));
        }

        tx.commit().await.map_err(AppError::database)?;

        Ok(())
    }
}
