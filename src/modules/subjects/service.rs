use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use crate::modules::subjects::model::{
    CreateSubjectDto, Subject, SubjectFilterParams, UpdateSubjectDto,
};
use crate::utils::errors::AppError;

const SUBJECT_COLUMNS: &str =
    "id, name, code, credits, semester, branch_id, created_at, updated_at";

pub struct SubjectService;

impl SubjectService {
    #[instrument(skip(db, dto))]
    pub async fn create_subject(db: &PgPool, dto: CreateSubjectDto) -> Result<Subject, AppError> {
        let branch_exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM branches WHERE id = $1)",
        )
        .bind(dto.branch_id)
        .fetch_one(db)
        .await
        .map_err(AppError::database)?;

        if !branch_exists {
            return Err(AppError::not_found(anyhow::anyhow!("Branch not found")));
        }

        let subject = sqlx::query_as::<_, Subject>(&format!(
            "INSERT INTO subjects (name, code, credits, semester, branch_id)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {SUBJECT_COLUMNS}"
        ))
        .bind(&dto.name)
        .bind(&dto.code)
        .bind(dto.credits)
        .bind(dto.semester)
        .bind(dto.branch_id)
        .fetch_one(db)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::conflict(anyhow::anyhow!(
                        "Subject with code {} already exists",
                        dto.code
                    ));
                }
            }
            AppError::database(anyhow::Error::from(e))
        })?;

        Ok(subject)
    }

    #[instrument(skip(db, params))]
    pub async fn get_subjects(
        db: &PgPool,
        params: &SubjectFilterParams,
    ) -> Result<(Vec<Subject>, i64), AppError> {
        let subjects = sqlx::query_as::<_, Subject>(&format!(
            "SELECT {SUBJECT_COLUMNS} FROM subjects
             WHERE ($1::uuid IS NULL OR branch_id = $1)
               AND ($2::int IS NULL OR semester = $2)
             ORDER BY code
             LIMIT $3 OFFSET $4"
        ))
        .bind(params.branch_id)
        .bind(params.semester)
        .bind(params.pagination.limit())
        .bind(params.pagination.offset())
        .fetch_all(db)
        .await
        .map_err(AppError::database)?;

        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM subjects
             WHERE ($1::uuid IS NULL OR branch_id = $1)
               AND ($2::int IS NULL OR semester = $2)",
        )
        .bind(params.branch_id)
        .bind(params.semester)
        .fetch_one(db)
        .await
        .map_err(AppError::database)?;

        Ok((subjects, total))
    }

    #[instrument(skip(db))]
    pub async fn get_subject(db: &PgPool, id: Uuid) -> Result<Subject, AppError> {
        let subject = sqlx::query_as::<_, Subject>(&format!(
            "SELECT {SUBJECT_COLUMNS} FROM subjects WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await
        .map_err(AppError::database)?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Subject not found")))?;

        Ok(subject)
    }

    #[instrument(skip(db, dto))]
    pub async fn update_subject(
        db: &PgPool,
        id: Uuid,
        dto: UpdateSubjectDto,
    ) -> Result<Subject, AppError> {
        let existing = Self::get_subject(db, id).await?;

        let subject = sqlx::query_as::<_, Subject>(&format!(
            "UPDATE subjects
             SET name = $1, code = $2, credits = $3, semester = $4, updated_at = NOW()
             WHERE id = $5
             RETURNING {SUBJECT_COLUMNS}"
        ))
        .bind(dto.name.unwrap_or(existing.name))
        .bind(dto.code.unwrap_or(existing.code))
        .bind(dto.credits.unwrap_or(existing.credits))
        .bind(dto.semester.unwrap_or(existing.semester))
        .bind(id)
        .fetch_one(db)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::conflict(anyhow::anyhow!(
                        "Subject with this code already exists"
                    ));
                }
            }
            AppError::database(anyhow::Error::from(e))
        })?;

        Ok(subject)
    }

    #[instrument(skip(db))]
    pub async fn delete_subject(db: &PgPool, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM subjects WHERE id = $1")
            .bind(id)
            .execute(db)
            .await
            .map_err(AppError::database)?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow::anyhow!("Subject not found")));
        }

        Ok(())
    }
}
