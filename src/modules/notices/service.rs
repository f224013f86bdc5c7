use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use crate::modules::accounts::model::AccountRole;
use crate::modules::notices::model::{CreateNoticeDto, Notice, NoticeScope};
use crate::utils::errors::AppError;

const NOTICE_COLUMNS: &str =
    "id, title, message, scope, branch_id, semester, is_read, created_by, created_at";

pub struct NoticeService;

impl NoticeService {
    #[instrument(skip(db, dto))]
    pub async fn create_notice(
        db: &PgPool,
        created_by: Uuid,
        dto: CreateNoticeDto,
    ) -> Result<Notice, AppError> {
        if dto.scope == NoticeScope::Class && (dto.branch_id.is_none() || dto.semester.is_none()) {
            return Err(AppError::bad_request(anyhow::anyhow!(
                "Class-scoped notices require branch_id and semester"
            )));
        }

        let notice = sqlx::query_as::<_, Notice>(&format!(
            "INSERT INTO notices (title, message, scope, branch_id, semester, created_by)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {NOTICE_COLUMNS}"
        ))
        .bind(&dto.title)
        .bind(&dto.message)
        .bind(dto.scope)
        .bind(dto.branch_id)
        .bind(dto.semester)
        .bind(created_by)
        .fetch_one(db)
        .await
        .map_err(AppError::database)?;

        Ok(notice)
    }

    /// Notices visible to an account, by role:
    /// students see `all`, `students`, and their own class; professors see
    /// `all` and `professors`; management roles see everything.
    #[instrument(skip(db))]
    pub async fn get_visible_notices(
        db: &PgPool,
        account_id: Uuid,
        role: AccountRole,
    ) -> Result<Vec<Notice>, AppError> {
        let notices = match role {
            AccountRole::Student => {
                let profile = sqlx::query_as::<_, (Uuid, i32)>(
                    "SELECT branch_id, current_semester FROM student_profiles
                     WHERE account_id = $1",
                )
                .bind(account_id)
                .fetch_optional(db)
                .await
                .map_err(AppError::database)?;

                let (branch_id, semester) = match profile {
                    Some(p) => (Some(p.0), Some(p.1)),
                    None => (None, None),
                };

                sqlx::query_as::<_, Notice>(&format!(
                    "SELECT {NOTICE_COLUMNS} FROM notices
                     WHERE scope IN ('all', 'students')
                        OR (scope = 'class' AND branch_id = $1 AND semester = $2)
                     ORDER BY created_at DESC"
                ))
                .bind(branch_id)
                .bind(semester)
                .fetch_all(db)
                .await
            }
            AccountRole::Professor => {
                sqlx::query_as::<_, Notice>(&format!(
                    "SELECT {NOTICE_COLUMNS} FROM notices
                     WHERE scope IN ('all', 'professors')
                     ORDER BY created_at DESC"
                ))
                .fetch_all(db)
                .await
            }
            _ => {
                sqlx::query_as::<_, Notice>(&format!(
                    "SELECT {NOTICE_COLUMNS} FROM notices ORDER BY created_at DESC"
                ))
                .fetch_all(db)
                .await
            }
        }
        .map_err(AppError::database)?;

        Ok(notices)
    }

    #[instrument(skip(db))]
    pub async fn get_notice(db: &PgPool, id: Uuid) -> Result<Notice, AppError> {
        let notice = sqlx::query_as::<_, Notice>(&format!(
            "SELECT {NOTICE_COLUMNS} FROM notices WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await
        .map_err(AppError::database)?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Notice not found")))?;

        Ok(notice)
    }

    #[instrument(skip(db))]
    pub async fn mark_read(db: &PgPool, id: Uuid) -> Result<Notice, AppError> {
        let notice = sqlx::query_as::<_, Notice>(&format!(
            "UPDATE notices SET is_read = TRUE WHERE id = $1 RETURNING {NOTICE_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(db)
        .await
        .map_err(AppError::database)?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Notice not found")))?;

        Ok(notice)
    }

    #[instrument(skip(db))]
    pub async fn delete_notice(db: &PgPool, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM notices WHERE id = $1")
            .bind(id)
            .execute(db)
            .await
            .map_err(AppError::database)?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow::anyhow!("Notice not found")));
        }

        Ok(())
    }
}
