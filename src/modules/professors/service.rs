use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use crate::modules::professors::model::{
    AssignSubjectDto, CreateProfessorDto, Professor, ProfessorFilterParams, SubjectAssignment,
    UpdateProfessorDto,
};
use crate::utils::errors::AppError;
use crate::utils::password::hash_password;

const PROFESSOR_SELECT: &str = "SELECT pp.id, pp.employee_number, a.name, a.email, pp.department,
        pp.contact, pp.first_login, pp.account_id, pp.created_at, pp.updated_at
 FROM professor_profiles pp
 JOIN accounts a ON a.id = pp.account_id";

pub struct ProfessorService;

impl ProfessorService {
    /// Create a professor account and its profile as one unit, with the
    /// same transaction discipline as student creation; `employee_number`
    /// is the uniqueness key.
    #[instrument(skip(db, dto))]
    pub async fn create_professor(
        db: &PgPool,
        dto: CreateProfessorDto,
    ) -> Result<Professor, AppError> {
        let hashed_password = hash_password(&dto.password)?;

        let mut tx = db.begin().await.map_err(AppError::database)?;

        let email_taken = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM accounts WHERE email = $1)",
        )
        .bind(&dto.email)
        .fetch_one(&mut *tx)
        .await
        .map_err(AppError::database)?;

        if email_taken {
            return Err(AppError::conflict(anyhow::anyhow!(
                "Account with email {} already exists",
                dto.email
            )));
        }

        let employee_taken = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM professor_profiles WHERE employee_number = $1)",
        )
        .bind(&dto.employee_number)
        .fetch_one(&mut *tx)
        .await
        .map_err(AppError::database)?;

        if employee_taken {
            return Err(AppError::conflict(anyhow::anyhow!(
                "Professor with employee number {} already exists",
                dto.employee_number
            )));
        }

        let account_id = sqlx::query_scalar::<_, Uuid>(
            "INSERT INTO accounts (name, email, password, role, department)
             VALUES ($1, $2, $3, 'professor', $4)
             RETURNING id",
        )
        .bind(&dto.name)
        .bind(&dto.email)
        .bind(&hashed_password)
        .bind(&dto.department)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| Self::map_unique_violation(e, "email already exists"))?;

        let profile_id = sqlx::query_scalar::<_, Uuid>(
            "INSERT INTO professor_profiles (account_id, employee_number, department, contact)
             VALUES ($1, $2, $3, $4)
             RETURNING id",
        )
        .bind(account_id)
        .bind(&dto.employee_number)
        .bind(&dto.department)
        .bind(dto.contact.as_deref())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| Self::map_unique_violation(e, "employee number already exists"))?;

        tx.commit().await.map_err(AppError::database)?;

        Self::get_professor(db, profile_id).await
    }

    #[instrument(skip(db, params))]
    pub async fn get_professors(
        db: &PgPool,
        params: &ProfessorFilterParams,
    ) -> Result<(Vec<Professor>, i64), AppError> {
        let professors = sqlx::query_as::<_, Professor>(&format!(
            "{PROFESSOR_SELECT}
             WHERE ($1::text IS NULL OR pp.department = $1)
             ORDER BY pp.employee_number
             LIMIT $2 OFFSET $3"
        ))
        .bind(params.department.as_deref())
        .bind(params.pagination.limit())
        .bind(params.pagination.offset())
        .fetch_all(db)
        .await
        .map_err(AppError::database)?;

        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM professor_profiles pp
             WHERE ($1::text IS NULL OR pp.department = $1)",
        )
        .bind(params.department.as_deref())
        .fetch_one(db)
        .await
        .map_err(AppError::database)?;

        Ok((professors, total))
    }

    #[instrument(skip(db))]
    pub async fn get_professor(db: &PgPool, id: Uuid) -> Result<Professor, AppError> {
        let professor =
            sqlx::query_as::<_, Professor>(&format!("{PROFESSOR_SELECT} WHERE pp.id = $1"))
                .bind(id)
                .fetch_optional(db)
                .await
                .map_err(AppError::database)?
                .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Professor not found")))?;

        Ok(professor)
    }

    #[instrument(skip(db, dto))]
    pub async fn update_professor(
        db: &PgPool,
        id: Uuid,
        dto: UpdateProfessorDto,
    ) -> Result<Professor, AppError> {
        let mut tx = db.begin().await.map_err(AppError::database)?;

        let existing = sqlx::query_as::<_, Professor>(&format!(
            "{PROFESSOR_SELECT} WHERE pp.id = $1 FOR UPDATE OF pp, a"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(AppError::database)?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Professor not found")))?;

        let department = dto.department.clone().unwrap_or(existing.department);
        let contact = dto.contact.or(existing.contact);

        sqlx::query(
            "UPDATE professor_profiles
             SET department = $1, contact = $2, updated_at = NOW()
             WHERE id = $3",
        )
        .bind(&department)
        .bind(contact.as_deref())
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(AppError::database)?;

        // The account mirrors name/email and the department scope.
        let name = dto.name.unwrap_or(existing.name);
        let email = dto.email.unwrap_or(existing.email);

        sqlx::query(
            "UPDATE accounts SET name = $1, email = $2, department = $3, updated_at = NOW()
             WHERE id = $4",
        )
        .bind(&name)
        .bind(&email)
        .bind(&department)
        .bind(existing.account_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| Self::map_unique_violation(e, "email already exists"))?;

        tx.commit().await.map_err(AppError::database)?;

        Self::get_professor(db, id).await
    }

    #[instrument(skip(db))]
    pub async fn delete_professor(db: &PgPool, id: Uuid) -> Result<(), AppError> {
        let mut tx = db.begin().await.map_err(AppError::database)?;

        let account_id = sqlx::query_scalar::<_, Uuid>(
            "SELECT account_id FROM professor_profiles WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(AppError::database)?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Professor not found")))?;

        sqlx::query("DELETE FROM professor_profiles WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::database)?;

        sqlx::query("DELETE FROM accounts WHERE id = $1")
            .bind(account_id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::database)?;

        tx.commit().await.map_err(AppError::database)?;

        Ok(())
    }

    #[instrument(skip(db, dto))]
    pub async fn assign_subject(
        db: &PgPool,
        professor_id: Uuid,
        dto: AssignSubjectDto,
    ) -> Result<SubjectAssignment, AppError> {
        // Validate both ends before touching the join table.
        Self::get_professor(db, professor_id).await?;

        let subject = sqlx::query_as::<_, (String, String)>(
            "SELECT name, code FROM subjects WHERE id = $1",
        )
        .bind(dto.subject_id)
        .fetch_optional(db)
        .await
        .map_err(AppError::database)?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Subject not found")))?;

        sqlx::query(
            "INSERT INTO professor_subjects (professor_id, subject_id, semester, branch_id)
             VALUES ($1, $2, $3, $4)",
        )
        .bind(professor_id)
        .bind(dto.subject_id)
        .bind(dto.semester)
        .bind(dto.branch_id)
        .execute(db)
        .await
        .map_err(|e| Self::map_unique_violation(e, "subject already assigned to this professor"))?;

        Ok(SubjectAssignment {
            subject_id: dto.subject_id,
            subject_name: subject.0,
            subject_code: subject.1,
            semester: dto.semester,
            branch_id: dto.branch_id,
        })
    }

    #[instrument(skip(db))]
    pub async fn get_subject_assignments(
        db: &PgPool,
        professor_id: Uuid,
    ) -> Result<Vec<SubjectAssignment>, AppError> {
        Self::get_professor(db, professor_id).await?;

        let assignments = sqlx::query_as::<_, SubjectAssignment>(
            "SELECT ps.subject_id, s.name AS subject_name, s.code AS subject_code,
                    ps.semester, ps.branch_id
             FROM professor_subjects ps
             JOIN subjects s ON s.id = ps.subject_id
             WHERE ps.professor_id = $1
             ORDER BY ps.semester, s.code",
        )
        .bind(professor_id)
        .fetch_all(db)
        .await
        .map_err(AppError::database)?;

        Ok(assignments)
    }

    fn map_unique_violation(e: sqlx::Error, message: &str) -> AppError {
        if let sqlx::Error::Database(db_err) = &e {
            if db_err.is_unique_violation() {
                return AppError::conflict(anyhow::anyhow!("{}", message));
            }
        }
        AppError::database(anyhow::Error::from(e))
    }
}
