use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use crate::modules::students::model::{
    CreateStudentDto, RosterImportFailure, RosterImportReport, RosterRow, Student,
    StudentFilterParams, UpdateStudentDto,
};
use crate::utils::errors::AppError;
use crate::utils::password::hash_password;

// Joined view over the profile and its account.
const STUDENT_SELECT: &str = "SELECT sp.id, sp.scholar_number, a.name, a.email, sp.mobile,
        sp.hostel, sp.current_semester, sp.branch_id, sp.account_id, sp.created_at, sp.updated_at
 FROM student_profiles sp
 JOIN accounts a ON a.id = sp.account_id";

pub struct StudentService;

impl StudentService {
    /// Create a student account and its profile as one unit.
    ///
    /// Both inserts run in a single transaction: a duplicate scholar number
    /// discovered after the account insert rolls the account back too, so no
    /// account-without-profile state ever becomes visible. The duplicate
    /// prechecks run inside the same transaction; the unique indexes on
    /// `accounts.email` and `student_profiles.scholar_number` are the
    /// backstop against concurrent creations.
    #[instrument(skip(db, dto))]
    pub async fn create_student(db: &PgPool, dto: CreateStudentDto) -> Result<Student, AppError> {
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

        let scholar_taken = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM student_profiles WHERE scholar_number = $1)",
        )
        .bind(&dto.scholar_number)
        .fetch_one(&mut *tx)
        .await
        .map_err(AppError::database)?;

        if scholar_taken {
            return Err(AppError::conflict(anyhow::anyhow!(
                "Student with scholar number {} already exists",
                dto.scholar_number
            )));
        }

        let branch_exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM branches WHERE id = $1)",
        )
        .bind(dto.branch_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(AppError::database)?;

        if !branch_exists {
            return Err(AppError::not_found(anyhow::anyhow!("Branch not found")));
        }

        let account_id = sqlx::query_scalar::<_, Uuid>(
            "INSERT INTO accounts (name, email, password, role)
             VALUES ($1, $2, $3, 'student')
             RETURNING id",
        )
        .bind(&dto.name)
        .bind(&dto.email)
        .bind(&hashed_password)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| Self::map_unique_violation(e, "email already exists"))?;

        let profile_id = sqlx::query_scalar::<_, Uuid>(
            "INSERT INTO student_profiles
                 (account_id, scholar_number, mobile, hostel, current_semester, branch_id)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING id",
        )
        .bind(account_id)
        .bind(&dto.scholar_number)
        .bind(dto.mobile.as_deref())
        .bind(dto.hostel.as_deref())
        .bind(dto.current_semester)
        .bind(dto.branch_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| Self::map_unique_violation(e, "scholar number already exists"))?;

        tx.commit().await.map_err(AppError::database)?;

        Self::get_student(db, profile_id).await
    }

    #[instrument(skip(db, params))]
    pub async fn get_students(
        db: &PgPool,
        params: &StudentFilterParams,
    ) -> Result<(Vec<Student>, i64), AppError> {
        let students = sqlx::query_as::<_, Student>(&format!(
            "{STUDENT_SELECT}
             WHERE ($1::uuid IS NULL OR sp.branch_id = $1)
               AND ($2::int IS NULL OR sp.current_semester = $2)
             ORDER BY sp.scholar_number
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
            "SELECT COUNT(*) FROM student_profiles sp
             WHERE ($1::uuid IS NULL OR sp.branch_id = $1)
               AND ($2::int IS NULL OR sp.current_semester = $2)",
        )
        .bind(params.branch_id)
        .bind(params.semester)
        .fetch_one(db)
        .await
        .map_err(AppError::database)?;

        Ok((students, total))
    }

    #[instrument(skip(db))]
    pub async fn get_student(db: &PgPool, id: Uuid) -> Result<Student, AppError> {
        let student = sqlx::query_as::<_, Student>(&format!("{STUDENT_SELECT} WHERE sp.id = $1"))
            .bind(id)
            .fetch_optional(db)
            .await
            .map_err(AppError::database)?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Student not found")))?;

        Ok(student)
    }

    /// Update profile fields and, when name/email are patched, the linked
    /// account row — both in one transaction so a failed account write never
    /// leaves a half-updated pair.
    #[instrument(skip(db, dto))]
    pub async fn update_student(
        db: &PgPool,
        id: Uuid,
        dto: UpdateStudentDto,
    ) -> Result<Student, AppError> {
        let mut tx = db.begin().await.map_err(AppError::database)?;

        let existing = sqlx::query_as::<_, Student>(&format!(
            "{STUDENT_SELECT} WHERE sp.id = $1 FOR UPDATE OF sp, a"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(AppError::database)?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Student not found")))?;

        if let Some(branch_id) = dto.branch_id {
            let branch_exists = sqlx::query_scalar::<_, bool>(
                "SELECT EXISTS(SELECT 1 FROM branches WHERE id = $1)",
            )
            .bind(branch_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(AppError::database)?;

            if !branch_exists {
                return Err(AppError::not_found(anyhow::anyhow!("Branch not found")));
            }
        }

        let mobile = dto.mobile.or(existing.mobile);
        let hostel = dto.hostel.or(existing.hostel);
        let current_semester = dto.current_semester.unwrap_or(existing.current_semester);
        let branch_id = dto.branch_id.unwrap_or(existing.branch_id);

        sqlx::query(
            "UPDATE student_profiles
             SET mobile = $1, hostel = $2, current_semester = $3, branch_id = $4, updated_at = NOW()
             WHERE id = $5",
        )
        .bind(mobile.as_deref())
        .bind(hostel.as_deref())
        .bind(current_semester)
        .bind(branch_id)
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(AppError::database)?;

        if dto.name.is_some() || dto.email.is_some() {
            let name = dto.name.unwrap_or(existing.name);
            let email = dto.email.unwrap_or(existing.email);

            sqlx::query(
                "UPDATE accounts SET name = $1, email = $2, updated_at = NOW() WHERE id = $3",
            )
            .bind(&name)
            .bind(&email)
            .bind(existing.account_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| Self::map_unique_violation(e, "email already exists"))?;
        }

        tx.commit().await.map_err(AppError::database)?;

        Self::get_student(db, id).await
    }

    /// Delete the profile and its account as one unit.
    #[instrument(skip(db))]
    pub async fn delete_student(db: &PgPool, id: Uuid) -> Result<(), AppError> {
        let mut tx = db.begin().await.map_err(AppError::database)?;

        let account_id = sqlx::query_scalar::<_, Uuid>(
            "SELECT account_id FROM student_profiles WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(AppError::database)?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Student not found")))?;

        sqlx::query("DELETE FROM student_profiles WHERE id = $1")
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

    /// Bulk roster import.
    ///
    /// Each row goes through the same transactional create as the single
    /// endpoint, so one bad row fails alone and leaves no partial state.
    /// Row validation happens here, not in the CSV parser.
    #[instrument(skip(db, csv_text))]
    pub async fn import_roster(
        db: &PgPool,
        branch_id: Uuid,
        csv_text: &str,
    ) -> Result<RosterImportReport, AppError> {
        let branch_exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM branches WHERE id = $1)",
        )
        .bind(branch_id)
        .fetch_one(db)
        .await
        .map_err(AppError::database)?;

        if !branch_exists {
            return Err(AppError::not_found(anyhow::anyhow!("Branch not found")));
        }

        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(csv_text.as_bytes());

        let mut imported = 0;
        let mut failures = Vec::new();

        for (index, record) in reader.deserialize::<RosterRow>().enumerate() {
            let line = index + 2; // header is line 1

            let row = match record {
                Ok(row) => row,
                Err(e) => {
                    failures.push(RosterImportFailure {
                        line,
                        reason: format!("Malformed row: {}", e),
                    });
                    continue;
                }
            };

            let dto = CreateStudentDto {
                name: row.name,
                email: row.email,
                password: row.password,
                scholar_number: row.scholar_number,
                mobile: row.mobile,
                hostel: row.hostel,
                current_semester: row.current_semester,
                branch_id,
            };

            if let Err(e) = dto.validate() {
                failures.push(RosterImportFailure {
                    line,
                    reason: format!("Validation failed: {}", e),
                });
                continue;
            }

            match Self::create_student(db, dto).await {
                Ok(_) => imported += 1,
                Err(e) => failures.push(RosterImportFailure {
                    line,
                    reason: e.error.to_string(),
                }),
            }
        }

        Ok(RosterImportReport { imported, failures })
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
