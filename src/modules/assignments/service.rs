use chrono::Utc;
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use crate::modules::assignments::model::{Assignment, CreateAssignment, Submission};
use crate::utils::errors::AppError;

const ASSIGNMENT_COLUMNS: &str =
    "id, course_id, created_by, title, description, due_date, file_key, created_at, updated_at";

const SUBMISSION_COLUMNS: &str =
    "id, assignment_id, student_id, file_key, submitted_at, grade, feedback";

pub struct AssignmentService;

impl AssignmentService {
    #[instrument(skip(db, input))]
    pub async fn create_assignment(
        db: &PgPool,
        course_id: Uuid,
        created_by: Uuid,
        input: CreateAssignment,
    ) -> Result<Assignment, AppError> {
        let course_exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM courses WHERE id = $1)")
                .bind(course_id)
                .fetch_one(db)
                .await
                .map_err(AppError::database)?;

        if !course_exists {
            return Err(AppError::not_found(anyhow::anyhow!("Course not found")));
        }

        let assignment = sqlx::query_as::<_, Assignment>(&format!(
            "INSERT INTO assignments (course_id, created_by, title, description, due_date, file_key)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {ASSIGNMENT_COLUMNS}"
        ))
        .bind(course_id)
        .bind(created_by)
        .bind(&input.title)
        .bind(&input.description)
        .bind(input.due_date)
        .bind(input.file_key.as_deref())
        .fetch_one(db)
        .await
        .map_err(AppError::database)?;

        Ok(assignment)
    }

    #[instrument(skip(db))]
    pub async fn get_course_assignments(
        db: &PgPool,
        course_id: Uuid,
    ) -> Result<Vec<Assignment>, AppError> {
        let assignments = sqlx::query_as::<_, Assignment>(&format!(
            "SELECT {ASSIGNMENT_COLUMNS} FROM assignments
             WHERE course_id = $1
             ORDER BY due_date"
        ))
        .bind(course_id)
        .fetch_all(db)
        .await
        .map_err(AppError::database)?;

        Ok(assignments)
    }

    #[instrument(skip(db))]
    pub async fn get_assignment(db: &PgPool, id: Uuid) -> Result<Assignment, AppError> {
        let assignment = sqlx::query_as::<_, Assignment>(&format!(
            "SELECT {ASSIGNMENT_COLUMNS} FROM assignments WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await
        .map_err(AppError::database)?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Assignment not found")))?;

        Ok(assignment)
    }

    /// Record a submission. The caller has already staged the file; this
    /// only inserts the metadata row. The unique index on
    /// (assignment_id, student_id) enforces one submission per student.
    #[instrument(skip(db))]
    pub async fn submit(
        db: &PgPool,
        assignment_id: Uuid,
        student_id: Uuid,
        file_key: &str,
    ) -> Result<Submission, AppError> {
        let assignment = Self::get_assignment(db, assignment_id).await?;

        if Utc::now() > assignment.due_date {
            return Err(AppError::bad_request(anyhow::anyhow!(
                "Assignment is past its due date"
            )));
        }

        let enrolled = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM course_enrollments
              WHERE course_id = $1 AND student_id = $2)",
        )
        .bind(assignment.course_id)
        .bind(student_id)
        .fetch_one(db)
        .await
        .map_err(AppError::database)?;

        if !enrolled {
            return Err(AppError::forbidden(
                "Student is not enrolled in this assignment's course",
            ));
        }

        let submission = sqlx::query_as::<_, Submission>(&format!(
            "INSERT INTO assignment_submissions (assignment_id, student_id, file_key)
             VALUES ($1, $2, $3)
             RETURNING {SUBMISSION_COLUMNS}"
        ))
        .bind(assignment_id)
        .bind(student_id)
        .bind(file_key)
        .fetch_one(db)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::conflict(anyhow::anyhow!(
                        "Student has already submitted this assignment"
                    ));
                }
            }
            AppError::database(anyhow::Error::from(e))
        })?;

        Ok(submission)
    }

    #[instrument(skip(db))]
    pub async fn get_submissions(
        db: &PgPool,
        assignment_id: Uuid,
    ) -> Result<Vec<Submission>, AppError> {
        Self::get_assignment(db, assignment_id).await?;

        let submissions = sqlx::query_as::<_, Submission>(&format!(
            "SELECT {SUBMISSION_COLUMNS} FROM assignment_submissions
             WHERE assignment_id = $1
             ORDER BY submitted_at"
        ))
        .bind(assignment_id)
        .fetch_all(db)
        .await
        .map_err(AppError::database)?;

        Ok(submissions)
    }

    #[instrument(skip(db, feedback))]
    pub async fn grade_submission(
        db: &PgPool,
        assignment_id: Uuid,
        submission_id: Uuid,
        grade: i32,
        feedback: Option<&str>,
    ) -> Result<Submission, AppError> {
        let submission = sqlx::query_as::<_, Submission>(&format!(
            "UPDATE assignment_submissions
             SET grade = $1, feedback = $2
             WHERE id = $3 AND assignment_id = $4
             RETURNING {SUBMISSION_COLUMNS}"
        ))
        .bind(grade)
        .bind(feedback)
        .bind(submission_id)
        .bind(assignment_id)
        .fetch_optional(db)
        .await
        .map_err(AppError::database)?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Submission not found")))?;

        Ok(submission)
    }
}
