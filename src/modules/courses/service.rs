use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use crate::modules::courses::model::{Course, CourseDetail, CreateCourseDto};
use crate::modules::students::model::Student;
use crate::modules::subjects::model::Subject;
use crate::utils::errors::AppError;

pub struct CourseService;

impl CourseService {
    #[instrument(skip(db, dto))]
    pub async fn create_course(db: &PgPool, dto: CreateCourseDto) -> Result<Course, AppError> {
        let semesters = sqlx::query_scalar::<_, i32>(
            "SELECT number_of_semesters FROM branches WHERE id = $1",
        )
        .bind(dto.branch_id)
        .fetch_optional(db)
        .await
        .map_err(AppError::database)?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Branch not found")))?;

        if dto.semester > semesters {
            return Err(AppError::bad_request(anyhow::anyhow!(
                "Branch has only {} semesters",
                semesters
            )));
        }

        let course = sqlx::query_as::<_, Course>(
            "INSERT INTO courses (branch_id, semester)
             VALUES ($1, $2)
             RETURNING id, branch_id, semester, created_at",
        )
        .bind(dto.branch_id)
        .bind(dto.semester)
        .fetch_one(db)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::conflict(anyhow::anyhow!(
                        "Course for this branch and semester already exists"
                    ));
                }
            }
            AppError::database(anyhow::Error::from(e))
        })?;

        Ok(course)
    }

    #[instrument(skip(db))]
    pub async fn get_courses(db: &PgPool) -> Result<Vec<Course>, AppError> {
        let courses = sqlx::query_as::<_, Course>(
            "SELECT id, branch_id, semester, created_at FROM courses ORDER BY semester",
        )
        .fetch_all(db)
        .await
        .map_err(AppError::database)?;

        Ok(courses)
    }

    #[instrument(skip(db))]
    pub async fn get_course(db: &PgPool, id: Uuid) -> Result<CourseDetail, AppError> {
        let course = sqlx::query_as::<_, Course>(
            "SELECT id, branch_id, semester, created_at FROM courses WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(db)
        .await
        .map_err(AppError::database)?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Course not found")))?;

        // Subjects come from the branch+semester pair, not a join table.
        let subjects = sqlx::query_as::<_, Subject>(
            "SELECT id, name, code, credits, semester, branch_id, created_at, updated_at
             FROM subjects
             WHERE branch_id = $1 AND semester = $2
             ORDER BY code",
        )
        .bind(course.branch_id)
        .bind(course.semester)
        .fetch_all(db)
        .await
        .map_err(AppError::database)?;

        let enrolled_count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM course_enrollments WHERE course_id = $1",
        )
        .bind(id)
        .fetch_one(db)
        .await
        .map_err(AppError::database)?;

        Ok(CourseDetail {
            course,
            subjects,
            enrolled_count,
        })
    }

    /// Enroll a student. The student must belong to the course's branch and
    /// be in the course's semester; re-enrollment conflicts.
    #[instrument(skip(db))]
    pub async fn enroll_student(
        db: &PgPool,
        course_id: Uuid,
        student_id: Uuid,
    ) -> Result<(), AppError> {
        let course = sqlx::query_as::<_, (Uuid, i32)>(
            "SELECT branch_id, semester FROM courses WHERE id = $1",
        )
        .bind(course_id)
        .fetch_optional(db)
        .await
        .map_err(AppError::database)?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Course not found")))?;

        let student = sqlx::query_as::<_, (Uuid, i32)>(
            "SELECT branch_id, current_semester FROM student_profiles WHERE id = $1",
        )
        .bind(student_id)
        .fetch_optional(db)
        .await
        .map_err(AppError::database)?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Student not found")))?;

        if student.0 != course.0 {
            return Err(AppError::bad_request(anyhow::anyhow!(
                "Student belongs to a different branch"
            )));
        }

        if student.1 != course.1 {
            return Err(AppError::bad_request(anyhow::anyhow!(
                "Student is in semester {}, course is for semester {}",
                student.1,
                course.1
            )));
        }

        sqlx::query(
            "INSERT INTO course_enrollments (course_id, student_id) VALUES ($1, $2)",
        )
        .bind(course_id)
        .bind(student_id)
        .execute(db)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::conflict(anyhow::anyhow!(
                        "Student is already enrolled in this course"
                    ));
                }
            }
            AppError::database(anyhow::Error::from(e))
        })?;

        Ok(())
    }

    #[instrument(skip(db))]
    pub async fn get_course_students(
        db: &PgPool,
        course_id: Uuid,
    ) -> Result<Vec<Student>, AppError> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM courses WHERE id = $1)")
                .bind(course_id)
                .fetch_one(db)
                .await
                .map_err(AppError::database)?;

        if !exists {
            return Err(AppError::not_found(anyhow::anyhow!("Course not found")));
        }

        let students = sqlx::query_as::<_, Student>(
            "SELECT sp.id, sp.scholar_number, a.name, a.email, sp.mobile, sp.hostel,
                    sp.current_semester, sp.branch_id, sp.account_id, sp.created_at, sp.updated_at
             FROM course_enrollments ce
             JOIN student_profiles sp ON sp.id = ce.student_id
             JOIN accounts a ON a.id = sp.account_id
             WHERE ce.course_id = $1
             ORDER BY sp.scholar_number",
        )
        .bind(course_id)
        .fetch_all(db)
        .await
        .map_err(AppError::database)?;

        Ok(students)
    }
}
