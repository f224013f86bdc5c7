use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct Assignment {
    pub id: Uuid,
    pub course_id: Uuid,
    pub created_by: Uuid,
    pub title: String,
    pub description: String,
    pub due_date: chrono::DateTime<chrono::Utc>,
    pub file_key: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct Submission {
    pub id: Uuid,
    pub assignment_id: Uuid,
    pub student_id: Uuid,
    pub file_key: String,
    pub submitted_at: chrono::DateTime<chrono::Utc>,
    pub grade: Option<i32>,
    pub feedback: Option<String>,
}

/// Parsed from the multipart form of `POST /courses/{id}/assignments`.
#[derive(Debug, Clone, Validate)]
pub struct CreateAssignment {
    #[validate(length(min = 1))]
    pub title: String,
    #[validate(length(min = 1))]
    pub description: String,
    pub due_date: chrono::DateTime<chrono::Utc>,
    pub file_key: Option<String>,
}

#[derive(Deserialize, Debug, Clone, Validate, ToSchema)]
pub struct GradeSubmissionDto {
    #[validate(range(min = 0, max = 100))]
    pub grade: i32,
    pub feedback: Option<String>,
}
