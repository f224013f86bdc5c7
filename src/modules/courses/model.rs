//! Course models. A course is the (branch, semester) grouping that
//! enrollment and assignment targeting hang off.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::modules::subjects::model::Subject;

#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct Course {
    pub id: Uuid,
    pub branch_id: Uuid,
    pub semester: i32,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// A course with its subject list and enrollment count.
#[derive(Serialize, Debug, ToSchema)]
pub struct CourseDetail {
    #[serde(flatten)]
    pub course: Course,
    pub subjects: Vec<Subject>,
    pub enrolled_count: i64,
}

#[derive(Deserialize, Debug, Clone, Validate, ToSchema)]
pub struct CreateCourseDto {
    pub branch_id: Uuid,
    #[validate(range(min = 1, max = 10))]
    pub semester: i32,
}

#[derive(Deserialize, Debug, Clone, ToSchema)]
pub struct EnrollStudentDto {
    pub student_id: Uuid,
}
