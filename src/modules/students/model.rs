//! Student data models and DTOs.
//!
//! A student is an `accounts` row (role `student`) plus a `student_profiles`
//! row; the two are created and deleted together. [`Student`] is the joined
//! view handed to clients.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::utils::pagination::{PaginationMeta, PaginationParams};

#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct Student {
    pub id: Uuid,
    pub scholar_number: String,
    pub name: String,
    pub email: String,
    pub mobile: Option<String>,
    pub hostel: Option<String>,
    pub current_semester: i32,
    pub branch_id: Uuid,
    pub account_id: Uuid,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Deserialize, Debug, Clone, Validate, ToSchema)]
pub struct CreateStudentDto {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8))]
    pub password: String,
    #[validate(length(min = 1))]
    pub scholar_number: String,
    pub mobile: Option<String>,
    pub hostel: Option<String>,
    #[validate(range(min = 1, max = 10))]
    pub current_semester: i32,
    pub branch_id: Uuid,
}

#[derive(Deserialize, Debug, Clone, Default, Validate, ToSchema)]
pub struct UpdateStudentDto {
    #[validate(length(min = 1))]
    pub name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub mobile: Option<String>,
    pub hostel: Option<String>,
    #[validate(range(min = 1, max = 10))]
    pub current_semester: Option<i32>,
    pub branch_id: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct StudentFilterParams {
    #[serde(default, deserialize_with = "crate::utils::serde::deserialize_optional_uuid")]
    pub branch_id: Option<Uuid>,
    #[serde(default, deserialize_with = "crate::utils::serde::deserialize_optional_i32")]
    pub semester: Option<i32>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedStudentsResponse {
    pub data: Vec<Student>,
    pub meta: PaginationMeta,
}

/// One line of a roster CSV. Header row:
/// `name,email,password,scholar_number,current_semester[,mobile][,hostel]`
#[derive(Debug, Deserialize)]
pub struct RosterRow {
    pub name: String,
    pub email: String,
    pub password: String,
    pub scholar_number: String,
    pub current_semester: i32,
    #[serde(default)]
    pub mobile: Option<String>,
    #[serde(default)]
    pub hostel: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RosterImportFailure {
    /// 1-based line number in the uploaded file (the header is line 1).
    pub line: usize,
    pub reason: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RosterImportReport {
    pub imported: usize,
    pub failures: Vec<RosterImportFailure>,
}
