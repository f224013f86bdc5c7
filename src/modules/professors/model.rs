//! Professor data models and DTOs.
//!
//! Professors use the same identity pattern as students: an `accounts` row
//! (role `professor`) plus a `professor_profiles` row keyed by the unique
//! employee number, created and deleted together.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::utils::pagination::{PaginationMeta, PaginationParams};

#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct Professor {
    pub id: Uuid,
    pub employee_number: String,
    pub name: String,
    pub email: String,
    pub department: String,
    pub contact: Option<String>,
    pub first_login: bool,
    pub account_id: Uuid,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Deserialize, Debug, Clone, Validate, ToSchema)]
pub struct CreateProfessorDto {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8))]
    pub password: String,
    #[validate(length(min = 1))]
    pub employee_number: String,
    #[validate(length(min = 1))]
    pub department: String,
    pub contact: Option<String>,
}

#[derive(Deserialize, Debug, Clone, Default, Validate, ToSchema)]
pub struct UpdateProfessorDto {
    #[validate(length(min = 1))]
    pub name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 1))]
    pub department: Option<String>,
    pub contact: Option<String>,
}

#[derive(Deserialize, Debug, Clone, Validate, ToSchema)]
pub struct AssignSubjectDto {
    pub subject_id: Uuid,
    #[validate(range(min = 1, max = 10))]
    pub semester: i32,
    pub branch_id: Uuid,
}

/// A subject assignment, joined with subject details for listings.
#[derive(Serialize, FromRow, Debug, Clone, ToSchema)]
pub struct SubjectAssignment {
    pub subject_id: Uuid,
    pub subject_name: String,
    pub subject_code: String,
    pub semester: i32,
    pub branch_id: Uuid,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ProfessorFilterParams {
    pub department: Option<String>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedProfessorsResponse {
    pub data: Vec<Professor>,
    pub meta: PaginationMeta,
}
