use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::utils::pagination::{PaginationMeta, PaginationParams};

#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct Branch {
    pub id: Uuid,
    pub name: String,
    pub code: String,
    pub department: String,
    pub capacity: i32,
    pub establishment_year: i32,
    pub number_of_semesters: i32,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Deserialize, Debug, Clone, Validate, ToSchema)]
pub struct CreateBranchDto {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(length(min = 1))]
    pub code: String,
    #[validate(length(min = 1))]
    pub department: String,
    #[validate(range(min = 1))]
    pub capacity: i32,
    #[validate(range(min = 1800, max = 2100))]
    pub establishment_year: i32,
    #[validate(range(min = 1, max = 10))]
    pub number_of_semesters: i32,
}

#[derive(Deserialize, Debug, Clone, Default, Validate, ToSchema)]
pub struct UpdateBranchDto {
    #[validate(length(min = 1))]
    pub name: Option<String>,
    #[validate(length(min = 1))]
    pub code: Option<String>,
    #[validate(length(min = 1))]
    pub department: Option<String>,
    #[validate(range(min = 1))]
    pub capacity: Option<i32>,
    #[validate(range(min = 1, max = 10))]
    pub number_of_semesters: Option<i32>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct BranchFilterParams {
    pub department: Option<String>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedBranchesResponse {
    pub data: Vec<Branch>,
    pub meta: PaginationMeta,
}
