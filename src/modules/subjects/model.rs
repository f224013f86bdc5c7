use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::utils::pagination::{PaginationMeta, PaginationParams};

#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct Subject {
    pub id: Uuid,
    pub name: String,
    pub code: String,
    pub credits: i32,
    pub semester: i32,
    pub branch_id: Uuid,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Deserialize, Debug, Clone, Validate, ToSchema)]
pub struct CreateSubjectDto {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(length(min = 1))]
    pub code: String,
    #[validate(range(min = 1, max = 10))]
    pub credits: i32,
    #[validate(range(min = 1, max = 10))]
    pub semester: i32,
    pub branch_id: Uuid,
}

#[derive(Deserialize, Debug, Clone, Default, Validate, ToSchema)]
pub struct UpdateSubjectDto {
    #[validate(length(min = 1))]
    pub name: Option<String>,
    #[validate(length(min = 1))]
    pub code: Option<String>,
    #[validate(range(min = 1, max = 10))]
    pub credits: Option<i32>,
    #[validate(range(min = 1, max = 10))]
    pub semester: Option<i32>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct SubjectFilterParams {
    #[serde(default, deserialize_with = "crate::utils::serde::deserialize_optional_uuid")]
    pub branch_id: Option<Uuid>,
    #[serde(default, deserialize_with = "crate::utils::serde::deserialize_optional_i32")]
    pub semester: Option<i32>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedSubjectsResponse {
    pub data: Vec<Subject>,
    pub meta: PaginationMeta,
}
