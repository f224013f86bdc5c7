use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema,
)]
#[sqlx(type_name = "notice_scope", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum NoticeScope {
    All,
    Students,
    Professors,
    Class,
}

#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct Notice {
    pub id: Uuid,
    pub title: String,
    pub message: String,
    pub scope: NoticeScope,
    pub branch_id: Option<Uuid>,
    pub semester: Option<i32>,
    pub is_read: bool,
    pub created_by: Uuid,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Deserialize, Debug, Clone, Validate, ToSchema)]
pub struct CreateNoticeDto {
    #[validate(length(min = 1))]
    pub title: String,
    #[validate(length(min = 1))]
    pub message: String,
    pub scope: NoticeScope,
    /// Required when scope is `class`.
    pub branch_id: Option<Uuid>,
    /// Required when scope is `class`.
    #[validate(range(min = 1, max = 10))]
    pub semester: Option<i32>,
}
