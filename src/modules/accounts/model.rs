//! Account data models and DTOs.
//!
//! The `accounts` table is the single identity store: every person in the
//! system (students and professors included) authenticates through an
//! account row, with role-specific data living in a profile table.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::utils::pagination::{PaginationMeta, PaginationParams};

/// System role carried on every account.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema,
)]
#[sqlx(type_name = "account_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AccountRole {
    Creator,
    Director,
    Hod,
    Professor,
    Student,
    Admin,
}

impl AccountRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Creator => "creator",
            Self::Director => "director",
            Self::Hod => "hod",
            Self::Professor => "professor",
            Self::Student => "student",
            Self::Admin => "admin",
        }
    }
}

impl std::fmt::Display for AccountRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An account as returned to clients. The password hash never leaves the
/// service layer.
#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct Account {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: AccountRole,
    pub department: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// Account row including the password hash; service-internal only.
#[derive(FromRow, Debug, Clone)]
pub struct AccountWithPassword {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: AccountRole,
    pub department: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl AccountWithPassword {
    pub fn into_account(self) -> Account {
        Account {
            id: self.id,
            name: self.name,
            email: self.email,
            role: self.role,
            department: self.department,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Deserialize, Debug, Clone, Validate, ToSchema)]
pub struct CreateAccountDto {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8))]
    pub password: String,
    pub role: AccountRole,
    pub department: Option<String>,
}

#[derive(Deserialize, Debug, Clone, Validate, ToSchema)]
pub struct UpdateProfileDto {
    #[validate(length(min = 1))]
    pub name: String,
}

#[derive(Deserialize, Debug, Clone, Validate, ToSchema)]
pub struct ChangePasswordDto {
    #[validate(length(min = 1))]
    pub current_password: String,
    #[validate(length(min = 8))]
    pub new_password: String,
}

/// Query parameters for filtering accounts.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct AccountFilterParams {
    pub role: Option<AccountRole>,
    pub department: Option<String>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedAccountsResponse {
    pub data: Vec<Account>,
    pub meta: PaginationMeta,
}
