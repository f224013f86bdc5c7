use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct Facility {
    pub id: Uuid,
    pub name: String,
    pub capacity: i32,
    pub department: Option<String>,
    pub available: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema,
)]
#[sqlx(type_name = "booking_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct Booking {
    pub id: Uuid,
    pub facility_id: Uuid,
    pub account_id: Uuid,
    pub booking_date: chrono::NaiveDate,
    pub start_time: chrono::NaiveTime,
    pub end_time: chrono::NaiveTime,
    pub purpose: String,
    pub status: BookingStatus,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Deserialize, Debug, Clone, Validate, ToSchema)]
pub struct CreateFacilityDto {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(range(min = 1))]
    pub capacity: i32,
    pub department: Option<String>,
}

#[derive(Deserialize, Debug, Clone, Default, Validate, ToSchema)]
pub struct UpdateFacilityDto {
    #[validate(length(min = 1))]
    pub name: Option<String>,
    #[validate(range(min = 1))]
    pub capacity: Option<i32>,
    pub department: Option<String>,
    pub available: Option<bool>,
}

#[derive(Deserialize, Debug, Clone, Validate, ToSchema)]
pub struct CreateBookingDto {
    pub booking_date: chrono::NaiveDate,
    pub start_time: chrono::NaiveTime,
    pub end_time: chrono::NaiveTime,
    #[validate(length(min = 1))]
    pub purpose: String,
}

#[derive(Deserialize, Debug, Clone, ToSchema)]
pub struct UpdateBookingStatusDto {
    pub status: BookingStatus,
}
