use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde_json::json;
use tracing::instrument;
use uuid::Uuid;

use crate::middleware::auth::AuthUser;
use crate::middleware::role::check_any_role;
use crate::modules::accounts::model::AccountRole;
use crate::modules::auth::controller::ErrorResponse;
use crate::modules::facilities::model::{
    Booking, CreateBookingDto, CreateFacilityDto, Facility, UpdateBookingStatusDto,
    UpdateFacilityDto,
};
use crate::modules::facilities::service::FacilityService;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::validator::ValidatedJson;

const MANAGE_ROLES: &[AccountRole] = &[
    AccountRole::Admin,
    AccountRole::Director,
    AccountRole::Creator,
];

/// Create a facility
#[utoipa::path(
    post,
    path = "/api/facilities",
    request_body = CreateFacilityDto,
    responses(
        (status = 201, description = "Facility created", body = Facility),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 409, description = "Duplicate name", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Facilities"
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn create_facility(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<CreateFacilityDto>,
) -> Result<(StatusCode, Json<Facility>), AppError> {
    check_any_role(&auth_user, MANAGE_ROLES)?;
    let facility = FacilityService::create_facility(&state.db, dto).await?;
    Ok((StatusCode::CREATED, Json(facility)))
}

/// List facilities
#[utoipa::path(
    get,
    path = "/api/facilities",
    responses(
        (status = 200, description = "All facilities", body = [Facility]),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Facilities"
)]
#[instrument(skip(state, _auth_user))]
pub async fn get_facilities(
    State(state): State<AppState>,
    _auth_user: AuthUser,
) -> Result<Json<Vec<Facility>>, AppError> {
    let facilities = FacilityService::get_facilities(&state.db).await?;
    Ok(Json(facilities))
}

/// Get a facility by id
#[utoipa::path(
    get,
    path = "/api/facilities/{id}",
    params(("id" = Uuid, Path, description = "Facility ID")),
    responses(
        (status = 200, description = "Facility details", body = Facility),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Facility not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Facilities"
)]
#[instrument(skip(state, _auth_user))]
pub async fn get_facility(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Facility>, AppError> {
    let facility = FacilityService::get_facility(&state.db, id).await?;
    Ok(Json(facility))
}

/// Update a facility
#[utoipa::path(
    put,
    path = "/api/facilities/{id}",
    params(("id" = Uuid, Path, description = "Facility ID")),
    request_body = UpdateFacilityDto,
    responses(
        (status = 200, description = "Facility updated", body = Facility),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 404, description = "Facility not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Facilities"
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn update_facility(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateFacilityDto>,
) -> Result<Json<Facility>, AppError> {
    check_any_role(&auth_user, MANAGE_ROLES)?;
    let facility = FacilityService::update_facility(&state.db, id, dto).await?;
    Ok(Json(facility))
}

/// Delete a facility
#[utoipa::path(
    delete,
    path = "/api/facilities/{id}",
    params(("id" = Uuid, Path, description = "Facility ID")),
    responses(
        (status = 200, description = "Facility deleted"),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 404, description = "Facility not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Facilities"
)]
#[instrument(skip(state, auth_user))]
pub async fn delete_facility(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    check_any_role(&auth_user, MANAGE_ROLES)?;
    FacilityService::delete_facility(&state.db, id).await?;
    Ok(Json(json!({"message": "Facility deleted successfully"})))
}

/// Book a facility slot
///
/// Any authenticated account may request a booking; it starts `pending` and
/// conflicts with any non-rejected booking overlapping the same date and
/// time range.
#[utoipa::path(
    post,
    path = "/api/facilities/{id}/book",
    params(("id" = Uuid, Path, description = "Facility ID")),
    request_body = CreateBookingDto,
    responses(
        (status = 201, description = "Booking created (pending)", body = Booking),
        (status = 400, description = "Invalid time range or facility unavailable", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Facility not found", body = ErrorResponse),
        (status = 409, description = "Overlapping booking exists", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Facilities"
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn book_facility(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<CreateBookingDto>,
) -> Result<(StatusCode, Json<Booking>), AppError> {
    let booking = FacilityService::book(&state.db, id, auth_user.account_id()?, dto).await?;
    Ok((StatusCode::CREATED, Json(booking)))
}

/// List a facility's bookings
#[utoipa::path(
    get,
    path = "/api/facilities/{id}/bookings",
    params(("id" = Uuid, Path, description = "Facility ID")),
    responses(
        (status = 200, description = "Bookings", body = [Booking]),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Facility not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Facilities"
)]
#[instrument(skip(state, _auth_user))]
pub async fn get_bookings(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Booking>>, AppError> {
    let bookings = FacilityService::get_bookings(&state.db, id).await?;
    Ok(Json(bookings))
}

/// Approve or reject a booking
#[utoipa::path(
    put,
    path = "/api/facilities/{id}/bookings/{booking_id}/status",
    params(
        ("id" = Uuid, Path, description = "Facility ID"),
        ("booking_id" = Uuid, Path, description = "Booking ID")
    ),
    request_body = UpdateBookingStatusDto,
    responses(
        (status = 200, description = "Booking status updated", body = Booking),
        (status = 400, description = "Status must be approved or rejected", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 404, description = "Booking not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Facilities"
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn update_booking_status(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path((facility_id, booking_id)): Path<(Uuid, Uuid)>,
    Json(dto): Json<UpdateBookingStatusDto>,
) -> Result<Json<Booking>, AppError> {
    check_any_role(&auth_user, MANAGE_ROLES)?;
    let booking =
        FacilityService::set_booking_status(&state.db, facility_id, booking_id, dto.status)
            .await?;
    Ok(Json(booking))
}
