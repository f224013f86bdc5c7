use chrono::NaiveTime;
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use crate::modules::facilities::model::{
    Booking, BookingStatus, CreateBookingDto, CreateFacilityDto, Facility, UpdateFacilityDto,
};
use crate::utils::errors::AppError;

const FACILITY_COLUMNS: &str =
    "id, name, capacity, department, available, created_at, updated_at";

const BOOKING_COLUMNS: &str =
    "id, facility_id, account_id, booking_date, start_time, end_time, purpose, status, created_at";

/// Half-open interval overlap: `[a_start, a_end)` vs `[b_start, b_end)`.
/// Touching boundaries (one ends exactly when the other starts) do not
/// conflict.
pub fn overlaps(
    a_start: NaiveTime,
    a_end: NaiveTime,
    b_start: NaiveTime,
    b_end: NaiveTime,
) -> bool {
    a_start < b_end && a_end > b_start
}

pub struct FacilityService;

impl FacilityService {
    #[instrument(skip(db, dto))]
    pub async fn create_facility(
        db: &PgPool,
        dto: CreateFacilityDto,
    ) -> Result<Facility, AppError> {
        let facility = sqlx::query_as::<_, Facility>(&format!(
            "INSERT INTO facilities (name, capacity, department)
             VALUES ($1, $2, $3)
             RETURNING {FACILITY_COLUMNS}"
        ))
        .bind(&dto.name)
        .bind(dto.capacity)
        .bind(dto.department.as_deref())
        .fetch_one(db)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::conflict(anyhow::anyhow!(
                        "Facility with name {} already exists",
                        dto.name
                    ));
                }
            }
            AppError::database(anyhow::Error::from(e))
        })?;

        Ok(facility)
    }

    #[instrument(skip(db))]
    pub async fn get_facilities(db: &PgPool) -> Result<Vec<Facility>, AppError> {
        let facilities = sqlx::query_as::<_, Facility>(&format!(
            "SELECT {FACILITY_COLUMNS} FROM facilities ORDER BY name"
        ))
        .fetch_all(db)
        .await
        .map_err(AppError::database)?;

        Ok(facilities)
    }

    #[instrument(skip(db))]
    pub async fn get_facility(db: &PgPool, id: Uuid) -> Result<Facility, AppError> {
        let facility = sqlx::query_as::<_, Facility>(&format!(
            "SELECT {FACILITY_COLUMNS} FROM facilities WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await
        .map_err(AppError::database)?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Facility not found")))?;

        Ok(facility)
    }

    #[instrument(skip(db, dto))]
    pub async fn update_facility(
        db: &PgPool,
        id: Uuid,
        dto: UpdateFacilityDto,
    ) -> Result<Facility, AppError> {
        let existing = Self::get_facility(db, id).await?;

        let facility = sqlx::query_as::<_, Facility>(&format!(
            "UPDATE facilities
             SET name = $1, capacity = $2, department = $3, available = $4, updated_at = NOW()
             WHERE id = $5
             RETURNING {FACILITY_COLUMNS}"
        ))
        .bind(dto.name.unwrap_or(existing.name))
        .bind(dto.capacity.unwrap_or(existing.capacity))
        .bind(dto.department.or(existing.department).as_deref())
        .bind(dto.available.unwrap_or(existing.available))
        .bind(id)
        .fetch_one(db)
        .await
        .map_err(AppError::database)?;

        Ok(facility)
    }

    #[instrument(skip(db))]
    pub async fn delete_facility(db: &PgPool, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM facilities WHERE id = $1")
            .bind(id)
            .execute(db)
            .await
            .map_err(AppError::database)?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow::anyhow!("Facility not found")));
        }

        Ok(())
    }

    /// Admission control for a booking request.
    ///
    /// The facility row is locked for the duration of the check+insert so
    /// two concurrent requests for the same slot cannot both pass the
    /// overlap query. Pending and approved bookings both block the slot;
    /// rejected ones do not.
    #[instrument(skip(db, dto))]
    pub async fn book(
        db: &PgPool,
        facility_id: Uuid,
        account_id: Uuid,
        dto: CreateBookingDto,
    ) -> Result<Booking, AppError> {
        if dto.start_time >= dto.end_time {
            return Err(AppError::bad_request(anyhow::anyhow!(
                "start_time must be before end_time"
            )));
        }

        let mut tx = db.begin().await.map_err(AppError::database)?;

        let available = sqlx::query_scalar::<_, bool>(
            "SELECT available FROM facilities WHERE id = $1 FOR UPDATE",
        )
        .bind(facility_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(AppError::database)?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Facility not found")))?;

        if !available {
            return Err(AppError::bad_request(anyhow::anyhow!(
                "Facility is not available for booking"
            )));
        }

        // Same rule as `overlaps`, evaluated against all non-rejected
        // bookings on the requested date.
        let conflicting = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(
                 SELECT 1 FROM facility_bookings
                 WHERE facility_id = $1
                   AND booking_date = $2
                   AND status <> 'rejected'
                   AND start_time < $4
                   AND end_time > $3
             )",
        )
        .bind(facility_id)
        .bind(dto.booking_date)
        .bind(dto.start_time)
        .bind(dto.end_time)
        .fetch_one(&mut *tx)
        .await
        .map_err(AppError::database)?;

        if conflicting {
            return Err(AppError::conflict(anyhow::anyhow!(
                "Facility is already booked for an overlapping time slot"
            )));
        }

        let booking = sqlx::query_as::<_, Booking>(&format!(
            "INSERT INTO facility_bookings
                 (facility_id, account_id, booking_date, start_time, end_time, purpose)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {BOOKING_COLUMNS}"
        ))
        .bind(facility_id)
        .bind(account_id)
        .bind(dto.booking_date)
        .bind(dto.start_time)
        .bind(dto.end_time)
        .bind(&dto.purpose)
        .fetch_one(&mut *tx)
        .await
        .map_err(AppError::database)?;

        tx.commit().await.map_err(AppError::database)?;

        Ok(booking)
    }

    #[instrument(skip(db))]
    pub async fn get_bookings(db: &PgPool, facility_id: Uuid) -> Result<Vec<Booking>, AppError> {
        Self::get_facility(db, facility_id).await?;

        let bookings = sqlx::query_as::<_, Booking>(&format!(
            "SELECT {BOOKING_COLUMNS} FROM facility_bookings
             WHERE facility_id = $1
             ORDER BY booking_date, start_time"
        ))
        .bind(facility_id)
        .fetch_all(db)
        .await
        .map_err(AppError::database)?;

        Ok(bookings)
    }

    /// Approve or reject a pending booking.
    #[instrument(skip(db))]
    pub async fn set_booking_status(
        db: &PgPool,
        facility_id: Uuid,
        booking_id: Uuid,
        status: BookingStatus,
    ) -> Result<Booking, AppError> {
        if status == BookingStatus::Pending {
            return Err(AppError::bad_request(anyhow::anyhow!(
                "Bookings can only be approved or rejected"
            )));
        }

        let booking = sqlx::query_as::<_, Booking>(&format!(
            "UPDATE facility_bookings
             SET status = $1
             WHERE id = $2 AND facility_id = $3
             RETURNING {BOOKING_COLUMNS}"
        ))
        .bind(status)
        .bind(booking_id)
        .bind(facility_id)
        .fetch_optional(db)
        .await
        .map_err(AppError::database)?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Booking not found")))?;

        Ok(booking)
    }
}
