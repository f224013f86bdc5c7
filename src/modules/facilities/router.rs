use axum::{
    Router,
    routing::{get, post, put},
};

use crate::state::AppState;

use super::controller::{
    book_facility, create_facility, delete_facility, get_bookings, get_facilities, get_facility,
    update_booking_status, update_facility,
};

pub fn init_facilities_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_facility).get(get_facilities))
        .route(
            "/{id}",
            get(get_facility).put(update_facility).delete(delete_facility),
        )
        .route("/{id}/book", post(book_facility))
        .route("/{id}/bookings", get(get_bookings))
        .route(
            "/{id}/bookings/{booking_id}/status",
            put(update_booking_status),
        )
}
