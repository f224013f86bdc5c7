use axum::{
    Router,
    routing::{get, put},
};

use crate::state::AppState;

use super::controller::{create_notice, delete_notice, get_notices, mark_notice_read};

pub fn init_notices_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_notices).post(create_notice))
        .route("/{id}", axum::routing::delete(delete_notice))
        .route("/{id}/read", put(mark_notice_read))
}
