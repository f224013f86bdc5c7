use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use super::controller::{
    create_student, delete_student, get_student, get_students, import_roster, update_student,
};

pub fn init_students_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_student).get(get_students))
        .route(
            "/{id}",
            get(get_student).put(update_student).delete(delete_student),
        )
}

/// Nested under `/branches/{branch_id}/students`.
pub fn init_branch_students_router() -> Router<AppState> {
    Router::new().route("/import", post(import_roster))
}
