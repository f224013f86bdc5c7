use axum::{
    Router,
    routing::{get, post, put},
};

use crate::state::AppState;

use super::controller::{get_assignment, get_submissions, grade_submission, submit_assignment};

pub fn init_assignments_router() -> Router<AppState> {
    Router::new()
        .route("/{id}", get(get_assignment))
        .route(
            "/{id}/submissions",
            post(submit_assignment).get(get_submissions),
        )
        .route(
            "/{id}/submissions/{submission_id}/grade",
            put(grade_submission),
        )
}
