use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use super::controller::{
    assign_subject, create_professor, delete_professor, get_professor, get_professors,
    get_subject_assignments, update_professor,
};

pub fn init_professors_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_professor).get(get_professors))
        .route(
            "/{id}",
            get(get_professor)
                .put(update_professor)
                .delete(delete_professor),
        )
        .route(
            "/{id}/subjects",
            post(assign_subject).get(get_subject_assignments),
        )
}
