use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use super::controller::{
    create_branch, delete_branch, get_branch, get_branches, update_branch,
};

pub fn init_branches_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_branch).get(get_branches))
        .route(
            "/{id}",
            get(get_branch).put(update_branch).delete(delete_branch),
        )
}
