use axum::{
    Router,
    routing::{post, put},
};

use crate::state::AppState;

use super::controller::{forgot_password, login, reset_password};

pub fn init_auth_router() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/forgot-password", post(forgot_password))
        .route("/reset-password/{token}", put(reset_password))
}
