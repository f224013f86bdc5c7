use axum::{
    Router,
    routing::{get, put},
};

use crate::state::AppState;

use super::controller::{
    change_password, create_account, delete_account, get_account, get_profile, list_accounts,
    update_profile,
};

pub fn init_accounts_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_accounts).post(create_account))
        .route("/me", get(get_profile).put(update_profile))
        .route("/me/password", put(change_password))
        .route("/{id}", get(get_account).delete(delete_account))
}
