use axum::http::{HeaderValue, Method};
use axum::{Router, middleware};
use tower_governor::GovernorLayer;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable as _};
use utoipa_swagger_ui::SwaggerUi;

use crate::docs::ApiDoc;
use crate::logging::logging_middleware;
use crate::middleware::role::{require_admin, require_leadership};
use crate::modules::accounts::router::init_accounts_router;
use crate::modules::assignments::router::init_assignments_router;
use crate::modules::auth::router::init_auth_router;
use crate::modules::branches::router::init_branches_router;
use crate::modules::courses::router::init_courses_router;
use crate::modules::facilities::router::init_facilities_router;
use crate::modules::notices::router::init_notices_router;
use crate::modules::professors::router::init_professors_router;
use crate::modules::students::router::{init_branch_students_router, init_students_router};
use crate::modules::subjects::router::init_subjects_router;
use crate::state::AppState;

pub fn init_router(state: AppState) -> Router {
    let auth_governor = state.rate_limit_config.auth_governor_config();

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(Scalar::with_url("/scalar", ApiDoc::openapi()))
        .nest(
            "/api",
            Router::new()
                .nest(
                    "/auth",
                    init_auth_router().layer(GovernorLayer::new(auth_governor)),
                )
                .nest("/accounts", init_accounts_router())
                .nest(
                    "/students",
                    init_students_router()
                        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin)),
                )
                .nest(
                    "/professors",
                    init_professors_router().route_layer(middleware::from_fn_with_state(
                        state.clone(),
                        require_leadership,
                    )),
                )
                .nest(
                    "/branches",
                    init_branches_router()
                        .nest("/{branch_id}/students", init_branch_students_router())
                        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin)),
                )
                .nest("/subjects", init_subjects_router())
                .nest("/courses", init_courses_router())
                .nest("/assignments", init_assignments_router())
                .nest("/facilities", init_facilities_router())
                .nest("/notices", init_notices_router()),
        )
        .with_state(state.clone())
        .layer({
            let allowed_origins: Vec<HeaderValue> = state
                .cors_config
                .allowed_origins
                .iter()
                .filter_map(|origin| origin.parse().ok())
                .collect();

            CorsLayer::new()
                .allow_origin(allowed_origins)
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::PATCH,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers([
                    axum::http::header::AUTHORIZATION,
                    axum::http::header::CONTENT_TYPE,
                    axum::http::header::ACCEPT,
                ])
                .allow_credentials(true)
        })
        .layer(middleware::from_fn(logging_middleware))
}
