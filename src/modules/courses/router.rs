use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use super::controller::{
    create_course, enroll_student, get_course, get_course_students, get_courses,
};
use crate::modules::assignments::controller::{create_assignment, get_course_assignments};

pub fn init_courses_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_course).get(get_courses))
        .route("/{id}", get(get_course))
        .route("/{id}/enroll", post(enroll_student))
        .route("/{id}/students", get(get_course_students))
        .route(
            "/{id}/assignments",
            post(create_assignment).get(get_course_assignments),
        )
}
