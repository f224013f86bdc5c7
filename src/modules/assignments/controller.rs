use axum::{
    Json,
    extract::{Multipart, Path, State},
    http::StatusCode,
};
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use crate::middleware::auth::AuthUser;
use crate::middleware::role::check_any_role;
use crate::modules::accounts::model::AccountRole;
use crate::modules::assignments::model::{
    Assignment, CreateAssignment, GradeSubmissionDto, Submission,
};
use crate::modules::assignments::service::AssignmentService;
use crate::modules::auth::controller::ErrorResponse;
use crate::policy::{self, Action, Target};
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::validator::ValidatedJson;

const TEACHING_ROLES: &[AccountRole] = &[
    AccountRole::Professor,
    AccountRole::Hod,
    AccountRole::Director,
    AccountRole::Creator,
];

/// Create an assignment for a course (multipart; optional `file` part)
#[utoipa::path(
    post,
    path = "/api/courses/{id}/assignments",
    params(("id" = Uuid, Path, description = "Course ID")),
    request_body(content = String, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Assignment created", body = Assignment),
        (status = 400, description = "Malformed form data", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Assignments"
)]
#[instrument(skip(state, auth_user, multipart))]
pub async fn create_assignment(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(course_id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<Assignment>), AppError> {
    check_any_role(&auth_user, TEACHING_ROLES)?;

    let mut title = None;
    let mut description = None;
    let mut due_date = None;
    let mut file = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::bad_request(anyhow::anyhow!("Invalid form data: {}", e)))?
    {
        match field.name() {
            Some("title") => title = Some(read_text(field).await?),
            Some("description") => description = Some(read_text(field).await?),
            Some("due_date") => {
                let raw = read_text(field).await?;
                let parsed = chrono::DateTime::parse_from_rfc3339(&raw).map_err(|_| {
                    AppError::bad_request(anyhow::anyhow!(
                        "due_date must be an RFC 3339 timestamp"
                    ))
                })?;
                due_date = Some(parsed.with_timezone(&chrono::Utc));
            }
            Some("file") => {
                let filename = field
                    .file_name()
                    .unwrap_or("attachment")
                    .to_string();
                let data = field.bytes().await.map_err(|e| {
                    AppError::bad_request(anyhow::anyhow!("Failed to read file: {}", e))
                })?;
                file = Some((filename, data));
            }
            _ => {}
        }
    }

    let input = CreateAssignment {
        title: title
            .ok_or_else(|| AppError::bad_request(anyhow::anyhow!("title is required")))?,
        description: description
            .ok_or_else(|| AppError::bad_request(anyhow::anyhow!("description is required")))?,
        due_date: due_date
            .ok_or_else(|| AppError::bad_request(anyhow::anyhow!("due_date is required")))?,
        file_key: None,
    };

    input
        .validate()
        .map_err(|e| AppError::unprocessable(anyhow::anyhow!("Validation failed: {}", e)))?;

    // Stage the attachment before touching the database; a failed write
    // means no assignment row pointing at a missing file.
    let file_key = match &file {
        Some((filename, data)) => {
            let key = format!("assignments/{}/{}", Uuid::new_v4(), filename);
            Some(state.storage.save(&key, data).await?)
        }
        None => None,
    };

    let staged_key = file_key.clone();
    let input = CreateAssignment { file_key, ..input };
    let created_by = auth_user.account_id()?;

    match AssignmentService::create_assignment(&state.db, course_id, created_by, input).await {
        Ok(assignment) => Ok((StatusCode::CREATED, Json(assignment))),
        Err(e) => {
            // The metadata row never landed; drop the staged file.
            if let Some(key) = &staged_key {
                let _ = state.storage.delete(key).await;
            }
            Err(e)
        }
    }
}

/// List a course's assignments
#[utoipa::path(
    get,
    path = "/api/courses/{id}/assignments",
    params(("id" = Uuid, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Assignments", body = [Assignment]),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Assignments"
)]
#[instrument(skip(state, _auth_user))]
pub async fn get_course_assignments(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(course_id): Path<Uuid>,
) -> Result<Json<Vec<Assignment>>, AppError> {
    let assignments = AssignmentService::get_course_assignments(&state.db, course_id).await?;
    Ok(Json(assignments))
}

/// Get an assignment by id
#[utoipa::path(
    get,
    path = "/api/assignments/{id}",
    params(("id" = Uuid, Path, description = "Assignment ID")),
    responses(
        (status = 200, description = "Assignment details", body = Assignment),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Assignment not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Assignments"
)]
#[instrument(skip(state, _auth_user))]
pub async fn get_assignment(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Assignment>, AppError> {
    let assignment = AssignmentService::get_assignment(&state.db, id).await?;
    Ok(Json(assignment))
}

/// Submit an assignment (multipart `file` part)
///
/// Two-phase: the file is written to storage first; the submission row is
/// only inserted after the write succeeds, and the staged file is removed
/// again if the insert fails.
#[utoipa::path(
    post,
    path = "/api/assignments/{id}/submissions",
    params(("id" = Uuid, Path, description = "Assignment ID")),
    request_body(content = String, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Submission recorded", body = Submission),
        (status = 400, description = "Missing file or past due date", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Not a student, or not enrolled", body = ErrorResponse),
        (status = 404, description = "Assignment not found", body = ErrorResponse),
        (status = 409, description = "Already submitted", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Assignments"
)]
#[instrument(skip(state, auth_user, multipart))]
pub async fn submit_assignment(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(assignment_id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<Submission>), AppError> {
    check_any_role(&auth_user, &[AccountRole::Student])?;

    let student_id = sqlx::query_scalar::<_, Uuid>(
        "SELECT id FROM student_profiles WHERE account_id = $1",
    )
    .bind(auth_user.account_id()?)
    .fetch_optional(&state.db)
    .await
    .map_err(AppError::database)?
    .ok_or_else(|| AppError::forbidden("No student profile for this account"))?;

    let mut file = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::bad_request(anyhow::anyhow!("Invalid form data: {}", e)))?
    {
        if field.name() == Some("file") {
            let filename = field.file_name().unwrap_or("submission").to_string();
            let data = field.bytes().await.map_err(|e| {
                AppError::bad_request(anyhow::anyhow!("Failed to read file: {}", e))
            })?;
            file = Some((filename, data));
        }
    }

    let (filename, data) =
        file.ok_or_else(|| AppError::bad_request(anyhow::anyhow!("file part is required")))?;

    if data.is_empty() {
        return Err(AppError::bad_request(anyhow::anyhow!("file is empty")));
    }

    let key = format!("submissions/{}/{}", Uuid::new_v4(), filename);
    state.storage.save(&key, &data).await?;

    match AssignmentService::submit(&state.db, assignment_id, student_id, &key).await {
        Ok(submission) => Ok((StatusCode::CREATED, Json(submission))),
        Err(e) => {
            // The metadata row never landed; drop the staged file.
            let _ = state.storage.delete(&key).await;
            Err(e)
        }
    }
}

/// List submissions for an assignment
#[utoipa::path(
    get,
    path = "/api/assignments/{id}/submissions",
    params(("id" = Uuid, Path, description = "Assignment ID")),
    responses(
        (status = 200, description = "Submissions", body = [Submission]),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 404, description = "Assignment not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Assignments"
)]
#[instrument(skip(state, auth_user))]
pub async fn get_submissions(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(assignment_id): Path<Uuid>,
) -> Result<Json<Vec<Submission>>, AppError> {
    check_any_role(&auth_user, TEACHING_ROLES)?;
    let submissions = AssignmentService::get_submissions(&state.db, assignment_id).await?;
    Ok(Json(submissions))
}

/// Grade a submission
#[utoipa::path(
    put,
    path = "/api/assignments/{id}/submissions/{submission_id}/grade",
    params(
        ("id" = Uuid, Path, description = "Assignment ID"),
        ("submission_id" = Uuid, Path, description = "Submission ID")
    ),
    request_body = GradeSubmissionDto,
    responses(
        (status = 200, description = "Submission graded", body = Submission),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Not the assignment's creator", body = ErrorResponse),
        (status = 404, description = "Assignment or submission not found", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Assignments"
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn grade_submission(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path((assignment_id, submission_id)): Path<(Uuid, Uuid)>,
    ValidatedJson(dto): ValidatedJson<GradeSubmissionDto>,
) -> Result<Json<Submission>, AppError> {
    check_any_role(&auth_user, TEACHING_ROLES)?;

    let assignment = AssignmentService::get_assignment(&state.db, assignment_id).await?;

    let actor = auth_user.actor()?;
    policy::authorize(
        &actor,
        Action::Update,
        &Target::owned_by(assignment.created_by),
    )
    .map_err(|d| AppError::forbidden(d.reason()))?;

    let submission = AssignmentService::grade_submission(
        &state.db,
        assignment_id,
        submission_id,
        dto.grade,
        dto.feedback.as_deref(),
    )
    .await?;

    Ok(Json(submission))
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> Result<String, AppError> {
    field
        .text()
        .await
        .map_err(|e| AppError::bad_request(anyhow::anyhow!("Failed to read form field: {}", e)))
}
