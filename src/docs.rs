use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::modules::accounts::model::{
    Account, AccountRole, ChangePasswordDto, CreateAccountDto, PaginatedAccountsResponse,
    UpdateProfileDto,
};
use crate::modules::assignments::model::{Assignment, GradeSubmissionDto, Submission};
use crate::modules::auth::controller::ErrorResponse;
use crate::modules::auth::model::{
    ForgotPasswordRequest, LoginRequest, LoginResponse, MessageResponse, ResetPasswordRequest,
};
use crate::modules::branches::model::{
    Branch, CreateBranchDto, PaginatedBranchesResponse, UpdateBranchDto,
};
use crate::modules::courses::model::{Course, CourseDetail, CreateCourseDto, EnrollStudentDto};
use crate::modules::facilities::model::{
    Booking, BookingStatus, CreateBookingDto, CreateFacilityDto, Facility,
    UpdateBookingStatusDto, UpdateFacilityDto,
};
use crate::modules::notices::model::{CreateNoticeDto, Notice, NoticeScope};
use crate::modules::professors::model::{
    AssignSubjectDto, CreateProfessorDto, PaginatedProfessorsResponse, Professor,
    SubjectAssignment, UpdateProfessorDto,
};
use crate::modules::students::model::{
    CreateStudentDto, PaginatedStudentsResponse, RosterImportFailure, RosterImportReport, Student,
    UpdateStudentDto,
};
use crate::modules::subjects::model::{
    CreateSubjectDto, PaginatedSubjectsResponse, Subject, UpdateSubjectDto,
};
use crate::utils::pagination::{PaginationMeta, PaginationParams};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::auth::controller::login,
        crate::modules::auth::controller::forgot_password,
        crate::modules::auth::controller::reset_password,
        crate::modules::accounts::controller::get_profile,
        crate::modules::accounts::controller::update_profile,
        crate::modules::accounts::controller::change_password,
        crate::modules::accounts::controller::list_accounts,
        crate::modules::accounts::controller::create_account,
        crate::modules::accounts::controller::get_account,
        crate::modules::accounts::controller::delete_account,
        crate::modules::students::controller::create_student,
        crate::modules::students::controller::get_students,
        crate::modules::students::controller::get_student,
        crate::modules::students::controller::update_student,
        crate::modules::students::controller::delete_student,
        crate::modules::students::controller::import_roster,
        crate::modules::professors::controller::create_professor,
        crate::modules::professors::controller::get_professors,
        crate::modules::professors::controller::get_professor,
        crate::modules::professors::controller::update_professor,
        crate::modules::professors::controller::delete_professor,
        crate::modules::professors::controller::assign_subject,
        crate::modules::professors::controller::get_subject_assignments,
        crate::modules::branches::controller::create_branch,
        crate::modules::branches::controller::get_branches,
        crate::modules::branches::controller::get_branch,
        crate::modules::branches::controller::update_branch,
        crate::modules::branches::controller::delete_branch,
        crate::modules::subjects::controller::create_subject,
        crate::modules::subjects::controller::get_subjects,
        crate::modules::subjects::controller::get_subject,
        crate::modules::subjects::controller::update_subject,
        crate::modules::subjects::controller::delete_subject,
        crate::modules::courses::controller::create_course,
        crate::modules::courses::controller::get_courses,
        crate::modules::courses::controller::get_course,
        crate::modules::courses::controller::enroll_student,
        crate::modules::courses::controller::get_course_students,
        crate::modules::assignments::controller::create_assignment,
        crate::modules::assignments::controller::get_course_assignments,
        crate::modules::assignments::controller::get_assignment,
        crate::modules::assignments::controller::submit_assignment,
        crate::modules::assignments::controller::get_submissions,
        crate::modules::assignments::controller::grade_submission,
        crate::modules::facilities::controller::create_facility,
        crate::modules::facilities::controller::get_facilities,
        crate::modules::facilities::controller::get_facility,
        crate::modules::facilities::controller::update_facility,
        crate::modules::facilities::controller::delete_facility,
        crate::modules::facilities::controller::book_facility,
        crate::modules::facilities::controller::get_bookings,
        crate::modules::facilities::controller::update_booking_status,
        crate::modules::notices::controller::create_notice,
        crate::modules::notices::controller::get_notices,
        crate::modules::notices::controller::mark_notice_read,
        crate::modules::notices::controller::delete_notice,
    ),
    components(
        schemas(
            ErrorResponse,
            MessageResponse,
            LoginRequest,
            LoginResponse,
            ForgotPasswordRequest,
            ResetPasswordRequest,
            Account,
            AccountRole,
            CreateAccountDto,
            UpdateProfileDto,
            ChangePasswordDto,
            PaginatedAccountsResponse,
            Student,
            CreateStudentDto,
            UpdateStudentDto,
            PaginatedStudentsResponse,
            RosterImportReport,
            RosterImportFailure,
            Professor,
            CreateProfessorDto,
            UpdateProfessorDto,
            AssignSubjectDto,
            SubjectAssignment,
            PaginatedProfessorsResponse,
            Branch,
            CreateBranchDto,
            UpdateBranchDto,
            PaginatedBranchesResponse,
            Subject,
            CreateSubjectDto,
            UpdateSubjectDto,
            PaginatedSubjectsResponse,
            Course,
            CourseDetail,
            CreateCourseDto,
            EnrollStudentDto,
            Assignment,
            Submission,
            GradeSubmissionDto,
            Facility,
            BookingStatus,
            Booking,
            CreateFacilityDto,
            UpdateFacilityDto,
            CreateBookingDto,
            UpdateBookingStatusDto,
            Notice,
            NoticeScope,
            CreateNoticeDto,
            PaginationMeta,
            PaginationParams,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Login and password reset"),
        (name = "Accounts", description = "Identity store management"),
        (name = "Students", description = "Student management and roster import"),
        (name = "Professors", description = "Professor management and subject assignment"),
        (name = "Branches", description = "Branch management"),
        (name = "Subjects", description = "Subject management"),
        (name = "Courses", description = "Course grouping and enrollment"),
        (name = "Assignments", description = "Assignments, submissions and grading"),
        (name = "Facilities", description = "Facility booking"),
        (name = "Notices", description = "Notice board")
    ),
    info(
        title = "Collegia API",
        version = "0.1.0",
        description = "A departmental-management REST API built with Rust, Axum, and PostgreSQL featuring JWT-based authentication and role-based authorization.",
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}
