use collegia::utils::password::hash_password;
#[allow(unused_imports)]
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

#[allow(dead_code)]
pub struct TestAccount {
    pub id: Uuid,
    pub email: String,
    pub password: String,
}

#[allow(dead_code)]
pub struct TestBranch {
    pub id: Uuid,
    pub code: String,
}

/// Create a test account with the given role.
/// `role` is one of: creator, director, hod, professor, student, admin.
pub async fn create_test_account(
    tx: &mut Transaction<'_, Postgres>,
    email: &str,
    password: &str,
    role: &str,
    department: Option<&str>,
) -> TestAccount {
    let hashed = hash_password(password).unwrap();

    let id = sqlx::query_scalar::<_, Uuid>(
        r#"
        INSERT INTO accounts (name, email, password, role, department)
        VALUES ($1, $2, $3, $4::account_role, $5)
        RETURNING id
        "#,
    )
    .bind("Test User")
    .bind(email)
    .bind(&hashed)
    .bind(role)
    .bind(department)
    .fetch_one(&mut **tx)
    .await
    .unwrap();

    TestAccount {
        id,
        email: email.to_string(),
        password: password.to_string(),
    }
}

#[allow(dead_code)]
pub async fn create_test_branch(
    tx: &mut Transaction<'_, Postgres>,
    department: &str,
) -> TestBranch {
    let code = format!("BR-{}", &Uuid::new_v4().to_string()[..8]);

    let id = sqlx::query_scalar::<_, Uuid>(
        r#"
        INSERT INTO branches
            (name, code, department, capacity, establishment_year, number_of_semesters)
        VALUES ($1, $2, $3, 120, 1998, 8)
        RETURNING id
        "#,
    )
    .bind(format!("Branch {}", code))
    .bind(&code)
    .bind(department)
    .fetch_one(&mut **tx)
    .await
    .unwrap();

    TestBranch { id, code }
}

/// Create a student account + profile pair directly, bypassing the API.
#[allow(dead_code)]
pub async fn create_test_student(
    tx: &mut Transaction<'_, Postgres>,
    email: &str,
    password: &str,
    scholar_number: &str,
    branch_id: Uuid,
    semester: i32,
) -> (TestAccount, Uuid) {
    let account = create_test_account(tx, email, password, "student", None).await;

    let profile_id = sqlx::query_scalar::<_, Uuid>(
        r#"
        INSERT INTO student_profiles (account_id, scholar_number, current_semester, branch_id)
        VALUES ($1, $2, $3, $4)
        RETURNING id
        "#,
    )
    .bind(account.id)
    .bind(scholar_number)
    .bind(semester)
    .bind(branch_id)
    .fetch_one(&mut **tx)
    .await
    .unwrap();

    (account, profile_id)
}

#[allow(dead_code)]
pub async fn create_test_course(
    tx: &mut Transaction<'_, Postgres>,
    branch_id: Uuid,
    semester: i32,
) -> Uuid {
    sqlx::query_scalar::<_, Uuid>(
        "INSERT INTO courses (branch_id, semester) VALUES ($1, $2) RETURNING id",
    )
    .bind(branch_id)
    .bind(semester)
    .fetch_one(&mut **tx)
    .await
    .unwrap()
}

#[allow(dead_code)]
pub async fn enroll_test_student(
    tx: &mut Transaction<'_, Postgres>,
    course_id: Uuid,
    student_id: Uuid,
) {
    sqlx::query("INSERT INTO course_enrollments (course_id, student_id) VALUES ($1, $2)")
        .bind(course_id)
        .bind(student_id)
        .execute(&mut **tx)
        .await
        .unwrap();
}

pub fn generate_unique_email() -> String {
    format!("test-{}@test.com", Uuid::new_v4())
}

#[allow(dead_code)]
pub fn generate_unique_scholar_number() -> String {
    format!("S-{}", Uuid::new_v4())
}

#[allow(dead_code)]
pub async fn count_accounts(pool: &PgPool) -> i64 {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM accounts")
        .fetch_one(pool)
        .await
        .unwrap()
}

#[allow(dead_code)]
pub async fn count_student_profiles(pool: &PgPool) -> i64 {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM student_profiles")
        .fetch_one(pool)
        .await
        .unwrap()
}
