//! CLI utilities.
//!
//! The `creator` role is never assignable through the API, so the first
//! account has to come from here: `collegia create-creator <name> <email>
//! <password>`.

use sqlx::PgPool;

use crate::utils::password::hash_password;

pub async fn create_creator(
    pool: &PgPool,
    name: &str,
    email: &str,
    password: &str,
) -> Result<(), anyhow::Error> {
    let existing = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM accounts WHERE email = $1)",
    )
    .bind(email)
    .fetch_one(pool)
    .await?;

    if existing {
        anyhow::bail!("An account with email {} already exists", email);
    }

    let hashed = hash_password(password).map_err(|e| e.error)?;

    sqlx::query(
        "INSERT INTO accounts (name, email, password, role) VALUES ($1, $2, $3, 'creator')",
    )
    .bind(name)
    .bind(email)
    .bind(&hashed)
    .execute(pool)
    .await?;

    Ok(())
}
