//! Application configuration, loaded from environment variables.
//!
//! - [`cors`]: allowed origins for the CORS layer
//! - [`database`]: PostgreSQL connection pool
//! - [`email`]: SMTP settings for outbound email
//! - [`jwt`]: bearer token secret and expiry
//! - [`rate_limit`]: per-IP request budgets

pub mod cors;
pub mod database;
pub mod email;
pub mod jwt;
pub mod rate_limit;
