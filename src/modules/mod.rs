//! Feature modules. Each module follows the same structure:
//!
//! - `controller.rs`: HTTP handlers
//! - `service.rs`: business logic
//! - `model.rs`: entities and DTOs
//! - `router.rs`: route wiring

pub mod accounts;
pub mod assignments;
pub mod auth;
pub mod branches;
pub mod courses;
pub mod facilities;
pub mod notices;
pub mod professors;
pub mod students;
pub mod subjects;
