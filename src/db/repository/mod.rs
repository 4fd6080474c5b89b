//! Database repositories
//!
//! Repository pattern for database access, separating data access logic
//! from business logic.

pub mod admins;
pub mod analytics;
pub mod blogs;
pub mod movies;
pub mod sessions;
