//! # Taskhub Shared Library
//!
//! This crate contains the models, authentication primitives, and business
//! logic shared by the taskhub API server.
//!
//! ## Module Organization
//!
//! - `models`: Database models and their CRUD operations
//! - `auth`: Password hashing, access-token codec, middleware, role checks
//! - `cascade`: Referential cascade executed when a user is deleted
//! - `db`: Connection pool and migration runner

pub mod auth;
pub mod cascade;
pub mod db;
pub mod models;

/// Current version of the taskhub shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
