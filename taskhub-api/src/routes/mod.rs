/// API route handlers
///
/// Organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Authentication endpoints (register, login, refresh, logout)
/// - `users`: User management (including cascading deletion)
/// - `tasks`: Task management
/// - `teams`: Team and membership management

pub mod auth;
pub mod health;
pub mod tasks;
pub mod teams;
pub mod users;
