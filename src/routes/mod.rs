//! Router Module Index
//!
//! Organizes the application's routing logic into security-segregated
//! modules. Access control is applied explicitly at the module level (via
//! Axum layers), so a route can never end up protected or exposed by
//! accident: its module decides.

/// Routes accessible to anonymous clients: health check, registration, login.
pub mod public;

/// Routes wrapped by the authentication layer. Every handler here receives a
/// validated principal identity.
pub mod authenticated;
