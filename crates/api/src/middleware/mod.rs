//! Request extractors guarding the admin routes.
//!
//! [`auth::AuthUser`] verifies the session token; [`rbac::RequireAdmin`]
//! additionally rejects every role but `admin`.

pub mod auth;
pub mod rbac;
