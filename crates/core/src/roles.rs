//! Well-known role name constants.
//!
//! These must match the `users.role` CHECK constraint in
//! `20260301000001_create_users.sql`.

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_COACH: &str = "coach";
pub const ROLE_CLIENT: &str = "client";
