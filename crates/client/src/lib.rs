//! Admin dashboard client runtime.
//!
//! - [`api`] -- HTTP client for the admin API plus the seams the
//!   controllers depend on.
//! - [`dashboard`] -- overview tab: effective layout, optimistic
//!   reorder/save/reset with cache rollback.
//! - [`filter_bar`] -- debounced user filter editing.
//! - [`user_management`] -- filter-scoped user selection and detail.
//! - [`notify`] -- user-visible notifications.

pub mod api;
pub mod config;
pub mod dashboard;
pub mod filter_bar;
pub mod notify;
pub mod user_management;
