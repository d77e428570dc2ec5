//! Domain logic for the coaching marketplace admin back office.
//!
//! This crate has no database or network dependencies. Everything here is
//! pure data and functions over it: the widget registry, layout
//! reconciliation, the client query cache, user-list filter state, and the
//! rules for skill and translation records.

pub mod error;
pub mod layout;
pub mod overview;
pub mod params;
pub mod query_cache;
pub mod roles;
pub mod skills;
pub mod translations;
pub mod types;
pub mod user_filters;
pub mod widgets;
