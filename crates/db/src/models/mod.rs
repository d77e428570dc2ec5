pub mod dashboard_preference;
pub mod skill;
pub mod translation;
pub mod upsert;
pub mod user;
