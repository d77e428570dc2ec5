pub mod dashboard_preferences;
pub mod overview;
pub mod skills;
pub mod translations;
pub mod users;
