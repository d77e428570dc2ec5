//! Idempotent seeding of skills and translations.
//!
//! Seed files are JSON arrays. Every record is upserted by its natural key
//! (skill name, translation key), so a file can be re-applied at any time.

pub mod error;
pub mod files;
pub mod seeder;
