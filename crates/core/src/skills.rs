//! Skill taxonomy records.
//!
//! Skills are keyed by `name`. Seed files may be re-applied at any time, so
//! validation normalizes whitespace before the record is upserted.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Maximum length of a skill name.
pub const MAX_SKILL_NAME_LENGTH: usize = 120;
/// Maximum length of a category label.
pub const MAX_CATEGORY_LENGTH: usize = 60;
/// Maximum length of a description.
pub const MAX_DESCRIPTION_LENGTH: usize = 2_000;

/// One skill as it appears in a seed file or an upsert request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillRecord {
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub description: String,
}

impl SkillRecord {
    /// Trim every field and validate lengths.
    pub fn normalized(self) -> Result<Self, CoreError> {
        let record = Self {
            name: collapse_whitespace(&self.name),
            category: collapse_whitespace(&self.category),
            description: self.description.trim().to_string(),
        };
        record.validate()?;
        Ok(record)
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        validate_label("Skill name", &self.name, MAX_SKILL_NAME_LENGTH)?;
        validate_label("Skill category", &self.category, MAX_CATEGORY_LENGTH)?;
        if self.description.chars().count() > MAX_DESCRIPTION_LENGTH {
            return Err(CoreError::Validation(format!(
                "Skill description exceeds {MAX_DESCRIPTION_LENGTH} characters"
            )));
        }
        Ok(())
    }
}

fn validate_label(field: &str, value: &str, max: usize) -> Result<(), CoreError> {
    if value.is_empty() {
        return Err(CoreError::Validation(format!("{field} must not be empty")));
    }
    if value.chars().count() > max {
        return Err(CoreError::Validation(format!(
            "{field} exceeds {max} characters"
        )));
    }
    Ok(())
}

/// Trim and collapse internal runs of whitespace to a single space.
pub fn collapse_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}
