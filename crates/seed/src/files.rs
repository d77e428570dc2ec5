//! Seed file loading.

use std::path::Path;

use coachdesk_core::skills::SkillRecord;
use coachdesk_core::translations::TranslationRecord;
use serde::de::DeserializeOwned;

use crate::error::SeedError;

/// Read a JSON array of skills.
pub fn load_skills(path: &Path) -> Result<Vec<SkillRecord>, SeedError> {
    load_array(path)
}

/// Read a JSON array of `{id, translations}` entries.
pub fn load_translations(path: &Path) -> Result<Vec<TranslationRecord>, SeedError> {
    load_array(path)
}

fn load_array<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, SeedError> {
    let raw = std::fs::read_to_string(path).map_err(|source| SeedError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| SeedError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn workspace_file(relative: &str) -> std::path::PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("../..").join(relative)
    }

    #[test]
    fn bundled_skills_file_parses() {
        let skills = load_skills(&workspace_file("seed-data/skills.json")).unwrap();
        assert!(!skills.is_empty());
        assert!(skills.into_iter().all(|s| s.normalized().is_ok()));
    }

    #[test]
    fn bundled_translation_file_parses() {
        let entries =
            load_translations(&workspace_file("seed-data/translations/industries.json")).unwrap();
        assert!(entries.iter().all(|e| e.translations.contains_key("en")));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = load_skills(Path::new("/nonexistent/skills.json")).unwrap_err();
        assert_matches!(&err, SeedError::Io { .. });
        assert!(err.to_string().contains("/nonexistent/skills.json"));
    }

    #[test]
    fn non_array_file_is_a_parse_error() {
        let err = load_array::<SkillRecord>(&workspace_file("Cargo.toml")).unwrap_err();
        assert_matches!(err, SeedError::Parse { .. });
    }
}
