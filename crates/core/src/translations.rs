//! Translation keys and per-locale string maps.
//!
//! Every translatable list item is stored under a synthetic key
//! `<listType>_<id>`. Skills use the list type `skills`, so the skill with
//! id 42 is translated under `skills_42`.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::DbId;

/// List type used for skill translations.
pub const SKILLS_LIST_TYPE: &str = "skills";

/// Locales every translation is expected to cover.
pub const SUPPORTED_LOCALES: &[&str] = &["en", "fr", "de", "es", "he"];

/// Locale used as the fallback source text.
pub const DEFAULT_LOCALE: &str = "en";

/// `<listType>_<id>`; the list type is a lowercase identifier without
/// underscores so the first `_` always separates the two parts.
static KEY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([a-z][a-z0-9]*)_([A-Za-z0-9][A-Za-z0-9_-]*)$").expect("valid regex"));

static LIST_TYPE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z][a-z0-9]*$").expect("valid regex"));

/// Locale code → translated text.
pub type LocaleStrings = BTreeMap<String, String>;

/// A validated translation key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TranslationKey {
    list_type: String,
    id: String,
}

impl TranslationKey {
    pub fn new(list_type: &str, id: &str) -> Result<Self, CoreError> {
        if !LIST_TYPE_RE.is_match(list_type) {
            return Err(CoreError::Validation(format!(
                "Invalid translation list type '{list_type}'"
            )));
        }
        format!("{list_type}_{id}").parse()
    }

    /// Key of a skill's translation entry.
    pub fn for_skill(skill_id: DbId) -> Self {
        Self {
            list_type: SKILLS_LIST_TYPE.to_string(),
            id: skill_id.to_string(),
        }
    }

    pub fn list_type(&self) -> &str {
        &self.list_type
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for TranslationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.list_type, self.id)
    }
}

impl FromStr for TranslationKey {
    type Err = CoreError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let caps = KEY_RE.captures(raw).ok_or_else(|| {
            CoreError::Validation(format!("Invalid translation key '{raw}'"))
        })?;
        Ok(Self {
            list_type: caps[1].to_string(),
            id: caps[2].to_string(),
        })
    }
}

/// One entry of a translation seed file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationRecord {
    pub id: String,
    pub translations: LocaleStrings,
}

impl TranslationRecord {
    /// Drop blank texts and reject an entry with none left.
    pub fn normalized(self) -> Result<Self, CoreError> {
        let translations: LocaleStrings = self
            .translations
            .into_iter()
            .map(|(locale, text)| (locale.trim().to_lowercase(), text.trim().to_string()))
            .filter(|(locale, text)| !locale.is_empty() && !text.is_empty())
            .collect();
        if translations.is_empty() {
            return Err(CoreError::Validation(format!(
                "Translation '{}' has no non-empty texts",
                self.id
            )));
        }
        Ok(Self {
            id: self.id.trim().to_string(),
            translations,
        })
    }
}

/// Supported locales with no text in `strings`, in [`SUPPORTED_LOCALES`] order.
pub fn missing_locales(strings: &LocaleStrings) -> Vec<&'static str> {
    SUPPORTED_LOCALES
        .iter()
        .copied()
        .filter(|locale| strings.get(*locale).is_none_or(|t| t.trim().is_empty()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn strings(pairs: &[(&str, &str)]) -> LocaleStrings {
        pairs
            .iter()
            .map(|(l, t)| (l.to_string(), t.to_string()))
            .collect()
    }

    #[test]
    fn skill_key_formats_with_prefix() {
        assert_eq!(TranslationKey::for_skill(42).to_string(), "skills_42");
    }

    #[test]
    fn key_round_trips_through_parse() {
        let key: TranslationKey = "industries_fin-tech".parse().unwrap();
        assert_eq!(key.list_type(), "industries");
        assert_eq!(key.id(), "fin-tech");
    }

    #[test]
    fn id_may_contain_underscores() {
        let key: TranslationKey = "languages_pt_BR".parse().unwrap();
        assert_eq!(key.list_type(), "languages");
        assert_eq!(key.id(), "pt_BR");
    }

    #[test]
    fn malformed_keys_are_rejected() {
        for raw in ["skills", "_12", "Skills_1", "skills_", "sk ills_1"] {
            assert_matches!(raw.parse::<TranslationKey>(), Err(CoreError::Validation(_)), "{raw}");
        }
    }

    #[test]
    fn list_type_must_be_all_lowercase() {
        assert_matches!(TranslationKey::new("coachingStyles", "1"), Err(CoreError::Validation(_)));
        assert_matches!("coachingStyles_1".parse::<TranslationKey>(), Err(CoreError::Validation(_)));
        assert!(TranslationKey::new("coachingstyles", "1").is_ok());
    }

    #[test]
    fn new_rejects_bad_list_type() {
        assert_matches!(TranslationKey::new("Bad_Type", "1"), Err(CoreError::Validation(_)));
        assert!(TranslationKey::new("coachingStyles", "7").is_ok());
    }

    #[test]
    fn missing_locales_treats_blank_as_missing() {
        let present = strings(&[("en", "Leadership"), ("fr", " "), ("de", "Führung")]);
        assert_eq!(missing_locales(&present), vec!["fr", "es", "he"]);
    }

    #[test]
    fn record_normalization_drops_blanks() {
        let record = TranslationRecord {
            id: " 3 ".to_string(),
            translations: strings(&[("EN", "Yoga"), ("fr", "")]),
        }
        .normalized()
        .unwrap();
        assert_eq!(record.id, "3");
        assert_eq!(record.translations, strings(&[("en", "Yoga")]));
    }

    #[test]
    fn record_without_texts_is_rejected() {
        let record = TranslationRecord {
            id: "3".to_string(),
            translations: strings(&[("en", "  ")]),
        };
        assert_matches!(record.normalized(), Err(CoreError::Validation(_)));
    }
}
