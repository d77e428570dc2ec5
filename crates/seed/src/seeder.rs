//! Upsert loops.
//!
//! A failing record is logged and counted; the loop moves on to the next
//! one. Only connection-level problems abort a run.

use std::fmt;

use coachdesk_core::skills::SkillRecord;
use coachdesk_core::translations::{
    missing_locales, LocaleStrings, TranslationKey, TranslationRecord, DEFAULT_LOCALE,
    SKILLS_LIST_TYPE,
};
use coachdesk_db::models::upsert::UpsertOutcome;
use coachdesk_db::repositories::{SkillRepo, TranslationRepo};
use coachdesk_db::DbPool;

use crate::error::SeedError;

/// Counts of one seeding run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub inserted: usize,
    pub updated: usize,
    pub failed: usize,
}

impl SeedSummary {
    pub fn record(&mut self, outcome: UpsertOutcome) {
        match outcome {
            UpsertOutcome::Inserted => self.inserted += 1,
            UpsertOutcome::Updated => self.updated += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.inserted + self.updated + self.failed
    }
}

impl fmt::Display for SeedSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} inserted, {} updated, {} failed",
            self.inserted, self.updated, self.failed
        )
    }
}

/// Upsert every skill by name.
pub async fn seed_skills(pool: &DbPool, records: Vec<SkillRecord>) -> SeedSummary {
    let mut summary = SeedSummary::default();
    for record in records {
        let name = record.name.clone();
        match upsert_skill(pool, record).await {
            Ok(outcome) => summary.record(outcome),
            Err(err) => {
                tracing::error!(skill = %name, error = %err, "Failed to seed skill");
                summary.failed += 1;
            }
        }
    }
    tracing::info!(
        inserted = summary.inserted,
        updated = summary.updated,
        failed = summary.failed,
        "Skill seeding finished",
    );
    summary
}

async fn upsert_skill(pool: &DbPool, record: SkillRecord) -> Result<UpsertOutcome, SeedError> {
    let record = record.normalized()?;
    let (skill, outcome) = SkillRepo::upsert_by_name(pool, &record).await?;
    tracing::debug!(skill_id = skill.id, name = %skill.name, ?outcome, "Seeded skill");
    Ok(outcome)
}

/// Upsert every entry under `<list_type>_<id>`, merging locales into any
/// existing entry.
pub async fn seed_translations(
    pool: &DbPool,
    list_type: &str,
    records: Vec<TranslationRecord>,
) -> SeedSummary {
    let mut summary = SeedSummary::default();
    for record in records {
        let id = record.id.clone();
        match upsert_translation(pool, list_type, record).await {
            Ok(outcome) => summary.record(outcome),
            Err(err) => {
                tracing::error!(list_type, id = %id, error = %err, "Failed to seed translation");
                summary.failed += 1;
            }
        }
    }
    tracing::info!(
        list_type,
        inserted = summary.inserted,
        updated = summary.updated,
        failed = summary.failed,
        "Translation seeding finished",
    );
    summary
}

async fn upsert_translation(
    pool: &DbPool,
    list_type: &str,
    record: TranslationRecord,
) -> Result<UpsertOutcome, SeedError> {
    let record = record.normalized()?;
    let key = TranslationKey::new(list_type, &record.id)?;
    let (_, outcome) = TranslationRepo::upsert_by_key(pool, &key, &record.translations).await?;
    Ok(outcome)
}

/// Result of [`seed_missing_translations`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MissingTranslationsReport {
    pub summary: SeedSummary,
    /// Skill translation keys that still lack some supported locale.
    pub incomplete: Vec<(String, Vec<&'static str>)>,
}

/// Create a `skills_<id>` entry seeded with the English name for every
/// skill that has none, then report entries still missing locales.
pub async fn seed_missing_translations(pool: &DbPool) -> Result<MissingTranslationsReport, SeedError> {
    let mut report = MissingTranslationsReport::default();

    for skill in SkillRepo::list_without_translation(pool).await? {
        let key = TranslationKey::for_skill(skill.id);
        let strings = LocaleStrings::from([(DEFAULT_LOCALE.to_string(), skill.name.clone())]);
        match TranslationRepo::upsert_by_key(pool, &key, &strings).await {
            Ok((_, outcome)) => report.summary.record(outcome),
            Err(err) => {
                tracing::error!(key = %key, error = %err, "Failed to create skill translation");
                report.summary.failed += 1;
            }
        }
    }

    for entry in TranslationRepo::list_by_list_type(pool, SKILLS_LIST_TYPE).await? {
        let missing = missing_locales(&entry.translations);
        if !missing.is_empty() {
            tracing::warn!(key = %entry.key, missing = ?missing, "Translation incomplete");
            report.incomplete.push((entry.key, missing));
        }
    }

    tracing::info!(
        created = report.summary.inserted,
        failed = report.summary.failed,
        incomplete = report.incomplete.len(),
        "Missing translation pass finished",
    );
    Ok(report)
}
