pub mod dashboard_preference_repo;
pub mod overview_repo;
pub mod skill_repo;
pub mod translation_repo;
pub mod user_repo;

pub use dashboard_preference_repo::DashboardPreferenceRepo;
pub use overview_repo::OverviewRepo;
pub use skill_repo::SkillRepo;
pub use translation_repo::TranslationRepo;
pub use user_repo::UserRepo;

/// Escape `%`, `_` and `\` so user input matches literally inside `LIKE`.
pub(crate) fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}
