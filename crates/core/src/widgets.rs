//! Admin overview widget registry.
//!
//! Every dashboard panel is identified by a [`WidgetKey`]. The
//! [`WidgetRegistry`] maps each key to its static descriptor (title and
//! default size) and defines the canonical widget order. Stored
//! preferences reference widgets by their string key so that unknown or
//! retired keys can be carried over the wire and dropped during
//! reconciliation instead of failing deserialization.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Keys and sizes
// ---------------------------------------------------------------------------

/// Stable identifier of a dashboard widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WidgetKey {
    UserGrowth,
    Revenue,
    Sessions,
    CoachApprovals,
    TopCoaches,
    RecentSignups,
    PlatformHealth,
}

impl WidgetKey {
    /// Every known key, in declaration order.
    pub const ALL: [WidgetKey; 7] = [
        WidgetKey::UserGrowth,
        WidgetKey::Revenue,
        WidgetKey::Sessions,
        WidgetKey::CoachApprovals,
        WidgetKey::TopCoaches,
        WidgetKey::RecentSignups,
        WidgetKey::PlatformHealth,
    ];

    /// Wire representation of the key.
    pub fn as_str(self) -> &'static str {
        match self {
            WidgetKey::UserGrowth => "userGrowth",
            WidgetKey::Revenue => "revenue",
            WidgetKey::Sessions => "sessions",
            WidgetKey::CoachApprovals => "coachApprovals",
            WidgetKey::TopCoaches => "topCoaches",
            WidgetKey::RecentSignups => "recentSignups",
            WidgetKey::PlatformHealth => "platformHealth",
        }
    }

    /// Parse a wire key. Unknown keys yield `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == raw)
    }
}

impl std::fmt::Display for WidgetKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Grid footprint of a widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WidgetSize {
    Narrow,
    Wide,
    Full,
}

// ---------------------------------------------------------------------------
// Layout entries
// ---------------------------------------------------------------------------

/// One stored preference entry, exactly as persisted and sent over the wire.
///
/// `key` stays a plain string: entries for widgets that no longer exist
/// must survive a round trip and are filtered out by reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WidgetConfig {
    pub key: String,
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<WidgetSize>,
}

impl WidgetConfig {
    pub fn new(key: WidgetKey, enabled: bool, size: Option<WidgetSize>) -> Self {
        Self {
            key: key.as_str().to_string(),
            enabled,
            size,
        }
    }
}

/// One entry of an effective layout. The size is always resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedWidget {
    pub key: WidgetKey,
    pub enabled: bool,
    pub size: WidgetSize,
}

impl From<ResolvedWidget> for WidgetConfig {
    fn from(widget: ResolvedWidget) -> Self {
        WidgetConfig::new(widget.key, widget.enabled, Some(widget.size))
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Static description of a registered widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetDescriptor {
    pub key: WidgetKey,
    pub title: &'static str,
    pub default_size: WidgetSize,
}

/// Ordered set of widgets available on the admin overview.
///
/// Iteration order is insertion order. Reconciliation appends missing
/// widgets in this order, so it is part of the registry's contract.
#[derive(Debug, Clone, Default)]
pub struct WidgetRegistry {
    entries: IndexMap<WidgetKey, WidgetDescriptor>,
}

impl WidgetRegistry {
    /// An empty registry. Use [`WidgetRegistry::register`] to populate it.
    pub fn new() -> Self {
        Self::default()
    }

    /// The registry shipped with the admin dashboard.
    pub fn standard() -> Self {
        Self::new()
            .register(WidgetKey::UserGrowth, "User growth", WidgetSize::Wide)
            .register(WidgetKey::Revenue, "Revenue", WidgetSize::Wide)
            .register(WidgetKey::Sessions, "Sessions", WidgetSize::Narrow)
            .register(WidgetKey::CoachApprovals, "Coach approvals", WidgetSize::Narrow)
            .register(WidgetKey::TopCoaches, "Top coaches", WidgetSize::Wide)
            .register(WidgetKey::RecentSignups, "Recent sign-ups", WidgetSize::Wide)
            .register(WidgetKey::PlatformHealth, "Platform health", WidgetSize::Full)
    }

    /// Add (or replace) a widget. Replacing keeps the original position.
    pub fn register(mut self, key: WidgetKey, title: &'static str, default_size: WidgetSize) -> Self {
        self.entries.insert(
            key,
            WidgetDescriptor {
                key,
                title,
                default_size,
            },
        );
        self
    }

    pub fn get(&self, key: WidgetKey) -> Option<&WidgetDescriptor> {
        self.entries.get(&key)
    }

    pub fn contains(&self, key: WidgetKey) -> bool {
        self.entries.contains_key(&key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registered keys in registry order.
    pub fn keys(&self) -> impl Iterator<Item = WidgetKey> + '_ {
        self.entries.keys().copied()
    }

    /// Registered descriptors in registry order.
    pub fn iter(&self) -> impl Iterator<Item = &WidgetDescriptor> {
        self.entries.values()
    }

    /// Resolve a wire key to a registered widget.
    ///
    /// Returns `None` both for strings that are not a [`WidgetKey`] and for
    /// keys that exist but are not part of this registry.
    pub fn resolve_key(&self, raw: &str) -> Option<WidgetKey> {
        WidgetKey::parse(raw).filter(|key| self.contains(*key))
    }

    /// Default size for a registered widget.
    pub fn default_size(&self, key: WidgetKey) -> Option<WidgetSize> {
        self.get(key).map(|d| d.default_size)
    }

    /// Layout used when no preferences are stored: every widget, enabled,
    /// at its default size, in registry order.
    pub fn default_layout(&self) -> Vec<ResolvedWidget> {
        self.iter()
            .map(|d| ResolvedWidget {
                key: d.key,
                enabled: true,
                size: d.default_size,
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn widget_key_parse_accepts_every_wire_key() {
        for key in WidgetKey::ALL {
            assert_eq!(WidgetKey::parse(key.as_str()), Some(key));
        }
    }

    #[test]
    fn widget_key_parse_rejects_unknown_and_wrong_case() {
        assert_eq!(WidgetKey::parse("disputes"), None);
        assert_eq!(WidgetKey::parse("UserGrowth"), None);
        assert_eq!(WidgetKey::parse(""), None);
    }

    #[test]
    fn widget_key_serde_matches_as_str() {
        let json = serde_json::to_string(&WidgetKey::CoachApprovals).unwrap();
        assert_eq!(json, "\"coachApprovals\"");
    }

    #[test]
    fn widget_config_omits_missing_size() {
        let config = WidgetConfig::new(WidgetKey::Revenue, false, None);
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json, serde_json::json!({ "key": "revenue", "enabled": false }));
    }

    #[test]
    fn widget_config_accepts_unknown_key_and_size_strings() {
        let config: WidgetConfig =
            serde_json::from_str(r#"{"key":"legacyChart","enabled":true,"size":"Full"}"#).unwrap();
        assert_eq!(config.key, "legacyChart");
        assert_eq!(config.size, Some(WidgetSize::Full));
    }

    #[test]
    fn widget_config_rejects_unknown_size() {
        let result: Result<WidgetConfig, _> =
            serde_json::from_str(r#"{"key":"revenue","enabled":true,"size":"Huge"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn standard_registry_covers_every_key_once() {
        let registry = WidgetRegistry::standard();
        assert_eq!(registry.len(), WidgetKey::ALL.len());
        for key in WidgetKey::ALL {
            assert!(registry.contains(key), "{key} missing from registry");
        }
    }

    #[test]
    fn register_replacement_keeps_position() {
        let registry = WidgetRegistry::new()
            .register(WidgetKey::Revenue, "Revenue", WidgetSize::Wide)
            .register(WidgetKey::Sessions, "Sessions", WidgetSize::Narrow)
            .register(WidgetKey::Revenue, "Revenue", WidgetSize::Full);
        let keys: Vec<_> = registry.keys().collect();
        assert_eq!(keys, vec![WidgetKey::Revenue, WidgetKey::Sessions]);
        assert_eq!(registry.default_size(WidgetKey::Revenue), Some(WidgetSize::Full));
    }

    #[test]
    fn resolve_key_requires_registration() {
        let registry = WidgetRegistry::new().register(WidgetKey::Revenue, "Revenue", WidgetSize::Wide);
        assert_eq!(registry.resolve_key("revenue"), Some(WidgetKey::Revenue));
        assert_eq!(registry.resolve_key("sessions"), None);
        assert_eq!(registry.resolve_key("nope"), None);
    }

    #[test]
    fn default_layout_is_registry_order_all_enabled() {
        let registry = WidgetRegistry::standard();
        let layout = registry.default_layout();
        assert_eq!(layout.len(), registry.len());
        assert!(layout.iter().all(|w| w.enabled));
        assert_eq!(layout[0].key, WidgetKey::UserGrowth);
        assert_eq!(layout[6].size, WidgetSize::Full);
    }
}
