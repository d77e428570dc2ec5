//! Effective-layout reconciliation and layout mutations.
//!
//! The effective layout is never stored. It is derived from the stored
//! preferences and the current [`WidgetRegistry`] every time the stored
//! preferences change:
//!
//! 1. Start from the stored entries, or the registry default when absent.
//! 2. Drop entries whose key is not registered (and repeated keys).
//! 3. Resolve each entry's size, falling back to the registry default.
//! 4. Append every registered widget still missing, enabled, in registry
//!    order.

use std::collections::HashSet;
use std::sync::Arc;

use crate::widgets::{ResolvedWidget, WidgetConfig, WidgetKey, WidgetRegistry};

/// An ordered, fully resolved widget layout.
pub type Layout = Vec<ResolvedWidget>;

// ---------------------------------------------------------------------------
// Reconciliation
// ---------------------------------------------------------------------------

/// Derive the effective layout from stored preferences.
///
/// `None` means "nothing stored" (never saved, or reset) and yields the
/// registry default layout.
pub fn reconcile(preferences: Option<&[WidgetConfig]>, registry: &WidgetRegistry) -> Layout {
    let Some(preferences) = preferences else {
        return registry.default_layout();
    };

    let mut seen: HashSet<WidgetKey> = HashSet::with_capacity(registry.len());
    let mut layout = Layout::with_capacity(registry.len());

    for entry in preferences {
        let Some(key) = registry.resolve_key(&entry.key) else {
            // Not registered: silently dropped.
            continue;
        };
        if !seen.insert(key) {
            continue;
        }
        let Some(default_size) = registry.default_size(key) else {
            continue;
        };
        layout.push(ResolvedWidget {
            key,
            enabled: entry.enabled,
            size: entry.size.unwrap_or(default_size),
        });
    }

    for descriptor in registry.iter() {
        if !seen.contains(&descriptor.key) {
            layout.push(ResolvedWidget {
                key: descriptor.key,
                enabled: true,
                size: descriptor.default_size,
            });
        }
    }

    layout
}

/// Expansion of the reset sentinel: every registered widget, enabled, at
/// its default size. Applying it repeatedly yields the same layout.
pub fn reset_layout(registry: &WidgetRegistry) -> Layout {
    reconcile(None, registry)
}

/// Move the widget at `from` to position `to`, shifting the others.
///
/// Out-of-range indices leave the layout unchanged.
pub fn move_widget(layout: &[ResolvedWidget], from: usize, to: usize) -> Layout {
    let mut moved = layout.to_vec();
    if from >= moved.len() || to >= moved.len() || from == to {
        return moved;
    }
    let widget = moved.remove(from);
    moved.insert(to, widget);
    moved
}

/// Position of a widget in a layout.
pub fn position_of(layout: &[ResolvedWidget], key: WidgetKey) -> Option<usize> {
    layout.iter().position(|w| w.key == key)
}

/// Wire payload for a layout: one entry per widget, size always present.
pub fn to_preferences(layout: &[ResolvedWidget]) -> Vec<WidgetConfig> {
    layout.iter().copied().map(WidgetConfig::from).collect()
}

// ---------------------------------------------------------------------------
// Mutations
// ---------------------------------------------------------------------------

/// A user-triggered change to the stored layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutMutation {
    /// Drag-and-drop reorder; carries the already-moved layout.
    Reorder(Layout),
    /// Explicit save from the customization panel.
    Save(Layout),
    /// Restore registry defaults. Sent as a `null` payload.
    Reset,
}

impl LayoutMutation {
    /// Body sent to the preference endpoint. `None` encodes a reset.
    pub fn payload(&self) -> Option<Vec<WidgetConfig>> {
        match self {
            LayoutMutation::Reorder(layout) | LayoutMutation::Save(layout) => {
                Some(to_preferences(layout))
            }
            LayoutMutation::Reset => None,
        }
    }

    /// Layout to display before the server confirms the change.
    pub fn optimistic_layout(&self, registry: &WidgetRegistry) -> Layout {
        match self {
            LayoutMutation::Reorder(layout) | LayoutMutation::Save(layout) => layout.clone(),
            LayoutMutation::Reset => reset_layout(registry),
        }
    }

    /// Preferences to write into the query cache optimistically.
    ///
    /// A reset is expanded here as well, so cache readers never observe the
    /// bare sentinel while the request is in flight.
    pub fn cached_preferences(&self, registry: &WidgetRegistry) -> Vec<WidgetConfig> {
        to_preferences(&self.optimistic_layout(registry))
    }

    /// Whether the mutation was issued from the customization panel.
    pub fn from_panel(&self) -> bool {
        matches!(self, LayoutMutation::Save(_) | LayoutMutation::Reset)
    }

    /// Short label used in logs and notifications.
    pub fn label(&self) -> &'static str {
        match self {
            LayoutMutation::Reorder(_) => "reorder",
            LayoutMutation::Save(_) => "save",
            LayoutMutation::Reset => "reset",
        }
    }

    /// Confirmation text shown on success.
    pub fn success_message(&self) -> &'static str {
        match self {
            LayoutMutation::Reorder(_) => "Dashboard order saved",
            LayoutMutation::Save(_) => "Dashboard layout saved",
            LayoutMutation::Reset => "Dashboard layout reset to defaults",
        }
    }
}

// ---------------------------------------------------------------------------
// Memoization
// ---------------------------------------------------------------------------

/// Caches the last reconciled layout, keyed on the identity (version) of
/// the server data it was computed from.
///
/// Callers that compare layouts by pointer (drag-and-drop bookkeeping) get
/// the same `Arc` back until the underlying data changes.
#[derive(Debug, Default)]
pub struct EffectiveLayoutMemo {
    computed: Option<(Option<u64>, Arc<Layout>)>,
}

impl EffectiveLayoutMemo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the memoized layout for `version`, recomputing on change.
    ///
    /// `version` is `None` when no server data is available yet.
    pub fn resolve(
        &mut self,
        version: Option<u64>,
        preferences: Option<&[WidgetConfig]>,
        registry: &WidgetRegistry,
    ) -> Arc<Layout> {
        if let Some((cached_version, layout)) = &self.computed {
            if *cached_version == version {
                return Arc::clone(layout);
            }
        }
        let layout = Arc::new(reconcile(preferences, registry));
        self.computed = Some((version, Arc::clone(&layout)));
        layout
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
