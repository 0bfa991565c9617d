//! Role-filtered navigation.
//!
//! The navigation list is static. Filtering by role, splitting into primary
//! and overflow groups, and finding the active entry are pure functions.

mod items;

pub use items::NAV_ITEMS;

use serde::Serialize;

use crate::models::Role;

/// A navigation-menu entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavItem {
    pub icon: &'static str,
    pub label: &'static str,
    pub route: &'static str,
    /// Path prefix that marks the entry active, when it differs from `route`.
    pub active_prefix: Option<&'static str>,
    /// Roles allowed to see the entry.
    pub roles: &'static [Role],
    /// Shown behind the "more" affordance instead of the main bar.
    pub overflow: bool,
    /// Higher wins when several entries match the current path.
    pub priority: u8,
}

impl NavItem {
    /// Prefix used for active-path matching.
    pub fn match_prefix(&self) -> &'static str {
        self.active_prefix.unwrap_or(self.route)
    }

    pub fn is_visible_to(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    /// Whether `path` lies at or below this entry's match prefix.
    pub fn matches(&self, path: &str) -> bool {
        path_has_prefix(path, self.match_prefix())
    }
}

/// Segment-aware prefix test.
///
/// `/inventory` matches `/inventory`, `/inventory/lots` and
/// `/inventory?material=5`, but not `/inventory-archive`. The root `/` only
/// matches itself.
pub fn path_has_prefix(path: &str, prefix: &str) -> bool {
    let prefix = if prefix.len() > 1 {
        prefix.trim_end_matches('/')
    } else {
        prefix
    };
    match path.strip_prefix(prefix) {
        None => false,
        Some(rest) if prefix == "/" => rest.is_empty() || rest.starts_with(['?', '#']),
        Some(rest) => rest.is_empty() || rest.starts_with(['/', '?', '#']),
    }
}

/// Entries of the static list visible to `role`, in declaration order.
pub fn visible_items(role: Role) -> Vec<&'static NavItem> {
    visible_items_in(NAV_ITEMS, role)
}

/// Order-preserving role filter over an arbitrary list.
pub fn visible_items_in(items: &[NavItem], role: Role) -> Vec<&NavItem> {
    items.iter().filter(|item| item.is_visible_to(role)).collect()
}

/// Split into (primary, overflow), preserving order within each group.
pub fn primary_vs_overflow<'a>(items: &[&'a NavItem]) -> (Vec<&'a NavItem>, Vec<&'a NavItem>) {
    items.iter().copied().partition(|item| !item.overflow)
}

/// The entry to highlight for `path`.
///
/// Among matching entries the highest `priority` wins; equal priorities fall
/// back to declaration order. No match yields `None`.
pub fn active_item<'a>(path: &str, items: &[&'a NavItem]) -> Option<&'a NavItem> {
    let mut best: Option<&'a NavItem> = None;
    for item in items.iter().copied().filter(|item| item.matches(path)) {
        match best {
            Some(current) if current.priority >= item.priority => {}
            _ => best = Some(item),
        }
    }
    best
}

/// Visible navigation for a role, already split for rendering.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Navigation {
    pub primary: Vec<&'static NavItem>,
    pub overflow: Vec<&'static NavItem>,
    /// Both groups in declaration order, for active matching.
    #[serde(skip)]
    visible: Vec<&'static NavItem>,
}

impl Navigation {
    pub fn for_role(role: Role) -> Self {
        Self::from_items(NAV_ITEMS, role)
    }

    /// Navigation over an arbitrary static list.
    pub fn from_items(items: &'static [NavItem], role: Role) -> Self {
        let visible = visible_items_in(items, role);
        let (primary, overflow) = primary_vs_overflow(&visible);
        Self {
            primary,
            overflow,
            visible,
        }
    }

    /// Navigation for a session without a recognized role: empty.
    pub fn for_optional_role(role: Option<Role>) -> Self {
        role.map(Self::for_role).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.visible.is_empty()
    }

    /// All visible entries in declaration order.
    pub fn all(&self) -> &[&'static NavItem] {
        &self.visible
    }

    pub fn active(&self, path: &str) -> Option<&'static NavItem> {
        active_item(path, &self.visible)
    }
}
