//! Node keys and the expand/collapse state that survives refreshes.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Sentinel key switching categories from default-open to explicit membership.
pub const INITIALIZED: &str = "initialized";

/// Deterministic identity of a tree node.
///
/// Built only from the node's ancestor path, so it is identical across
/// refreshes while that path exists.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeKey(String);

impl NodeKey {
    /// Wrap an arbitrary key, e.g. one received from user input.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Key of a category header within a section.
    ///
    /// Whitespace runs become `-` and the name is lowercased.
    pub fn category(section: Section, name: &str) -> Self {
        let mut slug = String::with_capacity(name.len());
        let mut in_space = false;
        for c in name.chars() {
            if c.is_whitespace() {
                if !in_space {
                    slug.push('-');
                }
                in_space = true;
            } else {
                slug.extend(c.to_lowercase());
                in_space = false;
            }
        }
        Self(format!("cat-{}-{}", section.id(), slug))
    }

    /// Key of a server or subnet group below a category.
    pub fn group(category: &NodeKey, server_name: &str, parent_address: &str) -> Self {
        Self(format!("group:{}:{}:{}", category.0, server_name, parent_address))
    }

    /// Key of one address inside a subnet group.
    pub fn address(group: &NodeKey, address: &str) -> Self {
        Self(format!("ip:{}:{}", group.0, address))
    }

    /// Key string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NodeKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// One of the two panels records are partitioned into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    /// Records whose own status is healthy
    Operational,
    /// Records whose own status is failing
    Degraded,
}

impl Section {
    /// Both sections in display order.
    pub const ALL: [Section; 2] = [Section::Operational, Section::Degraded];

    /// Short id embedded in category keys.
    pub fn id(self) -> &'static str {
        match self {
            Self::Operational => "up",
            Self::Degraded => "down",
        }
    }

    /// Expansion key of the section itself.
    pub fn key(self) -> NodeKey {
        match self {
            Self::Operational => NodeKey::new("section-operational"),
            Self::Degraded => NodeKey::new("section-degraded"),
        }
    }

    /// Panel title.
    pub fn title(self) -> &'static str {
        match self {
            Self::Operational => "Operational",
            Self::Degraded => "Degraded",
        }
    }

    /// Section a record belongs to.
    pub fn of(healthy: bool) -> Self {
        if healthy {
            Self::Operational
        } else {
            Self::Degraded
        }
    }
}

/// Set of expanded node keys, alive for the whole process.
///
/// Only [`ExpansionState::toggle`] mutates it; refreshes never clear it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpansionState {
    expanded: HashSet<String>,
}

impl Default for ExpansionState {
    fn default() -> Self {
        Self::new()
    }
}

impl ExpansionState {
    /// Process-start state: both sections open plus the sentinel.
    pub fn new() -> Self {
        Self::with_keys(
            Section::ALL
                .iter()
                .map(|s| s.key().0)
                .chain(std::iter::once(INITIALIZED.to_string())),
        )
    }

    /// State seeded with exactly `keys`.
    pub fn with_keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            expanded: keys.into_iter().map(Into::into).collect(),
        }
    }

    /// Flip membership of `key`; returns the new membership.
    pub fn toggle(&mut self, key: &str) -> bool {
        if self.expanded.remove(key) {
            false
        } else {
            self.expanded.insert(key.to_string());
            true
        }
    }

    /// Explicit membership test.
    pub fn contains(&self, key: &str) -> bool {
        self.expanded.contains(key)
    }

    /// True once the default-open phase for categories is over.
    pub fn is_initialized(&self) -> bool {
        self.expanded.contains(INITIALIZED)
    }

    /// Whether a category header shows its children.
    ///
    /// Without the sentinel every category is open.
    pub fn is_category_expanded(&self, key: &NodeKey) -> bool {
        self.contains(key.as_str()) || !self.is_initialized()
    }

    /// Whether a group, address or section shows its children.
    pub fn is_expanded(&self, key: &NodeKey) -> bool {
        self.contains(key.as_str())
    }

    /// Number of keys in the set, sentinel included.
    pub fn len(&self) -> usize {
        self.expanded.len()
    }

    /// True when nothing is expanded and the sentinel is absent.
    pub fn is_empty(&self) -> bool {
        self.expanded.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_state() {
        let state = ExpansionState::new();
        assert!(state.is_expanded(&Section::Operational.key()));
        assert!(state.is_expanded(&Section::Degraded.key()));
        assert!(state.is_initialized());
        assert_eq!(state.len(), 3);
    }

    #[test]
    fn test_toggle_is_idempotent_in_pairs() {
        let mut state = ExpansionState::new();
        let key = "group:cat-up-edge:edge1:10.0.0.0/24";
        let before = state.clone();

        assert!(state.toggle(key));
        assert!(state.contains(key));
        assert!(!state.toggle(key));
        assert_eq!(state, before);

        let section = Section::Operational.key();
        state.toggle(section.as_str());
        state.toggle(section.as_str());
        assert!(state.is_expanded(&section));
    }

    #[test]
    fn test_default_open_without_sentinel() {
        let state = ExpansionState::with_keys(["section-operational"]);
        let category = NodeKey::category(Section::Operational, "Edge");
        assert!(state.is_category_expanded(&category));
        // Groups are not covered by the default-open rule
        let group = NodeKey::group(&category, "edge1", "10.0.0.0/24");
        assert!(!state.is_expanded(&group));
    }

    #[test]
    fn test_sentinel_switches_to_membership() {
        let mut state = ExpansionState::with_keys(Vec::<String>::new());
        let category = NodeKey::category(Section::Degraded, "Core Routers");
        assert!(state.is_category_expanded(&category));

        state.toggle(INITIALIZED);
        assert!(!state.is_category_expanded(&category));

        state.toggle(category.as_str());
        assert!(state.is_category_expanded(&category));
    }

    #[test]
    fn test_key_shapes() {
        let category = NodeKey::category(Section::Operational, "Core  Routers");
        assert_eq!(category.as_str(), "cat-up-core-routers");

        let group = NodeKey::group(&category, "edge1", "10.0.0.0/24");
        assert_eq!(group.as_str(), "group:cat-up-core-routers:edge1:10.0.0.0/24");

        let address = NodeKey::address(&group, "10.0.0.5");
        assert_eq!(address.as_str(), "ip:group:cat-up-core-routers:edge1:10.0.0.0/24:10.0.0.5");
    }
}
