//! Recursive permission trees and the deep-merge policy shared by role
//! aggregation, user overrides and partial updates.
//!
//! Merge policy for every key of the `source` tree:
//!
//! - a nested tree in `source` is merged recursively into the `target` value,
//!   which is treated as empty when it is missing or not a tree;
//! - two levels combine to the larger level;
//! - anything else, flags included, is overwritten by the `source` value.
//!
//! Level grants are therefore monotonic: once a tree grants level `n`, merging
//! another tree on top never lowers it.

use std::collections::BTreeMap;
use std::collections::btree_map;

use serde::{Deserialize, Serialize};

/// A single value stored under a permission key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PermissionValue {
    /// Boolean grant.
    Flag(bool),
    /// Non-negative access level.
    Level(u64),
    /// Free-form scalar carried through unchanged.
    Text(String),
    /// List scalar; never merged element-wise.
    List(Vec<PermissionValue>),
    /// Nested permission tree.
    Tree(PermissionTree),
}

impl From<bool> for PermissionValue {
    fn from(value: bool) -> Self {
        Self::Flag(value)
    }
}

impl From<u64> for PermissionValue {
    fn from(value: u64) -> Self {
        Self::Level(value)
    }
}

impl From<&str> for PermissionValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for PermissionValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<PermissionTree> for PermissionValue {
    fn from(value: PermissionTree) -> Self {
        Self::Tree(value)
    }
}

/// Mapping from permission keys to flags, levels or nested trees.
///
/// Equality is structural and ignores insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionTree {
    entries: BTreeMap<String, PermissionValue>,
}

impl PermissionTree {
    /// Creates an empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of this tree with `key` set to `value`.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<PermissionValue>) -> Self {
        self.entries.insert(key.into(), value.into());
        self
    }

    /// Sets `key` to `value`, returning the previous value.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<PermissionValue>,
    ) -> Option<PermissionValue> {
        self.entries.insert(key.into(), value.into())
    }

    /// Returns the value stored directly under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&PermissionValue> {
        self.entries.get(key)
    }

    /// Returns whether the tree has no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the number of top-level keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Iterates over top-level entries in key order.
    pub fn iter(&self) -> btree_map::Iter<'_, String, PermissionValue> {
        self.entries.iter()
    }
}

impl From<BTreeMap<String, PermissionValue>> for PermissionTree {
    fn from(entries: BTreeMap<String, PermissionValue>) -> Self {
        Self { entries }
    }
}

impl<K, V> FromIterator<(K, V)> for PermissionTree
where
    K: Into<String>,
    V: Into<PermissionValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}

impl<'a> IntoIterator for &'a PermissionTree {
    type Item = (&'a String, &'a PermissionValue);
    type IntoIter = btree_map::Iter<'a, String, PermissionValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Deep-merges `source` onto `target`, returning a new tree.
///
/// Keys only present in `target` are kept as they are. The call is
/// order-sensitive only for conflicting non-monotonic scalars, where `source`
/// wins.
#[must_use]
pub fn merge(target: &PermissionTree, source: &PermissionTree) -> PermissionTree {
    let mut merged = target.clone();
    for (key, source_value) in &source.entries {
        let target_value = merged.entries.remove(key);
        merged
            .entries
            .insert(key.clone(), merge_value(target_value, source_value));
    }

    merged
}

fn merge_value(target: Option<PermissionValue>, source: &PermissionValue) -> PermissionValue {
    match (target, source) {
        (Some(PermissionValue::Tree(target)), PermissionValue::Tree(source)) => {
            PermissionValue::Tree(merge(&target, source))
        }
        (Some(PermissionValue::Level(target)), PermissionValue::Level(source)) => {
            PermissionValue::Level(target.max(*source))
        }
        // Missing or mismatched targets: a nested source merged into an empty
        // tree is the source itself.
        (_, source) => source.clone(),
    }
}

/// Folds `trees` left-to-right with [`merge`], starting from an empty tree.
///
/// Conflicting flag, text or list values are won by the later tree, while
/// levels always resolve to the maximum across all trees regardless of order.
#[must_use]
pub fn merge_all<'a, I>(trees: I) -> PermissionTree
where
    I: IntoIterator<Item = &'a PermissionTree>,
{
    trees
        .into_iter()
        .fold(PermissionTree::new(), |aggregate, tree| merge(&aggregate, tree))
}

/// Result of applying a partial permission update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchOutcome {
    /// Tree after the patch was merged in.
    pub tree: PermissionTree,
    /// Whether the owning record must be persisted.
    ///
    /// True for every non-empty patch, even when the merged tree equals the
    /// stored one.
    pub changed: bool,
}

/// Applies `patch` onto `stored` using the deep-merge policy.
#[must_use]
pub fn apply_patch(stored: &PermissionTree, patch: &PermissionTree) -> PatchOutcome {
    PatchOutcome {
        tree: merge(stored, patch),
        changed: !patch.is_empty(),
    }
}
