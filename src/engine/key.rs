//! Identity & key model.
//!
//! Every child in a sibling list has an [`Identity`]: its position, an
//! optional explicit [`Key`], its [`NodeKind`] and the type tag of its
//! component (or [`LEAF_TAG`] for leaves). Reconciliation pairs old and new
//! siblings by identity to decide between reusing an instance (keeping its
//! state) and remounting it.
//!
//! The kind is part of identity, so a component whose name happens to be
//! `"leaf"` never pairs with a leaf.
//!
//! # Default: positional identity
//!
//! Without keys, the n-th old child pairs with the n-th new child when the
//! kinds and type tags agree. Reordering an unkeyed list therefore remounts every
//! shifted item and resets its state. That is correct but wasteful; give
//! list items explicit keys when they can move.
//!
//! # Keys
//!
//! Keyed children pair by `(key, tag)` wherever they sit in the list.
//! Two siblings declaring the same key is a programmer error and is
//! reported as [`MenuError::DuplicateKey`], never resolved silently.

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;

use crate::error::{MenuError, Result};

/// Type tag of leaf nodes.
pub const LEAF_TAG: &str = "leaf";

/// Whether a child is a leaf or a component instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Leaf,
    Composite,
}

// =============================================================================
// Key
// =============================================================================

/// Explicit sibling key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    Int(i64),
    Str(Cow<'static, str>),
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Int(n) => write!(f, "{n}"),
            Key::Str(s) => write!(f, "{s:?}"),
        }
    }
}

impl From<&'static str> for Key {
    fn from(value: &'static str) -> Self {
        Key::Str(Cow::Borrowed(value))
    }
}

impl From<String> for Key {
    fn from(value: String) -> Self {
        Key::Str(Cow::Owned(value))
    }
}

impl From<i64> for Key {
    fn from(value: i64) -> Self {
        Key::Int(value)
    }
}

impl From<i32> for Key {
    fn from(value: i32) -> Self {
        Key::Int(value.into())
    }
}

impl From<usize> for Key {
    fn from(value: usize) -> Self {
        Key::Int(value as i64)
    }
}

// =============================================================================
// Identity
// =============================================================================

/// Identity of one child within its sibling list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity<'a> {
    /// Position in the parent's child list.
    pub index: usize,
    /// Explicit key, if any.
    pub key: Option<&'a Key>,
    pub kind: NodeKind,
    /// Component type tag, or [`LEAF_TAG`].
    pub tag: &'a str,
}

impl Identity<'_> {
    fn same_type(&self, other: &Identity<'_>) -> bool {
        self.kind == other.kind && self.tag == other.tag
    }
}

// =============================================================================
// Pairing
// =============================================================================

/// Result of pairing an old sibling list with a new one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pairing {
    /// For each new child, the old child it reuses (`None` = mount).
    pub new_to_old: Vec<Option<usize>>,
    /// Old children with no partner, ascending.
    pub unmount: Vec<usize>,
}

impl Pairing {
    /// `(old, new)` pairs in new-list order.
    pub fn matched(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.new_to_old
            .iter()
            .enumerate()
            .filter_map(|(new, old)| old.map(|old| (old, new)))
    }

    /// New children that need mounting, ascending.
    pub fn mounts(&self) -> impl Iterator<Item = usize> + '_ {
        self.new_to_old
            .iter()
            .enumerate()
            .filter_map(|(new, old)| old.is_none().then_some(new))
    }
}

/// Reject sibling lists that declare a key twice.
pub fn check_unique_keys<'a>(
    parent: &str,
    keys: impl IntoIterator<Item = Option<&'a Key>>,
) -> Result<()> {
    let mut seen: HashMap<&Key, ()> = HashMap::new();
    for key in keys.into_iter().flatten() {
        if seen.insert(key, ()).is_some() {
            return Err(MenuError::DuplicateKey {
                key: key.clone(),
                parent: parent.to_string(),
            });
        }
    }
    Ok(())
}

/// Pair `old` siblings with `new` siblings by identity.
///
/// `old` is assumed valid (it was accepted by a previous pass); `new` is
/// checked for duplicate keys first.
pub fn pair_children(parent: &str, old: &[Identity<'_>], new: &[Identity<'_>]) -> Result<Pairing> {
    check_unique_keys(parent, new.iter().map(|id| id.key))?;

    let old_keyed: HashMap<&Key, usize> = old
        .iter()
        .filter_map(|id| id.key.map(|key| (key, id.index)))
        .collect();

    let mut used = vec![false; old.len()];
    let mut new_to_old = Vec::with_capacity(new.len());

    for id in new {
        let partner = match id.key {
            Some(key) => old_keyed.get(key).copied().filter(|&o| old[o].same_type(id)),
            None => old
                .get(id.index)
                .filter(|o| o.key.is_none() && o.same_type(id))
                .map(|o| o.index),
        };
        let partner = partner.filter(|&o| !used[o]);
        if let Some(o) = partner {
            used[o] = true;
        }
        new_to_old.push(partner);
    }

    let unmount = used
        .iter()
        .enumerate()
        .filter_map(|(i, used)| (!used).then_some(i))
        .collect();

    Ok(Pairing { new_to_old, unmount })
}

// =============================================================================
// Tests
// =============================================================================
