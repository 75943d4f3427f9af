//! # Items
//!
//! Item identifiers, inventory item instances and reward groups.
//!
//! A template id names an item *type* in the catalog. An item id names one
//! *instance* inside a profile inventory. Rewards are built as fresh instances
//! with ids that never collide with anything the profile already owns.

use std::collections::HashSet;
use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Identifier of an item type in the catalog.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TemplateId(String);

impl TemplateId {
    /// Creates a template id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TemplateId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for TemplateId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Identifier of one item instance in a profile inventory.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    /// Creates an item id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Position of a root item inside a container grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemLocation {
    /// Column.
    pub x: u32,
    /// Row.
    pub y: u32,
    /// Whether the item is rotated.
    pub rotated: bool,
}

/// Mutable per-instance data.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemUpd {
    /// Number of units in this stack.
    pub stack_objects_count: u32,
    /// Item was created during the current session.
    pub spawned_in_session: bool,
}

/// One item instance in a profile inventory.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItem {
    /// Unique instance id.
    pub id: ItemId,
    /// Catalog template.
    pub tpl: TemplateId,
    /// Containing item, or `None` for inventory roots.
    #[serde(default)]
    pub parent_id: Option<ItemId>,
    /// Slot inside the parent.
    #[serde(default)]
    pub slot_id: Option<String>,
    /// Grid position inside the parent.
    #[serde(default)]
    pub location: Option<ItemLocation>,
    /// Stack data.
    #[serde(default)]
    pub upd: Option<ItemUpd>,
}

impl InventoryItem {
    /// Creates a bare item with no parent.
    #[must_use]
    pub fn new(id: ItemId, tpl: TemplateId) -> Self {
        Self {
            id,
            tpl,
            parent_id: None,
            slot_id: None,
            location: None,
            upd: None,
        }
    }

    /// Creates a freshly spawned reward stack parented into a container slot.
    #[must_use]
    pub fn reward(
        id: ItemId,
        tpl: TemplateId,
        container_id: &ItemId,
        slot_id: &str,
        stack_size: u32,
    ) -> Self {
        Self {
            id,
            tpl,
            parent_id: Some(container_id.clone()),
            slot_id: Some(slot_id.to_string()),
            location: None,
            upd: Some(ItemUpd {
                stack_objects_count: stack_size,
                spawned_in_session: true,
            }),
        }
    }

    /// Sets the parent and slot, returning the item.
    #[must_use]
    pub fn with_parent(mut self, parent_id: ItemId, slot_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id);
        self.slot_id = Some(slot_id.into());
        self
    }

    /// Number of units in this stack (1 when unset).
    #[inline]
    #[must_use]
    pub fn stack_size(&self) -> u32 {
        self.upd.as_ref().map_or(1, |upd| upd.stack_objects_count)
    }
}

/// A single reward unit: a root item followed by any attached sub-parts.
///
/// Counted as one reward and placed all-or-nothing.
#[derive(Clone, Debug, PartialEq)]
pub struct RewardGroup {
    items: Vec<InventoryItem>,
}

impl RewardGroup {
    /// Creates a group holding one item.
    #[must_use]
    pub fn single(item: InventoryItem) -> Self {
        Self { items: vec![item] }
    }

    /// Creates a group from a root item and its parts.
    ///
    /// Returns `None` for an empty list.
    #[must_use]
    pub fn from_items(items: Vec<InventoryItem>) -> Option<Self> {
        if items.is_empty() {
            None
        } else {
            Some(Self { items })
        }
    }

    /// The root item.
    #[must_use]
    pub fn root(&self) -> &InventoryItem {
        &self.items[0]
    }

    /// Mutable access to the root item.
    pub fn root_mut(&mut self) -> &mut InventoryItem {
        &mut self.items[0]
    }

    /// All items, root first.
    #[must_use]
    pub fn items(&self) -> &[InventoryItem] {
        &self.items
    }

    /// Number of items in the group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Always false; a group has at least its root.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Consumes the group into its items.
    #[must_use]
    pub fn into_items(self) -> Vec<InventoryItem> {
        self.items
    }
}

/// Generates item ids unique against a profile inventory.
#[derive(Debug, Default)]
pub struct ItemIdGenerator {
    taken: HashSet<ItemId>,
}

impl ItemIdGenerator {
    /// Creates a generator that avoids every id in `existing`.
    pub fn new<'a>(existing: impl IntoIterator<Item = &'a ItemId>) -> Self {
        Self {
            taken: existing.into_iter().cloned().collect(),
        }
    }

    /// Returns a new 24 hex character id not seen before.
    pub fn generate<R: Rng + ?Sized>(&mut self, rng: &mut R) -> ItemId {
        loop {
            let bytes: [u8; 12] = rng.gen();
            let id = ItemId::new(hex::encode(bytes));
            if self.taken.insert(id.clone()) {
                return id;
            }
        }
    }

    /// Returns true if `id` is already in use.
    #[must_use]
    pub fn is_taken(&self, id: &ItemId) -> bool {
        self.taken.contains(id)
    }
}
