//! # Player Profile
//!
//! The slice of a player's save state the ritual reads and writes.
//!
//! The caller owns the profile, loads it before a ritual and persists it
//! afterwards. The engine assumes exclusive access for the duration of one
//! call.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::config::AreaType;
use crate::item::{InventoryItem, ItemId, TemplateId};
use crate::ledger::RewardLedger;

/// Quest identifier.
pub type QuestId = String;

/// A hideout area and its built level.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AreaState {
    /// Area type.
    pub area_type: AreaType,
    /// Current built level; 0 if not built.
    pub level: u32,
}

/// Lifecycle state of a quest.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuestStatus {
    /// Not yet available.
    Locked,
    /// Can be started.
    AvailableForStart,
    /// In progress.
    Started,
    /// Conditions met, not yet handed in.
    AvailableForFinish,
    /// Completed.
    Success,
    /// Failed.
    Fail,
}

/// A quest in the player's log.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestState {
    /// Quest id.
    pub quest_id: QuestId,
    /// Current status.
    pub status: QuestStatus,
}

/// A running hideout production.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Production {
    /// Recipe id.
    pub recipe_id: String,
    /// Unix time the craft started, in seconds.
    pub start_timestamp: u64,
    /// Craft duration in seconds.
    pub production_time: u64,
    /// Items consumed when the craft started.
    pub given_items_in_start: Vec<InventoryItem>,
    /// Marks productions started by the circle.
    pub is_cultist_circle: bool,
    /// Whether the craft is still running.
    pub in_progress: bool,
}

/// Player save state touched by a ritual.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    /// Profile id.
    pub id: String,
    /// Inventory items.
    #[serde(default)]
    pub items: Vec<InventoryItem>,
    /// Stash item backing the circle grid.
    #[serde(default)]
    pub circle_stash_id: Option<ItemId>,
    /// Hideout management skill progress, in thousandths of a level.
    #[serde(default)]
    pub hideout_management_progress: Option<f64>,
    /// Built hideout areas.
    #[serde(default)]
    pub hideout_areas: Vec<AreaState>,
    /// Quest log.
    #[serde(default)]
    pub quests: Vec<QuestState>,
    /// Running productions by recipe id.
    #[serde(default)]
    pub production: HashMap<String, Production>,
    /// Claimed direct rewards.
    #[serde(default)]
    pub ledger: RewardLedger,
}

impl Profile {
    /// Creates an empty profile.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Items sitting in `slot_id`, followed by everything attached to them.
    ///
    /// Roots come first in inventory order; descendants are appended in
    /// inventory order as their parents are discovered.
    #[must_use]
    pub fn sacrificed_items(&self, slot_id: &str) -> Vec<InventoryItem> {
        let mut selected: Vec<InventoryItem> = self
            .items
            .iter()
            .filter(|item| item.slot_id.as_deref() == Some(slot_id))
            .cloned()
            .collect();

        let mut seen: HashSet<ItemId> = selected.iter().map(|item| item.id.clone()).collect();
        let mut cursor = 0;
        while cursor < selected.len() {
            let parent = selected[cursor].id.clone();
            for child in &self.items {
                if child.parent_id.as_ref() == Some(&parent) && seen.insert(child.id.clone()) {
                    selected.push(child.clone());
                }
            }
            cursor += 1;
        }

        selected
    }

    /// Template ids of the sacrificed items.
    #[must_use]
    pub fn sacrificed_templates(&self, slot_id: &str) -> Vec<TemplateId> {
        self.sacrificed_items(slot_id)
            .into_iter()
            .map(|item| item.tpl)
            .collect()
    }

    /// Removes items by id, returning how many were removed.
    pub fn remove_items(&mut self, ids: &HashSet<ItemId>) -> usize {
        let before = self.items.len();
        self.items.retain(|item| !ids.contains(&item.id));
        before - self.items.len()
    }

    /// Quests currently in progress.
    pub fn started_quests(&self) -> impl Iterator<Item = &QuestState> {
        self.quests
            .iter()
            .filter(|quest| quest.status == QuestStatus::Started)
    }

    /// Registers `production` under its recipe id, replacing any previous one.
    pub fn start_production(&mut self, production: Production) {
        self.production.insert(production.recipe_id.clone(), production);
    }
}
