//! # Reward Ledger
//!
//! Per-profile record of claimed non-repeatable direct rewards.
//!
//! Entries are keyed by a content hash of the rule's required and reward
//! items, so the key only depends on *which* items are involved and never on
//! their order or on in-memory identity:
//!
//! ```text
//! item_set_key(items) = sha256(sort(items).join(","))
//! claim_key(rule)     = sha256(sort(required).join(",") + "-" + sort(reward).join(","))
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::config::DirectRewardRule;
use crate::item::TemplateId;

fn sorted_join(items: &[TemplateId]) -> String {
    let mut ids: Vec<&str> = items.iter().map(TemplateId::as_str).collect();
    ids.sort_unstable();
    ids.join(",")
}

fn digest(text: &str) -> String {
    hex::encode(Sha256::digest(text.as_bytes()))
}

/// Order-insensitive content key of an item multiset.
#[must_use]
pub fn item_set_key(items: &[TemplateId]) -> String {
    digest(&sorted_join(items))
}

/// Ledger key of a direct reward rule.
#[must_use]
pub fn claim_key(rule: &DirectRewardRule) -> String {
    let text = format!(
        "{}-{}",
        sorted_join(&rule.required_items),
        sorted_join(&rule.reward_items)
    );
    digest(&text)
}

/// A claimed non-repeatable direct reward.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcceptedRewardRecord {
    /// Unix time of the claim, in seconds.
    pub timestamp: u64,
    /// Items the rule required.
    pub sacrifice_items: Vec<TemplateId>,
    /// Items the rule rewards.
    pub reward_items: Vec<TemplateId>,
}

/// Claimed direct rewards of one profile.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RewardLedger {
    entries: BTreeMap<String, AcceptedRewardRecord>,
}

impl RewardLedger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `rule` has been claimed.
    #[must_use]
    pub fn has_claimed(&self, rule: &DirectRewardRule) -> bool {
        self.entries.contains_key(&claim_key(rule))
    }

    /// Records a claim of `rule`.
    ///
    /// Returns false, leaving the first record untouched, if it was already
    /// claimed.
    pub fn record(&mut self, rule: &DirectRewardRule, timestamp: u64) -> bool {
        let key = claim_key(rule);
        if self.entries.contains_key(&key) {
            return false;
        }

        self.entries.insert(
            key,
            AcceptedRewardRecord {
                timestamp,
                sacrifice_items: rule.required_items.clone(),
                reward_items: rule.reward_items.clone(),
            },
        );
        true
    }

    /// Looks up a record by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&AcceptedRewardRecord> {
        self.entries.get(key)
    }

    /// Number of claims.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing was claimed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
