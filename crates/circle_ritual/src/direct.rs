//! # Direct Rewards
//!
//! Fixed-outcome trades keyed by the exact sacrificed item set.
//!
//! The table is built once from configuration. Lookup hashes the sacrificed
//! template ids with [`item_set_key`], so `[A, B]` and `[B, A]` hit the same
//! rule. A hit on a non-repeatable rule the profile has already claimed is a
//! miss.

use std::collections::HashMap;

use rand::Rng;
use tracing::{debug, warn};

use crate::catalog::Catalog;
use crate::config::{CircleConfig, DirectRewardRule};
use crate::error::{RitualError, RitualResult};
use crate::item::{InventoryItem, ItemId, ItemIdGenerator, RewardGroup, TemplateId};
use crate::ledger::{item_set_key, RewardLedger};

/// Direct reward lookup table.
#[derive(Clone, Debug, Default)]
pub struct DirectRewardTable {
    rules: HashMap<String, DirectRewardRule>,
}

impl DirectRewardTable {
    /// Builds the table.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateDirectReward` if two rules require the same item set.
    pub fn from_rules(rules: &[DirectRewardRule]) -> RitualResult<Self> {
        let mut table = HashMap::with_capacity(rules.len());
        for rule in rules {
            let key = item_set_key(&rule.required_items);
            if table.contains_key(&key) {
                return Err(RitualError::DuplicateDirectReward { key });
            }
            table.insert(key, rule.clone());
        }
        Ok(Self { rules: table })
    }

    /// Number of rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the table has no rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Finds the rule matching `sacrificed`, if it is still claimable.
    #[must_use]
    pub fn find(
        &self,
        sacrificed: &[TemplateId],
        ledger: &RewardLedger,
    ) -> Option<&DirectRewardRule> {
        if sacrificed.is_empty() {
            return None;
        }

        let rule = self.rules.get(&item_set_key(sacrificed))?;
        if !rule.repeatable && ledger.has_claimed(rule) {
            debug!("Direct reward already claimed, ignoring");
            return None;
        }

        Some(rule)
    }
}

/// Instantiates the items of a matched direct reward.
#[derive(Debug)]
pub struct DirectRewardIssuer<'c> {
    config: &'c CircleConfig,
}

impl<'c> DirectRewardIssuer<'c> {
    /// Creates an issuer.
    #[must_use]
    pub const fn new(config: &'c CircleConfig) -> Self {
        Self { config }
    }

    /// Applies the configured cosmetic variant policy to a reward list.
    ///
    /// For each configured variant set, if more than one member appears in
    /// `rewards`, one of them is kept at random and the others are dropped.
    pub fn resolve_variants<R: Rng + ?Sized>(
        &self,
        rewards: &[TemplateId],
        rng: &mut R,
    ) -> Vec<TemplateId> {
        let mut keep = vec![true; rewards.len()];

        for variants in &self.config.exclusive_reward_variants {
            let positions: Vec<usize> = rewards
                .iter()
                .enumerate()
                .filter(|(_, tpl)| variants.contains(tpl))
                .map(|(index, _)| index)
                .collect();
            if positions.len() < 2 {
                continue;
            }

            let chosen = positions[rng.gen_range(0..positions.len())];
            for index in positions {
                keep[index] = index == chosen;
            }
        }

        rewards
            .iter()
            .zip(keep)
            .filter_map(|(tpl, kept)| kept.then(|| tpl.clone()))
            .collect()
    }

    /// Stack size of a direct reward, from its parent class range.
    pub fn stack_size<C, R>(&self, catalog: &C, tpl: &TemplateId, rng: &mut R) -> u32
    where
        C: Catalog + ?Sized,
        R: Rng + ?Sized,
    {
        let Some(template) = catalog.template(tpl).filter(|template| template.valid) else {
            warn!("{tpl} is not an item, setting stack size to 1");
            return 1;
        };

        template
            .parent
            .as_ref()
            .and_then(|parent| self.config.direct_reward_stack_size.get(parent))
            .map_or(1, |range| range.sample(rng).max(1))
    }

    /// Creates one single-item group per reward entry, without presets.
    pub fn issue<C, R>(
        &self,
        rule: &DirectRewardRule,
        catalog: &C,
        container_id: &ItemId,
        ids: &mut ItemIdGenerator,
        rng: &mut R,
    ) -> Vec<RewardGroup>
    where
        C: Catalog + ?Sized,
        R: Rng + ?Sized,
    {
        self.resolve_variants(&rule.reward_items, rng)
            .into_iter()
            .map(|tpl| {
                let stack_size = self.stack_size(catalog, &tpl, rng);
                let id = ids.generate(rng);
                RewardGroup::single(InventoryItem::reward(
                    id,
                    tpl,
                    container_id,
                    &self.config.circle_slot_id,
                    stack_size,
                ))
            })
            .collect()
    }
}
