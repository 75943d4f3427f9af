//! # Budgeted Reward Drafting
//!
//! Draws templates from the candidate pool until the budget is spent.
//!
//! ```text
//! while total < budget && pool not empty && groups < max_reward_item_count:
//!     tpl = pool[random]
//!     weapon / plated armor ─► default preset with fresh ids (1 group)
//!                              no preset: failed_attempts += 1, stop at cap
//!     anything else         ─► single item, stack sized by class
//!                              ammo:     template stack range
//!                              currency: percent of remaining budget / unit price
//! ```
//!
//! Every loop exit is bounded: budget reached, empty pool, group cap, or
//! failed attempt cap.

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::warn;

use crate::catalog::{base_class, Catalog};
use crate::config::CircleConfig;
use crate::item::{InventoryItem, ItemId, ItemIdGenerator, ItemUpd, RewardGroup, TemplateId};

/// Result of a drafting run.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DraftOutcome {
    /// Drafted reward groups, in draw order.
    pub groups: Vec<RewardGroup>,
    /// Summed rouble cost of the groups.
    pub total_cost: f64,
    /// Preset-less weapon or armor draws.
    pub failed_attempts: u32,
}

/// Budgeted reward drafter.
#[derive(Debug)]
pub struct RewardDrafter<'c> {
    config: &'c CircleConfig,
}

impl<'c> RewardDrafter<'c> {
    /// Creates a drafter.
    #[must_use]
    pub const fn new(config: &'c CircleConfig) -> Self {
        Self { config }
    }

    /// Drafts rewards worth up to roughly `budget` roubles.
    pub fn draft<C, R>(
        &self,
        pool: &[TemplateId],
        budget: f64,
        container_id: &ItemId,
        catalog: &C,
        ids: &mut ItemIdGenerator,
        rng: &mut R,
    ) -> DraftOutcome
    where
        C: Catalog + ?Sized,
        R: Rng + ?Sized,
    {
        let mut outcome = DraftOutcome::default();

        while outcome.total_cost < budget
            && outcome.groups.len() < self.config.max_reward_item_count
        {
            let Some(tpl) = pool.choose(rng) else {
                break;
            };

            if catalog.is_preset_reward(tpl) {
                let Some(group) = self.preset_group(tpl, container_id, catalog, ids, rng) else {
                    warn!("Reward {tpl} lacks a default preset, skipping reward");
                    outcome.failed_attempts += 1;
                    if outcome.failed_attempts
                        >= self.config.max_attempts_to_pick_rewards_within_budget
                    {
                        warn!(
                            "Exiting reward generation after {} failed attempts",
                            outcome.failed_attempts
                        );
                        break;
                    }
                    continue;
                };

                outcome.total_cost += unit_price(catalog, tpl);
                outcome.groups.push(group);
                continue;
            }

            let remaining = (budget - outcome.total_cost).max(0.0);
            let stack_size = self.stack_size(catalog, tpl, remaining, rng);
            let item = InventoryItem::reward(
                ids.generate(rng),
                tpl.clone(),
                container_id,
                &self.config.circle_slot_id,
                stack_size,
            );

            outcome.total_cost += unit_price(catalog, tpl) * f64::from(stack_size);
            outcome.groups.push(RewardGroup::single(item));
        }

        outcome
    }

    /// Stack size of a procedural reward.
    ///
    /// Ammo uses the template's random stack range. Currency converts a random
    /// percent of `remaining` roubles into units of that currency. Everything
    /// else, and any value that cannot be computed, is 1.
    pub fn stack_size<C, R>(
        &self,
        catalog: &C,
        tpl: &TemplateId,
        remaining: f64,
        rng: &mut R,
    ) -> u32
    where
        C: Catalog + ?Sized,
        R: Rng + ?Sized,
    {
        if catalog.is_of_base_class(tpl, base_class::AMMO) {
            return catalog
                .template(tpl)
                .and_then(|template| template.stack_random)
                .map_or(1, |range| range.sample(rng).max(1));
        }

        if catalog.is_of_base_class(tpl, base_class::MONEY) {
            let Some(percent) = self.config.currency_rewards.get(tpl) else {
                return 1;
            };
            let percent = f64::from(percent.sample(rng));
            return currency_units(percent / 100.0 * remaining, catalog.price(tpl));
        }

        1
    }

    fn preset_group<C, R>(
        &self,
        tpl: &TemplateId,
        container_id: &ItemId,
        catalog: &C,
        ids: &mut ItemIdGenerator,
        rng: &mut R,
    ) -> Option<RewardGroup>
    where
        C: Catalog + ?Sized,
        R: Rng + ?Sized,
    {
        let preset = catalog.default_preset(tpl)?;
        let group = preset.instantiate(ids, container_id, &self.config.circle_slot_id, rng)?;

        let items = group
            .into_items()
            .into_iter()
            .map(|mut item| {
                let stack_objects_count = item.stack_size();
                item.upd = Some(ItemUpd {
                    stack_objects_count,
                    spawned_in_session: true,
                });
                item
            })
            .collect();

        RewardGroup::from_items(items)
    }
}

fn unit_price<C: Catalog + ?Sized>(catalog: &C, tpl: &TemplateId) -> f64 {
    catalog
        .price(tpl)
        .filter(|price| price.is_finite() && *price > 0.0)
        .unwrap_or(0.0)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn currency_units(roubles: f64, unit_price: Option<f64>) -> u32 {
    let Some(unit_price) = unit_price.filter(|price| price.is_finite() && *price > 0.0) else {
        return 1;
    };

    let units = (roubles / unit_price).round();
    if !units.is_finite() || units < 1.0 {
        1
    } else {
        units.min(f64::from(u32::MAX)) as u32
    }
}
