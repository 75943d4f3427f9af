//! # Ritual Engine
//!
//! Runs one sacrifice end to end.
//!
//! ```text
//! sacrificed items ──► appraise ──► budget ─┐
//!        │                                  ├─► tier selection ──► production
//!        └──────────► direct match ─────────┘           │
//!                                                       ▼
//!                        direct rewards + ledger  |  pool ──► draft
//!                                                       │
//!                                                       ▼
//!                                   trial packing on a clone ──► place or drop
//! ```
//!
//! Every in-ritual problem is non-fatal. Once the profile has a circle
//! stash the ritual always completes: the sacrifice is consumed and the
//! production registered, even when the rewards end up dropped.

use std::collections::HashSet;

use rand::Rng;
use tracing::{error, info};

use crate::catalog::Catalog;
use crate::config::CircleConfig;
use crate::direct::{DirectRewardIssuer, DirectRewardTable};
use crate::draft::RewardDrafter;
use crate::error::{RitualError, RitualResult};
use crate::item::{ItemId, ItemIdGenerator, RewardGroup};
use crate::packing::ContainerPacker;
use crate::pool::{ItemFilters, Progression, RewardPoolBuilder};
use crate::profile::{Production, Profile};
use crate::seed::RitualSeed;
use crate::tier::{RewardMode, RewardSource, TierSelector};
use crate::value::{RewardBudget, RewardValuer};

/// Read-only server collaborators a ritual consults.
#[derive(Clone, Copy)]
pub struct Collaborators<'a> {
    /// Item database.
    pub catalog: &'a dyn Catalog,
    /// Hideout and quest data.
    pub progression: &'a dyn Progression,
    /// Blacklists and seasonal state.
    pub filters: &'a dyn ItemFilters,
}

impl std::fmt::Debug for Collaborators<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collaborators").finish_non_exhaustive()
    }
}

/// Result of a ritual, for the caller's response.
#[derive(Clone, Debug, PartialEq)]
pub struct RitualOutcome {
    /// Craft duration in seconds.
    pub craft_time_seconds: u64,
    /// Where the rewards came from.
    pub source: RewardSource,
    /// Appraised budget.
    pub budget: RewardBudget,
    /// Rewards added to the profile; empty if they were dropped.
    pub rewards: Vec<RewardGroup>,
    /// Whether the rewards fit the circle grid.
    pub rewards_placed: bool,
}

/// The circle ritual.
#[derive(Debug)]
pub struct RitualEngine {
    config: CircleConfig,
    direct_rewards: DirectRewardTable,
    seed: RitualSeed,
}

impl RitualEngine {
    /// Creates an engine.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the configuration fails validation and
    /// `DuplicateDirectReward` if two direct rewards share a sacrifice set.
    pub fn new(config: CircleConfig, seed: RitualSeed) -> RitualResult<Self> {
        config.validate()?;
        let direct_rewards = DirectRewardTable::from_rules(&config.direct_rewards)?;

        Ok(Self {
            config,
            direct_rewards,
            seed,
        })
    }

    /// The engine configuration.
    #[must_use]
    pub const fn config(&self) -> &CircleConfig {
        &self.config
    }

    /// The direct reward table.
    #[must_use]
    pub const fn direct_rewards(&self) -> &DirectRewardTable {
        &self.direct_rewards
    }

    /// Runs a ritual with a freshly seeded RNG.
    ///
    /// # Errors
    ///
    /// Returns `MissingCircleStash` if the profile has no circle stash.
    pub fn start_sacrifice<P: ContainerPacker>(
        &mut self,
        profile: &mut Profile,
        collaborators: Collaborators<'_>,
        packer: &P,
        grid: &mut P::Grid,
        timestamp: u64,
    ) -> RitualResult<RitualOutcome> {
        let mut rng = self.seed.rng_for(&profile.id, timestamp);
        self.start_sacrifice_with_rng(&mut rng, profile, collaborators, packer, grid, timestamp)
    }

    /// Runs a ritual drawing from `rng`.
    ///
    /// The caller's `grid` is only replaced when every reward group placed.
    ///
    /// # Errors
    ///
    /// Returns `MissingCircleStash` if the profile has no circle stash. The
    /// profile is not touched in that case.
    pub fn start_sacrifice_with_rng<P, R>(
        &self,
        rng: &mut R,
        profile: &mut Profile,
        collaborators: Collaborators<'_>,
        packer: &P,
        grid: &mut P::Grid,
        timestamp: u64,
    ) -> RitualResult<RitualOutcome>
    where
        P: ContainerPacker,
        R: Rng + ?Sized,
    {
        let stash_id = profile
            .circle_stash_id
            .clone()
            .ok_or_else(|| RitualError::MissingCircleStash {
                profile_id: profile.id.clone(),
            })?;

        let sacrificed = profile.sacrificed_items(&self.config.circle_slot_id);
        let templates: Vec<_> = sacrificed.iter().map(|item| item.tpl.clone()).collect();

        let budget = RewardValuer::new(self.config.reward_price_multiplier).appraise(
            collaborators.catalog,
            &templates,
            profile.hideout_management_progress,
            rng,
        );
        let direct = self.direct_rewards.find(&templates, &profile.ledger);
        let details = TierSelector::new(&self.config).select(budget.roubles, direct, rng);

        let mut ids = ItemIdGenerator::new(profile.items.iter().map(|item| &item.id));

        let consumed: HashSet<ItemId> = sacrificed.iter().map(|item| item.id.clone()).collect();
        profile.remove_items(&consumed);
        profile.start_production(Production {
            recipe_id: self.config.recipe_id.clone(),
            start_timestamp: timestamp,
            production_time: details.craft_time_seconds,
            given_items_in_start: sacrificed,
            is_cultist_circle: true,
            in_progress: true,
        });

        let rewards = match direct {
            Some(rule) => {
                let groups = DirectRewardIssuer::new(&self.config).issue(
                    rule,
                    collaborators.catalog,
                    &stash_id,
                    &mut ids,
                    rng,
                );
                if !rule.repeatable {
                    profile.ledger.record(rule, timestamp);
                }
                groups
            }
            None => {
                let mode = details.source.mode().unwrap_or(RewardMode::Random);
                let pool = RewardPoolBuilder::new(&self.config).build(
                    mode,
                    profile,
                    collaborators.catalog,
                    collaborators.progression,
                    collaborators.filters,
                    rng,
                );
                RewardDrafter::new(&self.config)
                    .draft(&pool, budget.roubles, &stash_id, collaborators.catalog, &mut ids, rng)
                    .groups
            }
        };

        let (rewards, rewards_placed) = match Self::place_rewards(packer, grid, rewards) {
            Ok(placed) => {
                for group in &placed {
                    profile.items.extend(group.items().iter().cloned());
                }
                (placed, true)
            }
            Err(count) => {
                error!(
                    "Unable to fit all {count} reward items into sacrifice grid, nothing will be returned"
                );
                (Vec::new(), false)
            }
        };

        info!(
            "Circle ritual for {}: {:.0} roubles, {}s, {:?}, {} reward groups",
            profile.id,
            budget.roubles,
            details.craft_time_seconds,
            details.source,
            rewards.len()
        );

        Ok(RitualOutcome {
            craft_time_seconds: details.craft_time_seconds,
            source: details.source,
            budget,
            rewards,
            rewards_placed,
        })
    }

    /// Places every group or none, returning the group count on failure.
    fn place_rewards<P: ContainerPacker>(
        packer: &P,
        grid: &mut P::Grid,
        mut rewards: Vec<RewardGroup>,
    ) -> Result<Vec<RewardGroup>, usize> {
        let mut trial = grid.clone();
        if !packer.can_place_all(&mut trial, &rewards) {
            return Err(rewards.len());
        }

        let mut committed = grid.clone();
        for group in &mut rewards {
            let Some(location) = packer.place(&mut committed, group) else {
                return Err(rewards.len());
            };
            group.root_mut().location = Some(location);
        }

        *grid = committed;
        Ok(rewards)
    }
}
