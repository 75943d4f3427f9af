//! # Reward Pool
//!
//! Builds the set of templates procedural rewards are drafted from.
//!
//! ```text
//! Random          N+2 random catalog items
//! ValuableRandom  N+2 random catalog items with max price >= cutoff
//! HideoutTask     next-stage hideout requirements
//!                 + started quest handover items
//!                 + valuable random top-up while below N+2
//! (all modes)     + additional_reward_item_pool
//! ```
//!
//! `N` is `max_reward_item_count`. Blacklisted and invalid templates never
//! enter the pool. Random sampling is bounded by the catalog size so a
//! strict cutoff cannot stall the ritual.

use std::collections::{BTreeSet, HashSet};

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

use crate::catalog::{base_class, Catalog};
use crate::config::{AreaType, CircleConfig};
use crate::item::TemplateId;
use crate::profile::{Profile, QuestId};
use crate::tier::RewardMode;

/// Hideout and quest data lookups.
pub trait Progression {
    /// Item requirements of the stage after `current_level`, or `None` when
    /// the area is fully upgraded or unknown.
    fn next_stage_item_requirements(
        &self,
        area: AreaType,
        current_level: u32,
    ) -> Option<Vec<TemplateId>>;

    /// Items required by the quest's handover conditions.
    fn handover_items(&self, quest: &QuestId) -> Vec<TemplateId>;
}

/// Server-wide item filters.
pub trait ItemFilters {
    /// Items of seasonal events that are not running.
    fn inactive_seasonal_items(&self) -> Vec<TemplateId>;

    /// Items never handed out as rewards.
    fn reward_blacklist(&self) -> Vec<TemplateId>;

    /// Whether the seasonal event gating `seasonal_areas` is running.
    fn seasonal_event_active(&self) -> bool;
}

/// Reward pool builder.
#[derive(Debug)]
pub struct RewardPoolBuilder<'c> {
    config: &'c CircleConfig,
}

impl<'c> RewardPoolBuilder<'c> {
    /// Creates a builder.
    #[must_use]
    pub const fn new(config: &'c CircleConfig) -> Self {
        Self { config }
    }

    /// Number of candidates random sampling aims for.
    #[must_use]
    pub fn target_size(&self) -> usize {
        self.config.max_reward_item_count + 2
    }

    /// Union of every blacklist source.
    pub fn blacklist<F: ItemFilters + ?Sized>(&self, filters: &F) -> HashSet<TemplateId> {
        filters
            .inactive_seasonal_items()
            .into_iter()
            .chain(filters.reward_blacklist())
            .chain(self.config.reward_item_blacklist.iter().cloned())
            .collect()
    }

    /// Builds a deduplicated candidate pool for `mode`.
    ///
    /// The result is sorted, so the same pool always drafts the same way
    /// under the same seed.
    pub fn build<C, P, F, R>(
        &self,
        mode: RewardMode,
        profile: &Profile,
        catalog: &C,
        progression: &P,
        filters: &F,
        rng: &mut R,
    ) -> Vec<TemplateId>
    where
        C: Catalog + ?Sized,
        P: Progression + ?Sized,
        F: ItemFilters + ?Sized,
        R: Rng + ?Sized,
    {
        let blacklist = self.blacklist(filters);
        let mut pool = BTreeSet::new();

        match mode {
            RewardMode::Random => self.random_loot(&mut pool, &blacklist, catalog, false, rng),
            RewardMode::ValuableRandom => {
                self.random_loot(&mut pool, &blacklist, catalog, true, rng);
            }
            RewardMode::HideoutTask => {
                self.hideout_loot(&mut pool, &blacklist, profile, catalog, progression, filters);
                Self::quest_loot(&mut pool, &blacklist, profile, catalog, progression);

                if pool.len() < self.target_size() {
                    self.random_loot(&mut pool, &blacklist, catalog, true, rng);
                }
            }
        }

        for tpl in &self.config.additional_reward_item_pool {
            if !blacklist.contains(tpl) {
                pool.insert(tpl.clone());
            }
        }

        pool.into_iter().collect()
    }

    fn accepts<C: Catalog + ?Sized>(
        catalog: &C,
        blacklist: &HashSet<TemplateId>,
        tpl: &TemplateId,
    ) -> bool {
        !blacklist.contains(tpl) && catalog.is_valid(tpl)
    }

    fn hideout_loot<C, P, F>(
        &self,
        pool: &mut BTreeSet<TemplateId>,
        blacklist: &HashSet<TemplateId>,
        profile: &Profile,
        catalog: &C,
        progression: &P,
        filters: &F,
    ) where
        C: Catalog + ?Sized,
        P: Progression + ?Sized,
        F: ItemFilters + ?Sized,
    {
        let seasonal_active = filters.seasonal_event_active();
        let accessible = profile
            .hideout_areas
            .iter()
            .filter(|area| {
                seasonal_active || !self.config.seasonal_areas.contains(&area.area_type)
            });

        for area in accessible {
            let Some(requirements) =
                progression.next_stage_item_requirements(area.area_type, area.level)
            else {
                continue;
            };

            for tpl in requirements {
                if Self::accepts(catalog, blacklist, &tpl) {
                    debug!("Added hideout loot: {tpl}");
                    pool.insert(tpl);
                }
            }
        }
    }

    fn quest_loot<C, P>(
        pool: &mut BTreeSet<TemplateId>,
        blacklist: &HashSet<TemplateId>,
        profile: &Profile,
        catalog: &C,
        progression: &P,
    ) where
        C: Catalog + ?Sized,
        P: Progression + ?Sized,
    {
        for quest in profile.started_quests() {
            for tpl in progression.handover_items(&quest.quest_id) {
                if Self::accepts(catalog, blacklist, &tpl) {
                    debug!("Added task loot: {tpl}");
                    pool.insert(tpl);
                }
            }
        }
    }

    fn random_loot<C, R>(
        &self,
        pool: &mut BTreeSet<TemplateId>,
        blacklist: &HashSet<TemplateId>,
        catalog: &C,
        valuable: bool,
        rng: &mut R,
    ) where
        C: Catalog + ?Sized,
        R: Rng + ?Sized,
    {
        let templates = catalog.all_templates();
        let target = self.target_size();
        let mut added = 0;
        let mut attempts = 0;

        while added < target && attempts < templates.len() {
            attempts += 1;
            let Some(tpl) = templates.choose(rng) else {
                break;
            };

            if !Self::accepts(catalog, blacklist, tpl)
                || catalog.is_of_base_class(tpl, base_class::AMMO)
                || catalog.is_of_base_class(tpl, base_class::MONEY)
            {
                continue;
            }

            if valuable {
                let value = catalog.max_price(tpl).unwrap_or(0.0);
                if value < self.config.high_value_threshold_rub {
                    debug!("Ignored due to value: {tpl} ({value:.0})");
                    continue;
                }
            }

            debug!("Added: {tpl}");
            pool.insert(tpl.clone());
            added += 1;
        }
    }
}
