//! # Tier & Duration Selection
//!
//! Maps a reward budget to a craft duration and a reward mode.
//!
//! ```text
//! direct reward matched ─────────────────────────► rule time, Direct
//!
//! budget >= max(threshold.min) && roll <= bonus ──► top.time * bonus_amount, HideoutTask
//!
//! first threshold containing budget ──────────────► threshold time (or override)
//!     budget <  min(threshold.max)                     Random
//!     budget >= min(threshold.max)                     ValuableRandom
//!
//! no threshold matches ───────────────────────────► fallback time (or override), Random
//! ```
//!
//! The bonus roll has priority over the matched threshold. The override never
//! applies to an escalated duration.

use rand::Rng;
use tracing::warn;

use crate::config::{CircleConfig, DirectRewardRule, Threshold, FALLBACK_CRAFT_TIME_SECONDS};

/// Default lower bound of the fallback threshold.
const FALLBACK_MIN_ROUBLES: f64 = 1.0;

/// Default upper bound of the fallback threshold.
const FALLBACK_MAX_ROUBLES: f64 = 34_999.0;

/// Which candidate pool procedural rewards are drafted from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RewardMode {
    /// Any valid catalog item.
    Random,
    /// Catalog items at or above the high-value cutoff.
    ValuableRandom,
    /// Items the player needs for hideout upgrades and started quests.
    HideoutTask,
}

/// Where the rewards of a ritual come from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RewardSource {
    /// A matched direct reward rule.
    Direct,
    /// Budgeted drafting from a candidate pool.
    Procedural(RewardMode),
}

impl RewardSource {
    /// The procedural mode, if any.
    #[must_use]
    pub const fn mode(self) -> Option<RewardMode> {
        match self {
            Self::Direct => None,
            Self::Procedural(mode) => Some(mode),
        }
    }
}

/// Outcome of tier selection.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CraftDetails {
    /// Craft duration in seconds.
    pub craft_time_seconds: u64,
    /// Reward source.
    pub source: RewardSource,
    /// Threshold the duration was derived from, `None` for direct rewards.
    pub threshold: Option<Threshold>,
    /// Whether the bonus roll escalated the tier.
    pub escalated: bool,
}

/// Tier & duration selector.
#[derive(Debug)]
pub struct TierSelector<'c> {
    config: &'c CircleConfig,
}

impl<'c> TierSelector<'c> {
    /// Creates a selector over the configured thresholds.
    #[must_use]
    pub const fn new(config: &'c CircleConfig) -> Self {
        Self { config }
    }

    /// Selects duration and mode for a budget.
    pub fn select<R: Rng + ?Sized>(
        &self,
        budget: f64,
        direct: Option<&DirectRewardRule>,
        rng: &mut R,
    ) -> CraftDetails {
        if let Some(rule) = direct {
            return CraftDetails {
                craft_time_seconds: rule.craft_time_seconds,
                source: RewardSource::Direct,
                threshold: None,
                escalated: false,
            };
        }

        let matched = self.matching_threshold(budget);

        if let Some(top) = self.top_threshold() {
            if budget >= top.min {
                let roll: f64 = rng.gen();
                if roll <= self.config.bonus_chance_multiplier {
                    return CraftDetails {
                        craft_time_seconds: self.escalated_time(top),
                        source: RewardSource::Procedural(RewardMode::HideoutTask),
                        threshold: Some(*top),
                        escalated: true,
                    };
                }
            }
        }

        let (threshold, mode) = match matched {
            Some(threshold) => (*threshold, self.budget_mode(budget)),
            None => {
                let fallback = self.fallback_threshold();
                warn!(
                    "No craft time threshold matches budget {budget:.0}, using fallback of {}s",
                    fallback.craft_time_seconds
                );
                (fallback, RewardMode::Random)
            }
        };

        CraftDetails {
            craft_time_seconds: self
                .config
                .craft_time_override
                .unwrap_or(threshold.craft_time_seconds),
            source: RewardSource::Procedural(mode),
            threshold: Some(threshold),
            escalated: false,
        }
    }

    /// First threshold whose interval contains `budget`.
    #[must_use]
    pub fn matching_threshold(&self, budget: f64) -> Option<&'c Threshold> {
        self.config
            .craft_time_thresholds
            .iter()
            .find(|threshold| threshold.contains(budget))
    }

    /// Threshold with the highest `min`; the first one on ties.
    #[must_use]
    pub fn top_threshold(&self) -> Option<&'c Threshold> {
        self.config
            .craft_time_thresholds
            .iter()
            .reduce(|top, next| if next.min > top.min { next } else { top })
    }

    /// Threshold used when no configured interval contains the budget.
    #[must_use]
    pub fn fallback_threshold(&self) -> Threshold {
        self.config.craft_time_thresholds.first().map_or(
            Threshold {
                min: FALLBACK_MIN_ROUBLES,
                max: FALLBACK_MAX_ROUBLES,
                craft_time_seconds: FALLBACK_CRAFT_TIME_SECONDS,
            },
            |first| *first,
        )
    }

    fn budget_mode(&self, budget: f64) -> RewardMode {
        let smallest_max = self
            .config
            .craft_time_thresholds
            .iter()
            .map(|threshold| threshold.max)
            .fold(f64::INFINITY, f64::min);

        if budget < smallest_max {
            RewardMode::Random
        } else {
            RewardMode::ValuableRandom
        }
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    fn escalated_time(&self, top: &Threshold) -> u64 {
        let seconds = top.craft_time_seconds as f64 * self.config.bonus_amount_multiplier;
        seconds.round().max(0.0) as u64
    }
}
