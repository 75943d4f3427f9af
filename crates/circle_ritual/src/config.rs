//! # Circle Configuration
//!
//! All balance data for the ritual, loaded once from TOML and then shared
//! immutably by every component.
//!
//! ```toml
//! recipe_id = "66827062405f0b2a2f0ac4a5"
//! max_reward_item_count = 5
//! max_attempts_to_pick_rewards_within_budget = 20
//! bonus_chance_multiplier = 0.25
//! bonus_amount_multiplier = 0.43
//! high_value_threshold_rub = 25000
//!
//! [reward_price_multiplier]
//! min = 1.0
//! max = 1.4
//!
//! [[craft_time_thresholds]]
//! min = 0
//! max = 25000
//! craft_time_seconds = 21600
//! ```

use std::collections::HashMap;
use std::path::Path;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{RitualError, RitualResult};
use crate::item::TemplateId;

/// Slot id of the circle's sacrifice/reward grid.
pub const CIRCLE_SLOT_ID: &str = "CircleOfCultistsGrid1";

/// Craft time used when no threshold matches and none is configured.
pub const FALLBACK_CRAFT_TIME_SECONDS: u64 = 12 * 60 * 60;

/// Hideout area type identifier.
pub type AreaType = u32;

/// Closed floating-point interval.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FloatRange {
    /// Lower bound.
    pub min: f64,
    /// Upper bound.
    pub max: f64,
}

impl FloatRange {
    /// Creates a range.
    #[must_use]
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Draws a uniform value in `[min, max]`.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        if self.min >= self.max {
            self.min
        } else {
            rng.gen_range(self.min..=self.max)
        }
    }
}

/// Closed integer interval.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntRange {
    /// Lower bound.
    pub min: u32,
    /// Upper bound.
    pub max: u32,
}

impl IntRange {
    /// Creates a range.
    #[must_use]
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    /// Draws a uniform integer in `[min, max]`.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> u32 {
        if self.min >= self.max {
            self.min
        } else {
            rng.gen_range(self.min..=self.max)
        }
    }
}

/// A budget interval mapped to a craft duration.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub struct Threshold {
    /// Inclusive lower budget bound.
    pub min: f64,
    /// Inclusive upper budget bound.
    pub max: f64,
    /// Craft duration for budgets inside the interval.
    pub craft_time_seconds: u64,
}

impl Threshold {
    /// Returns true if `roubles` lies inside `[min, max]`.
    #[inline]
    #[must_use]
    pub fn contains(&self, roubles: f64) -> bool {
        self.min <= roubles && roubles <= self.max
    }
}

/// A fixed-outcome trade keyed by the exact sacrificed item set.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct DirectRewardRule {
    /// Templates that must be sacrificed (order-insensitive).
    pub required_items: Vec<TemplateId>,
    /// Templates handed out, one single-item group each.
    pub reward_items: Vec<TemplateId>,
    /// Craft duration for this trade.
    pub craft_time_seconds: u64,
    /// Whether the trade can be claimed more than once per profile.
    #[serde(default)]
    pub repeatable: bool,
}

/// Complete circle configuration.
#[derive(Clone, Debug, Deserialize)]
pub struct CircleConfig {
    /// Production id the ritual registers under.
    pub recipe_id: String,
    /// Slot id of the circle grid.
    #[serde(default = "default_circle_slot_id")]
    pub circle_slot_id: String,
    /// Maximum number of reward groups per ritual.
    pub max_reward_item_count: usize,
    /// Failed draft attempts tolerated before drafting stops.
    pub max_attempts_to_pick_rewards_within_budget: u32,
    /// Range of the random multiplier applied to the sacrificed value.
    pub reward_price_multiplier: FloatRange,
    /// Chance (0-1) of escalating to the hideout/task tier.
    pub bonus_chance_multiplier: f64,
    /// Multiplier applied to the top threshold's time on escalation.
    pub bonus_amount_multiplier: f64,
    /// Minimum max-price for a candidate in the valuable pool.
    pub high_value_threshold_rub: f64,
    /// Replaces every non-escalated craft time when set.
    #[serde(default)]
    pub craft_time_override: Option<u64>,
    /// Budget intervals, first match wins.
    #[serde(default)]
    pub craft_time_thresholds: Vec<Threshold>,
    /// Fixed trades.
    #[serde(default)]
    pub direct_rewards: Vec<DirectRewardRule>,
    /// Stack size range of direct rewards by parent class.
    #[serde(default)]
    pub direct_reward_stack_size: HashMap<TemplateId, IntRange>,
    /// Percent of the remaining budget paid out per currency template.
    #[serde(default)]
    pub currency_rewards: HashMap<TemplateId, IntRange>,
    /// Templates never offered as procedural rewards.
    #[serde(default)]
    pub reward_item_blacklist: Vec<TemplateId>,
    /// Templates always added to the reward pool.
    #[serde(default)]
    pub additional_reward_item_pool: Vec<TemplateId>,
    /// Sets of cosmetic variants of which a direct reward hands out only one.
    #[serde(default)]
    pub exclusive_reward_variants: Vec<Vec<TemplateId>>,
    /// Hideout areas only accessible while the seasonal event runs.
    #[serde(default)]
    pub seasonal_areas: Vec<AreaType>,
}

fn default_circle_slot_id() -> String {
    CIRCLE_SLOT_ID.to_string()
}

impl CircleConfig {
    /// Parses and validates a configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns `ConfigParse` for malformed TOML and `InvalidConfig` for
    /// values that fail [`CircleConfig::validate`].
    pub fn from_toml_str(text: &str) -> RitualResult<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a configuration file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigIo` if the file cannot be read, otherwise as
    /// [`CircleConfig::from_toml_str`].
    pub fn from_toml_file(path: impl AsRef<Path>) -> RitualResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Checks value ranges and rule shapes.
    ///
    /// Overlapping thresholds are accepted; the first matching one wins.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` describing the first offending value.
    pub fn validate(&self) -> RitualResult<()> {
        if self.max_reward_item_count == 0 {
            return Err(invalid("max_reward_item_count must be at least 1"));
        }

        // NaN fails every comparison, so each float is checked for finiteness first.
        let multiplier = self.reward_price_multiplier;
        if !multiplier.min.is_finite()
            || !multiplier.max.is_finite()
            || multiplier.min < 0.0
            || multiplier.min > multiplier.max
        {
            return Err(invalid(format!(
                "reward_price_multiplier [{}, {}] must be finite, non-negative and ordered",
                multiplier.min, multiplier.max
            )));
        }

        if !(0.0..=1.0).contains(&self.bonus_chance_multiplier) {
            return Err(invalid(format!(
                "bonus_chance_multiplier {} must be within [0, 1]",
                self.bonus_chance_multiplier
            )));
        }

        if !self.bonus_amount_multiplier.is_finite() || self.bonus_amount_multiplier < 0.0 {
            return Err(invalid(format!(
                "bonus_amount_multiplier {} must be finite and non-negative",
                self.bonus_amount_multiplier
            )));
        }

        if !self.high_value_threshold_rub.is_finite() {
            return Err(invalid(format!(
                "high_value_threshold_rub {} must be finite",
                self.high_value_threshold_rub
            )));
        }

        for (index, threshold) in self.craft_time_thresholds.iter().enumerate() {
            if !threshold.min.is_finite() || !threshold.max.is_finite() {
                return Err(invalid(format!(
                    "craft_time_thresholds[{index}] bounds [{}, {}] must be finite",
                    threshold.min, threshold.max
                )));
            }
            if threshold.min > threshold.max {
                return Err(invalid(format!(
                    "craft_time_thresholds[{index}] has min {} above max {}",
                    threshold.min, threshold.max
                )));
            }
        }

        for (index, rule) in self.direct_rewards.iter().enumerate() {
            if rule.required_items.is_empty() || rule.reward_items.is_empty() {
                return Err(invalid(format!(
                    "direct_rewards[{index}] needs at least one required and one reward item"
                )));
            }
        }

        let ranges = self
            .direct_reward_stack_size
            .iter()
            .chain(self.currency_rewards.iter());
        for (tpl, range) in ranges {
            if range.min > range.max {
                return Err(invalid(format!(
                    "range for {tpl} has min {} above max {}",
                    range.min, range.max
                )));
            }
        }

        Ok(())
    }
}

fn invalid(message: impl Into<String>) -> RitualError {
    RitualError::InvalidConfig(message.into())
}
