//! # Sacrifice Appraisal
//!
//! Converts sacrificed items into the rouble budget rewards are drafted
//! against.
//!
//! ```text
//! budget = sum(price(item)) * uniform(min, max) * (1 + skill_progress / 10000)
//! ```
//!
//! Items without a price count as zero. The budget is never negative.

use rand::Rng;

use crate::catalog::Catalog;
use crate::config::FloatRange;
use crate::item::TemplateId;

/// Rouble value available to spend on rewards.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RewardBudget {
    /// Summed price of the sacrificed items.
    pub sacrificed_value: f64,
    /// Random multiplier after skill scaling.
    pub multiplier: f64,
    /// `sacrificed_value * multiplier`.
    pub roubles: f64,
}

impl RewardBudget {
    /// An empty budget.
    pub const ZERO: Self = Self {
        sacrificed_value: 0.0,
        multiplier: 0.0,
        roubles: 0.0,
    };
}

/// Value & multiplier calculator.
#[derive(Clone, Copy, Debug)]
pub struct RewardValuer {
    multiplier: FloatRange,
}

impl RewardValuer {
    /// Creates a valuer drawing its multiplier from `multiplier`.
    #[must_use]
    pub const fn new(multiplier: FloatRange) -> Self {
        Self { multiplier }
    }

    /// Sums catalog prices; unknown or negative prices count as zero.
    #[must_use]
    pub fn sacrificed_value<C: Catalog + ?Sized>(catalog: &C, sacrificed: &[TemplateId]) -> f64 {
        sacrificed
            .iter()
            .filter_map(|tpl| catalog.price(tpl))
            .filter(|price| price.is_finite() && *price > 0.0)
            .sum()
    }

    /// Draws the reward multiplier, scaled by skill progress.
    ///
    /// Progress is in thousandths of a level; 5100 becomes a 1.51x bonus.
    pub fn multiplier<R: Rng + ?Sized>(&self, skill_progress: Option<f64>, rng: &mut R) -> f64 {
        let mut multiplier = self.multiplier.sample(rng);
        if let Some(progress) = skill_progress.filter(|p| p.is_finite() && *p > 0.0) {
            multiplier *= 1.0 + progress / 10_000.0;
        }
        multiplier.max(0.0)
    }

    /// Computes the budget for a sacrificed item set.
    pub fn appraise<C, R>(
        &self,
        catalog: &C,
        sacrificed: &[TemplateId],
        skill_progress: Option<f64>,
        rng: &mut R,
    ) -> RewardBudget
    where
        C: Catalog + ?Sized,
        R: Rng + ?Sized,
    {
        if sacrificed.is_empty() {
            return RewardBudget::ZERO;
        }

        let sacrificed_value = Self::sacrificed_value(catalog, sacrificed);
        let multiplier = self.multiplier(skill_progress, rng);

        RewardBudget {
            sacrificed_value,
            multiplier,
            roubles: (sacrificed_value * multiplier).max(0.0),
        }
    }
}
