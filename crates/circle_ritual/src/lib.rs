//! # CIRCLE Ritual Engine
//!
//! Sacrifice-for-reward logic for the hideout's cultist circle.
//!
//! A player drops items into the circle; the engine values them, picks a
//! craft duration and reward tier, and hands back either a fixed direct
//! reward or a procedurally drafted basket worth roughly the sacrifice.
//!
//! ## Design Principles
//!
//! 1. **Never fails mid-ritual** - Missing prices, missing presets and full grids are logged, not returned
//! 2. **Bounded loops** - Every sampling loop has an explicit attempt cap
//! 3. **All-or-nothing placement** - Rewards are trial-packed on a cloned grid before anything is written
//! 4. **External configuration** - All balance data in TOML files
//! 5. **Seeded per call** - Every ritual draws from its own RNG stream
//!
//! ## Thread Safety
//!
//! The engine holds no shared mutable state besides its seed nonce. Callers
//! must serialize rituals for the same profile.
//!
//! ## Example
//!
//! ```rust,ignore
//! use circle_ritual::{CircleConfig, Collaborators, RitualEngine, RitualSeed, SlotGrid, SlotGridPacker};
//!
//! let config = CircleConfig::from_toml_file("config/circle.toml")?;
//! let mut engine = RitualEngine::new(config, RitualSeed::new(&server_secret))?;
//!
//! let outcome = engine.start_sacrifice(
//!     &mut profile,
//!     Collaborators { catalog: &catalog, progression: &hideout, filters: &filters },
//!     &SlotGridPacker,
//!     &mut grid,
//!     now,
//! )?;
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod catalog;
pub mod config;
pub mod direct;
pub mod draft;
pub mod error;
pub mod item;
pub mod ledger;
pub mod packing;
pub mod pool;
pub mod profile;
pub mod ritual;
pub mod seed;
pub mod tier;
pub mod value;

pub use catalog::{Catalog, InMemoryCatalog, ItemTemplate, Preset};
pub use config::{CircleConfig, DirectRewardRule, FloatRange, IntRange, Threshold};
pub use direct::{DirectRewardIssuer, DirectRewardTable};
pub use draft::{DraftOutcome, RewardDrafter};
pub use error::{RitualError, RitualResult};
pub use item::{InventoryItem, ItemId, ItemIdGenerator, ItemLocation, RewardGroup, TemplateId};
pub use ledger::{AcceptedRewardRecord, RewardLedger};
pub use packing::{ContainerPacker, SlotGrid, SlotGridPacker};
pub use pool::{ItemFilters, Progression, RewardPoolBuilder};
pub use profile::{AreaState, Production, Profile, QuestState, QuestStatus};
pub use ritual::{Collaborators, RitualEngine, RitualOutcome};
pub use seed::{RitualRng, RitualSeed};
pub use tier::{CraftDetails, RewardMode, RewardSource, TierSelector};
pub use value::{RewardBudget, RewardValuer};
