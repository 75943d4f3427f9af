//! End-to-end ritual scenarios.

use std::collections::HashMap;

use circle_ritual::catalog::base_class;
use circle_ritual::config::AreaType;
use circle_ritual::profile::QuestId;
use circle_ritual::{
    CircleConfig, Collaborators, DirectRewardRule, FloatRange, InMemoryCatalog, InventoryItem,
    ItemFilters, ItemId, ItemTemplate, Preset, Profile, Progression, RewardMode, RewardSource,
    RitualEngine, RitualSeed, SlotGrid, SlotGridPacker, TemplateId, Threshold,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

const SLOT: &str = "CircleOfCultistsGrid1";
const STASH: &str = "circle_stash";

struct Hideout;

impl Progression for Hideout {
    fn next_stage_item_requirements(
        &self,
        _area: AreaType,
        _level: u32,
    ) -> Option<Vec<TemplateId>> {
        None
    }

    fn handover_items(&self, _quest: &QuestId) -> Vec<TemplateId> {
        Vec::new()
    }
}

struct Filters;

impl ItemFilters for Filters {
    fn inactive_seasonal_items(&self) -> Vec<TemplateId> {
        Vec::new()
    }

    fn reward_blacklist(&self) -> Vec<TemplateId> {
        Vec::new()
    }

    fn seasonal_event_active(&self) -> bool {
        false
    }
}

fn base_config() -> CircleConfig {
    CircleConfig {
        recipe_id: "circle".to_string(),
        circle_slot_id: SLOT.to_string(),
        max_reward_item_count: 5,
        max_attempts_to_pick_rewards_within_budget: 10,
        reward_price_multiplier: FloatRange::new(1.0, 1.0),
        bonus_chance_multiplier: 0.0,
        bonus_amount_multiplier: 1.0,
        high_value_threshold_rub: 0.0,
        craft_time_override: None,
        craft_time_thresholds: vec![Threshold {
            min: 0.0,
            max: 20_000.0,
            craft_time_seconds: 3600,
        }],
        direct_rewards: vec![DirectRewardRule {
            required_items: vec!["key_a".into(), "key_b".into()],
            reward_items: vec!["relic".into(), "charm".into()],
            craft_time_seconds: 1500,
            repeatable: false,
        }],
        direct_reward_stack_size: HashMap::new(),
        currency_rewards: HashMap::new(),
        reward_item_blacklist: Vec::new(),
        additional_reward_item_pool: Vec::new(),
        exclusive_reward_variants: Vec::new(),
        seasonal_areas: Vec::new(),
    }
}

fn base_catalog() -> InMemoryCatalog {
    InMemoryCatalog::new()
        .with(ItemTemplate::new("gpu").with_price(10_000.0))
        .with(ItemTemplate::new("key_a").with_price(1_000.0))
        .with(ItemTemplate::new("key_b").with_price(1_000.0))
        .with(ItemTemplate::new("relic").with_price(200_000.0))
        .with(ItemTemplate::new("charm").with_price(50_000.0))
        .with(ItemTemplate::new("bolts").with_price(500.0))
}

fn profile_with(sacrifice: &[&str]) -> Profile {
    let stash = ItemId::new(STASH);
    let mut profile = Profile::new("pmc");
    profile.circle_stash_id = Some(stash.clone());
    profile.items.push(InventoryItem::new(stash.clone(), "stash_tpl".into()));
    for (index, tpl) in sacrifice.iter().enumerate() {
        profile.items.push(
            InventoryItem::new(ItemId::new(format!("offering_{index}")), TemplateId::new(*tpl))
                .with_parent(stash.clone(), SLOT),
        );
    }
    profile
}

fn collaborators(catalog: &InMemoryCatalog) -> Collaborators<'_> {
    Collaborators {
        catalog,
        progression: &Hideout,
        filters: &Filters,
    }
}

#[test]
fn test_single_item_sacrifice_uses_matching_threshold() {
    let engine = RitualEngine::new(base_config(), RitualSeed::test_seed()).unwrap();
    let catalog = base_catalog();
    let mut profile = profile_with(&["gpu"]);
    let mut grid = SlotGrid::new(5, 5);
    let mut rng = ChaCha8Rng::seed_from_u64(42);

    let outcome = engine
        .start_sacrifice_with_rng(
            &mut rng,
            &mut profile,
            collaborators(&catalog),
            &SlotGridPacker,
            &mut grid,
            1,
        )
        .unwrap();

    assert_eq!(outcome.craft_time_seconds, 3600);
    assert_eq!(outcome.source, RewardSource::Procedural(RewardMode::Random));
    assert!((outcome.budget.roubles - 10_000.0).abs() < 1e-6);
    assert!(outcome.rewards.len() <= 5);
}

#[test]
fn test_direct_reward_claimed_once() {
    let engine = RitualEngine::new(base_config(), RitualSeed::test_seed()).unwrap();
    let catalog = base_catalog();
    let mut grid = SlotGrid::new(5, 5);
    let mut rng = ChaCha8Rng::seed_from_u64(7);

    let mut profile = profile_with(&["key_a", "key_b"]);
    let first = engine
        .start_sacrifice_with_rng(
            &mut rng,
            &mut profile,
            collaborators(&catalog),
            &SlotGridPacker,
            &mut grid,
            100,
        )
        .unwrap();

    assert_eq!(first.source, RewardSource::Direct);
    assert_eq!(first.craft_time_seconds, 1500);
    let rewarded: Vec<&str> = first.rewards.iter().map(|group| group.root().tpl.as_str()).collect();
    assert_eq!(rewarded, vec!["relic", "charm"]);
    assert!(first.rewards.iter().all(|group| group.len() == 1));
    assert_eq!(profile.ledger.len(), 1);

    // Player collects the rewards, then offers the same keys again
    profile.items.retain(|item| item.slot_id.as_deref() != Some(SLOT));
    let stash = ItemId::new(STASH);
    for (index, tpl) in ["key_a", "key_b"].iter().enumerate() {
        profile.items.push(
            InventoryItem::new(ItemId::new(format!("again_{index}")), TemplateId::new(*tpl))
                .with_parent(stash.clone(), SLOT),
        );
    }
    let mut grid = SlotGrid::new(5, 5);
    let second = engine
        .start_sacrifice_with_rng(
            &mut rng,
            &mut profile,
            collaborators(&catalog),
            &SlotGridPacker,
            &mut grid,
            200,
        )
        .unwrap();

    assert!(matches!(second.source, RewardSource::Procedural(_)));
    assert_eq!(second.craft_time_seconds, 3600);
    assert_eq!(profile.ledger.len(), 1);
}

#[test]
fn test_direct_reward_matches_any_order() {
    let engine = RitualEngine::new(base_config(), RitualSeed::test_seed()).unwrap();
    let catalog = base_catalog();

    for offering in [["key_a", "key_b"], ["key_b", "key_a"]] {
        let mut profile = profile_with(&offering);
        let mut grid = SlotGrid::new(5, 5);
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let outcome = engine
            .start_sacrifice_with_rng(
                &mut rng,
                &mut profile,
                collaborators(&catalog),
                &SlotGridPacker,
                &mut grid,
                1,
            )
            .unwrap();
        assert_eq!(outcome.source, RewardSource::Direct);
    }
}

#[test]
fn test_empty_pool_yields_no_rewards() {
    let mut config = base_config();
    config.reward_item_blacklist = vec!["gpu".into()];
    let engine = RitualEngine::new(config, RitualSeed::test_seed()).unwrap();
    let catalog = InMemoryCatalog::new().with(ItemTemplate::new("gpu").with_price(10_000.0));
    let mut profile = profile_with(&["gpu"]);
    let mut grid = SlotGrid::new(5, 5);
    let mut rng = ChaCha8Rng::seed_from_u64(3);

    let outcome = engine
        .start_sacrifice_with_rng(
            &mut rng,
            &mut profile,
            collaborators(&catalog),
            &SlotGridPacker,
            &mut grid,
            1,
        )
        .unwrap();

    assert!(outcome.rewards.is_empty());
    assert!(outcome.rewards_placed);
    assert_eq!(profile.items.len(), 1, "only the stash remains");
    assert_eq!(grid.used_cells(), 0);
}

#[test]
fn test_rewards_that_do_not_fit_are_dropped() {
    let engine = RitualEngine::new(base_config(), RitualSeed::test_seed()).unwrap();
    let catalog = base_catalog();
    let mut profile = profile_with(&["key_a", "key_b"]);
    let mut grid = SlotGrid::new(1, 1);
    let mut rng = ChaCha8Rng::seed_from_u64(9);

    let outcome = engine
        .start_sacrifice_with_rng(
            &mut rng,
            &mut profile,
            collaborators(&catalog),
            &SlotGridPacker,
            &mut grid,
            1,
        )
        .unwrap();

    assert!(!outcome.rewards_placed);
    assert!(outcome.rewards.is_empty());
    assert_eq!(grid.used_cells(), 0, "caller grid untouched");
    assert_eq!(profile.items.len(), 1);
    assert_eq!(profile.production["circle"].production_time, 1500);
}

#[test]
fn test_weapon_rewards_get_fresh_ids() {
    let mut config = base_config();
    config.direct_rewards.clear();
    config.craft_time_thresholds[0].max = 1e9;
    config.additional_reward_item_pool = vec!["ak".into()];
    let engine = RitualEngine::new(config, RitualSeed::test_seed()).unwrap();

    let mut catalog = InMemoryCatalog::new()
        .with(ItemTemplate::new("ak").with_parent(base_class::WEAPON).with_price(40_000.0))
        .with(ItemTemplate::new("gpu").with_price(500_000.0).invalid());
    catalog.insert_preset(
        "ak".into(),
        Preset {
            items: vec![
                InventoryItem::new("offering_0".into(), "ak".into()),
                InventoryItem::new("circle_stash".into(), "mag".into())
                    .with_parent("offering_0".into(), "mod_magazine"),
            ],
        },
    );

    let mut profile = profile_with(&["gpu"]);
    profile.items[1].tpl = "ak".into();
    let existing: Vec<ItemId> = profile.items.iter().map(|item| item.id.clone()).collect();
    let mut grid = SlotGrid::new(5, 5);
    let mut rng = ChaCha8Rng::seed_from_u64(11);

    let outcome = engine
        .start_sacrifice_with_rng(
            &mut rng,
            &mut profile,
            collaborators(&catalog),
            &SlotGridPacker,
            &mut grid,
            1,
        )
        .unwrap();

    assert!(!outcome.rewards.is_empty());
    for group in &outcome.rewards {
        assert_eq!(group.len(), 2);
        for item in group.items() {
            assert!(!existing.contains(&item.id), "reward id {} collides", item.id);
        }
    }
}

#[test]
fn test_group_cap_holds_across_seeds() {
    let mut config = base_config();
    config.max_reward_item_count = 3;
    config.craft_time_thresholds[0].max = 1e12;
    let engine = RitualEngine::new(config, RitualSeed::test_seed()).unwrap();
    let catalog = base_catalog();

    for seed in 0..50 {
        let mut profile = profile_with(&["relic", "relic", "relic"]);
        let mut grid = SlotGrid::new(10, 10);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        let outcome = engine
            .start_sacrifice_with_rng(
                &mut rng,
                &mut profile,
                collaborators(&catalog),
                &SlotGridPacker,
                &mut grid,
                1,
            )
            .unwrap();
        assert!(outcome.rewards.len() <= 3, "seed {seed}");
        assert!(outcome.budget.roubles >= 0.0);
    }
}

#[test]
fn test_sample_config_runs_a_ritual() {
    let config = CircleConfig::from_toml_str(include_str!("../../../config/circle.toml")).unwrap();
    let mut engine = RitualEngine::new(config, RitualSeed::new(&[3u8; 32])).unwrap();
    let catalog = InMemoryCatalog::new()
        .with(ItemTemplate::new("66572c82ad599021091c6118").with_price(100_000.0))
        .with(ItemTemplate::new("60a7ad2a2198820d95707a2e").with_price(80_000.0))
        .with(ItemTemplate::new("60a7ad3a0c5cb24b0134664a").with_price(80_000.0));

    let mut profile = profile_with(&["66572c82ad599021091c6118"]);
    let mut grid = SlotGrid::new(5, 5);

    let outcome = engine
        .start_sacrifice(
            &mut profile,
            collaborators(&catalog),
            &SlotGridPacker,
            &mut grid,
            1_700_000_000,
        )
        .unwrap();

    assert_eq!(outcome.source, RewardSource::Direct);
    assert_eq!(outcome.rewards.len(), 1, "exactly one welding mask variant");
    assert!(outcome.rewards_placed);
}

#[test]
fn test_repeatable_direct_reward_never_enters_ledger() {
    const DOGTAG: &str = "5c0530ee86f774697952d952";
    const REWARD: &str = "6389c7f115805221fb410466";

    let config = CircleConfig::from_toml_str(include_str!("../../../config/circle.toml")).unwrap();
    let mut engine = RitualEngine::new(config, RitualSeed::new(&[5u8; 32])).unwrap();
    assert_eq!(engine.direct_rewards().len(), engine.config().direct_rewards.len());

    let catalog = InMemoryCatalog::new()
        .with(ItemTemplate::new(DOGTAG).with_price(20_000.0))
        .with(ItemTemplate::new(REWARD).with_price(150_000.0));
    let offering = [TemplateId::new(DOGTAG), TemplateId::new(DOGTAG)];
    let mut profile = profile_with(&[DOGTAG, DOGTAG]);

    for round in 0..2u64 {
        let rule = engine
            .direct_rewards()
            .find(&offering, &profile.ledger)
            .expect("repeatable trade stays available");
        assert!(rule.repeatable);

        let mut grid = SlotGrid::new(5, 5);
        let outcome = engine
            .start_sacrifice(
                &mut profile,
                collaborators(&catalog),
                &SlotGridPacker,
                &mut grid,
                1_000 + round,
            )
            .unwrap();

        assert_eq!(outcome.source, RewardSource::Direct, "round {round}");
        assert_eq!(outcome.craft_time_seconds, 3600);
        let rewarded: Vec<&str> = outcome
            .rewards
            .iter()
            .map(|group| group.root().tpl.as_str())
            .collect();
        assert_eq!(rewarded, vec![REWARD]);
        assert!(profile.ledger.is_empty(), "round {round}");

        // Collect the reward and offer the same pair again
        profile.items.retain(|item| item.slot_id.as_deref() != Some(SLOT));
        let stash = ItemId::new(STASH);
        for index in 0..2 {
            profile.items.push(
                InventoryItem::new(
                    ItemId::new(format!("again_{round}_{index}")),
                    TemplateId::new(DOGTAG),
                )
                .with_parent(stash.clone(), SLOT),
            );
        }
    }
}
