//! # Item Catalog
//!
//! Read-only item database the ritual consults for prices, class taxonomy
//! and default presets.
//!
//! The engine only depends on the [`Catalog`] trait. [`InMemoryCatalog`] is a
//! plain map-backed implementation for servers that keep the database in
//! memory, and for tests.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::config::IntRange;
use crate::item::{InventoryItem, ItemId, ItemIdGenerator, RewardGroup, TemplateId};

/// Well-known base class template ids.
pub mod base_class {
    /// Ammunition.
    pub const AMMO: &str = "5485a8684bdc2da71d8b4567";
    /// Currency.
    pub const MONEY: &str = "543be5dd4bdc2deb348b4569";
    /// Weapons.
    pub const WEAPON: &str = "5422acb9af1c889c16000029";
}

/// Parent chains longer than this are treated as malformed.
const MAX_CLASS_DEPTH: usize = 32;

/// One catalog entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ItemTemplate {
    /// Template id.
    pub id: TemplateId,
    /// Display name, for logs.
    #[serde(default)]
    pub name: String,
    /// Parent class in the taxonomy.
    #[serde(default)]
    pub parent: Option<TemplateId>,
    /// Rouble price, if known.
    #[serde(default)]
    pub price: Option<f64>,
    /// Highest known rouble price, if known.
    #[serde(default)]
    pub max_price: Option<f64>,
    /// Whether the template may be handed out at all.
    #[serde(default = "default_valid")]
    pub valid: bool,
    /// Armor with removable plates or soft inserts.
    #[serde(default)]
    pub removable_armor_slots: bool,
    /// Random stack range used when spawning this template (ammo).
    #[serde(default)]
    pub stack_random: Option<IntRange>,
}

fn default_valid() -> bool {
    true
}

impl ItemTemplate {
    /// Creates a valid template with no price.
    #[must_use]
    pub fn new(id: impl Into<TemplateId>) -> Self {
        let id = id.into();
        Self {
            name: id.as_str().to_string(),
            id,
            parent: None,
            price: None,
            max_price: None,
            valid: true,
            removable_armor_slots: false,
            stack_random: None,
        }
    }

    /// Sets the parent class.
    #[must_use]
    pub fn with_parent(mut self, parent: impl Into<TemplateId>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Sets both price and max price.
    #[must_use]
    pub fn with_price(mut self, price: f64) -> Self {
        self.price = Some(price);
        self.max_price = Some(price);
        self
    }

    /// Sets the max price only.
    #[must_use]
    pub fn with_max_price(mut self, max_price: f64) -> Self {
        self.max_price = Some(max_price);
        self
    }

    /// Marks the template as not handed out.
    #[must_use]
    pub fn invalid(mut self) -> Self {
        self.valid = false;
        self
    }

    /// Flags armor with removable or soft-insert slots.
    #[must_use]
    pub fn with_removable_armor_slots(mut self) -> Self {
        self.removable_armor_slots = true;
        self
    }

    /// Sets the random stack range.
    #[must_use]
    pub fn with_stack_random(mut self, range: IntRange) -> Self {
        self.stack_random = Some(range);
        self
    }
}

/// A default equipment preset: a root item plus its attached parts.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Preset {
    /// Root item first, parts after.
    pub items: Vec<InventoryItem>,
}

impl Preset {
    /// Copies the preset with fresh ids, parenting the root into a container.
    ///
    /// Part-to-parent links are remapped onto the new ids. Returns `None`
    /// for an empty preset.
    pub fn instantiate<R: rand::Rng + ?Sized>(
        &self,
        ids: &mut ItemIdGenerator,
        container_id: &ItemId,
        slot_id: &str,
        rng: &mut R,
    ) -> Option<RewardGroup> {
        let remap: HashMap<&ItemId, ItemId> = self
            .items
            .iter()
            .map(|item| (&item.id, ids.generate(rng)))
            .collect();

        let items = self
            .items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                let mut copy = item.clone();
                copy.id = remap[&item.id].clone();
                if index == 0 {
                    copy.parent_id = Some(container_id.clone());
                    copy.slot_id = Some(slot_id.to_string());
                    copy.location = None;
                } else if let Some(parent) = &item.parent_id {
                    copy.parent_id =
                        Some(remap.get(parent).cloned().unwrap_or_else(|| parent.clone()));
                }
                copy
            })
            .collect();

        RewardGroup::from_items(items)
    }
}

/// Item database lookups.
pub trait Catalog {
    /// Looks up a template.
    fn template(&self, tpl: &TemplateId) -> Option<&ItemTemplate>;

    /// Every template id, in a stable order suitable for sampling.
    fn all_templates(&self) -> &[TemplateId];

    /// Default preset for a weapon or armor template.
    fn default_preset(&self, tpl: &TemplateId) -> Option<&Preset>;

    /// Rouble price, if known.
    fn price(&self, tpl: &TemplateId) -> Option<f64> {
        self.template(tpl).and_then(|t| t.price)
    }

    /// Highest known rouble price, if known.
    fn max_price(&self, tpl: &TemplateId) -> Option<f64> {
        self.template(tpl).and_then(|t| t.max_price.or(t.price))
    }

    /// Whether the template exists and may be handed out.
    fn is_valid(&self, tpl: &TemplateId) -> bool {
        self.template(tpl).is_some_and(|t| t.valid)
    }

    /// Whether `tpl` is `base` or descends from it.
    fn is_of_base_class(&self, tpl: &TemplateId, base: &str) -> bool {
        let mut current = Some(tpl);
        for _ in 0..MAX_CLASS_DEPTH {
            let Some(id) = current else {
                return false;
            };
            if id.as_str() == base {
                return true;
            }
            current = self.template(id).and_then(|t| t.parent.as_ref());
        }
        false
    }

    /// Whether the template is handed out as a full preset.
    fn is_preset_reward(&self, tpl: &TemplateId) -> bool {
        self.template(tpl).is_some_and(|t| t.removable_armor_slots)
            || self.is_of_base_class(tpl, base_class::WEAPON)
    }
}

/// Map-backed catalog.
#[derive(Clone, Debug, Default)]
pub struct InMemoryCatalog {
    templates: HashMap<TemplateId, ItemTemplate>,
    order: Vec<TemplateId>,
    presets: HashMap<TemplateId, Preset>,
}

impl InMemoryCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a template.
    pub fn insert(&mut self, template: ItemTemplate) {
        if !self.templates.contains_key(&template.id) {
            self.order.push(template.id.clone());
        }
        self.templates.insert(template.id.clone(), template);
    }

    /// Builder form of [`InMemoryCatalog::insert`].
    #[must_use]
    pub fn with(mut self, template: ItemTemplate) -> Self {
        self.insert(template);
        self
    }

    /// Registers the default preset of a template.
    pub fn insert_preset(&mut self, tpl: TemplateId, preset: Preset) {
        self.presets.insert(tpl, preset);
    }

    /// Number of templates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether the catalog has no templates.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl Catalog for InMemoryCatalog {
    fn template(&self, tpl: &TemplateId) -> Option<&ItemTemplate> {
        self.templates.get(tpl)
    }

    fn all_templates(&self) -> &[TemplateId] {
        &self.order
    }

    fn default_preset(&self, tpl: &TemplateId) -> Option<&Preset> {
        self.presets.get(tpl)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    const RIFLE_CLASS: &str = "assault_rifle";

    fn catalog() -> InMemoryCatalog {
        InMemoryCatalog::new()
            .with(ItemTemplate::new(base_class::WEAPON))
            .with(ItemTemplate::new(RIFLE_CLASS).with_parent(base_class::WEAPON))
            .with(ItemTemplate::new("ak").with_parent(RIFLE_CLASS).with_price(40_000.0))
            .with(ItemTemplate::new("vest").with_removable_armor_slots())
            .with(ItemTemplate::new("bolts").with_price(5_000.0))
    }

    #[test]
    fn test_base_class_walks_hierarchy() {
        let catalog = catalog();
        assert!(catalog.is_of_base_class(&"ak".into(), base_class::WEAPON));
        assert!(!catalog.is_of_base_class(&"bolts".into(), base_class::WEAPON));
        assert!(!catalog.is_of_base_class(&"unknown".into(), base_class::WEAPON));
    }

    #[test]
    fn test_cyclic_parents_terminate() {
        let catalog = InMemoryCatalog::new()
            .with(ItemTemplate::new("a").with_parent("b"))
            .with(ItemTemplate::new("b").with_parent("a"));
        assert!(!catalog.is_of_base_class(&"a".into(), base_class::AMMO));
    }

    #[test]
    fn test_preset_rewards() {
        let catalog = catalog();
        assert!(catalog.is_preset_reward(&"ak".into()));
        assert!(catalog.is_preset_reward(&"vest".into()));
        assert!(!catalog.is_preset_reward(&"bolts".into()));
    }

    #[test]
    fn test_unknown_template_has_no_price() {
        let catalog = catalog();
        assert_eq!(catalog.price(&"missing".into()), None);
        assert!(!catalog.is_valid(&"missing".into()));
    }

    #[test]
    fn test_preset_instantiation_remaps_ids() {
        let preset = Preset {
            items: vec![
                InventoryItem::new("root".into(), "ak".into()),
                InventoryItem::new("mag".into(), "mag_tpl".into())
                    .with_parent("root".into(), "mod_magazine"),
                InventoryItem::new("ammo".into(), "ammo_tpl".into())
                    .with_parent("mag".into(), "cartridges"),
            ],
        };
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let existing = [ItemId::new("root"), ItemId::new("mag")];
        let mut ids = ItemIdGenerator::new(&existing);
        let container = ItemId::new("stash");

        let group = preset.instantiate(&mut ids, &container, "Grid", &mut rng).unwrap();
        let items = group.items();

        assert_eq!(items.len(), 3);
        assert_eq!(items[0].parent_id.as_ref(), Some(&container));
        assert_eq!(items[0].slot_id.as_deref(), Some("Grid"));
        assert_eq!(items[1].parent_id.as_ref(), Some(&items[0].id));
        assert_eq!(items[2].parent_id.as_ref(), Some(&items[1].id));
        assert_eq!(items[1].slot_id.as_deref(), Some("mod_magazine"));
        for item in items {
            assert!(!existing.contains(&item.id));
        }
    }
}
