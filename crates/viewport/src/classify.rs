//! Item classification.
//!
//! Items carry no explicit category, so one is inferred from text. The rules
//! form an ordered list: every id rule is tried before any name rule, and
//! every name rule before any tag rule. The first match wins.

use world_snapshot::ItemSnapshot;

/// Drawing category of an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemCategory {
    Food,
    Wood,
    Stone,
    ToolOrWeapon,
    Other,
}

/// Which part of an item a rule inspects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemField {
    /// Case-insensitive substring of the id.
    Id,
    /// Case-insensitive substring of the name.
    Name,
    /// Exact member of the tag set.
    Tag,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemRule {
    pub field: ItemField,
    pub needle: &'static str,
    pub category: ItemCategory,
}

const fn rule(field: ItemField, needle: &'static str, category: ItemCategory) -> ItemRule {
    ItemRule {
        field,
        needle,
        category,
    }
}

/// Default rule list, in precedence order.
pub const ITEM_RULES: &[ItemRule] = &[
    rule(ItemField::Id, "fruit", ItemCategory::Food),
    rule(ItemField::Id, "wood", ItemCategory::Wood),
    rule(ItemField::Id, "stone", ItemCategory::Stone),
    rule(ItemField::Name, "fruit", ItemCategory::Food),
    rule(ItemField::Name, "wood", ItemCategory::Wood),
    rule(ItemField::Name, "stone", ItemCategory::Stone),
    rule(ItemField::Tag, "food", ItemCategory::Food),
    rule(ItemField::Tag, "wood", ItemCategory::Wood),
    rule(ItemField::Tag, "stone", ItemCategory::Stone),
    rule(ItemField::Tag, "tool", ItemCategory::ToolOrWeapon),
    rule(ItemField::Tag, "weapon", ItemCategory::ToolOrWeapon),
];

impl ItemRule {
    pub fn matches(&self, item: &ItemSnapshot) -> bool {
        match self.field {
            ItemField::Id => contains_ignore_case(item.id.as_deref(), self.needle),
            ItemField::Name => contains_ignore_case(item.name.as_deref(), self.needle),
            ItemField::Tag => item.tags.contains(self.needle),
        }
    }
}

fn contains_ignore_case(haystack: Option<&str>, needle: &str) -> bool {
    haystack.is_some_and(|text| text.to_lowercase().contains(needle))
}

/// Classify an item with the default rules.
pub fn classify(item: &ItemSnapshot) -> ItemCategory {
    classify_with(item, ITEM_RULES)
}

/// Classify an item with a custom rule list.
pub fn classify_with(item: &ItemSnapshot, rules: &[ItemRule]) -> ItemCategory {
    rules
        .iter()
        .find(|rule| rule.matches(item))
        .map(|rule| rule.category)
        .unwrap_or(ItemCategory::Other)
}
