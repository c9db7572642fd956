//! Colors used by the scene renderer.

use bevy_color::{Alpha, Color, Srgba};
use world_snapshot::{AnimalClass, TerrainKind};

use crate::classify::ItemCategory;

/// Every color the scene renderer paints with.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    pub background: Color,
    pub water: Color,
    pub sand: Color,
    pub grass: Color,
    pub forest: Color,
    pub mountain: Color,
    pub snow: Color,
    /// Fill for terrain codes this viewer does not know.
    pub unknown_terrain: Color,
    pub grid: Color,
    pub tree: Color,
    pub food: Color,
    pub wood: Color,
    pub stone: Color,
    pub tool: Color,
    pub item_default: Color,
    pub item_outline: Color,
    pub carnivore: Color,
    pub herbivore: Color,
    pub animal_default: Color,
    pub highlight: Color,
    pub male: Color,
    pub female: Color,
    pub selected_outline: Color,
    pub leader_outline: Color,
    pub agent_outline: Color,
    pub label: Color,
    pub friendly: Color,
    pub hostile: Color,
    pub night_wash: Color,
    pub night_text: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            background: Color::srgb_u8(0x0f, 0x17, 0x2a), // Slate
            water: Color::srgb_u8(0x1e, 0x3a, 0x8a),      // Deep blue
            sand: Color::srgb_u8(0xd4, 0xb4, 0x83),       // Muted gold
            grass: Color::srgb_u8(0x3f, 0x62, 0x12),      // Deep olive
            forest: Color::srgb_u8(0x14, 0x53, 0x2d),     // Dark pine
            mountain: Color::srgb_u8(0x57, 0x53, 0x4e),   // Stone grey
            snow: Color::srgb_u8(0xe2, 0xe8, 0xf0),       // Dull white
            unknown_terrain: Color::BLACK,
            grid: Color::BLACK.with_alpha(0.15),
            tree: Color::srgb_u8(0x05, 0x2e, 0x16),
            food: Color::srgb_u8(0xef, 0x44, 0x44),
            wood: Color::srgb_u8(0xae, 0x60, 0x33),
            stone: Color::srgb_u8(0x57, 0x53, 0x4e),
            tool: Color::srgb_u8(0xea, 0xb3, 0x08),
            item_default: Color::srgb_u8(0xd4, 0xd4, 0xd4),
            item_outline: Color::BLACK,
            carnivore: Color::BLACK,
            herbivore: Color::srgb_u8(0xf9, 0x73, 0x16),
            animal_default: Color::srgb_u8(0xa8, 0xa2, 0x9e),
            highlight: Color::WHITE,
            male: Color::srgb_u8(0x3b, 0x82, 0xf6),
            female: Color::srgb_u8(0xec, 0x48, 0x99),
            selected_outline: Color::WHITE,
            leader_outline: Color::srgb_u8(0xfb, 0xbf, 0x24), // Gold
            agent_outline: Color::BLACK.with_alpha(0.6),
            label: Color::WHITE,
            friendly: Color::srgb_u8(34, 197, 94),
            hostile: Color::srgb_u8(239, 68, 68),
            night_wash: Color::srgb_u8(15, 23, 42).with_alpha(0.6),
            night_text: Color::srgb_u8(0x94, 0xa3, 0xb8),
        }
    }
}

impl Palette {
    pub fn terrain(&self, kind: TerrainKind) -> Color {
        match kind {
            TerrainKind::Water => self.water,
            TerrainKind::Sand => self.sand,
            TerrainKind::Grass => self.grass,
            TerrainKind::Forest => self.forest,
            TerrainKind::Mountain => self.mountain,
            TerrainKind::Snow => self.snow,
            TerrainKind::Unknown(_) => self.unknown_terrain,
        }
    }

    pub fn item(&self, category: ItemCategory) -> Color {
        match category {
            ItemCategory::Food => self.food,
            ItemCategory::Wood => self.wood,
            ItemCategory::Stone => self.stone,
            ItemCategory::ToolOrWeapon => self.tool,
            ItemCategory::Other => self.item_default,
        }
    }

    pub fn animal(&self, class: AnimalClass) -> Color {
        match class {
            AnimalClass::Carnivore => self.carnivore,
            AnimalClass::Herbivore => self.herbivore,
            AnimalClass::Other => self.animal_default,
        }
    }

    /// Relationship line color: green for positive opinions, red otherwise,
    /// with opacity growing with magnitude up to `full_strength`.
    pub fn opinion(&self, value: f32, full_strength: f32) -> Color {
        let alpha = if full_strength > 0.0 {
            (value.abs() / full_strength).min(1.0)
        } else {
            1.0
        };
        let base = if value > 0.0 { self.friendly } else { self.hostile };
        base.with_alpha(alpha)
    }
}

/// Parse a CSS-style hex color (`#rgb`, `#rrggbb`, `#rrggbbaa`).
pub fn parse_hex_color(text: &str) -> Option<Color> {
    Srgba::hex(text.trim()).ok().map(Color::from)
}
