//! Scene renderer: paints a snapshot in fixed layer order.
//!
//! Rendering is a pure function of `(snapshot, transform, mode, selection,
//! surface size)`. A layer whose snapshot data is missing or empty is
//! skipped; nothing here fails.

mod draw;

pub use draw::{DrawCommand, DrawList, Layer, LayeredCommand, Surface, TextAnchor};

use bevy_color::Color;
use bevy_math::{Rect, Vec2};
use world_snapshot::{AgentSnapshot, Snapshot, TerrainKind};

use crate::classify::{classify, ItemCategory};
use crate::config::RenderConfig;
use crate::mapper::{cell_center, to_screen, to_world, ViewportTransform};
use crate::mode::RenderMode;
use crate::palette::{parse_hex_color, Palette};

/// Everything one render pass reads.
#[derive(Debug, Clone, Copy)]
pub struct Scene<'a> {
    pub snapshot: Option<&'a Snapshot>,
    pub transform: ViewportTransform,
    pub mode: RenderMode,
    pub selected: Option<&'a str>,
    /// Drawing surface size in pixels.
    pub surface_size: Vec2,
}

/// Marker shape of an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerShape {
    Circle,
    Square,
    Triangle,
}

impl ItemCategory {
    pub fn shape(self) -> MarkerShape {
        match self {
            ItemCategory::Stone => MarkerShape::Square,
            ItemCategory::ToolOrWeapon => MarkerShape::Triangle,
            ItemCategory::Food | ItemCategory::Wood | ItemCategory::Other => MarkerShape::Circle,
        }
    }
}

/// Which outline an agent gets. Selection outranks leadership.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutlineStyle {
    Selected,
    Leader,
    Plain,
}

impl OutlineStyle {
    pub fn for_agent(is_selected: bool, is_leader: bool) -> Self {
        if is_selected {
            OutlineStyle::Selected
        } else if is_leader {
            OutlineStyle::Leader
        } else {
            OutlineStyle::Plain
        }
    }

    /// Color and pixel width of the outline.
    pub fn stroke(self, palette: &Palette) -> (Color, f32) {
        match self {
            OutlineStyle::Selected => (palette.selected_outline, 4.0),
            OutlineStyle::Leader => (palette.leader_outline, 2.0),
            OutlineStyle::Plain => (palette.agent_outline, 2.0),
        }
    }
}

const ITEM_SIZE: f32 = 0.4;
const ANIMAL_SIZE: f32 = 0.5;
const AGENT_RADIUS: f32 = 0.4;
const LABEL_SIZE: f32 = 10.0;
const GRID_LINE_WIDTH: f32 = 0.5;
const RELATIONSHIP_WIDTH: f32 = 2.0;
const RELATIONSHIP_DASH: f32 = 5.0;
const NIGHT_LABEL: &str = "NIGHT";
const NIGHT_LABEL_SIZE: f32 = 24.0;
const NIGHT_LABEL_INSET: Vec2 = Vec2::new(20.0, 40.0);

/// Paints scenes. Holds only configuration, never frame state.
#[derive(Debug, Clone)]
pub struct SceneRenderer {
    pub palette: Palette,
    pub cell_size: f32,
    pub config: RenderConfig,
}

impl SceneRenderer {
    pub fn new(cell_size: f32, config: RenderConfig) -> Self {
        Self {
            palette: Palette::default(),
            cell_size,
            config,
        }
    }

    /// Render a scene into a fresh draw list.
    pub fn render_to_list(&self, scene: &Scene) -> DrawList {
        let mut list = DrawList::new();
        self.render(scene, &mut list);
        list
    }

    /// Paint every layer of `scene` onto `surface`.
    pub fn render(&self, scene: &Scene, surface: &mut impl Surface) {
        surface.begin_layer(Layer::Background);
        surface.draw(DrawCommand::FillRect {
            rect: Rect::from_corners(Vec2::ZERO, scene.surface_size),
            color: self.palette.background,
        });

        let Some(snapshot) = scene.snapshot else {
            return;
        };
        // World layers need an invertible transform; lighting is screen space
        if scene.transform.is_valid() && self.cell_size > 0.0 {
            let painter = Painter {
                renderer: self,
                transform: scene.transform,
            };
            let visible = painter.visible_cells(snapshot, scene.surface_size);

            painter.terrain(snapshot, visible, surface);
            painter.decorations(snapshot, visible, surface);
            painter.items(snapshot, surface);
            painter.animals(snapshot, surface);
            painter.agents(snapshot, scene.mode, scene.selected, surface);
            painter.relationships(snapshot, scene.selected, surface);
        }
        self.lighting(snapshot, scene.surface_size, surface);
    }

    /// Night wash and indicator, in screen space.
    fn lighting(&self, snapshot: &Snapshot, surface_size: Vec2, surface: &mut impl Surface) {
        if snapshot.is_day {
            return;
        }
        surface.begin_layer(Layer::Lighting);
        surface.draw(DrawCommand::FillRect {
            rect: Rect::from_corners(Vec2::ZERO, surface_size),
            color: self.palette.night_wash,
        });
        surface.draw(DrawCommand::Text {
            position: Vec2::new(surface_size.x - NIGHT_LABEL_INSET.x, NIGHT_LABEL_INSET.y),
            text: NIGHT_LABEL.to_string(),
            size: NIGHT_LABEL_SIZE,
            color: self.palette.night_text,
            anchor: TextAnchor::BottomRight,
        });
    }

    /// Fill color of an agent: affiliation color if the mode provides a
    /// parseable one, sex-based color otherwise.
    pub fn agent_fill(&self, agent: &AgentSnapshot, mode: RenderMode) -> Color {
        mode.affiliation_color(&agent.attributes)
            .and_then(parse_hex_color)
            .unwrap_or(if agent.attributes.is_male() {
                self.palette.male
            } else {
                self.palette.female
            })
    }
}

/// Half-open range of grid cells on screen: `x0..x1`, `y0..y1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CellRange {
    x0: usize,
    x1: usize,
    y0: usize,
    y1: usize,
}

/// World-space painting for one pass.
struct Painter<'r> {
    renderer: &'r SceneRenderer,
    transform: ViewportTransform,
}

impl Painter<'_> {
    fn palette(&self) -> &Palette {
        &self.renderer.palette
    }

    fn screen(&self, world: Vec2) -> Vec2 {
        to_screen(world, &self.transform, self.renderer.cell_size)
    }

    /// Pixels covered by one world cell.
    fn cell_px(&self) -> f32 {
        self.transform.cell_pixels(self.renderer.cell_size)
    }

    fn scale(&self) -> f32 {
        self.transform.scale
    }

    fn visible_cells(&self, snapshot: &Snapshot, surface_size: Vec2) -> CellRange {
        let rows = snapshot.terrain.len();
        let cols = snapshot.terrain.iter().map(Vec::len).max().unwrap_or(0);
        let top_left = to_world(Vec2::ZERO, &self.transform, self.renderer.cell_size);
        let bottom_right = to_world(surface_size, &self.transform, self.renderer.cell_size);

        let clamp = |v: f32, max: usize| -> usize { v.clamp(0.0, max as f32) as usize };
        let x0 = clamp(top_left.x.floor(), cols);
        let y0 = clamp(top_left.y.floor(), rows);
        CellRange {
            x0,
            x1: clamp(bottom_right.x.ceil(), cols).max(x0),
            y0,
            y1: clamp(bottom_right.y.ceil(), rows).max(y0),
        }
    }

    fn visible_terrain<'s>(
        &self,
        snapshot: &'s Snapshot,
        range: CellRange,
    ) -> impl Iterator<Item = (usize, usize, TerrainKind)> + 's {
        snapshot.terrain[range.y0..range.y1]
            .iter()
            .enumerate()
            .flat_map(move |(dy, row)| {
                let x1 = range.x1.min(row.len());
                let x0 = range.x0.min(x1);
                row[x0..x1]
                    .iter()
                    .enumerate()
                    .map(move |(dx, &kind)| (range.x0 + dx, range.y0 + dy, kind))
            })
    }

    fn cell_rect(&self, x: usize, y: usize) -> Rect {
        let min = self.screen(Vec2::new(x as f32, y as f32));
        Rect::from_corners(min, min + Vec2::splat(self.cell_px()))
    }

    fn terrain(&self, snapshot: &Snapshot, range: CellRange, surface: &mut impl Surface) {
        if snapshot.terrain.is_empty() {
            return;
        }
        let show_grid = self.scale() > self.renderer.config.grid_min_scale;

        surface.begin_layer(Layer::Terrain);
        for (x, y, kind) in self.visible_terrain(snapshot, range) {
            let rect = self.cell_rect(x, y);
            surface.draw(DrawCommand::FillRect {
                rect,
                color: self.palette().terrain(kind),
            });
            if show_grid {
                surface.draw(DrawCommand::StrokeRect {
                    rect,
                    color: self.palette().grid,
                    width: GRID_LINE_WIDTH,
                });
            }
        }
    }

    fn decorations(&self, snapshot: &Snapshot, range: CellRange, surface: &mut impl Surface) {
        let mut began = false;
        for (x, y, kind) in self.visible_terrain(snapshot, range) {
            if kind != TerrainKind::Forest {
                continue;
            }
            if !began {
                surface.begin_layer(Layer::Decoration);
                began = true;
            }
            surface.draw(DrawCommand::FillCircle {
                center: self.screen(cell_center(Vec2::new(x as f32, y as f32))),
                radius: self.cell_px() / 4.0,
                color: self.palette().tree,
            });
        }
    }

    fn items(&self, snapshot: &Snapshot, surface: &mut impl Surface) {
        if snapshot.items.is_empty() {
            return;
        }
        surface.begin_layer(Layer::Items);

        let half = self.cell_px() * ITEM_SIZE / 2.0;
        let outline = self.palette().item_outline;
        for item in &snapshot.items {
            let category = classify(item);
            let color = self.palette().item(category);
            let center = self.screen(cell_center(Vec2::new(item.x, item.y)));

            match category.shape() {
                MarkerShape::Circle => {
                    surface.draw(DrawCommand::FillCircle {
                        center,
                        radius: half,
                        color,
                    });
                    surface.draw(DrawCommand::StrokeCircle {
                        center,
                        radius: half,
                        color: outline,
                        width: 1.0,
                    });
                }
                MarkerShape::Square => {
                    let rect = Rect::from_center_half_size(center, Vec2::splat(half));
                    surface.draw(DrawCommand::FillRect { rect, color });
                    surface.draw(DrawCommand::StrokeRect {
                        rect,
                        color: outline,
                        width: 1.0,
                    });
                }
                MarkerShape::Triangle => {
                    let points = triangle(center, half);
                    surface.draw(DrawCommand::FillTriangle { points, color });
                    surface.draw(DrawCommand::StrokeTriangle {
                        points,
                        color: outline,
                        width: 1.0,
                    });
                }
            }
        }
    }

    fn animals(&self, snapshot: &Snapshot, surface: &mut impl Surface) {
        if snapshot.animals.is_empty() {
            return;
        }
        surface.begin_layer(Layer::Animals);

        let size = self.cell_px() * ANIMAL_SIZE;
        for animal in &snapshot.animals {
            let center = self.screen(cell_center(Vec2::new(animal.x, animal.y)));
            surface.draw(DrawCommand::FillTriangle {
                points: triangle(center, size / 2.0),
                color: self.palette().animal(animal.class()),
            });
            surface.draw(DrawCommand::FillCircle {
                center: center - Vec2::new(0.0, size / 6.0),
                radius: size / 10.0,
                color: self.palette().highlight,
            });
        }
    }

    fn agents(
        &self,
        snapshot: &Snapshot,
        mode: RenderMode,
        selected: Option<&str>,
        surface: &mut impl Surface,
    ) {
        if snapshot.agents.is_empty() {
            return;
        }
        surface.begin_layer(Layer::Agents);

        let radius = self.cell_px() * AGENT_RADIUS;
        let show_labels = self.scale() > self.renderer.config.label_min_scale;
        for agent in &snapshot.agents {
            let center = self.screen(cell_center(Vec2::new(agent.x, agent.y)));
            surface.draw(DrawCommand::FillCircle {
                center,
                radius,
                color: self.renderer.agent_fill(agent, mode),
            });

            let style = OutlineStyle::for_agent(selected == Some(agent.id.as_str()), agent.is_leader());
            let (color, width) = style.stroke(self.palette());
            surface.draw(DrawCommand::StrokeCircle {
                center,
                radius,
                color,
                width,
            });

            surface.draw(DrawCommand::FillCircle {
                center: center - Vec2::new(0.0, radius * 0.3),
                radius: radius * 0.2,
                color: self.palette().highlight,
            });

            if show_labels && !agent.attributes.name.is_empty() {
                surface.draw(DrawCommand::Text {
                    position: center - Vec2::new(0.0, radius * 1.5),
                    text: agent.attributes.name.clone(),
                    size: LABEL_SIZE,
                    color: self.palette().label,
                    anchor: TextAnchor::BottomCenter,
                });
            }
        }
    }

    fn relationships(&self, snapshot: &Snapshot, selected: Option<&str>, surface: &mut impl Surface) {
        let Some(source) = selected.and_then(|id| snapshot.agent(id)) else {
            return;
        };
        let threshold = self.renderer.config.opinion_threshold;
        let from = self.screen(cell_center(Vec2::new(source.x, source.y)));

        let mut began = false;
        for (target_id, &opinion) in &source.opinions {
            if !(opinion.abs() > threshold) {
                continue;
            }
            let Some(target) = snapshot.agent(target_id) else {
                continue;
            };
            if !began {
                surface.begin_layer(Layer::Relationships);
                began = true;
            }
            surface.draw(DrawCommand::Line {
                from,
                to: self.screen(cell_center(Vec2::new(target.x, target.y))),
                color: self
                    .palette()
                    .opinion(opinion, self.renderer.config.opinion_full_strength),
                width: RELATIONSHIP_WIDTH,
                dash: Some(RELATIONSHIP_DASH),
            });
        }
    }
}

/// Upward-pointing triangle inscribed in the square of `half` around `center`.
fn triangle(center: Vec2, half: f32) -> [Vec2; 3] {
    [
        center + Vec2::new(0.0, -half),
        center + Vec2::new(half, half),
        center + Vec2::new(-half, half),
    ]
}
