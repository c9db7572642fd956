//! Screen-space drawing commands and the surfaces that receive them.

use bevy_color::Color;
use bevy_math::{Rect, Vec2};

/// Scene layers, in painting order. Later layers occlude earlier ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Layer {
    Background,
    Terrain,
    Decoration,
    Items,
    Animals,
    Agents,
    Relationships,
    /// Drawn in screen space, unaffected by pan and zoom.
    Lighting,
}

/// Where a text command's position sits relative to the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAnchor {
    /// Position is the middle of the text's bottom edge.
    BottomCenter,
    /// Position is the right end of the text's bottom edge.
    BottomRight,
}

/// One primitive, in screen pixels (origin top-left, y down).
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    FillRect {
        rect: Rect,
        color: Color,
    },
    StrokeRect {
        rect: Rect,
        color: Color,
        width: f32,
    },
    FillCircle {
        center: Vec2,
        radius: f32,
        color: Color,
    },
    StrokeCircle {
        center: Vec2,
        radius: f32,
        color: Color,
        width: f32,
    },
    FillTriangle {
        points: [Vec2; 3],
        color: Color,
    },
    StrokeTriangle {
        points: [Vec2; 3],
        color: Color,
        width: f32,
    },
    Line {
        from: Vec2,
        to: Vec2,
        color: Color,
        width: f32,
        /// Dash and gap length in pixels; solid when `None`.
        dash: Option<f32>,
    },
    Text {
        position: Vec2,
        text: String,
        size: f32,
        color: Color,
        anchor: TextAnchor,
    },
}

/// Anything the scene renderer can paint onto.
pub trait Surface {
    /// Called before the commands of each layer that has any.
    fn begin_layer(&mut self, _layer: Layer) {}

    fn draw(&mut self, command: DrawCommand);
}

/// A command tagged with the layer it was painted in.
#[derive(Debug, Clone, PartialEq)]
pub struct LayeredCommand {
    pub layer: Layer,
    pub command: DrawCommand,
}

/// A recorded frame: every command of one render pass, in paint order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrawList {
    current: Option<Layer>,
    entries: Vec<LayeredCommand>,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every command so the list can be repainted.
    pub fn clear(&mut self) {
        self.current = None;
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[LayeredCommand] {
        &self.entries
    }

    /// Commands painted in one layer, in order.
    pub fn layer(&self, layer: Layer) -> impl Iterator<Item = &DrawCommand> {
        self.entries
            .iter()
            .filter(move |e| e.layer == layer)
            .map(|e| &e.command)
    }

    pub fn has_layer(&self, layer: Layer) -> bool {
        self.entries.iter().any(|e| e.layer == layer)
    }

    /// Distinct layers present, in paint order.
    pub fn layers(&self) -> Vec<Layer> {
        let mut layers: Vec<Layer> = Vec::new();
        for entry in &self.entries {
            if layers.last() != Some(&entry.layer) {
                layers.push(entry.layer);
            }
        }
        layers
    }
}

impl Surface for DrawList {
    fn begin_layer(&mut self, layer: Layer) {
        self.current = Some(layer);
    }

    fn draw(&mut self, command: DrawCommand) {
        let layer = self.current.unwrap_or(Layer::Background);
        self.entries.push(LayeredCommand { layer, command });
    }
}
