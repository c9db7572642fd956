//! Viewport controller: pan, cursor-anchored zoom and camera follow.
//!
//! Owns the [`ViewportTransform`] and is the only place it changes. Every
//! transition keeps the transform valid: operations that would produce a
//! non-positive or non-finite scale leave the state untouched.

use bevy_math::Vec2;

use crate::config::CameraConfig;
use crate::mapper::ViewportTransform;

/// Bounds on the zoom scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleBounds {
    /// Minimum scale (zoomed out).
    pub min: f32,
    /// Maximum scale (zoomed in).
    pub max: f32,
}

impl Default for ScaleBounds {
    fn default() -> Self {
        Self {
            min: 0.5,
            max: 10.0,
        }
    }
}

impl ScaleBounds {
    /// Bounds from a pair of limits, in either order.
    pub fn new(a: f32, b: f32) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Clamp a scale value to valid range.
    pub fn clamp_scale(&self, scale: f32) -> f32 {
        scale.clamp(self.min, self.max)
    }
}

fn positive_or(value: f32, fallback: f32) -> f32 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        fallback
    }
}

/// Holds the viewport transform and the size of the surface it maps onto.
#[derive(Debug, Clone)]
pub struct ViewportController {
    transform: ViewportTransform,
    bounds: ScaleBounds,
    cell_size: f32,
    initial_scale: f32,
    surface: Vec2,
}

impl ViewportController {
    /// Controller for `config`. Non-positive or non-finite sizes and scales
    /// fall back to their defaults.
    pub fn new(config: &CameraConfig) -> Self {
        let defaults = CameraConfig::default();
        let bounds = ScaleBounds::new(
            positive_or(config.min_scale, defaults.min_scale),
            positive_or(config.max_scale, defaults.max_scale),
        );
        let initial_scale =
            bounds.clamp_scale(positive_or(config.initial_scale, defaults.initial_scale));
        Self {
            transform: ViewportTransform::new(Vec2::ZERO, initial_scale),
            bounds,
            cell_size: positive_or(config.cell_size, defaults.cell_size),
            initial_scale,
            surface: Vec2::ZERO,
        }
    }

    pub fn transform(&self) -> ViewportTransform {
        self.transform
    }

    pub fn bounds(&self) -> ScaleBounds {
        self.bounds
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    pub fn surface_size(&self) -> Vec2 {
        self.surface
    }

    /// Whether the surface has been sized yet.
    pub fn has_area(&self) -> bool {
        self.surface.x > 0.0 && self.surface.y > 0.0
    }

    /// Record the drawing surface size. Returns true if it changed.
    pub fn set_surface_size(&mut self, size: Vec2) -> bool {
        let size = if size.is_finite() {
            size.max(Vec2::ZERO)
        } else {
            Vec2::ZERO
        };
        if size == self.surface {
            return false;
        }
        self.surface = size;
        true
    }

    /// Translate the view by a screen-space delta.
    pub fn pan(&mut self, delta: Vec2) {
        if delta.is_finite() {
            self.transform.offset += delta;
        }
    }

    /// Zoom by `scale_delta` keeping the world point under `screen_point` fixed.
    ///
    /// Solves `(p - offset) / s == (p - offset') / s'` for `offset'`.
    /// Returns true if the transform changed.
    pub fn zoom_at(&mut self, screen_point: Vec2, scale_delta: f32) -> bool {
        if !self.has_area() || !screen_point.is_finite() || !scale_delta.is_finite() {
            return false;
        }

        let old_scale = self.transform.scale;
        let new_scale = self.bounds.clamp_scale(old_scale + scale_delta);
        if !(new_scale > 0.0) || new_scale == old_scale {
            return false;
        }

        let zoom_ratio = new_scale / old_scale;
        let anchor = screen_point - self.transform.offset;
        self.transform.offset = screen_point - anchor * zoom_ratio;
        self.transform.scale = new_scale;
        true
    }

    /// Zoom by a multiplicative factor around a screen point.
    pub fn zoom_by(&mut self, screen_point: Vec2, factor: f32) -> bool {
        let delta = self.transform.scale * (factor - 1.0);
        self.zoom_at(screen_point, delta)
    }

    /// Zoom by a multiplicative factor around the surface center.
    pub fn zoom_centered(&mut self, factor: f32) -> bool {
        self.zoom_by(self.surface / 2.0, factor)
    }

    /// Jump so `world_point` sits at the surface center at `target_scale`.
    ///
    /// One-shot: nothing keeps tracking the point afterwards.
    pub fn follow_target(&mut self, world_point: Vec2, target_scale: f32) -> bool {
        if !self.has_area() || !world_point.is_finite() || !target_scale.is_finite() {
            return false;
        }
        let scale = self.bounds.clamp_scale(target_scale);
        if !(scale > 0.0) {
            return false;
        }

        self.transform.scale = scale;
        self.transform.offset = self.surface / 2.0 - world_point * self.cell_size * scale;
        true
    }

    /// Return to the startup transform.
    pub fn reset(&mut self) {
        self.transform = ViewportTransform::new(Vec2::ZERO, self.initial_scale);
    }
}
