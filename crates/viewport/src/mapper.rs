//! Screen/world coordinate mapping.
//!
//! World coordinates are measured in grid cells; screen coordinates in
//! pixels with the origin at the top-left of the surface and y pointing
//! down. A world point `w` lands at `w * cell_size * scale + offset`.

use bevy_math::Vec2;

/// Pan offset and zoom scale of the viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportTransform {
    /// Screen-space translation in pixels.
    pub offset: Vec2,
    /// Uniform zoom factor. Always positive.
    pub scale: f32,
}

impl Default for ViewportTransform {
    fn default() -> Self {
        Self {
            offset: Vec2::ZERO,
            scale: 1.0,
        }
    }
}

impl ViewportTransform {
    pub fn new(offset: Vec2, scale: f32) -> Self {
        Self { offset, scale }
    }

    /// Whether the transform can be inverted.
    pub fn is_valid(&self) -> bool {
        self.scale.is_finite() && self.scale > 0.0 && self.offset.is_finite()
    }

    /// Pixels covered by one world cell.
    pub fn cell_pixels(&self, cell_size: f32) -> f32 {
        cell_size * self.scale
    }
}

/// Convert world coordinates to screen coordinates.
pub fn to_screen(world: Vec2, transform: &ViewportTransform, cell_size: f32) -> Vec2 {
    world * transform.cell_pixels(cell_size) + transform.offset
}

/// Convert screen coordinates to world coordinates.
///
/// Exact inverse of [`to_screen`]. The caller keeps `scale` positive.
pub fn to_world(screen: Vec2, transform: &ViewportTransform, cell_size: f32) -> Vec2 {
    (screen - transform.offset) / transform.cell_pixels(cell_size)
}

/// Center of the cell whose top-left corner is at `grid`.
pub fn cell_center(grid: Vec2) -> Vec2 {
    grid + Vec2::splat(0.5)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: Vec2, b: Vec2) {
        assert!((a - b).length() < 1e-3, "{a:?} != {b:?}");
    }

    #[test]
    fn test_identity_transform() {
        let t = ViewportTransform::default();
        assert_eq!(to_screen(Vec2::new(5.0, 5.0), &t, 10.0), Vec2::new(50.0, 50.0));
        assert_eq!(to_world(Vec2::new(55.0, 55.0), &t, 10.0), Vec2::new(5.5, 5.5));
    }

    #[test]
    fn test_offset_and_scale() {
        let t = ViewportTransform::new(Vec2::new(100.0, -20.0), 3.0);
        assert_eq!(to_screen(Vec2::new(2.0, 1.0), &t, 10.0), Vec2::new(160.0, 10.0));
    }

    #[test]
    fn test_roundtrip_screen_world_screen() {
        let transforms = [
            ViewportTransform::new(Vec2::ZERO, 1.0),
            ViewportTransform::new(Vec2::new(-340.5, 1280.25), 0.5),
            ViewportTransform::new(Vec2::new(12.0, -7.0), 3.5),
            ViewportTransform::new(Vec2::new(400.0, 300.0), 10.0),
        ];
        let points = [
            Vec2::ZERO,
            Vec2::new(55.0, 55.0),
            Vec2::new(799.0, 599.0),
            Vec2::new(-120.0, 3000.5),
        ];

        for t in &transforms {
            for &p in &points {
                let back = to_screen(to_world(p, t, 12.0), t, 12.0);
                assert_close(back, p);
            }
        }
    }

    #[test]
    fn test_cell_center() {
        assert_eq!(cell_center(Vec2::new(5.0, 5.0)), Vec2::new(5.5, 5.5));
    }

    #[test]
    fn test_transform_validity() {
        assert!(ViewportTransform::default().is_valid());
        assert!(!ViewportTransform::new(Vec2::ZERO, 0.0).is_valid());
        assert!(!ViewportTransform::new(Vec2::ZERO, -1.0).is_valid());
        assert!(!ViewportTransform::new(Vec2::new(f32::NAN, 0.0), 1.0).is_valid());
    }
}
