use glam::{IVec2, Vec2};

use super::grid::Cell;

/// Which family of grid lines the ray crossed to reach the wall.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Side {
    /// A line `x = k * cell_size` (east / west wall face).
    #[default]
    Vertical,
    /// A line `y = k * cell_size` (north / south wall face).
    Horizontal,
}

/// Outcome of one ray traversal.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hit {
    /// Straight-line distance from the ray origin to `point`.
    /// Not fisheye-corrected.
    pub distance: f32,
    pub ray_angle: f32,
    pub point: Vec2,
    /// Tile that stopped the ray (may lie outside the map).
    pub tile: IVec2,
    pub side: Side,
    /// `None` when the ray left the map instead of striking a wall.
    pub cell: Option<Cell>,
}

impl Hit {
    /// Perpendicular distance to the view plane of a viewer facing `yaw`.
    #[inline]
    pub fn corrected_distance(&self, yaw: f32) -> f32 {
        self.distance * (self.ray_angle - yaw).cos()
    }

    /// Horizontal offset of the hit along the wall face, in `[0, 1)`.
    ///
    /// Faces seen from the negative side (looking west or south) are
    /// mirrored so textures never appear flipped.
    pub fn wall_offset(&self, cell_size: u32) -> f32 {
        let cs = cell_size as f32;
        let (s, c) = self.ray_angle.sin_cos();
        let (along, mirror) = match self.side {
            Side::Vertical => (self.point.y, c < 0.0),
            Side::Horizontal => (self.point.x, s > 0.0),
        };
        let u = along.rem_euclid(cs) / cs;
        let u = if mirror { 1.0 - u } else { u };
        // 1.0 - 0.0 and rounding both land on the excluded upper bound
        if u >= 1.0 { 0.0 } else { u }
    }

    /// Texture column for a texture `tex_w` texels wide.
    #[inline]
    pub fn texture_column(&self, cell_size: u32, tex_w: usize) -> usize {
        ((self.wall_offset(cell_size) * tex_w as f32) as usize).min(tex_w.saturating_sub(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, PI};

    fn hit(angle: f32, point: Vec2, side: Side) -> Hit {
        Hit {
            distance: 10.0,
            ray_angle: angle,
            point,
            tile: IVec2::ZERO,
            side,
            cell: None,
        }
    }

    #[test]
    fn straight_ahead_is_not_corrected() {
        let h = hit(0.7, Vec2::ZERO, Side::Vertical);
        assert!((h.corrected_distance(0.7) - 10.0).abs() < 1e-6);
    }

    #[test]
    fn off_axis_distance_shrinks() {
        let h = hit(PI / 6.0, Vec2::ZERO, Side::Vertical);
        let c = h.corrected_distance(0.0);
        assert!((c - 10.0 * (PI / 6.0).cos()).abs() < 1e-5);
        assert!(c < h.distance);
    }

    #[test]
    fn wall_offset_uses_the_axis_along_the_face() {
        // east-facing ray hitting x = 128 at y = 80 → 16 / 64
        let h = hit(0.1, Vec2::new(128.0, 80.0), Side::Vertical);
        assert!((h.wall_offset(64) - 0.25).abs() < 1e-6);

        // north-bound ray (+Y) hitting y = 64 at x = 96 → mirrored 32 / 64
        let h = hit(FRAC_PI_2, Vec2::new(96.0, 64.0), Side::Horizontal);
        assert!((h.wall_offset(64) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn wall_offset_stays_below_one() {
        // west-facing ray exactly on a cell corner mirrors 0 → 1 → wraps to 0
        let h = hit(PI, Vec2::new(64.0, 128.0), Side::Vertical);
        let u = h.wall_offset(64);
        assert!((0.0..1.0).contains(&u));
        assert_eq!(h.texture_column(64, 32), 0);
    }
}
