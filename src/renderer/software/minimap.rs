//! Top-down diagnostic view painted into the upper-left corner.
//!
//! The grid is squeezed into a `minimap_size` square; each axis scales on its
//! own, so non-square maps stretch.

use glam::Vec2;

use crate::{
    renderer::{Rgba, software::Software},
    world::GridMap,
};

pub const WALL: Rgba = 0x00_FF0000;
pub const OPEN: Rgba = 0x00_008000;
pub const VIEWER: Rgba = 0x00_FFFFFF;
pub const RAY: Rgba = 0x00_FFFF00;

impl Software {
    /// Pixels per cell along each axis.
    fn minimap_scale(&self, map: &GridMap) -> Vec2 {
        let side = self.settings.minimap_size as f32;
        side / map.size().as_vec2().max(Vec2::ONE)
    }

    /// Map-space point → minimap pixel.
    fn to_minimap(&self, map: &GridMap, p: Vec2) -> (i32, i32) {
        let q = p / map.cell_size() as f32 * self.minimap_scale(map);
        (q.x as i32, q.y as i32)
    }

    pub(super) fn draw_minimap_grid(&mut self, map: &GridMap) {
        let scale = self.minimap_scale(map);
        for (tile, cell) in map.iter() {
            let lo = tile.as_vec2() * scale;
            let hi = lo + scale;
            let (x0, y0, x1, y1) = (lo.x as i32, lo.y as i32, hi.x as i32, hi.y as i32);
            if cell.is_solid() {
                self.draw_rect(x0, y0, x1, y1, WALL, true);
            } else {
                self.draw_rect(x0, y0, x1, y1, OPEN, false);
            }
        }
    }

    pub(super) fn draw_ray_fan(&mut self, map: &GridMap, eye: Vec2, points: &[Vec2]) {
        let (ex, ey) = self.to_minimap(map, eye);
        for &p in points {
            let (px, py) = self.to_minimap(map, p);
            self.draw_line(ex, ey, px, py, RAY);
        }
    }

    pub(super) fn draw_viewer_marker(&mut self, map: &GridMap, eye: Vec2) {
        let (ex, ey) = self.to_minimap(map, eye);
        self.draw_rect(ex - 1, ey - 1, ex + 2, ey + 2, VIEWER, true);
    }
}
