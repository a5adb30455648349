use crate::{
    renderer::{ColumnSpan, Paint, ProjectionPlane, RenderSettings, Rgba},
    world::{Camera, Cell, GridMap, Hit, Side, TextureAtlas},
};

/// Corrected depths are clamped up to this before dividing, so a viewer
/// brushing a wall gets a tall-but-finite strip.
const NEAR: f32 = 1.0 / 64.0;

/// Constants that depend on the *frame-buffer*, not on the map.
#[derive(Clone, Copy, Debug)]
pub struct Screen {
    pub w: usize,
    pub h: usize,
    pub half_h: f32, // pre-derived for speed
}

impl Screen {
    pub fn new(w: usize, h: usize) -> Self {
        Self {
            w,
            h,
            half_h: h as f32 * 0.5,
        }
    }
}

/// Everything needed to turn one [`Hit`] into a [`ColumnSpan`]; built once
/// per frame.
#[derive(Clone, Copy, Debug)]
pub struct Projector<'a> {
    screen: Screen,
    yaw: f32,
    wall_h: f32,
    plane: f32,
    cell_size: u32,
    shade_sides: bool,
    void_colour: Rgba,
    atlas: Option<&'a TextureAtlas>,
}

impl<'a> Projector<'a> {
    pub fn new(screen: Screen, camera: &Camera, map: &'a GridMap, settings: &RenderSettings) -> Self {
        let plane = match settings.projection {
            ProjectionPlane::Fixed(d) => d,
            ProjectionPlane::FromFov => camera.screen_scale(screen.w) * 0.5,
        };
        Self {
            screen,
            yaw: camera.yaw(),
            wall_h: map.cell_size() as f32,
            plane,
            cell_size: map.cell_size(),
            shade_sides: settings.shade_sides,
            void_colour: settings.void_colour,
            atlas: map.atlas(),
        }
    }

    /// Projected half-height (pixels) of a wall at corrected distance `depth`.
    #[inline]
    pub fn half_height(&self, depth: f32) -> f32 {
        self.wall_h * self.plane / depth.max(NEAR)
    }

    /// Project the hit of column `x`.
    ///
    /// `None` when the corrected depth is non-positive or not finite (viewer
    /// inside a wall, broken ray); the column is then left as background.
    pub fn project(&self, x: usize, hit: &Hit) -> Option<ColumnSpan> {
        if self.screen.h == 0 {
            return None;
        }
        let depth = hit.corrected_distance(self.yaw);
        if !depth.is_finite() || depth <= 0.0 {
            return None;
        }

        let half = self.half_height(depth);
        let y_top = self.screen.half_h - half;
        let y_bot = self.screen.half_h + half;
        let last_row = (self.screen.h - 1) as f32;

        Some(ColumnSpan {
            x,
            y_top,
            y_bot,
            y0: y_top.clamp(0.0, last_row) as usize,
            y1: y_bot.clamp(0.0, last_row) as usize,
            column_height: ((2.0 * half).round() as usize).max(1),
            depth,
            paint: self.paint(hit),
            dim: self.shade_sides && hit.side == Side::Horizontal,
        })
    }

    fn paint(&self, hit: &Hit) -> Paint {
        match hit.cell {
            Some(Cell::Wall(c)) => Paint::Flat(c),
            Some(Cell::Textured(id)) => match self.atlas.and_then(|a| a.texture(id).ok()) {
                Some(tex) => Paint::Textured {
                    id,
                    u: hit.texture_column(self.cell_size, tex.w),
                },
                None => Paint::Flat(self.void_colour),
            },
            Some(Cell::Empty) | None => Paint::Flat(self.void_colour),
        }
    }
}
