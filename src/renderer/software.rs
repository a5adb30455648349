//! ---------------------------------------------------------------------------
//! Classic software (CPU) column renderer
//!
//! * Two `Vec<Rgba>` frame-buffers in **0x00RRGGBB**, row-major.
//! * Every frame repaints the whole back buffer: background, one strip per
//!   column, overlays. Then the buffers swap and the front one is loaned
//!   out read-only until the next swap.
//! * A column that cannot be cast or projected is left as background; it
//!   never aborts the frame.
//! ---------------------------------------------------------------------------

mod minimap;
mod projection;

pub use projection::{Projector, Screen};

use glam::Vec2;
use tracing::trace;

use crate::{
    renderer::{Background, ColumnSpan, Overlay, Paint, Renderer, RenderSettings, Rgba},
    world::{Camera, GridMap, TextureAtlas},
};

/*───────────────────────────────────────────────────────────────────────*/
/*                              Backend                                 */
/*───────────────────────────────────────────────────────────────────────*/

/// Wolfenstein-style column renderer with a double-buffered frame.
pub struct Software {
    front: Vec<Rgba>,
    back: Vec<Rgba>,
    width: usize,
    height: usize,
    settings: RenderSettings,

    /* per-frame scratch, kept to avoid reallocating */
    spans: Vec<ColumnSpan>,
    hit_points: Vec<Vec2>,
}

/// Read-only view of a finished frame.
#[derive(Clone, Copy, Debug)]
pub struct FrameView<'a> {
    pixels: &'a [Rgba],
    width: usize,
    height: usize,
}

impl<'a> FrameView<'a> {
    /// Row-major pixels, `y * width + x`.
    pub fn pixels(&self) -> &'a [Rgba] {
        self.pixels
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> Rgba {
        self.pixels[y * self.width + x]
    }

    /// Packed `R, G, B` bytes, same row-major order.
    pub fn to_rgb_bytes(&self) -> Vec<u8> {
        self.pixels
            .iter()
            .flat_map(|&p| [(p >> 16) as u8, (p >> 8) as u8, p as u8])
            .collect()
    }
}

/*──────────────────────── Renderer trait impl ────────────────────────*/
impl Renderer for Software {
    fn begin_frame(&mut self, w: usize, h: usize) {
        // (re)allocate if resolution changed
        if w != self.width || h != self.height {
            self.width = w;
            self.height = h;
            self.front.clear();
            self.front.resize(w * h, 0);
            self.back.clear();
            self.back.resize(w * h, 0);
        }
        self.clear_back();
    }

    fn draw_column(&mut self, span: &ColumnSpan, atlas: Option<&TextureAtlas>) {
        if span.x >= self.width || span.y0 > span.y1 || span.y1 >= self.height {
            return;
        }
        let w = self.width;
        let shade = |c: Rgba| if span.dim { dim(c) } else { c };

        match span.paint {
            Paint::Flat(c) => {
                let c = shade(c);
                for y in span.y0..=span.y1 {
                    self.back[y * w + span.x] = c;
                }
            }
            Paint::Textured { id, u } => {
                let Some(tex) = atlas.and_then(|a| a.texture(id).ok()) else {
                    trace!(x = span.x, id, "texture missing, column skipped");
                    return;
                };
                if tex.is_empty() {
                    trace!(x = span.x, id, "texture empty, column skipped");
                    return;
                }
                // row 0 of the stretched texture column sits at `top`
                let top = span.y_top.round() as i64;
                let last = span.column_height.saturating_sub(1) as i64;
                for y in span.y0..=span.y1 {
                    let row = (y as i64 - top).clamp(0, last) as usize;
                    if let Some(c) = tex.column_texel(u, row, span.column_height) {
                        self.back[y * w + span.x] = shade(c);
                    }
                }
            }
        }
    }

    fn end_frame<F>(&mut self, submit: F)
    where
        F: FnOnce(&[Rgba], usize, usize),
    {
        self.swap_buffers();
        submit(&self.front, self.width, self.height);
    }
}

impl Software {
    pub fn new(width: usize, height: usize, settings: RenderSettings) -> Self {
        let mut sw = Self {
            front: Vec::new(),
            back: Vec::new(),
            width: 0,
            height: 0,
            settings,
            spans: Vec::new(),
            hit_points: Vec::new(),
        };
        sw.begin_frame(width, height);
        sw.front.copy_from_slice(&sw.back);
        sw
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut RenderSettings {
        &mut self.settings
    }

    /// Last finished frame. Stays valid until the next swap.
    pub fn front(&self) -> FrameView<'_> {
        FrameView {
            pixels: &self.front,
            width: self.width,
            height: self.height,
        }
    }

    /// Spans produced by the last `render_frame`, one per drawn column.
    pub fn last_spans(&self) -> &[ColumnSpan] {
        &self.spans
    }

    /// Cast, project, paint, swap – one complete frame.
    pub fn render_frame(&mut self, camera: &Camera, map: &GridMap) -> FrameView<'_> {
        self.begin_frame(self.width, self.height);

        let screen = Screen::new(self.width, self.height);
        let projector = Projector::new(screen, camera, map, &self.settings);

        self.spans.clear();
        self.hit_points.clear();
        let fan = map.ray_casting(self.width, camera.fov(), camera.ray());
        for (x, result) in fan.enumerate() {
            let hit = match result {
                Ok(hit) => hit,
                Err(e) => {
                    trace!(x, error = %e, "ray failed, column skipped");
                    continue;
                }
            };
            self.hit_points.push(hit.point);
            match projector.project(x, &hit) {
                Some(span) => self.spans.push(span),
                None => trace!(x, distance = hit.distance, "degenerate depth, column skipped"),
            }
        }

        let spans = std::mem::take(&mut self.spans);
        for span in &spans {
            self.draw_column(span, map.atlas());
        }
        self.spans = spans;

        self.draw_overlays(camera, map);

        self.swap_buffers();
        self.front()
    }

    /*──────────────────────── internals ─────────────────────────────*/

    /// The only place that changes which buffer is on screen.
    fn swap_buffers(&mut self) {
        std::mem::swap(&mut self.front, &mut self.back);
    }

    fn clear_back(&mut self) {
        match self.settings.background {
            Background::Solid(c) => self.back.fill(c),
            Background::Split { ceiling, floor } => {
                let split = (self.height / 2) * self.width;
                self.back[..split].fill(ceiling);
                self.back[split..].fill(floor);
            }
        }
    }

    fn draw_overlays(&mut self, camera: &Camera, map: &GridMap) {
        let overlay = self.settings.overlay;
        if overlay.is_empty() {
            return;
        }
        if overlay.contains(Overlay::MINIMAP) {
            self.draw_minimap_grid(map);
        }
        if overlay.contains(Overlay::RAYS) {
            let points = std::mem::take(&mut self.hit_points);
            self.draw_ray_fan(map, camera.pos(), &points);
            self.hit_points = points;
        }
        self.draw_viewer_marker(map, camera.pos());
    }

    /// Integer Bresenham line into the back buffer, clipped to the screen.
    pub(crate) fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, col: Rgba) {
        let mut x0 = x0;
        let mut y0 = y0;
        let dx = (x1 - x0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let dy = -(y1 - y0).abs();
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        loop {
            if (0..self.width as i32).contains(&x0) && (0..self.height as i32).contains(&y0) {
                self.back[y0 as usize * self.width + x0 as usize] = col;
            }
            if x0 == x1 && y0 == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x0 += sx;
            }
            if e2 <= dx {
                err += dx;
                y0 += sy;
            }
        }
    }

    /// Axis-aligned rectangle `[x0, x1) × [y0, y1)`, filled or outlined.
    pub(crate) fn draw_rect(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, col: Rgba, fill: bool) {
        if fill {
            let xs = x0.max(0)..x1.min(self.width as i32);
            for y in y0.max(0)..y1.min(self.height as i32) {
                let row = y as usize * self.width;
                for x in xs.clone() {
                    self.back[row + x as usize] = col;
                }
            }
        } else if x1 > x0 && y1 > y0 {
            self.draw_line(x0, y0, x1 - 1, y0, col);
            self.draw_line(x1 - 1, y0, x1 - 1, y1 - 1, col);
            self.draw_line(x1 - 1, y1 - 1, x0, y1 - 1, col);
            self.draw_line(x0, y1 - 1, x0, y0, col);
        }
    }
}

/// Half brightness, per channel.
#[inline]
fn dim(c: Rgba) -> Rgba {
    (c >> 1) & 0x00_7F7F7F
}

/*──────────────────────────────── Tests ───────────────────────────────*/
