//! Rendering abstraction layer.
//!
//! *The ray caster never touches a pixel buffer directly.*
//! Hits are projected into a list of [`ColumnSpan`]s (one per screen column,
//! left to right) and handed to a type that implements [`Renderer`].
//!
//! * A helper blanket‐impl [`RendererExt`] adds `draw_frame` so call-sites
//!   stay short.
//! * [`Software`] is the CPU back-end; it also owns the whole per-frame
//!   pipeline in [`Software::render_frame`].
//!
//! Pixel buffers are **row-major**: pixel `(x, y)` lives at `y * width + x`,
//! `y = 0` is the top row. No transpose happens anywhere on the way to the
//! window.

use bitflags::bitflags;

use crate::world::{TextureAtlas, TextureId};

/// Pixel format of the software frame-buffer (0x00RRGGBB).
pub type Rgba = u32;

/// How a column is coloured.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Paint {
    /// One colour for the whole strip.
    Flat(Rgba),
    /// Atlas tile `id`, source texel column `u`.
    Textured { id: TextureId, u: usize },
}

/// One projected wall strip.
///
/// `y_top ..= y_bot` is the unclamped strip (may extend past the screen);
/// `y0 ..= y1` are the rows that actually get written.
#[derive(Clone, Debug, PartialEq)]
pub struct ColumnSpan {
    pub x: usize,
    pub y_top: f32,
    pub y_bot: f32,
    pub y0: usize,
    pub y1: usize,
    /// Full strip height in pixels; the texture column is stretched to this.
    pub column_height: usize,
    /// Fisheye-corrected distance.
    pub depth: f32,
    pub paint: Paint,
    /// Draw at half brightness (wall faces along horizontal grid lines).
    pub dim: bool,
}

/// A renderer that owns the frame buffers.
///
/// `end_frame` hands the finished buffer to a user-supplied closure.
/// Software callers typically forward it to their window-manager.
pub trait Renderer {
    /// (Re)allocate buffers for the requested resolution and clear the back
    /// buffer.
    fn begin_frame(&mut self, width: usize, height: usize);

    /// Rasterise one wall strip into the back buffer.
    fn draw_column(&mut self, span: &ColumnSpan, atlas: Option<&TextureAtlas>);

    /// Finish the frame: swap buffers, then **loan** the new front buffer to
    /// `submit`.
    ///
    /// * `submit(&[Rgba], w, h)` is run exactly once per frame.
    /// * Software caller passes `|fb, w, h| window.update_with_buffer(fb, w, h)`.
    fn end_frame<F>(&mut self, submit: F)
    where
        F: FnOnce(&[Rgba], usize, usize);
}

/// Convenience blanket-impl with a one-liner `draw_frame` adaptor.
pub trait RendererExt: Renderer {
    fn draw_frame<F>(
        &mut self,
        width: usize,
        height: usize,
        spans: &[ColumnSpan],
        atlas: Option<&TextureAtlas>,
        submit: F,
    ) where
        F: FnOnce(&[Rgba], usize, usize),
    {
        self.begin_frame(width, height);
        for s in spans {
            self.draw_column(s, atlas);
        }
        self.end_frame(submit);
    }
}
impl<T: Renderer + ?Sized> RendererExt for T {}

/*──────────────────────────── settings ─────────────────────────────*/

/// What fills the screen behind the walls.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Background {
    Solid(Rgba),
    /// Upper half ceiling, lower half floor.
    Split { ceiling: Rgba, floor: Rgba },
}

/// Distance from the eye to the projection plane, in pixels.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ProjectionPlane {
    /// Fixed calibration constant.
    Fixed(f32),
    /// Derived from the camera FoV: half the focal length, which makes a
    /// wall one cell high and one cell away exactly `focal` pixels tall.
    FromFov,
}

bitflags! {
    /// Diagnostic layers painted on top of the 3-D view.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Overlay: u8 {
        /// Top-down grid in the upper-left corner.
        const MINIMAP = 0x01;
        /// Ray fan from the viewer to every hit point (drawn on the minimap).
        const RAYS    = 0x02;
    }
}

/// Knobs for [`Software`]. `Default` reproduces the classic look:
/// black background, 277 px projection plane, no overlays.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderSettings {
    pub background: Background,
    pub projection: ProjectionPlane,
    /// Halve the brightness of walls hit on horizontal grid lines.
    pub shade_sides: bool,
    /// Colour for columns whose ray left the map.
    pub void_colour: Rgba,
    pub overlay: Overlay,
    /// Edge length of the minimap square, in pixels.
    pub minimap_size: usize,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            background: Background::Solid(0x00_000000),
            projection: ProjectionPlane::Fixed(277.0),
            shade_sides: false,
            void_colour: 0x00_202020,
            overlay: Overlay::empty(),
            minimap_size: 200,
        }
    }
}

pub mod software;

pub use software::{FrameView, Software};
