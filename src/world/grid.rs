//! Tile grid and the ray marcher that walks it.
//!
//! The grid is immutable while a frame renders; [`GridMap::ray_casting`]
//! borrows it shared, so one map can serve any number of fans.

use glam::{IVec2, UVec2, Vec2};
use thiserror::Error;
use tracing::info;

use super::hit::{Hit, Side};
use super::ray::{InverseDirection, Ray};
use super::texture::{TextureAtlas, TextureId};
use crate::renderer::Rgba;

/// Flat shade used for `#` walls.
pub const WALL_GREY: Rgba = 0x00_808080;

/// Cell contents, resolved once when the map is built.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Cell {
    #[default]
    Empty,
    /// Solid wall drawn with one flat colour.
    Wall(Rgba),
    /// Solid wall drawn with atlas tile `TextureId`.
    Textured(TextureId),
}

impl Cell {
    #[inline]
    pub fn is_solid(self) -> bool {
        !matches!(self, Cell::Empty)
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum GridError {
    #[error("cell ({x}, {y}) outside {w}×{h} grid")]
    OutOfBounds { x: i32, y: i32, w: u32, h: u32 },

    #[error("cell size must be positive")]
    BadCellSize,

    #[error("{found} cells given for a {w}×{h} grid")]
    SizeMismatch { w: u32, h: u32, found: usize },

    #[error("cell ({x}, {y}) uses texture {id}, atlas holds {available}")]
    TextureOutOfRange {
        x: u32,
        y: u32,
        id: TextureId,
        available: usize,
    },

    #[error("cell ({x}, {y}) uses texture {id}, which has no texels")]
    EmptyTexture { x: u32, y: u32, id: TextureId },
}

/// Per-frame failure of a single ray; the affected column is skipped.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceError {
    /// Direction has no usable component or the origin is not finite.
    #[error("ray direction or origin is degenerate")]
    DegenerateRay,

    /// More cell boundaries crossed than the grid can contain.
    #[error("ray crossed more than {0} cell boundaries")]
    StepLimit(u32),
}

/// Tile map: `w × h` cells of `cell_size` map units each, row-major.
#[derive(Clone, Debug)]
pub struct GridMap {
    size: UVec2,
    cell_size: u32,
    cells: Vec<Cell>,
    atlas: Option<TextureAtlas>,
}

impl GridMap {
    /// Build a grid from row-major `cells`.
    ///
    /// Every `Textured` cell is checked against `atlas` here, so a bad id is
    /// a load failure rather than a broken column later on.
    pub fn new(
        size: UVec2,
        cell_size: u32,
        cells: Vec<Cell>,
        atlas: Option<TextureAtlas>,
    ) -> Result<Self, GridError> {
        if cell_size == 0 {
            return Err(GridError::BadCellSize);
        }
        if cells.len() != size.x as usize * size.y as usize {
            return Err(GridError::SizeMismatch {
                w: size.x,
                h: size.y,
                found: cells.len(),
            });
        }
        let map = Self {
            size,
            cell_size,
            cells,
            atlas,
        };
        for (tile, cell) in map.iter() {
            map.check_texture(tile, cell)?;
        }
        info!(
            w = size.x,
            h = size.y,
            cell_size,
            textures = map.atlas.as_ref().map_or(0, TextureAtlas::len),
            "grid map ready"
        );
        Ok(map)
    }

    /// Build from a list of equally long rows.
    pub fn from_rows(
        rows: Vec<Vec<Cell>>,
        cell_size: u32,
        atlas: Option<TextureAtlas>,
    ) -> Result<Self, GridError> {
        let h = rows.len() as u32;
        let w = rows.first().map_or(0, Vec::len) as u32;
        let cells: Vec<Cell> = rows.into_iter().flatten().collect();
        Self::new(UVec2::new(w, h), cell_size, cells, atlas)
    }

    /*──────────────────────────── accessors ───────────────────────────*/

    #[inline]
    pub fn size(&self) -> UVec2 {
        self.size
    }

    #[inline]
    pub fn cell_size(&self) -> u32 {
        self.cell_size
    }

    pub fn atlas(&self) -> Option<&TextureAtlas> {
        self.atlas.as_ref()
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        let in_range = x >= 0 && y >= 0 && (x as u32) < self.size.x && (y as u32) < self.size.y;
        in_range.then(|| y as usize * self.size.x as usize + x as usize)
    }

    /// Cell at tile `(x, y)`; `None` outside the grid.
    #[inline]
    pub fn get(&self, x: i32, y: i32) -> Option<Cell> {
        self.index(x, y).map(|i| self.cells[i])
    }

    pub fn set(&mut self, x: i32, y: i32, cell: Cell) -> Result<(), GridError> {
        let i = self.index(x, y).ok_or(GridError::OutOfBounds {
            x,
            y,
            w: self.size.x,
            h: self.size.y,
        })?;
        self.check_texture(UVec2::new(x as u32, y as u32), cell)?;
        self.cells[i] = cell;
        Ok(())
    }

    fn check_texture(&self, tile: UVec2, cell: Cell) -> Result<(), GridError> {
        if let Cell::Textured(id) = cell {
            let available = self.atlas.as_ref().map_or(0, TextureAtlas::len);
            let Some(tex) = self.atlas.as_ref().and_then(|a| a.texture(id).ok()) else {
                return Err(GridError::TextureOutOfRange {
                    x: tile.x,
                    y: tile.y,
                    id,
                    available,
                });
            };
            if tex.is_empty() {
                return Err(GridError::EmptyTexture {
                    x: tile.x,
                    y: tile.y,
                    id,
                });
            }
        }
        Ok(())
    }

    /// Every `(tile, cell)` pair, row by row.
    pub fn iter(&self) -> impl Iterator<Item = (UVec2, Cell)> + '_ {
        let w = self.size.x.max(1);
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, &c)| (UVec2::new(i as u32 % w, i as u32 / w), c))
    }

    /// Map-space point → tile coordinates (`floor(p / cell_size)`).
    #[inline]
    pub fn to_tile(&self, p: Vec2) -> IVec2 {
        (p / self.cell_size as f32).floor().as_ivec2()
    }

    /// True when `p` lies inside the grid on an empty cell.
    pub fn is_walkable(&self, p: Vec2) -> bool {
        let t = self.to_tile(p);
        matches!(self.get(t.x, t.y), Some(Cell::Empty))
    }

    /*──────────────────────────── traversal ───────────────────────────*/

    /// Upper bound on cell boundaries a ray can cross before leaving the grid.
    #[inline]
    fn step_limit(&self) -> u32 {
        self.size.x + self.size.y + 2
    }

    /// March `ray` cell by cell until it enters a solid cell or leaves the
    /// grid.
    ///
    /// The hit point is placed exactly on the crossed boundary and the
    /// distance is measured from `ray.origin` to it. A ray that starts in a
    /// solid cell reports distance 0 at its origin.
    pub fn ray_travers(&self, ray: &Ray) -> Result<Hit, TraceError> {
        if !ray.origin.is_finite() {
            return Err(TraceError::DegenerateRay);
        }
        let dir = ray.direction();
        let inv = ray.inverse_direction();
        if inv.x.is_none() && inv.y.is_none() {
            return Err(TraceError::DegenerateRay);
        }

        let cs = self.cell_size as f32;
        let limit = self.step_limit();

        let mut tile = self.to_tile(ray.origin);
        let mut t_wall = 0.0;
        let mut side = Side::default();

        for _ in 0..=limit {
            let cell = self.get(tile.x, tile.y);
            if cell.is_none_or(Cell::is_solid) {
                return Ok(Hit {
                    distance: t_wall,
                    ray_angle: ray.angle(),
                    point: ray.at(t_wall),
                    tile,
                    side,
                    cell,
                });
            }

            let box_min = tile.as_vec2() * cs;
            let box_max = box_min + cs;
            let (t_exit, exit_side) = cell_exit(ray.origin, inv, box_min, box_max)
                .ok_or(TraceError::DegenerateRay)?;

            // advance by index so near-parallel rays still leave the cell
            match exit_side {
                Side::Vertical => tile.x += step_sign(dir.x),
                Side::Horizontal => tile.y += step_sign(dir.y),
            }
            t_wall = t_exit.max(t_wall);
            side = exit_side;
        }
        Err(TraceError::StepLimit(limit))
    }

    /// Cast one ray per screen column, sweeping `fov` across `width`
    /// columns centred on `viewer.angle()`. Left-to-right, lazily evaluated.
    pub fn ray_casting<'a>(
        &'a self,
        width: usize,
        fov: f32,
        viewer: Ray,
    ) -> impl Iterator<Item = Result<Hit, TraceError>> + 'a {
        let origin = viewer.origin;
        let start = viewer.angle() - fov * 0.5;
        let step = fov / width.max(1) as f32;
        (0..width).map(move |x| self.ray_travers(&Ray::new(origin, start + step * x as f32)))
    }
}

#[inline]
fn step_sign(d: f32) -> i32 {
    if d < 0.0 { -1 } else { 1 }
}

/// Slab test against one cell box: parametric distance (from `origin`) at
/// which the ray leaves the box, and the kind of boundary it leaves through.
///
/// Axes the ray runs parallel to constrain nothing. `None` only when both
/// axes are parallel.
fn cell_exit(
    origin: Vec2,
    inv: InverseDirection,
    box_min: Vec2,
    box_max: Vec2,
) -> Option<(f32, Side)> {
    let axis_exit = |inv: Option<f32>, o: f32, lo: f32, hi: f32| {
        inv.map(|r| {
            let t0 = r * (lo - o);
            let t1 = r * (hi - o);
            t0.max(t1)
        })
    };
    let tx = axis_exit(inv.x, origin.x, box_min.x, box_max.x);
    let ty = axis_exit(inv.y, origin.y, box_min.y, box_max.y);

    match (tx, ty) {
        (Some(tx), Some(ty)) if ty < tx => Some((ty, Side::Horizontal)),
        (Some(tx), _) => Some((tx, Side::Vertical)),
        (None, Some(ty)) => Some((ty, Side::Horizontal)),
        (None, None) => None,
    }
}

/*====================================================================*/
/*                                Tests                                */
/*====================================================================*/
