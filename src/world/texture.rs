// Format-agnostic texture storage: single images, the atlas sliced from
// them, and a caller-owned store that decodes each file once.
// The renderer and grid interact through `TextureId` only.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::renderer::Rgba;

/// Index of a tile inside a [`TextureAtlas`].
pub type TextureId = u16;

/// CPU-side image: **0x00RRGGBB** texels in row-major order
/// (`pixels[y * w + x]`).
#[derive(Clone, Debug, PartialEq)]
pub struct Texture {
    pub w: usize,
    pub h: usize,
    pub pixels: Vec<Rgba>,
}

/// Convenience checkerboard 8×8 (dark/light grey).
impl Default for Texture {
    fn default() -> Self {
        const LIGHT: Rgba = 0x00_A0A0A0;
        const DARK: Rgba = 0x00_505050;
        let mut pixels = vec![0; 8 * 8];
        for y in 0..8 {
            for x in 0..8 {
                pixels[y * 8 + x] = if (x ^ y) & 1 == 0 { LIGHT } else { DARK };
            }
        }
        Texture { w: 8, h: 8, pixels }
    }
}

/// Things that can go wrong while building or querying textures.
#[derive(Debug, thiserror::Error)]
pub enum TextureError {
    #[error("cannot decode image: {0}")]
    Image(#[from] image::ImageError),

    /// Pixel slice length does not match `w * h * 4`.
    #[error("pixel data holds {found} bytes, {w}×{h} RGBA needs {expected}")]
    BadPixelData {
        w: usize,
        h: usize,
        expected: usize,
        found: usize,
    },

    /// Tile stride of 0 or larger than the source image.
    #[error("atlas stride {stride} does not fit a {w}×{h} image")]
    BadStride { stride: usize, w: usize, h: usize },

    /// Zero width or height; nothing to sample.
    #[error("texture is empty ({w}×{h})")]
    Empty { w: usize, h: usize },

    /// Requested ID is outside `0 .. atlas.len()`.
    #[error("texture id {0} out of range")]
    BadId(TextureId),
}

impl Texture {
    /// Pack raw RGBA8 bytes (alpha dropped).
    pub fn from_rgba8(w: usize, h: usize, bytes: &[u8]) -> Result<Self, TextureError> {
        if w == 0 || h == 0 {
            return Err(TextureError::Empty { w, h });
        }
        let expected = w * h * 4;
        if bytes.len() != expected {
            return Err(TextureError::BadPixelData {
                w,
                h,
                expected,
                found: bytes.len(),
            });
        }
        let pixels = bytes
            .chunks_exact(4)
            .map(|p| (p[0] as u32) << 16 | (p[1] as u32) << 8 | p[2] as u32)
            .collect();
        Ok(Self { w, h, pixels })
    }

    /// Decode any image format enabled in the `image` crate.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, TextureError> {
        let img = image::open(path)?.to_rgba8();
        let (w, h) = img.dimensions();
        Self::from_rgba8(w as usize, h as usize, img.as_raw())
    }

    /// True when there is no texel to sample.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.w == 0 || self.h == 0 || self.pixels.len() < self.w * self.h
    }

    #[inline]
    pub fn texel(&self, x: usize, y: usize) -> Rgba {
        self.pixels[y * self.w + x]
    }

    /// Copy the `w × h` rectangle whose top-left corner is `(x, y)`,
    /// truncated to the image bounds.
    pub fn slice(&self, x: usize, y: usize, w: usize, h: usize) -> Texture {
        let x1 = (x + w).min(self.w);
        let y1 = (y + h).min(self.h);
        let x0 = x.min(x1);
        let y0 = y.min(y1);
        let mut pixels = Vec::with_capacity((x1 - x0) * (y1 - y0));
        for row in y0..y1 {
            pixels.extend_from_slice(&self.pixels[row * self.w + x0..row * self.w + x1]);
        }
        Texture {
            w: x1 - x0,
            h: y1 - y0,
            pixels,
        }
    }

    /// Cut the image into `stride × stride` tiles, top row left-to-right
    /// first. Partial tiles on the right and bottom edges are dropped.
    pub fn to_atlas(&self, stride: usize) -> Result<TextureAtlas, TextureError> {
        if stride == 0 || stride > self.w || stride > self.h {
            return Err(TextureError::BadStride {
                stride,
                w: self.w,
                h: self.h,
            });
        }
        let cols = self.w / stride;
        let rows = self.h / stride;
        let mut textures = Vec::with_capacity(cols * rows);
        for ty in 0..rows {
            for tx in 0..cols {
                textures.push(self.slice(tx * stride, ty * stride, stride, stride));
            }
        }
        debug!(stride, tiles = textures.len(), "sliced texture atlas");
        Ok(TextureAtlas { textures })
    }

    /// Texel of source column `u` shown at row `y` of a column stretched to
    /// `column_height` pixels. Nearest neighbour: row `y * h / column_height`.
    /// `None` for an empty texture; `u` past the right edge clamps.
    #[inline]
    pub fn column_texel(&self, u: usize, y: usize, column_height: usize) -> Option<Rgba> {
        if self.is_empty() {
            return None;
        }
        let row = (y * self.h) / column_height.max(1);
        Some(self.texel(u.min(self.w - 1), row.min(self.h - 1)))
    }

    /// Resample column `u` to exactly `column_height` pixels.
    pub fn scaled_column(&self, u: usize, column_height: usize) -> Option<Vec<Rgba>> {
        (0..column_height)
            .map(|y| self.column_texel(u, y, column_height))
            .collect()
    }
}

/// Ordered tiles addressed by [`TextureId`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TextureAtlas {
    textures: Vec<Texture>,
}

impl TextureAtlas {
    pub fn new(textures: Vec<Texture>) -> Self {
        Self { textures }
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }

    /// Borrow a texture by id, with bounds-checking.
    pub fn texture(&self, id: TextureId) -> Result<&Texture, TextureError> {
        self.textures.get(id as usize).ok_or(TextureError::BadId(id))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Texture> {
        self.textures.iter()
    }
}

/// Path-keyed cache of decoded images.
///
/// Owned by whoever loads assets; nothing global. Each path is decoded once.
#[derive(Default)]
pub struct TextureStore {
    by_path: HashMap<PathBuf, Texture>,
}

impl TextureStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.by_path.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_path.is_empty()
    }

    pub fn get<P: AsRef<Path>>(&self, path: P) -> Option<&Texture> {
        self.by_path.get(path.as_ref())
    }

    /// Decode `path` on first use, return the cached copy afterwards.
    pub fn load<P: AsRef<Path>>(&mut self, path: P) -> Result<&Texture, TextureError> {
        let path = path.as_ref();
        if !self.by_path.contains_key(path) {
            let tex = Texture::from_file(path)?;
            debug!(path = %path.display(), w = tex.w, h = tex.h, "decoded texture");
            self.by_path.insert(path.to_path_buf(), tex);
        }
        Ok(&self.by_path[path])
    }
}

/*======================================================================*/
/*                               Tests                                  */
/*======================================================================*/
#[cfg(test)]
mod tests {
    use super::*;

    /// `w × h` image whose texel encodes its own coordinates.
    fn coord_tex(w: usize, h: usize) -> Texture {
        let pixels = (0..h)
            .flat_map(|y| (0..w).map(move |x| ((x as u32) << 8) | y as u32))
            .collect();
        Texture { w, h, pixels }
    }

    #[test]
    fn atlas_64_at_32_is_four_tiles_row_major() {
        let atlas = coord_tex(64, 64).to_atlas(32).unwrap();
        assert_eq!(atlas.len(), 4);
        for (id, origin) in [(0, (0, 0)), (1, (32, 0)), (2, (0, 32)), (3, (32, 32))] {
            let t = atlas.texture(id).unwrap();
            assert_eq!((t.w, t.h), (32, 32));
            assert_eq!(t.texel(0, 0), ((origin.0 as u32) << 8) | origin.1 as u32);
        }
    }

    #[test]
    fn partial_edge_tiles_are_dropped() {
        let atlas = coord_tex(70, 40).to_atlas(32).unwrap();
        assert_eq!(atlas.len(), 2);
    }

    #[test]
    fn bad_stride_rejected() {
        let tex = coord_tex(16, 16);
        assert!(matches!(tex.to_atlas(0), Err(TextureError::BadStride { .. })));
        assert!(matches!(tex.to_atlas(32), Err(TextureError::BadStride { .. })));
    }

    #[test]
    fn bad_id_guard() {
        let atlas = coord_tex(8, 8).to_atlas(8).unwrap();
        let bad = TextureId::MAX;
        assert!(matches!(atlas.texture(bad), Err(TextureError::BadId(id)) if id == bad));
    }

    #[test]
    fn resample_to_source_height_is_identity() {
        let tex = coord_tex(4, 8);
        let original: Vec<Rgba> = (0..8).map(|y| tex.texel(2, y)).collect();
        assert_eq!(tex.scaled_column(2, 8), Some(original));
    }

    #[test]
    fn resample_is_nearest_neighbour() {
        let tex = coord_tex(1, 4);
        // stretch 4 → 8: every source row doubles
        let up = tex.scaled_column(0, 8).unwrap();
        assert_eq!(up, vec![0, 0, 1, 1, 2, 2, 3, 3]);
        // squeeze 4 → 2: rows 0 and 2
        assert_eq!(tex.scaled_column(0, 2).unwrap(), vec![0, 2]);
        // golden: 4 → 3 picks floor(y * 4 / 3) = 0, 1, 2
        assert_eq!(tex.scaled_column(0, 3).unwrap(), vec![0, 1, 2]);
        assert_eq!(tex.scaled_column(0, 0).unwrap(), Vec::<Rgba>::new());
    }

    #[test]
    fn empty_texture_is_rejected_and_never_sampled() {
        assert!(matches!(
            Texture::from_rgba8(0, 0, &[]),
            Err(TextureError::Empty { w: 0, h: 0 })
        ));
        assert!(matches!(
            Texture::from_rgba8(3, 0, &[]),
            Err(TextureError::Empty { .. })
        ));

        let empty = Texture {
            w: 0,
            h: 0,
            pixels: Vec::new(),
        };
        assert!(empty.is_empty());
        assert_eq!(empty.column_texel(0, 5, 10), None);
        assert_eq!(empty.scaled_column(0, 4), None);
        assert!(!Texture::default().is_empty());
    }

    #[test]
    fn rgba8_packing_drops_alpha() {
        let tex = Texture::from_rgba8(1, 1, &[0x12, 0x34, 0x56, 0x78]).unwrap();
        assert_eq!(tex.pixels, vec![0x00_123456]);
        assert!(matches!(
            Texture::from_rgba8(2, 2, &[0; 4]),
            Err(TextureError::BadPixelData { expected: 16, .. })
        ));
    }

    #[test]
    fn checker_default_alternates() {
        let tex = Texture::default();
        assert_ne!(tex.texel(0, 0), tex.texel(1, 0));
        assert_eq!(tex.texel(0, 0), tex.texel(1, 1));
    }

    #[test]
    fn store_decodes_once_and_caches() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("walls.png");
        let img = image::RgbaImage::from_fn(4, 2, |x, y| image::Rgba([x as u8, y as u8, 7, 255]));
        img.save(&path).unwrap();

        let mut store = TextureStore::new();
        let tex = store.load(&path).unwrap();
        assert_eq!((tex.w, tex.h), (4, 2));
        assert_eq!(tex.texel(3, 1), 0x00_030107);

        // second load hits the cache even after the file is gone
        std::fs::remove_file(&path).unwrap();
        assert!(store.load(&path).is_ok());
        assert_eq!(store.len(), 1);
        assert!(store.get(&path).is_some());
    }

    #[test]
    fn store_reports_missing_file() {
        let mut store = TextureStore::new();
        assert!(matches!(
            store.load("/definitely/not/here.png"),
            Err(TextureError::Image(_))
        ));
        assert!(store.is_empty());
    }
}
