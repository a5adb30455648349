// ──────────────────────────────────────────────────────────────────────────
// map/loader.rs
//
//  *   map text file        (map::text)          ──╮
//  *   texture image + stride (TextureStore)        │   --->  world::GridMap
//                                                   ╯
// Everything that can be wrong with the assets fails here, before the
// first frame is drawn.
// ──────────────────────────────────────────────────────────────────────────

use std::{fs, io, path::Path};

use thiserror::Error;
use tracing::info;

use crate::{
    map::text::{MapError, parse_map},
    world::{GridError, GridMap, TextureAtlas, TextureError, TextureStore},
};

/*──────────────────────────── Error type ───────────────────────────*/

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("cannot read map file: {0}")]
    Io(#[from] io::Error),

    #[error(transparent)]
    Map(#[from] MapError),

    #[error(transparent)]
    Grid(#[from] GridError),

    #[error(transparent)]
    Texture(#[from] TextureError),
}

/// Where the wall textures come from: one image cut into square tiles.
#[derive(Clone, Copy, Debug)]
pub struct AtlasSource<'a> {
    pub path: &'a Path,
    pub stride: usize,
}

/*====================================================================*/
/*                       Public API                                   */
/*====================================================================*/

/// Parse map text and build a grid with `cell_size`-unit cells.
pub fn grid_from_str(
    text: &str,
    cell_size: u32,
    atlas: Option<TextureAtlas>,
) -> Result<GridMap, LoadError> {
    let rows = parse_map(text)?;
    Ok(GridMap::from_rows(rows, cell_size, atlas)?)
}

/// Build the atlas described by `source`, decoding through `store`.
pub fn load_atlas(
    store: &mut TextureStore,
    source: AtlasSource<'_>,
) -> Result<TextureAtlas, LoadError> {
    let image = store.load(source.path)?;
    Ok(image.to_atlas(source.stride)?)
}

/// Load the map file at `path`, optionally with a texture atlas.
pub fn load_map<P: AsRef<Path>>(
    path: P,
    cell_size: u32,
    atlas: Option<AtlasSource<'_>>,
    store: &mut TextureStore,
) -> Result<GridMap, LoadError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)?;

    let atlas = atlas.map(|src| load_atlas(store, src)).transpose()?;
    let grid = grid_from_str(&text, cell_size, atlas)?;

    info!(
        path = %path.display(),
        w = grid.size().x,
        h = grid.size().y,
        "map loaded"
    );
    Ok(grid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::Cell;
    use std::io::Write;

    fn write_map(text: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(text.as_bytes()).unwrap();
        f
    }

    fn write_atlas_png(dir: &Path, w: u32, h: u32) -> std::path::PathBuf {
        let path = dir.join("atlas.png");
        image::RgbaImage::from_pixel(w, h, image::Rgba([200, 100, 50, 255]))
            .save(&path)
            .unwrap();
        path
    }

    #[test]
    fn loads_flat_map_from_file() {
        let f = write_map("#####\n#   #\n# # #\n#####\n");
        let mut store = TextureStore::new();
        let grid = load_map(f.path(), 64, None, &mut store).unwrap();
        assert_eq!(grid.size().x, 5);
        assert_eq!(grid.size().y, 4);
        assert!(grid.get(2, 2).is_some_and(Cell::is_solid));
        assert!(store.is_empty());
    }

    #[test]
    fn loads_textured_map_with_atlas() {
        let dir = tempfile::tempdir().unwrap();
        let png = write_atlas_png(dir.path(), 64, 64);
        let f = write_map("0123\n3  2\n1  0\n3210\n");

        let mut store = TextureStore::new();
        let source = AtlasSource {
            path: &png,
            stride: 32,
        };
        let grid = load_map(f.path(), 64, Some(source), &mut store).unwrap();
        assert_eq!(grid.atlas().map(TextureAtlas::len), Some(4));
        assert_eq!(grid.get(3, 0), Some(Cell::Textured(3)));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn texture_id_beyond_atlas_fails_at_load() {
        let dir = tempfile::tempdir().unwrap();
        let png = write_atlas_png(dir.path(), 64, 64);
        let f = write_map("0000\n0  9\n0000\n");

        let mut store = TextureStore::new();
        let source = AtlasSource {
            path: &png,
            stride: 32,
        };
        let err = load_map(f.path(), 64, Some(source), &mut store).unwrap_err();
        assert!(matches!(
            err,
            LoadError::Grid(GridError::TextureOutOfRange {
                id: 9,
                available: 4,
                ..
            })
        ));
    }

    #[test]
    fn textured_map_without_atlas_fails() {
        let err = grid_from_str("111\n1 1\n111", 64, None).unwrap_err();
        assert!(matches!(
            err,
            LoadError::Grid(GridError::TextureOutOfRange { available: 0, .. })
        ));
    }

    #[test]
    fn malformed_text_surfaces_map_error() {
        let err = grid_from_str("### \n#  #\n#  #\n####", 64, None).unwrap_err();
        assert!(matches!(err, LoadError::Map(MapError::Unenclosed { .. })));
    }

    #[test]
    fn missing_file_is_io_error() {
        let mut store = TextureStore::new();
        let err = load_map("/no/such/map.txt", 64, None, &mut store).unwrap_err();
        assert!(matches!(err, LoadError::Io(_)));
    }
}
