mod loader;
mod text;

pub use loader::{AtlasSource, LoadError, grid_from_str, load_atlas, load_map};
pub use text::{MapError, cell_from_char, parse_map};
