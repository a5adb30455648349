//! Grid raycaster: tile map in, first-person column view out.
//!
//! * [`world`]    – rays, the tile grid and its traversal, textures.
//! * [`map`]      – text map parsing and file loading.
//! * [`renderer`] – turns a fan of hits into a double-buffered frame.

pub mod map;
pub mod renderer;
pub mod world;
