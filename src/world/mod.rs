mod camera;
mod grid;
mod hit;
mod ray;
mod texture;

pub use camera::Camera;

pub use grid::{Cell, GridError, GridMap, TraceError, WALL_GREY};

pub use hit::{Hit, Side};

pub use ray::{InverseDirection, Ray, normalize_radians};

pub use texture::{Texture, TextureAtlas, TextureError, TextureId, TextureStore};
