//! Render a single frame headless and save it as PNG.
//!
//! ```bash
//! cargo run --bin snapshot -- assets/maps/10x10map.txt --out frame.png --heading 45
//! ```

use std::path::PathBuf;

use anyhow::{Context, anyhow};
use clap::Parser;
use glam::Vec2;
use image::RgbImage;
use tracing::info;
use tracing_subscriber::EnvFilter;

use gridcaster::{
    map::{AtlasSource, load_map},
    renderer::{Background, Overlay, ProjectionPlane, RenderSettings, Software},
    world::{Camera, TextureStore},
};

/// CLI options handled via `clap` derive.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Opts {
    #[arg(value_name = "MAP")]
    map: PathBuf,

    /// PNG written with the rendered frame
    #[arg(long, value_name = "FILE", default_value = "frame.png")]
    out: PathBuf,

    #[arg(long, value_name = "FILE")]
    texture: Option<PathBuf>,

    #[arg(long, default_value_t = 64)]
    tile: usize,

    #[arg(long, default_value_t = 64)]
    cell_size: u32,

    #[arg(long, default_value_t = 640)]
    width: usize,

    #[arg(long, default_value_t = 640)]
    height: usize,

    #[arg(long, default_value_t = 60.0)]
    fov: f32,

    #[arg(long, num_args = 2, value_names = ["X", "Y"], default_values_t = [200.0, 200.0])]
    start: Vec<f32>,

    #[arg(long, default_value_t = 0.0)]
    heading: f32,

    /// Derive the projection plane from the FoV instead of the 277 px constant
    #[arg(long)]
    fov_plane: bool,

    /// Grey ceiling and dark floor instead of black
    #[arg(long)]
    split_background: bool,

    /// Darken walls facing north/south
    #[arg(long)]
    shade_sides: bool,

    #[arg(long)]
    minimap: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let opts = Opts::parse();

    let mut store = TextureStore::new();
    let atlas = opts.texture.as_deref().map(|path| AtlasSource {
        path,
        stride: opts.tile,
    });
    let map = load_map(&opts.map, opts.cell_size, atlas, &mut store)
        .with_context(|| format!("loading {}", opts.map.display()))?;

    let camera = Camera::new(
        Vec2::new(opts.start[0], opts.start[1]),
        opts.heading.to_radians(),
        opts.fov.to_radians(),
    );

    let mut settings = RenderSettings {
        shade_sides: opts.shade_sides,
        ..RenderSettings::default()
    };
    if opts.fov_plane {
        settings.projection = ProjectionPlane::FromFov;
    }
    if opts.split_background {
        settings.background = Background::Split {
            ceiling: 0x00_383838,
            floor: 0x00_707070,
        };
    }
    if opts.minimap {
        settings.overlay = Overlay::MINIMAP | Overlay::RAYS;
    }

    let mut renderer = Software::new(opts.width, opts.height, settings);
    let frame = renderer.render_frame(&camera, &map);

    let img = RgbImage::from_raw(
        frame.width() as u32,
        frame.height() as u32,
        frame.to_rgb_bytes(),
    )
    .ok_or_else(|| anyhow!("frame buffer does not match {}×{}", frame.width(), frame.height()))?;
    img.save(&opts.out)
        .with_context(|| format!("writing {}", opts.out.display()))?;

    info!(path = %opts.out.display(), "frame written");
    Ok(())
}
