//! First-person grid viewer (software renderer).
//!
//! Controls  W/S = forward/back  A/D/←/→ = turn  mouse = look
//!           M = toggle minimap  Esc = quit
//!
//! ```bash
//! cargo run --release -- assets/maps/10x10map.txt
//! cargo run --release -- assets/maps/textured.txt --texture assets/textures/walls.png
//! ```

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::Parser;
use glam::Vec2;
use minifb::{Key, KeyRepeat, MouseMode, Window, WindowOptions};
use tracing::info;
use tracing_subscriber::EnvFilter;

use gridcaster::{
    map::{AtlasSource, load_map},
    renderer::{Overlay, RenderSettings, Software},
    world::{Camera, TextureStore},
};

/// CLI options handled via `clap` derive.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Opts {
    /// Text map: ' ' empty, '#' wall, '0'-'9' textured wall
    #[arg(value_name = "MAP")]
    map: PathBuf,

    /// Image sliced into the wall texture atlas
    #[arg(long, value_name = "FILE")]
    texture: Option<PathBuf>,

    /// Atlas tile edge in pixels
    #[arg(long, default_value_t = 64)]
    tile: usize,

    /// Map units per grid cell
    #[arg(long, default_value_t = 64)]
    cell_size: u32,

    #[arg(long, default_value_t = 640)]
    width: usize,

    #[arg(long, default_value_t = 640)]
    height: usize,

    /// Horizontal field of view in degrees
    #[arg(long, default_value_t = 60.0)]
    fov: f32,

    /// Start position in map units
    #[arg(long, num_args = 2, value_names = ["X", "Y"], default_values_t = [200.0, 200.0])]
    start: Vec<f32>,

    /// Start heading in degrees (0 = east)
    #[arg(long, default_value_t = 0.0)]
    heading: f32,

    /// Map units per frame when walking
    #[arg(long, default_value_t = 2.0)]
    speed: f32,

    /// Show the minimap with the ray fan from the start
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

    let mut camera = Camera::new(
        Vec2::new(opts.start[0], opts.start[1]),
        opts.heading.to_radians(),
        opts.fov.to_radians(),
    );

    let mut settings = RenderSettings::default();
    if opts.minimap {
        settings.overlay = Overlay::MINIMAP | Overlay::RAYS;
    }
    let mut renderer = Software::new(opts.width, opts.height, settings);

    let mut win = Window::new(
        "gridcaster - software",
        opts.width,
        opts.height,
        WindowOptions::default(),
    )?;
    win.set_target_fps(60);

    // ────────────────── benchmarking state ──────────────────────────────
    let mut acc_time = Duration::ZERO; // cumulated render time
    let mut acc_frames = 0usize; // frames in the current window
    let mut last_print = Instant::now(); // when we logged last

    let mut last_mouse_x: Option<f32> = None;

    while win.is_open() && !win.is_key_down(Key::Escape) {
        /* turning ---------------------------------------------------------- */
        if win.is_key_down(Key::A) || win.is_key_down(Key::Left) {
            camera.turn_degrees(-1.0);
        }
        if win.is_key_down(Key::D) || win.is_key_down(Key::Right) {
            camera.turn_degrees(1.0);
        }
        if let Some((mx, _)) = win.get_mouse_pos(MouseMode::Pass) {
            if let Some(prev) = last_mouse_x {
                camera.turn_degrees(mx - prev);
            }
            last_mouse_x = Some(mx);
        }

        /* walking: only onto empty cells ------------------------------------ */
        let mut forward = 0.0;
        if win.is_key_down(Key::W) || win.is_key_down(Key::Up) {
            forward += opts.speed;
        }
        if win.is_key_down(Key::S) || win.is_key_down(Key::Down) {
            forward -= opts.speed;
        }
        if forward != 0.0 {
            let next = camera.stepped(forward, 0.0);
            if map.is_walkable(next) {
                camera.set_pos(next);
            }
        }

        if win.is_key_pressed(Key::M, KeyRepeat::No) {
            let overlay = &mut renderer.settings_mut().overlay;
            overlay.toggle(Overlay::MINIMAP | Overlay::RAYS);
        }

        /* draw */
        let t0 = Instant::now();
        renderer.render_frame(&camera, &map);
        acc_time += t0.elapsed();
        acc_frames += 1;

        let frame = renderer.front();
        win.update_with_buffer(frame.pixels(), frame.width(), frame.height())?;

        if last_print.elapsed() >= Duration::from_secs(3) {
            let avg_ms = acc_time.as_secs_f64() * 1000.0 / acc_frames as f64;
            let fps = 1000.0 / avg_ms;
            info!("avg render: {:.2} ms  ({:.1} FPS)", avg_ms, fps);
            win.set_title(&format!("gridcaster - software ({fps:.1} FPS)"));
            acc_time = Duration::ZERO;
            acc_frames = 0;
            last_print = Instant::now();
        }
    }
    Ok(())
}
