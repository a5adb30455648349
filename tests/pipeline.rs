use std::collections::HashSet;
use std::f32::consts::FRAC_PI_3;
use std::path::{Path, PathBuf};

use glam::Vec2;

use gridcaster::{
    map::{AtlasSource, LoadError, MapError, grid_from_str, load_map},
    renderer::{Overlay, RenderSettings, Software},
    world::{Camera, Cell, GridMap, Ray, TextureAtlas, TextureStore, WALL_GREY},
};

fn asset(dir: &str, file: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("assets")
        .join(dir)
        .join(file)
}

fn sample_map() -> PathBuf {
    asset("maps", "10x10map.txt")
}

fn load_sample() -> GridMap {
    let mut store = TextureStore::new();
    load_map(sample_map(), 64, None, &mut store).unwrap()
}

#[test]
fn sample_map_loads_enclosed() {
    let map = load_sample();
    assert_eq!(map.size().x, 10);
    assert_eq!(map.size().y, 10);
    assert!(map.is_walkable(Vec2::new(200.0, 200.0)));
}

#[test]
fn every_ray_from_every_open_cell_terminates_on_a_wall() {
    let map = load_sample();
    let cs = map.cell_size() as f32;
    let open: Vec<Vec2> = map
        .iter()
        .filter(|(_, c)| !c.is_solid())
        .map(|(t, _)| (t.as_vec2() + 0.37) * cs)
        .collect();

    for origin in open {
        let viewer = Ray::new(origin, 0.0);
        for hit in map.ray_casting(90, std::f32::consts::TAU, viewer) {
            let hit = hit.unwrap();
            assert_eq!(hit.cell, Some(Cell::Wall(WALL_GREY)));
            assert!(hit.distance > 0.0);
            assert!(hit.distance < 10.0 * cs * std::f32::consts::SQRT_2);
        }
    }
}

#[test]
fn frames_are_deterministic() {
    let map = load_sample();
    let cam = Camera::new(Vec2::new(200.0, 200.0), 0.4, FRAC_PI_3);
    let mut a = Software::new(160, 120, RenderSettings::default());
    let mut b = Software::new(160, 120, RenderSettings::default());
    let fa = a.render_frame(&cam, &map).pixels().to_vec();
    let fb = b.render_frame(&cam, &map).pixels().to_vec();
    assert_eq!(fa, fb);

    // rendering the same pose again on the same renderer gives the same frame
    let again = a.render_frame(&cam, &map).pixels().to_vec();
    assert_eq!(fa, again);
}

#[test]
fn every_column_of_an_enclosed_view_shows_wall() {
    let map = load_sample();
    let cam = Camera::new(Vec2::new(200.0, 200.0), 1.0, FRAC_PI_3);
    let mut sw = Software::new(120, 90, RenderSettings::default());
    let frame = sw.render_frame(&cam, &map);
    for x in 0..frame.width() {
        assert_eq!(frame.pixel(x, frame.height() / 2), WALL_GREY, "column {x}");
    }
    assert_eq!(sw.last_spans().len(), 120);
}

#[test]
fn minimap_overlay_does_not_touch_the_far_corner() {
    let map = load_sample();
    let cam = Camera::new(Vec2::new(200.0, 200.0), 0.0, FRAC_PI_3);
    let plain = Software::new(300, 300, RenderSettings::default())
        .render_frame(&cam, &map)
        .pixels()
        .to_vec();

    let settings = RenderSettings {
        overlay: Overlay::MINIMAP | Overlay::RAYS,
        ..RenderSettings::default()
    };
    let mut sw = Software::new(300, 300, settings);
    let frame = sw.render_frame(&cam, &map);
    assert_ne!(frame.pixels(), &plain[..]);
    assert_eq!(frame.pixel(299, 299), plain[299 * 300 + 299]);
}

#[test]
fn textured_map_draws_from_the_shipped_atlas() {
    let walls = asset("textures", "walls.png");
    let mut store = TextureStore::new();
    let source = AtlasSource {
        path: &walls,
        stride: 64,
    };
    let map = load_map(asset("maps", "textured.txt"), 64, Some(source), &mut store).unwrap();
    let atlas = map.atlas().unwrap();
    assert_eq!(atlas.len(), 4);
    assert!(map.iter().any(|(_, c)| c == Cell::Textured(3)));

    let texels: HashSet<u32> = atlas.iter().flat_map(|t| t.pixels.iter().copied()).collect();
    let cam = Camera::new(Vec2::new(200.0, 200.0), 0.7, FRAC_PI_3);
    let mut sw = Software::new(120, 90, RenderSettings::default());
    let frame = sw.render_frame(&cam, &map);
    for x in 0..frame.width() {
        let p = frame.pixel(x, frame.height() / 2);
        assert!(texels.contains(&p), "column {x}: {p:06x} not from the atlas");
    }
}

#[test]
fn bad_assets_refuse_to_start() {
    let err = grid_from_str("### \n#  #\n#  #\n####", 64, None).unwrap_err();
    assert!(matches!(err, LoadError::Map(MapError::Unenclosed { .. })));

    let err = grid_from_str("####\n#  #\n# ##\n###", 64, None).unwrap_err();
    assert!(matches!(err, LoadError::Map(MapError::Ragged { .. })));

    let atlas = TextureAtlas::new(vec![Default::default()]);
    let err = grid_from_str("000\n0 1\n000", 64, Some(atlas)).unwrap_err();
    assert!(matches!(err, LoadError::Grid(_)));
}
