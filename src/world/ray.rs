use glam::Vec2;
use std::f32::consts::TAU;

/// Direction components at or below this magnitude are treated as parallel
/// to the grid axis: the slab test skips that axis instead of dividing by ~0.
pub const PARALLEL_EPSILON: f32 = f32::EPSILON;

/// Directed half-line in map space.
///
/// * `angle` is in radians, 0 = east (+X), counter-clockwise positive.
/// * `angle` is kept in `[0, 2π)` by every constructor and mutator.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    pub origin: Vec2,
    angle: f32,
}

/// Per-axis reciprocal of a ray direction.
///
/// `None` means the ray runs parallel to that axis, so the axis puts no
/// bound on how far the ray may travel inside a cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InverseDirection {
    pub x: Option<f32>,
    pub y: Option<f32>,
}

impl Ray {
    pub fn new(origin: Vec2, angle: f32) -> Self {
        Self {
            origin,
            angle: normalize_radians(angle),
        }
    }

    #[inline]
    pub fn angle(&self) -> f32 {
        self.angle
    }

    pub fn set_angle(&mut self, radians: f32) {
        self.angle = normalize_radians(radians);
    }

    /// Unit vector along the ray.
    #[inline]
    pub fn direction(&self) -> Vec2 {
        let (s, c) = self.angle.sin_cos();
        Vec2::new(c, s)
    }

    #[inline]
    pub fn inverse_direction(&self) -> InverseDirection {
        let d = self.direction();
        InverseDirection {
            x: reciprocal(d.x),
            y: reciprocal(d.y),
        }
    }

    /// Point reached after travelling `t` units along the ray.
    #[inline]
    pub fn at(&self, t: f32) -> Vec2 {
        self.origin + t * self.direction()
    }

    /*──────────────────────── degree helpers ────────────────────────*/

    pub fn angle_degrees(&self) -> f32 {
        self.angle.to_degrees()
    }

    /// Wraps into `[0, 360)`: 400 → 40, -10 → 350, 360 → 0.
    pub fn set_angle_degrees(&mut self, degrees: f32) {
        self.angle = normalize_radians(degrees.rem_euclid(360.0).to_radians());
    }

    pub fn rotate_degrees(&mut self, delta: f32) {
        self.set_angle_degrees(self.angle_degrees() + delta);
    }
}

#[inline]
fn reciprocal(component: f32) -> Option<f32> {
    (component.abs() > PARALLEL_EPSILON).then(|| component.recip())
}

/// Map any finite angle into `[0, 2π)`.
#[inline]
pub fn normalize_radians(radians: f32) -> f32 {
    let a = radians.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if a >= TAU { 0.0 } else { a }
}
