use glam::Vec2;

use super::ray::{Ray, normalize_radians};

/// Viewer pose in map space.
///
/// * Owned by the caller (input handling mutates it between frames).
/// * The renderer only reads it while a frame is being drawn.
#[derive(Clone, Copy, Debug)]
pub struct Camera {
    pos: Vec2, // map units
    yaw: f32,  // radians (0 = east, counter-clockwise), kept in [0, 2π)
    fov: f32,  // horizontal FoV (radians, typical 60°)
}

impl Camera {
    /// Create a new camera at `pos`, facing `yaw`, with horizontal FoV `fov`.
    pub fn new(pos: Vec2, yaw: f32, fov: f32) -> Self {
        Self {
            pos,
            yaw: normalize_radians(yaw),
            fov,
        }
    }

    #[inline]
    pub fn pos(&self) -> Vec2 {
        self.pos
    }

    pub fn set_pos(&mut self, pos: Vec2) {
        self.pos = pos;
    }

    #[inline]
    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    #[inline]
    pub fn fov(&self) -> f32 {
        self.fov
    }

    /// Central viewing ray: origin at the eye, angle = yaw.
    #[inline]
    pub fn ray(&self) -> Ray {
        Ray::new(self.pos, self.yaw)
    }

    /*──────────────────────── derived vectors ───────────────────────*/

    /// Unit vector pointing where the camera looks.
    #[inline(always)]
    pub fn forward(self) -> Vec2 {
        let (s, c) = self.yaw.sin_cos();
        Vec2::new(c, s)
    }

    /// Unit vector perpendicular to `forward` (rotated +90°).
    #[inline(always)]
    pub fn right(self) -> Vec2 {
        self.forward().perp()
    }

    /*──────────────────────── movement helpers ──────────────────────*/

    /// Position after moving `forward` units and `side` (strafe) units.
    /// Does not move the camera; callers decide whether the spot is free.
    pub fn stepped(&self, forward: f32, side: f32) -> Vec2 {
        self.pos + self.forward() * forward + self.right() * side
    }

    pub fn step(&mut self, forward: f32, side: f32) {
        self.pos = self.stepped(forward, side);
    }

    /// Rotate around Z-axis (positive = counter-clockwise).
    pub fn turn(&mut self, delta_yaw: f32) {
        self.yaw = normalize_radians(self.yaw + delta_yaw);
    }

    pub fn turn_degrees(&mut self, delta: f32) {
        self.turn(delta.to_radians());
    }

    /*───────────────── projection helpers ─────────────────*/

    /// Pixel-per-map-unit scale for viewport width `w`.
    ///
    /// ```text
    /// focal = w / (2 * tan(fov/2))
    /// ```
    #[inline]
    pub fn screen_scale(self, w: usize) -> f32 {
        (w as f32) * 0.5 / (self.fov * 0.5).tan()
    }
}

/*====================================================================*/
/*                                Tests                                */
/*====================================================================*/
