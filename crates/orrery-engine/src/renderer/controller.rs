//! Damped orbit camera controller.
//!
//! Drag rotates the camera around a fixed target, the wheel dollies it in and
//! out. Polar angle and distance are bounded; there is no panning. With
//! damping enabled, input accumulates into a spherical delta that bleeds off
//! over subsequent `update` calls, so the controller must be updated every
//! frame even while the simulation is paused.

use glam::{Vec2, Vec3};
use std::f32::consts::{PI, TAU};

use crate::api::config::CameraConfig;
use crate::renderer::camera::PerspectiveCamera;

const EPS: f32 = 1e-6;

#[derive(Debug, Clone)]
pub struct OrbitController {
    pub target: Vec3,
    pub min_distance: f32,
    pub max_distance: f32,
    pub min_polar: f32,
    pub max_polar: f32,
    /// Fraction of the pending delta applied per update (0 = no damping).
    pub damping: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    /// Pending rotation: (azimuth θ, polar φ) in radians.
    delta: Vec2,
    /// Pending dolly factor (1 = none).
    scale: f32,
    drag_from: Option<Vec2>,
}

impl OrbitController {
    pub fn new(config: &CameraConfig, min_distance: f32, max_distance: f32) -> Self {
        Self {
            target: Vec3::ZERO,
            min_distance,
            max_distance,
            min_polar: config.min_polar,
            max_polar: config.max_polar,
            damping: config.damping.clamp(0.0, 1.0),
            rotate_speed: config.rotate_speed,
            zoom_speed: config.zoom_speed,
            delta: Vec2::ZERO,
            scale: 1.0,
            drag_from: None,
        }
    }

    pub fn set_distance_bounds(&mut self, min: f32, max: f32) {
        self.min_distance = min;
        self.max_distance = max.max(min);
    }

    pub fn is_dragging(&self) -> bool {
        self.drag_from.is_some()
    }

    pub fn pointer_down(&mut self, pos: Vec2) {
        self.drag_from = Some(pos);
    }

    /// Drag by screen pixels; a full viewport height of motion is one turn.
    pub fn pointer_move(&mut self, pos: Vec2, viewport_height: f32) {
        let Some(from) = self.drag_from else {
            return;
        };
        let d = pos - from;
        self.drag_from = Some(pos);
        if viewport_height <= 0.0 {
            return;
        }
        self.delta.x -= TAU * d.x / viewport_height * self.rotate_speed;
        self.delta.y -= TAU * d.y / viewport_height * self.rotate_speed;
    }

    pub fn pointer_up(&mut self) {
        self.drag_from = None;
    }

    /// Wheel input: negative `delta_y` zooms in.
    pub fn wheel(&mut self, delta_y: f32) {
        if !delta_y.is_finite() || delta_y == 0.0 {
            return;
        }
        let step = 0.95_f32.powf(self.zoom_speed);
        if delta_y < 0.0 {
            self.scale *= step;
        } else {
            self.scale /= step;
        }
    }

    /// Drop pending motion and place the camera at `position`, looking at the target.
    pub fn home(&mut self, camera: &mut PerspectiveCamera, position: Vec3) {
        self.delta = Vec2::ZERO;
        self.scale = 1.0;
        camera.position = position;
        camera.look_at(self.target);
        self.update(camera);
    }

    /// Apply pending input to the camera. Returns whether the camera moved.
    pub fn update(&mut self, camera: &mut PerspectiveCamera) -> bool {
        let before = camera.position;
        let offset = camera.position - self.target;
        let mut radius = offset.length().max(EPS);
        let mut theta = offset.x.atan2(offset.z);
        let mut phi = (offset.y / radius).clamp(-1.0, 1.0).acos();

        let (apply, remain) = if self.damping > 0.0 {
            (self.delta * self.damping, self.delta * (1.0 - self.damping))
        } else {
            (self.delta, Vec2::ZERO)
        };
        theta += apply.x;
        phi += apply.y;
        self.delta = remain;

        let lo = self.min_polar.max(EPS);
        let hi = self.max_polar.min(PI - EPS).max(lo);
        phi = phi.clamp(lo, hi);

        radius = (radius * self.scale).clamp(self.min_distance, self.max_distance);
        self.scale = 1.0;

        let sin_phi = phi.sin();
        camera.position = self.target
            + Vec3::new(
                radius * sin_phi * theta.sin(),
                radius * phi.cos(),
                radius * sin_phi * theta.cos(),
            );
        camera.look_at(self.target);

        camera.position.distance_squared(before) > EPS
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::Viewport;

    fn setup() -> (OrbitController, PerspectiveCamera) {
        let config = CameraConfig::default();
        let mut cam = PerspectiveCamera::new(&config, Viewport::new(1024.0, 768.0)).unwrap();
        let mut ctl = OrbitController::new(&config, 200.0, 1200.0);
        ctl.home(&mut cam, Vec3::new(500.0, 250.0, 500.0));
        (ctl, cam)
    }

    #[test]
    fn home_pose_is_within_bounds_and_preserved() {
        let (_, cam) = setup();
        assert!((cam.position - Vec3::new(500.0, 250.0, 500.0)).length() < 1e-2);
        assert_eq!(cam.target, Vec3::ZERO);
    }

    #[test]
    fn idle_update_does_not_move() {
        let (mut ctl, mut cam) = setup();
        assert!(!ctl.update(&mut cam));
    }

    #[test]
    fn drag_rotates_with_damping() {
        let (mut ctl, mut cam) = setup();
        let start = cam.position;
        ctl.pointer_down(Vec2::new(100.0, 100.0));
        ctl.pointer_move(Vec2::new(160.0, 100.0), 768.0);
        ctl.pointer_up();
        assert!(ctl.update(&mut cam));
        let first = cam.position.distance(start);
        // Motion continues on later frames while the delta bleeds off.
        assert!(ctl.update(&mut cam));
        assert!(first > 0.0);
        // Distance to target is preserved by rotation.
        assert!((cam.distance() - 750.0).abs() < 0.1);
    }

    #[test]
    fn polar_angle_is_clamped() {
        let (mut ctl, mut cam) = setup();
        ctl.damping = 0.0;
        ctl.pointer_down(Vec2::ZERO);
        ctl.pointer_move(Vec2::new(0.0, 100_000.0), 768.0);
        ctl.update(&mut cam);
        let phi = ((cam.position.y) / cam.distance()).acos();
        assert!(phi >= ctl.min_polar - 1e-4 && phi <= ctl.max_polar + 1e-4, "phi = {phi}");
    }

    #[test]
    fn zoom_respects_distance_bounds() {
        let (mut ctl, mut cam) = setup();
        for _ in 0..200 {
            ctl.wheel(-1.0);
            ctl.update(&mut cam);
        }
        assert!((cam.distance() - 200.0).abs() < 1e-2);
        for _ in 0..200 {
            ctl.wheel(1.0);
            ctl.update(&mut cam);
        }
        assert!((cam.distance() - 1200.0).abs() < 1e-1);
    }

    #[test]
    fn move_without_down_is_ignored() {
        let (mut ctl, mut cam) = setup();
        ctl.pointer_move(Vec2::new(500.0, 500.0), 768.0);
        assert!(!ctl.update(&mut cam));
        assert!(!ctl.is_dragging());
    }
}
