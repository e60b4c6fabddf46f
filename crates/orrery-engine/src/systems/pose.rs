//! Pose computation: where the three bodies sit for a given day counter.
//!
//! Poses are recomputed from scratch every time; nothing is integrated, so
//! calling `compute_poses` twice with the same clock yields identical output.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use std::f32::consts::{FRAC_PI_2, TAU};

use crate::api::config::{MoonConfig, SceneConfig};
use crate::api::error::EngineError;
use crate::core::time::TimeState;
use crate::geometry::path::OrbitPath;

/// Which progress fraction drives an independently sampled path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressCycle {
    /// Full animated cycle (same fraction as the Earth).
    #[default]
    Cycle,
    /// One pass per month.
    Month,
}

/// Plane holding an Earth-relative Moon offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AxisPlane {
    Xy,
    Xz,
    Yz,
}

impl AxisPlane {
    /// Unit vector at `angle` inside the plane.
    pub fn direction(self, angle: f32) -> Vec3 {
        let (sin, cos) = angle.sin_cos();
        match self {
            AxisPlane::Xy => Vec3::new(cos, sin, 0.0),
            AxisPlane::Xz => Vec3::new(cos, 0.0, sin),
            AxisPlane::Yz => Vec3::new(0.0, cos, sin),
        }
    }

    /// Rotation taking geometry built in the XY plane into this plane.
    pub fn rotation_from_xy(self) -> Quat {
        match self {
            AxisPlane::Xy => Quat::IDENTITY,
            AxisPlane::Xz => Quat::from_rotation_x(FRAC_PI_2),
            AxisPlane::Yz => Quat::from_rotation_y(-FRAC_PI_2),
        }
    }
}

/// Moon placement strategy, fixed at scene construction.
#[derive(Debug, Clone, PartialEq)]
pub enum MoonPolicy {
    /// Sample the Moon's own path at the chosen progress fraction.
    IndependentPath { path: OrbitPath, cycle: ProgressCycle },
    /// Circle the current Earth position once per month at `radius · scale`.
    EarthRelativeOffset { radius: f32, scale: f32, plane: AxisPlane },
}

/// Sampled paths plus the Moon policy: everything poses depend on besides the clock.
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitSystem {
    pub earth_path: OrbitPath,
    pub moon: MoonPolicy,
}

impl OrbitSystem {
    pub fn from_config(config: &SceneConfig) -> Result<Self, EngineError> {
        let orbit = &config.earth_orbit;
        let earth_path = OrbitPath::helix(orbit.radius, orbit.height, orbit.turns, orbit.segments)?;

        let moon = match &config.moon {
            MoonConfig::SpiralPath { radius, turns, segments, cycle, .. } => MoonPolicy::IndependentPath {
                path: OrbitPath::spiral_around(&earth_path, *radius, *turns, *segments)?,
                cycle: *cycle,
            },
            MoonConfig::EarthOffset { radius, scale, plane, .. } => MoonPolicy::EarthRelativeOffset {
                radius: *radius,
                scale: *scale,
                plane: *plane,
            },
        };

        Ok(Self { earth_path, moon })
    }

    /// The Moon's own path, when it has one.
    pub fn moon_path(&self) -> Option<&OrbitPath> {
        match &self.moon {
            MoonPolicy::IndependentPath { path, .. } => Some(path),
            MoonPolicy::EarthRelativeOffset { .. } => None,
        }
    }
}

/// World positions of the three bodies.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Poses {
    pub sun: Vec3,
    pub earth: Vec3,
    pub moon: Vec3,
}

/// Place Sun, Earth and Moon for the clock's current day.
pub fn compute_poses(system: &OrbitSystem, time: &TimeState) -> Poses {
    let cycle = time.cycle_progress() as f32;
    let month = time.month_progress() as f32;
    let earth = system.earth_path.point_at(cycle);

    let moon = match &system.moon {
        MoonPolicy::IndependentPath { path, cycle: ProgressCycle::Cycle } => path.point_at(cycle),
        MoonPolicy::IndependentPath { path, cycle: ProgressCycle::Month } => path.point_at(month),
        MoonPolicy::EarthRelativeOffset { radius, scale, plane } => {
            earth + plane.direction(month * TAU) * (radius * scale)
        }
    };

    Poses { sun: Vec3::ZERO, earth, moon }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::time::Calendar;

    fn clock() -> TimeState {
        TimeState::new(Calendar::THIRTY_DAY_MONTHS, 0.5, 10.0).unwrap()
    }

    #[test]
    fn earth_follows_path_fraction() {
        let system = OrbitSystem::from_config(&SceneConfig::spiral()).unwrap();
        let mut time = clock();
        time.scrub(720.0);
        let poses = compute_poses(&system, &time);
        assert_eq!(poses.earth, system.earth_path.point_at(0.5));
        assert_eq!(poses.sun, Vec3::ZERO);
    }

    #[test]
    fn spiral_moon_uses_same_fraction() {
        let system = OrbitSystem::from_config(&SceneConfig::spiral()).unwrap();
        let mut time = clock();
        time.scrub(300.0);
        let poses = compute_poses(&system, &time);
        let t = (300.0 / 1440.0) as f32;
        assert_eq!(poses.moon, system.moon_path().unwrap().point_at(t));
        // Wound 40 units around the Earth path.
        assert!((poses.moon.distance(poses.earth) - 40.0).abs() < 0.5);
    }

    #[test]
    fn month_cycle_moon_path() {
        let earth_path = OrbitPath::helix(200.0, 0.0, 1.0, 360).unwrap();
        let moon_path = OrbitPath::helix(30.0, 0.0, 1.0, 360).unwrap();
        let system = OrbitSystem {
            earth_path,
            moon: MoonPolicy::IndependentPath { path: moon_path.clone(), cycle: ProgressCycle::Month },
        };
        let mut time = clock();
        time.scrub(45.0);
        let poses = compute_poses(&system, &time);
        assert_eq!(poses.moon, moon_path.point_at(0.5));
    }

    #[test]
    fn earth_relative_offset_circles_earth_monthly() {
        let system = OrbitSystem::from_config(&SceneConfig::calendar()).unwrap();
        let mut time = TimeState::new(Calendar::JULIAN, 1.0, 10.0).unwrap();
        for day in [0.0, 7.3, 14.765, 100.0, 300.0] {
            time.scrub(day);
            let poses = compute_poses(&system, &time);
            let d = poses.moon.distance(poses.earth);
            assert!((d - 30.0).abs() < 1e-3, "day {day}: {d}");
            // Xz plane: no vertical offset.
            assert!((poses.moon.y - poses.earth.y).abs() < 1e-4);
        }
        time.scrub(0.0);
        let start = compute_poses(&system, &time);
        assert!((start.moon - start.earth - Vec3::new(30.0, 0.0, 0.0)).length() < 1e-4);
    }

    #[test]
    fn poses_are_idempotent() {
        let system = OrbitSystem::from_config(&SceneConfig::spiral()).unwrap();
        let mut time = clock();
        time.scrub(1234.5);
        assert_eq!(compute_poses(&system, &time), compute_poses(&system, &time));
    }

    #[test]
    fn plane_rotation_maps_xy_circle_into_plane() {
        for plane in [AxisPlane::Xy, AxisPlane::Xz, AxisPlane::Yz] {
            let rot = plane.rotation_from_xy();
            let normal = match plane {
                AxisPlane::Xy => Vec3::Z,
                AxisPlane::Xz => Vec3::Y,
                AxisPlane::Yz => Vec3::X,
            };
            for k in 0..8 {
                let a = k as f32 * TAU / 8.0;
                let p = rot * Vec3::new(a.cos(), a.sin(), 0.0);
                assert!(p.dot(normal).abs() < 1e-5, "{plane:?} angle {a}");
                assert!(plane.direction(a).dot(normal).abs() < 1e-6);
            }
        }
    }
}
