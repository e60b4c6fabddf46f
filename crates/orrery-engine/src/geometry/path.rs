//! Sampled orbit paths.
//!
//! A path is an ordered list of `segments + 1` points produced by evaluating a
//! parametric curve at `t = i / segments`. Continuous evaluation between the
//! samples is linear, so a path built from another path's `point_at` lines up
//! with it sample for sample.

use glam::Vec3;
use std::f64::consts::TAU;

use crate::api::error::EngineError;

/// Immutable sampled curve with an implicit `t ∈ [0, 1]` parametrisation.
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitPath {
    points: Vec<Vec3>,
    /// `cumulative[i]` = arc length from the first point to `points[i]`.
    cumulative: Vec<f32>,
}

fn check_finite(name: &str, value: f32) -> Result<(), EngineError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(EngineError::InvalidPath(format!("{name} must be finite, got {value}")))
    }
}

fn check_segments(segments: usize) -> Result<(), EngineError> {
    if segments == 0 {
        return Err(EngineError::InvalidPath("segments must be at least 1".into()));
    }
    Ok(())
}

impl OrbitPath {
    /// Build a path from explicit points. At least two points are required.
    pub fn from_points(points: Vec<Vec3>) -> Result<Self, EngineError> {
        if points.len() < 2 {
            return Err(EngineError::InvalidPath(format!(
                "a path needs at least 2 points, got {}",
                points.len()
            )));
        }
        if points.iter().any(|p| !p.is_finite()) {
            return Err(EngineError::InvalidPath("path contains a non-finite point".into()));
        }

        let mut cumulative = Vec::with_capacity(points.len());
        let mut total = 0.0_f32;
        cumulative.push(0.0);
        for pair in points.windows(2) {
            total += pair[0].distance(pair[1]);
            cumulative.push(total);
        }

        Ok(Self { points, cumulative })
    }

    /// Helix rising along +Y: point `i` sits at angle `t·2π·turns` on a circle
    /// of `radius` in the XZ plane, at height `height·t`.
    pub fn helix(radius: f32, height: f32, turns: f32, segments: usize) -> Result<Self, EngineError> {
        check_segments(segments)?;
        check_finite("radius", radius)?;
        check_finite("height", height)?;
        check_finite("turns", turns)?;

        let points = (0..=segments)
            .map(|i| {
                let t = i as f64 / segments as f64;
                let angle = t * TAU * turns as f64;
                Vec3::new(
                    (radius as f64 * angle.cos()) as f32,
                    (height as f64 * t) as f32,
                    (radius as f64 * angle.sin()) as f32,
                )
            })
            .collect();

        Self::from_points(points)
    }

    /// Secondary curve winding around `base`: each sample is `base.point_at(t)`
    /// displaced by `(radius·cos θ, radius·sin θ)` in the XY plane, i.e. across
    /// the base helix's height axis, with `θ = t·2π·turns`.
    pub fn spiral_around(
        base: &OrbitPath,
        radius: f32,
        turns: f32,
        segments: usize,
    ) -> Result<Self, EngineError> {
        check_segments(segments)?;
        check_finite("radius", radius)?;
        check_finite("turns", turns)?;

        let points = (0..=segments)
            .map(|i| {
                let t = i as f64 / segments as f64;
                let anchor = base.point_at(t as f32);
                let angle = t * TAU * turns as f64;
                anchor
                    + Vec3::new(
                        (radius as f64 * angle.cos()) as f32,
                        (radius as f64 * angle.sin()) as f32,
                        0.0,
                    )
            })
            .collect();

        Self::from_points(points)
    }

    /// Evaluate the path at `t ∈ [0, 1]`: sample `i` sits at `t = i / segments`
    /// and positions in between are interpolated linearly. Out-of-range values
    /// are clamped and a non-finite `t` evaluates to the start of the path.
    pub fn point_at(&self, t: f32) -> Vec3 {
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
        let segments = self.segments();
        let scaled = t as f64 * segments as f64;
        let i = (scaled.floor() as usize).min(segments - 1);
        let local = (scaled - i as f64) as f32;
        self.points[i].lerp(self.points[i + 1], local)
    }

    pub fn points(&self) -> &[Vec3] {
        &self.points
    }

    /// Number of sampled points (`segments + 1`).
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn segments(&self) -> usize {
        self.points.len() - 1
    }

    pub fn first(&self) -> Vec3 {
        self.points[0]
    }

    pub fn last(&self) -> Vec3 {
        self.points[self.points.len() - 1]
    }

    /// Total polyline length.
    pub fn length(&self) -> f32 {
        self.cumulative[self.cumulative.len() - 1]
    }

    /// Whether the path ends where it starts (within `eps`).
    pub fn is_closed(&self, eps: f32) -> bool {
        self.first().distance(self.last()) <= eps
    }
}
