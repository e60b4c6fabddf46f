//! Tube lofting around a sampled path.
//!
//! A circular cross-section is swept along the path using parallel-transported
//! Frenet frames, so the tube does not twist where the curve's curvature
//! vanishes. Purely decorative; the simulation never reads these meshes.

use glam::{Quat, Vec3};
use std::f32::consts::TAU;

use crate::api::error::EngineError;
use crate::geometry::mesh::{MeshData, MeshVertex};
use crate::geometry::path::OrbitPath;

/// Finite-difference step in path parameter space for tangents.
const TANGENT_DELTA: f32 = 1e-4;

/// Tangent, normal and binormal at one station along the path.
#[derive(Debug, Clone, Copy)]
pub struct Frame {
    pub tangent: Vec3,
    pub normal: Vec3,
    pub binormal: Vec3,
}

/// Unit tangent of `path` at `t`.
pub fn tangent_at(path: &OrbitPath, t: f32) -> Vec3 {
    let t1 = (t - TANGENT_DELTA).max(0.0);
    let t2 = (t + TANGENT_DELTA).min(1.0);
    let dir = path.point_at(t2) - path.point_at(t1);
    dir.try_normalize().unwrap_or(Vec3::X)
}

/// Compute `segments + 1` rotation-minimising frames along `path`.
pub fn frenet_frames(path: &OrbitPath, segments: usize, closed: bool) -> Vec<Frame> {
    let tangents: Vec<Vec3> = (0..=segments)
        .map(|i| tangent_at(path, i as f32 / segments as f32))
        .collect();

    // Initial normal: perpendicular to the tangent, seeded from its smallest axis.
    let t0 = tangents[0];
    let (ax, ay, az) = (t0.x.abs(), t0.y.abs(), t0.z.abs());
    let seed = if ax <= ay && ax <= az {
        Vec3::X
    } else if ay <= az {
        Vec3::Y
    } else {
        Vec3::Z
    };
    let side = t0.cross(seed).normalize();
    let n0 = t0.cross(side);
    let b0 = t0.cross(n0);

    let mut frames = Vec::with_capacity(segments + 1);
    frames.push(Frame { tangent: t0, normal: n0, binormal: b0 });

    for i in 1..=segments {
        let prev = frames[i - 1];
        let tangent = tangents[i];
        let mut normal = prev.normal;

        let axis = prev.tangent.cross(tangent);
        if axis.length() > f32::EPSILON {
            let theta = prev.tangent.dot(tangent).clamp(-1.0, 1.0).acos();
            normal = Quat::from_axis_angle(axis.normalize(), theta) * normal;
        }
        let binormal = tangent.cross(normal);
        frames.push(Frame { tangent, normal, binormal });
    }

    // Closed loops: spread the residual twist evenly so the seam lines up.
    if closed && segments > 0 {
        let first = frames[0].normal;
        let last = frames[segments].normal;
        let mut theta = first.dot(last).clamp(-1.0, 1.0).acos() / segments as f32;
        if frames[0].tangent.dot(first.cross(last)) > 0.0 {
            theta = -theta;
        }
        for (i, frame) in frames.iter_mut().enumerate().skip(1) {
            let rot = Quat::from_axis_angle(frame.tangent, theta * i as f32);
            frame.normal = rot * frame.normal;
            frame.binormal = frame.tangent.cross(frame.normal);
        }
    }

    frames
}

/// Loft a tube of `radius` around `path`.
///
/// Produces `(tubular_segments + 1) · (radial_segments + 1)` vertices and
/// `tubular_segments · radial_segments · 6` indices.
pub fn tube(
    path: &OrbitPath,
    tubular_segments: usize,
    radius: f32,
    radial_segments: usize,
    closed: bool,
) -> Result<MeshData, EngineError> {
    if tubular_segments == 0 || radial_segments < 3 {
        return Err(EngineError::InvalidPath(format!(
            "tube needs >= 1 tubular and >= 3 radial segments, got {tubular_segments}/{radial_segments}"
        )));
    }
    if !(radius.is_finite() && radius > 0.0) {
        return Err(EngineError::InvalidPath(format!("tube radius must be positive, got {radius}")));
    }

    let frames = frenet_frames(path, tubular_segments, closed);
    let ring = radial_segments + 1;
    let mut vertices = Vec::with_capacity((tubular_segments + 1) * ring);

    for (i, frame) in frames.iter().enumerate() {
        // Closed tubes reuse the first station so the seam is watertight.
        let t = if closed && i == tubular_segments { 0.0 } else { i as f32 / tubular_segments as f32 };
        let center = path.point_at(t);
        for j in 0..=radial_segments {
            let v = j as f32 / radial_segments as f32 * TAU;
            let (sin, cos) = (v.sin(), -v.cos());
            let normal = (frame.normal * cos + frame.binormal * sin).normalize();
            vertices.push(MeshVertex::new(
                center + normal * radius,
                normal,
                [i as f32 / tubular_segments as f32, j as f32 / radial_segments as f32],
            ));
        }
    }

    let mut indices = Vec::with_capacity(tubular_segments * radial_segments * 6);
    for j in 1..=tubular_segments {
        for i in 1..=radial_segments {
            let a = (ring * (j - 1) + (i - 1)) as u32;
            let b = (ring * j + (i - 1)) as u32;
            let c = (ring * j + i) as u32;
            let d = (ring * (j - 1) + i) as u32;
            indices.extend_from_slice(&[a, b, d, b, c, d]);
        }
    }

    Ok(MeshData::triangles(vertices, indices))
}
