use glam::Vec3;
use std::f32::consts::{PI, TAU};

use crate::geometry::mesh::{MeshData, MeshVertex};
use crate::geometry::rng::Rng;

/// UV sphere centred on the origin, poles on ±Y.
pub fn uv_sphere(radius: f32, width_segments: usize, height_segments: usize) -> MeshData {
    let w = width_segments.max(3);
    let h = height_segments.max(2);
    let mut vertices = Vec::with_capacity((w + 1) * (h + 1));

    for iy in 0..=h {
        let v = iy as f32 / h as f32;
        for ix in 0..=w {
            let u = ix as f32 / w as f32;
            let normal = Vec3::new(
                -(u * TAU).cos() * (v * PI).sin(),
                (v * PI).cos(),
                (u * TAU).sin() * (v * PI).sin(),
            );
            vertices.push(MeshVertex::new(normal * radius, normal, [u, 1.0 - v]));
        }
    }

    let row = w + 1;
    let mut indices = Vec::with_capacity(w * h * 6);
    for iy in 0..h {
        for ix in 0..w {
            let a = (iy * row + ix + 1) as u32;
            let b = (iy * row + ix) as u32;
            let c = ((iy + 1) * row + ix) as u32;
            let d = ((iy + 1) * row + ix + 1) as u32;
            // Pole rows collapse to a single triangle.
            if iy != 0 {
                indices.extend_from_slice(&[a, b, d]);
            }
            if iy != h - 1 {
                indices.extend_from_slice(&[b, c, d]);
            }
        }
    }

    MeshData::triangles(vertices, indices)
}

/// Torus in the XY plane: ring of `radius`, tube of `tube` thickness.
pub fn torus(radius: f32, tube: f32, radial_segments: usize, tubular_segments: usize) -> MeshData {
    let radial = radial_segments.max(3);
    let tubular = tubular_segments.max(3);
    let mut vertices = Vec::with_capacity((radial + 1) * (tubular + 1));

    for j in 0..=radial {
        let v = j as f32 / radial as f32 * TAU;
        for i in 0..=tubular {
            let u = i as f32 / tubular as f32 * TAU;
            let position = Vec3::new(
                (radius + tube * v.cos()) * u.cos(),
                (radius + tube * v.cos()) * u.sin(),
                tube * v.sin(),
            );
            let center = Vec3::new(radius * u.cos(), radius * u.sin(), 0.0);
            let normal = (position - center).normalize_or_zero();
            vertices.push(MeshVertex::new(
                position,
                normal,
                [i as f32 / tubular as f32, j as f32 / radial as f32],
            ));
        }
    }

    let row = tubular + 1;
    let mut indices = Vec::with_capacity(radial * tubular * 6);
    for j in 1..=radial {
        for i in 1..=tubular {
            let a = (row * j + i - 1) as u32;
            let b = (row * (j - 1) + i - 1) as u32;
            let c = (row * (j - 1) + i) as u32;
            let d = (row * j + i) as u32;
            indices.extend_from_slice(&[a, b, d, b, c, d]);
        }
    }

    MeshData::triangles(vertices, indices)
}

/// Random stars filling a cube of side `extent` centred on the origin.
pub fn starfield(count: usize, extent: f32, seed: u64) -> Vec<Vec3> {
    let mut rng = Rng::new(seed);
    (0..count)
        .map(|_| {
            Vec3::new(
                rng.next_centered(extent),
                rng.next_centered(extent),
                rng.next_centered(extent),
            )
        })
        .collect()
}
