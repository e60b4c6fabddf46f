//! Renderer seam between the headless engine and a GPU backend.
//!
//! The engine produces one [`FrameData`] per frame; a backend (WebGL2 in the
//! browser crate, a recording stub in tests) turns it into draw calls. Meshes
//! are uploaded once, up front, keyed by [`MeshId`].

use glam::{Mat4, Vec3};

use crate::api::config::Rgb;
use crate::api::types::{MeshId, Viewport};
use crate::components::mesh::Material;
use crate::geometry::mesh::MeshData;
pub use crate::systems::lighting::LightingState;

/// One mesh draw with its world transform.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawItem {
    pub mesh: MeshId,
    pub model: Mat4,
    pub material: Material,
}

/// A world-space polyline drawn unlit with `GL_LINE_STRIP`.
#[derive(Debug, Clone, PartialEq)]
pub struct LineStrip {
    pub points: Vec<Vec3>,
    pub color: Rgb,
    pub opacity: f32,
}

/// Everything a backend needs to draw one frame.
///
/// Draw lists are pre-sorted: `opaque` front-to-back is not required, but
/// `translucent` is ordered far-to-near so alpha blending composes correctly.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameData {
    pub view: Mat4,
    pub projection: Mat4,
    pub camera_position: Vec3,
    pub viewport: Viewport,
    pub clear_color: Rgb,
    pub lighting: LightingState,
    pub opaque: Vec<DrawItem>,
    pub translucent: Vec<DrawItem>,
    pub points: Vec<DrawItem>,
    pub lines: Vec<LineStrip>,
}

impl FrameData {
    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view
    }

    pub fn draw_count(&self) -> usize {
        self.opaque.len() + self.translucent.len() + self.points.len() + self.lines.len()
    }
}

/// Renderer trait for GPU backends.
///
/// ```ignore
/// struct WebGlRenderer { gl: WebGl2RenderingContext, /* ... */ }
///
/// impl Renderer for WebGlRenderer {
///     type Error = ShellError;
///     fn backend(&self) -> &'static str { "webgl2" }
///     fn upload_mesh(&mut self, id: MeshId, mesh: &MeshData) -> Result<(), ShellError> {
///         // createBuffer / bufferData ...
///     }
///     fn resize(&mut self, viewport: Viewport) { /* canvas size + gl.viewport */ }
///     fn draw(&mut self, frame: &FrameData) { /* ... */ }
/// }
/// ```
pub trait Renderer {
    type Error;

    /// Backend identifier (e.g. "webgl2").
    fn backend(&self) -> &'static str;

    /// Upload a mesh's vertex and index buffers under `id`.
    fn upload_mesh(&mut self, id: MeshId, mesh: &MeshData) -> Result<(), Self::Error>;

    /// Resize the drawing surface.
    fn resize(&mut self, viewport: Viewport);

    /// Draw a complete frame.
    fn draw(&mut self, frame: &FrameData);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_projection_composes_in_order() {
        let frame = FrameData {
            view: Mat4::from_translation(Vec3::new(0.0, 0.0, -10.0)),
            projection: Mat4::from_scale(Vec3::splat(2.0)),
            camera_position: Vec3::new(0.0, 0.0, 10.0),
            viewport: Viewport::new(100.0, 100.0),
            clear_color: Rgb::BLACK,
            lighting: LightingState::default(),
            opaque: Vec::new(),
            translucent: Vec::new(),
            points: Vec::new(),
            lines: Vec::new(),
        };
        let p = frame.view_projection().transform_point3(Vec3::ZERO);
        assert_eq!(p, Vec3::new(0.0, 0.0, -20.0));
        assert_eq!(frame.draw_count(), 0);
    }
}
