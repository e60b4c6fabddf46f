use crate::api::config::Rgb;
use crate::api::types::{MeshId, TextureId};

/// How a surface composites with what is already drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlendMode {
    /// Depth-written, no blending.
    #[default]
    Opaque,
    /// Alpha-blended, drawn after opaque surfaces without depth writes.
    Alpha,
}

/// Surface description consumed by the renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub color: Rgb,
    /// Self-illumination multiplier applied to `color` (the Sun glows).
    pub emissive: f32,
    pub roughness: f32,
    pub metalness: f32,
    pub opacity: f32,
    /// Lit by the scene lights; unlit surfaces render flat `color`.
    pub lit: bool,
    pub blend: BlendMode,
    /// Optional surface texture. Until it loads (or if it fails) the
    /// renderer draws the flat colour.
    pub texture: Option<TextureId>,
    /// Point sprite size in world units (point meshes only).
    pub point_size: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            color: Rgb::WHITE,
            emissive: 0.0,
            roughness: 0.7,
            metalness: 0.1,
            opacity: 1.0,
            lit: true,
            blend: BlendMode::Opaque,
            texture: None,
            point_size: 1.0,
        }
    }
}

impl Material {
    /// Lit standard surface.
    pub fn standard(color: Rgb) -> Self {
        Self { color, ..Default::default() }
    }

    /// Unlit translucent surface, used for orbit tubes and rings.
    pub fn translucent(color: Rgb, opacity: f32) -> Self {
        Self {
            color,
            opacity: opacity.clamp(0.0, 1.0),
            lit: false,
            blend: BlendMode::Alpha,
            ..Default::default()
        }
    }

    /// Unlit point sprites, used for the starfield.
    pub fn points(color: Rgb, size: f32) -> Self {
        Self {
            color,
            lit: false,
            point_size: size,
            ..Default::default()
        }
    }

    pub fn with_emissive(mut self, emissive: f32) -> Self {
        self.emissive = emissive;
        self
    }

    pub fn with_roughness(mut self, roughness: f32, metalness: f32) -> Self {
        self.roughness = roughness;
        self.metalness = metalness;
        self
    }

    pub fn with_texture(mut self, texture: Option<TextureId>) -> Self {
        self.texture = texture;
        self
    }
}

/// Component attaching a registered mesh and its material to an entity.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshComponent {
    pub mesh: MeshId,
    pub material: Material,
}

impl MeshComponent {
    pub fn new(mesh: MeshId, material: Material) -> Self {
        Self { mesh, material }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translucent_is_unlit_alpha() {
        let m = Material::translucent(Rgb::WHITE, 1.5);
        assert!(!m.lit);
        assert_eq!(m.blend, BlendMode::Alpha);
        assert_eq!(m.opacity, 1.0);
    }
}
