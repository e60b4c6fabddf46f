/// Scene lights for the lit body shader.
///
/// The light rig is fixed for the lifetime of a scene except for the point
/// light, which follows the Sun's pose.

use glam::Vec3;

use crate::api::config::Rgb;

/// An omnidirectional light. `range == 0` means no attenuation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    pub position: Vec3,
    pub color: Rgb,
    pub intensity: f32,
    /// Distance at which the light fades to zero; 0 disables falloff.
    pub range: f32,
}

impl PointLight {
    pub fn new(position: Vec3, color: Rgb, intensity: f32) -> Self {
        Self {
            position,
            color,
            intensity,
            range: 0.0,
        }
    }

    pub fn with_range(mut self, range: f32) -> Self {
        self.range = range.max(0.0);
        self
    }

    /// Falloff multiplier at `distance` from the light.
    pub fn attenuation(&self, distance: f32) -> f32 {
        if self.range <= 0.0 {
            return 1.0;
        }
        (1.0 - distance / self.range).clamp(0.0, 1.0)
    }
}

/// A light infinitely far away shining from `position` towards the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    pub position: Vec3,
    pub color: Rgb,
    pub intensity: f32,
}

impl DirectionalLight {
    /// Unit vector pointing from the surface towards the light.
    pub fn direction(&self) -> Vec3 {
        self.position.normalize_or(Vec3::Y)
    }
}

/// Ambient + Sun point light + fill directional light.
#[derive(Debug, Clone, PartialEq)]
pub struct LightingState {
    pub ambient: Rgb,
    pub ambient_intensity: f32,
    pub sun: PointLight,
    pub fill: DirectionalLight,
}

impl Default for LightingState {
    fn default() -> Self {
        Self {
            ambient: Rgb::WHITE,
            ambient_intensity: 0.3,
            sun: PointLight::new(Vec3::ZERO, Rgb::WHITE, 2.0),
            fill: DirectionalLight {
                position: Vec3::new(100.0, 100.0, 100.0),
                color: Rgb::WHITE,
                intensity: 0.8,
            },
        }
    }
}

impl LightingState {
    /// Move the point light onto the Sun.
    pub fn follow_sun(&mut self, sun: Vec3) {
        self.sun.position = sun;
    }

    /// Pre-multiplied ambient term for the shader.
    pub fn ambient_rgb(&self) -> [f32; 3] {
        let [r, g, b] = self.ambient.to_array();
        let k = self.ambient_intensity;
        [r * k, g * k, b * k]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_rig() {
        let l = LightingState::default();
        assert!((l.ambient_rgb()[0] - 0.3).abs() < 1e-6);
        assert_eq!(l.sun.position, Vec3::ZERO);
        let d = l.fill.direction();
        assert!((d.length() - 1.0).abs() < 1e-6);
        assert!((d.x - d.y).abs() < 1e-6 && (d.y - d.z).abs() < 1e-6);
    }

    #[test]
    fn attenuation_without_range_is_constant() {
        let light = PointLight::new(Vec3::ZERO, Rgb::WHITE, 1.0);
        assert_eq!(light.attenuation(10_000.0), 1.0);
        let ranged = light.with_range(100.0);
        assert!((ranged.attenuation(50.0) - 0.5).abs() < 1e-6);
        assert_eq!(ranged.attenuation(500.0), 0.0);
    }

    #[test]
    fn follow_sun_moves_point_light() {
        let mut l = LightingState::default();
        l.follow_sun(Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(l.sun.position, Vec3::new(1.0, 2.0, 3.0));
    }
}
