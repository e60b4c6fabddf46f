use glam::{Mat4, Vec3};

use crate::api::config::{CameraConfig, ProfileConfig};
use crate::api::error::EngineError;
use crate::api::types::Viewport;

/// Viewport class deciding camera home pose, zoom limits and tessellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewportProfile {
    Narrow,
    Wide,
}

impl ViewportProfile {
    pub fn for_width(width: f32, breakpoint: f32) -> Self {
        if width < breakpoint {
            ViewportProfile::Narrow
        } else {
            ViewportProfile::Wide
        }
    }

    pub fn settings(self, config: &CameraConfig) -> &ProfileConfig {
        match self {
            ViewportProfile::Narrow => &config.narrow,
            ViewportProfile::Wide => &config.wide,
        }
    }
}

/// Perspective camera looking at a target point, +Y up.
#[derive(Debug, Clone, PartialEq)]
pub struct PerspectiveCamera {
    pub fov_deg: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub position: Vec3,
    pub target: Vec3,
}

impl PerspectiveCamera {
    pub fn new(config: &CameraConfig, viewport: Viewport) -> Result<Self, EngineError> {
        if !viewport.is_valid() {
            return Err(EngineError::InvalidViewport {
                width: viewport.width,
                height: viewport.height,
            });
        }
        Ok(Self {
            fov_deg: config.fov_deg,
            aspect: viewport.aspect(),
            near: config.near,
            far: config.far,
            position: Vec3::new(0.0, 0.0, 1.0),
            target: Vec3::ZERO,
        })
    }

    /// Update the aspect ratio from a new container size.
    pub fn set_viewport(&mut self, viewport: Viewport) -> Result<(), EngineError> {
        if !viewport.is_valid() {
            return Err(EngineError::InvalidViewport {
                width: viewport.width,
                height: viewport.height,
            });
        }
        self.aspect = viewport.aspect();
        Ok(())
    }

    pub fn look_at(&mut self, target: Vec3) {
        self.target = target;
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov_deg.to_radians(), self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    pub fn distance(&self) -> f32 {
        self.position.distance(self.target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_sized_viewport_fails_fast() {
        let err = PerspectiveCamera::new(&CameraConfig::default(), Viewport::new(0.0, 0.0)).unwrap_err();
        assert!(matches!(err, EngineError::InvalidViewport { .. }));
    }

    #[test]
    fn aspect_follows_viewport() {
        let mut cam = PerspectiveCamera::new(&CameraConfig::default(), Viewport::new(1024.0, 768.0)).unwrap();
        assert!((cam.aspect - 1024.0 / 768.0).abs() < 1e-6);
        cam.set_viewport(Viewport::new(400.0, 800.0)).unwrap();
        assert!((cam.aspect - 0.5).abs() < 1e-6);
        assert!(cam.set_viewport(Viewport::new(400.0, 0.0)).is_err());
        assert!((cam.aspect - 0.5).abs() < 1e-6);
    }

    #[test]
    fn target_projects_to_screen_center() {
        let mut cam = PerspectiveCamera::new(&CameraConfig::default(), Viewport::new(800.0, 600.0)).unwrap();
        cam.position = Vec3::new(500.0, 250.0, 500.0);
        let clip = cam.view_projection() * Vec3::ZERO.extend(1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(ndc.x.abs() < 1e-4 && ndc.y.abs() < 1e-4);
        assert!(ndc.z > -1.0 && ndc.z < 1.0);
    }

    #[test]
    fn profile_breakpoint() {
        assert_eq!(ViewportProfile::for_width(767.0, 768.0), ViewportProfile::Narrow);
        assert_eq!(ViewportProfile::for_width(768.0, 768.0), ViewportProfile::Wide);
    }
}
