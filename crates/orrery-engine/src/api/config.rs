//! Scene configuration.
//!
//! Every cosmetic knob of the animation lives here: orbit shapes, calendar,
//! body styles, camera, playback and decorations. Named presets cover the
//! stock variants; anything else can be supplied as JSON.

use serde::{Deserialize, Serialize};
use std::f32::consts::PI;
use std::fmt;

use crate::api::error::EngineError;
use crate::core::time::{Calendar, ScrubRedraw};
use crate::systems::pose::{AxisPlane, ProgressCycle};

/// Linear RGB colour, serialised as `"#rrggbb"`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb { r: 1.0, g: 1.0, b: 1.0 };
    pub const BLACK: Rgb = Rgb { r: 0.0, g: 0.0, b: 0.0 };

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// From a `0xRRGGBB` literal.
    pub fn from_hex(hex: u32) -> Self {
        let channel = |shift: u32| ((hex >> shift) & 0xff) as f32 / 255.0;
        Self::new(channel(16), channel(8), channel(0))
    }

    pub fn to_array(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }

    fn to_hex(self) -> u32 {
        let q = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u32;
        (q(self.r) << 16) | (q(self.g) << 8) | q(self.b)
    }
}

impl TryFrom<String> for Rgb {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        let digits = s.strip_prefix('#').unwrap_or(&s);
        if digits.len() != 6 {
            return Err(format!("expected #rrggbb colour, got '{s}'"));
        }
        u32::from_str_radix(digits, 16)
            .map(Rgb::from_hex)
            .map_err(|_| format!("expected #rrggbb colour, got '{s}'"))
    }
}

impl From<Rgb> for String {
    fn from(c: Rgb) -> String {
        c.to_string()
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06x}", self.to_hex())
    }
}

/// Earth path and its decorative tube.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EarthOrbitConfig {
    pub radius: f32,
    pub height: f32,
    pub turns: f32,
    pub segments: usize,
    pub tube_radius: f32,
    pub tube_radial_segments: usize,
    pub color: Rgb,
    pub opacity: f32,
}

impl Default for EarthOrbitConfig {
    fn default() -> Self {
        Self {
            radius: 200.0,
            height: 100.0,
            turns: 4.0,
            segments: 2000,
            tube_radius: 1.0,
            tube_radial_segments: 8,
            color: Rgb::WHITE,
            opacity: 0.3,
        }
    }
}

/// How the Moon is placed, chosen once when the scene is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum MoonConfig {
    /// The Moon rides its own spiral wound around the Earth path.
    SpiralPath {
        radius: f32,
        turns: f32,
        segments: usize,
        #[serde(default)]
        cycle: ProgressCycle,
        tube_radius: f32,
        color: Rgb,
        opacity: f32,
    },
    /// The Moon circles the current Earth position once per month.
    EarthOffset {
        radius: f32,
        scale: f32,
        plane: AxisPlane,
        /// Draw a torus ring marking the Moon's orbit around Earth.
        ring: bool,
        ring_tube: f32,
        color: Rgb,
        opacity: f32,
    },
}

impl Default for MoonConfig {
    fn default() -> Self {
        MoonConfig::SpiralPath {
            radius: 40.0,
            turns: 48.0,
            segments: 2000,
            cycle: ProgressCycle::Cycle,
            tube_radius: 0.5,
            color: Rgb::from_hex(0xff6600),
            opacity: 0.3,
        }
    }
}

/// Appearance of one celestial body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyStyle {
    pub radius: f32,
    pub color: Rgb,
    #[serde(default)]
    pub emissive: f32,
    #[serde(default = "default_roughness")]
    pub roughness: f32,
    #[serde(default = "default_metalness")]
    pub metalness: f32,
    /// Optional texture URL, loaded asynchronously.
    #[serde(default)]
    pub texture: Option<String>,
}

fn default_roughness() -> f32 {
    0.7
}

fn default_metalness() -> f32 {
    0.1
}

impl BodyStyle {
    fn new(radius: f32, color: u32) -> Self {
        Self {
            radius,
            color: Rgb::from_hex(color),
            emissive: 0.0,
            roughness: default_roughness(),
            metalness: default_metalness(),
            texture: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BodiesConfig {
    pub sun: BodyStyle,
    pub earth: BodyStyle,
    pub moon: BodyStyle,
}

impl Default for BodiesConfig {
    fn default() -> Self {
        Self {
            sun: BodyStyle {
                emissive: 1.0,
                roughness: 0.2,
                metalness: 0.5,
                ..BodyStyle::new(30.0, 0xffff00)
            },
            earth: BodyStyle::new(15.0, 0x0077ff),
            moon: BodyStyle {
                roughness: 0.8,
                ..BodyStyle::new(8.0, 0xdddddd)
            },
        }
    }
}

/// Camera home pose and zoom limits for one viewport class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileConfig {
    pub home: [f32; 3],
    pub min_distance: f32,
    pub max_distance: f32,
    /// Sphere tessellation for the bodies.
    pub sphere_segments: usize,
    pub star_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub fov_deg: f32,
    pub near: f32,
    pub far: f32,
    pub damping: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub min_polar: f32,
    pub max_polar: f32,
    /// Containers narrower than this (px) use the `narrow` profile.
    pub narrow_breakpoint: f32,
    pub narrow: ProfileConfig,
    pub wide: ProfileConfig,
    /// Quiet period before a resize is applied.
    pub resize_quiet_ms: f64,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_deg: 75.0,
            near: 0.1,
            far: 2000.0,
            damping: 0.05,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            min_polar: PI / 6.0,
            max_polar: PI / 1.5,
            narrow_breakpoint: 768.0,
            narrow: ProfileConfig {
                home: [600.0, 300.0, 600.0],
                min_distance: 300.0,
                max_distance: 800.0,
                sphere_segments: 32,
                star_count: 1000,
            },
            wide: ProfileConfig {
                home: [500.0, 250.0, 500.0],
                min_distance: 200.0,
                max_distance: 1200.0,
                sphere_segments: 64,
                star_count: 2000,
            },
            resize_quiet_ms: 250.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Days advanced per simulation tick at startup.
    pub initial_speed: f64,
    /// Largest accepted |speed|.
    pub max_speed: f64,
    pub scrub_redraw: ScrubRedraw,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            initial_speed: 0.5,
            max_speed: 10.0,
            scrub_redraw: ScrubRedraw::Immediate,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecorationsConfig {
    pub stars: bool,
    pub star_seed: u64,
    /// Star cube edge length.
    pub star_extent: f32,
    /// Lines Sun→Earth and Earth→Moon, updated every frame.
    pub reference_lines: bool,
    pub reference_color: Rgb,
    pub background: Rgb,
}

impl Default for DecorationsConfig {
    fn default() -> Self {
        Self {
            stars: true,
            star_seed: 0x5eed,
            star_extent: 2000.0,
            reference_lines: false,
            reference_color: Rgb::from_hex(0x888888),
            background: Rgb::BLACK,
        }
    }
}

/// Full description of one orrery scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub name: String,
    pub calendar: Calendar,
    pub earth_orbit: EarthOrbitConfig,
    pub moon: MoonConfig,
    pub bodies: BodiesConfig,
    pub camera: CameraConfig,
    pub playback: PlaybackConfig,
    pub decorations: DecorationsConfig,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self::spiral()
    }
}

impl SceneConfig {
    pub const PRESETS: [&'static str; 3] = ["spiral", "calendar", "textured"];

    /// Four-year helix with the Moon on a spiral wound around it.
    pub fn spiral() -> Self {
        Self {
            name: "spiral".into(),
            calendar: Calendar::THIRTY_DAY_MONTHS,
            earth_orbit: EarthOrbitConfig::default(),
            moon: MoonConfig::default(),
            bodies: BodiesConfig::default(),
            camera: CameraConfig::default(),
            playback: PlaybackConfig::default(),
            decorations: DecorationsConfig::default(),
        }
    }

    /// One flat Julian year; the Moon circles Earth monthly inside a torus ring.
    pub fn calendar() -> Self {
        Self {
            name: "calendar".into(),
            calendar: Calendar::JULIAN,
            earth_orbit: EarthOrbitConfig {
                height: 0.0,
                turns: 1.0,
                segments: 730,
                color: Rgb::from_hex(0x4488ff),
                ..EarthOrbitConfig::default()
            },
            moon: MoonConfig::EarthOffset {
                radius: 100.0,
                scale: 0.3,
                plane: AxisPlane::Xz,
                ring: true,
                ring_tube: 0.4,
                color: Rgb::from_hex(0xaaaaaa),
                opacity: 0.4,
            },
            playback: PlaybackConfig {
                initial_speed: 0.25,
                ..PlaybackConfig::default()
            },
            decorations: DecorationsConfig {
                reference_lines: true,
                ..DecorationsConfig::default()
            },
            ..Self::spiral()
        }
    }

    /// The spiral scene with surface textures on all three bodies.
    pub fn textured() -> Self {
        let mut config = Self::spiral();
        config.name = "textured".into();
        config.bodies.sun.texture = Some("textures/sun.jpg".into());
        config.bodies.earth.texture = Some("textures/earth.jpg".into());
        config.bodies.moon.texture = Some("textures/moon.jpg".into());
        // Textures carry the colour; keep the tint neutral.
        config.bodies.earth.color = Rgb::WHITE;
        config.bodies.moon.color = Rgb::WHITE;
        config
    }

    /// Look up a named preset.
    pub fn preset(name: &str) -> Result<Self, EngineError> {
        match name {
            "spiral" => Ok(Self::spiral()),
            "calendar" => Ok(Self::calendar()),
            "textured" => Ok(Self::textured()),
            other => Err(EngineError::UnknownPreset(other.to_string())),
        }
    }

    /// Parse and validate a JSON scene description.
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, EngineError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        fn positive(name: &str, v: f32) -> Result<(), EngineError> {
            if v.is_finite() && v > 0.0 {
                Ok(())
            } else {
                Err(EngineError::InvalidConfig(format!("{name} must be positive, got {v}")))
            }
        }

        self.calendar.validate()?;

        let orbit = &self.earth_orbit;
        if orbit.segments == 0 {
            return Err(EngineError::InvalidConfig("earth_orbit.segments must be >= 1".into()));
        }
        if orbit.tube_radial_segments < 3 {
            return Err(EngineError::InvalidConfig("earth_orbit.tube_radial_segments must be >= 3".into()));
        }
        positive("earth_orbit.tube_radius", orbit.tube_radius)?;

        match &self.moon {
            MoonConfig::SpiralPath { segments, tube_radius, .. } => {
                if *segments == 0 {
                    return Err(EngineError::InvalidConfig("moon.segments must be >= 1".into()));
                }
                positive("moon.tube_radius", *tube_radius)?;
            }
            MoonConfig::EarthOffset { radius, scale, ring, ring_tube, .. } => {
                if !(radius.is_finite() && scale.is_finite()) {
                    return Err(EngineError::InvalidConfig("moon offset must be finite".into()));
                }
                if *ring {
                    positive("moon.ring_tube", *ring_tube)?;
                }
            }
        }

        positive("bodies.sun.radius", self.bodies.sun.radius)?;
        positive("bodies.earth.radius", self.bodies.earth.radius)?;
        positive("bodies.moon.radius", self.bodies.moon.radius)?;

        let cam = &self.camera;
        positive("camera.fov_deg", cam.fov_deg)?;
        positive("camera.near", cam.near)?;
        if !(cam.far > cam.near) {
            return Err(EngineError::InvalidConfig("camera.far must exceed camera.near".into()));
        }
        if !(0.0..=PI).contains(&cam.min_polar) || !(cam.min_polar..=PI).contains(&cam.max_polar) {
            return Err(EngineError::InvalidConfig("camera polar bounds must satisfy 0 <= min <= max <= pi".into()));
        }
        for (name, profile) in [("narrow", &cam.narrow), ("wide", &cam.wide)] {
            positive(&format!("camera.{name}.min_distance"), profile.min_distance)?;
            if profile.max_distance < profile.min_distance {
                return Err(EngineError::InvalidConfig(format!(
                    "camera.{name}.max_distance must be >= min_distance"
                )));
            }
        }

        if !(self.playback.max_speed.is_finite() && self.playback.max_speed > 0.0) {
            return Err(EngineError::InvalidConfig("playback.max_speed must be positive".into()));
        }

        Ok(())
    }
}
