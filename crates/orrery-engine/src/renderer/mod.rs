pub mod camera;
pub mod controller;
pub mod traits;

pub use traits::{Renderer, FrameData, DrawItem, LineStrip, LightingState};
