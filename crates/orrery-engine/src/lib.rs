pub mod api;
pub mod core;
pub mod components;
pub mod geometry;
pub mod systems;
pub mod renderer;
pub mod input;
pub mod assets;

// Re-export key types at crate root for convenience
pub use api::config::{
    SceneConfig, EarthOrbitConfig, MoonConfig, BodyStyle, BodiesConfig, ProfileConfig,
    CameraConfig, PlaybackConfig, DecorationsConfig, Rgb,
};
pub use api::error::EngineError;
pub use api::orrery::{Orrery, ControlsView, SimulationState};
pub use api::types::{EntityId, MeshId, TextureId, Viewport};
pub use components::entity::Entity;
pub use components::mesh::{MeshComponent, Material, BlendMode};
pub use core::scene::Scene;
pub use core::time::{Calendar, CalendarDate, PlayState, TimeState, ScrubRedraw};
pub use core::debounce::Debouncer;
pub use core::schedule::{FramePlan, FrameScheduler, PeriodicTask, TaskKind};
pub use geometry::path::OrbitPath;
pub use geometry::mesh::{MeshData, MeshVertex, Topology};
pub use geometry::rng::Rng;
pub use systems::pose::{compute_poses, AxisPlane, MoonPolicy, OrbitSystem, Poses, ProgressCycle};
pub use systems::lighting::{DirectionalLight, PointLight};
pub use systems::render::{build_frame, FrameInputs};
pub use renderer::camera::{PerspectiveCamera, ViewportProfile};
pub use renderer::controller::OrbitController;
pub use renderer::traits::{Renderer, FrameData, DrawItem, LineStrip, LightingState};
pub use input::queue::{InputEvent, InputQueue, KeyAction};
pub use assets::textures::{TextureRegistry, TextureStatus};
