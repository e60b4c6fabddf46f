//! The orrery: simulation state, scene, camera and frame pacing behind one
//! browser-free type.
//!
//! The shell owns an [`Orrery`] and forwards DOM events into it; once per
//! display refresh it calls [`Orrery::frame`] and hands the result to a
//! [`Renderer`]. Everything time-dependent takes `now_ms` explicitly so the
//! whole type runs unchanged under test.

use glam::{Vec2, Vec3};

use crate::api::config::{BodyStyle, MoonConfig, Rgb, SceneConfig};
use crate::api::error::EngineError;
use crate::api::types::{EntityId, Viewport};
use crate::assets::textures::TextureRegistry;
use crate::components::entity::Entity;
use crate::components::mesh::{Material, MeshComponent};
use crate::core::debounce::Debouncer;
use crate::core::scene::Scene;
use crate::core::schedule::{FrameScheduler, TaskKind};
use crate::core::time::{PlayState, ScrubRedraw, TimeState};
use crate::geometry::mesh::MeshData;
use crate::geometry::primitives::{starfield, torus, uv_sphere};
use crate::geometry::tube::tube;
use crate::input::queue::{InputEvent, KeyAction};
use crate::renderer::camera::{PerspectiveCamera, ViewportProfile};
use crate::renderer::controller::OrbitController;
use crate::renderer::traits::{FrameData, LightingState, LineStrip, Renderer};
use crate::systems::pose::{compute_poses, OrbitSystem, Poses};
use crate::systems::render::{build_frame, FrameInputs};

const STAR_SIZE: f32 = 0.5;
const RING_RADIAL_SEGMENTS: usize = 16;
const RING_TUBULAR_SEGMENTS: usize = 100;
const CLOSED_PATH_EPS: f32 = 1e-3;

/// Clock, orbit geometry and the poses derived from them.
/// Poses are always consistent with the clock after any public mutation.
#[derive(Debug, Clone)]
pub struct SimulationState {
    pub time: TimeState,
    pub system: OrbitSystem,
    pub poses: Poses,
}

impl SimulationState {
    pub fn new(config: &SceneConfig) -> Result<Self, EngineError> {
        let time = TimeState::new(
            config.calendar,
            config.playback.initial_speed,
            config.playback.max_speed,
        )?;
        let system = OrbitSystem::from_config(config)?;
        let poses = compute_poses(&system, &time);
        Ok(Self { time, system, poses })
    }

    pub fn recompute(&mut self) {
        self.poses = compute_poses(&self.system, &self.time);
    }
}

/// Snapshot of what the DOM controls should show.
#[derive(Debug, Clone, PartialEq)]
pub struct ControlsView {
    /// Play/pause button text: "Play" while paused, "Pause" while playing.
    pub play_label: &'static str,
    /// `aria-pressed` on the play/pause button.
    pub pressed: bool,
    pub time_value: f64,
    pub time_max: f64,
    pub speed_value: f64,
    /// "Year Y, Month M, Day D".
    pub time_label: String,
}

#[derive(Debug, Clone, Copy)]
struct BodyHandles {
    sun: EntityId,
    earth: EntityId,
    moon: EntityId,
    moon_ring: Option<EntityId>,
}

pub struct Orrery {
    config: SceneConfig,
    sim: SimulationState,
    scene: Scene,
    bodies: BodyHandles,
    textures: TextureRegistry,
    lighting: LightingState,
    camera: PerspectiveCamera,
    controller: OrbitController,
    profile: ViewportProfile,
    viewport: Viewport,
    pending_resize: Debouncer<Viewport>,
    rehome_after_drag: bool,
    scheduler: FrameScheduler,
}

impl Orrery {
    /// Build the scene for `config` in a container of `viewport` pixels.
    pub fn new(config: SceneConfig, viewport: Viewport) -> Result<Self, EngineError> {
        if !viewport.is_valid() {
            return Err(EngineError::InvalidViewport {
                width: viewport.width,
                height: viewport.height,
            });
        }
        config.validate()?;

        let sim = SimulationState::new(&config)?;
        let profile = ViewportProfile::for_width(viewport.width, config.camera.narrow_breakpoint);
        let settings = profile.settings(&config.camera).clone();

        let mut camera = PerspectiveCamera::new(&config.camera, viewport)?;
        let mut controller =
            OrbitController::new(&config.camera, settings.min_distance, settings.max_distance);
        controller.home(&mut camera, Vec3::from_array(settings.home));

        let mut textures = TextureRegistry::new();
        let mut scene = Scene::with_capacity(8);
        let bodies = populate_scene(&mut scene, &mut textures, &config, &sim, profile)?;

        log::info!(
            "orrery '{}' ready: {} entities, {} meshes, {:?} profile, cycle {} days",
            config.name,
            scene.len(),
            scene.meshes().count(),
            profile,
            sim.time.cycle_days()
        );

        let pending_resize = Debouncer::new(config.camera.resize_quiet_ms);
        let mut orrery = Self {
            config,
            sim,
            scene,
            bodies,
            textures,
            lighting: LightingState::default(),
            camera,
            controller,
            profile,
            viewport,
            pending_resize,
            rehome_after_drag: false,
            scheduler: FrameScheduler::new(),
        };
        orrery.sync_scene();
        Ok(orrery)
    }

    /// Build from a named preset.
    pub fn from_preset(name: &str, viewport: Viewport) -> Result<Self, EngineError> {
        Self::new(SceneConfig::preset(name)?, viewport)
    }

    // -- Accessors --

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn simulation(&self) -> &SimulationState {
        &self.sim
    }

    pub fn poses(&self) -> Poses {
        self.sim.poses
    }

    pub fn day(&self) -> f64 {
        self.sim.time.day()
    }

    pub fn is_playing(&self) -> bool {
        self.sim.time.is_playing()
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn camera(&self) -> &PerspectiveCamera {
        &self.camera
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn profile(&self) -> ViewportProfile {
        self.profile
    }

    pub fn scheduler(&self) -> &FrameScheduler {
        &self.scheduler
    }

    pub fn textures(&self) -> &TextureRegistry {
        &self.textures
    }

    /// The shell reports texture load completion and failure through this.
    pub fn textures_mut(&mut self) -> &mut TextureRegistry {
        &mut self.textures
    }

    /// Upload every scene mesh to `renderer`. Call once after construction.
    pub fn upload_meshes<R: Renderer>(&self, renderer: &mut R) -> Result<(), R::Error> {
        for (id, mesh) in self.scene.meshes() {
            renderer.upload_mesh(id, mesh)?;
        }
        Ok(())
    }

    // -- Playback --

    pub fn toggle_play(&mut self) -> PlayState {
        let state = self.sim.time.toggle();
        self.sync_simulation_task();
        log::debug!("playback {:?} at day {:.2}", state, self.sim.time.day());
        state
    }

    /// Pause, rewind to day 0 and put the camera back at its home pose.
    pub fn reset(&mut self) {
        self.sim.time.reset();
        self.sync_simulation_task();
        self.sim.recompute();
        self.sync_scene();
        self.rehome_when_idle();
    }

    /// Jump to an absolute day. Poses are recomputed before returning.
    /// Returns whether the caller should redraw straight away.
    pub fn scrub(&mut self, day: f64) -> bool {
        if !self.sim.time.scrub(day) {
            return false;
        }
        self.sim.recompute();
        self.sync_scene();
        match self.config.playback.scrub_redraw {
            ScrubRedraw::Immediate => true,
            ScrubRedraw::NextFrame => false,
        }
    }

    pub fn set_speed(&mut self, speed: f64) -> bool {
        self.sim.time.set_speed(speed)
    }

    /// Apply a keyboard shortcut. Returns whether the browser default
    /// (page scroll on space) should be suppressed.
    pub fn handle_key(&mut self, key: &str) -> bool {
        match KeyAction::from_key(key) {
            Some(action) => {
                self.apply_key(action);
                true
            }
            None => false,
        }
    }

    fn apply_key(&mut self, action: KeyAction) {
        match action {
            KeyAction::TogglePlay => {
                self.toggle_play();
            }
            KeyAction::Reset => self.reset(),
        }
    }

    /// Dispatch one queued input event. Returns whether an immediate redraw
    /// was requested.
    pub fn handle_input(&mut self, event: InputEvent, now_ms: f64) -> bool {
        match event {
            InputEvent::PointerDown { x, y } => self.pointer_down(x, y),
            InputEvent::PointerMove { x, y } => self.pointer_move(x, y),
            InputEvent::PointerUp => self.pointer_up(),
            InputEvent::Wheel { delta_y } => self.wheel(delta_y),
            InputEvent::Key(action) => self.apply_key(action),
            InputEvent::TogglePlay => {
                self.toggle_play();
            }
            InputEvent::Reset => self.reset(),
            InputEvent::Scrub { day } => return self.scrub(day),
            InputEvent::SetSpeed { speed } => {
                self.set_speed(speed);
            }
            InputEvent::Resize { width, height } => self.resize(width, height, now_ms),
        }
        false
    }

    // -- Camera --

    pub fn pointer_down(&mut self, x: f32, y: f32) {
        self.controller.pointer_down(Vec2::new(x, y));
    }

    pub fn pointer_move(&mut self, x: f32, y: f32) {
        self.controller.pointer_move(Vec2::new(x, y), self.viewport.height);
    }

    pub fn pointer_up(&mut self) {
        self.controller.pointer_up();
        if self.rehome_after_drag {
            self.rehome_after_drag = false;
            self.rehome();
        }
    }

    pub fn wheel(&mut self, delta_y: f32) {
        self.controller.wheel(delta_y);
    }

    pub fn is_dragging(&self) -> bool {
        self.controller.is_dragging()
    }

    /// Record a container resize. Only the last size inside a burst is
    /// applied, once the quiet period has elapsed (see [`Orrery::frame`]).
    pub fn resize(&mut self, width: f32, height: f32, now_ms: f64) {
        let viewport = Viewport::new(width, height);
        if !viewport.is_valid() {
            log::warn!("ignoring resize to {width}x{height}");
            return;
        }
        self.pending_resize.schedule(now_ms, viewport);
    }

    pub fn resize_pending(&self) -> bool {
        self.pending_resize.is_pending()
    }

    fn apply_viewport(&mut self, viewport: Viewport) {
        if self.camera.set_viewport(viewport).is_err() {
            return;
        }
        self.viewport = viewport;
        self.profile = ViewportProfile::for_width(viewport.width, self.config.camera.narrow_breakpoint);
        self.rehome_when_idle();
        log::debug!(
            "applied resize {}x{} ({:?})",
            viewport.width,
            viewport.height,
            self.profile
        );
    }

    /// Re-home now, or on pointer-up if a drag is in progress.
    fn rehome_when_idle(&mut self) {
        if self.controller.is_dragging() {
            self.rehome_after_drag = true;
        } else {
            self.rehome();
        }
    }

    /// Apply the current profile's distance bounds and home pose.
    fn rehome(&mut self) {
        let settings = self.profile.settings(&self.config.camera);
        let home = Vec3::from_array(settings.home);
        self.controller
            .set_distance_bounds(settings.min_distance, settings.max_distance);
        self.controller.home(&mut self.camera, home);
    }

    // -- Frame pacing --

    /// Stop producing frames (e.g. while the page is hidden).
    pub fn suspend_rendering(&mut self) {
        self.scheduler.task_mut(TaskKind::Render).cancel();
    }

    pub fn resume_rendering(&mut self) {
        self.scheduler.task_mut(TaskKind::Render).start();
    }

    /// One display refresh: advance the clock if playing, apply a settled
    /// resize, update the damped camera and build the frame. Returns `None`
    /// when rendering is suspended.
    pub fn frame(&mut self, now_ms: f64) -> Option<FrameData> {
        let plan = self.scheduler.begin_frame();

        if plan.simulate && self.sim.time.advance() {
            self.sim.recompute();
            self.sync_scene();
        }

        if let Some(viewport) = self.pending_resize.poll(now_ms) {
            self.apply_viewport(viewport);
        }

        if !plan.render {
            return None;
        }
        self.controller.update(&mut self.camera);
        Some(self.render_frame())
    }

    /// Build a frame from the current state without advancing anything.
    pub fn render_frame(&self) -> FrameData {
        build_frame(
            &self.scene,
            FrameInputs {
                camera: &self.camera,
                viewport: self.viewport,
                lighting: &self.lighting,
                textures: &self.textures,
                clear_color: self.config.decorations.background,
                lines: self.reference_lines(),
            },
        )
    }

    pub fn controls(&self) -> ControlsView {
        let time = &self.sim.time;
        let playing = time.is_playing();
        ControlsView {
            play_label: if playing { "Pause" } else { "Play" },
            pressed: playing,
            time_value: time.day(),
            time_max: time.cycle_days(),
            speed_value: time.speed(),
            time_label: time.date().to_string(),
        }
    }

    // -- Internals --

    fn sync_simulation_task(&mut self) {
        let task = self.scheduler.task_mut(TaskKind::Simulation);
        if self.sim.time.is_playing() {
            task.start();
        } else {
            task.cancel();
        }
    }

    /// Copy poses into the body entities and the light rig.
    fn sync_scene(&mut self) {
        let poses = self.sim.poses;
        let handles = self.bodies;
        for (id, pos) in [
            (handles.sun, poses.sun),
            (handles.earth, poses.earth),
            (handles.moon, poses.moon),
        ] {
            if let Some(entity) = self.scene.get_mut(id) {
                entity.pos = pos;
            }
        }
        if let Some(ring) = handles.moon_ring.and_then(|id| self.scene.get_mut(id)) {
            ring.pos = poses.earth;
        }
        self.lighting.follow_sun(poses.sun);
    }

    fn reference_lines(&self) -> Vec<LineStrip> {
        let decorations = &self.config.decorations;
        if !decorations.reference_lines {
            return Vec::new();
        }
        let poses = self.sim.poses;
        vec![
            LineStrip {
                points: vec![poses.sun, poses.earth],
                color: decorations.reference_color,
                opacity: 0.5,
            },
            LineStrip {
                points: vec![poses.earth, poses.moon],
                color: decorations.reference_color,
                opacity: 0.5,
            },
        ]
    }
}

/// Spawn bodies, orbit tubes, the optional Moon ring and the starfield.
fn populate_scene(
    scene: &mut Scene,
    textures: &mut TextureRegistry,
    config: &SceneConfig,
    sim: &SimulationState,
    profile: ViewportProfile,
) -> Result<BodyHandles, EngineError> {
    let settings = profile.settings(&config.camera);

    let sphere = scene.add_mesh(uv_sphere(1.0, settings.sphere_segments, settings.sphere_segments));
    let mut spawn_body = |scene: &mut Scene, tag: &str, style: &BodyStyle| {
        let texture = style.texture.as_deref().map(|url| textures.register(url));
        let material = Material::standard(style.color)
            .with_emissive(style.emissive)
            .with_roughness(style.roughness, style.metalness)
            .with_texture(texture);
        let id = scene.next_id();
        scene.spawn(
            Entity::new(id)
                .with_tag(tag)
                .with_scale(Vec3::splat(style.radius))
                .with_mesh(MeshComponent::new(sphere, material)),
        )
    };
    let sun = spawn_body(scene, "sun", &config.bodies.sun);
    let earth = spawn_body(scene, "earth", &config.bodies.earth);
    let moon = spawn_body(scene, "moon", &config.bodies.moon);

    let orbit = &config.earth_orbit;
    let earth_path = &sim.system.earth_path;
    let earth_tube = tube(
        earth_path,
        earth_path.segments(),
        orbit.tube_radius,
        orbit.tube_radial_segments,
        earth_path.is_closed(CLOSED_PATH_EPS),
    )?;
    spawn_static(scene, "earth_orbit", earth_tube, Material::translucent(orbit.color, orbit.opacity));

    let mut moon_ring = None;
    match &config.moon {
        MoonConfig::SpiralPath { tube_radius, color, opacity, .. } => {
            if let Some(path) = sim.system.moon_path() {
                let mesh = tube(path, path.segments(), *tube_radius, orbit.tube_radial_segments, false)?;
                spawn_static(scene, "moon_orbit", mesh, Material::translucent(*color, *opacity));
            }
        }
        MoonConfig::EarthOffset { radius, scale, plane, ring, ring_tube, color, opacity } => {
            if *ring {
                let mesh = torus(radius * scale, *ring_tube, RING_RADIAL_SEGMENTS, RING_TUBULAR_SEGMENTS);
                let mesh_id = scene.add_mesh(mesh);
                let id = scene.next_id();
                moon_ring = Some(scene.spawn(
                    Entity::new(id)
                        .with_tag("moon_ring")
                        .with_rotation(plane.rotation_from_xy())
                        .with_mesh(MeshComponent::new(mesh_id, Material::translucent(*color, *opacity))),
                ));
            }
        }
    }

    let decorations = &config.decorations;
    if decorations.stars && settings.star_count > 0 {
        let stars = starfield(settings.star_count, decorations.star_extent, decorations.star_seed);
        spawn_static(
            scene,
            "stars",
            MeshData::points(&stars),
            Material::points(Rgb::WHITE, STAR_SIZE),
        );
    }

    Ok(BodyHandles { sun, earth, moon, moon_ring })
}

fn spawn_static(scene: &mut Scene, tag: &str, mesh: MeshData, material: Material) -> EntityId {
    let mesh_id = scene.add_mesh(mesh);
    let id = scene.next_id();
    scene.spawn(
        Entity::new(id)
            .with_tag(tag)
            .with_mesh(MeshComponent::new(mesh_id, material)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::MeshId;
    use crate::geometry::mesh::Topology;

    /// Renderer stub that records what it was asked to do.
    #[derive(Default)]
    struct RecordingRenderer {
        uploads: Vec<(MeshId, usize, Topology)>,
        frames: Vec<FrameData>,
        viewports: Vec<Viewport>,
    }

    impl Renderer for RecordingRenderer {
        type Error = String;

        fn backend(&self) -> &'static str {
            "recording"
        }

        fn upload_mesh(&mut self, id: MeshId, mesh: &MeshData) -> Result<(), String> {
            self.uploads.push((id, mesh.vertex_count(), mesh.topology));
            Ok(())
        }

        fn resize(&mut self, viewport: Viewport) {
            self.viewports.push(viewport);
        }

        fn draw(&mut self, frame: &FrameData) {
            self.frames.push(frame.clone());
        }
    }

    fn wide() -> Viewport {
        Viewport::new(1024.0, 768.0)
    }

    fn orrery() -> Orrery {
        Orrery::new(SceneConfig::spiral(), wide()).unwrap()
    }

    fn entity_pos(o: &Orrery, tag: &str) -> Vec3 {
        o.scene().find_by_tag(tag).unwrap().pos
    }

    /// Narrow home is (600, 300, 600), pulled in to the 800 max distance.
    fn at_narrow_home(o: &Orrery) -> bool {
        let cam = o.camera();
        let dir = Vec3::new(600.0, 300.0, 600.0).normalize();
        (cam.position.normalize() - dir).length() < 1e-3 && (cam.distance() - 800.0).abs() < 0.1
    }

    #[test]
    fn zero_sized_container_is_rejected() {
        let err = Orrery::new(SceneConfig::spiral(), Viewport::new(0.0, 0.0)).err().unwrap();
        assert!(matches!(err, EngineError::InvalidViewport { .. }));
    }

    #[test]
    fn unknown_preset_is_rejected() {
        let err = Orrery::from_preset("nope", wide()).err().unwrap();
        assert!(matches!(err, EngineError::UnknownPreset(_)));
    }

    #[test]
    fn starts_paused_at_day_zero_with_bodies_placed() {
        let o = orrery();
        assert!(!o.is_playing());
        assert_eq!(o.day(), 0.0);
        let earth0 = o.simulation().system.earth_path.first();
        assert!((entity_pos(&o, "earth") - earth0).length() < 1e-3);
        assert_eq!(entity_pos(&o, "sun"), Vec3::ZERO);
        let view = o.controls();
        assert_eq!(view.play_label, "Play");
        assert!(!view.pressed);
        assert_eq!(view.time_max, 1440.0);
        assert_eq!(view.time_label, "Year 1, Month 1, Day 1");
    }

    #[test]
    fn spawns_expected_entities() {
        let o = orrery();
        for tag in ["sun", "earth", "moon", "earth_orbit", "moon_orbit", "stars"] {
            assert!(o.scene().find_by_tag(tag).is_some(), "missing {tag}");
        }
        assert!(o.scene().find_by_tag("moon_ring").is_none());

        let cal = Orrery::from_preset("calendar", wide()).unwrap();
        assert!(cal.scene().find_by_tag("moon_ring").is_some());
        assert!(cal.scene().find_by_tag("moon_orbit").is_none());
    }

    #[test]
    fn paused_frames_do_not_advance_the_clock() {
        let mut o = orrery();
        for i in 0..10 {
            assert!(o.frame(i as f64 * 16.0).is_some());
        }
        assert_eq!(o.day(), 0.0);
        assert_eq!(o.scheduler().task(TaskKind::Simulation).runs(), 0);
        assert_eq!(o.scheduler().task(TaskKind::Render).runs(), 10);
    }

    #[test]
    fn playing_advances_by_speed_per_frame() {
        let mut o = orrery();
        assert_eq!(o.toggle_play(), PlayState::Playing);
        o.frame(0.0);
        o.frame(16.0);
        assert!((o.day() - 1.0).abs() < 1e-9);
        let view = o.controls();
        assert_eq!(view.play_label, "Pause");
        assert!(view.pressed);
    }

    #[test]
    fn simulation_runs_before_render_in_a_frame() {
        let mut o = orrery();
        o.toggle_play();
        let frame = o.frame(0.0).unwrap();
        let earth = o.simulation().system.earth_path.point_at((0.5 / 1440.0) as f32);
        let drawn = frame
            .opaque
            .iter()
            .map(|d| d.model.w_axis.truncate())
            .any(|p| (p - earth).length() < 1e-3);
        assert!(drawn, "frame should show the post-tick Earth pose");
    }

    #[test]
    fn reset_pauses_and_rewinds() {
        let mut o = orrery();
        let day0 = o.poses();
        o.toggle_play();
        for i in 0..100 {
            o.frame(i as f64);
        }
        assert!(o.day() > 0.0);
        o.reset();
        assert!(!o.is_playing());
        assert_eq!(o.day(), 0.0);
        assert_eq!(o.poses(), day0);
        assert_eq!(entity_pos(&o, "earth"), day0.earth);
        assert_eq!(entity_pos(&o, "moon"), day0.moon);
        assert!(!o.scheduler().task(TaskKind::Simulation).is_active());
    }

    /// Wide home is (500, 250, 500), inside the wide distance bounds.
    fn at_wide_home(o: &Orrery) -> bool {
        (o.camera().position - Vec3::new(500.0, 250.0, 500.0)).length() < 1e-2
    }

    #[test]
    fn reset_restores_home_camera() {
        let mut o = orrery();
        assert!(at_wide_home(&o));
        o.pointer_down(0.0, 0.0);
        o.pointer_move(200.0, 50.0);
        o.pointer_up();
        for i in 0..60 {
            o.frame(i as f64 * 16.0);
        }
        o.wheel(120.0);
        o.frame(1000.0);
        assert!(!at_wide_home(&o));

        o.reset();
        assert!(at_wide_home(&o));
        o.frame(1016.0);
        assert!(at_wide_home(&o), "leftover drag momentum must not move a reset camera");
    }

    #[test]
    fn reset_during_drag_rehomes_on_release() {
        let mut o = orrery();
        o.pointer_down(0.0, 0.0);
        o.pointer_move(200.0, 0.0);
        o.frame(0.0);
        o.reset();
        assert!(!at_wide_home(&o));
        o.pointer_up();
        assert!(at_wide_home(&o));
    }

    #[test]
    fn scrub_to_half_cycle_places_earth_at_path_midpoint() {
        let mut o = orrery();
        assert!(o.scrub(720.0));
        let expected = o.simulation().system.earth_path.point_at(0.5);
        assert_eq!(o.poses().earth, expected);
        assert_eq!(entity_pos(&o, "earth"), expected);
        assert!(!o.is_playing());
        assert_eq!(o.controls().time_label, "Year 3, Month 1, Day 1");
    }

    #[test]
    fn scrub_redraw_policy() {
        let mut config = SceneConfig::spiral();
        config.playback.scrub_redraw = ScrubRedraw::NextFrame;
        let mut o = Orrery::new(config, wide()).unwrap();
        assert!(!o.scrub(100.0));
        assert_eq!(o.day(), 100.0);
        assert!(!o.scrub(f64::NAN));
        assert_eq!(o.day(), 100.0);
    }

    #[test]
    fn non_finite_controls_never_reach_poses() {
        let mut o = orrery();
        o.scrub(f64::INFINITY);
        o.set_speed(f64::NAN);
        o.toggle_play();
        o.frame(0.0);
        let p = o.poses();
        assert!(p.earth.is_finite() && p.moon.is_finite());
        o.scrub(-50.0);
        assert_eq!(o.day(), 0.0);
    }

    #[test]
    fn pose_is_a_function_of_the_day() {
        let mut a = orrery();
        let mut b = orrery();
        a.toggle_play();
        for i in 0..40 {
            a.frame(i as f64);
        }
        b.scrub(a.day());
        assert_eq!(a.poses(), b.poses());
        let before = b.poses();
        b.scrub(b.day());
        assert_eq!(b.poses(), before);
    }

    #[test]
    fn keys_toggle_and_reset() {
        let mut o = orrery();
        assert!(o.handle_key(" "));
        assert!(o.is_playing());
        o.frame(0.0);
        assert!(o.handle_key("r"));
        assert!(!o.is_playing());
        assert_eq!(o.day(), 0.0);
        assert!(!o.handle_key("x"));
    }

    #[test]
    fn resize_is_debounced_and_only_last_size_applies() {
        let mut o = orrery();
        assert_eq!(o.profile(), ViewportProfile::Wide);
        o.resize(900.0, 700.0, 0.0);
        o.resize(400.0, 800.0, 100.0);
        o.frame(200.0);
        assert!((o.camera().aspect - 1024.0 / 768.0).abs() < 1e-6);
        o.frame(349.0);
        assert!((o.camera().aspect - 1024.0 / 768.0).abs() < 1e-6);
        o.frame(350.0);
        assert!((o.camera().aspect - 0.5).abs() < 1e-6);
        assert_eq!(o.profile(), ViewportProfile::Narrow);
        assert!(at_narrow_home(&o));
        assert!(!o.resize_pending());
    }

    #[test]
    fn resize_during_drag_defers_rehome() {
        let mut o = orrery();
        o.pointer_down(10.0, 10.0);
        o.pointer_move(40.0, 10.0);
        o.resize(400.0, 800.0, 0.0);
        o.frame(300.0);
        assert!((o.camera().aspect - 0.5).abs() < 1e-6);
        assert!(!at_narrow_home(&o));
        o.pointer_up();
        assert!(at_narrow_home(&o));
    }

    #[test]
    fn resize_during_drag_keeps_distance_bounds_until_release() {
        let mut o = orrery();
        for _ in 0..6 {
            o.wheel(120.0);
        }
        o.frame(0.0);
        let zoomed = o.camera().distance();
        assert!(zoomed > 800.0 && zoomed < 1200.0, "zoomed out to {zoomed}");

        o.pointer_down(10.0, 10.0);
        o.resize(400.0, 800.0, 0.0);
        o.frame(300.0);
        assert_eq!(o.profile(), ViewportProfile::Narrow);
        assert!((o.camera().distance() - zoomed).abs() < 1e-2);

        o.pointer_up();
        assert!(at_narrow_home(&o));
        o.frame(316.0);
        assert!(o.camera().distance() <= 800.0 + 1e-2);
    }

    #[test]
    fn zero_sized_resize_is_ignored() {
        let mut o = orrery();
        o.resize(0.0, 0.0, 0.0);
        assert!(!o.resize_pending());
        o.frame(1000.0);
        assert_eq!(o.viewport(), wide());
    }

    #[test]
    fn camera_stays_interactive_while_paused() {
        let mut o = orrery();
        let start = o.camera().position;
        o.pointer_down(0.0, 0.0);
        o.pointer_move(50.0, 0.0);
        o.pointer_up();
        o.frame(0.0);
        assert!(!o.is_playing());
        assert!((o.camera().position - start).length() > 1e-3);
    }

    #[test]
    fn suspended_rendering_still_ticks() {
        let mut o = orrery();
        o.toggle_play();
        o.suspend_rendering();
        assert!(o.frame(0.0).is_none());
        assert!(o.day() > 0.0);
        o.resume_rendering();
        assert!(o.frame(16.0).is_some());
    }

    #[test]
    fn uploads_every_mesh_once() {
        let o = orrery();
        let mut r = RecordingRenderer::default();
        o.upload_meshes(&mut r).unwrap();
        assert_eq!(r.uploads.len(), o.scene().meshes().count());
        assert!(r.uploads.iter().any(|u| u.2 == Topology::Points && u.1 == 2000));
        r.resize(o.viewport());
        r.draw(&o.render_frame());
        assert_eq!(r.frames.len(), 1);
        assert_eq!(r.backend(), "recording");
    }

    #[test]
    fn frame_contents() {
        let mut o = Orrery::from_preset("calendar", wide()).unwrap();
        let frame = o.frame(0.0).unwrap();
        assert_eq!(frame.opaque.len(), 3);
        // Earth orbit tube + Moon ring.
        assert_eq!(frame.translucent.len(), 2);
        assert_eq!(frame.points.len(), 1);
        assert_eq!(frame.lines.len(), 2);
        assert_eq!(frame.lines[0].points[1], o.poses().earth);
    }

    #[test]
    fn ring_follows_earth() {
        let mut o = Orrery::from_preset("calendar", wide()).unwrap();
        o.scrub(100.0);
        assert_eq!(entity_pos(&o, "moon_ring"), o.poses().earth);
        let d = o.poses().moon.distance(o.poses().earth);
        assert!((d - 30.0).abs() < 1e-2);
    }

    #[test]
    fn textures_fall_back_until_loaded() {
        let mut o = Orrery::from_preset("textured", wide()).unwrap();
        assert_eq!(o.textures().len(), 3);
        let frame = o.render_frame();
        assert!(frame.opaque.iter().all(|d| d.material.texture.is_none()));
        let ids: Vec<_> = o.textures().iter().map(|(id, _, _)| id).collect();
        o.textures_mut().mark_loaded(ids[1]);
        o.textures_mut().mark_failed(ids[2]);
        let frame = o.render_frame();
        assert_eq!(frame.opaque.iter().filter(|d| d.material.texture.is_some()).count(), 1);
    }

    #[test]
    fn narrow_container_uses_narrow_profile() {
        let o = Orrery::new(SceneConfig::spiral(), Viewport::new(400.0, 800.0)).unwrap();
        assert_eq!(o.profile(), ViewportProfile::Narrow);
        let mut r = RecordingRenderer::default();
        o.upload_meshes(&mut r).unwrap();
        assert!(r.uploads.iter().any(|u| u.2 == Topology::Points && u.1 == 1000));
    }

    #[test]
    fn input_events_dispatch() {
        let mut o = orrery();
        o.handle_input(InputEvent::TogglePlay, 0.0);
        assert!(o.is_playing());
        o.handle_input(InputEvent::SetSpeed { speed: 2.0 }, 0.0);
        assert_eq!(o.controls().speed_value, 2.0);
        assert!(o.handle_input(InputEvent::Scrub { day: 30.0 }, 0.0));
        assert_eq!(o.controls().time_label, "Year 1, Month 2, Day 1");
        o.handle_input(InputEvent::Key(KeyAction::Reset), 0.0);
        assert!(!o.is_playing());
        o.handle_input(InputEvent::Resize { width: 500.0, height: 500.0 }, 0.0);
        assert!(o.resize_pending());
    }
}
