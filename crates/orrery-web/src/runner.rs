use orrery_engine::{ControlsView, FrameData, InputEvent, InputQueue, Orrery, PlayState, Renderer, Viewport};

/// Wires an [`Orrery`] to a [`Renderer`] and paces it from the
/// animation-frame callback.
///
/// Pointer, wheel and resize events are queued and applied at the start of
/// the next frame; button, slider and keyboard input is applied straight
/// away because the caller needs the result (redraw request, default
/// suppression).
pub struct OrreryRunner<R: Renderer> {
    orrery: Orrery,
    renderer: R,
    input: InputQueue,
    surface: Viewport,
    frames_drawn: u64,
}

impl<R: Renderer> OrreryRunner<R> {
    /// Upload all meshes and size the drawing surface.
    pub fn new(orrery: Orrery, mut renderer: R) -> Result<Self, R::Error> {
        orrery.upload_meshes(&mut renderer)?;
        let surface = orrery.viewport();
        renderer.resize(surface);
        log::info!(
            "runner ready on {} backend, {}x{}",
            renderer.backend(),
            surface.width,
            surface.height
        );
        Ok(Self {
            orrery,
            renderer,
            input: InputQueue::new(),
            surface,
            frames_drawn: 0,
        })
    }

    pub fn orrery(&self) -> &Orrery {
        &self.orrery
    }

    pub fn orrery_mut(&mut self) -> &mut Orrery {
        &mut self.orrery
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn frames_drawn(&self) -> u64 {
        self.frames_drawn
    }

    pub fn push_input(&mut self, event: InputEvent) {
        self.input.push(event);
    }

    /// One display refresh.
    pub fn tick(&mut self, now_ms: f64) {
        for event in self.input.drain() {
            self.orrery.handle_input(event, now_ms);
        }

        let frame = self.orrery.frame(now_ms);

        let viewport = self.orrery.viewport();
        if viewport != self.surface {
            self.renderer.resize(viewport);
            self.surface = viewport;
        }

        if let Some(frame) = frame {
            self.draw(&frame);
        }
    }

    fn draw(&mut self, frame: &FrameData) {
        self.renderer.draw(frame);
        self.frames_drawn += 1;
    }

    pub fn toggle(&mut self) -> PlayState {
        self.orrery.toggle_play()
    }

    pub fn reset(&mut self) {
        self.orrery.reset();
    }

    /// Scrub, redrawing immediately when the scene asks for it.
    pub fn scrub(&mut self, day: f64) {
        if self.orrery.scrub(day) {
            let frame = self.orrery.render_frame();
            self.draw(&frame);
        }
    }

    pub fn set_speed(&mut self, speed: f64) {
        self.orrery.set_speed(speed);
    }

    /// Returns whether the key's default action should be suppressed.
    pub fn handle_key(&mut self, key: &str) -> bool {
        self.orrery.handle_key(key)
    }

    pub fn controls(&self) -> ControlsView {
        self.orrery.controls()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orrery_engine::{MeshData, MeshId, SceneConfig, ScrubRedraw};

    #[derive(Default)]
    struct CountingRenderer {
        uploads: usize,
        draws: usize,
        resizes: Vec<Viewport>,
    }

    impl Renderer for CountingRenderer {
        type Error = String;

        fn backend(&self) -> &'static str {
            "counting"
        }

        fn upload_mesh(&mut self, _id: MeshId, _mesh: &MeshData) -> Result<(), String> {
            self.uploads += 1;
            Ok(())
        }

        fn resize(&mut self, viewport: Viewport) {
            self.resizes.push(viewport);
        }

        fn draw(&mut self, _frame: &FrameData) {
            self.draws += 1;
        }
    }

    fn runner(config: SceneConfig) -> OrreryRunner<CountingRenderer> {
        let orrery = Orrery::new(config, Viewport::new(1024.0, 768.0)).unwrap();
        OrreryRunner::new(orrery, CountingRenderer::default()).unwrap()
    }

    #[test]
    fn new_uploads_and_sizes() {
        let r = runner(SceneConfig::spiral());
        assert_eq!(r.renderer().uploads, r.orrery().scene().meshes().count());
        assert_eq!(r.renderer().resizes, vec![Viewport::new(1024.0, 768.0)]);
    }

    #[test]
    fn draws_every_tick_even_when_paused() {
        let mut r = runner(SceneConfig::spiral());
        for i in 0..5 {
            r.tick(i as f64 * 16.0);
        }
        assert_eq!(r.renderer().draws, 5);
        assert_eq!(r.orrery().day(), 0.0);
    }

    #[test]
    fn scrub_redraws_per_policy() {
        let mut r = runner(SceneConfig::spiral());
        r.scrub(100.0);
        assert_eq!(r.frames_drawn(), 1);

        let mut config = SceneConfig::spiral();
        config.playback.scrub_redraw = ScrubRedraw::NextFrame;
        let mut r = runner(config);
        r.scrub(100.0);
        assert_eq!(r.frames_drawn(), 0);
        assert_eq!(r.orrery().day(), 100.0);
    }

    #[test]
    fn queued_resize_reaches_renderer_after_quiet_period() {
        let mut r = runner(SceneConfig::spiral());
        r.push_input(InputEvent::Resize { width: 400.0, height: 800.0 });
        r.tick(0.0);
        assert_eq!(r.renderer().resizes.len(), 1);
        r.tick(100.0);
        assert_eq!(r.renderer().resizes.len(), 1);
        r.tick(260.0);
        assert_eq!(r.renderer().resizes.last(), Some(&Viewport::new(400.0, 800.0)));
    }

    #[test]
    fn controls_follow_playback() {
        let mut r = runner(SceneConfig::spiral());
        assert_eq!(r.toggle(), PlayState::Playing);
        r.tick(0.0);
        let view = r.controls();
        assert_eq!(view.play_label, "Pause");
        assert_eq!(view.time_value, 0.5);
        assert!(r.handle_key("r"));
        assert_eq!(r.controls().play_label, "Play");
        r.set_speed(3.0);
        assert_eq!(r.controls().speed_value, 3.0);
        r.reset();
        assert_eq!(r.controls().time_value, 0.0);
    }
}
