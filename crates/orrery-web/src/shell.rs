//! Browser bring-up: canvas, renderer, controls, listeners, texture loading
//! and the animation-frame pump.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use orrery_engine::{EngineError, InputEvent, Orrery, SceneConfig, TextureId, Viewport};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{
    Document, Event, EventTarget, HtmlCanvasElement, HtmlElement, HtmlImageElement,
    KeyboardEvent, PointerEvent, WheelEvent, Window,
};

use crate::dom::{self, Controls};
use crate::error::ShellError;
use crate::runner::OrreryRunner;
use crate::webgl::WebGlRenderer;

pub type SharedShell = Rc<RefCell<Shell>>;

/// Everything the page keeps alive: the runner plus its DOM handles.
pub struct Shell {
    runner: OrreryRunner<WebGlRenderer>,
    controls: Controls,
    container: HtmlElement,
}

impl Shell {
    pub fn runner(&self) -> &OrreryRunner<WebGlRenderer> {
        &self.runner
    }

    /// Animation-frame callback body.
    pub fn frame(&mut self, now_ms: f64) {
        self.runner.tick(now_ms);
        self.sync_controls();
    }

    pub fn sync_controls(&mut self) {
        let view = self.runner.controls();
        self.controls.show(&view);
    }

    pub fn toggle(&mut self) {
        self.runner.toggle();
        self.sync_controls();
    }

    pub fn reset(&mut self) {
        self.runner.reset();
        self.sync_controls();
    }

    pub fn scrub(&mut self, day: f64) {
        self.runner.scrub(day);
        self.sync_controls();
    }

    pub fn set_speed(&mut self, speed: f64) {
        self.runner.set_speed(speed);
    }

    fn container_viewport(&self) -> Viewport {
        Viewport::new(
            self.container.client_width() as f32,
            self.container.client_height() as f32,
        )
    }

    fn texture_loaded(&mut self, id: TextureId, image: &HtmlImageElement) {
        match self.runner.renderer_mut().upload_texture(id, image) {
            Ok(()) => self.runner.orrery_mut().textures_mut().mark_loaded(id),
            Err(err) => {
                log::warn!("texture upload failed: {err}");
                self.runner.orrery_mut().textures_mut().mark_failed(id);
            }
        }
    }

    fn texture_failed(&mut self, id: TextureId) {
        self.runner.orrery_mut().textures_mut().mark_failed(id);
    }
}

/// Start the orrery inside `#container_id`. On failure a visible message is
/// placed in the container (or the body) and the error is logged.
pub fn launch(
    app: &str,
    container_id: &str,
    config: Result<SceneConfig, EngineError>,
) -> Result<SharedShell, ShellError> {
    let result = config
        .map_err(ShellError::from)
        .and_then(|config| start(container_id, config));

    match result {
        Ok(shell) => {
            log::info!("{app}: started in #{container_id}");
            Ok(shell)
        }
        Err(err) => {
            log::error!("{app}: startup failed: {err}");
            if let Some(document) = web_sys::window().and_then(|w| w.document()) {
                let container = document.get_element_by_id(container_id);
                dom::show_error(&document, container.as_ref(), &format!("Could not start: {err}"));
            }
            Err(err)
        }
    }
}

fn start(container_id: &str, config: SceneConfig) -> Result<SharedShell, ShellError> {
    let window = web_sys::window().ok_or(ShellError::NoWindow)?;
    let document = window.document().ok_or(ShellError::NoWindow)?;
    let container: HtmlElement = dom::element(&document, container_id)?;

    let viewport = Viewport::new(container.client_width() as f32, container.client_height() as f32);
    if !viewport.is_valid() {
        return Err(ShellError::ZeroSizedContainer(container_id.to_string()));
    }
    log::info!("preset '{}' in {}x{} container", config.name, viewport.width, viewport.height);

    let mut controls = Controls::find(&document)?;
    let canvas = create_canvas(&document, &container)?;
    let renderer = WebGlRenderer::new(canvas.clone(), window.device_pixel_ratio())?;
    let orrery = Orrery::new(config, viewport)?;
    let runner = OrreryRunner::new(orrery, renderer)?;

    controls.init(&runner.controls());

    let shell = Rc::new(RefCell::new(Shell { runner, controls, container }));

    wire_controls(&shell)?;
    wire_camera(&shell, &canvas)?;
    wire_window(&shell, &window, &document)?;
    load_textures(&shell)?;
    start_animation_loop(&window, &shell)?;

    Ok(shell)
}

fn create_canvas(document: &Document, container: &HtmlElement) -> Result<HtmlCanvasElement, ShellError> {
    let canvas = document
        .create_element("canvas")?
        .dyn_into::<HtmlCanvasElement>()
        .map_err(|_| ShellError::Js("created element is not a canvas".into()))?;
    let style = canvas.style();
    style.set_property("display", "block")?;
    style.set_property("width", "100%")?;
    style.set_property("height", "100%")?;
    style.set_property("touch-action", "none")?;
    container.append_child(&canvas)?;
    Ok(canvas)
}

/// Attach a listener that upgrades the shell weakly and skips the event if
/// the shell is already borrowed.
fn listen<E, F>(target: &EventTarget, kind: &str, shell: &SharedShell, mut handler: F) -> Result<(), ShellError>
where
    E: JsCast + 'static,
    F: FnMut(&mut Shell, E) + 'static,
{
    let weak: Weak<RefCell<Shell>> = Rc::downgrade(shell);
    let closure = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
        let Some(rc) = weak.upgrade() else {
            return;
        };
        let Ok(event) = event.dyn_into::<E>() else {
            return;
        };
        let Ok(mut shell) = rc.try_borrow_mut() else {
            return;
        };
        handler(&mut *shell, event);
    });
    target.add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref())?;
    // Listeners live as long as the page.
    closure.forget();
    Ok(())
}

fn wire_controls(shell: &SharedShell) -> Result<(), ShellError> {
    let (play_pause, reset, time_slider, speed_slider) = {
        let s = shell.borrow();
        (
            s.controls.play_pause.clone(),
            s.controls.reset.clone(),
            s.controls.time_slider.clone(),
            s.controls.speed_slider.clone(),
        )
    };

    listen(&play_pause, "click", shell, |s, _: Event| s.toggle())?;
    listen(&reset, "click", shell, |s, _: Event| s.reset())?;

    let slider = time_slider.clone();
    listen(&time_slider, "input", shell, move |s, _: Event| {
        s.scrub(dom::input_value(&slider));
    })?;

    let slider = speed_slider.clone();
    listen(&speed_slider, "input", shell, move |s, _: Event| {
        s.set_speed(dom::input_value(&slider));
    })?;
    Ok(())
}

fn wire_camera(shell: &SharedShell, canvas: &HtmlCanvasElement) -> Result<(), ShellError> {
    let target = canvas.clone();
    listen(canvas, "pointerdown", shell, move |s, e: PointerEvent| {
        if let Err(err) = target.set_pointer_capture(e.pointer_id()) {
            log::debug!("pointer capture failed: {err:?}");
        }
        s.runner.push_input(InputEvent::PointerDown {
            x: e.client_x() as f32,
            y: e.client_y() as f32,
        });
    })?;
    listen(canvas, "pointermove", shell, |s, e: PointerEvent| {
        s.runner.push_input(InputEvent::PointerMove {
            x: e.client_x() as f32,
            y: e.client_y() as f32,
        });
    })?;
    for kind in ["pointerup", "pointercancel"] {
        listen(canvas, kind, shell, |s, _: PointerEvent| {
            s.runner.push_input(InputEvent::PointerUp);
        })?;
    }
    listen(canvas, "wheel", shell, |s, e: WheelEvent| {
        e.prevent_default();
        s.runner.push_input(InputEvent::Wheel { delta_y: e.delta_y() as f32 });
    })?;
    Ok(())
}

fn wire_window(shell: &SharedShell, window: &Window, document: &Document) -> Result<(), ShellError> {
    listen(window, "resize", shell, |s, _: Event| {
        let viewport = s.container_viewport();
        s.runner.push_input(InputEvent::Resize {
            width: viewport.width,
            height: viewport.height,
        });
    })?;

    listen(document, "keydown", shell, |s, e: KeyboardEvent| {
        if s.runner.handle_key(&e.key()) {
            e.prevent_default();
            s.sync_controls();
        }
    })?;

    let doc = document.clone();
    listen(document, "visibilitychange", shell, move |s, _: Event| {
        let orrery = s.runner.orrery_mut();
        if doc.hidden() {
            orrery.suspend_rendering();
        } else {
            orrery.resume_rendering();
        }
    })?;
    Ok(())
}

/// Kick off asynchronous loads for every registered texture. Draws use the
/// flat material colour until a load completes; failures keep it for good.
fn load_textures(shell: &SharedShell) -> Result<(), ShellError> {
    let pending: Vec<(TextureId, String)> = shell
        .borrow()
        .runner
        .orrery()
        .textures()
        .iter()
        .map(|(id, url, _)| (id, url.to_string()))
        .collect();

    for (id, url) in pending {
        let image = HtmlImageElement::new()?;
        image.set_cross_origin(Some("anonymous"));

        let weak = Rc::downgrade(shell);
        let loaded = image.clone();
        let onload = Closure::once_into_js(move || {
            let Some(rc) = weak.upgrade() else {
                return;
            };
            let Ok(mut shell) = rc.try_borrow_mut() else {
                return;
            };
            shell.texture_loaded(id, &loaded);
        });

        let weak = Rc::downgrade(shell);
        let onerror = Closure::once_into_js(move || {
            let Some(rc) = weak.upgrade() else {
                return;
            };
            let Ok(mut shell) = rc.try_borrow_mut() else {
                return;
            };
            log::warn!("texture {id:?} failed to load");
            shell.texture_failed(id);
        });

        image.set_onload(Some(onload.unchecked_ref()));
        image.set_onerror(Some(onerror.unchecked_ref()));
        image.set_src(&url);
        log::debug!("loading texture {url}");
    }
    Ok(())
}

type FrameCallback = Closure<dyn FnMut(f64)>;

/// Self-rescheduling `requestAnimationFrame` loop. Runs every refresh
/// regardless of play state so the camera stays responsive.
fn start_animation_loop(window: &Window, shell: &SharedShell) -> Result<(), ShellError> {
    let slot: Rc<RefCell<Option<FrameCallback>>> = Rc::new(RefCell::new(None));
    let next = Rc::clone(&slot);
    let weak = Rc::downgrade(shell);
    let win = window.clone();

    *slot.borrow_mut() = Some(Closure::new(move |now_ms: f64| {
        let Some(rc) = weak.upgrade() else {
            return;
        };
        if let Ok(mut shell) = rc.try_borrow_mut() {
            shell.frame(now_ms);
        }
        if let Some(callback) = next.borrow().as_ref() {
            if let Err(err) = win.request_animation_frame(callback.as_ref().unchecked_ref()) {
                log::error!("requestAnimationFrame failed: {err:?}");
            }
        }
    }));

    let first = slot.borrow();
    let callback = first.as_ref().ok_or(ShellError::Js("animation callback missing".into()))?;
    window.request_animation_frame(callback.as_ref().unchecked_ref())?;
    Ok(())
}
