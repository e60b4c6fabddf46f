//! DOM lookups, the playback controls and the startup error overlay.

use orrery_engine::ControlsView;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement, HtmlInputElement};

use crate::error::ShellError;

pub const PLAY_PAUSE_ID: &str = "playPause";
pub const RESET_ID: &str = "reset";
pub const TIME_SLIDER_ID: &str = "timeSlider";
pub const SPEED_SLIDER_ID: &str = "speedSlider";
pub const TIME_DISPLAY_ID: &str = "timeDisplay";

/// Look up `#id` and cast it to the expected element type.
pub fn element<T: JsCast>(document: &Document, id: &str) -> Result<T, ShellError> {
    document
        .get_element_by_id(id)
        .and_then(|el| el.dyn_into::<T>().ok())
        .ok_or_else(|| ShellError::MissingElement(id.to_string()))
}

/// The page's playback controls.
pub struct Controls {
    pub play_pause: HtmlElement,
    pub reset: HtmlElement,
    pub time_slider: HtmlInputElement,
    pub speed_slider: HtmlInputElement,
    pub time_display: HtmlElement,
    shown: Option<ControlsView>,
}

impl Controls {
    pub fn find(document: &Document) -> Result<Self, ShellError> {
        Ok(Self {
            play_pause: element(document, PLAY_PAUSE_ID)?,
            reset: element(document, RESET_ID)?,
            time_slider: element(document, TIME_SLIDER_ID)?,
            speed_slider: element(document, SPEED_SLIDER_ID)?,
            time_display: element(document, TIME_DISPLAY_ID)?,
            shown: None,
        })
    }

    /// Configure slider ranges and show the initial state.
    pub fn init(&mut self, view: &ControlsView) {
        self.time_slider.set_min("0");
        self.time_slider.set_max(&view.time_max.to_string());
        self.speed_slider.set_value(&view.speed_value.to_string());
        self.shown = None;
        self.show(view);
    }

    /// Push changed fields of `view` into the DOM. Unchanged fields are not
    /// touched, so a slider the user is dragging is left alone while paused.
    pub fn show(&mut self, view: &ControlsView) {
        let prev = self.shown.as_ref();

        if prev.map_or(true, |p| p.play_label != view.play_label || p.pressed != view.pressed) {
            self.play_pause.set_text_content(Some(view.play_label));
            if let Err(err) = self
                .play_pause
                .set_attribute("aria-pressed", if view.pressed { "true" } else { "false" })
            {
                log::warn!("could not set aria-pressed: {err:?}");
            }
        }
        if prev.map_or(true, |p| p.time_value != view.time_value) {
            self.time_slider.set_value(&view.time_value.to_string());
        }
        if prev.map_or(true, |p| p.time_max != view.time_max) {
            self.time_slider.set_max(&view.time_max.to_string());
        }
        if prev.map_or(true, |p| p.time_label != view.time_label) {
            self.time_display.set_text_content(Some(&view.time_label));
        }

        self.shown = Some(view.clone());
    }
}

/// Parse a range input's value. Malformed text becomes NaN, which the
/// engine rejects with a warning.
pub fn input_value(input: &HtmlInputElement) -> f64 {
    input.value().trim().parse().unwrap_or(f64::NAN)
}

/// Append a visible error message to `container`, or to the body when
/// there is none.
pub fn show_error(document: &Document, container: Option<&Element>, message: &str) {
    let Ok(node) = document.create_element("div") else {
        return;
    };
    node.set_class_name("orrery-error");
    node.set_text_content(Some(message));
    if let Some(el) = node.dyn_ref::<HtmlElement>() {
        let style = el.style();
        for (key, value) in [
            ("color", "#ff6666"),
            ("background", "rgba(0, 0, 0, 0.8)"),
            ("padding", "1em"),
            ("font-family", "sans-serif"),
        ] {
            let _ = style.set_property(key, value);
        }
    }

    let parent: Option<Element> = container
        .cloned()
        .or_else(|| document.body().map(Into::into));
    if let Some(parent) = parent {
        if let Err(err) = parent.append_child(&node) {
            log::error!("could not show error overlay: {err:?}");
        }
    }
}
