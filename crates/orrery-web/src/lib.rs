pub mod dom;
pub mod error;
pub mod runner;
pub mod shaders;
pub mod shell;
pub mod webgl;

pub use error::ShellError;
pub use orrery_engine::{EngineError, SceneConfig};
pub use runner::OrreryRunner;
pub use shell::{launch, SharedShell, Shell};
pub use webgl::WebGlRenderer;

/// Generate the `#[wasm_bindgen]` exports for an orrery page.
///
/// Generates:
/// - `thread_local!` storage for the running shell
/// - a `with_shell()` helper that is a no-op before startup
/// - start, playback and query exports for the page script
///
/// # Usage
///
/// ```ignore
/// use wasm_bindgen::prelude::*;
///
/// orrery_web::export_orrery!("earth-moon");
/// ```
///
/// The page then calls `orrery_start("container", "spiral")` once the
/// controls are in the DOM.
///
/// # Arguments
///
/// - `$app_name`: A string literal used in log messages
#[macro_export]
macro_rules! export_orrery {
    ($app_name:literal) => {
        use std::cell::RefCell;

        thread_local! {
            static SHELL: RefCell<Option<$crate::SharedShell>> = RefCell::new(None);
        }

        fn with_shell<R>(f: impl FnOnce(&mut $crate::Shell) -> R) -> Option<R> {
            SHELL.with(|cell| {
                let slot = cell.borrow();
                let shell = slot.as_ref()?;
                let mut shell = shell.try_borrow_mut().ok()?;
                Some(f(&mut *shell))
            })
        }

        fn install(
            container_id: &str,
            config: Result<$crate::SceneConfig, $crate::EngineError>,
        ) -> Result<(), JsValue> {
            console_error_panic_hook::set_once();
            let _ = console_log::init_with_level(log::Level::Info);

            let shell = $crate::launch($app_name, container_id, config)?;
            SHELL.with(|cell| {
                *cell.borrow_mut() = Some(shell);
            });
            Ok(())
        }

        /// Start with a named preset: "spiral", "calendar" or "textured".
        #[wasm_bindgen]
        pub fn orrery_start(container_id: &str, preset: &str) -> Result<(), JsValue> {
            install(container_id, $crate::SceneConfig::preset(preset))
        }

        /// Start with a JSON scene configuration.
        #[wasm_bindgen]
        pub fn orrery_start_with_config(container_id: &str, json: &str) -> Result<(), JsValue> {
            install(container_id, $crate::SceneConfig::from_json(json))
        }

        #[wasm_bindgen]
        pub fn orrery_toggle() {
            with_shell(|s| s.toggle());
        }

        #[wasm_bindgen]
        pub fn orrery_reset() {
            with_shell(|s| s.reset());
        }

        #[wasm_bindgen]
        pub fn orrery_scrub(day: f64) {
            with_shell(|s| s.scrub(day));
        }

        #[wasm_bindgen]
        pub fn orrery_set_speed(speed: f64) {
            with_shell(|s| s.set_speed(speed));
        }

        // ---- Queries ----

        #[wasm_bindgen]
        pub fn orrery_day() -> f64 {
            with_shell(|s| s.runner().orrery().day()).unwrap_or(0.0)
        }

        #[wasm_bindgen]
        pub fn orrery_is_playing() -> bool {
            with_shell(|s| s.runner().orrery().is_playing()).unwrap_or(false)
        }
    };
}
