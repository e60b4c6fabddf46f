use wasm_bindgen::prelude::*;

orrery_web::export_orrery!("earth-moon");
