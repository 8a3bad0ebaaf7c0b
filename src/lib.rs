pub mod answers;
pub mod api;
pub mod app;
pub mod config;
pub mod data;
pub mod model;
pub mod persistence;
pub mod survey;
pub mod ui;
pub mod view_models;

pub use app::SurveyApp;

#[cfg(target_arch = "wasm32")]
mod web {
    use crate::SurveyApp;
    use crate::config::{ClientConfig, launch_target};
    use wasm_bindgen::JsCast;
    use wasm_bindgen::prelude::*;

    /// Mounts the app on the `<canvas id=canvas_id>` of the host page.
    #[wasm_bindgen]
    pub async fn start(canvas_id: String) -> Result<(), JsValue> {
        eframe::WebLogger::init(log::LevelFilter::Info).ok();

        let canvas = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(&canvas_id))
            .ok_or_else(|| JsValue::from_str(&format!("no element #{canvas_id}")))?
            .dyn_into::<web_sys::HtmlCanvasElement>()?;

        let config = ClientConfig::resolve();
        let target = launch_target();
        eframe::WebRunner::new()
            .start(
                canvas,
                eframe::WebOptions::default(),
                Box::new(move |cc| Ok(Box::new(SurveyApp::from_creation_context(cc, config, target)))),
            )
            .await
    }
}
