#[cfg(not(target_arch = "wasm32"))]
fn init_logging() {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("survey_concierge=info")))
        .init();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> eframe::Result<()> {
    use survey_concierge::SurveyApp;
    use survey_concierge::config::{ClientConfig, launch_target};

    init_logging();

    let config = ClientConfig::resolve();
    let target = launch_target();
    log::info!("starting at {target:?}");

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([960.0, 720.0])
            .with_min_inner_size([420.0, 480.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Survey Concierge",
        options,
        Box::new(move |cc| Ok(Box::new(SurveyApp::from_creation_context(cc, config, target)))),
    )
}

// The browser build starts from `start` in the library.
#[cfg(target_arch = "wasm32")]
fn main() {}
