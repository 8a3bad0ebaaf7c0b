use crate::app::SurveyApp;
use crate::survey::FlowPhase;
use crate::ui::helpers::error_text;
use crate::ui::layout::{centered_panel, two_button_row};
use egui::Context;

pub fn ui_loading(_app: &mut SurveyApp, ctx: &Context) {
    centered_panel(ctx, 80.0, 320.0, |ui| {
        ui.vertical_centered(|ui| {
            ui.spinner();
            ui.label("Loading survey…");
        });
    });
}

pub fn ui_load_error(app: &mut SurveyApp, ctx: &Context) {
    let message = match app.flow.as_ref().map(|f| f.phase()) {
        Some(FlowPhase::Failed(message)) => message.clone(),
        _ => "Something went wrong.".to_string(),
    };

    centered_panel(ctx, 160.0, 480.0, |ui| {
        ui.vertical_centered(|ui| {
            ui.heading("We couldn't open this survey");
            ui.add_space(10.0);
            error_text(ui, &message);
            ui.add_space(16.0);
            let width = ui.available_width().min(360.0);
            let (retry, home) = two_button_row(ui, width, ("Try again", true), ("Home", true));
            if retry {
                app.retry_load(ctx);
            }
            if home {
                app.go_home();
            }
        });
    });
}
