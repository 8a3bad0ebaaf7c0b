use crate::app::SurveyApp;
use crate::ui::helpers::big_button;
use crate::ui::layout::centered_panel;
use egui::{Context, RichText};

pub fn ui_submitted(app: &mut SurveyApp, ctx: &Context) {
    centered_panel(ctx, 200.0, 480.0, |ui| {
        ui.vertical_centered(|ui| {
            ui.label(RichText::new("✅").size(40.0));
            ui.heading("Thank you!");
            ui.add_space(8.0);
            let title = app.survey_title().unwrap_or("the survey").to_string();
            ui.label(format!("Your answers to {title} have been submitted."));
            if app.demo {
                ui.label(RichText::new("This was the demo; nothing was sent.").weak());
            }
            ui.add_space(16.0);
            if big_button(ui, "Done", 200.0, true) {
                app.go_home();
            }
        });
    });
}
