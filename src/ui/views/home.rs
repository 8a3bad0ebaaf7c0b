use crate::app::SurveyApp;
use crate::ui::helpers::big_button;
use crate::ui::layout::centered_panel;
use egui::{Context, Key, RichText, TextEdit};

pub fn ui_home(app: &mut SurveyApp, ctx: &Context) {
    centered_panel(ctx, 280.0, 480.0, |ui| {
        ui.vertical_centered(|ui| {
            ui.heading("Survey Concierge");
            ui.add_space(6.0);
            ui.label("Paste the survey link or id you were sent.");
            ui.add_space(14.0);

            let width = ui.available_width() * 0.9;
            let input = ui.add(
                TextEdit::singleline(&mut app.survey_id_input)
                    .hint_text("https://…/survey/<id>")
                    .desired_width(width),
            );
            let submitted = input.lost_focus() && ui.input(|i| i.key_pressed(Key::Enter));
            ui.add_space(8.0);

            let has_input = !app.survey_id_input.trim().is_empty();
            if big_button(ui, "▶ Start survey", width, has_input) || (submitted && has_input) {
                app.open_survey_from_input(ctx);
            }
            ui.add_space(4.0);
            if big_button(ui, "Try the demo survey", width, true) {
                app.open_demo();
            }
            ui.add_space(18.0);
            ui.label(RichText::new("Running a survey?").weak());
            if ui.link("Open the admin dashboard").clicked() {
                app.open_admin(ctx);
            }
        });
    });
}
