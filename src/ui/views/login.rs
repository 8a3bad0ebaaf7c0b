use crate::app::SurveyApp;
use crate::ui::helpers::{big_button, error_text};
use crate::ui::layout::centered_panel;
use egui::{Context, Key, RichText, TextEdit};

pub fn ui_admin_login(app: &mut SurveyApp, ctx: &Context) {
    centered_panel(ctx, 220.0, 360.0, |ui| {
        ui.vertical_centered(|ui| {
            ui.heading("Admin dashboard");
            ui.label(RichText::new("Enter the admin password to continue.").weak());
            ui.add_space(12.0);

            let width = ui.available_width() * 0.9;
            let field = ui.add(
                TextEdit::singleline(&mut app.password_input)
                    .password(true)
                    .hint_text("Password")
                    .desired_width(width),
            );
            let entered = field.lost_focus() && ui.input(|i| i.key_pressed(Key::Enter));

            if let Some(err) = &app.login_error {
                ui.add_space(4.0);
                error_text(ui, err);
            }
            ui.add_space(10.0);
            if big_button(ui, "Log in", width, !app.password_input.is_empty()) || entered {
                app.submit_login(ctx);
            }
        });
    });
}
