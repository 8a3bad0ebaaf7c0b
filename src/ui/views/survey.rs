use super::question::question_widget;
use crate::app::SurveyApp;
use crate::persistence::progress::now_millis;
use crate::ui::helpers::{error_text, notice};
use crate::ui::layout::{scroll_panel, two_button_row};
use egui::{Context, ProgressBar, RichText};

pub fn ui_survey(app: &mut SurveyApp, ctx: &Context) {
    let progress = app.section_progress();
    scroll_panel(ctx, 720.0, |ui| {
        let Some(flow) = app.flow.as_mut() else {
            return;
        };
        let Some(survey) = flow.survey() else {
            return;
        };

        ui.heading(&survey.title);
        if !survey.description.trim().is_empty() {
            ui.label(&survey.description);
        }
        ui.add_space(8.0);

        if let Some(progress) = progress {
            ui.add(
                ProgressBar::new(progress.fraction())
                    .text(progress.label())
                    .desired_width(ui.available_width()),
            );
        }

        if flow.was_restored() {
            ui.horizontal(|ui| {
                notice(ui, "Welcome back! Your previous answers have been restored.");
                if ui.small_button("✕").clicked() {
                    flow.dismiss_restored_notice();
                }
            });
        }
        if flow.saved_notice_visible(now_millis()) {
            notice(ui, "✔ Progress saved");
        }
        ui.add_space(10.0);

        let Some(section) = flow.current_section().cloned() else {
            return;
        };
        ui.label(RichText::new(&section.title).size(20.0).strong());
        ui.separator();

        for question in &section.questions {
            question_widget(ui, flow, question);
            ui.add_space(14.0);
        }

        if let Some(failure) = flow.submit_error() {
            error_text(ui, &failure.to_string());
            ui.add_space(6.0);
        }

        let busy = flow.is_submitting();
        let next_label = if busy {
            "Submitting…"
        } else if flow.is_last_section() {
            "Submit"
        } else {
            "Next"
        };
        let width = ui.available_width().min(420.0);
        let (back, next) = two_button_row(
            ui,
            width,
            ("Back", !busy && !flow.is_first_section()),
            (next_label, !busy),
        );

        if back {
            app.previous_section();
        }
        if next {
            app.next_section(ctx);
        }
    });
}
