use crate::app::SurveyApp;
use crate::ui::helpers::error_text;
use crate::ui::layout::scroll_panel;
use egui::{Context, Frame, RichText};

enum RowAction {
    Open(String),
    CopyLink(String),
    Export(String),
    Analytics(String),
}

pub fn ui_dashboard(app: &mut SurveyApp, ctx: &Context) {
    let rows = app.survey_rows();
    let mut action = None;

    scroll_panel(ctx, 860.0, |ui| {
        ui.horizontal(|ui| {
            ui.heading("Surveys");
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let loading = app.is_loading_surveys();
                if ui.add_enabled(!loading, egui::Button::new("⟳ Refresh")).clicked() {
                    app.refresh_surveys(ctx);
                }
                if loading {
                    ui.spinner();
                }
            });
        });
        ui.separator();

        if let Some(err) = &app.surveys_error {
            error_text(ui, err);
        }
        if rows.is_empty() && !app.is_loading_surveys() && app.surveys_error.is_none() {
            ui.label(RichText::new("No surveys yet.").weak());
        }

        for row in &rows {
            Frame::group(ui.style()).show(ui, |ui| {
                ui.set_width(ui.available_width());
                ui.label(RichText::new(row.label()).strong().size(16.0));
                if !row.description.is_empty() {
                    ui.label(&row.description);
                }
                ui.label(RichText::new(row.meta()).weak().small());
                ui.horizontal_wrapped(|ui| {
                    if ui.add_enabled(row.is_active, egui::Button::new("Open")).clicked() {
                        action = Some(RowAction::Open(row.id.clone()));
                    }
                    if ui.button("Copy link").on_hover_text(&row.link).clicked() {
                        action = Some(RowAction::CopyLink(row.id.clone()));
                    }
                    if ui.button("Export responses").clicked() {
                        action = Some(RowAction::Export(row.id.clone()));
                    }
                    if ui.button("Analytics").clicked() {
                        action = Some(RowAction::Analytics(row.id.clone()));
                    }
                });
            });
            ui.add_space(6.0);
        }
    });

    match action {
        Some(RowAction::Open(id)) => app.open_survey(ctx, &id),
        Some(RowAction::CopyLink(id)) => app.copy_survey_link(ctx, &id),
        Some(RowAction::Export(id)) => app.export_responses(ctx, &id),
        Some(RowAction::Analytics(id)) => {
            if let Some(summary) = app.surveys.iter().find(|s| s.id == id).cloned() {
                app.open_analytics(ctx, summary);
            }
        }
        None => {}
    }
}
