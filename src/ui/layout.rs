use crate::app::SurveyApp;
use crate::model::AppState;
use egui::{Button, CentralPanel, Context, Frame, ScrollArea, Ui, Visuals};

pub fn top_panel(app: &mut SurveyApp, ctx: &Context) {
    egui::TopBottomPanel::top("menu_panel").show(ctx, |ui| {
        ui.horizontal_centered(|ui| {
            let title = match app.state {
                AppState::TakingSurvey | AppState::Submitted => {
                    app.survey_title().unwrap_or("Survey Concierge").to_string()
                }
                _ => "Survey Concierge".to_string(),
            };
            ui.strong(title);

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let in_admin = matches!(
                    app.state,
                    AppState::AdminLogin | AppState::AdminDashboard | AppState::Analytics
                );
                if in_admin {
                    if app.admin_authenticated && ui.button("Log out").clicked() {
                        app.logout();
                    }
                    if ui.button("Home").clicked() {
                        app.go_home();
                    }
                } else if app.state == AppState::TakingSurvey {
                    let busy = app.flow.as_ref().is_some_and(|f| f.is_submitting());
                    if ui.add_enabled(!busy, Button::new("Start over")).clicked() {
                        app.confirm_start_over = true;
                    }
                } else if ui.button("Admin").clicked() {
                    app.open_admin(ctx);
                }
            });
        });
    });
}

pub fn bottom_panel(app: &mut SurveyApp, ctx: &Context) {
    egui::TopBottomPanel::bottom("bottom_panel").show(ctx, |ui| {
        ui.horizontal(|ui| {
            if !app.message.is_empty() {
                ui.label(&app.message);
                if ui.small_button("✕").clicked() {
                    app.message.clear();
                }
            }
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("🌙 Dark").clicked() {
                    ctx.set_visuals(Visuals::dark());
                }
                if ui.button("☀ Light").clicked() {
                    ctx.set_visuals(Visuals::light());
                }
            });
        });
    });
}

/// Panel centred both ways, with a maximum content width.
pub fn centered_panel(ctx: &Context, est_height: f32, max_width: f32, inner: impl FnOnce(&mut Ui)) {
    CentralPanel::default().show(ctx, |ui| {
        let extra = ((ui.available_height() - est_height) / 2.0).max(0.0);
        ui.add_space(extra);
        ui.vertical_centered(|ui| {
            Frame::default()
                .fill(ui.visuals().window_fill())
                .inner_margin(egui::Margin::symmetric(16, 16))
                .show(ui, |ui| {
                    let w = ui.available_width().min(max_width);
                    ui.set_width(w);
                    inner(ui);
                });
        });
        ui.add_space(extra);
    });
}

/// Scrollable page with a centred column of at most `max_width`.
pub fn scroll_panel(ctx: &Context, max_width: f32, inner: impl FnOnce(&mut Ui)) {
    CentralPanel::default().show(ctx, |ui| {
        ScrollArea::vertical().auto_shrink([false, false]).show(ui, |ui| {
            ui.vertical_centered(|ui| {
                let w = ui.available_width().min(max_width);
                Frame::default()
                    .inner_margin(egui::Margin::symmetric(12, 12))
                    .show(ui, |ui| {
                        ui.set_width(w);
                        ui.with_layout(egui::Layout::top_down(egui::Align::Min), inner);
                    });
            });
        });
    });
}

/// Two equally wide buttons; returns which one was clicked.
pub fn two_button_row(
    ui: &mut Ui,
    panel_width: f32,
    left: (&str, bool),
    right: (&str, bool),
) -> (bool, bool) {
    let btn_w = (panel_width - 8.0) / 2.0;
    let mut clicked_left = false;
    let mut clicked_right = false;
    ui.horizontal(|ui| {
        ui.add_space(((ui.available_width() - panel_width) / 2.0).max(0.0));
        clicked_left = ui
            .add_enabled_ui(left.1, |ui| ui.add_sized([btn_w, 36.0], Button::new(left.0)))
            .inner
            .clicked();
        clicked_right = ui
            .add_enabled_ui(right.1, |ui| ui.add_sized([btn_w, 36.0], Button::new(right.0)))
            .inner
            .clicked();
    });
    (clicked_left, clicked_right)
}
