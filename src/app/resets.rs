use super::*;

impl SurveyApp {
    /// Wipes the answers of the current survey and its saved progress.
    pub fn start_over(&mut self) {
        if let Some(flow) = self.flow.as_mut() {
            flow.start_over(&mut self.store);
        }
        self.confirm_start_over = false;
    }

    pub fn start_over_dialog(&mut self, ctx: &egui::Context) {
        egui::Window::new("Start over?")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
            .show(ctx, |ui| {
                ui.label("All your answers to this survey will be erased. This cannot be undone.");
                ui.add_space(8.0);
                ui.horizontal(|ui| {
                    if ui.button("Yes, erase my answers").clicked() {
                        self.start_over();
                    }
                    if ui.button("Cancel").clicked() {
                        self.confirm_start_over = false;
                    }
                });
            });
    }
}
