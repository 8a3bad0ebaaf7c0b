mod helpers;
pub mod layout;
pub mod views;

use crate::app::SurveyApp;
use crate::model::AppState;
use eframe::{APP_KEY, App, Frame, set_value};
use egui::Context;
use layout::{bottom_panel, top_panel};

impl App for SurveyApp {
    fn update(&mut self, ctx: &Context, _frame: &mut Frame) {
        self.poll_tasks(ctx);

        top_panel(self, ctx);
        bottom_panel(self, ctx);

        // one view per state
        match self.state {
            AppState::Home => views::home::ui_home(self, ctx),
            AppState::Loading => views::loading::ui_loading(self, ctx),
            AppState::LoadError => views::loading::ui_load_error(self, ctx),
            AppState::TakingSurvey => views::survey::ui_survey(self, ctx),
            AppState::Submitted => views::submitted::ui_submitted(self, ctx),
            AppState::AdminLogin => views::login::ui_admin_login(self, ctx),
            AppState::AdminDashboard => views::dashboard::ui_dashboard(self, ctx),
            AppState::Analytics => views::analytics::ui_analytics(self, ctx),
        }

        if self.confirm_start_over {
            self.start_over_dialog(ctx);
        }
    }

    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        set_value(storage, APP_KEY, &self.persisted());
    }
}
