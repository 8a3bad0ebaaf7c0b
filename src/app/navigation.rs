use super::*;
use crate::data::{DEMO_SURVEY_ID, demo_survey};

impl SurveyApp {
    pub fn launch(&mut self, ctx: &egui::Context, target: LaunchTarget) {
        match target {
            LaunchTarget::Home => self.go_home(),
            LaunchTarget::Survey(id) => self.open_survey(ctx, &id),
            LaunchTarget::Admin => self.open_admin(ctx),
            LaunchTarget::Demo => self.open_demo(),
        }
    }

    pub fn go_home(&mut self) {
        self.flow = None;
        self.survey_request = None;
        self.submit_request = None;
        self.confirm_start_over = false;
        self.state = AppState::Home;
    }

    /// Starts taking survey `survey_id`: fetches it, then restores saved progress.
    pub fn open_survey(&mut self, ctx: &egui::Context, survey_id: &str) {
        let survey_id = survey_id.trim();
        if survey_id.is_empty() {
            self.message = "Enter a survey id first.".into();
            return;
        }
        self.message.clear();
        self.demo = false;
        self.confirm_start_over = false;
        self.submit_request = None;
        self.flow = Some(SurveyFlow::new(survey_id));
        self.state = AppState::Loading;
        self.fetch_survey(ctx);
    }

    /// Home screen "Start" button.
    pub fn open_survey_from_input(&mut self, ctx: &egui::Context) {
        match crate::config::survey_id_from_input(&self.survey_id_input) {
            Some(id) => self.open_survey(ctx, &id),
            None => self.message = "Enter a survey id or link first.".into(),
        }
    }

    pub fn open_demo(&mut self) {
        self.message.clear();
        self.demo = true;
        self.confirm_start_over = false;
        self.submit_request = None;
        self.state = AppState::Loading;

        let mut flow = SurveyFlow::new(DEMO_SURVEY_ID);
        // nothing to fetch, but the guard still applies
        flow.begin_fetch();
        match demo_survey() {
            Ok(survey) => {
                flow.survey_loaded(survey, &mut self.store);
                self.state = AppState::TakingSurvey;
            }
            Err(err) => {
                flow.load_failed(format!("The demo survey is unavailable: {err}"));
                self.state = AppState::LoadError;
            }
        }
        self.flow = Some(flow);
    }

    pub fn open_admin(&mut self, ctx: &egui::Context) {
        self.analytics = None;
        if self.admin_authenticated {
            self.state = AppState::AdminDashboard;
            if self.surveys.is_empty() {
                self.refresh_surveys(ctx);
            }
        } else {
            self.login_error = None;
            self.state = AppState::AdminLogin;
        }
    }

    pub fn back_to_dashboard(&mut self) {
        self.analytics = None;
        self.state = AppState::AdminDashboard;
    }

    pub fn survey_title(&self) -> Option<&str> {
        self.flow
            .as_ref()
            .and_then(SurveyFlow::survey)
            .map(|s| s.title.as_str())
    }
}
