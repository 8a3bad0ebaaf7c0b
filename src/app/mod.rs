use crate::api::analytics::AnalyticsConfig;
use crate::api::{AnalyticsPreview, ApiClient, Debouncer, Pending, SubmitFailure, tasks};
use crate::config::{ClientConfig, LaunchTarget};
use crate::model::{AppState, Question, Survey, SurveySummary};
use crate::persistence::{MemoryCookieJar, PlatformCookieJar, ProgressStore};
use crate::survey::{Advance, SurveyFlow};
use eframe::egui;
use serde::{Deserialize, Serialize};

// Submodules
pub mod actions;
pub mod admin;
pub mod analytics;
pub mod navigation;
pub mod resets;
pub mod view_models;

pub use crate::view_models::SurveyRow;

/// What survives a restart of the native app. In the browser the cookie jar
/// and the admin flag live in `document.cookie` / local storage instead.
#[derive(Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Persisted {
    pub cookies: MemoryCookieJar,
    pub admin_authenticated: bool,
}

/// Analytics screen of one survey.
pub struct AnalyticsView {
    pub survey: SurveySummary,
    pub questions: Vec<Question>,
    pub questions_request: Option<Pending<Vec<Question>>>,
    pub config: AnalyticsConfig,
    pub debouncer: Debouncer,
    pub preview: Option<AnalyticsPreview>,
    pub preview_request: Option<Pending<serde_json::Value>>,
    pub preview_error: Option<String>,
    pub draft: analytics::Draft,
}

pub struct SurveyApp {
    pub state: AppState,
    pub config: ClientConfig,
    pub api: ApiClient,
    pub store: ProgressStore<PlatformCookieJar>,
    pub message: String,

    // Respondent side
    pub survey_id_input: String,
    pub flow: Option<SurveyFlow>,
    /// The current flow runs on the embedded demo survey, offline.
    pub demo: bool,
    pub survey_request: Option<Pending<Survey>>,
    pub submit_request: Option<Pending<serde_json::Value>>,
    pub confirm_start_over: bool,

    // Admin side
    pub admin_authenticated: bool,
    pub password_input: String,
    pub login_error: Option<String>,
    pub surveys: Vec<SurveySummary>,
    pub surveys_request: Option<Pending<Vec<SurveySummary>>>,
    pub surveys_error: Option<String>,
    pub analytics: Option<AnalyticsView>,
}

#[cfg(not(target_arch = "wasm32"))]
fn platform_jar(persisted: &Persisted) -> PlatformCookieJar {
    let mut jar = persisted.cookies.clone();
    jar.purge_expired();
    jar
}

#[cfg(target_arch = "wasm32")]
fn platform_jar(_persisted: &Persisted) -> PlatformCookieJar {
    PlatformCookieJar::default()
}

impl SurveyApp {
    pub fn new(config: ClientConfig, persisted: Persisted) -> Self {
        let api = ApiClient::new(&config.api_base_url);
        log::info!("survey API at {}", api.base_url());

        let admin_authenticated = admin::stored_auth(&persisted);
        Self {
            state: AppState::Home,
            api,
            config,
            store: ProgressStore::new(platform_jar(&persisted)),
            message: String::new(),
            survey_id_input: String::new(),
            flow: None,
            demo: false,
            survey_request: None,
            submit_request: None,
            confirm_start_over: false,
            admin_authenticated,
            password_input: String::new(),
            login_error: None,
            surveys: Vec::new(),
            surveys_request: None,
            surveys_error: None,
            analytics: None,
        }
    }

    /// Builds the app from eframe's storage and jumps to `target`.
    pub fn from_creation_context(
        cc: &eframe::CreationContext<'_>,
        config: ClientConfig,
        target: LaunchTarget,
    ) -> Self {
        let persisted: Persisted = cc
            .storage
            .and_then(|storage| eframe::get_value(storage, eframe::APP_KEY))
            .unwrap_or_default();
        let mut app = Self::new(config, persisted);
        app.launch(&cc.egui_ctx, target);
        app
    }

    pub fn persisted(&self) -> Persisted {
        Persisted {
            #[cfg(not(target_arch = "wasm32"))]
            cookies: self.store.jar().clone(),
            #[cfg(target_arch = "wasm32")]
            cookies: MemoryCookieJar::default(),
            admin_authenticated: self.admin_authenticated,
        }
    }

    /// Collects finished background requests. Called once per frame.
    pub fn poll_tasks(&mut self, ctx: &egui::Context) {
        self.poll_survey_load();
        self.poll_submission();
        self.poll_survey_list();
        self.poll_analytics(ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::answers::Answer;

    fn app() -> SurveyApp {
        SurveyApp::new(
            ClientConfig {
                api_base_url: "http://127.0.0.1:9/api".into(),
                public_base_url: "https://surveys.example".into(),
                admin_password: "secret".into(),
            },
            Persisted::default(),
        )
    }

    #[test]
    fn demo_survey_advances_offline() {
        let ctx = egui::Context::default();
        let mut app = app();
        app.open_demo();
        assert_eq!(app.state, AppState::TakingSurvey);

        let flow = app.flow.as_mut().unwrap();
        flow.set_answer(1, Answer::Text("Smith & Co".into()));
        flow.set_answer(3, Answer::Text("London".into()));
        app.next_section(&ctx);
        assert_eq!(app.flow.as_ref().unwrap().current_section_index(), 1);
        assert!(app.store.exists(crate::data::DEMO_SURVEY_ID));
    }

    #[test]
    fn persisted_state_carries_cookies_and_auth() {
        let ctx = egui::Context::default();
        let mut app = app();
        assert!(app.login("secret"));
        app.open_demo();
        let flow = app.flow.as_mut().unwrap();
        flow.set_answer(1, Answer::Text("Smith & Co".into()));
        flow.set_answer(3, Answer::Text("Wales".into()));
        app.next_section(&ctx);

        let mut restarted = SurveyApp::new(app.config.clone(), app.persisted());
        assert!(restarted.admin_authenticated);
        restarted.open_demo();
        let flow = restarted.flow.as_ref().unwrap();
        assert!(flow.was_restored());
        assert_eq!(flow.answer(3), Some(&Answer::Text("Wales".into())));
    }
}
