//! Admin dashboard: password gate, survey list, links and exports.
//!
//! The gate only hides the dashboard in this client; the backend is what
//! actually protects the data.

use super::*;

pub const AUTH_STORAGE_KEY: &str = "surveyConciergeAuth";

#[cfg(target_arch = "wasm32")]
fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window()?.local_storage().ok()?
}

#[cfg(target_arch = "wasm32")]
pub(super) fn stored_auth(_persisted: &Persisted) -> bool {
    local_storage()
        .and_then(|s| s.get_item(AUTH_STORAGE_KEY).ok()?)
        .is_some_and(|v| v == "true")
}

#[cfg(not(target_arch = "wasm32"))]
pub(super) fn stored_auth(persisted: &Persisted) -> bool {
    persisted.admin_authenticated
}

#[cfg(target_arch = "wasm32")]
fn write_auth(authenticated: bool) {
    let Some(storage) = local_storage() else {
        log::warn!("local storage unavailable; admin login will not persist");
        return;
    };
    let written = if authenticated {
        storage.set_item(AUTH_STORAGE_KEY, "true")
    } else {
        storage.remove_item(AUTH_STORAGE_KEY)
    };
    if let Err(err) = written {
        log::warn!("could not update {AUTH_STORAGE_KEY}: {err:?}");
    }
}

// Native: saved with the rest of the app state by eframe.
#[cfg(not(target_arch = "wasm32"))]
fn write_auth(_authenticated: bool) {}

impl SurveyApp {
    /// Compares `password` with the configured one. True on success.
    pub fn login(&mut self, password: &str) -> bool {
        if password != self.config.admin_password {
            log::info!("admin login rejected");
            self.login_error = Some("Incorrect password".into());
            return false;
        }
        self.admin_authenticated = true;
        self.login_error = None;
        self.password_input.clear();
        write_auth(true);
        log::info!("admin logged in");
        true
    }

    pub fn submit_login(&mut self, ctx: &egui::Context) {
        let password = std::mem::take(&mut self.password_input);
        if self.login(&password) {
            self.open_admin(ctx);
        }
    }

    pub fn logout(&mut self) {
        self.admin_authenticated = false;
        self.surveys.clear();
        self.surveys_request = None;
        self.analytics = None;
        write_auth(false);
        self.state = AppState::AdminLogin;
    }

    pub fn refresh_surveys(&mut self, ctx: &egui::Context) {
        if self.surveys_request.is_some() {
            return;
        }
        self.surveys_error = None;
        self.surveys_request = Some(tasks::fetch(ctx, self.api.list_surveys()));
    }

    pub fn is_loading_surveys(&self) -> bool {
        self.surveys_request.is_some()
    }

    pub(super) fn poll_survey_list(&mut self) {
        let Some(result) = self.surveys_request.as_ref().and_then(Pending::poll) else {
            return;
        };
        self.surveys_request = None;
        match result {
            Ok(surveys) => {
                log::info!("{} surveys listed", surveys.len());
                self.surveys = surveys;
            }
            Err(err) => {
                log::warn!("survey list failed: {err}");
                self.surveys_error = Some(format!("Failed to load surveys. {err}"));
            }
        }
    }

    pub fn copy_survey_link(&mut self, ctx: &egui::Context, survey_id: &str) {
        let link = self.config.survey_link(survey_id);
        ctx.copy_text(link.clone());
        self.message = format!("Link copied: {link}");
    }

    pub fn export_responses(&self, ctx: &egui::Context, survey_id: &str) {
        let url = self.api.export_url(survey_id);
        log::info!("opening export {url}");
        ctx.open_url(egui::OpenUrl::new_tab(url));
    }
}
