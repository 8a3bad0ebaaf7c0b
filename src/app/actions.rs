use super::*;
use crate::api::ApiError;
use crate::survey::flow::SAVED_NOTICE_MS;
use std::time::Duration;

fn load_error_message(err: &ApiError) -> String {
    if err.is_not_found() {
        "This survey does not exist or is no longer accepting responses.".into()
    } else {
        format!("Failed to load survey. {err}")
    }
}

impl SurveyApp {
    pub(super) fn fetch_survey(&mut self, ctx: &egui::Context) {
        let Some(flow) = self.flow.as_mut() else {
            return;
        };
        if !flow.begin_fetch() {
            log::debug!("survey {} already requested", flow.survey_id());
            return;
        }
        let request = self.api.get_survey(flow.survey_id());
        log::info!("fetching {}", request.url);
        self.survey_request = Some(tasks::fetch(ctx, request));
    }

    /// Manual retry after a failed load.
    pub fn retry_load(&mut self, ctx: &egui::Context) {
        if self.demo {
            self.open_demo();
            return;
        }
        if let Some(flow) = self.flow.as_mut() {
            flow.reset_fetch();
            self.state = AppState::Loading;
            self.fetch_survey(ctx);
        }
    }

    pub(super) fn poll_survey_load(&mut self) {
        let Some(result) = self.survey_request.as_ref().and_then(Pending::poll) else {
            return;
        };
        self.survey_request = None;
        let Some(flow) = self.flow.as_mut() else {
            return;
        };

        match result {
            Ok(survey) if !survey.is_active => {
                flow.load_failed("This survey is no longer accepting responses.");
                self.state = AppState::LoadError;
            }
            Ok(survey) => {
                flow.survey_loaded(survey, &mut self.store);
                self.state = if flow.is_failed() {
                    AppState::LoadError
                } else {
                    AppState::TakingSurvey
                };
            }
            Err(err) => {
                flow.load_failed(load_error_message(&err));
                self.state = AppState::LoadError;
            }
        }
    }

    /// Next / Submit button.
    pub fn next_section(&mut self, ctx: &egui::Context) {
        let Some(flow) = self.flow.as_mut() else {
            return;
        };
        match flow.advance(&mut self.store) {
            Advance::Moved { partial_saves } => {
                if !self.demo {
                    for save in &partial_saves {
                        match self.api.save_partial(save) {
                            Ok(request) => tasks::fire_and_forget(request, "partial save"),
                            Err(err) => log::warn!("partial save of question {} skipped: {err}", save.question_id),
                        }
                    }
                }
                ctx.request_repaint_after(Duration::from_millis(SAVED_NOTICE_MS as u64));
            }
            Advance::Submit(payload) => self.send_submission(ctx, payload),
            Advance::Blocked | Advance::Ignored => {}
        }
    }

    pub fn previous_section(&mut self) {
        if let Some(flow) = self.flow.as_mut() {
            flow.back();
        }
    }

    fn send_submission(&mut self, ctx: &egui::Context, payload: crate::api::SubmitPayload) {
        let Some(flow) = self.flow.as_mut() else {
            return;
        };
        if self.demo {
            log::info!("demo submission with {} answers", payload.responses.len());
            flow.submission_succeeded(&mut self.store);
            self.state = AppState::Submitted;
            return;
        }
        match self.api.submit(flow.survey_id(), &payload) {
            Ok(request) => self.submit_request = Some(tasks::fetch(ctx, request)),
            Err(err) => flow.submission_failed(SubmitFailure::from(&err)),
        }
    }

    pub(super) fn poll_submission(&mut self) {
        let Some(result) = self.submit_request.as_ref().and_then(Pending::poll) else {
            return;
        };
        self.submit_request = None;
        let Some(flow) = self.flow.as_mut() else {
            return;
        };
        match result {
            Ok(_) => {
                flow.submission_succeeded(&mut self.store);
                self.state = AppState::Submitted;
            }
            Err(err) => flow.submission_failed(SubmitFailure::from(&err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_surveys_get_a_friendly_message() {
        let err = ApiError::Http {
            status: 404,
            body: String::new(),
        };
        assert!(load_error_message(&err).contains("does not exist"));
        let err = ApiError::Transport("refused".into());
        assert!(load_error_message(&err).starts_with("Failed to load survey."));
    }
}
