use super::analytics::AnalyticsConfig;
use super::error::ApiError;
use super::{PartialSave, PartialSavePayload, SubmitPayload};
use crate::model::QuestionId;
use crate::persistence::progress::encode_uri_component;
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

/// A request ready for whichever transport the platform has.
#[derive(Clone, Debug, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    /// JSON body.
    pub body: Option<String>,
}

impl ApiRequest {
    fn get(url: String) -> Self {
        Self {
            method: Method::Get,
            url,
            body: None,
        }
    }

    fn post<B: Serialize>(url: String, body: &B) -> Result<Self, ApiError> {
        let body = serde_json::to_string(body).map_err(|err| ApiError::Encode(err.to_string()))?;
        Ok(Self {
            method: Method::Post,
            url,
            body: Some(body),
        })
    }
}

/// Builds requests against the survey backend rooted at `base_url`.
#[derive(Clone, Debug, PartialEq)]
pub struct ApiClient {
    base_url: String,
}

pub fn normalize_base_url(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed == "/" {
        return String::new();
    }
    trimmed.trim_end_matches('/').to_string()
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: normalize_base_url(base_url),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn survey_path(&self, survey_id: &str) -> String {
        format!("{}/surveys/{}", self.base_url, encode_uri_component(survey_id))
    }

    pub fn surveys_url(&self) -> String {
        format!("{}/surveys/", self.base_url)
    }

    pub fn survey_url(&self, survey_id: &str) -> String {
        format!("{}/", self.survey_path(survey_id))
    }

    pub fn questions_url(&self, survey_id: &str) -> String {
        format!("{}/questions/", self.survey_path(survey_id))
    }

    pub fn question_url(&self, survey_id: &str, question_id: QuestionId) -> String {
        format!("{}/questions/{question_id}/", self.survey_path(survey_id))
    }

    pub fn submit_url(&self, survey_id: &str) -> String {
        format!("{}/submit/", self.survey_path(survey_id))
    }

    pub fn save_partial_url(&self, survey_id: &str, question_id: QuestionId) -> String {
        format!("{}/questions/{question_id}/save-partial/", self.survey_path(survey_id))
    }

    /// Spreadsheet of every response; opened in a new tab.
    pub fn export_url(&self, survey_id: &str) -> String {
        format!("{}/export/", self.survey_path(survey_id))
    }

    pub fn analytics_preview_url(&self, survey_id: &str) -> String {
        format!("{}/analytics/preview/", self.survey_path(survey_id))
    }

    /// Analytics spreadsheet for `config`; opened in a new tab.
    pub fn analytics_export_url(&self, survey_id: &str, config: &AnalyticsConfig) -> Result<String, ApiError> {
        let json = serde_json::to_string(config).map_err(|err| ApiError::Encode(err.to_string()))?;
        Ok(format!(
            "{}/analytics/export/?config={}",
            self.survey_path(survey_id),
            encode_uri_component(&json)
        ))
    }

    pub fn list_surveys(&self) -> ApiRequest {
        ApiRequest::get(self.surveys_url())
    }

    pub fn get_survey(&self, survey_id: &str) -> ApiRequest {
        ApiRequest::get(self.survey_url(survey_id))
    }

    pub fn get_questions(&self, survey_id: &str) -> ApiRequest {
        ApiRequest::get(self.questions_url(survey_id))
    }

    pub fn get_question(&self, survey_id: &str, question_id: QuestionId) -> ApiRequest {
        ApiRequest::get(self.question_url(survey_id, question_id))
    }

    pub fn submit(&self, survey_id: &str, payload: &SubmitPayload) -> Result<ApiRequest, ApiError> {
        ApiRequest::post(self.submit_url(survey_id), payload)
    }

    pub fn save_partial(&self, save: &PartialSave) -> Result<ApiRequest, ApiError> {
        let payload = PartialSavePayload {
            answer: &save.answer,
            session_id: save.session_id.as_deref(),
        };
        ApiRequest::post(self.save_partial_url(&save.survey_id, save.question_id), &payload)
    }

    pub fn analytics_preview(&self, survey_id: &str, config: &AnalyticsConfig) -> Result<ApiRequest, ApiError> {
        ApiRequest::post(self.analytics_preview_url(survey_id), config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::answers::{Answer, Responses};

    #[test]
    fn base_url_is_normalized() {
        assert_eq!(ApiClient::new(" http://h/api/// ").base_url(), "http://h/api");
        assert_eq!(ApiClient::new("/").surveys_url(), "/surveys/");
    }

    #[test]
    fn paths_follow_the_backend_routes() {
        let api = ApiClient::new("/api");
        assert_eq!(api.surveys_url(), "/api/surveys/");
        assert_eq!(api.survey_url("abc"), "/api/surveys/abc/");
        assert_eq!(api.questions_url("abc"), "/api/surveys/abc/questions/");
        assert_eq!(api.question_url("abc", 4), "/api/surveys/abc/questions/4/");
        assert_eq!(api.submit_url("abc"), "/api/surveys/abc/submit/");
        assert_eq!(
            api.save_partial_url("abc", 4),
            "/api/surveys/abc/questions/4/save-partial/"
        );
        assert_eq!(api.export_url("abc"), "/api/surveys/abc/export/");
        assert_eq!(api.analytics_preview_url("abc"), "/api/surveys/abc/analytics/preview/");
    }

    #[test]
    fn submit_body_carries_responses_and_session() {
        let mut responses = Responses::new();
        responses.insert(3, Answer::Text("Other: Foo".into()));
        let request = ApiClient::new("/api")
            .submit(
                "abc",
                &SubmitPayload {
                    responses,
                    session_id: Some("session_1_x".into()),
                },
            )
            .unwrap();
        assert_eq!(request.method, Method::Post);
        assert_eq!(
            request.body.as_deref(),
            Some(r#"{"responses":{"3":"Other: Foo"},"session_id":"session_1_x"}"#)
        );
    }

    #[test]
    fn partial_save_body_omits_missing_session() {
        let request = ApiClient::new("/api")
            .save_partial(&PartialSave {
                survey_id: "abc".into(),
                question_id: 9,
                answer: Answer::Number(4.0),
                session_id: None,
            })
            .unwrap();
        assert_eq!(request.url, "/api/surveys/abc/questions/9/save-partial/");
        assert_eq!(request.body.as_deref(), Some(r#"{"answer":4.0}"#));
    }

    #[test]
    fn analytics_export_embeds_config_in_query() {
        let url = ApiClient::new("/api")
            .analytics_export_url("abc", &AnalyticsConfig::default())
            .unwrap();
        assert_eq!(
            url,
            "/api/surveys/abc/analytics/export/?config=%7B%22filters%22%3A%5B%5D%2C%22segmentation%22%3A%7B%22dimensions%22%3A%5B%5D%7D%7D"
        );
    }
}
