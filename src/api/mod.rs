//! Survey backend API: request building, transports and background tasks.

pub mod analytics;
pub mod client;
pub mod error;
pub mod tasks;
pub mod transport;

pub use analytics::{AnalyticsConfig, AnalyticsPreview, Debouncer};
pub use client::{ApiClient, ApiRequest, Method};
pub use error::{ApiError, SubmitFailure};
pub use tasks::Pending;

use crate::answers::{Answer, Responses};
use crate::model::QuestionId;
use serde::Serialize;

/// Body of `POST /surveys/{id}/submit/`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SubmitPayload {
    pub responses: Responses,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

/// One answer saved as soon as its section is completed.
#[derive(Clone, Debug, PartialEq)]
pub struct PartialSave {
    pub survey_id: String,
    pub question_id: QuestionId,
    pub answer: Answer,
    pub session_id: Option<String>,
}

#[derive(Serialize)]
struct PartialSavePayload<'a> {
    answer: &'a Answer,
    #[serde(skip_serializing_if = "Option::is_none")]
    session_id: Option<&'a str>,
}
