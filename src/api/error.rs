use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Could not reach the survey service: {0}")]
    Transport(String),
    #[error("The survey service answered with HTTP {status}")]
    Http { status: u16, body: String },
    #[error("Unexpected response from the survey service: {0}")]
    Decode(String),
    #[error("Could not encode the request: {0}")]
    Encode(String),
    #[error("No browser window available")]
    NoWindow,
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

/// What the respondent is told when a submission does not go through.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum SubmitFailure {
    #[error("Please answer all required questions before submitting.")]
    MissingFields(String),
    #[error("Failed to submit survey. Please try again.")]
    Generic(String),
}

impl SubmitFailure {
    /// Backend detail, for logs.
    pub fn detail(&self) -> &str {
        match self {
            SubmitFailure::MissingFields(detail) | SubmitFailure::Generic(detail) => detail,
        }
    }
}

impl From<&ApiError> for SubmitFailure {
    fn from(err: &ApiError) -> Self {
        match err {
            ApiError::Http { status: 400, body } if body.to_ascii_lowercase().contains("required") => {
                SubmitFailure::MissingFields(body.clone())
            }
            ApiError::Http { body, .. } if !body.trim().is_empty() => SubmitFailure::Generic(body.clone()),
            other => SubmitFailure::Generic(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_request_about_required_questions_is_missing_fields() {
        let err = ApiError::Http {
            status: 400,
            body: r#"{"error": "Required question 'Name' is missing"}"#.into(),
        };
        assert!(matches!(SubmitFailure::from(&err), SubmitFailure::MissingFields(_)));
    }

    #[test]
    fn everything_else_is_generic() {
        let err = ApiError::Http {
            status: 500,
            body: String::new(),
        };
        let failure = SubmitFailure::from(&err);
        assert!(matches!(failure, SubmitFailure::Generic(_)));
        assert_eq!(failure.to_string(), "Failed to submit survey. Please try again.");

        let failure = SubmitFailure::from(&ApiError::Transport("offline".into()));
        assert!(failure.detail().contains("offline"));
    }

    #[test]
    fn status_is_exposed_for_http_errors_only() {
        let err = ApiError::Http {
            status: 404,
            body: String::new(),
        };
        assert!(err.is_not_found());
        assert_eq!(ApiError::NoWindow.status(), None);
    }
}
