pub mod cookies;
pub mod progress;

pub use cookies::{Cookie, CookieJar, MemoryCookieJar, PlatformCookieJar};
pub use progress::{ProgressSnapshot, ProgressStore};

use thiserror::Error;

/// Failures of the best-effort progress store. These are logged, never shown.
#[derive(Debug, Error)]
pub enum ProgressError {
    #[error("progress payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("progress cookie is not valid UTF-8: {0}")]
    Decode(#[from] std::str::Utf8Error),
    #[error("cookie write rejected: {0}")]
    Cookie(String),
    #[error("no HTML document to hold cookies")]
    NoDocument,
}
