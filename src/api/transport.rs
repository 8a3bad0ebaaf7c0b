//! Sends an `ApiRequest`: blocking `reqwest` natively, `fetch` in the browser.

use super::client::ApiRequest;
use super::error::ApiError;
use serde::de::DeserializeOwned;

/// Decodes a JSON body; an empty body reads as `null`.
pub fn decode<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    let body = if body.trim().is_empty() { "null" } else { body };
    serde_json::from_str(body).map_err(|err| ApiError::Decode(err.to_string()))
}

#[cfg(not(target_arch = "wasm32"))]
pub fn send(request: &ApiRequest) -> Result<String, ApiError> {
    use super::client::Method;

    let client = reqwest::blocking::Client::new();
    let builder = match request.method {
        Method::Get => client.get(&request.url),
        Method::Post => client.post(&request.url),
    };
    let builder = match &request.body {
        Some(body) => builder
            .header("Content-Type", "application/json")
            .body(body.clone()),
        None => builder,
    };

    let response = builder
        .header("Accept", "application/json")
        .send()
        .map_err(|err| ApiError::Transport(err.to_string()))?;
    let status = response.status();
    let body = response
        .text()
        .map_err(|err| ApiError::Transport(err.to_string()))?;

    if !status.is_success() {
        log::warn!("{} {} -> HTTP {}", request.method.as_str(), request.url, status);
        return Err(ApiError::Http {
            status: status.as_u16(),
            body,
        });
    }
    Ok(body)
}

#[cfg(target_arch = "wasm32")]
pub async fn send(request: ApiRequest) -> Result<String, ApiError> {
    use wasm_bindgen::JsCast;
    use wasm_bindgen::JsValue;
    use wasm_bindgen_futures::JsFuture;
    use web_sys::{Request, RequestInit, RequestMode, Response};

    let opts = RequestInit::new();
    opts.set_method(request.method.as_str());
    opts.set_mode(RequestMode::Cors);
    if let Some(body) = &request.body {
        opts.set_body(&JsValue::from_str(body));
    }

    let window = web_sys::window().ok_or(ApiError::NoWindow)?;
    let js_request = Request::new_with_str_and_init(&request.url, &opts)
        .map_err(|err| ApiError::Transport(format!("{err:?}")))?;
    let headers = js_request.headers();
    headers
        .set("Accept", "application/json")
        .map_err(|err| ApiError::Transport(format!("{err:?}")))?;
    if request.body.is_some() {
        headers
            .set("Content-Type", "application/json")
            .map_err(|err| ApiError::Transport(format!("{err:?}")))?;
    }

    let value = JsFuture::from(window.fetch_with_request(&js_request))
        .await
        .map_err(|err| ApiError::Transport(format!("{err:?}")))?;
    let response: Response = value
        .dyn_into()
        .map_err(|_| ApiError::Transport("fetch did not return a Response".into()))?;

    let text = match response.text() {
        Ok(promise) => JsFuture::from(promise).await,
        Err(err) => Err(err),
    }
    .map_err(|err| ApiError::Transport(format!("{err:?}")))?
    .as_string()
    .unwrap_or_default();

    if !response.ok() {
        log::warn!(
            "{} {} -> HTTP {}",
            request.method.as_str(),
            request.url,
            response.status()
        );
        return Err(ApiError::Http {
            status: response.status(),
            body: text,
        });
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SurveySummary;

    #[test]
    fn decode_reports_bad_json() {
        let err = decode::<Vec<SurveySummary>>("<html>").unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }

    #[test]
    fn empty_body_decodes_as_null() {
        assert_eq!(decode::<serde_json::Value>("  ").unwrap(), serde_json::Value::Null);
    }

    #[test]
    fn decode_reads_survey_list() {
        let list: Vec<SurveySummary> = decode(
            r#"[{"id": "a", "title": "T", "question_count": 3, "created_at": "2024-01-01T00:00:00Z"}]"#,
        )
        .unwrap();
        assert_eq!(list[0].question_count, 3);
        assert!(list[0].is_active);
    }
}
