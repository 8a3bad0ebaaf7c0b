//! Where the client finds its backend, and what it was launched to show.

use crate::api::client::normalize_base_url;

#[cfg(not(target_arch = "wasm32"))]
const DEFAULT_NATIVE_API_BASE: &str = "http://127.0.0.1:8000/api";
#[cfg(not(target_arch = "wasm32"))]
const DEFAULT_NATIVE_PUBLIC_BASE: &str = "http://localhost:3000";
#[cfg(target_arch = "wasm32")]
const DEFAULT_WEB_API_BASE: &str = "/api";

const DEFAULT_ADMIN_PASSWORD: &str = "concierge";

#[derive(Clone, Debug, PartialEq)]
pub struct ClientConfig {
    pub api_base_url: String,
    /// Base of the respondent-facing links handed out by the admin.
    pub public_base_url: String,
    pub admin_password: String,
}

impl ClientConfig {
    pub fn resolve() -> Self {
        Self {
            api_base_url: normalize_base_url(&api_base_url()),
            public_base_url: normalize_base_url(&public_base_url()),
            admin_password: admin_password(),
        }
    }

    pub fn survey_link(&self, survey_id: &str) -> String {
        format!("{}/survey/{survey_id}", self.public_base_url)
    }
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn admin_password() -> String {
    option_env!("SURVEY_ADMIN_PASSWORD")
        .and_then(non_empty)
        .unwrap_or_else(|| DEFAULT_ADMIN_PASSWORD.to_string())
}

#[cfg(not(target_arch = "wasm32"))]
fn env_or(name: &str, default: &str) -> String {
    std::env::var(name)
        .ok()
        .as_deref()
        .and_then(non_empty)
        .unwrap_or_else(|| default.to_string())
}

#[cfg(not(target_arch = "wasm32"))]
fn api_base_url() -> String {
    env_or("SURVEY_API_BASE_URL", DEFAULT_NATIVE_API_BASE)
}

#[cfg(not(target_arch = "wasm32"))]
fn public_base_url() -> String {
    env_or("SURVEY_PUBLIC_BASE_URL", DEFAULT_NATIVE_PUBLIC_BASE)
}

#[cfg(target_arch = "wasm32")]
fn api_base_url() -> String {
    api_base_from_build_env()
        .or_else(api_base_from_querystring)
        .or_else(api_base_from_meta)
        .or_else(api_base_from_local_storage)
        .unwrap_or_else(|| DEFAULT_WEB_API_BASE.to_string())
}

#[cfg(target_arch = "wasm32")]
fn public_base_url() -> String {
    option_env!("SURVEY_PUBLIC_BASE_URL")
        .and_then(non_empty)
        .or_else(|| web_sys::window()?.location().origin().ok())
        .unwrap_or_default()
}

#[cfg(target_arch = "wasm32")]
fn api_base_from_build_env() -> Option<String> {
    option_env!("SURVEY_API_BASE_URL").and_then(non_empty)
}

#[cfg(target_arch = "wasm32")]
fn api_base_from_querystring() -> Option<String> {
    let search = web_sys::window()?.location().search().ok()?;
    let raw = query_param(&search, "api_base")?;
    let decoded = js_sys::decode_uri_component(&raw).ok()?.as_string()?;
    non_empty(&decoded)
}

#[cfg(target_arch = "wasm32")]
fn api_base_from_meta() -> Option<String> {
    let document = web_sys::window()?.document()?;
    let meta = document
        .query_selector("meta[name='survey-api-base']")
        .ok()??;
    meta.get_attribute("content").as_deref().and_then(non_empty)
}

#[cfg(target_arch = "wasm32")]
fn api_base_from_local_storage() -> Option<String> {
    let storage = web_sys::window()?.local_storage().ok()??;
    storage
        .get_item("survey_api_base")
        .ok()?
        .as_deref()
        .and_then(non_empty)
}

/// Raw (still encoded) value of `key` in a `?a=1&b=2` query string.
pub fn query_param(search: &str, key: &str) -> Option<String> {
    let query = search.strip_prefix('?').unwrap_or(search);
    query
        .split('&')
        .map(|pair| pair.split_once('=').unwrap_or((pair, "")))
        .find(|(k, _)| *k == key)
        .map(|(_, v)| v.to_string())
}

#[derive(Clone, Debug, Default, PartialEq)]
pub enum LaunchTarget {
    #[default]
    Home,
    Survey(String),
    Admin,
    /// The embedded demo survey, no backend needed.
    Demo,
}

/// `--survey <id>`, `--admin` or `--demo`.
pub fn target_from_args<I: IntoIterator<Item = String>>(args: I) -> LaunchTarget {
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--admin" => return LaunchTarget::Admin,
            "--demo" => return LaunchTarget::Demo,
            "--survey" => {
                if let Some(id) = args.next().as_deref().and_then(non_empty) {
                    return LaunchTarget::Survey(id);
                }
            }
            _ => {}
        }
    }
    LaunchTarget::Home
}

/// `/survey/<id>`, `/admin` or `?demo`.
pub fn target_from_route(path: &str, search: &str) -> LaunchTarget {
    if query_param(search, "demo").is_some() {
        return LaunchTarget::Demo;
    }
    let mut segments = path.split('/').filter(|s| !s.is_empty());
    match (segments.next(), segments.next()) {
        (Some("admin"), _) => LaunchTarget::Admin,
        (Some("survey"), Some(id)) => LaunchTarget::Survey(id.to_string()),
        _ => LaunchTarget::Home,
    }
}

/// Survey id from either a bare id or a pasted `/survey/<id>` link.
pub fn survey_id_from_input(input: &str) -> Option<String> {
    let input = input.trim();
    let id = match input.split_once("/survey/") {
        Some((_, rest)) => rest.split(['/', '?', '#']).next().unwrap_or_default(),
        None => input,
    };
    non_empty(id)
}

#[cfg(target_arch = "wasm32")]
pub fn launch_target() -> LaunchTarget {
    let Some(location) = web_sys::window().map(|w| w.location()) else {
        return LaunchTarget::Home;
    };
    let path = location.pathname().unwrap_or_default();
    let search = location.search().unwrap_or_default();
    target_from_route(&path, &search)
}

#[cfg(not(target_arch = "wasm32"))]
pub fn launch_target() -> LaunchTarget {
    target_from_args(std::env::args().skip(1))
}
