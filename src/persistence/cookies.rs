use super::ProgressError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Clone, Debug, PartialEq)]
pub struct Cookie {
    pub name: String,
    /// Already URL-encoded.
    pub value: String,
    pub expires: DateTime<Utc>,
}

impl Cookie {
    /// `document.cookie` assignment string.
    pub fn header(&self) -> String {
        format!(
            "{}={}; expires={}; path=/; SameSite=Lax",
            self.name,
            self.value,
            self.expires.format("%a, %d %b %Y %H:%M:%S GMT")
        )
    }

    /// Assignment that makes the browser drop the cookie.
    pub fn removal_header(name: &str) -> String {
        format!("{name}=; expires=Thu, 01 Jan 1970 00:00:00 GMT; path=/; SameSite=Lax")
    }
}

/// Minimal cookie storage used by the progress store.
pub trait CookieJar {
    fn get(&self, name: &str) -> Option<String>;
    fn set(&mut self, cookie: Cookie) -> Result<(), ProgressError>;
    fn remove(&mut self, name: &str) -> Result<(), ProgressError>;
}

/// Finds `name` in a `document.cookie` style string (`a=1; b=2`).
pub fn find_cookie(cookie_string: &str, name: &str) -> Option<String> {
    cookie_string
        .split(';')
        .map(str::trim)
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct StoredCookie {
    value: String,
    expires_ms: i64,
}

/// In-process jar. The native app persists it through eframe storage, and
/// tests use it directly. Expired entries are invisible, like in a browser.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct MemoryCookieJar {
    cookies: BTreeMap<String, StoredCookie>,
}

impl MemoryCookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops everything that expired.
    pub fn purge_expired(&mut self) {
        let now = Utc::now().timestamp_millis();
        self.cookies.retain(|_, c| c.expires_ms > now);
    }

    pub fn len(&self) -> usize {
        self.cookies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }
}

impl CookieJar for MemoryCookieJar {
    fn get(&self, name: &str) -> Option<String> {
        let now = Utc::now().timestamp_millis();
        self.cookies
            .get(name)
            .filter(|c| c.expires_ms > now)
            .map(|c| c.value.clone())
    }

    fn set(&mut self, cookie: Cookie) -> Result<(), ProgressError> {
        self.cookies.insert(
            cookie.name,
            StoredCookie {
                value: cookie.value,
                expires_ms: cookie.expires.timestamp_millis(),
            },
        );
        Ok(())
    }

    fn remove(&mut self, name: &str) -> Result<(), ProgressError> {
        self.cookies.remove(name);
        Ok(())
    }
}

/// `document.cookie` of the page the app runs in.
#[cfg(target_arch = "wasm32")]
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserCookieJar;

#[cfg(target_arch = "wasm32")]
impl BrowserCookieJar {
    fn document() -> Result<web_sys::HtmlDocument, ProgressError> {
        use wasm_bindgen::JsCast;

        web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.dyn_into::<web_sys::HtmlDocument>().ok())
            .ok_or(ProgressError::NoDocument)
    }

    fn assign(header: &str) -> Result<(), ProgressError> {
        Self::document()?
            .set_cookie(header)
            .map_err(|err| ProgressError::Cookie(format!("{err:?}")))
    }
}

#[cfg(target_arch = "wasm32")]
impl CookieJar for BrowserCookieJar {
    fn get(&self, name: &str) -> Option<String> {
        let all = Self::document().ok()?.cookie().ok()?;
        find_cookie(&all, name)
    }

    fn set(&mut self, cookie: Cookie) -> Result<(), ProgressError> {
        Self::assign(&cookie.header())
    }

    fn remove(&mut self, name: &str) -> Result<(), ProgressError> {
        Self::assign(&Cookie::removal_header(name))
    }
}

#[cfg(target_arch = "wasm32")]
pub type PlatformCookieJar = BrowserCookieJar;
#[cfg(not(target_arch = "wasm32"))]
pub type PlatformCookieJar = MemoryCookieJar;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn header_carries_expiry_path_and_same_site() {
        let cookie = Cookie {
            name: "k".into(),
            value: "v%20w".into(),
            expires: Utc.with_ymd_and_hms(2030, 1, 2, 3, 4, 5).unwrap(),
        };
        assert_eq!(
            cookie.header(),
            "k=v%20w; expires=Wed, 02 Jan 2030 03:04:05 GMT; path=/; SameSite=Lax"
        );
    }

    #[test]
    fn finds_cookie_among_others() {
        let all = "a=1; survey_concierge_response_x=%7B%7D; b=2";
        assert_eq!(find_cookie(all, "survey_concierge_response_x").as_deref(), Some("%7B%7D"));
        assert_eq!(find_cookie(all, "c"), None);
    }

    #[test]
    fn memory_jar_hides_expired_cookies() {
        let mut jar = MemoryCookieJar::new();
        jar.set(Cookie {
            name: "old".into(),
            value: "1".into(),
            expires: Utc::now() - Duration::days(1),
        })
        .unwrap();
        jar.set(Cookie {
            name: "new".into(),
            value: "2".into(),
            expires: Utc::now() + Duration::days(1),
        })
        .unwrap();
        assert_eq!(jar.get("old"), None);
        assert_eq!(jar.get("new").as_deref(), Some("2"));
        jar.purge_expired();
        assert_eq!(jar.len(), 1);
    }
}
