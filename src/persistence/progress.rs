//! Saves partially answered surveys into a cookie so respondents can resume.
//!
//! Everything here is best effort: failures are logged and reported as
//! "nothing saved", never returned to the caller.

use super::ProgressError;
use super::cookies::{Cookie, CookieJar};
use crate::answers::{OtherTexts, Responses};
use chrono::{Duration, Utc};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};
use rand::Rng;
use serde::{Deserialize, Serialize};

pub const COOKIE_PREFIX: &str = "survey_concierge_response_";
pub const EXPIRY_DAYS: i64 = 30;

/// Characters `encodeURIComponent` leaves alone.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSnapshot {
    pub responses: Responses,
    pub current_section_index: usize,
    #[serde(default)]
    pub other_texts: OtherTexts,
    /// Epoch milliseconds of the save.
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

pub fn cookie_name(survey_id: &str) -> String {
    format!("{COOKIE_PREFIX}{survey_id}")
}

/// `session_{timestamp}_{9 random base-36 chars}`
pub fn new_session_id(timestamp: i64) -> String {
    const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    let mut rng = rand::thread_rng();
    let suffix: String = (0..9)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect();
    format!("session_{timestamp}_{suffix}")
}

/// Same output as JavaScript's `encodeURIComponent`.
pub fn encode_uri_component(raw: &str) -> String {
    utf8_percent_encode(raw, URI_COMPONENT).to_string()
}

pub fn encode_snapshot(snapshot: &ProgressSnapshot) -> Result<String, ProgressError> {
    let json = serde_json::to_string(snapshot)?;
    Ok(encode_uri_component(&json))
}

pub fn decode_snapshot(raw: &str) -> Result<ProgressSnapshot, ProgressError> {
    let json = percent_decode_str(raw).decode_utf8()?;
    Ok(serde_json::from_str(&json)?)
}

pub struct ProgressStore<J: CookieJar> {
    jar: J,
}

impl<J: CookieJar> ProgressStore<J> {
    pub fn new(jar: J) -> Self {
        Self { jar }
    }

    pub fn jar(&self) -> &J {
        &self.jar
    }

    fn try_save(&mut self, survey_id: &str, snapshot: &ProgressSnapshot) -> Result<(), ProgressError> {
        let value = encode_snapshot(snapshot)?;
        self.jar.set(Cookie {
            name: cookie_name(survey_id),
            value,
            expires: Utc::now() + Duration::days(EXPIRY_DAYS),
        })
    }

    /// Overwrites the saved progress of `survey_id`.
    pub fn save(&mut self, survey_id: &str, snapshot: &ProgressSnapshot) {
        match self.try_save(survey_id, snapshot) {
            Ok(()) => log::debug!(
                "saved progress for survey {survey_id} at section {}",
                snapshot.current_section_index
            ),
            Err(err) => log::warn!("could not save progress for survey {survey_id}: {err}"),
        }
    }

    /// Saved progress, if any and not older than the expiry window.
    pub fn load(&mut self, survey_id: &str) -> Option<ProgressSnapshot> {
        let raw = self.jar.get(&cookie_name(survey_id))?;
        let snapshot = match decode_snapshot(&raw) {
            Ok(snapshot) => snapshot,
            Err(err) => {
                log::warn!("ignoring unreadable progress for survey {survey_id}: {err}");
                return None;
            }
        };

        let age = now_millis() - snapshot.timestamp;
        if age > Duration::days(EXPIRY_DAYS).num_milliseconds() {
            log::info!("saved progress for survey {survey_id} expired");
            self.clear(survey_id);
            return None;
        }
        Some(snapshot)
    }

    pub fn clear(&mut self, survey_id: &str) {
        if let Err(err) = self.jar.remove(&cookie_name(survey_id)) {
            log::warn!("could not clear progress for survey {survey_id}: {err}");
        }
    }

    pub fn exists(&mut self, survey_id: &str) -> bool {
        self.load(survey_id).is_some()
    }

    /// Session id of `snapshot`, minting and persisting one when missing.
    pub fn ensure_session_id(&mut self, survey_id: &str, snapshot: &mut ProgressSnapshot) -> String {
        if let Some(id) = snapshot.session_id.as_ref().filter(|id| !id.is_empty()) {
            return id.clone();
        }
        let id = new_session_id(now_millis());
        snapshot.session_id = Some(id.clone());
        self.save(survey_id, snapshot);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::answers::Answer;
    use crate::persistence::MemoryCookieJar;

    fn snapshot(timestamp: i64) -> ProgressSnapshot {
        let mut responses = Responses::new();
        responses.insert(1, Answer::Text("naïve; value=\"x\"".into()));
        responses.insert(2, Answer::List(vec!["A".into(), "Other".into()]));
        responses.insert(3, Answer::Number(-2.5));
        let mut other_texts = OtherTexts::new();
        other_texts.insert(2, "Something & more".into());
        ProgressSnapshot {
            responses,
            current_section_index: 1,
            other_texts,
            timestamp,
            session_id: Some("session_1_abc".into()),
        }
    }

    #[test]
    fn save_then_load_round_trips() {
        let mut store = ProgressStore::new(MemoryCookieJar::new());
        let saved = snapshot(now_millis());
        store.save("s1", &saved);
        assert_eq!(store.load("s1"), Some(saved));
        assert!(store.exists("s1"));
        assert!(!store.exists("s2"));
    }

    #[test]
    fn clear_removes_progress() {
        let mut store = ProgressStore::new(MemoryCookieJar::new());
        store.save("s1", &snapshot(now_millis()));
        store.clear("s1");
        assert_eq!(store.load("s1"), None);
    }

    #[test]
    fn stale_snapshot_is_expired_and_deleted() {
        let mut jar = MemoryCookieJar::new();
        let stale = snapshot(now_millis() - Duration::days(31).num_milliseconds());
        jar.set(Cookie {
            name: cookie_name("s1"),
            value: encode_snapshot(&stale).unwrap(),
            expires: Utc::now() + Duration::days(1),
        })
        .unwrap();

        let mut store = ProgressStore::new(jar);
        assert_eq!(store.load("s1"), None);
        assert_eq!(store.jar().get(&cookie_name("s1")), None);
    }

    #[test]
    fn garbage_cookie_reads_as_nothing() {
        let mut jar = MemoryCookieJar::new();
        jar.set(Cookie {
            name: cookie_name("s1"),
            value: "%7Bnot-json".into(),
            expires: Utc::now() + Duration::days(1),
        })
        .unwrap();
        let mut store = ProgressStore::new(jar);
        assert_eq!(store.load("s1"), None);
    }

    #[test]
    fn encoding_matches_encode_uri_component() {
        let mut s = snapshot(5);
        s.responses.clear();
        s.other_texts.clear();
        s.session_id = None;
        assert_eq!(
            encode_snapshot(&s).unwrap(),
            "%7B%22responses%22%3A%7B%7D%2C%22currentSectionIndex%22%3A1%2C%22otherTexts%22%3A%7B%7D%2C%22timestamp%22%3A5%7D"
        );
    }

    #[test]
    fn session_id_is_minted_once_and_persisted() {
        let mut store = ProgressStore::new(MemoryCookieJar::new());
        let mut s = snapshot(now_millis());
        s.session_id = None;
        let id = store.ensure_session_id("s1", &mut s);
        assert!(id.starts_with("session_"));
        assert_eq!(id.rsplit('_').next().map(str::len), Some(9));
        assert_eq!(store.load("s1").and_then(|s| s.session_id), Some(id.clone()));
        assert_eq!(store.ensure_session_id("s1", &mut s), id);
    }
}
