use serde_json::Value;
use tracing::debug;

use crate::field_extractor::find;
use crate::outcome::Outcome;
use crate::session::{SessionState, CONN_UUID, MSG_ID};

/// Pairs a session placeholder with the response key that feeds it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchedField {
    pub placeholder: String,
    pub response_key: String,
}

impl WatchedField {
    pub fn new(placeholder: impl Into<String>, response_key: impl Into<String>) -> Self {
        WatchedField {
            placeholder: placeholder.into(),
            response_key: response_key.into(),
        }
    }
}

/// The identifiers the console threads from one response into later requests.
pub fn default_watch_list() -> Vec<WatchedField> {
    vec![WatchedField::new(CONN_UUID, "uuid"), WatchedField::new(MSG_ID, "id")]
}

/// A session entry overwritten by [`apply_extractions`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    pub placeholder: String,
    pub value: String,
}

/// Copies watched fields out of a successful response into `session`.
///
/// Failures never touch the session. A watched key that is absent, or whose
/// value is `null`, leaves its entry as it was.
pub fn apply_extractions(outcome: &Outcome, session: &mut SessionState, watch_list: &[WatchedField]) -> Vec<Extraction> {
    let body = match outcome {
        Outcome::Success { body, .. } => body,
        Outcome::Failure { .. } => return Vec::new(),
    };

    let mut applied = Vec::new();
    for watched in watch_list {
        let Some(value) = find(body, &watched.response_key).and_then(session_value) else {
            continue;
        };
        debug!(placeholder = %watched.placeholder, value = %value, "session value updated from response");
        session.set(watched.placeholder.clone(), value.clone());
        applied.push(Extraction {
            placeholder: watched.placeholder.clone(),
            value,
        });
    }
    applied
}

fn session_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}
