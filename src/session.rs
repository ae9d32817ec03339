use std::collections::BTreeMap;

/// Placeholder holding the connection the console is currently working with.
pub const CONN_UUID: &str = "conn_uuid";
/// Placeholder holding the last message id seen in a response.
pub const MSG_ID: &str = "msg_id";

/// Values substituted into endpoint URLs, shared by every endpoint of one
/// console session. Nothing here outlives the session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    values: BTreeMap<String, String>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// A fresh session with readable prompts in place of real identifiers.
    pub fn with_defaults() -> Self {
        let mut state = Self::new();
        state.set(CONN_UUID, "connection uuid");
        state.set(MSG_ID, "msg id");
        state
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Value used when composing a URL; a missing entry reads as empty.
    pub fn value_or_empty(&self, name: &str) -> &str {
        self.get(name).unwrap_or("")
    }

    /// Stores `value` under `name`, returning what was there before.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.values.insert(name.into(), value.into())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for SessionState {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut state = Self::new();
        for (name, value) in iter {
            state.set(name, value);
        }
        state
    }
}
