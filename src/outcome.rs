use serde_json::Value;

/// Status reported when a request never produced an HTTP response.
pub const NO_RESPONSE_STATUS: u16 = 0;

/// Result of one dispatched request.
///
/// Both "the server answered with a non-2xx status" and "the request never
/// reached the server" are a [`Outcome::Failure`]; in the latter case the
/// status is [`NO_RESPONSE_STATUS`] and the body carries the error text.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Success { status: u16, body: Value },
    Failure { status: u16, body: Value },
}

impl Outcome {
    /// Classifies a response by its HTTP status.
    pub fn from_response(status: u16, body: Value) -> Self {
        if (200..300).contains(&status) {
            Outcome::Success { status, body }
        } else {
            Outcome::Failure { status, body }
        }
    }

    pub fn unreachable(reason: impl Into<String>) -> Self {
        Outcome::Failure {
            status: NO_RESPONSE_STATUS,
            body: Value::String(reason.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success { .. })
    }

    pub fn status(&self) -> u16 {
        match self {
            Outcome::Success { status, .. } | Outcome::Failure { status, .. } => *status,
        }
    }

    pub fn body(&self) -> &Value {
        match self {
            Outcome::Success { body, .. } | Outcome::Failure { body, .. } => body,
        }
    }
}

/// Reads a response payload as JSON, falling back to the raw text.
pub fn parse_body(text: &str) -> Value {
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}
