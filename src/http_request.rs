use std::fmt::{Display, Formatter};

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};

use crate::endpoint::{EndpointDescriptor, UrlPart};
use crate::session::SessionState;

/// A fully resolved request, ready to hand to a transport.
#[derive(Debug, Clone, PartialEq)]
pub struct ConcreteRequest {
    pub method: reqwest::Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<String>,
}

/// Builds the request for `descriptor` from the current session values.
///
/// Placeholders are replaced by their session value without any escaping;
/// a placeholder with no session entry contributes an empty segment. Only
/// the URL is templated, the body is the descriptor's fixed example payload.
pub fn compose(descriptor: &EndpointDescriptor, session: &SessionState) -> ConcreteRequest {
    let mut url = String::new();
    for part in descriptor.url_parts() {
        match part {
            UrlPart::Literal { value } => url.push_str(value),
            UrlPart::Placeholder { name, .. } => url.push_str(session.value_or_empty(name)),
        }
    }

    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    let body = if descriptor.has_body() {
        Some(match descriptor.body_template() {
            Some(template) => format!("{:#}", template),
            None => "null".to_string(),
        })
    } else {
        None
    };

    ConcreteRequest {
        method: descriptor.method().as_reqwest(),
        url,
        headers,
        body,
    }
}

impl Display for ConcreteRequest {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{} {}", self.method, self.url)?;
        for (name, value) in &self.headers {
            writeln!(f, "{}: {}", name, value.to_str().unwrap_or("<binary>"))?;
        }
        if let Some(body) = &self.body {
            writeln!(f)?;
            writeln!(f, "{}", body)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoint::HttpMethod;
    use crate::session::CONN_UUID;
    use serde_json::json;
    use test_case::test_case;

    fn send_msg() -> EndpointDescriptor {
        EndpointDescriptor::new(
            "add-msg",
            HttpMethod::Post,
            vec![
                UrlPart::literal("/connection/"),
                UrlPart::sized_placeholder(CONN_UUID, 36),
                UrlPart::literal("/send"),
            ],
        )
        .with_body(json!({"address": "+250788123123", "text": "Hello World"}))
    }

    #[test_case(SessionState::new() ; "empty session")]
    #[test_case(SessionState::with_defaults() ; "default session")]
    #[test_case([("conn_uuid", "x"), ("other", "y")].into_iter().collect() ; "populated session")]
    fn literal_only_url_ignores_session(session: SessionState) {
        let descriptor = EndpointDescriptor::new(
            "list-conns",
            HttpMethod::Get,
            vec![UrlPart::literal("/connection"), UrlPart::literal("/all")],
        );
        assert_eq!(compose(&descriptor, &session).url, "/connection/all");
    }

    #[test]
    fn placeholder_substituted_at_declared_position() {
        let mut session = SessionState::new();
        session.set(CONN_UUID, "abc-123");
        let request = compose(&send_msg(), &session);
        assert_eq!(request.url, "/connection/abc-123/send");
        assert_eq!(request.method, reqwest::Method::POST);
    }

    #[test]
    fn values_are_not_escaped() {
        let session = SessionState::with_defaults();
        let request = compose(&send_msg(), &session);
        assert_eq!(request.url, "/connection/connection uuid/send");
    }

    #[test]
    fn missing_placeholder_leaves_empty_segment() {
        let request = compose(&send_msg(), &SessionState::new());
        assert_eq!(request.url, "/connection//send");
    }

    #[test]
    fn body_is_fixed_template() {
        let mut session = SessionState::new();
        session.set("text", "should not leak into the body");
        let request = compose(&send_msg(), &session);
        let body: serde_json::Value = serde_json::from_str(request.body.as_deref().unwrap()).unwrap();
        assert_eq!(body, json!({"address": "+250788123123", "text": "Hello World"}));
    }

    #[test]
    fn bodyless_endpoint_has_no_body_but_keeps_content_type() {
        let descriptor = EndpointDescriptor::new("list-conns", HttpMethod::Get, vec![UrlPart::literal("/connection")]);
        let request = compose(&descriptor, &SessionState::new());
        assert!(request.body.is_none());
        assert_eq!(request.headers.get(CONTENT_TYPE).unwrap(), "application/json");
    }

    #[test]
    fn has_body_without_template_sends_null() {
        let descriptor = EndpointDescriptor::new("ping", HttpMethod::Post, vec![UrlPart::literal("/ping")])
            .with_has_body(true);
        let request = compose(&descriptor, &SessionState::new());
        assert_eq!(request.body.as_deref(), Some("null"));
    }

    #[test]
    fn composing_twice_is_identical() {
        let descriptor = EndpointDescriptor::new(
            "read-conn",
            HttpMethod::Get,
            vec![UrlPart::literal("/connection/"), UrlPart::placeholder(CONN_UUID)],
        );
        let session = SessionState::with_defaults();
        assert_eq!(compose(&descriptor, &session), compose(&descriptor, &session));
    }

    #[test]
    fn display_lists_request_line_headers_and_body() {
        let mut session = SessionState::new();
        session.set(CONN_UUID, "abc");
        let text = compose(&send_msg(), &session).to_string();
        assert!(text.starts_with("POST /connection/abc/send\ncontent-type: application/json\n\n{"));
    }
}
