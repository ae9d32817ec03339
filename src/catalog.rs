use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::endpoint::{EndpointDescriptor, HttpMethod, UrlPart};
use crate::errors::{ConsoleError, ConsoleResult};
use crate::session::{CONN_UUID, MSG_ID};

/// The ordered set of endpoints a console can fire.
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    endpoints: Vec<EndpointDescriptor>,
}

impl Catalog {
    /// Builds a catalog, rejecting duplicate ids.
    pub fn new(endpoints: Vec<EndpointDescriptor>) -> ConsoleResult<Self> {
        let mut seen = HashSet::new();
        for endpoint in &endpoints {
            if !seen.insert(endpoint.id()) {
                return Err(ConsoleError::DuplicateEndpoint(endpoint.id().to_string()));
            }
        }
        Ok(Catalog { endpoints })
    }

    /// The junebug gateway API: connections and the messages sent over them.
    pub fn builtin() -> Self {
        let connection = || UrlPart::literal("/connection");
        let connection_slash = || UrlPart::literal("/connection/");
        let conn_uuid = || UrlPart::sized_placeholder(CONN_UUID, 36);

        let endpoints = vec![
            EndpointDescriptor::new("list-conns", HttpMethod::Get, vec![connection()])
                .with_title("List active connections"),
            EndpointDescriptor::new("read-conn", HttpMethod::Get, vec![connection_slash(), conn_uuid()])
                .with_title("Get status for specific connection"),
            EndpointDescriptor::new("add-conn", HttpMethod::Post, vec![connection()])
                .with_title("Create new connection")
                .with_body(json!({
                    "senders": {
                        "type": "echo",
                        "count": 5,
                        "config": {"pause": "1"}
                    },
                    "receivers": {
                        "receiver_type": "http",
                        "count": 5,
                        "config": {"url": "http://myhost.com/receive"}
                    }
                })),
            EndpointDescriptor::new("delete-conn", HttpMethod::Delete, vec![connection_slash(), conn_uuid()])
                .with_title("Deletes a connection"),
            EndpointDescriptor::new(
                "add-msg",
                HttpMethod::Post,
                vec![connection_slash(), conn_uuid(), UrlPart::literal("/send")],
            )
            .with_title("Sends a message")
            .with_body(json!({"address": "+250788123123", "text": "Hello World"})),
            EndpointDescriptor::new(
                "read-msg",
                HttpMethod::Get,
                vec![
                    connection_slash(),
                    conn_uuid(),
                    UrlPart::literal("/status/"),
                    UrlPart::sized_placeholder(MSG_ID, 18),
                ],
            )
            .with_title("Gets the status of a message"),
        ];
        Catalog { endpoints }
    }

    pub fn from_path(path: &Path) -> ConsoleResult<Self> {
        let text = fs::read_to_string(path).map_err(|source| ConsoleError::CatalogIo {
            path: path.to_path_buf(),
            source,
        })?;
        let catalog = Self::from_json_str(&text)?;
        debug!(path = %path.display(), endpoints = catalog.len(), "catalog loaded");
        Ok(catalog)
    }

    /// Parses a JSON array of endpoint entries.
    pub fn from_json_str(text: &str) -> ConsoleResult<Self> {
        let raw: Vec<RawEndpoint> = serde_json::from_str(text)?;
        let endpoints = raw
            .into_iter()
            .map(RawEndpoint::into_descriptor)
            .collect::<ConsoleResult<Vec<_>>>()?;
        Self::new(endpoints)
    }

    pub fn get(&self, id: &str) -> ConsoleResult<&EndpointDescriptor> {
        self.endpoints
            .iter()
            .find(|endpoint| endpoint.id() == id)
            .ok_or_else(|| ConsoleError::UnknownEndpoint(id.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &EndpointDescriptor> {
        self.endpoints.iter()
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }
}

// Shape of one entry in a catalog file
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawEndpoint {
    id: String,
    method: HttpMethod,
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    url_parts: Option<Vec<UrlPart>>,
    #[serde(default)]
    has_body: Option<bool>,
    #[serde(default)]
    body: Option<Value>,
}

impl RawEndpoint {
    fn into_descriptor(self) -> ConsoleResult<EndpointDescriptor> {
        let invalid = |reason: &str| ConsoleError::InvalidEndpoint {
            id: self.id.clone(),
            reason: reason.to_string(),
        };
        let url_parts = match (&self.url, &self.url_parts) {
            (Some(template), None) => UrlPart::parse_template(template)?,
            (None, Some(parts)) => parts.clone(),
            (Some(_), Some(_)) => return Err(invalid("give either `url` or `url_parts`, not both")),
            (None, None) => return Err(invalid("missing `url` or `url_parts`")),
        };
        if self.has_body == Some(false) && self.body.is_some() {
            return Err(invalid("`body` given but `has_body` is false"));
        }

        let mut descriptor = EndpointDescriptor::new(self.id.clone(), self.method, url_parts).with_title(self.title.clone());
        if let Some(body) = self.body.clone() {
            descriptor = descriptor.with_body(body);
        } else if let Some(has_body) = self.has_body {
            descriptor = descriptor.with_has_body(has_body);
        }
        Ok(descriptor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http_request::compose;
    use crate::session::SessionState;

    #[test]
    fn builtin_catalog_shapes() {
        let catalog = Catalog::builtin();
        let ids: Vec<_> = catalog.iter().map(EndpointDescriptor::id).collect();
        assert_eq!(ids, vec!["list-conns", "read-conn", "add-conn", "delete-conn", "add-msg", "read-msg"]);

        let mut session = SessionState::new();
        session.set(CONN_UUID, "c");
        session.set(MSG_ID, "m");
        let read_msg = compose(catalog.get("read-msg").unwrap(), &session);
        assert_eq!(read_msg.url, "/connection/c/status/m");
        assert!(catalog.get("add-conn").unwrap().has_body());
    }

    #[test]
    fn unknown_endpoint() {
        let err = Catalog::builtin().get("nope").unwrap_err();
        assert!(matches!(err, ConsoleError::UnknownEndpoint(id) if id == "nope"));
    }

    #[test]
    fn duplicate_ids_rejected() {
        let endpoint = EndpointDescriptor::new("a", HttpMethod::Get, vec![UrlPart::literal("/a")]);
        let err = Catalog::new(vec![endpoint.clone(), endpoint]).unwrap_err();
        assert!(matches!(err, ConsoleError::DuplicateEndpoint(id) if id == "a"));
    }

    #[test]
    fn loads_json_with_both_url_forms() {
        let catalog = Catalog::from_json_str(
            r#"[
                {"id": "list", "method": "GET", "title": "List", "url": "/connection"},
                {"id": "send", "method": "POST", "url_parts": [
                    {"value": "/connection/"}, {"name": "conn_uuid", "length": 36}, {"value": "/send"}
                ], "body": {"text": "hi"}},
                {"id": "ping", "method": "PUT", "url": "/ping/{conn_uuid}", "has_body": true}
            ]"#,
        )
        .unwrap();

        assert_eq!(catalog.len(), 3);
        let list = catalog.get("list").unwrap();
        assert_eq!(list.title(), "List");
        assert!(!list.has_body());

        let send = catalog.get("send").unwrap();
        assert_eq!(send.url_shape(), "/connection/[conn_uuid]/send");
        assert_eq!(send.body_template(), Some(&json!({"text": "hi"})));

        let ping = catalog.get("ping").unwrap();
        assert!(ping.has_body());
        assert_eq!(ping.body_template(), None);
    }

    #[test]
    fn rejects_entry_without_url() {
        let err = Catalog::from_json_str(r#"[{"id": "x", "method": "GET"}]"#).unwrap_err();
        assert!(matches!(err, ConsoleError::InvalidEndpoint { id, .. } if id == "x"));
    }

    #[test]
    fn rejects_entry_with_both_url_forms() {
        let err = Catalog::from_json_str(r#"[{"id": "x", "method": "GET", "url": "/a", "url_parts": []}]"#).unwrap_err();
        assert!(matches!(err, ConsoleError::InvalidEndpoint { .. }));
    }

    #[test]
    fn rejects_unknown_method() {
        let err = Catalog::from_json_str(r#"[{"id": "x", "method": "TRACE", "url": "/a"}]"#).unwrap_err();
        assert!(matches!(err, ConsoleError::CatalogFormat(_)));
    }

    #[test]
    fn rejects_bad_template() {
        let err = Catalog::from_json_str(r#"[{"id": "x", "method": "GET", "url": "/a/{"}]"#).unwrap_err();
        assert!(matches!(err, ConsoleError::InvalidUrlTemplate { .. }));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = Catalog::from_path(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(matches!(err, ConsoleError::CatalogIo { .. }));
    }
}
