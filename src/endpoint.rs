use std::fmt::{Display, Formatter};
use std::sync::OnceLock;

use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

use crate::errors::{ConsoleError, ConsoleResult};

/// HTTP verbs an endpoint can be fired with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
}

impl HttpMethod {
    pub fn as_reqwest(self) -> reqwest::Method {
        match self {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Delete => reqwest::Method::DELETE,
            HttpMethod::Patch => reqwest::Method::PATCH,
        }
    }
}

impl Display for HttpMethod {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_reqwest())
    }
}

/// One segment of an endpoint URL.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum UrlPart {
    /// Copied into the URL verbatim.
    Literal { value: String },
    /// Filled from the session value stored under `name`. `length` is only a
    /// display hint for the expected width of the value.
    Placeholder {
        name: String,
        #[serde(default)]
        length: Option<usize>,
    },
}

impl UrlPart {
    pub fn literal(value: impl Into<String>) -> Self {
        UrlPart::Literal { value: value.into() }
    }

    pub fn placeholder(name: impl Into<String>) -> Self {
        UrlPart::Placeholder { name: name.into(), length: None }
    }

    pub fn sized_placeholder(name: impl Into<String>, length: usize) -> Self {
        UrlPart::Placeholder { name: name.into(), length: Some(length) }
    }

    /// Splits a template such as `/connection/{conn_uuid}/send` into parts.
    pub fn parse_template(template: &str) -> ConsoleResult<Vec<UrlPart>> {
        static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
        static NAME: OnceLock<Regex> = OnceLock::new();
        let placeholder = PLACEHOLDER.get_or_init(|| Regex::new(r"\{([^{}]*)\}").expect("static regex"));
        let name_pattern = NAME.get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("static regex"));

        let invalid = |reason: String| ConsoleError::InvalidUrlTemplate {
            template: template.to_string(),
            reason,
        };

        let mut parts = Vec::new();
        let mut literal_start = 0;
        for captures in placeholder.captures_iter(template) {
            let whole = captures.get(0).expect("group 0 always matches");
            let name = &captures[1];
            if !name_pattern.is_match(name) {
                return Err(invalid(format!("'{}' is not a valid placeholder name", name)));
            }
            push_literal(&mut parts, &template[literal_start..whole.start()]).map_err(invalid)?;
            parts.push(UrlPart::placeholder(name));
            literal_start = whole.end();
        }
        push_literal(&mut parts, &template[literal_start..]).map_err(invalid)?;
        Ok(parts)
    }
}

fn push_literal(parts: &mut Vec<UrlPart>, text: &str) -> Result<(), String> {
    if text.contains('{') || text.contains('}') {
        return Err(format!("unbalanced brace in '{}'", text));
    }
    if !text.is_empty() {
        parts.push(UrlPart::literal(text));
    }
    Ok(())
}

/// Static description of one API operation the console can fire.
#[derive(Debug, Clone, PartialEq)]
pub struct EndpointDescriptor {
    id: String,
    method: HttpMethod,
    title: String,
    url_parts: Vec<UrlPart>,
    has_body: bool,
    body_template: Option<Value>,
}

impl EndpointDescriptor {
    pub fn new(id: impl Into<String>, method: HttpMethod, url_parts: Vec<UrlPart>) -> Self {
        EndpointDescriptor {
            id: id.into(),
            method,
            title: String::new(),
            url_parts,
            has_body: false,
            body_template: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.has_body = true;
        self.body_template = Some(body);
        self
    }

    pub fn with_has_body(mut self, has_body: bool) -> Self {
        self.has_body = has_body;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn url_parts(&self) -> &[UrlPart] {
        &self.url_parts
    }

    pub fn has_body(&self) -> bool {
        self.has_body
    }

    pub fn body_template(&self) -> Option<&Value> {
        self.body_template.as_ref()
    }

    /// Names of the session values this endpoint's URL depends on, in order.
    pub fn placeholders(&self) -> impl Iterator<Item = &str> {
        self.url_parts.iter().filter_map(|part| match part {
            UrlPart::Placeholder { name, .. } => Some(name.as_str()),
            UrlPart::Literal { .. } => None,
        })
    }

    /// URL shape for display, e.g. `/connection/[conn_uuid]/send`.
    pub fn url_shape(&self) -> String {
        self.url_parts
            .iter()
            .map(|part| match part {
                UrlPart::Literal { value } => value.clone(),
                UrlPart::Placeholder { name, .. } => format!("[{}]", name),
            })
            .collect()
    }
}
