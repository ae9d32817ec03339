use std::io::Write;

use chrono::Local;
use serde_json::Value;

use crate::catalog::Catalog;
use crate::outcome::Outcome;
use crate::session::SessionState;

/// Receives each fired endpoint's outcome for display.
pub trait RenderSink {
    fn render(&mut self, endpoint_id: &str, outcome: &Outcome);
}

/// Plain text renderer: `STATUS: <code>` and pretty JSON for successes,
/// `ERROR: <code>` and the raw body for failures.
pub struct TextRenderer<W> {
    out: W,
    timestamps: bool,
}

impl<W: Write> TextRenderer<W> {
    pub fn new(out: W) -> Self {
        TextRenderer { out, timestamps: true }
    }

    pub fn without_timestamps(mut self) -> Self {
        self.timestamps = false;
        self
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn catalog(&mut self, catalog: &Catalog) {
        for endpoint in catalog.iter() {
            self.write(&format!(
                "{:<12} {:<6} {:<45} {}",
                endpoint.id(),
                endpoint.method().to_string(),
                endpoint.url_shape(),
                endpoint.title()
            ));
        }
    }

    pub fn session(&mut self, session: &SessionState) {
        for (name, value) in session.iter() {
            self.write(&format!("{:<12} = {}", name, value));
        }
    }

    pub fn text(&mut self, text: &str) {
        self.write(text.trim_end());
    }

    // Output is best effort, a closed stdout must not take the console down.
    fn write(&mut self, text: &str) {
        let _ = writeln!(self.out, "{}", text);
        let _ = self.out.flush();
    }
}

impl<W: Write> RenderSink for TextRenderer<W> {
    fn render(&mut self, endpoint_id: &str, outcome: &Outcome) {
        let header = if self.timestamps {
            format!("[{}] {}", Local::now().format("%H:%M:%S"), endpoint_id)
        } else {
            endpoint_id.to_string()
        };
        let text = match outcome {
            Outcome::Success { status, body } => format!("{}\nSTATUS: {}\n{:#}", header, status, body),
            Outcome::Failure { status, body } => format!("{}\nERROR: {}\n{}", header, status, raw_text(body)),
        };
        self.write(&text);
    }
}

fn raw_text(body: &Value) -> String {
    match body {
        Value::String(text) => text.clone(),
        other => format!("{:#}", other),
    }
}
