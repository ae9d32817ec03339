use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the console itself, as opposed to request outcomes.
///
/// A request that fails on the wire never produces one of these; it comes
/// back as an [`Outcome::Failure`](crate::outcome::Outcome::Failure).
#[derive(Debug, Error)]
pub enum ConsoleError {
    #[error("unknown endpoint: {0}")]
    UnknownEndpoint(String),
    #[error("duplicate endpoint id in catalog: {0}")]
    DuplicateEndpoint(String),
    #[error("endpoint {id}: {reason}")]
    InvalidEndpoint { id: String, reason: String },
    #[error("invalid url template '{template}': {reason}")]
    InvalidUrlTemplate { template: String, reason: String },
    #[error("couldn't read catalog {path}: {source}")]
    CatalogIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid catalog json: {0}")]
    CatalogFormat(#[from] serde_json::Error),
    #[error("invalid base url '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
    #[error("couldn't build http client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

pub type ConsoleResult<T> = Result<T, ConsoleError>;
