//! Interactive console for the junebug HTTP API.
//!
//! Endpoints from a [`catalog::Catalog`] are composed into concrete requests
//! from the current [`session::SessionState`], sent through a
//! [`http_request_executor::Transport`], and identifiers found anywhere in a
//! successful response are written back into the session for later requests.

pub mod catalog;
pub mod config;
pub mod console;
pub mod endpoint;
pub mod errors;
pub mod execute;
pub mod field_extractor;
pub mod http_request;
pub mod http_request_executor;
pub mod outcome;
pub mod render;
pub mod repl;
pub mod session;
pub mod session_updater;

pub use catalog::Catalog;
pub use console::Console;
pub use endpoint::{EndpointDescriptor, HttpMethod, UrlPart};
pub use errors::{ConsoleError, ConsoleResult};
pub use http_request::{compose, ConcreteRequest};
pub use http_request_executor::{Dispatcher, ReqwestTransport, Transport};
pub use outcome::Outcome;
pub use session::SessionState;
