use std::cell::{Ref, RefCell};

use futures::future::join_all;
use tracing::{debug, info};

use crate::catalog::Catalog;
use crate::errors::ConsoleResult;
use crate::http_request::{compose, ConcreteRequest};
use crate::http_request_executor::{Dispatcher, Transport};
use crate::outcome::Outcome;
use crate::session::SessionState;
use crate::session_updater::{apply_extractions, default_watch_list, WatchedField};

/// One operator session: a catalog, a transport and the values threaded
/// between requests.
///
/// All fires run on the current thread. Several may be in flight at once and
/// nothing orders their resolutions, so when two responses carry the same
/// watched field the one that resolves last wins. The session is never
/// borrowed across an await point.
pub struct Console<T> {
    catalog: Catalog,
    dispatcher: Dispatcher<T>,
    watch_list: Vec<WatchedField>,
    session: RefCell<SessionState>,
}

impl<T: Transport> Console<T> {
    pub fn new(catalog: Catalog, transport: T, session: SessionState) -> Self {
        Console {
            catalog,
            dispatcher: Dispatcher::new(transport),
            watch_list: default_watch_list(),
            session: RefCell::new(session),
        }
    }

    pub fn with_watch_list(mut self, watch_list: Vec<WatchedField>) -> Self {
        self.watch_list = watch_list;
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn transport(&self) -> &T {
        self.dispatcher.transport()
    }

    pub fn session(&self) -> Ref<'_, SessionState> {
        self.session.borrow()
    }

    /// Overwrites a session value by hand.
    pub fn set_param(&self, name: &str, value: &str) {
        debug!(param = name, value, "session value set by operator");
        self.session.borrow_mut().set(name, value);
    }

    /// The request `endpoint_id` would send right now.
    pub fn compose(&self, endpoint_id: &str) -> ConsoleResult<ConcreteRequest> {
        let descriptor = self.catalog.get(endpoint_id)?;
        Ok(compose(descriptor, &self.session.borrow()))
    }

    /// Composes, sends and feeds watched response fields back into the session.
    ///
    /// Only an unknown endpoint id is an error; everything that happens on the
    /// wire is reported through the returned [`Outcome`].
    pub async fn fire(&self, endpoint_id: &str) -> ConsoleResult<Outcome> {
        let request = self.compose(endpoint_id)?;
        info!(endpoint = endpoint_id, method = %request.method, url = %request.url, "firing");

        let outcome = self.dispatcher.send(&request).await;

        let applied = apply_extractions(&outcome, &mut self.session.borrow_mut(), &self.watch_list);
        if !applied.is_empty() {
            info!(endpoint = endpoint_id, updated = applied.len(), "session updated");
        }
        Ok(outcome)
    }

    /// Fires every id at once; results come back in the order given.
    pub async fn fire_concurrently(&self, endpoint_ids: &[&str]) -> Vec<ConsoleResult<Outcome>> {
        join_all(endpoint_ids.iter().map(|id| self.fire(id))).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ConsoleError;
    use crate::session::{CONN_UUID, MSG_ID};
    use async_trait::async_trait;
    use serde_json::json;

    // Replies to each URL with a canned outcome, recording what was sent.
    struct Canned {
        replies: Vec<(&'static str, Outcome)>,
        sent: RefCell<Vec<ConcreteRequest>>,
    }

    #[async_trait(?Send)]
    impl Transport for Canned {
        async fn issue(&self, request: &ConcreteRequest) -> Outcome {
            self.sent.borrow_mut().push(request.clone());
            self.replies
                .iter()
                .find(|(url, _)| *url == request.url)
                .map(|(_, outcome)| outcome.clone())
                .unwrap_or_else(|| Outcome::from_response(404, json!("not found")))
        }
    }

    fn console(replies: Vec<(&'static str, Outcome)>) -> Console<Canned> {
        Console::new(
            Catalog::builtin(),
            Canned { replies, sent: RefCell::new(Vec::new()) },
            SessionState::with_defaults(),
        )
    }

    #[tokio::test]
    async fn fire_threads_extracted_ids_into_next_request() {
        let console = console(vec![
            ("/connection", Outcome::from_response(200, json!({"uuid": "c-1", "senders": {"type": "echo"}}))),
            ("/connection/c-1/send", Outcome::from_response(200, json!({"id": "m-9", "conn_uuid": "c-1"}))),
        ]);

        console.fire("add-conn").await.unwrap();
        assert_eq!(console.session().get(CONN_UUID), Some("c-1"));

        console.fire("add-msg").await.unwrap();
        assert_eq!(console.session().get(MSG_ID), Some("m-9"));

        assert_eq!(console.compose("read-msg").unwrap().url, "/connection/c-1/status/m-9");
        let sent = console.transport().sent.borrow();
        assert_eq!(sent[1].url, "/connection/c-1/send");
        assert!(sent[1].body.is_some());
    }

    #[tokio::test]
    async fn failure_keeps_session() {
        let console = console(vec![(
            "/connection",
            Outcome::from_response(500, json!({"uuid": "should-not-stick"})),
        )]);
        let outcome = console.fire("add-conn").await.unwrap();
        assert!(!outcome.is_success());
        assert_eq!(*console.session(), SessionState::with_defaults());
    }

    #[tokio::test]
    async fn unknown_endpoint_is_an_error_and_sends_nothing() {
        let console = console(Vec::new());
        let err = console.fire("nope").await.unwrap_err();
        assert!(matches!(err, ConsoleError::UnknownEndpoint(_)));
        assert!(console.transport().sent.borrow().is_empty());
    }

    #[tokio::test]
    async fn operator_edits_feed_composition() {
        let console = console(Vec::new());
        console.set_param(CONN_UUID, "typed-in");
        assert_eq!(console.compose("read-conn").unwrap().url, "/connection/typed-in");
    }

    #[tokio::test]
    async fn custom_watch_list_replaces_default() {
        let console = console(vec![("/connection", Outcome::from_response(200, json!({"uuid": "c-1", "token": "t"})))])
            .with_watch_list(vec![WatchedField::new("auth", "token")]);
        console.fire("list-conns").await.unwrap();
        assert_eq!(console.session().get("auth"), Some("t"));
        assert_eq!(console.session().get(CONN_UUID), Some("connection uuid"));
    }
}
