//! Scripted transport for tests.
//!
//! Routes are keyed by method and path suffix, so tests can write `/search`
//! instead of `/api/v1/search`. A held reply does not resolve until its
//! gate is released, which lets a test force out-of-order completion.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::oneshot;

use super::{Body, Method, Transport, TransportError, WireRequest, WireResponse};

enum Outcome {
    Reply { status: u16, body: String },
    Fail(String),
}

struct MockReply {
    outcome: Outcome,
    gate: Option<oneshot::Receiver<()>>,
}

impl MockReply {
    fn sticky_copy(&self) -> Option<MockReply> {
        if self.gate.is_some() {
            return None;
        }
        let outcome = match &self.outcome {
            Outcome::Reply { status, body } => Outcome::Reply {
                status: *status,
                body: body.clone(),
            },
            Outcome::Fail(message) => Outcome::Fail(message.clone()),
        };
        Some(MockReply { outcome, gate: None })
    }
}

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub bearer: Option<String>,
    pub body: Body,
}

#[derive(Default)]
pub struct MockTransport {
    routes: Mutex<HashMap<(Method, String), VecDeque<MockReply>>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, method: Method, path: &str, reply: MockReply) {
        self.routes
            .lock()
            .unwrap()
            .entry((method, path.to_string()))
            .or_default()
            .push_back(reply);
    }

    /// Queue a JSON reply. The last un-gated reply on a route repeats.
    pub fn reply(&self, method: Method, path: &str, status: u16, body: serde_json::Value) {
        self.reply_raw(method, path, status, &body.to_string());
    }

    pub fn reply_raw(&self, method: Method, path: &str, status: u16, body: &str) {
        self.push(
            method,
            path,
            MockReply {
                outcome: Outcome::Reply {
                    status,
                    body: body.to_string(),
                },
                gate: None,
            },
        );
    }

    /// Queue a reply that resolves only once the returned sender fires (or is dropped).
    pub fn reply_held(
        &self,
        method: Method,
        path: &str,
        status: u16,
        body: serde_json::Value,
    ) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.push(
            method,
            path,
            MockReply {
                outcome: Outcome::Reply {
                    status,
                    body: body.to_string(),
                },
                gate: Some(rx),
            },
        );
        tx
    }

    pub fn fail(&self, method: Method, path: &str, message: &str) {
        self.push(
            method,
            path,
            MockReply {
                outcome: Outcome::Fail(message.to_string()),
                gate: None,
            },
        );
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn count(&self, method: Method, path: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.method == method && r.path.ends_with(path))
            .count()
    }

    fn take_reply(&self, method: Method, path: &str) -> Option<MockReply> {
        let mut routes = self.routes.lock().unwrap();
        // Longest matching suffix wins so `/genres` does not shadow `/genres/rock/tracks`.
        let key = routes
            .keys()
            .filter(|(m, p)| *m == method && path.ends_with(p.as_str()))
            .max_by_key(|(_, p)| p.len())
            .cloned()?;
        let queue = routes.get_mut(&key)?;
        let reply = queue.pop_front()?;
        if queue.is_empty() {
            if let Some(copy) = reply.sticky_copy() {
                queue.push_back(copy);
            }
        }
        Some(reply)
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: WireRequest) -> Result<WireResponse, TransportError> {
        let path = request.url.path().to_string();
        self.requests.lock().unwrap().push(RecordedRequest {
            method: request.method,
            path: path.clone(),
            query: request.url.query().map(str::to_string),
            bearer: request.bearer.as_ref().map(|t| t.expose().to_string()),
            body: request.body.clone(),
        });

        let Some(reply) = self.take_reply(request.method, &path) else {
            return Ok(WireResponse {
                status: 404,
                body: r#"{"detail":"no mock route"}"#.to_string(),
            });
        };

        if let Some(gate) = reply.gate {
            let _ = gate.await;
        }

        match reply.outcome {
            Outcome::Reply { status, body } => Ok(WireResponse { status, body }),
            Outcome::Fail(message) => Err(TransportError { message }),
        }
    }
}
