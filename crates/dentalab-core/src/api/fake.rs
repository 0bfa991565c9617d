//! In-process scripted backend.
//!
//! Routes are keyed by method and path (query strings are recorded but not
//! matched). Several responses registered for one route are returned in
//! order; the last one then repeats. Unknown routes answer 404.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

use serde_json::{json, Value};

use super::{ApiRequest, ApiResponse, Method, Transport, TransportError};

#[derive(Debug, Clone)]
enum Reply {
    Response(ApiResponse),
    Unreachable(String),
}

/// A request as seen by the fake backend.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    pub bearer: Option<String>,
}

#[derive(Default)]
struct State {
    routes: HashMap<(Method, String), VecDeque<Reply>>,
    log: Vec<RecordedRequest>,
}

/// Scripted [`Transport`]. Clones share state, so a test can keep a handle
/// after moving one into the client.
#[derive(Clone, Default)]
pub struct FakeBackend {
    state: Arc<Mutex<State>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        // A panicking test thread must not hide the recorded requests.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn push(&self, method: Method, path: &str, reply: Reply) {
        self.state()
            .routes
            .entry((method, path.to_string()))
            .or_default()
            .push_back(reply);
    }

    /// Register a response for `method path`.
    pub fn on(&self, method: Method, path: &str, status: u16, body: Value) -> &Self {
        self.push(method, path, Reply::Response(ApiResponse::new(status, body)));
        self
    }

    /// Register a network failure for `method path`.
    pub fn on_unreachable(&self, method: Method, path: &str, reason: &str) -> &Self {
        self.push(method, path, Reply::Unreachable(reason.to_string()));
        self
    }

    /// Drop every registered response for a route.
    pub fn reset_route(&self, method: Method, path: &str) {
        self.state().routes.remove(&(method, path.to_string()));
    }

    /// Every request received so far.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state().log.clone()
    }

    /// Number of requests received for `method path`.
    pub fn count(&self, method: Method, path: &str) -> usize {
        self.state()
            .log
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .count()
    }

    pub fn last_request(&self) -> Option<RecordedRequest> {
        self.state().log.last().cloned()
    }
}

impl Transport for FakeBackend {
    fn send(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError> {
        let mut state = self.state();
        state.log.push(RecordedRequest {
            method: request.method,
            path: request.path.clone(),
            query: request.query.clone(),
            body: request.body.clone(),
            bearer: request.bearer.clone(),
        });

        let key = (request.method, request.path.clone());
        let reply = match state.routes.get_mut(&key) {
            Some(queue) if queue.len() > 1 => queue.pop_front(),
            Some(queue) => queue.front().cloned(),
            None => None,
        };

        match reply {
            Some(Reply::Response(response)) => Ok(response),
            Some(Reply::Unreachable(reason)) => Err(TransportError::Unreachable(reason)),
            None => Ok(ApiResponse::new(
                404,
                json!({ "message": format!("No route for {} {}", request.method, request.path) }),
            )),
        }
    }
}
