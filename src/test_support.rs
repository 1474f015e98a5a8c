//! In-memory transport for unit tests.

use crate::transport::{HttpReply, HttpRequest, HttpTransport, TransportError};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

type Scripted = Result<HttpReply, TransportError>;

/// Records every request and answers from per-path scripts.
///
/// A route is matched when the request URL's path (query stripped) ends with
/// the registered suffix. Queued replies are consumed in order; the last one
/// is repeated once the queue is down to a single entry. Unrouted requests
/// fail at the transport level.
#[derive(Default)]
pub(crate) struct RecordingTransport {
    routes: Mutex<HashMap<String, VecDeque<Scripted>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl RecordingTransport {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn reply(&self, path: &str, reply: HttpReply) {
        self.push(path, Ok(reply));
    }

    pub(crate) fn reply_json(&self, path: &str, status: u16, body: Value) {
        self.reply(path, HttpReply::new(status, body.to_string()));
    }

    pub(crate) fn fail(&self, path: &str) {
        self.push(
            path,
            Err(TransportError::Request {
                url: path.to_string(),
                message: "connection refused".to_string(),
            }),
        );
    }

    fn push(&self, path: &str, scripted: Scripted) {
        self.routes
            .lock()
            .expect("routes lock")
            .entry(path.to_string())
            .or_default()
            .push_back(scripted);
    }

    pub(crate) fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().expect("requests lock").clone()
    }

    pub(crate) fn requests_to(&self, path: &str) -> Vec<HttpRequest> {
        self.requests()
            .into_iter()
            .filter(|r| path_of(&r.url).ends_with(path))
            .collect()
    }

    /// JSON bodies sent to `path`, in order
    pub(crate) fn bodies_to(&self, path: &str) -> Vec<Value> {
        self.requests_to(path)
            .into_iter()
            .filter_map(|r| r.body)
            .collect()
    }
}

fn path_of(url: &str) -> &str {
    url.split('?').next().unwrap_or(url)
}

#[async_trait]
impl HttpTransport for RecordingTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpReply, TransportError> {
        let url = request.url.clone();
        self.requests.lock().expect("requests lock").push(request);

        let mut routes = self.routes.lock().expect("routes lock");
        let route = routes
            .iter_mut()
            .filter(|(suffix, _)| path_of(&url).ends_with(suffix.as_str()))
            .max_by_key(|(suffix, _)| suffix.len())
            .map(|(_, queue)| queue);

        match route {
            Some(queue) if queue.len() > 1 => queue.pop_front().expect("non-empty queue"),
            Some(queue) if !queue.is_empty() => queue[0].clone(),
            _ => Err(TransportError::Request {
                url,
                message: "no scripted reply".to_string(),
            }),
        }
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}
