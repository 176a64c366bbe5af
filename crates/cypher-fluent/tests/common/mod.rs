#![allow(dead_code)]

use cypher_fluent::{CypherResult, HttpResponse, Transport};
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Mutex;

/// One request seen by [`RecordingTransport`].
#[derive(Debug, Clone, PartialEq)]
pub struct Recorded {
    pub method: &'static str,
    pub path: String,
    pub body: Option<Value>,
}

/// In-memory transport that records requests and replays canned responses in order.
#[derive(Debug, Default)]
pub struct RecordingTransport {
    requests: Mutex<Vec<Recorded>>,
    responses: Mutex<VecDeque<CypherResult<HttpResponse>>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, status: u16, body: &str) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push_back(Ok(HttpResponse::new(status, body)));
        self
    }

    pub fn fail(self, message: &str) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push_back(Err(cypher_fluent::CypherError::transport(message)));
        self
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    fn next(&self, recorded: Recorded) -> CypherResult<HttpResponse> {
        self.requests.lock().unwrap().push(recorded);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(cypher_fluent::CypherError::transport("no canned response")))
    }
}

impl Transport for RecordingTransport {
    fn post(
        &self,
        path: &str,
        body: &Value,
    ) -> impl std::future::Future<Output = CypherResult<HttpResponse>> + Send {
        std::future::ready(self.next(Recorded {
            method: "POST",
            path: path.to_string(),
            body: Some(body.clone()),
        }))
    }

    fn get(
        &self,
        path: &str,
    ) -> impl std::future::Future<Output = CypherResult<HttpResponse>> + Send {
        std::future::ready(self.next(Recorded {
            method: "GET",
            path: path.to_string(),
            body: None,
        }))
    }
}
