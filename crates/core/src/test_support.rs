//! Test doubles shared by the unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use crate::transport::{ResourceRequest, Transport, TransportError};

/// Transport that replays queued responses and records every request.
#[derive(Debug, Default)]
pub(crate) struct MockTransport {
    responses: Mutex<VecDeque<Result<Value, TransportError>>>,
    calls: Mutex<Vec<ResourceRequest>>,
}

impl MockTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn respond(&self, body: Value) {
        self.responses.lock().unwrap().push_back(Ok(body));
    }

    pub(crate) fn fail(&self, status: u16, message: &str) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Err(TransportError::Remote { status, message: message.to_string() }));
    }

    pub(crate) fn calls(&self) -> Vec<ResourceRequest> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn request(&self, request: ResourceRequest) -> Result<Value, TransportError> {
        self.calls.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Network("no response queued".into())))
    }
}
