use super::{GenerateContentRequest, ModelService};
use crate::{Error, Result};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

/// Deterministic [`ModelService`] that records every payload it receives.
#[derive(Clone)]
pub struct MockModelClient {
    responses: Arc<Mutex<Vec<Value>>>,
    failure: Option<String>,
    requests: Arc<Mutex<Vec<GenerateContentRequest>>>,
}

impl MockModelClient {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(Vec::new())),
            failure: None,
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Queue a raw response; responses are replayed in order and cycle.
    pub fn with_response(self, response: Value) -> Self {
        self.responses.lock().unwrap().push(response);
        self
    }

    /// Queue a response shaped like Gemini's, carrying `text`.
    pub fn with_text_response(self, text: &str) -> Self {
        self.with_response(json!({
            "candidates": [{ "content": { "parts": [{ "text": text }] } }]
        }))
    }

    /// Make every call fail with `Error::AiProvider(message)`.
    pub fn with_error(mut self, message: &str) -> Self {
        self.failure = Some(message.to_string());
        self
    }

    pub fn get_call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Payloads received so far, oldest first.
    pub fn recorded_requests(&self) -> Vec<GenerateContentRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> Option<GenerateContentRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

impl Default for MockModelClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ModelService for MockModelClient {
    async fn generate_content(&self, request: &GenerateContentRequest) -> Result<Value> {
        let count = {
            let mut requests = self.requests.lock().unwrap();
            requests.push(request.clone());
            requests.len()
        };

        if let Some(message) = &self.failure {
            return Err(Error::AiProvider(message.clone()));
        }

        let responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            // Default mock response
            Ok(json!({
                "candidates": [{ "content": { "parts": [{ "text": "mock response" }] } }]
            }))
        } else {
            let index = (count - 1) % responses.len();
            Ok(responses[index].clone())
        }
    }
}
