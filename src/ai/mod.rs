//! Upstream generative-model integration
//!
//! Wraps the single `generateContent` call behind [`ModelService`] so the HTTP
//! handlers can run against Gemini or a recording stand-in.

pub mod gemini;
pub mod mime;
pub mod mock;

pub use gemini::{GeminiClient, GenerateContentRequest, InlineData};
pub use mock::MockModelClient;

use crate::Result;
use async_trait::async_trait;
use serde_json::Value;

#[async_trait]
pub trait ModelService: Send + Sync {
    /// Submit one turn payload and return the raw, unparsed response.
    async fn generate_content(&self, request: &GenerateContentRequest) -> Result<Value>;
}
