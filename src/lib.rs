//! HTTP relay in front of Google's Gemini `generateContent` API
//!
//! Accepts text prompts and uploaded images, documents, or audio, forwards each
//! as a single user turn to the model, and returns the model's text.

pub mod ai;
pub mod app;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod models;
pub mod prompts;

pub use error::{Error, Result};
