//! HTTP handlers for the four generation endpoints.
//!
//! Every handler follows the same line: parse, check the required input,
//! build one user turn, call the model once, extract text, respond.

use crate::ai::{mime, GenerateContentRequest, InlineData};
use crate::app::AppState;
use crate::error::ApiError;
use crate::extract::extract_text;
use crate::models::{GenerateResponse, GenerateTextRequest};
use crate::{prompts, Result};
use axum::body::Bytes;
use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Multipart, State};
use axum::Json;
use std::fmt;
use tracing::{debug, error, warn};

type HandlerResult = std::result::Result<Json<GenerateResponse>, ApiError>;

/// The media-conditioned endpoints, which differ only in field name and defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Document,
    Audio,
}

impl MediaKind {
    /// Multipart field carrying the upload.
    pub fn field_name(self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Document => "document",
            MediaKind::Audio => "audio",
        }
    }

    pub fn missing_message(self) -> &'static str {
        match self {
            MediaKind::Image => "Image file is required",
            MediaKind::Document => "Document file is required",
            MediaKind::Audio => "Audio file is required",
        }
    }

    /// Prompt used when the caller sends none.
    pub fn default_prompt(self) -> &'static str {
        match self {
            MediaKind::Image => "",
            MediaKind::Document => prompts::DOCUMENT_DEFAULT,
            MediaKind::Audio => prompts::AUDIO_DEFAULT,
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field_name())
    }
}

/// A single uploaded file held in memory for the duration of the request.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Bytes,
}

/// Decoded multipart body: the optional `prompt` text and the upload, if any.
#[derive(Debug, Default)]
pub struct MediaForm {
    pub prompt: Option<String>,
    pub file: Option<UploadedFile>,
}

impl MediaForm {
    /// Read every field; parts other than `prompt` and `file_field` are skipped.
    ///
    /// Only parts carrying a filename count as the upload, and the first one wins.
    pub async fn from_multipart(multipart: &mut Multipart, file_field: &str) -> Result<Self> {
        let mut form = MediaForm::default();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();

            if name == file_field {
                let Some(file_name) = field.file_name().map(str::to_string) else {
                    warn!("Field '{}' sent without a filename, ignoring", name);
                    continue;
                };
                if form.file.is_some() {
                    warn!("Extra '{}' upload '{}' ignored", name, file_name);
                    continue;
                }

                let declared = field.content_type().map(str::to_string);
                let bytes = field.bytes().await?;
                let mime_type = declared.unwrap_or_else(|| mime::detect_mime(&bytes).to_string());

                form.file = Some(UploadedFile {
                    file_name,
                    mime_type,
                    bytes,
                });
            } else if name == "prompt" {
                form.prompt = Some(field.text().await?);
            }
        }

        Ok(form)
    }
}

/// POST /generate-text
pub async fn generate_text(
    State(state): State<AppState>,
    payload: std::result::Result<Json<GenerateTextRequest>, JsonRejection>,
) -> HandlerResult {
    let Json(body) = payload.map_err(|rejection| {
        warn!("Rejected /generate-text body: {}", rejection.body_text());
        ApiError::from(rejection)
    })?;

    let prompt = body
        .prompt
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ApiError::bad_request("Prompt is required"))?;

    let request = GenerateContentRequest::user_turn(prompt, None);
    let response = state.model.generate_content(&request).await.map_err(|e| {
        error!("Error generating text: {}", e);
        ApiError::internal_with_trace(&e)
    })?;

    Ok(Json(GenerateResponse {
        result: extract_text(&response),
    }))
}

/// POST /generate-from-image
pub async fn generate_from_image(
    State(state): State<AppState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> HandlerResult {
    generate_from_media(&state, multipart, MediaKind::Image).await
}

/// POST /generate-from-document
pub async fn generate_from_document(
    State(state): State<AppState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> HandlerResult {
    generate_from_media(&state, multipart, MediaKind::Document).await
}

/// POST /generate-from-audio
pub async fn generate_from_audio(
    State(state): State<AppState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> HandlerResult {
    generate_from_media(&state, multipart, MediaKind::Audio).await
}

async fn generate_from_media(
    state: &AppState,
    multipart: std::result::Result<Multipart, MultipartRejection>,
    kind: MediaKind,
) -> HandlerResult {
    // A body that is not multipart at all carries no file.
    let mut multipart = multipart.map_err(|rejection| {
        warn!("Rejected /generate-from-{} body: {}", kind, rejection.body_text());
        ApiError::bad_request(kind.missing_message())
    })?;

    let form = MediaForm::from_multipart(&mut multipart, kind.field_name())
        .await
        .map_err(|e| {
            warn!("Failed to decode /generate-from-{} upload: {}", kind, e);
            ApiError::from(e)
        })?;

    let file = form
        .file
        .ok_or_else(|| ApiError::bad_request(kind.missing_message()))?;

    debug!(
        file_name = %file.file_name,
        mime_type = %file.mime_type,
        size = file.bytes.len(),
        "Received {} upload",
        kind
    );

    let prompt = prompts::or_default(form.prompt, kind.default_prompt());
    let media = InlineData::from_bytes(file.mime_type, &file.bytes);
    let request = GenerateContentRequest::user_turn(prompt, Some(media));

    let response = state.model.generate_content(&request).await.map_err(|e| {
        error!("Error generating from {}: {}", kind, e);
        ApiError::internal(&e)
    })?;

    Ok(Json(GenerateResponse {
        result: extract_text(&response),
    }))
}
