use super::types::GenerateContentRequest;
use crate::ai::ModelService;
use crate::models::{Config, DEFAULT_GEMINI_BASE_URL};
use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

/// Lightweight Gemini REST client backing every relay endpoint.
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    timeout: Option<Duration>,
}

impl GeminiClient {
    /// Construct a Gemini client.
    ///
    /// `model` should be the bare model ID (for example `gemini-2.5-flash`);
    /// a leading `models/` segment is stripped.
    pub fn new(api_key: String, model: String) -> Self {
        let model = model.strip_prefix("models/").unwrap_or(&model).to_string();

        Self {
            client: Client::new(),
            api_key,
            model,
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            timeout: None,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let client = Self::new(config.gemini_api_key.clone(), config.gemini_model.clone())
            .with_base_url(config.gemini_base_url.clone());
        match config.gemini_timeout {
            Some(timeout) => client.with_timeout(timeout),
            None => client,
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Per-request timeout. Without one, requests wait as long as reqwest does.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Returns the configured model ID without the `models/` prefix.
    pub fn model(&self) -> &str {
        &self.model
    }

    async fn post_to_url<Req: Serialize, Resp: DeserializeOwned>(
        &self,
        url: String,
        request: &Req,
    ) -> Result<Resp> {
        let mut builder = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(request);
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder.send().await.map_err(|e| {
            tracing::error!("Failed to send request to Gemini: {}", e);
            e
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            tracing::error!("Gemini API error (status {}): {}", status, error_text);
            return Err(Error::AiProvider(format!(
                "Gemini API error (status {}): {}",
                status, error_text
            )));
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::error!("Failed to parse Gemini response: {}\nBody: {}", e, body);
            Error::AiProvider(format!("Failed to parse Gemini response: {}", e))
        })
    }
}

#[async_trait]
impl ModelService for GeminiClient {
    async fn generate_content(&self, request: &GenerateContentRequest) -> Result<Value> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );
        tracing::debug!(model = %self.model, "Sending generateContent request to Gemini");
        self.post_to_url(url, request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::gemini::types::InlineData;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, path_regex};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const DEFAULT_MODEL: &str = "gemini-2.5-flash";
    const GENERATE_CONTENT_PATH_REGEX: &str = r"^/v1beta/models/[^/]+:generateContent$";

    fn make_client(server: &MockServer, api_key: &str, model: &str) -> GeminiClient {
        GeminiClient::new(api_key.to_string(), model.to_string()).with_base_url(server.uri())
    }

    #[tokio::test]
    async fn test_generate_content_returns_raw_response() {
        let server = MockServer::start().await;
        let body = json!({
            "candidates": [{
                "content": { "parts": [{ "text": "Hello from Gemini" }] }
            }],
            "usageMetadata": { "totalTokenCount": 7 }
        });

        Mock::given(method("POST"))
            .and(path_regex(GENERATE_CONTENT_PATH_REGEX))
            .and(header("x-goog-api-key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body.clone()))
            .expect(1)
            .mount(&server)
            .await;

        let client = make_client(&server, "test-key", DEFAULT_MODEL);
        let request = GenerateContentRequest::user_turn("Hi", None);

        let response = client.generate_content(&request).await.unwrap();
        assert_eq!(response, body);
    }

    #[tokio::test]
    async fn test_request_body_matches_turn_payload() {
        let server = MockServer::start().await;
        let request = GenerateContentRequest::user_turn(
            "What is this?",
            Some(InlineData::from_bytes("image/jpeg", &[0xFF, 0xD8, 0xFF])),
        );

        Mock::given(method("POST"))
            .and(path_regex(GENERATE_CONTENT_PATH_REGEX))
            .and(body_json(json!({
                "contents": [{
                    "role": "user",
                    "parts": [
                        { "text": "What is this?" },
                        { "inlineData": { "mimeType": "image/jpeg", "data": "/9j/" } }
                    ]
                }]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let client = make_client(&server, "key", DEFAULT_MODEL);
        client.generate_content(&request).await.unwrap();
    }

    #[tokio::test]
    async fn test_api_error_returns_ai_provider_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path_regex(GENERATE_CONTENT_PATH_REGEX))
            .respond_with(ResponseTemplate::new(429).set_body_string("quota exceeded"))
            .mount(&server)
            .await;

        let client = make_client(&server, "key", DEFAULT_MODEL);
        let err = client
            .generate_content(&GenerateContentRequest::user_turn("Hi", None))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::AiProvider(_)));
        assert!(err.to_string().contains("429"));
        assert!(err.to_string().contains("quota exceeded"));
    }

    #[tokio::test]
    async fn test_non_json_body_returns_ai_provider_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path_regex(GENERATE_CONTENT_PATH_REGEX))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let client = make_client(&server, "key", DEFAULT_MODEL);
        let err = client
            .generate_content(&GenerateContentRequest::user_turn("Hi", None))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::AiProvider(_)));
    }

    #[tokio::test]
    async fn test_strips_models_prefix_from_model_id() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-2.5-flash:generateContent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let client = make_client(&server, "key", "models/gemini-2.5-flash");
        assert_eq!(client.model(), "gemini-2.5-flash");

        client
            .generate_content(&GenerateContentRequest::user_turn("Hi", None))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_timeout_surfaces_as_http_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path_regex(GENERATE_CONTENT_PATH_REGEX))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({}))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let client =
            make_client(&server, "key", DEFAULT_MODEL).with_timeout(Duration::from_millis(50));
        let err = client
            .generate_content(&GenerateContentRequest::user_turn("Hi", None))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Http(_)));
    }

    #[test]
    fn test_from_config_applies_overrides() {
        let config = Config {
            gemini_api_key: "k".to_string(),
            gemini_model: "models/gemini-2.0-flash".to_string(),
            gemini_base_url: "http://localhost:1234/".to_string(),
            gemini_timeout: Some(Duration::from_secs(5)),
            port: 3000,
        };

        let client = GeminiClient::from_config(&config);
        assert_eq!(client.model(), "gemini-2.0-flash");
        assert_eq!(client.base_url, "http://localhost:1234");
        assert_eq!(client.timeout, Some(Duration::from_secs(5)));
    }
}
