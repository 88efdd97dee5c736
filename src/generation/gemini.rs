//! Gemini REST implementation of the generation client
//!
//! Text is requested from `:streamGenerateContent?alt=sse` and decoded
//! incrementally; illustrations come from a single `:generateContent` call
//! whose first inline-data part is the image.

use crate::config::GeminiConfig;
use crate::error::{EducadorError, Result};
use crate::generation::instructions::{image_prompt, SYSTEM_INSTRUCTION};
use crate::generation::sse::SseDecoder;
use crate::generation::{GeneratedImage, GenerationClient, PartialSink};

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Gemini API client
///
/// # Examples
///
/// ```
/// use educador_ia::config::GeminiConfig;
/// use educador_ia::generation::GeminiClient;
///
/// let config = GeminiConfig {
///     api_key: Some("test-key".to_string()),
///     ..Default::default()
/// };
/// let client = GeminiClient::new(config).unwrap();
/// assert_eq!(client.text_model(), "gemini-2.5-flash");
/// ```
pub struct GeminiClient {
    client: Client,
    config: GeminiConfig,
    api_key: String,
}

/// Request body shared by both endpoints
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<RequestPart>,
}

impl Content {
    fn user(text: impl Into<String>) -> Self {
        Self {
            role: Some("user".to_string()),
            parts: vec![RequestPart { text: text.into() }],
        }
    }

    fn instruction(text: impl Into<String>) -> Self {
        Self {
            role: None,
            parts: vec![RequestPart { text: text.into() }],
        }
    }
}

#[derive(Debug, Serialize)]
struct RequestPart {
    text: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
}

/// Response body; also the payload of each streamed SSE event
#[derive(Debug, Default, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    inline_data: Option<InlineData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Deserialize)]
struct ErrorWrapper {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    code: Option<i32>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    status: Option<String>,
}

impl ApiError {
    fn describe(&self) -> String {
        format!(
            "{} ({})",
            self.message.as_deref().unwrap_or("unknown error"),
            self.status
                .clone()
                .or_else(|| self.code.map(|c| c.to_string()))
                .unwrap_or_else(|| "no status".to_string())
        )
    }
}

impl GenerateContentResponse {
    fn first_parts(&self) -> &[ResponsePart] {
        self.candidates
            .first()
            .and_then(|candidate| candidate.content.as_ref())
            .map(|content| content.parts.as_slice())
            .unwrap_or(&[])
    }

    /// Concatenated text of the first candidate
    fn text(&self) -> String {
        self.first_parts()
            .iter()
            .filter_map(|part| part.text.as_deref())
            .collect()
    }

    /// First inline image of the first candidate
    fn inline_image(&self) -> Option<GeneratedImage> {
        self.first_parts().iter().find_map(|part| {
            part.inline_data
                .as_ref()
                .map(|inline| GeneratedImage::new(&inline.mime_type, &inline.data))
        })
    }
}

impl GeminiClient {
    /// Create a new Gemini client
    ///
    /// # Errors
    ///
    /// Returns `EducadorError::MissingCredentials` if no API key is
    /// configured, or a provider error if the HTTP client cannot be built
    pub fn new(config: GeminiConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| EducadorError::MissingCredentials("gemini".to_string()))?;

        // No whole-request timeout: it would also cut off a healthy stream
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("educador-ia/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| EducadorError::Config(format!("Failed to create HTTP client: {}", e)))?;

        tracing::info!(
            "Initialized Gemini client: base={}, text_model={}, image_model={}",
            config.api_base,
            config.text_model,
            config.image_model
        );

        Ok(Self {
            client,
            config,
            api_key,
        })
    }

    /// Model used for streamed text
    pub fn text_model(&self) -> &str {
        &self.config.text_model
    }

    /// Model used for illustrations
    pub fn image_model(&self) -> &str {
        &self.config.image_model
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(self.config.timeout_seconds)
    }

    fn endpoint(&self, model: &str, method: &str) -> String {
        format!(
            "{}/models/{}:{}",
            self.config.api_base.trim_end_matches('/'),
            model,
            method
        )
    }

    fn text_request(&self, prompt: &str) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content::user(prompt)],
            system_instruction: Some(Content::instruction(SYSTEM_INSTRUCTION)),
            generation_config: Some(GenerationConfig {
                temperature: self.config.temperature,
            }),
        }
    }

    fn image_request(prompt: &str) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content::user(image_prompt(prompt))],
            system_instruction: None,
            generation_config: None,
        }
    }

    /// Fold one SSE payload into the accumulated text
    fn absorb_event(data: &str, full_text: &mut String, on_partial: PartialSink<'_>) -> Result<()> {
        let chunk: GenerateContentResponse = serde_json::from_str(data).map_err(|e| {
            tracing::error!("Unparseable stream event: {}", e);
            EducadorError::Generation(format!("Invalid stream event: {}", e))
        })?;

        if let Some(error) = &chunk.error {
            tracing::error!("Gemini stream reported error: {}", error.describe());
            return Err(EducadorError::Generation(format!(
                "Stream aborted by endpoint: {}",
                error.describe()
            ))
            .into());
        }

        let text = chunk.text();
        if !text.is_empty() {
            full_text.push_str(&text);
            on_partial(full_text.as_str());
        }

        Ok(())
    }
}

/// Turn a non-success response into a readable message
async fn error_message(response: reqwest::Response) -> String {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    match serde_json::from_str::<ErrorWrapper>(&body) {
        Ok(wrapper) => format!("{}: {}", status, wrapper.error.describe()),
        Err(_) => format!("{}: {}", status, body),
    }
}

#[async_trait]
impl GenerationClient for GeminiClient {
    async fn stream_text(&self, prompt: &str, on_partial: PartialSink<'_>) -> Result<String> {
        let url = self.endpoint(&self.config.text_model, "streamGenerateContent");
        let request = self.text_request(prompt);

        tracing::debug!(
            "Sending streamed text request: model={}, prompt_chars={}",
            self.config.text_model,
            prompt.chars().count()
        );

        let send = self
            .client
            .post(&url)
            .query(&[("alt", "sse")])
            .header(API_KEY_HEADER, &self.api_key)
            .json(&request)
            .send();

        // Only the wait for response headers is bounded; the body streams
        // for as long as the endpoint keeps sending.
        let response = tokio::time::timeout(self.timeout(), send)
            .await
            .map_err(|_| {
                tracing::error!(
                    "Gemini text request timed out after {}s",
                    self.config.timeout_seconds
                );
                EducadorError::Generation("Request timed out".to_string())
            })?
            .map_err(|e| {
                tracing::error!("Gemini text request failed: {}", e);
                EducadorError::Generation(format!("Request failed: {}", e))
            })?;

        if !response.status().is_success() {
            let message = error_message(response).await;
            tracing::error!("Gemini returned error {}", message);
            return Err(EducadorError::Generation(format!("Endpoint error {}", message)).into());
        }

        let mut byte_stream = response.bytes_stream();
        let mut decoder = SseDecoder::new();
        let mut full_text = String::new();
        let mut events = 0usize;

        while let Some(chunk) = byte_stream.next().await {
            let chunk = chunk.map_err(|e| {
                tracing::error!("Gemini stream aborted: {}", e);
                EducadorError::Generation(format!("Stream aborted: {}", e))
            })?;

            for data in decoder.push(&chunk) {
                events += 1;
                Self::absorb_event(&data, &mut full_text, on_partial)?;
            }
        }

        if let Some(data) = decoder.finish() {
            events += 1;
            Self::absorb_event(&data, &mut full_text, on_partial)?;
        }

        tracing::debug!(
            "Stream complete: events={}, chars={}",
            events,
            full_text.chars().count()
        );

        Ok(full_text)
    }

    async fn generate_image(&self, prompt: &str) -> Result<GeneratedImage> {
        let url = self.endpoint(&self.config.image_model, "generateContent");
        let request = Self::image_request(prompt);

        tracing::debug!("Sending image request: model={}", self.config.image_model);

        let response = self
            .client
            .post(&url)
            .timeout(self.timeout())
            .header(API_KEY_HEADER, &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Gemini image request failed: {}", e);
                EducadorError::ImageGeneration(format!("Request failed: {}", e))
            })?;

        if !response.status().is_success() {
            let message = error_message(response).await;
            tracing::error!("Gemini returned error {}", message);
            return Err(
                EducadorError::ImageGeneration(format!("Endpoint error {}", message)).into(),
            );
        }

        let parsed: GenerateContentResponse = response.json().await.map_err(|e| {
            tracing::error!("Failed to parse Gemini image response: {}", e);
            EducadorError::ImageGeneration(format!("Invalid response: {}", e))
        })?;

        parsed.inline_image().ok_or_else(|| {
            EducadorError::ImageGeneration("Nenhuma imagem foi gerada.".to_string()).into()
        })
    }
}
