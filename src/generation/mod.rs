//! Generation client abstraction
//!
//! This module defines the contract between the studio session and the
//! remote generative service: a streamed text call and a one-shot image
//! call. The Gemini REST implementation lives in [`gemini`].

pub mod gemini;
pub mod instructions;
pub mod sse;

pub use gemini::GeminiClient;

use crate::config::GeminiConfig;
use crate::error::{EducadorError, Result};
use async_trait::async_trait;
use base64::Engine;
use std::io::Cursor;
use std::sync::Arc;

/// Receives the accumulated text each time a streamed fragment arrives
///
/// Every call carries the full text so far, never a delta: consumers must
/// replace what they display, not append.
pub type PartialSink<'a> = &'a (dyn Fn(&str) + Send + Sync);

/// Client for the remote text and image models
///
/// Both calls may run concurrently on the same client; they share no
/// per-request state and never cancel each other.
///
/// # Examples
///
/// ```no_run
/// use educador_ia::generation::{GeneratedImage, GenerationClient, PartialSink};
/// use educador_ia::error::Result;
/// use async_trait::async_trait;
///
/// struct Echo;
///
/// #[async_trait]
/// impl GenerationClient for Echo {
///     async fn stream_text(&self, prompt: &str, on_partial: PartialSink<'_>) -> Result<String> {
///         on_partial(prompt);
///         Ok(prompt.to_string())
///     }
///
///     async fn generate_image(&self, _prompt: &str) -> Result<GeneratedImage> {
///         Ok(GeneratedImage::new("image/png", ""))
///     }
/// }
/// ```
#[async_trait]
pub trait GenerationClient: Send + Sync {
    /// Stream lesson text for an already augmented prompt
    ///
    /// `on_partial` is invoked in arrival order with the accumulated text.
    ///
    /// # Returns
    ///
    /// The final accumulated text once the stream ends
    ///
    /// # Errors
    ///
    /// Returns `EducadorError::Generation` when the request fails or the
    /// stream aborts; partial text is never returned as a success value.
    async fn stream_text(&self, prompt: &str, on_partial: PartialSink<'_>) -> Result<String>;

    /// Generate one illustration for a raw (non-augmented) prompt
    ///
    /// # Errors
    ///
    /// Returns `EducadorError::ImageGeneration` when the call fails or the
    /// response carries no inline image.
    async fn generate_image(&self, prompt: &str) -> Result<GeneratedImage>;
}

/// Create the configured generation client
///
/// # Errors
///
/// Returns error if the API key is missing or the HTTP client cannot be built
pub fn create_client(config: &GeminiConfig) -> Result<Arc<dyn GenerationClient>> {
    Ok(Arc::new(GeminiClient::new(config.clone())?))
}

/// Displayable image returned by the image model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedImage {
    /// MIME type reported by the endpoint, e.g. `image/png`
    pub mime_type: String,
    /// Base64-encoded image bytes
    pub data: String,
}

impl GeneratedImage {
    /// Create an image reference from its MIME type and base64 payload
    pub fn new(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }

    /// Render as a `data:` URL
    ///
    /// # Examples
    ///
    /// ```
    /// use educador_ia::generation::GeneratedImage;
    ///
    /// let image = GeneratedImage::new("image/png", "iVBORw0KGgo=");
    /// assert_eq!(image.to_data_url(), "data:image/png;base64,iVBORw0KGgo=");
    /// ```
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }

    /// Decode the base64 payload into raw bytes
    ///
    /// # Errors
    ///
    /// Returns `EducadorError::ImageGeneration` if the payload is not valid base64
    pub fn decode(&self) -> Result<Vec<u8>> {
        base64::engine::general_purpose::STANDARD
            .decode(self.data.trim())
            .map_err(|e| {
                EducadorError::ImageGeneration(format!("Invalid base64 image payload: {}", e))
                    .into()
            })
    }

    /// Image bytes encoded as PNG
    ///
    /// PNG payloads are returned as decoded; other formats are re-encoded.
    ///
    /// # Errors
    ///
    /// Returns error if the payload cannot be decoded as an image
    pub fn to_png(&self) -> Result<Vec<u8>> {
        let bytes = self.decode()?;
        if self.mime_type.eq_ignore_ascii_case("image/png") {
            return Ok(bytes);
        }

        let image = image::load_from_memory(&bytes).map_err(EducadorError::from)?;
        let mut png = Cursor::new(Vec::new());
        image
            .write_to(&mut png, image::ImageFormat::Png)
            .map_err(EducadorError::from)?;
        Ok(png.into_inner())
    }
}
