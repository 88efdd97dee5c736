//! Generation session state machine
//!
//! A [`Session`] holds the interactive state for one open template: the
//! prompt being edited, the selected curricular context, the streamed
//! result and the latest illustration. Text and image generation are two
//! independent sub-machines; each allows at most one request in flight, but
//! a text request and an image request may run at the same time.
//!
//! There is no cancellation. Closing the session (or opening a different
//! template) starts a new epoch, and anything an older request delivers
//! afterwards is ignored.

use crate::catalog::{ContextOption, Template};
use crate::context::{augment_prompt, DEFAULT_CONTEXT_ID};
use crate::generation::{GeneratedImage, GenerationClient, PartialSink};
use crate::history::{HistoryEntry, HistoryStore};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, error, info, warn};

/// Message shown in place of the result when text generation fails
pub const GENERATION_ERROR_MESSAGE: &str =
    "Erro ao gerar conteúdo. Verifique sua conexão ou a chave de API.";

/// Observable state of a session
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub active_template: Option<Template>,
    pub prompt_text: String,
    pub result_text: String,
    pub generation_in_progress: bool,
    pub image_generation_in_progress: bool,
    pub generated_image: Option<GeneratedImage>,
    pub selected_context_id: String,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            active_template: None,
            prompt_text: String::new(),
            result_text: String::new(),
            generation_in_progress: false,
            image_generation_in_progress: false,
            generated_image: None,
            selected_context_id: DEFAULT_CONTEXT_ID.to_string(),
        }
    }
}

impl SessionState {
    fn for_template(template: &Template) -> Self {
        Self {
            active_template: Some(template.clone()),
            prompt_text: template.default_prompt.clone(),
            ..Self::default()
        }
    }
}

/// Why a trigger did nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NoTemplate,
    EmptyPrompt,
    AlreadyRunning,
}

/// Result of triggering text generation
#[derive(Debug, Clone, PartialEq)]
pub enum TextOutcome {
    /// Guard rejected the trigger; state unchanged
    Skipped(SkipReason),
    /// Stream finished; `saved` is `None` when the final text was empty
    Completed { saved: Option<HistoryEntry> },
    /// Stream failed; the result now holds [`GENERATION_ERROR_MESSAGE`]
    Failed,
    /// Session was closed or switched while the request was in flight
    Abandoned,
}

/// Result of triggering image generation
#[derive(Debug, Clone, PartialEq)]
pub enum ImageOutcome {
    Skipped(SkipReason),
    Completed(GeneratedImage),
    /// Logged only; the previous image and the text result are untouched
    Failed,
    Abandoned,
}

struct Shared {
    state: SessionState,
    epoch: u64,
}

struct Inner {
    shared: Mutex<Shared>,
    client: Arc<dyn GenerationClient>,
    history: Arc<Mutex<HistoryStore>>,
    contexts: Vec<ContextOption>,
}

/// Interactive generation session
///
/// Cloning is cheap and yields a handle to the same session, so a request
/// can run on a spawned task while the caller keeps editing.
#[derive(Clone)]
pub struct Session {
    inner: Arc<Inner>,
}

impl Session {
    /// Create a closed session
    ///
    /// # Arguments
    ///
    /// * `client` - Text and image generation client
    /// * `history` - Process-wide history store that successful generations are recorded in
    /// * `contexts` - Curricular context options available for augmentation
    pub fn new(
        client: Arc<dyn GenerationClient>,
        history: Arc<Mutex<HistoryStore>>,
        contexts: Vec<ContextOption>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                shared: Mutex::new(Shared {
                    state: SessionState::default(),
                    epoch: 0,
                }),
                client,
                history,
                contexts,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Shared> {
        self.inner
            .shared
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn history_lock(&self) -> MutexGuard<'_, HistoryStore> {
        self.inner
            .history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Copy of the current observable state
    pub fn snapshot(&self) -> SessionState {
        self.lock().state.clone()
    }

    /// Shared history store
    pub fn history(&self) -> Arc<Mutex<HistoryStore>> {
        Arc::clone(&self.inner.history)
    }

    /// Context options offered by this session
    pub fn contexts(&self) -> &[ContextOption] {
        &self.inner.contexts
    }

    /// Open `template`
    ///
    /// Opening a different template resets every field and seeds the prompt
    /// from the template's default. Re-opening the active template keeps the
    /// session as is.
    ///
    /// # Returns
    ///
    /// `true` if the session was reset
    pub fn open_template(&self, template: &Template) -> bool {
        let mut shared = self.lock();
        let same = shared
            .state
            .active_template
            .as_ref()
            .is_some_and(|active| active.id == template.id);
        if same {
            debug!("Template {} already open", template.id);
            return false;
        }

        shared.epoch += 1;
        shared.state = SessionState::for_template(template);
        info!("Opened template {} ({})", template.id, template.title);
        true
    }

    /// Tear the session down; late results of in-flight requests are dropped
    pub fn close(&self) {
        let mut shared = self.lock();
        shared.epoch += 1;
        shared.state = SessionState::default();
        debug!("Session closed");
    }

    /// Replace the prompt text; an in-flight request keeps its captured prompt
    pub fn set_prompt(&self, prompt: impl Into<String>) {
        self.lock().state.prompt_text = prompt.into();
    }

    /// Select a context option by id
    ///
    /// Unknown ids are accepted and augment nothing.
    pub fn set_context(&self, context_id: impl Into<String>) {
        self.lock().state.selected_context_id = context_id.into();
    }

    /// Replace prompt and result with a history entry's and drop the image
    ///
    /// # Returns
    ///
    /// `false` (and no change) while text generation is in progress
    pub fn restore(&self, entry: &HistoryEntry) -> bool {
        let mut shared = self.lock();
        if shared.state.generation_in_progress {
            debug!("Restore refused while generating");
            return false;
        }

        shared.state.prompt_text = entry.prompt.clone();
        shared.state.result_text = entry.result.clone();
        shared.state.generated_image = None;
        true
    }

    /// Stream text for the current prompt
    pub async fn generate_text(&self) -> TextOutcome {
        self.generate_text_with(None).await
    }

    /// Stream text for the current prompt, reporting progress to `observer`
    ///
    /// The augmented prompt is sent; the unaugmented prompt is what gets
    /// recorded in history. Each accumulated text is written to the session
    /// before `observer` sees it.
    pub async fn generate_text_with(&self, observer: Option<PartialSink<'_>>) -> TextOutcome {
        let (epoch, title, prompt, final_prompt) = {
            let mut guard = self.lock();
            let shared = &mut *guard;
            let state = &mut shared.state;

            let title = match &state.active_template {
                Some(template) => template.title.clone(),
                None => return TextOutcome::Skipped(SkipReason::NoTemplate),
            };
            if state.prompt_text.trim().is_empty() {
                return TextOutcome::Skipped(SkipReason::EmptyPrompt);
            }
            if state.generation_in_progress {
                return TextOutcome::Skipped(SkipReason::AlreadyRunning);
            }

            state.result_text.clear();
            state.generated_image = None;
            state.generation_in_progress = true;

            let final_prompt = augment_prompt(
                &state.prompt_text,
                &self.inner.contexts,
                &state.selected_context_id,
            );
            (shared.epoch, title, state.prompt_text.clone(), final_prompt)
        };

        debug!(
            "Starting text generation ({} chars sent)",
            final_prompt.chars().count()
        );

        let on_partial = |text: &str| {
            {
                let mut shared = self.lock();
                if shared.epoch != epoch {
                    return;
                }
                shared.state.result_text = text.to_string();
            }
            if let Some(observer) = observer {
                observer(text);
            }
        };

        let result = self
            .inner
            .client
            .stream_text(&final_prompt, &on_partial)
            .await;

        let text = {
            let mut shared = self.lock();
            if shared.epoch != epoch {
                debug!("Text generation finished after the session was closed");
                return TextOutcome::Abandoned;
            }

            match result {
                Ok(text) => {
                    shared.state.result_text = text.clone();
                    text
                }
                Err(e) => {
                    error!("Text generation failed: {:#}", e);
                    shared.state.result_text = GENERATION_ERROR_MESSAGE.to_string();
                    shared.state.generation_in_progress = false;
                    return TextOutcome::Failed;
                }
            }
        };

        // Storage I/O runs without the state lock; the text machine stays
        // busy until the entry is recorded.
        let saved = if text.is_empty() {
            debug!("Empty result, nothing to save");
            None
        } else {
            Some(self.history_lock().record(&title, &prompt, &text))
        };

        let mut shared = self.lock();
        if shared.epoch == epoch {
            shared.state.generation_in_progress = false;
        }
        TextOutcome::Completed { saved }
    }

    /// Generate an illustration for the current (unaugmented) prompt
    pub async fn generate_image(&self) -> ImageOutcome {
        let (epoch, prompt) = {
            let mut guard = self.lock();
            let shared = &mut *guard;
            let state = &mut shared.state;

            if state.active_template.is_none() {
                return ImageOutcome::Skipped(SkipReason::NoTemplate);
            }
            if state.prompt_text.trim().is_empty() {
                return ImageOutcome::Skipped(SkipReason::EmptyPrompt);
            }
            if state.image_generation_in_progress {
                return ImageOutcome::Skipped(SkipReason::AlreadyRunning);
            }

            state.image_generation_in_progress = true;
            (shared.epoch, state.prompt_text.clone())
        };

        let result = self.inner.client.generate_image(&prompt).await;

        let mut shared = self.lock();
        if shared.epoch != epoch {
            debug!("Image generation finished after the session was closed");
            return ImageOutcome::Abandoned;
        }
        shared.state.image_generation_in_progress = false;

        match result {
            Ok(image) => {
                shared.state.generated_image = Some(image.clone());
                ImageOutcome::Completed(image)
            }
            Err(e) => {
                warn!("Image generation failed: {:#}", e);
                ImageOutcome::Failed
            }
        }
    }
}
