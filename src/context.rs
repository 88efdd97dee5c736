//! Curricular context augmentation
//!
//! Maps the selected context id to the suffix appended to the prompt right
//! before it is submitted for text generation.

use crate::catalog::ContextOption;

/// Id of the no-op context selected for every new session
pub const DEFAULT_CONTEXT_ID: &str = "default";

/// Suffix for the selected context
///
/// Unknown ids fail closed to the empty suffix, same as `default`.
///
/// # Examples
///
/// ```
/// use educador_ia::catalog::ContextOption;
/// use educador_ia::context::resolve_suffix;
///
/// let options = vec![ContextOption {
///     id: "municipal".to_string(),
///     label: "Municipal".to_string(),
///     prompt_suffix: " [municipal]".to_string(),
///     description: String::new(),
///     link: None,
/// }];
/// assert_eq!(resolve_suffix(&options, "municipal"), " [municipal]");
/// assert_eq!(resolve_suffix(&options, "unknown"), "");
/// ```
pub fn resolve_suffix<'a>(options: &'a [ContextOption], selected_id: &str) -> &'a str {
    match options.iter().find(|option| option.id == selected_id) {
        Some(option) => option.prompt_suffix.as_str(),
        None => {
            tracing::debug!(
                "Context '{}' not found, submitting prompt without suffix",
                selected_id
            );
            ""
        }
    }
}

/// Prompt text as submitted to the text model
pub fn augment_prompt(prompt: &str, options: &[ContextOption], selected_id: &str) -> String {
    let mut augmented = String::with_capacity(prompt.len());
    augmented.push_str(prompt);
    augmented.push_str(resolve_suffix(options, selected_id));
    augmented
}
