//! Engine error types.

use thiserror::Error;

/// Boxed error returned by a [`super::PartialLoader`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Failures reported by the [`super::Engine`].
///
/// Messages coming from Tera are flattened with [`format_tera_error`] so the whole
/// cause chain survives when the error is displayed on one line.
#[derive(Error, Debug)]
pub enum EngineError {
    /// The template source could not be parsed.
    #[error("Syntax error in template '{name}': {message}")]
    Syntax {
        /// Template name
        name: String,
        /// Flattened Tera message
        message: String,
    },

    /// The template parsed but failed while rendering.
    #[error("Failed to render template '{name}': {message}")]
    Render {
        /// Template name
        name: String,
        /// Flattened Tera message
        message: String,
    },

    /// A referenced template could not be supplied by the partial loader.
    #[error("Failed to load template '{name}'")]
    PartialLoad {
        /// Name the engine asked for
        name: String,
        /// Error returned by the loader
        #[source]
        source: BoxError,
    },

    /// The rendering context is not a JSON object.
    #[error("Invalid rendering context: {0}")]
    Context(String),
}

/// Formats a Tera error with every message of its cause chain.
///
/// Tera nests the useful part (the missing variable, the unexpected token) a few
/// levels down, so the top-level message alone is rarely enough.
pub fn format_tera_error(error: &tera::Error) -> String {
    use std::error::Error;

    let mut messages = vec![error.to_string()];
    let mut current: Option<&dyn Error> = error.source();
    while let Some(err) = current {
        messages.push(err.to_string());
        current = err.source();
    }

    let messages: Vec<String> = messages
        .into_iter()
        .map(|msg| msg.trim().to_string())
        .filter(|msg| !msg.is_empty())
        .collect();

    if messages.is_empty() {
        "Template error (no details reported)".to_string()
    } else {
        messages.join("\n  → ")
    }
}
