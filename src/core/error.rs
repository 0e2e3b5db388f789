//! Error handling for Stencil
//!
//! This module provides the crate-wide error type and user-friendly error reporting.
//! The error system follows two principles:
//! 1. **Strongly-typed errors** for precise error handling in code
//! 2. **User-friendly messages** with actionable suggestions for CLI users
//!
//! # Architecture
//!
//! - [`StencilError`] - Enumerated failure cases that are not owned by a single module
//! - [`ErrorContext`] - Wrapper that adds details and a suggestion for display
//! - [`user_friendly_error`] - Converts any [`anyhow::Error`] into an [`ErrorContext`]
//!
//! Module-level errors ([`crate::engine::EngineError`], [`crate::adapter::AdapterError`])
//! are recognised while walking the error chain, so a failed render still gets a
//! template-specific suggestion even after being wrapped with `anyhow` context.
//!
//! # Examples
//!
//! ```rust,no_run
//! use stencil_cli::core::{ErrorContext, StencilError, user_friendly_error};
//!
//! let error = StencilError::ConfigNotFound { path: "stencil.toml".to_string() };
//! let ctx = user_friendly_error(anyhow::Error::from(error));
//! ctx.display();
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

use crate::adapter::AdapterError;
use crate::engine::EngineError;

/// The main error type for Stencil operations
///
/// Each variant carries the file, target or reason needed to explain the failure
/// to a user without re-reading the configuration.
#[derive(Error, Debug, Clone)]
pub enum StencilError {
    /// The project file could not be found.
    #[error("Project file not found: {path}")]
    ConfigNotFound {
        /// Path that was looked up
        path: String,
    },

    /// The project file exists but is not valid TOML or has unknown fields.
    #[error("Invalid project file syntax in {file}")]
    ConfigParseError {
        /// File that failed to parse
        file: String,
        /// Parser message
        reason: String,
    },

    /// A target requested on the command line is not declared.
    #[error("Target '{name}' is not defined in the project file")]
    TargetNotFound {
        /// Requested target name
        name: String,
        /// Declared target names, in declaration order
        available: Vec<String>,
    },

    /// A target declares an option combination that cannot run.
    #[error("Invalid options for target '{target}': {reason}")]
    InvalidTarget {
        /// Target name
        target: String,
        /// What is wrong with it
        reason: String,
    },

    /// One of the engine's browser distribution files is missing.
    #[error("Client distribution file not found: {path}")]
    DistFileMissing {
        /// Expected location of the file
        path: String,
    },

    /// Catch-all for errors that only carry a message.
    #[error("{message}")]
    Other {
        /// Error message
        message: String,
    },
}

/// Error context wrapper that provides user-friendly error information
///
/// Wraps a [`StencilError`] with optional details (why it happened) and an optional
/// suggestion (what to do about it).
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying Stencil error
    pub error: StencilError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context from a [`StencilError`]
    #[must_use]
    pub const fn new(error: StencilError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add additional details explaining the error
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Display the error context to stderr with terminal colors
    ///
    /// - Error message: Red and bold
    /// - Details: Yellow
    /// - Suggestion: Green
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error into a user-friendly [`ErrorContext`]
///
/// Walks the error chain looking for a [`StencilError`], an [`AdapterError`] or an
/// [`EngineError`] and attaches suggestions tailored to the first one found. Anything
/// else is reported as [`StencilError::Other`] with the full chain appended.
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    if let Some(stencil_error) = error.chain().find_map(|c| c.downcast_ref::<StencilError>()) {
        return create_error_context(stencil_error);
    }

    // A missing partial is usually wrapped by the engine error of the template that
    // included it, so look for it across the whole chain before the generic case.
    let missing_partial = error.chain().find_map(|cause| match cause.downcast_ref::<AdapterError>() {
        Some(AdapterError::PartialNotFound {
            suggestions,
            ..
        }) => Some(suggestions.clone()),
        _ => None,
    });

    if let Some(suggestions) = missing_partial {
        let context = ErrorContext::new(StencilError::Other {
            message: full_chain(&error),
        })
        .with_details(
            "Partials are looked up as <resolve>/<name>.<extension> relative to the project directory",
        );
        return if suggestions.is_empty() {
            context.with_suggestion("Check the partial name and the `resolve` option of the target")
        } else {
            context.with_suggestion(format!("Did you mean: {}?", suggestions.join(", ")))
        };
    }

    let engine_failure = error.chain().any(|c| {
        c.downcast_ref::<EngineError>().is_some()
            || matches!(c.downcast_ref::<AdapterError>(), Some(AdapterError::Engine(_)))
    });
    if engine_failure {
        return ErrorContext::new(StencilError::Other {
            message: full_chain(&error),
        })
        .with_suggestion(
            "Check template syntax: variables use {{ var }}, comments use {# #}, control flow uses {% %}",
        )
        .with_details(
            "Template errors occur when Tera cannot parse or render the template. Common issues:\n\
             - Undefined variables (use {% if var is defined %} to check)\n\
             - Unclosed {{ or {% delimiters\n\
             - Unknown filters or functions",
        );
    }

    if let Some(toml_error) = error.downcast_ref::<toml::de::Error>() {
        return ErrorContext::new(StencilError::ConfigParseError {
            file: crate::constants::DEFAULT_CONFIG_FILE.to_string(),
            reason: toml_error.to_string(),
        })
        .with_suggestion("Check the TOML syntax in your stencil.toml file");
    }

    ErrorContext::new(StencilError::Other {
        message: full_chain(&error),
    })
}

/// Render the error message followed by its numbered causes.
fn full_chain(error: &anyhow::Error) -> String {
    let mut message = error.to_string();
    let chain: Vec<String> = error.chain().skip(1).map(ToString::to_string).collect();

    if !chain.is_empty() {
        message.push_str("\n\nCaused by:");
        for (i, cause) in chain.iter().enumerate() {
            message.push_str(&format!("\n  {}: {}", i + 1, cause));
        }
    }

    message
}

/// Create an [`ErrorContext`] with suggestions for a specific [`StencilError`]
fn create_error_context(error: &StencilError) -> ErrorContext {
    match error {
        StencilError::ConfigNotFound {
            ..
        } => ErrorContext::new(error.clone())
            .with_suggestion("Create a stencil.toml in the project directory or pass --config <path>")
            .with_details("Stencil reads its targets from stencil.toml in the current directory by default"),

        StencilError::ConfigParseError {
            file,
            reason,
        } => ErrorContext::new(error.clone())
            .with_suggestion(format!(
                "Check the TOML syntax in {file}. Common issues: missing quotes, unmatched brackets, misspelled option names"
            ))
            .with_details(reason.clone()),

        StencilError::TargetNotFound {
            available,
            ..
        } => {
            let context = ErrorContext::new(error.clone());
            if available.is_empty() {
                context.with_suggestion("Declare targets with [[targets]] blocks in stencil.toml")
            } else {
                context.with_suggestion(format!("Available targets: {}", available.join(", ")))
            }
        }

        StencilError::InvalidTarget {
            ..
        } => ErrorContext::new(error.clone())
            .with_suggestion("Check the target in stencil.toml; `stencil list` shows what each target does"),

        StencilError::DistFileMissing {
            ..
        } => ErrorContext::new(error.clone())
            .with_suggestion("Point `dist_dir` at the directory holding the engine's browser builds")
            .with_details(
                "Client mode appends the bundle to <prefix>-core.js, <prefix>-core.min.js, <prefix>-full.js and <prefix>-full.min.js",
            ),

        StencilError::Other {
            ..
        } => ErrorContext::new(error.clone()),
    }
}
