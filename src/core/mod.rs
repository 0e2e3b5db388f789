//! Core types for Stencil
//!
//! Error handling shared by every module lives here:
//! - [`StencilError`] - Enumerated failure cases
//! - [`ErrorContext`] - User-friendly wrapper with details and suggestions
//! - [`user_friendly_error`] - Convert any error into a displayable context

pub mod error;

pub use error::{ErrorContext, StencilError, user_friendly_error};
