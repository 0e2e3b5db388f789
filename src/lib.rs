//! Stencil - a template build tool around the Tera engine
//!
//! Stencil globs template, partial, helper and data files from disk, feeds them to
//! Tera and writes rendered HTML or compiled template scripts to an output directory.
//! A separate client mode copies the engine's browser distribution files, bundled with
//! optional helper scripts and a small loader, for templates compiled ahead of time.
//!
//! Stencil has no template syntax of its own. Parsing, rendering and the template
//! cache all belong to Tera; this crate is the glue that maps files to template names
//! and template names back to files.
//!
//! # Architecture Overview
//!
//! - `stencil.toml` declares shared `[options]` and a list of `[[targets]]`
//! - Each target either renders, compiles or assembles the client bundle
//! - A target run owns one [`adapter::Adapter`] and processes its files sequentially
//! - Partials referenced with `{% include %}`, `{% extends %}` or `{% import %}` are
//!   resolved on demand against the configured resolve root
//!
//! # Core Modules
//!
//! ## Template Pipeline
//! - [`resolver`] - Logical template names to file paths and back
//! - [`engine`] - Tera wrapper: whitespace handling, compiled scripts, on-load partials
//! - [`adapter`] - Stateful façade with the shared context, partial cache and helpers
//!
//! ## Build Modes
//! - [`task`] - Sequential render/compile runner for a configured target
//! - [`client`] - Browser bundle assembly
//!
//! ## Supporting Modules
//! - [`cli`] - Command-line interface
//! - [`config`] - `stencil.toml` parsing and option resolution
//! - [`core`] - Error types and user-facing error reporting
//! - [`pattern`] - Glob expansion relative to a base directory
//! - [`utils`] - File helpers and JSON object merging
//!
//! # Project File (stencil.toml)
//!
//! ```toml
//! [options]
//! resolve = "templates/"
//!
//! [[targets]]
//! name = "pages"
//! render = true
//! data = "data/*.json"
//! [[targets.files]]
//! expand = true
//! cwd = "templates/pages"
//! src = "*.tera"
//! dest = "out/"
//! ext = ".html"
//!
//! [[targets]]
//! name = "bundle"
//! compile = true
//! concat = true
//! preserve_whitespace = false
//! [[targets.files]]
//! src = ["templates/elements/*.tera"]
//! dest = "out/template/elements.js"
//! ```
//!
//! # Command-Line Usage
//!
//! ```bash
//! # Run every target in declaration order
//! stencil run
//!
//! # Run selected targets only
//! stencil run pages bundle
//!
//! # Serve the configured views
//! stencil serve --addr 127.0.0.1:3000
//! ```

// Template pipeline
pub mod adapter;
pub mod engine;
pub mod resolver;

// Build modes
pub mod client;
pub mod task;

// Supporting modules
pub mod cli;
pub mod config;
pub mod constants;
pub mod core;
pub mod pattern;
pub mod utils;

// test_utils module is available for both unit tests and integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
