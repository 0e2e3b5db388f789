//! Test utilities for Stencil
//!
//! Helpers shared by unit tests and the integration suite (through the
//! `test-utils` feature): one-time logging setup and throwaway project directories.
//!
//! # Example
//!
//! ```rust,no_run
//! use stencil_cli::test_utils::TestProject;
//!
//! let project = TestProject::new().unwrap();
//! project.write_file("templates/index.tera", "<h1>{{ title }}</h1>").unwrap();
//! assert!(project.file_exists("templates/index.tera"));
//! ```

pub mod project;

pub use project::TestProject;

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Only the first call has an effect. `level` wins over `RUST_LOG`; with neither,
/// nothing is logged.
///
/// ```bash
/// RUST_LOG=stencil_cli=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .with_ansi(true)
            .try_init();
    });
}
