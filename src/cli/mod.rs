//! Command-line interface for Stencil.
//!
//! # Commands
//!
//! - `run [TARGET...]` - Run targets from `stencil.toml` (all of them by default)
//! - `client --dest DIR` - Assemble the client bundle without a project file
//! - `serve` - Serve the `[[views]]` of the project file over HTTP
//! - `list` - Show the configured targets and what they do
//!
//! # Global Options
//!
//! - `--verbose` / `-v` - Debug logging
//! - `--quiet` / `-q` - Errors only, no summary output
//! - `--config` / `-c` - Project file to use instead of `./stencil.toml`
//!
//! `RUST_LOG`, when set, takes precedence over `--verbose` and `--quiet`.
//!
//! # Examples
//!
//! ```bash
//! stencil run
//! stencil -v run pages bundle
//! stencil --config site/stencil.toml list
//! stencil client --dest out/js --resolve /template/ --builtin-helpers
//! stencil serve --addr 0.0.0.0:8080
//! ```

mod client;
mod list;
mod run;
mod serve;

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::constants::DEFAULT_CONFIG_FILE;

pub use client::ClientCommand;
pub use list::ListCommand;
pub use run::RunCommand;
pub use serve::ServeCommand;

/// Main CLI structure for Stencil.
///
/// All options marked `global = true` are accepted before or after the subcommand.
#[derive(Parser)]
#[command(
    name = "stencil",
    about = "Stencil - render and compile Tera templates",
    version,
    long_about = "Stencil renders Tera templates to HTML, compiles them into scripts for the browser loader, and assembles the client bundle."
)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging.
    ///
    /// Mutually exclusive with `--quiet`.
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only report errors.
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to the project file.
    ///
    /// Paths inside the file are relative to the directory holding it.
    #[arg(short, long, global = true, value_name = "PATH", default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Run targets from the project file
    Run(RunCommand),

    /// Assemble the client bundle
    Client(ClientCommand),

    /// Serve the configured views
    Serve(ServeCommand),

    /// List configured targets
    List(ListCommand),
}

impl Cli {
    /// Initializes logging and runs the selected command.
    ///
    /// # Errors
    ///
    /// Returns whatever the command fails with; `main` turns it into a
    /// user-facing message and exit code 1.
    pub async fn execute(self) -> Result<()> {
        self.init_logging();

        let config = self.config.as_path();
        let quiet = self.quiet;
        match self.command {
            Commands::Run(cmd) => cmd.execute(config, quiet).await,
            Commands::Client(cmd) => cmd.execute(quiet).await,
            Commands::Serve(cmd) => cmd.execute(config).await,
            Commands::List(cmd) => cmd.execute(config).await,
        }
    }

    /// Log filter directive for the global flags.
    fn log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else if self.quiet {
            "error"
        } else {
            "info"
        }
    }

    fn init_logging(&self) {
        let filter = if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            EnvFilter::new(self.log_level())
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    }
}

/// Directory the project file lives in; project paths are relative to it.
pub(crate) fn project_dir(config: &Path) -> PathBuf {
    config
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
}
