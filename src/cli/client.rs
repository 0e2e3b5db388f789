//! Assemble the client bundle from command-line options.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use crate::client::{ClientOptions, copy_client_libs};
use crate::constants::{DEFAULT_DIST_DIR, DEFAULT_DIST_PREFIX};

/// Arguments of `stencil client`.
#[derive(Args, Debug)]
pub struct ClientCommand {
    /// Output directory of the bundle files
    #[arg(long, value_name = "DIR")]
    pub dest: PathBuf,

    /// URL prefix compiled templates are fetched from
    #[arg(long, value_name = "PATH", default_value = "")]
    pub resolve: String,

    /// Directory holding the engine's browser builds
    #[arg(long, value_name = "DIR", default_value = DEFAULT_DIST_DIR)]
    pub dist_dir: PathBuf,

    /// File name prefix of the browser builds
    #[arg(long, value_name = "PREFIX", default_value = DEFAULT_DIST_PREFIX)]
    pub dist_prefix: String,

    /// Include the built-in browser helpers
    #[arg(long)]
    pub builtin_helpers: bool,

    /// Include the engine's helper script
    #[arg(long)]
    pub engine_helpers: bool,

    /// Glob of user helper scripts to include (repeatable)
    #[arg(long = "helpers", value_name = "GLOB")]
    pub helpers: Vec<String>,
}

impl ClientCommand {
    /// Writes the four bundle files relative to the current directory.
    pub async fn execute(self, quiet: bool) -> Result<()> {
        let written = copy_client_libs(&ClientOptions {
            cwd: PathBuf::from("."),
            dest: self.dest,
            resolve_path: self.resolve,
            dist_dir: self.dist_dir,
            dist_prefix: self.dist_prefix,
            builtin_helpers: self.builtin_helpers,
            engine_helpers: self.engine_helpers,
            user_helpers: self.helpers,
        })?;

        if !quiet {
            for path in &written {
                println!("{} {}", "✓".green(), path.display());
            }
        }
        Ok(())
    }
}
