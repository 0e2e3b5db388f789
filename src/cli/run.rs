//! Run targets from the project file.

use std::path::Path;

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use crate::config::ProjectConfig;
use crate::task::{TaskMode, TaskRunner};

/// Arguments of `stencil run`.
#[derive(Args, Debug)]
pub struct RunCommand {
    /// Targets to run, in order; all targets when omitted
    #[arg(value_name = "TARGET")]
    pub targets: Vec<String>,
}

impl RunCommand {
    /// Loads the project file and runs the selected targets, stopping at the first
    /// failure.
    pub async fn execute(self, config_path: &Path, quiet: bool) -> Result<()> {
        let config = ProjectConfig::load(config_path)?;
        let runner = TaskRunner::new(super::project_dir(config_path));

        let reports = runner.run_config(&config, &self.targets).await?;

        if !quiet {
            for report in &reports {
                let detail = match report.mode {
                    TaskMode::Nothing => "nothing to do".to_string(),
                    _ => format!("{} file(s) written", report.written.len()),
                };
                println!("{} {} ({}): {}", "✓".green(), report.target.bold(), report.mode, detail);

                let failures = report.data.failures.len() + report.helpers.failures.len();
                if failures > 0 {
                    println!("  {} {} data/helper file(s) skipped", "⚠".yellow(), failures);
                }
            }
        }
        Ok(())
    }
}
