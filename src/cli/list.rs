//! List the targets of the project file.

use std::path::Path;

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use crate::config::ProjectConfig;
use crate::task::TaskMode;

/// Arguments of `stencil list`.
#[derive(Args, Debug)]
pub struct ListCommand {
    /// Also print the source globs of each target
    #[arg(long)]
    pub files: bool,
}

impl ListCommand {
    /// Prints each target with its mode, in declaration order.
    pub async fn execute(self, config_path: &Path) -> Result<()> {
        let config = ProjectConfig::load(config_path)?;

        if config.targets.is_empty() {
            println!("No targets defined in {}", config_path.display());
            return Ok(());
        }

        for target in &config.targets {
            let options = config.options_for(target)?;
            let mode = TaskMode::of(&options);
            let extra = match (&options.client, mode) {
                (Some(dest), _) => format!(" -> {}", dest.display()),
                (None, TaskMode::Compile) if options.concat => " (concat)".to_string(),
                _ => String::new(),
            };
            println!("{} [{}]{}", target.name.bold(), mode.to_string().cyan(), extra);

            if self.files {
                for group in &target.files {
                    let dest = group.dest.as_deref().unwrap_or("?");
                    println!("  {} -> {}", group.src.to_vec().join(", "), dest);
                }
            }
        }

        if !config.views.is_empty() {
            println!();
            for view in &config.views {
                println!("{} {} -> {}", "view".dimmed(), view.route, view.template);
            }
        }
        Ok(())
    }
}
