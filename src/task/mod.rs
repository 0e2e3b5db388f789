//! Build task runner.
//!
//! A target run goes through fixed stages:
//!
//! 1. **Client short-circuit** - a target with `client` set only assembles the client
//!    bundle (see [`crate::client`]).
//! 2. **No-op** - a target that neither renders nor compiles logs "nothing to do".
//! 3. **Setup** - a fresh [`Adapter`] is created, the optional setup callback runs,
//!    then data files and helper templates are registered.
//! 4. **Collect** - file groups are flattened into [`FileTask`]s.
//! 5. **Process** - files are handled one at a time; the first failure stops the run.
//! 6. **Finalize** - concatenation buffers are flushed whether or not processing
//!    failed, each joined with `;\n`.
//!
//! # Examples
//!
//! ```rust,no_run
//! use stencil_cli::config::ProjectConfig;
//! use stencil_cli::task::TaskRunner;
//! use std::path::Path;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = ProjectConfig::load(Path::new("stencil.toml"))?;
//! let runner = TaskRunner::new(".");
//! for report in runner.run_config(&config, &[]).await? {
//!     println!("{}: {} file(s)", report.target, report.written.len());
//! }
//! # Ok(())
//! # }
//! ```

mod files;

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::adapter::{Adapter, AdapterOptions, LoadReport, RenderOptions};
use crate::client::{ClientOptions, copy_client_libs};
use crate::config::{ProjectConfig, TargetConfig, TaskOptions};
use crate::constants::SCRIPT_SEPARATOR;
use crate::utils::fs::{read_text_file, write_text_file};

pub use files::{FileTask, collect_file_tasks};

/// Callback run on the fresh adapter before data and helpers are loaded.
pub type SetupFn = Box<dyn Fn(&mut Adapter) -> Result<()> + Send + Sync>;

/// What a target does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskMode {
    /// Assemble the client bundle
    Client,
    /// Render sources to their output
    Render,
    /// Compile sources to registration scripts
    Compile,
    /// Neither render nor compile is set
    Nothing,
}

impl TaskMode {
    /// The mode selected by resolved options. Client mode wins over everything else.
    pub fn of(options: &TaskOptions) -> Self {
        if options.client.is_some() {
            Self::Client
        } else if options.compile {
            Self::Compile
        } else if options.render {
            Self::Render
        } else {
            Self::Nothing
        }
    }
}

impl fmt::Display for TaskMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Client => "client",
            Self::Render => "render",
            Self::Compile => "compile",
            Self::Nothing => "nothing",
        };
        f.write_str(name)
    }
}

/// Outcome of a successful target run.
#[derive(Debug, Clone)]
pub struct TaskReport {
    /// Target name
    pub target: String,
    /// Mode the target ran in
    pub mode: TaskMode,
    /// Files written, in write order
    pub written: Vec<PathBuf>,
    /// Data files loaded into the context
    pub data: LoadReport,
    /// Helper templates registered
    pub helpers: LoadReport,
}

impl TaskReport {
    fn new(target: &str, mode: TaskMode) -> Self {
        Self {
            target: target.to_string(),
            mode,
            written: Vec::new(),
            data: LoadReport::default(),
            helpers: LoadReport::default(),
        }
    }
}

/// Runs targets against a project directory.
pub struct TaskRunner {
    cwd: PathBuf,
    setup: Option<SetupFn>,
}

impl fmt::Debug for TaskRunner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskRunner")
            .field("cwd", &self.cwd)
            .field("setup", &self.setup.is_some())
            .finish()
    }
}

impl TaskRunner {
    /// A runner resolving every path against `cwd`.
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        Self {
            cwd: cwd.into(),
            setup: None,
        }
    }

    /// Sets the callback run on each fresh adapter.
    #[must_use]
    pub fn with_setup(mut self, setup: SetupFn) -> Self {
        self.setup = Some(setup);
        self
    }

    /// Runs the named targets of `config` in order, or all of them when `names` is
    /// empty. Stops at the first failing target.
    ///
    /// # Errors
    ///
    /// Fails on an unknown target name, an invalid option combination, or the first
    /// target that fails.
    pub async fn run_config(&self, config: &ProjectConfig, names: &[String]) -> Result<Vec<TaskReport>> {
        let mut reports = Vec::new();
        for target in config.select(names)? {
            let options = config.options_for(target)?;
            let report = self.run(target, &options).await.with_context(|| format!("Target '{}' failed", target.name))?;
            reports.push(report);
        }
        Ok(reports)
    }

    /// Runs one target with resolved options.
    ///
    /// # Errors
    ///
    /// Returns the first error raised while assembling the client bundle, setting up
    /// the adapter, or processing a file. Concatenation buffers are flushed before a
    /// processing error is returned.
    pub async fn run(&self, target: &TargetConfig, options: &TaskOptions) -> Result<TaskReport> {
        let mode = TaskMode::of(options);
        let mut report = TaskReport::new(&target.name, mode);

        if let Some(dest) = &options.client {
            report.written = copy_client_libs(&ClientOptions {
                cwd: self.cwd.clone(),
                dest: dest.clone(),
                resolve_path: options.resolve.clone(),
                dist_dir: options.dist_dir.clone(),
                dist_prefix: options.dist_prefix.clone(),
                builtin_helpers: options.builtin_helpers,
                engine_helpers: options.engine_helpers,
                user_helpers: options.helpers.clone(),
            })?;
            return Ok(report);
        }

        if mode == TaskMode::Nothing {
            info!("Target '{}': nothing to do", target.name);
            return Ok(report);
        }

        let mut adapter = Adapter::new(AdapterOptions {
            cwd: self.cwd.clone(),
            resolve: options.resolve.clone(),
            cache: options.cache,
            extension: options.extension.clone(),
            autoescape: options.autoescape,
        });

        if let Some(setup) = &self.setup {
            setup(&mut adapter).context("Setup callback failed")?;
        }
        for pattern in &options.data {
            report.data.extend(adapter.data_glob(pattern)?);
        }
        for pattern in &options.helpers {
            report.helpers.extend(adapter.register_helpers_glob(pattern)?);
        }

        let tasks = collect_file_tasks(&target.files, &self.cwd, options.concat, &target.name)?;
        debug!("Target '{}' has {} file(s) to {}", target.name, tasks.len(), mode);

        let render_options = RenderOptions::with_whitespace(options.whitespace);
        let mut buffers: BTreeMap<PathBuf, Vec<String>> = BTreeMap::new();
        let processed = self.process(&mut adapter, mode, &tasks, render_options, &mut buffers, &mut report).await;
        let flushed = self.flush(buffers, &mut report).await;

        processed?;
        flushed?;
        Ok(report)
    }

    async fn process(
        &self,
        adapter: &mut Adapter,
        mode: TaskMode,
        tasks: &[FileTask],
        render_options: RenderOptions,
        buffers: &mut BTreeMap<PathBuf, Vec<String>>,
        report: &mut TaskReport,
    ) -> Result<()> {
        for task in tasks {
            let content = read_text_file(&self.cwd.join(&task.src)).await?;

            if mode == TaskMode::Compile {
                let compiled = adapter
                    .compile(&task.src, Some(&content), render_options)
                    .with_context(|| format!("Failed to compile '{}'", task.src.display()))?;

                if task.concat {
                    debug!("Buffering '{}' for {}", task.src.display(), task.dest.display());
                    buffers.entry(task.dest.clone()).or_default().push(compiled);
                } else {
                    self.write(&task.dest, &compiled, report).await?;
                    info!("Compiled '{}'", task.dest.display());
                }
            } else {
                let rendered = adapter
                    .render(&task.src, Some(&content), None, render_options)
                    .with_context(|| format!("Failed to render '{}'", task.src.display()))?;
                self.write(&task.dest, &rendered, report).await?;
                info!("Rendered '{}'", task.dest.display());
            }
        }
        Ok(())
    }

    async fn flush(&self, buffers: BTreeMap<PathBuf, Vec<String>>, report: &mut TaskReport) -> Result<()> {
        for (dest, parts) in buffers {
            if parts.is_empty() {
                continue;
            }
            self.write(&dest, &parts.join(SCRIPT_SEPARATOR), report).await?;
            info!("Compiled {} template(s) into '{}'", parts.len(), dest.display());
        }
        Ok(())
    }

    async fn write(&self, dest: &Path, content: &str, report: &mut TaskReport) -> Result<()> {
        let path = self.cwd.join(dest);
        write_text_file(&path, content).await?;
        report.written.push(path);
        Ok(())
    }
}
