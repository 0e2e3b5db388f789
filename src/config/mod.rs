//! Project configuration (`stencil.toml`).
//!
//! # Layout
//!
//! ```toml
//! # Defaults shared by every target
//! [options]
//! resolve = "templates/"
//!
//! [[targets]]
//! name = "pages"
//! render = true
//! data = "data/*.json"
//! helpers = "helpers/*.tera"
//! [[targets.files]]
//! expand = true
//! cwd = "templates/pages"
//! src = "*.tera"
//! dest = "out/"
//! ext = ".html"
//!
//! [[targets]]
//! name = "client"
//! client = "out/js/"
//! resolve = "template/"
//! builtin_helpers = true
//!
//! # Routes served by `stencil serve`
//! [[views]]
//! route = "/"
//! template = "pages/index"
//! context = "data/index.json"
//! ```
//!
//! Target names must be unique. Paths are relative to the directory holding the file.
//!
//! # Modules
//!
//! - `parser` - TOML parsing with typed not-found/parse errors
//! - `target` - Per-target options, their merge with `[options]`, and file groups

mod parser;
mod target;

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::Deserialize;
use tracing::warn;

use crate::core::StencilError;

pub use parser::parse_config;
pub use target::{FileGroup, OneOrMany, TargetOptions, TaskOptions};

/// The parsed `stencil.toml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    /// Defaults for every target
    #[serde(default)]
    pub options: TargetOptions,
    /// Targets, in declaration order
    #[serde(default)]
    pub targets: Vec<TargetConfig>,
    /// Routes for `stencil serve`
    #[serde(default)]
    pub views: Vec<ViewConfig>,
}

/// One `[[targets]]` entry.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TargetConfig {
    /// Unique target name
    pub name: String,
    /// Options set on the target itself
    #[serde(flatten)]
    pub options: TargetOptions,
    /// Source/destination groups, processed in declaration order
    #[serde(default)]
    pub files: Vec<FileGroup>,
    /// Keys that are not target options
    #[serde(flatten)]
    pub unknown: BTreeMap<String, toml::Value>,
}

/// One `[[views]]` entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ViewConfig {
    /// Route path, e.g. `/about`
    pub route: String,
    /// Logical template name
    pub template: String,
    /// JSON file read on every request and merged over the shared context
    pub context: Option<PathBuf>,
}

impl ProjectConfig {
    /// Loads and validates a project file.
    ///
    /// # Errors
    ///
    /// Fails if the file is missing, malformed, or declares a target twice.
    pub fn load(path: &Path) -> Result<Self> {
        let config: Self = parse_config(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks invariants serde cannot express.
    ///
    /// Unknown target keys are only warned about, so a typo does not block a build.
    ///
    /// # Errors
    ///
    /// Returns [`StencilError::InvalidTarget`] for duplicate or empty names.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for target in &self.targets {
            if target.name.is_empty() {
                return Err(StencilError::InvalidTarget {
                    target: String::new(),
                    reason: "every target needs a non-empty `name`".to_string(),
                }
                .into());
            }
            if !seen.insert(target.name.as_str()) {
                return Err(StencilError::InvalidTarget {
                    target: target.name.clone(),
                    reason: "the name is declared more than once".to_string(),
                }
                .into());
            }
            for key in target.unknown.keys() {
                warn!("Ignoring unknown option '{}' in target '{}'", key, target.name);
            }
        }
        Ok(())
    }

    /// Target names in declaration order.
    pub fn target_names(&self) -> Vec<String> {
        self.targets.iter().map(|t| t.name.clone()).collect()
    }

    /// Looks up a target by name.
    ///
    /// # Errors
    ///
    /// Returns [`StencilError::TargetNotFound`] listing the declared targets.
    pub fn target(&self, name: &str) -> Result<&TargetConfig> {
        self.targets.iter().find(|t| t.name == name).ok_or_else(|| {
            StencilError::TargetNotFound {
                name: name.to_string(),
                available: self.target_names(),
            }
            .into()
        })
    }

    /// Targets to run: the named ones in the given order, or all of them.
    ///
    /// # Errors
    ///
    /// Fails on the first name that is not declared.
    pub fn select(&self, names: &[String]) -> Result<Vec<&TargetConfig>> {
        if names.is_empty() {
            return Ok(self.targets.iter().collect());
        }
        names.iter().map(|name| self.target(name)).collect()
    }

    /// Resolved options of a target: the target's own options over `[options]`,
    /// then defaults.
    ///
    /// # Errors
    ///
    /// Returns [`StencilError::InvalidTarget`] when both `render` and `compile` are set
    /// outside client mode.
    pub fn options_for(&self, target: &TargetConfig) -> Result<TaskOptions> {
        let options = self.options.merge(&target.options).resolve();
        if options.client.is_none() && options.render && options.compile {
            return Err(StencilError::InvalidTarget {
                target: target.name.clone(),
                reason: "`render` and `compile` are mutually exclusive".to_string(),
            }
            .into());
        }
        Ok(options)
    }
}
