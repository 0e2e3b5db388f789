//! Target options and file groups.
//!
//! Options are declared twice: once under `[options]` as project-wide defaults and
//! once per `[[targets]]` entry. Both deserialize into [`TargetOptions`], where every
//! field is optional; [`TargetOptions::merge`] lays a target over the defaults and
//! [`TargetOptions::resolve`] fills whatever is still unset.

use std::path::PathBuf;

use serde::Deserialize;

use crate::constants::{DEFAULT_DIST_DIR, DEFAULT_DIST_PREFIX, DEFAULT_TEMPLATE_EXTENSION};
use crate::engine::Whitespace;

/// A string or a list of strings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    /// `src = "pages/*.tera"`
    One(String),
    /// `src = ["pages/*.tera", "posts/*.tera"]`
    Many(Vec<String>),
}

impl OneOrMany {
    /// The values as a list, in declaration order.
    pub fn to_vec(&self) -> Vec<String> {
        match self {
            Self::One(value) => vec![value.clone()],
            Self::Many(values) => values.clone(),
        }
    }
}

impl Default for OneOrMany {
    fn default() -> Self {
        Self::Many(Vec::new())
    }
}

/// Options a target may set, all optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TargetOptions {
    /// Destination directory of the client bundle; enables client mode
    pub client: Option<String>,
    /// Resolve root for logical template names
    pub resolve: Option<String>,
    /// Keep loaded templates between renders
    pub cache: Option<bool>,
    /// Render sources to HTML
    pub render: Option<bool>,
    /// Compile sources to registration scripts
    pub compile: Option<bool>,
    /// Concatenate compiled output per destination
    pub concat: Option<bool>,
    /// JSON data file globs
    pub data: Option<OneOrMany>,
    /// Helper template globs, or client helper script globs in client mode
    pub helpers: Option<OneOrMany>,
    /// Keep template whitespace as written
    pub preserve_whitespace: Option<bool>,
    /// Template file extension
    pub extension: Option<String>,
    /// HTML-escape rendered expressions
    pub autoescape: Option<bool>,
    /// Directory of the engine's browser builds
    pub dist_dir: Option<PathBuf>,
    /// File name prefix of the browser builds
    pub dist_prefix: Option<String>,
    /// Bundle the built-in browser helpers
    pub builtin_helpers: Option<bool>,
    /// Bundle the engine's browser helper script
    pub engine_helpers: Option<bool>,
}

impl TargetOptions {
    /// Returns `overrides` laid over `self`: every option set in `overrides` wins.
    #[must_use]
    pub fn merge(&self, overrides: &TargetOptions) -> TargetOptions {
        TargetOptions {
            client: overrides.client.clone().or_else(|| self.client.clone()),
            resolve: overrides.resolve.clone().or_else(|| self.resolve.clone()),
            cache: overrides.cache.or(self.cache),
            render: overrides.render.or(self.render),
            compile: overrides.compile.or(self.compile),
            concat: overrides.concat.or(self.concat),
            data: overrides.data.clone().or_else(|| self.data.clone()),
            helpers: overrides.helpers.clone().or_else(|| self.helpers.clone()),
            preserve_whitespace: overrides.preserve_whitespace.or(self.preserve_whitespace),
            extension: overrides.extension.clone().or_else(|| self.extension.clone()),
            autoescape: overrides.autoescape.or(self.autoescape),
            dist_dir: overrides.dist_dir.clone().or_else(|| self.dist_dir.clone()),
            dist_prefix: overrides.dist_prefix.clone().or_else(|| self.dist_prefix.clone()),
            builtin_helpers: overrides.builtin_helpers.or(self.builtin_helpers),
            engine_helpers: overrides.engine_helpers.or(self.engine_helpers),
        }
    }

    /// Fills unset options with their defaults.
    pub fn resolve(&self) -> TaskOptions {
        TaskOptions {
            client: self.client.clone().filter(|dest| !dest.is_empty()).map(PathBuf::from),
            resolve: self.resolve.clone().unwrap_or_default(),
            cache: self.cache.unwrap_or(false),
            render: self.render.unwrap_or(false),
            compile: self.compile.unwrap_or(false),
            concat: self.concat.unwrap_or(false),
            data: self.data.as_ref().map(OneOrMany::to_vec).unwrap_or_default(),
            helpers: self.helpers.as_ref().map(OneOrMany::to_vec).unwrap_or_default(),
            whitespace: Whitespace::from_preserve(self.preserve_whitespace.unwrap_or(true)),
            extension: self
                .extension
                .as_deref()
                .map(|ext| ext.trim_start_matches('.').to_string())
                .unwrap_or_else(|| DEFAULT_TEMPLATE_EXTENSION.to_string()),
            autoescape: self.autoescape.unwrap_or(true),
            dist_dir: self.dist_dir.clone().unwrap_or_else(|| PathBuf::from(DEFAULT_DIST_DIR)),
            dist_prefix: self.dist_prefix.clone().unwrap_or_else(|| DEFAULT_DIST_PREFIX.to_string()),
            builtin_helpers: self.builtin_helpers.unwrap_or(false),
            engine_helpers: self.engine_helpers.unwrap_or(false),
        }
    }
}

/// Fully resolved options of one target run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskOptions {
    /// Client bundle destination; `Some` switches the target to client mode
    pub client: Option<PathBuf>,
    /// Resolve root
    pub resolve: String,
    /// Keep loaded templates between renders
    pub cache: bool,
    /// Render sources
    pub render: bool,
    /// Compile sources
    pub compile: bool,
    /// Default concatenation flag for file groups
    pub concat: bool,
    /// Data globs
    pub data: Vec<String>,
    /// Helper globs
    pub helpers: Vec<String>,
    /// Whitespace mode
    pub whitespace: Whitespace,
    /// Template extension, without the dot
    pub extension: String,
    /// HTML-escape rendered expressions
    pub autoescape: bool,
    /// Directory of the engine's browser builds
    pub dist_dir: PathBuf,
    /// File name prefix of the browser builds
    pub dist_prefix: String,
    /// Bundle built-in browser helpers
    pub builtin_helpers: bool,
    /// Bundle the engine's browser helper script
    pub engine_helpers: bool,
}

impl Default for TaskOptions {
    fn default() -> Self {
        TargetOptions::default().resolve()
    }
}

/// One `[[targets.files]]` entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileGroup {
    /// Source globs, relative to `cwd`
    #[serde(default)]
    pub src: OneOrMany,
    /// Destination file, or directory in expand mode
    pub dest: Option<String>,
    /// Base directory of the source globs
    pub cwd: Option<String>,
    /// Map each source to its own destination below `dest`
    #[serde(default)]
    pub expand: bool,
    /// Replacement extension in expand mode
    pub ext: Option<String>,
    /// Overrides the target's `concat`
    pub concat: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = TaskOptions::default();
        assert_eq!(options.client, None);
        assert!(!options.render && !options.compile && !options.cache && !options.concat);
        assert_eq!(options.whitespace, Whitespace::Preserve);
        assert_eq!(options.extension, "tera");
        assert!(options.autoescape);
        assert_eq!(options.dist_prefix, "engine");
    }

    #[test]
    fn test_target_overrides_project_options() {
        let project = TargetOptions {
            resolve: Some("templates/".to_string()),
            cache: Some(true),
            ..TargetOptions::default()
        };
        let target = TargetOptions {
            cache: Some(false),
            render: Some(true),
            extension: Some(".html.tera".to_string()),
            ..TargetOptions::default()
        };

        let resolved = project.merge(&target).resolve();
        assert_eq!(resolved.resolve, "templates/");
        assert!(!resolved.cache);
        assert!(resolved.render);
        assert_eq!(resolved.extension, "html.tera");
    }

    #[test]
    fn test_empty_client_is_off() {
        let options = TargetOptions {
            client: Some(String::new()),
            ..TargetOptions::default()
        };
        assert_eq!(options.resolve().client, None);
    }

    #[test]
    fn test_one_or_many() {
        #[derive(Deserialize)]
        struct Holder {
            src: OneOrMany,
        }

        let one: Holder = toml::from_str(r#"src = "a/*.tera""#).unwrap();
        let many: Holder = toml::from_str(r#"src = ["a/*.tera", "b/*.tera"]"#).unwrap();
        assert_eq!(one.src.to_vec(), vec!["a/*.tera"]);
        assert_eq!(many.src.to_vec(), vec!["a/*.tera", "b/*.tera"]);
    }
}
