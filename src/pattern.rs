//! Glob expansion for source, data and helper patterns.
//!
//! Every file list in `stencil.toml` is a glob evaluated relative to a base directory
//! (the project directory, or a file group's `cwd`).
//!
//! # Pattern Syntax
//!
//! - `*` matches any sequence of characters within a single path component
//! - `**` matches any sequence of path components (recursive matching)
//! - `?` matches any single character
//! - `[abc]` / `[a-z]` match a character set or range
//! - `{foo,bar}` matches either "foo" or "bar" (brace expansion, not nested)
//!
//! A pattern without any of these characters is a literal path. Literal paths are
//! returned as-is whether or not they exist, so callers can report the missing ones.
//!
//! An absolute pattern (`/srv/shared/*.json`) ignores the base directory and yields
//! absolute paths.
//!
//! # Ordering
//!
//! Matches of one pattern are returned sorted. Brace alternatives are expanded in the
//! order written, so `{b,a}/*.tera` lists the `b` matches before the `a` matches.

use anyhow::{Context, Result};
use glob::{MatchOptions, Pattern};
use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, trace};
use walkdir::WalkDir;

const GLOB_CHARS: &[char] = &['*', '?', '[', '{'];

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Pattern matcher for file discovery below a base directory.
///
/// # Examples
///
/// ```rust,no_run
/// use stencil_cli::pattern::PatternMatcher;
/// use std::path::Path;
///
/// # fn example() -> anyhow::Result<()> {
/// let matcher = PatternMatcher::new("templates/{pages,elements}/*.tera")?;
///
/// assert!(matcher.matches(Path::new("templates/pages/index.tera")));
/// assert!(!matcher.matches(Path::new("templates/pages/nested/deep.tera")));
///
/// let matches = matcher.find_matches(Path::new("/path/to/project"))?;
/// println!("Found {} templates", matches.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct PatternMatcher {
    /// One compiled pattern per brace alternative, in written order
    alternatives: Vec<(Pattern, PathBuf)>,
    original_pattern: String,
}

impl PatternMatcher {
    /// Compiles a glob pattern, expanding `{a,b}` alternatives first.
    ///
    /// # Errors
    ///
    /// Returns an error if any alternative is not valid glob syntax.
    pub fn new(pattern_str: &str) -> Result<Self> {
        let normalized = pattern_str.replace('\\', "/");
        let alternatives = expand_braces(&normalized)
            .into_iter()
            .map(|alternative| {
                let pattern = Pattern::new(&alternative)
                    .with_context(|| format!("Invalid glob pattern: {pattern_str}"))?;
                Ok((pattern, literal_prefix(&alternative)))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            alternatives,
            original_pattern: pattern_str.to_string(),
        })
    }

    /// Returns true when the pattern contains no glob syntax at all.
    pub fn is_literal(pattern_str: &str) -> bool {
        !pattern_str.contains(GLOB_CHARS)
    }

    /// Finds all files below `base_path` matching the pattern.
    ///
    /// Walking starts at the literal prefix of each alternative (`templates/pages` for
    /// `templates/pages/*.tera`) rather than at the base, so unrelated directories are
    /// never traversed. Symlinks are not followed. Returned paths are relative to
    /// `base_path`, except for absolute alternatives, whose matches stay absolute.
    ///
    /// # Errors
    ///
    /// Returns an error if `base_path` does not exist.
    pub fn find_matches(&self, base_path: &Path) -> Result<Vec<PathBuf>> {
        debug!("Searching for pattern '{}' in {}", self.original_pattern, base_path.display());

        if !base_path.exists() {
            anyhow::bail!("Pattern base directory does not exist: {}", base_path.display());
        }

        let mut seen = HashSet::new();
        let mut matches = Vec::new();

        for (pattern, prefix) in &self.alternatives {
            let start = base_path.join(prefix);
            if !start.exists() {
                trace!("Skipping missing pattern root {}", start.display());
                continue;
            }

            let absolute = is_absolute_pattern(pattern);
            let mut found: Vec<PathBuf> = WalkDir::new(&start)
                .follow_links(false)
                .into_iter()
                .filter_map(std::result::Result::ok)
                .filter(|entry| entry.file_type().is_file())
                .filter_map(|entry| {
                    let candidate = if absolute {
                        entry.path().to_path_buf()
                    } else {
                        entry.path().strip_prefix(base_path).ok()?.to_path_buf()
                    };
                    let candidate_str = slash_path(&candidate, absolute);
                    trace!("Checking path: {}", candidate_str);
                    pattern.matches_with(&candidate_str, MATCH_OPTIONS).then_some(candidate)
                })
                .collect();
            found.sort();

            for path in found {
                if seen.insert(path.clone()) {
                    matches.push(path);
                }
            }
        }

        debug!("Found {} matches for pattern '{}'", matches.len(), self.original_pattern);
        Ok(matches)
    }

    /// Checks if a path matches any alternative of the pattern.
    ///
    /// Relative alternatives are checked against the path's normal components,
    /// absolute ones against the full path.
    pub fn matches(&self, path: &Path) -> bool {
        self.alternatives.iter().any(|(pattern, _)| {
            let absolute = is_absolute_pattern(pattern);
            pattern.matches_with(&slash_path(path, absolute), MATCH_OPTIONS)
        })
    }

    /// Returns the original pattern string.
    pub fn pattern(&self) -> &str {
        &self.original_pattern
    }
}

/// Expands a pattern relative to `base`.
///
/// Literal patterns are returned unchanged (relative to `base`) even if the file is
/// missing; glob patterns return only existing files.
///
/// # Examples
///
/// ```rust,no_run
/// use stencil_cli::pattern::expand;
/// use std::path::Path;
///
/// # fn example() -> anyhow::Result<()> {
/// for file in expand("data/*.json", Path::new("."))? {
///     println!("{}", file.display());
/// }
/// # Ok(())
/// # }
/// ```
pub fn expand(pattern: &str, base: &Path) -> Result<Vec<PathBuf>> {
    if PatternMatcher::is_literal(pattern) {
        return Ok(vec![PathBuf::from(pattern)]);
    }
    PatternMatcher::new(pattern)?.find_matches(base)
}

/// Expands several patterns, keeping pattern order and dropping duplicates.
pub fn expand_all<I, S>(patterns: I, base: &Path) -> Result<Vec<PathBuf>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    let mut files = Vec::new();
    for pattern in patterns {
        for file in expand(pattern.as_ref(), base)? {
            if seen.insert(file.clone()) {
                files.push(file);
            }
        }
    }
    Ok(files)
}

/// Expands the first `{a,b,...}` group recursively. Nested braces are not supported.
fn expand_braces(pattern: &str) -> Vec<String> {
    let Some(open) = pattern.find('{') else {
        return vec![pattern.to_string()];
    };
    let Some(close) = pattern[open..].find('}').map(|i| open + i) else {
        return vec![pattern.to_string()];
    };

    let (head, tail) = (&pattern[..open], &pattern[close + 1..]);
    pattern[open + 1..close]
        .split(',')
        .flat_map(|choice| expand_braces(&format!("{head}{choice}{tail}")))
        .collect()
}

/// Leading components of a pattern that contain no glob syntax.
fn literal_prefix(pattern: &str) -> PathBuf {
    let components: Vec<&str> = pattern.split('/').collect();
    // The last component names files, never a directory to start from.
    let literal: Vec<&str> = components[..components.len().saturating_sub(1)]
        .iter()
        .take_while(|component| !component.contains(GLOB_CHARS))
        .copied()
        .collect();

    let prefix = literal.join("/");
    if prefix.is_empty() && pattern.starts_with('/') {
        return PathBuf::from("/");
    }
    PathBuf::from(prefix)
}

fn is_absolute_pattern(pattern: &Pattern) -> bool {
    Path::new(pattern.as_str()).is_absolute()
}

fn slash_path(path: &Path, absolute: bool) -> String {
    if absolute {
        path.to_string_lossy().replace('\\', "/")
    } else {
        to_slash(path)
    }
}

fn to_slash(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            Component::ParentDir => Some("..".to_string()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
