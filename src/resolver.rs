//! Mapping between template files and logical template names.
//!
//! A template's logical name is its path relative to the resolve root, with `/`
//! separators and without the extension: with root `templates/`,
//! `templates/pages/index.tera` is known to the engine as `pages/index`, and
//! `{% include "pages/index" %}` loads that file back.
//!
//! The free functions are pure string/path transformations. [`PartialResolver`]
//! bundles the project directory, the root and the extension so the adapter can go
//! both ways without repeating its configuration.

use regex::Regex;
use std::path::{Path, PathBuf};
use strsim::levenshtein;
use tracing::trace;
use walkdir::WalkDir;

use crate::constants::MAX_PARTIAL_SUGGESTIONS;

/// Maximum allowed Levenshtein distance as a percentage of the name length.
const SIMILARITY_THRESHOLD_PERCENT: usize = 50;

/// Computes the logical name of `path` relative to `root`.
///
/// Trailing slashes are removed from `root`, then the first occurrence of `root` is
/// removed from `path`, followed by a leading `/` and a trailing `.ext` suffix.
/// Backslashes are treated as `/`. An empty `root` returns `path` unchanged.
///
/// When `root` is not actually a prefix of `path` this is still a plain substring
/// removal, so the result is deterministic but not necessarily a sensible name.
///
/// # Examples
///
/// ```
/// use stencil_cli::resolver::resolve_name;
///
/// assert_eq!(resolve_name("res/partials/services/blabla.mustache", "res/partials/"), "services/blabla");
/// assert_eq!(resolve_name("a/b.tera", ""), "a/b.tera");
/// ```
pub fn resolve_name(path: &str, root: &str) -> String {
    if root.is_empty() {
        return path.to_string();
    }

    let path = path.replace('\\', "/");
    let root = root.replace('\\', "/");
    let root = root.trim_end_matches('/');

    let relative = path.replacen(root, "", 1);
    let relative = relative.strip_prefix('/').unwrap_or(&relative);
    strip_extension(relative)
}

/// Builds the file path of a logical name: `cwd/root/name.extension`.
///
/// # Examples
///
/// ```
/// use stencil_cli::resolver::resolve_path;
/// use std::path::{Path, PathBuf};
///
/// let path = resolve_path(Path::new("/site"), "templates/", "pages/index", "tera");
/// assert_eq!(path, PathBuf::from("/site/templates/pages/index.tera"));
/// ```
pub fn resolve_path(cwd: &Path, root: &str, name: &str, extension: &str) -> PathBuf {
    let base = if root.is_empty() {
        cwd.to_path_buf()
    } else {
        cwd.join(root)
    };
    base.join(format!("{name}.{extension}"))
}

/// Removes a trailing `.ext` (dot followed by word characters).
fn strip_extension(name: &str) -> String {
    match Regex::new(r"\.\w*$") {
        Ok(re) => re.replace(name, "").into_owned(),
        Err(_) => name.to_string(),
    }
}

/// Two-way mapping between template files and logical names for one project.
#[derive(Debug, Clone)]
pub struct PartialResolver {
    cwd: PathBuf,
    root: String,
    extension: String,
}

impl PartialResolver {
    /// Creates a resolver for templates under `cwd/root` with the given extension
    /// (without the leading dot).
    pub fn new(cwd: impl Into<PathBuf>, root: impl Into<String>, extension: impl Into<String>) -> Self {
        Self {
            cwd: cwd.into(),
            root: root.into(),
            extension: extension.into().trim_start_matches('.').to_string(),
        }
    }

    /// Project directory paths are resolved against.
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Resolve root, as configured.
    pub fn root(&self) -> &str {
        &self.root
    }

    /// Template file extension, without the dot.
    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Logical name of a template file.
    ///
    /// `path` may be absolute or relative to the project directory. The extension is
    /// always stripped, even without a resolve root.
    pub fn name_of(&self, path: &Path) -> String {
        let relative = path.strip_prefix(&self.cwd).unwrap_or(path);
        let relative = relative.to_string_lossy().replace('\\', "/");

        let name = if self.root.is_empty() {
            strip_extension(&relative)
        } else {
            resolve_name(&relative, &self.root)
        };
        trace!("Resolved {} to template name '{}'", path.display(), name);
        name
    }

    /// File path of a logical name.
    pub fn path_of(&self, name: &str) -> PathBuf {
        resolve_path(&self.cwd, &self.root, name, &self.extension)
    }

    /// Existing template names closest to `name`, best match first.
    ///
    /// Scans the resolve root for files with the configured extension. Returns an
    /// empty list when the root does not exist or nothing is close enough.
    pub fn suggest(&self, name: &str) -> Vec<String> {
        let base = self.cwd.join(&self.root);
        if !base.is_dir() {
            return Vec::new();
        }

        let available: Vec<String> = WalkDir::new(&base)
            .follow_links(false)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_file())
            .filter(|entry| {
                entry.path().extension().is_some_and(|ext| ext.to_string_lossy() == self.extension)
            })
            .map(|entry| self.name_of(entry.path()))
            .collect();

        find_similar_names(name, &available)
    }
}

/// Finds similar names using Levenshtein distance, closest first.
fn find_similar_names(target: &str, available: &[String]) -> Vec<String> {
    let max_distance = (target.len() * SIMILARITY_THRESHOLD_PERCENT / 100).max(1);

    let mut scored: Vec<_> = available
        .iter()
        .filter(|candidate| candidate.as_str() != target)
        .map(|candidate| (candidate.clone(), levenshtein(target, candidate)))
        .filter(|(_, distance)| *distance <= max_distance)
        .collect();

    scored.sort_by(|(a, da), (b, db)| da.cmp(db).then_with(|| a.cmp(b)));
    scored.into_iter().take(MAX_PARTIAL_SUGGESTIONS).map(|(name, _)| name).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_resolve_name_strips_root_and_extension() {
        assert_eq!(
            resolve_name("res/partials/services/blabla.mustache", "res/partials/"),
            "services/blabla"
        );
        assert_eq!(resolve_name("templates/pages/index.tera", "templates"), "pages/index");
        assert_eq!(resolve_name("templates\\pages\\index.tera", "templates\\"), "pages/index");
    }

    #[test]
    fn test_resolve_name_empty_root_is_identity() {
        assert_eq!(resolve_name("pages/index.tera", ""), "pages/index.tera");
    }

    #[test]
    fn test_resolve_name_non_prefix_root_is_substring_removal() {
        assert_eq!(resolve_name("x/templates/a.tera", "templates"), "x//a");
    }

    #[test]
    fn test_resolve_path_joins_components() {
        assert_eq!(
            resolve_path(Path::new("/site"), "templates/", "pages/index", "tera"),
            PathBuf::from("/site/templates/pages/index.tera")
        );
        assert_eq!(
            resolve_path(Path::new("/site"), "", "footer", "tera"),
            PathBuf::from("/site/footer.tera")
        );
    }

    #[test]
    fn test_name_of_path_of_round_trip() {
        let resolver = PartialResolver::new("/site", "templates/", "tera");
        for name in ["footer", "pages/index", "layouts/nested/base"] {
            assert_eq!(resolver.name_of(&resolver.path_of(name)), name);
        }

        let flat = PartialResolver::new("/site", "", ".tera");
        assert_eq!(flat.name_of(&flat.path_of("footer")), "footer");
    }

    #[test]
    fn test_name_of_accepts_relative_paths() {
        let resolver = PartialResolver::new("/site", "templates/", "tera");
        assert_eq!(resolver.name_of(Path::new("templates/pages/about.tera")), "pages/about");
    }

    #[test]
    fn test_suggest_finds_close_names() {
        let temp = TempDir::new().unwrap();
        let partials = temp.path().join("templates/partials");
        std::fs::create_dir_all(&partials).unwrap();
        std::fs::write(partials.join("header.tera"), "").unwrap();
        std::fs::write(partials.join("footer.tera"), "").unwrap();
        std::fs::write(partials.join("notes.txt"), "").unwrap();

        let resolver = PartialResolver::new(temp.path(), "templates", "tera");
        let suggestions = resolver.suggest("partials/heade");
        assert_eq!(suggestions.first().map(String::as_str), Some("partials/header"));
        assert!(!suggestions.iter().any(|s| s.ends_with("notes")));
        assert!(resolver.suggest("zzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzz").is_empty());
    }

    #[test]
    fn test_suggest_missing_root_is_empty() {
        let resolver = PartialResolver::new("/definitely/not/here", "templates", "tera");
        assert!(resolver.suggest("anything").is_empty());
    }
}
