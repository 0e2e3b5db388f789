//! Discovery of the templates a source refers to.
//!
//! Tera resolves `include`, `extends` and `import` only among templates it already
//! holds, so the engine scans every source it loads and asks the partial loader for
//! each referenced name before rendering.

use regex::Regex;

/// How a template refers to another one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DependencyKind {
    /// `{% include "name" %}`
    Include,
    /// `{% extends "name" %}`
    Extends,
    /// `{% import "name" as alias %}`
    Import,
}

/// A reference from one template to another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    /// Candidate names in order; the first one that loads is used
    pub candidates: Vec<String>,
    /// Tag the reference came from
    pub kind: DependencyKind,
    /// `ignore missing` was given, so failing to load every candidate is not an error
    pub optional: bool,
}

impl Dependency {
    /// The preferred candidate.
    pub fn name(&self) -> &str {
        self.candidates.first().map_or("", String::as_str)
    }
}

/// Lists the references made by `source`, one per tag, in order of appearance.
///
/// Tags inside `{% raw %}` blocks and `{# #}` comments are ignored. An include of
/// several candidates (`{% include ["a", "b"] %}`) keeps them together in one
/// dependency.
///
/// # Examples
///
/// ```
/// use stencil_cli::engine::dependencies::{DependencyKind, find_dependencies};
///
/// let deps = find_dependencies(r#"{% extends "layouts/base" %}{% include "footer" ignore missing %}"#);
/// assert_eq!(deps[0].name(), "layouts/base");
/// assert_eq!(deps[0].kind, DependencyKind::Extends);
/// assert!(deps[1].optional);
/// ```
pub fn find_dependencies(source: &str) -> Vec<Dependency> {
    let (Ok(raw_block), Ok(comment), Ok(tag), Ok(quoted)) = (
        Regex::new(r"(?s)\{%-?\s*raw\s*-?%\}.*?\{%-?\s*endraw\s*-?%\}"),
        Regex::new(r"(?s)\{#.*?#\}"),
        Regex::new(r"(?s)\{%-?\s*(include|extends|import)\s+(.+?)\s*-?%\}"),
        Regex::new(r#""([^"]*)"|'([^']*)'|`([^`]*)`"#),
    ) else {
        return Vec::new();
    };

    let source = raw_block.replace_all(source, "");
    let source = comment.replace_all(&source, "");
    let mut dependencies = Vec::new();

    for caps in tag.captures_iter(&source) {
        let kind = match &caps[1] {
            "include" => DependencyKind::Include,
            "extends" => DependencyKind::Extends,
            _ => DependencyKind::Import,
        };
        let args = &caps[2];
        let optional = kind == DependencyKind::Include && args.contains("ignore missing");

        let names = quoted.captures_iter(args).filter_map(|q| {
            q.get(1).or_else(|| q.get(2)).or_else(|| q.get(3)).map(|m| m.as_str().to_string())
        });

        // Only includes accept a list of candidates.
        let candidates: Vec<String> = if kind == DependencyKind::Include {
            names.collect()
        } else {
            names.take(1).collect()
        };

        if !candidates.is_empty() {
            dependencies.push(Dependency {
                candidates,
                kind,
                optional,
            });
        }
    }

    dependencies
}
