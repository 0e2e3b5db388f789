//! Tera wrapper used by the adapter.
//!
//! The engine owns two layers of templates:
//!
//! - a **base** [`Tera`] holding filters, functions and helper (macro library)
//!   templates, which survive [`Engine::clear_cache`];
//! - the **loaded sources**, every page and partial pulled in for rendering, which
//!   are forgotten by [`Engine::clear_cache`].
//!
//! Tera only resolves `include`/`extends`/`import` against templates it already
//! holds. Before rendering, [`Engine::render`] scans the requested template for
//! references (see [`dependencies`]) and asks a [`PartialLoader`] for every unknown
//! name, recursively. That loader is the on-load hook the adapter plugs its partial
//! registry into.
//!
//! [`Engine::compile`] turns a source into a script registering it with the
//! browser-side loader:
//!
//! ```text
//! (function(){templates.register("pages/index","<p>{{ title }}</p>");})();
//! ```

pub mod dependencies;
pub mod error;
pub mod whitespace;

use std::collections::{BTreeMap, HashSet, VecDeque};

use serde_json::Value;
use tera::{Context, Tera};
use tracing::{debug, trace};

use crate::constants::CLIENT_REGISTRY;
pub use dependencies::{Dependency, DependencyKind, find_dependencies};
pub use error::{BoxError, EngineError, format_tera_error};
pub use whitespace::Whitespace;

/// Supplies the source of a template the engine does not hold yet.
pub trait PartialLoader {
    /// Returns the source of the template called `name`.
    fn load(&mut self, name: &str) -> Result<String, BoxError>;
}

impl<F> PartialLoader for F
where
    F: FnMut(&str) -> Result<String, BoxError>,
{
    fn load(&mut self, name: &str) -> Result<String, BoxError> {
        self(name)
    }
}

/// The Tera engine plus the set of loaded template sources.
#[derive(Clone)]
pub struct Engine {
    base: Tera,
    tera: Tera,
    sources: BTreeMap<String, String>,
    helper_names: HashSet<String>,
    /// `tera` no longer reflects `base` + `sources`
    dirty: bool,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("sources", &self.sources.keys().collect::<Vec<_>>())
            .field("helper_names", &self.helper_names)
            .finish_non_exhaustive()
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Engine {
    /// Creates an engine. With `autoescape` every template's output is HTML-escaped
    /// regardless of its name; without it nothing is.
    pub fn new(autoescape: bool) -> Self {
        let mut base = Tera::default();
        if autoescape {
            base.autoescape_on(vec![""]);
        } else {
            base.autoescape_on(vec![]);
        }

        Self {
            tera: base.clone(),
            base,
            sources: BTreeMap::new(),
            helper_names: HashSet::new(),
            dirty: false,
        }
    }

    /// Registers a Tera filter available to every template.
    pub fn register_filter<F: tera::Filter + 'static>(&mut self, name: &str, filter: F) {
        debug!("Registering filter '{}'", name);
        self.base.register_filter(name, filter);
        self.dirty = true;
    }

    /// Registers a Tera function available to every template.
    pub fn register_function<F: tera::Function + 'static>(&mut self, name: &str, function: F) {
        debug!("Registering function '{}'", name);
        self.base.register_function(name, function);
        self.dirty = true;
    }

    /// Registers a helper template (typically a macro library) that is never
    /// cleared from the cache.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Syntax`] if the source does not parse.
    pub fn register_helper_template(&mut self, name: &str, source: &str) -> Result<(), EngineError> {
        self.validate(name, source)?;
        self.base.add_raw_template(name, source).map_err(|e| EngineError::Syntax {
            name: name.to_string(),
            message: format_tera_error(&e),
        })?;
        self.helper_names.insert(name.to_string());
        self.dirty = true;
        debug!("Registered helper template '{}'", name);
        Ok(())
    }

    /// Compiles a source into a script registering it with the browser loader.
    ///
    /// The source is formatted according to `whitespace` and checked for syntax
    /// errors. Referenced templates do not need to be known.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Syntax`] if the source does not parse.
    pub fn compile(&self, source: &str, name: &str, whitespace: Whitespace) -> Result<String, EngineError> {
        let formatted = whitespace.apply(source);
        self.validate(name, &formatted)?;

        let name_literal = serde_json::to_string(name).map_err(|e| EngineError::Syntax {
            name: name.to_string(),
            message: e.to_string(),
        })?;
        let source_literal =
            serde_json::to_string(formatted.as_ref()).map_err(|e| EngineError::Syntax {
                name: name.to_string(),
                message: e.to_string(),
            })?;

        Ok(format!(
            "(function(){{{CLIENT_REGISTRY}.register({name_literal},{source_literal});}})();"
        ))
    }

    /// Registers `source` under `name`, replacing any previous source of that name.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Syntax`] if the source does not parse.
    pub fn load_source(&mut self, name: &str, source: &str, whitespace: Whitespace) -> Result<(), EngineError> {
        let formatted = whitespace.apply(source);
        self.validate(name, &formatted)?;
        trace!("Loaded template '{}' ({} bytes)", name, formatted.len());
        self.sources.insert(name.to_string(), formatted.into_owned());
        self.dirty = true;
        Ok(())
    }

    /// Renders the template called `name` with `context`.
    ///
    /// Any template needed by `name` (itself included) that the engine does not hold
    /// is requested from `loader`, formatted with `whitespace` and kept until the
    /// next [`Engine::clear_cache`]. References marked `ignore missing` tolerate a
    /// failed load.
    ///
    /// # Errors
    ///
    /// - [`EngineError::PartialLoad`] when the loader fails for a required template
    /// - [`EngineError::Syntax`] when a loaded source does not parse
    /// - [`EngineError::Context`] when `context` is not a JSON object
    /// - [`EngineError::Render`] for anything Tera reports while rendering
    pub fn render(
        &mut self,
        name: &str,
        context: &Value,
        loader: &mut dyn PartialLoader,
        whitespace: Whitespace,
    ) -> Result<String, EngineError> {
        self.ensure_loaded(name, loader, whitespace)?;
        self.rebuild()?;

        let context = Context::from_value(context.clone())
            .map_err(|e| EngineError::Context(format_tera_error(&e)))?;

        debug!("Rendering template '{}'", name);
        self.tera.render(name, &context).map_err(|e| EngineError::Render {
            name: name.to_string(),
            message: format_tera_error(&e),
        })
    }

    /// Forgets every loaded source. Filters, functions and helper templates stay.
    pub fn clear_cache(&mut self) {
        if !self.sources.is_empty() {
            trace!("Clearing {} cached templates", self.sources.len());
            self.sources.clear();
            self.dirty = true;
        }
    }

    /// Whether a template called `name` is currently known.
    pub fn is_loaded(&self, name: &str) -> bool {
        self.sources.contains_key(name) || self.helper_names.contains(name)
    }

    /// Names of the loaded sources, sorted.
    pub fn loaded_names(&self) -> Vec<String> {
        self.sources.keys().cloned().collect()
    }

    /// Names of the registered helper templates, sorted.
    pub fn helper_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.helper_names.iter().cloned().collect();
        names.sort();
        names
    }

    /// Walks the references of `name`, loading whatever is missing.
    fn ensure_loaded(
        &mut self,
        name: &str,
        loader: &mut dyn PartialLoader,
        whitespace: Whitespace,
    ) -> Result<(), EngineError> {
        let mut queue = VecDeque::from([(vec![name.to_string()], false)]);
        let mut visited = HashSet::new();

        while let Some((candidates, optional)) = queue.pop_front() {
            let Some(current) = self.load_first(&candidates, optional, loader, whitespace)? else {
                continue;
            };
            if !visited.insert(current.clone()) {
                continue;
            }

            if let Some(source) = self.sources.get(&current) {
                for dependency in find_dependencies(source) {
                    trace!("'{}' references {:?} ({:?})", current, dependency.candidates, dependency.kind);
                    queue.push_back((dependency.candidates, dependency.optional));
                }
            }
        }

        Ok(())
    }

    /// Loads the first of `candidates` the loader can provide and returns its name.
    ///
    /// Returns `None` for a helper template, which has nothing left to walk, and for
    /// an optional reference none of whose candidates load. Otherwise a reference
    /// that cannot be satisfied fails with the error of its last candidate.
    fn load_first(
        &mut self,
        candidates: &[String],
        optional: bool,
        loader: &mut dyn PartialLoader,
        whitespace: Whitespace,
    ) -> Result<Option<String>, EngineError> {
        let mut failure = None;

        for candidate in candidates {
            if self.helper_names.contains(candidate) {
                return Ok(None);
            }
            if self.sources.contains_key(candidate) {
                return Ok(Some(candidate.clone()));
            }
            match loader.load(candidate) {
                Ok(source) => {
                    self.load_source(candidate, &source, whitespace)?;
                    return Ok(Some(candidate.clone()));
                }
                Err(e) => {
                    trace!("Candidate '{}' did not load: {}", candidate, e);
                    failure = Some((candidate.clone(), e));
                }
            }
        }

        match failure {
            Some((name, e)) if optional => {
                debug!("Skipping optional template '{}': {}", name, e);
                Ok(None)
            }
            Some((name, source)) => Err(EngineError::PartialLoad { name, source }),
            None => Ok(None),
        }
    }

    /// Rebuilds the working Tera from the base and the loaded sources if needed.
    fn rebuild(&mut self) -> Result<(), EngineError> {
        if !self.dirty {
            return Ok(());
        }

        let mut tera = self.base.clone();
        tera.add_raw_templates(self.sources.iter().map(|(name, source)| (name.as_str(), source.as_str())))
            .map_err(|e| EngineError::Syntax {
                name: first_template_name(&e).unwrap_or_default(),
                message: format_tera_error(&e),
            })?;

        self.tera = tera;
        self.dirty = false;
        Ok(())
    }

    /// Parses `source` in a scratch instance where every `extends`/`import` target
    /// exists, so only the template's own syntax is checked.
    fn validate(&self, name: &str, source: &str) -> Result<(), EngineError> {
        let mut scratch = self.base.clone();
        let stubs: Vec<(String, String)> = find_dependencies(source)
            .into_iter()
            .filter(|d| d.kind != DependencyKind::Include && d.name() != name)
            .filter(|d| !self.helper_names.contains(d.name()))
            .map(|d| (d.name().to_string(), String::new()))
            .collect();

        for (stub, content) in &stubs {
            scratch.add_raw_template(stub, content).map_err(|e| EngineError::Syntax {
                name: name.to_string(),
                message: format_tera_error(&e),
            })?;
        }

        scratch.add_raw_template(name, source).map_err(|e| EngineError::Syntax {
            name: name.to_string(),
            message: format_tera_error(&e),
        })
    }
}

/// Pulls the first quoted template name out of a Tera error message.
fn first_template_name(error: &tera::Error) -> Option<String> {
    let message = error.to_string();
    let start = message.find('\'')? + 1;
    let end = start + message[start..].find('\'')?;
    Some(message[start..end].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    fn loader_from(templates: &[(&str, &str)]) -> impl FnMut(&str) -> Result<String, BoxError> {
        let map: HashMap<String, String> =
            templates.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |name: &str| map.get(name).cloned().ok_or_else(|| format!("no template '{name}'").into())
    }

    #[test]
    fn test_compile_emits_register_call() {
        let engine = Engine::new(true);
        let script = engine.compile("<p>{{ title }}</p>\n", "pages/index", Whitespace::Preserve).unwrap();
        assert_eq!(
            script,
            r#"(function(){templates.register("pages/index","<p>{{ title }}</p>\n");})();"#
        );
    }

    #[test]
    fn test_compile_minify_and_unknown_parent() {
        let engine = Engine::new(true);
        let source = "{% extends \"layouts/base\" %}\n{% block body %}\n  <p>x</p>\n{% endblock %}";
        let script = engine.compile(source, "page", Whitespace::Minify).unwrap();
        assert!(script.contains(r#"{% block body %}<p>x</p>{% endblock %}"#));
    }

    #[test]
    fn test_minify_accepts_multiline_tags() {
        let engine = Engine::new(true);
        let source = "{% for item in\n    items %}\n  <li>{{ item }}</li>\n{% endfor %}";
        let script = engine.compile(source, "list", Whitespace::Minify).unwrap();
        assert!(script.contains("{% for item in items %}<li>{{ item }}</li>{% endfor %}"));

        let mut engine = Engine::new(true);
        let mut loader = loader_from(&[("page", "{% if a\n  or b %}\n  yes\n{% endif %}")]);
        let html = engine.render("page", &json!({"a": false, "b": true}), &mut loader, Whitespace::Minify).unwrap();
        assert_eq!(html, "yes");
    }

    #[test]
    fn test_compile_syntax_error() {
        let engine = Engine::new(true);
        let err = engine.compile("{% if %}", "broken", Whitespace::Preserve).unwrap_err();
        assert!(matches!(err, EngineError::Syntax { ref name, .. } if name == "broken"));
    }

    #[test]
    fn test_render_loads_partials_through_loader() {
        let mut engine = Engine::new(true);
        let mut loader = loader_from(&[
            ("page", r#"{% extends "base" %}{% block body %}{% include "footer" %}{% endblock %}"#),
            ("base", "<main>{% block body %}{% endblock %}</main>"),
            ("footer", "<footer>{{ year }}</footer>"),
        ]);

        let html = engine.render("page", &json!({"year": 2024}), &mut loader, Whitespace::Preserve).unwrap();
        assert_eq!(html, "<main><footer>2024</footer></main>");
        assert_eq!(engine.loaded_names(), vec!["base", "footer", "page"]);
    }

    #[test]
    fn test_render_missing_partial_is_partial_load_error() {
        let mut engine = Engine::new(true);
        let mut loader = loader_from(&[("page", r#"{% include "nope" %}"#)]);

        let err = engine.render("page", &json!({}), &mut loader, Whitespace::Preserve).unwrap_err();
        assert!(matches!(err, EngineError::PartialLoad { ref name, .. } if name == "nope"));
    }

    #[test]
    fn test_render_ignore_missing_tolerates_absent_partial() {
        let mut engine = Engine::new(true);
        let mut loader = loader_from(&[("page", r#"a{% include "nope" ignore missing %}b"#)]);

        let html = engine.render("page", &json!({}), &mut loader, Whitespace::Preserve).unwrap();
        assert_eq!(html, "ab");
    }

    #[test]
    fn test_render_skips_commented_out_include() {
        let mut engine = Engine::new(true);
        let mut loader = loader_from(&[("page", r#"a{# {% include "old/gone" %} #}b"#)]);

        let html = engine.render("page", &json!({}), &mut loader, Whitespace::Preserve).unwrap();
        assert_eq!(html, "ab");
    }

    #[test]
    fn test_render_include_list_uses_first_available_candidate() {
        let mut engine = Engine::new(true);
        let mut loader = loader_from(&[("page", r#"{% include ["custom/nav", "nav"] %}"#), ("nav", "NAV")]);

        let html = engine.render("page", &json!({}), &mut loader, Whitespace::Preserve).unwrap();
        assert_eq!(html, "NAV");
        assert_eq!(engine.loaded_names(), vec!["nav", "page"]);
    }

    #[test]
    fn test_render_include_list_fails_when_no_candidate_loads() {
        let mut engine = Engine::new(true);
        let mut loader = loader_from(&[("page", r#"{% include ["custom/nav", "nav"] %}"#)]);

        let err = engine.render("page", &json!({}), &mut loader, Whitespace::Preserve).unwrap_err();
        assert!(matches!(err, EngineError::PartialLoad { ref name, .. } if name == "nav"));
    }

    #[test]
    fn test_autoescape_toggle() {
        let mut loader = loader_from(&[("page", "{{ html }}")]);
        let context = json!({"html": "<b>"});

        let mut escaping = Engine::new(true);
        assert_eq!(escaping.render("page", &context, &mut loader, Whitespace::Preserve).unwrap(), "&lt;b&gt;");

        let mut raw = Engine::new(false);
        assert_eq!(raw.render("page", &context, &mut loader, Whitespace::Preserve).unwrap(), "<b>");
    }

    #[test]
    fn test_clear_cache_keeps_helpers() {
        let mut engine = Engine::new(true);
        engine
            .register_helper_template("format", r#"{% macro shout(text) %}{{ text | upper }}!{% endmacro %}"#)
            .unwrap();
        engine.load_source("page", r#"{% import "format" as f %}{{ f::shout(text="hi") }}"#, Whitespace::Preserve)
            .unwrap();

        let mut loader = loader_from(&[]);
        assert_eq!(engine.render("page", &json!({}), &mut loader, Whitespace::Preserve).unwrap(), "HI!");

        engine.clear_cache();
        assert!(!engine.is_loaded("page"));
        assert!(engine.is_loaded("format"));
    }

    #[test]
    fn test_registered_filter_is_available() {
        let mut engine = Engine::new(true);
        engine.register_filter(
            "twice",
            |value: &Value, _: &HashMap<String, Value>| -> tera::Result<Value> {
                Ok(Value::String(format!("{0}{0}", value.as_str().unwrap_or_default())))
            },
        );
        engine.load_source("page", "{{ word | twice }}", Whitespace::Preserve).unwrap();

        let mut loader = loader_from(&[]);
        let html = engine.render("page", &json!({"word": "ab"}), &mut loader, Whitespace::Preserve).unwrap();
        assert_eq!(html, "abab");
    }

    #[test]
    fn test_context_must_be_object() {
        let mut engine = Engine::new(true);
        engine.load_source("page", "x", Whitespace::Preserve).unwrap();
        let mut loader = loader_from(&[]);

        let err = engine.render("page", &json!([1, 2]), &mut loader, Whitespace::Preserve).unwrap_err();
        assert!(matches!(err, EngineError::Context(_)));
    }
}
