//! Template adapter: the stateful façade the build runner and the web server use.
//!
//! An [`Adapter`] owns one [`Engine`], a persistent rendering context, and the partial
//! registry with its caching policy. It is created explicitly per target run (or per
//! server) and never shared implicitly.
//!
//! # Rendering
//!
//! [`Adapter::render`] maps a source path to its logical name, merges the
//! call-supplied context over the persistent one, and renders through the engine.
//! Partials are pulled in on demand from `<cwd>/<resolve>/<name>.<extension>`. Unless
//! caching is enabled the engine forgets every loaded template afterwards, so the
//! next render sees files as they are on disk.
//!
//! # Examples
//!
//! ```rust,no_run
//! use stencil_cli::adapter::{Adapter, AdapterOptions, RenderOptions};
//! use std::path::Path;
//!
//! # fn example() -> anyhow::Result<()> {
//! let mut adapter = Adapter::new(AdapterOptions {
//!     resolve: "templates/".to_string(),
//!     ..AdapterOptions::default()
//! });
//! adapter.data_glob("data/*.json")?;
//! adapter.register_helpers_glob("helpers/*.tera")?;
//!
//! let html = adapter.render(Path::new("templates/pages/index.tera"), None, None, RenderOptions::default())?;
//! println!("{html}");
//! # Ok(())
//! # }
//! ```

pub mod helpers;
pub mod partials;
pub mod report;
pub mod view;

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, info};

use crate::constants::DEFAULT_TEMPLATE_EXTENSION;
use crate::engine::{Engine, EngineError, Whitespace};
use crate::resolver::PartialResolver;
use crate::utils::{merge, name_of};

pub use helpers::{Helper, NameOf, TemplatePath, builtin_helpers};
pub use partials::{PartialEntry, PartialStore};
pub use report::{LoadFailure, LoadReport};

/// Errors raised by adapter operations.
#[derive(Error, Debug)]
pub enum AdapterError {
    /// A partial could not be found on disk (or was empty).
    #[error("Partial '{name}' not found at {}{}", .path.display(), rendering_note(.template))]
    PartialNotFound {
        /// Requested logical name
        name: String,
        /// Where it was looked for
        path: PathBuf,
        /// Source path of the template being rendered when the partial was requested
        template: Option<String>,
        /// Close existing names
        suggestions: Vec<String>,
    },

    /// A source file could not be read.
    #[error("Failed to read template source {}", .path.display())]
    Io {
        /// File that failed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// The engine rejected the template.
    #[error(transparent)]
    Engine(#[from] EngineError),
}

fn rendering_note(template: &Option<String>) -> String {
    template.as_ref().map(|t| format!(" (while rendering '{t}')")).unwrap_or_default()
}

/// Construction options for an [`Adapter`].
#[derive(Debug, Clone)]
pub struct AdapterOptions {
    /// Project directory; relative paths are resolved against it
    pub cwd: PathBuf,
    /// Resolve root, relative to `cwd`
    pub resolve: String,
    /// Keep loaded partials and templates between renders
    pub cache: bool,
    /// Template file extension, without the dot
    pub extension: String,
    /// HTML-escape every rendered expression
    pub autoescape: bool,
}

impl Default for AdapterOptions {
    fn default() -> Self {
        Self {
            cwd: PathBuf::from("."),
            resolve: String::new(),
            cache: false,
            extension: DEFAULT_TEMPLATE_EXTENSION.to_string(),
            autoescape: true,
        }
    }
}

/// Per-call options for [`Adapter::render`] and [`Adapter::compile`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// Whitespace handling for the template and any partial it loads
    pub whitespace: Whitespace,
}

impl RenderOptions {
    /// Options for the given whitespace mode.
    pub const fn with_whitespace(whitespace: Whitespace) -> Self {
        Self {
            whitespace,
        }
    }
}

/// Template engine façade with a persistent context and a partial registry.
#[derive(Debug)]
pub struct Adapter {
    engine: Engine,
    store: PartialStore,
    context: Map<String, Value>,
}

impl Adapter {
    /// Creates an adapter with the built-in helpers registered.
    pub fn new(options: AdapterOptions) -> Self {
        let resolver = PartialResolver::new(&options.cwd, options.resolve, options.extension);
        let mut adapter = Self {
            engine: Engine::new(options.autoescape),
            store: PartialStore::new(resolver, options.cache),
            context: Map::new(),
        };

        let report = adapter.register_capabilities(&builtin_helpers());
        debug!("Registered built-in helpers: {}", report.loaded.join(", "));
        adapter
    }

    /// Persistent rendering context.
    pub fn context(&self) -> &Map<String, Value> {
        &self.context
    }

    /// Mutable access to the persistent rendering context.
    pub fn context_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.context
    }

    /// Template layout used to map names and paths.
    pub fn resolver(&self) -> &PartialResolver {
        self.store.resolver()
    }

    /// Whether loaded templates are kept between renders.
    pub fn is_caching(&self) -> bool {
        self.store.is_caching()
    }

    /// Source path of the template currently being rendered, if any.
    pub fn current_template(&self) -> Option<&str> {
        self.store.current_template()
    }

    /// Registry entry for a partial, once it has been referenced.
    pub fn partial(&self, name: &str) -> Option<&PartialEntry> {
        self.store.entry(name)
    }

    /// The wrapped engine.
    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Mutable access to the wrapped engine, for registering filters directly.
    pub fn engine_mut(&mut self) -> &mut Engine {
        &mut self.engine
    }

    fn full_path(&self, path: &Path) -> PathBuf {
        self.store.resolver().cwd().join(path)
    }

    /// Loads JSON data files into the context, each under its basename.
    ///
    /// A key that already exists is replaced. Files that cannot be read or parsed are
    /// recorded in the report and skipped.
    pub fn data<P: AsRef<Path>>(&mut self, sources: &[P]) -> LoadReport {
        let mut report = LoadReport::default();

        for source in sources {
            let source = source.as_ref();
            let parsed = std::fs::read_to_string(self.full_path(source))
                .map_err(|e| e.to_string())
                .and_then(|content| serde_json::from_str::<Value>(&content).map_err(|e| e.to_string()));

            match parsed {
                Ok(value) => {
                    let key = name_of(source);
                    debug!("Loaded data file {} as '{}'", source.display(), key);
                    self.context.insert(key.clone(), value);
                    report.success(key);
                }
                Err(e) => report.failure("data file", source.display().to_string(), e),
            }
        }

        report
    }

    /// Expands `pattern` relative to the project directory and loads the matches as
    /// data files.
    ///
    /// # Errors
    ///
    /// Fails only if the pattern is not valid glob syntax.
    pub fn data_glob(&mut self, pattern: &str) -> Result<LoadReport> {
        let files = crate::pattern::expand(pattern, self.store.resolver().cwd())?;
        Ok(self.data(files.as_slice()))
    }

    /// Registers helper template files (macro libraries) under their basenames.
    ///
    /// Registered helpers are importable from any template with
    /// `{% import "<basename>" as alias %}` and survive cache clears. Failing files are
    /// recorded in the report; the remaining files are still registered.
    pub fn register_helpers<P: AsRef<Path>>(&mut self, sources: &[P]) -> LoadReport {
        let mut report = LoadReport::default();

        for source in sources {
            let source = source.as_ref();
            let name = name_of(source);
            let registered = std::fs::read_to_string(self.full_path(source))
                .map_err(|e| e.to_string())
                .and_then(|content| {
                    self.engine.register_helper_template(&name, &content).map_err(|e| e.to_string())
                });

            match registered {
                Ok(()) => report.success(name),
                Err(e) => report.failure("helper file", source.display().to_string(), e),
            }
        }

        report
    }

    /// Glob variant of [`Adapter::register_helpers`].
    ///
    /// # Errors
    ///
    /// Fails only if the pattern is not valid glob syntax.
    pub fn register_helpers_glob(&mut self, pattern: &str) -> Result<LoadReport> {
        let files = crate::pattern::expand(pattern, self.store.resolver().cwd())?;
        Ok(self.register_helpers(files.as_slice()))
    }

    /// Registers code-defined capabilities with the engine.
    pub fn register_capabilities(&mut self, helpers: &[Box<dyn Helper>]) -> LoadReport {
        let mut report = LoadReport::default();
        for helper in helpers {
            match helper.register(self.store.resolver(), &mut self.engine) {
                Ok(()) => report.success(helper.name()),
                Err(e) => report.failure("helper", helper.name(), e),
            }
        }
        report
    }

    /// Returns the source of the partial called `name`, honouring the caching policy.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::PartialNotFound`] if the file is missing or empty.
    pub fn load_partial(&mut self, name: &str) -> Result<String, AdapterError> {
        self.store.load_partial(name)
    }

    /// Renders the template at `source_path`.
    ///
    /// `content`, when given, is used as the template source instead of reading the
    /// file. `context` is merged over the persistent context for this call only.
    ///
    /// # Errors
    ///
    /// Returns an error if the template or one of its partials cannot be loaded,
    /// parsed or rendered.
    pub fn render(
        &mut self,
        source_path: &Path,
        content: Option<&str>,
        context: Option<&Map<String, Value>>,
        options: RenderOptions,
    ) -> Result<String, AdapterError> {
        let name = self.store.resolver().name_of(source_path);
        self.render_named(&name, source_path, content, context, options)
    }

    /// Renders a template by logical name, loading it through the partial registry.
    ///
    /// # Errors
    ///
    /// Same as [`Adapter::render`].
    pub fn render_template(
        &mut self,
        name: &str,
        context: Option<&Map<String, Value>>,
        options: RenderOptions,
    ) -> Result<String, AdapterError> {
        let resolver = self.store.resolver();
        let full = resolver.path_of(name);
        let source_path = full.strip_prefix(resolver.cwd()).map_or_else(|_| full.clone(), Path::to_path_buf);
        self.render_named(name, &source_path, None, context, options)
    }

    fn render_named(
        &mut self,
        name: &str,
        source_path: &Path,
        content: Option<&str>,
        context: Option<&Map<String, Value>>,
        options: RenderOptions,
    ) -> Result<String, AdapterError> {
        let merged = match context {
            Some(overlay) => merge(&self.context, overlay),
            None => self.context.clone(),
        };
        let context = Value::Object(merged);
        let whitespace = options.whitespace;

        self.store.set_current_template(Some(source_path.display().to_string()));

        let result = match content {
            Some(content) => self.engine.load_source(name, content, whitespace),
            None => Ok(()),
        }
        .and_then(|()| self.engine.render(name, &context, &mut self.store, whitespace))
        .map_err(AdapterError::from);

        if !self.store.is_caching() {
            self.engine.clear_cache();
        }
        self.store.set_current_template(None);

        if result.is_ok() {
            info!("Rendered template '{}'", name);
        }
        result
    }

    /// Compiles the template at `source_path` into a registration script.
    ///
    /// The compiled name is the logical name of a registered partial read from the
    /// same path, otherwise the file's basename. The context and the engine cache are
    /// left untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be read or does not parse.
    pub fn compile(
        &self,
        source_path: &Path,
        content: Option<&str>,
        options: RenderOptions,
    ) -> Result<String, AdapterError> {
        let name = self
            .store
            .name_for_path(source_path)
            .map_or_else(|| name_of(source_path), ToString::to_string);

        let content = match content {
            Some(content) => Cow::Borrowed(content),
            None => {
                let path = self.full_path(source_path);
                Cow::Owned(std::fs::read_to_string(&path).map_err(|source| AdapterError::Io {
                    path,
                    source,
                })?)
            }
        };

        debug!("Compiling {} as '{}'", source_path.display(), name);
        Ok(self.engine.compile(&content, &name, options.whitespace)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn project() -> TempDir {
        crate::test_utils::init_test_logging(None);
        TempDir::new().unwrap()
    }

    fn write(temp: &TempDir, rel: &str, content: &str) {
        let path = temp.path().join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    fn adapter(temp: &TempDir, cache: bool) -> Adapter {
        Adapter::new(AdapterOptions {
            cwd: temp.path().to_path_buf(),
            resolve: "templates/".to_string(),
            cache,
            ..AdapterOptions::default()
        })
    }

    fn object(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_data_loads_by_basename_and_reports_failures() {
        let temp = project();
        write(&temp, "data/a.json", r#"{"x": 1}"#);
        write(&temp, "data/bad.json", "{not json");
        let mut adapter = adapter(&temp, false);

        let report = adapter.data(&["data/a.json", "data/bad.json", "data/missing.json"]);

        assert_eq!(Value::Object(adapter.context().clone()), json!({"a": {"x": 1}}));
        assert_eq!(report.loaded, vec!["a"]);
        assert_eq!(report.failures.len(), 2);
        assert_eq!(report.failures[0].source, "data/bad.json");
    }

    #[test]
    fn test_data_glob_overwrites_existing_keys() {
        let temp = project();
        write(&temp, "data/site.json", r#"{"title": "new"}"#);
        let mut adapter = adapter(&temp, false);
        adapter.context_mut().insert("site".to_string(), json!({"title": "old", "lang": "en"}));

        let report = adapter.data_glob("data/*.json").unwrap();

        assert!(report.is_ok());
        assert_eq!(adapter.context()["site"], json!({"title": "new"}));
    }

    #[test]
    fn test_render_merges_context_without_mutating() {
        let temp = project();
        write(&temp, "templates/page.tera", "{{ x }}-{{ y }}");
        let mut adapter = adapter(&temp, false);
        adapter.context_mut().extend(object(json!({"x": 1, "y": 3})));

        let html = adapter
            .render(Path::new("templates/page.tera"), None, Some(&object(json!({"x": 2}))), RenderOptions::default())
            .unwrap();

        assert_eq!(html, "2-3");
        assert_eq!(Value::Object(adapter.context().clone()), json!({"x": 1, "y": 3}));
        assert_eq!(adapter.current_template(), None);
    }

    #[test]
    fn test_render_with_content_and_partials() {
        let temp = project();
        write(&temp, "templates/partials/footer.tera", "<footer>{{ year }}</footer>");
        let mut adapter = adapter(&temp, false);

        let html = adapter
            .render(
                Path::new("templates/pages/index.tera"),
                Some(r#"<main>{% include "partials/footer" %}</main>"#),
                Some(&object(json!({"year": 2024}))),
                RenderOptions::default(),
            )
            .unwrap();

        assert_eq!(html, "<main><footer>2024</footer></main>");
        assert!(!adapter.engine().is_loaded("pages/index"));
    }

    #[test]
    fn test_cache_keeps_engine_templates() {
        let temp = project();
        write(&temp, "templates/footer.tera", "v1");
        let mut adapter = adapter(&temp, true);

        assert_eq!(adapter.render_template("footer", None, RenderOptions::default()).unwrap(), "v1");
        write(&temp, "templates/footer.tera", "v2");
        assert_eq!(adapter.render_template("footer", None, RenderOptions::default()).unwrap(), "v1");
        assert!(adapter.engine().is_loaded("footer"));
    }

    #[test]
    fn test_no_cache_rereads_between_renders() {
        let temp = project();
        write(&temp, "templates/footer.tera", "v1");
        let mut adapter = adapter(&temp, false);

        assert_eq!(adapter.render_template("footer", None, RenderOptions::default()).unwrap(), "v1");
        write(&temp, "templates/footer.tera", "v2");
        assert_eq!(adapter.render_template("footer", None, RenderOptions::default()).unwrap(), "v2");
    }

    #[test]
    fn test_missing_partial_error_names_template() {
        let temp = project();
        let mut adapter = adapter(&temp, false);

        let err = adapter
            .render(
                Path::new("templates/page.tera"),
                Some(r#"{% include "nowhere" %}"#),
                None,
                RenderOptions::default(),
            )
            .unwrap_err();

        let chain = anyhow::Error::from(err);
        let not_found = chain.chain().find_map(|e| match e.downcast_ref::<AdapterError>() {
            Some(AdapterError::PartialNotFound {
                template,
                ..
            }) => template.clone(),
            _ => None,
        });
        assert_eq!(not_found.as_deref(), Some("templates/page.tera"));
    }

    #[test]
    fn test_missing_partial_message_names_source_file() {
        let temp = project();
        write(&temp, "templates/pages/home.tera", r#"{% include "partials/sidebar" %}"#);
        let mut adapter = adapter(&temp, false);

        let err = adapter.render_template("pages/home", None, RenderOptions::default()).unwrap_err();
        let chain = anyhow::Error::from(err);
        let message = chain
            .chain()
            .find(|e| matches!(e.downcast_ref::<AdapterError>(), Some(AdapterError::PartialNotFound { .. })))
            .map(ToString::to_string)
            .unwrap();

        assert!(message.starts_with("Partial 'partials/sidebar' not found"));
        assert!(message.contains("(while rendering 'templates/pages/home.tera')"));
        assert_eq!(adapter.current_template(), None);
    }

    #[test]
    fn test_helpers_survive_cache_clear() {
        let temp = project();
        write(&temp, "helpers/format.tera", "{% macro shout(text) %}{{ text | upper }}{% endmacro %}");
        write(&temp, "helpers/broken.tera", "{% macro oops( %}");
        let mut adapter = adapter(&temp, false);

        let report = adapter.register_helpers_glob("helpers/*.tera").unwrap();
        assert_eq!(report.loaded, vec!["format"]);
        assert_eq!(report.failures.len(), 1);

        let source = r#"{% import "format" as f %}{{ f::shout(text="hey") }}"#;
        for _ in 0..2 {
            let html = adapter
                .render(Path::new("templates/page.tera"), Some(source), None, RenderOptions::default())
                .unwrap();
            assert_eq!(html, "HEY");
        }
    }

    #[test]
    fn test_compile_uses_registered_partial_name() {
        let temp = project();
        write(&temp, "templates/elements/button.tera", "<button>\n  {{ label }}\n</button>");
        let mut adapter = adapter(&temp, false);

        let anonymous = adapter.compile(Path::new("templates/elements/button.tera"), None, RenderOptions::default());
        assert!(anonymous.unwrap().contains(r#"templates.register("button","#));

        adapter.load_partial("elements/button").unwrap();
        let compiled = adapter
            .compile(
                Path::new("templates/elements/button.tera"),
                None,
                RenderOptions::with_whitespace(Whitespace::Minify),
            )
            .unwrap();
        assert_eq!(
            compiled,
            r#"(function(){templates.register("elements/button","<button>{{ label }}</button>");})();"#
        );
    }

    #[test]
    fn test_compile_missing_file_is_io_error() {
        let temp = project();
        let adapter = adapter(&temp, false);
        let err = adapter.compile(Path::new("nope.tera"), None, RenderOptions::default()).unwrap_err();
        assert!(matches!(err, AdapterError::Io { .. }));
    }
}
