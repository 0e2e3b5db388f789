//! Partial registry and caching policy.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::{debug, trace};

use super::AdapterError;
use crate::engine::{BoxError, PartialLoader};
use crate::resolver::PartialResolver;
use crate::utils::read_or_none;

/// A template known to the registry by logical name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialEntry {
    /// Logical name, unique within the registry
    pub name: String,
    /// File the source is read from
    pub source_path: PathBuf,
    /// Cached source, only populated when caching is enabled
    pub content: Option<String>,
}

/// Registry of partials keyed by logical name.
///
/// With caching enabled each partial is read from disk at most once. Without it the
/// file is read again on every load, so edits are picked up between renders.
#[derive(Debug, Clone)]
pub struct PartialStore {
    resolver: PartialResolver,
    cache: bool,
    partials: HashMap<String, PartialEntry>,
    current_template: Option<String>,
}

impl PartialStore {
    pub(crate) fn new(resolver: PartialResolver, cache: bool) -> Self {
        Self {
            resolver,
            cache,
            partials: HashMap::new(),
            current_template: None,
        }
    }

    pub(crate) fn resolver(&self) -> &PartialResolver {
        &self.resolver
    }

    pub(crate) fn is_caching(&self) -> bool {
        self.cache
    }

    pub(crate) fn current_template(&self) -> Option<&str> {
        self.current_template.as_deref()
    }

    pub(crate) fn set_current_template(&mut self, name: Option<String>) {
        self.current_template = name;
    }

    /// Looks up a registered entry.
    pub(crate) fn entry(&self, name: &str) -> Option<&PartialEntry> {
        self.partials.get(name)
    }

    /// Logical name of the registered partial read from `path`, if any.
    pub(crate) fn name_for_path(&self, path: &Path) -> Option<&str> {
        let full = self.resolver.cwd().join(path);
        self.partials.values().find(|entry| entry.source_path == full).map(|entry| entry.name.as_str())
    }

    /// Returns the source of the partial called `name`.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::PartialNotFound`] when the resolved file is missing,
    /// unreadable or empty.
    pub(crate) fn load_partial(&mut self, name: &str) -> Result<String, AdapterError> {
        let entry = self.partials.entry(name.to_string()).or_insert_with(|| PartialEntry {
            name: name.to_string(),
            source_path: self.resolver.path_of(name),
            content: None,
        });

        if self.cache {
            if let Some(content) = &entry.content {
                trace!("Partial '{}' served from cache", name);
                return Ok(content.clone());
            }
        }

        debug!("Loading partial '{}' from {}", name, entry.source_path.display());
        match read_or_none(&entry.source_path).filter(|content| !content.is_empty()) {
            Some(content) => {
                if self.cache {
                    entry.content = Some(content.clone());
                }
                Ok(content)
            }
            None => Err(AdapterError::PartialNotFound {
                name: name.to_string(),
                path: entry.source_path.clone(),
                template: self.current_template.clone(),
                suggestions: self.resolver.suggest(name),
            }),
        }
    }
}

impl PartialLoader for PartialStore {
    fn load(&mut self, name: &str) -> Result<String, BoxError> {
        self.load_partial(name).map_err(|e| Box::new(e) as BoxError)
    }
}
