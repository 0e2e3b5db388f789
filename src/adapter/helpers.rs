//! Engine capabilities registered by the adapter.
//!
//! A [`Helper`] adds filters, functions or helper templates to an [`Engine`].
//! The adapter registers [`builtin_helpers`] on construction; callers pass their own
//! to [`super::Adapter::register_capabilities`].

use std::collections::HashMap;

use serde_json::Value;

use crate::engine::{Engine, EngineError};
use crate::resolver::PartialResolver;

/// A capability that can be registered with an engine.
pub trait Helper: Send + Sync {
    /// Name used in logs and load reports.
    fn name(&self) -> &str;

    /// Registers the capability. `resolver` describes the adapter's template layout.
    fn register(&self, resolver: &PartialResolver, engine: &mut Engine) -> Result<(), EngineError>;
}

/// `{{ path | nameof }}`: logical template name of a file path.
#[derive(Debug, Default, Clone, Copy)]
pub struct NameOf;

impl Helper for NameOf {
    fn name(&self) -> &str {
        "nameof"
    }

    fn register(&self, resolver: &PartialResolver, engine: &mut Engine) -> Result<(), EngineError> {
        let resolver = resolver.clone();
        engine.register_filter(
            "nameof",
            move |value: &Value, _args: &HashMap<String, Value>| -> tera::Result<Value> {
                let path = value
                    .as_str()
                    .ok_or_else(|| tera::Error::msg("nameof filter requires a string path"))?;
                Ok(Value::String(resolver.name_of(std::path::Path::new(path))))
            },
        );
        Ok(())
    }
}

/// `{{ template_path(name="pages/index") }}`: file path of a logical name.
#[derive(Debug, Default, Clone, Copy)]
pub struct TemplatePath;

impl Helper for TemplatePath {
    fn name(&self) -> &str {
        "template_path"
    }

    fn register(&self, resolver: &PartialResolver, engine: &mut Engine) -> Result<(), EngineError> {
        let resolver = resolver.clone();
        engine.register_function("template_path", move |args: &HashMap<String, Value>| -> tera::Result<Value> {
            let name = args
                .get("name")
                .and_then(Value::as_str)
                .ok_or_else(|| tera::Error::msg("template_path requires a string `name` argument"))?;
            let path = resolver.path_of(name);
            let relative = path.strip_prefix(resolver.cwd()).unwrap_or(&path);
            Ok(Value::String(relative.to_string_lossy().replace('\\', "/")))
        });
        Ok(())
    }
}

/// Helpers every adapter starts with.
pub fn builtin_helpers() -> Vec<Box<dyn Helper>> {
    vec![Box::new(NameOf), Box::new(TemplatePath)]
}
