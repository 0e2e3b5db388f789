//! Constants shared across the Stencil codebase.
//!
//! File names, defaults and wire-format fragments that more than one module
//! needs to agree on live here.

/// Default project file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "stencil.toml";

/// Default extension of template files, without the leading dot.
pub const DEFAULT_TEMPLATE_EXTENSION: &str = "tera";

/// Separator placed between concatenated compiled templates and between a
/// client distribution file and the appended bundle script.
pub const SCRIPT_SEPARATOR: &str = ";\n";

/// Placeholder in the client loader script replaced by the resolution path.
///
/// The quotes are part of the token so that only the string literal is replaced.
pub const RESOLVE_PATH_PLACEHOLDER: &str = "\"RESOLVE_PATH\"";

/// Default file-name prefix of the engine's browser distribution files.
pub const DEFAULT_DIST_PREFIX: &str = "engine";

/// Default directory holding the engine's browser distribution files.
pub const DEFAULT_DIST_DIR: &str = "vendor/engine";

/// Suffixes of the four browser distribution variants (core/full × normal/minified).
pub const DIST_VARIANTS: [&str; 4] = ["core.js", "core.min.js", "full.js", "full.min.js"];

/// Suffix of the engine-provided client helper library inside the dist directory.
pub const ENGINE_HELPERS_SUFFIX: &str = "helpers.js";

/// Global object the compiled templates register themselves with in the browser.
pub const CLIENT_REGISTRY: &str = "templates";

/// Default address for `stencil serve`.
pub const DEFAULT_SERVE_ADDR: &str = "127.0.0.1:3000";

/// Maximum number of "did you mean" suggestions attached to a missing partial.
pub const MAX_PARTIAL_SUGGESTIONS: usize = 3;
