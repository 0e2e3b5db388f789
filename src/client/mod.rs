//! Client bundle assembly.
//!
//! Client mode ships the engine's prebuilt browser scripts together with the small
//! loader that fetches compiled templates on demand. For each distribution variant
//! (`<prefix>-core.js`, `<prefix>-core.min.js`, `<prefix>-full.js`,
//! `<prefix>-full.min.js`) the prebuilt file is read from the dist directory, `;\n`
//! and the client script are appended, and the result is written to the destination.
//!
//! The client script is, in order:
//!
//! 1. the engine's helper script (`<prefix>-helpers.js` in the dist directory), if requested
//! 2. the built-in browser helpers, if requested
//! 3. user helper scripts matching the configured globs, if any
//! 4. the loader, with its `"RESOLVE_PATH"` placeholder replaced
//!
//! Each optional section starts with a `/* ... */` header. Without optional sections
//! the script is exactly the loader.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::constants::{
    DEFAULT_DIST_DIR, DEFAULT_DIST_PREFIX, DIST_VARIANTS, ENGINE_HELPERS_SUFFIX, RESOLVE_PATH_PLACEHOLDER,
    SCRIPT_SEPARATOR,
};
use crate::core::StencilError;
use crate::pattern;
use crate::utils::fs::safe_write;

const LOADER_SCRIPT: &str = include_str!("../../client/loader.js");

const BUILTIN_HELPERS: &[(&str, &str)] = &[
    ("nameof.js", include_str!("../../client/helpers/nameof.js")),
    ("preload.js", include_str!("../../client/helpers/preload.js")),
];

/// Options for [`copy_client_libs`].
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Project directory the other paths are relative to
    pub cwd: PathBuf,
    /// Output directory for the four bundle files
    pub dest: PathBuf,
    /// URL prefix the loader fetches compiled templates from
    pub resolve_path: String,
    /// Directory holding the engine's prebuilt browser scripts
    pub dist_dir: PathBuf,
    /// File name prefix of the prebuilt scripts
    pub dist_prefix: String,
    /// Include the built-in browser helpers
    pub builtin_helpers: bool,
    /// Include the engine's helper script
    pub engine_helpers: bool,
    /// Globs of user helper scripts to include
    pub user_helpers: Vec<String>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            cwd: PathBuf::from("."),
            dest: PathBuf::new(),
            resolve_path: String::new(),
            dist_dir: PathBuf::from(DEFAULT_DIST_DIR),
            dist_prefix: DEFAULT_DIST_PREFIX.to_string(),
            builtin_helpers: false,
            engine_helpers: false,
            user_helpers: Vec::new(),
        }
    }
}

impl ClientOptions {
    fn dist_file(&self, suffix: &str) -> PathBuf {
        self.cwd.join(&self.dist_dir).join(format!("{}-{}", self.dist_prefix, suffix))
    }
}

/// The loader script with the resolution path substituted.
///
/// # Examples
///
/// ```
/// use stencil_cli::client::loader_script;
///
/// let script = loader_script("/template/");
/// assert!(script.contains(r#""/template/""#));
/// assert!(!script.contains("RESOLVE_PATH"));
/// ```
pub fn loader_script(resolve_path: &str) -> String {
    let literal = serde_json::to_string(resolve_path).unwrap_or_else(|_| format!("\"{resolve_path}\""));
    LOADER_SCRIPT.replacen(RESOLVE_PATH_PLACEHOLDER, &literal, 1)
}

fn section(header: &str, scripts: &[String]) -> String {
    format!("/* {header} */\n{}\n", scripts.join(SCRIPT_SEPARATOR))
}

fn read_required(path: &Path) -> Result<String> {
    if !path.is_file() {
        return Err(StencilError::DistFileMissing {
            path: path.display().to_string(),
        }
        .into());
    }
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// Builds the script appended to every distribution file.
///
/// # Errors
///
/// Fails if the engine helper script is requested but missing, if a user helper
/// glob is invalid, or if a matched user helper cannot be read.
pub fn client_script(options: &ClientOptions) -> Result<String> {
    let mut script = String::new();

    if options.engine_helpers {
        let helpers = read_required(&options.dist_file(ENGINE_HELPERS_SUFFIX))?;
        script.push_str(&section("Engine Helpers", &[helpers]));
    }

    if options.builtin_helpers {
        let helpers: Vec<String> = BUILTIN_HELPERS.iter().map(|(_, source)| (*source).to_string()).collect();
        debug!(
            "Bundling built-in helpers: {}",
            BUILTIN_HELPERS.iter().map(|(name, _)| *name).collect::<Vec<_>>().join(", ")
        );
        script.push_str(&section("Built-in Helpers", &helpers));
    }

    if !options.user_helpers.is_empty() {
        let files = pattern::expand_all(&options.user_helpers, &options.cwd)?;
        let helpers = files
            .iter()
            .map(|file| {
                let path = options.cwd.join(file);
                std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read user helper {}", path.display()))
            })
            .collect::<Result<Vec<_>>>()?;
        debug!("Bundling {} user helper(s)", helpers.len());
        script.push_str(&section("User Helpers", &helpers));
    }

    script.push_str(&loader_script(&options.resolve_path));
    Ok(script)
}

/// Writes the four client bundle files into `options.dest`.
///
/// Returns the written paths in variant order.
///
/// # Errors
///
/// Fails with [`StencilError::DistFileMissing`] if a prebuilt file is missing, or
/// with an I/O error if the destination cannot be written.
pub fn copy_client_libs(options: &ClientOptions) -> Result<Vec<PathBuf>> {
    let script = client_script(options)?;
    let dest_dir = options.cwd.join(&options.dest);

    let mut written = Vec::with_capacity(DIST_VARIANTS.len());
    for variant in DIST_VARIANTS {
        let dist = read_required(&options.dist_file(variant))?;
        let file_name = format!("{}-{}", options.dist_prefix, variant);
        let dest = dest_dir.join(&file_name);

        safe_write(&dest, &format!("{dist}{SCRIPT_SEPARATOR}{script}"))?;
        info!("Wrote client bundle {}", dest.display());
        written.push(dest);
    }

    Ok(written)
}
