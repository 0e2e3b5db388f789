//! File system helpers.
//!
//! Small, stateless helpers shared by the adapter, the client assembler and the task
//! runner: tolerant reads, template-style basenames, directory creation and
//! write-then-rename text writes.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Reads a UTF-8 file, returning `None` when it is missing or unreadable.
///
/// Used where a missing file is an expected outcome that the caller turns into its
/// own error (a partial that does not exist, an optional helper file).
///
/// # Examples
///
/// ```rust,no_run
/// use stencil_cli::utils::fs::read_or_none;
/// use std::path::Path;
///
/// match read_or_none(Path::new("templates/footer.tera")) {
///     Some(content) => println!("{} bytes", content.len()),
///     None => println!("no footer"),
/// }
/// ```
pub fn read_or_none(path: &Path) -> Option<String> {
    match fs::read_to_string(path) {
        Ok(content) => Some(content),
        Err(e) => {
            tracing::trace!("Could not read {}: {}", path.display(), e);
            None
        }
    }
}

/// Returns the file name of `path` without its last extension.
///
/// `data/site.json` becomes `site`, `helpers/format.tera` becomes `format`, and
/// `archive.tar.gz` becomes `archive.tar`.
pub fn name_of(path: &Path) -> String {
    path.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default()
}

/// Ensures a directory exists, creating it and all parents if needed.
///
/// # Errors
///
/// Fails if the directory cannot be created or if `path` exists and is not a
/// directory.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .with_context(|| format!("Failed to create directory: {}", path.display()))?;
    } else if !path.is_dir() {
        return Err(anyhow::anyhow!("Path exists but is not a directory: {}", path.display()));
    }
    Ok(())
}

/// Ensures that the parent directory of a file path exists.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            ensure_dir(parent)?;
        }
    }
    Ok(())
}

/// Atomically writes bytes to a file using a write-then-rename strategy.
///
/// The content goes to a sibling `.tmp` file which is synced and renamed over the
/// target, so readers never observe a partially written output. Parent directories
/// are created as needed.
pub fn atomic_write(path: &Path, content: &[u8]) -> Result<()> {
    use std::io::Write;

    ensure_parent_dir(path)?;

    let temp_path = temp_path_for(path);
    {
        let mut file = fs::File::create(&temp_path)
            .with_context(|| format!("Failed to create temp file: {}", temp_path.display()))?;

        file.write_all(content)
            .with_context(|| format!("Failed to write to temp file: {}", temp_path.display()))?;

        file.sync_all().with_context(|| "Failed to sync file to disk")?;
    }

    fs::rename(&temp_path, path)
        .with_context(|| format!("Failed to rename temp file to: {}", path.display()))?;

    Ok(())
}

/// Safely writes a string to a file. See [`atomic_write`].
pub fn safe_write(path: &Path, content: &str) -> Result<()> {
    atomic_write(path, content.as_bytes())
}

/// Async counterpart of [`safe_write`] used by the task runner.
pub async fn write_text_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
    }

    let temp_path = temp_path_for(path);
    tokio::fs::write(&temp_path, content)
        .await
        .with_context(|| format!("Failed to write to temp file: {}", temp_path.display()))?;
    tokio::fs::rename(&temp_path, path)
        .await
        .with_context(|| format!("Failed to rename temp file to: {}", path.display()))?;

    Ok(())
}

/// Reads a text file asynchronously with the path in the error context.
pub async fn read_text_file(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read file: {}", path.display()))
}

/// `out/page.html` -> `out/page.html.tmp`, keeping the original extension so two
/// outputs that differ only by extension never share a temp file.
fn temp_path_for(path: &Path) -> std::path::PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
