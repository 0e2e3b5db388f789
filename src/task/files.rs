//! Flattening file groups into an ordered list of work items.

use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::debug;

use crate::config::FileGroup;
use crate::core::StencilError;
use crate::pattern;

/// One source file and where its output goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileTask {
    /// Source path, relative to the project directory
    pub src: PathBuf,
    /// Output path, relative to the project directory
    pub dest: PathBuf,
    /// Append compiled output to the destination's buffer instead of writing it
    pub concat: bool,
}

/// Collects the work items of `groups`, in group declaration order and glob order
/// within a group. Sources that do not exist are dropped.
///
/// # Errors
///
/// Fails if a glob is invalid, or with [`StencilError::InvalidTarget`] if a group
/// has no `dest`.
pub fn collect_file_tasks(
    groups: &[FileGroup],
    cwd: &Path,
    default_concat: bool,
    target: &str,
) -> Result<Vec<FileTask>> {
    let mut tasks = Vec::new();

    for group in groups {
        let Some(dest) = group.dest.as_deref() else {
            return Err(StencilError::InvalidTarget {
                target: target.to_string(),
                reason: format!("file group {:?} has no `dest`", group.src.to_vec()),
            }
            .into());
        };

        let group_cwd = group.cwd.as_deref().map(PathBuf::from).unwrap_or_default();
        let base = cwd.join(&group_cwd);
        let concat = group.concat.unwrap_or(default_concat);
        if !base.is_dir() {
            debug!("Skipping file group with missing directory {}", base.display());
            continue;
        }

        for matched in pattern::expand_all(group.src.to_vec(), &base)? {
            if !base.join(&matched).is_file() {
                debug!("Skipping missing source {}", base.join(&matched).display());
                continue;
            }

            let dest = if group.expand {
                let mut dest = Path::new(dest).join(dest_suffix(&matched, &base));
                if let Some(ext) = group.ext.as_deref() {
                    dest = replace_ext(&dest, ext);
                }
                dest
            } else {
                PathBuf::from(dest)
            };

            tasks.push(FileTask {
                src: group_cwd.join(&matched),
                dest,
                concat,
            });
        }
    }

    Ok(tasks)
}

/// Part of a matched source that is appended to an expanded `dest`.
///
/// Absolute matches keep their path below the group directory, or only their file
/// name when they lie outside it.
fn dest_suffix(matched: &Path, base: &Path) -> PathBuf {
    if !matched.is_absolute() {
        return matched.to_path_buf();
    }
    match matched.strip_prefix(base) {
        Ok(relative) => relative.to_path_buf(),
        Err(_) => matched.file_name().map(PathBuf::from).unwrap_or_default(),
    }
}

/// Replaces everything after the first dot of the file name with `ext`.
fn replace_ext(path: &Path, ext: &str) -> PathBuf {
    let Some(file_name) = path.file_name().map(|n| n.to_string_lossy().into_owned()) else {
        return path.to_path_buf();
    };
    let stem = file_name.split_once('.').map_or(file_name.as_str(), |(stem, _)| stem);
    let ext = if ext.is_empty() || ext.starts_with('.') {
        ext.to_string()
    } else {
        format!(".{ext}")
    };
    path.with_file_name(format!("{stem}{ext}"))
}
