//! Temporary project directories.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A project directory that is deleted when dropped.
pub struct TestProject {
    temp_dir: TempDir,
}

impl TestProject {
    /// Creates an empty project directory.
    pub fn new() -> Result<Self> {
        super::init_test_logging(None);
        Ok(Self {
            temp_dir: TempDir::new()?,
        })
    }

    /// Creates a project with `stencil.toml` set to `config`.
    pub fn with_config(config: &str) -> Result<Self> {
        let project = Self::new()?;
        project.write_file(crate::constants::DEFAULT_CONFIG_FILE, config)?;
        Ok(project)
    }

    /// Root of the project.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Absolute path of a project-relative file.
    pub fn join(&self, rel: &str) -> PathBuf {
        self.path().join(rel)
    }

    /// Writes `content` to `rel`, creating parent directories.
    pub fn write_file(&self, rel: &str, content: &str) -> Result<PathBuf> {
        let path = self.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::write(&path, content).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }

    /// Reads a project-relative file.
    pub fn read_file(&self, rel: &str) -> Result<String> {
        let path = self.join(rel);
        fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))
    }

    /// Whether a project-relative file exists.
    pub fn file_exists(&self, rel: &str) -> bool {
        self.join(rel).exists()
    }

    /// Writes the four engine distribution files under `dist_dir` with a marker body
    /// each (`/* <variant> */`).
    pub fn write_dist(&self, dist_dir: &str, prefix: &str) -> Result<()> {
        for variant in crate::constants::DIST_VARIANTS {
            self.write_file(&format!("{dist_dir}/{prefix}-{variant}"), &format!("/* {variant} */"))?;
        }
        Ok(())
    }
}
