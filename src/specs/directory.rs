//! Directory spec

use anyhow::{Context, Result, bail};
use reconcile::{Project, Removable, Specification};
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

use super::resolve;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DirectoryConfig {
    pub path: String,
}

/// A directory that must exist
#[derive(Debug, Clone)]
pub struct DirectorySpec {
    path: String,
}

impl DirectorySpec {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    fn target(&self, project: &Project) -> PathBuf {
        resolve(project, &self.path)
    }
}

impl From<DirectoryConfig> for DirectorySpec {
    fn from(config: DirectoryConfig) -> Self {
        Self::new(config.path)
    }
}

impl Specification for DirectorySpec {
    fn check(&self, project: &Project) -> Result<bool> {
        Ok(self.target(project).is_dir())
    }

    fn apply(&self, project: &Project) -> Result<()> {
        let path = self.target(project);
        fs::create_dir_all(&path)
            .with_context(|| format!("Failed to create directory: {}", path.display()))
    }

    fn as_removable(&self) -> Option<&dyn Removable> {
        Some(self)
    }
}

impl Removable for DirectorySpec {
    fn exists(&self, project: &Project) -> Result<bool> {
        Ok(self.target(project).exists())
    }

    fn remove(&self, project: &Project) -> Result<()> {
        let path = self.target(project);
        if !path.is_dir() {
            bail!("Not a directory: {}", path.display());
        }
        fs::remove_dir_all(&path)
            .with_context(|| format!("Failed to remove directory: {}", path.display()))
    }
}
