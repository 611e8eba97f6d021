//! File spec - a regular file with exact content

use anyhow::{Context, Result};
use reconcile::{Project, Removable, Replaceable, Specification};
use serde::Deserialize;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use super::resolve;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub path: String,
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Clone)]
pub struct FileSpec {
    path: String,
    content: String,
}

impl FileSpec {
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }

    fn target(&self, project: &Project) -> PathBuf {
        resolve(project, &self.path)
    }

    fn matches(&self, project: &Project) -> Result<bool> {
        let path = self.target(project);
        match fs::read(&path) {
            Ok(bytes) => Ok(bytes == self.content.as_bytes()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e).with_context(|| format!("Failed to read {}", path.display())),
        }
    }

    fn write(&self, project: &Project) -> Result<()> {
        let path = self.target(project);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create parent directory: {}", parent.display())
            })?;
        }
        fs::write(&path, &self.content)
            .with_context(|| format!("Failed to write {}", path.display()))
    }
}

impl From<FileConfig> for FileSpec {
    fn from(config: FileConfig) -> Self {
        Self::new(config.path, config.content)
    }
}

impl Specification for FileSpec {
    fn check(&self, project: &Project) -> Result<bool> {
        self.matches(project)
    }

    fn apply(&self, project: &Project) -> Result<()> {
        self.write(project)
    }

    fn as_removable(&self) -> Option<&dyn Removable> {
        Some(self)
    }

    fn as_replaceable(&self) -> Option<&dyn Replaceable> {
        Some(self)
    }
}

impl Removable for FileSpec {
    fn exists(&self, project: &Project) -> Result<bool> {
        Ok(fs::symlink_metadata(self.target(project)).is_ok())
    }

    fn remove(&self, project: &Project) -> Result<()> {
        let path = self.target(project);
        fs::remove_file(&path).with_context(|| format!("Failed to remove {}", path.display()))
    }
}

impl Replaceable for FileSpec {
    fn equals(&self, project: &Project) -> Result<bool> {
        self.matches(project)
    }

    fn replace(&self, project: &Project) -> Result<()> {
        self.write(project)
    }
}
