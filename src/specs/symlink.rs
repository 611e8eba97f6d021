//! Symlink spec - a link at `target` pointing to `source`

use anyhow::{Context, Result, bail};
use reconcile::{Project, Removable, Replaceable, Specification};
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

use super::resolve;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SymlinkConfig {
    /// What the link points to
    pub source: String,
    /// Where the link is created
    pub target: String,
}

/// A symlink to create
#[derive(Debug, Clone)]
pub struct SymlinkSpec {
    source: String,
    target: String,
}

#[derive(Debug)]
enum SymlinkState {
    Missing,
    Correct,
    WrongTarget(PathBuf),
    FileExists,
}

impl SymlinkSpec {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }

    fn paths(&self, project: &Project) -> (PathBuf, PathBuf) {
        (resolve(project, &self.source), resolve(project, &self.target))
    }

    fn check_current(&self, project: &Project) -> Result<SymlinkState> {
        let (source, target) = self.paths(project);

        if !target.exists() && !target.is_symlink() {
            return Ok(SymlinkState::Missing);
        }

        if !target.is_symlink() {
            return Ok(SymlinkState::FileExists);
        }

        let link_target = fs::read_link(&target)
            .with_context(|| format!("Failed to read symlink: {}", target.display()))?;

        // Canonicalize for comparison
        let expected = source.canonicalize().unwrap_or(source);
        let actual = if link_target.is_absolute() {
            link_target.canonicalize().unwrap_or(link_target)
        } else {
            target
                .parent()
                .map(|p| p.join(&link_target))
                .and_then(|p| p.canonicalize().ok())
                .unwrap_or(link_target)
        };

        if expected == actual {
            Ok(SymlinkState::Correct)
        } else {
            Ok(SymlinkState::WrongTarget(actual))
        }
    }

    fn create_symlink(&self, project: &Project) -> Result<()> {
        let (source, target) = self.paths(project);

        if !source.exists() {
            bail!("Source does not exist: {}", source.display());
        }

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create parent directory: {}", parent.display())
            })?;
        }

        // Remove existing symlink if wrong target
        if target.is_symlink() {
            fs::remove_file(&target).with_context(|| {
                format!("Failed to remove existing symlink: {}", target.display())
            })?;
        }

        #[cfg(unix)]
        std::os::unix::fs::symlink(&source, &target).with_context(|| {
            format!(
                "Failed to create symlink: {} -> {}",
                target.display(),
                source.display()
            )
        })?;

        #[cfg(windows)]
        {
            use std::os::windows::fs::{symlink_dir, symlink_file};

            if source.is_dir() {
                // Junctions don't require admin privileges
                match junction::create(&source, &target) {
                    Ok(()) => (),
                    Err(e) => {
                        log::debug!("Junction creation failed ({}), trying symlink_dir", e);
                        symlink_dir(&source, &target).with_context(|| {
                            format!(
                                "Failed to create directory symlink: {} -> {}",
                                target.display(),
                                source.display()
                            )
                        })?;
                    }
                }
            } else {
                symlink_file(&source, &target).with_context(|| {
                    format!(
                        "Failed to create file symlink: {} -> {}",
                        target.display(),
                        source.display()
                    )
                })?;
            }
        }

        #[cfg(not(any(unix, windows)))]
        bail!("Symlinks not supported on this platform");

        Ok(())
    }
}

impl From<SymlinkConfig> for SymlinkSpec {
    fn from(config: SymlinkConfig) -> Self {
        Self::new(config.source, config.target)
    }
}

impl Specification for SymlinkSpec {
    fn check(&self, project: &Project) -> Result<bool> {
        Ok(matches!(self.check_current(project)?, SymlinkState::Correct))
    }

    fn apply(&self, project: &Project) -> Result<()> {
        match self.check_current(project)? {
            SymlinkState::Correct => Ok(()),
            SymlinkState::Missing => self.create_symlink(project),
            SymlinkState::WrongTarget(current) => {
                log::debug!("Relinking {} (points to {})", self.target, current.display());
                self.create_symlink(project)
            }
            // Don't overwrite existing files; replace mode does that
            SymlinkState::FileExists => bail!(
                "File exists at {}; use replace mode to overwrite it",
                resolve(project, &self.target).display()
            ),
        }
    }

    fn as_removable(&self) -> Option<&dyn Removable> {
        Some(self)
    }

    fn as_replaceable(&self) -> Option<&dyn Replaceable> {
        Some(self)
    }
}

impl Removable for SymlinkSpec {
    fn exists(&self, project: &Project) -> Result<bool> {
        Ok(resolve(project, &self.target).is_symlink())
    }

    fn remove(&self, project: &Project) -> Result<()> {
        let target = resolve(project, &self.target);
        if !target.is_symlink() {
            bail!("Not a symlink: {}", target.display());
        }
        fs::remove_file(&target)
            .with_context(|| format!("Failed to remove symlink: {}", target.display()))
    }
}

impl Replaceable for SymlinkSpec {
    fn equals(&self, project: &Project) -> Result<bool> {
        self.check(project)
    }

    fn replace(&self, project: &Project) -> Result<()> {
        let target = resolve(project, &self.target);
        if matches!(self.check_current(project)?, SymlinkState::FileExists) {
            if target.is_dir() {
                fs::remove_dir_all(&target)
            } else {
                fs::remove_file(&target)
            }
            .with_context(|| format!("Failed to remove {}", target.display()))?;
        }
        self.create_symlink(project)
    }
}
