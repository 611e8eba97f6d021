//! Mode wrappers that reinterpret a specification's check/apply
//!
//! - [`EnsureSpec`]: the thing should be present (plain delegation)
//! - [`RemoveSpec`]: the thing should be absent
//! - [`ReplaceSpec`]: the thing should match the replacement
//!
//! Remove and Replace rely on the optional [`Removable`](crate::Removable)
//! and [`Replaceable`](crate::Replaceable) capabilities. Without them, check
//! falls back to the base contract with a warning, while apply always fails.

use crate::error::{Capability, Error};
use crate::project::Project;
use crate::spec::{BoxedSpec, Specification};
use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Which wrapper to put around a specification
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Make sure the thing is present
    #[default]
    Ensure,
    /// Make sure the thing is absent
    Remove,
    /// Make sure the thing matches, replacing it otherwise
    Replace,
}

impl Mode {
    /// Wrap a specification in the wrapper for this mode
    pub fn wrap(self, spec: BoxedSpec) -> BoxedSpec {
        match self {
            Mode::Ensure => Box::new(EnsureSpec::from_boxed(spec)),
            Mode::Remove => Box::new(RemoveSpec::from_boxed(spec)),
            Mode::Replace => Box::new(ReplaceSpec::from_boxed(spec)),
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mode::Ensure => write!(f, "ensure"),
            Mode::Remove => write!(f, "remove"),
            Mode::Replace => write!(f, "replace"),
        }
    }
}

/// Ensures the inner specification holds
#[derive(Debug)]
pub struct EnsureSpec {
    inner: BoxedSpec,
}

impl EnsureSpec {
    pub fn new<S: Specification + 'static>(spec: S) -> Self {
        Self::from_boxed(Box::new(spec))
    }

    pub fn from_boxed(inner: BoxedSpec) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &dyn Specification {
        self.inner.as_ref()
    }
}

impl Specification for EnsureSpec {
    fn check(&self, project: &Project) -> Result<bool> {
        self.inner.check(project)
    }

    fn apply(&self, project: &Project) -> Result<()> {
        self.inner.apply(project)
    }
}

/// Ensures the thing described by the inner specification is gone
#[derive(Debug)]
pub struct RemoveSpec {
    inner: BoxedSpec,
}

impl RemoveSpec {
    pub fn new<S: Specification + 'static>(spec: S) -> Self {
        Self::from_boxed(Box::new(spec))
    }

    pub fn from_boxed(inner: BoxedSpec) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &dyn Specification {
        self.inner.as_ref()
    }
}

impl Specification for RemoveSpec {
    fn check(&self, project: &Project) -> Result<bool> {
        if let Some(removable) = self.inner.as_removable() {
            let exists = removable.exists(project)?;
            return Ok(!exists);
        }

        log::warn!(
            "Spec {} does not support removal; using fallback check",
            self.inner.type_name()
        );

        // inverted check stands in for existence
        let present = self.inner.check(project)?;
        Ok(!present)
    }

    fn apply(&self, project: &Project) -> Result<()> {
        log::trace!("Applying removal spec for project {}", project.name);

        if let Some(removable) = self.inner.as_removable() {
            return removable.remove(project);
        }

        log::error!("Spec {} does not support removal", self.inner.type_name());
        Err(Error::CapabilityMissing {
            capability: Capability::Removal,
            spec_type: self.inner.type_name(),
        }
        .into())
    }
}

/// Ensures the thing described by the inner specification matches,
/// replacing it when it does not
#[derive(Debug)]
pub struct ReplaceSpec {
    inner: BoxedSpec,
}

impl ReplaceSpec {
    pub fn new<S: Specification + 'static>(spec: S) -> Self {
        Self::from_boxed(Box::new(spec))
    }

    pub fn from_boxed(inner: BoxedSpec) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &dyn Specification {
        self.inner.as_ref()
    }
}

impl Specification for ReplaceSpec {
    fn check(&self, project: &Project) -> Result<bool> {
        if let Some(replaceable) = self.inner.as_replaceable() {
            return replaceable.equals(project);
        }

        log::warn!(
            "Spec {} does not support replacement; using fallback check",
            self.inner.type_name()
        );

        self.inner.check(project)
    }

    fn apply(&self, project: &Project) -> Result<()> {
        log::trace!("Applying replacement spec for project {}", project.name);

        if let Some(replaceable) = self.inner.as_replaceable() {
            return replaceable.replace(project);
        }

        log::error!(
            "Spec {} does not support replacement",
            self.inner.type_name()
        );
        Err(Error::CapabilityMissing {
            capability: Capability::Replacement,
            spec_type: self.inner.type_name(),
        }
        .into())
    }
}
