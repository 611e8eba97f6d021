//! Specification trait for declarative reconciliation
//!
//! A Specification describes one piece of desired state for a project:
//! it can probe whether that state already holds (`check`) and converge
//! the project toward it (`apply`).
//!
//! Two optional capabilities extend the contract. They are not supertraits;
//! an implementation opts in by overriding [`Specification::as_removable`] or
//! [`Specification::as_replaceable`], and the mode wrappers probe for them at
//! call time.

use crate::project::Project;
use anyhow::Result;
use std::fmt;
use std::sync::Arc;

/// Core trait for declarative specifications
///
/// # Example
///
/// ```ignore
/// use reconcile::{Project, Specification};
///
/// #[derive(Debug)]
/// struct DirectoryExists(std::path::PathBuf);
///
/// impl Specification for DirectoryExists {
///     fn check(&self, project: &Project) -> anyhow::Result<bool> {
///         Ok(project.resolve_path(&self.0).is_dir())
///     }
///
///     fn apply(&self, project: &Project) -> anyhow::Result<()> {
///         std::fs::create_dir_all(project.resolve_path(&self.0))?;
///         Ok(())
///     }
/// }
/// ```
pub trait Specification: Send + Sync + fmt::Debug {
    /// Probe whether the desired state already holds
    ///
    /// Must not change state. An error means the probe itself failed
    /// (target unreachable, permission denied), not "not satisfied".
    fn check(&self, project: &Project) -> Result<bool>;

    /// Converge the project toward the desired state
    fn apply(&self, project: &Project) -> Result<()>;

    /// Concrete type name, used in logs and capability errors
    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Removal capability, if this specification supports it
    fn as_removable(&self) -> Option<&dyn Removable> {
        None
    }

    /// Replacement capability, if this specification supports it
    fn as_replaceable(&self) -> Option<&dyn Replaceable> {
        None
    }
}

/// Optional capability for specifications whose state can be removed
pub trait Removable {
    /// Whether the described thing currently exists
    fn exists(&self, project: &Project) -> Result<bool>;

    /// Remove the described thing
    fn remove(&self, project: &Project) -> Result<()>;
}

/// Optional capability for specifications whose state can be replaced
pub trait Replaceable {
    /// Whether the current state already matches the replacement
    fn equals(&self, project: &Project) -> Result<bool>;

    /// Replace the current state with the described one
    fn replace(&self, project: &Project) -> Result<()>;
}

/// A boxed specification for type-erased storage
pub type BoxedSpec = Box<dyn Specification>;

/// A specification shared between blueprints and projects
pub type SharedSpec = Arc<dyn Specification>;

impl<S: Specification + ?Sized> Specification for Box<S> {
    fn check(&self, project: &Project) -> Result<bool> {
        (**self).check(project)
    }

    fn apply(&self, project: &Project) -> Result<()> {
        (**self).apply(project)
    }

    fn type_name(&self) -> &'static str {
        (**self).type_name()
    }

    fn as_removable(&self) -> Option<&dyn Removable> {
        (**self).as_removable()
    }

    fn as_replaceable(&self) -> Option<&dyn Replaceable> {
        (**self).as_replaceable()
    }
}

impl<S: Specification + ?Sized> Specification for Arc<S> {
    fn check(&self, project: &Project) -> Result<bool> {
        (**self).check(project)
    }

    fn apply(&self, project: &Project) -> Result<()> {
        (**self).apply(project)
    }

    fn type_name(&self) -> &'static str {
        (**self).type_name()
    }

    fn as_removable(&self) -> Option<&dyn Removable> {
        (**self).as_removable()
    }

    fn as_replaceable(&self) -> Option<&dyn Replaceable> {
        (**self).as_replaceable()
    }
}
