//! Deferred specification resolution
//!
//! A [`DeferredSpec`] postpones construction of its real specification until
//! reconciliation reaches it. The factory runs again on every `check` and
//! every `apply`; nothing is cached between calls.

use crate::error::Error;
use crate::project::Project;
use crate::spec::{BoxedSpec, Specification};
use anyhow::Result;
use std::fmt;
use std::sync::Mutex;

type SpecFn = dyn Fn() -> Option<BoxedSpec> + Send + Sync;

/// Specification built lazily from a factory
pub struct DeferredSpec {
    factory: Box<SpecFn>,
    label: Option<String>,
    lock: Mutex<()>,
}

impl DeferredSpec {
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn() -> Option<BoxedSpec> + Send + Sync + 'static,
    {
        Self {
            factory: Box::new(factory),
            label: None,
            lock: Mutex::new(()),
        }
    }

    /// Name reported when the factory produces nothing
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Run the factory under this instance's lock
    fn resolve(&self) -> Result<BoxedSpec> {
        let _guard = match self.lock.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        match (self.factory)() {
            Some(spec) => {
                log::debug!("Resolved deferred spec to {}", spec.type_name());
                Ok(spec)
            }
            None => Err(Error::DeferredInit {
                spec_type: self
                    .label
                    .clone()
                    .unwrap_or_else(|| std::any::type_name::<Self>().to_string()),
            }
            .into()),
        }
    }
}

impl fmt::Debug for DeferredSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeferredSpec")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

impl Specification for DeferredSpec {
    fn check(&self, project: &Project) -> Result<bool> {
        self.resolve()?.check(project)
    }

    fn apply(&self, project: &Project) -> Result<()> {
        self.resolve()?.apply(project)
    }
}
