//! Projects and the reconciliation loop
//!
//! A [`Project`] owns an ordered sequence of specifications for one target.
//! [`Project::build_all`] walks that sequence once, in order: each
//! specification is checked, and applied only when the check reports it is
//! not yet satisfied. The first error from any check or apply ends the pass
//! and is returned unchanged; specifications applied earlier in the pass
//! stay applied.

use crate::blueprint::Blueprint;
use crate::deferred::DeferredSpec;
use crate::mode::{EnsureSpec, RemoveSpec, ReplaceSpec};
use crate::observer::{NoObserver, ReconcileObserver};
use crate::registry::{read_lock, write_lock};
use crate::spec::{BoxedSpec, SharedSpec, Specification};
use crate::types::{CheckReport, Outcome, PendingSpec, Phase, ReconcileSummary};
use anyhow::Result;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

/// The target whose desired state is an ordered list of specifications
#[derive(Debug, Clone)]
pub struct Project {
    pub name: String,
    pub description: String,
    /// Filesystem location of the project, if it has one
    pub path: Option<PathBuf>,
    pub homepage: Option<String>,
    /// Free-form values specifications can read
    pub vars: HashMap<String, serde_json::Value>,
    pub specs: Vec<SharedSpec>,
}

impl Project {
    /// Start building a project
    pub fn builder(name: impl Into<String>) -> ProjectBuilder {
        ProjectBuilder::new(name)
    }

    /// Look up a project variable
    pub fn var(&self, name: &str) -> Option<&serde_json::Value> {
        self.vars.get(name)
    }

    /// Resolve a path relative to the project directory
    ///
    /// Absolute paths are returned unchanged, as are relative paths when the
    /// project has no directory.
    pub fn resolve_path(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();
        match &self.path {
            Some(root) if path.is_relative() => root.join(path),
            _ => path.to_path_buf(),
        }
    }

    /// Reconcile every specification in order
    pub fn build_all(&self) -> Result<ReconcileSummary> {
        self.build_all_with(&mut NoObserver)
    }

    /// Reconcile every specification in order, reporting progress
    pub fn build_all_with(&self, observer: &mut dyn ReconcileObserver) -> Result<ReconcileSummary> {
        let mut summary = ReconcileSummary::default();
        for (index, spec) in self.specs.iter().enumerate() {
            let outcome = self.apply_spec(index, spec.as_ref(), observer)?;
            summary.add_outcome(outcome);
        }
        Ok(summary)
    }

    fn apply_spec(
        &self,
        index: usize,
        spec: &dyn Specification,
        observer: &mut dyn ReconcileObserver,
    ) -> Result<Outcome> {
        observer.on_spec_start(self, index, spec);

        let satisfied = match spec.check(self) {
            Ok(satisfied) => satisfied,
            Err(e) => {
                log::warn!(
                    "[{}] Failed to check {}: {}",
                    self.name,
                    spec.type_name(),
                    e
                );
                observer.on_failed(self, index, spec, Phase::Check, &e);
                return Err(e);
            }
        };

        if satisfied {
            log::info!("[{}] Skipping {}; up to date", self.name, spec.type_name());
            observer.on_satisfied(self, index, spec);
            return Ok(Outcome::Satisfied);
        }

        log::info!("[{}] Applying {}", self.name, spec.type_name());
        if let Err(e) = spec.apply(self) {
            log::warn!(
                "[{}] Failed to apply {}: {}",
                self.name,
                spec.type_name(),
                e
            );
            observer.on_failed(self, index, spec, Phase::Apply, &e);
            return Err(e);
        }

        observer.on_applied(self, index, spec);
        Ok(Outcome::Applied)
    }

    /// Check every specification in order without applying anything
    ///
    /// Stops at the first check error. Later checks do not see the effect
    /// of earlier pending specifications, since nothing is applied.
    pub fn check_all(&self) -> Result<CheckReport> {
        let mut report = CheckReport::default();
        for (index, spec) in self.specs.iter().enumerate() {
            if spec.check(self)? {
                report.satisfied += 1;
            } else {
                log::debug!("[{}] {} would be applied", self.name, spec.type_name());
                report.pending.push(PendingSpec {
                    index,
                    spec_type: spec.type_name(),
                });
            }
        }
        Ok(report)
    }
}

/// Fluent builder for [`Project`]
#[derive(Debug)]
pub struct ProjectBuilder {
    project: Project,
}

impl ProjectBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            project: Project {
                name: name.into(),
                description: String::new(),
                path: None,
                homepage: None,
                vars: HashMap::new(),
                specs: Vec::new(),
            },
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.project.description = description.into();
        self
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.project.path = Some(path.into());
        self
    }

    pub fn with_homepage(mut self, url: impl Into<String>) -> Self {
        self.project.homepage = Some(url.into());
        self
    }

    pub fn with_var(mut self, name: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.project.vars.insert(name.into(), value.into());
        self
    }

    /// Append a specification as-is
    pub fn with_spec<S: Specification + 'static>(self, spec: S) -> Self {
        self.with_shared_spec(Arc::new(spec))
    }

    /// Append an already shared specification
    pub fn with_shared_spec(mut self, spec: SharedSpec) -> Self {
        self.project.specs.push(spec);
        self
    }

    /// Append a specification built lazily at reconcile time
    pub fn with_deferred_spec<F>(self, factory: F) -> Self
    where
        F: Fn() -> Option<BoxedSpec> + Send + Sync + 'static,
    {
        self.with_spec(DeferredSpec::new(factory))
    }

    /// Append a specification wrapped in [`EnsureSpec`]
    pub fn with_spec_present<S: Specification + 'static>(self, spec: S) -> Self {
        self.with_spec(EnsureSpec::new(spec))
    }

    /// Append a specification wrapped in [`RemoveSpec`]
    pub fn with_spec_remove<S: Specification + 'static>(self, spec: S) -> Self {
        self.with_spec(RemoveSpec::new(spec))
    }

    /// Append a specification wrapped in [`ReplaceSpec`]
    pub fn with_spec_replace<S: Specification + 'static>(self, spec: S) -> Self {
        self.with_spec(ReplaceSpec::new(spec))
    }

    /// Splice a blueprint's specifications in at the current position
    pub fn with_blueprint(mut self, blueprint: &Blueprint) -> Self {
        self.project.specs.extend(blueprint.specs.iter().cloned());
        self
    }

    pub fn build(self) -> Project {
        self.project
    }
}

/// Ordered list of registered projects
///
/// Not keyed by name: registering two projects with the same name keeps both.
#[derive(Debug, Default)]
pub struct ProjectRegistry {
    projects: RwLock<Vec<Project>>,
}

impl ProjectRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a snapshot of the project
    pub fn register(&self, project: &Project) {
        log::trace!("Registering project {}", project.name);
        write_lock(&self.projects).push(project.clone());
    }

    /// Registered projects whose name is in `names`, in registration order
    ///
    /// An empty `names` selects every registered project.
    pub fn filter<S: AsRef<str>>(&self, names: &[S]) -> Vec<Project> {
        read_lock(&self.projects)
            .iter()
            .filter(|p| names.is_empty() || names.iter().any(|n| n.as_ref() == p.name))
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        read_lock(&self.projects).len()
    }

    pub fn is_empty(&self) -> bool {
        read_lock(&self.projects).is_empty()
    }
}
