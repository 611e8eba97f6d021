//! Progress observer for reconciliation passes
//!
//! Lets callers surface progress (terminal output, metrics) without the
//! engine depending on any UI.

use crate::project::Project;
use crate::spec::Specification;
use crate::types::Phase;

/// Receives progress updates while a project reconciles
pub trait ReconcileObserver {
    /// Called before a specification is checked
    fn on_spec_start(&mut self, project: &Project, index: usize, spec: &dyn Specification);

    /// Called when check reported the state already holds
    fn on_satisfied(&mut self, project: &Project, index: usize, spec: &dyn Specification);

    /// Called after a successful apply
    fn on_applied(&mut self, project: &Project, index: usize, spec: &dyn Specification);

    /// Called when check or apply failed; the pass stops afterwards
    fn on_failed(
        &mut self,
        project: &Project,
        index: usize,
        spec: &dyn Specification,
        phase: Phase,
        error: &anyhow::Error,
    );
}

/// No-op observer
pub struct NoObserver;

impl ReconcileObserver for NoObserver {
    fn on_spec_start(&mut self, _project: &Project, _index: usize, _spec: &dyn Specification) {}
    fn on_satisfied(&mut self, _project: &Project, _index: usize, _spec: &dyn Specification) {}
    fn on_applied(&mut self, _project: &Project, _index: usize, _spec: &dyn Specification) {}
    fn on_failed(
        &mut self,
        _project: &Project,
        _index: usize,
        _spec: &dyn Specification,
        _phase: Phase,
        _error: &anyhow::Error,
    ) {
    }
}
