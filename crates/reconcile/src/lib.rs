//! # Reconcile
//!
//! A declarative reconciliation engine.
//!
//! Callers describe the desired end-state of a project as an ordered list of
//! specifications. Reconciling the project checks each specification in turn
//! and applies it only when the check says the state does not hold yet.
//!
//! ## Core Concepts
//!
//! - **Specification**: a state probe (`check`) paired with a convergence action (`apply`)
//! - **Mode wrappers**: [`EnsureSpec`], [`RemoveSpec`], [`ReplaceSpec`] reinterpret a
//!   specification as "present", "absent" or "matches the replacement"
//! - **DeferredSpec**: builds its specification only when reconciliation reaches it
//! - **Blueprint**: a named, reusable, ordered bundle of specifications
//! - **Project**: the target; [`Project::build_all`] runs the reconciliation pass
//! - **Registry**: name-based spec factories, blueprints and registered projects
//!
//! ## Example
//!
//! ```ignore
//! use reconcile::{Blueprint, Project, Registry, Specification};
//!
//! #[derive(Debug)]
//! struct Dir(&'static str);
//!
//! impl Specification for Dir {
//!     fn check(&self, project: &Project) -> anyhow::Result<bool> {
//!         Ok(project.resolve_path(self.0).is_dir())
//!     }
//!
//!     fn apply(&self, project: &Project) -> anyhow::Result<()> {
//!         std::fs::create_dir_all(project.resolve_path(self.0))?;
//!         Ok(())
//!     }
//! }
//!
//! let layout = Blueprint::builder("layout")
//!     .with_spec_present(Dir("src"))
//!     .with_spec_present(Dir("docs"))
//!     .build();
//!
//! let project = Project::builder("demo")
//!     .with_path("/tmp/demo")
//!     .with_blueprint(&layout)
//!     .build();
//!
//! let registry = Registry::new();
//! registry.blueprints.register(layout);
//! registry.projects.register(&project);
//!
//! for project in registry.projects.filter::<&str>(&[]) {
//!     project.build_all()?;
//! }
//! ```
//!
//! ## Errors
//!
//! Errors returned by specifications pass through [`Project::build_all`]
//! unchanged. Errors the engine raises itself are [`Error`] values wrapped
//! in `anyhow::Error`; use `downcast_ref::<reconcile::Error>()` to inspect them.

pub mod blueprint;
pub mod deferred;
pub mod error;
pub mod mode;
pub mod observer;
pub mod project;
pub mod registry;
pub mod spec;
pub mod types;

// Re-export main types at crate root
pub use blueprint::{Blueprint, BlueprintBuilder, BlueprintRegistry};
pub use deferred::DeferredSpec;
pub use error::{Capability, Error};
pub use mode::{EnsureSpec, Mode, RemoveSpec, ReplaceSpec};
pub use observer::{NoObserver, ReconcileObserver};
pub use project::{Project, ProjectBuilder, ProjectRegistry};
pub use registry::{Registry, SpecConfig, SpecFactory, SpecRegistry};
pub use spec::{BoxedSpec, Removable, Replaceable, SharedSpec, Specification};
pub use types::{CheckReport, Outcome, PendingSpec, Phase, ReconcileSummary};
