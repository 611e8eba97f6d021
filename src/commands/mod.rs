pub mod apply;
pub mod list;
pub mod status;

use anyhow::{Result, bail};
use colored::Colorize;
use reconcile::{Phase, Project, ReconcileObserver, Registry, Specification};

use crate::cli::ManifestArgs;
use crate::manifest::Manifest;
use crate::{paths, specs, ui};

/// Build a registry holding the built-in kinds and everything the manifest declares
pub fn load_registry(args: &ManifestArgs) -> Result<Registry> {
    let path = paths::manifest_path(args.file.as_deref())?;
    if !path.exists() {
        bail!(
            "No manifest found at {}\nCreate {} or pass --file",
            path.display(),
            paths::MANIFEST_FILE
        );
    }

    let registry = Registry::new();
    specs::register_builtins(&registry.specs);
    let manifest = Manifest::load(&path)?;

    if let Err(e) = manifest.assemble(&registry) {
        let lookup = e
            .downcast_ref::<reconcile::Error>()
            .is_some_and(reconcile::Error::is_lookup);
        if lookup {
            return Err(e.context(format!(
                "Failed to load {} (spec kinds: {}; blueprints: {})",
                path.display(),
                registry.specs.kinds().join(", "),
                registry.blueprints.names().join(", ")
            )));
        }
        return Err(e);
    }
    Ok(registry)
}

/// Pick the requested projects in registration order, all when none are named
pub fn select_projects(registry: &Registry, names: &[String]) -> Result<Vec<Project>> {
    let projects = registry.projects.filter(names);

    let unknown: Vec<&str> = names
        .iter()
        .filter(|n| !projects.iter().any(|p| &p.name == *n))
        .map(String::as_str)
        .collect();
    if !unknown.is_empty() {
        bail!("Unknown project(s): {}", unknown.join(", "));
    }

    Ok(projects)
}

/// Describe a spec for display
fn spec_label(index: usize, spec: &dyn Specification) -> String {
    format!("#{} {}", index + 1, ui::short_type(spec.type_name()))
}

/// Prints one line per spec as a project is reconciled
pub struct ConsoleObserver {
    quiet: bool,
}

impl ConsoleObserver {
    pub fn new(quiet: bool) -> Self {
        Self { quiet }
    }
}

impl ReconcileObserver for ConsoleObserver {
    fn on_spec_start(&mut self, project: &Project, index: usize, spec: &dyn Specification) {
        log::debug!("[{}] Starting {}", project.name, spec_label(index, spec));
    }

    fn on_satisfied(&mut self, _project: &Project, index: usize, spec: &dyn Specification) {
        if !self.quiet {
            println!("  {} {}", "○".dimmed(), spec_label(index, spec).dimmed());
        }
    }

    fn on_applied(&mut self, _project: &Project, index: usize, spec: &dyn Specification) {
        if !self.quiet {
            println!("  {} {}", "✓".green(), spec_label(index, spec));
        }
    }

    fn on_failed(
        &mut self,
        _project: &Project,
        index: usize,
        spec: &dyn Specification,
        phase: Phase,
        error: &anyhow::Error,
    ) {
        eprintln!(
            "  {} {} ({} failed): {:#}",
            "✗".red(),
            spec_label(index, spec),
            phase,
            error
        );
    }
}
