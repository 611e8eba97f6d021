//! TOML manifest describing blueprints and projects
//!
//! Blueprints are registered in declaration order, so a blueprint may splice
//! in any blueprint declared above it. Projects come after all blueprints.

use anyhow::{Context, Result, bail};
use reconcile::{
    Blueprint, DeferredSpec, Error, Mode, Project, Registry, SharedSpec, SpecConfig,
};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use crate::paths;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    #[serde(default)]
    pub blueprints: Vec<BlueprintDecl>,
    #[serde(default)]
    pub projects: Vec<ProjectDecl>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BlueprintDecl {
    pub name: String,
    #[serde(default)]
    pub specs: Vec<SpecEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectDecl {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub path: Option<String>,
    pub homepage: Option<String>,
    #[serde(default)]
    pub vars: HashMap<String, serde_json::Value>,
    #[serde(default)]
    pub specs: Vec<SpecEntry>,
}

/// One entry of a `specs` list
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum SpecEntry {
    /// Splice a registered blueprint in place
    Blueprint(BlueprintRef),
    Spec(SpecDecl),
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BlueprintRef {
    pub blueprint: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SpecDecl {
    pub kind: String,
    #[serde(default)]
    pub mode: Mode,
    /// Build the spec when reconciliation reaches it
    #[serde(default)]
    pub deferred: bool,
    #[serde(default = "empty_config")]
    pub config: SpecConfig,
}

fn empty_config() -> SpecConfig {
    SpecConfig::Object(serde_json::Map::new())
}

impl Manifest {
    /// Load and validate a manifest file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Could not read manifest: {}", path.display()))?;

        let manifest = Self::parse(&content)
            .with_context(|| format!("Invalid manifest: {}", path.display()))?;
        log::debug!(
            "Loaded manifest {} ({} blueprints, {} projects)",
            path.display(),
            manifest.blueprints.len(),
            manifest.projects.len()
        );
        Ok(manifest)
    }

    /// Parse and validate manifest text
    pub fn parse(content: &str) -> Result<Self> {
        let manifest: Self = toml::from_str(content).context("Invalid TOML format")?;
        manifest.validate()?;
        Ok(manifest)
    }

    pub fn validate(&self) -> Result<()> {
        for (i, blueprint) in self.blueprints.iter().enumerate() {
            if blueprint.name.trim().is_empty() {
                bail!("Blueprint #{} has an empty name", i + 1);
            }
        }
        for (i, project) in self.projects.iter().enumerate() {
            if project.name.trim().is_empty() {
                bail!("Project #{} has an empty name", i + 1);
            }
        }
        Ok(())
    }

    /// Register every blueprint, then every project
    pub fn assemble(&self, registry: &Registry) -> Result<()> {
        for decl in &self.blueprints {
            let specs = build_entries(&decl.specs, registry)
                .with_context(|| format!("Invalid blueprint '{}'", decl.name))?;
            registry.blueprints.register(Blueprint {
                name: decl.name.clone(),
                specs,
            });
        }

        for decl in &self.projects {
            let project = build_project(decl, registry)
                .with_context(|| format!("Invalid project '{}'", decl.name))?;
            registry.projects.register(&project);
        }

        Ok(())
    }
}

fn build_project(decl: &ProjectDecl, registry: &Registry) -> Result<Project> {
    let mut builder = Project::builder(&decl.name).with_description(&decl.description);
    if let Some(path) = &decl.path {
        builder = builder.with_path(paths::expand(path));
    }
    if let Some(homepage) = &decl.homepage {
        builder = builder.with_homepage(homepage);
    }
    for (name, value) in &decl.vars {
        builder = builder.with_var(name, value.clone());
    }

    let specs = build_entries(&decl.specs, registry)?;
    Ok(specs
        .into_iter()
        .fold(builder, |b, spec| b.with_shared_spec(spec))
        .build())
}

fn build_entries(entries: &[SpecEntry], registry: &Registry) -> Result<Vec<SharedSpec>> {
    let mut specs = Vec::with_capacity(entries.len());
    for (i, entry) in entries.iter().enumerate() {
        match entry {
            SpecEntry::Blueprint(reference) => {
                let blueprint = registry.blueprints.require(&reference.blueprint)?;
                specs.extend(blueprint.specs);
            }
            SpecEntry::Spec(decl) => {
                let spec = build_spec(decl, registry)
                    .with_context(|| format!("Spec #{} ({})", i + 1, decl.kind))?;
                specs.push(spec);
            }
        }
    }
    Ok(specs)
}

fn build_spec(decl: &SpecDecl, registry: &Registry) -> Result<SharedSpec> {
    let mode = decl.mode;

    if !decl.deferred {
        let spec = registry.specs.create(&decl.kind, &decl.config)?;
        return Ok(Arc::from(mode.wrap(spec)));
    }

    // Unknown kinds still fail at load time
    let factory = registry
        .specs
        .factory(&decl.kind)
        .ok_or_else(|| Error::SpecNotFound(decl.kind.clone()))?;
    let config = decl.config.clone();
    let kind = decl.kind.clone();

    let deferred = DeferredSpec::new(move || match factory(&config) {
        Ok(spec) => Some(mode.wrap(spec)),
        Err(e) => {
            log::error!("Failed to build deferred {} spec: {:#}", kind, e);
            None
        }
    })
    .with_label(&decl.kind);

    Ok(Arc::new(deferred))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::specs;
    use tempfile::TempDir;

    fn registry() -> Registry {
        let registry = Registry::new();
        specs::register_builtins(&registry.specs);
        registry
    }

    const MANIFEST: &str = r#"
[[blueprints]]
name = "layout"
specs = [
  { kind = "directory", config = { path = "src" } },
  { kind = "directory", config = { path = "docs" } },
]

[[blueprints]]
name = "full"
specs = [
  { blueprint = "layout" },
  { kind = "file", config = { path = "README.md", content = "hi" } },
]

[[projects]]
name = "env"
description = "workstation"
homepage = "https://example.com"
vars = { owner = "me", port = 8080 }
specs = [
  { blueprint = "full" },
  { kind = "file", deferred = true, config = { path = "notes.txt", content = "n" } },
  { kind = "directory", mode = "remove", config = { path = "tmp" } },
]

[[projects]]
name = "bare"
"#;

    #[test]
    fn test_parse_manifest() {
        let manifest = Manifest::parse(MANIFEST).unwrap();
        assert_eq!(manifest.blueprints.len(), 2);
        assert_eq!(manifest.projects.len(), 2);

        let env = &manifest.projects[0];
        assert_eq!(env.specs.len(), 3);
        assert!(matches!(&env.specs[0], SpecEntry::Blueprint(r) if r.blueprint == "full"));
        match &env.specs[2] {
            SpecEntry::Spec(decl) => {
                assert_eq!(decl.mode, Mode::Remove);
                assert!(!decl.deferred);
            }
            SpecEntry::Blueprint(_) => panic!("expected a spec entry"),
        }

        let bare = &manifest.projects[1];
        assert!(bare.specs.is_empty());
        assert!(bare.path.is_none());
    }

    #[test]
    fn test_assemble_splices_blueprints() {
        let registry = registry();
        Manifest::parse(MANIFEST).unwrap().assemble(&registry).unwrap();

        assert_eq!(registry.blueprints.names(), vec!["full", "layout"]);
        assert_eq!(registry.blueprints.get("full").unwrap().len(), 3);

        let projects = registry.projects.filter(&["env"]);
        let env = &projects[0];
        assert_eq!(env.specs.len(), 3 + 2);
        assert_eq!(env.var("owner"), Some(&serde_json::json!("me")));
        assert_eq!(env.homepage.as_deref(), Some("https://example.com"));
        assert!(env.specs[3].type_name().ends_with("DeferredSpec"));
        assert!(env.specs[4].type_name().ends_with("RemoveSpec"));
    }

    #[test]
    fn test_reconcile_assembled_project() {
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir(tmp.path().join("tmp")).unwrap();
        let content = MANIFEST.replace(
            "description = \"workstation\"",
            &format!("description = \"workstation\"\npath = {:?}", tmp.path().display().to_string()),
        );

        let registry = registry();
        Manifest::parse(&content).unwrap().assemble(&registry).unwrap();
        let env = registry.projects.filter(&["env"]).remove(0);

        let summary = env.build_all().unwrap();
        assert_eq!(summary.applied, 5);
        assert!(tmp.path().join("src").is_dir());
        assert!(tmp.path().join("docs").is_dir());
        assert_eq!(std::fs::read_to_string(tmp.path().join("notes.txt")).unwrap(), "n");
        assert!(!tmp.path().join("tmp").exists());

        // second pass finds everything in place
        let summary = env.build_all().unwrap();
        assert_eq!(summary.applied, 0);
        assert_eq!(summary.satisfied, 5);
    }

    #[test]
    fn test_unknown_kind_fails_at_load() {
        let registry = registry();
        let manifest = Manifest::parse(
            r#"
[[projects]]
name = "p"
specs = [{ kind = "nope", deferred = true }]
"#,
        )
        .unwrap();

        let err = manifest.assemble(&registry).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::SpecNotFound(kind)) if kind == "nope"
        ));
    }

    #[test]
    fn test_unknown_blueprint_fails_at_load() {
        let registry = registry();
        // blueprints only see those declared before them
        let manifest = Manifest::parse(
            r#"
[[blueprints]]
name = "first"
specs = [{ blueprint = "second" }]

[[blueprints]]
name = "second"
"#,
        )
        .unwrap();

        let err = manifest.assemble(&registry).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::BlueprintNotFound(name)) if name == "second"
        ));
    }

    #[test]
    fn test_deferred_bad_config_fails_at_reconcile() {
        let registry = registry();
        Manifest::parse(
            r#"
[[projects]]
name = "p"
specs = [{ kind = "file", deferred = true, config = { wrong = 1 } }]
"#,
        )
        .unwrap()
        .assemble(&registry)
        .unwrap();

        let project = registry.projects.filter(&["p"]).remove(0);
        let err = project.build_all().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::DeferredInit { spec_type }) if spec_type == "file"
        ));
    }

    #[test]
    fn test_empty_name_rejected() {
        assert!(Manifest::parse("[[projects]]\nname = \"\"\n").is_err());
        assert!(Manifest::parse("[[blueprints]]\nname = \" \"\n").is_err());
    }

    #[test]
    fn test_unknown_field_rejected() {
        assert!(Manifest::parse("[[projects]]\nname = \"p\"\nowner = \"me\"\n").is_err());
    }
}
