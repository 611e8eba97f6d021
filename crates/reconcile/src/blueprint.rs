//! Blueprints - named, reusable bundles of specifications
//!
//! A blueprint is spliced into projects (or other blueprints) in place,
//! keeping its internal order.

use crate::deferred::DeferredSpec;
use crate::error::Error;
use crate::mode::{EnsureSpec, RemoveSpec, ReplaceSpec};
use crate::registry::{read_lock, write_lock};
use crate::spec::{BoxedSpec, SharedSpec, Specification};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// A named, ordered bundle of specifications
#[derive(Debug, Clone)]
pub struct Blueprint {
    pub name: String,
    pub specs: Vec<SharedSpec>,
}

impl Blueprint {
    /// Start building a blueprint
    pub fn builder(name: impl Into<String>) -> BlueprintBuilder {
        BlueprintBuilder::new(name)
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

/// Fluent builder for [`Blueprint`]
#[derive(Debug)]
pub struct BlueprintBuilder {
    blueprint: Blueprint,
}

impl BlueprintBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            blueprint: Blueprint {
                name: name.into(),
                specs: Vec::new(),
            },
        }
    }

    /// Append a specification as-is
    pub fn with_spec<S: Specification + 'static>(self, spec: S) -> Self {
        self.with_shared_spec(Arc::new(spec))
    }

    /// Append an already shared specification
    pub fn with_shared_spec(mut self, spec: SharedSpec) -> Self {
        self.blueprint.specs.push(spec);
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

    /// Splice another blueprint's specifications in at the current position
    pub fn with_blueprint(mut self, blueprint: &Blueprint) -> Self {
        self.blueprint.specs.extend(blueprint.specs.iter().cloned());
        self
    }

    pub fn build(self) -> Blueprint {
        self.blueprint
    }
}

/// Registry of blueprints keyed by name
#[derive(Debug, Default)]
pub struct BlueprintRegistry {
    blueprints: RwLock<HashMap<String, Blueprint>>,
}

impl BlueprintRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a blueprint, replacing any previous one with the same name
    pub fn register(&self, blueprint: Blueprint) {
        log::trace!("Registering blueprint {}", blueprint.name);
        write_lock(&self.blueprints).insert(blueprint.name.clone(), blueprint);
    }

    /// Look up a blueprint by name
    pub fn get(&self, name: &str) -> Option<Blueprint> {
        read_lock(&self.blueprints).get(name).cloned()
    }

    /// Look up a blueprint by name, failing on a miss
    pub fn require(&self, name: &str) -> Result<Blueprint, Error> {
        self.get(name)
            .ok_or_else(|| Error::BlueprintNotFound(name.to_string()))
    }

    /// Registered blueprint names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = read_lock(&self.blueprints).keys().cloned().collect();
        names.sort();
        names
    }

    /// Remove a blueprint, returning whether one was registered
    pub fn unregister(&self, name: &str) -> bool {
        write_lock(&self.blueprints).remove(name).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::Project;
    use anyhow::Result;

    #[derive(Debug)]
    struct TestSpec(&'static str);

    impl Specification for TestSpec {
        fn check(&self, _project: &Project) -> Result<bool> {
            Ok(false)
        }

        fn apply(&self, _project: &Project) -> Result<()> {
            Ok(())
        }
    }

    fn labels(blueprint: &Blueprint) -> Vec<String> {
        blueprint.specs.iter().map(|s| format!("{s:?}")).collect()
    }

    #[test]
    fn test_register_blueprint() {
        let registry = BlueprintRegistry::new();
        registry.register(Blueprint::builder("test-blueprint").build());

        let registered = registry.get("test-blueprint").unwrap();
        assert_eq!(registered.name, "test-blueprint");
        assert_eq!(registry.names(), vec!["test-blueprint".to_string()]);
    }

    #[test]
    fn test_register_overwrites() {
        let registry = BlueprintRegistry::new();
        registry.register(Blueprint::builder("bp").with_spec(TestSpec("a")).build());
        registry.register(
            Blueprint::builder("bp")
                .with_spec(TestSpec("b"))
                .with_spec(TestSpec("c"))
                .build(),
        );

        assert_eq!(registry.get("bp").unwrap().len(), 2);
        assert_eq!(registry.names().len(), 1);
    }

    #[test]
    fn test_require_missing_blueprint() {
        let registry = BlueprintRegistry::new();
        let err = registry.require("nope").unwrap_err();
        assert!(matches!(err, Error::BlueprintNotFound(ref name) if name == "nope"));
        assert!(!registry.unregister("nope"));
    }

    #[test]
    fn test_basic_blueprint() {
        let bp = Blueprint::builder("test-bp").build();
        assert!(bp.is_empty());
        assert_eq!(bp.name, "test-bp");
    }

    #[test]
    fn test_with_specs() {
        let bp = Blueprint::builder("test-bp")
            .with_spec(TestSpec("a"))
            .with_spec(TestSpec("b"))
            .build();
        assert_eq!(bp.len(), 2);
        assert!(bp.specs[0].type_name().ends_with("TestSpec"));
    }

    #[test]
    fn test_wrapped_specs() {
        let bp = Blueprint::builder("test-bp")
            .with_deferred_spec(|| Some(Box::new(TestSpec("d")) as BoxedSpec))
            .with_spec_present(TestSpec("e"))
            .with_spec_remove(TestSpec("r"))
            .with_spec_replace(TestSpec("p"))
            .build();

        let types: Vec<&str> = bp.specs.iter().map(|s| s.type_name()).collect();
        assert!(types[0].ends_with("DeferredSpec"));
        assert!(types[1].ends_with("EnsureSpec"));
        assert!(types[2].ends_with("RemoveSpec"));
        assert!(types[3].ends_with("ReplaceSpec"));
    }

    #[test]
    fn test_splice_preserves_order() {
        let nested = Blueprint::builder("nested")
            .with_spec(TestSpec("n1"))
            .with_spec(TestSpec("n2"))
            .build();

        let bp = Blueprint::builder("outer")
            .with_spec(TestSpec("a"))
            .with_blueprint(&nested)
            .with_spec(TestSpec("b"))
            .build();

        assert_eq!(bp.len(), 1 + nested.len() + 1);
        assert_eq!(
            labels(&bp),
            vec![
                "TestSpec(\"a\")",
                "TestSpec(\"n1\")",
                "TestSpec(\"n2\")",
                "TestSpec(\"b\")"
            ]
        );
    }

    #[test]
    fn test_splice_shares_specs() {
        let nested = Blueprint::builder("nested").with_spec(TestSpec("n")).build();
        let bp = Blueprint::builder("outer").with_blueprint(&nested).build();
        assert!(Arc::ptr_eq(&nested.specs[0], &bp.specs[0]));
    }
}
