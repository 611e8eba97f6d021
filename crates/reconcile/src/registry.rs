//! Name-based registries
//!
//! [`SpecRegistry`] maps a spec kind name to a factory that builds a
//! specification from a configuration payload. [`Registry`] bundles it with
//! the blueprint and project registries so callers pass one explicit context
//! around instead of relying on process-wide state.
//!
//! Every registry is guarded by an `RwLock`. Each critical section is a
//! single map operation, so a poisoned lock still guards a consistent map
//! and is recovered rather than propagated.

use crate::blueprint::BlueprintRegistry;
use crate::error::Error;
use crate::project::ProjectRegistry;
use crate::spec::BoxedSpec;
use anyhow::Result;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Configuration payload handed to spec factories
pub type SpecConfig = serde_json::Value;

/// Builds a specification from its configuration payload
pub type SpecFactory = Arc<dyn Fn(&SpecConfig) -> Result<BoxedSpec> + Send + Sync>;

pub(crate) fn read_lock<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    match lock.read() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

pub(crate) fn write_lock<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    match lock.write() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Registry of specification factories keyed by kind name
#[derive(Default)]
pub struct SpecRegistry {
    specs: RwLock<HashMap<String, SpecFactory>>,
}

impl SpecRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory, replacing any previous one under the same name
    pub fn register<F>(&self, name: impl Into<String>, factory: F)
    where
        F: Fn(&SpecConfig) -> Result<BoxedSpec> + Send + Sync + 'static,
    {
        let name = name.into();
        log::trace!("Registering specification {}", name);
        write_lock(&self.specs).insert(name, Arc::new(factory));
    }

    /// Register a factory taking a typed configuration
    ///
    /// The payload is deserialized into `C` before `build` runs; a payload
    /// that does not fit surfaces as [`Error::InvalidConfig`].
    pub fn register_typed<C, F>(&self, name: impl Into<String>, build: F)
    where
        C: DeserializeOwned,
        F: Fn(C) -> Result<BoxedSpec> + Send + Sync + 'static,
    {
        let name = name.into();
        let kind = name.clone();
        self.register(name, move |config: &SpecConfig| {
            let typed = C::deserialize(config).map_err(|source| Error::InvalidConfig {
                kind: kind.clone(),
                source,
            })?;
            build(typed)
        });
    }

    /// Build a specification by kind name
    pub fn create(&self, name: &str, config: &SpecConfig) -> Result<BoxedSpec> {
        let factory = self
            .factory(name)
            .ok_or_else(|| Error::SpecNotFound(name.to_string()))?;
        factory(config)
    }

    /// Look up the factory registered under `name`
    pub fn factory(&self, name: &str) -> Option<SpecFactory> {
        read_lock(&self.specs).get(name).cloned()
    }

    /// Whether a factory is registered under `name`
    pub fn contains(&self, name: &str) -> bool {
        read_lock(&self.specs).contains_key(name)
    }

    /// Registered kind names, sorted
    pub fn kinds(&self) -> Vec<String> {
        let mut kinds: Vec<String> = read_lock(&self.specs).keys().cloned().collect();
        kinds.sort();
        kinds
    }

    /// Remove a factory, returning whether one was registered
    pub fn unregister(&self, name: &str) -> bool {
        write_lock(&self.specs).remove(name).is_some()
    }
}

impl std::fmt::Debug for SpecRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpecRegistry")
            .field("kinds", &self.kinds())
            .finish()
    }
}

/// Explicit registry context
///
/// Holds the spec factories, the blueprints and the registered projects
/// for one caller. Nothing is shared between two `Registry` values.
#[derive(Debug, Default)]
pub struct Registry {
    pub specs: SpecRegistry,
    pub blueprints: BlueprintRegistry,
    pub projects: ProjectRegistry,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::Project;
    use crate::spec::Specification;
    use serde::Deserialize;

    #[derive(Debug)]
    struct Named(String);

    impl Specification for Named {
        fn check(&self, _project: &Project) -> Result<bool> {
            Ok(true)
        }

        fn apply(&self, _project: &Project) -> Result<()> {
            Ok(())
        }
    }

    fn named(label: &str) -> impl Fn(&SpecConfig) -> Result<BoxedSpec> + use<> {
        let label = label.to_string();
        move |_config: &SpecConfig| Ok(Box::new(Named(label.clone())) as BoxedSpec)
    }

    #[test]
    fn test_register_spec() {
        let registry = SpecRegistry::new();
        registry.register("test-spec", named("a"));

        assert!(registry.contains("test-spec"));
        assert!(registry.factory("test-spec").is_some());
        assert_eq!(registry.kinds(), vec!["test-spec".to_string()]);
    }

    #[test]
    fn test_create_existing_spec() {
        let registry = SpecRegistry::new();
        registry.register("create-test-spec", named("a"));

        let spec = registry
            .create("create-test-spec", &SpecConfig::Null)
            .unwrap();
        assert!(spec.type_name().ends_with("Named"));
    }

    #[test]
    fn test_create_non_existent_spec() {
        let registry = SpecRegistry::new();
        let err = registry
            .create("non-existent-spec", &SpecConfig::Null)
            .unwrap_err();

        assert_eq!(err.to_string(), "specification non-existent-spec not found");
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::SpecNotFound(name)) if name == "non-existent-spec"
        ));
    }

    #[test]
    fn test_factory_error_propagates() {
        let registry = SpecRegistry::new();
        registry.register("error-spec", |_config: &SpecConfig| -> Result<BoxedSpec> {
            anyhow::bail!("factory error")
        });

        let err = registry.create("error-spec", &SpecConfig::Null).unwrap_err();
        assert_eq!(err.to_string(), "factory error");
    }

    #[test]
    fn test_second_registration_wins() {
        let registry = SpecRegistry::new();
        registry.register("dup", |_config: &SpecConfig| -> Result<BoxedSpec> {
            anyhow::bail!("first factory")
        });
        registry.register("dup", named("second"));

        assert!(registry.create("dup", &SpecConfig::Null).is_ok());
        assert!(registry.create("dup", &SpecConfig::Null).is_ok());
        assert_eq!(registry.kinds().len(), 1);
    }

    #[test]
    fn test_factory_receives_config() {
        let registry = SpecRegistry::new();
        registry.register("echo", |config: &SpecConfig| {
            let label = config["label"].as_str().unwrap_or_default().to_string();
            Ok(Box::new(Named(label)) as BoxedSpec)
        });

        let spec = registry
            .create("echo", &serde_json::json!({ "label": "hello" }))
            .unwrap();
        assert_eq!(format!("{spec:?}"), "Named(\"hello\")");
    }

    #[derive(Deserialize)]
    #[serde(deny_unknown_fields)]
    struct LabelConfig {
        label: String,
    }

    #[test]
    fn test_typed_registration_validates_config() {
        let registry = SpecRegistry::new();
        registry.register_typed("label", |config: LabelConfig| {
            Ok(Box::new(Named(config.label)) as BoxedSpec)
        });

        let ok = registry.create("label", &serde_json::json!({ "label": "x" }));
        assert!(ok.is_ok());

        let err = registry
            .create("label", &serde_json::json!({ "lable": "x" }))
            .unwrap_err();
        match err.downcast_ref::<Error>() {
            Some(Error::InvalidConfig { kind, .. }) => assert_eq!(kind, "label"),
            other => panic!("expected InvalidConfig, got {other:?}"),
        }
    }

    #[test]
    fn test_unregister() {
        let registry = SpecRegistry::new();
        registry.register("gone", named("a"));
        assert!(registry.unregister("gone"));
        assert!(!registry.unregister("gone"));
        assert!(registry.create("gone", &SpecConfig::Null).is_err());
    }

    #[test]
    fn test_registries_are_independent() {
        let first = Registry::new();
        let second = Registry::new();
        first.specs.register("only-first", named("a"));

        assert!(first.specs.contains("only-first"));
        assert!(!second.specs.contains("only-first"));
    }
}
