//! Built-in specification kinds
//!
//! Each kind is registered by name with a typed configuration, so a manifest
//! entry like `{ kind = "file", config = { path = "a", content = "b" } }`
//! is deserialized into [`file::FileConfig`] before the spec is built.

pub mod command;
pub mod directory;
pub mod file;
pub mod symlink;

use reconcile::{BoxedSpec, Project, SpecRegistry};
use std::path::PathBuf;

pub use command::{CommandConfig, CommandSpec};
pub use directory::{DirectoryConfig, DirectorySpec};
pub use file::{FileConfig, FileSpec};
pub use symlink::{SymlinkConfig, SymlinkSpec};

/// Register every built-in kind
pub fn register_builtins(registry: &SpecRegistry) {
    registry.register_typed("file", |config: FileConfig| {
        Ok(Box::new(FileSpec::from(config)) as BoxedSpec)
    });
    registry.register_typed("directory", |config: DirectoryConfig| {
        Ok(Box::new(DirectorySpec::from(config)) as BoxedSpec)
    });
    registry.register_typed("symlink", |config: SymlinkConfig| {
        Ok(Box::new(SymlinkSpec::from(config)) as BoxedSpec)
    });
    registry.register_typed("command", |config: CommandConfig| {
        Ok(Box::new(CommandSpec::from(config)) as BoxedSpec)
    });
}

/// Expand `raw` and anchor it at the project directory
pub(crate) fn resolve(project: &Project, raw: &str) -> PathBuf {
    project.resolve_path(crate::paths::expand(raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use reconcile::Error;
    use serde_json::json;

    #[test]
    fn test_builtins_registered() {
        let registry = SpecRegistry::new();
        register_builtins(&registry);
        assert_eq!(
            registry.kinds(),
            vec!["command", "directory", "file", "symlink"]
        );
    }

    #[test]
    fn test_create_from_config() {
        let registry = SpecRegistry::new();
        register_builtins(&registry);

        let spec = registry
            .create("file", &json!({ "path": "a.txt", "content": "x" }))
            .unwrap();
        assert!(spec.type_name().ends_with("FileSpec"));
        assert!(spec.as_removable().is_some());
    }

    #[test]
    fn test_bad_config_is_invalid() {
        let registry = SpecRegistry::new();
        register_builtins(&registry);

        let err = registry
            .create("directory", &json!({ "dir": "oops" }))
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::InvalidConfig { kind, .. }) if kind == "directory"
        ));
    }

    #[test]
    fn test_resolve_relative_to_project() {
        let project = Project::builder("p").with_path("/srv/p").build();
        assert_eq!(
            resolve(&project, "conf/app.toml"),
            PathBuf::from("/srv/p/conf/app.toml")
        );
        assert_eq!(resolve(&project, "/etc/hosts"), PathBuf::from("/etc/hosts"));
    }
}
