//! Command spec - shell scripts as check and apply steps
//!
//! Scripts run in the project directory with the project's variables
//! exported as `CONVERGE_VAR_<NAME>` and its name as `CONVERGE_PROJECT`.
//! A zero exit status from the check script means the state holds.

use anyhow::{Context, Result, bail};
use reconcile::{Project, Removable, Specification};
use serde::Deserialize;
use std::process::{Command, Output};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CommandConfig {
    pub check: String,
    pub apply: String,
    /// Probe for removal; removal needs both `exists` and `remove`
    pub exists: Option<String>,
    pub remove: Option<String>,
    #[serde(default = "default_shell")]
    pub shell: String,
}

fn default_shell() -> String {
    "sh".to_string()
}

#[derive(Debug, Clone)]
pub struct CommandSpec {
    check: String,
    apply: String,
    exists: Option<String>,
    remove: Option<String>,
    shell: String,
}

/// Environment variable name for a project variable
fn var_env_name(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect();
    format!("CONVERGE_VAR_{sanitized}")
}

fn var_env_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl CommandSpec {
    pub fn new(check: impl Into<String>, apply: impl Into<String>) -> Self {
        Self {
            check: check.into(),
            apply: apply.into(),
            exists: None,
            remove: None,
            shell: default_shell(),
        }
    }

    /// Make the spec removable
    pub fn with_removal(mut self, exists: impl Into<String>, remove: impl Into<String>) -> Self {
        self.exists = Some(exists.into());
        self.remove = Some(remove.into());
        self
    }

    pub fn with_shell(mut self, shell: impl Into<String>) -> Self {
        self.shell = shell.into();
        self
    }

    fn run(&self, project: &Project, script: &str) -> Result<Output> {
        log::debug!("[{}] {} -c {}", project.name, self.shell, script);

        let mut cmd = Command::new(&self.shell);
        cmd.arg("-c").arg(script);
        if let Some(dir) = &project.path {
            if !dir.is_dir() {
                bail!("Project directory does not exist: {}", dir.display());
            }
            cmd.current_dir(dir);
        }
        cmd.env("CONVERGE_PROJECT", &project.name);
        for (name, value) in &project.vars {
            cmd.env(var_env_name(name), var_env_value(value));
        }

        cmd.output()
            .with_context(|| format!("Failed to run {}: {}", self.shell, script))
    }

    /// Run a script that must succeed
    fn run_checked(&self, project: &Project, script: &str) -> Result<()> {
        let output = self.run(project, script)?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!(
                "Command failed ({}): {}\n{}",
                output.status,
                script,
                stderr.trim()
            );
        }
        Ok(())
    }
}

impl From<CommandConfig> for CommandSpec {
    fn from(config: CommandConfig) -> Self {
        let spec = Self::new(config.check, config.apply).with_shell(config.shell);
        // a lone exists or remove script cannot make the spec removable
        match (config.exists, config.remove) {
            (Some(exists), Some(remove)) => spec.with_removal(exists, remove),
            _ => spec,
        }
    }
}

impl Specification for CommandSpec {
    fn check(&self, project: &Project) -> Result<bool> {
        Ok(self.run(project, &self.check)?.status.success())
    }

    fn apply(&self, project: &Project) -> Result<()> {
        self.run_checked(project, &self.apply)
    }

    fn as_removable(&self) -> Option<&dyn Removable> {
        if self.exists.is_some() && self.remove.is_some() {
            Some(self)
        } else {
            None
        }
    }
}

impl Removable for CommandSpec {
    fn exists(&self, project: &Project) -> Result<bool> {
        let Some(script) = self.exists.as_deref() else {
            bail!("No exists command configured");
        };
        Ok(self.run(project, script)?.status.success())
    }

    fn remove(&self, project: &Project) -> Result<()> {
        let Some(script) = self.remove.as_deref() else {
            bail!("No remove command configured");
        };
        self.run_checked(project, script)
    }
}
