use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "converge")]
#[command(version)]
#[command(about = "Declarative reconciliation of projects to their desired state", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Bring projects to their desired state
    Apply(ApplyArgs),

    /// Show which specs still need applying
    Status(StatusArgs),

    /// List projects, blueprints and spec kinds
    List(ManifestArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args, Debug, Clone)]
pub struct ManifestArgs {
    /// Manifest file (defaults to ./converge.toml, then the config directory)
    #[arg(short, long, env = "CONVERGE_MANIFEST", value_name = "FILE")]
    pub file: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct ApplyArgs {
    /// Projects to reconcile (all when omitted)
    pub projects: Vec<String>,

    #[command(flatten)]
    pub manifest: ManifestArgs,

    /// Only check; change nothing
    #[arg(long)]
    pub dry_run: bool,

    /// Skip confirmation
    #[arg(short, long)]
    pub yes: bool,
}

#[derive(Args, Debug, Clone)]
pub struct StatusArgs {
    /// Projects to check (all when omitted)
    pub projects: Vec<String>,

    #[command(flatten)]
    pub manifest: ManifestArgs,

    /// Number of projects checked in parallel
    #[arg(short, long, default_value = "4")]
    pub jobs: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_apply() {
        let cli = Cli::parse_from([
            "converge", "-vv", "apply", "web", "api", "-f", "site.toml", "--dry-run", "-y",
        ]);
        assert_eq!(cli.verbose, 2);
        let Command::Apply(args) = cli.command else {
            panic!("expected apply");
        };
        assert_eq!(args.projects, vec!["web", "api"]);
        assert_eq!(args.manifest.file, Some(PathBuf::from("site.toml")));
        assert!(args.dry_run);
        assert!(args.yes);
    }

    #[test]
    fn test_parse_status_defaults() {
        let cli = Cli::parse_from(["converge", "status"]);
        let Command::Status(args) = cli.command else {
            panic!("expected status");
        };
        assert!(args.projects.is_empty());
        assert_eq!(args.jobs, 4);
    }
}
