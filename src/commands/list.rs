use anyhow::Result;
use colored::Colorize;

use super::load_registry;
use crate::Context;
use crate::cli::ManifestArgs;
use crate::ui;

pub fn run(_ctx: &Context, args: ManifestArgs) -> Result<()> {
    let registry = load_registry(&args)?;

    ui::header("Projects");
    let projects = registry.projects.filter::<&str>(&[]);
    if projects.is_empty() {
        ui::dim("(none)");
    }
    for project in &projects {
        println!(
            "  {} {}",
            project.name.bold(),
            format!("({} specs)", project.specs.len()).dimmed()
        );
        if !project.description.is_empty() {
            ui::dim(&project.description);
        }
        if let Some(path) = &project.path {
            ui::kv("path", &path.display().to_string());
        }
        if let Some(homepage) = &project.homepage {
            ui::kv("homepage", homepage);
        }
    }

    ui::header("Blueprints");
    let blueprints = registry.blueprints.names();
    if blueprints.is_empty() {
        ui::dim("(none)");
    }
    for name in blueprints {
        let len = registry.blueprints.get(&name).map_or(0, |b| b.len());
        println!("  {} {}", name.bold(), format!("({len} specs)").dimmed());
    }

    ui::header("Spec kinds");
    println!("  {}", registry.specs.kinds().join(", "));

    Ok(())
}
