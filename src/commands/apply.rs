use anyhow::{Context as _, Result};
use colored::Colorize;
use reconcile::{Project, ReconcileSummary};

use super::{ConsoleObserver, load_registry, select_projects};
use crate::Context;
use crate::cli::ApplyArgs;
use crate::ui;

pub fn run(ctx: &Context, args: ApplyArgs) -> Result<()> {
    let registry = load_registry(&args.manifest)?;
    let projects = select_projects(&registry, &args.projects)?;

    if projects.is_empty() {
        ui::warn("No projects to reconcile");
        return Ok(());
    }

    if args.dry_run {
        return dry_run(&projects);
    }

    if !args.yes && !confirm_proceed(projects.len())? {
        println!();
        println!("  {} Aborted", "✗".red());
        return Ok(());
    }

    let mut observer = ConsoleObserver::new(ctx.quiet);
    let mut total = ReconcileSummary::default();

    for project in &projects {
        if !ctx.quiet {
            ui::header(&project.name);
        }
        let summary = project
            .build_all_with(&mut observer)
            .with_context(|| format!("Failed to reconcile project '{}'", project.name))?;
        total.merge(&summary);
    }

    print_summary(&total, projects.len());
    Ok(())
}

/// Check every selected project without changing anything
fn dry_run(projects: &[Project]) -> Result<()> {
    let mut pending = 0;

    for project in projects {
        ui::header(&project.name);
        let report = project
            .check_all()
            .with_context(|| format!("Failed to check project '{}'", project.name))?;

        for spec in &report.pending {
            println!(
                "  {} #{} {}",
                "→".cyan(),
                spec.index + 1,
                ui::short_type(spec.spec_type)
            );
        }
        if report.is_converged() {
            ui::dim("up to date");
        }
        pending += report.pending.len();
    }

    println!();
    ui::info(&format!(
        "Dry run - {} spec(s) would be applied, no changes made",
        pending
    ));
    Ok(())
}

fn confirm_proceed(count: usize) -> Result<bool> {
    use dialoguer::Confirm;

    let confirmed = Confirm::new()
        .with_prompt(format!("Reconcile {count} project(s)?"))
        .default(true)
        .interact()?;

    Ok(confirmed)
}

fn print_summary(summary: &ReconcileSummary, projects: usize) {
    println!();
    if summary.has_changes() {
        ui::success(&format!("{} project(s) reconciled", projects));
    } else {
        ui::success(&format!("{} project(s) already up to date", projects));
    }

    if summary.applied > 0 {
        println!("    • {} specs applied", summary.applied);
    }
    if summary.satisfied > 0 {
        println!("    • {} specs already satisfied", summary.satisfied);
    }
}
