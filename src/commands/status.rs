use anyhow::{Context as _, Result};
use colored::Colorize;
use rayon::prelude::*;
use reconcile::CheckReport;

use super::{load_registry, select_projects};
use crate::Context;
use crate::cli::StatusArgs;
use crate::ui;

pub fn run(ctx: &Context, args: StatusArgs) -> Result<()> {
    let registry = load_registry(&args.manifest)?;
    let projects = select_projects(&registry, &args.projects)?;

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(args.jobs.max(1))
        .build()
        .context("Failed to create status thread pool")?;

    // collect() keeps registration order
    let reports: Vec<Result<CheckReport>> =
        pool.install(|| projects.par_iter().map(|p| p.check_all()).collect());

    ui::header("Status");

    let mut failed = 0;
    let mut pending = 0;
    for (project, report) in projects.iter().zip(reports) {
        match report {
            Ok(report) if report.is_converged() => {
                println!(
                    "  {} {} {}",
                    "✓".green(),
                    project.name.bold(),
                    format!("({} specs)", report.satisfied).dimmed()
                );
            }
            Ok(report) => {
                pending += 1;
                println!(
                    "  {} {} {}",
                    "⚠".yellow(),
                    project.name.bold(),
                    format!("({} pending)", report.pending.len()).yellow()
                );
                if ctx.verbose > 0 {
                    for spec in &report.pending {
                        ui::dim(&format!("#{} {}", spec.index + 1, ui::short_type(spec.spec_type)));
                    }
                }
            }
            Err(e) => {
                failed += 1;
                println!("  {} {} {:#}", "✗".red(), project.name.bold(), e);
            }
        }
    }

    println!();
    if failed > 0 {
        anyhow::bail!("{failed} project(s) could not be checked");
    }
    if pending == 0 {
        ui::success("All projects up to date");
    } else if !ctx.quiet {
        ui::info(&format!("{pending} project(s) need reconciling. Run: converge apply"));
    }
    Ok(())
}
