use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use colored::Colorize;
use serde_json::json;
use tracing::error;
use zoomprune_config::{ConfigStore, Configuration};
use zoomprune_reduce::{ReduceError, ReduceReport, ZoomReducer};

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let store = ConfigStore::new(&cli.config);
    let mut out = io::stdout().lock();
    match cli.command {
        Command::List(_) => cmd_list(&store, &cli.format, &mut out),
        Command::Remove(args) => cmd_remove(&store, args, &cli.format, &mut out),
    }
}

fn load(store: &ConfigStore) -> anyhow::Result<Configuration> {
    store
        .load()
        .with_context(|| format!("could not load config {}", store.path().display()))
}

fn cmd_list(store: &ConfigStore, format: &OutputFormat, out: &mut impl Write) -> anyhow::Result<()> {
    let config = load(store)?;
    match format {
        OutputFormat::Text => {
            writeln!(out, "Worlds:")?;
            for world in config.worlds() {
                writeln!(out, "\t{} (Depth: {})", world.path.bold(), world.max_zoom)?;
            }
        }
        OutputFormat::Json => {
            let worlds: Vec<_> = config
                .worlds()
                .iter()
                .map(|w| json!({"path": w.path, "maxZoom": w.max_zoom}))
                .collect();
            writeln!(out, "{}", serde_json::to_string_pretty(&worlds)?)?;
        }
    }
    Ok(())
}

fn cmd_remove(
    store: &ConfigStore,
    args: RemoveArgs,
    format: &OutputFormat,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let mut config = load(store)?;

    let mut names: Vec<String> = Vec::with_capacity(args.worlds.len());
    for name in &args.worlds {
        if !names.contains(name) {
            names.push(name.clone());
        }
    }

    // Resolve every world before anything is deleted.
    let mut targets: Vec<(String, PathBuf, u32)> = Vec::with_capacity(names.len());
    for name in names {
        let world = config.world(&name)?;
        let root = store.resolve_world_root(world);
        let depth = world.max_zoom;
        targets.push((name, root, depth));
    }

    let reducer = ZoomReducer::new(args.reduce_options());
    let mut reports: Vec<(String, ReduceReport)> = Vec::new();
    let mut failed: Vec<(String, ReduceError)> = Vec::new();

    for (name, root, depth) in targets {
        match reducer.reduce_world(&root, Path::new(&name), depth, args.num) {
            Ok(report) => {
                if !report.dry_run {
                    config.set_max_zoom(&name, i64::from(report.new_depth))?;
                }
                reports.push((name, report));
            }
            Err(e) => {
                error!(world = %name, error = %e, "world not reduced");
                failed.push((name, e));
            }
        }
    }

    match format {
        OutputFormat::Text => print_reports(out, &reports, &failed)?,
        OutputFormat::Json => {
            let worlds: Vec<_> = reports
                .iter()
                .map(|(name, report)| json!({"world": name, "report": report}))
                .collect();
            let errors: Vec<_> = failed
                .iter()
                .map(|(name, e)| json!({"world": name, "error": e.to_string()}))
                .collect();
            let doc = json!({"worlds": worlds, "errors": errors});
            writeln!(out, "{}", serde_json::to_string_pretty(&doc)?)?;
        }
    }

    if reports.iter().any(|(_, r)| !r.dry_run) {
        store.persist(&config).with_context(|| {
            format!(
                "could not write config {}; tiles were already removed, so the tile tree and the \
                 configuration may now disagree",
                store.path().display()
            )
        })?;
    }

    if !failed.is_empty() {
        let names: Vec<&str> = failed.iter().map(|(name, _)| name.as_str()).collect();
        bail!(
            "{} of {} worlds could not be reduced: {}",
            failed.len(),
            failed.len() + reports.len(),
            names.join(", ")
        );
    }
    Ok(())
}

fn print_reports(
    out: &mut impl Write,
    reports: &[(String, ReduceReport)],
    failed: &[(String, ReduceError)],
) -> io::Result<()> {
    for (name, report) in reports {
        let verb = if report.dry_run { "would remove" } else { "removed" };
        writeln!(
            out,
            "{} {}: depth {} -> {}, {} {} tiles ({} kept)",
            "✓".green().bold(),
            name.bold(),
            report.previous_depth,
            report.new_depth,
            verb,
            report.removed.len(),
            report.kept,
        )?;
        if report.vanished > 0 {
            writeln!(out, "  {} tiles were already gone", report.vanished)?;
        }
        if report.pruned_dirs > 0 {
            writeln!(out, "  {} empty directories removed", report.pruned_dirs)?;
        }
        for failure in &report.failures {
            writeln!(
                out,
                "  {} could not delete {}: {}",
                "!".yellow().bold(),
                failure.path.display(),
                failure.message
            )?;
        }
        for skipped in &report.skipped {
            writeln!(
                out,
                "  {} skipped {}: {}",
                "!".yellow().bold(),
                skipped.path.display(),
                skipped.message
            )?;
        }
    }
    for (name, e) in failed {
        writeln!(out, "{} {}: {}", "✗".red().bold(), name.bold(), e)?;
    }
    Ok(())
}
