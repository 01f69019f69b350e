mod cli;

use reelname::{config, exit, names, render};

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands, Target};
use rn_core::config::Config;
use rn_engine::{
    build_inventory, build_plan, deduplicate, execute, BatchReport, ExecuteOptions, Inventory,
    RenamePlan, TrackRef, UniqueMedia,
};
use rn_host::{LocalFs, MediaHost, ProjectFile};
use std::collections::HashMap;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "reelname=trace,rn_engine=trace,rn_host=debug".to_string()
        } else {
            "reelname=debug,rn_engine=debug,rn_host=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(io::stderr)
        .init();

    match cli.command {
        Commands::Inspect { target } => inspect(&target).map(|_| ExitCode::SUCCESS),
        Commands::Tracks { project, timeline } => {
            list_tracks(&project, &timeline).map(|_| ExitCode::SUCCESS)
        }
        Commands::Plan {
            target,
            names,
            json,
        } => {
            let config = config::load_config_or_default(cli.config.as_deref())?;
            show_plan(&target, &names, json, &config).map(|_| ExitCode::SUCCESS)
        }
        Commands::Apply {
            target,
            names,
            interactive: _,
            yes,
            report,
        } => {
            let config = config::load_config_or_default(cli.config.as_deref())?;
            apply(&target, names.as_deref(), yes, report, &config)
        }
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref()).map(|_| ExitCode::SUCCESS)
        }
        Commands::Version => {
            println!("reelname {}", env!("CARGO_PKG_VERSION"));
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn open_project(path: &Path) -> Result<ProjectFile> {
    ProjectFile::open(path).with_context(|| format!("Failed to open project {:?}", path))
}

fn read_inventory(project: &ProjectFile, target: &Target) -> Result<Inventory> {
    let selection = target.tracks.selection(project.host(), &target.timeline)?;
    tracing::debug!(
        "Selection: timeline '{}', tracks {:?}",
        selection.timeline,
        selection.tracks
    );
    Ok(build_inventory(project.host(), &selection)?)
}

fn inspect(target: &Target) -> Result<()> {
    let project = open_project(&target.project)?;
    let inventory = read_inventory(&project, target)?;
    render::inventory(&mut io::stdout().lock(), &inventory)?;
    Ok(())
}

fn list_tracks(project_path: &Path, timeline: &str) -> Result<()> {
    let project = open_project(project_path)?;
    let host = project.host();
    let info = host.timeline(timeline)?;
    let count = host.track_count(timeline, rn_core::TrackKind::Audio)?;

    let mut tracks = Vec::with_capacity(count);
    for index in 1..=count {
        let name = host
            .track_name(timeline, rn_core::TrackKind::Audio, index)?
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| format!("Audio Track {index}"));
        let clips = host
            .track_clips(timeline, rn_core::TrackKind::Audio, index)?
            .len();
        tracks.push((TrackRef { index, name }, clips));
    }

    println!("Timeline: {} ({:.3} fps)", info.name, info.frame_rate);
    render::tracks(&mut io::stdout().lock(), &tracks)?;
    Ok(())
}

/// Inventory, deduplicate and plan. A rejected plan is printed in full and
/// turned into an error.
fn prepare(
    project: &ProjectFile,
    target: &Target,
    config: &Config,
    base_names: impl FnOnce(&[UniqueMedia], usize) -> Result<HashMap<rn_core::MediaId, String>>,
) -> Result<RenamePlan> {
    let inventory = read_inventory(project, target)?;
    for orphan in &inventory.orphans {
        eprintln!(
            "Skipping clip '{}' on {}: {}",
            orphan.name, orphan.track.name, orphan.reason
        );
    }

    let unique = deduplicate(&inventory.occurrences);
    if unique.is_empty() {
        anyhow::bail!(
            "No clips with media files on the selected tracks of '{}'",
            target.timeline
        );
    }

    let width = config.naming.index_width(unique.len());
    let names = base_names(&unique, width)?;

    match build_plan(&unique, &names, &config.naming, &LocalFs) {
        Ok(plan) => Ok(plan),
        Err(e) => {
            render::conflicts(&mut io::stderr().lock(), &e)?;
            Err(e.into())
        }
    }
}

fn show_plan(target: &Target, names_path: &Path, json: bool, config: &Config) -> Result<()> {
    let project = open_project(&target.project)?;
    let plan = prepare(&project, target, config, |unique, _| {
        names::load_names(names_path, unique)
    })?;

    if json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
    } else {
        render::plan(&mut io::stdout().lock(), &plan)?;
    }
    Ok(())
}

fn apply(
    target: &Target,
    names_path: Option<&Path>,
    yes: bool,
    report_path: Option<PathBuf>,
    config: &Config,
) -> Result<ExitCode> {
    let project = open_project(&target.project)?;
    let plan = prepare(&project, target, config, |unique, width| match names_path {
        Some(path) => names::load_names(path, unique),
        None => Ok(names::prompt_names(
            unique,
            width,
            io::stdin().lock(),
            io::stdout(),
        )?),
    })?;

    render::plan(&mut io::stdout().lock(), &plan)?;
    if plan.active().count() == 0 {
        println!("Nothing to rename.");
        return Ok(ExitCode::SUCCESS);
    }
    if !yes && !confirm("Apply these renames?")? {
        println!("Aborted, nothing was changed.");
        return Ok(ExitCode::SUCCESS);
    }

    let (project, report) = run_batch(project, plan)?;

    let code = exit::conclude(&mut io::stdout().lock(), &report, project.path(), || {
        project.save()
    })?;

    if let Some(path) = report_path.or_else(|| config.report.path.clone()) {
        write_report(&path, &report)?;
        println!("Report written to {}", path.display());
    }

    Ok(ExitCode::from(code))
}

/// Run the transaction on a blocking thread while Ctrl-C cancels it between
/// entries.
fn run_batch(mut project: ProjectFile, plan: RenamePlan) -> Result<(ProjectFile, BatchReport)> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let token = CancellationToken::new();

        let interrupt = token.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Interrupted; stopping after the current entry");
                interrupt.cancel();
            }
        });

        let options = ExecuteOptions::default().with_cancellation(token);
        let handle = tokio::task::spawn_blocking(move || {
            let report = {
                let mut tx = execute(project.host_mut(), &LocalFs, &plan, options);
                for result in tx.by_ref() {
                    println!("{}", render::status_line(&result));
                }
                tx.finish()
            };
            (project, report)
        });

        handle.await.context("Batch thread panicked")
    })
}

fn confirm(question: &str) -> Result<bool> {
    print!("{question} [y/N] ");
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}

fn write_report(path: &Path, report: &BatchReport) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write report: {:?}", path))
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            print_config(&config);
        }
        None => {
            println!("No config file specified, using defaults");
            print_config(&Config::default());
        }
    }

    Ok(())
}

fn print_config(config: &Config) {
    println!("  Minimum index width: {}", config.naming.min_index_width);
    println!(
        "  Case-insensitive collisions: {}",
        config.naming.case_insensitive_collisions
    );
    match &config.report.path {
        Some(path) => println!("  Report: {}", path.display()),
        None => println!("  Report: none"),
    }
    for warning in config.validate() {
        println!("  ! {warning}");
    }
}
