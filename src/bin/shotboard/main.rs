//! CLI tool for shotboard project files.
//!
//! Usage:
//!   shotboard seed --output project.json
//!   shotboard import --input project.json [--output project.automerge] [--validate] [--stats]
//!   shotboard annotate --input project.json
//!   shotboard report --input project.automerge [--check]
//!   shotboard export --input project.automerge [--output project.json]
//!
//! `--input` is read as JSON when it ends in `.json`, as an Automerge
//! snapshot otherwise.

mod project_file;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use shotboard::consistency::ConsistencySummary;
use shotboard::narration::{annotate, render_marked};
use shotboard::project::timeline::format_timecode;
use shotboard::{fixtures, ProjectRoot, ProjectStore};
use project_file::ProjectFile;

#[derive(Parser, Debug)]
#[command(
    name = "shotboard",
    about = "Inspect and convert storyboard project files",
    version
)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write the seed documentary project as JSON
    Seed {
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Convert a JSON project to an Automerge snapshot
    Import {
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path (defaults to input path with .automerge extension)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Validate output by hydrating back to structs
        #[arg(long, default_value = "false")]
        validate: bool,

        /// Print statistics about the conversion
        #[arg(long, default_value = "false")]
        stats: bool,
    },

    /// Print each shot's narration with keywords marked
    Annotate {
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Print the consistency summary
    Report {
        #[arg(short, long)]
        input: PathBuf,

        /// Recompute the report instead of showing the stored one
        #[arg(long, default_value = "false")]
        check: bool,
    },

    /// Convert an Automerge snapshot back to JSON
    Export {
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path (defaults to input path with .json extension)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shotboard=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    match args.command {
        Command::Seed { output } => seed(&output),
        Command::Import {
            input,
            output,
            validate,
            stats,
        } => import(&input, output, validate, stats),
        Command::Annotate { input } => annotate_shots(&input),
        Command::Report { input, check } => report(&input, check),
        Command::Export { input, output } => export(&input, output),
    }
}

// =============================================================================
// LOADING
// =============================================================================

fn is_json(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

fn read_project_file(path: &Path) -> Result<ProjectFile> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&json).context("Failed to parse JSON")
}

/// Opens a project from a JSON file or an Automerge snapshot.
fn load_store(path: &Path) -> Result<ProjectStore> {
    if !path.exists() {
        anyhow::bail!("Input file does not exist: {}", path.display());
    }
    if is_json(path) {
        let root: ProjectRoot = read_project_file(path)?.into();
        ProjectStore::from_root(root).context("Failed to build Automerge document")
    } else {
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        ProjectStore::from_bytes(&bytes).context("Failed to load Automerge snapshot")
    }
}

fn write_json(path: &Path, root: &ProjectRoot) -> Result<()> {
    let json = serde_json::to_string_pretty(&ProjectFile::from(root))
        .context("Failed to serialize project")?;
    std::fs::write(path, json).context("Failed to write output file")?;
    Ok(())
}

// =============================================================================
// COMMANDS
// =============================================================================

fn seed(output: &Path) -> Result<()> {
    write_json(output, &fixtures::seed_project())?;
    tracing::info!(path = %output.display(), "Seed project written");
    Ok(())
}

fn import(input: &Path, output: Option<PathBuf>, validate: bool, stats: bool) -> Result<()> {
    if !input.exists() {
        anyhow::bail!("Input file does not exist: {}", input.display());
    }
    let json_len = std::fs::metadata(input)
        .context("Failed to read input metadata")?
        .len();
    let root: ProjectRoot = read_project_file(input)?.into();
    let num_shots = root.shots.len();
    let num_assets = root.assets.len();

    let mut store = ProjectStore::from_root(root)
        .context("Failed to update Automerge document state")?;
    let root = store
        .get_state()
        .context("Failed to read imported document")?;
    let num_refs: usize = root.shots.values().map(|s| s.asset_refs.len()).sum();
    let binary = store.save();

    let output_path = output.unwrap_or_else(|| {
        let mut path = input.to_path_buf();
        path.set_extension("automerge");
        path
    });
    std::fs::write(&output_path, &binary).context("Failed to write output file")?;

    if validate {
        let mut loaded =
            ProjectStore::from_bytes(&binary).context("Failed to load binary for validation")?;
        let hydrated = loaded
            .get_state()
            .context("Failed to hydrate for validation")?;

        if hydrated.shots.len() != num_shots {
            anyhow::bail!(
                "Validation failed: shot count mismatch (expected {}, got {})",
                num_shots,
                hydrated.shots.len()
            );
        }
        if hydrated.assets.len() != num_assets {
            anyhow::bail!(
                "Validation failed: asset count mismatch (expected {}, got {})",
                num_assets,
                hydrated.assets.len()
            );
        }
        if hydrated != root {
            anyhow::bail!("Validation failed: hydrated document differs from input");
        }
        println!("✓ Validation passed!");
    }

    if stats {
        println!();
        println!("Conversion statistics:");
        println!("  Project ID: {}", root.id);
        println!("  Title: {}", root.title);
        println!();
        println!("  Input JSON:    {:>10} bytes", json_len);
        println!("  Output binary: {:>10} bytes", binary.len());
        println!();
        println!("  Shots:       {}", num_shots);
        println!("  Assets:      {}", num_assets);
        println!("  Asset refs:  {}", num_refs);
        println!("  Tracks:      {}", root.tracks.len());
        println!("  Duration:    {}", format_timecode(root.total_duration()));
    }

    tracing::info!(path = %output_path.display(), bytes = binary.len(), "Snapshot written");
    Ok(())
}

fn annotate_shots(input: &Path) -> Result<()> {
    let mut store = load_store(input)?;
    for shot in store.shots().context("Failed to read shots")? {
        let segments = annotate(&shot.narration, &shot.visual_keywords);
        println!(
            "#{} {} ({})",
            shot.order,
            shot.title,
            format_timecode(shot.duration)
        );
        println!("  {}", render_marked(&segments, "[", "]"));
    }
    Ok(())
}

fn report(input: &Path, check: bool) -> Result<()> {
    let mut store = load_store(input)?;
    let report = if check {
        store
            .run_consistency_check()
            .context("Failed to run consistency check")?
    } else {
        store
            .consistency_report()
            .context("Failed to read consistency report")?
    };
    let assets = store.assets().context("Failed to read assets")?;
    let summary = ConsistencySummary::new(&report, &assets);

    println!(
        "Overall score:       {} {} ({:?})",
        summary.overall_score,
        summary.grade.label(),
        summary.band
    );
    println!("Average asset score: {}", summary.average_asset_score);
    println!(
        "Issues:              {} errors, {} warnings, {} info",
        summary.counts.errors, summary.counts.warnings, summary.counts.infos
    );
    for issue in &report.issues {
        println!("  [{:?}] {}", issue.severity, issue.message);
    }
    Ok(())
}

fn export(input: &Path, output: Option<PathBuf>) -> Result<()> {
    let mut store = load_store(input)?;
    let root = store.get_state().context("Failed to hydrate document")?;
    let output_path = output.unwrap_or_else(|| {
        let mut path = input.to_path_buf();
        path.set_extension("json");
        path
    });
    write_json(&output_path, &root)?;
    tracing::info!(path = %output_path.display(), "Project exported");
    Ok(())
}
