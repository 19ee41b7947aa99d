// src/bin/flowmap.rs
use std::fs;
use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use flowmap_core::cache::{self, BuildOptions};
use flowmap_core::pipeline::DateBoundaries;
use flowmap_core::viz;

/// Calendar dates arrive without a time of day; the service boundary
/// appends midnight before handing them to the pipeline.
const DEFAULT_TIME_OF_DAY: &str = " 00:00:00";

#[derive(Parser)]
#[command(name = "flowmap")]
#[command(about = "Build the facility transport-flow graph from layout and movement sources")]
struct Cli {
    /// Path to the build configuration JSON file
    config: PathBuf,

    /// Rebuild from sources even if a cached artifact exists
    #[arg(long)]
    force: bool,

    /// Start date (YYYY-MM-DD), inclusive; requires --to
    #[arg(long, requires = "to")]
    from: Option<String>,

    /// End date (YYYY-MM-DD), inclusive; requires --from
    #[arg(long, requires = "from")]
    to: Option<String>,

    /// Write the visualization JSON to this path
    #[arg(long)]
    out: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(long, short)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "flowmap_core=debug" } else { "flowmap_core=info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(default_level.parse()?))
        .init();

    let date_boundaries = match (&cli.from, &cli.to) {
        (Some(from), Some(to)) => Some(DateBoundaries::new(
            format!("{from}{DEFAULT_TIME_OF_DAY}"),
            format!("{to}{DEFAULT_TIME_OF_DAY}"),
        )),
        _ => None,
    };

    let options = BuildOptions {
        force_rebuild: cli.force,
        date_boundaries,
        prebuilt: None,
    };

    let outcome = match cache::build(&cli.config, options) {
        Ok(outcome) => outcome,
        Err(e) => {
            eprintln!("{}", format!("Build failed: {e}").red().bold());
            process::exit(1);
        }
    };

    let origin = if outcome.rebuilt { "rebuilt from sources" } else { "restored from cache" };
    println!(
        "Facility graph {}: {} areas, {} edges",
        origin.cyan(),
        outcome.artifact.facility.areas().len(),
        outcome.artifact.facility.edge_count()
    );

    if let Some(stats) = &outcome.artifact.stats {
        println!(
            "  span {} .. {}  self-edge weight {}  inserted {}  skipped {}  dropped {}",
            stats.date_from,
            stats.date_to,
            stats.self_edge_weight,
            stats.inserted,
            stats.skipped,
            stats.dropped_rows
        );
    }

    match &outcome.persist_error {
        None => println!("{}", "Artifact persisted.".green()),
        Some(e) => println!("{}", format!("Artifact not persisted: {e}").yellow().bold()),
    }

    if let Some(out) = &cli.out {
        let doc = viz::assemble(&outcome.artifact);
        let body = doc.to_json().context("serializing visualization JSON")?;
        fs::write(out, body).with_context(|| format!("writing {}", out.display()))?;
        println!("Visualization JSON written to {}", out.display());
    }

    Ok(())
}
