// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! instaflat CLI

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use instaflat::cli::Reporter;
use instaflat::io::{self, TimestampedReport};
use instaflat::{BatchMode, ExtractionConfig, Kernel, MemorySink, SceneSource, StlSink};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "instaflat")]
#[command(about = "Flatten instanced CAD scenes into world-space parts", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Flatten, group and emit a JSON scene
    Extract {
        /// Input scene file
        scene: PathBuf,

        /// Configuration file (defaults to ./instaflat.toml if present)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Batch mode: per-leaf, single or fixed:<n>
        #[arg(short, long)]
        batch: Option<BatchMode>,

        /// Flatten top-level assembly children in parallel
        #[arg(long)]
        parallel: bool,

        /// Write the JSON report to this file
        #[arg(short, long)]
        report: Option<PathBuf>,

        /// Emit faceted output into this STL file
        #[arg(long)]
        stl: Option<PathBuf>,
    },

    /// Show the shape of a scene without extracting it
    Inspect {
        /// Input scene file
        scene: PathBuf,
    },

    /// Show version information
    Version,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Extract {
            scene,
            config,
            batch,
            parallel,
            report,
            stl,
        } => {
            let mut config = match config {
                Some(path) => {
                    let mut config = ExtractionConfig::from_file(&path)?;
                    config.apply_env()?;
                    config
                }
                None => ExtractionConfig::load()?,
            };
            if let Some(batch) = batch {
                config.batch_mode = batch;
            }
            config.parallel |= parallel;

            if let Err(err) = extract_command(&scene, config, report.as_deref(), stl.as_deref()) {
                Reporter::report_error(&format!("{:#}", err));
                std::process::exit(1);
            }
        }
        Commands::Inspect { scene } => {
            inspect_command(&scene)?;
        }
        Commands::Version => {
            println!("instaflat v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn extract_command(
    scene: &Path,
    config: ExtractionConfig,
    report_path: Option<&Path>,
    stl_path: Option<&Path>,
) -> Result<()> {
    let graph = io::import_scene_file(scene)?;
    let kernel = Kernel::new(config);

    let report = match stl_path {
        Some(path) => {
            let mut sink = StlSink::new(path);
            let report = kernel.run(&graph, &mut sink)?;
            let triangles = sink.finish()?;
            Reporter::success(&format!("Wrote {} triangles to {}", triangles, path.display()));
            report
        }
        None => kernel.run(&graph, &mut MemorySink::new())?,
    };

    Reporter::report_extraction(&scene.display().to_string(), &report);

    if let Some(path) = report_path {
        io::write_report(&TimestampedReport::new(report, Some(scene)), path)
            .context("Failed to save extraction report")?;
        Reporter::report_info(&format!("Report written to {}", path.display()));
    }

    Ok(())
}

fn inspect_command(scene: &Path) -> Result<()> {
    let graph = io::import_scene_file(scene)?;
    let root = graph.root()?;

    println!("Scene: {}", scene.display());
    println!("Root: {}", root.kind());
    println!("Subgraphs: {}", graph.subgraph_count());
    for name in graph.subgraphs.keys() {
        println!("  {}", name);
    }
    Ok(())
}
