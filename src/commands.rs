//! CLI commands bridging the project store, manifest provider, and engine

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::PathBuf;
use sytescan_core::{DetectionCollection, ProgressReport, Requirement};
use sytescan_detect::{ingest_batch, ManifestProvider, ProjectStore, ScanConfig};
use tracing::info;

/// Construction progress analysis from object detection results
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Project store directory
    #[arg(long, default_value = "projects", value_name = "DIR")]
    pub store: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a project from a requirements file
    New {
        #[arg(long)]
        name: String,
        /// Requirements file, one expected object per line
        #[arg(long, value_name = "FILE")]
        requirements: PathBuf,
    },
    /// Ingest images whose detection manifests have been precomputed
    Ingest {
        #[arg(long, value_name = "ID")]
        project: String,
        /// Directory holding one `<image stem>.json` manifest per image
        #[arg(long, value_name = "DIR")]
        manifests: PathBuf,
        /// Image files to ingest
        #[arg(required = true, value_name = "IMAGE")]
        images: Vec<PathBuf>,
    },
    /// Compute and print the progress report for a project
    Report {
        #[arg(long, value_name = "ID")]
        project: String,
        /// Also write the report as JSON to this path
        #[arg(long, value_name = "FILE")]
        json: Option<PathBuf>,
    },
    /// List projects in the store
    List,
}

pub fn run(cli: Cli) -> Result<()> {
    let store = ProjectStore::open(&cli.store)?;
    let config = ScanConfig::default();

    match cli.command {
        Command::New { name, requirements } => {
            let requirements = Requirement::load_list(&requirements)?;
            let project = store.create(name, requirements)?;
            println!(
                "Created project {} ({} requirements)",
                project.id,
                project.requirements.len()
            );
        }
        Command::Ingest {
            project,
            manifests,
            images,
        } => {
            info!(project = %project, images = images.len(), "ingesting images");
            let provider = ManifestProvider::new(manifests);
            let outcomes = ingest_batch(&provider, &store, &project, &images, &config)?;
            for outcome in &outcomes {
                println!(
                    "{}: kept {} detections, discarded {}",
                    outcome.image_id, outcome.kept, outcome.discarded
                );
            }
            println!("Processed {}/{} images", outcomes.len(), images.len());
        }
        Command::Report { project, json } => {
            let project = store.load(&project)?;
            let report = project.report();
            print_report(&project.name, &report);

            if let Some(path) = json {
                let serialized =
                    serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
                fs::write(&path, serialized)
                    .with_context(|| format!("Failed to write report: {}", path.display()))?;
                println!("Report written to {}", path.display());
            }
        }
        Command::List => {
            for id in store.list()? {
                let project = store.load(&id)?;
                let stats = project
                    .detections
                    .iter()
                    .cloned()
                    .collect::<DetectionCollection>()
                    .stats();
                println!(
                    "{}  {} ({} requirements, {} detections, avg confidence {:.3})",
                    project.id,
                    project.name,
                    project.requirements.len(),
                    stats.total_detections,
                    stats.avg_confidence
                );
            }
        }
    }

    Ok(())
}

fn print_report(name: &str, report: &ProgressReport) {
    println!("Progress for {}: {:.2}%", name, report.completion_percentage);
    println!(
        "  - Requirements detected: {}/{}",
        report.detected_requirements(),
        report.matches.len()
    );
    for m in &report.matches {
        match m.confidence {
            Some(confidence) => println!(
                "  [x] {} (count {}, confidence {:.2})",
                m.requirement_label, m.count, confidence
            ),
            None => println!("  [ ] {}", m.requirement_label),
        }
    }
    println!("  - Total objects detected: {}", report.total_objects_detected);
    println!("  - Unique labels: {}", report.unique_labels.join(", "));
    println!("  - Avg confidence: {:.3}", report.average_confidence);
}
