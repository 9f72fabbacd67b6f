mod duration;
mod error;
mod fetch;
mod parser;
mod pipeline;
mod settings;
mod stages;
mod store;

use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::{Parser, Subcommand};

use fetch::HttpSource;
use pipeline::Pipeline;
use settings::{OverallTimeMode, Settings};
use store::JsonDirSink;

#[derive(Parser)]
#[command(name = "gc_scraper", about = "Per-stage GC standings for the grand tours")]
struct Cli {
    /// Settings file (default: ./gc_scraper.{toml,json,yaml} if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape GC top-N after every stage and write one JSON file per stage
    Scrape {
        /// Race key (see `races`)
        #[arg(short, long)]
        race: String,
        #[arg(short, long)]
        year: i32,
        /// Output root directory
        #[arg(short, long)]
        out: Option<PathBuf>,
        /// Riders kept per stage
        #[arg(short = 'n', long)]
        top_n: Option<usize>,
        /// Rebuild overall times as leader time + gap
        #[arg(long)]
        leader_relative: bool,
    },
    /// List the stages discovered for an edition
    Stages {
        #[arg(short, long)]
        race: String,
        #[arg(short, long)]
        year: i32,
    },
    /// Show configured race keys
    Races,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let mut settings = Settings::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Scrape {
            race,
            year,
            out,
            top_n,
            leader_relative,
        } => {
            if let Some(out) = out {
                settings.output_root = out;
            }
            if let Some(n) = top_n {
                settings.top_n = n;
            }
            if leader_relative {
                settings.overall_time = OverallTimeMode::LeaderRelative;
            }

            let source = HttpSource::new(&settings).context("Failed to build HTTP client")?;
            let sink = JsonDirSink::new(settings.output_root.clone());
            let report = Pipeline::new(&settings, source, sink).run(&race, year)?;

            println!(
                "\n{} {}: {} stages found, {} saved, {} skipped.",
                race,
                year,
                report.discovered,
                report.written.len(),
                report.skipped.len()
            );
            if report.stage_count_mismatch() {
                println!("  expected {} stages for this edition", report.expected);
            }
            for (index, reason) in &report.skipped {
                println!("  stage {:>2}: {}", index, reason);
            }
        }
        Commands::Stages { race, year } => {
            let edition = settings.edition(&race, year)?;
            let source = HttpSource::new(&settings).context("Failed to build HTTP client")?;
            let found = stages::locate(&source, &edition)?;
            if found.is_empty() {
                println!("No stages listed for {}.", edition.path());
                return Ok(());
            }
            for s in &found {
                let marker = if s.index == found.len() { "  (final)" } else { "" };
                println!("{:>3} | stage-{:<3} | {}{}", s.index, s.number, s.path, marker);
            }
        }
        Commands::Races => {
            for (key, slug) in &settings.races {
                println!("{:<8} {}", key, slug);
            }
        }
    }

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    Ok(())
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
