mod assemble;
mod config;
mod corpus;
mod error;
mod parser;
mod store;
mod verify;

use std::path::PathBuf;
use std::time::Instant;

use clap::{Parser, Subcommand};

use crate::config::Settings;
use crate::corpus::Corpus;

#[derive(Parser)]
#[command(name = "works_extract", about = "Portfolio work pages -> JSON records, with a cross-check")]
struct Cli {
    /// Settings file (default: ./works.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Regenerate every record and the index
    Extract,
    /// Re-derive fields from the source pages and diff against the records
    Verify,
    /// Print one freshly extracted record without writing it
    Show {
        /// Work id as listed in the manifest
        id: String,
    },
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
    let settings = Settings::load(cli.config.as_deref())?;

    let result = match cli.command {
        Commands::Extract => {
            let corpus = Corpus::load(&settings)?;
            if corpus.order.is_empty() {
                println!("Manifest lists no works. Nothing to extract.");
                return Ok(());
            }
            println!(
                "Extracting {} works into {}...",
                corpus.order.len(),
                settings.output_dir.display()
            );
            let counts = assemble::assemble_all(&corpus, &settings)?;
            counts.print();
            Ok(())
        }
        Commands::Verify => {
            let report = verify::verify_all(&settings)?;
            report.print();
            Ok(())
        }
        Commands::Show { id } => {
            let corpus = Corpus::load(&settings)?;
            let work = assemble::extract_one(&corpus, &settings.default_year, &id)?;
            for label in &work.dropped_labels {
                tracing::warn!(id = %id, label = %label, "Dropped section with unknown label");
            }
            println!("{}", serde_json::to_string_pretty(&work.record)?);
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
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
