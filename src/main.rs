use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;

mod classify;
mod error;
mod export;
mod filter;
mod header;
mod ingest;
mod logging;
mod models;
mod report;
mod source;
mod tokenizer;
mod watch;

use filter::TeacherFilter;
use logging::LogFormat;
use source::Source;
use watch::{Refresher, Snapshot};

#[derive(Parser)]
#[command(name = "attendance-roster")]
#[command(about = "Teacher training attendance roster built from a spreadsheet CSV export", long_about = None)]
struct Cli {
    /// CSV export to read: a path, "-" for stdin, or an http(s) URL of the
    /// published sheet; falls back to ATTENDANCE_CSV
    #[arg(long, global = true)]
    input: Option<String>,
    #[arg(long, global = true, default_value = "info")]
    log_level: String,
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Json,
    Csv,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse the export and print the normalized roster
    Parse {
        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// List the schools found in the export
    Schools,
    /// Generate a markdown attendance report
    Report {
        #[arg(long)]
        school: String,
        /// Part of a teacher's first or last name (at least 2 characters)
        #[arg(long, default_value = "")]
        search: String,
        /// Include every teacher of the school
        #[arg(long)]
        all: bool,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
    /// Re-read the export periodically, keeping the last good result on failure
    Watch {
        #[arg(long, default_value_t = 60)]
        interval_secs: u64,
    },
}

fn resolve_source(input: Option<String>) -> anyhow::Result<Source> {
    let input = match input {
        Some(input) => input,
        None => std::env::var("ATTENDANCE_CSV")
            .context("pass --input or set ATTENDANCE_CSV to the attendance CSV export")?,
    };
    Ok(Source::from_arg(&input))
}

async fn load(source: &Source) -> anyhow::Result<Snapshot> {
    let text = source.read().await?;
    let roster = ingest::ingest(&text).with_context(|| format!("failed to ingest {source}"))?;
    info!(
        teachers = roster.teachers.len(),
        schools = roster.schools.len(),
        "loaded attendance data from {source}"
    );
    Ok(Snapshot::new(roster))
}

fn output_writer(out: Option<&Path>) -> anyhow::Result<Box<dyn Write>> {
    Ok(match out {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("failed to create {}", path.display()))?,
        )),
        None => Box::new(io::stdout().lock()),
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init_logging(&cli.log_level, cli.log_format);
    let source = resolve_source(cli.input)?;

    match cli.command {
        Commands::Parse { format, out } => {
            let snapshot = load(&source).await?;
            let mut writer = output_writer(out.as_deref())?;
            match format {
                OutputFormat::Json => {
                    export::write_json(&snapshot, &mut writer)?;
                    writeln!(writer)?;
                }
                OutputFormat::Csv => {
                    let rows = export::write_sessions_csv(&snapshot.roster.teachers, &mut writer)?;
                    info!(rows, "wrote session rows");
                }
            }
            writer.flush()?;
        }
        Commands::Schools => {
            let snapshot = load(&source).await?;
            if snapshot.roster.schools.is_empty() {
                println!("No schools found.");
                return Ok(());
            }
            for school in &snapshot.roster.schools {
                println!("{school}");
            }
        }
        Commands::Report {
            school,
            search,
            all,
            out,
        } => {
            let snapshot = load(&source).await?;
            let filter = TeacherFilter {
                school: Some(school),
                query: search,
                show_all: all,
            };
            let selected = filter.select(&snapshot.roster.teachers);
            let report = report::build_report(&filter, snapshot.loaded_at, &selected);
            std::fs::write(&out, report)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!(
                "Report for {} teachers written to {}.",
                selected.len(),
                out.display()
            );
        }
        Commands::Watch { interval_secs } => {
            anyhow::ensure!(
                source != Source::Stdin,
                "watch needs a file path or URL; stdin can only be read once"
            );
            let mut refresher = Refresher::new(source);
            let every = Duration::from_secs(interval_secs.max(1));
            let publish = |snapshot: &Snapshot| {
                let hours: f64 = snapshot.roster.teachers.iter().map(|t| t.total_hours).sum();
                println!(
                    "[{}] {} teachers across {} schools, {} hours",
                    snapshot.loaded_at.format("%H:%M:%S"),
                    snapshot.roster.teachers.len(),
                    snapshot.roster.schools.len(),
                    hours
                );
            };

            tokio::select! {
                _ = watch::watch(&mut refresher, every, None, publish) => {}
                signal = tokio::signal::ctrl_c() => {
                    signal.context("failed to listen for ctrl-c")?;
                    info!("stopping watch");
                }
            }
        }
    }

    Ok(())
}
