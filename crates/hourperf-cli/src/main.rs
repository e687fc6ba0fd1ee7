//! hourperf CLI - Hourly Performance Pivot Report
//!
//! Command-line interface for building the hourly performance report from a
//! CSV/TSV export.

mod config;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use hourperf_core::{GridRenderer, MemoryStore, SchemaError, SourceTable};
use hourperf_pivot::{build_report, resolve, run_report, ColumnAliases, ReportBody};
use hourperf_render::{CsvRenderer, CsvSource, TextRenderer, WorkbookStore};
use serde_json::json;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::CliConfig;

const DEFAULT_OUTPUT: &str = "hourly_performance.xlsx";

#[derive(Parser)]
#[command(name = "hourperf")]
#[command(author, version, about = "Hourly performance pivot report", long_about = None)]
struct Cli {
    /// Verbose output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the report
    Run {
        /// Source CSV/TSV file (falls back to [source].path)
        #[arg(value_name = "SOURCE")]
        source: Option<PathBuf>,

        /// Output file (xlsx: defaults to hourly_performance.xlsx; others: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Target day (ISO date, serial day, DD/MM/YYYY ...); latest day when omitted
        #[arg(long)]
        day: Option<String>,

        /// Only this hour
        #[arg(long)]
        hour: Option<String>,

        /// Only this shift
        #[arg(long)]
        shift: Option<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Xlsx)]
        format: OutputFormat,

        /// Text output: hide categories without rows
        #[arg(long)]
        compact: bool,

        /// Config file (default: ./hourperf.toml when present)
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,
    },

    /// Resolve the source columns and report the mapping
    Check {
        /// Source CSV/TSV file (falls back to [source].path)
        #[arg(value_name = "SOURCE")]
        source: Option<PathBuf>,

        /// Config file (default: ./hourperf.toml when present)
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Xlsx,
    Text,
    Csv,
    Json,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .init();

    match execute(cli.command) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn execute(command: Commands) -> Result<ExitCode> {
    match command {
        Commands::Run {
            source,
            output,
            day,
            hour,
            shift,
            format,
            compact,
            config,
        } => {
            let config = CliConfig::load(config.as_deref())?;
            let table = load_source(&config, source)?;
            let controls = config.controls(day, hour, shift);
            let aliases = config.aliases();

            match format {
                OutputFormat::Xlsx => {
                    let output = output
                        .or_else(|| config.output.path.clone())
                        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT));
                    let mut store = WorkbookStore::new(table, &controls);
                    if let Some(sheet) = &config.output.sheet {
                        store = store.sheet_name(sheet.clone());
                    }
                    let summary = run_report(&mut store, &aliases)?;
                    store.save(&output)?;

                    match summary.notice {
                        Some(notice) => println!("{}: {}", output.display(), notice),
                        None => println!(
                            "{}: {} rows x {} columns{}",
                            output.display(),
                            summary.rows,
                            summary.columns,
                            summary
                                .day
                                .map(|d| format!(" for {d}"))
                                .unwrap_or_default()
                        ),
                    }
                }
                OutputFormat::Json => {
                    let mut rows = vec![table.headers];
                    rows.extend(table.rows);
                    let mut store = MemoryStore::new().with_source(rows).with_controls(controls);
                    let summary = run_report(&mut store, &aliases)?;
                    store.source.clear();
                    let value = json!({ "summary": summary, "sheet": store });
                    emit(output.as_deref(), &serde_json::to_string_pretty(&value)?)?;
                }
                OutputFormat::Text | OutputFormat::Csv => {
                    let outcome = build_report(&table, &controls, &aliases)?;
                    let text = match &outcome.body {
                        ReportBody::Notice(notice) => format!("{notice}\n"),
                        ReportBody::Grid(grid) if format == OutputFormat::Csv => {
                            CsvRenderer::new().render(grid)?
                        }
                        ReportBody::Grid(grid) => {
                            let renderer = if compact {
                                TextRenderer::new().compact()
                            } else {
                                TextRenderer::new()
                            };
                            renderer.render(grid)?
                        }
                    };
                    if let Some(day) = outcome.resolved_day {
                        tracing::info!(day = %day.iso(), auto = day.auto, "Report day");
                    }
                    emit(output.as_deref(), &text)?;
                }
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Check { source, config } => {
            let config = CliConfig::load(config.as_deref())?;
            let table = load_source(&config, source)?;
            Ok(check(&table, &config.aliases()))
        }
    }
}

fn load_source(config: &CliConfig, arg: Option<PathBuf>) -> Result<SourceTable> {
    let path = config.source_path(arg)?;
    let mut source = CsvSource::new(&path);
    if let Some(delimiter) = config.delimiter()? {
        source = source.delimiter(delimiter);
    }
    source
        .read_table()
        .with_context(|| format!("failed to read source {}", path.display()))
}

fn check(table: &SourceTable, aliases: &ColumnAliases) -> ExitCode {
    match resolve(&table.headers, aliases) {
        Ok(columns) => {
            for (role, index) in columns.iter() {
                println!("{:<30} {:>3}  {}", role, index, table.headers[index]);
            }
            println!("{} data rows", table.rows.len());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{e}");
            let SchemaError::MissingColumns(missing) = e;
            for role in missing {
                let names = aliases.get(role).join(", ");
                eprintln!("  {role}: expected one of [{names}]");
            }
            ExitCode::FAILURE
        }
    }
}

fn emit(output: Option<&Path>, text: &str) -> Result<()> {
    match output {
        Some(path) => std::fs::write(path, text)
            .with_context(|| format!("failed to write {}", path.display())),
        None => {
            print!("{text}");
            Ok(())
        }
    }
}
