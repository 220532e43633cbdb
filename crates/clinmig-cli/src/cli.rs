//! CLI argument definitions for the migration tool.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "clinmig",
    version,
    about = "Legacy clinic record migration",
    long_about = "Migrate legacy clinic spreadsheets (patients and encounters) into the \
                  normalized store, resolving patient identity along the way.\n\n\
                  Also audits the stored patient set for duplicates and repairs \
                  pre-migration encounter codes."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Allow patient names and other row-level values in logs.
    ///
    /// Off by default: row-level values are PHI and are logged as [REDACTED].
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,

    /// Connection string for the target database.
    #[arg(
        long = "database-url",
        value_name = "URL",
        env = "DATABASE_URL",
        hide_env_values = true,
        global = true
    )]
    pub database_url: Option<String>,

    /// Tenant scope for every lookup and insert.
    #[arg(long, value_name = "ID", default_value_t = 1, global = true)]
    pub tenant: i64,
}

#[derive(Subcommand)]
pub enum Command {
    /// Migrate the patient export into the store.
    Patients(PatientsArgs),

    /// Migrate the encounter export, linking each row to a patient.
    Encounters(EncountersArgs),

    /// Report stored patient records that look like duplicates.
    Dedupe(DedupeArgs),

    /// Rewrite legacy encounter codes into the patient-prefixed format.
    RepairCodes,
}

#[derive(Parser)]
pub struct PatientsArgs {
    /// CSV export of the legacy patient spreadsheet.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Run every stage but write nothing.
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// Process only the first N rows.
    #[arg(long, value_name = "N")]
    pub limit: Option<usize>,

    /// Rows per committed batch.
    #[arg(long = "batch-size", value_name = "N", default_value_t = 500)]
    pub batch_size: usize,

    /// Update existing patients when their code already exists.
    #[arg(long)]
    pub upsert: bool,

    /// Where to write the JSON run report (default: timestamped file).
    #[arg(long = "report-file", value_name = "PATH")]
    pub report_file: Option<PathBuf>,
}

#[derive(Parser)]
pub struct EncountersArgs {
    /// CSV export of the legacy encounter spreadsheet.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Run every stage but write nothing.
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// Process only the first N rows.
    #[arg(long, value_name = "N")]
    pub limit: Option<usize>,

    /// Rows per committed batch.
    #[arg(long = "batch-size", value_name = "N", default_value_t = 500)]
    pub batch_size: usize,

    /// Where to write the JSON run report (default: timestamped file).
    #[arg(long = "report-file", value_name = "PATH")]
    pub report_file: Option<PathBuf>,
}

#[derive(Parser)]
pub struct DedupeArgs {
    /// Where to write the JSON audit report (default: timestamped file).
    #[arg(long = "report-file", value_name = "PATH")]
    pub report_file: Option<PathBuf>,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
