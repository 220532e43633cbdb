//! Command implementations: open the store, load rows, drive the pipeline,
//! write the report artifact.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use tracing::info;

use clinmig_cli::pipeline;
use clinmig_cli::report::{self, DedupeReport};
use clinmig_ingest::RowSet;
use clinmig_match::repair_encounter_codes;
use clinmig_model::{ConflictPolicy, MigrationConfig, RunMode, RunReport, RunStats, TenantId};
use clinmig_store::{PgStore, StoreConfig};

use crate::cli::{Cli, DedupeArgs, EncountersArgs, PatientsArgs};
use crate::summary::{print_dedupe_summary, print_repair_summary, print_run_summary};

pub fn run_patients(cli: &Cli, args: &PatientsArgs) -> Result<RunStats> {
    let config = base_config(cli)
        .with_mode(run_mode(args.dry_run))
        .with_conflict_policy(if args.upsert {
            ConflictPolicy::Upsert
        } else {
            ConflictPolicy::Insert
        })
        .with_batch_size(args.batch_size)
        .with_row_limit(args.limit);
    let mut store = open_store(cli)?;
    let table = load_rows(&args.file, &config)?;
    let stats = pipeline::migrate_patients(&mut store, &table, &config);
    finish_run(&args.file, args.report_file.as_deref(), "patients", &config, stats)
}

pub fn run_encounters(cli: &Cli, args: &EncountersArgs) -> Result<RunStats> {
    let config = base_config(cli)
        .with_mode(run_mode(args.dry_run))
        .with_batch_size(args.batch_size)
        .with_row_limit(args.limit);
    let mut store = open_store(cli)?;
    let table = load_rows(&args.file, &config)?;
    let stats = pipeline::migrate_encounters(&mut store, &table, &config);
    finish_run(&args.file, args.report_file.as_deref(), "encounters", &config, stats)
}

pub fn run_dedupe(cli: &Cli, args: &DedupeArgs) -> Result<()> {
    let config = base_config(cli);
    let mut store = open_store(cli)?;
    let (total, groups) = pipeline::scan_duplicates(&mut store, &config)?;
    let dedupe = DedupeReport::new(total, groups);
    let path = args
        .report_file
        .clone()
        .unwrap_or_else(|| report::default_report_path("duplicates"));
    report::write_json(&path, &dedupe)?;
    print_dedupe_summary(&dedupe);
    println!("Report: {}", path.display());
    Ok(())
}

pub fn run_repair(cli: &Cli) -> Result<usize> {
    let config = base_config(cli);
    let mut store = open_store(cli)?;
    let outcome = repair_encounter_codes(&mut store, &config)?;
    print_repair_summary(&outcome);
    Ok(outcome.errors.len())
}

fn base_config(cli: &Cli) -> MigrationConfig {
    MigrationConfig::default().with_tenant(TenantId::new(cli.tenant))
}

fn run_mode(dry_run: bool) -> RunMode {
    if dry_run {
        RunMode::Simulate
    } else {
        RunMode::Production
    }
}

/// Connect to the store; a failure here aborts before any row is processed.
fn open_store(cli: &Cli) -> Result<PgStore> {
    let Some(url) = cli.database_url.as_deref() else {
        bail!("no database configured; pass --database-url or set DATABASE_URL");
    };
    let config = StoreConfig::from_url(url)?;
    PgStore::connect(&config).context("connect to store")
}

fn load_rows(path: &Path, config: &MigrationConfig) -> Result<RowSet> {
    let mut table = RowSet::read_csv(path).context("read source rows")?;
    info!(rows = table.len(), source = %path.display(), "source rows loaded");
    if let Some(limit) = config.row_limit {
        table.truncate(limit);
        info!(rows = table.len(), "row limit applied");
    }
    Ok(table)
}

fn finish_run(
    source: &Path,
    report_file: Option<&Path>,
    kind: &str,
    config: &MigrationConfig,
    stats: RunStats,
) -> Result<RunStats> {
    let run_report = RunReport {
        timestamp: report::timestamp(),
        source: source.display().to_string(),
        mode: config.mode,
        stats,
    };
    let path: PathBuf = report_file
        .map(Path::to_path_buf)
        .unwrap_or_else(|| report::default_report_path(kind));
    report::write_json(&path, &run_report)?;
    print_run_summary(&run_report);
    println!("Report: {}", path.display());
    Ok(run_report.stats)
}
