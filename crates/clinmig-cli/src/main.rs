//! Legacy clinic record migration CLI.

use clap::{ColorChoice, Parser};
use std::io::{self, IsTerminal};
use tracing::level_filters::LevelFilter;

use clinmig_cli::logging::{LogConfig, LogFormat, init_logging};

mod cli;
mod commands;
mod summary;

use crate::cli::{Cli, Command, LogFormatArg, LogLevelArg};
use crate::commands::{run_dedupe, run_encounters, run_patients, run_repair};

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let exit_code = match &cli.command {
        Command::Patients(args) => match run_patients(&cli, args) {
            Ok(stats) => exit_code_for(stats.errors),
            Err(error) => fatal(&error),
        },
        Command::Encounters(args) => match run_encounters(&cli, args) {
            Ok(stats) => exit_code_for(stats.errors),
            Err(error) => fatal(&error),
        },
        Command::Dedupe(args) => match run_dedupe(&cli, args) {
            Ok(()) => 0,
            Err(error) => fatal(&error),
        },
        Command::RepairCodes => match run_repair(&cli) {
            Ok(errors) => exit_code_for(errors),
            Err(error) => fatal(&error),
        },
    };
    std::process::exit(exit_code);
}

fn exit_code_for(errors: usize) -> i32 {
    if errors > 0 { 1 } else { 0 }
}

fn fatal(error: &anyhow::Error) -> i32 {
    eprintln!("error: {error:#}");
    1
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level: cli.verbosity.tracing_level_filter(),
        ..LogConfig::default()
    };
    if let Some(level) = cli.log_level {
        config.level = match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        };
    }
    config.format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    config.log_file = cli.log_file.clone();
    config.log_data = cli.log_data;
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}
