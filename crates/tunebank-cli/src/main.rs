// tunebank-cli/src/main.rs
// ============================================================================
// Module: Tunebank CLI Entry Point
// Description: Command dispatcher for offline tuning-database workflows.
// Purpose: Provide conversion and inspection commands over work directories.
// Dependencies: clap, tunebank-cli
// ============================================================================

//! ## Overview
//! The `tunebank` binary converts newline-delimited JSON dumps into the
//! store's `SQLite` table files and reports row stats for a work directory.
//! All failures are reported on stderr with a nonzero exit code.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use clap::Subcommand;
use tunebank_cli::convert_work_dir;
use tunebank_cli::stats_for_work_dir;

// ============================================================================
// SECTION: Arguments
// ============================================================================

/// Offline tooling for Tunebank tuning databases.
#[derive(Debug, Parser)]
#[command(name = "tunebank", version, about)]
struct Cli {
    /// Command to run.
    #[command(subcommand)]
    command: Command,
}

/// Supported commands.
#[derive(Debug, Subcommand)]
enum Command {
    /// Convert newline-delimited JSON dumps into SQLite table files.
    Convert {
        /// Work directory holding the dumps; outputs are written beside them.
        #[arg(long = "work-dir")]
        work_dir: PathBuf,
    },
    /// Print row counts for the tables in a work directory.
    Stats {
        /// Work directory holding the SQLite table files.
        #[arg(long = "work-dir")]
        work_dir: PathBuf,
    },
}

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point.
fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli.command) {
        Ok(output) => {
            let mut stdout = std::io::stdout();
            if writeln!(&mut stdout, "{output}").is_err() {
                return ExitCode::FAILURE;
            }
            ExitCode::SUCCESS
        }
        Err(message) => {
            let mut stderr = std::io::stderr();
            let _ = writeln!(&mut stderr, "error: {message}");
            ExitCode::FAILURE
        }
    }
}

/// Dispatches one command, rendering its report.
fn run(command: &Command) -> Result<String, String> {
    match command {
        Command::Convert { work_dir } => {
            let summary = convert_work_dir(work_dir).map_err(|err| err.to_string())?;
            Ok(format!(
                "converted {} workloads and {} tuning records\ncreated {}\ncreated {}",
                summary.workloads,
                summary.tuning_records,
                summary.path_workload.display(),
                summary.path_tuning_record.display()
            ))
        }
        Command::Stats { work_dir } => {
            let summary = stats_for_work_dir(work_dir).map_err(|err| err.to_string())?;
            Ok(format!(
                "workloads: {}\ntuning records: {}\nvalid for ranking: {}",
                summary.workloads, summary.tuning_records, summary.valid_records
            ))
        }
    }
}
