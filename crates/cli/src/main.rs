// bookmatch - ledger reconciliation runs from the shell.
// Dry-run everywhere by default; `--write` is the only way to mutate.

mod exit_codes;

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use bookmatch_engine::config::{LedgerPair, ReconcileConfig};
use bookmatch_engine::report::{render_report, render_summary};
use bookmatch_engine::EngineError;
use bookmatch_store::run::{execute, init_schema, open};
use bookmatch_store::StoreError;

use exit_codes::{
    EXIT_COMMIT, EXIT_CONFIG, EXIT_SNAPSHOT, EXIT_STORAGE, EXIT_SUCCESS, EXIT_USAGE,
};

#[derive(Parser)]
#[command(name = "bookmatch")]
#[command(about = "Reconcile financial ledgers: match, dedup, find transfers")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a reconciliation over the database (dry-run unless --write)
    #[command(after_help = "\
Examples:
  bookmatch run --db books.db
  bookmatch run --db books.db --ledger-pair transfer-scan
  bookmatch run --db books.db --config recon.toml --write
  bookmatch run --db books.db --json --output resolution.json")]
    Run {
        /// SQLite database file
        #[arg(long)]
        db: PathBuf,

        /// TOML config file; flags below override its values
        #[arg(long)]
        config: Option<PathBuf>,

        /// Which ledger pair to reconcile
        #[arg(long)]
        ledger_pair: Option<LedgerPair>,

        /// Mutate the database (snapshot is taken first)
        #[arg(long)]
        write: bool,

        /// Amount ceiling in cents; differences at or past it never match
        #[arg(long)]
        amount_tolerance: Option<i64>,

        #[arg(long)]
        date_window_days: Option<u32>,

        #[arg(long)]
        min_confidence: Option<f64>,

        /// Emit the full resolution as JSON instead of the report
        #[arg(long)]
        json: bool,

        /// Write report/JSON to a file instead of stdout
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Parse and validate a config file without running
    Validate {
        /// TOML config file
        config: PathBuf,
    },

    /// Create the ledger tables in a new or existing database
    InitDb {
        /// SQLite database file
        #[arg(long)]
        db: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let code = match cli.command {
        Commands::Run {
            db,
            config,
            ledger_pair,
            write,
            amount_tolerance,
            date_window_days,
            min_confidence,
            json,
            output,
        } => cmd_run(
            db,
            config,
            ledger_pair,
            write,
            amount_tolerance,
            date_window_days,
            min_confidence,
            json,
            output,
        ),
        Commands::Validate { config } => cmd_validate(config),
        Commands::InitDb { db } => cmd_init_db(db),
    };
    ExitCode::from(code)
}

#[allow(clippy::too_many_arguments)]
fn cmd_run(
    db: PathBuf,
    config_path: Option<PathBuf>,
    ledger_pair: Option<LedgerPair>,
    write: bool,
    amount_tolerance: Option<i64>,
    date_window_days: Option<u32>,
    min_confidence: Option<f64>,
    json: bool,
    output: Option<PathBuf>,
) -> u8 {
    let mut config = match load_config(config_path) {
        Ok(config) => config,
        Err(code) => return code,
    };
    if let Some(pair) = ledger_pair {
        config.ledger_pair = pair;
    }
    if let Some(tolerance) = amount_tolerance {
        config.amount_tolerance_cents = tolerance;
    }
    if let Some(days) = date_window_days {
        config.date_window_days = days;
        // Widen the index buckets if the override outgrew them.
        if config.bucket_days < days {
            config.bucket_days = days;
        }
    }
    if let Some(floor) = min_confidence {
        config.min_confidence = floor;
    }
    config.write = write;

    if let Err(e) = config.validate() {
        eprintln!("bookmatch: {e}");
        return EXIT_CONFIG;
    }

    let mut conn = match open(&db) {
        Ok(conn) => conn,
        Err(e) => {
            eprintln!("bookmatch: {e}");
            return EXIT_STORAGE;
        }
    };

    let outcome = match execute(&mut conn, &config) {
        Ok(outcome) => outcome,
        Err(e) => {
            eprintln!("bookmatch: {e}");
            return store_exit_code(&e);
        }
    };

    for snapshot in &outcome.snapshots {
        eprintln!(
            "snapshot: {} -> {} ({} rows)",
            snapshot.source_table, snapshot.snapshot_table, snapshot.rows
        );
    }

    let rendered = if json {
        match serde_json::to_string_pretty(&outcome.resolution) {
            Ok(text) => text,
            Err(e) => {
                eprintln!("bookmatch: cannot serialize resolution: {e}");
                return EXIT_STORAGE;
            }
        }
    } else {
        match render_report(&outcome.resolution, b'\t') {
            Ok(text) => text,
            Err(e) => {
                eprintln!("bookmatch: {e}");
                return EXIT_STORAGE;
            }
        }
    };

    match output {
        Some(path) => {
            if let Err(e) = fs::write(&path, rendered) {
                eprintln!("bookmatch: cannot write {}: {e}", path.display());
                return EXIT_STORAGE;
            }
        }
        None => print!("{rendered}"),
    }

    eprintln!("{}", render_summary(&outcome.resolution));
    if let Some(stats) = outcome.applied {
        eprintln!(
            "applied: {} link(s) written, {} superseded deleted, {} FK(s) re-pointed",
            stats.links_written, stats.superseded_deleted, stats.fks_repointed
        );
    } else {
        eprintln!("dry run: no changes written (pass --write to apply)");
    }
    EXIT_SUCCESS
}

fn cmd_validate(path: PathBuf) -> u8 {
    let text = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("bookmatch: cannot read {}: {e}", path.display());
            return EXIT_USAGE;
        }
    };
    match ReconcileConfig::from_toml(&text) {
        Ok(config) => {
            println!(
                "ok: ledger_pair={} tolerance={}c window={}d floor={}",
                config.ledger_pair,
                config.amount_tolerance_cents,
                config.date_window_days,
                config.min_confidence
            );
            EXIT_SUCCESS
        }
        Err(e) => {
            eprintln!("bookmatch: {e}");
            EXIT_CONFIG
        }
    }
}

fn cmd_init_db(db: PathBuf) -> u8 {
    let conn = match open(&db) {
        Ok(conn) => conn,
        Err(e) => {
            eprintln!("bookmatch: {e}");
            return EXIT_STORAGE;
        }
    };
    if let Err(e) = init_schema(&conn) {
        eprintln!("bookmatch: {e}");
        return EXIT_STORAGE;
    }
    eprintln!("initialized {}", db.display());
    EXIT_SUCCESS
}

fn load_config(path: Option<PathBuf>) -> Result<ReconcileConfig, u8> {
    match path {
        None => Ok(ReconcileConfig::default()),
        Some(path) => {
            let text = fs::read_to_string(&path).map_err(|e| {
                eprintln!("bookmatch: cannot read {}: {e}", path.display());
                EXIT_USAGE
            })?;
            ReconcileConfig::from_toml(&text).map_err(|e| {
                eprintln!("bookmatch: {e}");
                EXIT_CONFIG
            })
        }
    }
}

fn store_exit_code(error: &StoreError) -> u8 {
    match error {
        StoreError::SnapshotFailure { .. } => EXIT_SNAPSHOT,
        StoreError::CommitFailure { .. } => EXIT_COMMIT,
        StoreError::Engine(EngineError::ConfigParse(_))
        | StoreError::Engine(EngineError::ConfigValidation(_)) => EXIT_CONFIG,
        StoreError::Open { .. } | StoreError::Query { .. } | StoreError::Engine(_) => {
            EXIT_STORAGE
        }
    }
}
