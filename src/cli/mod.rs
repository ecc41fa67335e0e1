use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use diaqc::diagnostics::Diagnostics;
use diaqc::store::DiaDatabase;

mod config;
mod import;
mod inclusion;
mod info;
mod mask;
mod meta;

/// diaqc - DIA QC database maintenance
#[derive(Parser)]
#[command(name = "diaqc")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Verbosity level (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new, empty QC database
    Init {
        /// Database file to create
        #[arg(value_name = "DB")]
        db: PathBuf,
    },

    /// Check that a database matches this program's schema version
    Check {
        /// Database file
        #[arg(value_name = "DB")]
        db: PathBuf,
    },

    /// Display replicates, inclusion state and annotation types
    Info {
        /// Database file
        #[arg(value_name = "DB")]
        db: PathBuf,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Import replicates from a table with replicate, acquiredTime and ticArea columns
    ImportReplicates {
        /// Database file
        #[arg(value_name = "DB")]
        db: PathBuf,

        /// Project the replicates belong to
        #[arg(short, long)]
        project: String,

        /// Replicate table (.tsv or .csv)
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Import sample annotations for replicates of one project
    ImportAnnotations {
        /// Database file
        #[arg(value_name = "DB")]
        db: PathBuf,

        /// Project the annotated replicates belong to
        #[arg(short, long)]
        project: String,

        /// Annotation table (.tsv, .csv or .json)
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Exclude replicates by name and/or whole projects
    Exclude {
        /// Database file
        #[arg(value_name = "DB")]
        db: PathBuf,

        /// Replicate name to exclude (repeatable)
        #[arg(short, long = "replicate", value_name = "NAME")]
        replicates: Vec<String>,

        /// Project to exclude (repeatable)
        #[arg(short, long = "project", value_name = "NAME")]
        projects: Vec<String>,
    },

    /// Include every replicate again
    IncludeAll {
        /// Database file
        #[arg(value_name = "DB")]
        db: PathBuf,
    },

    /// Recompute acquisition ranks of included replicates
    UpdateRanks {
        /// Database file
        #[arg(value_name = "DB")]
        db: PathBuf,
    },

    /// Print one value from the metadata table
    GetMeta {
        /// Database file
        #[arg(value_name = "DB")]
        db: PathBuf,

        /// Metadata key
        key: String,
    },

    /// Set metadata values atomically
    SetMeta {
        /// Database file
        #[arg(value_name = "DB")]
        db: PathBuf,

        /// KEY=VALUE pairs
        #[arg(value_name = "KEY=VALUE", required = true)]
        pairs: Vec<String>,
    },

    /// Decode a report option bitmask
    ParseMask {
        /// Mask to decode (defaults to the configured mask)
        #[arg(value_name = "MASK")]
        mask: Option<String>,

        /// Load digit and option names from a TOML config file
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    pub fn verbosity(&self) -> u8 {
        self.verbose
    }
}

pub fn init_logging(verbosity: u8) {
    let log_level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();
}

pub fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Init { db } => info::init(db),
        Commands::Check { db } => info::check(db),
        Commands::Info { db, json } => info::run(db, json),
        Commands::ImportReplicates { db, project, file } => import::replicates(db, project, file),
        Commands::ImportAnnotations { db, project, file } => {
            import::annotations(db, project, file)
        }
        Commands::Exclude {
            db,
            replicates,
            projects,
        } => inclusion::exclude(db, replicates, projects),
        Commands::IncludeAll { db } => inclusion::include_all(db),
        Commands::UpdateRanks { db } => inclusion::update_ranks(db),
        Commands::GetMeta { db, key } => meta::get(db, key),
        Commands::SetMeta { db, pairs } => meta::set(db, pairs),
        Commands::ParseMask { mask, config, json } => mask::run(mask, config, json),
    }
}

/// Open a database through the schema gate, printing the diagnostics on failure.
fn open_database(path: &Path, diagnostics: &mut Diagnostics) -> Result<DiaDatabase> {
    if !path.exists() {
        anyhow::bail!("Database does not exist: {}", path.display());
    }
    let db = DiaDatabase::open(path, diagnostics);
    if db.is_err() {
        print_diagnostics(diagnostics);
    }
    db.with_context(|| format!("Failed to open database: {}", path.display()))
}

/// Print collected diagnostics to stderr, if there are any.
fn print_diagnostics(diagnostics: &Diagnostics) {
    if diagnostics.is_empty() {
        return;
    }

    #[cfg(feature = "colorized_output")]
    {
        eprintln!("{}", diagnostics.format_colored());
    }

    #[cfg(not(feature = "colorized_output"))]
    {
        eprintln!("{}", diagnostics);
    }
}
