//! # diaqc
//!
//! Command-line maintenance of DIA QC databases.
//!
//! ## Usage
//!
//! ```bash
//! # Create a database and load a project
//! diaqc init qc_data.db3
//! diaqc import-replicates qc_data.db3 --project Plasma replicates.tsv
//! diaqc import-annotations qc_data.db3 --project Plasma annotations.tsv
//!
//! # Drop a blank and a whole pilot project from the analysis
//! diaqc exclude qc_data.db3 -r Blank_01 -p Pilot
//!
//! # Decode a report table mask
//! diaqc parse-mask 53
//! ```

use anyhow::Result;
use clap::Parser;

mod cli;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli::init_logging(cli.verbosity());
    cli::dispatch(cli)
}
