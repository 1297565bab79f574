use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::model::Metric;

#[derive(Parser, Debug)]
#[command(name = "upi-pulse")]
#[command(version, about = "Flatten PhonePe Pulse transaction reports and query them")]
pub struct Cli {
    /// TOML settings file
    #[arg(short, long, global = true, env = "UPI_PULSE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Print query results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every command that builds a table
#[derive(Args, Debug, Clone)]
pub struct BuildOptions {
    /// Abort on the first unreadable directory instead of skipping it
    #[arg(long)]
    pub strict: bool,

    /// GeoJSON boundaries to check region names against
    #[arg(short, long)]
    pub boundaries: Option<PathBuf>,

    /// Show the full-screen progress display
    #[arg(long)]
    pub tui: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Download the latest corpus (if needed) and build the table
    Sync {
        /// Output table (.csv, or .db/.sqlite for SQLite)
        output: PathBuf,

        /// Force re-download even if cached
        #[arg(short, long)]
        force: bool,

        /// Custom cache directory
        #[arg(long)]
        cache_dir: Option<PathBuf>,

        #[command(flatten)]
        build: BuildOptions,
    },

    /// Download and unpack the latest corpus snapshot
    Fetch {
        /// Custom cache directory
        #[arg(long)]
        cache_dir: Option<PathBuf>,

        /// Force re-download even if cached
        #[arg(short, long)]
        force: bool,
    },

    /// Build the table from a local region/year/quarter tree
    Build {
        /// Root of the corpus (one directory per region)
        corpus_dir: PathBuf,

        /// Output table (.csv, or .db/.sqlite for SQLite)
        output: PathBuf,

        #[command(flatten)]
        build: BuildOptions,
    },

    /// Totals and available years, quarters, categories and regions
    Overview {
        table: PathBuf,
    },

    /// Rows for one year, quarter and transaction type
    Filter {
        table: PathBuf,

        #[arg(short, long)]
        year: i32,

        #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=4))]
        quarter: u8,

        /// Transaction type, matched exactly
        #[arg(short = 't', long = "type")]
        category: String,
    },

    /// Per-region sums for one year and quarter
    ByRegion {
        table: PathBuf,

        #[arg(short, long)]
        year: i32,

        #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=4))]
        quarter: u8,

        #[arg(short, long, default_value = "amount")]
        metric: Metric,
    },

    /// Per-period series for one or more regions
    Series {
        table: PathBuf,

        /// Region as stored in the table (repeat or comma-separate)
        #[arg(short, long = "region", value_delimiter = ',', required = true)]
        regions: Vec<String>,

        #[arg(short, long, default_value = "amount")]
        metric: Metric,
    },

    /// Per-region sums for one period joined to boundary features
    Map {
        table: PathBuf,

        boundaries: PathBuf,

        #[arg(short, long)]
        year: i32,

        #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=4))]
        quarter: u8,

        #[arg(short, long, default_value = "amount")]
        metric: Metric,
    },

    /// Regions in the table with no boundary feature
    Unmatched {
        table: PathBuf,

        boundaries: PathBuf,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

impl Commands {
    /// Whether the command takes over the terminal with the progress display
    pub fn uses_tui(&self) -> bool {
        match self {
            Commands::Sync { build, .. } | Commands::Build { build, .. } => build.tui,
            _ => false,
        }
    }
}
