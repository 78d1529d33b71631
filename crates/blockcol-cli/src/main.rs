//! blockcol command-line interface
//!
//! Inspect and scan block-columnar files.
//!
//! # Usage
//!
//! ```bash
//! # Show the catalog, with per-block statistics
//! blockcol inspect farm.db721 --blocks
//!
//! # Scan with a pushed-down predicate
//! blockcol scan farm.db721 --columns farm_name,min_age_weeks --where "min_age_weeks < 10"
//!
//! # Output as JSON
//! blockcol scan farm.db721 -o json --limit 5
//!
//! # Estimate the rows a predicate can match
//! blockcol estimate farm.db721 --where "farm_name = 'Incredible Farm'"
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod filter;
mod formatter;

use commands::ScanOptions;
use config::CliConfig;
use formatter::OutputFormat;

/// blockcol command-line interface
#[derive(Parser, Debug)]
#[command(
    name = "blockcol",
    version,
    about = "Inspect and scan block-columnar files",
    long_about = "Inspect the footer catalog of a block-columnar file, scan its rows with\n\
                  one pushed-down comparison, or estimate how many rows a comparison\n\
                  can match from block statistics alone."
)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Enable verbose output
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    /// Configuration file path
    #[arg(long, value_name = "FILE", global = true, env = "BLOCKCOL_CONFIG")]
    config: Option<PathBuf>,

    /// Disable block skipping
    #[arg(long, global = true)]
    no_prune: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show a file's schema and statistics
    Inspect {
        /// File to inspect
        file: PathBuf,

        /// List per-block statistics
        #[arg(long)]
        blocks: bool,
    },

    /// Print rows, optionally filtered by one comparison
    Scan {
        /// File to scan
        file: PathBuf,

        /// Comma-separated columns to return
        #[arg(short = 'c', long, value_delimiter = ',')]
        columns: Vec<String>,

        /// Comparison to push down, e.g. "age >= 30"
        #[arg(short = 'w', long = "where", value_name = "CLAUSE")]
        clause: Option<String>,

        /// Maximum rows to print
        #[arg(short = 'n', long)]
        limit: Option<usize>,

        /// Output format
        #[arg(short = 'o', long, value_enum)]
        output: Option<OutputFormatArg>,
    },

    /// Estimate the rows a comparison can match
    Estimate {
        /// File to examine
        file: PathBuf,

        /// Comparison, e.g. "age >= 30"
        #[arg(short = 'w', long = "where", value_name = "CLAUSE")]
        clause: String,
    },
}

/// Output format argument
#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormatArg {
    /// Display results in a formatted table
    Table,
    /// Display results as JSON
    Json,
    /// Display results as CSV
    Csv,
}

impl From<OutputFormatArg> for OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Table => OutputFormat::Table,
            OutputFormatArg::Json => OutputFormat::Json,
            OutputFormatArg::Csv => OutputFormat::Csv,
        }
    }
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let args = Args::parse();

    init_logging(args.verbose);

    let config = load_config(&args)?;
    debug!("Configuration: {:?}", config);

    let mut reader = config.reader.clone();
    if args.no_prune {
        reader.prune_blocks = false;
    }

    match args.command {
        Command::Inspect { file, blocks } => {
            print!("{}", commands::inspect(&file, reader, blocks)?);
        }
        Command::Scan {
            file,
            columns,
            clause,
            limit,
            output,
        } => {
            let format = match output {
                Some(arg) => arg.into(),
                None => config.output_format.parse()?,
            };
            let options = ScanOptions {
                columns,
                clause,
                limit: limit.or(config.limit),
            };
            let (text, stats) = commands::scan(&file, reader, &options, format)?;
            println!("{text}");
            if args.verbose {
                eprintln!("{}", commands::describe_stats(&stats));
            }
        }
        Command::Estimate { file, clause } => {
            println!("{}", commands::estimate(&file, reader, &clause)?);
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("blockcol_cli=debug,blockcol_scan=debug,blockcol_format=debug")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(args: &Args) -> Result<CliConfig> {
    match &args.config {
        Some(path) => CliConfig::from_file(path),
        None => CliConfig::load_default(),
    }
}
