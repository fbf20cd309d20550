mod commands;
mod render;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sheetcal")]
#[command(version)]
#[command(about = "Convert spreadsheet rows into an iCalendar (.ics) file")]
struct Cli {
    /// Log every row and phase to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a spreadsheet (xlsx, xls, ods, csv, tsv) into an .ics file
    Convert {
        input: PathBuf,
        output: PathBuf,

        /// Time zone for every event (IANA name, or "local")
        #[arg(long = "tz")]
        timezone: Option<String>,

        /// Map a column to a field, e.g. "A=event_summary" or "3=start_time".
        /// Repeat for each column; replaces the default layout.
        #[arg(short, long = "map", value_name = "COL=FIELD")]
        map: Vec<String>,

        /// Read numeric dates day first (01/02/2024 is February 1st)
        #[arg(long)]
        day_first: bool,

        /// Read numeric dates month first, even if the config says day_first
        #[arg(long, conflicts_with = "day_first")]
        month_first: bool,

        /// What to do with rows that cannot be converted: abort, collect or skip
        #[arg(long)]
        mode: Option<String>,

        /// Config file to use instead of the default location
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Show each column's header and the field it is mapped to
    Columns {
        input: PathBuf,

        /// Same as for `convert`
        #[arg(short, long = "map", value_name = "COL=FIELD")]
        map: Vec<String>,

        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// List known time zone names
    Timezones {
        /// Only show zones containing this text (case-insensitive)
        filter: Option<String>,
    },
    /// Write a commented default config file
    InitConfig {
        /// Where to write it (defaults to the standard config location)
        #[arg(long)]
        path: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Convert {
            input,
            output,
            timezone,
            map,
            day_first,
            month_first,
            mode,
            config,
        } => commands::convert::run(commands::convert::Args {
            input,
            output,
            timezone,
            map,
            day_first,
            month_first,
            mode,
            config,
        }),
        Commands::Columns { input, map, config } => {
            commands::columns::run(&input, &map, config.as_deref())
        }
        Commands::Timezones { filter } => commands::timezones::run(filter.as_deref()),
        Commands::InitConfig { path, force } => commands::init_config::run(path, force),
    }
}

/// Log to stderr. `RUST_LOG` wins unless `--verbose` is given.
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
