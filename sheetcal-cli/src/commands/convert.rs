use std::path::PathBuf;

use anyhow::Result;
use owo_colors::OwoColorize;
use sheetcal_core::{ConvertError, ConvertOptions, DateOrder, RunMode, TimeZoneSpec, convert};
use tracing::debug;

use crate::render::Render;

pub struct Args {
    pub input: PathBuf,
    pub output: PathBuf,
    pub timezone: Option<String>,
    pub map: Vec<String>,
    pub day_first: bool,
    pub month_first: bool,
    pub mode: Option<String>,
    pub config: Option<PathBuf>,
}

pub fn run(args: Args) -> Result<()> {
    let options = build_options(args)?;

    match convert(&options) {
        Ok(report) => {
            println!("{}", report.render());
            Ok(())
        }
        Err(ConvertError::Rows { path, errors }) => {
            eprintln!(
                "{} {} rows in {} could not be converted:",
                "error:".red().bold(),
                errors.len(),
                path.display()
            );
            for error in &errors {
                eprintln!("  {}", error.render());
            }
            anyhow::bail!("Nothing was written to {}", options.output.display());
        }
        Err(e) => Err(e.into()),
    }
}

/// Merge flags over config-file values over defaults.
fn build_options(args: Args) -> Result<ConvertOptions> {
    let config = super::load_config(args.config.as_deref())?;

    let zone = match args.timezone.as_deref() {
        Some(name) => TimeZoneSpec::parse(name)?,
        None => config.time_zone()?.unwrap_or_default(),
    };

    let order = match (args.day_first, args.month_first) {
        (true, _) => DateOrder::DayFirst,
        (_, true) => DateOrder::MonthFirst,
        _ => config.date_order(),
    };

    let mode = match args.mode.as_deref() {
        Some(mode) => mode.parse::<RunMode>()?,
        None => config.run_mode()?.unwrap_or_default(),
    };

    let mapping = super::resolve_mapping(&args.map, &config)?;

    let options = ConvertOptions {
        input: args.input,
        output: args.output,
        mapping,
        zone,
        order,
        mode,
    };
    debug!(?options, "resolved options");
    Ok(options)
}
