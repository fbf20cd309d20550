use std::path::Path;

use anyhow::Result;
use owo_colors::OwoColorize;
use sheetcal_core::{Table, mapping};

use crate::render::Render;

pub fn run(input: &Path, map: &[String], config: Option<&Path>) -> Result<()> {
    let config = super::load_config(config)?;
    let explicit = super::resolve_mapping(map, &config)?;
    let using_default = explicit.is_none();

    let table = Table::load(input)?;
    let header = table.header().unwrap_or_default();
    let mapping = mapping::resolve(Some(header), explicit);

    println!("{}", input.display().bold());
    for info in mapping.describe(header) {
        println!("  {}", info.render());
    }

    if using_default {
        println!(
            "\n{}",
            "Using the default layout. Change it with --map COL=FIELD or [columns] in the config file."
                .dimmed()
        );
    }

    Ok(())
}
