use std::path::PathBuf;

use anyhow::Result;
use owo_colors::OwoColorize;
use sheetcal_core::SheetcalConfig;

pub fn run(path: Option<PathBuf>, force: bool) -> Result<()> {
    let path = match path {
        Some(path) => path,
        None => SheetcalConfig::config_path()?,
    };

    if path.exists() && !force {
        anyhow::bail!(
            "Config file already exists at {}. Use --force to overwrite it.",
            path.display()
        );
    }

    SheetcalConfig::create_default_config(&path)?;
    println!("{} {}", "Wrote".green(), path.display());

    Ok(())
}
