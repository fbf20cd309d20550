use anyhow::Result;
use chrono_tz::TZ_VARIANTS;

pub fn run(filter: Option<&str>) -> Result<()> {
    let names = matching_zones(filter);

    if names.is_empty() {
        anyhow::bail!(
            "No time zone matches '{}'. Run `sheetcal timezones` for the full list.",
            filter.unwrap_or_default()
        );
    }

    for name in names {
        println!("{name}");
    }

    Ok(())
}

fn matching_zones(filter: Option<&str>) -> Vec<&'static str> {
    let needle = filter.map(str::to_lowercase);
    let mut names: Vec<&'static str> = TZ_VARIANTS
        .iter()
        .map(|tz| tz.name())
        .filter(|name| {
            needle
                .as_deref()
                .is_none_or(|needle| name.to_lowercase().contains(needle))
        })
        .collect();
    names.sort_unstable();
    names
}
