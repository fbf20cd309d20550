pub mod columns;
pub mod convert;
pub mod init_config;
pub mod timezones;

use std::path::Path;

use anyhow::Result;
use sheetcal_core::{ColumnMapping, SheetcalConfig};

/// Mapping from `--map` flags, falling back to the config file's `[columns]`.
/// `None` means the default positional layout.
pub fn resolve_mapping(map: &[String], config: &SheetcalConfig) -> Result<Option<ColumnMapping>> {
    if map.is_empty() {
        return Ok(config.mapping()?);
    }
    Ok(Some(parse_map_flags(map)?))
}

/// Parse `COL=FIELD` flags into a mapping.
pub fn parse_map_flags(map: &[String]) -> Result<ColumnMapping> {
    let pairs = map
        .iter()
        .map(|flag| {
            flag.split_once('=').ok_or_else(|| {
                anyhow::anyhow!("Invalid --map '{flag}'. Expected COL=FIELD, e.g. A=event_summary")
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(ColumnMapping::from_pairs(pairs)?)
}

pub fn load_config(path: Option<&Path>) -> Result<SheetcalConfig> {
    Ok(SheetcalConfig::load(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sheetcal_core::Field;

    fn flags(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn map_flags_accept_letters_and_numbers() {
        let mapping = parse_map_flags(&flags(&["A=start_date", "2=event_summary", "c=end_date"]))
            .expect("Should parse map flags");
        assert_eq!(mapping.column_for(Field::StartDate), Some(1));
        assert_eq!(mapping.column_for(Field::EventSummary), Some(2));
        assert_eq!(mapping.column_for(Field::EndDate), Some(3));
    }

    #[test]
    fn map_flag_without_equals_is_rejected() {
        let err = parse_map_flags(&flags(&["A:start_date"])).unwrap_err();
        assert!(err.to_string().contains("COL=FIELD"), "Got: {err}");
    }

    #[test]
    fn map_flag_with_unknown_field_is_rejected() {
        assert!(parse_map_flags(&flags(&["A=location"])).is_err());
    }

    #[test]
    fn flags_override_config_columns() {
        let config = SheetcalConfig {
            columns: [("A".to_string(), "end_date".to_string())].into(),
            ..Default::default()
        };

        let from_config = resolve_mapping(&[], &config).unwrap().unwrap();
        assert_eq!(from_config.column_for(Field::EndDate), Some(1));

        let from_flags = resolve_mapping(&flags(&["B=end_date"]), &config).unwrap().unwrap();
        assert_eq!(from_flags.column_for(Field::EndDate), Some(2));
    }

    #[test]
    fn no_flags_and_no_config_means_default_layout() {
        assert!(resolve_mapping(&[], &SheetcalConfig::default()).unwrap().is_none());
    }
}
