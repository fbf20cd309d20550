//! sheetcal configuration.
//!
//! Optional defaults for conversions, read from
//! `~/.config/sheetcal/config.toml` (or an explicit path) and overridden by
//! `SHEETCAL_*` environment variables. Command-line flags override both.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::convert::RunMode;
use crate::error::{ConvertError, ConvertResult};
use crate::mapping::ColumnMapping;
use crate::temporal::{DEFAULT_TIME_ZONE, DateOrder, TimeZoneSpec};

#[derive(Deserialize, Clone, Debug, Default, PartialEq)]
pub struct SheetcalConfig {
    /// IANA zone name, or `local`.
    pub timezone: Option<String>,

    /// Read numeric dates day first (`01/02/2024` is February 1st).
    #[serde(default)]
    pub day_first: bool,

    /// `abort`, `collect` or `skip`.
    pub mode: Option<String>,

    /// Explicit mapping, column reference to field tag. Entries are applied
    /// in key order, so when two references name the same column the later
    /// key wins.
    #[serde(default)]
    pub columns: BTreeMap<String, String>,
}

impl SheetcalConfig {
    pub fn config_path() -> ConvertResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| ConvertError::Config("Could not determine config directory".into()))?
            .join("sheetcal");

        Ok(config_dir.join("config.toml"))
    }

    /// Load configuration. An explicit `path` must exist; the default
    /// location is optional.
    pub fn load(path: Option<&Path>) -> ConvertResult<Self> {
        let file = match path {
            Some(path) => File::from(path.to_path_buf()).required(true),
            None => File::from(Self::config_path()?).required(false),
        };

        Config::builder()
            .add_source(file)
            .add_source(Environment::with_prefix("SHEETCAL"))
            .build()
            .map_err(|e| ConvertError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| ConvertError::Config(e.to_string()))
    }

    /// The configured mapping, or `None` to use the default layout.
    pub fn mapping(&self) -> ConvertResult<Option<ColumnMapping>> {
        if self.columns.is_empty() {
            return Ok(None);
        }
        ColumnMapping::from_pairs(&self.columns).map(Some)
    }

    pub fn time_zone(&self) -> ConvertResult<Option<TimeZoneSpec>> {
        self.timezone
            .as_deref()
            .map(|name| TimeZoneSpec::parse(name).map_err(ConvertError::from))
            .transpose()
    }

    pub fn date_order(&self) -> DateOrder {
        if self.day_first {
            DateOrder::DayFirst
        } else {
            DateOrder::MonthFirst
        }
    }

    pub fn run_mode(&self) -> ConvertResult<Option<RunMode>> {
        self.mode.as_deref().map(str::parse).transpose()
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> ConvertResult<()> {
        let contents = format!(
            "\
# sheetcal configuration

# Time zone applied to every event (IANA name, or \"local\"):
# timezone = \"{DEFAULT_TIME_ZONE}\"

# Read 01/02/2024 as February 1st instead of January 2nd:
# day_first = false

# What to do with rows that cannot be converted: abort, collect or skip
# mode = \"abort\"

# Which column holds which field (numbers or letters). Without this
# section columns A-E are summary, start date, start time, end date, end time.
# [columns]
# A = \"event_summary\"
# B = \"start_date\"
# C = \"start_time\"
# D = \"end_date\"
# E = \"end_time\"
"
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                ConvertError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| ConvertError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}
