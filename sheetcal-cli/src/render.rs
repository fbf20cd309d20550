//! Colored terminal rendering for sheetcal-core types.

use owo_colors::OwoColorize;
use sheetcal_core::mapping::ColumnInfo;
use sheetcal_core::{ConvertReport, Field, RowError};

pub trait Render {
    fn render(&self) -> String;
}

impl Render for ConvertReport {
    fn render(&self) -> String {
        let mut lines = vec![format!(
            "{} {} {} to {}",
            "✓".green(),
            self.events,
            if self.events == 1 { "event" } else { "events" },
            self.output.display()
        )];

        if self.skipped_blank > 0 {
            lines.push(
                format!("  {} blank rows ignored", self.skipped_blank)
                    .dimmed()
                    .to_string(),
            );
        }

        if !self.skipped.is_empty() {
            lines.push(format!(
                "{} {} rows skipped:",
                "!".yellow(),
                self.skipped.len()
            ));
            for error in &self.skipped {
                lines.push(format!("  {}", error.render()));
            }
        }

        lines.join("\n")
    }
}

impl Render for RowError {
    fn render(&self) -> String {
        format!(
            "{} {} {}",
            format!("row {}", self.row).yellow(),
            self.field.as_str().cyan(),
            self.kind
        )
    }
}

impl Render for ColumnInfo {
    fn render(&self) -> String {
        let position = format!("{:>3} {:<3}", self.column, self.letter);
        let label = if self.label.is_empty() {
            "(no header)".dimmed().to_string()
        } else {
            self.label.clone()
        };
        let field = match self.field {
            Field::Ignore => self.field.as_str().dimmed().to_string(),
            _ => self.field.as_str().green().to_string(),
        };

        format!("{} {label:<24} → {field}", position.dimmed())
    }
}
