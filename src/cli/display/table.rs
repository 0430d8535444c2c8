//! Table rendering for CLI output

use super::{ColorTheme, StatusIcon};
use crate::domain::verify::PollOutcome;
use crate::domain::workflow::ResourceResult;
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, CellAlignment, ContentArrangement, Table};

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Table renderer for formatted output
pub struct TableRenderer {
    theme: ColorTheme,
}

impl Default for TableRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TableRenderer {
    pub fn new() -> Self {
        Self {
            theme: ColorTheme::default(),
        }
    }

    /// Render verification results, one row per resource.
    pub fn render_results(&self, title: &str, results: &[ResourceResult]) -> String {
        if results.is_empty() {
            return format!("{}: no resource checked", title);
        }

        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec![
                Cell::new("SERVICE").set_alignment(CellAlignment::Left),
                Cell::new("RESULT").set_alignment(CellAlignment::Center),
                Cell::new("CHECKED AT").set_alignment(CellAlignment::Left),
            ]);

        for result in results {
            let outcome = result.outcome;
            table.add_row(vec![
                Cell::new(&result.service),
                Cell::new(format!(
                    "{} {}",
                    StatusIcon::for_outcome(outcome),
                    outcome.as_sentinel()
                ))
                .fg(self.theme.outcome_color(outcome))
                .set_alignment(CellAlignment::Center),
                Cell::new(result.checked_at.format(TIME_FORMAT).to_string()).fg(self.theme.muted),
            ]);
        }

        let matched = results.iter().filter(|r| r.outcome.is_matched()).count();

        let mut output = String::new();
        output.push_str(&format!(
            "╭─ {} {} ─╮\n",
            title,
            format!("[{}/{} verified]", matched, results.len()).bright_black()
        ));
        output.push_str(&table.to_string());
        output.push('\n');
        output.push_str(&format!(
            "Legend: {} {}  {} {}\n",
            StatusIcon::SUCCESS.green(),
            StatusIcon::status_text(PollOutcome::Matched),
            StatusIcon::ERROR.red(),
            StatusIcon::status_text(PollOutcome::Exhausted),
        ));

        output
    }

    /// Two-column key/value table for the startup summary.
    pub fn render_settings(&self, rows: &[(&str, String)]) -> String {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);

        for (key, value) in rows {
            table.add_row(vec![
                Cell::new(key).fg(self.theme.info),
                Cell::new(value),
            ]);
        }

        table.to_string()
    }
}
