//! Color theme for CLI output

use crate::domain::verify::PollOutcome;
use comfy_table::Color as TableColor;

#[derive(Debug, Clone)]
pub struct ColorTheme {
    pub success: TableColor,
    pub error: TableColor,
    pub info: TableColor,
    pub muted: TableColor,
}

impl Default for ColorTheme {
    fn default() -> Self {
        Self {
            success: TableColor::Green,
            error: TableColor::Red,
            info: TableColor::Cyan,
            muted: TableColor::DarkGrey,
        }
    }
}

impl ColorTheme {
    pub fn outcome_color(&self, outcome: PollOutcome) -> TableColor {
        match outcome {
            PollOutcome::Matched => self.success,
            PollOutcome::Exhausted => self.error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_color() {
        let theme = ColorTheme::default();
        assert_eq!(theme.outcome_color(PollOutcome::Matched), TableColor::Green);
        assert_eq!(theme.outcome_color(PollOutcome::Exhausted), TableColor::Red);
    }
}
