//! Status icons for CLI output

use crate::domain::verify::PollOutcome;

pub struct StatusIcon;

impl StatusIcon {
    /// Step succeeded / state verified
    pub const SUCCESS: &'static str = "✓";

    /// Informational line
    pub const INFO: &'static str = "ℹ";

    /// Step failed / state not reached
    pub const ERROR: &'static str = "✗";

    /// Step running
    pub const PENDING: &'static str = "⏳";

    pub fn for_outcome(outcome: PollOutcome) -> &'static str {
        match outcome {
            PollOutcome::Matched => Self::SUCCESS,
            PollOutcome::Exhausted => Self::ERROR,
        }
    }

    pub fn status_text(outcome: PollOutcome) -> &'static str {
        match outcome {
            PollOutcome::Matched => "Verified",
            PollOutcome::Exhausted => "Not reached",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_icons() {
        assert_eq!(StatusIcon::for_outcome(PollOutcome::Matched), StatusIcon::SUCCESS);
        assert_eq!(StatusIcon::for_outcome(PollOutcome::Exhausted), StatusIcon::ERROR);
        assert_eq!(StatusIcon::status_text(PollOutcome::Exhausted), "Not reached");
    }
}
