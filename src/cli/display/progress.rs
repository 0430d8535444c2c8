//! Console progress reporting

use super::StatusIcon;
use crate::shared::progress::ProgressReporter;
use colored::Colorize;

/// Prints workflow progress on stdout, one line per event.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleReporter;

impl ConsoleReporter {
    pub fn new() -> Self {
        Self
    }
}

impl ProgressReporter for ConsoleReporter {
    fn start(&self, message: &str) {
        println!("{} {}", StatusIcon::PENDING, message.cyan());
    }

    fn succeed(&self, message: &str) {
        println!("{} {}", StatusIcon::SUCCESS.green(), message);
    }

    fn fail(&self, message: &str) {
        println!("{} {}", StatusIcon::ERROR.red(), message.red());
    }

    fn info(&self, message: &str) {
        println!("{} {}", StatusIcon::INFO.blue(), message);
    }
}
