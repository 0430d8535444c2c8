//! Display module for formatted CLI output

pub mod colors;
pub mod icons;
pub mod progress;
pub mod table;

pub use colors::ColorTheme;
pub use icons::StatusIcon;
pub use progress::ConsoleReporter;
pub use table::TableRenderer;
