//! Command line interface

pub mod commands;
pub mod display;
pub mod workflows;

pub use commands::CliArgs;
