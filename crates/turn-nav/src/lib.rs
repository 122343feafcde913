//! Turn Nav - Application Library
//!
//! Wires the navigation core to the command line: argument parsing, logging,
//! a file-backed key-value cache and a speech sink that prints announcements.

mod app;

pub use app::{AppError, Command, RunArgs, Settings, run, setup_logging};
