//! Command-line front end for simstore files.

pub mod cli;
pub mod commands;
pub mod logging;
pub mod report;
