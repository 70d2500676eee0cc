//! CLI argument definitions for the simstore tool.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "simstore",
    version,
    about = "Inspect, convert and hash stored simulation models",
    long_about = "Inspect, convert and hash stored simulation models.\n\n\
                  Reads and writes .json, .yaml, .hdf5 and .hdf5.gz files; the format\n\
                  is chosen by extension. Only the container formats keep array data."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Show the root type and stored entries of a file.
    Inspect(InspectArgs),

    /// Load a file and save it in the format of the output extension.
    Convert(ConvertArgs),

    /// Save the node at an address as a file of its own.
    Extract(ExtractArgs),

    /// Gzip-compress a container file.
    Compress(TransferArgs),

    /// Decompress a gzip-compressed container file.
    Decompress(TransferArgs),

    /// Print the content hash of a stored node.
    Hash(HashArgs),
}

#[derive(Parser)]
pub struct InspectArgs {
    /// File to inspect.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Only show the node and entries below this address.
    #[arg(long = "address", value_name = "ADDRESS")]
    pub address: Option<String>,
}

#[derive(Parser)]
pub struct ConvertArgs {
    /// Input file.
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Output file; its extension selects the format.
    #[arg(value_name = "OUTPUT")]
    pub output: PathBuf,

    /// Indentation of the embedded JSON document.
    #[arg(long = "indent", value_name = "N", default_value_t = 4)]
    pub indent: usize,

    /// Gzip level for .hdf5.gz outputs (0-9).
    #[arg(long = "compression-level", value_name = "LEVEL", default_value_t = 6)]
    pub compression_level: u32,
}

#[derive(Parser)]
pub struct ExtractArgs {
    /// Input file.
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Address of the node to extract, e.g. /monitor_data/flux.
    #[arg(long = "address", value_name = "ADDRESS")]
    pub address: String,

    /// Output file; its extension selects the format.
    #[arg(value_name = "OUTPUT")]
    pub output: PathBuf,
}

#[derive(Parser)]
pub struct TransferArgs {
    /// Input file.
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Output file.
    #[arg(value_name = "OUTPUT")]
    pub output: PathBuf,
}

#[derive(Parser)]
pub struct HashArgs {
    /// File holding the node.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Hash the node at this address instead of the root.
    #[arg(long = "address", value_name = "ADDRESS")]
    pub address: Option<String>,

    /// Skip digest checks of array entries while loading.
    #[arg(long = "no-verify")]
    pub no_verify: bool,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
