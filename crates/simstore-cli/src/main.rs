//! simstore command-line tool.

use std::io::{self, IsTerminal};

use clap::{ColorChoice, Parser};
use tracing::level_filters::LevelFilter;

use simstore_cli::cli::{Cli, Command, LogFormatArg, LogLevelArg};
use simstore_cli::commands::{
    run_compress, run_convert, run_decompress, run_extract, run_hash, run_inspect,
};
use simstore_cli::logging::{LogConfig, LogFormat, init_logging};
use simstore_cli::report::{print_hash, print_inspection, print_written};

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let outcome = match &cli.command {
        Command::Inspect(args) => run_inspect(args).map(|inspection| print_inspection(&inspection)),
        Command::Convert(args) => run_convert(args).map(|written| print_written(&written)),
        Command::Extract(args) => run_extract(args).map(|written| print_written(&written)),
        Command::Compress(args) => run_compress(args).map(|written| print_written(&written)),
        Command::Decompress(args) => run_decompress(args).map(|written| print_written(&written)),
        Command::Hash(args) => run_hash(args).map(|hashed| print_hash(&hashed)),
    };
    let exit_code = match outcome {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("error: {err:#}");
            1
        }
    };
    std::process::exit(exit_code);
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        ..LogConfig::default()
    };
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    if let Some(level) = cli.log_level {
        config.level_filter = match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        };
    }
    config.format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    config.log_file = cli.log_file.clone();
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}
