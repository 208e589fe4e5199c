use clap::{ArgAction, Parser, ValueEnum};
use anyhow::Result;
use std::path::PathBuf;
use log::debug;

/// Output format for the plugin listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Shared-library plugin loader
#[derive(Parser, Debug)]
#[command(name = "plugload")]
#[command(about = "Load shared-library plugins into the process and report what was loaded")]
#[command(version)]
pub struct Args {
    /// Load the plugin library at PATH (may be repeated; loaded in order)
    #[arg(short = 'l', long = "load", value_name = "PATH", action = ArgAction::Append)]
    pub load: Vec<String>,

    /// Skip the plugins listed under [plugins] preload in the configuration
    #[arg(long)]
    pub no_preload: bool,

    /// Print the loaded plugins once all load requests are processed
    #[arg(long)]
    pub list: bool,

    /// Format for --list output
    #[arg(long, value_enum, value_name = "FORMAT", default_value = "text")]
    pub format: OutputFormat,

    /// Verbose output (debug level logging)
    #[arg(short, long)]
    pub verbose: bool,

    /// Quiet output (error level logging only)
    #[arg(short, long)]
    pub quiet: bool,

    /// Debug output (trace level logging)
    #[arg(long)]
    pub debug: bool,

    /// Log format: text or json
    #[arg(long, value_name = "FORMAT", default_value = "text")]
    pub log_format: String,

    /// Log file path for file output
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Log level for file output (independent of console level)
    #[arg(long, value_name = "LEVEL")]
    pub log_file_level: Option<String>,

    /// Configuration file path
    #[arg(long, value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Configuration section name
    #[arg(long, value_name = "SECTION")]
    pub config_name: Option<String>,
}

/// Parse command line arguments
pub fn parse_args() -> Args {
    Args::parse()
}

/// Validate CLI argument combinations
pub fn validate_args(args: &Args) -> Result<()> {
    let log_flags_count = [args.verbose, args.quiet, args.debug]
        .iter()
        .filter(|&&flag| flag)
        .count();

    if log_flags_count > 1 {
        return Err(anyhow::anyhow!(
            "Conflicting log level flags: only one of --verbose, --quiet, or --debug may be specified"
        ));
    }

    match args.log_format.to_lowercase().as_str() {
        "text" | "json" => {},
        _ => return Err(anyhow::anyhow!(
            "Invalid log format '{}'. Valid options: text, json", args.log_format
        )),
    }

    if let Some(ref level) = args.log_file_level {
        crate::logging::parse_log_level(level)
            .map_err(|_| anyhow::anyhow!(
                "Invalid log file level '{}'. Valid levels: error, warn, info, debug, trace, off", level
            ))?;
    }

    if args.log_file_level.is_some() && args.log_file.is_none() {
        return Err(anyhow::anyhow!(
            "--log-file-level requires --log-file to be specified"
        ));
    }

    debug!("CLI arguments validated: {} load request(s)", args.load.len());
    Ok(())
}
