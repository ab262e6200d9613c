//! Command-line argument definitions for the NEM12 converter
//!
//! This module defines the CLI interface using the clap derive API.

use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use std::path::{Path, PathBuf};

use crate::config::{ConverterConfig, parse_threshold};
use crate::{Error, Result};

/// CLI arguments for the NEM12 converter
///
/// Converts AEMO NEM12 interval metering files into SQL insert scripts,
/// reporting malformed records in a companion error file.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "nem12-converter",
    version,
    about = "Convert NEM12 format meter reading files to SQL",
    long_about = "Streams AEMO NEM12 interval metering files, validates every record and \
                  writes the decoded interval readings as batched INSERT statements. \
                  Problems are written to <output>.errors.txt next to the SQL output."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase logging verbosity
    #[arg(
        short = 'v',
        long = "verbose",
        global = true,
        action = clap::ArgAction::Count,
        help = "Increase logging verbosity (-v: info, -vv: debug, -vvv: trace)"
    )]
    pub verbose: u8,

    /// Suppress output except errors
    #[arg(
        short = 'q',
        long = "quiet",
        global = true,
        help = "Suppress output except errors",
        conflicts_with = "verbose"
    )]
    pub quiet: bool,
}

/// Available subcommands
#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Convert a NEM12 file to SQL format
    Convert(ConvertArgs),
    /// Display information about a NEM12 file
    Info(InfoArgs),
}

/// Arguments for the convert command
#[derive(Debug, Clone, Parser)]
pub struct ConvertArgs {
    /// Input NEM12 file path
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Output file path without extension, defaults to the input file name
    #[arg(value_name = "OUTPUT")]
    pub output: Option<PathBuf>,

    /// Target table for INSERT statements
    #[arg(long = "table-name", value_name = "NAME")]
    pub table_name: Option<String>,

    /// Consumption above this value is reported as suspicious
    #[arg(long = "threshold", value_name = "VALUE", value_parser = parse_threshold_arg)]
    pub threshold: Option<Decimal>,

    /// Disable the progress spinner
    #[arg(long = "no-progress")]
    pub no_progress: bool,
}

/// Arguments for the info command
#[derive(Debug, Clone, Parser)]
pub struct InfoArgs {
    /// Input NEM12 file path
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,
}

fn parse_threshold_arg(value: &str) -> std::result::Result<Decimal, String> {
    parse_threshold(value).map_err(|e| e.to_string())
}

impl Args {
    /// Get the log level based on verbosity settings
    pub fn get_log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => "warn",
                1 => "info",
                2 => "debug",
                _ => "trace",
            }
        }
    }

    /// Check if we should show progress spinners (not in quiet mode)
    pub fn show_progress(&self) -> bool {
        !self.quiet
    }
}

impl ConvertArgs {
    /// Output base path, defaulting to the input's directory and file stem
    pub fn output_base(&self) -> PathBuf {
        match &self.output {
            Some(output) => output.clone(),
            None => default_output_base(&self.input),
        }
    }

    /// Layer command-line flags over environment and default configuration
    pub fn build_config(&self, base: ConverterConfig, show_progress: bool) -> Result<ConverterConfig> {
        let mut config = base.with_progress(show_progress && !self.no_progress);

        if let Some(table_name) = &self.table_name {
            config = config.with_table_name(table_name.clone());
        }
        if let Some(threshold) = self.threshold {
            config = config.with_high_consumption_threshold(threshold);
        }

        config.validate()?;
        Ok(config)
    }

    /// Check the input is an existing, non-empty regular file
    pub fn validate(&self) -> Result<()> {
        validate_input_file(&self.input)
    }
}

impl InfoArgs {
    pub fn validate(&self) -> Result<()> {
        validate_input_file(&self.input)
    }
}

/// `<input dir>/<input stem>`
pub fn default_output_base(input: &Path) -> PathBuf {
    let stem = input.file_stem().unwrap_or(input.as_os_str());
    match input.parent() {
        Some(parent) => parent.join(stem),
        None => PathBuf::from(stem),
    }
}

/// Check the input is an existing, non-empty regular file
pub fn validate_input_file(path: &Path) -> Result<()> {
    let metadata = std::fs::metadata(path).map_err(|_| {
        Error::configuration(format!(
            "Input file not found or not readable: {}",
            path.display()
        ))
    })?;

    if !metadata.is_file() {
        return Err(Error::configuration(format!(
            "Input path is not a file: {}",
            path.display()
        )));
    }

    if metadata.len() == 0 {
        return Err(Error::configuration(format!(
            "Input file is empty: {}",
            path.display()
        )));
    }

    Ok(())
}
