//! Command implementations for the NEM12 converter CLI
//!
//! Sets up logging, layers configuration, runs conversions on a blocking task
//! with Ctrl+C cancellation and prints human-readable summaries.

use anyhow::{Context, bail};
use colored::Colorize;
use indicatif::HumanDuration;
use std::path::Path;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::app::services::converter::{ConversionSummary, Converter};
use crate::app::services::file_info::{FileInfo, format_bytes};
use crate::cli::args::{Args, Commands, ConvertArgs, InfoArgs};
use crate::config::ConverterConfig;
use crate::{Error, Result};

/// Main command runner
pub async fn run(args: Args) -> anyhow::Result<()> {
    setup_logging(&args)?;
    debug!("Command line arguments: {:?}", args);

    match &args.command {
        Commands::Convert(convert_args) => run_convert(&args, convert_args).await,
        Commands::Info(info_args) => run_info(info_args),
    }
}

/// Set up structured logging based on verbosity level
fn setup_logging(args: &Args) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = args.get_log_level();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("nem12_converter={}", log_level)));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_timer(fmt::time::uptime())
                .with_writer(std::io::stderr),
        )
        .try_init()
        .map_err(|e| Error::configuration(format!("Failed to initialize logging: {}", e)))?;

    debug!("Logging initialized at level: {}", log_level);
    Ok(())
}

async fn run_convert(args: &Args, convert_args: &ConvertArgs) -> anyhow::Result<()> {
    convert_args.validate()?;

    let output_base = convert_args.output_base();
    if convert_args.output.is_none() && args.verbose > 0 {
        println!(
            "{} {}",
            "No output specified, using:".yellow(),
            output_base.display()
        );
    }
    validate_output_path(&output_base)?;

    let config = convert_args
        .build_config(ConverterConfig::from_env()?, args.show_progress())
        .context("Invalid converter configuration")?;
    debug!("Converter configuration: {:?}", config);

    if args.verbose > 0 {
        println!("{}", "Starting conversion...".bright_blue());
        println!("  {} {}", "Input: ".dimmed(), convert_args.input.display());
        println!(
            "  {} {}",
            "Output:".dimmed(),
            Converter::sql_path(&output_base).display()
        );
    }

    let cancellation_token = CancellationToken::new();
    let converter = Converter::new(config)?.with_cancellation(cancellation_token.clone());

    let start_time = Instant::now();
    let input = convert_args.input.clone();
    let base = output_base.clone();
    let mut handle = tokio::task::spawn_blocking(move || converter.convert(&input, &base));

    let joined = tokio::select! {
        joined = &mut handle => joined,
        _ = tokio::signal::ctrl_c() => {
            eprintln!("\nReceived CTRL+C, stopping conversion...");
            cancellation_token.cancel();
            handle.await
        }
    };

    let summary = joined
        .context("Conversion task panicked")?
        .with_context(|| format!("Conversion of {} failed", convert_args.input.display()))?;

    print_conversion_summary(&summary);
    if args.verbose > 0 {
        println!(
            "  {} {}",
            "Time elapsed:".bright_cyan(),
            HumanDuration(start_time.elapsed()).to_string().bright_white()
        );
    }

    Ok(())
}

/// Check the output directory exists and warn about overwriting
fn validate_output_path(output_base: &Path) -> anyhow::Result<()> {
    let output_dir = output_base
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let metadata = std::fs::metadata(output_dir)
        .with_context(|| format!("Output directory not writable: {}", output_dir.display()))?;
    if !metadata.is_dir() {
        bail!("Output directory not writable: {}", output_dir.display());
    }
    if metadata.permissions().readonly() {
        bail!("Output directory not writable: {}", output_dir.display());
    }

    let sql_path = Converter::sql_path(output_base);
    if sql_path.exists() {
        warn!("Output file will be overwritten: {}", sql_path.display());
        println!(
            "{} {}",
            "Output file will be overwritten:".yellow(),
            sql_path.display()
        );
    }

    Ok(())
}

fn print_conversion_summary(summary: &ConversionSummary) {
    if summary.has_errors {
        println!(
            "\n{}",
            "Conversion completed with warnings/errors".bright_yellow().bold()
        );
    } else {
        println!("\n{}", "Conversion completed successfully".bright_green().bold());
    }

    println!(
        "  {} {}",
        "Total readings:".bright_cyan(),
        summary.stats.total_readings.to_string().bright_white().bold()
    );
    println!(
        "  {} {}",
        "NMI count:".bright_cyan(),
        summary.stats.nmi_count().to_string().bright_white()
    );
    if summary.premature_end {
        println!(
            "  {} {}",
            "Stopped early:".bright_red(),
            "processing halted before end of file".bright_red().bold()
        );
    }
    if let Some(error_path) = &summary.error_path {
        println!(
            "  {} {}",
            "Check error file:".bright_yellow(),
            error_path.display()
        );
    }
    println!(
        "  {} {}",
        "SQL output:".bright_cyan(),
        summary.sql_path.display()
    );

    info!(
        "Conversion finished: {} readings, errors: {}",
        summary.stats.total_readings, summary.has_errors
    );
}

fn run_info(info_args: &InfoArgs) -> anyhow::Result<()> {
    info_args.validate()?;

    let file_info = FileInfo::analyze(&info_args.input).with_context(|| {
        format!(
            "Failed to read file information: {}",
            info_args.input.display()
        )
    })?;

    let name = info_args
        .input
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| info_args.input.display().to_string());

    println!(
        "{} {}",
        "File Information:".bright_green().bold(),
        name.bright_white()
    );
    println!("{}", "─".repeat(50).dimmed());
    println!(
        "  {} {}",
        "File Size:".bright_cyan(),
        format_bytes(file_info.size_bytes)
    );
    println!(
        "  {} {}",
        "Modified:".bright_cyan(),
        file_info
            .modified
            .map(|modified| modified.to_rfc3339())
            .unwrap_or_else(|| "Unknown".to_string())
    );
    println!(
        "  {} {}",
        "Version:".bright_cyan(),
        file_info.version.as_deref().unwrap_or("Unknown")
    );
    println!(
        "  {} {}",
        "File Created At:".bright_cyan(),
        file_info
            .created_at_datetime()
            .map(|created| created.format("%Y-%m-%d %H:%M").to_string())
            .or_else(|| file_info.created_at.clone())
            .unwrap_or_else(|| "Unknown".to_string())
    );
    println!(
        "  {} {}",
        "Lines:".bright_cyan(),
        file_info.line_count.to_string().bright_white()
    );

    Ok(())
}
