//! NEM12 to SQL conversion orchestration
//!
//! Streams parse results from [`Nem12Parser`] into the statistics collector,
//! the error tracker and the SQL writer. SQL is written to a temporary file in
//! the output directory and only moved to `<output>.sql` once the footer has
//! been written, so a failed run never leaves a partial SQL file behind.

use chrono::Utc;
use serde::Serialize;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tempfile::NamedTempFile;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use super::error_tracker::{ErrorTracker, should_stop_processing};
use super::progress::ProgressReporter;
use super::sql_writer::{SqlGenerator, SqlWriter};
use super::stats::{ConversionStats, StatisticsCollector};
use crate::app::models::{ParseResult, RecordType};
use crate::app::services::nem12_parser::Nem12Parser;
use crate::config::ConverterConfig;
use crate::constants::{ERROR_FILE_EXTENSION, SQL_FILE_EXTENSION, TEMP_FILE_PREFIX};
use crate::{Error, Result};

/// Outcome of a completed conversion
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversionSummary {
    pub stats: ConversionStats,

    /// Anything was written to the error report
    pub has_errors: bool,

    /// Processing stopped before the end of the input
    pub premature_end: bool,

    pub sql_path: PathBuf,

    /// Error report location, `None` when no errors were recorded
    pub error_path: Option<PathBuf>,
}

impl ConversionSummary {
    /// Converted the whole file without recording anything
    pub fn is_clean(&self) -> bool {
        !self.has_errors && !self.premature_end
    }
}

/// Converts NEM12 files into SQL insert scripts
#[derive(Debug)]
pub struct Converter {
    config: ConverterConfig,
    parser: Nem12Parser,
    generator: SqlGenerator,
    cancellation_token: Option<CancellationToken>,
}

impl Converter {
    /// Create a converter after validating its configuration
    pub fn new(config: ConverterConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            parser: Nem12Parser::new(config.high_consumption_threshold),
            generator: SqlGenerator::new(config.table_name.clone()),
            config,
            cancellation_token: None,
        })
    }

    /// Observe `token` between records and stop with an error once it is cancelled
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = Some(token);
        self
    }

    pub fn config(&self) -> &ConverterConfig {
        &self.config
    }

    /// `<output_base>.sql`
    pub fn sql_path(output_base: &Path) -> PathBuf {
        append_extension(output_base, SQL_FILE_EXTENSION)
    }

    /// `<output_base>.errors.txt`
    pub fn error_path(output_base: &Path) -> PathBuf {
        append_extension(output_base, ERROR_FILE_EXTENSION)
    }

    /// Convert `input` to `<output_base>.sql`
    ///
    /// Validation problems, unexpected record errors and structural problems
    /// are reported in `<output_base>.errors.txt` and reflected in the
    /// summary; the SQL file is still produced. Only I/O failures and
    /// cancellation return `Err`, after removing the temporary SQL file.
    pub fn convert(&self, input: &Path, output_base: &Path) -> Result<ConversionSummary> {
        let start_time = Instant::now();
        let sql_path = Self::sql_path(output_base);
        let error_path = Self::error_path(output_base);

        info!(
            "Converting {} to {}",
            input.display(),
            sql_path.display()
        );

        let results = self.parser.parse_file(input)?;
        let temp_file = create_temp_output(&sql_path)?;
        let mut tracker = ErrorTracker::create(&error_path)?;

        match self.run(input, results, temp_file, &sql_path, &mut tracker) {
            Ok(stats) => {
                let has_errors = tracker.has_errors();
                let premature_end = tracker.is_premature_end();
                let error_path = tracker.finish().map_err(Error::conversion)?;

                info!(
                    "Converted {} readings for {} NMIs in {:.2}s",
                    stats.total_readings,
                    stats.nmi_count(),
                    start_time.elapsed().as_secs_f64()
                );

                Ok(ConversionSummary {
                    stats,
                    has_errors,
                    premature_end,
                    sql_path,
                    error_path,
                })
            }
            Err(e) => {
                error!("Conversion of {} failed: {}", input.display(), e);
                tracker.discard();
                match e {
                    Error::ProcessingInterrupted { .. } => Err(e),
                    other => Err(Error::conversion(other)),
                }
            }
        }
    }

    /// Stream every result into the outputs and persist the SQL file
    ///
    /// The error report is flushed before the SQL file is moved into place, so
    /// a failing report never leaves a finished SQL file behind.
    pub(super) fn run(
        &self,
        input: &Path,
        results: impl Iterator<Item = ParseResult>,
        temp_file: NamedTempFile,
        sql_path: &Path,
        tracker: &mut ErrorTracker,
    ) -> Result<ConversionStats> {
        let source_name = input
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| input.display().to_string());

        let mut writer = SqlWriter::new(BufWriter::new(temp_file), self.generator.clone());
        writer.write_header(&source_name, Utc::now())?;

        let mut collector = StatisticsCollector::new();
        let mut progress = ProgressReporter::new(self.config.progress_log_interval);
        if self.config.show_progress {
            progress.setup_spinner("Converting NEM12 records");
        }

        for result in results {
            if let Err(e) = self.check_cancelled() {
                progress.finish_with_error("interrupted");
                return Err(e);
            }

            let outcome = match result {
                ParseResult::Unexpected { line_number, error } => {
                    error!("Line {}: {} - stopping processing", line_number, error);
                    tracker.record_unexpected_error(line_number, &error)?;
                    break;
                }
                ParseResult::Record(outcome) => outcome,
            };

            collector.record(&outcome);
            tracker.record_validation_errors(&outcome.validation_errors)?;

            if outcome.record_type == RecordType::IntervalData {
                if let Some(readings) = outcome.readings.as_deref().filter(|r| !r.is_empty()) {
                    writer.write_readings(readings)?;
                    progress.increment(readings.len());
                }
            }

            if should_stop_processing(&outcome.validation_errors) {
                error!(
                    "Fatal validation errors encountered at line {} - stopping processing",
                    outcome.line
                );
                tracker.mark_premature_end();
                break;
            }
        }

        tracker.record_file_structure_errors(collector.stats())?;

        let stats = collector.into_stats();
        writer.write_footer(&stats)?;
        debug!("Wrote {} insert statements", writer.statements_written());

        let temp_file = writer
            .into_inner()?
            .into_inner()
            .map_err(|e| Error::io("Failed to flush SQL output", e.into_error()))?;
        tracker.flush()?;
        temp_file.persist(sql_path)?;

        progress.finish(&stats);
        Ok(stats)
    }

    fn check_cancelled(&self) -> Result<()> {
        match &self.cancellation_token {
            Some(token) if token.is_cancelled() => Err(Error::processing_interrupted(
                "Conversion cancelled by user",
            )),
            _ => Ok(()),
        }
    }
}

/// Temporary SQL file in the same directory as the final output
fn create_temp_output(sql_path: &Path) -> Result<NamedTempFile> {
    let output_dir = sql_path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    tempfile::Builder::new()
        .prefix(TEMP_FILE_PREFIX)
        .suffix(SQL_FILE_EXTENSION)
        .tempfile_in(output_dir)
        .map_err(|e| {
            Error::io(
                format!(
                    "Failed to create temporary SQL file in {}",
                    output_dir.display()
                ),
                e,
            )
        })
}

fn append_extension(path: &Path, extension: &str) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(extension);
    PathBuf::from(name)
}
