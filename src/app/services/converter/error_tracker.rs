//! Error report writing for a conversion
//!
//! Every validation error, unexpected error and structural problem is written
//! as one line to a companion error file next to the SQL output. The file is
//! removed again when the conversion finishes without recording anything.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::stats::ConversionStats;
use crate::app::models::ValidationError;
use crate::{Error, Result};

/// Check whether any error requires the rest of the file to be skipped
pub fn should_stop_processing(errors: &[ValidationError]) -> bool {
    errors.iter().any(ValidationError::is_fatal)
}

/// Writes the error report and tracks the error state of a conversion
#[derive(Debug)]
pub struct ErrorTracker {
    path: PathBuf,
    writer: BufWriter<File>,
    error_count: usize,
    has_errors: bool,
    premature_end: bool,
}

impl ErrorTracker {
    /// Create (or truncate) the error report at `path`
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path).map_err(|e| {
            Error::io(
                format!("Failed to create error file {}", path.display()),
                e,
            )
        })?;

        Ok(Self {
            path: path.to_path_buf(),
            writer: BufWriter::new(file),
            error_count: 0,
            has_errors: false,
            premature_end: false,
        })
    }

    /// Write each validation error as `<line>: (<code>) <message>`
    pub fn record_validation_errors(&mut self, errors: &[ValidationError]) -> Result<()> {
        for error in errors {
            debug!("Validation {}: {}", error.severity, error);
            self.write_line(&error.to_string())?;
        }
        Ok(())
    }

    /// Write an error raised outside validation and mark the conversion as stopped early
    pub fn record_unexpected_error(&mut self, line: usize, message: &str) -> Result<()> {
        self.write_line(&format!("{}: {}", line, message))?;
        self.premature_end = true;
        Ok(())
    }

    /// Processing stopped before the end of the input
    pub fn mark_premature_end(&mut self) {
        self.premature_end = true;
    }

    /// Report a missing or repeated header or end of data record
    ///
    /// Skipped when processing stopped early, since the counts are then
    /// incomplete by construction.
    pub fn record_file_structure_errors(&mut self, stats: &ConversionStats) -> Result<()> {
        if self.premature_end {
            return Ok(());
        }

        if stats.header_count != 1 {
            warn!("Expected 1 header record, got {}", stats.header_count);
            self.write_line(&format!(
                "Expected 1 header record, got {}",
                stats.header_count
            ))?;
        }

        if stats.footer_count != 1 {
            warn!("Expected 1 end of file record, got {}", stats.footer_count);
            self.write_line(&format!(
                "Expected 1 end of file record, got {}, check if file is truncated",
                stats.footer_count
            ))?;
        }

        Ok(())
    }

    pub fn has_errors(&self) -> bool {
        self.has_errors
    }

    pub fn is_premature_end(&self) -> bool {
        self.premature_end
    }

    /// Number of lines written to the report
    pub fn error_count(&self) -> usize {
        self.error_count
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write everything recorded so far through to the report file
    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush().map_err(|e| {
            Error::io(
                format!("Failed to flush error file {}", self.path.display()),
                e,
            )
        })
    }

    /// Flush the report, removing it when nothing was recorded
    ///
    /// Returns the report path when it was kept.
    pub fn finish(mut self) -> Result<Option<PathBuf>> {
        self.flush()?;

        if self.has_errors {
            Ok(Some(self.path))
        } else {
            remove_report(&self.path);
            Ok(None)
        }
    }

    /// Cleanup after a failed conversion
    ///
    /// Whatever was recorded before the failure is kept for diagnosis.
    pub fn discard(mut self) {
        if let Err(e) = self.writer.flush() {
            debug!("Failed to flush error file during cleanup: {}", e);
        }
        if !self.has_errors {
            remove_report(&self.path);
        }
    }

    fn write_line(&mut self, line: &str) -> Result<()> {
        writeln!(self.writer, "{}", line).map_err(|e| {
            Error::io(
                format!("Failed to write to error file {}", self.path.display()),
                e,
            )
        })?;
        self.error_count += 1;
        self.has_errors = true;
        Ok(())
    }
}

fn remove_report(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => debug!("Removed empty error file {}", path.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => debug!("Failed to remove error file {}: {}", path.display(), e),
    }
}
