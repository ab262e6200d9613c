//! Quick structural summary of a NEM12 file
//!
//! Reads the header record and counts lines without validating anything, for
//! the `info` command.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Serialize;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::constants::{FIELD_DELIMITER, RECORD_TYPE_INDEX, header_index, record_codes};
use crate::{Error, Result};

/// `CCYYMMDDhhmm` as used by the header date-time field
const HEADER_DATE_TIME_FORMAT: &str = "%Y%m%d%H%M";

/// Summary of a NEM12 file on disk
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileInfo {
    pub path: PathBuf,
    pub size_bytes: u64,
    pub modified: Option<DateTime<Utc>>,

    /// Version field of the header record, when the first line is a header
    pub version: Option<String>,

    /// Raw date-time field of the header record
    pub created_at: Option<String>,

    pub line_count: usize,
}

impl FileInfo {
    /// Stream `path` once, reading metadata and the first line's header fields
    pub fn analyze(path: &Path) -> Result<Self> {
        let metadata = std::fs::metadata(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::file_not_found(path.display().to_string())
            } else {
                Error::io(format!("Failed to read metadata for {}", path.display()), e)
            }
        })?;

        let file = File::open(path)
            .map_err(|e| Error::io(format!("Failed to open {}", path.display()), e))?;
        let mut reader = BufReader::new(file);

        let mut version = None;
        let mut created_at = None;
        let mut line_count = 0;
        let mut buffer = Vec::new();

        loop {
            buffer.clear();
            let bytes_read = reader
                .read_until(b'\n', &mut buffer)
                .map_err(|e| Error::io(format!("Failed to read {}", path.display()), e))?;
            if bytes_read == 0 {
                break;
            }
            line_count += 1;

            if line_count == 1 {
                let line = String::from_utf8_lossy(&buffer);
                (version, created_at) = header_fields(line.trim_end_matches(['\r', '\n']));
            }
        }

        debug!(
            "Analyzed {}: {} lines, version {:?}",
            path.display(),
            line_count,
            version
        );

        Ok(Self {
            path: path.to_path_buf(),
            size_bytes: metadata.len(),
            modified: metadata.modified().ok().map(DateTime::<Utc>::from),
            version,
            created_at,
            line_count,
        })
    }

    /// Header date-time decoded as wall-clock time
    pub fn created_at_datetime(&self) -> Option<NaiveDateTime> {
        self.created_at
            .as_deref()
            .and_then(|value| NaiveDateTime::parse_from_str(value, HEADER_DATE_TIME_FORMAT).ok())
    }
}

/// Version and date-time fields from a line, when it is a header record
fn header_fields(line: &str) -> (Option<String>, Option<String>) {
    let fields: Vec<&str> = line.split(FIELD_DELIMITER).collect();
    if fields[RECORD_TYPE_INDEX].trim() != record_codes::HEADER {
        return (None, None);
    }

    let field = |index: usize| {
        fields
            .get(index)
            .filter(|value| !value.is_empty())
            .map(|value| value.to_string())
    };

    (
        field(header_index::VERSION),
        field(header_index::DATE_TIME),
    )
}

/// Format a byte count in human-readable units
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[unit_index])
    } else {
        format!("{:.2} {}", size, UNITS[unit_index])
    }
}
