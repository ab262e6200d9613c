//! NEM12 Converter Library
//!
//! A Rust library for converting AEMO NEM12 interval metering files into
//! batched SQL insert statements.
//!
//! This library provides tools for:
//! - Streaming NEM12 files line by line with per-record-type dispatch
//! - Validating header, NMI and interval records with warning/error/fatal severities
//! - Decoding 5/15/30-minute interval arrays into timestamped meter readings
//! - Collecting conversion statistics (reading counts, NMIs, date range)
//! - Writing SQL output atomically with a companion error report

pub mod config;
pub mod constants;

// Core application modules
pub mod app {
    pub mod models;
    pub mod services {
        pub mod converter;
        pub mod file_info;
        pub mod nem12_parser;
        pub mod validator;
    }
}

// CLI modules
pub mod cli {
    pub mod args;
    pub mod commands;
}

// Re-export commonly used types
pub use app::models::{ParseContext, ParseResult, Reading, RecordType, Severity, ValidationError};
pub use app::services::converter::{ConversionSummary, Converter};
pub use app::services::nem12_parser::Nem12Parser;
pub use config::ConverterConfig;

/// Result type alias for the NEM12 converter
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for NEM12 conversion operations
///
/// Validation problems in the input file are not errors at this level; they
/// are collected as [`ValidationError`] values and written to the error report.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// I/O operation failed
    #[error("I/O error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Record could not be decoded outside of the validation rules
    #[error("Decode error at line {line}: {message}")]
    Decode { line: usize, message: String },

    /// Conversion failed and partial output was discarded
    #[error("Unexpected error: {message}")]
    Conversion {
        message: String,
        #[source]
        source: Box<Error>,
    },

    /// File not found
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    /// Processing interrupted
    #[error("Processing interrupted: {reason}")]
    ProcessingInterrupted { reason: String },
}

impl Error {
    /// Create an I/O error with context
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a decode error for a specific line
    pub fn decode(line: usize, message: impl Into<String>) -> Self {
        Self::Decode {
            line,
            message: message.into(),
        }
    }

    /// Wrap an error raised while a conversion was in progress
    pub fn conversion(source: Error) -> Self {
        Self::Conversion {
            message: source.to_string(),
            source: Box::new(source),
        }
    }

    /// Create a file not found error
    pub fn file_not_found(path: impl Into<String>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    /// Create a processing interrupted error
    pub fn processing_interrupted(reason: impl Into<String>) -> Self {
        Self::ProcessingInterrupted {
            reason: reason.into(),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Self::Io {
            message: "I/O operation failed".to_string(),
            source: error,
        }
    }
}

impl From<tempfile::PersistError> for Error {
    fn from(error: tempfile::PersistError) -> Self {
        Self::Io {
            message: "Failed to move SQL output into place".to_string(),
            source: error.error,
        }
    }
}
