//! Core data models for NEM12 parsing and conversion
//!
//! This module contains the value types that flow between the line parser,
//! the record parsers, the validator and the converter:
//! - [`ParseContext`] - cross-record state carried while streaming one file
//! - [`Reading`] - a single decoded interval consumption value
//! - [`ValidationError`] - a classified data-quality problem with severity
//! - [`ParseResult`] - the per-line outcome yielded by the parser

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::record_codes;

/// NEM12 record kinds handled by the parser
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordType {
    /// 100 record
    Header,
    /// 200 record
    NmiDataDetails,
    /// 300 record
    IntervalData,
    /// 400 record
    IntervalEvent,
    /// 500 record
    B2bDetails,
    /// 900 record
    EndOfData,
}

impl RecordType {
    /// Look up a record type from its three character indicator
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            record_codes::HEADER => Some(Self::Header),
            record_codes::NMI_DATA_DETAILS => Some(Self::NmiDataDetails),
            record_codes::INTERVAL_DATA => Some(Self::IntervalData),
            record_codes::INTERVAL_EVENT => Some(Self::IntervalEvent),
            record_codes::B2B_DETAILS => Some(Self::B2bDetails),
            record_codes::END_OF_DATA => Some(Self::EndOfData),
            _ => None,
        }
    }

    /// The record indicator as it appears in field 0
    pub fn code(&self) -> &'static str {
        match self {
            Self::Header => record_codes::HEADER,
            Self::NmiDataDetails => record_codes::NMI_DATA_DETAILS,
            Self::IntervalData => record_codes::INTERVAL_DATA,
            Self::IntervalEvent => record_codes::INTERVAL_EVENT,
            Self::B2bDetails => record_codes::B2B_DETAILS,
            Self::EndOfData => record_codes::END_OF_DATA,
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Validation severity, ordered from least to most severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational, does not block decoding
    Warning,
    /// Blocks decoding of the offending record only
    Error,
    /// Stops processing of the remaining file
    Fatal,
}

impl Severity {
    /// Check whether this severity prevents readings from being decoded
    pub fn blocks_decoding(&self) -> bool {
        *self >= Severity::Error
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Severity::Warning => "warning",
            Severity::Error => "error",
            Severity::Fatal => "fatal",
        };
        f.write_str(label)
    }
}

/// Machine readable validation error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationCode {
    MissingHeaderFields,
    InvalidVersion,
    MissingNmiFields,
    InvalidIntervalLength,
    MissingIntervalLength,
    MissingIntervalFields,
    InvalidDate,
    InvalidConsumptionFormat,
    NegativeConsumption,
    SuspiciousConsumptionHigh,
}

impl ValidationCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissingHeaderFields => "MISSING_HEADER_FIELDS",
            Self::InvalidVersion => "INVALID_VERSION",
            Self::MissingNmiFields => "MISSING_NMI_FIELDS",
            Self::InvalidIntervalLength => "INVALID_INTERVAL_LENGTH",
            Self::MissingIntervalLength => "MISSING_INTERVAL_LENGTH",
            Self::MissingIntervalFields => "MISSING_INTERVAL_FIELDS",
            Self::InvalidDate => "INVALID_DATE",
            Self::InvalidConsumptionFormat => "INVALID_CONSUMPTION_FORMAT",
            Self::NegativeConsumption => "NEGATIVE_CONSUMPTION",
            Self::SuspiciousConsumptionHigh => "SUSPICIOUS_CONSUMPTION_HIGH",
        }
    }
}

impl fmt::Display for ValidationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A data-quality problem found while validating a record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    /// 1-based line number in the source file
    pub line: usize,
    pub code: ValidationCode,
    pub message: String,
    pub severity: Severity,
    /// Name of the offending field, when one can be singled out
    pub field: Option<String>,
}

impl ValidationError {
    /// Create a new validation error without a field reference
    pub fn new(
        line: usize,
        code: ValidationCode,
        severity: Severity,
        message: impl Into<String>,
    ) -> Self {
        Self {
            line,
            code,
            message: message.into(),
            severity,
            field: None,
        }
    }

    /// Attach the name of the offending field
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    pub fn is_fatal(&self) -> bool {
        self.severity == Severity::Fatal
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: ({}) {}", self.line, self.code, self.message)
    }
}

/// A single decoded interval reading
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reading {
    /// National Metering Identifier the reading belongs to
    pub meter_id: String,
    /// End of the interval, wall-clock time without timezone
    pub timestamp: NaiveDateTime,
    pub consumption: Decimal,
}

/// Cross-record state carried while parsing a single file
///
/// Set by NMI data details records and read by interval data records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseContext {
    pub current_meter_id: Option<String>,
    pub current_interval_length: Option<u32>,
}

impl ParseContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all carried state ahead of a new file
    pub fn reset(&mut self) {
        self.current_meter_id = None;
        self.current_interval_length = None;
    }
}

/// Outcome of parsing one recognised record
#[derive(Debug, Clone, PartialEq)]
pub struct RecordOutcome {
    pub record_type: RecordType,
    pub line: usize,
    pub validation_errors: Vec<ValidationError>,
    /// Decoded readings, `None` when the record carries none or failed validation
    pub readings: Option<Vec<Reading>>,
}

impl RecordOutcome {
    /// Outcome for a record that never yields readings
    pub fn without_readings(
        record_type: RecordType,
        line: usize,
        validation_errors: Vec<ValidationError>,
    ) -> Self {
        Self {
            record_type,
            line,
            validation_errors,
            readings: None,
        }
    }

    pub fn has_fatal_errors(&self) -> bool {
        self.validation_errors.iter().any(ValidationError::is_fatal)
    }
}

/// Result yielded for each relevant line of a NEM12 file
#[derive(Debug, Clone, PartialEq)]
pub enum ParseResult {
    /// A recognised record, validated and possibly decoded
    Record(RecordOutcome),
    /// A failure outside the validation rules, e.g. decoding without NMI context
    Unexpected { line_number: usize, error: String },
}

impl ParseResult {
    /// Line number the result refers to
    pub fn line(&self) -> usize {
        match self {
            ParseResult::Record(outcome) => outcome.line,
            ParseResult::Unexpected { line_number, .. } => *line_number,
        }
    }

    pub fn is_unexpected(&self) -> bool {
        matches!(self, ParseResult::Unexpected { .. })
    }

    /// Borrow the record outcome, if this is not an unexpected error
    pub fn as_record(&self) -> Option<&RecordOutcome> {
        match self {
            ParseResult::Record(outcome) => Some(outcome),
            ParseResult::Unexpected { .. } => None,
        }
    }
}
