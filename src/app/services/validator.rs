//! NEM12 record validation rules
//!
//! Stateless checks for each record type. Every check returns the full list of
//! problems found (possibly empty) rather than stopping at the first one, so a
//! single pass reports every malformed value in a row.
//!
//! Severities follow the impact on processing:
//! - `Warning` - informational, the record is still decoded
//! - `Error` - the offending record is skipped
//! - `Fatal` - the rest of the file is not processed

use rust_decimal::Decimal;
use tracing::trace;

use crate::app::models::{Severity, ValidationCode, ValidationError};
use crate::app::services::nem12_parser::field_parsers::{
    is_valid_decimal, is_valid_nem12_date, parse_decimal,
};
use crate::constants::{
    HEADER_RECORD_FIELD_LENGTH, INTERVAL_DATA_NON_INTERVAL_VALUE_LENGTH, INTERVAL_LENGTHS,
    NMI_RECORD_FIELD_LENGTH, NUM_MINS_IN_DAY, VERSION_HEADER, ZERO_CONSUMPTION, header_index,
    interval_index, nmi_index,
};

/// Validator for NEM12 records
#[derive(Debug, Clone, PartialEq)]
pub struct Nem12Validator {
    high_consumption_threshold: Decimal,
}

impl Nem12Validator {
    /// Create a validator with the given suspicious consumption cutoff
    pub fn new(high_consumption_threshold: Decimal) -> Self {
        Self {
            high_consumption_threshold,
        }
    }

    pub fn high_consumption_threshold(&self) -> Decimal {
        self.high_consumption_threshold
    }

    /// Validate a 100 (header) record
    pub fn validate_header_record(&self, fields: &[&str], line: usize) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if fields.len() < HEADER_RECORD_FIELD_LENGTH {
            errors.push(ValidationError::new(
                line,
                ValidationCode::MissingHeaderFields,
                Severity::Error,
                "Header record missing required fields",
            ));
        }

        let version = fields.get(header_index::VERSION).copied();
        if version != Some(VERSION_HEADER) {
            errors.push(
                ValidationError::new(
                    line,
                    ValidationCode::InvalidVersion,
                    Severity::Fatal,
                    format!(
                        "Expected {} format, got: {}",
                        VERSION_HEADER,
                        version.unwrap_or_default()
                    ),
                )
                .with_field("version_header"),
            );
        }

        errors
    }

    /// Validate a 200 (NMI data details) record
    pub fn validate_nmi_record(&self, fields: &[&str], line: usize) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if fields.len() < NMI_RECORD_FIELD_LENGTH {
            errors.push(ValidationError::new(
                line,
                ValidationCode::MissingNmiFields,
                Severity::Error,
                "NMI record missing required fields",
            ));
        }

        let raw_length = fields
            .get(nmi_index::INTERVAL_LENGTH)
            .copied()
            .unwrap_or_default();
        if parse_interval_length(raw_length).is_none() {
            errors.push(
                ValidationError::new(
                    line,
                    ValidationCode::InvalidIntervalLength,
                    Severity::Error,
                    format!("Invalid interval length: {}", raw_length),
                )
                .with_field("interval_length"),
            );
        }

        errors
    }

    /// Validate a 300 (interval data) record against the current interval length
    pub fn validate_interval_record(
        &self,
        fields: &[&str],
        line: usize,
        interval_length: Option<u32>,
    ) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        let Some(interval_length) = interval_length else {
            errors.push(ValidationError::new(
                line,
                ValidationCode::MissingIntervalLength,
                Severity::Fatal,
                "Interval length is not set",
            ));
            return errors;
        };

        let intervals_per_day = intervals_per_day(interval_length);
        let expected_fields = intervals_per_day + INTERVAL_DATA_NON_INTERVAL_VALUE_LENGTH;

        if fields.len() < expected_fields {
            errors.push(ValidationError::new(
                line,
                ValidationCode::MissingIntervalFields,
                Severity::Error,
                format!(
                    "Interval record missing required fields. Expected {}, got {}",
                    expected_fields,
                    fields.len()
                ),
            ));
        }

        let date = fields
            .get(interval_index::INTERVAL_DATE)
            .copied()
            .unwrap_or_default();
        if !is_valid_nem12_date(date) {
            errors.push(
                ValidationError::new(
                    line,
                    ValidationCode::InvalidDate,
                    Severity::Error,
                    format!("Invalid date: {}", date),
                )
                .with_field("interval_date"),
            );
        }

        for (index, value) in consumption_values(fields, intervals_per_day)
            .iter()
            .enumerate()
        {
            self.validate_consumption_value(value, index + 1, line, &mut errors);
        }

        trace!(
            "Line {}: interval record produced {} validation issues",
            line,
            errors.len()
        );

        errors
    }

    /// Validate a single consumption entry at 1-based `position`
    fn validate_consumption_value(
        &self,
        value: &str,
        position: usize,
        line: usize,
        errors: &mut Vec<ValidationError>,
    ) {
        let trimmed = value.trim();
        if is_no_reading(trimmed) {
            return;
        }

        let field = format!("interval_value_{}", position);

        if !is_valid_decimal(trimmed) {
            errors.push(
                ValidationError::new(
                    line,
                    ValidationCode::InvalidConsumptionFormat,
                    Severity::Error,
                    format!(
                        "Invalid consumption value at interval {}: '{}' is not a valid decimal",
                        position, value
                    ),
                )
                .with_field(field),
            );
            return;
        }

        // Text beyond the Decimal range still has a known sign
        let (negative, too_high) = match parse_decimal(trimmed) {
            Some(consumption) => (
                consumption < Decimal::ZERO,
                consumption > self.high_consumption_threshold,
            ),
            None => {
                let negative = trimmed.starts_with('-');
                (negative, !negative)
            }
        };

        if negative {
            errors.push(
                ValidationError::new(
                    line,
                    ValidationCode::NegativeConsumption,
                    Severity::Error,
                    format!(
                        "Invalid consumption value at interval {}: '{}' cannot be negative",
                        position, value
                    ),
                )
                .with_field(field.clone()),
            );
        }

        if too_high {
            errors.push(
                ValidationError::new(
                    line,
                    ValidationCode::SuspiciousConsumptionHigh,
                    Severity::Warning,
                    format!(
                        "Suspicious consumption value at interval {}: '{}' seems unusually high",
                        position, value
                    ),
                )
                .with_field(field),
            );
        }
    }
}

/// Parse an interval length field, accepting only the lengths meters support
pub fn parse_interval_length(value: &str) -> Option<u32> {
    value
        .trim()
        .parse::<u32>()
        .ok()
        .filter(|length| INTERVAL_LENGTHS.contains(length))
}

/// Number of interval values in a day for the given interval length
pub fn intervals_per_day(interval_length: u32) -> usize {
    (NUM_MINS_IN_DAY / interval_length) as usize
}

/// Slice of the consumption values in an interval record, truncated if short
pub fn consumption_values<'a>(fields: &'a [&'a str], intervals_per_day: usize) -> &'a [&'a str] {
    let start = interval_index::INTERVAL_VALUES.min(fields.len());
    let end = (interval_index::INTERVAL_VALUES + intervals_per_day).min(fields.len());
    &fields[start..end]
}

/// Blank and `"0"` entries mean "no reading" rather than zero consumption
pub fn is_no_reading(trimmed_value: &str) -> bool {
    trimmed_value.is_empty() || trimmed_value == ZERO_CONSUMPTION
}
