//! Record-type specific parsing for NEM12 files
//!
//! Each parser validates its record through [`Nem12Validator`], updates the
//! shared [`ParseContext`] where the record carries cross-record state, and
//! decodes readings for interval data. Validation problems are returned as
//! data inside the [`RecordOutcome`]; only failures outside the validation
//! rules are returned as `Err`.

use rust_decimal::Decimal;
use std::collections::HashMap;
use tracing::{debug, trace, warn};

use super::field_parsers::{
    calculate_interval_timestamp, is_valid_decimal, parse_decimal, parse_nem12_date,
};
use crate::app::models::{ParseContext, Reading, RecordOutcome, RecordType};
use crate::app::services::validator::{
    Nem12Validator, consumption_values, intervals_per_day, is_no_reading, parse_interval_length,
};
use crate::constants::{interval_index, nmi_index, record_codes};
use crate::{Error, Result};

/// Parser for a single NEM12 record type
pub trait RecordParser: Send + Sync {
    /// Parse the split fields of one record found at `line`
    fn parse(&self, fields: &[&str], line: usize, context: &mut ParseContext)
    -> Result<RecordOutcome>;
}

/// 100 record: file header
#[derive(Debug, Clone)]
pub struct HeaderRecordParser {
    validator: Nem12Validator,
}

impl HeaderRecordParser {
    pub fn new(validator: Nem12Validator) -> Self {
        Self { validator }
    }
}

impl RecordParser for HeaderRecordParser {
    fn parse(
        &self,
        fields: &[&str],
        line: usize,
        _context: &mut ParseContext,
    ) -> Result<RecordOutcome> {
        let errors = self.validator.validate_header_record(fields, line);
        Ok(RecordOutcome::without_readings(
            RecordType::Header,
            line,
            errors,
        ))
    }
}

/// 200 record: NMI data details, sets the meter and interval length context
#[derive(Debug, Clone)]
pub struct NmiRecordParser {
    validator: Nem12Validator,
}

impl NmiRecordParser {
    pub fn new(validator: Nem12Validator) -> Self {
        Self { validator }
    }
}

impl RecordParser for NmiRecordParser {
    fn parse(
        &self,
        fields: &[&str],
        line: usize,
        context: &mut ParseContext,
    ) -> Result<RecordOutcome> {
        let errors = self.validator.validate_nmi_record(fields, line);

        if errors.is_empty() {
            let meter_id = fields[nmi_index::NMI].to_string();
            let interval_length = parse_interval_length(fields[nmi_index::INTERVAL_LENGTH]);

            debug!(
                "Line {}: NMI {} with {:?} minute intervals",
                line, meter_id, interval_length
            );

            context.current_meter_id = Some(meter_id);
            context.current_interval_length = interval_length;
        }

        Ok(RecordOutcome::without_readings(
            RecordType::NmiDataDetails,
            line,
            errors,
        ))
    }
}

/// 300 record: one day of interval consumption values
#[derive(Debug, Clone)]
pub struct IntervalDataRecordParser {
    validator: Nem12Validator,
}

impl IntervalDataRecordParser {
    pub fn new(validator: Nem12Validator) -> Self {
        Self { validator }
    }

    /// Turn a validated interval record into readings
    fn decode_readings(
        &self,
        fields: &[&str],
        line: usize,
        context: &ParseContext,
    ) -> Result<Vec<Reading>> {
        let (Some(meter_id), Some(interval_length)) = (
            context.current_meter_id.as_deref(),
            context.current_interval_length,
        ) else {
            return Err(Error::decode(
                line,
                "No NMI context available for interval data",
            ));
        };

        let date_field = fields[interval_index::INTERVAL_DATE];
        let base_date = parse_nem12_date(date_field)
            .ok_or_else(|| Error::decode(line, format!("Invalid date: {}", date_field)))?;

        let mut readings = Vec::new();
        for (index, value) in consumption_values(fields, intervals_per_day(interval_length))
            .iter()
            .enumerate()
        {
            let trimmed = value.trim();
            if is_no_reading(trimmed) {
                continue;
            }

            let Some(consumption) = parse_decimal(trimmed) else {
                if is_valid_decimal(trimmed) {
                    warn!(
                        "Line {}: consumption '{}' at interval {} is out of range, skipping",
                        line,
                        trimmed,
                        index + 1
                    );
                    continue;
                }
                return Err(Error::decode(
                    line,
                    format!("Invalid consumption value at interval {}", index + 1),
                ));
            };

            readings.push(Reading {
                meter_id: meter_id.to_string(),
                timestamp: calculate_interval_timestamp(base_date, interval_length, index),
                consumption,
            });
        }

        trace!("Line {}: decoded {} readings", line, readings.len());
        Ok(readings)
    }
}

impl RecordParser for IntervalDataRecordParser {
    fn parse(
        &self,
        fields: &[&str],
        line: usize,
        context: &mut ParseContext,
    ) -> Result<RecordOutcome> {
        let errors =
            self.validator
                .validate_interval_record(fields, line, context.current_interval_length);

        let readings = if errors.iter().any(|e| e.severity.blocks_decoding()) {
            None
        } else {
            Some(self.decode_readings(fields, line, context)?)
        };

        Ok(RecordOutcome {
            record_type: RecordType::IntervalData,
            line,
            validation_errors: errors,
            readings,
        })
    }
}

/// 900 record: end of data marker
#[derive(Debug, Clone, Default)]
pub struct EndOfDataRecordParser;

impl RecordParser for EndOfDataRecordParser {
    fn parse(
        &self,
        _fields: &[&str],
        line: usize,
        _context: &mut ParseContext,
    ) -> Result<RecordOutcome> {
        Ok(RecordOutcome::without_readings(
            RecordType::EndOfData,
            line,
            Vec::new(),
        ))
    }
}

/// Dispatches records to the parser registered for their indicator
///
/// 400 and 500 records have no registered parser and are skipped by the
/// caller.
pub struct CompositeParser {
    parsers: HashMap<&'static str, Box<dyn RecordParser>>,
}

impl CompositeParser {
    /// Register the standard record parsers with a shared validator
    pub fn new(high_consumption_threshold: Decimal) -> Self {
        let validator = Nem12Validator::new(high_consumption_threshold);

        let mut parsers: HashMap<&'static str, Box<dyn RecordParser>> = HashMap::new();
        parsers.insert(
            record_codes::HEADER,
            Box::new(HeaderRecordParser::new(validator.clone())),
        );
        parsers.insert(
            record_codes::NMI_DATA_DETAILS,
            Box::new(NmiRecordParser::new(validator.clone())),
        );
        parsers.insert(
            record_codes::INTERVAL_DATA,
            Box::new(IntervalDataRecordParser::new(validator)),
        );
        parsers.insert(record_codes::END_OF_DATA, Box::new(EndOfDataRecordParser));

        Self { parsers }
    }

    /// Look up the parser for a record indicator
    pub fn get_parser(&self, record_code: &str) -> Option<&dyn RecordParser> {
        self.parsers.get(record_code).map(|parser| parser.as_ref())
    }
}

impl std::fmt::Debug for CompositeParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut codes: Vec<_> = self.parsers.keys().collect();
        codes.sort();
        f.debug_struct("CompositeParser")
            .field("record_codes", &codes)
            .finish()
    }
}
