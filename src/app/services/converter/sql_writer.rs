//! SQL rendering and output for decoded meter readings
//!
//! [`SqlGenerator`] renders text only, [`SqlWriter`] streams it to any
//! [`Write`] sink so the converter never holds more than one record's readings
//! in memory.

use chrono::{DateTime, SecondsFormat, Utc};
use std::io::Write;

use super::stats::ConversionStats;
use crate::app::models::Reading;
use crate::app::services::nem12_parser::field_parsers::format_timestamp;
use crate::constants::DEFAULT_TABLE_NAME;
use crate::{Error, Result};

/// Renders readings as batched `INSERT` statements
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlGenerator {
    table_name: String,
}

impl Default for SqlGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_TABLE_NAME)
    }
}

impl SqlGenerator {
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
        }
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// Render one multi-row insert, or an empty string for no readings
    ///
    /// Duplicate `(nmi, timestamp)` rows are ignored by the database so the
    /// output can be replayed safely.
    pub fn generate_batch_insert(&self, readings: &[Reading]) -> String {
        if readings.is_empty() {
            return String::new();
        }

        let values: Vec<String> = readings.iter().map(format_value_row).collect();

        format!(
            "INSERT INTO {} (nmi, timestamp, consumption)\nVALUES\n{}\nON CONFLICT (nmi, timestamp) DO NOTHING;",
            self.table_name,
            values.join(",\n")
        )
    }

    /// Comment block opening every SQL file
    pub fn generate_header(&self, source_name: &str, generated_at: DateTime<Utc>) -> String {
        format!(
            "-- Generated NEM12 meter readings\n-- Source: {}\n-- Generated: {}\n\n",
            source_name,
            generated_at.to_rfc3339_opts(SecondsFormat::Millis, true)
        )
    }

    /// Comment block closing every SQL file
    pub fn generate_footer(&self, stats: &ConversionStats) -> String {
        let mut footer = format!(
            "-- Total readings: {}\n-- NMI count: {}\n",
            stats.total_readings,
            stats.nmi_count()
        );

        if let Some((min, max)) = stats.date_range() {
            footer.push_str(&format!(
                "-- Date range: {} to {}\n",
                format_timestamp(&min),
                format_timestamp(&max)
            ));
        }

        footer
    }
}

/// `('<nmi>', '<timestamp>', <consumption>)` with trailing zeros stripped
fn format_value_row(reading: &Reading) -> String {
    format!(
        "('{}', '{}', {})",
        escape_literal(&reading.meter_id),
        format_timestamp(&reading.timestamp),
        reading.consumption.normalize()
    )
}

fn escape_literal(value: &str) -> String {
    value.replace('\'', "''")
}

/// Streams SQL output to a writer
#[derive(Debug)]
pub struct SqlWriter<W: Write> {
    generator: SqlGenerator,
    inner: W,
    statements_written: usize,
}

impl<W: Write> SqlWriter<W> {
    pub fn new(inner: W, generator: SqlGenerator) -> Self {
        Self {
            generator,
            inner,
            statements_written: 0,
        }
    }

    pub fn write_header(&mut self, source_name: &str, generated_at: DateTime<Utc>) -> Result<()> {
        let header = self.generator.generate_header(source_name, generated_at);
        self.write_text(&header)
    }

    /// Write one insert statement followed by a blank line
    pub fn write_readings(&mut self, readings: &[Reading]) -> Result<()> {
        if readings.is_empty() {
            return Ok(());
        }

        let statement = self.generator.generate_batch_insert(readings);
        self.write_text(&statement)?;
        self.write_text("\n\n")?;
        self.statements_written += 1;
        Ok(())
    }

    pub fn write_footer(&mut self, stats: &ConversionStats) -> Result<()> {
        let footer = self.generator.generate_footer(stats);
        self.write_text(&footer)
    }

    /// Number of insert statements written
    pub fn statements_written(&self) -> usize {
        self.statements_written
    }

    /// Flush and hand back the underlying writer
    pub fn into_inner(mut self) -> Result<W> {
        self.inner
            .flush()
            .map_err(|e| Error::io("Failed to flush SQL output", e))?;
        Ok(self.inner)
    }

    fn write_text(&mut self, text: &str) -> Result<()> {
        self.inner
            .write_all(text.as_bytes())
            .map_err(|e| Error::io("Failed to write SQL output", e))
    }
}
