//! Conversion statistics for a single NEM12 file
//!
//! Tracks record counts used for the structural checks and the reading
//! aggregates written to the SQL footer.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::app::models::{Reading, RecordOutcome, RecordType};

/// Snapshot of what a conversion has seen so far
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionStats {
    /// Readings written to the SQL output
    pub total_readings: usize,

    /// 100 records seen, valid or not
    pub header_count: usize,

    /// 900 records seen
    pub footer_count: usize,

    /// Distinct NMIs with at least one reading
    pub meter_ids: BTreeSet<String>,

    pub min_timestamp: Option<NaiveDateTime>,
    pub max_timestamp: Option<NaiveDateTime>,
}

impl ConversionStats {
    /// Create new empty statistics
    pub fn new() -> Self {
        Self::default()
    }

    pub fn nmi_count(&self) -> usize {
        self.meter_ids.len()
    }

    /// Earliest and latest reading timestamps, once any reading was recorded
    pub fn date_range(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        self.min_timestamp.zip(self.max_timestamp)
    }
}

/// Accumulates [`ConversionStats`] from parse outcomes
#[derive(Debug, Default)]
pub struct StatisticsCollector {
    stats: ConversionStats,
}

impl StatisticsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update counts from one record outcome
    ///
    /// Header and footer records count regardless of validation outcome.
    /// Readings count only for interval data that decoded successfully.
    pub fn record(&mut self, outcome: &RecordOutcome) {
        match outcome.record_type {
            RecordType::Header => self.stats.header_count += 1,
            RecordType::EndOfData => self.stats.footer_count += 1,
            RecordType::IntervalData => {
                if let Some(readings) = &outcome.readings {
                    self.record_readings(readings);
                }
            }
            _ => {}
        }
    }

    /// Fold decoded readings into the totals
    pub fn record_readings(&mut self, readings: &[Reading]) {
        for reading in readings {
            if !self.stats.meter_ids.contains(&reading.meter_id) {
                self.stats.meter_ids.insert(reading.meter_id.clone());
            }

            let timestamp = reading.timestamp;
            self.stats.min_timestamp = Some(
                self.stats
                    .min_timestamp
                    .map_or(timestamp, |min| min.min(timestamp)),
            );
            self.stats.max_timestamp = Some(
                self.stats
                    .max_timestamp
                    .map_or(timestamp, |max| max.max(timestamp)),
            );
        }
        self.stats.total_readings += readings.len();
    }

    /// Read-only view of the current statistics
    pub fn stats(&self) -> &ConversionStats {
        &self.stats
    }

    pub fn into_stats(self) -> ConversionStats {
        self.stats
    }
}
