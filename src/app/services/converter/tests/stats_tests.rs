//! Tests for conversion statistics

use super::*;
use crate::app::models::{RecordOutcome, RecordType};
use crate::app::services::converter::stats::{ConversionStats, StatisticsCollector};

fn interval_outcome(readings: Option<Vec<Reading>>) -> RecordOutcome {
    RecordOutcome {
        record_type: RecordType::IntervalData,
        line: 3,
        validation_errors: Vec::new(),
        readings,
    }
}

#[test]
fn test_empty_stats() {
    let stats = ConversionStats::new();
    assert_eq!(stats.total_readings, 0);
    assert_eq!(stats.nmi_count(), 0);
    assert_eq!(stats.date_range(), None);
}

#[test]
fn test_counts_headers_and_footers() {
    let mut collector = StatisticsCollector::new();
    collector.record(&RecordOutcome::without_readings(
        RecordType::Header,
        1,
        Vec::new(),
    ));
    collector.record(&RecordOutcome::without_readings(
        RecordType::NmiDataDetails,
        2,
        Vec::new(),
    ));
    collector.record(&RecordOutcome::without_readings(
        RecordType::EndOfData,
        3,
        Vec::new(),
    ));
    collector.record(&RecordOutcome::without_readings(
        RecordType::EndOfData,
        4,
        Vec::new(),
    ));

    let stats = collector.stats();
    assert_eq!(stats.header_count, 1);
    assert_eq!(stats.footer_count, 2);
    assert_eq!(stats.total_readings, 0);
}

#[test]
fn test_accumulates_readings() {
    let mut collector = StatisticsCollector::new();
    collector.record(&interval_outcome(Some(vec![
        reading("NMI1", "2024-01-01 12:00:00", "1.5"),
        reading("NMI1", "2024-01-01 00:30:00", "2"),
    ])));
    collector.record(&interval_outcome(Some(vec![
        reading("NMI2", "2024-01-02 00:00:00", "0.25"),
    ])));

    let stats = collector.into_stats();
    assert_eq!(stats.total_readings, 3);
    assert_eq!(stats.nmi_count(), 2);
    assert_eq!(
        stats.date_range(),
        Some((
            reading("x", "2024-01-01 00:30:00", "0").timestamp,
            reading("x", "2024-01-02 00:00:00", "0").timestamp,
        ))
    );
}

#[test]
fn test_ignores_suppressed_readings() {
    let mut collector = StatisticsCollector::new();
    collector.record(&interval_outcome(None));

    assert_eq!(collector.stats(), &ConversionStats::new());
}
