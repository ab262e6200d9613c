//! Tests for SQL rendering and streaming

use super::*;
use crate::app::services::converter::sql_writer::{SqlGenerator, SqlWriter};
use crate::app::services::converter::stats::StatisticsCollector;
use chrono::{TimeZone, Utc};
use pretty_assertions::assert_eq;

#[test]
fn test_batch_insert_single_reading() {
    let sql = SqlGenerator::default()
        .generate_batch_insert(&[reading("NMI1", "2024-01-01 00:30:00", "1.25")]);

    assert_eq!(
        sql,
        "INSERT INTO meter_readings (nmi, timestamp, consumption)\nVALUES\n('NMI1', '2024-01-01 00:30:00', 1.25)\nON CONFLICT (nmi, timestamp) DO NOTHING;"
    );
}

#[test]
fn test_batch_insert_multiple_readings() {
    let sql = SqlGenerator::default().generate_batch_insert(&[
        reading("NMI1", "2024-01-01 00:30:00", "1.30"),
        reading("NMI1", "2024-01-01 01:00:00", "2.00"),
        reading("NMI1", "2024-01-01 01:30:00", "0.0"),
    ]);

    assert_eq!(
        sql,
        "INSERT INTO meter_readings (nmi, timestamp, consumption)\nVALUES\n\
         ('NMI1', '2024-01-01 00:30:00', 1.3),\n\
         ('NMI1', '2024-01-01 01:00:00', 2),\n\
         ('NMI1', '2024-01-01 01:30:00', 0)\n\
         ON CONFLICT (nmi, timestamp) DO NOTHING;"
    );
}

#[test]
fn test_batch_insert_empty() {
    assert_eq!(SqlGenerator::default().generate_batch_insert(&[]), "");
}

#[test]
fn test_custom_table_and_quoted_meter_id() {
    let sql = SqlGenerator::new("energy.readings")
        .generate_batch_insert(&[reading("O'NMI", "2024-01-01 00:30:00", "1")]);

    assert!(sql.starts_with("INSERT INTO energy.readings (nmi, timestamp, consumption)"));
    assert!(sql.contains("('O''NMI', '2024-01-01 00:30:00', 1)"));
}

#[test]
fn test_header() {
    let generated_at = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
    let header = SqlGenerator::default().generate_header("file-valid.csv", generated_at);

    assert_eq!(
        header,
        "-- Generated NEM12 meter readings\n-- Source: file-valid.csv\n-- Generated: 2020-01-01T00:00:00.000Z\n\n"
    );
}

#[test]
fn test_footer_without_readings() {
    let footer = SqlGenerator::default().generate_footer(&StatisticsCollector::new().into_stats());
    assert_eq!(footer, "-- Total readings: 0\n-- NMI count: 0\n");
}

#[test]
fn test_footer_with_date_range() {
    let mut collector = StatisticsCollector::new();
    collector.record_readings(&[
        reading("NMI1", "2024-01-01 00:30:00", "1"),
        reading("NMI2", "2024-01-02 00:00:00", "1"),
    ]);

    let footer = SqlGenerator::default().generate_footer(collector.stats());
    assert_eq!(
        footer,
        "-- Total readings: 2\n-- NMI count: 2\n-- Date range: 2024-01-01 00:30:00 to 2024-01-02 00:00:00\n"
    );
}

#[test]
fn test_writer_streams_statements() {
    let mut writer = SqlWriter::new(Vec::new(), SqlGenerator::default());
    writer
        .write_readings(&[reading("NMI1", "2024-01-01 00:30:00", "1.5")])
        .unwrap();
    writer.write_readings(&[]).unwrap();
    writer
        .write_readings(&[reading("NMI2", "2024-01-01 00:30:00", "2.5")])
        .unwrap();

    assert_eq!(writer.statements_written(), 2);

    let output = String::from_utf8(writer.into_inner().unwrap()).unwrap();
    assert_eq!(output.matches("INSERT INTO").count(), 2);
    assert!(output.ends_with("DO NOTHING;\n\n"));
}
