//! Integration tests for NEM12 to SQL conversion with fixture files
//!
//! Each test converts a file from `tests/data` into a temporary directory and
//! checks the SQL output and error report byte for byte, ignoring only the
//! generation timestamp.

use nem12_converter::{Converter, ConverterConfig, Nem12Parser, ParseResult};
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join(name)
}

fn sql_without_timestamp(path: &Path) -> String {
    let sql = fs::read_to_string(path).expect("SQL output should exist");
    let (kept, generated): (Vec<&str>, Vec<&str>) = sql
        .lines()
        .partition(|line| !line.starts_with("-- Generated: "));
    assert_eq!(generated.len(), 1, "exactly one generation timestamp line");
    kept.iter().map(|line| format!("{}\n", line)).collect()
}

fn convert_fixture(name: &str, dir: &TempDir) -> nem12_converter::ConversionSummary {
    let converter = Converter::new(ConverterConfig::default()).unwrap();
    let output_base = dir.path().join(Path::new(name).file_stem().unwrap());
    converter
        .convert(&fixture(name), &output_base)
        .expect("conversion should complete")
}

/// Two meters with a day of 30 minute data each produce two inserts
#[test]
fn test_convert_valid_file() {
    let dir = TempDir::new().unwrap();

    let summary = convert_fixture("valid.csv", &dir);

    assert!(summary.is_clean());
    assert_eq!(summary.stats.total_readings, 96);
    assert_eq!(summary.stats.nmi_count(), 2);
    assert_eq!(summary.error_path, None);
    assert!(!dir.path().join("valid.errors.txt").exists());

    let expected = fs::read_to_string(fixture("valid.expected.sql")).unwrap();
    assert_eq!(sql_without_timestamp(&summary.sql_path), expected);
}

/// The generation line is RFC 3339 UTC with millisecond precision
#[test]
fn test_generation_timestamp_format() {
    let dir = TempDir::new().unwrap();

    let summary = convert_fixture("valid.csv", &dir);

    let sql = fs::read_to_string(&summary.sql_path).unwrap();
    let generated = sql
        .lines()
        .find_map(|line| line.strip_prefix("-- Generated: "))
        .unwrap();
    assert_eq!(generated.len(), "2020-01-01T00:00:00.000Z".len());
    assert!(generated.ends_with('Z'));
    assert!(chrono::DateTime::parse_from_rfc3339(generated).is_ok());
}

/// A wrong version tag stops processing at the header
#[test]
fn test_convert_invalid_filetype() {
    let dir = TempDir::new().unwrap();

    let summary = convert_fixture("invalid-filetype.csv", &dir);

    assert!(summary.has_errors);
    assert!(summary.premature_end);
    assert_eq!(
        sql_without_timestamp(&summary.sql_path),
        "-- Generated NEM12 meter readings\n-- Source: invalid-filetype.csv\n\n-- Total readings: 0\n-- NMI count: 0\n"
    );
    assert_eq!(
        fs::read_to_string(summary.error_path.unwrap()).unwrap(),
        "1: (INVALID_VERSION) Expected NEM12 format, got: NEM88\n"
    );
}

/// Every malformed value in a record is reported and the record is skipped
#[test]
fn test_convert_invalid_meter_record() {
    let dir = TempDir::new().unwrap();

    let summary = convert_fixture("invalid-meter-record.csv", &dir);

    assert!(summary.has_errors);
    assert!(!summary.premature_end);
    assert_eq!(summary.stats.total_readings, 0);
    assert_eq!(
        sql_without_timestamp(&summary.sql_path),
        "-- Generated NEM12 meter readings\n-- Source: invalid-meter-record.csv\n\n-- Total readings: 0\n-- NMI count: 0\n"
    );

    let expected_errors: String = ["aaa", "bbb", "ccc", "ddd", "eee", "fff", "ggg"]
        .iter()
        .enumerate()
        .map(|(i, value)| {
            format!(
                "3: (INVALID_CONSUMPTION_FORMAT) Invalid consumption value at interval {}: '{}' is not a valid decimal\n",
                i + 1,
                value
            )
        })
        .collect();
    assert_eq!(
        fs::read_to_string(summary.error_path.unwrap()).unwrap(),
        expected_errors
    );
}

/// 400, 500, unknown and blank lines are skipped; CRLF endings are accepted
#[test]
fn test_convert_mixed_records() {
    let dir = TempDir::new().unwrap();

    let summary = convert_fixture("mixed-records.csv", &dir);

    assert!(summary.is_clean(), "unexpected errors: {:?}", summary.error_path);
    assert_eq!(summary.stats.total_readings, 96);
    assert_eq!(summary.stats.nmi_count(), 2);

    let expected = fs::read_to_string(fixture("valid.expected.sql"))
        .unwrap()
        .replace("-- Source: valid.csv", "-- Source: mixed-records.csv");
    assert_eq!(sql_without_timestamp(&summary.sql_path), expected);
}

/// A missing end of data record is reported but readings are kept
#[test]
fn test_convert_truncated_file() {
    let dir = TempDir::new().unwrap();

    let summary = convert_fixture("truncated.csv", &dir);

    assert!(summary.has_errors);
    assert!(!summary.premature_end);
    assert_eq!(summary.stats.total_readings, 48);
    assert_eq!(
        fs::read_to_string(summary.error_path.unwrap()).unwrap(),
        "Expected 1 end of file record, got 0, check if file is truncated\n"
    );
}

/// Repeated conversions differ only in the generation timestamp
#[test]
fn test_conversion_is_repeatable() {
    let first_dir = TempDir::new().unwrap();
    let second_dir = TempDir::new().unwrap();

    let first = convert_fixture("valid.csv", &first_dir);
    let second = convert_fixture("valid.csv", &second_dir);

    assert_eq!(
        sql_without_timestamp(&first.sql_path),
        sql_without_timestamp(&second.sql_path)
    );
}

/// The configured table name flows through to every insert
#[test]
fn test_custom_table_name() {
    let dir = TempDir::new().unwrap();
    let config = ConverterConfig::default().with_table_name("staging.meter_readings");
    let converter = Converter::new(config).unwrap();

    let summary = converter
        .convert(&fixture("valid.csv"), &dir.path().join("valid"))
        .unwrap();

    let sql = fs::read_to_string(summary.sql_path).unwrap();
    assert_eq!(
        sql.matches("INSERT INTO staging.meter_readings (nmi, timestamp, consumption)")
            .count(),
        2
    );
    assert!(!sql.contains("INSERT INTO meter_readings"));
}

/// The parser alone streams the fixture lazily in file order
#[test]
fn test_parser_streams_fixture() {
    let parser = Nem12Parser::new(Decimal::from(10_000));

    let lines: Vec<usize> = parser
        .parse_file(&fixture("mixed-records.csv"))
        .unwrap()
        .map(|result| {
            assert!(matches!(result, ParseResult::Record(_)));
            result.line()
        })
        .collect();

    assert_eq!(lines, vec![1, 2, 3, 8, 9, 10]);
}
