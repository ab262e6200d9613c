//! Test utilities for NEM12 parser testing
//!
//! Helpers for building NEM12 records and temporary input files shared by the
//! parser test modules.

use std::io::Write;
use tempfile::NamedTempFile;


pub const HEADER_LINE: &str = "100,NEM12,200506081149,UNITEDDP,NEMMCO";
pub const FOOTER_LINE: &str = "900";

/// Build a 200 record for the given NMI and interval length
pub fn nmi_line(nmi: &str, interval_length: &str) -> String {
    format!(
        "200,{},E1E2,1,E1,N1,01009,kWh,{},20050610",
        nmi, interval_length
    )
}

/// Build a 300 record with the given consumption values and trailing quality fields
pub fn interval_line(date: &str, values: &[String]) -> String {
    format!(
        "300,{},{},A,,,20050310121004,20050310182204",
        date,
        values.join(",")
    )
}

/// `count` distinct consumption values starting at 0.001
pub fn sequential_values(count: usize) -> Vec<String> {
    (1..=count).map(|i| format!("{}.{:03}", i / 1000, i % 1000)).collect()
}

/// A complete single-meter file with two days of 30 minute data
pub fn create_test_nem12() -> String {
    [
        HEADER_LINE.to_string(),
        nmi_line("NEM1201009", "30"),
        interval_line("20050301", &sequential_values(48)),
        interval_line("20050302", &sequential_values(48)),
        FOOTER_LINE.to_string(),
    ]
    .join("\n")
}

/// Helper to create a temporary file with given content
pub fn create_temp_file(content: &str) -> NamedTempFile {
    let mut temp_file = NamedTempFile::new().unwrap();
    writeln!(temp_file, "{}", content).unwrap();
    temp_file
}
