//! Test utilities for the conversion pipeline

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tempfile::TempDir;

use crate::app::models::Reading;

mod sql_writer_tests;
mod stats_tests;

/// Build a reading from text values
pub fn reading(meter_id: &str, timestamp: &str, consumption: &str) -> Reading {
    Reading {
        meter_id: meter_id.to_string(),
        timestamp: NaiveDateTime::parse_from_str(timestamp, "%Y-%m-%d %H:%M:%S").unwrap(),
        consumption: Decimal::from_str(consumption).unwrap(),
    }
}

/// 48 values of 30 minute data as a 300 record
pub fn interval_record(date: &str, first_value: &str) -> String {
    let mut values = vec![first_value.to_string()];
    values.extend((2..=48).map(|i| format!("1.{:02}", i)));
    format!(
        "300,{},{},A,,,20240102010000,20240102010000",
        date,
        values.join(",")
    )
}

pub fn nmi_record(nmi: &str) -> String {
    format!("200,{},E1,1,E1,N1,METER1,kWh,30,20240201", nmi)
}

pub const HEADER: &str = "100,NEM12,202401010000,MDP1,RETAILER";
pub const FOOTER: &str = "900";

/// Write `lines` as an input file inside `dir`
pub fn write_input(dir: &TempDir, name: &str, lines: &[String]) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, lines.join("\n") + "\n").unwrap();
    path
}

/// SQL output with the generation timestamp line removed
pub fn read_sql_without_timestamp(path: &Path) -> String {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .filter(|line| !line.starts_with("-- Generated: "))
        .map(|line| format!("{}\n", line))
        .collect()
}
