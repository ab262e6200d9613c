//! Streaming parser for NEM12 interval metering files
//!
//! NEM12 files are comma-delimited with a three character record indicator in
//! the first field. The parser reads one line at a time, dispatches each line
//! to the record parser registered for its indicator and yields a
//! [`ParseResult`](crate::app::models::ParseResult) per recognised record.
//!
//! ## Architecture
//!
//! - [`parser`] - Line streaming, context ownership and dispatch
//! - [`record_parser`] - Per-record-type parsers and the composite dispatcher
//! - [`field_parsers`] - Decimal, date and timestamp helpers
//!
//! ## Usage
//!
//! ```rust,no_run
//! use nem12_converter::{Nem12Parser, ParseResult};
//! use rust_decimal::Decimal;
//!
//! # fn example() -> nem12_converter::Result<()> {
//! let parser = Nem12Parser::new(Decimal::from(10_000));
//! for result in parser.parse_file(std::path::Path::new("meter.csv"))? {
//!     if let ParseResult::Record(outcome) = result {
//!         let count = outcome.readings.map_or(0, |r| r.len());
//!         println!("line {}: {} readings", outcome.line, count);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod field_parsers;
pub mod parser;
pub mod record_parser;

#[cfg(test)]
pub mod tests;

// Re-export main types for easy access
pub use parser::{Nem12Parser, ParseIter};
pub use record_parser::{CompositeParser, RecordParser};
