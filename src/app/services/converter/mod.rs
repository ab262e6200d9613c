//! NEM12 to SQL conversion
//!
//! ## Architecture
//!
//! - [`conversion`] - [`Converter`] orchestration and atomic output placement
//! - [`stats`] - Reading counts, NMI set and date range
//! - [`error_tracker`] - Error report writing and the stop decision
//! - [`sql_writer`] - Batched `INSERT` rendering and streaming
//! - [`progress`] - Progress logging and the optional spinner
//!
//! ## Usage
//!
//! ```rust,no_run
//! use nem12_converter::{Converter, ConverterConfig};
//! use std::path::Path;
//!
//! # fn example() -> nem12_converter::Result<()> {
//! let converter = Converter::new(ConverterConfig::default())?;
//! let summary = converter.convert(Path::new("meter.csv"), Path::new("out/meter"))?;
//!
//! println!(
//!     "Wrote {} readings to {}",
//!     summary.stats.total_readings,
//!     summary.sql_path.display()
//! );
//! # Ok(())
//! # }
//! ```

pub mod conversion;
pub mod error_tracker;
pub mod progress;
pub mod sql_writer;
pub mod stats;

#[cfg(test)]
pub mod tests;

// Re-export main types for easy access
pub use conversion::{ConversionSummary, Converter};
pub use error_tracker::{ErrorTracker, should_stop_processing};
pub use progress::ProgressReporter;
pub use sql_writer::{SqlGenerator, SqlWriter};
pub use stats::{ConversionStats, StatisticsCollector};
