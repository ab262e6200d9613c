//! Application constants for the NEM12 converter
//!
//! Record layouts of the AEMO Meter Data File Format (MDFF) NEM12 file
//! together with the defaults used by the converter and SQL writer.

// =============================================================================
// Record Types
// =============================================================================

/// Record indicator codes found in field 0 of every NEM12 line
pub mod record_codes {
    /// Header record
    pub const HEADER: &str = "100";

    /// NMI data details record
    pub const NMI_DATA_DETAILS: &str = "200";

    /// Interval data record
    pub const INTERVAL_DATA: &str = "300";

    /// Interval event record (not used for SQL generation)
    pub const INTERVAL_EVENT: &str = "400";

    /// B2B details record (not used for SQL generation)
    pub const B2B_DETAILS: &str = "500";

    /// End of data record
    pub const END_OF_DATA: &str = "900";
}

/// Field delimiter for the CSV encoding of NEM12
pub const FIELD_DELIMITER: char = ',';

/// Position of the record indicator within a line
pub const RECORD_TYPE_INDEX: usize = 0;

// =============================================================================
// Header Record (100)
// =============================================================================

/// Only supported file version
pub const VERSION_HEADER: &str = "NEM12";

/// Minimum number of fields in a header record
pub const HEADER_RECORD_FIELD_LENGTH: usize = 5;

/// Field positions within a header record
pub mod header_index {
    pub const VERSION: usize = 1;
    pub const DATE_TIME: usize = 2;
}

// =============================================================================
// NMI Data Details Record (200)
// =============================================================================

/// Minimum number of fields in an NMI data details record
pub const NMI_RECORD_FIELD_LENGTH: usize = 10;

/// Field positions within an NMI data details record
pub mod nmi_index {
    pub const NMI: usize = 1;
    pub const INTERVAL_LENGTH: usize = 8;
}

/// Interval lengths (minutes) a meter may be programmed with
pub const INTERVAL_LENGTHS: &[u32] = &[5, 15, 30];

// =============================================================================
// Interval Data Record (300)
// =============================================================================

/// Field positions within an interval data record
pub mod interval_index {
    pub const INTERVAL_DATE: usize = 1;
    pub const INTERVAL_VALUES: usize = 2;
}

/// Fixed fields surrounding the interval values: record indicator, interval
/// date, quality method, reason code, reason description, update datetime and
/// MSATS load datetime
pub const INTERVAL_DATA_NON_INTERVAL_VALUE_LENGTH: usize = 7;

/// Minutes in a metering day
pub const NUM_MINS_IN_DAY: u32 = 60 * 24;

/// Length of a `CCYYMMDD` date field
pub const NEM12_DATE_LENGTH: usize = 8;

/// Consumption entry meaning "no reading"
pub const ZERO_CONSUMPTION: &str = "0";

// =============================================================================
// Output Defaults
// =============================================================================

/// Extension of the final SQL artifact
pub const SQL_FILE_EXTENSION: &str = ".sql";

/// Extension of the error report artifact
pub const ERROR_FILE_EXTENSION: &str = ".errors.txt";

/// Prefix for the in-progress SQL file created next to the final output
pub const TEMP_FILE_PREFIX: &str = ".nem12-";

/// Default target table for generated inserts
pub const DEFAULT_TABLE_NAME: &str = "meter_readings";

/// Default cutoff above which a consumption value is reported as suspicious
pub const DEFAULT_HIGH_CONSUMPTION_THRESHOLD: i64 = 10_000;

/// Default number of readings between progress log lines
pub const DEFAULT_PROGRESS_LOG_INTERVAL: usize = 10_000;

/// Timestamp format used in SQL literals and footer comments
pub const SQL_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// =============================================================================
// Environment Variables
// =============================================================================

pub mod env_vars {
    pub const TABLE_NAME: &str = "NEM12_TABLE_NAME";
    pub const HIGH_CONSUMPTION_THRESHOLD: &str = "NEM12_HIGH_CONSUMPTION_THRESHOLD";
    pub const PROGRESS_LOG_INTERVAL: &str = "NEM12_PROGRESS_LOG_INTERVAL";
}
