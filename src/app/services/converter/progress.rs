//! Progress reporting for conversions
//!
//! Logs a line every `log_interval` readings and optionally drives a spinner.
//! The total number of readings is unknown until the file has been streamed,
//! so no percentage is shown.

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use tracing::{debug, info};

use super::stats::ConversionStats;

/// Progress reporter for a single conversion
pub struct ProgressReporter {
    progress_bar: Option<ProgressBar>,
    log_interval: usize,
    readings_processed: usize,
}

impl ProgressReporter {
    /// Create a reporter that logs every `log_interval` readings
    pub fn new(log_interval: usize) -> Self {
        Self {
            progress_bar: None,
            log_interval: log_interval.max(1),
            readings_processed: 0,
        }
    }

    /// Show a spinner with the running reading count
    pub fn setup_spinner(&mut self, message: &str) {
        let pb = create_spinner(message);
        debug!("Progress spinner initialized");
        self.progress_bar = Some(pb);
    }

    /// Record readings written, logging whenever an interval boundary is crossed
    pub fn increment(&mut self, readings: usize) {
        let previous = self.readings_processed;
        self.readings_processed += readings;

        if crossed_interval(previous, self.readings_processed, self.log_interval) {
            self.suspend(|| info!("Processed {} readings...", self.readings_processed));
        }

        if let Some(ref pb) = self.progress_bar {
            pb.set_message(format!("{} readings written", self.readings_processed));
            pb.tick();
        }
    }

    /// Finish progress reporting with a completion message
    pub fn finish(&self, stats: &ConversionStats) {
        if let Some(ref pb) = self.progress_bar {
            let completion_message = format!(
                "Completed: {} readings, {} NMIs",
                stats.total_readings,
                stats.nmi_count()
            );
            pb.finish_with_message(completion_message.clone());
            debug!("Progress reporting completed: {}", completion_message);
        }
    }

    /// Finish progress reporting with an error message
    pub fn finish_with_error(&self, error_message: &str) {
        if let Some(ref pb) = self.progress_bar {
            pb.finish_with_message(format!("Failed: {}", error_message));
            debug!("Progress reporting finished with error: {}", error_message);
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.progress_bar.is_some()
    }

    pub fn readings_processed(&self) -> usize {
        self.readings_processed
    }

    /// Suspend the spinner so log output is not interleaved with it
    pub fn suspend<F, R>(&self, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        if let Some(ref pb) = self.progress_bar {
            pb.suspend(f)
        } else {
            f()
        }
    }
}

impl Drop for ProgressReporter {
    fn drop(&mut self) {
        if let Some(ref pb) = self.progress_bar {
            if !pb.is_finished() {
                pb.finish_and_clear();
            }
        }
    }
}

/// True when a multiple of `interval` lies in `(previous, current]`
pub fn crossed_interval(previous: usize, current: usize, interval: usize) -> bool {
    interval > 0 && current / interval > previous / interval
}

/// Create a simple spinner for operations without a known length
pub fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed}] {msg}")
    {
        pb.set_style(style.tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]));
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
