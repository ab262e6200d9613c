//! Core NEM12 parser implementation
//!
//! Streams a file line by line, splitting each line into fields and handing
//! them to the record parser registered for the record indicator. Results are
//! produced lazily so memory use does not grow with file size.

use rust_decimal::Decimal;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

use super::record_parser::CompositeParser;
use crate::app::models::{ParseContext, ParseResult};
use crate::constants::{FIELD_DELIMITER, RECORD_TYPE_INDEX};
use crate::{Error, Result};

/// NEM12 file parser
#[derive(Debug, Clone)]
pub struct Nem12Parser {
    record_parsers: Arc<CompositeParser>,
}

impl Nem12Parser {
    /// Create a parser that flags consumption above `high_consumption_threshold`
    pub fn new(high_consumption_threshold: Decimal) -> Self {
        Self {
            record_parsers: Arc::new(CompositeParser::new(high_consumption_threshold)),
        }
    }

    /// Open a file and return a lazy iterator over its parse results
    pub fn parse_file(&self, file_path: &Path) -> Result<ParseIter<BufReader<File>>> {
        info!("Parsing NEM12 file: {}", file_path.display());

        let file = File::open(file_path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::file_not_found(file_path.display().to_string())
            } else {
                Error::io(format!("Failed to open {}", file_path.display()), e)
            }
        })?;

        Ok(self.parse_reader(BufReader::new(file)))
    }

    /// Parse from any buffered reader
    pub fn parse_reader<R: BufRead>(&self, reader: R) -> ParseIter<R> {
        ParseIter {
            reader,
            buffer: Vec::new(),
            line_number: 0,
            context: ParseContext::new(),
            record_parsers: Arc::clone(&self.record_parsers),
            finished: false,
        }
    }
}

/// Lazy, single-pass iterator of parse results for one input
///
/// Owns the [`ParseContext`] for the input, so state never leaks between files.
pub struct ParseIter<R> {
    reader: R,
    buffer: Vec<u8>,
    line_number: usize,
    context: ParseContext,
    record_parsers: Arc<CompositeParser>,
    finished: bool,
}

impl<R> ParseIter<R> {
    /// Current context, reflecting every record yielded so far
    pub fn context(&self) -> &ParseContext {
        &self.context
    }

    /// Number of physical lines consumed so far
    pub fn lines_read(&self) -> usize {
        self.line_number
    }

    fn parse_line(&mut self, line: &str) -> Option<ParseResult> {
        let fields: Vec<&str> = line.split(FIELD_DELIMITER).collect();
        let record_code = fields[RECORD_TYPE_INDEX];

        let Some(parser) = self.record_parsers.get_parser(record_code) else {
            debug!(
                "Line {}: skipping record type '{}'",
                self.line_number, record_code
            );
            return None;
        };

        match parser.parse(&fields, self.line_number, &mut self.context) {
            Ok(outcome) => Some(ParseResult::Record(outcome)),
            Err(e) => Some(ParseResult::Unexpected {
                line_number: self.line_number,
                error: e.to_string(),
            }),
        }
    }
}

impl<R: BufRead> Iterator for ParseIter<R> {
    type Item = ParseResult;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.finished {
            self.buffer.clear();
            match self.reader.read_until(b'\n', &mut self.buffer) {
                Ok(0) => return None,
                Ok(_) => {}
                Err(e) => {
                    self.line_number += 1;
                    self.finished = true;
                    return Some(ParseResult::Unexpected {
                        line_number: self.line_number,
                        error: Error::io(format!("Failed to read line: {}", e), e).to_string(),
                    });
                }
            }
            self.line_number += 1;

            // Invalid UTF-8 becomes U+FFFD so the record is still validated or skipped
            let buffer = std::mem::take(&mut self.buffer);
            let line = String::from_utf8_lossy(&buffer);
            let line = line.trim_end_matches('\n');
            let line = line.strip_suffix('\r').unwrap_or(line);

            let result = if line.trim().is_empty() {
                None
            } else {
                self.parse_line(line)
            };
            self.buffer = buffer;

            if result.is_some() {
                return result;
            }
        }

        None
    }
}

impl<R> std::fmt::Debug for ParseIter<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParseIter")
            .field("line_number", &self.line_number)
            .field("context", &self.context)
            .finish()
    }
}
