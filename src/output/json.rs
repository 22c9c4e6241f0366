//! JSON output formatter for comparison reports.
//!
//! # Output Schema
//!
//! ```json
//! [
//!   {
//!     "path": "/photos/a.png",
//!     "matches": [
//!       { "distance": 0, "path": "/photos/a-copy.png" },
//!       { "distance": 3, "path": "/photos/b.png" }
//!     ]
//!   }
//! ]
//! ```
//!
//! Paths are written as given; a non-UTF-8 path is a serialization error.

use std::io::Write;

use crate::duplicates::Report;

/// JSON formatter for a [`Report`].
#[derive(Debug, Clone, Copy)]
pub struct JsonOutput<'a> {
    report: &'a Report,
}

impl<'a> JsonOutput<'a> {
    /// Create a JSON formatter for a report.
    #[must_use]
    pub fn new(report: &'a Report) -> Self {
        Self { report }
    }

    /// Serialize to a compact JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if a path is not valid UTF-8.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self.report)
    }

    /// Serialize to a pretty-printed JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if a path is not valid UTF-8.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self.report)
    }

    /// Write JSON to a writer, followed by a newline.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W, pretty: bool) -> Result<(), JsonOutputError> {
        let json = if pretty {
            self.to_json_pretty()?
        } else {
            self.to_json()?
        };
        writer.write_all(json.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }
}

/// Errors that can occur during JSON output.
#[derive(thiserror::Error, Debug)]
pub enum JsonOutputError {
    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error during writing
    #[error("I/O error during JSON output: {0}")]
    Io(#[from] std::io::Error),
}
