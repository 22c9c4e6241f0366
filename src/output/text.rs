//! Plain-text report output.
//!
//! Each retained pair is printed as `<distance> - <path> - <other>`, groups in
//! path order and matches by ascending distance, so the output of two runs over
//! the same working set can be diffed directly.

use std::io::{self, Write};

use crate::duplicates::Report;

/// Line-oriented formatter for a [`Report`].
#[derive(Debug, Clone, Copy)]
pub struct TextOutput<'a> {
    report: &'a Report,
}

impl<'a> TextOutput<'a> {
    /// Create a text formatter for a report.
    #[must_use]
    pub fn new(report: &'a Report) -> Self {
        Self { report }
    }

    /// Write every pair line to `writer`.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        for (distance, path, other) in self.report.pairs() {
            writeln!(writer, "{} - {} - {}", distance, path.display(), other.display())?;
        }
        writer.flush()
    }
}
