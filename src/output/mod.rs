//! Report formatters.
//!
//! - Text: one `<distance> - <path> - <other>` line per retained pair
//! - JSON: the grouped report as an array, for scripting
//!
//! # Example
//!
//! ```
//! use phashdupe::duplicates::Report;
//! use phashdupe::output::TextOutput;
//!
//! let report = Report::default();
//! let mut out = Vec::new();
//! TextOutput::new(&report).write_to(&mut out).unwrap();
//! assert!(out.is_empty());
//! ```

pub mod json;
pub mod text;

pub use json::{JsonOutput, JsonOutputError};
pub use text::TextOutput;
