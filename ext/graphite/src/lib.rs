//! segmatch-graphite: Graphite plaintext protocol parser
//!
//! Parses lines of the form
//!
//! ```text
//! <name>[;tag=value...] <value> [timestamp]
//! ```
//!
//! The name is decomposed by a [`segmatch::Engine`]; the value becomes a float
//! field named by the template's `field` role, or `value`.
//!
//! # Example
//!
//! ```
//! use segmatch_graphite::GraphiteParser;
//! use std::collections::BTreeMap;
//!
//! let parser = GraphiteParser::new(
//!     "_",
//!     ["servers.localhost .host.measurement.measurement*"],
//!     BTreeMap::new(),
//! )
//! .unwrap();
//!
//! let metric = parser
//!     .parse_line("servers.localhost.cpu.cpu_load.10 11 1435077219")
//!     .unwrap();
//! assert_eq!(metric.name, "cpu_cpu_load_10");
//! assert_eq!(metric.tag("host"), Some("localhost"));
//! ```

// ═══════════════════════════════════════════════════════════════════════════════
// Modules
// ═══════════════════════════════════════════════════════════════════════════════

mod line_tags;
mod parser;

#[cfg(feature = "serde")]
mod config;

// ═══════════════════════════════════════════════════════════════════════════════
// Public API
// ═══════════════════════════════════════════════════════════════════════════════

pub use line_tags::split_line_tags;
pub use parser::GraphiteParser;

#[cfg(feature = "serde")]
pub use config::GraphiteConfig;

/// Template applied when no configured filter matches.
pub const DEFAULT_TEMPLATE: &str = "measurement*";

/// Field name used when the template has no `field` role.
pub const DEFAULT_FIELD: &str = "value";

// ═══════════════════════════════════════════════════════════════════════════════
// Errors
// ═══════════════════════════════════════════════════════════════════════════════

/// Errors from building a parser or parsing a line.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GraphiteError {
    /// Template compilation or application failed.
    #[error(transparent)]
    Template(#[from] segmatch::TemplateError),

    /// The line does not split into two or three fields.
    #[error("received {line:?} which doesn't have required fields")]
    MissingFields {
        /// The offending line.
        line: String,
    },

    /// The value field is not a float.
    #[error("field {name:?} value: {source}")]
    InvalidValue {
        /// First field of the line as received.
        name: String,
        /// Underlying parse error.
        source: std::num::ParseFloatError,
    },

    /// The timestamp field is not a float.
    #[error("field {name:?} time: {source}")]
    InvalidTime {
        /// First field of the line as received.
        name: String,
        /// Underlying parse error.
        source: std::num::ParseFloatError,
    },

    /// The timestamp lies outside 1901-12-13 .. 2038-01-19 UTC.
    #[error("timestamp out of range")]
    TimestampOutOfRange,

    /// One or more lines of a buffer failed; messages are joined by newlines.
    #[error("{}", .0.iter().map(ToString::to_string).collect::<Vec<_>>().join("\n"))]
    Lines(Vec<GraphiteError>),
}
