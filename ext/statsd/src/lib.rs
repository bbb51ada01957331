//! segmatch-statsd: StatsD line and bucket-name parser
//!
//! Parses StatsD lines such as
//!
//! ```text
//! cpu.idle,host=web01:1|c|@0.5
//! ```
//!
//! into [`Sample`]s. Bucket names are decomposed by a [`segmatch::Engine`];
//! inline `name,k=v` tags act as defaults for that one name. Aggregation of
//! samples is left to the caller.
//!
//! # Example
//!
//! ```
//! use segmatch_statsd::{MetricKind, SampleValue, StatsdParser};
//!
//! let parser = StatsdParser::new("_", ["cpu.* measurement.measurement.host"], false).unwrap();
//!
//! let samples = parser.parse_line("cpu.idle.web01:10|c|@0.5").unwrap();
//! assert_eq!(samples[0].name, "cpu_idle");
//! assert_eq!(samples[0].tags["host"], "web01");
//! assert_eq!(samples[0].kind, MetricKind::Counter);
//! assert_eq!(samples[0].value, SampleValue::Int(20));
//! ```

// ═══════════════════════════════════════════════════════════════════════════════
// Modules
// ═══════════════════════════════════════════════════════════════════════════════

mod kind;
mod parser;
mod sample;

#[cfg(feature = "serde")]
mod config;

// ═══════════════════════════════════════════════════════════════════════════════
// Public API
// ═══════════════════════════════════════════════════════════════════════════════

pub use kind::MetricKind;
pub use parser::{BucketName, StatsdParser};
pub use sample::{Sample, SampleValue};

#[cfg(feature = "serde")]
pub use config::StatsdConfig;

/// Separator joining multi-segment values unless configured otherwise.
pub const DEFAULT_SEPARATOR: &str = "_";

/// Field name used when the template has no `field` role.
pub const DEFAULT_FIELD: &str = "value";

/// Tag carrying the StatsD metric type of every sample.
pub const METRIC_TYPE_TAG: &str = "metric_type";

// ═══════════════════════════════════════════════════════════════════════════════
// Errors
// ═══════════════════════════════════════════════════════════════════════════════

/// Errors from building a parser or parsing a line.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StatsdError {
    /// Template compilation failed.
    #[error(transparent)]
    Template(#[from] segmatch::TemplateError),

    /// The line has no `:` between bucket and value.
    #[error("splitting ':', unable to parse metric: {line}")]
    MissingColon {
        /// The offending line.
        line: String,
    },

    /// A value has no `|type` suffix.
    #[error("splitting '|', unable to parse metric: {line}")]
    MissingPipe {
        /// The offending line.
        line: String,
    },

    /// The metric type is not one of `c g s ms h`.
    #[error("statsd metric type {kind:?} unsupported")]
    UnsupportedType {
        /// The type as written.
        kind: String,
    },

    /// A `+`/`-` prefix on a type other than gauge or counter.
    #[error("+- values are only supported for gauges & counters: {line}")]
    SignedValue {
        /// The offending line.
        line: String,
    },

    /// The value does not parse as a number.
    #[error("parsing value {value:?}: {line}")]
    InvalidValue {
        /// The value as written.
        value: String,
        /// The offending line.
        line: String,
    },
}
