//! segmatch-dropwizard: Dropwizard metric registry parser
//!
//! Reads the JSON produced by a Dropwizard `MetricRegistry` servlet:
//!
//! ```text
//! { "counters": { "<key>": { "count": 1 } }, "gauges": { ... }, ... }
//! ```
//!
//! Every entry of `counters`, `meters`, `gauges`, `histograms` and `timers`
//! becomes one [`segmatch::Metric`]. Keys are optionally decomposed by a
//! [`segmatch::Engine`] and may carry inline tags as `name,k=v`.
//!
//! # Example
//!
//! ```
//! use segmatch_dropwizard::DropwizardParser;
//!
//! let parser = DropwizardParser::new("_", ["vm.* measurement.measurement.pool.field"]).unwrap();
//! let metrics = parser
//!     .parse(br#"{"gauges": {"vm.memory.heap.used": {"value": 5}}}"#)
//!     .unwrap();
//!
//! assert_eq!(metrics[0].name, "vm_memory");
//! assert_eq!(metrics[0].tag("pool"), Some("heap"));
//! assert_eq!(metrics[0].tag("metric_type"), Some("gauge"));
//! assert!(metrics[0].field("used_value").is_some());
//! ```

// ═══════════════════════════════════════════════════════════════════════════════
// Modules
// ═══════════════════════════════════════════════════════════════════════════════

mod parser;
mod series;

#[cfg(feature = "serde")]
mod config;

// ═══════════════════════════════════════════════════════════════════════════════
// Public API
// ═══════════════════════════════════════════════════════════════════════════════

pub use parser::DropwizardParser;
pub use series::parse_series;

#[cfg(feature = "serde")]
pub use config::DropwizardConfig;

/// Template applied when no configured filter matches.
pub const DEFAULT_TEMPLATE: &str = "measurement*";

/// `time_format` value selecting RFC 3339 timestamps.
pub const RFC3339: &str = "rfc3339";

/// Tag carrying the registry section of every metric.
pub const METRIC_TYPE_TAG: &str = "metric_type";

/// Registry sections and the `metric_type` tag they produce.
pub const SECTIONS: [(&str, &str); 5] = [
    ("counters", "counter"),
    ("meters", "meter"),
    ("gauges", "gauge"),
    ("histograms", "histogram"),
    ("timers", "timer"),
];

// ═══════════════════════════════════════════════════════════════════════════════
// Errors
// ═══════════════════════════════════════════════════════════════════════════════

/// Errors from building a parser or reading a document.
#[derive(Debug, thiserror::Error)]
pub enum DropwizardError {
    /// Template compilation failed.
    #[error(transparent)]
    Template(#[from] segmatch::TemplateError),

    /// The document is not valid JSON.
    #[error("unable to parse dropwizard json: {0}")]
    Json(#[from] serde_json::Error),

    /// Nothing usable as a registry at the configured path.
    #[error("no metric registry object at path {path:?}")]
    InvalidRegistry {
        /// Dot path to the registry, empty for the document root.
        path: String,
    },

    /// The value at `time_path` does not match `time_format`.
    #[error("time {value:?} cannot be parsed with format {format:?}: {source}")]
    InvalidTime {
        /// The time as found in the document.
        value: String,
        /// The configured format.
        format: String,
        /// Underlying parse error.
        source: chrono::ParseError,
    },
}
