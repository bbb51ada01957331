//! segmatch - hierarchical template matching for metric names
//!
//! Decodes dotted (or custom-separator) metric names such as
//! `servers.localhost.cpu.load` into a measurement, a tag set and an optional
//! field, driven by configuration lines in the Graphite template format:
//!
//! ```text
//! [separator] [filter] <template> [tag1=value1,tag2=value2,...]
//! ```
//!
//! # Architecture
//!
//! - [`TemplateSpec`]: one configuration line, parsed but not compiled
//! - [`Template`]: compiled pattern; applies itself to a name
//! - [`FilterTree`]: wildcard filter trie; finds the most specific template
//! - [`Matcher`]: filter tree plus a default template
//! - [`Engine`]: builds the matcher from lines and applies it
//!
//! # Key Invariants
//!
//! 1. **Exact before wildcard**: at every level of the filter tree a literal
//!    segment match is taken before the `*` sibling. The search never
//!    backtracks.
//!
//! 2. **Measurement required**: a template without a `measurement` or
//!    `measurement*` segment fails to compile.
//!
//! 3. **Immutable after construction**: [`Engine::apply`] takes `&self`;
//!    an engine can be shared across threads.
//!
//! # Example
//!
//! ```
//! use segmatch::prelude::*;
//!
//! let engine = Engine::new(
//!     "_",
//!     Template::with_pattern("measurement*").unwrap(),
//!     [
//!         "*.* .wrong.measurement*",
//!         "servers.* .host.measurement*",
//!         "servers.localhost .host.measurement*",
//!         "servers.localhost.cpu .host.resource.measurement*",
//!     ],
//! )
//! .unwrap();
//!
//! let out = engine.apply("servers.localhost.cpu.cpu_load").unwrap();
//! assert_eq!(out.measurement, "cpu_load");
//! assert_eq!(out.tags["host"], "localhost");
//! assert_eq!(out.tags["resource"], "cpu");
//! ```
//!
//! # Extensions
//!
//! Line parsers built on the engine live in separate crates:
//!
//! - `segmatch-graphite`: Graphite plaintext protocol
//! - `segmatch-statsd`: StatsD bucket names and lines
//! - `segmatch-dropwizard`: Dropwizard metric registry JSON

// ═══════════════════════════════════════════════════════════════════════════════
// Modules
// ═══════════════════════════════════════════════════════════════════════════════

mod engine;
mod filter_tree;
mod matcher;
mod metric;
mod template;
mod template_spec;
mod trace;

#[cfg(feature = "serde")]
mod config;

// ═══════════════════════════════════════════════════════════════════════════════
// Public API
// ═══════════════════════════════════════════════════════════════════════════════

// Core types
pub use engine::Engine;
pub use filter_tree::{compare_segments, FilterTree};
pub use matcher::Matcher;
pub use template::{Decomposed, Part, Template};
pub use template_spec::{parse_specs, TemplateSpec};

// Metric model
pub use metric::{FieldValue, Metric};

// Trace types
pub use trace::{MatchTrace, SearchStep, StepOutcome};

// Config (feature-gated)
#[cfg(feature = "serde")]
pub use config::EngineConfig;

// ═══════════════════════════════════════════════════════════════════════════════
// Prelude
// ═══════════════════════════════════════════════════════════════════════════════

/// Prelude module for convenient imports.
///
/// ```
/// use segmatch::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        // Core types
        Decomposed,
        Engine,
        // Metric model
        FieldValue,
        FilterTree,
        // Trace types
        MatchTrace,
        Matcher,
        Metric,
        Part,
        StepOutcome,
        Template,
        // Errors
        TemplateError,
        TemplateSpec,
    };
}

// ═══════════════════════════════════════════════════════════════════════════════
// Constants
// ═══════════════════════════════════════════════════════════════════════════════

/// Separator used when a configuration line does not name one.
pub const DEFAULT_SEPARATOR: &str = ".";

/// Filter segment matching any single name segment.
pub const WILDCARD: &str = "*";

// ═══════════════════════════════════════════════════════════════════════════════
// Errors
// ═══════════════════════════════════════════════════════════════════════════════

/// Errors from template compilation and application.
///
/// [`MissingMeasurement`](Self::MissingMeasurement) and
/// [`MixedSeparators`](Self::MixedSeparators) are raised while building an
/// [`Engine`]. [`ConflictingGreedy`](Self::ConflictingGreedy) is raised per
/// [`apply`](Engine::apply) call and leaves the engine usable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TemplateError {
    /// The template pattern has no `measurement` or `measurement*` segment.
    #[error("no measurement specified for template. {pattern:?}")]
    MissingMeasurement {
        /// The offending pattern.
        pattern: String,
    },

    /// The template holds both `measurement*` and `field*`.
    #[error(
        "either 'field*' or 'measurement*' can be used in each template \
         (but not both together): {template:?}"
    )]
    ConflictingGreedy {
        /// The template's parts joined with the engine joiner.
        template: String,
    },

    /// Configuration lines declare more than one separator.
    #[error("templates must share one separator: expected {expected:?}, found {found:?}")]
    MixedSeparators {
        /// Separator already in use.
        expected: String,
        /// Separator of the conflicting template.
        found: String,
    },
}
