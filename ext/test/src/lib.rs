//! segmatch-test: conformance testing for segmatch engines
//!
//! Reduces an [`Engine`] result to a comparable [`Outcome`], so fixtures and
//! tests can state expectations without caring about error payloads.
//!
//! # Example
//!
//! ```
//! use segmatch::{Engine, Template};
//! use segmatch_test::{outcome, Expected, Outcome};
//!
//! let engine = Engine::new(
//!     ".",
//!     Template::with_pattern("measurement*").unwrap(),
//!     ["servers.* .host.measurement"],
//! )
//! .unwrap();
//!
//! assert_eq!(
//!     outcome(&engine, "servers.web01.cpu"),
//!     Outcome::Decomposed(Expected::new("cpu").with_tag("host", "web01")),
//! );
//! ```

use segmatch::{Decomposed, Engine, TemplateError};
use std::collections::BTreeMap;

#[cfg(feature = "fixtures")]
pub mod fixture;

/// Error variants without their payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "fixtures", derive(serde::Deserialize))]
#[cfg_attr(feature = "fixtures", serde(rename_all = "snake_case"))]
pub enum ErrorKind {
    MissingMeasurement,
    ConflictingGreedy,
    MixedSeparators,
}

impl ErrorKind {
    /// The kind of `error`.
    #[must_use]
    pub fn of(error: &TemplateError) -> Self {
        match error {
            TemplateError::MissingMeasurement { .. } => Self::MissingMeasurement,
            TemplateError::ConflictingGreedy { .. } => Self::ConflictingGreedy,
            TemplateError::MixedSeparators { .. } => Self::MixedSeparators,
        }
    }
}

/// An expected decomposition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "fixtures", derive(serde::Deserialize))]
#[cfg_attr(feature = "fixtures", serde(default, deny_unknown_fields))]
pub struct Expected {
    pub measurement: String,
    pub tags: BTreeMap<String, String>,
    pub field: String,
}

impl Expected {
    #[must_use]
    pub fn new(measurement: impl Into<String>) -> Self {
        Self {
            measurement: measurement.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = field.into();
        self
    }
}

impl From<Decomposed> for Expected {
    fn from(out: Decomposed) -> Self {
        Self {
            measurement: out.measurement,
            tags: out.tags,
            field: out.field,
        }
    }
}

/// What applying an engine to one name produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Decomposed(Expected),
    Error(ErrorKind),
}

impl From<Result<Decomposed, TemplateError>> for Outcome {
    fn from(result: Result<Decomposed, TemplateError>) -> Self {
        match result {
            Ok(out) => Self::Decomposed(out.into()),
            Err(error) => Self::Error(ErrorKind::of(&error)),
        }
    }
}

/// Apply `engine` to `name`.
#[must_use]
pub fn outcome(engine: &Engine, name: &str) -> Outcome {
    engine.apply(name).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use segmatch::Template;

    fn engine(lines: &[&str]) -> Engine {
        Engine::new("_", Template::with_pattern("measurement*").unwrap(), lines).unwrap()
    }

    #[test]
    fn decomposed_outcome() {
        let e = engine(&["* measurement.measurement.field"]);
        assert_eq!(
            outcome(&e, "my.counter.f1"),
            Outcome::Decomposed(Expected::new("my_counter").with_field("f1"))
        );
    }

    #[test]
    fn error_outcome() {
        let e = engine(&["bad.* measurement*.field*"]);
        assert_eq!(
            outcome(&e, "bad.x"),
            Outcome::Error(ErrorKind::ConflictingGreedy)
        );
    }

    #[test]
    fn error_kinds() {
        let err = TemplateError::MixedSeparators {
            expected: ".".into(),
            found: "_".into(),
        };
        assert_eq!(ErrorKind::of(&err), ErrorKind::MixedSeparators);
    }
}
