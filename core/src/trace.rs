//! Evaluation trace types for debugging template selection.
//!
//! [`Engine::apply_with_trace`](crate::Engine::apply_with_trace) returns a
//! [`MatchTrace`] that records how the filter tree was walked, which template
//! was chosen and what it produced.
//!
//! # Example
//!
//! ```
//! use segmatch::{Engine, StepOutcome, Template};
//!
//! let engine = Engine::new(
//!     ".",
//!     Template::with_pattern("measurement*").unwrap(),
//!     ["servers.* .host.measurement*"],
//! )
//! .unwrap();
//!
//! let trace = engine.apply_with_trace("servers.web01.cpu");
//! assert_eq!(trace.filter, "servers.*");
//! assert!(!trace.used_default);
//! assert_eq!(trace.steps[1].outcome, StepOutcome::Wildcard);
//! ```

use crate::{Decomposed, TemplateError, WILDCARD};
use std::fmt;

/// How one name segment moved the search through the filter tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// A child with exactly this segment was taken.
    Exact,
    /// No literal child matched; the wildcard child was taken.
    Wildcard,
    /// Nothing matched; the search ended at the current node.
    Stopped,
}

/// A single step of a filter tree search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchStep {
    /// The name segment being looked up.
    pub segment: String,
    /// What the lookup did with it.
    pub outcome: StepOutcome,
}

impl SearchStep {
    pub(crate) fn new(segment: &str, outcome: StepOutcome) -> Self {
        Self {
            segment: segment.to_owned(),
            outcome,
        }
    }
}

/// Trace of a full [`Engine`](crate::Engine) application.
///
/// # INV: `result` == `apply()` result
///
/// The `result` field always equals what
/// [`Engine::apply`](crate::Engine::apply) returns for the same name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchTrace {
    /// The name that was applied.
    pub name: String,
    /// Steps taken through the filter tree, in order.
    pub steps: Vec<SearchStep>,
    /// Filter path of the node where the search ended (empty at the root).
    pub filter: String,
    /// Whether the search ended without a bound template.
    pub used_default: bool,
    /// Pattern of the template that was applied.
    pub template: String,
    /// What the template produced.
    pub result: Result<Decomposed, TemplateError>,
}

impl MatchTrace {
    pub(crate) fn filter_path(steps: &[SearchStep], separator: &str) -> String {
        steps
            .iter()
            .filter_map(|step| match step.outcome {
                StepOutcome::Exact => Some(step.segment.as_str()),
                StepOutcome::Wildcard => Some(WILDCARD),
                StepOutcome::Stopped => None,
            })
            .collect::<Vec<_>>()
            .join(separator)
    }
}

impl fmt::Display for MatchTrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "name: {}", self.name)?;
        for step in &self.steps {
            let outcome = match step.outcome {
                StepOutcome::Exact => "exact",
                StepOutcome::Wildcard => "wildcard",
                StepOutcome::Stopped => "stopped",
            };
            writeln!(f, "  {:<8} {}", outcome, step.segment)?;
        }
        if self.used_default {
            writeln!(f, "template: {} (default)", self.template)?;
        } else {
            writeln!(f, "filter: {}", self.filter)?;
            writeln!(f, "template: {}", self.template)?;
        }
        match &self.result {
            Ok(out) => {
                writeln!(f, "measurement: {}", out.measurement)?;
                for (key, value) in &out.tags {
                    writeln!(f, "tag: {key}={value}")?;
                }
                if !out.field.is_empty() {
                    writeln!(f, "field: {}", out.field)?;
                }
                Ok(())
            }
            Err(e) => writeln!(f, "error: {e}"),
        }
    }
}
