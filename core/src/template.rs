//! `Template`: compiled decomposition of a metric name.
//!
//! A template pattern such as `env.zone.host.measurement*` is split by its
//! separator into [`Part`]s. Applying the template to a name walks those
//! parts index-aligned with the name's segments and sorts every segment into
//! the measurement, the field, or a named tag.
//!
//! # Roles
//!
//! | Segment | Part | Effect |
//! |---------|------|--------|
//! | `measurement` | [`Part::Measurement`] | segment joins the measurement |
//! | `measurement*` | [`Part::GreedyMeasurement`] | segment and the rest join the measurement |
//! | `field` | [`Part::Field`] | segment joins the field |
//! | `field*` | [`Part::GreedyField`] | segment and the rest join the field |
//! | *(empty)* | [`Part::Ignore`] | segment is dropped |
//! | anything else | [`Part::Tag`] | segment joins the tag of that name |

use crate::{TemplateError, DEFAULT_SEPARATOR};
use std::collections::BTreeMap;
use std::fmt;

/// The role one template segment plays during [`Template::apply`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Part {
    /// Empty segment; the matching name segment is skipped.
    Ignore,
    /// Named tag; the matching name segment is appended to this tag's value.
    Tag(String),
    /// The matching name segment is appended to the measurement.
    Measurement,
    /// This and every remaining name segment are appended to the measurement.
    GreedyMeasurement,
    /// The matching name segment is appended to the field.
    Field,
    /// This and every remaining name segment are appended to the field.
    GreedyField,
}

impl Part {
    /// Classify one segment of a template pattern.
    #[must_use]
    pub fn parse(segment: &str) -> Self {
        match segment {
            "" => Self::Ignore,
            "measurement" => Self::Measurement,
            "measurement*" => Self::GreedyMeasurement,
            "field" => Self::Field,
            "field*" => Self::GreedyField,
            tag => Self::Tag(tag.to_owned()),
        }
    }

    /// Whether this part contributes to the measurement.
    #[must_use]
    pub fn is_measurement(&self) -> bool {
        matches!(self, Self::Measurement | Self::GreedyMeasurement)
    }
}

impl fmt::Display for Part {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ignore => Ok(()),
            Self::Tag(name) => f.write_str(name),
            Self::Measurement => f.write_str("measurement"),
            Self::GreedyMeasurement => f.write_str("measurement*"),
            Self::Field => f.write_str("field"),
            Self::GreedyField => f.write_str("field*"),
        }
    }
}

/// The outcome of applying a template to a name.
///
/// An empty `measurement` means the template did not produce one; callers
/// usually fall back to the raw name in that case.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Decomposed {
    /// Joined measurement segments.
    pub measurement: String,
    /// Tags, including the template's default tags.
    pub tags: BTreeMap<String, String>,
    /// Joined field segments (empty when the template has no field role).
    pub field: String,
}

/// A compiled template pattern.
///
/// Immutable once built; apply it to as many names as needed.
///
/// # Example
///
/// ```
/// use segmatch::Template;
///
/// let template = Template::with_pattern("env.zone.host.measurement*").unwrap();
/// let out = template.apply("prod.us-west.server01.cpu.load", ".").unwrap();
///
/// assert_eq!(out.measurement, "cpu.load");
/// assert_eq!(out.tags["zone"], "us-west");
/// assert_eq!(out.field, "");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    separator: String,
    pattern: String,
    parts: Vec<Part>,
    default_tags: BTreeMap<String, String>,
    greedy_measurement: bool,
    greedy_field: bool,
}

impl Template {
    /// Compile `pattern`, splitting it on `separator`.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::MissingMeasurement`] if no segment is
    /// `measurement` or `measurement*`.
    pub fn new(
        separator: impl Into<String>,
        pattern: impl Into<String>,
        default_tags: BTreeMap<String, String>,
    ) -> Result<Self, TemplateError> {
        let separator = separator.into();
        let pattern = pattern.into();
        let parts: Vec<Part> = pattern.split(separator.as_str()).map(Part::parse).collect();

        if !parts.iter().any(Part::is_measurement) {
            return Err(TemplateError::MissingMeasurement { pattern });
        }

        let greedy_measurement = parts.contains(&Part::GreedyMeasurement);
        let greedy_field = parts.contains(&Part::GreedyField);

        Ok(Self {
            separator,
            pattern,
            parts,
            default_tags,
            greedy_measurement,
            greedy_field,
        })
    }

    /// Compile `pattern` with the default `.` separator and no default tags.
    ///
    /// # Errors
    ///
    /// Same as [`Template::new`].
    pub fn with_pattern(pattern: impl Into<String>) -> Result<Self, TemplateError> {
        Self::new(DEFAULT_SEPARATOR, pattern, BTreeMap::new())
    }

    /// Separator used to split both the pattern and the names it applies to.
    #[must_use]
    pub fn separator(&self) -> &str {
        &self.separator
    }

    /// The pattern this template was compiled from.
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Compiled segment roles, in pattern order.
    #[must_use]
    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    /// Tags seeded into every result before segments are applied.
    #[must_use]
    pub fn default_tags(&self) -> &BTreeMap<String, String> {
        &self.default_tags
    }

    /// Decompose `name` into measurement, tags and field.
    ///
    /// Multi-segment values are joined with `joiner`. Name segments beyond
    /// the end of the pattern are dropped; pattern parts beyond the end of
    /// the name are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::ConflictingGreedy`] if the template holds
    /// both `measurement*` and `field*`.
    pub fn apply(&self, name: &str, joiner: &str) -> Result<Decomposed, TemplateError> {
        if self.greedy_measurement && self.greedy_field {
            return Err(TemplateError::ConflictingGreedy {
                template: self.joined_parts(joiner),
            });
        }

        let values: Vec<&str> = name.split(self.separator.as_str()).collect();

        let mut measurement: Vec<&str> = Vec::new();
        let mut field: Vec<&str> = Vec::new();
        let mut tags: BTreeMap<&str, Vec<&str>> = self
            .default_tags
            .iter()
            .map(|(k, v)| (k.as_str(), vec![v.as_str()]))
            .collect();

        for (i, part) in self.parts.iter().enumerate() {
            let Some(&value) = values.get(i) else {
                break;
            };

            match part {
                Part::Ignore => {}
                Part::Measurement => measurement.push(value),
                Part::Field => field.push(value),
                Part::GreedyMeasurement => {
                    measurement.extend_from_slice(&values[i..]);
                    break;
                }
                Part::GreedyField => {
                    field.extend_from_slice(&values[i..]);
                    break;
                }
                Part::Tag(tag) => tags.entry(tag.as_str()).or_default().push(value),
            }
        }

        Ok(Decomposed {
            measurement: measurement.join(joiner),
            tags: tags
                .into_iter()
                .map(|(k, v)| (k.to_owned(), v.join(joiner)))
                .collect(),
            field: field.join(joiner),
        })
    }

    fn joined_parts(&self, joiner: &str) -> String {
        self.parts
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(joiner)
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.pattern)
    }
}
