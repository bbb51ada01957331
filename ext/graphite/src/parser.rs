//! Line and buffer parsing.

use crate::{split_line_tags, GraphiteError, DEFAULT_FIELD, DEFAULT_TEMPLATE};
use chrono::{DateTime, Utc};
use segmatch::{Decomposed, Engine, Metric, Template, DEFAULT_SEPARATOR};
use std::collections::BTreeMap;

/// 1901-12-13T00:00:00Z
const MIN_UNIX_SECONDS: i64 = -2_147_558_400;
/// 2038-01-19T00:00:00Z
const MAX_UNIX_SECONDS: i64 = 2_147_472_000;

/// Parses Graphite plaintext lines into [`Metric`]s.
#[derive(Debug, Clone)]
pub struct GraphiteParser {
    engine: Engine,
    default_tags: BTreeMap<String, String>,
}

impl GraphiteParser {
    /// Build a parser.
    ///
    /// `separator` joins multi-segment values (`.` when empty). Names that
    /// match no template keep every segment in the measurement.
    /// `default_tags` fill in tags the template did not set.
    ///
    /// # Errors
    ///
    /// Returns [`GraphiteError::Template`] if a template line is invalid.
    pub fn new<I, S>(
        separator: &str,
        templates: I,
        default_tags: BTreeMap<String, String>,
    ) -> Result<Self, GraphiteError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let separator = if separator.is_empty() {
            DEFAULT_SEPARATOR
        } else {
            separator
        };
        let default_template = Template::with_pattern(DEFAULT_TEMPLATE)?;
        let engine = Engine::new(separator, default_template, templates)?;

        Ok(Self {
            engine,
            default_tags,
        })
    }

    /// Build a parser from a [`GraphiteConfig`](crate::GraphiteConfig).
    ///
    /// # Errors
    ///
    /// Same as [`GraphiteParser::new`].
    #[cfg(feature = "serde")]
    pub fn from_config(config: &crate::GraphiteConfig) -> Result<Self, GraphiteError> {
        Self::new(
            &config.separator,
            &config.templates,
            config.default_tags.clone(),
        )
    }

    /// The template engine.
    #[must_use]
    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Apply the templates to the first whitespace-separated token of `line`.
    ///
    /// Parser default tags fill in tags the template did not set. An empty
    /// line yields an empty result.
    ///
    /// # Errors
    ///
    /// Returns [`GraphiteError::Template`] if the selected template cannot
    /// be applied.
    pub fn apply_template(&self, line: &str) -> Result<Decomposed, GraphiteError> {
        let Some(name) = line.split_whitespace().next() else {
            return Ok(Decomposed::default());
        };

        let mut out = self.engine.apply(name)?;
        self.fill_default_tags(&mut out.tags);
        Ok(out)
    }

    /// Parse one line.
    ///
    /// # Errors
    ///
    /// - [`GraphiteError::MissingFields`] unless the line has two or three fields
    /// - [`GraphiteError::Template`] if the template cannot be applied
    /// - [`GraphiteError::InvalidValue`] / [`GraphiteError::InvalidTime`] on
    ///   unparsable numbers
    /// - [`GraphiteError::TimestampOutOfRange`]
    pub fn parse_line(&self, line: &str) -> Result<Metric, GraphiteError> {
        let fields: Vec<&str> = line.split_whitespace().collect();
        let (series, value, time) = match fields.as_slice() {
            [series, value] => (*series, *value, None),
            [series, value, time] => (*series, *value, Some(*time)),
            _ => {
                return Err(GraphiteError::MissingFields {
                    line: line.to_owned(),
                })
            }
        };

        let (name, line_tags) = split_line_tags(series);
        let Decomposed {
            measurement,
            mut tags,
            field,
        } = self.engine.apply(name)?;

        let measurement = if measurement.is_empty() {
            name.to_owned()
        } else {
            measurement
        };

        let value: f64 = value
            .parse()
            .map_err(|source| GraphiteError::InvalidValue {
                name: series.to_owned(),
                source,
            })?;

        let timestamp = match time {
            Some(time) => parse_timestamp(series, time)?,
            None => Utc::now(),
        };

        self.fill_default_tags(&mut tags);
        tags.extend(line_tags);

        let field = if field.is_empty() {
            DEFAULT_FIELD.to_owned()
        } else {
            field
        };

        let mut metric = Metric::with_timestamp(measurement, timestamp);
        metric.tags = tags;
        metric.add_field(field, value);
        Ok(metric)
    }

    /// Parse a newline-separated buffer.
    ///
    /// Blank lines are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`GraphiteError::Lines`] holding every line error if any
    /// line failed. Use [`parse_lossy`](Self::parse_lossy) to keep the
    /// metrics that did parse.
    pub fn parse(&self, buf: &str) -> Result<Vec<Metric>, GraphiteError> {
        let (metrics, errors) = self.parse_lossy(buf);
        if errors.is_empty() {
            Ok(metrics)
        } else {
            Err(GraphiteError::Lines(errors))
        }
    }

    /// Parse a buffer, returning the metrics that parsed and the errors of
    /// the lines that did not.
    #[must_use]
    pub fn parse_lossy(&self, buf: &str) -> (Vec<Metric>, Vec<GraphiteError>) {
        let mut metrics = Vec::new();
        let mut errors = Vec::new();

        for line in buf.split('\n').map(str::trim).filter(|l| !l.is_empty()) {
            match self.parse_line(line) {
                Ok(metric) => metrics.push(metric),
                Err(error) => {
                    tracing::debug!(line, %error, "dropping graphite line");
                    errors.push(error);
                }
            }
        }

        (metrics, errors)
    }

    fn fill_default_tags(&self, tags: &mut BTreeMap<String, String>) {
        for (key, value) in &self.default_tags {
            tags.entry(key.clone()).or_insert_with(|| value.clone());
        }
    }
}

/// Parse float seconds; `-1` means now.
fn parse_timestamp(name: &str, time: &str) -> Result<DateTime<Utc>, GraphiteError> {
    let unix: f64 = time.parse().map_err(|source| GraphiteError::InvalidTime {
        name: name.to_owned(),
        source,
    })?;

    if unix == -1.0 {
        return Ok(Utc::now());
    }
    if !unix.is_finite() {
        return Err(GraphiteError::TimestampOutOfRange);
    }

    let seconds = unix.floor();
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let (seconds, nanos) = (seconds as i64, ((unix - seconds) * 1e9) as u32);

    if (seconds, nanos) < (MIN_UNIX_SECONDS, 0) || (seconds, nanos) > (MAX_UNIX_SECONDS, 0) {
        return Err(GraphiteError::TimestampOutOfRange);
    }
    DateTime::<Utc>::from_timestamp(seconds, nanos).ok_or(GraphiteError::TimestampOutOfRange)
}
