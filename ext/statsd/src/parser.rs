//! Bucket-name and line parsing.

use crate::{
    MetricKind, Sample, SampleValue, StatsdError, DEFAULT_FIELD, DEFAULT_SEPARATOR,
    METRIC_TYPE_TAG,
};
use segmatch::{Engine, Template};
use std::collections::BTreeMap;

/// A bucket name decomposed into measurement, field and tags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BucketName {
    pub name: String,
    pub field: String,
    pub tags: BTreeMap<String, String>,
}

/// Parses StatsD lines into [`Sample`]s.
#[derive(Debug, Clone)]
pub struct StatsdParser {
    engine: Engine,
    convert_names: bool,
    datadog_tags: bool,
}

impl StatsdParser {
    /// Build a parser.
    ///
    /// `separator` joins multi-segment values (`_` when empty). With
    /// `convert_names`, `.` becomes `_` and `-` becomes `__` in names.
    ///
    /// # Errors
    ///
    /// Returns [`StatsdError::Template`] if a template line is invalid.
    pub fn new<I, S>(separator: &str, templates: I, convert_names: bool) -> Result<Self, StatsdError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let separator = if separator.is_empty() {
            DEFAULT_SEPARATOR
        } else {
            separator
        };
        let default_template = Template::with_pattern("measurement*")?;

        Ok(Self {
            engine: Engine::new(separator, default_template, templates)?,
            convert_names,
            datadog_tags: false,
        })
    }

    /// Build a parser from a [`StatsdConfig`](crate::StatsdConfig).
    ///
    /// # Errors
    ///
    /// Same as [`StatsdParser::new`].
    #[cfg(feature = "serde")]
    pub fn from_config(config: &crate::StatsdConfig) -> Result<Self, StatsdError> {
        Ok(
            Self::new(&config.separator, &config.templates, config.convert_names)?
                .with_datadog_tags(config.datadog_tags),
        )
    }

    /// Strip and parse DataDog `|#k:v,...` segments.
    #[must_use]
    pub fn with_datadog_tags(mut self, enabled: bool) -> Self {
        self.datadog_tags = enabled;
        self
    }

    /// The template engine.
    #[must_use]
    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Decompose a bucket name, `name[,k=v...]`.
    ///
    /// Inline tags are defaults: a tag set by the template wins. When the
    /// template cannot be applied the bare name is kept and the failure is
    /// logged.
    #[must_use]
    pub fn parse_name(&self, bucket: &str) -> BucketName {
        let (bare, inline) = match bucket.split_once(',') {
            Some((bare, rest)) => (bare, rest.split(',').filter_map(parse_key_value).collect()),
            None => (bucket, BTreeMap::new()),
        };

        let (name, field, mut tags) = match self.engine.apply(bare) {
            Ok(out) if !out.measurement.is_empty() => (out.measurement, out.field, out.tags),
            Ok(out) => (bare.to_owned(), out.field, out.tags),
            Err(error) => {
                tracing::warn!(bucket, %error, "template not applied to statsd bucket");
                (bare.to_owned(), String::new(), BTreeMap::new())
            }
        };
        for (key, value) in inline {
            tags.entry(key).or_insert(value);
        }

        let name = if self.convert_names {
            name.replace('.', "_").replace('-', "__")
        } else {
            name
        };
        let field = if field.is_empty() {
            DEFAULT_FIELD.to_owned()
        } else {
            field
        };

        BucketName { name, field, tags }
    }

    /// Parse one line: `bucket:value|type[|@rate][:value|type...]`.
    ///
    /// # Errors
    ///
    /// Fails on a missing `:` or `|`, an unknown type, a signed value on a
    /// type other than gauge or counter, or an unparsable number. An invalid
    /// sample rate is logged and ignored.
    pub fn parse_line(&self, line: &str) -> Result<Vec<Sample>, StatsdError> {
        let mut line_tags = BTreeMap::new();
        let stripped;
        let line = if self.datadog_tags {
            stripped = line
                .split('|')
                .filter(|segment| match segment.strip_prefix('#') {
                    Some(tags) => {
                        parse_datadog_tags(tags, &mut line_tags);
                        false
                    }
                    None => true,
                })
                .collect::<Vec<_>>()
                .join("|");
            stripped.as_str()
        } else {
            line
        };

        let (bucket, values) = line.split_once(':').ok_or_else(|| StatsdError::MissingColon {
            line: line.to_owned(),
        })?;
        let bucket = self.parse_name(bucket);

        values
            .split(':')
            .map(|value| {
                let mut sample = parse_value(value, line)?;
                sample.name.clone_from(&bucket.name);
                sample.field.clone_from(&bucket.field);
                sample.tags.clone_from(&bucket.tags);
                sample
                    .tags
                    .insert(METRIC_TYPE_TAG.to_owned(), sample.kind.tag_value().to_owned());
                sample.tags.extend(line_tags.clone());
                Ok(sample)
            })
            .collect()
    }

    /// Parse a newline-separated buffer, logging and skipping bad lines.
    #[must_use]
    pub fn parse(&self, buf: &str) -> (Vec<Sample>, Vec<StatsdError>) {
        let mut samples = Vec::new();
        let mut errors = Vec::new();

        for line in buf.lines().map(str::trim).filter(|l| !l.is_empty()) {
            match self.parse_line(line) {
                Ok(parsed) => samples.extend(parsed),
                Err(error) => {
                    tracing::warn!(line, %error, "dropping statsd line");
                    errors.push(error);
                }
            }
        }

        (samples, errors)
    }
}

/// Parse `value|type[|@rate]` into a sample without name or tags.
fn parse_value(bit: &str, line: &str) -> Result<Sample, StatsdError> {
    let mut pipes = bit.split('|');
    let raw = pipes.next().unwrap_or_default();
    let kind: MetricKind = pipes
        .next()
        .ok_or_else(|| StatsdError::MissingPipe {
            line: line.to_owned(),
        })?
        .parse()?;
    let sample_rate = pipes.next().and_then(|rate| parse_sample_rate(rate, line));

    let additive = raw.starts_with(['+', '-']);
    if additive && !kind.accepts_sign() {
        return Err(StatsdError::SignedValue {
            line: line.to_owned(),
        });
    }

    let invalid = || StatsdError::InvalidValue {
        value: raw.to_owned(),
        line: line.to_owned(),
    };
    let value = match kind {
        MetricKind::Gauge | MetricKind::Timing | MetricKind::Histogram => {
            SampleValue::Float(raw.parse().map_err(|_| invalid())?)
        }
        MetricKind::Counter => {
            let count = match raw.parse::<i64>() {
                Ok(count) => count,
                Err(_) => truncate(raw.parse::<f64>().map_err(|_| invalid())?),
            };
            match sample_rate.filter(|rate| *rate != 0.0) {
                #[allow(clippy::cast_precision_loss)]
                Some(rate) => SampleValue::Int(truncate(count as f64 / rate)),
                None => SampleValue::Int(count),
            }
        }
        MetricKind::Set => SampleValue::Set(raw.to_owned()),
    };

    Ok(Sample {
        name: String::new(),
        field: String::new(),
        tags: BTreeMap::new(),
        kind,
        value,
        sample_rate,
        additive,
    })
}

#[allow(clippy::cast_possible_truncation)]
fn truncate(value: f64) -> i64 {
    value as i64
}

fn parse_sample_rate(rate: &str, line: &str) -> Option<f64> {
    match rate.strip_prefix('@').filter(|r| !r.is_empty()) {
        Some(rate) => match rate.parse() {
            Ok(rate) => Some(rate),
            Err(error) => {
                tracing::warn!(line, %error, "ignoring invalid statsd sample rate");
                None
            }
        },
        None => {
            tracing::warn!(line, rate, "ignoring sample rate not in @0.1 format");
            None
        }
    }
}

/// `key=value` with exactly one `=` and a non-empty key.
fn parse_key_value(entry: &str) -> Option<(String, String)> {
    let mut parts = entry.split('=');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(key), Some(value), None) if !key.is_empty() => Some((key.to_owned(), value.to_owned())),
        _ => {
            tracing::debug!(entry, "dropping statsd bucket tag");
            None
        }
    }
}

/// DataDog tags: `k:v` or bare `k` (empty value), comma separated.
fn parse_datadog_tags(tags: &str, into: &mut BTreeMap<String, String>) {
    for tag in tags.split(',') {
        let (key, value) = tag.split_once(':').unwrap_or((tag, ""));
        if !key.is_empty() {
            into.insert(key.to_owned(), value.to_owned());
        }
    }
}
