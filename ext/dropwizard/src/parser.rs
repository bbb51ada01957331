//! Document parsing.

use crate::{
    parse_series, DropwizardError, DEFAULT_TEMPLATE, METRIC_TYPE_TAG, RFC3339, SECTIONS,
};
use chrono::{DateTime, NaiveDateTime, Utc};
use segmatch::{Decomposed, Engine, FieldValue, Metric, Template, DEFAULT_SEPARATOR};
use serde_json::Value;
use std::collections::BTreeMap;

/// Parses Dropwizard registry documents into [`Metric`]s.
///
/// Tags are layered in this order, later layers overriding earlier ones:
/// inline key tags, `metric_type`, template tags, document tags. Parser
/// default tags only fill in what is still missing.
#[derive(Debug, Clone)]
pub struct DropwizardParser {
    separator: String,
    engine: Option<Engine>,
    registry_path: Option<String>,
    tags_path: Option<String>,
    tag_paths: BTreeMap<String, String>,
    time_path: Option<String>,
    time_format: String,
    default_tags: BTreeMap<String, String>,
}

impl DropwizardParser {
    /// Build a parser.
    ///
    /// `separator` joins multi-segment values and follows a template field
    /// in field names (`.` when empty). Without templates, keys are used
    /// as-is.
    ///
    /// # Errors
    ///
    /// Returns [`DropwizardError::Template`] if a template line is invalid.
    pub fn new<I, S>(separator: &str, templates: I) -> Result<Self, DropwizardError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let separator = if separator.is_empty() {
            DEFAULT_SEPARATOR
        } else {
            separator
        };

        let mut templates = templates.into_iter().peekable();
        let engine = if templates.peek().is_some() {
            let default_template = Template::with_pattern(DEFAULT_TEMPLATE)?;
            Some(Engine::new(separator, default_template, templates)?)
        } else {
            None
        };

        Ok(Self {
            separator: separator.to_owned(),
            engine,
            registry_path: None,
            tags_path: None,
            tag_paths: BTreeMap::new(),
            time_path: None,
            time_format: RFC3339.to_owned(),
            default_tags: BTreeMap::new(),
        })
    }

    /// Build a parser from a [`DropwizardConfig`](crate::DropwizardConfig).
    ///
    /// # Errors
    ///
    /// Same as [`DropwizardParser::new`].
    #[cfg(feature = "serde")]
    pub fn from_config(config: &crate::DropwizardConfig) -> Result<Self, DropwizardError> {
        let mut parser = Self::new(&config.separator, &config.templates)?
            .with_tag_paths(config.tag_paths.clone())
            .with_default_tags(config.default_tags.clone());
        parser.registry_path.clone_from(&config.metric_registry_path);
        parser.tags_path.clone_from(&config.tags_path);
        if let Some(path) = &config.time_path {
            parser = parser.with_time_path(path, &config.time_format);
        }
        Ok(parser)
    }

    /// Read the registry from a dot path instead of the document root.
    #[must_use]
    pub fn with_registry_path(mut self, path: impl Into<String>) -> Self {
        self.registry_path = Some(path.into());
        self
    }

    /// Read document tags from an object of strings at a dot path.
    #[must_use]
    pub fn with_tags_path(mut self, path: impl Into<String>) -> Self {
        self.tags_path = Some(path.into());
        self
    }

    /// Read document tags one by one, tag name to dot path.
    ///
    /// Used when no tags path is set or nothing usable is found there.
    #[must_use]
    pub fn with_tag_paths(mut self, paths: BTreeMap<String, String>) -> Self {
        self.tag_paths = paths;
        self
    }

    /// Stamp metrics with the time at a dot path.
    ///
    /// `format` is [`RFC3339`] or a `chrono` strftime pattern.
    #[must_use]
    pub fn with_time_path(mut self, path: impl Into<String>, format: impl Into<String>) -> Self {
        self.time_path = Some(path.into());
        self.time_format = format.into();
        self
    }

    /// Tags added to every metric that does not already carry them.
    #[must_use]
    pub fn with_default_tags(mut self, tags: BTreeMap<String, String>) -> Self {
        self.default_tags = tags;
        self
    }

    /// The template engine, if templates were configured.
    #[must_use]
    pub fn engine(&self) -> Option<&Engine> {
        self.engine.as_ref()
    }

    /// Parse one registry document.
    ///
    /// # Errors
    ///
    /// - [`DropwizardError::Json`] if `buf` is not valid JSON
    /// - [`DropwizardError::InvalidRegistry`] if the registry is missing or
    ///   not an object
    /// - [`DropwizardError::InvalidTime`] if the time cannot be parsed
    pub fn parse(&self, buf: &[u8]) -> Result<Vec<Metric>, DropwizardError> {
        let document: Value = serde_json::from_slice(buf)?;
        let timestamp = self.parse_time(&document)?;

        let path = self.registry_path.as_deref().unwrap_or_default();
        let registry = lookup(&document, path)
            .and_then(Value::as_object)
            .ok_or_else(|| DropwizardError::InvalidRegistry {
                path: path.to_owned(),
            })?;

        let document_tags = self.parse_tags(&document);
        let mut metrics = Vec::new();

        for (section, metric_type) in SECTIONS {
            let Some(entries) = registry.get(section).and_then(Value::as_object) else {
                continue;
            };
            for (key, fields) in entries {
                let mut metric = self.read_metric(key, fields, metric_type, timestamp);
                metric.tags.extend(document_tags.clone());
                for (tag, value) in &self.default_tags {
                    metric.tags.entry(tag.clone()).or_insert_with(|| value.clone());
                }
                metrics.push(metric);
            }
        }

        Ok(metrics)
    }

    fn read_metric(
        &self,
        key: &str,
        fields: &Value,
        metric_type: &str,
        timestamp: DateTime<Utc>,
    ) -> Metric {
        let Decomposed {
            measurement,
            tags: template_tags,
            field,
        } = self.apply_template(key);

        let series = if measurement.is_empty() {
            key
        } else {
            measurement.as_str()
        };
        let mut metric = match parse_series(series) {
            Some((name, tags)) => {
                let mut metric = Metric::with_timestamp(name, timestamp);
                metric.tags = tags;
                metric
            }
            None => {
                tracing::debug!(key, "registry key has malformed tags, keeping it as the name");
                Metric::with_timestamp(series, timestamp)
            }
        };
        metric.add_tag(METRIC_TYPE_TAG, metric_type);
        metric.tags.extend(template_tags);

        let prefix = if field.is_empty() {
            String::new()
        } else {
            format!("{field}{}", self.separator)
        };
        for (name, value) in fields.as_object().into_iter().flatten() {
            let value = match value {
                Value::Number(n) => n.as_f64().map(FieldValue::Float),
                Value::String(s) => Some(FieldValue::String(s.clone())),
                Value::Bool(b) => Some(FieldValue::Bool(*b)),
                Value::Null | Value::Array(_) | Value::Object(_) => None,
            };
            match value {
                Some(value) => metric.add_field(format!("{prefix}{name}"), value),
                None => tracing::trace!(key, field = %name, "ignoring non-scalar field"),
            }
        }

        metric
    }

    fn apply_template(&self, key: &str) -> Decomposed {
        let Some(engine) = &self.engine else {
            return Decomposed::default();
        };
        engine.apply(key).unwrap_or_else(|error| {
            tracing::warn!(key, %error, "template not applied to registry key");
            Decomposed::default()
        })
    }

    fn parse_time(&self, document: &Value) -> Result<DateTime<Utc>, DropwizardError> {
        let Some(path) = &self.time_path else {
            return Ok(Utc::now());
        };

        let value = lookup(document, path)
            .and_then(Value::as_str)
            .unwrap_or_default();
        parse_timestamp(value, &self.time_format).map_err(|source| DropwizardError::InvalidTime {
            value: value.to_owned(),
            format: self.time_format.clone(),
            source,
        })
    }

    fn parse_tags(&self, document: &Value) -> BTreeMap<String, String> {
        if let Some(path) = &self.tags_path {
            match lookup(document, path).map(string_map) {
                Some(Some(tags)) if !tags.is_empty() => return tags,
                Some(Some(_)) => {}
                Some(None) => tracing::warn!(path, "tags are not an object of strings"),
                None => tracing::warn!(path, "no tags found at path"),
            }
        }

        self.tag_paths
            .iter()
            .filter_map(|(tag, path)| {
                let value = match lookup(document, path)? {
                    Value::String(s) => s.clone(),
                    value @ (Value::Number(_) | Value::Bool(_)) => value.to_string(),
                    Value::Null | Value::Array(_) | Value::Object(_) => return None,
                };
                Some((tag.clone(), value))
            })
            .collect()
    }
}

/// Follow a dot path through objects and arrays; the empty path is the root.
fn lookup<'a>(document: &'a Value, path: &str) -> Option<&'a Value> {
    if path.is_empty() {
        return Some(document);
    }
    path.split('.').try_fold(document, |value, key| match value {
        Value::Object(map) => map.get(key),
        Value::Array(items) => key.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

fn string_map(value: &Value) -> Option<BTreeMap<String, String>> {
    value
        .as_object()?
        .iter()
        .map(|(k, v)| Some((k.clone(), v.as_str()?.to_owned())))
        .collect()
}

fn parse_timestamp(value: &str, format: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    if format.eq_ignore_ascii_case(RFC3339) {
        return DateTime::parse_from_rfc3339(value).map(|t| t.with_timezone(&Utc));
    }
    DateTime::parse_from_str(value, format)
        .map(|t| t.with_timezone(&Utc))
        .or_else(|_| NaiveDateTime::parse_from_str(value, format).map(|t| t.and_utc()))
}
