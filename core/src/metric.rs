//! Normalized metric model produced by the line parsers.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::fmt;

/// A single field value.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum FieldValue {
    Float(f64),
    Int(i64),
    Bool(bool),
    String(String),
}

impl FieldValue {
    /// The value as a float, if it is numeric.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            #[allow(clippy::cast_precision_loss)]
            Self::Int(v) => Some(*v as f64),
            Self::Bool(_) | Self::String(_) => None,
        }
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_owned())
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Float(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}i"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::String(v) => write!(f, "{v:?}"),
        }
    }
}

/// A measurement with tags, fields and a timestamp.
///
/// # Example
///
/// ```
/// use segmatch::{FieldValue, Metric};
///
/// let metric = Metric::new("cpu")
///     .with_tag("host", "web01")
///     .with_field("value", 0.5);
///
/// assert_eq!(metric.tag("host"), Some("web01"));
/// assert_eq!(metric.field("value"), Some(&FieldValue::Float(0.5)));
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Metric {
    pub name: String,
    pub tags: BTreeMap<String, String>,
    pub fields: BTreeMap<String, FieldValue>,
    pub timestamp: DateTime<Utc>,
}

impl Metric {
    /// A metric with no tags or fields, stamped with the current time.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_timestamp(name, Utc::now())
    }

    #[must_use]
    pub fn with_timestamp(name: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            name: name.into(),
            tags: BTreeMap::new(),
            fields: BTreeMap::new(),
            timestamp,
        }
    }

    #[must_use]
    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.add_tag(key, value);
        self
    }

    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.add_field(key, value);
        self
    }

    /// Set a tag, replacing any previous value.
    pub fn add_tag(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.tags.insert(key.into(), value.into());
    }

    /// Set a field, replacing any previous value.
    pub fn add_field(&mut self, key: impl Into<String>, value: impl Into<FieldValue>) {
        self.fields.insert(key.into(), value.into());
    }

    #[must_use]
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }

    #[must_use]
    pub fn field(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }
}

/// Line-protocol style rendering: `name,k=v field=value timestamp_ns`.
impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        for (key, value) in &self.tags {
            write!(f, ",{key}={value}")?;
        }
        let fields: Vec<String> = self
            .fields
            .iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect();
        if !fields.is_empty() {
            write!(f, " {}", fields.join(","))?;
        }
        match self.timestamp.timestamp_nanos_opt() {
            Some(nanos) => write!(f, " {nanos}"),
            None => write!(f, " {}", self.timestamp.to_rfc3339()),
        }
    }
}
