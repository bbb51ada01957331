use crate::MetricKind;
use segmatch::{FieldValue, Metric};
use std::collections::BTreeMap;

/// The value carried by one sample.
#[derive(Debug, Clone, PartialEq)]
pub enum SampleValue {
    /// Counter increment, already divided by the sample rate.
    Int(i64),
    /// Gauge, timing or histogram reading.
    Float(f64),
    /// Set member, kept as written.
    Set(String),
}

/// One parsed StatsD value, ready for aggregation.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    /// Measurement name.
    pub name: String,
    /// Field the value belongs to.
    pub field: String,
    /// Template, inline, `metric_type` and DataDog tags.
    pub tags: BTreeMap<String, String>,
    pub kind: MetricKind,
    pub value: SampleValue,
    /// `@rate` suffix, when present and valid.
    pub sample_rate: Option<f64>,
    /// The value had a `+`/`-` prefix.
    pub additive: bool,
}

impl Sample {
    /// Render as a [`Metric`] stamped with the current time.
    #[must_use]
    pub fn to_metric(&self) -> Metric {
        let value = match &self.value {
            SampleValue::Int(v) => FieldValue::Int(*v),
            SampleValue::Float(v) => FieldValue::Float(*v),
            SampleValue::Set(v) => FieldValue::String(v.clone()),
        };

        let mut metric = Metric::new(self.name.as_str()).with_field(self.field.as_str(), value);
        metric.tags.clone_from(&self.tags);
        metric
    }
}
