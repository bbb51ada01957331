//! Serde config for [`StatsdParser`](crate::StatsdParser).

use crate::DEFAULT_SEPARATOR;
use serde::Deserialize;

/// StatsD parser configuration.
///
/// ```yaml
/// separator: "_"
/// templates:
///   - "cpu.* measurement.measurement.host"
/// datadog_tags: true
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StatsdConfig {
    /// Joins multi-segment values.
    pub separator: String,
    /// Template lines.
    pub templates: Vec<String>,
    /// Replace `.` with `_` and `-` with `__` in names.
    pub convert_names: bool,
    /// Parse DataDog `|#k:v` tag segments.
    pub datadog_tags: bool,
}

impl Default for StatsdConfig {
    fn default() -> Self {
        Self {
            separator: DEFAULT_SEPARATOR.to_owned(),
            templates: Vec::new(),
            convert_names: false,
            datadog_tags: false,
        }
    }
}
