//! Serde config for [`DropwizardParser`](crate::DropwizardParser).

use crate::RFC3339;
use segmatch::DEFAULT_SEPARATOR;
use serde::Deserialize;
use std::collections::BTreeMap;

/// Dropwizard parser configuration.
///
/// ```yaml
/// separator: "_"
/// templates:
///   - "jenkins.* measurement.metric.metric.field"
/// metric_registry_path: metrics
/// time_path: time
/// tag_paths:
///   env: meta.environment
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DropwizardConfig {
    /// Joins multi-segment values and follows a template field.
    pub separator: String,
    /// Template lines. The engine is only built when this is not empty.
    pub templates: Vec<String>,
    /// Dot path to the registry; the document root when unset.
    pub metric_registry_path: Option<String>,
    /// Dot path to an object of string tags.
    pub tags_path: Option<String>,
    /// Tag name to dot path, used when `tags_path` yields nothing.
    pub tag_paths: BTreeMap<String, String>,
    /// Dot path to the document time; metrics are stamped now when unset.
    pub time_path: Option<String>,
    /// `rfc3339` or a strftime pattern.
    pub time_format: String,
    /// Tags added to every metric that does not already carry them.
    pub default_tags: BTreeMap<String, String>,
}

impl Default for DropwizardConfig {
    fn default() -> Self {
        Self {
            separator: DEFAULT_SEPARATOR.to_owned(),
            templates: Vec::new(),
            metric_registry_path: None,
            tags_path: None,
            tag_paths: BTreeMap::new(),
            time_path: None,
            time_format: RFC3339.to_owned(),
            default_tags: BTreeMap::new(),
        }
    }
}
