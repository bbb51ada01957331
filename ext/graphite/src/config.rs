//! Serde config for [`GraphiteParser`](crate::GraphiteParser).

use segmatch::DEFAULT_SEPARATOR;
use serde::Deserialize;
use std::collections::BTreeMap;

/// Graphite parser configuration.
///
/// ```yaml
/// separator: "_"
/// templates:
///   - "servers.* .host.measurement*"
/// default_tags:
///   region: us-east
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GraphiteConfig {
    /// Joins multi-segment values.
    pub separator: String,
    /// Template lines.
    pub templates: Vec<String>,
    /// Tags added to every metric that does not already carry them.
    pub default_tags: BTreeMap<String, String>,
}

impl Default for GraphiteConfig {
    fn default() -> Self {
        Self {
            separator: DEFAULT_SEPARATOR.to_owned(),
            templates: Vec::new(),
            default_tags: BTreeMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GraphiteParser;

    #[test]
    fn yaml_round_trip_into_parser() {
        let yaml = r#"
separator: "_"
templates:
  - "servers.localhost .host.measurement.measurement*"
default_tags:
  region: us-east
"#;
        let config: GraphiteConfig = serde_yaml::from_str(yaml).unwrap();
        let parser = GraphiteParser::from_config(&config).unwrap();

        let m = parser
            .parse_line("servers.localhost.cpu.cpu_load.10 11 1435077219")
            .unwrap();
        assert_eq!(m.name, "cpu_cpu_load_10");
        assert_eq!(m.tag("region"), Some("us-east"));
    }

    #[test]
    fn defaults() {
        let config: GraphiteConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.separator, ".");
        assert!(config.templates.is_empty());
    }
}
