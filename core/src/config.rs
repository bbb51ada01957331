//! Serde config types for engine construction.
//!
//! [`EngineConfig`] mirrors the arguments of [`Engine::new`](crate::Engine::new)
//! as plain strings, so an engine can be loaded from YAML or JSON:
//!
//! ```yaml
//! separator: "_"
//! templates:
//!   - "servers.* .host.measurement*"
//!   - "*.app env.service.resource.measurement"
//! ```

use crate::DEFAULT_SEPARATOR;
use serde::Deserialize;

/// Configuration for an [`Engine`](crate::Engine).
///
/// Every field has a default, so `{}` is a valid config.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Joins multi-segment values.
    pub separator: String,

    /// Template lines: `[separator] [filter] <template> [tags]`.
    pub templates: Vec<String>,

    /// Pattern used when no filter matches.
    pub default_template: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            separator: DEFAULT_SEPARATOR.to_owned(),
            templates: Vec::new(),
            default_template: "measurement*".to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Engine;

    #[test]
    fn empty_config_uses_defaults() {
        let config: EngineConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.separator, ".");
        assert_eq!(config.default_template, "measurement*");
    }

    #[test]
    fn yaml_config_builds_engine() {
        let yaml = r#"
separator: "_"
templates:
  - "servers.* .host.measurement*"
"#;
        let config: EngineConfig = serde_yaml::from_str(yaml).unwrap();
        let engine = Engine::from_config(&config).unwrap();

        let out = engine.apply("servers.web01.cpu.load").unwrap();
        assert_eq!(out.measurement, "cpu_load");
        assert_eq!(out.tags["host"], "web01");
    }

    #[test]
    fn unknown_field_rejected() {
        let result: Result<EngineConfig, _> = serde_json::from_str(r#"{"joiner": "_"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn bad_default_template_fails() {
        let config = EngineConfig {
            default_template: "host".into(),
            ..EngineConfig::default()
        };
        assert!(Engine::from_config(&config).is_err());
    }
}
