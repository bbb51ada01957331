//! Conformance fixture runner
//!
//! Loads YAML fixtures and runs them through the production config path:
//! YAML → [`EngineConfig`] → [`Engine::from_config`] → apply.
//!
//! ```yaml
//! name: most specific filter
//! config:
//!   separator: "_"
//!   templates:
//!     - "servers.* .host.measurement*"
//! cases:
//!   - name: wildcard host
//!     input: servers.web01.cpu.load
//!     template: ".host.measurement*"
//!     expect:
//!       measurement: cpu_load
//!       tags: { host: web01 }
//!   - name: ...
//!     input: ...
//!     error: conflicting_greedy
//! ```

use crate::{ErrorKind, Expected, Outcome};
use segmatch::{Engine, EngineConfig};
use serde::Deserialize;

/// A complete test fixture.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Fixture {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub config: EngineConfig,
    /// Building the engine must fail with this error.
    #[serde(default)]
    pub expect_error: Option<ErrorKind>,
    #[serde(default)]
    pub cases: Vec<TestCase>,
}

/// One name and what applying the engine to it must produce.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TestCase {
    pub name: String,
    pub input: String,
    /// Pattern of the template that must be selected.
    #[serde(default)]
    pub template: Option<String>,
    #[serde(default)]
    pub expect: Option<Expected>,
    #[serde(default)]
    pub error: Option<ErrorKind>,
}

impl TestCase {
    fn expected(&self) -> Outcome {
        match (self.error, &self.expect) {
            (Some(kind), _) => Outcome::Error(kind),
            (None, expect) => Outcome::Decomposed(expect.clone().unwrap_or_default()),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Runner
// ═══════════════════════════════════════════════════════════════════════════════

/// Result of running a single test case.
#[derive(Debug)]
pub struct CaseResult {
    pub case_name: String,
    pub passed: bool,
    pub expected: String,
    pub actual: String,
}

impl Fixture {
    /// Parse a fixture from YAML.
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Parse multiple fixtures from a YAML file with `---` separators.
    pub fn from_yaml_multi(yaml: &str) -> Result<Vec<Self>, serde_yaml::Error> {
        let mut fixtures = Vec::new();
        for doc in serde_yaml::Deserializer::from_str(yaml) {
            fixtures.push(Self::deserialize(doc)?);
        }
        Ok(fixtures)
    }

    /// Run all test cases and return results.
    ///
    /// A fixture with `expect_error` yields a single result for the
    /// construction step.
    pub fn run(&self) -> Vec<CaseResult> {
        let engine = match (Engine::from_config(&self.config), self.expect_error) {
            (Ok(engine), None) => engine,
            (built, expected) => {
                let actual = built.err().map(|e| ErrorKind::of(&e));
                return vec![CaseResult {
                    case_name: "<construction>".to_owned(),
                    passed: actual == expected,
                    expected: format!("{expected:?}"),
                    actual: format!("{actual:?}"),
                }];
            }
        };

        self.cases.iter().map(|case| run_case(&engine, case)).collect()
    }

    /// Run all test cases and panic on first failure.
    pub fn run_and_assert(&self) {
        for result in self.run() {
            assert!(
                result.passed,
                "Fixture '{}' case '{}' failed: expected {}, got {}",
                self.name, result.case_name, result.expected, result.actual
            );
        }
    }
}

fn run_case(engine: &Engine, case: &TestCase) -> CaseResult {
    let expected = case.expected();
    let trace = engine.apply_with_trace(&case.input);
    let actual = Outcome::from(engine.apply(&case.input));

    let mut passed = actual == expected && Outcome::from(trace.result) == actual;
    let mut expected = format!("{expected:?}");
    let mut actual = format!("{actual:?}");

    if let Some(pattern) = &case.template {
        let selected = engine.template_for(&case.input).pattern();
        passed &= selected == pattern && trace.template == *pattern;
        expected = format!("{expected} via {pattern:?}");
        actual = format!("{actual} via {selected:?}");
    }

    CaseResult {
        case_name: case.name.clone(),
        passed,
        expected,
        actual,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const YAML: &str = r#"
name: first
config:
  templates:
    - "servers.* .host.measurement*"
cases:
  - name: hit
    input: servers.web01.cpu.load
    template: ".host.measurement*"
    expect:
      measurement: cpu.load
      tags: { host: web01 }
  - name: miss
    input: other.cpu
    expect:
      measurement: other.cpu
---
name: second
config:
  templates:
    - "servers.* .host.cpu"
expect_error: missing_measurement
"#;

    #[test]
    fn multi_document() {
        let fixtures = Fixture::from_yaml_multi(YAML).unwrap();
        assert_eq!(fixtures.len(), 2);
        for fixture in &fixtures {
            fixture.run_and_assert();
        }
    }

    #[test]
    fn failing_case_is_reported() {
        let fixture = Fixture::from_yaml(
            r#"
name: wrong
config: {}
cases:
  - name: bad expectation
    input: a.b
    expect: { measurement: a }
"#,
        )
        .unwrap();
        let results = fixture.run();
        assert!(!results[0].passed);
        assert!(results[0].actual.contains("a.b"));
    }

    #[test]
    fn unexpected_construction_success() {
        let fixture = Fixture::from_yaml(
            "name: x\nconfig: {}\nexpect_error: mixed_separators\n",
        )
        .unwrap();
        let results = fixture.run();
        assert_eq!(results.len(), 1);
        assert!(!results[0].passed);
    }
}
