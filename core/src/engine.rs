//! Engine: configuration lines in, decomposed names out.

use crate::template_spec::parse_specs;
use crate::trace::MatchTrace;
use crate::{Decomposed, Matcher, Template, TemplateError};
use std::collections::BTreeMap;

/// Decomposes metric names using a set of filtered templates.
///
/// Built once from configuration lines, then read-only: `Engine` is
/// `Send + Sync` and [`apply`](Self::apply) takes `&self`.
///
/// # Example
///
/// ```
/// use segmatch::{Engine, Template};
///
/// let engine = Engine::new(
///     "_",
///     Template::with_pattern("measurement*").unwrap(),
///     ["servers.* .host.measurement.measurement*"],
/// )
/// .unwrap();
///
/// let out = engine.apply("servers.localhost.cpu.cpu_load.10").unwrap();
/// assert_eq!(out.measurement, "cpu_cpu_load_10");
/// assert_eq!(out.tags["host"], "localhost");
/// ```
#[derive(Debug, Clone)]
pub struct Engine {
    joiner: String,
    matcher: Matcher,
}

impl Engine {
    /// Build an engine from template configuration lines.
    ///
    /// Lines are parsed and sorted (see [`parse_specs`]), then compiled in
    /// that order. When two lines share a filter the later one wins; a line
    /// without a filter replaces `default_template`.
    ///
    /// # Errors
    ///
    /// - [`TemplateError::MixedSeparators`] if the filtered lines declare
    ///   different separators. A line without a filter keeps its own.
    /// - [`TemplateError::MissingMeasurement`] from the first line whose
    ///   template has no measurement segment.
    pub fn new<I, S>(
        joiner: impl Into<String>,
        default_template: Template,
        lines: I,
    ) -> Result<Self, TemplateError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let specs = parse_specs(lines);

        let mut filtered = specs.iter().filter(|spec| !spec.filter.is_empty());
        let separator = filtered
            .next()
            .map_or(default_template.separator(), |spec| spec.separator.as_str())
            .to_owned();
        if let Some(other) = filtered.find(|spec| spec.separator != separator) {
            return Err(TemplateError::MixedSeparators {
                expected: separator,
                found: other.separator.clone(),
            });
        }

        let mut bindings: BTreeMap<String, Template> = BTreeMap::new();
        for spec in &specs {
            let template = spec.compile()?;
            tracing::debug!(
                filter = %spec.filter,
                template = %spec.template,
                tags = %spec.tags,
                "compiled template"
            );
            if bindings.insert(spec.filter.clone(), template).is_some() {
                tracing::debug!(filter = %spec.filter, "template replaces an earlier one");
            }
        }

        let mut matcher = Matcher::with_separator(separator, default_template);
        for (filter, template) in bindings {
            matcher.add(&filter, template)?;
        }

        Ok(Self {
            joiner: joiner.into(),
            matcher,
        })
    }

    /// Build an engine from an [`EngineConfig`](crate::EngineConfig).
    ///
    /// # Errors
    ///
    /// Same as [`Engine::new`], plus
    /// [`TemplateError::MissingMeasurement`] for a bad default template.
    #[cfg(feature = "serde")]
    pub fn from_config(config: &crate::EngineConfig) -> Result<Self, TemplateError> {
        let default_template = Template::with_pattern(config.default_template.as_str())?;
        Self::new(config.separator.as_str(), default_template, &config.templates)
    }

    /// String used to join multi-segment values.
    #[must_use]
    pub fn joiner(&self) -> &str {
        &self.joiner
    }

    /// The underlying matcher.
    #[must_use]
    pub fn matcher(&self) -> &Matcher {
        &self.matcher
    }

    /// The template that [`apply`](Self::apply) would use for `name`.
    #[must_use]
    pub fn template_for(&self, name: &str) -> &Template {
        self.matcher.evaluate(name)
    }

    /// Decompose `name` into measurement, tags and field.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::ConflictingGreedy`] if the selected template
    /// holds both `measurement*` and `field*`.
    pub fn apply(&self, name: &str) -> Result<Decomposed, TemplateError> {
        self.matcher.evaluate(name).apply(name, &self.joiner)
    }

    /// Like [`apply`](Self::apply), recording how the template was chosen.
    #[must_use]
    pub fn apply_with_trace(&self, name: &str) -> MatchTrace {
        let mut steps = Vec::new();
        let (template, used_default) = self.matcher.evaluate_with_steps(name, &mut steps);
        let filter = if used_default {
            String::new()
        } else {
            MatchTrace::filter_path(&steps, self.matcher.separator())
        };

        MatchTrace {
            name: name.to_owned(),
            filter,
            used_default,
            template: template.pattern().to_owned(),
            result: template.apply(name, &self.joiner),
            steps,
        }
    }
}
