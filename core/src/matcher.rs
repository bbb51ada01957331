//! Matcher: filter tree plus fallback template.
//!
//! The `Matcher` answers one question: which [`Template`] decomposes this
//! name? It asks the [`FilterTree`] first and falls back to its default
//! template when the search ends without a bound template.

use crate::trace::SearchStep;
use crate::{FilterTree, Template, TemplateError};

/// Selects the template for a metric name.
///
/// A matcher owns exactly one separator. Every template added through
/// [`add`](Self::add) under a filter must use it; the default template is
/// exempt because it is only ever applied, never inserted.
///
/// # Example
///
/// ```
/// use segmatch::{Matcher, Template};
///
/// let mut matcher = Matcher::new(Template::with_pattern("measurement*").unwrap());
/// matcher
///     .add("cpu.*", Template::with_pattern("measurement.measurement.host").unwrap())
///     .unwrap();
///
/// assert_eq!(matcher.evaluate("cpu.idle.web01").pattern(), "measurement.measurement.host");
/// assert_eq!(matcher.evaluate("mem.free").pattern(), "measurement*");
/// ```
#[derive(Debug, Clone)]
pub struct Matcher {
    tree: FilterTree,
    default_template: Template,
}

impl Matcher {
    /// Create a matcher using the default template's separator.
    #[must_use]
    pub fn new(default_template: Template) -> Self {
        let separator = default_template.separator().to_owned();
        Self::with_separator(separator, default_template)
    }

    /// Create a matcher with an explicit separator.
    #[must_use]
    pub fn with_separator(separator: impl Into<String>, default_template: Template) -> Self {
        Self {
            tree: FilterTree::new(separator),
            default_template,
        }
    }

    /// The separator filters and names are split on.
    #[must_use]
    pub fn separator(&self) -> &str {
        self.tree.separator()
    }

    /// The fallback template.
    #[must_use]
    pub fn default_template(&self) -> &Template {
        &self.default_template
    }

    /// The filter tree.
    #[must_use]
    pub fn tree(&self) -> &FilterTree {
        &self.tree
    }

    /// Install `template` under `filter`.
    ///
    /// An empty filter replaces the default template, whatever its separator.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::MixedSeparators`] if a filtered template's
    /// separator differs from the matcher's.
    pub fn add(&mut self, filter: &str, template: Template) -> Result<(), TemplateError> {
        if filter.is_empty() {
            self.default_template = template;
            return Ok(());
        }

        if template.separator() != self.separator() {
            return Err(TemplateError::MixedSeparators {
                expected: self.separator().to_owned(),
                found: template.separator().to_owned(),
            });
        }
        self.tree.insert(filter, template);
        Ok(())
    }

    /// Return the template to apply to `name`.
    #[must_use]
    pub fn evaluate(&self, name: &str) -> &Template {
        self.tree.search(name).unwrap_or(&self.default_template)
    }

    /// Like [`evaluate`](Self::evaluate), recording the search path.
    ///
    /// The flag is `true` when the default template was used.
    pub(crate) fn evaluate_with_steps(
        &self,
        name: &str,
        steps: &mut Vec<SearchStep>,
    ) -> (&Template, bool) {
        match self.tree.search_with_steps(name, steps) {
            Some(template) => (template, false),
            None => (&self.default_template, true),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn template(pattern: &str) -> Template {
        Template::with_pattern(pattern).unwrap()
    }

    #[test]
    fn test_default_when_no_filters() {
        let matcher = Matcher::new(template("measurement*"));
        assert_eq!(matcher.evaluate("a.b.c").pattern(), "measurement*");
        assert!(matcher.tree().is_empty());
    }

    #[test]
    fn test_empty_filter_replaces_default() {
        let mut matcher = Matcher::new(template("measurement*"));
        matcher.add("", template("measurement.host")).unwrap();
        assert_eq!(matcher.evaluate("cpu.web").pattern(), "measurement.host");
        assert!(matcher.tree().is_empty());
    }

    #[test]
    fn test_fallback_when_search_misses() {
        let mut matcher = Matcher::new(template("measurement*"));
        matcher.add("servers.*.cpu", template(".host.measurement")).unwrap();

        assert_eq!(
            matcher.evaluate("servers.localhost.cpu").pattern(),
            ".host.measurement"
        );
        assert_eq!(
            matcher.evaluate("servers.localhost.memory").pattern(),
            "measurement*"
        );
        assert_eq!(matcher.evaluate("miss.servers").pattern(), "measurement*");
    }

    #[test]
    fn test_rejects_other_separator() {
        let mut matcher = Matcher::new(template("measurement*"));
        let underscore = Template::new("_", "measurement_host", BTreeMap::new()).unwrap();

        let err = matcher.add("a_b", underscore).unwrap_err();
        assert_eq!(
            err,
            TemplateError::MixedSeparators {
                expected: ".".into(),
                found: "_".into(),
            }
        );
    }

    #[test]
    fn test_explicit_separator_exempts_default() {
        let mut matcher = Matcher::with_separator("_", template("measurement*"));
        let underscore = Template::new("_", "measurement_host", BTreeMap::new()).unwrap();
        matcher.add("cpu_*", underscore).unwrap();

        assert_eq!(matcher.separator(), "_");
        assert_eq!(matcher.evaluate("cpu_web").pattern(), "measurement_host");
        assert_eq!(matcher.evaluate("mem_web").pattern(), "measurement*");
    }

    #[test]
    fn test_empty_filter_keeps_own_separator() {
        let mut matcher = Matcher::with_separator("_", template("measurement*"));
        matcher.add("", template("measurement.host")).unwrap();

        assert_eq!(matcher.separator(), "_");
        assert_eq!(matcher.default_template().separator(), ".");
        assert_eq!(matcher.evaluate("cpu_web").pattern(), "measurement.host");
    }
}
