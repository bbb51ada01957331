//! `TemplateSpec`: one configuration line, before compilation.
//!
//! The line format is positionally ambiguous:
//!
//! ```text
//! [separator] [filter] <template> [tag1=value1,tag2=value2,...]
//! ```
//!
//! # Naming: Spec vs Template
//!
//! - [`TemplateSpec`] = what the user wrote (raw strings)
//! - [`Template`] = the compiled form applied to names
//!
//! A spec compiles via [`TemplateSpec::compile`].

use crate::{Template, TemplateError, DEFAULT_SEPARATOR};
use std::collections::BTreeMap;
use std::fmt;

/// A parsed configuration line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateSpec {
    /// Splits the filter, the template and matched names.
    pub separator: String,
    /// Filter pattern; empty means this spec replaces the default template.
    pub filter: String,
    /// Template pattern.
    pub template: String,
    /// Raw `key=value,...` default tags.
    pub tags: String,
}

impl TemplateSpec {
    /// Parse one configuration line.
    ///
    /// Returns `None` when the line holds no tokens at all.
    ///
    /// | Tokens | Last token has `=` | Meaning |
    /// |--------|--------------------|---------|
    /// | 1 | any | template |
    /// | 2 | no | filter, template |
    /// | 2 | yes | template, tags |
    /// | 3 | no | separator, filter, template |
    /// | 3 | yes | filter, template, tags |
    /// | 4 | any | separator, filter, template, tags |
    ///
    /// # Example
    ///
    /// ```
    /// use segmatch::TemplateSpec;
    ///
    /// let spec = TemplateSpec::parse("servers.* .host.measurement*").unwrap();
    /// assert_eq!(spec.filter, "servers.*");
    /// assert_eq!(spec.template, ".host.measurement*");
    /// ```
    #[must_use]
    pub fn parse(line: &str) -> Option<Self> {
        let tokens: Vec<&str> = line.split_whitespace().collect();

        let mut spec = Self {
            separator: DEFAULT_SEPARATOR.to_owned(),
            filter: String::new(),
            template: String::new(),
            tags: String::new(),
        };

        match tokens.as_slice() {
            [] => return None,
            [template] => spec.template = (*template).to_owned(),
            [separator, filter, template, tags] => {
                spec.separator = (*separator).to_owned();
                spec.filter = (*filter).to_owned();
                spec.template = (*template).to_owned();
                spec.tags = (*tags).to_owned();
            }
            [.., template, last] if last.contains('=') => {
                spec.template = (*template).to_owned();
                spec.tags = (*last).to_owned();
                if let [filter, _, _] = tokens.as_slice() {
                    spec.filter = (*filter).to_owned();
                }
            }
            [filter, template] => {
                spec.filter = (*filter).to_owned();
                spec.template = (*template).to_owned();
            }
            [separator, filter, .., template] => {
                spec.separator = (*separator).to_owned();
                spec.filter = (*filter).to_owned();
                spec.template = (*template).to_owned();
            }
        }

        Some(spec)
    }

    /// Number of template segments under this spec's own separator.
    #[must_use]
    pub fn segment_count(&self) -> usize {
        self.template.split(self.separator.as_str()).count()
    }

    /// Parse the `key=value,...` tag string.
    ///
    /// Entries without `=` or with an empty key are skipped.
    #[must_use]
    pub fn default_tags(&self) -> BTreeMap<String, String> {
        let mut tags = BTreeMap::new();
        if self.tags.is_empty() {
            return tags;
        }

        for entry in self.tags.split(',') {
            match entry.split_once('=') {
                Some((key, value)) if !key.is_empty() => {
                    tags.insert(key.to_owned(), value.to_owned());
                }
                _ => tracing::warn!(
                    entry,
                    template = %self.template,
                    "ignoring malformed template tag"
                ),
            }
        }
        tags
    }

    /// Compile into a runtime [`Template`].
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::MissingMeasurement`] if the template pattern
    /// has no measurement segment.
    pub fn compile(&self) -> Result<Template, TemplateError> {
        Template::new(
            self.separator.as_str(),
            self.template.as_str(),
            self.default_tags(),
        )
    }
}

impl fmt::Display for TemplateSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let separator = if self.separator == DEFAULT_SEPARATOR {
            ""
        } else {
            self.separator.as_str()
        };
        let tokens: Vec<&str> = [
            separator,
            self.filter.as_str(),
            self.template.as_str(),
            self.tags.as_str(),
        ]
        .into_iter()
        .filter(|token| !token.is_empty())
        .collect();
        f.write_str(&tokens.join(" "))
    }
}

/// Parse every line, dropping empty ones, and sort them for installation.
///
/// Specs without a filter come first; within each group fewer template
/// segments come first. The sort is stable, so equal keys keep their
/// configured order. Later specs overwrite earlier ones that share a filter.
#[must_use]
pub fn parse_specs<I, S>(lines: I) -> Vec<TemplateSpec>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut specs: Vec<TemplateSpec> = lines
        .into_iter()
        .filter_map(|line| {
            let line = line.as_ref();
            let spec = TemplateSpec::parse(line);
            if spec.is_none() {
                tracing::trace!(line, "skipping empty template line");
            }
            spec
        })
        .collect();

    specs.sort_by_key(|spec| (!spec.filter.is_empty(), spec.segment_count()));
    specs
}
