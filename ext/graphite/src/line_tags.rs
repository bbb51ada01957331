//! Graphite 1.1 tagged series: `name;tag1=value1;tag2=value2`.

use std::collections::BTreeMap;

/// Characters a tag name must not contain.
const INVALID_NAME_CHARS: &[char] = &[';', '!', '^', '='];

/// Split a series name into the bare name and its inline tags.
///
/// A `;` at position 0 does not start a tag list. Entries with an empty or
/// invalid name, an empty value, or a value starting with `~` are dropped.
///
/// ```
/// use segmatch_graphite::split_line_tags;
///
/// let (name, tags) = split_line_tags("cpu.load;dc=east;bad!=x");
/// assert_eq!(name, "cpu.load");
/// assert_eq!(tags.len(), 1);
/// assert_eq!(tags["dc"], "east");
/// ```
#[must_use]
pub fn split_line_tags(series: &str) -> (&str, BTreeMap<String, String>) {
    let mut tags = BTreeMap::new();

    let (name, rest) = match series.find(';') {
        Some(start) if start > 0 => (&series[..start], &series[start + 1..]),
        _ => return (series, tags),
    };

    for entry in rest.split(';') {
        let Some((key, value)) = entry.split_once('=') else {
            tracing::debug!(entry, series, "dropping graphite tag without value");
            continue;
        };
        if key.is_empty() || key.contains(INVALID_NAME_CHARS) {
            tracing::debug!(tag = key, series, "dropping graphite tag with invalid name");
            continue;
        }
        if value.is_empty() || value.starts_with('~') {
            tracing::debug!(tag = key, value, series, "dropping graphite tag with invalid value");
            continue;
        }
        tags.insert(key.to_owned(), value.to_owned());
    }

    (name, tags)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_tags() {
        let (name, tags) = split_line_tags("cpu.foo.bar");
        assert_eq!(name, "cpu.foo.bar");
        assert!(tags.is_empty());
    }

    #[test]
    fn leading_semicolon_is_part_of_name() {
        let (name, tags) = split_line_tags(";tag1=value1");
        assert_eq!(name, ";tag1=value1");
        assert!(tags.is_empty());
    }

    #[test]
    fn valid_tag() {
        let (name, tags) = split_line_tags("cpu.foo.bar;tag1=value1");
        assert_eq!(name, "cpu.foo.bar");
        assert_eq!(tags["tag1"], "value1");
    }

    #[test]
    fn invalid_names_dropped() {
        let (_, tags) = split_line_tags("cpu;tag!1=value1;tag^2=value2;=value3");
        assert!(tags.is_empty());
    }

    #[test]
    fn invalid_values_dropped() {
        let (_, tags) = split_line_tags("cpu;tag1=~value1;tag2=;tag3");
        assert!(tags.is_empty());
    }

    #[test]
    fn value_may_contain_equals() {
        let (_, tags) = split_line_tags("cpu;expr=a=b");
        assert_eq!(tags["expr"], "a=b");
    }
}
