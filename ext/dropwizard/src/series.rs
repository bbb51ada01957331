//! Registry keys of the form `name[,k=v...]`.
//!
//! A backslash escapes the next character, so `\,` `\=` and `\ ` are kept
//! literally and the backslash itself is dropped.

use std::collections::BTreeMap;

/// Split a registry key into a name and inline tags.
///
/// Returns `None` for an empty name or a tag entry that is not exactly one
/// unescaped `key=value` with a non-empty key.
///
/// ```
/// use segmatch_dropwizard::parse_series;
///
/// let (name, tags) = parse_series(r"hello\ world,dc=east").unwrap();
/// assert_eq!(name, "hello world");
/// assert_eq!(tags["dc"], "east");
/// ```
#[must_use]
pub fn parse_series(key: &str) -> Option<(String, BTreeMap<String, String>)> {
    let mut parts = split_unescaped(key, ',').into_iter();
    let name = unescape(parts.next()?);
    if name.is_empty() {
        return None;
    }

    let mut tags = BTreeMap::new();
    for entry in parts {
        match split_unescaped(entry, '=').as_slice() {
            [key, value] if !key.is_empty() => {
                tags.insert(unescape(key), unescape(value));
            }
            _ => return None,
        }
    }

    Some((name, tags))
}

fn split_unescaped(s: &str, separator: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut escaped = false;

    for (i, c) in s.char_indices() {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == separator {
            parts.push(&s[start..i]);
            start = i + c.len_utf8();
        }
    }
    parts.push(&s[start..]);
    parts
}

fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => out.extend(chars.next().or(Some('\\'))),
            c => out.push(c),
        }
    }
    out
}
