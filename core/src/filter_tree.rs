//! Filter tree for most-specific template lookup.
//!
//! Filters such as `servers.*.cpu` are split on the separator and stored one
//! segment per level. Nodes live in an arena (`Vec<Node>`) and refer to their
//! children by index, with the root at index 0.
//!
//! Children are kept sorted with the wildcard `*` last, so a lookup can
//! binary-search the literal children and fall back to the wildcard sibling.

use crate::trace::{SearchStep, StepOutcome};
use crate::{Template, WILDCARD};
use std::cmp::Ordering;

/// A tree of filter patterns, each path optionally bound to a [`Template`].
///
/// # Lookup
///
/// At every level an exact segment match is preferred over the wildcard
/// child. The search never backtracks: when neither matches, the template
/// bound at the node where it stopped (possibly none) is the result.
///
/// # Example
///
/// ```
/// use segmatch::{FilterTree, Template};
///
/// let mut tree = FilterTree::new(".");
/// tree.insert("servers.*", Template::with_pattern(".wrong.measurement*").unwrap());
/// tree.insert("servers.localhost", Template::with_pattern(".host.measurement*").unwrap());
///
/// let found = tree.search("servers.localhost.cpu_load").unwrap();
/// assert_eq!(found.pattern(), ".host.measurement*");
///
/// let found = tree.search("servers.web01.cpu_load").unwrap();
/// assert_eq!(found.pattern(), ".wrong.measurement*");
///
/// assert!(tree.search("other.localhost").is_none());
/// ```
#[derive(Debug, Clone)]
pub struct FilterTree {
    separator: String,
    nodes: Vec<Node>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct NodeId(usize);

impl NodeId {
    const ROOT: Self = Self(0);
}

#[derive(Debug, Clone)]
struct Node {
    /// Filter segment this node stands for (empty at the root).
    value: String,
    /// Children, sorted by [`compare_segments`].
    children: Vec<NodeId>,
    template: Option<Template>,
}

impl Node {
    fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            children: Vec::new(),
            template: None,
        }
    }
}

/// Order filter segments with the wildcard after every literal.
///
/// Literals compare as plain strings; `*` is equal only to itself.
#[must_use]
pub fn compare_segments(a: &str, b: &str) -> Ordering {
    match (a == WILDCARD, b == WILDCARD) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.cmp(b),
    }
}

impl FilterTree {
    /// Create an empty tree splitting filters and names on `separator`.
    #[must_use]
    pub fn new(separator: impl Into<String>) -> Self {
        Self {
            separator: separator.into(),
            nodes: vec![Node::new("")],
        }
    }

    /// The separator filters and names are split on.
    #[must_use]
    pub fn separator(&self) -> &str {
        &self.separator
    }

    /// Bind `template` at the node for `filter`, creating nodes as needed.
    ///
    /// Returns the template previously bound there, if any.
    pub fn insert(&mut self, filter: &str, template: Template) -> Option<Template> {
        let separator = self.separator.clone();
        let mut current = NodeId::ROOT;
        for segment in filter.split(separator.as_str()) {
            current = match self.find_child(current, segment) {
                Some(child) => child,
                None => self.add_child(current, segment),
            };
        }
        self.nodes[current.0].template.replace(template)
    }

    /// Find the most specific template bound along `name`'s path.
    #[must_use]
    pub fn search(&self, name: &str) -> Option<&Template> {
        let node = self.walk(name, |_| {});
        self.nodes[node.0].template.as_ref()
    }

    /// Like [`search`](Self::search), recording each step taken.
    pub(crate) fn search_with_steps(
        &self,
        name: &str,
        steps: &mut Vec<SearchStep>,
    ) -> Option<&Template> {
        let node = self.walk(name, |step| steps.push(step));
        self.nodes[node.0].template.as_ref()
    }

    /// Number of nodes, including the root.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of filters with a bound template.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|n| n.template.is_some()).count()
    }

    /// Returns `true` if no filter has been inserted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn find_child(&self, parent: NodeId, segment: &str) -> Option<NodeId> {
        self.nodes[parent.0]
            .children
            .iter()
            .copied()
            .find(|child| self.nodes[child.0].value == segment)
    }

    fn add_child(&mut self, parent: NodeId, segment: &str) -> NodeId {
        let id = NodeId(self.nodes.len());
        let position = self.nodes[parent.0].children.partition_point(|child| {
            compare_segments(&self.nodes[child.0].value, segment) == Ordering::Less
        });

        self.nodes.push(Node::new(segment));
        self.nodes[parent.0].children.insert(position, id);
        id
    }

    fn walk(&self, name: &str, mut visit: impl FnMut(SearchStep)) -> NodeId {
        let mut current = NodeId::ROOT;

        for segment in name.split(self.separator.as_str()) {
            let children = &self.nodes[current.0].children;
            let Some(&last) = children.last() else {
                break;
            };

            // The wildcard sorts last; keep it out of the binary search.
            let (literals, wildcard) = if self.nodes[last.0].value == WILDCARD {
                (&children[..children.len() - 1], Some(last))
            } else {
                (&children[..], None)
            };

            let found = literals
                .binary_search_by(|child| self.nodes[child.0].value.as_str().cmp(segment));

            match (found, wildcard) {
                (Ok(index), _) => {
                    visit(SearchStep::new(segment, StepOutcome::Exact));
                    current = literals[index];
                }
                (Err(_), Some(wildcard)) => {
                    visit(SearchStep::new(segment, StepOutcome::Wildcard));
                    current = wildcard;
                }
                (Err(_), None) => {
                    visit(SearchStep::new(segment, StepOutcome::Stopped));
                    break;
                }
            }
        }

        current
    }
}
