//! Tag tree: nested groups of tag values

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use termtree::Tree;

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::parser::{self, GROUP_DELIMITER};

/// Tags of one doc comment, organized by hyphen-delimited key paths.
///
/// `@foo-barQux-corge value` is stored as the value `corge` in the group
/// `barQux` inside the group `foo`. Groups and values are separate
/// namespaces: a node may hold a group and a value under the same name,
/// e.g. after `@a x` and `@a-b y`.
///
/// Both maps keep insertion order, so iteration follows document order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagTree {
    groups: IndexMap<String, TagTree>,
    values: IndexMap<String, String>,
}

impl TagTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a `/** ... */` doc comment. See [`parser::parse`].
    pub fn parse(doc: &str) -> DomainResult<Self> {
        parser::parse(doc)
    }

    /// Child group by name, `None` if it does not exist.
    pub fn group(&self, name: &str) -> DomainResult<Option<&TagTree>> {
        check_name(name)?;
        Ok(self.groups.get(name))
    }

    /// Child group by name, created empty on first access.
    ///
    /// Repeated calls with the same name return the same child.
    pub fn ensure_group(&mut self, name: &str) -> DomainResult<&mut TagTree> {
        check_name(name)?;
        Ok(self.groups.entry(name.to_string()).or_default())
    }

    pub fn groups(&self) -> &IndexMap<String, TagTree> {
        &self.groups
    }

    /// Whether a value is set under `name` on this node.
    pub fn has_value(&self, name: &str) -> DomainResult<bool> {
        check_name(name)?;
        Ok(self.values.contains_key(name))
    }

    /// Value set under `name` on this node.
    ///
    /// A tag without a value yields `Some("")`; `None` means no such tag.
    pub fn value(&self, name: &str) -> DomainResult<Option<&str>> {
        check_name(name)?;
        Ok(self.values.get(name).map(String::as_str))
    }

    pub fn values(&self) -> &IndexMap<String, String> {
        &self.values
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty() && self.values.is_empty()
    }

    /// Set the value at a fully-qualified key, creating groups along the path.
    ///
    /// An existing value at the same key is overwritten.
    pub fn insert(&mut self, key: &str, value: impl Into<String>) {
        let (path, leaf) = match key.rsplit_once(GROUP_DELIMITER) {
            Some((path, leaf)) => (Some(path), leaf),
            None => (None, key),
        };

        let mut node = self;
        for component in path.into_iter().flat_map(|p| p.split(GROUP_DELIMITER)) {
            node = node.groups.entry(component.to_string()).or_default();
        }
        node.values.insert(leaf.to_string(), value.into());
    }

    /// Resolve a fully-qualified key such as `phpstan-var`.
    ///
    /// Never creates groups; a missing group anywhere on the path yields `None`.
    pub fn lookup(&self, key: &str) -> Option<&str> {
        let (path, leaf) = match key.rsplit_once(GROUP_DELIMITER) {
            Some((path, leaf)) => (Some(path), leaf),
            None => (None, key),
        };

        let mut node = self;
        for component in path.into_iter().flat_map(|p| p.split(GROUP_DELIMITER)) {
            node = node.groups.get(component)?;
        }
        node.values.get(leaf).map(String::as_str)
    }

    /// All values with their fully-qualified keys.
    ///
    /// A node's own values come first, then each group depth-first,
    /// both in insertion order.
    pub fn entries(&self) -> Vec<(String, &str)> {
        let mut entries = Vec::new();
        self.collect_entries(None, &mut entries);
        entries
    }

    fn collect_entries<'a>(&'a self, prefix: Option<&str>, out: &mut Vec<(String, &'a str)>) {
        let qualify = |name: &str| match prefix {
            Some(prefix) => format!("{}{}{}", prefix, GROUP_DELIMITER, name),
            None => name.to_string(),
        };

        for (name, value) in &self.values {
            out.push((qualify(name), value.as_str()));
        }
        for (name, group) in &self.groups {
            group.collect_entries(Some(&qualify(name)), out);
        }
    }

    /// Render for terminal display, values as `name = "value"` leaves.
    pub fn to_tree_string(&self, label: impl Into<String>) -> Tree<String> {
        let values = self
            .values
            .iter()
            .map(|(name, value)| Tree::new(format!("{} = {:?}", name, value)));
        let groups = self
            .groups
            .iter()
            .map(|(name, group)| group.to_tree_string(name.clone()));

        Tree::new(label.into()).with_leaves(values.chain(groups))
    }
}

fn check_name(name: &str) -> DomainResult<()> {
    if name.contains(GROUP_DELIMITER) {
        return Err(DomainError::InvalidName(name.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_creates_nested_groups() {
        let mut tree = TagTree::new();
        tree.insert("foo-barQux-corge", "1");

        let foo = tree.group("foo").unwrap().unwrap();
        let bar = foo.group("barQux").unwrap().unwrap();
        assert_eq!(bar.value("corge").unwrap(), Some("1"));
        assert!(foo.values().is_empty());
    }

    #[test]
    fn test_insert_overwrites_same_key_only() {
        let mut tree = TagTree::new();
        tree.insert("a-b", "first");
        tree.insert("a-c", "other");
        tree.insert("a-b", "second");

        assert_eq!(tree.lookup("a-b"), Some("second"));
        assert_eq!(tree.lookup("a-c"), Some("other"));
    }

    #[test]
    fn test_group_and_value_namespaces_are_independent() {
        let mut tree = TagTree::new();
        tree.insert("a", "leaf");
        tree.insert("a-b", "nested");

        assert_eq!(tree.value("a").unwrap(), Some("leaf"));
        assert_eq!(tree.lookup("a-b"), Some("nested"));
        assert_eq!(tree.groups().len(), 1);
        assert_eq!(tree.values().len(), 1);
    }

    #[test]
    fn test_group_does_not_create() {
        let tree = TagTree::new();
        assert_eq!(tree.group("missing").unwrap(), None);
        assert!(tree.is_empty());
    }

    #[test]
    fn test_ensure_group_is_idempotent() {
        let mut tree = TagTree::new();
        let first: *const TagTree = tree.ensure_group("x").unwrap();
        let second: *const TagTree = tree.ensure_group("x").unwrap();

        assert_eq!(first, second);
        assert_eq!(tree.groups().len(), 1);
    }

    #[test]
    fn test_hyphenated_names_are_rejected() {
        let mut tree = TagTree::new();
        tree.insert("a-b", "c");

        let err = DomainError::InvalidName("a-b".to_string());
        assert_eq!(tree.group("a-b"), Err(err.clone()));
        assert_eq!(tree.has_value("a-b"), Err(err.clone()));
        assert_eq!(tree.value("a-b"), Err(err.clone()));
        assert_eq!(tree.ensure_group("a-b").map(|_| ()), Err(err));
        assert_eq!(tree.groups().len(), 1);
    }

    #[test]
    fn test_entries_are_depth_first_values_before_groups() {
        let mut tree = TagTree::new();
        tree.insert("g-x", "1");
        tree.insert("top", "2");
        tree.insert("g-h-y", "3");
        tree.insert("g-z", "4");

        let entries = tree.entries();
        assert_eq!(
            entries,
            vec![
                ("top".to_string(), "2"),
                ("g-x".to_string(), "1"),
                ("g-z".to_string(), "4"),
                ("g-h-y".to_string(), "3"),
            ]
        );
    }

    #[test]
    fn test_to_tree_string() {
        let mut tree = TagTree::new();
        tree.insert("a", "b");
        tree.insert("g-c", "");

        let rendered = tree.to_tree_string("doc").to_string();
        assert!(rendered.starts_with("doc\n"));
        assert!(rendered.contains("a = \"b\""));
        assert!(rendered.contains("g\n"));
        assert!(rendered.contains("c = \"\""));
    }
}
