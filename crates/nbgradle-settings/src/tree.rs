use std::fmt;
use std::sync::{Arc, OnceLock};

use indexmap::IndexMap;

use crate::{ConfigKey, ConfigPath};

/// Immutable node of a profile document: an optional scalar value plus named children.
///
/// Trees share their storage, so cloning is cheap. Empty children are never stored, which keeps
/// structural equality meaningful: a missing node and an empty node compare equal.
#[derive(Clone)]
pub struct ConfigTree {
    node: Arc<TreeNode>,
}

#[derive(Default, PartialEq, Eq)]
struct TreeNode {
    value: Option<String>,
    children: IndexMap<ConfigKey, ConfigTree>,
}

impl ConfigTree {
    pub fn empty() -> ConfigTree {
        static EMPTY: OnceLock<ConfigTree> = OnceLock::new();
        EMPTY
            .get_or_init(|| ConfigTree {
                node: Arc::new(TreeNode::default()),
            })
            .clone()
    }

    pub fn single_value(value: impl Into<String>) -> ConfigTree {
        ConfigTree {
            node: Arc::new(TreeNode {
                value: Some(value.into()),
                children: IndexMap::new(),
            }),
        }
    }

    pub fn value(&self) -> Option<&str> {
        self.node.value.as_deref()
    }

    pub fn value_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.value().unwrap_or(default)
    }

    /// Returns the child named `key`, or an empty tree when there is none.
    pub fn child_tree(&self, key: &str) -> ConfigTree {
        self.node
            .children
            .get(key)
            .cloned()
            .unwrap_or_else(ConfigTree::empty)
    }

    /// Children in document order.
    pub fn child_trees(&self) -> impl Iterator<Item = (&ConfigKey, &ConfigTree)> + '_ {
        self.node.children.iter()
    }

    pub fn child_count(&self) -> usize {
        self.node.children.len()
    }

    /// Extracts the subtree at `path`; a path that does not exist yields an empty tree.
    pub fn deep_sub_tree(&self, path: &ConfigPath) -> ConfigTree {
        let mut current = self.clone();
        for key in path.keys() {
            current = match current.node.children.get(key.as_str()) {
                Some(child) => child.clone(),
                None => return ConfigTree::empty(),
            };
        }
        current
    }

    pub fn is_empty(&self) -> bool {
        self.node.value.is_none() && self.node.children.is_empty()
    }

    /// Whether this tree or any of its descendants holds a value.
    pub fn has_values(&self) -> bool {
        self.node.value.is_some() || self.node.children.values().any(ConfigTree::has_values)
    }
}

impl Default for ConfigTree {
    fn default() -> Self {
        ConfigTree::empty()
    }
}

impl PartialEq for ConfigTree {
    fn eq(&self, other: &Self) -> bool {
        // Child order is not significant: `IndexMap` equality compares as a map.
        Arc::ptr_eq(&self.node, &other.node) || *self.node == *other.node
    }
}

impl Eq for ConfigTree {}

impl fmt::Debug for ConfigTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.node.value, self.node.children.is_empty()) {
            (None, true) => f.write_str("{}"),
            (Some(value), true) => fmt::Debug::fmt(value, f),
            (value, false) => {
                let mut map = f.debug_map();
                if let Some(value) = value {
                    map.entry(&"#value", value);
                }
                map.entries(self.node.children.iter()).finish()
            }
        }
    }
}

#[derive(Clone, Debug)]
enum ChildNode {
    Tree(ConfigTree),
    Builder(ConfigTreeBuilder),
}

impl ChildNode {
    fn as_builder(&mut self) -> &mut ConfigTreeBuilder {
        if let ChildNode::Tree(tree) = self {
            let thawed = ConfigTreeBuilder::from(tree.clone());
            *self = ChildNode::Builder(thawed);
        }
        match self {
            ChildNode::Builder(builder) => builder,
            ChildNode::Tree(_) => unreachable!("tree children are thawed into builders above"),
        }
    }

    fn create(&self) -> ConfigTree {
        match self {
            ChildNode::Tree(tree) => tree.clone(),
            ChildNode::Builder(builder) => builder.create(),
        }
    }
}

/// Mutable staging area for a [`ConfigTree`].
///
/// Children are kept either as finished trees or as nested builders; finished trees are only
/// converted back into builders when something below them is edited.
#[derive(Clone, Debug, Default)]
pub struct ConfigTreeBuilder {
    value: Option<String>,
    children: IndexMap<ConfigKey, ChildNode>,
}

impl ConfigTreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    pub fn set_value(&mut self, value: Option<String>) {
        self.value = value;
    }

    /// Returns the builder of the child named `key`, creating it when missing.
    pub fn sub_builder(&mut self, key: ConfigKey) -> &mut ConfigTreeBuilder {
        self.children
            .entry(key)
            .or_insert_with(|| ChildNode::Builder(ConfigTreeBuilder::new()))
            .as_builder()
    }

    /// Returns the builder at `path`, creating every missing node along the way.
    pub fn deep_sub_builder(&mut self, path: &ConfigPath) -> &mut ConfigTreeBuilder {
        path.keys()
            .iter()
            .fold(self, |builder, key| builder.sub_builder(key.clone()))
    }

    /// Replaces the child named `key`. Setting an empty tree removes the child.
    pub fn set_child_tree(&mut self, key: ConfigKey, tree: ConfigTree) {
        if tree.is_empty() {
            self.children.shift_remove(key.as_str());
        } else {
            self.children.insert(key, ChildNode::Tree(tree));
        }
    }

    /// Replaces the subtree at `path`, creating intermediate nodes as needed. Replacing the root
    /// path replaces the whole content of this builder.
    pub fn set_deep_child_tree(&mut self, path: &ConfigPath, tree: ConfigTree) {
        match path.keys().split_last() {
            None => *self = ConfigTreeBuilder::from(tree),
            Some((last, parents)) => {
                let parent = parents
                    .iter()
                    .fold(self, |builder, key| builder.sub_builder(key.clone()));
                parent.set_child_tree(last.clone(), tree);
            }
        }
    }

    /// Snapshot of the subtree at `path`. Unlike [`Self::deep_sub_builder`] this never creates
    /// nodes; a missing path yields an empty tree.
    pub fn deep_sub_tree(&self, path: &ConfigPath) -> ConfigTree {
        let mut current = self;
        for (index, key) in path.keys().iter().enumerate() {
            match current.children.get(key.as_str()) {
                None => return ConfigTree::empty(),
                Some(ChildNode::Builder(builder)) => current = builder,
                Some(ChildNode::Tree(tree)) => {
                    return tree.deep_sub_tree(&path.strip_prefix(index + 1));
                }
            }
        }
        current.create()
    }

    /// Freezes every nested builder into an immutable tree so later edits of this builder cannot
    /// leak into trees created from it.
    pub fn detach_sub_tree_builders(&mut self) {
        self.children.retain(|_, child| {
            if let ChildNode::Builder(builder) = child {
                let frozen = builder.create();
                *child = ChildNode::Tree(frozen);
            }
            !matches!(child, ChildNode::Tree(tree) if tree.is_empty())
        });
    }

    pub fn create(&self) -> ConfigTree {
        let children: IndexMap<ConfigKey, ConfigTree> = self
            .children
            .iter()
            .map(|(key, child)| (key.clone(), child.create()))
            .filter(|(_, tree)| !tree.is_empty())
            .collect();

        if self.value.is_none() && children.is_empty() {
            return ConfigTree::empty();
        }

        ConfigTree {
            node: Arc::new(TreeNode {
                value: self.value.clone(),
                children,
            }),
        }
    }
}

impl From<ConfigTree> for ConfigTreeBuilder {
    fn from(tree: ConfigTree) -> Self {
        Self {
            value: tree.node.value.clone(),
            children: tree
                .node
                .children
                .iter()
                .map(|(key, child)| (key.clone(), ChildNode::Tree(child.clone())))
                .collect(),
        }
    }
}
