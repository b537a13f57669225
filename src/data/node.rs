//! Normalized data-tree nodes and the structural operations the stores use.

use crate::data::path::{DataTreePath, PathArgument};
use crate::data::value::Value;
use crate::error::RestconfError;
use crate::schema::QName;
use serde::{Serialize, Serializer};
use std::collections::{BTreeMap, BTreeSet};
use xxhash_rust::xxh3::xxh3_64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeBody {
    Leaf(Value),
    LeafSet(Vec<Value>),
    /// Containers, list entries, choices and augmentations.
    Container(BTreeMap<PathArgument, NormalizedNode>),
    /// Keyed list entries.
    Map(BTreeMap<PathArgument, NormalizedNode>),
    Anyxml(String),
}

impl Serialize for NodeBody {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        match self {
            NodeBody::Leaf(value) => value.serialize(s),
            NodeBody::LeafSet(values) => s.collect_seq(values),
            NodeBody::Container(children) | NodeBody::Map(children) => {
                s.collect_seq(children.values())
            }
            NodeBody::Anyxml(body) => s.serialize_str(body),
        }
    }
}

/// One schema-typed node of a data tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizedNode {
    pub identifier: PathArgument,
    pub body: NodeBody,
}

impl NormalizedNode {
    pub fn leaf(qname: QName, value: impl Into<Value>) -> Self {
        Self {
            identifier: PathArgument::Node(qname),
            body: NodeBody::Leaf(value.into()),
        }
    }

    pub fn leaf_set(qname: QName, values: Vec<Value>) -> Self {
        Self {
            identifier: PathArgument::Node(qname),
            body: NodeBody::LeafSet(values),
        }
    }

    pub fn container(qname: QName, children: Vec<NormalizedNode>) -> Self {
        Self {
            identifier: PathArgument::Node(qname),
            body: NodeBody::Container(index(children)),
        }
    }

    /// The empty data root every store starts with.
    pub fn data_root() -> Self {
        Self::container(QName::data_root(), Vec::new())
    }

    /// A list entry. Key leaves are added as children when missing.
    pub fn map_entry(qname: QName, keys: Vec<(QName, Value)>, children: Vec<NormalizedNode>) -> Self {
        let mut body = index(children);
        for (key, value) in &keys {
            let leaf = NormalizedNode::leaf(key.clone(), value.clone());
            body.entry(leaf.identifier.clone()).or_insert(leaf);
        }
        Self {
            identifier: PathArgument::with_keys(qname, keys),
            body: NodeBody::Container(body),
        }
    }

    pub fn map(qname: QName, entries: Vec<NormalizedNode>) -> Self {
        Self {
            identifier: PathArgument::Node(qname),
            body: NodeBody::Map(index(entries)),
        }
    }

    pub fn choice(qname: QName, children: Vec<NormalizedNode>) -> Self {
        Self::container(qname, children)
    }

    pub fn augmentation(children: Vec<NormalizedNode>) -> Self {
        let names: BTreeSet<QName> = children
            .iter()
            .filter_map(|child| child.identifier.qname().cloned())
            .collect();
        Self {
            identifier: PathArgument::Augmentation(names),
            body: NodeBody::Container(index(children)),
        }
    }

    pub fn anyxml(qname: QName, body: impl Into<String>) -> Self {
        Self {
            identifier: PathArgument::Node(qname),
            body: NodeBody::Anyxml(body.into()),
        }
    }

    pub fn children(&self) -> Option<&BTreeMap<PathArgument, NormalizedNode>> {
        match &self.body {
            NodeBody::Container(children) | NodeBody::Map(children) => Some(children),
            _ => None,
        }
    }

    fn children_mut(&mut self) -> Option<&mut BTreeMap<PathArgument, NormalizedNode>> {
        match &mut self.body {
            NodeBody::Container(children) | NodeBody::Map(children) => Some(children),
            _ => None,
        }
    }

    pub fn child(&self, arg: &PathArgument) -> Option<&NormalizedNode> {
        self.children()?.get(arg)
    }

    pub fn is_map(&self) -> bool {
        matches!(self.body, NodeBody::Map(_))
    }

    /// The only entry of a map node, if it has exactly one.
    pub fn single_map_entry(&self) -> Option<&NormalizedNode> {
        match &self.body {
            NodeBody::Map(entries) if entries.len() == 1 => entries.values().next(),
            _ => None,
        }
    }

    pub fn find(&self, path: &DataTreePath) -> Option<&NormalizedNode> {
        path.args()
            .iter()
            .try_fold(self, |node, arg| node.child(arg))
    }

    /// Writes `node` at `path`, replacing what was there and creating any
    /// missing structural parents.
    pub fn put(&mut self, path: &DataTreePath, node: NormalizedNode) -> Result<(), RestconfError> {
        let Some((last, parents)) = path.args().split_last() else {
            return self.replace_root(node);
        };
        if &node.identifier != last {
            return Err(RestconfError::invalid_value(format!(
                "node identifier {} does not match path argument {}",
                node.identifier, last
            )));
        }
        let parent = self.ensure_parents(parents, last)?;
        let children = parent.children_mut().ok_or_else(|| not_a_parent(path))?;
        children.insert(last.clone(), node);
        Ok(())
    }

    /// Merges `node` into whatever exists at `path`.
    pub fn merge(&mut self, path: &DataTreePath, node: NormalizedNode) -> Result<(), RestconfError> {
        let Some((last, parents)) = path.args().split_last() else {
            return self.merge_into(node);
        };
        if &node.identifier != last {
            return Err(RestconfError::invalid_value(format!(
                "node identifier {} does not match path argument {}",
                node.identifier, last
            )));
        }
        let parent = self.ensure_parents(parents, last)?;
        let children = parent.children_mut().ok_or_else(|| not_a_parent(path))?;
        match children.get_mut(last) {
            Some(existing) => existing.merge_into(node),
            None => {
                children.insert(last.clone(), node);
                Ok(())
            }
        }
    }

    /// Removes and returns the node at `path`. Removing the root clears it.
    ///
    /// A list or augmentation node left without children goes as well.
    pub fn remove(&mut self, path: &DataTreePath) -> Option<NormalizedNode> {
        if path.is_root() {
            let old = self.clone();
            if let Some(children) = self.children_mut() {
                children.clear();
            }
            return Some(old);
        }
        self.remove_below(path.args())
    }

    fn remove_below(&mut self, args: &[PathArgument]) -> Option<NormalizedNode> {
        let (first, rest) = args.split_first()?;
        let children = self.children_mut()?;
        if rest.is_empty() {
            return children.remove(first);
        }
        let child = children.get_mut(first)?;
        let removed = child.remove_below(rest)?;
        if child.is_empty_grouping() {
            children.remove(first);
        }
        Some(removed)
    }

    fn is_empty_grouping(&self) -> bool {
        match &self.body {
            NodeBody::Map(entries) => entries.is_empty(),
            NodeBody::Container(children) => {
                children.is_empty() && matches!(self.identifier, PathArgument::Augmentation(_))
            }
            _ => false,
        }
    }

    /// xxh3 of the canonical JSON form; stable for equal trees.
    pub fn entity_tag(&self) -> String {
        let bytes = serde_json::to_vec(self).unwrap_or_default();
        format!("{:016x}", xxh3_64(&bytes))
    }

    fn replace_root(&mut self, node: NormalizedNode) -> Result<(), RestconfError> {
        match node.body {
            NodeBody::Container(_) => {
                self.body = node.body;
                Ok(())
            }
            _ => Err(RestconfError::invalid_value(
                "only a container can replace the data root",
            )),
        }
    }

    fn merge_into(&mut self, node: NormalizedNode) -> Result<(), RestconfError> {
        match (&mut self.body, node.body) {
            (NodeBody::Container(mine), NodeBody::Container(theirs))
            | (NodeBody::Map(mine), NodeBody::Map(theirs)) => {
                for (arg, child) in theirs {
                    match mine.get_mut(&arg) {
                        Some(existing) => existing.merge_into(child)?,
                        None => {
                            mine.insert(arg, child);
                        }
                    }
                }
                Ok(())
            }
            (body, other) => {
                *body = other;
                Ok(())
            }
        }
    }

    fn ensure_parents(
        &mut self,
        parents: &[PathArgument],
        last: &PathArgument,
    ) -> Result<&mut NormalizedNode, RestconfError> {
        let mut current = self;
        for (idx, arg) in parents.iter().enumerate() {
            let next = parents.get(idx + 1).unwrap_or(last);
            let children = current.children_mut().ok_or_else(|| {
                RestconfError::invalid_value(format!("{arg} has no parent that can hold children"))
            })?;
            current = children
                .entry(arg.clone())
                .or_insert_with(|| structural_parent(arg, next));
        }
        Ok(current)
    }
}

/// Empty node of the right shape to hold `next` below `arg`.
fn structural_parent(arg: &PathArgument, next: &PathArgument) -> NormalizedNode {
    match arg {
        PathArgument::NodeWithKeys { qname, keys } => NormalizedNode::map_entry(
            qname.clone(),
            keys.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
            Vec::new(),
        ),
        PathArgument::Node(qname) if next.is_keyed() && next.qname() == Some(qname) => {
            NormalizedNode::map(qname.clone(), Vec::new())
        }
        PathArgument::Node(qname) => NormalizedNode::container(qname.clone(), Vec::new()),
        PathArgument::Augmentation(names) => NormalizedNode {
            identifier: PathArgument::Augmentation(names.clone()),
            body: NodeBody::Container(BTreeMap::new()),
        },
    }
}

fn not_a_parent(path: &DataTreePath) -> RestconfError {
    RestconfError::invalid_value(format!("parent of {path} cannot hold children"))
}

fn index(children: Vec<NormalizedNode>) -> BTreeMap<PathArgument, NormalizedNode> {
    children
        .into_iter()
        .map(|child| (child.identifier.clone(), child))
        .collect()
}
