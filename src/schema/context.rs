//! Read-only index over a compiled schema model.
//!
//! A [`SchemaContext`] is an immutable snapshot. Reloading the model builds a
//! new snapshot and swaps it into a [`SchemaContextHandle`]; every resolution
//! runs against the snapshot it started with.

use crate::schema::node::{SchemaNode, SchemaNodeKind, TypeDefinition};
use crate::schema::qname::QName;
use parking_lot::RwLock;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);

/// Type resolution follows at most this many derived/leafref hops.
const MAX_TYPE_HOPS: usize = 32;

#[derive(Debug)]
pub struct SchemaContext {
    generation: u64,
    modules: Vec<Arc<SchemaNode>>,
}

/// A matched node plus the transparent nodes (choice, case, augmentation)
/// crossed to reach it, outermost first.
#[derive(Debug, Clone)]
pub struct SchemaRoute {
    pub target: Arc<SchemaNode>,
    pub via: Vec<Arc<SchemaNode>>,
}

impl SchemaContext {
    pub fn new(modules: Vec<SchemaNode>) -> Self {
        Self {
            generation: NEXT_GENERATION.fetch_add(1, Ordering::Relaxed),
            modules: modules
                .into_iter()
                .filter(SchemaNode::is_module)
                .map(Arc::new)
                .collect(),
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn modules(&self) -> &[Arc<SchemaNode>] {
        &self.modules
    }

    /// Module by name. Without a revision the latest one wins.
    pub fn find_module(&self, name: &str, revision: Option<&str>) -> Option<Arc<SchemaNode>> {
        let candidates = self
            .modules
            .iter()
            .filter(|module| module.module_name() == Some(name));
        match revision {
            Some(rev) => candidates
                .filter(|module| module.qname.module.revision.as_deref() == Some(rev))
                .cloned()
                .next(),
            None => candidates
                .max_by(|a, b| a.qname.module.revision.cmp(&b.qname.module.revision))
                .cloned(),
        }
    }

    pub fn find_module_by_namespace(&self, namespace: &str) -> Option<Arc<SchemaNode>> {
        self.modules
            .iter()
            .filter(|module| module.qname.namespace() == namespace)
            .max_by(|a, b| a.qname.module.revision.cmp(&b.qname.module.revision))
            .cloned()
    }

    /// Module a qualified name belongs to.
    pub fn module_of(&self, qname: &QName) -> Option<Arc<SchemaNode>> {
        self.modules
            .iter()
            .find(|module| module.qname.module == qname.module)
            .cloned()
            .or_else(|| self.find_module_by_namespace(qname.namespace()))
    }

    /// Direct child of `parent` by local name, optionally restricted to a namespace.
    pub fn find_child(
        &self,
        parent: &SchemaNode,
        local_name: &str,
        namespace: Option<&str>,
    ) -> Option<Arc<SchemaNode>> {
        parent
            .children()
            .iter()
            .find(|child| {
                child.qname.local_name == local_name
                    && namespace.map_or(true, |ns| child.qname.namespace() == ns)
            })
            .cloned()
    }

    pub fn key_definition<'a>(&self, list: &'a SchemaNode) -> &'a [QName] {
        list.keys()
    }

    pub fn find_rpc(&self, module: &SchemaNode, local_name: &str) -> Option<Arc<SchemaNode>> {
        module
            .rpcs()
            .iter()
            .find(|rpc| rpc.qname.local_name == local_name)
            .cloned()
    }

    /// Every instantiated descendant reachable from `parent` through choices,
    /// cases and augmentations whose local name matches. Direct children come
    /// first.
    pub fn find_instance_children_by_name(
        &self,
        parent: &SchemaNode,
        local_name: &str,
    ) -> Vec<Arc<SchemaNode>> {
        let mut found = Vec::new();
        let mut frontier: VecDeque<Arc<SchemaNode>> = parent.children().iter().cloned().collect();
        while let Some(node) = frontier.pop_front() {
            if node.is_instantiated() && node.qname.local_name == local_name {
                found.push(node);
            } else if node.is_transparent() {
                frontier.extend(node.children().iter().cloned());
            }
        }
        found
    }

    pub fn find_instance_child_by_name_and_namespace(
        &self,
        parent: &SchemaNode,
        local_name: &str,
        namespace: &str,
    ) -> Option<Arc<SchemaNode>> {
        self.find_instance_children_by_name(parent, local_name)
            .into_iter()
            .find(|node| node.qname.namespace() == namespace)
    }

    /// Locates the node named `qname` below `parent`, recording every
    /// transparent node on the way. Choices themselves can be targets.
    pub fn find_route(&self, parent: &SchemaNode, qname: &QName) -> Option<SchemaRoute> {
        let mut frontier: VecDeque<(Arc<SchemaNode>, Vec<Arc<SchemaNode>>)> = parent
            .children()
            .iter()
            .map(|child| (Arc::clone(child), Vec::new()))
            .collect();
        while let Some((node, via)) = frontier.pop_front() {
            let addressable = !matches!(
                node.kind,
                SchemaNodeKind::Case { .. } | SchemaNodeKind::Augmentation { .. }
            );
            if addressable && &node.qname == qname {
                return Some(SchemaRoute { target: node, via });
            }
            if node.is_transparent() {
                for child in node.children() {
                    let mut path = via.clone();
                    path.push(Arc::clone(&node));
                    frontier.push_back((Arc::clone(child), path));
                }
            }
        }
        None
    }

    /// Node at an absolute schema path, starting at the module root.
    pub fn find_schema_node(&self, path: &[QName]) -> Option<Arc<SchemaNode>> {
        let (first, rest) = path.split_first()?;
        let module = self.module_of(first)?;
        let mut current = self.find_route(&module, first)?.target;
        for qname in rest {
            current = self.find_route(&current, qname)?.target;
        }
        Some(current)
    }

    /// Follows derived types and leafrefs down to a concrete base type.
    pub fn resolve_leaf_type(&self, type_def: &TypeDefinition) -> Option<TypeDefinition> {
        let mut current = type_def.clone();
        for _ in 0..MAX_TYPE_HOPS {
            current = match current {
                TypeDefinition::Derived { base, .. } => *base,
                TypeDefinition::Leafref { path } => {
                    let target = self.find_schema_node(&path)?;
                    target.type_def()?.clone()
                }
                resolved => return Some(resolved),
            };
        }
        None
    }
}

/// Swappable reference to the current schema snapshot.
#[derive(Debug, Clone)]
pub struct SchemaContextHandle {
    current: Arc<RwLock<Arc<SchemaContext>>>,
}

impl SchemaContextHandle {
    pub fn new(context: SchemaContext) -> Self {
        Self {
            current: Arc::new(RwLock::new(Arc::new(context))),
        }
    }

    pub fn snapshot(&self) -> Arc<SchemaContext> {
        Arc::clone(&self.current.read())
    }

    /// Publishes a new snapshot. Resolutions already running keep the old one.
    pub fn update(&self, context: SchemaContext) {
        let next = Arc::new(context);
        tracing::debug!(generation = next.generation(), "schema context updated");
        *self.current.write() = next;
    }
}
