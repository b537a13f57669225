use crate::data::DataTreePath;
use crate::mount::MountPoint;
use crate::schema::{SchemaContext, SchemaNode};
use std::sync::Arc;

/// What a resolved URI points at in the schema.
#[derive(Debug, Clone)]
pub enum SchemaTarget {
    /// The data root of the effective schema.
    Root,
    Node(Arc<SchemaNode>),
    Rpc(Arc<SchemaNode>),
}

/// Outcome of resolving one URI. Edits and patches consume it as is.
#[derive(Debug, Clone)]
pub struct ResolvedContext {
    pub path: DataTreePath,
    pub target: SchemaTarget,
    pub mount: Option<Arc<MountPoint>>,
    /// Schema the path is expressed in; the mounted one when a mount was crossed.
    pub schema: Arc<SchemaContext>,
}

impl ResolvedContext {
    pub fn root(schema: Arc<SchemaContext>, mount: Option<Arc<MountPoint>>) -> Self {
        Self {
            path: DataTreePath::root(),
            target: SchemaTarget::Root,
            mount,
            schema,
        }
    }

    pub fn schema_node(&self) -> Option<&Arc<SchemaNode>> {
        match &self.target {
            SchemaTarget::Node(node) | SchemaTarget::Rpc(node) => Some(node),
            SchemaTarget::Root => None,
        }
    }

    pub fn is_rpc(&self) -> bool {
        matches!(self.target, SchemaTarget::Rpc(_))
    }

    pub fn is_mounted(&self) -> bool {
        self.mount.is_some()
    }
}
