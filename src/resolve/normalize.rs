use crate::codec::{url_encode, IdentifierCodec};
use crate::data::{DataTreePath, PathArgument};
use crate::error::RestconfError;
use crate::schema::{QName, SchemaContext, SchemaNode, SchemaNodeKind};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Converts between URI-shaped paths (one argument per URI node) and
/// normalized paths that also carry choice, augmentation and list nodes.
pub struct DataNormalizer<'a> {
    schema: &'a SchemaContext,
}

impl<'a> DataNormalizer<'a> {
    pub fn new(schema: &'a SchemaContext) -> Self {
        Self { schema }
    }

    fn parent_or_module(
        &self,
        current: Option<&Arc<SchemaNode>>,
        qname: &QName,
    ) -> Result<Arc<SchemaNode>, RestconfError> {
        match current {
            Some(node) => Ok(Arc::clone(node)),
            None => self.schema.module_of(qname).ok_or_else(|| {
                RestconfError::unknown_element(format!(
                    "no module with namespace \"{}\" is known",
                    qname.namespace()
                ))
            }),
        }
    }

    pub fn to_normalized(&self, legacy: &[PathArgument]) -> Result<DataTreePath, RestconfError> {
        let mut args = Vec::with_capacity(legacy.len() * 2);
        let mut current: Option<Arc<SchemaNode>> = None;
        for arg in legacy {
            let qname = arg.qname().ok_or_else(|| {
                RestconfError::invalid_value("augmentation markers are added by normalization")
            })?;
            let (steps, target) = self.child_steps(current.as_ref(), qname)?;
            args.extend(steps);
            args.push(arg.clone());
            current = Some(target);
        }
        Ok(DataTreePath::new(args))
    }

    /// Arguments between `parent` (the module root when `None`) and its data
    /// child `qname`: one per choice and augmentation on the way, then the
    /// list node when the child is a list. Returns the child's schema node.
    pub fn child_steps(
        &self,
        parent: Option<&Arc<SchemaNode>>,
        qname: &QName,
    ) -> Result<(Vec<PathArgument>, Arc<SchemaNode>), RestconfError> {
        let parent = self.parent_or_module(parent, qname)?;
        let route = self.schema.find_route(&parent, qname).ok_or_else(|| {
            RestconfError::unknown_element(format!(
                "\"{}\" is not a child of \"{}\"",
                qname.local_name, parent.qname.local_name
            ))
        })?;
        let mut steps = Vec::new();
        for hop in &route.via {
            match &hop.kind {
                SchemaNodeKind::Choice { .. } => steps.push(PathArgument::Node(hop.qname.clone())),
                SchemaNodeKind::Augmentation { children } => {
                    steps.push(PathArgument::Augmentation(augmentation_names(children)))
                }
                _ => {}
            }
        }
        if route.target.is_list() {
            steps.push(PathArgument::Node(qname.clone()));
        }
        Ok((steps, route.target))
    }

    /// Renders a normalized path as `module:node/...`, with list keys as
    /// escaped segments in declaration order.
    pub fn to_restconf_uri(
        &self,
        path: &DataTreePath,
        codec: &dyn IdentifierCodec,
    ) -> Result<String, RestconfError> {
        let mut segments = Vec::new();
        let mut current: Option<Arc<SchemaNode>> = None;
        for arg in path.args() {
            let Some(qname) = arg.qname() else {
                continue;
            };
            let parent = self.parent_or_module(current.as_ref(), qname)?;
            let route = self.schema.find_route(&parent, qname).ok_or_else(|| {
                RestconfError::unknown_element(format!(
                    "\"{}\" is not a child of \"{}\"",
                    qname.local_name, parent.qname.local_name
                ))
            })?;
            let target = route.target;
            match (&target.kind, arg) {
                (SchemaNodeKind::Choice { .. }, _) => {
                    current = Some(target);
                    continue;
                }
                // the list node itself; the keyed entry that follows carries the segment
                (SchemaNodeKind::List { .. }, PathArgument::Node(_)) => continue,
                _ => {}
            }
            segments.push(self.qualified(&target)?);
            if let PathArgument::NodeWithKeys { keys, .. } = arg {
                for key in target.keys() {
                    let value = keys.get(key).ok_or_else(|| {
                        RestconfError::data_missing(format!(
                            "Missing key \"{}\" for list \"{}\".",
                            key.local_name, qname.local_name
                        ))
                    })?;
                    segments.push(url_encode(&codec.encode(value, self.schema)));
                }
            }
            current = Some(target);
        }
        Ok(segments.join("/"))
    }

    fn qualified(&self, node: &SchemaNode) -> Result<String, RestconfError> {
        let module = self.schema.module_of(&node.qname).ok_or_else(|| {
            RestconfError::unknown_element(format!(
                "no module with namespace \"{}\" is known",
                node.qname.namespace()
            ))
        })?;
        let name = module.module_name().unwrap_or_default();
        Ok(format!("{name}:{}", node.qname.local_name))
    }
}

fn augmentation_names(children: &[Arc<SchemaNode>]) -> BTreeSet<QName> {
    children.iter().map(|child| child.qname.clone()).collect()
}
