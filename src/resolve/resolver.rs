//! URI path resolution against a schema snapshot.
//!
//! Segments are consumed left to right. Each step either hands off to a
//! mount point, matches a schema child (qualified or not), or consumes list
//! keys. The accumulated URI-shaped arguments are normalized at the end and
//! before every mount lookup.

use crate::codec::{url_decode, DefaultCodec, IdentifierCodec};
use crate::data::{PathArgument, Value};
use crate::error::RestconfError;
use crate::mount::{MountPoint, MountRegistry};
use crate::resolve::context::{ResolvedContext, SchemaTarget};
use crate::resolve::normalize::DataNormalizer;
use crate::resolve::segment::{split_segments, PathSegment, NULL_VALUE};
use crate::schema::{QName, SchemaContext, SchemaNode, SchemaNodeKind};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::debug;

enum Matched {
    Data(Arc<SchemaNode>),
    Rpc(Arc<SchemaNode>),
}

#[derive(Clone)]
pub struct PathResolver {
    schema: Arc<SchemaContext>,
    mounts: Option<Arc<dyn MountRegistry>>,
    codec: Arc<dyn IdentifierCodec>,
}

impl PathResolver {
    pub fn new(schema: Arc<SchemaContext>) -> Self {
        Self {
            schema,
            mounts: None,
            codec: Arc::new(DefaultCodec),
        }
    }

    pub fn with_mounts(mut self, registry: Arc<dyn MountRegistry>) -> Self {
        self.mounts = Some(registry);
        self
    }

    pub fn with_codec(mut self, codec: Arc<dyn IdentifierCodec>) -> Self {
        self.codec = codec;
        self
    }

    pub fn schema(&self) -> &Arc<SchemaContext> {
        &self.schema
    }

    pub fn codec(&self) -> &Arc<dyn IdentifierCodec> {
        &self.codec
    }

    pub fn resolve(&self, uri: &str) -> Result<ResolvedContext, RestconfError> {
        self.resolve_segments(uri, false)
    }

    /// Like [`resolve`](Self::resolve), but stops as soon as a mount point has
    /// been reached.
    pub fn resolve_mount_point(&self, uri: &str) -> Result<ResolvedContext, RestconfError> {
        self.resolve_segments(uri, true)
    }

    /// Resolves a Yang Patch edit target against the URI the patch was sent to.
    /// A target of `/` denotes the URI itself.
    pub fn resolve_relative(&self, base: &str, target: &str) -> Result<ResolvedContext, RestconfError> {
        let target = target.trim_start_matches('/');
        if target.is_empty() {
            return self.resolve(base);
        }
        let base = base.trim_end_matches('/');
        self.resolve(&format!("{base}/{target}"))
    }

    fn resolve_segments(&self, uri: &str, mount_only: bool) -> Result<ResolvedContext, RestconfError> {
        let mut segments = split_segments(uri).into_iter();
        let mut schema = Arc::clone(&self.schema);
        let mut mount: Option<Arc<MountPoint>> = None;
        let mut parent: Option<Arc<SchemaNode>> = None;
        let mut legacy: Vec<PathArgument> = Vec::new();
        let mut target = SchemaTarget::Root;

        while let Some(raw) = segments.next() {
            if raw.is_empty() {
                continue;
            }
            if let SchemaTarget::Node(node) = &target {
                if !node.is_list_or_container() {
                    return Err(RestconfError::invalid_uri(format!(
                        "URI has bad format. \"{raw}\" follows {} \"{}\", which has no children.",
                        node.kind.name(),
                        node.qname.local_name
                    )));
                }
            }

            let segment = PathSegment::parse(raw)?;
            if segment.is_mount() {
                let point = self.enter_mount(&schema, &legacy, mount.is_some())?;
                schema = Arc::clone(point.schema());
                mount = Some(point);
                parent = None;
                legacy.clear();
                target = SchemaTarget::Root;
                if mount_only {
                    return Ok(ResolvedContext::root(schema, mount));
                }
                continue;
            }

            let matched = match &parent {
                None => {
                    let Some(module_name) = segment.module.as_deref() else {
                        let message = if mount.is_some() {
                            "First node after mount point in URI has to be in format \"moduleName:nodeName\"."
                        } else {
                            "First node in URI has to be in format \"moduleName:nodeName\"."
                        };
                        return Err(RestconfError::invalid_uri(message));
                    };
                    let module = find_module(&schema, module_name)?;
                    find_qualified(&schema, &module, &module, &segment)?
                }
                Some(current) => match segment.module.as_deref() {
                    Some(module_name) => {
                        let module = find_module(&schema, module_name)?;
                        find_qualified(&schema, current, &module, &segment)?
                    }
                    None => find_unqualified(&schema, current, &segment)?,
                },
            };

            let node = match matched {
                Matched::Rpc(rpc) => {
                    if segments.any(|rest| !rest.is_empty()) {
                        return Err(RestconfError::invalid_uri(format!(
                            "URI has bad format. Operation \"{}\" has to be the last node in URI.",
                            rpc.qname.local_name
                        )));
                    }
                    let path = vec![PathArgument::Node(rpc.qname.clone())].into();
                    return Ok(ResolvedContext {
                        path,
                        target: SchemaTarget::Rpc(rpc),
                        mount,
                        schema,
                    });
                }
                Matched::Data(node) => node,
            };

            match &node.kind {
                SchemaNodeKind::List { .. } => {
                    let keys = self.consume_keys(&schema, &node, &mut segments)?;
                    legacy.push(PathArgument::NodeWithKeys {
                        qname: node.qname.clone(),
                        keys,
                    });
                }
                SchemaNodeKind::Container { .. }
                | SchemaNodeKind::Leaf { .. }
                | SchemaNodeKind::LeafList { .. }
                | SchemaNodeKind::Anyxml => {
                    legacy.push(PathArgument::Node(node.qname.clone()));
                }
                other => {
                    return Err(RestconfError::invalid_uri(format!(
                        "URI has bad format. Node \"{}\" is a {} and cannot appear in URI.",
                        node.qname.local_name,
                        other.name()
                    )))
                }
            }
            parent = Some(Arc::clone(&node));
            target = SchemaTarget::Node(node);
        }

        let path = DataNormalizer::new(&schema).to_normalized(&legacy)?;
        Ok(ResolvedContext {
            path,
            target,
            mount,
            schema,
        })
    }

    fn enter_mount(
        &self,
        schema: &SchemaContext,
        legacy: &[PathArgument],
        already_mounted: bool,
    ) -> Result<Arc<MountPoint>, RestconfError> {
        if already_mounted {
            return Err(RestconfError::not_supported(
                "Restconf supports just one mount point in URI.",
            ));
        }
        let registry = self.mounts.as_ref().ok_or_else(|| {
            RestconfError::not_supported("Mount points are not available in this context.")
        })?;
        let mount_path = DataNormalizer::new(schema).to_normalized(legacy)?;
        match registry.lookup(&mount_path) {
            Some(point) => {
                debug!(path = %mount_path, "continuing resolution inside mount point");
                Ok(point)
            }
            None => {
                debug!(path = %mount_path, "mount point does not exist");
                Err(RestconfError::data_missing("Mount point does not exist."))
            }
        }
    }

    /// Reads one segment per declared key, in declaration order.
    fn consume_keys<'s, I>(
        &self,
        schema: &SchemaContext,
        list: &SchemaNode,
        segments: &mut I,
    ) -> Result<BTreeMap<QName, Value>, RestconfError>
    where
        I: Iterator<Item = &'s str>,
    {
        let mut keys = BTreeMap::new();
        for key in schema.key_definition(list) {
            let raw = segments.next().ok_or_else(|| {
                RestconfError::data_missing(format!(
                    "Missing key for list \"{}\".",
                    list.qname.local_name
                ))
            })?;
            if raw == NULL_VALUE {
                return Err(RestconfError::invalid_value(format!(
                    "URI has bad format. List \"{}\" cannot contain \"null\" value as a key.",
                    list.qname.local_name
                )));
            }
            let decoded = url_decode(raw)?;
            let value = self.decode_key(schema, list, key, &decoded)?;
            keys.insert(key.clone(), value);
        }
        Ok(keys)
    }

    fn decode_key(
        &self,
        schema: &SchemaContext,
        list: &SchemaNode,
        key: &QName,
        input: &str,
    ) -> Result<Value, RestconfError> {
        let leaf = list.data_child(key).ok_or_else(|| {
            RestconfError::unknown_element(format!(
                "Key \"{}\" of list \"{}\" has no leaf definition.",
                key.local_name, list.qname.local_name
            ))
        })?;
        let declared = leaf.type_def().ok_or_else(|| {
            RestconfError::invalid_value(format!("Key \"{}\" is not a leaf.", key.local_name))
        })?;
        let resolved = schema.resolve_leaf_type(declared).ok_or_else(|| {
            RestconfError::invalid_value(format!(
                "Type of key \"{}\" cannot be resolved.",
                key.local_name
            ))
        })?;
        self.codec.decode(&resolved, input, schema).ok_or_else(|| {
            let mut message = format!("{input} from URI can't be resolved. ");
            if resolved.is_identityref() {
                message.push_str(
                    "For key which is of type identityref it should be in format module_name:identity_name.",
                );
            }
            RestconfError::invalid_value(message.trim_end().to_string())
        })
    }
}

fn find_module(schema: &SchemaContext, name: &str) -> Result<Arc<SchemaNode>, RestconfError> {
    schema.find_module(name, None).ok_or_else(|| {
        RestconfError::unknown_element(format!("\"{name}\" module does not exist."))
    })
}

fn find_qualified(
    schema: &SchemaContext,
    parent: &SchemaNode,
    module: &SchemaNode,
    segment: &PathSegment,
) -> Result<Matched, RestconfError> {
    let name = &segment.local_name;
    if let Some(node) =
        schema.find_instance_child_by_name_and_namespace(parent, name, module.qname.namespace())
    {
        return Ok(Matched::Data(node));
    }
    if parent.is_module() {
        if let Some(rpc) = schema.find_rpc(module, name) {
            return Ok(Matched::Rpc(rpc));
        }
    }
    Err(RestconfError::invalid_uri(format!(
        "URI has bad format. Possible reasons:\n 1. \"{name}\" was not found in parent data node.\n 2. \"{name}\" is behind mount point. Then it should be in format \"/yang-ext:mount/{name}\"."
    )))
}

fn find_unqualified(
    schema: &SchemaContext,
    parent: &SchemaNode,
    segment: &PathSegment,
) -> Result<Matched, RestconfError> {
    let name = &segment.local_name;
    let candidates = schema.find_instance_children_by_name(parent, name);
    let namespaces: BTreeSet<&str> = candidates
        .iter()
        .map(|node| node.qname.namespace())
        .collect();
    if namespaces.len() > 1 {
        let listed: Vec<&str> = namespaces.into_iter().collect();
        return Err(RestconfError::invalid_uri(format!(
            "URI has bad format. Node \"{name}\" is added as augment from more than one module. Therefore the node must have module name and it has to be in format \"moduleName:nodeName\".\nThe node is added as augment from modules with namespaces:\n{}",
            listed.join("\n")
        )));
    }
    candidates
        .into_iter()
        .next()
        .map(Matched::Data)
        .ok_or_else(|| {
            RestconfError::unknown_element(format!(
                "URI has bad format. \"{name}\" was not found in parent data node."
            ))
        })
}
