//! Entry point tying URI resolution, backend selection and the edit and
//! patch engines together.

use crate::codec::{DefaultCodec, IdentifierCodec};
use crate::config::RestconfConfig;
use crate::data::{DataTreePath, NormalizedNode};
use crate::edit::{creation_target, read_data, ContentParam, Edit, EditOutcome, ReadResult};
use crate::error::RestconfError;
use crate::mount::MountRegistry;
use crate::patch::{apply_patch, PatchContext, PatchStatusContext};
use crate::resolve::{DataNormalizer, PathResolver, ResolvedContext, MOUNT_MODULE, MOUNT_NODE};
use crate::schema::SchemaContextHandle;
use crate::strategy::RestconfStrategy;
use crate::stream::{create_stream_name_from_uri, prepare_stream_location};
use std::sync::Arc;
use tracing::debug;

/// Result of a PUT or POST.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub struct EditResponse {
    pub outcome: EditOutcome,
    /// Set when the edit created data.
    pub location: Option<String>,
}

impl EditResponse {
    fn new(outcome: EditOutcome, location: String) -> Self {
        let location = matches!(outcome, EditOutcome::Created { .. }).then_some(location);
        Self { outcome, location }
    }

    pub fn status_code(&self) -> u16 {
        self.outcome.status_code()
    }
}

pub struct RestconfDataService {
    schema: SchemaContextHandle,
    mounts: Option<Arc<dyn MountRegistry>>,
    strategy: Arc<dyn RestconfStrategy>,
    codec: Arc<dyn IdentifierCodec>,
    config: RestconfConfig,
}

impl RestconfDataService {
    pub fn new(
        schema: SchemaContextHandle,
        strategy: Arc<dyn RestconfStrategy>,
        config: RestconfConfig,
    ) -> Self {
        Self {
            schema,
            mounts: None,
            strategy,
            codec: Arc::new(DefaultCodec),
            config,
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

    pub fn config(&self) -> &RestconfConfig {
        &self.config
    }

    /// Resolver bound to the current schema snapshot.
    pub fn resolver(&self) -> PathResolver {
        let mut resolver =
            PathResolver::new(self.schema.snapshot()).with_codec(Arc::clone(&self.codec));
        if let Some(mounts) = &self.mounts {
            resolver = resolver.with_mounts(Arc::clone(mounts));
        }
        resolver
    }

    pub fn resolve(&self, uri: &str) -> Result<ResolvedContext, RestconfError> {
        self.resolver().resolve(uri)
    }

    /// Backend for a resolved context: the mount point's when one was
    /// crossed, the root strategy otherwise.
    pub fn strategy_for(
        &self,
        context: &ResolvedContext,
    ) -> Result<Arc<dyn RestconfStrategy>, RestconfError> {
        match &context.mount {
            Some(mount) => mount.strategy(),
            None => Ok(Arc::clone(&self.strategy)),
        }
    }

    pub fn read_data(&self, uri: &str, content: ContentParam) -> Result<ReadResult, RestconfError> {
        let context = self.resolve_data(&self.resolver(), uri)?;
        let strategy = self.strategy_for(&context)?;
        read_data(strategy.as_ref(), &context.path, content)
    }

    pub fn put_data(&self, uri: &str, payload: NormalizedNode) -> Result<EditResponse, RestconfError> {
        let resolver = self.resolver();
        let context = self.resolve_data(&resolver, uri)?;
        let strategy = self.strategy_for(&context)?;
        let location = self.location(&resolver, &context, &context.path)?;
        let outcome = Edit::replace(context.path.clone(), payload).apply(strategy.as_ref())?;
        Ok(EditResponse::new(outcome, location))
    }

    pub fn post_data(&self, uri: &str, payload: NormalizedNode) -> Result<EditResponse, RestconfError> {
        let resolver = self.resolver();
        let context = self.resolve_data(&resolver, uri)?;
        let strategy = self.strategy_for(&context)?;
        let (target, node) = creation_target(&context, payload)?;
        let location = self.location(&resolver, &context, &target)?;
        let outcome = Edit::create(target, node).apply(strategy.as_ref())?;
        Ok(EditResponse::new(outcome, location))
    }

    pub fn merge_data(&self, uri: &str, payload: NormalizedNode) -> Result<EditOutcome, RestconfError> {
        let context = self.resolve_data(&self.resolver(), uri)?;
        let strategy = self.strategy_for(&context)?;
        Edit::merge(context.path.clone(), payload).apply(strategy.as_ref())
    }

    pub fn delete_data(&self, uri: &str) -> Result<EditOutcome, RestconfError> {
        let context = self.resolve_data(&self.resolver(), uri)?;
        let strategy = self.strategy_for(&context)?;
        Edit::delete(context.path.clone()).apply(strategy.as_ref())
    }

    /// Path of a Yang Patch edit target, relative to the URI the patch was
    /// sent to.
    pub fn patch_target(&self, uri: &str, target: &str) -> Result<DataTreePath, RestconfError> {
        Ok(self.resolver().resolve_relative(uri, target)?.path)
    }

    pub fn patch_data(&self, patch: &PatchContext) -> Result<PatchStatusContext, RestconfError> {
        patch.validate(self.config.patch.max_edits)?;
        let strategy = self.strategy_for(&patch.context)?;
        debug!(
            patch_id = %patch.patch_id,
            edits = patch.edits.len(),
            strategy = strategy.name(),
            "applying yang patch"
        );
        apply_patch(patch, strategy.as_ref())
    }

    /// Where a client subscribes to the stream named by `identifier`, using
    /// the configured transport.
    pub fn stream_location(&self, base_url: &str, identifier: &str) -> Result<String, RestconfError> {
        prepare_stream_location(
            base_url,
            &create_stream_name_from_uri(identifier),
            self.config.streams.transport,
            &self.config.server.base_path,
        )
    }

    fn resolve_data(&self, resolver: &PathResolver, uri: &str) -> Result<ResolvedContext, RestconfError> {
        let context = resolver.resolve(uri)?;
        if let Some(rpc) = context.schema_node().filter(|_| context.is_rpc()) {
            return Err(RestconfError::not_supported(format!(
                "\"{}\" is an RPC and cannot be used as a data resource.",
                rpc.qname.local_name
            )));
        }
        Ok(context)
    }

    /// `/{base_path}/data/{uri}`, prefixed with the mount point's URI when
    /// the path lives below one.
    fn location(
        &self,
        resolver: &PathResolver,
        context: &ResolvedContext,
        path: &DataTreePath,
    ) -> Result<String, RestconfError> {
        let codec = self.codec.as_ref();
        let uri = DataNormalizer::new(&context.schema).to_restconf_uri(path, codec)?;
        let base = &self.config.server.base_path;
        match &context.mount {
            Some(mount) => {
                let mount_uri =
                    DataNormalizer::new(resolver.schema()).to_restconf_uri(mount.id(), codec)?;
                Ok(format!(
                    "/{base}/data/{mount_uri}/{MOUNT_MODULE}:{MOUNT_NODE}/{uri}"
                ))
            }
            None => Ok(format!("/{base}/data/{uri}")),
        }
    }
}
