//! restconf-core: schema-aware RESTCONF path resolution and transactional
//! data-tree editing
//!
//! Request URIs are resolved against a YANG schema snapshot into a
//! [`ResolvedContext`]. Edits (PUT, POST, DELETE, plain PATCH) and Yang
//! Patch documents then run against either a generic in-memory datastore or
//! a NETCONF device behind a mount point.
//!
//! # Architecture
//!
//! The edit and patch engines only see the [`RestconfStrategy`] and
//! [`RestconfTransaction`] traits. A strategy is chosen per root or mount
//! point; the device-backed one holds the device lock for the lifetime of a
//! transaction and always releases it.
//!
//! # Guarantees
//!
//! - Every transaction ends in exactly one commit or discard
//! - A failed remote transaction issues one discard-changes and one unlock
//! - A Yang Patch either commits every edit or none of them
//!
//! # Example
//!
//! ```no_run
//! use restconf_core::{
//!     ContentParam, DataStoreStrategy, MemoryDataStore, RestconfConfig, RestconfDataService,
//!     SchemaContext, SchemaContextHandle,
//! };
//! use std::sync::Arc;
//!
//! let store = Arc::new(MemoryDataStore::new());
//! let service = RestconfDataService::new(
//!     SchemaContextHandle::new(SchemaContext::new(Vec::new())),
//!     Arc::new(DataStoreStrategy::new(store)),
//!     RestconfConfig::default(),
//! );
//!
//! match service.read_data("example:top", ContentParam::All) {
//!     Ok(result) => println!("etag {}", result.entity_tag),
//!     Err(e) => eprintln!("read failed: {}", e),
//! }
//! ```

pub mod codec;
pub mod config;
pub mod data;
pub mod edit;
pub mod error;
pub mod mount;
pub mod patch;
pub mod resolve;
pub mod schema;
pub mod service;
pub mod strategy;
pub mod stream;

// Re-exports
pub use codec::{DefaultCodec, IdentifierCodec};
pub use config::{load_from_path, load_from_str, ConfigError, RestconfConfig};
pub use data::{
    DataTreePath, DatastoreType, MemoryDataStore, NormalizedNode, PathArgument, Value,
};
pub use edit::{ContentParam, Edit, EditOutcome, EditVerb, ReadResult};
pub use error::{BackendError, ErrorTag, ErrorType, RestconfError};
pub use mount::{MountPoint, MountPointService, MountRegistry};
pub use patch::{
    apply_patch, PatchContext, PatchEntity, PatchOperation, PatchStatusContext,
    PatchStatusEntity,
};
pub use resolve::{DataNormalizer, PathResolver, ResolvedContext, SchemaTarget};
pub use schema::{QName, QNameModule, SchemaContext, SchemaContextHandle, SchemaNode};
pub use service::{EditResponse, RestconfDataService};
pub use strategy::{
    select_strategy, DataStoreStrategy, NetconfDataTreeService, NetconfStrategy,
    RestconfStrategy, RestconfTransaction,
};
pub use stream::{DataStreamParams, StreamTransport};
