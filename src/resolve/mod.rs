pub mod context;
pub mod normalize;
pub mod resolver;
pub mod segment;

pub use context::{ResolvedContext, SchemaTarget};
pub use normalize::DataNormalizer;
pub use resolver::PathResolver;
pub use segment::{PathSegment, MOUNT_MODULE, MOUNT_NODE, NULL_VALUE};
