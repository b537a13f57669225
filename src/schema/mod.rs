pub mod context;
pub mod node;
pub mod qname;

pub use context::{SchemaContext, SchemaContextHandle, SchemaRoute};
pub use node::{ModuleBuilder, SchemaNode, SchemaNodeKind, TypeDefinition};
pub use qname::{QName, QNameModule};
