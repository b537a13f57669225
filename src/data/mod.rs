pub mod node;
pub mod path;
pub mod store;
pub mod value;

pub use node::{NodeBody, NormalizedNode};
pub use path::{DataTreePath, PathArgument};
pub use store::{
    CommitCohort, DatastoreType, MemoryDataStore, Modification, ModificationKind,
    ReadWriteTransaction,
};
pub use value::{Decimal64, Value};
