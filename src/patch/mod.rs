pub mod applicator;
pub mod entity;

pub use applicator::{apply_patch, PatchStatusContext, PatchStatusEntity};
pub use entity::{
    PatchContext, PatchEntity, PatchOperation, ValidationError, ValidationIssue,
};
