pub mod loader;
pub mod settings;

pub use loader::{load_from_path, load_from_str, ConfigError};
pub use settings::{
    PatchSettings, RestconfConfig, ServerSettings, StreamSettings, ValidationError,
    ValidationIssue,
};
