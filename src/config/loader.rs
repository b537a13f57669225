use crate::config::settings::{RestconfConfig, ValidationError};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Toml {
        path: Option<PathBuf>,
        source: toml_edit::de::Error,
    },
    Validation {
        path: Option<PathBuf>,
        source: ValidationError,
    },
}

impl ConfigError {
    /// Records the file a parse or validation failure was read from. Read
    /// failures already carry their path; an existing path is kept.
    pub fn with_path(mut self, file: &Path) -> Self {
        if let ConfigError::Toml { path, .. } | ConfigError::Validation { path, .. } = &mut self {
            path.get_or_insert_with(|| file.to_path_buf());
        }
        self
    }

    /// File the error refers to, when known.
    pub fn path(&self) -> Option<&Path> {
        match self {
            ConfigError::Io { path, .. } => Some(path),
            ConfigError::Toml { path, .. } | ConfigError::Validation { path, .. } => {
                path.as_deref()
            }
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let what = match self {
            ConfigError::Io { .. } => "cannot read restconf config",
            ConfigError::Toml { .. } => "restconf config is not valid TOML",
            ConfigError::Validation { .. } => "invalid restconf config",
        };
        f.write_str(what)?;
        if let Some(path) = self.path() {
            write!(f, " [{}]", path.display())?;
        }
        match self {
            ConfigError::Io { source, .. } => write!(f, ": {source}"),
            ConfigError::Toml { source, .. } => write!(f, ": {source}"),
            ConfigError::Validation { source, .. } => write!(f, ": {source}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(match self {
            ConfigError::Io { source, .. } => source,
            ConfigError::Toml { source, .. } => source,
            ConfigError::Validation { source, .. } => source,
        })
    }
}

/// Parses and validates a configuration document. Absent sections take
/// their defaults.
pub fn load_from_str(input: &str) -> Result<RestconfConfig, ConfigError> {
    let config: RestconfConfig = toml_edit::de::from_str(input)
        .map_err(|source| ConfigError::Toml { path: None, source })?;
    config
        .validate()
        .map_err(|source| ConfigError::Validation { path: None, source })?;
    Ok(config)
}

pub fn load_from_path(path: impl AsRef<Path>) -> Result<RestconfConfig, ConfigError> {
    let file = path.as_ref();
    match fs::read_to_string(file) {
        Ok(contents) => load_from_str(&contents).map_err(|err| err.with_path(file)),
        Err(source) => Err(ConfigError::Io {
            path: file.to_path_buf(),
            source,
        }),
    }
}
