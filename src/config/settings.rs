use crate::stream::StreamTransport;
use serde::Deserialize;
use std::fmt;

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct RestconfConfig {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub streams: StreamSettings,
    #[serde(default)]
    pub patch: PatchSettings,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct ServerSettings {
    /// URI prefix without surrounding `/`, e.g. `rests`.
    #[serde(default = "default_base_path")]
    pub base_path: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            base_path: default_base_path(),
        }
    }
}

fn default_base_path() -> String {
    "rests".to_string()
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct StreamSettings {
    #[serde(default)]
    pub transport: StreamTransport,
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct PatchSettings {
    /// Upper bound on edits per Yang Patch; unbounded when absent.
    #[serde(default)]
    pub max_edits: Option<usize>,
}

impl RestconfConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();

        let base_path = &self.server.base_path;
        if base_path.trim().is_empty() {
            issues.push(ValidationIssue::MissingField {
                field: "server.base_path",
            });
        } else if base_path.starts_with('/')
            || base_path.ends_with('/')
            || base_path.chars().any(char::is_whitespace)
        {
            issues.push(ValidationIssue::InvalidValue {
                field: "server.base_path",
                message: format!(
                    "'{base_path}' must not start or end with '/' or contain whitespace"
                ),
            });
        }

        if self.patch.max_edits == Some(0) {
            issues.push(ValidationIssue::InvalidValue {
                field: "patch.max_edits",
                message: "must be at least 1".to_string(),
            });
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { issues })
        }
    }
}

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, issue) in self.issues.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    MissingField {
        field: &'static str,
    },
    InvalidValue {
        field: &'static str,
        message: String,
    },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::MissingField { field } => {
                write!(f, "config missing required field '{field}'")
            }
            ValidationIssue::InvalidValue { field, message } => {
                write!(f, "config field '{field}' is invalid: {message}")
            }
        }
    }
}
