use crate::data::{DataTreePath, NormalizedNode};
use crate::error::RestconfError;
use crate::resolve::ResolvedContext;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// Operations a Yang Patch edit may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PatchOperation {
    Create,
    Replace,
    Merge,
    Delete,
    Remove,
}

impl PatchOperation {
    pub fn requires_value(&self) -> bool {
        matches!(
            self,
            PatchOperation::Create | PatchOperation::Replace | PatchOperation::Merge
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PatchOperation::Create => "create",
            PatchOperation::Replace => "replace",
            PatchOperation::Merge => "merge",
            PatchOperation::Delete => "delete",
            PatchOperation::Remove => "remove",
        }
    }
}

impl fmt::Display for PatchOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PatchOperation {
    type Err = RestconfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "create" => Ok(PatchOperation::Create),
            "replace" => Ok(PatchOperation::Replace),
            "merge" => Ok(PatchOperation::Merge),
            "delete" => Ok(PatchOperation::Delete),
            "remove" => Ok(PatchOperation::Remove),
            "insert" | "move" => Err(RestconfError::not_supported(format!(
                "Yang Patch operation \"{s}\" is not supported."
            ))),
            _ => Err(RestconfError::MalformedMessage {
                message: format!("Unknown Yang Patch operation \"{s}\"."),
            }),
        }
    }
}

/// One named edit of a Yang Patch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchEntity {
    pub edit_id: String,
    pub operation: PatchOperation,
    pub target: DataTreePath,
    pub value: Option<NormalizedNode>,
}

impl PatchEntity {
    pub fn new(
        edit_id: impl Into<String>,
        operation: PatchOperation,
        target: DataTreePath,
        value: Option<NormalizedNode>,
    ) -> Self {
        Self {
            edit_id: edit_id.into(),
            operation,
            target,
            value,
        }
    }
}

/// A parsed Yang Patch, consumed once by the applicator.
#[derive(Debug, Clone)]
pub struct PatchContext {
    pub context: ResolvedContext,
    pub edits: Vec<PatchEntity>,
    pub patch_id: String,
}

impl PatchContext {
    pub fn new(context: ResolvedContext, patch_id: impl Into<String>, edits: Vec<PatchEntity>) -> Self {
        Self {
            context,
            edits,
            patch_id: patch_id.into(),
        }
    }

    /// Structural checks that must hold before any transaction is opened.
    pub fn validate(&self, max_edits: Option<usize>) -> Result<(), ValidationError> {
        let mut issues = Vec::new();

        if self.patch_id.trim().is_empty() {
            issues.push(ValidationIssue::MissingField {
                edit_id: None,
                field: "patch-id",
            });
        }
        if self.edits.is_empty() {
            issues.push(ValidationIssue::EmptyEditList);
        }
        if let Some(max) = max_edits {
            if self.edits.len() > max {
                issues.push(ValidationIssue::TooManyEdits {
                    count: self.edits.len(),
                    max,
                });
            }
        }

        let mut seen = HashSet::new();
        for edit in &self.edits {
            if edit.edit_id.trim().is_empty() {
                issues.push(ValidationIssue::MissingField {
                    edit_id: None,
                    field: "edit-id",
                });
            } else if !seen.insert(edit.edit_id.as_str()) {
                issues.push(ValidationIssue::DuplicateEditId(edit.edit_id.clone()));
            }

            match (edit.operation.requires_value(), edit.value.is_some()) {
                (true, false) => issues.push(ValidationIssue::MissingField {
                    edit_id: Some(edit.edit_id.clone()),
                    field: "value",
                }),
                (false, true) => issues.push(ValidationIssue::InvalidCombo {
                    edit_id: Some(edit.edit_id.clone()),
                    message: format!("{} operation must not carry a value", edit.operation),
                }),
                _ => {}
            }
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

impl From<ValidationError> for RestconfError {
    fn from(err: ValidationError) -> Self {
        RestconfError::MalformedMessage {
            message: err.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    EmptyEditList,
    MissingField {
        edit_id: Option<String>,
        field: &'static str,
    },
    DuplicateEditId(String),
    InvalidCombo {
        edit_id: Option<String>,
        message: String,
    },
    TooManyEdits {
        count: usize,
        max: usize,
    },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::EmptyEditList => write!(f, "patch contains no edits"),
            ValidationIssue::MissingField { edit_id, field } => match edit_id {
                Some(id) => write!(f, "edit '{id}' missing required field '{field}'"),
                None => write!(f, "patch missing required field '{field}'"),
            },
            ValidationIssue::DuplicateEditId(id) => write!(f, "edit id '{id}' is used more than once"),
            ValidationIssue::InvalidCombo { edit_id, message } => match edit_id {
                Some(id) => write!(f, "edit '{id}' is invalid: {message}"),
                None => write!(f, "invalid patch: {message}"),
            },
            ValidationIssue::TooManyEdits { count, max } => {
                write!(f, "patch carries {count} edits, at most {max} are allowed")
            }
        }
    }
}
