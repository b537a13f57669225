//! Patch applicator - applies a Yang Patch as one unit of work
//!
//! This module provides patch application that:
//! - Applies edits in submitted order against a single transaction
//! - Stops at the first failing edit and discards the transaction
//! - Commits once when every edit succeeded
//! - Reports the observed result of each attempted edit

use crate::data::NormalizedNode;
use crate::edit::{data_exists, data_missing};
use crate::error::RestconfError;
use crate::patch::entity::{PatchContext, PatchEntity, PatchOperation};
use crate::strategy::{RestconfStrategy, RestconfTransaction};
use std::fmt;
use tracing::{debug, warn};

/// Result of one attempted edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchStatusEntity {
    pub edit_id: String,
    pub ok: bool,
    pub errors: Vec<RestconfError>,
}

impl PatchStatusEntity {
    fn ok(edit_id: &str) -> Self {
        Self {
            edit_id: edit_id.to_string(),
            ok: true,
            errors: Vec::new(),
        }
    }

    fn failed(edit_id: &str, error: RestconfError) -> Self {
        Self {
            edit_id: edit_id.to_string(),
            ok: false,
            errors: vec![error],
        }
    }
}

/// Result of a whole patch.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "PatchStatusContext should be checked for success/failure"]
pub struct PatchStatusContext {
    pub patch_id: String,
    pub edits: Vec<PatchStatusEntity>,
    pub ok: bool,
    pub global_errors: Option<Vec<RestconfError>>,
}

impl PatchStatusContext {
    fn global_failure(patch_id: &str, edits: Vec<PatchStatusEntity>, error: RestconfError) -> Self {
        Self {
            patch_id: patch_id.to_string(),
            edits,
            ok: false,
            global_errors: Some(vec![error]),
        }
    }

    pub fn edit(&self, edit_id: &str) -> Option<&PatchStatusEntity> {
        self.edits.iter().find(|status| status.edit_id == edit_id)
    }
}

impl fmt::Display for PatchStatusContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verdict = if self.ok { "ok" } else { "failed" };
        write!(f, "patch '{}' {verdict}", self.patch_id)?;
        for status in &self.edits {
            write!(f, "\n  edit '{}': ", status.edit_id)?;
            if status.ok {
                f.write_str("ok")?;
            } else {
                let reasons: Vec<String> = status.errors.iter().map(ToString::to_string).collect();
                write!(f, "{}", reasons.join("; "))?;
            }
        }
        if let Some(errors) = &self.global_errors {
            for error in errors {
                write!(f, "\n  global: {error}")?;
            }
        }
        Ok(())
    }
}

/// Applies every edit of `patch` through `strategy`.
///
/// Only a structurally invalid patch is an `Err`; failures of individual
/// edits, of the transaction start and of the commit are reported in the
/// returned status.
pub fn apply_patch(
    patch: &PatchContext,
    strategy: &dyn RestconfStrategy,
) -> Result<PatchStatusContext, RestconfError> {
    patch.validate(None)?;

    let mut tx = match strategy.begin() {
        Ok(tx) => tx,
        Err(err) => {
            warn!(patch_id = %patch.patch_id, error = %err, "could not open transaction for patch");
            return Ok(PatchStatusContext::global_failure(&patch.patch_id, Vec::new(), err));
        }
    };

    let mut statuses = Vec::with_capacity(patch.edits.len());
    let mut aborted = false;
    for edit in &patch.edits {
        match apply_edit(tx.as_mut(), edit) {
            Ok(()) => statuses.push(PatchStatusEntity::ok(&edit.edit_id)),
            Err(err) => {
                debug!(
                    patch_id = %patch.patch_id,
                    edit_id = %edit.edit_id,
                    error = %err,
                    "patch edit failed, aborting"
                );
                statuses.push(PatchStatusEntity::failed(&edit.edit_id, err));
                aborted = true;
                break;
            }
        }
    }

    if aborted {
        tx.discard();
        return Ok(PatchStatusContext {
            patch_id: patch.patch_id.clone(),
            edits: statuses,
            ok: false,
            global_errors: None,
        });
    }

    match tx.commit() {
        Ok(()) => {
            debug!(patch_id = %patch.patch_id, edits = statuses.len(), "patch committed");
            Ok(PatchStatusContext {
                patch_id: patch.patch_id.clone(),
                edits: statuses,
                ok: true,
                global_errors: None,
            })
        }
        Err(err) => {
            warn!(patch_id = %patch.patch_id, error = %err, "patch commit failed");
            Ok(PatchStatusContext::global_failure(&patch.patch_id, statuses, err))
        }
    }
}

fn apply_edit(tx: &mut dyn RestconfTransaction, edit: &PatchEntity) -> Result<(), RestconfError> {
    let target = &edit.target;
    match edit.operation {
        PatchOperation::Create => {
            let value = required_value(edit)?;
            if tx.exists(target)? {
                return Err(data_exists(target));
            }
            tx.create(target, value)
        }
        PatchOperation::Replace => tx.put(target, required_value(edit)?),
        PatchOperation::Merge => tx.merge(target, required_value(edit)?),
        PatchOperation::Delete => {
            if !tx.exists(target)? {
                return Err(data_missing(target));
            }
            tx.delete(target)
        }
        PatchOperation::Remove => tx.remove(target),
    }
}

fn required_value(edit: &PatchEntity) -> Result<NormalizedNode, RestconfError> {
    edit.value.clone().ok_or_else(|| RestconfError::MalformedMessage {
        message: format!("edit '{}' missing required field 'value'", edit.edit_id),
    })
}
