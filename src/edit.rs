use crate::data::{DatastoreType, DataTreePath, NormalizedNode, PathArgument};
use crate::error::RestconfError;
use crate::resolve::{DataNormalizer, ResolvedContext};
use crate::strategy::{RestconfStrategy, RestconfTransaction};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// The single-request edit primitive: one verb, one path, one transaction.
///
/// Every verb opens its own unit of work, performs the existence check it
/// needs, issues the mutation and commits. A failed check or mutation
/// discards the unit instead.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "Edit does nothing until apply() is called"]
pub struct Edit {
    pub path: DataTreePath,
    pub payload: Option<NormalizedNode>,
    pub verb: EditVerb,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditVerb {
    /// PUT
    Replace,
    /// POST
    Create,
    Delete,
    /// Plain PATCH
    Merge,
    /// Delete if present
    Remove,
}

impl EditVerb {
    pub fn requires_payload(&self) -> bool {
        matches!(self, EditVerb::Replace | EditVerb::Create | EditVerb::Merge)
    }
}

impl fmt::Display for EditVerb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EditVerb::Replace => "replace",
            EditVerb::Create => "create",
            EditVerb::Delete => "delete",
            EditVerb::Merge => "merge",
            EditVerb::Remove => "remove",
        };
        f.write_str(name)
    }
}

/// Result of a committed edit.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "EditOutcome should be checked for created/replaced"]
pub enum EditOutcome {
    /// Nothing existed at `path` before the edit.
    Created { path: DataTreePath },
    Replaced,
    Merged,
    Deleted,
}

impl EditOutcome {
    pub fn status_code(&self) -> u16 {
        match self {
            EditOutcome::Created { .. } => 201,
            EditOutcome::Replaced | EditOutcome::Merged | EditOutcome::Deleted => 204,
        }
    }
}

impl fmt::Display for EditOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditOutcome::Created { path } => write!(f, "Created {path}"),
            EditOutcome::Replaced => f.write_str("Replaced"),
            EditOutcome::Merged => f.write_str("Merged"),
            EditOutcome::Deleted => f.write_str("Deleted"),
        }
    }
}

impl Edit {
    pub fn replace(path: DataTreePath, payload: NormalizedNode) -> Self {
        Self {
            path,
            payload: Some(payload),
            verb: EditVerb::Replace,
        }
    }

    /// Creates `payload` at exactly `path`; [`creation_target`] computes that
    /// path for a POST.
    pub fn create(path: DataTreePath, payload: NormalizedNode) -> Self {
        Self {
            path,
            payload: Some(payload),
            verb: EditVerb::Create,
        }
    }

    pub fn merge(path: DataTreePath, payload: NormalizedNode) -> Self {
        Self {
            path,
            payload: Some(payload),
            verb: EditVerb::Merge,
        }
    }

    pub fn delete(path: DataTreePath) -> Self {
        Self {
            path,
            payload: None,
            verb: EditVerb::Delete,
        }
    }

    pub fn remove(path: DataTreePath) -> Self {
        Self {
            path,
            payload: None,
            verb: EditVerb::Remove,
        }
    }

    pub fn apply(self, strategy: &dyn RestconfStrategy) -> Result<EditOutcome, RestconfError> {
        apply(strategy, &self.path, self.payload, self.verb)
    }
}

/// Runs one edit in its own transaction.
pub fn apply(
    strategy: &dyn RestconfStrategy,
    path: &DataTreePath,
    payload: Option<NormalizedNode>,
    verb: EditVerb,
) -> Result<EditOutcome, RestconfError> {
    let payload = match (verb.requires_payload(), payload) {
        (true, None) => {
            return Err(RestconfError::MalformedMessage {
                message: format!("{verb} requires a payload"),
            })
        }
        (false, Some(_)) => {
            return Err(RestconfError::MalformedMessage {
                message: format!("{verb} does not take a payload"),
            })
        }
        (_, payload) => payload,
    };
    if verb == EditVerb::Replace {
        if let Some(node) = &payload {
            validate_payload(path, node)?;
        }
    }

    let mut tx = strategy.begin()?;
    match stage(tx.as_mut(), path, payload, verb) {
        Ok(outcome) => {
            tx.commit()?;
            debug!(strategy = strategy.name(), %path, %verb, "edit committed");
            Ok(outcome)
        }
        Err(err) => {
            debug!(strategy = strategy.name(), %path, %verb, error = %err, "edit aborted");
            tx.discard();
            Err(err)
        }
    }
}

/// Issues the mutation for `verb` without committing.
pub(crate) fn stage(
    tx: &mut dyn RestconfTransaction,
    path: &DataTreePath,
    payload: Option<NormalizedNode>,
    verb: EditVerb,
) -> Result<EditOutcome, RestconfError> {
    match (verb, payload) {
        (EditVerb::Replace, Some(node)) => {
            if tx.exists(path)? {
                tx.put(path, node)?;
                Ok(EditOutcome::Replaced)
            } else {
                tx.create(path, node)?;
                Ok(EditOutcome::Created { path: path.clone() })
            }
        }
        (EditVerb::Create, Some(node)) => {
            validate_payload(path, &node)?;
            if tx.exists(path)? {
                return Err(data_exists(path));
            }
            tx.create(path, node)?;
            Ok(EditOutcome::Created { path: path.clone() })
        }
        (EditVerb::Merge, Some(node)) => {
            tx.merge(path, node)?;
            Ok(EditOutcome::Merged)
        }
        (EditVerb::Delete, _) => {
            if !tx.exists(path)? {
                return Err(data_missing(path));
            }
            tx.delete(path)?;
            Ok(EditOutcome::Deleted)
        }
        (EditVerb::Remove, _) => {
            tx.remove(path)?;
            Ok(EditOutcome::Deleted)
        }
        (verb, None) => Err(RestconfError::MalformedMessage {
            message: format!("{verb} requires a payload"),
        }),
    }
}

/// Path and node a POST below `context` writes. A list payload must carry
/// exactly one entry, which becomes the node. Choice and augmentation levels
/// between the target and the new child are filled in from the schema, so the
/// path is the one a later GET of the child resolves to.
pub fn creation_target(
    context: &ResolvedContext,
    payload: NormalizedNode,
) -> Result<(DataTreePath, NormalizedNode), RestconfError> {
    let node = if payload.is_map() {
        payload.single_map_entry().cloned().ok_or_else(|| {
            RestconfError::invalid_value("POST of a list requires exactly one list entry.")
        })?
    } else {
        payload
    };
    let qname = node.identifier.qname().cloned().ok_or_else(|| {
        RestconfError::invalid_value("POST payload must be a named data node.")
    })?;
    let (steps, _) =
        DataNormalizer::new(&context.schema).child_steps(context.schema_node(), &qname)?;
    let mut args = context.path.args().to_vec();
    args.extend(steps);
    args.push(node.identifier.clone());
    Ok((DataTreePath::new(args), node))
}

/// The payload must be the node the URI names, including equal list keys.
pub fn validate_payload(path: &DataTreePath, payload: &NormalizedNode) -> Result<(), RestconfError> {
    let Some(last) = path.last() else {
        return Ok(());
    };
    match (last, &payload.identifier) {
        (
            PathArgument::NodeWithKeys { qname, keys },
            PathArgument::NodeWithKeys {
                qname: payload_name,
                keys: payload_keys,
            },
        ) => {
            if qname != payload_name {
                return Err(name_mismatch(&payload_name.to_string(), &qname.to_string()));
            }
            if keys != payload_keys {
                return Err(RestconfError::invalid_value(
                    "The key values in the URI and in the payload are different.",
                ));
            }
            Ok(())
        }
        (expected, actual) if expected == actual => Ok(()),
        (expected, actual) => Err(name_mismatch(&describe(actual), &describe(expected))),
    }
}

fn describe(arg: &PathArgument) -> String {
    match arg.qname() {
        Some(qname) => qname.to_string(),
        None => arg.to_string(),
    }
}

fn name_mismatch(payload: &str, uri: &str) -> RestconfError {
    RestconfError::invalid_value(format!(
        "Payload name ({payload}) is different from identifier name ({uri})"
    ))
}

pub(crate) fn data_exists(path: &DataTreePath) -> RestconfError {
    RestconfError::data_exists(format!("Data already exists for path: {path}"))
}

pub(crate) fn data_missing(path: &DataTreePath) -> RestconfError {
    RestconfError::data_missing(format!("Data does not exist for path: {path}"))
}

/// Which datastores a read covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContentParam {
    #[default]
    All,
    Config,
    Nonconfig,
}

impl FromStr for ContentParam {
    type Err = RestconfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(ContentParam::All),
            "config" => Ok(ContentParam::Config),
            "nonconfig" => Ok(ContentParam::Nonconfig),
            other => Err(RestconfError::invalid_value(format!(
                "Invalid content parameter: {other}, allowed values are all, config, nonconfig"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadResult {
    pub node: NormalizedNode,
    pub entity_tag: String,
}

/// Reads `path`. `All` overlays operational data on configuration data.
pub fn read_data(
    strategy: &dyn RestconfStrategy,
    path: &DataTreePath,
    content: ContentParam,
) -> Result<ReadResult, RestconfError> {
    let node = match content {
        ContentParam::Config => strategy.read(DatastoreType::Configuration, path)?,
        ContentParam::Nonconfig => strategy.read(DatastoreType::Operational, path)?,
        ContentParam::All => {
            let config = strategy.read(DatastoreType::Configuration, path)?;
            let state = strategy.read(DatastoreType::Operational, path)?;
            match (config, state) {
                (Some(mut config), Some(state)) => {
                    config.merge(&DataTreePath::root(), state)?;
                    Some(config)
                }
                (config, state) => config.or(state),
            }
        }
    };
    let node = node.ok_or_else(|| {
        RestconfError::data_missing(
            "Request could not be completed because the relevant data model content does not exist",
        )
    })?;
    let entity_tag = node.entity_tag();
    Ok(ReadResult { node, entity_tag })
}
