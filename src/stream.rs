//! Notification stream identifiers and the locations clients subscribe at.

use crate::data::DatastoreType;
use crate::error::RestconfError;
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use tracing::debug;
use url::Url;

const NOTIF: &str = "notif";
const DATASTORE_PARAM: &str = "datastore";
const SCOPE_PARAM: &str = "scope";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamTransport {
    #[default]
    Sse,
    WebSocket,
}

impl fmt::Display for StreamTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamTransport::Sse => f.write_str("sse"),
            StreamTransport::WebSocket => f.write_str("websocket"),
        }
    }
}

/// How much of the tree under the listened path triggers a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataChangeScope {
    Base,
    One,
    Subtree,
}

impl DataChangeScope {
    fn parse(value: &str) -> Option<Self> {
        match value {
            "BASE" => Some(DataChangeScope::Base),
            "ONE" => Some(DataChangeScope::One),
            "SUBTREE" => Some(DataChangeScope::Subtree),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataStreamParams {
    pub stream_name: String,
    pub datastore: DatastoreType,
    pub scope: DataChangeScope,
}

impl DataStreamParams {
    /// Parses a data-change stream identifier such as
    /// `data-change-event-subscription/toaster:toaster/datastore=CONFIGURATION/scope=SUBTREE`.
    pub fn from_identifier(identifier: &str) -> Result<Self, RestconfError> {
        let values = values_from_identifier(identifier);

        let datastore = values
            .get(DATASTORE_PARAM)
            .and_then(|value| parse_datastore(value))
            .ok_or_else(|| {
                let message = "Stream name doesn't contain datastore value (pattern /datastore=)";
                debug!(identifier, "{message}");
                RestconfError::MissingAttribute {
                    message: message.to_string(),
                }
            })?;

        let scope = values
            .get(SCOPE_PARAM)
            .and_then(|value| DataChangeScope::parse(value))
            .ok_or_else(|| {
                let message = "Stream name doesn't contain scope value (pattern /scope=)";
                debug!(identifier, "{message}");
                RestconfError::MissingAttribute {
                    message: message.to_string(),
                }
            })?;

        let stream_name = create_stream_name_from_uri(identifier);
        if stream_name.is_empty() {
            return Err(RestconfError::invalid_value("Stream name is empty."));
        }

        Ok(Self {
            stream_name,
            datastore,
            scope,
        })
    }
}

fn parse_datastore(value: &str) -> Option<DatastoreType> {
    match value {
        "CONFIGURATION" => Some(DatastoreType::Configuration),
        "OPERATIONAL" => Some(DatastoreType::Operational),
        _ => None,
    }
}

/// `key=value` segments of an identifier; later segments win.
fn values_from_identifier(identifier: &str) -> HashMap<&str, &str> {
    create_stream_name_slice(identifier)
        .split('/')
        .filter_map(|segment| segment.split_once('='))
        .filter(|(_, value)| !value.is_empty())
        .collect()
}

fn create_stream_name_slice(identifier: &str) -> &str {
    let name = identifier.strip_prefix('/').unwrap_or(identifier);
    match name.find('?') {
        Some(idx) => &name[..idx],
        None => name,
    }
}

/// Stream name from a request identifier: no leading `/`, no query part.
pub fn create_stream_name_from_uri(identifier: &str) -> String {
    create_stream_name_slice(identifier).to_string()
}

/// Absolute URI a client connects to for `stream_name`.
///
/// Only scheme, host and port of `base_url` are kept.
pub fn prepare_stream_location(
    base_url: &str,
    stream_name: &str,
    transport: StreamTransport,
    base_path: &str,
) -> Result<String, RestconfError> {
    if stream_name.is_empty() {
        return Err(RestconfError::invalid_value("Stream name is empty."));
    }
    let mut url = Url::parse(base_url).map_err(|err| {
        RestconfError::invalid_value(format!("Base URI {base_url} is not valid: {err}"))
    })?;
    url.set_query(None);
    url.set_fragment(None);

    match transport {
        StreamTransport::Sse => {
            url.set_path(&format!("/{base_path}/{NOTIF}/{stream_name}"));
        }
        StreamTransport::WebSocket => {
            let scheme = if url.scheme() == "https" { "wss" } else { "ws" };
            url.set_scheme(scheme).map_err(|()| {
                RestconfError::invalid_value(format!(
                    "Base URI {base_url} cannot be switched to {scheme}"
                ))
            })?;
            url.set_path(&format!("/{base_path}/{stream_name}"));
        }
    }
    Ok(url.to_string())
}
