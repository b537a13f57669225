use crate::codec::url_decode;
use crate::error::RestconfError;

/// Module part of the segment that hands resolution over to a mount point.
pub const MOUNT_MODULE: &str = "yang-ext";
/// Node part of the mount segment.
pub const MOUNT_NODE: &str = "mount";
/// Key token that is never accepted as a list key value.
pub const NULL_VALUE: &str = "null";

/// One `/`-delimited token of a URI, split into its optional module prefix
/// and local name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathSegment {
    pub module: Option<String>,
    pub local_name: String,
}

impl PathSegment {
    pub fn parse(raw: &str) -> Result<Self, RestconfError> {
        let decoded = url_decode(raw)?;
        let mut parts = decoded.split(':');
        let first = parts.next().unwrap_or_default();
        let (module, local_name) = match (parts.next(), parts.next()) {
            (None, _) => (None, first.to_string()),
            (Some(local), None) => (Some(first.to_string()), local.to_string()),
            (Some(_), Some(_)) => {
                return Err(RestconfError::invalid_uri(format!(
                    "URI has bad format. \"{decoded}\" contains more than one ':' character."
                )))
            }
        };
        if local_name.is_empty() || module.as_deref() == Some("") {
            return Err(RestconfError::invalid_uri(format!(
                "URI has bad format. \"{decoded}\" is not a valid node identifier."
            )));
        }
        Ok(Self { module, local_name })
    }

    pub fn is_mount(&self) -> bool {
        self.module.as_deref() == Some(MOUNT_MODULE) && self.local_name == MOUNT_NODE
    }
}

/// Splits a URI into raw segments, dropping one leading and one trailing `/`.
pub fn split_segments(uri: &str) -> Vec<&str> {
    let trimmed = uri.strip_prefix('/').unwrap_or(uri);
    let trimmed = trimmed.strip_suffix('/').unwrap_or(trimmed);
    if trimmed.is_empty() {
        return Vec::new();
    }
    trimmed.split('/').collect()
}
