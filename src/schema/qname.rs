use serde::Serialize;
use std::fmt;

/// Namespace plus optional revision date of a module.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct QNameModule {
    pub namespace: String,
    pub revision: Option<String>,
}

impl QNameModule {
    pub fn new(namespace: impl Into<String>, revision: Option<&str>) -> Self {
        Self {
            namespace: namespace.into(),
            revision: revision.map(str::to_string),
        }
    }
}

/// Qualified name of a schema or data node.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct QName {
    pub module: QNameModule,
    pub local_name: String,
}

const DATA_ROOT_NAMESPACE: &str = "urn:ietf:params:xml:ns:netconf:base:1.0";

impl QName {
    pub fn new(module: QNameModule, local_name: impl Into<String>) -> Self {
        Self {
            module,
            local_name: local_name.into(),
        }
    }

    /// Shorthand for a name in a namespace without revision.
    pub fn of(namespace: &str, local_name: &str) -> Self {
        Self::new(QNameModule::new(namespace, None), local_name)
    }

    /// Name of the synthetic `data` node every tree is rooted at.
    pub fn data_root() -> Self {
        Self::of(DATA_ROOT_NAMESPACE, "data")
    }

    pub fn namespace(&self) -> &str {
        &self.module.namespace
    }

    /// Same local name in another module.
    pub fn with_module(&self, module: QNameModule) -> Self {
        Self::new(module, self.local_name.clone())
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.module.revision {
            Some(rev) => write!(
                f,
                "({}?revision={}){}",
                self.module.namespace, rev, self.local_name
            ),
            None => write!(f, "({}){}", self.module.namespace, self.local_name),
        }
    }
}
