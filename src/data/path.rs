use crate::data::value::Value;
use crate::schema::QName;
use serde::ser::SerializeSeq;
use serde::{Serialize, Serializer};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// One step of a [`DataTreePath`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum PathArgument {
    Node(QName),
    NodeWithKeys {
        qname: QName,
        #[serde(serialize_with = "keys_as_pairs")]
        keys: BTreeMap<QName, Value>,
    },
    /// Marker for nodes contributed by an augmentation, named by the set of
    /// qualified names the augmentation adds.
    Augmentation(BTreeSet<QName>),
}

fn keys_as_pairs<S: Serializer>(keys: &BTreeMap<QName, Value>, s: S) -> Result<S::Ok, S::Error> {
    let mut seq = s.serialize_seq(Some(keys.len()))?;
    for pair in keys {
        seq.serialize_element(&pair)?;
    }
    seq.end()
}

impl PathArgument {
    pub fn node(qname: QName) -> Self {
        PathArgument::Node(qname)
    }

    pub fn with_keys<I>(qname: QName, keys: I) -> Self
    where
        I: IntoIterator<Item = (QName, Value)>,
    {
        PathArgument::NodeWithKeys {
            qname,
            keys: keys.into_iter().collect(),
        }
    }

    /// Node name; augmentation markers have none.
    pub fn qname(&self) -> Option<&QName> {
        match self {
            PathArgument::Node(qname) | PathArgument::NodeWithKeys { qname, .. } => Some(qname),
            PathArgument::Augmentation(_) => None,
        }
    }

    pub fn keys(&self) -> Option<&BTreeMap<QName, Value>> {
        match self {
            PathArgument::NodeWithKeys { keys, .. } => Some(keys),
            _ => None,
        }
    }

    pub fn is_keyed(&self) -> bool {
        matches!(self, PathArgument::NodeWithKeys { .. })
    }
}

impl fmt::Display for PathArgument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathArgument::Node(qname) => f.write_str(&qname.local_name),
            PathArgument::NodeWithKeys { qname, keys } => {
                write!(f, "{}[", qname.local_name)?;
                for (idx, (key, value)) in keys.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{}={}", key.local_name, value)?;
                }
                f.write_str("]")
            }
            PathArgument::Augmentation(names) => {
                f.write_str("augmentation{")?;
                for (idx, name) in names.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(",")?;
                    }
                    f.write_str(&name.local_name)?;
                }
                f.write_str("}")
            }
        }
    }
}

/// Ordered path from the data root to a node.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct DataTreePath {
    args: Vec<PathArgument>,
}

impl DataTreePath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn new(args: Vec<PathArgument>) -> Self {
        Self { args }
    }

    pub fn args(&self) -> &[PathArgument] {
        &self.args
    }

    pub fn is_root(&self) -> bool {
        self.args.is_empty()
    }

    pub fn len(&self) -> usize {
        self.args.len()
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    pub fn last(&self) -> Option<&PathArgument> {
        self.args.last()
    }

    pub fn child(&self, arg: PathArgument) -> Self {
        let mut args = self.args.clone();
        args.push(arg);
        Self { args }
    }

    pub fn parent(&self) -> Option<Self> {
        let (_, init) = self.args.split_last()?;
        Some(Self {
            args: init.to_vec(),
        })
    }

    pub fn starts_with(&self, prefix: &DataTreePath) -> bool {
        self.args.starts_with(&prefix.args)
    }
}

impl From<Vec<PathArgument>> for DataTreePath {
    fn from(args: Vec<PathArgument>) -> Self {
        Self { args }
    }
}

impl fmt::Display for DataTreePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.args.is_empty() {
            return f.write_str("/");
        }
        for arg in &self.args {
            write!(f, "/{arg}")?;
        }
        Ok(())
    }
}
