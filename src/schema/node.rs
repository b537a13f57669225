use crate::schema::qname::{QName, QNameModule};
use std::sync::Arc;

/// Declared type of a leaf or leaf-list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeDefinition {
    String,
    Boolean,
    Empty,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Decimal64 { fraction_digits: u8 },
    Enumeration { names: Vec<String> },
    IdentityRef { base: QName },
    /// Absolute schema path of the referenced leaf, module root first.
    Leafref { path: Vec<QName> },
    Union { members: Vec<TypeDefinition> },
    Derived { name: String, base: Box<TypeDefinition> },
}

impl TypeDefinition {
    /// Inclusive bounds of integral types.
    pub fn integer_range(&self) -> Option<(i128, i128)> {
        let range = match self {
            TypeDefinition::Int8 => (i8::MIN as i128, i8::MAX as i128),
            TypeDefinition::Int16 => (i16::MIN as i128, i16::MAX as i128),
            TypeDefinition::Int32 => (i32::MIN as i128, i32::MAX as i128),
            TypeDefinition::Int64 => (i64::MIN as i128, i64::MAX as i128),
            TypeDefinition::Uint8 => (0, u8::MAX as i128),
            TypeDefinition::Uint16 => (0, u16::MAX as i128),
            TypeDefinition::Uint32 => (0, u32::MAX as i128),
            TypeDefinition::Uint64 => (0, u64::MAX as i128),
            _ => return None,
        };
        Some(range)
    }

    pub fn is_signed(&self) -> bool {
        matches!(
            self,
            TypeDefinition::Int8
                | TypeDefinition::Int16
                | TypeDefinition::Int32
                | TypeDefinition::Int64
        )
    }

    pub fn is_identityref(&self) -> bool {
        match self {
            TypeDefinition::IdentityRef { .. } => true,
            TypeDefinition::Derived { base, .. } => base.is_identityref(),
            _ => false,
        }
    }

    pub fn derived(name: impl Into<String>, base: TypeDefinition) -> Self {
        TypeDefinition::Derived {
            name: name.into(),
            base: Box::new(base),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaNodeKind {
    Module {
        name: String,
        children: Vec<Arc<SchemaNode>>,
        rpcs: Vec<Arc<SchemaNode>>,
        identities: Vec<QName>,
    },
    Container {
        children: Vec<Arc<SchemaNode>>,
    },
    List {
        keys: Vec<QName>,
        children: Vec<Arc<SchemaNode>>,
    },
    Leaf {
        type_def: TypeDefinition,
    },
    LeafList {
        type_def: TypeDefinition,
    },
    Choice {
        cases: Vec<Arc<SchemaNode>>,
    },
    Case {
        children: Vec<Arc<SchemaNode>>,
    },
    Augmentation {
        children: Vec<Arc<SchemaNode>>,
    },
    Rpc {
        input: Vec<Arc<SchemaNode>>,
        output: Vec<Arc<SchemaNode>>,
    },
    Anyxml,
}

impl SchemaNodeKind {
    pub fn name(&self) -> &'static str {
        match self {
            SchemaNodeKind::Module { .. } => "module",
            SchemaNodeKind::Container { .. } => "container",
            SchemaNodeKind::List { .. } => "list",
            SchemaNodeKind::Leaf { .. } => "leaf",
            SchemaNodeKind::LeafList { .. } => "leaf-list",
            SchemaNodeKind::Choice { .. } => "choice",
            SchemaNodeKind::Case { .. } => "case",
            SchemaNodeKind::Augmentation { .. } => "augmentation",
            SchemaNodeKind::Rpc { .. } => "rpc",
            SchemaNodeKind::Anyxml => "anyxml",
        }
    }
}

/// One node of a compiled schema model. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaNode {
    pub qname: QName,
    pub kind: SchemaNodeKind,
    pub config: bool,
}

fn shared(nodes: Vec<SchemaNode>) -> Vec<Arc<SchemaNode>> {
    nodes.into_iter().map(Arc::new).collect()
}

impl SchemaNode {
    fn new(qname: QName, kind: SchemaNodeKind) -> Self {
        Self {
            qname,
            kind,
            config: true,
        }
    }

    pub fn container(qname: QName, children: Vec<SchemaNode>) -> Self {
        Self::new(
            qname,
            SchemaNodeKind::Container {
                children: shared(children),
            },
        )
    }

    /// Key leaves are named in declaration order and live in the list's module.
    pub fn list(qname: QName, keys: &[&str], children: Vec<SchemaNode>) -> Self {
        let keys = keys
            .iter()
            .map(|key| QName::new(qname.module.clone(), *key))
            .collect();
        Self::new(
            qname,
            SchemaNodeKind::List {
                keys,
                children: shared(children),
            },
        )
    }

    pub fn leaf(qname: QName, type_def: TypeDefinition) -> Self {
        Self::new(qname, SchemaNodeKind::Leaf { type_def })
    }

    pub fn leaf_list(qname: QName, type_def: TypeDefinition) -> Self {
        Self::new(qname, SchemaNodeKind::LeafList { type_def })
    }

    pub fn choice(qname: QName, cases: Vec<SchemaNode>) -> Self {
        Self::new(
            qname,
            SchemaNodeKind::Choice {
                cases: shared(cases),
            },
        )
    }

    pub fn case(qname: QName, children: Vec<SchemaNode>) -> Self {
        Self::new(
            qname,
            SchemaNodeKind::Case {
                children: shared(children),
            },
        )
    }

    /// Nodes contributed to a parent by another module.
    pub fn augmentation(module: QNameModule, children: Vec<SchemaNode>) -> Self {
        Self::new(
            QName::new(module, "augmentation"),
            SchemaNodeKind::Augmentation {
                children: shared(children),
            },
        )
    }

    pub fn rpc(qname: QName, input: Vec<SchemaNode>, output: Vec<SchemaNode>) -> Self {
        Self::new(
            qname,
            SchemaNodeKind::Rpc {
                input: shared(input),
                output: shared(output),
            },
        )
    }

    pub fn anyxml(qname: QName) -> Self {
        Self::new(qname, SchemaNodeKind::Anyxml)
    }

    /// Marks the node as state data.
    pub fn state(mut self) -> Self {
        self.config = false;
        self
    }

    /// Schema children, including choice cases.
    pub fn children(&self) -> &[Arc<SchemaNode>] {
        match &self.kind {
            SchemaNodeKind::Module { children, .. }
            | SchemaNodeKind::Container { children }
            | SchemaNodeKind::List { children, .. }
            | SchemaNodeKind::Case { children }
            | SchemaNodeKind::Augmentation { children } => children,
            SchemaNodeKind::Choice { cases } => cases,
            _ => &[],
        }
    }

    /// Direct child by exact name. Does not look through choices.
    pub fn data_child(&self, qname: &QName) -> Option<Arc<SchemaNode>> {
        self.children()
            .iter()
            .find(|child| &child.qname == qname)
            .cloned()
    }

    /// Nodes that show up as their own segment in a URI.
    pub fn is_instantiated(&self) -> bool {
        matches!(
            self.kind,
            SchemaNodeKind::Container { .. }
                | SchemaNodeKind::List { .. }
                | SchemaNodeKind::Leaf { .. }
                | SchemaNodeKind::LeafList { .. }
                | SchemaNodeKind::Anyxml
        )
    }

    /// Nodes that are looked through when searching for instantiated children.
    pub fn is_transparent(&self) -> bool {
        matches!(
            self.kind,
            SchemaNodeKind::Choice { .. }
                | SchemaNodeKind::Case { .. }
                | SchemaNodeKind::Augmentation { .. }
        )
    }

    pub fn is_list_or_container(&self) -> bool {
        matches!(
            self.kind,
            SchemaNodeKind::Container { .. } | SchemaNodeKind::List { .. }
        )
    }

    pub fn is_list(&self) -> bool {
        matches!(self.kind, SchemaNodeKind::List { .. })
    }

    pub fn is_module(&self) -> bool {
        matches!(self.kind, SchemaNodeKind::Module { .. })
    }

    pub fn keys(&self) -> &[QName] {
        match &self.kind {
            SchemaNodeKind::List { keys, .. } => keys,
            _ => &[],
        }
    }

    pub fn type_def(&self) -> Option<&TypeDefinition> {
        match &self.kind {
            SchemaNodeKind::Leaf { type_def } | SchemaNodeKind::LeafList { type_def } => {
                Some(type_def)
            }
            _ => None,
        }
    }

    pub fn module_name(&self) -> Option<&str> {
        match &self.kind {
            SchemaNodeKind::Module { name, .. } => Some(name),
            _ => None,
        }
    }

    pub fn rpcs(&self) -> &[Arc<SchemaNode>] {
        match &self.kind {
            SchemaNodeKind::Module { rpcs, .. } => rpcs,
            _ => &[],
        }
    }

    pub fn identities(&self) -> &[QName] {
        match &self.kind {
            SchemaNodeKind::Module { identities, .. } => identities,
            _ => &[],
        }
    }
}

/// Assembles a module node.
#[derive(Debug, Clone)]
pub struct ModuleBuilder {
    name: String,
    module: QNameModule,
    children: Vec<SchemaNode>,
    rpcs: Vec<SchemaNode>,
    identities: Vec<String>,
}

impl ModuleBuilder {
    pub fn new(name: impl Into<String>, namespace: impl Into<String>, revision: Option<&str>) -> Self {
        Self {
            name: name.into(),
            module: QNameModule::new(namespace, revision),
            children: Vec::new(),
            rpcs: Vec::new(),
            identities: Vec::new(),
        }
    }

    /// Qualified name in this module.
    pub fn qname(&self, local_name: &str) -> QName {
        QName::new(self.module.clone(), local_name)
    }

    pub fn module(&self) -> &QNameModule {
        &self.module
    }

    pub fn child(mut self, node: SchemaNode) -> Self {
        self.children.push(node);
        self
    }

    pub fn rpc(mut self, node: SchemaNode) -> Self {
        self.rpcs.push(node);
        self
    }

    pub fn identity(mut self, name: &str) -> Self {
        self.identities.push(name.to_string());
        self
    }

    pub fn build(self) -> SchemaNode {
        let identities = self
            .identities
            .iter()
            .map(|name| QName::new(self.module.clone(), name.as_str()))
            .collect();
        SchemaNode::new(
            QName::new(self.module.clone(), self.name.as_str()),
            SchemaNodeKind::Module {
                name: self.name,
                children: shared(self.children),
                rpcs: shared(self.rpcs),
                identities,
            },
        )
    }
}
