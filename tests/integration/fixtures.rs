//! Shared schema, payloads and a recording fake device.

use parking_lot::Mutex;
use restconf_core::data::{DataTreePath, NormalizedNode, Value};
use restconf_core::schema::{
    ModuleBuilder, QName, SchemaContext, SchemaNode, TypeDefinition,
};
use restconf_core::strategy::netconf::{EditOperation, NetconfDataTreeService, RpcError};
use std::collections::HashSet;

pub const JB: &str = "urn:example:jukebox";
pub const JB_REVISION: &str = "2016-08-15";
pub const EXT: &str = "urn:example:jukebox-ext";

fn jukebox_module() -> ModuleBuilder {
    ModuleBuilder::new("jukebox", JB, Some(JB_REVISION))
}

fn ext_module() -> ModuleBuilder {
    ModuleBuilder::new("jukebox-ext", EXT, None)
}

/// Name in `jukebox`, carrying the module revision like the schema does.
pub fn jb(name: &str) -> QName {
    jukebox_module().qname(name)
}

pub fn ext(name: &str) -> QName {
    ext_module().qname(name)
}

/// `jukebox` with a library of artists and albums, a player whose `gap`
/// leaf is also augmented in by `jukebox-ext`, a two-key playlist list and a
/// `play` RPC.
pub fn jukebox_schema() -> SchemaContext {
    let m = jukebox_module()
        .identity("genre")
        .identity("rock")
        .identity("jazz");
    let x = ext_module();

    let album = SchemaNode::list(
        m.qname("album"),
        &["name"],
        vec![
            SchemaNode::leaf(m.qname("name"), TypeDefinition::String),
            SchemaNode::leaf(m.qname("year"), TypeDefinition::Uint16),
        ],
    );
    let artist = SchemaNode::list(
        m.qname("artist"),
        &["name"],
        vec![
            SchemaNode::leaf(m.qname("name"), TypeDefinition::String),
            SchemaNode::leaf(
                m.qname("genre"),
                TypeDefinition::IdentityRef {
                    base: m.qname("genre"),
                },
            ),
            album,
        ],
    );
    let library = SchemaNode::container(m.qname("library"), vec![artist]);

    let player = SchemaNode::container(
        m.qname("player"),
        vec![
            SchemaNode::leaf(m.qname("gap"), TypeDefinition::Decimal64 { fraction_digits: 1 }),
            SchemaNode::choice(
                m.qname("source"),
                vec![
                    SchemaNode::case(
                        m.qname("radio"),
                        vec![SchemaNode::leaf(m.qname("station"), TypeDefinition::String)],
                    ),
                    SchemaNode::case(
                        m.qname("disc"),
                        vec![SchemaNode::leaf(m.qname("slot"), TypeDefinition::Uint8)],
                    ),
                ],
            ),
            SchemaNode::augmentation(
                x.module().clone(),
                vec![
                    SchemaNode::leaf(x.qname("gap"), TypeDefinition::Uint32),
                    SchemaNode::leaf(x.qname("volume"), TypeDefinition::Uint8),
                ],
            ),
        ],
    );

    let playlist = SchemaNode::list(
        m.qname("playlist"),
        &["name", "owner"],
        vec![
            SchemaNode::leaf(m.qname("name"), TypeDefinition::String),
            SchemaNode::leaf(m.qname("owner"), TypeDefinition::String),
            SchemaNode::leaf_list(m.qname("track"), TypeDefinition::String),
        ],
    );

    let stats = SchemaNode::container(
        m.qname("stats"),
        vec![SchemaNode::leaf(m.qname("plays"), TypeDefinition::Uint32).state()],
    )
    .state();

    let jukebox = SchemaNode::container(m.qname("jukebox"), vec![library, player, playlist, stats]);
    let play = SchemaNode::rpc(
        m.qname("play"),
        vec![SchemaNode::leaf(m.qname("playlist"), TypeDefinition::String)],
        Vec::new(),
    );

    SchemaContext::new(vec![m.child(jukebox).rpc(play).build(), x.build()])
}

pub fn artist(name: &str) -> NormalizedNode {
    NormalizedNode::map_entry(jb("artist"), vec![(jb("name"), Value::string(name))], Vec::new())
}

pub fn artist_with_genre(name: &str, genre: &str) -> NormalizedNode {
    NormalizedNode::map_entry(
        jb("artist"),
        vec![(jb("name"), Value::string(name))],
        vec![NormalizedNode::leaf(jb("genre"), Value::Identity(jb(genre)))],
    )
}

pub fn library(entries: Vec<NormalizedNode>) -> NormalizedNode {
    NormalizedNode::container(jb("library"), vec![NormalizedNode::map(jb("artist"), entries)])
}

/// In-memory device with separate running and candidate trees.
///
/// Every RPC is appended to `calls`; RPC names listed in `fail_on` fail with
/// an injected error and change nothing.
pub struct FakeDevice {
    running: Mutex<NormalizedNode>,
    candidate: Mutex<NormalizedNode>,
    operational: Mutex<NormalizedNode>,
    locked: Mutex<bool>,
    calls: Mutex<Vec<String>>,
    fail_on: Mutex<HashSet<&'static str>>,
}

impl Default for FakeDevice {
    fn default() -> Self {
        Self {
            running: Mutex::new(NormalizedNode::data_root()),
            candidate: Mutex::new(NormalizedNode::data_root()),
            operational: Mutex::new(NormalizedNode::data_root()),
            locked: Mutex::new(false),
            calls: Mutex::new(Vec::new()),
            fail_on: Mutex::new(HashSet::new()),
        }
    }
}

impl FakeDevice {
    pub fn fail_on(&self, rpc: &'static str) {
        self.fail_on.lock().insert(rpc);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    pub fn count(&self, rpc: &str) -> usize {
        self.calls.lock().iter().filter(|call| call.as_str() == rpc).count()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().clear();
    }

    pub fn is_locked(&self) -> bool {
        *self.locked.lock()
    }

    pub fn running(&self, path: &DataTreePath) -> Option<NormalizedNode> {
        self.running.lock().find(path).cloned()
    }

    pub fn candidate(&self, path: &DataTreePath) -> Option<NormalizedNode> {
        self.candidate.lock().find(path).cloned()
    }

    pub fn seed_running(&self, path: &DataTreePath, node: NormalizedNode) {
        let mut running = self.running.lock();
        running.put(path, node).unwrap();
        *self.candidate.lock() = running.clone();
    }

    pub fn seed_operational(&self, path: &DataTreePath, node: NormalizedNode) {
        self.operational.lock().put(path, node).unwrap();
    }

    fn record(&self, rpc: &'static str) -> Result<(), RpcError> {
        self.calls.lock().push(rpc.to_string());
        if self.fail_on.lock().contains(rpc) {
            return Err(RpcError::new(rpc, "injected failure"));
        }
        Ok(())
    }
}

impl NetconfDataTreeService for FakeDevice {
    fn lock(&self) -> Result<(), RpcError> {
        self.record("lock")?;
        let mut locked = self.locked.lock();
        if *locked {
            return Err(RpcError::new("lock", "lock is already held"));
        }
        *locked = true;
        Ok(())
    }

    fn unlock(&self) -> Result<(), RpcError> {
        self.record("unlock")?;
        *self.locked.lock() = false;
        Ok(())
    }

    fn get(&self, path: &DataTreePath) -> Result<Option<NormalizedNode>, RpcError> {
        self.record("get")?;
        Ok(self.operational.lock().find(path).cloned())
    }

    fn get_config(&self, path: &DataTreePath) -> Result<Option<NormalizedNode>, RpcError> {
        self.record("get-config")?;
        Ok(self.candidate.lock().find(path).cloned())
    }

    fn edit_config(
        &self,
        operation: EditOperation,
        path: &DataTreePath,
        payload: Option<&NormalizedNode>,
    ) -> Result<(), RpcError> {
        self.record("edit-config")?;
        let mut candidate = self.candidate.lock();
        let write = |tree: &mut NormalizedNode, merge: bool| -> Result<(), RpcError> {
            let node = payload
                .cloned()
                .ok_or_else(|| RpcError::new("edit-config", "missing payload"))?;
            let result = if merge {
                tree.merge(path, node)
            } else {
                tree.put(path, node)
            };
            result.map_err(|err| RpcError::new("edit-config", err.to_string()))
        };
        match operation {
            EditOperation::Create => {
                if candidate.find(path).is_some() {
                    return Err(RpcError::new("edit-config", "data-exists"));
                }
                write(&mut *candidate, false)
            }
            EditOperation::Replace => write(&mut *candidate, false),
            EditOperation::Merge => write(&mut *candidate, true),
            EditOperation::Delete => candidate
                .remove(path)
                .map(|_| ())
                .ok_or_else(|| RpcError::new("edit-config", "data-missing")),
            EditOperation::Remove => {
                candidate.remove(path);
                Ok(())
            }
        }
    }

    fn commit(&self) -> Result<(), RpcError> {
        self.record("commit")?;
        *self.running.lock() = self.candidate.lock().clone();
        Ok(())
    }

    fn discard_changes(&self) -> Result<(), RpcError> {
        self.record("discard-changes")?;
        *self.candidate.lock() = self.running.lock().clone();
        Ok(())
    }
}
