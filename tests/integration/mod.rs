//! Integration tests for restconf-core.
//!
//! One harness; each submodule covers one engine against the shared
//! jukebox schema in `fixtures`.

mod edit;
mod fixtures;
mod netconf;
mod resolver;
