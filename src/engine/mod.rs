//! Menu engine - identities and the component instance registry.
//!
//! The engine manages the data the reconciler works on:
//! - Key: sibling identity and old/new pairing
//! - Registry: the arena of live component instances and their parent links
//!
//! # Architecture
//!
//! Component instances are NOT referenced by pointer. They live in a
//! slot-map arena and are addressed by [`InstanceId`]:
//!
//! ```text
//! InstanceId(1): counter   (parent=none, hooks=[State<i32>], children=[leaf, row#2, row#3])
//! InstanceId(2): row       (parent=1,    key=k1, hooks=[State<u8>])
//! InstanceId(3): row       (parent=1,    key=k2, hooks=[State<u8>])
//! ```
//!
//! Child to parent links are a side table, so teardown is a plain top-down
//! sweep and the event router can still walk upward.

mod key;
mod registry;

pub use key::*;
pub use registry::*;
