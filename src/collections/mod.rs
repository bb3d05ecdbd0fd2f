//! Typed handles to collections stored in the store
//!
//! A handle holds a client and a key, never element data; every read goes
//! to the store.

mod counter;
mod dict;
mod keyspace;
mod list;
mod set;
mod zset;

pub use counter::Counter;
pub use dict::Dict;
pub use keyspace::{Binding, Keyspace};
pub use list::List;
pub use set::{Set, SetOperand};
pub use zset::{Order, ZSet, ZSetOperand};
