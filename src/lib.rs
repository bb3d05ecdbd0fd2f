//! Ferrous collections
//!
//! Set, sorted set, list and hash handles backed by a Redis-compatible
//! store. Multi-operand set algebra runs on the server: operands that only
//! exist in memory are staged into temporary keys, and staging, the
//! combining command and the cleanup go out as one atomic batch.
//!
//! ```no_run
//! use ferrous_collections::{Client, Config, Set, SetOperand};
//!
//! # fn main() -> ferrous_collections::Result<()> {
//! let client = Client::connect(Config::from_url("redis://127.0.0.1:6379/0")?)?;
//! let tags: Set<String> = Set::with_members(&client, "tags", ["rust".to_string()])?;
//! let other: Set<String> = client.set("other-tags")?;
//! let local = vec!["redis".to_string()];
//! let all = tags.union(vec![SetOperand::from(&other), SetOperand::from(&local)])?;
//! # let _ = all;
//! # Ok(())
//! # }
//! ```

pub mod algebra;
pub mod client;
pub mod codec;
pub mod collections;
pub mod command;
pub mod config;
pub mod error;
pub mod protocol;
pub mod storage;
pub mod store;

// Re-export commonly used types
pub use client::Client;
pub use codec::{Element, ElementKind};
pub use collections::{Counter, Dict, Keyspace, List, Order, Set, SetOperand, ZSet, ZSetOperand};
pub use command::{Aggregate, ScoreBound};
pub use config::Config;
pub use error::{Error, Result};
pub use algebra::Operand;
pub use store::{MemoryStore, Store, TcpStore};
