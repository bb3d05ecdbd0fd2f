//! In-process store
//!
//! Backed by [`StorageEngine`]. Clones and [`MemoryStore::select`]ed views
//! share the same engine, so they see each other's writes.

use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use super::{check_reply, Store};
use crate::command::Command;
use crate::error::{Error, Result};
use crate::protocol::RespFrame;
use crate::storage::{DatabaseIndex, StorageEngine};

/// Store living in this process
#[derive(Debug, Clone)]
pub struct MemoryStore {
    engine: Arc<StorageEngine>,
    id: Uuid,
    db: DatabaseIndex,
}

impl MemoryStore {
    /// Fresh engine with the default number of databases, database 0
    pub fn new() -> Self {
        MemoryStore {
            engine: StorageEngine::new(),
            id: Uuid::new_v4(),
            db: 0,
        }
    }

    /// View of another database on the same engine
    pub fn select(&self, db: DatabaseIndex) -> Result<Self> {
        if db >= self.engine.database_count() {
            return Err(Error::Store("ERR DB index is out of range".to_string()));
        }
        Ok(MemoryStore {
            engine: Arc::clone(&self.engine),
            id: self.id,
            db,
        })
    }

    pub fn db(&self) -> DatabaseIndex {
        self.db
    }

    pub fn engine(&self) -> &Arc<StorageEngine> {
        &self.engine
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Store for MemoryStore {
    fn execute(&self, command: Command) -> Result<RespFrame> {
        check_reply(self.engine.execute(self.db, &command)?)
    }

    fn pipeline(&self, commands: Vec<Command>) -> Result<Vec<RespFrame>> {
        debug!(target: "ferrous::store", db = self.db, commands = commands.len(), "memory pipeline");
        self.engine.execute_batch(self.db, &commands)
    }

    fn namespace(&self) -> String {
        format!("memory:{}/{}", self.id, self.db)
    }
}
