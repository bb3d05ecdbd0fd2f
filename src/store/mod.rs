//! Store boundary
//!
//! A [`Store`] runs single commands and atomic pipelines. Two
//! implementations are provided: [`TcpStore`] talks RESP to a server over
//! TCP, [`MemoryStore`] runs the same commands in process.

mod connection;
mod memory;
mod tcp;

pub use connection::Connection;
pub use memory::MemoryStore;
pub use tcp::TcpStore;

use crate::command::Command;
use crate::error::{Error, Result};
use crate::protocol::RespFrame;

/// A key-value store speaking the command protocol
pub trait Store: Send + Sync {
    /// Run one command in its own round trip. An error reply becomes
    /// [`Error::Store`].
    fn execute(&self, command: Command) -> Result<RespFrame>;

    /// Run `commands` as one atomic batch in a single round trip. Replies
    /// come back in command order; a failed command shows up as an error
    /// frame in its slot rather than as `Err`.
    fn pipeline(&self, commands: Vec<Command>) -> Result<Vec<RespFrame>>;

    /// Identity of the key namespace (server and database). Keys are only
    /// comparable between handles whose stores report the same namespace.
    fn namespace(&self) -> String;
}

/// Turn an error reply into `Err`
pub(crate) fn check_reply(frame: RespFrame) -> Result<RespFrame> {
    match frame {
        RespFrame::Error(message) => Err(Error::from_reply(&message)),
        other => Ok(other),
    }
}
