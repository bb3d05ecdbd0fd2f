//! Store reached over TCP
//!
//! One connection guarded by a mutex. A transport failure drops the
//! connection; the next call opens a new one.

use std::sync::Mutex;

use tracing::warn;

use super::connection::Connection;
use super::Store;
use crate::command::Command;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::protocol::RespFrame;

/// Remote store client
pub struct TcpStore {
    config: Config,
    connection: Mutex<Option<Connection>>,
}

impl TcpStore {
    /// Connect eagerly so configuration errors surface here
    pub fn connect(config: Config) -> Result<Self> {
        let connection = Connection::open(&config)?;
        Ok(TcpStore {
            config,
            connection: Mutex::new(Some(connection)),
        })
    }

    /// Parse a `redis://` URL and connect
    pub fn open(url: &str) -> Result<Self> {
        Self::connect(Config::from_url(url)?)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn with_connection<T>(&self, op: impl FnOnce(&mut Connection) -> Result<T>) -> Result<T> {
        let mut guard = self
            .connection
            .lock()
            .map_err(|_| Error::Connection("connection lock poisoned".to_string()))?;

        if guard.is_none() {
            *guard = Some(Connection::open(&self.config)?);
        }
        let conn = match guard.as_mut() {
            Some(conn) => conn,
            None => return Err(Error::Connection("not connected".to_string())),
        };

        let result = op(conn);
        if let Err(err) = &result {
            // The stream may hold half a reply; never reuse it
            if err.is_indeterminate() || matches!(err, Error::Protocol(_)) {
                warn!(target: "ferrous::store", addr = %self.config.addr(), error = %err, "dropping connection");
                *guard = None;
            }
        }
        result
    }
}

impl Store for TcpStore {
    fn execute(&self, command: Command) -> Result<RespFrame> {
        self.with_connection(|conn| conn.request(&command))
    }

    fn pipeline(&self, commands: Vec<Command>) -> Result<Vec<RespFrame>> {
        self.with_connection(|conn| conn.transaction(&commands))
    }

    fn namespace(&self) -> String {
        format!("redis://{}/{}", self.config.addr(), self.config.db)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread;

    #[test]
    fn test_reconnects_after_peer_close() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();

        let server = thread::spawn(move || {
            // First connection closes right after accept
            let (first, _) = listener.accept().unwrap();
            drop(first);

            let (mut second, _) = listener.accept().unwrap();
            let mut buf = [0u8; 512];
            let _ = second.read(&mut buf).unwrap();
            second.write_all(b"+PONG\r\n").unwrap();
        });

        let store = TcpStore::connect(Config { port, ..Config::default() }).unwrap();
        assert!(store.execute(Command::Ping).is_err());
        assert_eq!(store.execute(Command::Ping).unwrap(), RespFrame::simple_string("PONG"));
        server.join().unwrap();
    }

    #[test]
    fn test_namespace_includes_db() {
        let config = Config { db: 4, ..Config::default() };
        let store = TcpStore {
            config,
            connection: Mutex::new(None),
        };
        assert_eq!(store.namespace(), "redis://127.0.0.1:6379/4");
    }
}
