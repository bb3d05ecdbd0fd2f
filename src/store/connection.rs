//! Blocking connection to a store server
//!
//! Writes serialized commands to a `TcpStream` and feeds whatever comes
//! back into the incremental RESP parser until a full reply is available.

use std::io::{ErrorKind, Read, Write};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Instant;

use tracing::{debug, info};

use crate::command::Command;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::protocol::{RespFrame, RespParser, RespSerializer};

/// A single client connection
pub struct Connection {
    /// TCP stream
    stream: TcpStream,

    /// Server address
    addr: SocketAddr,

    /// RESP protocol parser
    parser: RespParser,

    /// Outgoing buffer
    serializer: RespSerializer,

    /// Selected database
    db_index: usize,

    /// Last activity timestamp
    last_activity: Instant,
}

impl Connection {
    /// Connect, authenticate and select the configured database
    pub fn open(config: &Config) -> Result<Self> {
        let addrs = config
            .addr()
            .to_socket_addrs()
            .map_err(|e| Error::Connection(format!("cannot resolve {}: {}", config.addr(), e)))?;

        let mut last_error = None;
        let mut connected = None;
        for addr in addrs {
            match TcpStream::connect_timeout(&addr, config.connect_timeout) {
                Ok(stream) => {
                    connected = Some((stream, addr));
                    break;
                }
                Err(e) => last_error = Some(e),
            }
        }

        let (stream, addr) = connected.ok_or_else(|| {
            Error::Connection(match last_error {
                Some(e) => format!("cannot connect to {}: {}", config.addr(), e),
                None => format!("no address found for {}", config.addr()),
            })
        })?;

        stream.set_nodelay(true)?;
        if !config.io_timeout.is_zero() {
            stream.set_read_timeout(Some(config.io_timeout))?;
            stream.set_write_timeout(Some(config.io_timeout))?;
        }

        let mut conn = Connection {
            stream,
            addr,
            parser: RespParser::new(),
            serializer: RespSerializer::new(),
            db_index: 0,
            last_activity: Instant::now(),
        };

        if let Some(password) = &config.password {
            conn.request(&Command::Auth { password: password.clone() })?;
        }
        if config.db != 0 {
            conn.request(&Command::Select { db: config.db })?;
            conn.db_index = config.db;
        }

        info!(target: "ferrous::store", addr = %conn.addr, db = conn.db_index, "connected");
        Ok(conn)
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn db_index(&self) -> usize {
        self.db_index
    }

    /// Time since last activity
    pub fn idle_time(&self) -> std::time::Duration {
        self.last_activity.elapsed()
    }

    /// Send one command and wait for its reply. An error reply is `Err`.
    pub fn request(&mut self, command: &Command) -> Result<RespFrame> {
        self.serializer.add(&command.to_frame())?;
        self.flush()?;
        match self.read_frame()? {
            RespFrame::Error(message) => Err(Error::from_reply(&message)),
            frame => Ok(frame),
        }
    }

    /// Send `MULTI`, the commands and `EXEC` in one write, then read every
    /// reply. Returns the EXEC array.
    pub fn transaction(&mut self, commands: &[Command]) -> Result<Vec<RespFrame>> {
        self.serializer.add(&RespFrame::command(["MULTI"]))?;
        for command in commands {
            self.serializer.add(&command.to_frame())?;
        }
        self.serializer.add(&RespFrame::command(["EXEC"]))?;
        self.flush()?;

        // +OK for MULTI, then +QUEUED (or a queueing error) per command
        let mut queue_error = None;
        for _ in 0..=commands.len() {
            if let RespFrame::Error(message) = self.read_frame()? {
                queue_error.get_or_insert(Error::from_reply(&message));
            }
        }

        match self.read_frame()? {
            RespFrame::Array(Some(replies)) if replies.len() == commands.len() => Ok(replies),
            RespFrame::Array(Some(replies)) => Err(Error::Protocol(format!(
                "EXEC returned {} replies for {} commands",
                replies.len(),
                commands.len()
            ))),
            RespFrame::Error(message) => Err(queue_error.unwrap_or_else(|| Error::from_reply(&message))),
            frame if frame.is_null() => Err(Error::Store("EXECABORT Transaction discarded".to_string())),
            other => Err(Error::Protocol(format!("Unexpected EXEC reply: {:?}", other))),
        }
    }

    fn flush(&mut self) -> Result<()> {
        let buffer = self.serializer.take();
        debug!(target: "ferrous::store", bytes = buffer.len(), "write");
        self.stream.write_all(&buffer).map_err(map_io_error)?;
        self.last_activity = Instant::now();
        Ok(())
    }

    /// Block until one complete frame has been parsed
    fn read_frame(&mut self) -> Result<RespFrame> {
        let mut buf = [0u8; 4096];
        loop {
            if let Some(frame) = self.parser.parse()? {
                return Ok(frame);
            }

            match self.stream.read(&mut buf) {
                Ok(0) => return Err(Error::Connection("Connection closed by peer".into())),
                Ok(n) => {
                    self.last_activity = Instant::now();
                    self.parser.feed(&buf[..n]);
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(map_io_error(e)),
            }
        }
    }
}

/// A read or write timeout leaves the outcome unknown
fn map_io_error(e: std::io::Error) -> Error {
    match e.kind() {
        ErrorKind::WouldBlock | ErrorKind::TimedOut => Error::Timeout,
        _ => Error::Io(e),
    }
}
