//! RESP protocol serializer
//!
//! Writes frames into a byte buffer. A pipeline is serialized into a single
//! buffer so it leaves in one write.

use std::io::Write;

use super::resp::RespFrame;
use crate::error::Result;

/// Serialize a RESP frame to a writer
pub fn serialize_resp_frame<W: Write>(frame: &RespFrame, writer: &mut W) -> Result<()> {
    match frame {
        RespFrame::SimpleString(bytes) => {
            writer.write_all(b"+")?;
            writer.write_all(bytes)?;
            writer.write_all(b"\r\n")?;
        }

        RespFrame::Error(bytes) => {
            writer.write_all(b"-")?;
            writer.write_all(bytes)?;
            writer.write_all(b"\r\n")?;
        }

        RespFrame::Integer(n) => {
            write!(writer, ":{}\r\n", n)?;
        }

        RespFrame::BulkString(Some(bytes)) => {
            write!(writer, "${}\r\n", bytes.len())?;
            writer.write_all(bytes)?;
            writer.write_all(b"\r\n")?;
        }
        RespFrame::BulkString(None) => writer.write_all(b"$-1\r\n")?,

        RespFrame::Array(Some(frames)) => {
            write!(writer, "*{}\r\n", frames.len())?;
            for frame in frames {
                serialize_resp_frame(frame, writer)?;
            }
        }
        RespFrame::Array(None) => writer.write_all(b"*-1\r\n")?,

        RespFrame::Null => writer.write_all(b"_\r\n")?,

        RespFrame::Boolean(b) => {
            writer.write_all(if *b { b"#t\r\n" } else { b"#f\r\n" })?;
        }

        RespFrame::Double(f) => {
            write!(writer, ",{}\r\n", f)?;
        }
    }

    Ok(())
}

/// Serialize a RESP frame to a byte vector
pub fn serialize_to_vec(frame: &RespFrame) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    serialize_resp_frame(frame, &mut buf)?;
    Ok(buf)
}

/// Accumulates several frames into one outgoing buffer
pub struct RespSerializer {
    buffer: Vec<u8>,
}

impl RespSerializer {
    /// Create a new serializer
    pub fn new() -> Self {
        RespSerializer {
            buffer: Vec::with_capacity(4096),
        }
    }

    /// Add a frame to the buffer
    pub fn add(&mut self, frame: &RespFrame) -> Result<()> {
        serialize_resp_frame(frame, &mut self.buffer)
    }

    /// Take the buffer and reset
    pub fn take(&mut self) -> Vec<u8> {
        std::mem::replace(&mut self.buffer, Vec::with_capacity(4096))
    }

    /// Get a reference to the buffer
    pub fn buffer(&self) -> &[u8] {
        &self.buffer
    }

    /// Clear the buffer
    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

impl Default for RespSerializer {
    fn default() -> Self {
        Self::new()
    }
}
