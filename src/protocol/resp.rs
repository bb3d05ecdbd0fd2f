//! RESP data types and frame definitions
//!
//! Replies are RESP2 frames; the RESP3 scalar types a server may still send
//! (null, boolean, double) are accepted as well.

use std::sync::Arc;

/// Type alias for byte strings used throughout the protocol
pub type Bytes = Arc<Vec<u8>>;

/// RESP protocol frame types
#[derive(Debug, Clone, PartialEq)]
pub enum RespFrame {
    /// Simple string: +OK\r\n
    SimpleString(Bytes),

    /// Error: -Error message\r\n
    Error(Bytes),

    /// Integer: :1000\r\n
    Integer(i64),

    /// Bulk string: $6\r\nfoobar\r\n or $-1\r\n (null)
    BulkString(Option<Bytes>),

    /// Array: *2\r\n$3\r\nfoo\r\n$3\r\nbar\r\n or *-1\r\n (null)
    Array(Option<Vec<RespFrame>>),

    /// Null value (RESP3): _\r\n
    Null,

    /// Boolean (RESP3): #t\r\n or #f\r\n
    Boolean(bool),

    /// Double (RESP3): ,1.23\r\n
    Double(f64),
}

impl RespFrame {
    /// Create an OK simple string
    pub fn ok() -> Self {
        RespFrame::SimpleString(Arc::new(b"OK".to_vec()))
    }

    /// Create a simple string frame
    pub fn simple_string(s: impl Into<Vec<u8>>) -> Self {
        RespFrame::SimpleString(Arc::new(s.into()))
    }

    /// Create an error frame
    pub fn error(msg: impl Into<Vec<u8>>) -> Self {
        RespFrame::Error(Arc::new(msg.into()))
    }

    /// Create a null bulk string
    pub fn null_bulk() -> Self {
        RespFrame::BulkString(None)
    }

    /// Create a bulk string from bytes
    pub fn bulk_string(bytes: impl AsRef<[u8]>) -> Self {
        RespFrame::BulkString(Some(Arc::new(bytes.as_ref().to_vec())))
    }

    /// Create a bulk string that takes ownership of `bytes`
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        RespFrame::BulkString(Some(Arc::new(bytes)))
    }

    /// Create an array of frames
    pub fn array(frames: Vec<RespFrame>) -> Self {
        RespFrame::Array(Some(frames))
    }

    /// Build a command frame: an array of bulk strings
    pub fn command<I, A>(parts: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: AsRef<[u8]>,
    {
        RespFrame::Array(Some(parts.into_iter().map(RespFrame::bulk_string).collect()))
    }

    /// Check if this frame is an error
    pub fn is_error(&self) -> bool {
        matches!(self, RespFrame::Error(_))
    }

    /// Check if this frame represents a null/nil value
    pub fn is_null(&self) -> bool {
        matches!(self, RespFrame::Null | RespFrame::BulkString(None) | RespFrame::Array(None))
    }

    /// Error message carried by an error frame
    pub fn error_message(&self) -> Option<String> {
        match self {
            RespFrame::Error(bytes) => Some(String::from_utf8_lossy(bytes).into_owned()),
            _ => None,
        }
    }
}

impl From<String> for RespFrame {
    fn from(s: String) -> Self {
        RespFrame::from_bytes(s.into_bytes())
    }
}

impl From<&str> for RespFrame {
    fn from(s: &str) -> Self {
        RespFrame::bulk_string(s)
    }
}

impl From<i64> for RespFrame {
    fn from(n: i64) -> Self {
        RespFrame::Integer(n)
    }
}

impl From<bool> for RespFrame {
    fn from(b: bool) -> Self {
        RespFrame::Integer(if b { 1 } else { 0 })
    }
}

impl From<Vec<RespFrame>> for RespFrame {
    fn from(frames: Vec<RespFrame>) -> Self {
        RespFrame::Array(Some(frames))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resp_frame_creation() {
        let ok = RespFrame::ok();
        assert!(matches!(ok, RespFrame::SimpleString(_)));

        let err = RespFrame::error("ERR test");
        assert!(err.is_error());
        assert_eq!(err.error_message().as_deref(), Some("ERR test"));

        assert!(RespFrame::null_bulk().is_null());
        assert!(RespFrame::Null.is_null());
    }

    #[test]
    fn test_command_frame() {
        let frame = RespFrame::command(["SADD", "k", "1"]);
        match frame {
            RespFrame::Array(Some(parts)) => {
                assert_eq!(parts.len(), 3);
                assert_eq!(parts[0], RespFrame::bulk_string("SADD"));
            }
            other => panic!("unexpected frame {:?}", other),
        }
    }

    #[test]
    fn test_resp_frame_conversions() {
        let frame: RespFrame = "hello".into();
        assert!(matches!(frame, RespFrame::BulkString(Some(_))));

        let frame: RespFrame = 42i64.into();
        assert!(matches!(frame, RespFrame::Integer(42)));

        let frame: RespFrame = true.into();
        assert_eq!(frame, RespFrame::Integer(1));
    }
}
