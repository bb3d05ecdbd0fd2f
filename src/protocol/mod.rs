//! RESP (REdis Serialization Protocol) implementation
//!
//! Client side of the protocol: commands are serialized as arrays of bulk
//! strings and replies are parsed incrementally.

pub mod parser;
pub mod resp;
pub mod serializer;

pub use parser::{parse_resp_frame, RespParser};
pub use resp::RespFrame;
pub use serializer::{serialize_resp_frame, serialize_to_vec, RespSerializer};

use crate::error::{Error, Result};

/// Extract a string from a RESP frame
pub fn extract_string(frame: &RespFrame) -> Result<String> {
    match frame {
        RespFrame::SimpleString(data) | RespFrame::BulkString(Some(data)) => {
            String::from_utf8(data.to_vec())
                .map_err(|_| Error::Protocol("Invalid UTF-8 in string reply".to_string()))
        }
        RespFrame::Integer(n) => Ok(n.to_string()),
        _ => Err(unexpected("string", frame)),
    }
}

/// Extract an optional string; nil replies become `None`
pub fn extract_optional_string(frame: &RespFrame) -> Result<Option<String>> {
    if frame.is_null() {
        return Ok(None);
    }
    extract_string(frame).map(Some)
}

/// Extract an integer from a RESP frame
pub fn extract_integer(frame: &RespFrame) -> Result<i64> {
    match frame {
        RespFrame::Integer(value) => Ok(*value),
        RespFrame::BulkString(Some(data)) => std::str::from_utf8(data)
            .ok()
            .and_then(|s| s.parse::<i64>().ok())
            .ok_or_else(|| Error::Protocol("Expected integer".to_string())),
        _ => Err(unexpected("integer", frame)),
    }
}

/// Extract an optional integer; nil replies become `None`
pub fn extract_optional_integer(frame: &RespFrame) -> Result<Option<i64>> {
    if frame.is_null() {
        return Ok(None);
    }
    extract_integer(frame).map(Some)
}

/// Extract a score. Scores travel as bulk strings in RESP2 and as doubles
/// in RESP3; `inf`/`-inf` are spelled out.
pub fn extract_float(frame: &RespFrame) -> Result<f64> {
    match frame {
        RespFrame::Double(value) => Ok(*value),
        RespFrame::Integer(value) => Ok(*value as f64),
        RespFrame::BulkString(Some(data)) | RespFrame::SimpleString(data) => {
            std::str::from_utf8(data)
                .ok()
                .and_then(parse_score)
                .ok_or_else(|| Error::Protocol("Expected floating point score".to_string()))
        }
        _ => Err(unexpected("score", frame)),
    }
}

/// Extract an optional score; nil replies become `None`
pub fn extract_optional_float(frame: &RespFrame) -> Result<Option<f64>> {
    if frame.is_null() {
        return Ok(None);
    }
    extract_float(frame).map(Some)
}

/// Extract the elements of an array reply; a nil array is empty
pub fn extract_array(frame: RespFrame) -> Result<Vec<RespFrame>> {
    match frame {
        RespFrame::Array(Some(items)) => Ok(items),
        RespFrame::Array(None) | RespFrame::Null => Ok(Vec::new()),
        other => Err(unexpected("array", &other)),
    }
}

/// Format a score the way the store spells it on the wire
pub fn format_score(score: f64) -> String {
    if score == f64::INFINITY {
        "+inf".to_string()
    } else if score == f64::NEG_INFINITY {
        "-inf".to_string()
    } else {
        score.to_string()
    }
}

/// Parse a score as spelled by the store
pub fn parse_score(raw: &str) -> Option<f64> {
    match raw.to_ascii_lowercase().as_str() {
        "inf" | "+inf" => Some(f64::INFINITY),
        "-inf" => Some(f64::NEG_INFINITY),
        other => other.parse::<f64>().ok().filter(|f| !f.is_nan()),
    }
}

fn unexpected(expected: &str, frame: &RespFrame) -> Error {
    match frame.error_message() {
        Some(message) => Error::Store(message),
        None => Error::Protocol(format!("Expected {} reply, got {:?}", expected, frame)),
    }
}
