//! RESP reply parser
//!
//! Incremental: bytes read from the socket are fed in as they arrive and
//! complete frames are handed out one at a time.

use std::sync::Arc;

use super::resp::RespFrame;
use crate::error::{Error, Result};

/// Parser state for incremental RESP parsing
pub struct RespParser {
    buffer: Vec<u8>,
    position: usize,
}

impl RespParser {
    /// Create a new parser
    pub fn new() -> Self {
        RespParser {
            buffer: Vec::with_capacity(4096),
            position: 0,
        }
    }

    /// Feed data into the parser
    pub fn feed(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    /// Try to parse a complete frame from the buffer
    pub fn parse(&mut self) -> Result<Option<RespFrame>> {
        if self.position >= self.buffer.len() {
            return Ok(None);
        }

        match parse_frame(&self.buffer[self.position..])? {
            Some((frame, consumed)) => {
                self.position += consumed;
                // Compact once more than half the buffer has been consumed
                if self.position > self.buffer.len() / 2 {
                    self.buffer.drain(..self.position);
                    self.position = 0;
                }
                Ok(Some(frame))
            }
            None => Ok(None),
        }
    }

    /// Bytes received but not yet consumed by a complete frame
    pub fn pending(&self) -> usize {
        self.buffer.len() - self.position
    }

    /// Clear the parser buffer
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.position = 0;
    }
}

impl Default for RespParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a RESP frame from a byte slice
/// Returns Some((frame, bytes_consumed)) if a complete frame is found
pub fn parse_resp_frame(data: &[u8]) -> Result<Option<(RespFrame, usize)>> {
    parse_frame(data)
}

fn parse_frame(data: &[u8]) -> Result<Option<(RespFrame, usize)>> {
    if data.is_empty() {
        return Ok(None);
    }

    match data[0] {
        b'+' => parse_simple_string(data),
        b'-' => parse_error(data),
        b':' => parse_integer(data),
        b'$' => parse_bulk_string(data),
        b'*' => parse_array(data),
        b'_' => parse_null(data),
        b'#' => parse_boolean(data),
        b',' => parse_double(data),
        other => Err(Error::Protocol(format!(
            "Invalid RESP type byte: {}",
            other as char
        ))),
    }
}

/// +OK\r\n
fn parse_simple_string(data: &[u8]) -> Result<Option<(RespFrame, usize)>> {
    Ok(parse_line(data, 1)
        .map(|(line, consumed)| (RespFrame::SimpleString(Arc::new(line.to_vec())), consumed)))
}

/// -Error message\r\n
fn parse_error(data: &[u8]) -> Result<Option<(RespFrame, usize)>> {
    Ok(parse_line(data, 1)
        .map(|(line, consumed)| (RespFrame::Error(Arc::new(line.to_vec())), consumed)))
}

/// :1000\r\n
fn parse_integer(data: &[u8]) -> Result<Option<(RespFrame, usize)>> {
    match parse_line(data, 1) {
        Some((line, consumed)) => Ok(Some((RespFrame::Integer(parse_number(line, "integer")?), consumed))),
        None => Ok(None),
    }
}

/// $6\r\nfoobar\r\n or $-1\r\n
fn parse_bulk_string(data: &[u8]) -> Result<Option<(RespFrame, usize)>> {
    let (len_line, header_consumed) = match parse_line(data, 1) {
        Some(v) => v,
        None => return Ok(None),
    };

    let len: i64 = parse_number(len_line, "bulk string length")?;
    if len == -1 {
        return Ok(Some((RespFrame::BulkString(None), header_consumed)));
    }
    if len < 0 {
        return Err(Error::Protocol("Invalid negative bulk string length".into()));
    }

    let len = len as usize;
    let total_needed = header_consumed + len + 2;
    if data.len() < total_needed {
        return Ok(None);
    }

    if data[header_consumed + len] != b'\r' || data[header_consumed + len + 1] != b'\n' {
        return Err(Error::Protocol("Missing CRLF after bulk string".into()));
    }

    let content = data[header_consumed..header_consumed + len].to_vec();
    Ok(Some((RespFrame::BulkString(Some(Arc::new(content))), total_needed)))
}

/// *2\r\n$3\r\nfoo\r\n$3\r\nbar\r\n
fn parse_array(data: &[u8]) -> Result<Option<(RespFrame, usize)>> {
    let (len_line, header_consumed) = match parse_line(data, 1) {
        Some(v) => v,
        None => return Ok(None),
    };

    let len: i64 = parse_number(len_line, "array length")?;
    if len == -1 {
        return Ok(Some((RespFrame::Array(None), header_consumed)));
    }
    if len < 0 {
        return Err(Error::Protocol("Invalid negative array length".into()));
    }

    let len = len as usize;
    let mut elements = Vec::with_capacity(len.min(1024));
    let mut total_consumed = header_consumed;

    for _ in 0..len {
        match parse_frame(&data[total_consumed..])? {
            Some((frame, consumed)) => {
                elements.push(frame);
                total_consumed += consumed;
            }
            None => return Ok(None),
        }
    }

    Ok(Some((RespFrame::Array(Some(elements)), total_consumed)))
}

/// _\r\n
fn parse_null(data: &[u8]) -> Result<Option<(RespFrame, usize)>> {
    if data.len() < 3 {
        return Ok(None);
    }
    if data[1] == b'\r' && data[2] == b'\n' {
        Ok(Some((RespFrame::Null, 3)))
    } else {
        Err(Error::Protocol("Invalid null format".into()))
    }
}

/// #t\r\n or #f\r\n
fn parse_boolean(data: &[u8]) -> Result<Option<(RespFrame, usize)>> {
    if data.len() < 4 {
        return Ok(None);
    }
    match (data[1], data[2], data[3]) {
        (b't', b'\r', b'\n') => Ok(Some((RespFrame::Boolean(true), 4))),
        (b'f', b'\r', b'\n') => Ok(Some((RespFrame::Boolean(false), 4))),
        _ => Err(Error::Protocol("Invalid boolean format".into())),
    }
}

/// ,1.23\r\n
fn parse_double(data: &[u8]) -> Result<Option<(RespFrame, usize)>> {
    match parse_line(data, 1) {
        Some((line, consumed)) => Ok(Some((RespFrame::Double(parse_number(line, "double")?), consumed))),
        None => Ok(None),
    }
}

fn parse_number<N: std::str::FromStr>(line: &[u8], what: &str) -> Result<N> {
    std::str::from_utf8(line)
        .ok()
        .and_then(|s| s.parse::<N>().ok())
        .ok_or_else(|| Error::Protocol(format!("Invalid {} format", what)))
}

/// Line ending with \r\n, without its type prefix
fn parse_line(data: &[u8], skip_prefix: usize) -> Option<(&[u8], usize)> {
    if data.len() < skip_prefix + 2 {
        return None;
    }

    (skip_prefix..data.len() - 1)
        .find(|&i| data[i] == b'\r' && data[i + 1] == b'\n')
        .map(|i| (&data[skip_prefix..i], i + 2))
}
