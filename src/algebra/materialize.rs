//! Typed results from raw replies

use std::collections::HashSet;

use crate::codec::Element;
use crate::error::{Error, Result};
use crate::protocol::{extract_array, extract_float, extract_integer, extract_optional_string, extract_string, RespFrame};

/// One element
pub fn element<T: Element>(frame: &RespFrame) -> Result<T> {
    T::decode(&extract_string(frame)?)
}

/// One element, or `None` for a nil reply
pub fn optional<T: Element>(frame: &RespFrame) -> Result<Option<T>> {
    extract_optional_string(frame)?.map(|raw| T::decode(&raw)).transpose()
}

/// Members of a set reply
pub fn members<T: Element>(frame: RespFrame) -> Result<HashSet<T>> {
    extract_array(frame)?.iter().map(element::<T>).collect()
}

/// Elements of an ordered reply, order kept
pub fn sequence<T: Element>(frame: RespFrame) -> Result<Vec<T>> {
    extract_array(frame)?.iter().map(element::<T>).collect()
}

/// `member score member score ...` as pairs, order kept
pub fn scored<T: Element>(frame: RespFrame) -> Result<Vec<(T, f64)>> {
    let items = extract_array(frame)?;
    if items.len() % 2 != 0 {
        return Err(Error::Protocol(format!(
            "scored reply has an odd number of items ({})",
            items.len()
        )));
    }
    items
        .chunks_exact(2)
        .map(|pair| Ok((element(&pair[0])?, extract_float(&pair[1])?)))
        .collect()
}

/// Integer reply read as a flag
pub fn flag(frame: &RespFrame) -> Result<bool> {
    Ok(extract_integer(frame)? != 0)
}

/// Integer reply read as a count
pub fn count(frame: &RespFrame) -> Result<usize> {
    let n = extract_integer(frame)?;
    usize::try_from(n).map_err(|_| Error::Protocol(format!("negative count {}", n)))
}
