//! Internal utility functions and helpers.
//!
//! This module contains small helper functions used throughout the crate.
//! It is an implementation detail and not part of the public API.

use bytes::Bytes;

use crate::range::Window;

/// Restricts an owned byte vector to `window` in place, without reallocating.
pub(crate) fn clip_vec(mut data: Vec<u8>, window: Window) -> Vec<u8> {
    let r = window.clip_usize(data.len());
    data.truncate(r.end);
    data.drain(..r.start);
    data
}

/// Restricts shared bytes to `window` without copying.
pub(crate) fn clip_bytes(data: Bytes, window: Window) -> Bytes {
    let r = window.clip_usize(data.len());
    data.slice(r)
}

/// Splits `data` into zero-copy pieces of at most `chunk_size` bytes.
pub(crate) fn split_bytes(data: Bytes, chunk_size: usize) -> Vec<Bytes> {
    let chunk_size = chunk_size.max(1);
    let mut pieces = Vec::with_capacity(data.len().div_ceil(chunk_size));
    let mut start = 0;
    while start < data.len() {
        let end = (start + chunk_size).min(data.len());
        pieces.push(data.slice(start..end));
        start = end;
    }
    pieces
}
