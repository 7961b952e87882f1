//! Stream adapters between the pull and push representations.
//!
//! - [`ReadChunks`] - Push stream of chunks read from a pull stream
//! - [`into_pull`] - Pull stream reading a push stream

mod read_chunks;

pub use read_chunks::ReadChunks;

use futures_util::TryStreamExt;

use crate::data::{PullStream, PushStream};

/// Turns a pull stream into a push stream of `chunk_size` reads.
pub fn into_push(reader: PullStream, chunk_size: usize) -> PushStream {
    Box::pin(ReadChunks::new(reader, chunk_size))
}

/// Turns a push stream into a pull stream.
pub fn into_pull(stream: PushStream) -> PullStream {
    Box::pin(stream.into_async_read())
}
