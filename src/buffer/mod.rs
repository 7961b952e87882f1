//! Internal buffer management.
//!
//! A thread-local pool of read buffers used when pull streams are consumed
//! chunk by chunk. It is an implementation detail and not part of the public
//! API.

mod pool;

pub(crate) use pool::Buffer;
