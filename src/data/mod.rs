//! Data model.
//!
//! - [`RepresentationTag`] - Closed set of physical forms
//! - [`Data`] - A value in one of those forms
//! - [`Blob`] - Opaque binary object with explicit reads

mod blob;
mod tag;
mod value;

pub use blob::{Blob, BlobSource};
pub use tag::RepresentationTag;
pub use value::{Data, PullStream, PushStream};
