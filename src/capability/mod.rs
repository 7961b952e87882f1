//! Runtime capability detection.
//!
//! Which representations are usable depends on the features this crate was
//! built with. Absent capabilities stay visible: the registry binds their
//! tags to a converter that fails with
//! [`ConvertError::RepresentationUnavailable`](crate::ConvertError::RepresentationUnavailable).

use once_cell::sync::OnceCell;
use tracing::debug;

use crate::config::UrlKind;
use crate::data::RepresentationTag;

static DETECTED: OnceCell<Capabilities> = OnceCell::new();

/// Capabilities of the current runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Capabilities {
    /// Opaque blobs.
    pub blob: bool,
    /// Pull-style streams.
    pub pull_stream: bool,
    /// Push-style streams.
    pub push_stream: bool,
    /// Reading and writing `file:` URLs.
    pub file_urls: bool,
    /// Creating `blob:` object URLs.
    pub object_urls: bool,
    /// Charsets beyond utf8 and utf16le.
    pub extended_charsets: bool,
}

impl Capabilities {
    /// Detects the capabilities once and returns the cached result.
    pub fn detect() -> Self {
        *DETECTED.get_or_init(|| {
            let caps = Self {
                blob: cfg!(feature = "blob"),
                pull_stream: true,
                push_stream: true,
                file_urls: cfg!(feature = "fs"),
                object_urls: cfg!(feature = "object-urls"),
                extended_charsets: cfg!(feature = "extended-charsets"),
            };
            debug!(?caps, "detected runtime capabilities");
            caps
        })
    }

    /// Everything enabled. Useful for tests that want every converter live.
    pub const fn all() -> Self {
        Self {
            blob: true,
            pull_stream: true,
            push_stream: true,
            file_urls: true,
            object_urls: true,
            extended_charsets: true,
        }
    }

    /// Returns true if values of `tag` can be produced and consumed.
    pub fn supports(&self, tag: RepresentationTag) -> bool {
        match tag {
            RepresentationTag::OpaqueBlob => self.blob,
            RepresentationTag::PullStream => self.pull_stream,
            RepresentationTag::PushStream => self.push_stream,
            RepresentationTag::Unavailable => false,
            _ => true,
        }
    }

    /// Returns a copy with `tag` disabled.
    pub fn without(mut self, tag: RepresentationTag) -> Self {
        match tag {
            RepresentationTag::OpaqueBlob => {
                self.blob = false;
                self.object_urls = false;
            }
            RepresentationTag::PullStream => self.pull_stream = false,
            RepresentationTag::PushStream => self.push_stream = false,
            _ => {}
        }
        self
    }

    /// Sets object URL support.
    pub fn with_object_urls(mut self, enabled: bool) -> Self {
        self.object_urls = enabled && self.blob;
        self
    }

    /// Sets file URL support.
    pub fn with_file_urls(mut self, enabled: bool) -> Self {
        self.file_urls = enabled;
        self
    }

    /// Returns true if `kind` can be produced here.
    pub fn supports_url(&self, kind: UrlKind) -> bool {
        match kind {
            UrlKind::File => self.file_urls,
            UrlKind::Blob => self.object_urls,
            UrlKind::Data => true,
        }
    }

    /// Default URL flavor: file on a server runtime, blob where object URLs
    /// exist, inline data otherwise.
    pub fn default_url_kind(&self) -> UrlKind {
        if self.file_urls {
            UrlKind::File
        } else if self.object_urls {
            UrlKind::Blob
        } else {
            UrlKind::Data
        }
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::detect()
    }
}
