//! In-process store behind `blob:` URLs.

use dashmap::DashMap;
use tracing::debug;
use uuid::Uuid;

use crate::data::Blob;

const PREFIX: &str = "blob:binconv/";

/// Maps object URLs to the blobs they name until revoked.
#[derive(Debug, Default)]
pub(crate) struct ObjectUrls {
    entries: DashMap<String, Blob>,
}

impl ObjectUrls {
    /// Stores `blob` under a fresh URL.
    pub(crate) fn register(&self, blob: Blob) -> String {
        let url = format!("{PREFIX}{}", Uuid::new_v4());
        debug!(%url, len = blob.len(), "registered object URL");
        self.entries.insert(url.clone(), blob);
        url
    }

    pub(crate) fn get(&self, url: &str) -> Option<Blob> {
        self.entries.get(url).map(|entry| entry.value().clone())
    }

    pub(crate) fn revoke(&self, url: &str) -> bool {
        let removed = self.entries.remove(url).is_some();
        if removed {
            debug!(%url, "revoked object URL");
        }
        removed
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}
