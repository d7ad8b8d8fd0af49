use std::{
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError},
};

use bytes::Bytes;
use tracing::debug;
use uuid::Uuid;

pub fn is_previewable(mime_type: &str) -> bool {
    mime_type.starts_with("image/")
}

#[derive(Debug, Clone)]
pub struct Preview {
    pub mime_type: String,
    pub content: Bytes,
}

/// In-memory store backing preview handles. Entries live exactly as long as
/// the handle that owns them.
#[derive(Debug, Default)]
pub struct PreviewCache {
    entries: Mutex<HashMap<Uuid, Preview>>,
}

impl PreviewCache {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn insert(self: &Arc<Self>, mime_type: String, content: Bytes) -> PreviewHandle {
        let key = Uuid::new_v4();
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, Preview { mime_type, content });

        PreviewHandle {
            key,
            cache: Arc::clone(self),
        }
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn get(&self, key: &Uuid) -> Option<Preview> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn release(&self, key: &Uuid) {
        let removed = self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
        if removed.is_some() {
            debug!("Released preview {}", key);
        }
    }
}

/// Owning reference to a cached preview. Not `Clone`: dropping it is the one
/// and only release.
pub struct PreviewHandle {
    key: Uuid,
    cache: Arc<PreviewCache>,
}

impl PreviewHandle {
    pub fn load(&self) -> Option<Preview> {
        self.cache.get(&self.key)
    }
}

impl Drop for PreviewHandle {
    fn drop(&mut self) {
        self.cache.release(&self.key);
    }
}

impl std::fmt::Debug for PreviewHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreviewHandle")
            .field("key", &self.key)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drop_releases_entry() {
        let cache = PreviewCache::new();
        let handle = cache.insert("image/png".to_string(), Bytes::from_static(b"png"));
        assert_eq!(cache.len(), 1);
        assert_eq!(handle.load().unwrap().content, Bytes::from_static(b"png"));

        drop(handle);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_previewable_mime_types() {
        assert!(is_previewable("image/webp"));
        assert!(!is_previewable("application/pdf"));
    }
}
