//! Compute-once cells used for derived values such as canonical text.

use std::fmt;
use std::sync::{Arc, OnceLock};

use sha2::{Digest, Sha256};

/// A value computed at most once and then cached for the lifetime of its owner.
///
/// Safe to share across threads; concurrent first calls may both compute, but
/// only one result is kept. Cloning copies the cached value, so clones of a
/// node never recompute it.
pub struct Memo<T> {
    cell: OnceLock<T>,
}

impl<T> Memo<T> {
    pub const fn new() -> Self {
        Self {
            cell: OnceLock::new(),
        }
    }

    pub fn get_or_init(&self, init: impl FnOnce() -> T) -> &T {
        self.cell.get_or_init(init)
    }

    /// The cached value, if it has been computed.
    pub fn get(&self) -> Option<&T> {
        self.cell.get()
    }
}

impl<T> Default for Memo<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Clone for Memo<T> {
    fn clone(&self) -> Self {
        let cell = OnceLock::new();
        if let Some(value) = self.cell.get() {
            let _ = cell.set(value.clone());
        }
        Self { cell }
    }
}

impl<T> fmt::Debug for Memo<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Memo")
            .field("cached", &self.cell.get().is_some())
            .finish()
    }
}

/// Cached identity of a model node: its canonical text and content hash.
#[derive(Debug, Clone, Default)]
pub struct Identity {
    text: Memo<Arc<str>>,
    hash: Memo<String>,
}

impl Identity {
    pub(crate) fn canonical_text(&self, render: impl FnOnce() -> String) -> Arc<str> {
        Arc::clone(self.text.get_or_init(|| Arc::from(render())))
    }

    pub(crate) fn content_hash(&self, text: impl FnOnce() -> Arc<str>) -> &str {
        self.hash
            .get_or_init(|| hex::encode(Sha256::digest(text().as_bytes())))
    }

    /// True once the canonical text has been computed.
    pub fn is_cached(&self) -> bool {
        self.text.get().is_some()
    }
}
