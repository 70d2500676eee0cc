//! Save and load options.

use std::fmt;
use std::sync::Arc;

use simstore_model::Address;
use simstore_model::text::CANONICAL_INDENT;

use crate::hooks::{DecodeHook, EncodeHook};

/// Default gzip level for `.hdf5.gz` files.
pub const DEFAULT_COMPRESSION_LEVEL: u32 = 6;

/// Options for writing a document.
#[derive(Clone)]
pub struct SaveOptions {
    /// Indent of JSON output and of the document embedded in containers
    /// (default: 4, the canonical indent).
    pub indent: usize,
    /// Gzip level 0-9 for `.hdf5.gz` files (default: 6).
    pub compression_level: u32,
    /// Hooks called for every field while a container is written.
    pub encode_hooks: Vec<Arc<dyn EncodeHook>>,
}

impl Default for SaveOptions {
    fn default() -> Self {
        Self {
            indent: CANONICAL_INDENT,
            compression_level: DEFAULT_COMPRESSION_LEVEL,
            encode_hooks: Vec::new(),
        }
    }
}

impl SaveOptions {
    /// Create save options with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the JSON indent.
    #[must_use]
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    /// Set the gzip level, clamped to 9.
    #[must_use]
    pub fn with_compression_level(mut self, level: u32) -> Self {
        self.compression_level = level.min(9);
        self
    }

    /// Add an encode hook.
    #[must_use]
    pub fn with_encode_hook<H: EncodeHook + 'static>(mut self, hook: H) -> Self {
        self.encode_hooks.push(Arc::new(hook));
        self
    }
}

impl fmt::Debug for SaveOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SaveOptions")
            .field("indent", &self.indent)
            .field("compression_level", &self.compression_level)
            .field("encode_hooks", &self.encode_hooks.len())
            .finish()
    }
}

/// Options for reading a document.
#[derive(Clone)]
pub struct LoadOptions {
    /// Sub-tree to load instead of the whole document.
    pub address: Option<Address>,
    /// Check each array entry against the digest in its marker (default: true).
    pub verify_digests: bool,
    /// Hooks called for every mapping field before typed decoding.
    pub decode_hooks: Vec<Arc<dyn DecodeHook>>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            address: None,
            verify_digests: true,
            decode_hooks: Vec::new(),
        }
    }
}

impl LoadOptions {
    /// Create load options with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load only the sub-tree at `address`.
    #[must_use]
    pub fn with_address(mut self, address: impl Into<Address>) -> Self {
        self.address = Some(address.into());
        self
    }

    /// Enable or disable digest checks on array entries.
    #[must_use]
    pub fn with_verify_digests(mut self, verify: bool) -> Self {
        self.verify_digests = verify;
        self
    }

    /// Add a decode hook.
    #[must_use]
    pub fn with_decode_hook<H: DecodeHook + 'static>(mut self, hook: H) -> Self {
        self.decode_hooks.push(Arc::new(hook));
        self
    }

    /// The requested address, or the root.
    pub fn target(&self) -> Address {
        self.address.clone().unwrap_or_else(Address::root)
    }
}

impl fmt::Debug for LoadOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadOptions")
            .field("address", &self.address)
            .field("verify_digests", &self.verify_digests)
            .field("decode_hooks", &self.decode_hooks.len())
            .finish()
    }
}
