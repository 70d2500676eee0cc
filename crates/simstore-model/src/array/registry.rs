//! Registry mapping array kind ids to reconstruct functions, plus the marker
//! tokens that stand in for arrays inside text documents.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use super::kinds::BUILTIN_KINDS;
use super::{DataArray, RawArray};
use crate::error::{ModelError, Result};

/// Rebuilds a typed array from its stored parts.
pub type Reconstruct = fn(RawArray) -> Result<DataArray>;

/// Prefix of every array marker.
pub const MARKER_PREFIX: &str = "@array:";

const DIGEST_LEN: usize = 16;

/// Registry of array kinds that can be rebuilt from a container.
#[derive(Debug, Clone, Default)]
pub struct ArrayRegistry {
    kinds: BTreeMap<String, Reconstruct>,
}

impl ArrayRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every built-in kind.
    pub fn with_builtin_kinds() -> Self {
        let kinds = BUILTIN_KINDS
            .iter()
            .map(|(kind, reconstruct)| ((*kind).to_string(), *reconstruct))
            .collect();
        Self { kinds }
    }

    /// Register a kind. Each kind id can be registered once.
    pub fn register(&mut self, kind: impl Into<String>, reconstruct: Reconstruct) -> Result<()> {
        let kind = kind.into();
        if self.kinds.contains_key(&kind) {
            return Err(ModelError::DuplicateArrayKind { kind });
        }
        tracing::debug!(kind = %kind, "registered array kind");
        self.kinds.insert(kind, reconstruct);
        Ok(())
    }

    /// Look up the reconstruct function for a kind.
    pub fn resolve(&self, kind: &str) -> Result<Reconstruct> {
        self.kinds
            .get(kind)
            .copied()
            .ok_or_else(|| ModelError::UnknownArrayKind {
                kind: kind.to_string(),
            })
    }

    /// Rebuild an array through its kind's reconstruct function.
    pub fn reconstruct(&self, raw: RawArray) -> Result<DataArray> {
        let reconstruct = self.resolve(&raw.kind)?;
        reconstruct(raw)
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.kinds.contains_key(kind)
    }

    /// Registered kind ids in sorted order.
    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.kinds.keys().map(String::as_str)
    }
}

static REGISTRY: OnceLock<ArrayRegistry> = OnceLock::new();

/// The process-wide registry, built with the built-in kinds on first use.
pub fn array_registry() -> &'static ArrayRegistry {
    REGISTRY.get_or_init(ArrayRegistry::with_builtin_kinds)
}

/// Install a custom process-wide registry.
///
/// Must run before anything loads a container (the first load initializes
/// the default registry). Returns the registry back if one is already in
/// place.
pub fn install_registry(registry: ArrayRegistry) -> std::result::Result<(), ArrayRegistry> {
    REGISTRY.set(registry)
}

/// Parts of a parsed marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkerRef<'a> {
    pub kind: &'a str,
    pub digest: &'a str,
}

/// Render the marker for an array kind and payload digest.
pub fn marker(kind: &str, digest: &str) -> String {
    format!("{MARKER_PREFIX}{kind}:{digest}")
}

/// Parse a marker of the form `@array:<kind>:<16 hex digits>`.
pub fn parse_marker(text: &str) -> Option<MarkerRef<'_>> {
    let rest = text.strip_prefix(MARKER_PREFIX)?;
    let (kind, digest) = rest.rsplit_once(':')?;
    let valid = !kind.is_empty()
        && digest.len() == DIGEST_LEN
        && digest.bytes().all(|b| b.is_ascii_hexdigit());
    valid.then_some(MarkerRef { kind, digest })
}

/// True if `text` is an array marker.
pub fn is_marker(text: &str) -> bool {
    parse_marker(text).is_some()
}
