//! Container writer.

use std::collections::HashSet;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use simstore_model::array::payload;
use simstore_model::{Address, DataArray, Map, Value, is_marker, text};
use tempfile::NamedTempFile;

use super::layout::{
    DOCUMENT_KEY, EntryKind, HEADER_SIZE, IndexEntry, encode_index, header_bytes, trailer_bytes,
};
use crate::atomic;
use crate::error::{Result, StoreError};
use crate::options::SaveOptions;

/// Writes entries into a temp file beside the target;
/// [`finish_with_document`](Self::finish_with_document) appends the document
/// and index, then renames the file over the target.
///
/// Dropping an unfinished writer discards the temp file.
pub struct ContainerWriter {
    path: PathBuf,
    out: BufWriter<NamedTempFile>,
    position: u64,
    entries: Vec<IndexEntry>,
    keys: HashSet<String>,
}

impl ContainerWriter {
    /// Start a container that will replace `path`.
    pub fn create(path: &Path) -> Result<Self> {
        let temp = atomic::temp_beside(path)?;
        let mut out = BufWriter::new(temp);
        out.write_all(&header_bytes())
            .map_err(|e| StoreError::io("write", path, e))?;
        Ok(Self {
            path: path.to_path_buf(),
            out,
            position: HEADER_SIZE,
            entries: Vec::new(),
            keys: HashSet::new(),
        })
    }

    /// Target path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write an array payload at its address.
    pub fn add_array(&mut self, address: &Address, array: &DataArray) -> Result<()> {
        let bytes = payload::encode(array);
        tracing::debug!(
            address = %address,
            kind = array.kind(),
            cells = array.len(),
            "writing array entry"
        );
        self.add_entry(EntryKind::Array, address.to_string(), &bytes)
    }

    /// Write extra bytes under `key`. Keys are unique across the container.
    pub fn add_attachment(&mut self, key: impl Into<String>, bytes: &[u8]) -> Result<()> {
        let key = key.into();
        if key.is_empty() || key == DOCUMENT_KEY {
            return Err(StoreError::InvalidKey {
                key,
                address: Address::root(),
            });
        }
        tracing::debug!(key = %key, bytes = bytes.len(), "writing attachment entry");
        self.add_entry(EntryKind::Attachment, key, bytes)
    }

    fn add_entry(&mut self, kind: EntryKind, key: String, bytes: &[u8]) -> Result<()> {
        if !self.keys.insert(key.clone()) {
            return Err(StoreError::DuplicateEntry {
                address: key,
                path: self.path.clone(),
            });
        }
        self.out
            .write_all(bytes)
            .map_err(|e| StoreError::io("write", &self.path, e))?;
        let length = bytes.len() as u64;
        self.entries.push(IndexEntry {
            kind,
            key,
            offset: self.position,
            length,
        });
        self.position += length;
        Ok(())
    }

    /// Store the embedded document, append the index and trailer, then
    /// replace the target.
    pub fn finish_with_document(mut self, document: &str) -> Result<()> {
        self.add_entry(EntryKind::Document, DOCUMENT_KEY.to_string(), document.as_bytes())?;
        self.finish()
    }

    fn finish(mut self) -> Result<()> {
        let index = encode_index(&self.entries);
        self.out
            .write_all(&index)
            .and_then(|()| self.out.write_all(&trailer_bytes(self.position)))
            .map_err(|e| StoreError::io("write", &self.path, e))?;
        let temp = self
            .out
            .into_inner()
            .map_err(|e| StoreError::io("write", &self.path, e.into_error()))?;
        atomic::persist(temp, &self.path)
    }
}

/// Write `root` as a container at `path`.
pub fn write_container(root: &Value, path: &Path, options: &SaveOptions) -> Result<()> {
    check_tree(root, &Address::root())?;
    let mut writer = ContainerWriter::create(path)?;

    for (address, array) in root.arrays(&Address::root()) {
        writer.add_array(&address, array)?;
    }

    if !options.encode_hooks.is_empty() {
        root.walk(&Address::root(), &mut |address, value| {
            options
                .encode_hooks
                .iter()
                .try_for_each(|hook| hook.encode(address, value, &mut writer))
        })?;
    }

    let document = text::render_json(&text::to_json_value(root), options.indent);
    let entries = writer.entries.len() + 1;
    writer.finish_with_document(&document)?;
    tracing::debug!(path = %path.display(), entries, "wrote container");
    Ok(())
}

/// Mapping keys become address segments, so they must be non-empty and free
/// of `/`. Strings must not parse as array markers, or the load would look
/// for an entry that was never written.
fn check_tree(value: &Value, at: &Address) -> Result<()> {
    match value {
        Value::Map(map) => check_map(map, at),
        Value::Seq(items) => items
            .iter()
            .enumerate()
            .try_for_each(|(index, item)| check_tree(item, &at.index(index))),
        Value::Str(string) if is_marker(string) => Err(StoreError::MarkerText {
            text: string.clone(),
            address: at.clone(),
        }),
        _ => Ok(()),
    }
}

fn check_map(map: &Map, at: &Address) -> Result<()> {
    for (key, child) in map {
        if key.is_empty() || key.contains('/') {
            return Err(StoreError::InvalidKey {
                key: key.clone(),
                address: at.clone(),
            });
        }
        check_tree(child, &at.child(key))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_empty_container_layout() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.hdf5");
        write_container(&Value::Null, &path, &SaveOptions::default()).unwrap();

        let bytes = fs::read(&path).unwrap();
        assert_eq!(&bytes[0..4], b"SSC1");
        assert_eq!(&bytes[bytes.len() - 4..], b"SSC1");
        // header, "null", then the index
        assert_eq!(&bytes[8..12], b"null");
    }

    #[test]
    fn test_duplicate_keys_are_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("dup.hdf5");
        let mut writer = ContainerWriter::create(&path).unwrap();
        writer.add_attachment("notes", b"a").unwrap();
        let err = writer.add_attachment("notes", b"b").unwrap_err();
        assert!(matches!(err, StoreError::DuplicateEntry { .. }));
        drop(writer);
        assert!(!path.exists());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_slash_in_key_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.hdf5");
        let mut inner = Map::new();
        inner.insert("a/b".into(), Value::Int(1));
        let mut root = Map::new();
        root.insert("monitor_data".into(), Value::Map(inner));

        let err = write_container(&Value::Map(root), &path, &SaveOptions::default()).unwrap_err();
        match err {
            StoreError::InvalidKey { key, address } => {
                assert_eq!(key, "a/b");
                assert_eq!(address.to_string(), "/monitor_data");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(!path.exists());
    }
}
