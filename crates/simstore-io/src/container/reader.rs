//! Container reader.
//!
//! The reader keeps one read-only handle and fetches entries with positional
//! reads, so a shared `&ContainerReader` serves concurrent partial reads
//! without locking.

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use serde_json::Value as JsonValue;
use simstore_model::array::payload;
use simstore_model::{Address, Coords, DataArray, RawArray, array_registry, is_marker};

use super::layout::{
    DOCUMENT_KEY, EntryKind, HEADER_SIZE, IndexEntry, TRAILER_SIZE, check_header, decode_index,
    parse_trailer,
};
use crate::error::{Result, StoreError};

/// Summary of one entry, for listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryInfo {
    pub key: String,
    pub kind: EntryKind,
    /// Payload size in bytes.
    pub bytes: u64,
    /// Array kind id, for array entries.
    pub array_kind: Option<String>,
    /// Coordinate lengths, for array entries.
    pub shape: Option<Vec<usize>>,
}

/// Open container file.
#[derive(Debug)]
pub struct ContainerReader {
    path: PathBuf,
    file: File,
    entries: Vec<IndexEntry>,
    lookup: HashMap<String, usize>,
}

impl ContainerReader {
    /// Open a container and read its index.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| StoreError::io("open", path, e))?;
        let len = file
            .metadata()
            .map_err(|e| StoreError::io("read", path, e))?
            .len();
        if len < HEADER_SIZE + TRAILER_SIZE {
            return Err(StoreError::invalid_format(path, "file is too short to be a container"));
        }

        let header = read_at(&file, path, 0, HEADER_SIZE)?;
        check_header(&header, path)?;
        let index_end = len - TRAILER_SIZE;
        let trailer = read_at(&file, path, index_end, TRAILER_SIZE)?;
        let index_offset = parse_trailer(&trailer, path)?;
        if index_offset < HEADER_SIZE || index_offset > index_end {
            return Err(StoreError::invalid_format(path, "index offset out of range"));
        }
        let index = read_at(&file, path, index_offset, index_end - index_offset)?;
        let entries = decode_index(&index, index_offset, path)?;

        let mut lookup = HashMap::with_capacity(entries.len());
        for (position, entry) in entries.iter().enumerate() {
            if lookup.insert(entry.key.clone(), position).is_some() {
                return Err(StoreError::DuplicateEntry {
                    address: entry.key.clone(),
                    path: path.to_path_buf(),
                });
            }
        }
        tracing::debug!(path = %path.display(), entries = entries.len(), "opened container");

        Ok(Self {
            path: path.to_path_buf(),
            file,
            entries,
            lookup,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Index entries in file order.
    pub fn index(&self) -> &[IndexEntry] {
        &self.entries
    }

    /// Look up an entry by key.
    pub fn entry(&self, key: &str) -> Option<&IndexEntry> {
        self.lookup.get(key).map(|position| &self.entries[*position])
    }

    fn entry_of_kind(&self, key: &str, kind: EntryKind) -> Result<&IndexEntry> {
        self.entry(key)
            .filter(|entry| entry.kind == kind)
            .ok_or_else(|| StoreError::MissingEntry {
                address: key.to_string(),
                path: self.path.clone(),
            })
    }

    fn read_entry(&self, entry: &IndexEntry) -> Result<Vec<u8>> {
        read_at(&self.file, &self.path, entry.offset, entry.length)
    }

    /// The embedded document text.
    pub fn document_text(&self) -> Result<String> {
        let entry = self.entry_of_kind(DOCUMENT_KEY, EntryKind::Document)?;
        String::from_utf8(self.read_entry(entry)?)
            .map_err(|_| StoreError::invalid_format(&self.path, "embedded document is not UTF-8"))
    }

    /// The embedded document, parsed.
    pub fn document(&self) -> Result<JsonValue> {
        serde_json::from_str(&self.document_text()?).map_err(|source| StoreError::Json {
            path: self.path.clone(),
            source,
        })
    }

    /// Read the array stored at `address` and rebuild its typed kind through
    /// the process-wide registry.
    pub fn read_array(&self, address: &Address) -> Result<DataArray> {
        let raw = self.read_raw_array(address)?;
        Ok(array_registry().reconstruct(raw)?)
    }

    fn read_raw_array(&self, address: &Address) -> Result<RawArray> {
        let entry = self.entry_of_kind(&address.to_string(), EntryKind::Array)?;
        tracing::debug!(address = %address, bytes = entry.length, "reading array entry");
        Ok(payload::decode(&self.read_entry(entry)?)?)
    }

    /// Read the bytes an encode hook attached under `key`.
    pub fn read_attachment(&self, key: &str) -> Result<Vec<u8>> {
        let entry = self.entry_of_kind(key, EntryKind::Attachment)?;
        self.read_entry(entry)
    }

    /// Check that every marker has exactly one matching array entry and
    /// every array entry is referenced by a marker.
    ///
    /// Works without the registry, so containers holding unregistered
    /// kinds can still be checked.
    pub fn verify(&self) -> Result<()> {
        let document = self.document()?;
        let mut markers = Vec::new();
        collect_markers(&document, &Address::root(), &mut markers);

        let mut referenced = HashSet::with_capacity(markers.len());
        for (address, marker) in &markers {
            let array = DataArray::from_raw(self.read_raw_array(address)?)?;
            let found = array.marker();
            if &found != marker {
                return Err(StoreError::DigestMismatch {
                    address: address.to_string(),
                    path: self.path.clone(),
                    expected: marker.clone(),
                    found,
                });
            }
            referenced.insert(address.to_string());
        }

        if let Some(orphan) = self
            .entries
            .iter()
            .find(|entry| entry.kind == EntryKind::Array && !referenced.contains(&entry.key))
        {
            return Err(StoreError::OrphanEntry {
                address: orphan.key.clone(),
                path: self.path.clone(),
            });
        }
        tracing::debug!(path = %self.path.display(), arrays = markers.len(), "container verified");
        Ok(())
    }

    /// Describe every entry. Array entries are decoded to report kind and
    /// shape.
    pub fn entries(&self) -> Result<Vec<EntryInfo>> {
        self.entries
            .iter()
            .map(|entry| {
                let (array_kind, shape) = if entry.kind == EntryKind::Array {
                    let raw = payload::decode(&self.read_entry(entry)?)?;
                    let shape = raw.coords.iter().map(Coords::len).collect();
                    (Some(raw.kind), Some(shape))
                } else {
                    (None, None)
                };
                Ok(EntryInfo {
                    key: entry.key.clone(),
                    kind: entry.kind,
                    bytes: entry.length,
                    array_kind,
                    shape,
                })
            })
            .collect()
    }
}

/// Every marker string in a parsed document, with its address.
fn collect_markers(json: &JsonValue, at: &Address, out: &mut Vec<(Address, String)>) {
    match json {
        JsonValue::String(text) if is_marker(text) => out.push((at.clone(), text.clone())),
        JsonValue::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                collect_markers(item, &at.index(index), out);
            }
        }
        JsonValue::Object(entries) => {
            for (key, item) in entries {
                collect_markers(item, &at.child(key), out);
            }
        }
        _ => {}
    }
}

fn read_at(file: &File, path: &Path, offset: u64, len: u64) -> Result<Vec<u8>> {
    let len = usize::try_from(len)
        .map_err(|_| StoreError::invalid_format(path, "entry does not fit in memory"))?;
    let mut buf = vec![0u8; len];
    read_exact_at(file, &mut buf, offset).map_err(|e| StoreError::io("read", path, e))?;
    Ok(buf)
}

#[cfg(unix)]
fn read_exact_at(file: &File, buf: &mut [u8], offset: u64) -> io::Result<()> {
    use std::os::unix::fs::FileExt;
    file.read_exact_at(buf, offset)
}

#[cfg(windows)]
fn read_exact_at(file: &File, mut buf: &mut [u8], mut offset: u64) -> io::Result<()> {
    use std::os::windows::fs::FileExt;
    while !buf.is_empty() {
        match file.seek_read(buf, offset) {
            Ok(0) => return Err(io::Error::from(io::ErrorKind::UnexpectedEof)),
            Ok(read) => {
                buf = &mut buf[read..];
                offset += read as u64;
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(())
}
