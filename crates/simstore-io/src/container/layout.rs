//! Physical layout of a container file.
//!
//! ```text
//! [magic "SSC1" (4)] [version u32 LE]
//! [entry payload] ... [entry payload]
//! [index: count u32, then per entry: kind u8, key (u32 len + utf8),
//!         offset u64, length u64]
//! [trailer: index offset u64, magic "SSC1" (4)]
//! ```
//!
//! Entries are written in order and located through the index at the tail,
//! so a reader can fetch one entry without touching the others.

use std::path::Path;

use crate::error::{Result, StoreError};

/// Magic bytes at both ends of a container: "SSC1".
pub const MAGIC_BYTES: [u8; 4] = *b"SSC1";

/// Current container format version.
pub const FORMAT_VERSION: u32 = 1;

/// Magic(4) + Version(4).
pub const HEADER_SIZE: u64 = 8;

/// IndexOffset(8) + Magic(4).
pub const TRAILER_SIZE: u64 = 12;

/// Reserved key of the embedded canonical document.
pub const DOCUMENT_KEY: &str = "JSON_STRING";

/// What an entry holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    /// The embedded canonical document.
    Document,
    /// An array payload referenced by a marker.
    Array,
    /// Extra bytes written by an encode hook.
    Attachment,
}

impl EntryKind {
    pub fn as_u8(self) -> u8 {
        match self {
            Self::Document => 0,
            Self::Array => 1,
            Self::Attachment => 2,
        }
    }

    pub fn from_u8(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(Self::Document),
            1 => Some(Self::Array),
            2 => Some(Self::Attachment),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Document => "document",
            Self::Array => "array",
            Self::Attachment => "attachment",
        }
    }
}

/// Location of one entry's payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    pub kind: EntryKind,
    pub key: String,
    pub offset: u64,
    pub length: u64,
}

/// Serialize the header.
pub fn header_bytes() -> [u8; HEADER_SIZE as usize] {
    let mut buf = [0u8; HEADER_SIZE as usize];
    buf[0..4].copy_from_slice(&MAGIC_BYTES);
    buf[4..8].copy_from_slice(&FORMAT_VERSION.to_le_bytes());
    buf
}

/// Check the header magic and version.
pub fn check_header(bytes: &[u8], path: &Path) -> Result<()> {
    if bytes.len() < HEADER_SIZE as usize || bytes[0..4] != MAGIC_BYTES {
        return Err(StoreError::invalid_format(path, "missing container magic"));
    }
    let version = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
    if version > FORMAT_VERSION {
        return Err(StoreError::UnsupportedVersion {
            found: version,
            max_supported: FORMAT_VERSION,
            path: path.to_path_buf(),
        });
    }
    Ok(())
}

/// Serialize the trailer.
pub fn trailer_bytes(index_offset: u64) -> [u8; TRAILER_SIZE as usize] {
    let mut buf = [0u8; TRAILER_SIZE as usize];
    buf[0..8].copy_from_slice(&index_offset.to_le_bytes());
    buf[8..12].copy_from_slice(&MAGIC_BYTES);
    buf
}

/// Read the index offset out of the trailer.
pub fn parse_trailer(bytes: &[u8], path: &Path) -> Result<u64> {
    if bytes.len() != TRAILER_SIZE as usize || bytes[8..12] != MAGIC_BYTES {
        return Err(StoreError::invalid_format(path, "missing trailer magic"));
    }
    let mut offset = [0u8; 8];
    offset.copy_from_slice(&bytes[0..8]);
    Ok(u64::from_le_bytes(offset))
}

/// Serialize the index.
pub fn encode_index(entries: &[IndexEntry]) -> Vec<u8> {
    let mut out = Vec::with_capacity(4 + entries.len() * 32);
    out.extend_from_slice(&u32::try_from(entries.len()).unwrap_or(u32::MAX).to_le_bytes());
    for entry in entries {
        out.push(entry.kind.as_u8());
        let key = entry.key.as_bytes();
        out.extend_from_slice(&u32::try_from(key.len()).unwrap_or(u32::MAX).to_le_bytes());
        out.extend_from_slice(key);
        out.extend_from_slice(&entry.offset.to_le_bytes());
        out.extend_from_slice(&entry.length.to_le_bytes());
    }
    out
}

/// Parse the index, checking every entry lies inside `data_end`.
pub fn decode_index(bytes: &[u8], data_end: u64, path: &Path) -> Result<Vec<IndexEntry>> {
    let mut cursor = Cursor { bytes, pos: 0, path };
    let count = cursor.u32()? as usize;
    // Each entry takes at least 21 bytes.
    if count > bytes.len() / 21 {
        return Err(StoreError::invalid_format(path, "index entry count exceeds index size"));
    }
    let mut entries = Vec::with_capacity(count);
    for _ in 0..count {
        let kind_byte = cursor.u8()?;
        let kind = EntryKind::from_u8(kind_byte).ok_or_else(|| {
            StoreError::invalid_format(path, format!("unknown entry kind {kind_byte}"))
        })?;
        let key_len = cursor.u32()? as usize;
        let key = std::str::from_utf8(cursor.take(key_len)?)
            .map_err(|_| StoreError::invalid_format(path, "entry key is not UTF-8"))?
            .to_string();
        let offset = cursor.u64()?;
        let length = cursor.u64()?;
        let end = offset.checked_add(length);
        if offset < HEADER_SIZE || end.is_none_or(|end| end > data_end) {
            return Err(StoreError::invalid_format(
                path,
                format!("entry {key} lies outside the data section"),
            ));
        }
        entries.push(IndexEntry {
            kind,
            key,
            offset,
            length,
        });
    }
    if cursor.pos != bytes.len() {
        return Err(StoreError::invalid_format(path, "trailing bytes after index"));
    }
    Ok(entries)
}

struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
    path: &'a Path,
}

impl<'a> Cursor<'a> {
    fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|end| *end <= self.bytes.len())
            .ok_or_else(|| StoreError::invalid_format(self.path, "index is truncated"))?;
        let slice = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    fn u32(&mut self) -> Result<u32> {
        let mut buf = [0u8; 4];
        buf.copy_from_slice(self.take(4)?);
        Ok(u32::from_le_bytes(buf))
    }

    fn u64(&mut self) -> Result<u64> {
        let mut buf = [0u8; 8];
        buf.copy_from_slice(self.take(8)?);
        Ok(u64::from_le_bytes(buf))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries() -> Vec<IndexEntry> {
        vec![
            IndexEntry {
                kind: EntryKind::Array,
                key: "/flux".into(),
                offset: HEADER_SIZE,
                length: 40,
            },
            IndexEntry {
                kind: EntryKind::Document,
                key: DOCUMENT_KEY.into(),
                offset: HEADER_SIZE + 40,
                length: 100,
            },
        ]
    }

    #[test]
    fn index_round_trips() {
        let path = Path::new("test.hdf5");
        let bytes = encode_index(&entries());
        assert_eq!(decode_index(&bytes, 148, path).unwrap(), entries());
    }

    #[test]
    fn index_rejects_out_of_range_entries() {
        let path = Path::new("test.hdf5");
        let bytes = encode_index(&entries());
        let err = decode_index(&bytes, 100, path).unwrap_err();
        assert!(err.to_string().contains("outside the data section"), "{err}");
    }

    #[test]
    fn truncated_index_is_invalid() {
        let path = Path::new("test.hdf5");
        let bytes = encode_index(&entries());
        let err = decode_index(&bytes[..bytes.len() - 3], 148, path).unwrap_err();
        assert!(matches!(err, StoreError::InvalidFormat { .. }));
    }

    #[test]
    fn header_and_trailer() {
        let path = Path::new("test.hdf5");
        check_header(&header_bytes(), path).unwrap();
        assert_eq!(parse_trailer(&trailer_bytes(1234), path).unwrap(), 1234);

        let mut newer = header_bytes();
        newer[4] = 9;
        assert!(matches!(
            check_header(&newer, path),
            Err(StoreError::UnsupportedVersion { found: 9, .. })
        ));
        assert!(check_header(b"PAR4\x01\0\0\0", path).is_err());
    }
}
