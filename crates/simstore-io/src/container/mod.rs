//! Path-addressed hybrid container: the canonical document plus one binary
//! entry per array, keyed by the array's address in the document.

pub mod layout;
mod reader;
mod writer;

pub use layout::{DOCUMENT_KEY, EntryKind, FORMAT_VERSION, IndexEntry, MAGIC_BYTES};
pub use reader::{ContainerReader, EntryInfo};
pub use writer::{ContainerWriter, write_container};
