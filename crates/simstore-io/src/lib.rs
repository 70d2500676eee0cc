//! Persistence of simulation models.
//!
//! Four formats, chosen by extension:
//!
//! | extension  | contents                                                  |
//! |------------|-----------------------------------------------------------|
//! | `.json`    | canonical text; arrays replaced by markers                |
//! | `.yaml`    | the same document as YAML                                 |
//! | `.hdf5`    | hybrid container: the document plus one entry per array   |
//! | `.hdf5.gz` | gzip-compressed hybrid container                          |
//!
//! Only the container formats keep array data. A load can select a sub-tree
//! by [`Address`](simstore_model::Address); only the arrays under it are
//! read.
//!
//! # Example
//!
//! ```ignore
//! use simstore_io::{LoadOptions, load_with_options, save};
//! use simstore_model::components::data::{FluxData, SimulationData};
//!
//! save(&data, "run.hdf5.gz")?;
//! let flux: FluxData = load_with_options(
//!     "run.hdf5.gz",
//!     &LoadOptions::new().with_address("/monitor_data/flux"),
//! )?;
//! ```

mod api;
mod atomic;
pub mod compress;
pub mod container;
mod decode;
mod document;
pub mod error;
pub mod format;
pub mod hooks;
pub mod options;

pub use api::{load, load_value, load_with_options, save, save_value, save_with_options};
#[cfg(feature = "async")]
pub use api::{load_async, save_async};
pub use compress::{compress, compress_with_level, decompress};
pub use container::{ContainerReader, ContainerWriter, EntryInfo, EntryKind};
pub use error::{ErrorKind, Result, StoreError};
pub use format::FileFormat;
pub use hooks::{DecodeHook, EncodeHook};
pub use options::{LoadOptions, SaveOptions};
