//! File format selection by extension.

use std::fmt;
use std::path::Path;

use crate::error::{Result, StoreError};

/// Storage format, chosen from the file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Json,
    Yaml,
    /// Hybrid container: embedded document plus one binary entry per array.
    Container,
    /// Gzip-compressed hybrid container.
    CompressedContainer,
}

impl FileFormat {
    /// Pick the format for `path`. Fails for any other extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or_default();
        if name.ends_with(".hdf5.gz") {
            Ok(Self::CompressedContainer)
        } else if name.ends_with(".hdf5") {
            Ok(Self::Container)
        } else if name.ends_with(".json") {
            Ok(Self::Json)
        } else if name.ends_with(".yaml") {
            Ok(Self::Yaml)
        } else {
            Err(StoreError::UnsupportedExtension {
                path: path.to_path_buf(),
            })
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Yaml => "yaml",
            Self::Container => "hdf5",
            Self::CompressedContainer => "hdf5.gz",
        }
    }

    /// True if array data survives a save in this format.
    pub fn stores_arrays(self) -> bool {
        matches!(self, Self::Container | Self::CompressedContainer)
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_format_from_extension() {
        let cases = [
            ("sim.json", FileFormat::Json),
            ("dir/sim.yaml", FileFormat::Yaml),
            ("sim.hdf5", FileFormat::Container),
            ("/tmp/run.1/sim.hdf5.gz", FileFormat::CompressedContainer),
        ];
        for (path, expected) in cases {
            assert_eq!(FileFormat::from_path(Path::new(path)).unwrap(), expected, "{path}");
        }
    }

    #[test]
    fn rejects_other_extensions() {
        for path in ["sim.txt", "sim.gz", "sim.yml", "sim", "sim.json.bak", "hdf5"] {
            assert!(
                matches!(
                    FileFormat::from_path(Path::new(path)),
                    Err(StoreError::UnsupportedExtension { .. })
                ),
                "{path}"
            );
        }
    }

    #[test]
    fn array_capable_formats() {
        assert!(FileFormat::Container.stores_arrays());
        assert!(FileFormat::CompressedContainer.stores_arrays());
        assert!(!FileFormat::Json.stores_arrays());
    }
}
