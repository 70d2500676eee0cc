//! Gzip wrapper for whole files.
//!
//! Output goes to a temp file in the output directory and replaces the
//! output only once the stream is complete.

use std::fs::File;
use std::io::{self, BufReader, BufWriter};
use std::path::Path;

use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;

use crate::atomic;
use crate::error::{Result, StoreError};
use crate::options::DEFAULT_COMPRESSION_LEVEL;

/// Gzip `input` into `output` at the default level.
pub fn compress(input: &Path, output: &Path) -> Result<()> {
    compress_with_level(input, output, DEFAULT_COMPRESSION_LEVEL)
}

/// Gzip `input` into `output` at `level` (0-9).
pub fn compress_with_level(input: &Path, output: &Path, level: u32) -> Result<()> {
    let mut source =
        BufReader::new(File::open(input).map_err(|e| StoreError::io("open", input, e))?);
    let temp = atomic::temp_beside(output)?;
    let mut encoder = GzEncoder::new(BufWriter::new(temp), Compression::new(level.min(9)));

    let bytes = io::copy(&mut source, &mut encoder).map_err(|source| StoreError::Compression {
        operation: "compress",
        path: input.to_path_buf(),
        source,
    })?;
    let temp = encoder
        .finish()
        .and_then(|writer| writer.into_inner().map_err(io::IntoInnerError::into_error))
        .map_err(|e| StoreError::io("write", output, e))?;
    atomic::persist(temp, output)?;

    tracing::debug!(
        input = %input.display(),
        output = %output.display(),
        bytes,
        "compressed file"
    );
    Ok(())
}

/// Gunzip `input` into `output`.
pub fn decompress(input: &Path, output: &Path) -> Result<()> {
    let source = File::open(input).map_err(|e| StoreError::io("open", input, e))?;
    let mut decoder = GzDecoder::new(BufReader::new(source));
    let temp = atomic::temp_beside(output)?;
    let mut writer = BufWriter::new(temp);

    let bytes = io::copy(&mut decoder, &mut writer).map_err(|source| StoreError::Compression {
        operation: "decompress",
        path: input.to_path_buf(),
        source,
    })?;
    let temp = writer
        .into_inner()
        .map_err(|e| StoreError::io("write", output, e.into_error()))?;
    atomic::persist(temp, output)?;

    tracing::debug!(
        input = %input.display(),
        output = %output.display(),
        bytes,
        "decompressed file"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_round_trip() {
        let dir = tempdir().unwrap();
        let raw = dir.path().join("data.bin");
        let packed = dir.path().join("data.bin.gz");
        let unpacked = dir.path().join("copy.bin");
        let bytes: Vec<u8> = (0..10_000u32).map(|i| (i % 251) as u8).collect();
        fs::write(&raw, &bytes).unwrap();

        compress(&raw, &packed).unwrap();
        assert_eq!(&fs::read(&packed).unwrap()[0..2], &[0x1f, 0x8b]);
        decompress(&packed, &unpacked).unwrap();
        assert_eq!(fs::read(&unpacked).unwrap(), bytes);
    }

    #[test]
    fn test_bad_stream_leaves_no_output() {
        let dir = tempdir().unwrap();
        let bogus = dir.path().join("bogus.gz");
        let output = dir.path().join("out.bin");
        fs::write(&bogus, b"this is not gzip").unwrap();

        let err = decompress(&bogus, &output).unwrap_err();
        assert!(matches!(err, StoreError::Compression { .. }), "{err}");
        assert!(!output.exists());
        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(names, ["bogus.gz"]);
    }

    #[test]
    fn test_missing_input() {
        let dir = tempdir().unwrap();
        let err = compress(&dir.path().join("absent"), &dir.path().join("out.gz")).unwrap_err();
        assert!(matches!(err, StoreError::Io { operation: "open", .. }));
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
