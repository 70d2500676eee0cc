use std::convert::Infallible;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, ensure};
use tracing::{info, info_span};

use simstore_io::{
    ContainerReader, EntryInfo, EntryKind, FileFormat, LoadOptions, SaveOptions, compress,
    decompress, load_value, load_with_options, save_with_options,
};
use simstore_model::{Address, Component, Value, is_marker};

use crate::cli::{ConvertArgs, ExtractArgs, HashArgs, InspectArgs, TransferArgs};

/// What `inspect` found in a file.
#[derive(Debug)]
pub struct Inspection {
    pub path: PathBuf,
    pub format: FileFormat,
    pub address: Address,
    /// Type tag of the node at `address`, or the kind of plain value there.
    pub node_type: String,
    /// Container entries below `address`, document first. Empty for text files.
    pub entries: Vec<EntryInfo>,
    /// Arrays referenced by marker only, as text documents store them.
    pub markers: Vec<(Address, String)>,
}

/// A file written by a command.
#[derive(Debug)]
pub struct Written {
    pub path: PathBuf,
    pub format: FileFormat,
    /// Root type of the saved node; `None` for raw byte transfers.
    pub node_type: Option<&'static str>,
    pub bytes: u64,
}

/// Content hash of a stored node.
#[derive(Debug)]
pub struct Hashed {
    pub path: PathBuf,
    pub address: Address,
    pub node_type: &'static str,
    pub hash: String,
}

pub fn run_inspect(args: &InspectArgs) -> Result<Inspection> {
    let format = FileFormat::from_path(&args.file)?;
    let address = parse_address(args.address.as_deref());
    let _span = info_span!("inspect", path = %args.file.display(), %address).entered();

    let options = LoadOptions::new().with_address(address.clone());
    let value = load_value(&args.file, &options)
        .with_context(|| format!("load {}", args.file.display()))?;
    let node_type = value
        .tag()
        .map_or_else(|| value.type_name().to_string(), str::to_string);

    let entries = match format {
        FileFormat::Container => container_entries(&args.file)?,
        FileFormat::CompressedContainer => {
            let scratch = tempfile::tempdir().context("create scratch directory")?;
            let container = scratch.path().join("container.hdf5");
            decompress(&args.file, &container)?;
            container_entries(&container)?
        }
        FileFormat::Json | FileFormat::Yaml => Vec::new(),
    };
    let entries = entries
        .into_iter()
        .filter(|entry| {
            entry.kind == EntryKind::Document || Address::parse(&entry.key).starts_with(&address)
        })
        .collect();

    Ok(Inspection {
        path: args.file.clone(),
        format,
        markers: detached_markers(&value, &address),
        address,
        node_type,
        entries,
    })
}

pub fn run_convert(args: &ConvertArgs) -> Result<Written> {
    let format = FileFormat::from_path(&args.output)?;
    let _span = info_span!("convert", input = %args.input.display()).entered();
    let node: Component = load_with_options(&args.input, &LoadOptions::new())
        .with_context(|| format!("load {}", args.input.display()))?;
    let options = SaveOptions::new()
        .with_indent(args.indent)
        .with_compression_level(args.compression_level);
    save_with_options(&node, &args.output, &options)
        .with_context(|| format!("save {}", args.output.display()))?;
    written(&args.output, format, Some(node.type_tag()))
}

pub fn run_extract(args: &ExtractArgs) -> Result<Written> {
    let format = FileFormat::from_path(&args.output)?;
    let address = parse_address(Some(args.address.as_str()));
    let _span = info_span!("extract", input = %args.input.display(), %address).entered();
    let node: Component =
        load_with_options(&args.input, &LoadOptions::new().with_address(address.clone()))
            .with_context(|| format!("load {address} from {}", args.input.display()))?;
    save_with_options(&node, &args.output, &SaveOptions::new())
        .with_context(|| format!("save {}", args.output.display()))?;
    info!(node_type = node.type_tag(), "extracted node");
    written(&args.output, format, Some(node.type_tag()))
}

pub fn run_compress(args: &TransferArgs) -> Result<Written> {
    expect_format(&args.input, FileFormat::Container)?;
    expect_format(&args.output, FileFormat::CompressedContainer)?;
    // Rejects files that are not containers before anything is written.
    ContainerReader::open(&args.input)?;
    compress(&args.input, &args.output)?;
    written(&args.output, FileFormat::CompressedContainer, None)
}

pub fn run_decompress(args: &TransferArgs) -> Result<Written> {
    expect_format(&args.input, FileFormat::CompressedContainer)?;
    expect_format(&args.output, FileFormat::Container)?;
    decompress(&args.input, &args.output)?;
    written(&args.output, FileFormat::Container, None)
}

pub fn run_hash(args: &HashArgs) -> Result<Hashed> {
    let address = parse_address(args.address.as_deref());
    let options = LoadOptions::new()
        .with_address(address.clone())
        .with_verify_digests(!args.no_verify);
    let node: Component = load_with_options(&args.file, &options)
        .with_context(|| format!("load {address} from {}", args.file.display()))?;
    Ok(Hashed {
        path: args.file.clone(),
        address,
        node_type: node.type_tag(),
        hash: node.content_hash().to_string(),
    })
}

fn parse_address(text: Option<&str>) -> Address {
    text.map_or_else(Address::root, Address::parse)
}

fn expect_format(path: &Path, expected: FileFormat) -> Result<()> {
    let found = FileFormat::from_path(path)?;
    ensure!(
        found == expected,
        "{} is a .{found} file, expected .{expected}",
        path.display()
    );
    Ok(())
}

fn container_entries(path: &Path) -> Result<Vec<EntryInfo>> {
    let reader = ContainerReader::open(path)?;
    let mut entries = reader.entries()?;
    entries.sort_by_key(|entry| entry.kind != EntryKind::Document);
    Ok(entries)
}

fn detached_markers(value: &Value, at: &Address) -> Vec<(Address, String)> {
    let mut found = Vec::new();
    if let Value::Str(text) = value
        && is_marker(text)
    {
        found.push((at.clone(), text.clone()));
    }
    let _ = value.walk(at, &mut |address, child| {
        if let Value::Str(text) = child
            && is_marker(text)
        {
            found.push((address.clone(), text.clone()));
        }
        Ok::<(), Infallible>(())
    });
    found
}

fn written(path: &Path, format: FileFormat, node_type: Option<&'static str>) -> Result<Written> {
    let bytes = fs::metadata(path)
        .with_context(|| format!("stat {}", path.display()))?
        .len();
    Ok(Written {
        path: path.to_path_buf(),
        format,
        node_type,
        bytes,
    })
}
