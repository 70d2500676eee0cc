//! Command functions run against files in a scratch directory.

use std::fs;
use std::path::{Path, PathBuf};

use simstore_cli::cli::{ConvertArgs, ExtractArgs, HashArgs, InspectArgs, TransferArgs};
use simstore_cli::commands::{
    run_compress, run_convert, run_decompress, run_extract, run_hash, run_inspect,
};
use simstore_io::{EntryKind, FileFormat, load, save};
use simstore_model::components::data::FluxData;
use simstore_model::components::geometry::Sphere;
use simstore_model::components::monitor::FluxMonitor;
use simstore_model::{Address, Coords, FluxDataArray, Model, Values};
use tempfile::{TempDir, tempdir};

fn flux_monitor() -> FluxMonitor {
    FluxMonitor::new(
        [0.0, 0.0, 1.5],
        [f64::INFINITY, f64::INFINITY, 0.0],
        "flux".into(),
        vec![2e14, 2.5e14],
    )
    .unwrap()
}

fn flux_data() -> FluxData {
    let flux = FluxDataArray::new(
        vec![Coords::Float(vec![2e14, 2.5e14])],
        Values::Real(vec![0.75, 0.5]),
    )
    .unwrap();
    FluxData::new(flux_monitor(), flux).unwrap()
}

/// Scratch directory holding `flux.hdf5`.
fn saved_flux() -> (TempDir, PathBuf) {
    let dir = tempdir().unwrap();
    let path = dir.path().join("flux.hdf5");
    save(&flux_data(), &path).unwrap();
    (dir, path)
}

fn convert(input: &Path, output: &Path) -> anyhow::Result<simstore_cli::commands::Written> {
    run_convert(&ConvertArgs {
        input: input.to_path_buf(),
        output: output.to_path_buf(),
        indent: 4,
        compression_level: 6,
    })
}

fn transfer(input: &Path, output: &Path) -> TransferArgs {
    TransferArgs {
        input: input.to_path_buf(),
        output: output.to_path_buf(),
    }
}

#[test]
fn test_inspect_lists_container_entries() {
    let (_dir, path) = saved_flux();
    let inspection = run_inspect(&InspectArgs {
        file: path,
        address: None,
    })
    .unwrap();

    assert_eq!(inspection.format, FileFormat::Container);
    assert_eq!(inspection.node_type, "FluxData");
    let keys: Vec<(&str, EntryKind)> = inspection
        .entries
        .iter()
        .map(|entry| (entry.key.as_str(), entry.kind))
        .collect();
    assert_eq!(
        keys,
        [("JSON_STRING", EntryKind::Document), ("/flux", EntryKind::Array)]
    );
    assert_eq!(inspection.entries[1].shape.as_deref(), Some(&[2][..]));
    assert!(inspection.markers.is_empty());
}

#[test]
fn test_inspect_below_an_address() {
    let (_dir, path) = saved_flux();
    let inspection = run_inspect(&InspectArgs {
        file: path,
        address: Some("/monitor".into()),
    })
    .unwrap();
    assert_eq!(inspection.node_type, "FluxMonitor");
    assert_eq!(inspection.address, Address::parse("/monitor"));
    assert_eq!(inspection.entries.len(), 1);
    assert_eq!(inspection.entries[0].kind, EntryKind::Document);
}

#[test]
fn test_inspect_text_reports_detached_arrays() {
    let (dir, path) = saved_flux();
    let json = dir.path().join("flux.json");
    convert(&path, &json).unwrap();

    let inspection = run_inspect(&InspectArgs {
        file: json,
        address: None,
    })
    .unwrap();
    assert!(inspection.entries.is_empty());
    assert_eq!(inspection.markers.len(), 1);
    assert_eq!(inspection.markers[0].0, Address::parse("/flux"));
    assert_eq!(inspection.markers[0].1, flux_data().flux().marker());
}

#[test]
fn test_convert_keeps_content_hash() {
    let dir = tempdir().unwrap();
    let sphere = Sphere::new([0.0, 1.0, 0.0], 0.5).unwrap();
    let json = dir.path().join("sphere.json");
    save(&sphere, &json).unwrap();

    for name in ["sphere.yaml", "sphere.hdf5", "sphere.hdf5.gz"] {
        let output = dir.path().join(name);
        let written = convert(&json, &output).unwrap();
        assert_eq!(written.node_type, Some("Sphere"));
        assert!(written.bytes > 0);
        let back: Sphere = load(&output).unwrap();
        assert_eq!(back.content_hash(), sphere.content_hash(), "{name}");
    }
}

#[test]
fn test_convert_from_text_cannot_restore_arrays() {
    let (dir, path) = saved_flux();
    let json = dir.path().join("flux.json");
    convert(&path, &json).unwrap();

    let err = convert(&json, &dir.path().join("again.hdf5")).unwrap_err();
    assert!(format!("{err:#}").contains("flux.json"), "{err:#}");
    assert!(!dir.path().join("again.hdf5").exists());
}

#[test]
fn test_convert_rejects_unknown_output_extension() {
    let (dir, path) = saved_flux();
    let output = dir.path().join("flux.csv");
    assert!(convert(&path, &output).is_err());
    assert!(!output.exists());
}

#[test]
fn test_extract_saves_the_sub_tree() {
    let (dir, path) = saved_flux();
    let output = dir.path().join("monitor.yaml");
    let written = run_extract(&ExtractArgs {
        input: path,
        address: "/monitor".into(),
        output: output.clone(),
    })
    .unwrap();
    assert_eq!(written.format, FileFormat::Yaml);
    assert_eq!(written.node_type, Some("FluxMonitor"));
    let monitor: FluxMonitor = load(&output).unwrap();
    assert_eq!(monitor, flux_monitor());
}

#[test]
fn test_hash_matches_in_memory_hash() {
    let (_dir, path) = saved_flux();
    let hashed = run_hash(&HashArgs {
        file: path.clone(),
        address: None,
        no_verify: false,
    })
    .unwrap();
    assert_eq!(hashed.node_type, "FluxData");
    assert_eq!(hashed.hash, flux_data().content_hash());

    let hashed = run_hash(&HashArgs {
        file: path,
        address: Some("/monitor".into()),
        no_verify: true,
    })
    .unwrap();
    assert_eq!(hashed.hash, flux_monitor().content_hash());
}

#[test]
fn test_compress_then_decompress_restores_bytes() {
    let (dir, path) = saved_flux();
    let packed = dir.path().join("flux.hdf5.gz");
    let unpacked = dir.path().join("copy.hdf5");

    let written = run_compress(&transfer(&path, &packed)).unwrap();
    assert_eq!(written.format, FileFormat::CompressedContainer);
    assert_eq!(written.node_type, None);
    run_decompress(&transfer(&packed, &unpacked)).unwrap();

    assert_eq!(fs::read(&unpacked).unwrap(), fs::read(&path).unwrap());
    let back: FluxData = load(&packed).unwrap();
    assert_eq!(back, flux_data());
}

#[test]
fn test_compress_checks_extensions_and_contents() {
    let (dir, path) = saved_flux();
    let err = run_compress(&transfer(&path, &dir.path().join("flux.gz"))).unwrap_err();
    assert!(err.to_string().contains("flux.gz"), "{err}");

    let text = dir.path().join("notes.hdf5");
    fs::write(&text, "not a container").unwrap();
    let packed = dir.path().join("notes.hdf5.gz");
    assert!(run_compress(&transfer(&text, &packed)).is_err());
    assert!(!packed.exists());
}
