//! Shared fixtures: a small simulation and a result set holding every
//! built-in array kind.

#![allow(dead_code)]

use std::collections::BTreeMap;

use simstore_model::components::data::{
    FieldData, FieldTimeData, FluxData, FluxTimeData, ModeData, MonitorData, PermittivityData,
    SimulationData,
};
use simstore_model::components::geometry::{BoxGeometry, Sphere};
use simstore_model::components::medium::{Lorentz, Medium};
use simstore_model::components::monitor::{
    FieldMonitor, FieldTimeMonitor, FluxMonitor, FluxTimeMonitor, ModeMonitor, PermittivityMonitor,
};
use simstore_model::components::simulation::{GridSize, PMLLayer, Simulation};
use simstore_model::components::source::{GaussianPulse, PlaneWave};
use simstore_model::components::structure::Structure;
use simstore_model::{
    Complex64, Coords, FluxDataArray, FluxTimeDataArray, ModeAmpsDataArray, ModeIndexDataArray,
    ScalarFieldDataArray, ScalarFieldTimeDataArray, Values,
};

const INF: f64 = f64::INFINITY;

pub fn flux_monitor() -> FluxMonitor {
    FluxMonitor::new([0.0, 0.0, 1.5], [INF, INF, 0.0], "flux".into(), vec![2e14, 2.5e14]).unwrap()
}

pub fn field_monitor() -> FieldMonitor {
    FieldMonitor::new(
        [0.0; 3],
        [1.0, 0.0, 2.0],
        "fields".into(),
        vec!["Ex".into(), "Hy".into()],
        vec![2e14],
    )
    .unwrap()
}

pub fn field_time_monitor() -> FieldTimeMonitor {
    FieldTimeMonitor::new(
        [0.0; 3],
        [0.0; 3],
        "snapshot".into(),
        vec!["Ez".into()],
        0.0,
        Some(1e-13),
        5,
    )
    .unwrap()
}

pub fn permittivity_monitor() -> PermittivityMonitor {
    PermittivityMonitor::new([0.0; 3], [1.0, 0.0, 2.0], "eps".into(), vec![2e14]).unwrap()
}

pub fn flux_time_monitor() -> FluxTimeMonitor {
    FluxTimeMonitor::new([0.0, 0.0, -1.5], [INF, INF, 0.0], "flux_time".into(), 0.0, None, 1)
        .unwrap()
}

pub fn mode_monitor() -> ModeMonitor {
    ModeMonitor::new([0.0, 0.0, 1.0], [2.0, 2.0, 0.0], "modes".into(), vec![2e14], 2).unwrap()
}

pub fn simulation() -> Simulation {
    let pulse = GaussianPulse::new(2e14, 1e13, 5.0, 0.0).unwrap();
    let wave = PlaneWave::new(
        [0.0, 0.0, -1.5],
        [INF, INF, 0.0],
        pulse.into(),
        "+".into(),
        "Ex".into(),
        0.0,
        0.0,
    )
    .unwrap();
    Simulation::builder([2.0, 2.0, 4.0], GridSize::PerAxis([0.05, 0.05, 0.02]))
        .run_time(1e-12)
        .structure(
            Structure::new(
                Sphere::new([0.0; 3], 0.5).unwrap().into(),
                Medium::new(4.0, 0.0).unwrap().into(),
            )
            .unwrap(),
        )
        .structure(
            Structure::new(
                BoxGeometry::new([0.0, 0.0, 1.0], [1.0, 1.0, 0.2]).unwrap().into(),
                Lorentz::new(1.0, vec![(2.0, 3e14, 1e12)]).unwrap().into(),
            )
            .unwrap(),
        )
        .source("plane_wave", wave)
        .monitor(flux_monitor())
        .monitor(field_monitor())
        .monitor(field_time_monitor())
        .monitor(permittivity_monitor())
        .monitor(flux_time_monitor())
        .monitor(mode_monitor())
        .pml_layers([
            PMLLayer::none(),
            PMLLayer::none(),
            PMLLayer::new("standard".into(), 12).unwrap(),
        ])
        .build()
        .unwrap()
}

fn spatial_coords(extra: Coords) -> Vec<Coords> {
    vec![
        Coords::Float(vec![-0.5, 0.5]),
        Coords::Float(vec![0.0]),
        Coords::Float(vec![-1.0, 0.0, 1.0]),
        extra,
    ]
}

fn complex_cells(count: usize, scale: f64) -> Values {
    Values::Complex(
        (0..count)
            .map(|i| Complex64::new(scale * i as f64, -scale / (i as f64 + 1.0)))
            .collect(),
    )
}

fn real_cells(count: usize, offset: f64) -> Values {
    Values::Real((0..count).map(|i| offset + i as f64 * 0.25).collect())
}

pub fn flux_data() -> FluxData {
    let flux = FluxDataArray::new(
        vec![Coords::Float(vec![2e14, 2.5e14])],
        Values::Real(vec![0.75, f64::NAN]),
    )
    .unwrap();
    FluxData::new(flux_monitor(), flux).unwrap()
}

pub fn field_data() -> FieldData {
    let f = || Coords::Float(vec![2e14]);
    let ex = ScalarFieldDataArray::new(spatial_coords(f()), complex_cells(6, 1.0)).unwrap();
    let hy = ScalarFieldDataArray::new(spatial_coords(f()), complex_cells(6, -2.0)).unwrap();
    FieldData::new(field_monitor(), Some(ex), None, None, None, Some(hy), None, [0; 3], None, None)
        .unwrap()
}

pub fn field_time_data() -> FieldTimeData {
    let ez = ScalarFieldTimeDataArray::new(
        vec![
            Coords::Float(vec![0.0]),
            Coords::Float(vec![0.0]),
            Coords::Float(vec![0.0]),
            Coords::Float(vec![0.0, 5e-14, 1e-13]),
        ],
        real_cells(3, -1.0),
    )
    .unwrap();
    FieldTimeData::new(
        field_time_monitor(),
        None,
        None,
        Some(ez),
        None,
        None,
        None,
        [0; 3],
        None,
        None,
    )
    .unwrap()
}

pub fn permittivity_data() -> PermittivityData {
    let f = || Coords::Float(vec![2e14]);
    let eps = |offset| ScalarFieldDataArray::new(spatial_coords(f()), real_cells(6, offset)).unwrap();
    PermittivityData::new(
        permittivity_monitor(),
        eps(1.0),
        eps(2.0),
        eps(4.0),
        [0; 3],
        None,
        None,
    )
    .unwrap()
}

/// Recorded before the first time step: zero-length time axis.
pub fn flux_time_data() -> FluxTimeData {
    let flux =
        FluxTimeDataArray::new(vec![Coords::Float(Vec::new())], Values::Real(Vec::new())).unwrap();
    FluxTimeData::new(flux_time_monitor(), flux).unwrap()
}

pub fn mode_data() -> ModeData {
    let amps = ModeAmpsDataArray::new(
        vec![
            Coords::Text(vec!["+".into(), "-".into()]),
            Coords::Float(vec![2e14]),
            Coords::Int(vec![0, 1]),
        ],
        complex_cells(4, 0.5),
    )
    .unwrap();
    let n_complex = ModeIndexDataArray::new(
        vec![Coords::Float(vec![2e14]), Coords::Int(vec![0, 1])],
        Values::Complex(vec![Complex64::new(1.45, 1e-4), Complex64::new(1.2, 0.0)]),
    )
    .unwrap();
    ModeData::new(mode_monitor(), amps, n_complex).unwrap()
}

pub fn simulation_data() -> SimulationData {
    let mut monitor_data: BTreeMap<String, MonitorData> = BTreeMap::new();
    monitor_data.insert("flux".into(), flux_data().into());
    monitor_data.insert("fields".into(), field_data().into());
    monitor_data.insert("snapshot".into(), field_time_data().into());
    monitor_data.insert("eps".into(), permittivity_data().into());
    monitor_data.insert("flux_time".into(), flux_time_data().into());
    monitor_data.insert("modes".into(), mode_data().into());
    SimulationData::new(simulation(), monitor_data, Some("run finished".into())).unwrap()
}
