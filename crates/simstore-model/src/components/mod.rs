//! The simulation component schema.

pub mod data;
pub mod geometry;
pub mod medium;
pub mod monitor;
pub mod simulation;
pub mod source;
pub mod structure;

use crate::model_union;

use data::{
    FieldData, FieldTimeData, FluxData, FluxTimeData, Grid, ModeData, ModeSolverData,
    PermittivityData, SimulationData,
};
use geometry::{BoxGeometry, Cylinder, PolySlab, Sphere};
use medium::{Debye, Lorentz, Medium, PoleResidue, Sellmeier};
use monitor::{
    FieldMonitor, FieldTimeMonitor, FluxMonitor, FluxTimeMonitor, ModeMonitor, ModeSolverMonitor,
    PermittivityMonitor,
};
use simulation::{PMLLayer, Simulation};
use source::{GaussianPulse, ModeSource, PlaneWave, VolumeSource};
use structure::Structure;

/// Names of the six field components.
pub const FIELD_COMPONENTS: [&str; 6] = ["Ex", "Ey", "Ez", "Hx", "Hy", "Hz"];

fn non_negative(name: &str, value: f64) -> Result<(), String> {
    if value < 0.0 {
        return Err(format!("{name} must be non-negative, got {value}"));
    }
    Ok(())
}

fn non_negative_all(name: &str, values: &[f64]) -> Result<(), String> {
    match values.iter().find(|value| **value < 0.0) {
        Some(value) => Err(format!("{name} must be non-negative, got {value}")),
        None => Ok(()),
    }
}

fn check_axis(axis: u8) -> Result<(), String> {
    if axis > 2 {
        return Err(format!("axis must be 0, 1 or 2, got {axis}"));
    }
    Ok(())
}

fn check_direction(direction: &str) -> Result<(), String> {
    match direction {
        "+" | "-" => Ok(()),
        other => Err(format!("direction must be '+' or '-', got '{other}'")),
    }
}

fn check_symmetry(symmetry: &[i8; 3]) -> Result<(), String> {
    match symmetry.iter().find(|sym| !(-1..=1).contains(*sym)) {
        Some(sym) => Err(format!("symmetry entries must be -1, 0 or 1, got {sym}")),
        None => Ok(()),
    }
}

model_union! {
    /// Every node type of the schema. Load this when the root type of a file
    /// is not known in advance.
    pub enum Component {
        Box(BoxGeometry),
        Sphere(Sphere),
        Cylinder(Cylinder),
        PolySlab(PolySlab),
        Medium(Medium),
        PoleResidue(PoleResidue),
        Sellmeier(Sellmeier),
        Lorentz(Lorentz),
        Debye(Debye),
        Structure(Structure),
        GaussianPulse(GaussianPulse),
        VolumeSource(VolumeSource),
        PlaneWave(PlaneWave),
        ModeSource(ModeSource),
        PMLLayer(PMLLayer),
        FieldMonitor(FieldMonitor),
        FieldTimeMonitor(FieldTimeMonitor),
        PermittivityMonitor(PermittivityMonitor),
        FluxMonitor(FluxMonitor),
        FluxTimeMonitor(FluxTimeMonitor),
        ModeMonitor(ModeMonitor),
        ModeSolverMonitor(ModeSolverMonitor),
        Simulation(Simulation),
        Grid(Grid),
        FieldData(FieldData),
        FieldTimeData(FieldTimeData),
        PermittivityData(PermittivityData),
        FluxData(FluxData),
        FluxTimeData(FluxTimeData),
        ModeData(ModeData),
        ModeSolverData(ModeSolverData),
        SimulationData(SimulationData),
    }
}
