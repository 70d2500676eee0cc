//! The simulation specification.

use std::collections::BTreeMap;

use super::medium::{Medium, MediumSpec};
use super::monitor::Monitor;
use super::non_negative_all;
use super::source::Source;
use super::structure::Structure;
use crate::address::Address;
use crate::error::{ModelError, Result};
use crate::model::Validate;
use crate::model_node;
use crate::value::{FromValue, ToValue, Value};

/// Absorbing boundary profiles.
pub const PML_PROFILES: [&str; 3] = ["standard", "stable", "absorber"];

model_node! {
    /// Perfectly matched layer along one axis. Zero layers means no PML.
    pub struct PMLLayer: "PMLLayer" {
        profile: String,
        num_layers: u32,
    }
}

impl PMLLayer {
    /// No absorbing layer.
    pub fn none() -> Self {
        Self {
            profile: PML_PROFILES[0].to_string(),
            num_layers: 0,
            identity: crate::Identity::default(),
        }
    }
}

impl Validate for PMLLayer {
    fn validate(&self) -> std::result::Result<(), String> {
        if PML_PROFILES.contains(&self.profile.as_str()) {
            Ok(())
        } else {
            Err(format!(
                "profile must be one of {PML_PROFILES:?}, got '{}'",
                self.profile
            ))
        }
    }
}

/// Grid step: one value for all axes, or one per axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GridSize {
    Uniform(f64),
    PerAxis([f64; 3]),
}

impl GridSize {
    /// Step along each axis.
    pub fn steps(&self) -> [f64; 3] {
        match self {
            Self::Uniform(step) => [*step; 3],
            Self::PerAxis(steps) => *steps,
        }
    }
}

impl ToValue for GridSize {
    fn to_value(&self) -> Value {
        match self {
            Self::Uniform(step) => step.to_value(),
            Self::PerAxis(steps) => steps.to_value(),
        }
    }
}

impl FromValue for GridSize {
    fn from_value(value: Value, at: &Address) -> Result<Self> {
        match value {
            Value::Seq(_) => <[f64; 3]>::from_value(value, at).map(Self::PerAxis),
            Value::Float(_) | Value::Int(_) | Value::Str(_) => {
                f64::from_value(value, at).map(Self::Uniform)
            }
            other => Err(ModelError::mismatch("grid size", &other, at)),
        }
    }
}

model_node! {
    /// Everything needed to run one simulation.
    pub struct Simulation: "Simulation" {
        center: [f64; 3] = [0.0; 3],
        size: [f64; 3],
        grid_size: GridSize,
        medium: MediumSpec = Medium::vacuum().into(),
        run_time: f64 = 0.0,
        structures: Vec<Structure> = Vec::new(),
        sources: BTreeMap<String, Source> = BTreeMap::new(),
        monitors: BTreeMap<String, Monitor> = BTreeMap::new(),
        pml_layers: [PMLLayer; 3] = no_pml(),
        symmetry: [i8; 3] = [0; 3],
        shutoff: f64 = DEFAULT_SHUTOFF,
        courant: f64 = DEFAULT_COURANT,
        subpixel: bool = true,
    }
}

/// Field decay, relative to the peak, at which a run stops early.
pub const DEFAULT_SHUTOFF: f64 = 1e-5;

/// Time step as a fraction of the stability limit.
pub const DEFAULT_COURANT: f64 = 0.9;

fn no_pml() -> [PMLLayer; 3] {
    [PMLLayer::none(), PMLLayer::none(), PMLLayer::none()]
}

impl Validate for Simulation {
    fn validate(&self) -> std::result::Result<(), String> {
        non_negative_all("size", &self.size)?;
        for step in self.grid_size.steps() {
            if step <= 0.0 || step.is_nan() {
                return Err(format!("grid_size must be positive, got {step}"));
            }
        }
        if self.run_time < 0.0 {
            return Err(format!("run_time must be non-negative, got {}", self.run_time));
        }
        if self.shutoff < 0.0 {
            return Err(format!("shutoff must be non-negative, got {}", self.shutoff));
        }
        if !(0.0..=1.0).contains(&self.courant) {
            return Err(format!("courant must lie in [0, 1], got {}", self.courant));
        }
        super::check_symmetry(&self.symmetry)?;
        for (key, monitor) in &self.monitors {
            if key != monitor.name() {
                return Err(format!(
                    "monitor stored under '{key}' is named '{}'",
                    monitor.name()
                ));
            }
        }
        Ok(())
    }
}

impl Simulation {
    /// Start a simulation with defaults for everything but the domain.
    pub fn builder(size: [f64; 3], grid_size: GridSize) -> SimulationBuilder {
        SimulationBuilder::new(size, grid_size)
    }

    /// Source stored under `name`.
    pub fn source(&self, name: &str) -> Option<&Source> {
        self.sources.get(name)
    }

    /// Monitor stored under `name`.
    pub fn monitor(&self, name: &str) -> Option<&Monitor> {
        self.monitors.get(name)
    }
}

/// Builder for [`Simulation`].
#[derive(Debug, Clone)]
#[must_use]
pub struct SimulationBuilder {
    center: [f64; 3],
    size: [f64; 3],
    grid_size: GridSize,
    medium: MediumSpec,
    run_time: f64,
    structures: Vec<Structure>,
    sources: BTreeMap<String, Source>,
    monitors: BTreeMap<String, Monitor>,
    pml_layers: [PMLLayer; 3],
    symmetry: [i8; 3],
    shutoff: f64,
    courant: f64,
    subpixel: bool,
}

impl SimulationBuilder {
    fn new(size: [f64; 3], grid_size: GridSize) -> Self {
        Self {
            center: [0.0; 3],
            size,
            grid_size,
            medium: Medium::vacuum().into(),
            run_time: 0.0,
            structures: Vec::new(),
            sources: BTreeMap::new(),
            monitors: BTreeMap::new(),
            pml_layers: no_pml(),
            symmetry: [0; 3],
            shutoff: DEFAULT_SHUTOFF,
            courant: DEFAULT_COURANT,
            subpixel: true,
        }
    }

    pub fn center(mut self, center: [f64; 3]) -> Self {
        self.center = center;
        self
    }

    pub fn medium(mut self, medium: impl Into<MediumSpec>) -> Self {
        self.medium = medium.into();
        self
    }

    pub fn run_time(mut self, run_time: f64) -> Self {
        self.run_time = run_time;
        self
    }

    pub fn structure(mut self, structure: Structure) -> Self {
        self.structures.push(structure);
        self
    }

    pub fn source(mut self, name: impl Into<String>, source: impl Into<Source>) -> Self {
        self.sources.insert(name.into(), source.into());
        self
    }

    /// Add a monitor, keyed by its own name.
    pub fn monitor(mut self, monitor: impl Into<Monitor>) -> Self {
        let monitor = monitor.into();
        self.monitors.insert(monitor.name().to_string(), monitor);
        self
    }

    pub fn pml_layers(mut self, pml_layers: [PMLLayer; 3]) -> Self {
        self.pml_layers = pml_layers;
        self
    }

    pub fn symmetry(mut self, symmetry: [i8; 3]) -> Self {
        self.symmetry = symmetry;
        self
    }

    pub fn shutoff(mut self, shutoff: f64) -> Self {
        self.shutoff = shutoff;
        self
    }

    pub fn courant(mut self, courant: f64) -> Self {
        self.courant = courant;
        self
    }

    pub fn subpixel(mut self, subpixel: bool) -> Self {
        self.subpixel = subpixel;
        self
    }

    /// Validate and build.
    pub fn build(self) -> Result<Simulation> {
        Simulation::new(
            self.center,
            self.size,
            self.grid_size,
            self.medium,
            self.run_time,
            self.structures,
            self.sources,
            self.monitors,
            self.pml_layers,
            self.symmetry,
            self.shutoff,
            self.courant,
            self.subpixel,
        )
    }
}
