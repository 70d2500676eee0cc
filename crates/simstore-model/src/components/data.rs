//! Monitor data and simulation results.
//!
//! Every data node pairs the monitor that produced it with the arrays it
//! recorded. Arrays are the only fields routed to binary container entries;
//! everything else stays in the embedded text document.

use std::collections::BTreeMap;

use super::check_symmetry;
use super::monitor::{
    FieldMonitor, FieldTimeMonitor, FluxMonitor, FluxTimeMonitor, ModeMonitor, ModeSolverMonitor,
    PermittivityMonitor,
};
use super::simulation::Simulation;
use crate::array::{
    FluxDataArray, FluxTimeDataArray, ModeAmpsDataArray, ModeIndexDataArray, ScalarFieldDataArray,
    ScalarFieldTimeDataArray, ScalarModeFieldDataArray,
};
use crate::model::Validate;
use crate::{model_node, model_union};

model_node! {
    /// Cell boundaries along each axis.
    pub struct Grid: "Grid" {
        x: Vec<f64>,
        y: Vec<f64>,
        z: Vec<f64>,
    }
}

impl Validate for Grid {
    fn validate(&self) -> Result<(), String> {
        for (axis, bounds) in [("x", &self.x), ("y", &self.y), ("z", &self.z)] {
            if bounds.windows(2).any(|pair| pair[1] < pair[0]) {
                return Err(format!("{axis} boundaries must be sorted"));
            }
        }
        Ok(())
    }
}

/// Field components present, paired with their wire names.
fn present<'a, T>(components: [(&'static str, &'a Option<T>); 6]) -> Vec<&'static str> {
    components
        .iter()
        .filter(|(_, array)| array.is_some())
        .map(|(name, _)| *name)
        .collect()
}

fn check_components(present: &[&str], recorded: &[String]) -> Result<(), String> {
    for component in present {
        if !recorded.iter().any(|field| field == component) {
            return Err(format!(
                "component {component} is not recorded by the monitor (fields: {recorded:?})"
            ));
        }
    }
    Ok(())
}

fn check_expansion(
    symmetry: &[i8; 3],
    symmetry_center: Option<&[f64; 3]>,
    grid_expanded: Option<&Grid>,
) -> Result<(), String> {
    check_symmetry(symmetry)?;
    if symmetry.iter().any(|sym| *sym != 0) {
        if symmetry_center.is_none() {
            return Err("symmetry_center is required when symmetry is set".to_string());
        }
        if grid_expanded.is_none() {
            return Err("grid_expanded is required when symmetry is set".to_string());
        }
    }
    Ok(())
}

model_node! {
    /// Frequency-domain fields recorded by a [`FieldMonitor`].
    pub struct FieldData: "FieldData" {
        monitor: FieldMonitor,
        ex as "Ex": Option<ScalarFieldDataArray>,
        ey as "Ey": Option<ScalarFieldDataArray>,
        ez as "Ez": Option<ScalarFieldDataArray>,
        hx as "Hx": Option<ScalarFieldDataArray>,
        hy as "Hy": Option<ScalarFieldDataArray>,
        hz as "Hz": Option<ScalarFieldDataArray>,
        symmetry: [i8; 3] = [0; 3],
        symmetry_center: Option<[f64; 3]>,
        grid_expanded: Option<Grid>,
    }
}

impl FieldData {
    /// Wire names of the components that hold data.
    pub fn components(&self) -> Vec<&'static str> {
        present([
            ("Ex", &self.ex),
            ("Ey", &self.ey),
            ("Ez", &self.ez),
            ("Hx", &self.hx),
            ("Hy", &self.hy),
            ("Hz", &self.hz),
        ])
    }
}

impl Validate for FieldData {
    fn validate(&self) -> Result<(), String> {
        check_components(&self.components(), self.monitor.fields())?;
        check_expansion(
            &self.symmetry,
            self.symmetry_center.as_ref(),
            self.grid_expanded.as_ref(),
        )
    }
}

model_node! {
    /// Time-domain fields recorded by a [`FieldTimeMonitor`].
    pub struct FieldTimeData: "FieldTimeData" {
        monitor: FieldTimeMonitor,
        ex as "Ex": Option<ScalarFieldTimeDataArray>,
        ey as "Ey": Option<ScalarFieldTimeDataArray>,
        ez as "Ez": Option<ScalarFieldTimeDataArray>,
        hx as "Hx": Option<ScalarFieldTimeDataArray>,
        hy as "Hy": Option<ScalarFieldTimeDataArray>,
        hz as "Hz": Option<ScalarFieldTimeDataArray>,
        symmetry: [i8; 3] = [0; 3],
        symmetry_center: Option<[f64; 3]>,
        grid_expanded: Option<Grid>,
    }
}

impl FieldTimeData {
    pub fn components(&self) -> Vec<&'static str> {
        present([
            ("Ex", &self.ex),
            ("Ey", &self.ey),
            ("Ez", &self.ez),
            ("Hx", &self.hx),
            ("Hy", &self.hy),
            ("Hz", &self.hz),
        ])
    }
}

impl Validate for FieldTimeData {
    fn validate(&self) -> Result<(), String> {
        check_components(&self.components(), self.monitor.fields())?;
        check_expansion(
            &self.symmetry,
            self.symmetry_center.as_ref(),
            self.grid_expanded.as_ref(),
        )
    }
}

model_node! {
    /// Diagonal relative permittivity on the monitor grid.
    pub struct PermittivityData: "PermittivityData" {
        monitor: PermittivityMonitor,
        eps_xx: ScalarFieldDataArray,
        eps_yy: ScalarFieldDataArray,
        eps_zz: ScalarFieldDataArray,
        symmetry: [i8; 3] = [0; 3],
        symmetry_center: Option<[f64; 3]>,
        grid_expanded: Option<Grid>,
    }
}

impl Validate for PermittivityData {
    fn validate(&self) -> Result<(), String> {
        check_expansion(
            &self.symmetry,
            self.symmetry_center.as_ref(),
            self.grid_expanded.as_ref(),
        )
    }
}

model_node! {
    pub struct FluxData: "FluxData" {
        monitor: FluxMonitor,
        flux: FluxDataArray,
    }
}

impl Validate for FluxData {}

model_node! {
    pub struct FluxTimeData: "FluxTimeData" {
        monitor: FluxTimeMonitor,
        flux: FluxTimeDataArray,
    }
}

impl Validate for FluxTimeData {}

model_node! {
    /// Mode amplitudes and effective indices recorded by a [`ModeMonitor`].
    pub struct ModeData: "ModeData" {
        monitor: ModeMonitor,
        amps: ModeAmpsDataArray,
        n_complex: ModeIndexDataArray,
    }
}

impl Validate for ModeData {}

model_node! {
    /// Mode profiles solved on the plane of a [`ModeSolverMonitor`].
    pub struct ModeSolverData: "ModeSolverData" {
        monitor: ModeSolverMonitor,
        ex as "Ex": Option<ScalarModeFieldDataArray>,
        ey as "Ey": Option<ScalarModeFieldDataArray>,
        ez as "Ez": Option<ScalarModeFieldDataArray>,
        hx as "Hx": Option<ScalarModeFieldDataArray>,
        hy as "Hy": Option<ScalarModeFieldDataArray>,
        hz as "Hz": Option<ScalarModeFieldDataArray>,
        symmetry: [i8; 3] = [0; 3],
        symmetry_center: Option<[f64; 3]>,
        grid_expanded: Option<Grid>,
        n_complex: ModeIndexDataArray,
    }
}

impl Validate for ModeSolverData {
    fn validate(&self) -> Result<(), String> {
        check_expansion(
            &self.symmetry,
            self.symmetry_center.as_ref(),
            self.grid_expanded.as_ref(),
        )
    }
}

model_union! {
    /// Data of any monitor.
    pub enum MonitorData {
        Field(FieldData),
        FieldTime(FieldTimeData),
        Permittivity(PermittivityData),
        Flux(FluxData),
        FluxTime(FluxTimeData),
        Mode(ModeData),
        ModeSolver(ModeSolverData),
    }
}

model_node! {
    /// A simulation together with the data its monitors recorded.
    pub struct SimulationData: "SimulationData" {
        simulation: Simulation,
        monitor_data: BTreeMap<String, MonitorData>,
        log: Option<String>,
    }
}

impl Validate for SimulationData {
    fn validate(&self) -> Result<(), String> {
        for name in self.monitor_data.keys() {
            if self.simulation.monitor(name).is_none() {
                return Err(format!("data stored for unknown monitor '{name}'"));
            }
        }
        Ok(())
    }
}

impl SimulationData {
    /// Data recorded by the named monitor.
    pub fn data(&self, name: &str) -> Option<&MonitorData> {
        self.monitor_data.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::array::{Coords, Values};
    use crate::{Address, FromValue, Model, ToValue, Value};

    fn field_array() -> ScalarFieldDataArray {
        ScalarFieldDataArray::new(
            vec![
                Coords::Float(vec![0.0, 0.1]),
                Coords::Float(vec![0.0]),
                Coords::Float(vec![0.0]),
                Coords::Float(vec![2e14]),
            ],
            Values::Real(vec![1.0, 2.0]),
        )
        .unwrap()
    }

    fn monitor(fields: &[&str]) -> FieldMonitor {
        FieldMonitor::new(
            [0.0; 3],
            [1.0, 0.0, 0.0],
            "fields".into(),
            fields.iter().map(|field| (*field).to_string()).collect(),
            vec![2e14],
        )
        .unwrap()
    }

    fn grid() -> Grid {
        Grid::new(vec![0.0, 0.1], vec![0.0], vec![0.0]).unwrap()
    }

    #[test]
    fn components_must_be_recorded() {
        let ok = FieldData::new(
            monitor(&["Ex"]),
            Some(field_array()),
            None,
            None,
            None,
            None,
            None,
            [0; 3],
            None,
            None,
        );
        assert!(ok.is_ok());
        assert_eq!(ok.unwrap().components(), vec!["Ex"]);

        let missing = FieldData::new(
            monitor(&["Ex"]),
            None,
            Some(field_array()),
            None,
            None,
            None,
            None,
            [0; 3],
            None,
            None,
        );
        assert!(missing.is_err());
    }

    #[test]
    fn symmetry_requires_expansion_data() {
        let make = |center: Option<[f64; 3]>, grid: Option<Grid>| {
            FieldData::new(
                monitor(&["Ex"]),
                Some(field_array()),
                None,
                None,
                None,
                None,
                None,
                [1, 0, 0],
                center,
                grid,
            )
        };
        assert!(make(None, Some(grid())).is_err());
        assert!(make(Some([0.0; 3]), None).is_err());
        assert!(make(Some([0.0; 3]), Some(grid())).is_ok());
    }

    fn eps(value: f64) -> ScalarFieldDataArray {
        ScalarFieldDataArray::new(
            vec![
                Coords::Float(vec![0.0]),
                Coords::Float(vec![0.0]),
                Coords::Float(vec![0.0]),
                Coords::Float(vec![2e14]),
            ],
            Values::Real(vec![value]),
        )
        .unwrap()
    }

    fn permittivity(
        symmetry: [i8; 3],
        center: Option<[f64; 3]>,
        grid: Option<Grid>,
    ) -> crate::Result<PermittivityData> {
        let monitor =
            PermittivityMonitor::new([0.0; 3], [1.0; 3], "eps".into(), vec![2e14]).unwrap();
        PermittivityData::new(monitor, eps(1.0), eps(2.0), eps(4.0), symmetry, center, grid)
    }

    #[test]
    fn permittivity_symmetry_requires_expansion_data() {
        assert!(permittivity([0; 3], None, None).is_ok());
        assert!(permittivity([0, -1, 0], None, Some(grid())).is_err());
        assert!(permittivity([0, -1, 0], Some([0.0; 3]), None).is_err());
        assert!(permittivity([0, -1, 0], Some([0.0; 3]), Some(grid())).is_ok());
        assert!(permittivity([2, 0, 0], Some([0.0; 3]), Some(grid())).is_err());
    }

    #[test]
    fn mode_solver_data_needs_a_mode_solver_monitor() {
        let monitor =
            ModeSolverMonitor::new([0.0; 3], [0.0, 1.0, 1.0], "solve".into(), vec![2e14], 1)
                .unwrap();
        let n_complex = ModeIndexDataArray::new(
            vec![Coords::Float(vec![2e14]), Coords::Int(vec![0])],
            Values::Complex(vec![crate::Complex64::new(1.5, 1e-4)]),
        )
        .unwrap();
        let data = ModeSolverData::new(
            monitor.clone(),
            None,
            None,
            None,
            None,
            None,
            None,
            [0, 0, 1],
            None,
            None,
            n_complex.clone(),
        );
        assert!(data.is_err());
        let data = ModeSolverData::new(
            monitor, None, None, None, None, None, None, [0; 3], None, None, n_complex,
        )
        .unwrap();

        let mut map = data.to_map();
        assert_eq!(
            map.get("monitor").and_then(Value::tag),
            Some("ModeSolverMonitor")
        );
        map.shift_remove("symmetry");
        let decoded = ModeSolverData::from_value(Value::Map(map), &Address::root()).unwrap();
        assert_eq!(decoded, data);

        let mut map = data.to_map();
        map.insert(
            "monitor".into(),
            ModeMonitor::new([0.0; 3], [0.0, 1.0, 1.0], "solve".into(), vec![2e14], 1)
                .unwrap()
                .to_value(),
        );
        assert!(ModeSolverData::from_value(Value::Map(map), &Address::root()).is_err());
    }

    #[test]
    fn field_time_data_symmetry_defaults_to_none() {
        let monitor = FieldTimeMonitor::new(
            [0.0; 3],
            [1.0; 3],
            "fields".into(),
            vec!["Ex".into()],
            0.0,
            None,
            1,
        )
        .unwrap();
        let data = FieldTimeData::new(
            monitor, None, None, None, None, None, None, [0; 3], None, None,
        )
        .unwrap();
        let mut map = data.to_map();
        map.shift_remove("symmetry");
        let decoded = FieldTimeData::from_value(Value::Map(map), &Address::root()).unwrap();
        assert_eq!(decoded.symmetry(), &[0; 3]);
        assert_eq!(decoded, data);
    }

    #[test]
    fn grid_boundaries_sorted() {
        assert!(Grid::new(vec![0.0, -1.0], vec![], vec![]).is_err());
    }
}
