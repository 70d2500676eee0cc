//! Monitors that record data during a run.

use super::{FIELD_COMPONENTS, non_negative, non_negative_all};
use crate::model::Validate;
use crate::{model_node, model_union};

fn check_freqs(freqs: &[f64]) -> Result<(), String> {
    non_negative_all("freqs", freqs)
}

fn check_fields(fields: &[String]) -> Result<(), String> {
    for field in fields {
        if !FIELD_COMPONENTS.contains(&field.as_str()) {
            return Err(format!(
                "unknown field component '{field}', expected one of {FIELD_COMPONENTS:?}"
            ));
        }
    }
    Ok(())
}

fn check_window(start: f64, stop: Option<f64>, interval: u32) -> Result<(), String> {
    non_negative("start", start)?;
    if let Some(stop) = stop
        && stop < start
    {
        return Err(format!("stop ({stop}) is before start ({start})"));
    }
    if interval == 0 {
        return Err("interval must be at least 1".to_string());
    }
    Ok(())
}

model_node! {
    /// Records field components at a set of frequencies.
    pub struct FieldMonitor: "FieldMonitor" {
        center: [f64; 3],
        size: [f64; 3],
        name: String,
        fields: Vec<String>,
        freqs: Vec<f64>,
    }
}

impl Validate for FieldMonitor {
    fn validate(&self) -> Result<(), String> {
        non_negative_all("size", &self.size)?;
        check_fields(&self.fields)?;
        check_freqs(&self.freqs)
    }
}

model_node! {
    /// Records field components over a time window.
    pub struct FieldTimeMonitor: "FieldTimeMonitor" {
        center: [f64; 3],
        size: [f64; 3],
        name: String,
        fields: Vec<String>,
        start: f64,
        stop: Option<f64>,
        interval: u32,
    }
}

impl Validate for FieldTimeMonitor {
    fn validate(&self) -> Result<(), String> {
        non_negative_all("size", &self.size)?;
        check_fields(&self.fields)?;
        check_window(self.start, self.stop, self.interval)
    }
}

model_node! {
    /// Records the diagonal permittivity at a set of frequencies.
    pub struct PermittivityMonitor: "PermittivityMonitor" {
        center: [f64; 3],
        size: [f64; 3],
        name: String,
        freqs: Vec<f64>,
    }
}

impl Validate for PermittivityMonitor {
    fn validate(&self) -> Result<(), String> {
        non_negative_all("size", &self.size)?;
        check_freqs(&self.freqs)
    }
}

model_node! {
    /// Records flux through a surface at a set of frequencies.
    pub struct FluxMonitor: "FluxMonitor" {
        center: [f64; 3],
        size: [f64; 3],
        name: String,
        freqs: Vec<f64>,
    }
}

impl Validate for FluxMonitor {
    fn validate(&self) -> Result<(), String> {
        non_negative_all("size", &self.size)?;
        check_freqs(&self.freqs)
    }
}

model_node! {
    /// Records flux through a surface over a time window.
    pub struct FluxTimeMonitor: "FluxTimeMonitor" {
        center: [f64; 3],
        size: [f64; 3],
        name: String,
        start: f64,
        stop: Option<f64>,
        interval: u32,
    }
}

impl Validate for FluxTimeMonitor {
    fn validate(&self) -> Result<(), String> {
        non_negative_all("size", &self.size)?;
        check_window(self.start, self.stop, self.interval)
    }
}

model_node! {
    /// Records mode amplitudes through a plane.
    pub struct ModeMonitor: "ModeMonitor" {
        center: [f64; 3],
        size: [f64; 3],
        name: String,
        freqs: Vec<f64>,
        num_modes: u32,
    }
}

impl Validate for ModeMonitor {
    fn validate(&self) -> Result<(), String> {
        check_mode_plane(&self.size, &self.freqs, self.num_modes)
    }
}

model_node! {
    /// Solves for mode profiles on a plane without recording amplitudes.
    pub struct ModeSolverMonitor: "ModeSolverMonitor" {
        center: [f64; 3],
        size: [f64; 3],
        name: String,
        freqs: Vec<f64>,
        num_modes: u32,
    }
}

impl Validate for ModeSolverMonitor {
    fn validate(&self) -> Result<(), String> {
        check_mode_plane(&self.size, &self.freqs, self.num_modes)
    }
}

fn check_mode_plane(size: &[f64; 3], freqs: &[f64], num_modes: u32) -> Result<(), String> {
    non_negative_all("size", size)?;
    check_freqs(freqs)?;
    if num_modes == 0 {
        return Err("num_modes must be at least 1".to_string());
    }
    Ok(())
}

model_union! {
    /// Any monitor.
    pub enum Monitor {
        Field(FieldMonitor),
        FieldTime(FieldTimeMonitor),
        Permittivity(PermittivityMonitor),
        Flux(FluxMonitor),
        FluxTime(FluxTimeMonitor),
        Mode(ModeMonitor),
        ModeSolver(ModeSolverMonitor),
    }
}

impl Monitor {
    /// Name under which the monitor's data is stored.
    pub fn name(&self) -> &str {
        match self {
            Self::Field(monitor) => monitor.name(),
            Self::FieldTime(monitor) => monitor.name(),
            Self::Permittivity(monitor) => monitor.name(),
            Self::Flux(monitor) => monitor.name(),
            Self::FluxTime(monitor) => monitor.name(),
            Self::Mode(monitor) => monitor.name(),
            Self::ModeSolver(monitor) => monitor.name(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Model;

    #[test]
    fn fields_must_be_components() {
        let ok = FieldMonitor::new([0.0; 3], [1.0; 3], "field".into(), vec!["Ex".into()], vec![2e14]);
        assert!(ok.is_ok());
        let bad = FieldMonitor::new([0.0; 3], [1.0; 3], "field".into(), vec!["Bx".into()], vec![2e14]);
        assert!(bad.is_err());
    }

    #[test]
    fn negative_frequencies_fail() {
        assert!(FluxMonitor::new([0.0; 3], [1.0, 1.0, 0.0], "flux".into(), vec![-1.0]).is_err());
    }

    #[test]
    fn time_window_is_ordered() {
        assert!(FluxTimeMonitor::new([0.0; 3], [1.0; 3], "t".into(), 0.0, Some(1e-12), 1).is_ok());
        assert!(FluxTimeMonitor::new([0.0; 3], [1.0; 3], "t".into(), 2e-12, Some(1e-12), 1).is_err());
        assert!(FluxTimeMonitor::new([0.0; 3], [1.0; 3], "t".into(), 0.0, None, 0).is_err());
    }

    #[test]
    fn name_of_any_monitor() {
        let monitor: Monitor = ModeMonitor::new([0.0; 3], [0.0, 2.0, 2.0], "modes".into(), vec![2e14], 3)
            .unwrap()
            .into();
        assert_eq!(monitor.name(), "modes");
        assert_eq!(monitor.type_tag(), "ModeMonitor");
    }

    #[test]
    fn mode_solver_monitor_is_its_own_type() {
        let solver = ModeSolverMonitor::new([0.0; 3], [0.0, 2.0, 2.0], "solve".into(), vec![2e14], 2)
            .unwrap();
        let monitor: Monitor = solver.clone().into();
        assert_eq!(monitor.type_tag(), "ModeSolverMonitor");
        assert_eq!(monitor.name(), "solve");

        let decoded: Monitor = crate::text::from_json_str(&solver.canonical_json()).unwrap();
        assert!(matches!(decoded, Monitor::ModeSolver(_)));
        assert!(ModeSolverMonitor::new([0.0; 3], [0.0, 2.0, 2.0], "solve".into(), vec![2e14], 0).is_err());
    }
}
