//! Current sources and their time dependence.

use super::{FIELD_COMPONENTS, check_direction, non_negative, non_negative_all};
use crate::model::Validate;
use crate::{model_node, model_union};

model_node! {
    /// Gaussian pulse in time, centered on `freq0` with width `fwidth`.
    pub struct GaussianPulse: "GaussianPulse" {
        freq0: f64,
        fwidth: f64,
        offset: f64,
        phase: f64,
    }
}

impl Validate for GaussianPulse {
    fn validate(&self) -> Result<(), String> {
        non_negative("freq0", self.freq0)?;
        if self.fwidth <= 0.0 || self.fwidth.is_nan() {
            return Err(format!("fwidth must be positive, got {}", self.fwidth));
        }
        Ok(())
    }
}

model_union! {
    /// Time dependence of a source.
    pub enum SourceTime {
        GaussianPulse(GaussianPulse),
    }
}

fn check_polarization(polarization: &str) -> Result<(), String> {
    if FIELD_COMPONENTS.contains(&polarization) {
        Ok(())
    } else {
        Err(format!(
            "polarization must be one of {FIELD_COMPONENTS:?}, got '{polarization}'"
        ))
    }
}

model_node! {
    /// Uniform current source filling a box.
    pub struct VolumeSource: "VolumeSource" {
        center: [f64; 3],
        size: [f64; 3],
        source_time: SourceTime,
        polarization: String,
    }
}

impl Validate for VolumeSource {
    fn validate(&self) -> Result<(), String> {
        non_negative_all("size", &self.size)?;
        check_polarization(&self.polarization)
    }
}

model_node! {
    /// Plane wave injected through a planar box.
    pub struct PlaneWave: "PlaneWave" {
        center: [f64; 3],
        size: [f64; 3],
        source_time: SourceTime,
        direction: String,
        polarization: String,
        angle_theta: f64,
        angle_phi: f64,
    }
}

impl Validate for PlaneWave {
    fn validate(&self) -> Result<(), String> {
        non_negative_all("size", &self.size)?;
        check_direction(&self.direction)?;
        check_polarization(&self.polarization)
    }
}

model_node! {
    /// Waveguide mode injected through a planar box.
    pub struct ModeSource: "ModeSource" {
        center: [f64; 3],
        size: [f64; 3],
        source_time: SourceTime,
        direction: String,
        mode_index: u32,
        num_modes: u32,
    }
}

impl Validate for ModeSource {
    fn validate(&self) -> Result<(), String> {
        non_negative_all("size", &self.size)?;
        check_direction(&self.direction)?;
        if self.mode_index >= self.num_modes {
            return Err(format!(
                "mode_index {} is out of range for {} modes",
                self.mode_index, self.num_modes
            ));
        }
        Ok(())
    }
}

model_union! {
    /// Any source.
    pub enum Source {
        VolumeSource(VolumeSource),
        PlaneWave(PlaneWave),
        ModeSource(ModeSource),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pulse() -> SourceTime {
        GaussianPulse::new(2e14, 1e13, 5.0, 0.0).unwrap().into()
    }

    #[test]
    fn pulse_width_must_be_positive() {
        assert!(GaussianPulse::new(2e14, 0.0, 5.0, 0.0).is_err());
        assert!(GaussianPulse::new(-1.0, 1e13, 5.0, 0.0).is_err());
    }

    #[test]
    fn polarization_is_a_field_component() {
        assert!(VolumeSource::new([0.0; 3], [0.0; 3], pulse(), "Ez".into()).is_ok());
        assert!(VolumeSource::new([0.0; 3], [0.0; 3], pulse(), "Ew".into()).is_err());
    }

    #[test]
    fn mode_index_in_range() {
        let make = |index| ModeSource::new([0.0; 3], [0.0, 1.0, 1.0], pulse(), "+".into(), index, 2);
        assert!(make(1).is_ok());
        assert!(make(2).is_err());
    }

    #[test]
    fn direction_is_signed() {
        let wave = PlaneWave::new(
            [0.0; 3],
            [f64::INFINITY, f64::INFINITY, 0.0],
            pulse(),
            "sideways".into(),
            "Ex".into(),
            0.0,
            0.0,
        );
        assert!(wave.is_err());
    }
}
