//! Material models.

use num_complex::Complex64;

use super::non_negative;
use crate::memo::Identity;
use crate::model::Validate;
use crate::{model_node, model_union};

model_node! {
    /// Non-dispersive medium.
    pub struct Medium: "Medium" {
        permittivity: f64,
        conductivity: f64,
    }
}

impl Medium {
    /// Vacuum: relative permittivity 1, no conductivity.
    pub fn vacuum() -> Self {
        Self {
            permittivity: 1.0,
            conductivity: 0.0,
            identity: Identity::default(),
        }
    }
}

impl Validate for Medium {
    fn validate(&self) -> Result<(), String> {
        if self.permittivity < 1.0 {
            return Err(format!(
                "permittivity must be at least 1, got {}",
                self.permittivity
            ));
        }
        non_negative("conductivity", self.conductivity)
    }
}

model_node! {
    /// Pole-residue dispersion: `eps_inf` plus `(pole, residue)` pairs.
    pub struct PoleResidue: "PoleResidue" {
        eps_inf: f64,
        poles: Vec<(Complex64, Complex64)>,
    }
}

impl Validate for PoleResidue {}

model_node! {
    /// Sellmeier dispersion, `(B, C)` coefficient pairs.
    pub struct Sellmeier: "Sellmeier" {
        coeffs: Vec<(f64, f64)>,
    }
}

impl Validate for Sellmeier {}

model_node! {
    /// Lorentz dispersion, `(delta_eps, f, delta)` per oscillator.
    pub struct Lorentz: "Lorentz" {
        eps_inf: f64,
        coeffs: Vec<(f64, f64, f64)>,
    }
}

impl Validate for Lorentz {}

model_node! {
    /// Debye relaxation, `(delta_eps, tau)` per term.
    pub struct Debye: "Debye" {
        eps_inf: f64,
        coeffs: Vec<(f64, f64)>,
    }
}

impl Validate for Debye {
    fn validate(&self) -> Result<(), String> {
        for (index, (_, tau)) in self.coeffs.iter().enumerate() {
            if *tau < 0.0 {
                return Err(format!("relaxation time {index} is negative: {tau}"));
            }
        }
        Ok(())
    }
}

model_union! {
    /// Any material model.
    pub enum MediumSpec {
        Medium(Medium),
        PoleResidue(PoleResidue),
        Sellmeier(Sellmeier),
        Lorentz(Lorentz),
        Debye(Debye),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Address, FromValue, Model, ToValue};

    #[test]
    fn vacuum_is_valid() {
        let vacuum = Medium::vacuum();
        assert_eq!(vacuum, Medium::new(1.0, 0.0).unwrap());
        assert!(Medium::new(0.5, 0.0).is_err());
        assert!(Medium::new(2.0, -1.0).is_err());
    }

    #[test]
    fn complex_poles_survive_text() {
        let medium = PoleResidue::new(
            2.0,
            vec![(Complex64::new(-1e14, 3e15), Complex64::new(5e14, -1e13))],
        )
        .unwrap();
        let text = medium.canonical_json();
        assert!(text.contains("\"real\"") && text.contains("\"imag\""));
        let decoded: MediumSpec = crate::text::from_json_str(&text).unwrap();
        assert_eq!(decoded, MediumSpec::PoleResidue(medium));
    }

    #[test]
    fn union_keeps_variant() {
        let lorentz = Lorentz::new(1.5, vec![(1.0, 2e14, 1e12)]).unwrap();
        let decoded = MediumSpec::from_value(lorentz.to_value(), &Address::root()).unwrap();
        assert!(matches!(decoded, MediumSpec::Lorentz(_)));
    }
}
