//! # Materials
//!
//! Material definitions for reinforced-concrete members. A [`Material`] carries
//! both the concrete and the reinforcing steel strengths a span is designed
//! with; it is immutable once created and shared between spans via `Arc`.
//!
//! ## Example
//!
//! ```rust
//! use beam_core::materials::{ConcreteClass, Material};
//!
//! let c30 = Material::concrete(ConcreteClass::C30);
//! assert_eq!(c30.fck_mpa, 30.0);
//!
//! // fcd = fck / γc, in kN/cm²
//! assert!((c30.fcd(1.4) - 2.142857).abs() < 1e-6);
//! ```

pub mod concrete;

pub use concrete::ConcreteClass;

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};
use crate::units::{KnPerCm2, Megapascals};

/// Default reinforcing steel yield strength (CA-50, MPa)
pub const DEFAULT_FYK_MPA: f64 = 500.0;

/// Material class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum MaterialClass {
    #[default]
    Concrete,
    Steel,
}

/// Structural material with characteristic strengths.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    /// Display name, e.g. "C25"
    pub name: String,

    /// Concrete or steel
    pub class: MaterialClass,

    /// Characteristic compressive strength fck (MPa)
    pub fck_mpa: f64,

    /// Characteristic yield strength of the reinforcement fyk (MPa)
    pub fyk_mpa: f64,

    /// Secant modulus of elasticity Ecs (MPa)
    pub ecs_mpa: f64,
}

impl Material {
    /// Create a material from raw values
    pub fn new(name: impl Into<String>, class: MaterialClass, fck_mpa: f64, fyk_mpa: f64, ecs_mpa: f64) -> Self {
        Material {
            name: name.into(),
            class,
            fck_mpa,
            fyk_mpa,
            ecs_mpa,
        }
    }

    /// Concrete of a standard class reinforced with CA-50 steel
    pub fn concrete(class: ConcreteClass) -> Self {
        Material::new(
            class.display_name(),
            MaterialClass::Concrete,
            class.fck_mpa(),
            DEFAULT_FYK_MPA,
            class.ecs_mpa(),
        )
    }

    /// Design compressive strength fcd = fck / γc (kN/cm²)
    pub fn fcd(&self, gamma_c: f64) -> f64 {
        KnPerCm2::from(Megapascals(self.fck_mpa / gamma_c)).0
    }

    /// Design yield strength fyd = fyk / γs (kN/cm²)
    pub fn fyd(&self, gamma_s: f64) -> f64 {
        KnPerCm2::from(Megapascals(self.fyk_mpa / gamma_s)).0
    }

    /// Mean tensile strength fctm = 0.3 · fck^(2/3) (kN/cm²)
    pub fn fctm(&self) -> f64 {
        KnPerCm2::from(Megapascals(0.3 * self.fck_mpa.powf(2.0 / 3.0))).0
    }

    /// Design tensile strength fctd = 0.21 · fck^(2/3) / γc (kN/cm²)
    pub fn fctd(&self, gamma_c: f64) -> f64 {
        KnPerCm2::from(Megapascals(0.21 * self.fck_mpa.powf(2.0 / 3.0) / gamma_c)).0
    }

    /// Validate material parameters
    pub fn validate(&self) -> CalcResult<()> {
        for (field, value) in [
            ("fck_mpa", self.fck_mpa),
            ("fyk_mpa", self.fyk_mpa),
            ("ecs_mpa", self.ecs_mpa),
        ] {
            if value <= 0.0 {
                return Err(CalcError::invalid_input(field, value.to_string(), "Must be positive"));
            }
        }
        if self.fck_mpa >= 250.0 {
            return Err(CalcError::invalid_input(
                "fck_mpa",
                self.fck_mpa.to_string(),
                "Strut effectiveness (1 - fck/250) must stay positive",
            ));
        }
        Ok(())
    }
}

impl Default for Material {
    fn default() -> Self {
        Material::concrete(ConcreteClass::C25)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_c25() {
        let mat = Material::default();
        assert_eq!(mat.name, "C25");
        assert_eq!(mat.fck_mpa, 25.0);
        assert_eq!(mat.fyk_mpa, 500.0);
        assert_eq!(mat.ecs_mpa, 23_800.0);
    }

    #[test]
    fn test_design_strengths() {
        let mat = Material::concrete(ConcreteClass::C25);
        // 25 / 1.4 / 10 = 1.7857 kN/cm²
        assert!((mat.fcd(1.4) - 1.7857).abs() < 1e-4);
        // 500 / 1.15 / 10 = 43.478 kN/cm²
        assert!((mat.fyd(1.15) - 43.478).abs() < 1e-3);
    }

    #[test]
    fn test_tensile_strengths() {
        let mat = Material::concrete(ConcreteClass::C30);
        // fctm = 0.3 * 30^(2/3) = 2.896 MPa
        assert!((mat.fctm() - 0.2896).abs() < 1e-4);
        // fctd = 0.21 * 9.655 / 1.4 = 1.448 MPa
        assert!((mat.fctd(1.4) - 0.1448).abs() < 1e-4);
    }

    #[test]
    fn test_validation() {
        let mut mat = Material::default();
        assert!(mat.validate().is_ok());
        mat.ecs_mpa = 0.0;
        assert!(mat.validate().is_err());
    }

    #[test]
    fn test_serialization() {
        let mat = Material::concrete(ConcreteClass::C30);
        let json = serde_json::to_string(&mat).unwrap();
        let roundtrip: Material = serde_json::from_str(&json).unwrap();
        assert_eq!(mat, roundtrip);
    }
}
