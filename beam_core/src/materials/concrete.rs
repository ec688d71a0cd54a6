//! Concrete strength classes.
//!
//! Characteristic strengths and secant moduli for the common structural
//! classes. The secant modulus follows Ecs = αi · 5600 · √fck with granite
//! aggregate (αE = 1.0), rounded to the published values.

use serde::{Deserialize, Serialize};

/// Structural concrete strength class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ConcreteClass {
    C20,
    #[default]
    C25,
    C30,
    C35,
    C40,
    C45,
    C50,
}

impl ConcreteClass {
    /// All classes for UI selection
    pub const ALL: [ConcreteClass; 7] = [
        ConcreteClass::C20,
        ConcreteClass::C25,
        ConcreteClass::C30,
        ConcreteClass::C35,
        ConcreteClass::C40,
        ConcreteClass::C45,
        ConcreteClass::C50,
    ];

    /// Characteristic compressive strength fck (MPa)
    pub fn fck_mpa(&self) -> f64 {
        match self {
            ConcreteClass::C20 => 20.0,
            ConcreteClass::C25 => 25.0,
            ConcreteClass::C30 => 30.0,
            ConcreteClass::C35 => 35.0,
            ConcreteClass::C40 => 40.0,
            ConcreteClass::C45 => 45.0,
            ConcreteClass::C50 => 50.0,
        }
    }

    /// Secant modulus Ecs (MPa)
    pub fn ecs_mpa(&self) -> f64 {
        match self {
            ConcreteClass::C20 => 21_300.0,
            ConcreteClass::C25 => 23_800.0,
            ConcreteClass::C30 => 26_000.0,
            ConcreteClass::C35 => 28_200.0,
            ConcreteClass::C40 => 30_200.0,
            ConcreteClass::C45 => 32_100.0,
            ConcreteClass::C50 => 33_800.0,
        }
    }

    /// Class name, e.g. "C30"
    pub fn display_name(&self) -> &'static str {
        match self {
            ConcreteClass::C20 => "C20",
            ConcreteClass::C25 => "C25",
            ConcreteClass::C30 => "C30",
            ConcreteClass::C35 => "C35",
            ConcreteClass::C40 => "C40",
            ConcreteClass::C45 => "C45",
            ConcreteClass::C50 => "C50",
        }
    }

    /// Class whose fck matches exactly, if any
    pub fn from_fck(fck_mpa: f64) -> Option<ConcreteClass> {
        ConcreteClass::ALL
            .iter()
            .copied()
            .find(|c| (c.fck_mpa() - fck_mpa).abs() < 1e-9)
    }
}

impl std::fmt::Display for ConcreteClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modulus_increases_with_class() {
        let moduli: Vec<f64> = ConcreteClass::ALL.iter().map(|c| c.ecs_mpa()).collect();
        assert!(moduli.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_from_fck() {
        assert_eq!(ConcreteClass::from_fck(30.0), Some(ConcreteClass::C30));
        assert_eq!(ConcreteClass::from_fck(27.0), None);
    }

    #[test]
    fn test_serialization() {
        let json = serde_json::to_string(&ConcreteClass::C35).unwrap();
        assert_eq!(json, "\"C35\"");
    }
}
