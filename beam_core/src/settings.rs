//! # Design Settings
//!
//! Every coefficient the pipeline uses lives here and is passed explicitly into
//! each stage. Engines hold no state of their own, so running the same beam
//! with the same settings always produces the same results, and the optimizer
//! can re-run the pipeline per candidate without side effects.
//!
//! Settings serialize to JSON. Every section is `#[serde(default)]`, so a file
//! only needs to mention the values it overrides:
//!
//! ```json
//! {
//!   "safety": { "gamma_f": 1.4 },
//!   "serviceability": { "exposure": "III" },
//!   "optimizer": { "min_height_cm": 40.0, "max_height_cm": 90.0 }
//! }
//! ```
//!
//! ## Example
//!
//! ```rust
//! use beam_core::settings::{DesignSettings, ExposureClass};
//!
//! let settings = DesignSettings::from_json_str(r#"{ "serviceability": { "exposure": "IV" } }"#).unwrap();
//! assert_eq!(settings.serviceability.exposure, ExposureClass::IV);
//! assert_eq!(settings.safety.gamma_f, 1.4);
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};

/// Complete configuration for one pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DesignSettings {
    /// Partial safety factors
    pub safety: SafetyFactors,

    /// Distance from the top fibre to the tension steel centroid subtracted from h (cm)
    pub effective_depth_offset_cm: f64,

    /// Flexural design limits
    pub flexure: FlexureSettings,

    /// Shear design constants
    pub shear: ShearSettings,

    /// Crack width and deflection check constants
    pub serviceability: ServiceabilitySettings,

    /// Bar catalogues and detailing rules
    pub detailing: DetailingSettings,

    /// Candidate heights and unit costs
    pub optimizer: OptimizerSettings,
}

impl Default for DesignSettings {
    fn default() -> Self {
        DesignSettings {
            safety: SafetyFactors::default(),
            effective_depth_offset_cm: 4.0,
            flexure: FlexureSettings::default(),
            shear: ShearSettings::default(),
            serviceability: ServiceabilitySettings::default(),
            detailing: DetailingSettings::default(),
            optimizer: OptimizerSettings::default(),
        }
    }
}

impl DesignSettings {
    /// Parse settings from a JSON string and validate them.
    pub fn from_json_str(json: &str) -> CalcResult<Self> {
        let settings: DesignSettings = serde_json::from_str(json)
            .map_err(|e| CalcError::config_error("<string>", e.to_string()))?;
        settings
            .validate()
            .map_err(|e| CalcError::config_error("<string>", e.to_string()))?;
        Ok(settings)
    }

    /// Load settings from a JSON file and validate them.
    pub fn load(path: &Path) -> CalcResult<Self> {
        let display = path.display().to_string();
        let contents = fs::read_to_string(path)
            .map_err(|e| CalcError::config_error(&display, e.to_string()))?;
        let settings: DesignSettings = serde_json::from_str(&contents)
            .map_err(|e| CalcError::config_error(&display, e.to_string()))?;
        settings
            .validate()
            .map_err(|e| CalcError::config_error(&display, e.to_string()))?;
        Ok(settings)
    }

    /// Write settings as pretty JSON.
    pub fn save(&self, path: &Path) -> CalcResult<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)
            .map_err(|e| CalcError::config_error(path.display().to_string(), e.to_string()))
    }

    /// Check that every factor is usable.
    pub fn validate(&self) -> CalcResult<()> {
        let positive = [
            ("safety.gamma_c", self.safety.gamma_c),
            ("safety.gamma_s", self.safety.gamma_s),
            ("safety.gamma_f", self.safety.gamma_f),
            ("flexure.kmd_limit", self.flexure.kmd_limit),
            ("shear.transverse_fyd_kn_cm2", self.shear.transverse_fyd_kn_cm2),
            ("shear.transverse_fywk_kn_cm2", self.shear.transverse_fywk_kn_cm2),
            ("serviceability.modular_ratio", self.serviceability.modular_ratio),
            ("serviceability.steel_modulus_kn_cm2", self.serviceability.steel_modulus_kn_cm2),
            ("serviceability.deflection_span_ratio", self.serviceability.deflection_span_ratio),
            ("detailing.min_stirrup_spacing_cm", self.detailing.min_stirrup_spacing_cm),
            ("detailing.max_stirrup_spacing_cm", self.detailing.max_stirrup_spacing_cm),
            ("detailing.skin_diameter_mm", self.detailing.skin_diameter_mm),
            ("optimizer.step_cm", self.optimizer.step_cm),
            ("optimizer.min_height_cm", self.optimizer.min_height_cm),
        ];
        for (field, value) in positive {
            if !(value > 0.0) {
                return Err(CalcError::invalid_input(field, value.to_string(), "Must be positive"));
            }
        }

        if self.detailing.stirrup_legs == 0 {
            return Err(CalcError::invalid_input(
                "detailing.stirrup_legs",
                "0",
                "Stirrups need at least one leg",
            ));
        }

        if self.effective_depth_offset_cm < 0.0 {
            return Err(CalcError::invalid_input(
                "effective_depth_offset_cm",
                self.effective_depth_offset_cm.to_string(),
                "Must not be negative",
            ));
        }

        if self.optimizer.max_height_cm < self.optimizer.min_height_cm {
            return Err(CalcError::invalid_input(
                "optimizer.max_height_cm",
                self.optimizer.max_height_cm.to_string(),
                "Must be at least min_height_cm",
            ));
        }

        check_catalogue("detailing.longitudinal_diameters_mm", &self.detailing.longitudinal_diameters_mm)?;
        check_catalogue("detailing.transverse_diameters_mm", &self.detailing.transverse_diameters_mm)?;

        Ok(())
    }
}

fn check_catalogue(field: &str, diameters: &[f64]) -> CalcResult<()> {
    if diameters.is_empty() {
        return Err(CalcError::invalid_input(field, "[]", "Catalogue must not be empty"));
    }
    let ascending = diameters.windows(2).all(|w| w[0] < w[1]);
    if !ascending || diameters[0] <= 0.0 {
        return Err(CalcError::invalid_input(
            field,
            format!("{:?}", diameters),
            "Diameters must be positive and strictly ascending",
        ));
    }
    Ok(())
}

/// Partial safety factors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SafetyFactors {
    /// Concrete strength reduction
    pub gamma_c: f64,
    /// Steel strength reduction
    pub gamma_s: f64,
    /// Load amplification for the ultimate limit state
    pub gamma_f: f64,
}

impl Default for SafetyFactors {
    fn default() -> Self {
        SafetyFactors {
            gamma_c: 1.4,
            gamma_s: 1.15,
            gamma_f: 1.4,
        }
    }
}

/// Flexural design limits.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlexureSettings {
    /// kmd at x/d = 0.45; above it the section is over-reinforced
    pub kmd_limit: f64,
    /// Minimum longitudinal ratio on the gross section b·h
    pub min_reinforcement_ratio: f64,
    /// Support moments below this (kNm, amplified) need no top steel
    pub negligible_support_moment_knm: f64,
    /// Moments below this (kNm) need no steel at all
    pub negligible_moment_knm: f64,
    /// Multiplier on the lever-arm estimate when kmd exceeds the limit
    pub over_ductility_penalty: f64,
}

impl Default for FlexureSettings {
    fn default() -> Self {
        FlexureSettings {
            kmd_limit: 0.251,
            min_reinforcement_ratio: 0.0015,
            negligible_support_moment_knm: 0.1,
            negligible_moment_knm: 0.01,
            over_ductility_penalty: 1.5,
        }
    }
}

/// Shear design constants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShearSettings {
    /// Capped design yield stress of stirrups (kN/cm²)
    pub transverse_fyd_kn_cm2: f64,
    /// Nominal yield stress of stirrups for the minimum ratio (kN/cm²)
    pub transverse_fywk_kn_cm2: f64,
}

impl Default for ShearSettings {
    fn default() -> Self {
        ShearSettings {
            transverse_fyd_kn_cm2: 43.5,
            transverse_fywk_kn_cm2: 50.0,
        }
    }
}

/// Environmental aggressiveness class, selects the crack width limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ExposureClass {
    /// Weak (rural, submerged)
    I,
    /// Moderate (urban)
    #[default]
    II,
    /// Strong (marine, industrial)
    III,
    /// Very strong (splash zones, aggressive industrial)
    IV,
}

impl ExposureClass {
    /// Characteristic crack width limit (mm)
    pub fn crack_width_limit_mm(&self) -> f64 {
        match self {
            ExposureClass::I => 0.4,
            ExposureClass::II => 0.3,
            ExposureClass::III | ExposureClass::IV => 0.2,
        }
    }
}

impl std::fmt::Display for ExposureClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ExposureClass::I => "I",
            ExposureClass::II => "II",
            ExposureClass::III => "III",
            ExposureClass::IV => "IV",
        };
        write!(f, "{}", name)
    }
}

/// Serviceability check constants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceabilitySettings {
    /// Environmental class for the crack width limit
    pub exposure: ExposureClass,
    /// Es/Ecs modular ratio αe
    pub modular_ratio: f64,
    /// Steel modulus Es (kN/cm²)
    pub steel_modulus_kn_cm2: f64,
    /// Bond coefficient η1 (ribbed bars)
    pub bond_eta1: f64,
    /// Immediate deflection multiplier for cracked-stage stiffness loss
    pub cracked_amplification: f64,
    /// Long-term creep coefficient αf (no compression steel relief)
    pub creep_coefficient: f64,
    /// Deflection limit denominator (L / ratio)
    pub deflection_span_ratio: f64,
}

impl Default for ServiceabilitySettings {
    fn default() -> Self {
        ServiceabilitySettings {
            exposure: ExposureClass::II,
            modular_ratio: 10.0,
            steel_modulus_kn_cm2: 21_000.0,
            bond_eta1: 2.25,
            cracked_amplification: 1.5,
            creep_coefficient: 2.0,
            deflection_span_ratio: 250.0,
        }
    }
}

/// Bar catalogues and detailing rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetailingSettings {
    /// Concrete cover to the stirrup (mm)
    pub cover_mm: f64,
    /// Width taken by the stirrup on each side (mm)
    pub stirrup_allowance_mm: f64,
    /// Minimum horizontal clear spacing between bars (mm)
    pub min_clear_spacing_mm: f64,
    /// Commercial longitudinal diameters, ascending (mm)
    pub longitudinal_diameters_mm: Vec<f64>,
    /// Commercial stirrup diameters, ascending (mm)
    pub transverse_diameters_mm: Vec<f64>,
    /// Bond coefficient for ribbed bars
    pub eta1: f64,
    /// Bond coefficient for good bond (bottom bars)
    pub eta2_good: f64,
    /// Bond coefficient for poor bond (top bars)
    pub eta2_poor: f64,
    /// Bond coefficient for φ < 32 mm
    pub eta3: f64,
    /// Absolute minimum anchorage length (mm)
    pub min_anchorage_mm: f64,
    /// Heights at or above this need skin reinforcement (cm)
    pub skin_height_threshold_cm: f64,
    /// Total skin area as a ratio of bw·h
    pub skin_ratio: f64,
    /// Skin bar diameter (mm)
    pub skin_diameter_mm: f64,
    /// Smallest buildable stirrup spacing (cm)
    pub min_stirrup_spacing_cm: f64,
    /// Absolute cap on stirrup spacing (cm)
    pub max_stirrup_spacing_cm: f64,
    /// Legs per stirrup
    pub stirrup_legs: u32,
}

impl Default for DetailingSettings {
    fn default() -> Self {
        DetailingSettings {
            cover_mm: 25.0,
            stirrup_allowance_mm: 5.0,
            min_clear_spacing_mm: 20.0,
            longitudinal_diameters_mm: vec![8.0, 10.0, 12.5, 16.0, 20.0, 25.0],
            transverse_diameters_mm: vec![5.0, 6.3, 8.0, 10.0],
            eta1: 2.25,
            eta2_good: 1.0,
            eta2_poor: 0.7,
            eta3: 1.0,
            min_anchorage_mm: 100.0,
            skin_height_threshold_cm: 60.0,
            skin_ratio: 0.0010,
            skin_diameter_mm: 8.0,
            min_stirrup_spacing_cm: 5.0,
            max_stirrup_spacing_cm: 30.0,
            stirrup_legs: 2,
        }
    }
}

/// Candidate heights and unit costs for the section optimizer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerSettings {
    /// Smallest candidate height (cm)
    pub min_height_cm: f64,
    /// Largest candidate height (cm), inclusive
    pub max_height_cm: f64,
    /// Stride between candidates (cm)
    pub step_cm: f64,
    /// Reinforced concrete unit weight for self-weight (kN/m³)
    pub concrete_density_kn_m3: f64,
    /// Concrete cost per m³
    pub concrete_cost_m3: f64,
    /// Steel cost per kg
    pub steel_cost_kg: f64,
    /// Formwork cost per m²
    pub formwork_cost_m2: f64,
    /// Steel mass per cm² of area per metre of bar (kg)
    pub steel_linear_mass_kg: f64,
    /// Length of support (top) bars as a fraction of the span
    pub support_bar_length_fraction: f64,
    /// Hook allowance added to each stirrup perimeter (cm)
    pub stirrup_hook_cm: f64,
    /// Cost assigned to invalid candidates
    pub invalid_cost: f64,
}

impl Default for OptimizerSettings {
    fn default() -> Self {
        OptimizerSettings {
            min_height_cm: 30.0,
            max_height_cm: 80.0,
            step_cm: 5.0,
            concrete_density_kn_m3: 25.0,
            concrete_cost_m3: 450.0,
            steel_cost_kg: 12.0,
            formwork_cost_m2: 80.0,
            steel_linear_mass_kg: 0.785,
            support_bar_length_fraction: 0.25,
            stirrup_hook_cm: 15.0,
            invalid_cost: 99_999.0,
        }
    }
}

impl OptimizerSettings {
    /// Candidate heights from min to max (inclusive) by step (cm)
    pub fn candidate_heights(&self) -> Vec<f64> {
        let count = ((self.max_height_cm - self.min_height_cm) / self.step_cm + 1e-9).floor() as usize + 1;
        (0..count)
            .map(|i| self.min_height_cm + i as f64 * self.step_cm)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert!(DesignSettings::default().validate().is_ok());
    }

    #[test]
    fn test_candidate_heights() {
        let heights = OptimizerSettings::default().candidate_heights();
        assert_eq!(heights.len(), 11);
        assert_eq!(heights[0], 30.0);
        assert_eq!(heights[10], 80.0);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings = DesignSettings::from_json_str(
            r#"{ "safety": { "gamma_f": 1.5 }, "serviceability": { "exposure": "III" } }"#,
        )
        .unwrap();
        assert_eq!(settings.safety.gamma_f, 1.5);
        assert_eq!(settings.safety.gamma_c, 1.4);
        assert_eq!(settings.serviceability.exposure, ExposureClass::III);
        assert_eq!(settings.detailing.longitudinal_diameters_mm.len(), 6);
    }

    #[test]
    fn test_crack_limits() {
        assert_eq!(ExposureClass::I.crack_width_limit_mm(), 0.4);
        assert_eq!(ExposureClass::II.crack_width_limit_mm(), 0.3);
        assert_eq!(ExposureClass::III.crack_width_limit_mm(), 0.2);
        assert_eq!(ExposureClass::IV.crack_width_limit_mm(), 0.2);
    }

    #[test]
    fn test_rejects_unsorted_catalogue() {
        let result = DesignSettings::from_json_str(
            r#"{ "detailing": { "longitudinal_diameters_mm": [10.0, 8.0] } }"#,
        );
        assert!(matches!(result, Err(CalcError::ConfigError { .. })));
    }

    #[test]
    fn test_rejects_zero_detailing_values() {
        for json in [
            r#"{ "detailing": { "skin_diameter_mm": 0.0 } }"#,
            r#"{ "detailing": { "stirrup_legs": 0 } }"#,
            r#"{ "detailing": { "max_stirrup_spacing_cm": 0.0 } }"#,
        ] {
            let result = DesignSettings::from_json_str(json);
            assert_eq!(result.unwrap_err().error_code(), "CONFIG_ERROR", "{}", json);
        }
    }

    #[test]
    fn test_load_maps_validation_to_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, r#"{ "detailing": { "stirrup_legs": 0 } }"#).unwrap();
        let err = DesignSettings::load(&path).unwrap_err();
        assert!(matches!(err, CalcError::ConfigError { .. }));
        assert!(err.to_string().contains("stirrup_legs"));
    }

    #[test]
    fn test_rejects_bad_json() {
        let result = DesignSettings::from_json_str("{ not json");
        assert_eq!(result.unwrap_err().error_code(), "CONFIG_ERROR");
    }

    #[test]
    fn test_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        let mut settings = DesignSettings::default();
        settings.serviceability.exposure = ExposureClass::I;
        settings.optimizer.step_cm = 10.0;
        settings.save(&path).unwrap();

        let loaded = DesignSettings::load(&path).unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = DesignSettings::load(&dir.path().join("absent.json"));
        assert!(matches!(result, Err(CalcError::ConfigError { .. })));
    }
}
