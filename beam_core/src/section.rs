//! # Cross Sections
//!
//! Rectangular (optionally flanged) concrete sections. Area and inertia are
//! derived from the current dimensions on every call: the optimizer rewrites
//! `h` in place on cloned sections, so nothing here is cached.

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};
use crate::units::{Centimeters, Meters};

/// Beam cross section (all dimensions in cm)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CrossSection {
    /// Web width bw (cm)
    pub bw_cm: f64,

    /// Total height h (cm)
    pub h_cm: f64,

    /// Flange width bf (cm), 0 when there is no flange
    #[serde(default)]
    pub bf_cm: f64,

    /// Flange thickness hf (cm), 0 when there is no flange
    #[serde(default)]
    pub hf_cm: f64,
}

impl CrossSection {
    /// Plain rectangular section
    pub fn rectangular(bw_cm: f64, h_cm: f64) -> Self {
        CrossSection {
            bw_cm,
            h_cm,
            bf_cm: 0.0,
            hf_cm: 0.0,
        }
    }

    /// Add a flange (T-section)
    pub fn with_flange(mut self, bf_cm: f64, hf_cm: f64) -> Self {
        self.bf_cm = bf_cm;
        self.hf_cm = hf_cm;
        self
    }

    /// Gross area (cm²): web plus the flange overhangs when bf > bw
    pub fn area_cm2(&self) -> f64 {
        let web = self.bw_cm * self.h_cm;
        let flange = if self.bf_cm > self.bw_cm {
            (self.bf_cm - self.bw_cm) * self.hf_cm
        } else {
            0.0
        };
        web + flange
    }

    /// Second moment of area of the web I = bw·h³/12 (cm⁴)
    pub fn inertia_cm4(&self) -> f64 {
        self.bw_cm * self.h_cm.powi(3) / 12.0
    }

    /// Effective depth d = h - offset (cm)
    pub fn effective_depth_cm(&self, offset_cm: f64) -> f64 {
        self.h_cm - offset_cm
    }

    /// Web area in m² (for self-weight and concrete volume)
    pub fn web_area_m2(&self) -> f64 {
        Meters::from(Centimeters(self.bw_cm)).0 * Meters::from(Centimeters(self.h_cm)).0
    }

    /// Validate section dimensions against the effective depth offset
    pub fn validate(&self, depth_offset_cm: f64) -> CalcResult<()> {
        if self.bw_cm <= 0.0 {
            return Err(CalcError::invalid_input(
                "bw_cm",
                self.bw_cm.to_string(),
                "Web width must be positive",
            ));
        }
        if self.h_cm <= depth_offset_cm {
            return Err(CalcError::invalid_input(
                "h_cm",
                self.h_cm.to_string(),
                format!("Height must exceed the {} cm cover allowance", depth_offset_cm),
            ));
        }
        Ok(())
    }
}

impl Default for CrossSection {
    fn default() -> Self {
        CrossSection::rectangular(20.0, 50.0)
    }
}
