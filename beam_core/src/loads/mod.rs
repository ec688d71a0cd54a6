//! Loads applied to beam spans
//!
//! # Overview
//!
//! - [`LoadKind`] - distributed, point, moment or torsion
//! - [`LoadSource`] - provenance label (self-weight, manual entry, external slab reaction)
//! - [`Load`] - one load on one span
//!
//! A span owns its loads as an ordered `Vec`, but only the per-kind sums matter
//! to the results. Magnitudes are characteristic (service) values; the design
//! stages apply the load factor.
//!
//! # Example
//!
//! ```
//! use beam_core::loads::{Load, LoadKind, LoadSource};
//! use beam_core::section::CrossSection;
//!
//! let slab = Load::distributed(12.0, 0.0, 6.0).with_source(LoadSource::External("L1".into()));
//! let own = Load::self_weight(&CrossSection::rectangular(20.0, 50.0), 6.0, 25.0);
//!
//! // 0.20 m × 0.50 m × 25 kN/m³ = 2.5 kN/m
//! assert!((own.value - 2.5).abs() < 1e-12);
//! assert!((Load::total_of(&[slab, own], LoadKind::Distributed) - 14.5).abs() < 1e-12);
//! ```

pub mod load_types;

pub use load_types::LoadKind;

use serde::{Deserialize, Serialize};

use crate::section::CrossSection;

/// Where a load came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "type", content = "label")]
pub enum LoadSource {
    /// Member self-weight, recomputed whenever the section changes
    SelfWeight,
    /// Entered by hand
    #[default]
    Manual,
    /// Transferred from another element (slab reaction, wall, ...)
    External(String),
}

impl LoadSource {
    /// Human-readable label
    pub fn label(&self) -> String {
        match self {
            LoadSource::SelfWeight => "Self-weight".to_string(),
            LoadSource::Manual => "Manual".to_string(),
            LoadSource::External(origin) => format!("External ({})", origin),
        }
    }
}

/// A single load on a span
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Load {
    /// How the load acts
    pub kind: LoadKind,

    /// Magnitude in the unit of `kind` (positive downward)
    pub value: f64,

    /// Start position from the span's start node (m)
    pub start_m: f64,

    /// End position from the span's start node (m)
    pub end_m: f64,

    /// Provenance
    #[serde(default)]
    pub source: LoadSource,
}

impl Load {
    /// Create a load of any kind
    pub fn new(kind: LoadKind, value: f64, start_m: f64, end_m: f64) -> Self {
        Load {
            kind,
            value,
            start_m,
            end_m,
            source: LoadSource::Manual,
        }
    }

    /// Distributed load (kN/m) between two positions
    pub fn distributed(value_kn_m: f64, start_m: f64, end_m: f64) -> Self {
        Load::new(LoadKind::Distributed, value_kn_m, start_m, end_m)
    }

    /// Self-weight bw·h·γ over the full span (kN/m)
    pub fn self_weight(section: &CrossSection, length_m: f64, density_kn_m3: f64) -> Self {
        Load::distributed(self_weight_kn_m(section, density_kn_m3), 0.0, length_m)
            .with_source(LoadSource::SelfWeight)
    }

    /// Set the provenance
    pub fn with_source(mut self, source: LoadSource) -> Self {
        self.source = source;
        self
    }

    /// True for self-weight loads
    pub fn is_self_weight(&self) -> bool {
        self.source == LoadSource::SelfWeight
    }

    /// Sum of magnitudes of one kind
    pub fn total_of(loads: &[Load], kind: LoadKind) -> f64 {
        loads.iter().filter(|l| l.kind == kind).map(|l| l.value).sum()
    }
}

/// Self-weight line load of a section (kN/m)
pub fn self_weight_kn_m(section: &CrossSection, density_kn_m3: f64) -> f64 {
    section.web_area_m2() * density_kn_m3
}
