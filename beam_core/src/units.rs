//! # Unit Types
//!
//! Type-safe wrappers for the metric units used by the RC design pipeline.
//! They stay as thin `f64` newtypes so JSON stays clean (just numbers) and the
//! formulas read like the code text they come from.
//!
//! ## Working Units
//!
//! The pipeline mixes units the way RC design practice does:
//! - Span lengths in metres, section dimensions in centimetres, bar diameters in millimetres
//! - Loads in kN/m, forces in kN, moments in kNm (analysis) and kNcm (section design)
//! - Design strengths in kN/cm², material input in MPa, stiffness analysis in kN/m²
//! - Steel areas in cm², area per length in cm²/cm
//!
//! ## Example
//!
//! ```rust
//! use beam_core::units::{Megapascals, KnPerCm2, Centimeters, Meters};
//!
//! let fck = Megapascals(30.0);
//! let fck_kn_cm2: KnPerCm2 = fck.into();
//! assert!((fck_kn_cm2.0 - 3.0).abs() < 1e-12);
//!
//! let h: Meters = Centimeters(50.0).into();
//! assert!((h.0 - 0.5).abs() < 1e-12);
//! ```

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::ops::{Add, Div, Mul, Sub};

// ============================================================================
// Length Units
// ============================================================================

/// Length in metres
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Meters(pub f64);

/// Length in centimetres
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Centimeters(pub f64);

/// Length in millimetres
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Millimeters(pub f64);

impl From<Meters> for Centimeters {
    fn from(m: Meters) -> Self {
        Centimeters(m.0 * 100.0)
    }
}

impl From<Centimeters> for Meters {
    fn from(cm: Centimeters) -> Self {
        Meters(cm.0 / 100.0)
    }
}

impl From<Centimeters> for Millimeters {
    fn from(cm: Centimeters) -> Self {
        Millimeters(cm.0 * 10.0)
    }
}

impl From<Millimeters> for Centimeters {
    fn from(mm: Millimeters) -> Self {
        Centimeters(mm.0 / 10.0)
    }
}

// ============================================================================
// Stress Units
// ============================================================================

/// Stress in megapascals (N/mm²)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Megapascals(pub f64);

/// Stress in kN/cm² (section design unit, 1 kN/cm² = 10 MPa)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KnPerCm2(pub f64);

/// Stress in kN/m² (stiffness analysis unit, 1 MPa = 1000 kN/m²)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KnPerM2(pub f64);

impl From<Megapascals> for KnPerCm2 {
    fn from(mpa: Megapascals) -> Self {
        KnPerCm2(mpa.0 / 10.0)
    }
}

impl From<KnPerCm2> for Megapascals {
    fn from(s: KnPerCm2) -> Self {
        Megapascals(s.0 * 10.0)
    }
}

impl From<Megapascals> for KnPerM2 {
    fn from(mpa: Megapascals) -> Self {
        KnPerM2(mpa.0 * 1000.0)
    }
}

// ============================================================================
// Moment Units
// ============================================================================

/// Moment in kilonewton-metres
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KnM(pub f64);

/// Moment in kilonewton-centimetres
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KnCm(pub f64);

impl From<KnM> for KnCm {
    fn from(m: KnM) -> Self {
        KnCm(m.0 * 100.0)
    }
}

impl From<KnCm> for KnM {
    fn from(m: KnCm) -> Self {
        KnM(m.0 / 100.0)
    }
}

// ============================================================================
// Section Properties
// ============================================================================

/// Second moment of area in cm⁴
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cm4(pub f64);

/// Second moment of area in m⁴
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct M4(pub f64);

impl From<Cm4> for M4 {
    fn from(i: Cm4) -> Self {
        M4(i.0 * 1e-8)
    }
}

/// Cross-sectional area of one round bar (cm²) from its diameter (mm)
#[inline]
pub fn bar_area_cm2(diameter_mm: f64) -> f64 {
    let radius_cm = diameter_mm / 10.0 / 2.0;
    PI * radius_cm * radius_cm
}

// ============================================================================
// Arithmetic Implementations (macro to reduce boilerplate)
// ============================================================================

macro_rules! impl_arithmetic {
    ($type:ty) => {
        impl Add for $type {
            type Output = Self;
            fn add(self, rhs: Self) -> Self::Output {
                Self(self.0 + rhs.0)
            }
        }

        impl Sub for $type {
            type Output = Self;
            fn sub(self, rhs: Self) -> Self::Output {
                Self(self.0 - rhs.0)
            }
        }

        impl Mul<f64> for $type {
            type Output = Self;
            fn mul(self, rhs: f64) -> Self::Output {
                Self(self.0 * rhs)
            }
        }

        impl Div<f64> for $type {
            type Output = Self;
            fn div(self, rhs: f64) -> Self::Output {
                Self(self.0 / rhs)
            }
        }

        impl $type {
            /// Get the raw f64 value
            pub fn value(self) -> f64 {
                self.0
            }
        }
    };
}

impl_arithmetic!(Meters);
impl_arithmetic!(Centimeters);
impl_arithmetic!(Millimeters);
impl_arithmetic!(Megapascals);
impl_arithmetic!(KnPerCm2);
impl_arithmetic!(KnPerM2);
impl_arithmetic!(KnM);
impl_arithmetic!(KnCm);
impl_arithmetic!(Cm4);
impl_arithmetic!(M4);
