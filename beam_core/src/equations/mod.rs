//! # Structural Engineering Equations
//!
//! Fundamental beam mechanics and reinforced concrete formulas used by the
//! calculation stages.
//!
//! ## Modules
//!
//! - [`beam`] - Element stiffness, fixed-end forces, isostatic moments and deflection
//! - [`concrete`] - Flexure, shear, Stage II cracking and anchorage formulas
//!
//! ## Sign Conventions
//!
//! - **Loads**: Positive downward (gravity direction)
//! - **Moment**: Positive causes tension on bottom fiber (sagging)
//! - **Shear**: Positive when left side moves up relative to right
//! - **Deflection**: Positive downward
//! - **Reactions**: Positive upward (resisting gravity)
//!
//! ## References
//!
//! - ABNT NBR 6118:2014: Design of structural concrete
//! - Roark's Formulas for Stress and Strain, 8th Edition
//! - Structural Analysis by R.C. Hibbeler

pub mod beam;
pub mod concrete;

pub use beam::{
    element_stiffness,
    uniform_fixed_end_forces,
    uniform_load_max_deflection,
    uniform_load_max_moment,
    uniform_load_moment,
};
