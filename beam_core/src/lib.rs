//! # beam_core - Continuous RC Beam Engine
//!
//! `beam_core` analyses continuous reinforced-concrete beams and designs their
//! reinforcement. All inputs and outputs are JSON-serializable, so results can
//! be stored, diffed or handed to another tool unchanged.
//!
//! ## Design Philosophy
//!
//! - **Explicit settings**: every factor comes from [`DesignSettings`], never from engine state
//! - **JSON-First**: All types implement Serialize/Deserialize
//! - **Rich Errors**: Structured error types, not just strings
//! - **Statuses over errors**: infeasible designs are reported, not thrown
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use beam_core::calculations::{analyze_beam, Beam, SupportType};
//! use beam_core::loads::Load;
//! use beam_core::materials::{ConcreteClass, Material};
//! use beam_core::section::CrossSection;
//! use beam_core::DesignSettings;
//!
//! let concrete = Arc::new(Material::concrete(ConcreteClass::C30));
//! let mut beam = Beam::new("V1");
//! for (i, length) in [5.0, 5.0].into_iter().enumerate() {
//!     beam.add_span(length, CrossSection::rectangular(20.0, 50.0), concrete.clone(),
//!                   (5.0 * i as f64, 0.0), (1.0, 0.0), SupportType::Pinned, SupportType::Pinned)
//!         .loads.push(Load::distributed(12.0, 0.0, length));
//! }
//!
//! analyze_beam(&mut beam, &DesignSettings::default()).unwrap();
//! let json = serde_json::to_string_pretty(&beam).unwrap();
//! assert!(json.contains("detailing"));
//! ```
//!
//! ## Modules
//!
//! - [`calculations`] - Beam model, solver, design stages, optimizer, reactions
//! - [`equations`] - Closed-form beam and concrete formulas
//! - [`section`] - Cross-section geometry
//! - [`loads`] - Load definitions
//! - [`materials`] - Concrete and reinforcement properties
//! - [`settings`] - Design coefficients and their JSON file
//! - [`units`] - Type-safe unit wrappers
//! - [`errors`] - Structured error types

pub mod calculations;
pub mod equations;
pub mod errors;
pub mod loads;
pub mod materials;
pub mod section;
pub mod settings;
pub mod units;

// Re-export commonly used types at crate root for convenience
pub use errors::{CalcError, CalcResult};
pub use settings::DesignSettings;
