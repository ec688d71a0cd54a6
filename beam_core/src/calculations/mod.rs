//! # Structural Calculations
//!
//! The beam model and the stages that run on it. Each stage reads what the
//! previous stage stored on the spans and writes its own result:
//!
//! - [`stiffness`] - End shears and moments (direct stiffness method)
//! - [`uls_design`] - Flexural and shear reinforcement areas
//! - [`sls_check`] - Crack width and deflection
//! - [`detailing`] - Commercial bars, anchorage, skin steel and stirrups
//!
//! [`pipeline`] chains the stages for one beam or a batch, [`optimizer`]
//! repeats the chain over candidate heights and [`reactions`] collects the
//! solved forces per support.

pub mod continuous_beam;
pub mod detailing;
pub mod optimizer;
pub mod pipeline;
pub mod reactions;
pub mod sls_check;
pub mod stiffness;
pub mod uls_design;

// Re-export commonly used types
pub use continuous_beam::{Beam, BeamSpan, Node, Restraints, SupportType};
pub use detailing::{DetailingStatus, SpanDetailing};
pub use optimizer::{optimize_beam, OptimizationReport, TrialOutcome, TrialStatus};
pub use pipeline::{analyze_beam, run_batch, BatchReport, CancellationToken};
pub use reactions::{support_reactions, ColumnLoad};
pub use sls_check::{CheckStatus, ServiceabilityResult};
pub use uls_design::{DesignResult, FlexureRegime};
