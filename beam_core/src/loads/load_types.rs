//! Load kind definitions
//!
//! Distinguishes how a load acts on a span. Only distributed loads currently
//! take part in equilibrium; the other kinds are carried through the model so
//! importers and reports can keep them.

use serde::{Deserialize, Serialize};

/// How a load acts on a span
///
/// # Example
/// ```
/// use beam_core::loads::LoadKind;
///
/// assert_eq!(LoadKind::Distributed.unit(), "kN/m");
/// assert!(LoadKind::Distributed.is_structural());
/// assert!(!LoadKind::Torsion.is_structural());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum LoadKind {
    /// Line load along the span (kN/m), positive downward
    #[default]
    Distributed,
    /// Concentrated force (kN)
    Point,
    /// Concentrated moment (kNm)
    Moment,
    /// Distributed torsion (kNm/m)
    Torsion,
}

impl LoadKind {
    /// All load kinds in standard order
    pub const ALL: [LoadKind; 4] = [
        LoadKind::Distributed,
        LoadKind::Point,
        LoadKind::Moment,
        LoadKind::Torsion,
    ];

    /// Unit of the magnitude
    pub fn unit(&self) -> &'static str {
        match self {
            LoadKind::Distributed => "kN/m",
            LoadKind::Point => "kN",
            LoadKind::Moment => "kNm",
            LoadKind::Torsion => "kNm/m",
        }
    }

    /// True when the stiffness solver and design engines account for this kind.
    ///
    /// Point, moment and torsion loads have no fixed-end reaction formulas yet,
    /// so they do not affect equilibrium.
    pub fn is_structural(&self) -> bool {
        matches!(self, LoadKind::Distributed)
    }

    /// Get display name for UI
    pub fn display_name(&self) -> &'static str {
        match self {
            LoadKind::Distributed => "Distributed",
            LoadKind::Point => "Point",
            LoadKind::Moment => "Moment",
            LoadKind::Torsion => "Torsion",
        }
    }
}

impl std::fmt::Display for LoadKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}
