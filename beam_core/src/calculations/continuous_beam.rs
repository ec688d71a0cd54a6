//! # Continuous Beam Model
//!
//! Multi-span reinforced concrete beam with configurable support conditions.
//! Supports pinned, fixed, and free (cantilever) end conditions.
//!
//! ## Notation
//!
//! - N spans creates N+1 nodes (support locations)
//! - Nodes are numbered 0 to N (left to right)
//! - Spans are numbered 1 to N and connect node i-1 to node i
//!
//! ```text
//! Node 0    Node 1    Node 2    Node 3
//!   |--------|---------|---------|
//!    Span 1    Span 2    Span 3
//! ```
//!
//! Nodes live in an arena owned by the [`Beam`]; spans refer to them by index.
//! The junction node between two spans is a single entry, so changing its
//! support changes it for both spans, and cloning a beam copies the arena
//! along with everything else.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use beam_core::calculations::continuous_beam::{Beam, SupportType};
//! use beam_core::loads::Load;
//! use beam_core::materials::{ConcreteClass, Material};
//! use beam_core::section::CrossSection;
//!
//! let concrete = Arc::new(Material::concrete(ConcreteClass::C25));
//! let section = CrossSection::rectangular(20.0, 50.0);
//!
//! // Two-span continuous beam: 5 m + 4 m, pinned at all supports
//! let mut beam = Beam::new("V1");
//! beam.add_span(5.0, section, concrete.clone(), (0.0, 0.0), (1.0, 0.0), SupportType::Pinned, SupportType::Pinned)
//!     .loads.push(Load::distributed(12.0, 0.0, 5.0));
//! beam.add_span(4.0, section, concrete, (0.0, 0.0), (1.0, 0.0), SupportType::Pinned, SupportType::Pinned)
//!     .loads.push(Load::distributed(12.0, 0.0, 4.0));
//!
//! assert_eq!(beam.nodes.len(), 3);
//! assert_eq!(beam.spans[1].start_node, 1);
//! assert!((beam.nodes[2].x_m - 9.0).abs() < 1e-12);
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::calculations::detailing::SpanDetailing;
use crate::calculations::sls_check::ServiceabilityResult;
use crate::calculations::uls_design::DesignResult;
use crate::errors::{CalcError, CalcResult};
use crate::loads::{self, Load, LoadKind};
use crate::materials::Material;
use crate::section::CrossSection;
use crate::units::{Cm4, KnPerM2, M4, Megapascals};

// =============================================================================
// SUPPORT TYPE
// =============================================================================

/// Support condition at a node (support location)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SupportType {
    /// Pinned/hinged support - restrains vertical displacement, allows rotation
    ///
    /// - Vertical displacement: restrained (Δ = 0)
    /// - Rotation: free
    /// - Most common support type
    #[default]
    Pinned,

    /// Fixed support - restrains both displacement and rotation
    ///
    /// - Vertical displacement: restrained (Δ = 0)
    /// - Rotation: restrained (θ = 0)
    /// - Monolithic connection to a stiff column
    Fixed,

    /// Free end - no restraint (cantilever end)
    Free,
}

impl SupportType {
    /// Restraint flags this support imposes
    pub fn restraints(&self) -> Restraints {
        match self {
            SupportType::Pinned => Restraints::PINNED,
            SupportType::Fixed => Restraints::FIXED,
            SupportType::Free => Restraints::FREE,
        }
    }

    /// Get display name for UI
    pub fn display_name(&self) -> &'static str {
        match self {
            SupportType::Pinned => "Pinned",
            SupportType::Fixed => "Fixed",
            SupportType::Free => "Free",
        }
    }
}

impl std::fmt::Display for SupportType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

// =============================================================================
// NODE
// =============================================================================

/// Restraint flags of a node: `true` means the DOF is restrained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Restraints {
    /// Vertical translation restrained
    pub vertical: bool,
    /// Rotation restrained
    pub rotation: bool,
}

impl Restraints {
    pub const FREE: Restraints = Restraints { vertical: false, rotation: false };
    pub const PINNED: Restraints = Restraints { vertical: true, rotation: false };
    pub const FIXED: Restraints = Restraints { vertical: true, rotation: true };

    /// True when the node is a support (carries a vertical reaction)
    pub fn is_support(&self) -> bool {
        self.vertical
    }

    /// Flags in DOF order (translation, rotation)
    pub fn as_array(&self) -> [bool; 2] {
        [self.vertical, self.rotation]
    }
}

impl From<SupportType> for Restraints {
    fn from(support: SupportType) -> Self {
        support.restraints()
    }
}

/// A node of the beam axis (support location or free end)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Index in the beam's node arena
    pub id: usize,

    /// Global X coordinate (m)
    pub x_m: f64,

    /// Global Y coordinate (m)
    pub y_m: f64,

    /// Support restraints
    pub restraints: Restraints,
}

impl Node {
    pub fn new(id: usize, x_m: f64, y_m: f64, restraints: Restraints) -> Self {
        Node { id, x_m, y_m, restraints }
    }
}

// =============================================================================
// BEAM SPAN
// =============================================================================

/// A single span between two nodes
///
/// End forces are written by the stiffness solver. The `design`,
/// `serviceability` and `detailing` records stay `None` until their stage
/// has run on this span.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BeamSpan {
    /// 1-based span number within the beam
    pub id: usize,

    /// Span length (m)
    pub length_m: f64,

    /// Cross section
    pub section: CrossSection,

    /// Concrete and reinforcement, shared between spans
    pub material: Arc<Material>,

    /// Applied loads (characteristic values)
    #[serde(default)]
    pub loads: Vec<Load>,

    /// Index of the start node in [`Beam::nodes`]
    pub start_node: usize,

    /// Index of the end node in [`Beam::nodes`]
    pub end_node: usize,

    /// Shear at the start (kN), positive up on the left face
    #[serde(default)]
    pub shear_left: f64,

    /// End moment at the start (kNm); hogging comes out positive
    #[serde(default)]
    pub moment_left: f64,

    /// Shear at the end (kN), strength-of-materials convention
    #[serde(default)]
    pub shear_right: f64,

    /// End moment at the end (kNm); hogging comes out positive
    #[serde(default)]
    pub moment_right: f64,

    /// Ultimate limit state design
    #[serde(default)]
    pub design: Option<DesignResult>,

    /// Crack width and deflection checks
    #[serde(default)]
    pub serviceability: Option<ServiceabilityResult>,

    /// Commercial bar arrangement
    #[serde(default)]
    pub detailing: Option<SpanDetailing>,
}

impl BeamSpan {
    /// Create an unloaded, unsolved span
    pub fn new(
        id: usize,
        length_m: f64,
        section: CrossSection,
        material: Arc<Material>,
        start_node: usize,
        end_node: usize,
    ) -> Self {
        BeamSpan {
            id,
            length_m,
            section,
            material,
            loads: Vec::new(),
            start_node,
            end_node,
            shear_left: 0.0,
            moment_left: 0.0,
            shear_right: 0.0,
            moment_right: 0.0,
            design: None,
            serviceability: None,
            detailing: None,
        }
    }

    /// Add a load (builder style)
    pub fn with_load(mut self, load: Load) -> Self {
        self.loads.push(load);
        self
    }

    /// Total distributed load q (kN/m)
    ///
    /// Only distributed loads take part in equilibrium; point, moment and
    /// torsion loads are carried but ignored here.
    pub fn distributed_load(&self) -> f64 {
        Load::total_of(&self.loads, LoadKind::Distributed)
    }

    /// Flexural stiffness EI (kN·m²) from Ecs and the gross inertia
    pub fn ei_knm2(&self) -> f64 {
        let e = KnPerM2::from(Megapascals(self.material.ecs_mpa));
        let i = M4::from(Cm4(self.section.inertia_cm4()));
        e.0 * i.0
    }

    /// Internal shear at x (kN), positive when the left side moves up
    ///
    /// # Formula
    /// V(x) = V_left − q·x
    pub fn shear_at(&self, x_m: f64) -> f64 {
        self.shear_left - self.distributed_load() * x_m
    }

    /// Internal moment at x (kNm), positive sagging
    ///
    /// # Formula
    /// M(x) = −M_left + V_left·x − q·x²/2
    pub fn moment_at(&self, x_m: f64) -> f64 {
        -self.moment_left + self.shear_left * x_m - self.distributed_load() * x_m * x_m / 2.0
    }

    /// Sagging moment at midspan (kNm)
    pub fn midspan_moment(&self) -> f64 {
        self.moment_at(self.length_m / 2.0)
    }

    /// Drop all stage results (forces, design, checks, detailing)
    pub fn clear_results(&mut self) {
        self.shear_left = 0.0;
        self.moment_left = 0.0;
        self.shear_right = 0.0;
        self.moment_right = 0.0;
        self.design = None;
        self.serviceability = None;
        self.detailing = None;
    }

    /// Validate span parameters
    pub fn validate(&self) -> CalcResult<()> {
        if !(self.length_m > 0.0) {
            return Err(CalcError::invalid_input(
                format!("spans[{}].length_m", self.id),
                self.length_m.to_string(),
                "Span length must be positive",
            ));
        }
        if !(self.section.bw_cm > 0.0) || !(self.section.h_cm > 0.0) {
            return Err(CalcError::invalid_input(
                format!("spans[{}].section", self.id),
                format!("{} x {}", self.section.bw_cm, self.section.h_cm),
                "Section dimensions must be positive",
            ));
        }
        self.material.validate()
    }
}

// =============================================================================
// BEAM
// =============================================================================

/// A continuous beam: ordered spans over an arena of shared nodes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Beam {
    /// Beam identifier, e.g. "V1"
    pub id: String,

    /// Spans, ordered from the first node
    #[serde(default)]
    pub spans: Vec<BeamSpan>,

    /// Node arena, indexed 0..=N
    #[serde(default)]
    pub nodes: Vec<Node>,

    /// Unit direction of the beam axis in plan (dx, dy)
    pub direction: (f64, f64),
}

impl Beam {
    /// Create an empty beam along global X
    pub fn new(id: impl Into<String>) -> Self {
        Beam {
            id: id.into(),
            spans: Vec::new(),
            nodes: Vec::new(),
            direction: (1.0, 0.0),
        }
    }

    /// Append a span and return it for loading
    ///
    /// The first call creates the start node with `start_support`. Later calls
    /// reuse the previous end node; a `Fixed` start support upgrades it to
    /// fixed, any other start support leaves it as it was. The end node is
    /// placed at `start + length · direction`.
    #[allow(clippy::too_many_arguments)]
    pub fn add_span(
        &mut self,
        length_m: f64,
        section: CrossSection,
        material: Arc<Material>,
        start_coord: (f64, f64),
        direction: (f64, f64),
        start_support: SupportType,
        end_support: SupportType,
    ) -> &mut BeamSpan {
        self.direction = direction;

        let start_index = match self.nodes.last_mut() {
            Some(node) => {
                if start_support == SupportType::Fixed {
                    node.restraints = Restraints::FIXED;
                }
                node.id
            }
            None => {
                self.nodes
                    .push(Node::new(0, start_coord.0, start_coord.1, start_support.into()));
                0
            }
        };

        let (x0, y0) = (self.nodes[start_index].x_m, self.nodes[start_index].y_m);
        let end_index = self.nodes.len();
        self.nodes.push(Node::new(
            end_index,
            x0 + length_m * direction.0,
            y0 + length_m * direction.1,
            end_support.into(),
        ));

        let id = self.spans.len() + 1;
        self.spans
            .push(BeamSpan::new(id, length_m, section, material, start_index, end_index));
        let last = self.spans.len() - 1;
        &mut self.spans[last]
    }

    /// Change the support of a node shared by adjacent spans
    pub fn set_support(&mut self, node_index: usize, support: SupportType) -> CalcResult<()> {
        let count = self.nodes.len();
        let node = self.nodes.get_mut(node_index).ok_or_else(|| {
            CalcError::invalid_input(
                "node_index",
                node_index.to_string(),
                format!("Beam has {} nodes", count),
            )
        })?;
        node.restraints = support.into();
        Ok(())
    }

    /// Start and end nodes of a span
    pub fn span_nodes(&self, span: &BeamSpan) -> Option<(&Node, &Node)> {
        Some((self.nodes.get(span.start_node)?, self.nodes.get(span.end_node)?))
    }

    /// Total length along the axis (m)
    pub fn total_length_m(&self) -> f64 {
        self.spans.iter().map(|s| s.length_m).sum()
    }

    /// Add a self-weight load to every span that does not have one yet
    pub fn add_self_weight(&mut self, density_kn_m3: f64) {
        for span in &mut self.spans {
            if !span.loads.iter().any(Load::is_self_weight) {
                span.loads
                    .push(Load::self_weight(&span.section, span.length_m, density_kn_m3));
            }
        }
    }

    /// Set every span's height and recompute the self-weight loads
    pub fn set_height(&mut self, h_cm: f64, density_kn_m3: f64) {
        for span in &mut self.spans {
            span.section.h_cm = h_cm;
            let weight = loads::self_weight_kn_m(&span.section, density_kn_m3);
            for load in span.loads.iter_mut().filter(|l| l.is_self_weight()) {
                load.value = weight;
            }
        }
    }

    /// Drop all stage results on every span
    pub fn clear_results(&mut self) {
        self.spans.iter_mut().for_each(BeamSpan::clear_results);
    }

    /// Check topology and span data before solving
    ///
    /// # Errors
    /// - `MissingTopology` if there are no nodes, no spans, or the node count
    ///   and span connectivity do not match N spans over N+1 nodes
    /// - `InvalidInput` for non-positive lengths or dimensions
    pub fn validate(&self) -> CalcResult<()> {
        if self.nodes.is_empty() {
            return Err(CalcError::missing_topology(&self.id, "Beam has no nodes"));
        }
        if self.spans.is_empty() {
            return Err(CalcError::missing_topology(&self.id, "Beam has no spans"));
        }
        if self.nodes.len() != self.spans.len() + 1 {
            return Err(CalcError::missing_topology(
                &self.id,
                format!(
                    "{} spans need {} nodes, found {}",
                    self.spans.len(),
                    self.spans.len() + 1,
                    self.nodes.len()
                ),
            ));
        }
        for (i, span) in self.spans.iter().enumerate() {
            if span.start_node != i || span.end_node != i + 1 {
                return Err(CalcError::missing_topology(
                    &self.id,
                    format!(
                        "Span {} connects nodes {}-{}, expected {}-{}",
                        span.id,
                        span.start_node,
                        span.end_node,
                        i,
                        i + 1
                    ),
                ));
            }
            span.validate()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::materials::ConcreteClass;

    fn c30() -> Arc<Material> {
        Arc::new(Material::concrete(ConcreteClass::C30))
    }

    fn two_span_beam() -> Beam {
        let mut beam = Beam::new("V1");
        let section = CrossSection::rectangular(20.0, 50.0);
        beam.add_span(5.0, section, c30(), (0.0, 0.0), (1.0, 0.0), SupportType::Pinned, SupportType::Pinned);
        beam.add_span(4.0, section, c30(), (0.0, 0.0), (1.0, 0.0), SupportType::Pinned, SupportType::Pinned);
        beam
    }

    #[test]
    fn test_add_span_shares_nodes() {
        let beam = two_span_beam();
        assert_eq!(beam.nodes.len(), 3);
        assert_eq!(beam.spans[0].end_node, beam.spans[1].start_node);
        assert_eq!(beam.spans[1].id, 2);
        assert!((beam.nodes[1].x_m - 5.0).abs() < 1e-12);
        assert!((beam.nodes[2].x_m - 9.0).abs() < 1e-12);
        assert!((beam.total_length_m() - 9.0).abs() < 1e-12);
        assert!(beam.validate().is_ok());
    }

    #[test]
    fn test_add_span_follows_direction() {
        let mut beam = Beam::new("V2");
        beam.add_span(
            3.0,
            CrossSection::default(),
            c30(),
            (2.0, 1.0),
            (0.0, 1.0),
            SupportType::Fixed,
            SupportType::Free,
        );
        assert_eq!(beam.direction, (0.0, 1.0));
        assert_eq!(beam.nodes[0].restraints, Restraints::FIXED);
        assert_eq!(beam.nodes[1].restraints, Restraints::FREE);
        assert!((beam.nodes[1].x_m - 2.0).abs() < 1e-12);
        assert!((beam.nodes[1].y_m - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_fixed_start_upgrades_shared_node() {
        let mut beam = Beam::new("V3");
        let section = CrossSection::default();
        beam.add_span(4.0, section, c30(), (0.0, 0.0), (1.0, 0.0), SupportType::Pinned, SupportType::Pinned);
        beam.add_span(4.0, section, c30(), (0.0, 0.0), (1.0, 0.0), SupportType::Fixed, SupportType::Pinned);
        assert_eq!(beam.nodes[1].restraints, Restraints::FIXED);

        // A pinned start leaves an existing node alone
        beam.add_span(4.0, section, c30(), (0.0, 0.0), (1.0, 0.0), SupportType::Free, SupportType::Pinned);
        assert_eq!(beam.nodes[2].restraints, Restraints::PINNED);
    }

    #[test]
    fn test_set_support_affects_both_spans() {
        let mut beam = two_span_beam();
        beam.set_support(1, SupportType::Fixed).unwrap();
        let (_, end_of_first) = beam.span_nodes(&beam.spans[0]).unwrap();
        let (start_of_second, _) = beam.span_nodes(&beam.spans[1]).unwrap();
        assert_eq!(end_of_first.restraints, Restraints::FIXED);
        assert_eq!(start_of_second.restraints, Restraints::FIXED);

        assert!(beam.set_support(7, SupportType::Pinned).is_err());
    }

    #[test]
    fn test_validate_missing_topology() {
        let beam = Beam::new("Empty");
        let err = beam.validate().unwrap_err();
        assert_eq!(err.error_code(), "MISSING_TOPOLOGY");

        let mut no_spans = Beam::new("NoSpans");
        no_spans.nodes.push(Node::new(0, 0.0, 0.0, Restraints::PINNED));
        assert!(matches!(no_spans.validate(), Err(CalcError::MissingTopology { .. })));
    }

    #[test]
    fn test_validate_rejects_bad_length() {
        let mut beam = two_span_beam();
        beam.spans[1].length_m = 0.0;
        assert!(matches!(beam.validate(), Err(CalcError::InvalidInput { .. })));
    }

    #[test]
    fn test_set_height_refreshes_self_weight() {
        let mut beam = two_span_beam();
        beam.spans[0].loads.push(Load::distributed(10.0, 0.0, 5.0));
        beam.add_self_weight(25.0);
        beam.add_self_weight(25.0);
        assert_eq!(beam.spans[0].loads.len(), 2, "Self-weight added once");
        // 0.2 * 0.5 * 25 = 2.5 kN/m
        assert!((beam.spans[0].distributed_load() - 12.5).abs() < 1e-12);

        beam.set_height(60.0, 25.0);
        assert_eq!(beam.spans[1].section.h_cm, 60.0);
        // Manual load untouched, self-weight 0.2 * 0.6 * 25 = 3.0 kN/m
        assert!((beam.spans[0].distributed_load() - 13.0).abs() < 1e-12);
        assert!((beam.spans[1].distributed_load() - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_span_statics_from_end_forces() {
        // Fixed-fixed span, 6 m, 15 kN/m: end moments qL²/12 = 45 kNm
        let mut span = BeamSpan::new(1, 6.0, CrossSection::default(), c30(), 0, 1)
            .with_load(Load::distributed(15.0, 0.0, 6.0));
        span.shear_left = 45.0;
        span.moment_left = 45.0;
        span.shear_right = -45.0;
        span.moment_right = 45.0;

        assert!((span.moment_at(0.0) + 45.0).abs() < 1e-9);
        assert!((span.moment_at(6.0) + 45.0).abs() < 1e-9);
        // qL²/24 = 22.5 kNm
        assert!((span.midspan_moment() - 22.5).abs() < 1e-9);
        assert!(span.shear_at(3.0).abs() < 1e-9);
        assert!((span.shear_at(6.0) - span.shear_right).abs() < 1e-9);
    }

    #[test]
    fn test_flexural_stiffness() {
        let span = BeamSpan::new(1, 6.0, CrossSection::rectangular(20.0, 50.0), c30(), 0, 1);
        // 26000e3 kN/m² * 208333.33e-8 m⁴ = 54166.7 kN·m²
        assert!((span.ei_knm2() - 54_166.667).abs() < 0.01);
    }

    #[test]
    fn test_clone_is_independent() {
        let beam = two_span_beam();
        let mut copy = beam.clone();
        copy.set_height(70.0, 25.0);
        copy.set_support(0, SupportType::Fixed).unwrap();
        assert_eq!(beam.spans[0].section.h_cm, 50.0);
        assert_eq!(beam.nodes[0].restraints, Restraints::PINNED);
        assert!(Arc::ptr_eq(&beam.spans[0].material, &copy.spans[0].material));
    }

    #[test]
    fn test_serialization_roundtrip() {
        let beam = two_span_beam();
        let json = serde_json::to_string(&beam).unwrap();
        let roundtrip: Beam = serde_json::from_str(&json).unwrap();
        assert_eq!(roundtrip.nodes, beam.nodes);
        assert_eq!(roundtrip.spans.len(), 2);
        assert!(roundtrip.spans[0].design.is_none());
    }
}
