//! # Bar Selection
//!
//! Turns required steel areas into commercial bar arrangements: longitudinal
//! bars with straight anchorage lengths, skin reinforcement for tall sections,
//! and stirrups.
//!
//! Infeasible arrangements are returned with a failure status, never as an
//! error, so one bad span does not stop the others.
//!
//! ## Example
//!
//! ```rust
//! use beam_core::calculations::detailing::{select_longitudinal, BarPosition, DetailingStatus};
//! use beam_core::materials::{ConcreteClass, Material};
//! use beam_core::settings::DesignSettings;
//!
//! let c30 = Material::concrete(ConcreteClass::C30);
//! let bars = select_longitudinal(5.06, 20.0, &c30, BarPosition::Bottom, &DesignSettings::default());
//!
//! assert_eq!(bars.status, DetailingStatus::Ok);
//! assert_eq!((bars.count, bars.diameter_mm), (3, 16.0));
//! ```

use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};

use crate::calculations::continuous_beam::{Beam, BeamSpan};
use crate::calculations::uls_design::DesignResult;
use crate::equations::concrete;
use crate::materials::Material;
use crate::settings::DesignSettings;
use crate::units::{bar_area_cm2, Centimeters, KnPerCm2, Megapascals, Millimeters};

/// Longitudinal areas at or below this need no bars (cm²)
const NEGLIGIBLE_AREA_CM2: f64 = 0.01;

/// Stirrup demand at or below this is replaced by [`NOMINAL_STIRRUP_DEMAND`] (cm²/cm)
const NEGLIGIBLE_STIRRUP_DEMAND: f64 = 1e-4;

/// Stirrup demand used when none is required (cm²/cm)
const NOMINAL_STIRRUP_DEMAND: f64 = 0.001;

/// Outcome of a bar selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum DetailingStatus {
    #[default]
    Ok,
    /// Required area is negligible
    NotRequired,
    /// No catalogue diameter fits in one layer
    DoesNotFit,
    /// No stirrup diameter gives a buildable spacing
    SpacingTooTight,
}

impl DetailingStatus {
    /// True for `Ok` and `NotRequired`
    pub fn is_buildable(&self) -> bool {
        matches!(self, DetailingStatus::Ok | DetailingStatus::NotRequired)
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            DetailingStatus::Ok => "OK",
            DetailingStatus::NotRequired => "Not required",
            DetailingStatus::DoesNotFit => "Does not fit (double layer needed)",
            DetailingStatus::SpacingTooTight => "Stirrup spacing below minimum",
        }
    }
}

impl std::fmt::Display for DetailingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Bond condition of a longitudinal bar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BarPosition {
    /// Bottom bars, good bond
    Bottom,
    /// Top bars, poor bond
    Top,
}

/// One layer of longitudinal bars
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct BarArrangement {
    pub diameter_mm: f64,
    pub count: u32,
    /// n · π·φ²/4 (cm²)
    pub area_provided_cm2: f64,
    /// Required straight anchorage length (cm)
    pub anchorage_length_cm: f64,
    pub status: DetailingStatus,
}

impl BarArrangement {
    fn with_status(status: DetailingStatus) -> Self {
        BarArrangement {
            status,
            ..BarArrangement::default()
        }
    }

    /// e.g. "3 Ø16.0"
    pub fn describe(&self) -> String {
        match self.status {
            DetailingStatus::Ok => format!("{} Ø{:.1}", self.count, self.diameter_mm),
            status => status.display_name().to_string(),
        }
    }
}

/// Skin bars on both side faces
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct SkinArrangement {
    pub diameter_mm: f64,
    pub bars_per_face: u32,
    /// Both faces
    pub count: u32,
    pub area_provided_cm2: f64,
    pub status: DetailingStatus,
}

/// Vertical stirrups
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct StirrupArrangement {
    pub diameter_mm: f64,
    pub spacing_cm: f64,
    pub legs: u32,
    pub status: DetailingStatus,
}

impl StirrupArrangement {
    /// e.g. "Ø6.3 c/15"
    pub fn describe(&self) -> String {
        match self.status {
            DetailingStatus::Ok => format!("Ø{:.1} c/{:.0}", self.diameter_mm, self.spacing_cm),
            status => status.display_name().to_string(),
        }
    }
}

/// Full detailing of one span
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct SpanDetailing {
    pub positive: BarArrangement,
    pub negative_left: BarArrangement,
    pub negative_right: BarArrangement,
    pub skin: SkinArrangement,
    pub stirrups: StirrupArrangement,
}

impl SpanDetailing {
    /// True when nothing needs a double layer or a tighter stirrup
    pub fn is_buildable(&self) -> bool {
        [
            self.positive.status,
            self.negative_left.status,
            self.negative_right.status,
            self.skin.status,
            self.stirrups.status,
        ]
        .iter()
        .all(DetailingStatus::is_buildable)
    }
}

// =============================================================================
// SELECTION
// =============================================================================

/// Detail every span that has a ULS design.
#[instrument(skip(beam, settings), fields(beam = %beam.id))]
pub fn detail_beam(beam: &mut Beam, settings: &DesignSettings) {
    for span in &mut beam.spans {
        let Some(design) = span.design else {
            warn!(beam = %beam.id, span = span.id, "no ULS design on span; skipping detailing");
            continue;
        };
        let detailing = detail_span(span, &design, settings);
        if !detailing.is_buildable() {
            warn!(beam = %beam.id, span = span.id, "span reinforcement cannot be detailed as required");
        }
        span.detailing = Some(detailing);
    }
}

/// Bars for the three critical sections, skin and stirrups of one span.
pub fn detail_span(span: &BeamSpan, design: &DesignResult, settings: &DesignSettings) -> SpanDetailing {
    let bw = span.section.bw_cm;
    let material = span.material.as_ref();
    SpanDetailing {
        positive: select_longitudinal(
            design.positive_midspan.as_required_cm2,
            bw,
            material,
            BarPosition::Bottom,
            settings,
        ),
        negative_left: select_longitudinal(
            design.negative_left.as_required_cm2,
            bw,
            material,
            BarPosition::Top,
            settings,
        ),
        negative_right: select_longitudinal(
            design.negative_right.as_required_cm2,
            bw,
            material,
            BarPosition::Top,
            settings,
        ),
        skin: select_skin(span.section.h_cm, bw, settings),
        stirrups: select_stirrups(design.shear.asw_s_cm2_cm, span.section.h_cm, settings),
    }
}

/// Width left for bars inside the stirrups (mm)
pub fn available_width_mm(bw_cm: f64, settings: &DesignSettings) -> f64 {
    let det = &settings.detailing;
    bw_cm * 10.0 - 2.0 * (det.cover_mm + det.stirrup_allowance_mm)
}

/// Width taken by `count` bars of one diameter at minimum clear spacing (mm)
fn layer_width_mm(count: u32, diameter_mm: f64, clear_spacing_mm: f64) -> f64 {
    count as f64 * diameter_mm + (count.saturating_sub(1)) as f64 * clear_spacing_mm
}

/// Smallest-excess single layer of longitudinal bars.
///
/// Every catalogue diameter is tried with the fewest bars (at least 2) that
/// reach `as_required_cm2`; among those that fit in one layer, the one with
/// the least excess area wins, the smaller diameter on ties.
pub fn select_longitudinal(
    as_required_cm2: f64,
    bw_cm: f64,
    material: &Material,
    position: BarPosition,
    settings: &DesignSettings,
) -> BarArrangement {
    if as_required_cm2 <= NEGLIGIBLE_AREA_CM2 {
        return BarArrangement::with_status(DetailingStatus::NotRequired);
    }

    let det = &settings.detailing;
    let width = available_width_mm(bw_cm, settings);

    let mut best: Option<(f64, u32, f64)> = None;
    for &phi in &det.longitudinal_diameters_mm {
        let area_bar = bar_area_cm2(phi);
        let count = ((as_required_cm2 / area_bar).ceil() as u32).max(2);
        if layer_width_mm(count, phi, det.min_clear_spacing_mm) > width {
            continue;
        }
        let provided = count as f64 * area_bar;
        let excess = provided - as_required_cm2;
        if best.map_or(true, |(_, _, best_provided)| excess < best_provided - as_required_cm2) {
            best = Some((phi, count, provided));
        }
    }

    match best {
        Some((diameter_mm, count, area_provided_cm2)) => BarArrangement {
            diameter_mm,
            count,
            area_provided_cm2,
            anchorage_length_cm: anchorage_length_cm(diameter_mm, material, position, settings),
            status: DetailingStatus::Ok,
        },
        None => BarArrangement::with_status(DetailingStatus::DoesNotFit),
    }
}

/// Straight anchorage length of one bar (cm, one decimal)
///
/// # Formula
/// fbd = η1·η2·η3·fctd, lb = (φ/4)·(fyd/fbd) ≥ max(0.3·lb, 10φ, lb,abs)
pub fn anchorage_length_cm(
    diameter_mm: f64,
    material: &Material,
    position: BarPosition,
    settings: &DesignSettings,
) -> f64 {
    let det = &settings.detailing;
    let eta2 = match position {
        BarPosition::Bottom => det.eta2_good,
        BarPosition::Top => det.eta2_poor,
    };
    let fctd = Megapascals::from(KnPerCm2(material.fctd(settings.safety.gamma_c))).0;
    let fyd = material.fyk_mpa / settings.safety.gamma_s;
    let fbd = concrete::bond_strength(det.eta1, eta2, det.eta3, fctd);
    let lb_mm = concrete::required_anchorage_length(diameter_mm, fyd, fbd, det.min_anchorage_mm);
    let lb_cm = Centimeters::from(Millimeters(lb_mm)).0;
    (lb_cm * 10.0).round() / 10.0
}

/// Side-face skin reinforcement.
///
/// Sections shorter than the threshold need none. Otherwise ρ·bw·h is split
/// over the two faces with at least two bars per face.
pub fn select_skin(h_cm: f64, bw_cm: f64, settings: &DesignSettings) -> SkinArrangement {
    let det = &settings.detailing;
    if h_cm < det.skin_height_threshold_cm {
        return SkinArrangement {
            status: DetailingStatus::NotRequired,
            ..SkinArrangement::default()
        };
    }

    let per_face_cm2 = det.skin_ratio * bw_cm * h_cm / 2.0;
    let area_bar = bar_area_cm2(det.skin_diameter_mm);
    let bars_per_face = ((per_face_cm2 / area_bar).ceil() as u32).max(2);
    let count = 2 * bars_per_face;

    SkinArrangement {
        diameter_mm: det.skin_diameter_mm,
        bars_per_face,
        count,
        area_provided_cm2: count as f64 * area_bar,
        status: DetailingStatus::Ok,
    }
}

/// First stirrup diameter whose spacing is buildable.
///
/// The spacing supplying `asw_s_cm2_cm` exactly is capped at
/// min(0.6·d, s_max) and floored to whole centimetres.
pub fn select_stirrups(asw_s_cm2_cm: f64, h_cm: f64, settings: &DesignSettings) -> StirrupArrangement {
    let det = &settings.detailing;
    let demand = if asw_s_cm2_cm <= NEGLIGIBLE_STIRRUP_DEMAND {
        NOMINAL_STIRRUP_DEMAND
    } else {
        asw_s_cm2_cm
    };
    let s_max = (0.6 * (h_cm - settings.effective_depth_offset_cm)).min(det.max_stirrup_spacing_cm);

    for &phi in &det.transverse_diameters_mm {
        let s_calc = det.stirrup_legs as f64 * bar_area_cm2(phi) / demand;
        let spacing = s_calc.min(s_max).floor();
        if spacing >= det.min_stirrup_spacing_cm {
            return StirrupArrangement {
                diameter_mm: phi,
                spacing_cm: spacing,
                legs: det.stirrup_legs,
                status: DetailingStatus::Ok,
            };
        }
    }

    StirrupArrangement {
        legs: det.stirrup_legs,
        status: DetailingStatus::SpacingTooTight,
        ..StirrupArrangement::default()
    }
}
