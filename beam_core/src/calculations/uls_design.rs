//! # Ultimate Limit State Design
//!
//! Required longitudinal steel at the three critical sections of each span
//! (left support, midspan, right support) and required stirrup area per unit
//! length, from the end forces written by the stiffness solver.
//!
//! ## Flexure
//!
//! Rectangular section, single reinforcement. For each section:
//!
//! 1. `kmd = Md / (b·d²·fcd)`
//! 2. `kmd > kmd_limit` (x/d > 0.45): over-reinforced. The area is estimated
//!    as `Md / (0.9·d·fyd)` times a penalty factor and a warning is logged.
//!    No compression steel is designed.
//! 3. Otherwise β from the equilibrium quadratic, `z = d(1 − 0.4β)`,
//!    `As = Md / (z·fyd)`.
//!
//! The midspan moment is the isostatic `qL²/8` minus the mean of the two
//! support moment magnitudes, floored at zero.
//!
//! ## Shear
//!
//! Model I with vertical stirrups: strut crushing check against VRd2, concrete
//! contribution Vc, stirrups for the excess with a minimum ratio.
//!
//! ## Units
//!
//! Moments in kNm at the API, kN·cm inside the formulas; areas in cm²;
//! stirrup demand in cm²/cm.

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::calculations::continuous_beam::{Beam, BeamSpan};
use crate::equations::beam::uniform_load_max_moment;
use crate::equations::concrete;
use crate::errors::CalcResult;
use crate::settings::{DesignSettings, FlexureSettings};
use crate::units::{KnCm, KnM};

// =============================================================================
// RESULT TYPES
// =============================================================================

/// Flexural behaviour of a section at its design moment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum FlexureRegime {
    /// Ductile, solved from the equilibrium quadratic
    #[default]
    Normal,
    /// kmd above the ductility limit; area is a penalized estimate
    DuctilityExceeded,
    /// The equilibrium quadratic has no real root; area is a penalized estimate
    Infeasible,
}

impl FlexureRegime {
    /// True when the area came from the fallback estimate
    pub fn is_penalized(&self) -> bool {
        !matches!(self, FlexureRegime::Normal)
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            FlexureRegime::Normal => "OK",
            FlexureRegime::DuctilityExceeded => "Ductility limit exceeded",
            FlexureRegime::Infeasible => "Section cannot carry moment",
        }
    }
}

/// Diagonal strut check outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum StrutStatus {
    #[default]
    Ok,
    /// VSd > VRd2
    Crushing,
}

impl StrutStatus {
    pub fn is_ok(&self) -> bool {
        matches!(self, StrutStatus::Ok)
    }
}

/// Flexural design of one critical section
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct FlexuralSection {
    /// Design moment magnitude Md (kNm)
    pub md_knm: f64,
    /// Dimensionless moment
    pub kmd: f64,
    pub regime: FlexureRegime,
    /// Area from the section equilibrium, before the minimum (cm²)
    pub as_calc_cm2: f64,
    /// Area to detail (cm²), minimum applied
    pub as_required_cm2: f64,
}

/// Shear design of a span
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct ShearDesign {
    /// Design shear VSd (kN)
    pub vsd_kn: f64,
    /// Strut crushing capacity VRd2 (kN)
    pub vrd2_kn: f64,
    /// Concrete contribution Vc (kN)
    pub vc_kn: f64,
    /// Required stirrup area per length (cm²/cm), minimum applied
    pub asw_s_cm2_cm: f64,
    pub strut: StrutStatus,
}

/// ULS design of one span
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct DesignResult {
    /// Top steel over the left support
    pub negative_left: FlexuralSection,
    /// Bottom steel at midspan
    pub positive_midspan: FlexuralSection,
    /// Top steel over the right support
    pub negative_right: FlexuralSection,
    /// Largest of the three design moments (kNm)
    pub md_max_knm: f64,
    /// Minimum longitudinal area ρmin·b·h (cm²)
    pub as_min_cm2: f64,
    pub shear: ShearDesign,
}

impl DesignResult {
    /// True if any section needed the over-ductility fallback
    pub fn has_penalized_section(&self) -> bool {
        [self.negative_left, self.positive_midspan, self.negative_right]
            .iter()
            .any(|s| s.regime.is_penalized())
    }
}

// =============================================================================
// DESIGN
// =============================================================================

/// Design every span of a solved beam.
///
/// # Errors
/// `InvalidInput` if a section leaves no effective depth.
#[instrument(skip(beam, settings), fields(beam = %beam.id))]
pub fn design_beam(beam: &mut Beam, settings: &DesignSettings) -> CalcResult<()> {
    for span in &mut beam.spans {
        let result = design_span(span, settings)?;
        span.design = Some(result);
    }
    debug!("ULS design complete");
    Ok(())
}

/// Design a single span from its end forces.
pub fn design_span(span: &BeamSpan, settings: &DesignSettings) -> CalcResult<DesignResult> {
    let offset = settings.effective_depth_offset_cm;
    span.section.validate(offset)?;

    let gamma_f = settings.safety.gamma_f;
    let flexure = &settings.flexure;
    let b = span.section.bw_cm;
    let d = span.section.effective_depth_cm(offset);
    let fcd = span.material.fcd(settings.safety.gamma_c);
    let fyd = span.material.fyd(settings.safety.gamma_s);

    let m_left = span.moment_left.abs();
    let m_right = span.moment_right.abs();
    let m0 = uniform_load_max_moment(span.distributed_load(), span.length_m);

    let md_left = m_left * gamma_f;
    let md_right = m_right * gamma_f;
    let md_mid = (m0 - (m_left + m_right) / 2.0).max(0.0) * gamma_f;

    let as_min = flexure.min_reinforcement_ratio * b * span.section.h_cm;

    let support = |md: f64| {
        let mut section = flexural_section(md, b, d, fcd, fyd, flexure);
        section.as_required_cm2 = if md > flexure.negligible_support_moment_knm {
            section.as_calc_cm2.max(as_min)
        } else {
            0.0
        };
        section
    };

    let negative_left = support(md_left);
    let negative_right = support(md_right);
    let mut positive_midspan = flexural_section(md_mid, b, d, fcd, fyd, flexure);
    positive_midspan.as_required_cm2 = positive_midspan.as_calc_cm2.max(as_min);

    for (position, section) in [
        ("left support", &negative_left),
        ("midspan", &positive_midspan),
        ("right support", &negative_right),
    ] {
        if section.regime.is_penalized() {
            warn!(
                span = span.id,
                position,
                kmd = section.kmd,
                limit = flexure.kmd_limit,
                "kmd above ductility limit; increase the section"
            );
        }
    }

    let shear = design_shear(span, settings);

    Ok(DesignResult {
        negative_left,
        positive_midspan,
        negative_right,
        md_max_knm: md_left.max(md_right).max(md_mid),
        as_min_cm2: as_min,
        shear,
    })
}

/// Required tension steel for a design moment, before any minimum.
///
/// # Arguments
/// * `md_knm` - Design moment magnitude (kNm)
/// * `b_cm`, `d_cm` - Web width and effective depth (cm)
/// * `fcd`, `fyd` - Design strengths (kN/cm²)
pub fn flexural_section(
    md_knm: f64,
    b_cm: f64,
    d_cm: f64,
    fcd: f64,
    fyd: f64,
    flexure: &FlexureSettings,
) -> FlexuralSection {
    if md_knm <= flexure.negligible_moment_knm {
        return FlexuralSection {
            md_knm,
            ..FlexuralSection::default()
        };
    }

    let md = KnCm::from(KnM(md_knm)).0;
    let kmd = concrete::kmd(md, b_cm, d_cm, fcd);
    let penalized = || md / (0.9 * d_cm * fyd) * flexure.over_ductility_penalty;

    let (regime, as_calc) = if kmd > flexure.kmd_limit {
        (FlexureRegime::DuctilityExceeded, penalized())
    } else {
        match concrete::neutral_axis_ratio(kmd) {
            Some(beta) => {
                let z = concrete::lever_arm(d_cm, beta);
                (FlexureRegime::Normal, concrete::tension_steel_area(md, z, fyd))
            }
            None => (FlexureRegime::Infeasible, penalized()),
        }
    };

    FlexuralSection {
        md_knm,
        kmd,
        regime,
        as_calc_cm2: as_calc,
        as_required_cm2: as_calc,
    }
}

/// Stirrup demand and strut check for a span.
pub fn design_shear(span: &BeamSpan, settings: &DesignSettings) -> ShearDesign {
    let gamma_c = settings.safety.gamma_c;
    let shear = &settings.shear;
    let material = &span.material;
    let b = span.section.bw_cm;
    let d = span.section.effective_depth_cm(settings.effective_depth_offset_cm);

    let vsd = span.shear_left.abs().max(span.shear_right.abs()) * settings.safety.gamma_f;

    let vrd2 = concrete::strut_capacity(material.fck_mpa, material.fcd(gamma_c), b, d);
    let strut = if vsd > vrd2 {
        warn!(span = span.id, vsd, vrd2, "diagonal strut crushing");
        StrutStatus::Crushing
    } else {
        StrutStatus::Ok
    };

    let vc = concrete::concrete_shear_contribution(material.fctd(gamma_c), b, d);
    let vsw = (vsd - vc).max(0.0);
    let asw_calc = concrete::stirrup_area_per_length(vsw, d, shear.transverse_fyd_kn_cm2);
    let asw_min = concrete::min_stirrup_area_per_length(material.fctm(), shear.transverse_fywk_kn_cm2, b);

    ShearDesign {
        vsd_kn: vsd,
        vrd2_kn: vrd2,
        vc_kn: vc,
        asw_s_cm2_cm: asw_calc.max(asw_min),
        strut,
    }
}
