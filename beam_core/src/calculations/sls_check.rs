//! # Serviceability Checks
//!
//! Crack width at midspan and long-term deflection, per span, using the ULS
//! design already stored on the span. Spans without a design are skipped with
//! a warning.
//!
//! ## Crack width
//!
//! Service moment is the peak design moment divided by γf. The Stage II
//! neutral axis, cracked inertia and steel stress give
//!
//! ```text
//! wk = φ/(12.5·η1) · σs/Es · max(0.6·σs/fctm, 3·σs/fctm)
//! ```
//!
//! with φ estimated from the required area.
//!
//! ## Deflection
//!
//! Simply-supported closed form on the gross section under the service load,
//! amplified for cracking and then for creep:
//!
//! ```text
//! f_total = 5qL⁴/(384·Ecs·Ic) · k_cr · (1 + φ_creep)
//! ```
//!
//! Both checks pass when the value is at or below the limit.

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::calculations::continuous_beam::{Beam, BeamSpan};
use crate::calculations::uls_design::DesignResult;
use crate::equations::beam::uniform_load_max_deflection;
use crate::equations::concrete;
use crate::settings::DesignSettings;
use crate::units::{Centimeters, KnCm, KnM, KnPerCm2, Megapascals, Meters, Millimeters};

/// Required midspan steel at or below this needs no crack check (cm²)
const NEGLIGIBLE_STEEL_CM2: f64 = 0.001;

/// Pass/fail outcome of a check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CheckStatus {
    #[default]
    Pass,
    Fail,
}

impl CheckStatus {
    /// Pass when `value <= limit`
    pub fn from_limit(value: f64, limit: f64) -> Self {
        if value <= limit {
            CheckStatus::Pass
        } else {
            CheckStatus::Fail
        }
    }

    pub fn is_pass(&self) -> bool {
        matches!(self, CheckStatus::Pass)
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            CheckStatus::Pass => "OK",
            CheckStatus::Fail => "FAIL",
        }
    }
}

impl std::fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Serviceability result of one span
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct ServiceabilityResult {
    /// Characteristic crack width (mm)
    pub wk_mm: f64,
    /// Crack width limit for the exposure class (mm)
    pub wk_limit_mm: f64,
    /// Stage II steel stress under the service moment (kN/cm²)
    pub steel_stress_kn_cm2: f64,
    pub crack_status: CheckStatus,

    /// Immediate deflection including the cracking factor (mm)
    pub deflection_immediate_mm: f64,
    /// Immediate plus creep (mm)
    pub deflection_total_mm: f64,
    /// L / ratio (mm)
    pub deflection_limit_mm: f64,
    pub deflection_status: CheckStatus,
}

impl ServiceabilityResult {
    /// Both checks pass
    pub fn passes(&self) -> bool {
        self.crack_status.is_pass() && self.deflection_status.is_pass()
    }
}

/// Check every span that has a ULS design.
#[instrument(skip(beam, settings), fields(beam = %beam.id))]
pub fn check_beam(beam: &mut Beam, settings: &DesignSettings) {
    for span in &mut beam.spans {
        let Some(design) = span.design else {
            warn!(beam = %beam.id, span = span.id, "no ULS design on span; skipping serviceability");
            continue;
        };
        let result = check_span(span, &design, settings);
        debug!(
            span = span.id,
            wk_mm = result.wk_mm,
            deflection_mm = result.deflection_total_mm,
            "serviceability checked"
        );
        span.serviceability = Some(result);
    }
}

/// Crack width and deflection for one span.
pub fn check_span(span: &BeamSpan, design: &DesignResult, settings: &DesignSettings) -> ServiceabilityResult {
    let crack = check_cracking(span, design, settings);
    let deflection = check_deflection(span, settings);
    ServiceabilityResult {
        wk_mm: crack.wk_mm,
        wk_limit_mm: crack.limit_mm,
        steel_stress_kn_cm2: crack.sigma_s,
        crack_status: CheckStatus::from_limit(crack.wk_mm, crack.limit_mm),
        deflection_immediate_mm: deflection.immediate_mm,
        deflection_total_mm: deflection.total_mm,
        deflection_limit_mm: deflection.limit_mm,
        deflection_status: CheckStatus::from_limit(deflection.total_mm, deflection.limit_mm),
    }
}

/// Bar diameter assumed for the crack formula (cm), stepped by area
pub fn estimated_bar_diameter_cm(as_cm2: f64) -> f64 {
    if as_cm2 > 10.0 {
        1.6
    } else if as_cm2 > 5.0 {
        1.25
    } else {
        1.0
    }
}

struct CrackOutcome {
    wk_mm: f64,
    limit_mm: f64,
    sigma_s: f64,
}

fn check_cracking(span: &BeamSpan, design: &DesignResult, settings: &DesignSettings) -> CrackOutcome {
    let sls = &settings.serviceability;
    let limit_mm = sls.exposure.crack_width_limit_mm();
    let uncracked = CrackOutcome {
        wk_mm: 0.0,
        limit_mm,
        sigma_s: 0.0,
    };

    let as_cm2 = design.positive_midspan.as_required_cm2;
    if as_cm2 <= NEGLIGIBLE_STEEL_CM2 {
        return uncracked;
    }

    let b = span.section.bw_cm;
    let d = span.section.effective_depth_cm(settings.effective_depth_offset_cm);
    let alpha_e = sls.modular_ratio;
    let m_service = KnCm::from(KnM(design.md_max_knm / settings.safety.gamma_f)).0;

    let Some(x) = concrete::cracked_neutral_axis(b, alpha_e, as_cm2, d) else {
        return uncracked;
    };
    let i_ii = concrete::cracked_inertia(b, x, alpha_e, as_cm2, d);
    let sigma_s = concrete::cracked_steel_stress(alpha_e, m_service, d, x, i_ii);

    let wk_cm = concrete::crack_width(
        estimated_bar_diameter_cm(as_cm2),
        sls.bond_eta1,
        sigma_s,
        sls.steel_modulus_kn_cm2,
        span.material.fctm(),
    );

    CrackOutcome {
        wk_mm: Millimeters::from(Centimeters(wk_cm)).0,
        limit_mm,
        sigma_s,
    }
}

struct DeflectionOutcome {
    immediate_mm: f64,
    total_mm: f64,
    limit_mm: f64,
}

fn check_deflection(span: &BeamSpan, settings: &DesignSettings) -> DeflectionOutcome {
    let sls = &settings.serviceability;
    let length_cm = Centimeters::from(Meters(span.length_m)).0;
    let limit_mm = Millimeters::from(Centimeters(length_cm)).0 / sls.deflection_span_ratio;

    // kN/m -> kN/cm
    let q_service = span.distributed_load() / settings.safety.gamma_f / 100.0;
    let e = KnPerCm2::from(Megapascals(span.material.ecs_mpa)).0;
    let i = span.section.inertia_cm4();

    let elastic_cm = uniform_load_max_deflection(q_service, length_cm, e, i);
    let immediate_cm = elastic_cm * sls.cracked_amplification;
    let total_cm = immediate_cm * (1.0 + sls.creep_coefficient);

    DeflectionOutcome {
        immediate_mm: Millimeters::from(Centimeters(immediate_cm)).0,
        total_mm: Millimeters::from(Centimeters(total_cm)).0,
        limit_mm,
    }
}
