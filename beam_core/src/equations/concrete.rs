//! # Reinforced Concrete Formulas
//!
//! Code-style formulas for rectangular reinforced concrete sections with
//! single (tension) reinforcement.
//!
//! ## Units
//!
//! Unless noted otherwise: lengths in cm, areas in cm², moments in kN·cm,
//! stresses in kN/cm². Anchorage formulas work in mm and MPa.
//!
//! ## Quadratic Roots
//!
//! Two quadratics appear here, and each takes one root by convention:
//!
//! - Flexure: `0.272·β² − 0.68·β + kmd = 0`. The smaller root is the
//!   admissible one (β ≤ 1.25). A negative discriminant means the section
//!   cannot carry the moment at all and yields `None`.
//! - Stage II: `(b/2)·x² + αe·As·x − αe·As·d = 0`. The constant term is
//!   negative, so there is exactly one positive root.
//!
//! ## References
//!
//! - ABNT NBR 6118:2014, items 9.4 (anchorage), 17.2 (flexure), 17.3 (cracking), 17.4 (shear)

// =============================================================================
// FLEXURE
// =============================================================================

/// Rectangular stress block coefficient on β² (0.68 · 0.4)
pub const FLEXURE_A: f64 = 0.272;

/// Rectangular stress block coefficient on β (0.85 · 0.8)
pub const FLEXURE_B: f64 = 0.68;

/// Lever arm reduction factor on β
pub const LEVER_ARM_FACTOR: f64 = 0.4;

/// Dimensionless design moment
///
/// # Formula
/// kmd = Md / (b · d² · fcd)
///
/// # Arguments
/// * `md_kncm` - Design moment (kN·cm)
/// * `b_cm` - Web width (cm)
/// * `d_cm` - Effective depth (cm)
/// * `fcd` - Design compressive strength (kN/cm²)
#[inline]
pub fn kmd(md_kncm: f64, b_cm: f64, d_cm: f64, fcd: f64) -> f64 {
    md_kncm / (b_cm * d_cm * d_cm * fcd)
}

/// Relative neutral-axis depth β = x/d for a given kmd
///
/// # Formula
/// β = (0.68 − √(0.68² − 4·0.272·kmd)) / (2·0.272)
///
/// # Returns
/// `None` when the discriminant is negative (kmd > 0.425).
pub fn neutral_axis_ratio(kmd: f64) -> Option<f64> {
    let discriminant = FLEXURE_B * FLEXURE_B - 4.0 * FLEXURE_A * kmd;
    if discriminant < 0.0 {
        return None;
    }
    Some((FLEXURE_B - discriminant.sqrt()) / (2.0 * FLEXURE_A))
}

/// Lever arm z = d · (1 − 0.4β)
#[inline]
pub fn lever_arm(d_cm: f64, beta: f64) -> f64 {
    d_cm * (1.0 - LEVER_ARM_FACTOR * beta)
}

/// Required tension steel As = Md / (z · fyd)
#[inline]
pub fn tension_steel_area(md_kncm: f64, z_cm: f64, fyd: f64) -> f64 {
    md_kncm / (z_cm * fyd)
}

// =============================================================================
// SHEAR
// =============================================================================

/// Strut effectiveness factor αv2 = 1 − fck/250 (fck in MPa)
#[inline]
pub fn strut_effectiveness(fck_mpa: f64) -> f64 {
    1.0 - fck_mpa / 250.0
}

/// Diagonal strut crushing capacity
///
/// # Formula
/// VRd2 = 0.27 · αv2 · fcd · b · d
#[inline]
pub fn strut_capacity(fck_mpa: f64, fcd: f64, b_cm: f64, d_cm: f64) -> f64 {
    0.27 * strut_effectiveness(fck_mpa) * fcd * b_cm * d_cm
}

/// Concrete shear contribution Vc = 0.6 · fctd · b · d
#[inline]
pub fn concrete_shear_contribution(fctd: f64, b_cm: f64, d_cm: f64) -> f64 {
    0.6 * fctd * b_cm * d_cm
}

/// Stirrup area per unit length for the excess shear
///
/// # Formula
/// Asw/s = Vsw / (0.9 · d · fywd)
///
/// # Returns
/// cm² per cm of span
#[inline]
pub fn stirrup_area_per_length(vsw_kn: f64, d_cm: f64, fywd: f64) -> f64 {
    vsw_kn / (0.9 * d_cm * fywd)
}

/// Minimum stirrup area per unit length ρw,min · b = 0.2 · fctm / fywk · b
#[inline]
pub fn min_stirrup_area_per_length(fctm: f64, fywk: f64, b_cm: f64) -> f64 {
    0.2 * fctm / fywk * b_cm
}

// =============================================================================
// STAGE II (CRACKED SECTION)
// =============================================================================

/// Cracked-section neutral-axis depth x (cm)
///
/// Positive root of `(b/2)·x² + αe·As·x − αe·As·d = 0`.
///
/// # Returns
/// `None` for a non-positive width or steel area.
pub fn cracked_neutral_axis(b_cm: f64, alpha_e: f64, as_cm2: f64, d_cm: f64) -> Option<f64> {
    if b_cm <= 0.0 || as_cm2 <= 0.0 {
        return None;
    }
    let a = b_cm / 2.0;
    let b = alpha_e * as_cm2;
    let c = -alpha_e * as_cm2 * d_cm;
    let discriminant = b * b - 4.0 * a * c;
    Some((-b + discriminant.sqrt()) / (2.0 * a))
}

/// Cracked second moment of area (cm⁴)
///
/// # Formula
/// I_II = b·x³/3 + αe·As·(d − x)²
#[inline]
pub fn cracked_inertia(b_cm: f64, x_cm: f64, alpha_e: f64, as_cm2: f64, d_cm: f64) -> f64 {
    b_cm * x_cm.powi(3) / 3.0 + alpha_e * as_cm2 * (d_cm - x_cm).powi(2)
}

/// Tension steel stress in Stage II (kN/cm²)
///
/// # Formula
/// σs = αe · M · (d − x) / I_II
#[inline]
pub fn cracked_steel_stress(alpha_e: f64, m_kncm: f64, d_cm: f64, x_cm: f64, i_ii_cm4: f64) -> f64 {
    alpha_e * m_kncm * (d_cm - x_cm) / i_ii_cm4
}

/// Characteristic crack width (cm)
///
/// # Formula
/// wk = φ/(12.5·η1) · σs/Es · max(0.6·σs/fctm, 3·σs/fctm)
///
/// Both terms are kept as written; with positive stresses the second governs.
pub fn crack_width(phi_cm: f64, eta1: f64, sigma_s: f64, es: f64, fctm: f64) -> f64 {
    let term = (0.6 * sigma_s / fctm).max(3.0 * sigma_s / fctm);
    phi_cm / (12.5 * eta1) * (sigma_s / es) * term
}

// =============================================================================
// ANCHORAGE
// =============================================================================

/// Design bond strength fbd = η1 · η2 · η3 · fctd (MPa)
#[inline]
pub fn bond_strength(eta1: f64, eta2: f64, eta3: f64, fctd_mpa: f64) -> f64 {
    eta1 * eta2 * eta3 * fctd_mpa
}

/// Basic straight anchorage length lb = (φ/4) · (fyd/fbd), in the unit of φ
#[inline]
pub fn basic_anchorage_length(phi: f64, fyd_mpa: f64, fbd_mpa: f64) -> f64 {
    phi / 4.0 * (fyd_mpa / fbd_mpa)
}

/// Anchorage length floored by max(0.3·lb, 10φ, absolute minimum)
pub fn required_anchorage_length(phi_mm: f64, fyd_mpa: f64, fbd_mpa: f64, min_abs_mm: f64) -> f64 {
    let lb = basic_anchorage_length(phi_mm, fyd_mpa, fbd_mpa);
    let lb_min = (0.3 * lb).max(10.0 * phi_mm).max(min_abs_mm);
    lb.max(lb_min)
}
