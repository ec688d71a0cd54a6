//! # Beam Element Formulas
//!
//! Closed-form results for a straight Euler-Bernoulli beam element with two
//! degrees of freedom per node (transverse displacement v, rotation θ).
//!
//! ## Notation
//!
//! - `L` = Element (span) length
//! - `x` = Position along the element from its start node
//! - `q` = Uniform load intensity (force per unit length), positive downward
//! - `E` = Modulus of elasticity, `I` = Second moment of area
//!
//! ## Local DOF Order
//!
//! ```text
//!   [ v1, θ1, v2, θ2 ]
//!    ●━━━━━━━━━━━━━━━●
//!   node i          node j
//! ```
//!
//! ## Sign Conventions
//!
//! - Loads: Positive downward
//! - Element end forces: positive up / counter-clockwise (raw stiffness convention)
//! - Span moments reported by [`uniform_load_moment`]: positive sagging
//!
//! ## References
//!
//! - Structural Analysis by R.C. Hibbeler, Chapter 15 (beam stiffness method)
//! - Roark's Formulas for Stress and Strain, 8th Edition, Table 8.1

use nalgebra::{Matrix4, Vector4};

// =============================================================================
// STIFFNESS METHOD
// =============================================================================

/// Local 4×4 stiffness matrix of a beam element
///
/// # Formula
/// ```text
///          ┌  12    6L   -12    6L  ┐
///   EI/L³  │  6L   4L²   -6L   2L²  │
///          │ -12   -6L    12   -6L  │
///          └  6L   2L²   -6L   4L²  ┘
/// ```
///
/// # Arguments
/// * `ei` - Flexural stiffness EI (kN·m²)
/// * `l` - Element length (m)
pub fn element_stiffness(ei: f64, l: f64) -> Matrix4<f64> {
    let l2 = l * l;
    let k = ei / (l2 * l);
    #[rustfmt::skip]
    let pattern = Matrix4::new(
        12.0,      6.0 * l,  -12.0,     6.0 * l,
        6.0 * l,   4.0 * l2, -6.0 * l,  2.0 * l2,
        -12.0,    -6.0 * l,   12.0,    -6.0 * l,
        6.0 * l,   2.0 * l2, -6.0 * l,  4.0 * l2,
    );
    pattern * k
}

/// Fixed-end reactions of a fully restrained element under uniform load q
///
/// ```text
///    ↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓ q
///   ▐═════════════════▌
///   R1,M1          R2,M2
/// ```
///
/// # Formulas
/// - R1 = R2 = qL/2 (upward)
/// - M1 = +qL²/12, M2 = -qL²/12
///
/// # Returns
/// `[R1, M1, R2, M2]` in local DOF order. The equivalent nodal load vector is
/// the negation of this vector.
#[inline]
pub fn uniform_fixed_end_forces(q: f64, l: f64) -> Vector4<f64> {
    let r = q * l / 2.0;
    let m = q * l * l / 12.0;
    Vector4::new(r, m, r, -m)
}

// =============================================================================
// SIMPLY-SUPPORTED UNIFORM LOAD
// =============================================================================

/// Isostatic moment at position x for uniform load q
///
/// # Formula (Roark's Table 8.1, Case 2a)
/// M(x) = qx(L-x)/2
#[inline]
pub fn uniform_load_moment(q: f64, l: f64, x: f64) -> f64 {
    q * x * (l - x) / 2.0
}

/// Maximum isostatic moment for uniform load
///
/// # Formula
/// M0 = qL²/8
#[inline]
pub fn uniform_load_max_moment(q: f64, l: f64) -> f64 {
    q * l * l / 8.0
}

/// Maximum deflection for uniform load (at midspan)
///
/// # Formula
/// δ_max = 5qL⁴ / (384EI)
#[inline]
pub fn uniform_load_max_deflection(q: f64, l: f64, e: f64, i: f64) -> f64 {
    5.0 * q * l.powi(4) / (384.0 * e * i)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-6;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < EPSILON || (a - b).abs() / b.abs().max(1.0) < 0.001
    }

    #[test]
    fn test_stiffness_is_symmetric() {
        let k = element_stiffness(5000.0, 6.0);
        assert!((k - k.transpose()).abs().max() < 1e-9);
    }

    #[test]
    fn test_stiffness_rigid_body_modes() {
        // Rigid translation and rigid rotation produce no end forces
        let l = 4.0;
        let k = element_stiffness(1000.0, l);
        let translation = Vector4::new(1.0, 0.0, 1.0, 0.0);
        let rotation = Vector4::new(0.0, 1.0, l, 1.0);
        assert!((k * translation).abs().max() < 1e-9);
        assert!((k * rotation).abs().max() < 1e-9);
    }

    #[test]
    fn test_stiffness_entries() {
        // EI/L³ = 8000 / 8 = 1000
        let k = element_stiffness(8000.0, 2.0);
        assert!(approx_eq(k[(0, 0)], 12_000.0));
        assert!(approx_eq(k[(1, 1)], 16_000.0));
        assert!(approx_eq(k[(1, 3)], 8_000.0));
        assert!(approx_eq(k[(2, 3)], -12_000.0));
    }

    #[test]
    fn test_fixed_end_forces() {
        // 15 kN/m over 6 m: R = 45 kN, M = 45 kNm
        let f = uniform_fixed_end_forces(15.0, 6.0);
        assert!(approx_eq(f[0], 45.0));
        assert!(approx_eq(f[1], 45.0));
        assert!(approx_eq(f[2], 45.0));
        assert!(approx_eq(f[3], -45.0));
    }

    #[test]
    fn test_uniform_load_moment_max_at_midspan() {
        let m_mid = uniform_load_moment(15.0, 6.0, 3.0);
        assert!(approx_eq(m_mid, uniform_load_max_moment(15.0, 6.0)));
        assert!(approx_eq(m_mid, 67.5));
        assert!(approx_eq(uniform_load_moment(15.0, 6.0, 0.0), 0.0));
    }

    #[test]
    fn test_uniform_load_deflection() {
        // 5 * 1 * 10⁴ / (384 * 1 * 1) = 130.208
        assert!(approx_eq(uniform_load_max_deflection(1.0, 10.0, 1.0, 1.0), 130.208_333));
    }
}
