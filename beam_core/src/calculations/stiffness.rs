//! # Direct Stiffness Solver
//!
//! Linear-elastic analysis of a continuous beam with 2-DOF Euler-Bernoulli
//! elements. Writes the four end forces of every span.
//!
//! ## Procedure
//!
//! 1. Node i owns global DOFs `[2i, 2i+1]` (translation, rotation)
//! 2. Each span adds its local stiffness at the DOFs of its two nodes
//! 3. Distributed loads contribute the negated fixed-end forces
//! 4. Restrained DOFs are dropped and the reduced system is solved by LU
//! 5. End forces are recovered per span as `k·u + f_fixed`
//!
//! Only distributed loads enter step 3; other load kinds are inert.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use beam_core::calculations::continuous_beam::{Beam, SupportType};
//! use beam_core::calculations::stiffness::solve_beam;
//! use beam_core::loads::Load;
//! use beam_core::materials::Material;
//! use beam_core::section::CrossSection;
//!
//! let mut beam = Beam::new("V1");
//! beam.add_span(6.0, CrossSection::default(), Arc::new(Material::default()),
//!               (0.0, 0.0), (1.0, 0.0), SupportType::Pinned, SupportType::Pinned)
//!     .loads.push(Load::distributed(15.0, 0.0, 6.0));
//!
//! solve_beam(&mut beam).unwrap();
//! assert!((beam.spans[0].shear_left - 45.0).abs() < 1e-6);
//! ```

use nalgebra::{DMatrix, DVector, Vector4};
use tracing::{debug, instrument};

use crate::calculations::continuous_beam::{Beam, BeamSpan};
use crate::equations::beam::{element_stiffness, uniform_fixed_end_forces};
use crate::errors::{CalcError, CalcResult};

/// DOFs per node (transverse displacement, rotation)
pub const DOFS_PER_NODE: usize = 2;

/// Smallest admissible LU pivot relative to the largest one
const SINGULAR_PIVOT_RATIO: f64 = 1e-10;

/// Solve the beam and write end forces on every span.
///
/// # Returns
/// The full global displacement vector (m, rad), zeros on restrained DOFs.
///
/// # Errors
/// - `MissingTopology` / `InvalidInput` from [`Beam::validate`]
/// - `SingularStructure` if the restrained structure is a mechanism
#[instrument(skip(beam), fields(beam = %beam.id, spans = beam.spans.len()))]
pub fn solve_beam(beam: &mut Beam) -> CalcResult<DVector<f64>> {
    beam.validate()?;

    let n_dofs = beam.nodes.len() * DOFS_PER_NODE;
    let stiffness = assemble_stiffness(beam, n_dofs);
    let loads = assemble_loads(beam, n_dofs);
    let free = free_dofs(beam);
    debug!(n_dofs, free = free.len(), "assembled global system");

    let mut displacements = DVector::zeros(n_dofs);
    if !free.is_empty() {
        let u_free = solve_reduced(&stiffness, &loads, &free, &beam.id)?;
        for (i_red, &i_full) in free.iter().enumerate() {
            displacements[i_full] = u_free[i_red];
        }
    }

    for span in &mut beam.spans {
        recover_end_forces(span, &displacements);
    }

    Ok(displacements)
}

/// Global DOF indices of a span in local order [v1, θ1, v2, θ2]
fn span_dofs(span: &BeamSpan) -> [usize; 4] {
    let i = span.start_node * DOFS_PER_NODE;
    let j = span.end_node * DOFS_PER_NODE;
    [i, i + 1, j, j + 1]
}

/// Fixed-end forces of all structural loads on a span
fn fixed_end_forces(span: &BeamSpan) -> Vector4<f64> {
    uniform_fixed_end_forces(span.distributed_load(), span.length_m)
}

fn assemble_stiffness(beam: &Beam, n_dofs: usize) -> DMatrix<f64> {
    let mut k_global = DMatrix::zeros(n_dofs, n_dofs);
    for span in &beam.spans {
        let k = element_stiffness(span.ei_knm2(), span.length_m);
        let dofs = span_dofs(span);
        for (a, &ga) in dofs.iter().enumerate() {
            for (b, &gb) in dofs.iter().enumerate() {
                k_global[(ga, gb)] += k[(a, b)];
            }
        }
    }
    k_global
}

fn assemble_loads(beam: &Beam, n_dofs: usize) -> DVector<f64> {
    let mut f_global = DVector::zeros(n_dofs);
    for span in &beam.spans {
        let fixed = fixed_end_forces(span);
        for (a, &ga) in span_dofs(span).iter().enumerate() {
            f_global[ga] -= fixed[a];
        }
    }
    f_global
}

/// Unrestrained DOFs in ascending order
fn free_dofs(beam: &Beam) -> Vec<usize> {
    beam.nodes
        .iter()
        .enumerate()
        .flat_map(|(i, node)| {
            node.restraints
                .as_array()
                .into_iter()
                .enumerate()
                .filter(|(_, restrained)| !restrained)
                .map(move |(dof, _)| i * DOFS_PER_NODE + dof)
        })
        .collect()
}

fn solve_reduced(
    stiffness: &DMatrix<f64>,
    loads: &DVector<f64>,
    free: &[usize],
    beam_id: &str,
) -> CalcResult<DVector<f64>> {
    let n = free.len();
    let k_red = DMatrix::from_fn(n, n, |r, c| stiffness[(free[r], free[c])]);
    let f_red = DVector::from_fn(n, |r, _| loads[free[r]]);

    let lu = k_red.lu();

    // Exact zero pivots make `solve` fail; round-off leaves tiny ones instead.
    let pivots = lu.u().diagonal().abs();
    let largest = pivots.max();
    if !(largest > 0.0) || pivots.min() <= largest * SINGULAR_PIVOT_RATIO {
        return Err(CalcError::singular_structure(beam_id, n));
    }

    let u = lu
        .solve(&f_red)
        .ok_or_else(|| CalcError::singular_structure(beam_id, n))?;
    if u.iter().any(|v| !v.is_finite()) {
        return Err(CalcError::calculation_failed(
            "stiffness",
            format!("Non-finite displacements on beam '{}'; check load values", beam_id),
        ));
    }
    Ok(u)
}

fn recover_end_forces(span: &mut BeamSpan, displacements: &DVector<f64>) {
    let dofs = span_dofs(span);
    let u = Vector4::new(
        displacements[dofs[0]],
        displacements[dofs[1]],
        displacements[dofs[2]],
        displacements[dofs[3]],
    );
    let f = element_stiffness(span.ei_knm2(), span.length_m) * u + fixed_end_forces(span);

    span.shear_left = f[0];
    span.moment_left = f[1];
    span.shear_right = -f[2];
    span.moment_right = -f[3];
}
