//! # Support Reactions
//!
//! Collects solved end forces into per-support loads for the columns below.
//! Supports of different beams that share a location (to the millimetre)
//! are merged into one entry.
//!
//! End moments only transfer where the node restrains rotation. The moment
//! is split over the global axes with the beam direction: the X-aligned part
//! of the beam bends about Y and vice versa.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calculations::continuous_beam::{Beam, Node};

/// Load delivered to one support location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnLoad {
    /// P1, P2, ... in (y, x) order
    pub label: String,
    pub x_m: f64,
    pub y_m: f64,
    /// Vertical force (kN)
    pub fz_kn: f64,
    /// Moment about X (kNm)
    pub mx_knm: f64,
    /// Moment about Y (kNm)
    pub my_knm: f64,
    /// Ids of the beams bearing on this support
    pub beams: BTreeSet<String>,
}

/// Location key in integer millimetres
type CoordKey = (i64, i64);

fn coord_key(node: &Node) -> CoordKey {
    ((node.x_m * 1000.0).round() as i64, (node.y_m * 1000.0).round() as i64)
}

/// Aggregate the reactions of solved beams per support location.
///
/// Beams without solved forces contribute zeros. Nodes without vertical
/// restraint are not supports and are skipped.
pub fn support_reactions(beams: &[Beam]) -> Vec<ColumnLoad> {
    let mut by_location: BTreeMap<CoordKey, ColumnLoad> = BTreeMap::new();

    for beam in beams {
        let (dx, dy) = (beam.direction.0.abs(), beam.direction.1.abs());
        for span in &beam.spans {
            let Some((start, end)) = beam.span_nodes(span) else {
                continue;
            };
            let ends = [
                (start, span.shear_left, span.moment_left.abs()),
                (end, span.shear_right.abs(), span.moment_right.abs()),
            ];
            for (node, fz, moment) in ends {
                if !node.restraints.is_support() {
                    continue;
                }
                let entry = by_location.entry(coord_key(node)).or_insert_with(|| ColumnLoad {
                    label: String::new(),
                    x_m: node.x_m,
                    y_m: node.y_m,
                    fz_kn: 0.0,
                    mx_knm: 0.0,
                    my_knm: 0.0,
                    beams: BTreeSet::new(),
                });
                entry.fz_kn += fz;
                if node.restraints.rotation {
                    entry.mx_knm += moment * dy;
                    entry.my_knm += moment * dx;
                }
                entry.beams.insert(beam.id.clone());
            }
        }
    }

    let mut loads: Vec<ColumnLoad> = by_location.into_values().collect();
    loads.sort_by(|a, b| a.y_m.total_cmp(&b.y_m).then(a.x_m.total_cmp(&b.x_m)));
    for (i, load) in loads.iter_mut().enumerate() {
        load.label = format!("P{}", i + 1);
    }
    debug!(supports = loads.len(), "support reactions aggregated");
    loads
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::calculations::continuous_beam::SupportType;
    use crate::calculations::stiffness::solve_beam;
    use crate::loads::Load;
    use crate::materials::Material;
    use crate::section::CrossSection;

    fn solved(
        id: &str,
        start: (f64, f64),
        direction: (f64, f64),
        lengths: &[f64],
        q: f64,
        supports: &[SupportType],
    ) -> Beam {
        let mut beam = Beam::new(id);
        let mut origin = start;
        for (i, &l) in lengths.iter().enumerate() {
            beam.add_span(
                l,
                CrossSection::rectangular(20.0, 50.0),
                Arc::new(Material::default()),
                origin,
                direction,
                supports[i],
                supports[i + 1],
            )
            .loads
            .push(Load::distributed(q, 0.0, l));
            origin = (origin.0 + l * direction.0, origin.1 + l * direction.1);
        }
        solve_beam(&mut beam).expect("Beam should solve");
        beam
    }

    #[test]
    fn test_simple_span_reactions() {
        let beam = solved("V1", (0.0, 0.0), (1.0, 0.0), &[6.0], 10.0, &[SupportType::Pinned; 2]);
        let loads = support_reactions(&[beam]);

        assert_eq!(loads.len(), 2);
        assert_eq!(loads[0].label, "P1");
        assert_eq!(loads[1].label, "P2");
        assert!((loads[0].fz_kn - 30.0).abs() < 1e-6);
        assert!((loads[1].fz_kn - 30.0).abs() < 1e-6);
        assert_eq!(loads[0].mx_knm, 0.0);
        assert_eq!(loads[0].my_knm, 0.0);
        assert!(loads[0].beams.contains("V1"));
    }

    #[test]
    fn test_interior_support_sums_both_spans() {
        let beam = solved("V1", (0.0, 0.0), (1.0, 0.0), &[5.0, 5.0], 10.0, &[SupportType::Pinned; 3]);
        let loads = support_reactions(&[beam]);

        // 3qL/8 at the ends, 10qL/8 in the middle
        assert_eq!(loads.len(), 3);
        assert!((loads[0].fz_kn - 18.75).abs() < 1e-6);
        assert!((loads[1].fz_kn - 62.5).abs() < 1e-6);
        assert!((loads[2].fz_kn - 18.75).abs() < 1e-6);
        let total: f64 = loads.iter().map(|l| l.fz_kn).sum();
        assert!((total - 100.0).abs() < 1e-6);
    }

    #[test]
    fn test_fixed_end_moment_decomposed_by_direction() {
        let along_x = solved("V1", (0.0, 0.0), (1.0, 0.0), &[6.0], 10.0, &[SupportType::Fixed; 2]);
        let along_y = solved("V2", (10.0, 0.0), (0.0, 1.0), &[6.0], 10.0, &[SupportType::Fixed; 2]);
        let loads = support_reactions(&[along_x, along_y]);

        // qL²/12 = 30 kNm at each fixed end
        let p_x = loads.iter().find(|l| l.x_m == 0.0 && l.y_m == 0.0).unwrap();
        assert!((p_x.my_knm - 30.0).abs() < 1e-6);
        assert!(p_x.mx_knm.abs() < 1e-9);

        let p_y = loads.iter().find(|l| l.x_m == 10.0 && l.y_m == 6.0).unwrap();
        assert!((p_y.mx_knm - 30.0).abs() < 1e-6);
        assert!(p_y.my_knm.abs() < 1e-9);
    }

    #[test]
    fn test_shared_location_merges_beams() {
        let v1 = solved("V1", (0.0, 0.0), (1.0, 0.0), &[6.0], 10.0, &[SupportType::Pinned; 2]);
        let v2 = solved("V2", (6.0, 0.0), (0.0, 1.0), &[4.0], 10.0, &[SupportType::Pinned; 2]);
        let loads = support_reactions(&[v1, v2]);

        assert_eq!(loads.len(), 3);
        let corner = loads.iter().find(|l| l.x_m == 6.0 && l.y_m == 0.0).unwrap();
        assert!((corner.fz_kn - 50.0).abs() < 1e-6);
        assert_eq!(corner.beams.len(), 2);
    }

    #[test]
    fn test_sorted_by_y_then_x() {
        let v1 = solved("V1", (0.0, 5.0), (1.0, 0.0), &[4.0], 10.0, &[SupportType::Pinned; 2]);
        let v2 = solved("V2", (0.0, 0.0), (1.0, 0.0), &[4.0], 10.0, &[SupportType::Pinned; 2]);
        let loads = support_reactions(&[v1, v2]);

        let coords: Vec<(f64, f64)> = loads.iter().map(|l| (l.x_m, l.y_m)).collect();
        assert_eq!(coords, vec![(0.0, 0.0), (4.0, 0.0), (0.0, 5.0), (4.0, 5.0)]);
        assert_eq!(loads[3].label, "P4");
    }

    #[test]
    fn test_free_end_not_a_support() {
        let cantilever = solved(
            "V1",
            (0.0, 0.0),
            (1.0, 0.0),
            &[3.0],
            10.0,
            &[SupportType::Fixed, SupportType::Free],
        );
        let loads = support_reactions(&[cantilever]);
        assert_eq!(loads.len(), 1);
        assert!((loads[0].fz_kn - 30.0).abs() < 1e-6);
        assert!((loads[0].my_knm - 45.0).abs() < 1e-6);
    }
}
