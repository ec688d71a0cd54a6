//! # Analysis Pipeline
//!
//! Runs the four stages on a beam in order:
//!
//! ```text
//! solve ──► ULS design ──► serviceability ──► detailing
//! ```
//!
//! Each stage reads what the previous one stored on the spans, so the stages
//! of one beam never run concurrently. Independent beams do: [`run_batch`]
//! spreads them over the rayon pool and collects per-beam failures without
//! stopping the rest of the batch.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use beam_core::calculations::continuous_beam::{Beam, SupportType};
//! use beam_core::calculations::pipeline::analyze_beam;
//! use beam_core::loads::Load;
//! use beam_core::materials::{ConcreteClass, Material};
//! use beam_core::section::CrossSection;
//! use beam_core::settings::DesignSettings;
//!
//! let mut beam = Beam::new("V1");
//! beam.add_span(6.0, CrossSection::rectangular(20.0, 50.0),
//!               Arc::new(Material::concrete(ConcreteClass::C30)),
//!               (0.0, 0.0), (1.0, 0.0), SupportType::Pinned, SupportType::Pinned)
//!     .loads.push(Load::distributed(15.0, 0.0, 6.0));
//!
//! analyze_beam(&mut beam, &DesignSettings::default()).unwrap();
//! let span = &beam.spans[0];
//! assert!(span.serviceability.unwrap().passes());
//! assert!(span.detailing.unwrap().is_buildable());
//! ```

use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument, warn};

use crate::calculations::continuous_beam::Beam;
use crate::calculations::{detailing, sls_check, stiffness, uls_design};
use crate::errors::{CalcError, CalcResult};
use crate::settings::DesignSettings;

// =============================================================================
// CANCELLATION
// =============================================================================

/// Cooperative cancellation flag shared between a caller and a running batch
/// or optimization. Checked between beams and between candidates.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation; running work stops at its next checkpoint
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// `Err(Cancelled)` once cancellation has been requested
    pub fn check(&self, stage: &str) -> CalcResult<()> {
        if self.is_cancelled() {
            Err(CalcError::cancelled(stage))
        } else {
            Ok(())
        }
    }
}

// =============================================================================
// SINGLE BEAM
// =============================================================================

/// Run the full chain on one beam, replacing any previous results.
///
/// # Errors
/// Topology, input and singular-structure errors abort this beam only.
/// Design, serviceability and detailing problems are stored as statuses.
#[instrument(skip(beam, settings), fields(beam = %beam.id))]
pub fn analyze_beam(beam: &mut Beam, settings: &DesignSettings) -> CalcResult<()> {
    beam.clear_results();
    stiffness::solve_beam(beam)?;
    uls_design::design_beam(beam, settings)?;
    sls_check::check_beam(beam, settings);
    detailing::detail_beam(beam, settings);
    Ok(())
}

// =============================================================================
// BATCH
// =============================================================================

/// Outcome of a batch: analysed beams and per-beam failures, keyed by id
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchReport {
    pub analyzed: BTreeMap<String, Beam>,
    pub failures: BTreeMap<String, CalcError>,
}

impl BatchReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Analyse independent beams in parallel.
///
/// A beam that fails (or is reached after cancellation) is moved to
/// `failures`; the others are unaffected.
///
/// # Errors
/// `InvalidInput` when two beams share an id.
#[instrument(skip_all, fields(beams = beams.len()))]
pub fn run_batch(
    beams: Vec<Beam>,
    settings: &DesignSettings,
    cancel: &CancellationToken,
) -> CalcResult<BatchReport> {
    let mut seen = HashSet::new();
    for beam in &beams {
        if !seen.insert(beam.id.as_str()) {
            return Err(CalcError::invalid_input("beam.id", &beam.id, "Duplicate beam id in batch"));
        }
    }

    let outcomes: Vec<(Beam, CalcResult<()>)> = beams
        .into_par_iter()
        .map(|mut beam| {
            let outcome = cancel
                .check("batch")
                .and_then(|_| analyze_beam(&mut beam, settings));
            (beam, outcome)
        })
        .collect();

    let mut report = BatchReport::default();
    for (beam, outcome) in outcomes {
        match outcome {
            Ok(()) => {
                report.analyzed.insert(beam.id.clone(), beam);
            }
            Err(e) => {
                if e.is_per_beam() {
                    error!(beam = %beam.id, code = e.error_code(), "beam analysis failed: {}", e);
                } else {
                    warn!(beam = %beam.id, code = e.error_code(), "beam not analysed: {}", e);
                }
                report.failures.insert(beam.id, e);
            }
        }
    }

    info!(
        analyzed = report.analyzed.len(),
        failed = report.failures.len(),
        "batch finished"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::calculations::continuous_beam::SupportType;
    use crate::calculations::detailing::DetailingStatus;
    use crate::loads::Load;
    use crate::materials::{Material, MaterialClass};
    use crate::section::CrossSection;

    fn simple_beam(id: &str, length: f64, h_cm: f64, q: f64) -> Beam {
        let mut beam = Beam::new(id);
        beam.add_span(
            length,
            CrossSection::rectangular(20.0, h_cm),
            Arc::new(Material::new("C30", MaterialClass::Concrete, 30.0, 500.0, 26_000.0)),
            (0.0, 0.0),
            (1.0, 0.0),
            SupportType::Pinned,
            SupportType::Pinned,
        )
        .loads
        .push(Load::distributed(q, 0.0, length));
        beam
    }

    #[test]
    fn test_reference_scenario_end_to_end() {
        let mut beam = simple_beam("V1", 6.0, 50.0, 15.0);
        analyze_beam(&mut beam, &DesignSettings::default()).expect("Analysis should succeed");
        let span = &beam.spans[0];

        // Solver: symmetric shears ±45 kN, midspan moment 67.5 kNm
        assert!((span.shear_left - 45.0).abs() < 1e-6);
        assert!((span.shear_right + 45.0).abs() < 1e-6);
        assert!((span.midspan_moment() - 67.5).abs() < 1e-6);

        // ULS: amplified midspan steel above the 0.15 % floor
        let design = span.design.expect("Design stored");
        assert!(design.positive_midspan.as_required_cm2 > 0.0015 * 20.0 * 50.0);

        // SLS and detailing complete
        assert!(span.serviceability.expect("Checks stored").passes());
        let detailing = span.detailing.expect("Detailing stored");
        assert_eq!(detailing.positive.count, 3);
        assert_eq!(detailing.positive.diameter_mm, 16.0);
        assert_eq!(detailing.negative_left.status, DetailingStatus::NotRequired);
        assert_eq!(detailing.stirrups.status, DetailingStatus::Ok);
    }

    #[test]
    fn test_skin_reinforcement_by_height() {
        let settings = DesignSettings::default();

        let mut short = simple_beam("V1", 6.0, 55.0, 15.0);
        analyze_beam(&mut short, &settings).unwrap();
        let skin = short.spans[0].detailing.unwrap().skin;
        assert_eq!(skin.status, DetailingStatus::NotRequired);
        assert_eq!(skin.count, 0);

        let mut tall = simple_beam("V2", 6.0, 60.0, 15.0);
        analyze_beam(&mut tall, &settings).unwrap();
        let skin = tall.spans[0].detailing.unwrap().skin;
        assert_eq!(skin.status, DetailingStatus::Ok);
        assert!(skin.area_provided_cm2 > 0.0);
        assert_eq!(skin.count, 2 * skin.bars_per_face);
    }

    #[test]
    fn test_rerun_replaces_results() {
        let settings = DesignSettings::default();
        let mut beam = simple_beam("V1", 6.0, 50.0, 15.0);
        analyze_beam(&mut beam, &settings).unwrap();
        let first = beam.spans[0].design.unwrap();

        beam.spans[0].loads[0].value = 30.0;
        analyze_beam(&mut beam, &settings).unwrap();
        let second = beam.spans[0].design.unwrap();
        assert!(second.positive_midspan.as_required_cm2 > first.positive_midspan.as_required_cm2);
    }

    #[test]
    fn test_batch_isolates_failures() {
        let mut unstable = simple_beam("V2", 6.0, 50.0, 15.0);
        unstable.set_support(0, SupportType::Free).unwrap();
        unstable.set_support(1, SupportType::Free).unwrap();

        let beams = vec![simple_beam("V1", 6.0, 50.0, 15.0), unstable, Beam::new("V3")];
        let report = run_batch(beams, &DesignSettings::default(), &CancellationToken::new()).unwrap();

        assert_eq!(report.analyzed.len(), 1);
        assert!(report.analyzed["V1"].spans[0].detailing.is_some());
        assert!(matches!(report.failures["V2"], CalcError::SingularStructure { .. }));
        assert!(matches!(report.failures["V3"], CalcError::MissingTopology { .. }));
        assert!(!report.is_complete());
    }

    #[test]
    fn test_batch_cancelled_before_start() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let beams = vec![simple_beam("V1", 6.0, 50.0, 15.0), simple_beam("V2", 5.0, 50.0, 10.0)];
        let report = run_batch(beams, &DesignSettings::default(), &cancel).unwrap();
        assert!(report.analyzed.is_empty());
        assert!(report.failures.values().all(|e| matches!(e, CalcError::Cancelled { .. })));
    }

    #[test]
    fn test_batch_rejects_duplicate_ids() {
        let beams = vec![simple_beam("V1", 6.0, 50.0, 15.0), simple_beam("V1", 5.0, 50.0, 10.0)];
        let result = run_batch(beams, &DesignSettings::default(), &CancellationToken::new());
        assert!(matches!(result, Err(CalcError::InvalidInput { .. })));
    }

    #[test]
    fn test_cancellation_token_shared() {
        let token = CancellationToken::new();
        let clone = token.clone();
        assert!(token.check("test").is_ok());
        clone.cancel();
        assert!(token.is_cancelled());
        assert_eq!(token.check("test").unwrap_err().error_code(), "CANCELLED");
    }
}
