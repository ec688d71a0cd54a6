//! # Section Height Optimizer
//!
//! Brute-force search over candidate heights. Every candidate runs the full
//! pipeline on its own clone of the beam, so the original is never touched
//! and candidates run in parallel on the rayon pool. Results are collected in
//! candidate order, which keeps the report deterministic.
//!
//! A candidate is valid only when every span passes both serviceability
//! checks. Invalid candidates get `invalid_cost` and never win. Candidates
//! that fail serviceability are still priced into `raw_cost`.
//!
//! Loads are taken as given. Existing self-weight loads follow the candidate
//! height; none is added.
//!
//! ## Cost model
//!
//! ```text
//! cost = concrete_m3 · c_concrete + steel_kg · c_steel + formwork_m2 · c_formwork
//! ```
//!
//! - concrete: bw · h · L per span
//! - formwork: (2h + bw) · L per span (sides and soffit)
//! - steel: bottom bars over the full span, top bars over a fraction of it,
//!   stirrups by perimeter and count

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::calculations::continuous_beam::{Beam, BeamSpan};
use crate::calculations::detailing::{BarArrangement, DetailingStatus};
use crate::calculations::pipeline::{analyze_beam, CancellationToken};
use crate::errors::{CalcError, CalcResult};
use crate::settings::{DesignSettings, OptimizerSettings};
use crate::units::bar_area_cm2;

/// Heights closer than this are the same candidate (cm)
const HEIGHT_TOLERANCE_CM: f64 = 1e-6;

/// Why a candidate is or is not usable
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TrialStatus {
    Valid,
    /// At least one span failed crack width or deflection
    ServiceabilityFailed,
    /// The pipeline returned an error for this height
    Failed { reason: String },
}

impl TrialStatus {
    pub fn is_valid(&self) -> bool {
        matches!(self, TrialStatus::Valid)
    }

    pub fn display_name(&self) -> String {
        match self {
            TrialStatus::Valid => "OK".to_string(),
            TrialStatus::ServiceabilityFailed => "SLS FAIL".to_string(),
            TrialStatus::Failed { reason } => format!("ERROR: {}", reason),
        }
    }
}

/// Quantities and cost of one candidate height
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialOutcome {
    pub height_cm: f64,
    pub status: TrialStatus,
    pub steel_kg: f64,
    pub concrete_m3: f64,
    pub formwork_m2: f64,
    /// Total cost, or `invalid_cost` when the candidate is not valid
    pub cost: f64,
    /// Priced quantities regardless of validity (0 when the pipeline failed)
    pub raw_cost: f64,
}

impl TrialOutcome {
    fn invalid(height_cm: f64, status: TrialStatus, invalid_cost: f64) -> Self {
        TrialOutcome {
            height_cm,
            status,
            steel_kg: 0.0,
            concrete_m3: 0.0,
            formwork_m2: 0.0,
            cost: invalid_cost,
            raw_cost: 0.0,
        }
    }
}

/// Result of a height search on one beam
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationReport {
    pub beam_id: String,
    pub original_height_cm: f64,
    /// The beam as given, valid or not
    pub original: TrialOutcome,
    /// Cheapest valid candidate
    pub best: TrialOutcome,
    /// Every candidate in ascending height
    pub trials: Vec<TrialOutcome>,
    pub recommendation: String,
}

impl OptimizationReport {
    pub fn valid_trials(&self) -> impl Iterator<Item = &TrialOutcome> {
        self.trials.iter().filter(|t| t.status.is_valid())
    }

    /// Cost difference original - best, when the original is valid
    pub fn savings(&self) -> Option<f64> {
        self.original
            .status
            .is_valid()
            .then(|| self.original.cost - self.best.cost)
    }
}

/// Search the candidate heights for the cheapest valid section.
///
/// The beam is only read. Its current height (taken from the first span) is
/// evaluated too, from the trial list when it lies on the candidate grid.
///
/// # Errors
/// - `MissingTopology` / `InvalidInput` if the beam itself is malformed
/// - `Cancelled` if the token fires before all candidates ran
/// - `NoFeasibleSection` when no candidate is valid
#[instrument(skip(beam, settings, cancel), fields(beam = %beam.id))]
pub fn optimize_beam(
    beam: &Beam,
    settings: &DesignSettings,
    cancel: &CancellationToken,
) -> CalcResult<OptimizationReport> {
    beam.validate()?;
    let original_height_cm = beam.spans[0].section.h_cm;
    let heights = settings.optimizer.candidate_heights();

    let trials: Vec<TrialOutcome> = heights
        .par_iter()
        .map(|&h| {
            cancel.check("optimizer")?;
            Ok(run_trial(beam, h, settings))
        })
        .collect::<CalcResult<Vec<_>>>()?;

    // Strict less-than keeps the smaller height on equal cost
    let best = trials
        .iter()
        .filter(|t| t.status.is_valid())
        .fold(None::<&TrialOutcome>, |best, t| match best {
            Some(b) if b.cost <= t.cost => Some(b),
            _ => Some(t),
        })
        .cloned()
        .ok_or_else(|| {
            warn!(beam = %beam.id, trials = trials.len(), "no candidate height is valid");
            CalcError::NoFeasibleSection {
                beam_id: beam.id.clone(),
                trials: trials.len(),
            }
        })?;

    let original = match trials
        .iter()
        .find(|t| (t.height_cm - original_height_cm).abs() < HEIGHT_TOLERANCE_CM)
    {
        Some(t) => t.clone(),
        None => {
            cancel.check("optimizer")?;
            run_trial(beam, original_height_cm, settings)
        }
    };

    let recommendation = recommend(&original, &best);
    info!(
        best_height_cm = best.height_cm,
        best_cost = best.cost,
        valid = trials.iter().filter(|t| t.status.is_valid()).count(),
        "optimization finished"
    );

    Ok(OptimizationReport {
        beam_id: beam.id.clone(),
        original_height_cm,
        original,
        best,
        trials,
        recommendation,
    })
}

/// Run the pipeline on a clone at height `h_cm` and price it.
pub fn run_trial(beam: &Beam, h_cm: f64, settings: &DesignSettings) -> TrialOutcome {
    let opt = &settings.optimizer;
    let mut trial = beam.clone();
    trial.set_height(h_cm, opt.concrete_density_kn_m3);

    if let Err(e) = analyze_beam(&mut trial, settings) {
        debug!(beam = %beam.id, h_cm, "trial failed: {}", e);
        return TrialOutcome::invalid(
            h_cm,
            TrialStatus::Failed { reason: e.to_string() },
            opt.invalid_cost,
        );
    }

    let steel_kg: f64 = trial
        .spans
        .iter()
        .map(|s| span_steel_kg(s, settings.effective_depth_offset_cm, opt))
        .sum();
    let concrete_m3: f64 = trial.spans.iter().map(span_concrete_m3).sum();
    let formwork_m2: f64 = trial.spans.iter().map(span_formwork_m2).sum();
    let raw_cost = concrete_m3 * opt.concrete_cost_m3
        + steel_kg * opt.steel_cost_kg
        + formwork_m2 * opt.formwork_cost_m2;

    let serviceable = trial
        .spans
        .iter()
        .all(|s| s.serviceability.is_some_and(|r| r.passes()));
    let (status, cost) = if serviceable {
        (TrialStatus::Valid, raw_cost)
    } else {
        debug!(beam = %beam.id, h_cm, raw_cost, "trial fails serviceability");
        (TrialStatus::ServiceabilityFailed, opt.invalid_cost)
    };

    TrialOutcome {
        height_cm: h_cm,
        status,
        steel_kg,
        concrete_m3,
        formwork_m2,
        cost,
        raw_cost,
    }
}

fn span_concrete_m3(span: &BeamSpan) -> f64 {
    span.section.bw_cm / 100.0 * span.section.h_cm / 100.0 * span.length_m
}

fn span_formwork_m2(span: &BeamSpan) -> f64 {
    (2.0 * span.section.h_cm / 100.0 + span.section.bw_cm / 100.0) * span.length_m
}

fn bar_mass_kg(bars: &BarArrangement, length_m: f64, opt: &OptimizerSettings) -> f64 {
    if bars.count == 0 {
        return 0.0;
    }
    bars.area_provided_cm2 * length_m * opt.steel_linear_mass_kg
}

fn span_steel_kg(span: &BeamSpan, inset_cm: f64, opt: &OptimizerSettings) -> f64 {
    let Some(detailing) = span.detailing else {
        return 0.0;
    };
    let l = span.length_m;
    let top_length = l * opt.support_bar_length_fraction;

    let mut kg = bar_mass_kg(&detailing.positive, l, opt)
        + bar_mass_kg(&detailing.negative_left, top_length, opt)
        + bar_mass_kg(&detailing.negative_right, top_length, opt);

    let stirrups = detailing.stirrups;
    if stirrups.status == DetailingStatus::Ok && stirrups.spacing_cm > 0.0 {
        let count = l * 100.0 / stirrups.spacing_cm;
        let perimeter_cm = 2.0 * ((span.section.h_cm - inset_cm) + (span.section.bw_cm - inset_cm))
            + opt.stirrup_hook_cm;
        kg += count * perimeter_cm / 100.0 * bar_area_cm2(stirrups.diameter_mm) * opt.steel_linear_mass_kg;
    }
    kg
}

fn recommend(original: &TrialOutcome, best: &TrialOutcome) -> String {
    if !original.status.is_valid() {
        return format!(
            "Current h = {:.0} cm is not valid ({}); use h = {:.0} cm (cost {:.2})",
            original.height_cm,
            original.status.display_name(),
            best.height_cm,
            best.cost
        );
    }
    let savings = original.cost - best.cost;
    if (best.height_cm - original.height_cm).abs() < HEIGHT_TOLERANCE_CM || savings <= 0.0 {
        format!(
            "Keep current section h = {:.0} cm (cost {:.2})",
            original.height_cm, original.cost
        )
    } else {
        format!(
            "Change h from {:.0} to {:.0} cm: saves {:.2} ({:.1}%)",
            original.height_cm,
            best.height_cm,
            savings,
            savings / original.cost * 100.0
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::calculations::continuous_beam::SupportType;
    use crate::loads::Load;
    use crate::materials::{ConcreteClass, Material};
    use crate::section::CrossSection;

    fn beam(length: f64, h_cm: f64, q: f64) -> Beam {
        let mut beam = Beam::new("V1");
        beam.add_span(
            length,
            CrossSection::rectangular(20.0, h_cm),
            Arc::new(Material::concrete(ConcreteClass::C30)),
            (0.0, 0.0),
            (1.0, 0.0),
            SupportType::Pinned,
            SupportType::Pinned,
        )
        .loads
        .push(Load::distributed(q, 0.0, length));
        beam
    }

    fn optimize(beam: &Beam) -> CalcResult<OptimizationReport> {
        optimize_beam(beam, &DesignSettings::default(), &CancellationToken::new())
    }

    #[test]
    fn test_trials_cover_candidate_grid() {
        let report = optimize(&beam(6.0, 50.0, 15.0)).expect("Optimization should succeed");
        assert_eq!(report.trials.len(), 11);
        assert_eq!(report.trials[0].height_cm, 30.0);
        assert_eq!(report.trials[10].height_cm, 80.0);
        assert!(report.trials.windows(2).all(|w| w[0].height_cm < w[1].height_cm));
    }

    #[test]
    fn test_deterministic() {
        let b = beam(6.0, 50.0, 15.0);
        let first = optimize(&b).unwrap();
        let second = optimize(&b).unwrap();
        assert_eq!(first.best.height_cm, second.best.height_cm);
        assert_eq!(first.best.cost, second.best.cost);
        assert_eq!(first.trials, second.trials);
    }

    #[test]
    fn test_serviceability_failures_excluded() {
        let report = optimize(&beam(6.0, 50.0, 15.0)).unwrap();

        // 30 cm deflects well past L/250
        let shallow = &report.trials[0];
        assert_eq!(shallow.status, TrialStatus::ServiceabilityFailed);
        assert_eq!(shallow.cost, 99_999.0);

        assert!(report.best.status.is_valid());
        assert!(report.best.height_cm > shallow.height_cm);
        for t in report.valid_trials() {
            assert!(report.best.cost <= t.cost);
        }
    }

    #[test]
    fn test_cheaper_failing_trials_not_chosen() {
        // L/500 = 12 mm: the cheaper shallow sections all deflect too much
        let mut settings = DesignSettings::default();
        settings.serviceability.deflection_span_ratio = 500.0;
        let report = optimize_beam(&beam(6.0, 50.0, 15.0), &settings, &CancellationToken::new()).unwrap();

        let failed: Vec<&TrialOutcome> = report
            .trials
            .iter()
            .filter(|t| t.status == TrialStatus::ServiceabilityFailed)
            .collect();
        assert!(!failed.is_empty());
        let cheapest_failed = failed.iter().map(|t| t.raw_cost).fold(f64::INFINITY, f64::min);
        assert!(cheapest_failed > 0.0);
        assert!(cheapest_failed < report.best.cost);

        for t in &failed {
            assert_eq!(t.cost, 99_999.0);
            assert!(t.height_cm < report.best.height_cm);
        }
        assert!(report.best.status.is_valid());
        assert_eq!(report.best.cost, report.best.raw_cost);
    }

    #[test]
    fn test_original_matches_analysis() {
        let settings = DesignSettings::default();
        let b = beam(6.0, 50.0, 22.0);

        let mut analysed = b.clone();
        analyze_beam(&mut analysed, &settings).unwrap();
        let passes = analysed
            .spans
            .iter()
            .all(|s| s.serviceability.is_some_and(|r| r.passes()));
        assert!(passes);

        let report = optimize_beam(&b, &settings, &CancellationToken::new()).unwrap();
        assert_eq!(report.original.status.is_valid(), passes);
        assert!(report.savings().is_some());
    }

    #[test]
    fn test_valid_trial_quantities() {
        let report = optimize(&beam(6.0, 50.0, 15.0)).unwrap();
        let t = report.valid_trials().next().expect("At least one valid trial");
        let h = t.height_cm / 100.0;

        assert!((t.concrete_m3 - 0.2 * h * 6.0).abs() < 1e-9);
        assert!((t.formwork_m2 - (2.0 * h + 0.2) * 6.0).abs() < 1e-9);
        assert!(t.steel_kg > 0.0);
        let cost = t.concrete_m3 * 450.0 + t.steel_kg * 12.0 + t.formwork_m2 * 80.0;
        assert!((t.cost - cost).abs() < 1e-6);
        assert_eq!(t.raw_cost, t.cost);
    }

    #[test]
    fn test_original_not_mutated() {
        let b = beam(6.0, 50.0, 15.0);
        optimize(&b).unwrap();
        assert_eq!(b.spans[0].section.h_cm, 50.0);
        assert_eq!(b.spans[0].loads.len(), 1);
        assert!(b.spans[0].design.is_none());
    }

    #[test]
    fn test_original_on_grid_taken_from_trials() {
        let report = optimize(&beam(6.0, 50.0, 15.0)).unwrap();
        assert_eq!(report.original_height_cm, 50.0);
        let on_grid = report.trials.iter().find(|t| t.height_cm == 50.0).unwrap();
        assert_eq!(&report.original, on_grid);
    }

    #[test]
    fn test_original_off_grid_evaluated_separately() {
        let report = optimize(&beam(6.0, 52.0, 15.0)).unwrap();
        assert_eq!(report.original.height_cm, 52.0);
        assert!(report.trials.iter().all(|t| t.height_cm != 52.0));
    }

    #[test]
    fn test_no_feasible_section() {
        // 12 m span deflects past L/250 even at 80 cm
        let result = optimize(&beam(12.0, 50.0, 15.0));
        match result {
            Err(CalcError::NoFeasibleSection { beam_id, trials }) => {
                assert_eq!(beam_id, "V1");
                assert_eq!(trials, 11);
            }
            other => panic!("Expected NoFeasibleSection, got {:?}", other),
        }
    }

    #[test]
    fn test_malformed_beam_rejected() {
        let result = optimize(&Beam::new("V9"));
        assert!(matches!(result, Err(CalcError::MissingTopology { .. })));
    }

    #[test]
    fn test_cancelled() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let result = optimize_beam(&beam(6.0, 50.0, 15.0), &DesignSettings::default(), &cancel);
        assert!(matches!(result, Err(CalcError::Cancelled { .. })));
    }

    #[test]
    fn test_recommendation_text() {
        let valid = |h: f64, cost: f64| TrialOutcome {
            height_cm: h,
            status: TrialStatus::Valid,
            steel_kg: 0.0,
            concrete_m3: 0.0,
            formwork_m2: 0.0,
            cost,
            raw_cost: cost,
        };
        assert_eq!(
            recommend(&valid(50.0, 1000.0), &valid(45.0, 900.0)),
            "Change h from 50 to 45 cm: saves 100.00 (10.0%)"
        );
        assert!(recommend(&valid(50.0, 900.0), &valid(50.0, 900.0)).starts_with("Keep current section"));

        let failed = TrialOutcome::invalid(30.0, TrialStatus::ServiceabilityFailed, 99_999.0);
        assert!(recommend(&failed, &valid(45.0, 900.0)).contains("not valid"));
    }

    #[test]
    fn test_tie_prefers_smaller_height() {
        let report = optimize(&beam(6.0, 50.0, 15.0)).unwrap();
        let ties = report
            .valid_trials()
            .filter(|t| t.cost == report.best.cost)
            .map(|t| t.height_cm)
            .fold(f64::INFINITY, f64::min);
        assert_eq!(report.best.height_cm, ties);
    }
}
