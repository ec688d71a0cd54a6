use std::sync::Arc;

use anyhow::{bail, Context, Result};
use beam_core::calculations::{
    analyze_beam, optimize_beam, support_reactions, Beam, BeamSpan, CancellationToken, ColumnLoad,
    OptimizationReport, SupportType,
};
use beam_core::loads::Load;
use beam_core::materials::{ConcreteClass, Material};
use beam_core::section::CrossSection;
use beam_core::DesignSettings;
use serde::Serialize;
use tracing::info;

use crate::cli::BeamArgs;

const RULE: &str = "═══════════════════════════════════════";

/// Settings from `--settings`, or the defaults
pub fn load_settings(args: &BeamArgs) -> Result<DesignSettings> {
    match &args.settings {
        Some(path) => DesignSettings::load(path)
            .with_context(|| format!("Failed to load settings from {}", path.display())),
        None => Ok(DesignSettings::default()),
    }
}

/// Build a straight beam along +X from the command-line arguments
pub fn build_beam(args: &BeamArgs, settings: &DesignSettings) -> Result<Beam> {
    if args.spans.is_empty() {
        bail!("At least one span is required");
    }
    let supports: Vec<SupportType> = if args.supports.is_empty() {
        vec![SupportType::Pinned; args.spans.len() + 1]
    } else if args.supports.len() == args.spans.len() + 1 {
        args.supports.iter().copied().map(SupportType::from).collect()
    } else {
        bail!(
            "{} spans need {} supports, got {}",
            args.spans.len(),
            args.spans.len() + 1,
            args.supports.len()
        );
    };

    let class = ConcreteClass::from_fck(args.fck)
        .with_context(|| format!("No standard concrete class with fck = {} MPa", args.fck))?;
    let mut material = Material::concrete(class);
    material.fyk_mpa = args.fyk;
    material.validate().context("Invalid material")?;
    let material = Arc::new(material);

    let mut beam = Beam::new(&args.id);
    let mut x = 0.0;
    for (i, &length) in args.spans.iter().enumerate() {
        beam.add_span(
            length,
            CrossSection::rectangular(args.bw, args.height),
            material.clone(),
            (x, 0.0),
            (1.0, 0.0),
            supports[i],
            supports[i + 1],
        )
        .loads
        .push(Load::distributed(args.load, 0.0, length));
        x += length;
    }
    if args.self_weight {
        beam.add_self_weight(settings.optimizer.concrete_density_kn_m3);
    }
    beam.validate().context("Invalid beam definition")?;
    Ok(beam)
}

#[derive(Serialize)]
struct AnalysisOutput<'a> {
    beam: &'a Beam,
    reactions: &'a [ColumnLoad],
}

pub fn analyze(args: BeamArgs) -> Result<()> {
    let settings = load_settings(&args)?;
    let mut beam = build_beam(&args, &settings)?;
    info!(beam = %beam.id, spans = beam.spans.len(), "analysing");

    analyze_beam(&mut beam, &settings).with_context(|| format!("Analysis of beam {} failed", beam.id))?;
    let reactions = support_reactions(std::slice::from_ref(&beam));

    if args.json {
        let output = AnalysisOutput {
            beam: &beam,
            reactions: &reactions,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print_analysis(&beam, &reactions);
    }
    Ok(())
}

pub fn optimize(args: BeamArgs) -> Result<()> {
    let settings = load_settings(&args)?;
    let beam = build_beam(&args, &settings)?;
    info!(beam = %beam.id, "optimizing section height");

    let report = optimize_beam(&beam, &settings, &CancellationToken::new())
        .with_context(|| format!("Optimization of beam {} failed", beam.id))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_optimization(&report);
    }
    Ok(())
}

fn status_icon(pass: bool) -> &'static str {
    if pass { "[OK]" } else { "[FAIL]" }
}

fn print_analysis(beam: &Beam, reactions: &[ColumnLoad]) {
    println!("{}", RULE);
    println!("  BEAM {} RESULTS", beam.id);
    println!("{}", RULE);
    println!();
    println!("{} spans, total length {:.2} m", beam.spans.len(), beam.total_length_m());

    for (i, span) in beam.spans.iter().enumerate() {
        println!();
        print_span(i + 1, span);
    }

    println!();
    println!("Support reactions:");
    for r in reactions {
        println!(
            "  {:<4} ({:>6.2}, {:>6.2})  Fz = {:>7.2} kN  Mx = {:>6.2} kNm  My = {:>6.2} kNm",
            r.label, r.x_m, r.y_m, r.fz_kn, r.mx_knm, r.my_knm
        );
    }

    let passes = beam
        .spans
        .iter()
        .all(|s| s.serviceability.is_some_and(|r| r.passes()) && s.detailing.is_some_and(|d| d.is_buildable()));
    println!();
    println!("{}", RULE);
    println!("  RESULT: {}", if passes { "PASS" } else { "FAIL" });
    println!("{}", RULE);
}

fn print_span(number: usize, span: &BeamSpan) {
    println!(
        "Span {} ({:.2} m, {:.0}x{:.0} cm, {}):",
        number, span.length_m, span.section.bw_cm, span.section.h_cm, span.material.name
    );
    println!(
        "  Forces:  V = {:.2} / {:.2} kN   M = {:.2} / {:.2} / {:.2} kNm",
        span.shear_left,
        span.shear_right,
        span.moment_left,
        span.midspan_moment(),
        span.moment_right
    );

    if let Some(design) = &span.design {
        println!(
            "  ULS:     As- {:.2} | As+ {:.2} | As- {:.2} cm²  ({})",
            design.negative_left.as_required_cm2,
            design.positive_midspan.as_required_cm2,
            design.negative_right.as_required_cm2,
            design.positive_midspan.regime.display_name()
        );
        println!(
            "  Shear:   Vsd = {:.2} kN  VRd2 = {:.2} kN  asw = {:.4} cm²/cm {}",
            design.shear.vsd_kn,
            design.shear.vrd2_kn,
            design.shear.asw_s_cm2_cm,
            status_icon(design.shear.strut.is_ok())
        );
    }

    if let Some(sls) = &span.serviceability {
        println!(
            "  Cracks:  wk = {:.3} mm (limit {:.2}) {}",
            sls.wk_mm,
            sls.wk_limit_mm,
            status_icon(sls.crack_status.is_pass())
        );
        println!(
            "  Deflect: {:.2} mm (limit {:.2}) {}",
            sls.deflection_total_mm,
            sls.deflection_limit_mm,
            status_icon(sls.deflection_status.is_pass())
        );
    }

    if let Some(d) = &span.detailing {
        println!(
            "  Bars:    bottom {}  top {} / {}",
            d.positive.describe(),
            d.negative_left.describe(),
            d.negative_right.describe()
        );
        println!(
            "  Stirrup: {}  skin {} x Ø{:.0}",
            d.stirrups.describe(),
            d.skin.count,
            d.skin.diameter_mm
        );
    }
}

fn print_optimization(report: &OptimizationReport) {
    println!("{}", RULE);
    println!("  BEAM {} HEIGHT OPTIMIZATION", report.beam_id);
    println!("{}", RULE);
    println!();
    println!("  h (cm)   steel (kg)   concrete (m³)   formwork (m²)      cost  status");
    for t in &report.trials {
        println!(
            "  {:>6.0}   {:>10.2}   {:>13.3}   {:>13.2}   {:>7.2}  {}",
            t.height_cm,
            t.steel_kg,
            t.concrete_m3,
            t.formwork_m2,
            t.cost,
            t.status.display_name()
        );
    }
    println!();
    println!(
        "Original: h = {:.0} cm, cost {:.2} ({})",
        report.original.height_cm,
        report.original.cost,
        report.original.status.display_name()
    );
    println!("Best:     h = {:.0} cm, cost {:.2}", report.best.height_cm, report.best.cost);
    println!();
    println!("{}", RULE);
    println!("  {}", report.recommendation);
    println!("{}", RULE);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::SupportArg;

    fn args(spans: Vec<f64>) -> BeamArgs {
        BeamArgs {
            id: "V1".to_string(),
            spans,
            bw: 20.0,
            height: 50.0,
            fck: 30.0,
            fyk: 500.0,
            load: 15.0,
            supports: Vec::new(),
            self_weight: false,
            settings: None,
            json: false,
        }
    }

    #[test]
    fn test_build_beam_defaults_to_pinned() {
        let beam = build_beam(&args(vec![5.0, 6.0]), &DesignSettings::default()).expect("Beam should build");
        assert_eq!(beam.spans.len(), 2);
        assert_eq!(beam.nodes.len(), 3);
        assert!((beam.nodes[2].x_m - 11.0).abs() < 1e-12);
        assert!(beam.nodes.iter().all(|n| n.restraints.vertical && !n.restraints.rotation));
        assert_eq!(beam.spans[0].material.name, "C30");
    }

    #[test]
    fn test_build_beam_support_count_mismatch() {
        let mut a = args(vec![5.0, 6.0]);
        a.supports = vec![SupportArg::Fixed, SupportArg::Pinned];
        assert!(build_beam(&a, &DesignSettings::default()).is_err());
    }

    #[test]
    fn test_build_beam_unknown_concrete_class() {
        let mut a = args(vec![5.0]);
        a.fck = 27.0;
        assert!(build_beam(&a, &DesignSettings::default()).is_err());
    }

    #[test]
    fn test_self_weight_flag() {
        let mut a = args(vec![5.0]);
        a.self_weight = true;
        let beam = build_beam(&a, &DesignSettings::default()).unwrap();
        // 0.2 x 0.5 x 25 = 2.5 kN/m on top of the applied 15
        assert!((beam.spans[0].distributed_load() - 17.5).abs() < 1e-9);
    }

    #[test]
    fn test_settings_file_is_used() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let mut settings = DesignSettings::default();
        settings.serviceability.deflection_span_ratio = 500.0;
        settings.save(&path).unwrap();

        let mut a = args(vec![5.0]);
        a.settings = Some(path);
        let loaded = load_settings(&a).unwrap();
        assert_eq!(loaded.serviceability.deflection_span_ratio, 500.0);
    }
}
