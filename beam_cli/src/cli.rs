use std::path::PathBuf;

use beam_core::calculations::SupportType;
use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Analyse, design and optimize continuous reinforced-concrete beams"
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a file in addition to stderr
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Number of worker threads for the optimizer.
    /// Defaults to the number of logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Solve, design, check and detail a beam.
    Analyze(BeamArgs),
    /// Search candidate heights for the cheapest serviceable section.
    Optimize(BeamArgs),
}

/// Beam definition shared by all subcommands.
#[derive(Args, Debug, Clone)]
pub struct BeamArgs {
    /// Beam identifier used in reports.
    #[arg(long, default_value = "V1")]
    pub id: String,

    /// Span lengths in metres, comma separated (e.g. 5,6.5,5).
    #[arg(short, long, required = true, value_delimiter = ',', value_name = "M,...")]
    pub spans: Vec<f64>,

    /// Web width (cm).
    #[arg(long, default_value_t = 20.0, value_name = "CM")]
    pub bw: f64,

    /// Section height (cm).
    #[arg(long, default_value_t = 50.0, value_name = "CM")]
    pub height: f64,

    /// Concrete characteristic strength (MPa); must be a standard class.
    #[arg(long, default_value_t = 25.0, value_name = "MPA")]
    pub fck: f64,

    /// Reinforcement yield strength (MPa).
    #[arg(long, default_value_t = 500.0, value_name = "MPA")]
    pub fyk: f64,

    /// Uniform load on every span (kN/m), excluding self-weight.
    #[arg(short, long, required = true, value_name = "KN/M")]
    pub load: f64,

    /// Support at each node, comma separated, one more than spans.
    /// Defaults to pinned everywhere.
    #[arg(long, value_delimiter = ',', value_name = "SUPPORT,...")]
    pub supports: Vec<SupportArg>,

    /// Add the section's self-weight to every span.
    #[arg(long)]
    pub self_weight: bool,

    /// Design settings JSON file; missing sections use the defaults.
    #[arg(long, value_name = "PATH")]
    pub settings: Option<PathBuf>,

    /// Print the result as JSON instead of the text report.
    #[arg(long)]
    pub json: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupportArg {
    Pinned,
    Fixed,
    Free,
}

impl From<SupportArg> for SupportType {
    fn from(arg: SupportArg) -> Self {
        match arg {
            SupportArg::Pinned => SupportType::Pinned,
            SupportArg::Fixed => SupportType::Fixed,
            SupportArg::Free => SupportType::Free,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_analyze() {
        let cli = Cli::try_parse_from([
            "beam_cli", "-vv", "analyze", "--spans", "5,6.5", "--load", "15", "--supports",
            "fixed,pinned,free", "--height", "55",
        ])
        .expect("Arguments should parse");

        assert_eq!(cli.verbose, 2);
        let Commands::Analyze(args) = cli.command else {
            panic!("Expected analyze");
        };
        assert_eq!(args.spans, vec![5.0, 6.5]);
        assert_eq!(args.height, 55.0);
        assert_eq!(args.bw, 20.0);
        assert_eq!(
            args.supports,
            vec![SupportArg::Fixed, SupportArg::Pinned, SupportArg::Free]
        );
        assert!(!args.json);
    }

    #[test]
    fn test_spans_required() {
        assert!(Cli::try_parse_from(["beam_cli", "optimize", "--load", "10"]).is_err());
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        let result = Cli::try_parse_from(["beam_cli", "-q", "-v", "analyze", "-s", "5", "-l", "10"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_support_conversion() {
        assert_eq!(SupportType::from(SupportArg::Fixed), SupportType::Fixed);
        assert_eq!(SupportType::from(SupportArg::Free), SupportType::Free);
    }
}
