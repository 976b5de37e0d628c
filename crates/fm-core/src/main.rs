//! fm-test: Farrington-Manning score test CLI.
//!
//! stdout carries the result payload; logs and errors go to stderr.

use clap::{Args, Parser, Subcommand};
use fm_common::{Error, OutputFormat, Result};
use fm_core::exit_codes::ExitCode;
use fm_core::logging::{init_logging, LogConfig, LogLevel};
use fm_core::output::{render_error, render_result};
use fm_core::{
    parse_alternative, parse_group, Alternative, ScoreTest, Settings, TestRequest, Variant,
};
use std::io::IsTerminal;
use std::path::PathBuf;

/// Farrington-Manning score test for comparing two groups under a shifted null
#[derive(Parser)]
#[command(name = "fm-test")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalOpts,
}

/// Global options available to all commands
#[derive(Args, Debug)]
struct GlobalOpts {
    /// Settings file (TOML)
    #[arg(long, global = true, env = "FM_CONFIG")]
    config: Option<PathBuf>,

    /// Output format [default: from settings, else json]
    #[arg(long, short = 'f', global = true)]
    format: Option<OutputFormat>,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Test two binomial groups from event counts and totals
    Counts(CountsArgs),
    /// Test two Poisson groups from event counts and person-time
    Rates(RatesArgs),
    /// Test two groups from outcome lists (1/0, true/false, yes/no, ...)
    Outcomes(OutcomesArgs),
    /// Print the resolved settings as TOML
    Config,
}

/// Null hypothesis and alternative shared by the binomial commands
#[derive(Args, Debug)]
struct HypothesisArgs {
    /// Null risk difference p1 - p2, in (-1, 1)
    #[arg(long, allow_negative_numbers = true, conflicts_with = "rho")]
    delta: Option<f64>,

    /// Null ratio p1 / p2 (or r1 / r2), > 0
    #[arg(long, allow_negative_numbers = true)]
    rho: Option<f64>,

    /// Alternative hypothesis: two-sided, greater, less
    #[arg(long, short = 'a')]
    alternative: Option<String>,

    /// Slack for accepting a likelihood root at the admissible boundary
    #[arg(long)]
    root_tolerance: Option<f64>,
}

#[derive(Args, Debug)]
struct CountsArgs {
    /// Events in group 1
    #[arg(allow_negative_numbers = true)]
    x1: f64,

    /// Total in group 1
    #[arg(allow_negative_numbers = true)]
    n1: f64,

    /// Events in group 2
    #[arg(allow_negative_numbers = true)]
    x2: f64,

    /// Total in group 2
    #[arg(allow_negative_numbers = true)]
    n2: f64,

    /// Comparison to test [default: picked by --delta/--rho, else settings]
    #[arg(long)]
    variant: Option<Variant>,

    /// Treat the totals as person-time (same as --variant rate-ratio)
    #[arg(long, conflicts_with = "variant")]
    poisson: bool,

    #[command(flatten)]
    hypothesis: HypothesisArgs,
}

#[derive(Args, Debug)]
struct RatesArgs {
    /// Events in group 1
    #[arg(allow_negative_numbers = true)]
    x1: f64,

    /// Person-time in group 1
    #[arg(allow_negative_numbers = true)]
    t1: f64,

    /// Events in group 2
    #[arg(allow_negative_numbers = true)]
    x2: f64,

    /// Person-time in group 2
    #[arg(allow_negative_numbers = true)]
    t2: f64,

    /// Null rate ratio r1 / r2, > 0
    #[arg(long, allow_negative_numbers = true)]
    rho: Option<f64>,

    /// Alternative hypothesis: two-sided, greater, less
    #[arg(long, short = 'a')]
    alternative: Option<String>,
}

#[derive(Args, Debug)]
struct OutcomesArgs {
    /// Outcomes in group 1, comma or space separated
    #[arg(long)]
    first: String,

    /// Outcomes in group 2, comma or space separated
    #[arg(long)]
    second: String,

    #[command(flatten)]
    hypothesis: HypothesisArgs,
}

fn main() {
    let cli = Cli::parse();

    let settings = Settings::resolve(cli.global.config.as_deref()).map_err(Error::from);

    let cli_level = if cli.global.quiet {
        Some(LogLevel::Error)
    } else {
        match cli.global.verbose {
            0 => None,
            1 => Some(LogLevel::Debug),
            _ => Some(LogLevel::Trace),
        }
    };
    let base_log = settings.as_ref().map(|s| s.log).unwrap_or_default();
    init_logging(&LogConfig::from_env(base_log, cli_level));

    let format = cli
        .global
        .format
        .or_else(|| settings.as_ref().ok().map(|s| s.output.format))
        .unwrap_or_default();

    let exit_code = match settings.and_then(|settings| run(&cli.command, settings, format)) {
        Ok(text) => {
            println!("{text}");
            ExitCode::Clean
        }
        Err(err) => output_error(&err, format),
    };

    std::process::exit(exit_code.as_i32());
}

fn run(command: &Commands, settings: Settings, format: OutputFormat) -> Result<String> {
    let precision = settings.output.precision;
    match command {
        Commands::Counts(args) => {
            let settings = apply_tolerance(settings, &args.hypothesis)?;
            let variant = if args.poisson {
                Variant::RateRatio
            } else {
                resolve_variant(args.variant, &args.hypothesis, settings.test.variant)
            };
            let mut request = TestRequest::new(variant, args.x1, args.n1, args.x2, args.n2);
            request.null_value = args.hypothesis.delta.or(args.hypothesis.rho);
            request.alternative = parse_optional_alternative(args.hypothesis.alternative.as_deref())?;
            check_null_matches(variant, &args.hypothesis)?;
            run_request(&settings, &request, format, precision)
        }
        Commands::Rates(args) => {
            let mut request = TestRequest::new(Variant::RateRatio, args.x1, args.t1, args.x2, args.t2);
            request.null_value = args.rho;
            request.alternative = parse_optional_alternative(args.alternative.as_deref())?;
            run_request(&settings, &request, format, precision)
        }
        Commands::Outcomes(args) => {
            let settings = apply_tolerance(settings, &args.hypothesis)?;
            let default = match settings.test.variant {
                Variant::RateRatio => Variant::RiskDifference,
                binomial => binomial,
            };
            let variant = resolve_variant(None, &args.hypothesis, default);
            check_null_matches(variant, &args.hypothesis)?;
            let first = parse_group(&args.first, "first")?;
            let second = parse_group(&args.second, "second")?;
            tracing::debug!(
                first_events = first.events,
                first_total = first.total,
                second_events = second.events,
                second_total = second.total,
                "reduced outcomes to counts"
            );
            let mut request = TestRequest::new(
                variant,
                first.events as f64,
                first.total as f64,
                second.events as f64,
                second.total as f64,
            );
            request.null_value = args.hypothesis.delta.or(args.hypothesis.rho);
            request.alternative = parse_optional_alternative(args.hypothesis.alternative.as_deref())?;
            run_request(&settings, &request, format, precision)
        }
        Commands::Config => settings.to_toml(),
    }
}

fn run_request(
    settings: &Settings,
    request: &TestRequest,
    format: OutputFormat,
    precision: usize,
) -> Result<String> {
    let result = ScoreTest::new(settings.test).run(request)?;
    render_result(&result, format, precision)
}

/// Pick the variant: explicit flag, else the null parameter given, else settings.
fn resolve_variant(
    explicit: Option<Variant>,
    hypothesis: &HypothesisArgs,
    default: Variant,
) -> Variant {
    match (explicit, hypothesis.delta, hypothesis.rho) {
        (Some(variant), _, _) => variant,
        (None, Some(_), _) => Variant::RiskDifference,
        (None, None, Some(_)) if default == Variant::RiskDifference => Variant::RiskRatio,
        (None, _, _) => default,
    }
}

fn check_null_matches(variant: Variant, hypothesis: &HypothesisArgs) -> Result<()> {
    if hypothesis.delta.is_some() && variant != Variant::RiskDifference {
        return Err(Error::invalid(
            "delta",
            format!("--delta applies to risk-difference, not {variant}; use --rho"),
        ));
    }
    if hypothesis.rho.is_some() && variant == Variant::RiskDifference {
        return Err(Error::invalid(
            "rho",
            "--rho applies to the ratio variants; use --delta for risk-difference",
        ));
    }
    Ok(())
}

fn apply_tolerance(mut settings: Settings, hypothesis: &HypothesisArgs) -> Result<Settings> {
    if let Some(tol) = hypothesis.root_tolerance {
        settings.test.root_tolerance = tol;
        settings
            .validate()
            .map_err(|e| Error::invalid("root_tolerance", e.to_string()))?;
    }
    Ok(settings)
}

fn parse_optional_alternative(value: Option<&str>) -> Result<Option<Alternative>> {
    value.map(parse_alternative).transpose()
}

/// Print an error to stderr in the requested format.
fn output_error(err: &Error, format: OutputFormat) -> ExitCode {
    let exit_code = ExitCode::from(err);
    if exit_code.is_internal_error() {
        tracing::warn!(code = err.code(), exit = exit_code.code_name(), "command failed");
    } else {
        tracing::debug!(code = err.code(), exit = exit_code.code_name(), "command failed");
    }

    eprintln!(
        "{}",
        render_error(err, format, std::io::stderr().is_terminal())
    );
    exit_code
}
