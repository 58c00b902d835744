use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use duty_audit::audit::{AuditError, run_audit};
use duty_audit::breaks::infer_breaks;
use duty_audit::config::AuditConfig;
use duty_audit::document::{LoadError, load_dataset, load_document, write_document};
use duty_audit::domain::{Dataset, DutyEventType, DutyId, SchemaError, VehicleEventType};
use duty_audit::fixture::{SubsetError, subset_document};
use duty_audit::index::ReferenceIndex;
use duty_audit::report::{BreakPolicy, OutputFormat, Report, ReportError, ReportKind};

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Validate crew and vehicle schedules and infer their breaks"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Clone, Debug)]
enum Commands {
    #[command(about = "Check a dataset against every rule")]
    Validate(AuditArgs),

    #[command(about = "Infer layovers and splits for every duty")]
    Breaks(AuditArgs),

    #[command(about = "Write a duty report as CSV, tab-separated text or xlsx")]
    Report(ReportArgs),

    #[command(about = "Reduce a dataset to some duties and what they reference")]
    Subset(SubsetArgs),
}

#[derive(Args, Clone, Debug)]
struct InputArgs {
    #[arg(
        short = 'i',
        long,
        env = "DUTY_AUDIT_INPUT",
        help = "The scheduling dataset (JSON)."
    )]
    input: PathBuf,
}

#[derive(Args, Clone, Debug)]
struct AuditArgs {
    #[command(flatten)]
    input: InputArgs,

    #[arg(long, help = "Print the report as JSON.")]
    json: bool,

    #[arg(
        long,
        env = "DUTY_AUDIT_SEQUENTIAL",
        help = "Run on the current thread only."
    )]
    sequential: bool,

    #[arg(
        long,
        env = "DUTY_AUDIT_BATCH_SIZE",
        default_value_t = AuditConfig::default().batch_size,
        help = "Duties per inference task."
    )]
    batch_size: usize,
}

impl AuditArgs {
    fn config(&self) -> AuditConfig {
        AuditConfig::new(!self.sequential, self.batch_size)
    }
}

#[derive(Args, Clone, Debug)]
struct ReportArgs {
    #[command(flatten)]
    input: InputArgs,

    #[arg(
        short = 'k',
        long,
        default_value = "duty_breaks",
        help = "duty_start_end_times, duty_start_end_times_and_stops or duty_breaks."
    )]
    kind: ReportKind,

    #[arg(
        short = 'o',
        long,
        help = "The file to write; the format's extension is added if missing."
    )]
    output: PathBuf,

    #[arg(
        short = 'f',
        long,
        env = "DUTY_AUDIT_FORMAT",
        default_value = "csv",
        help = "csv, txt (tab-separated) or xlsx."
    )]
    format: OutputFormat,

    #[arg(
        long,
        env = "DUTY_AUDIT_MIN_BREAK_MINS",
        default_value_t = BreakPolicy::default().min_duration_mins,
        help = "Breaks shorter than this are left out."
    )]
    min_break_mins: i64,

    #[arg(
        long = "break-type",
        help = "A vehicle or duty event type that counts as a break. Repeatable."
    )]
    break_types: Vec<String>,
}

impl ReportArgs {
    fn policy(&self) -> Result<BreakPolicy, CliError> {
        let mut vehicle_types = Vec::new();
        let mut duty_types = Vec::new();
        for name in &self.break_types {
            if let Ok(kind) = name.parse::<VehicleEventType>() {
                vehicle_types.push(kind);
            } else if let Ok(kind) = name.parse::<DutyEventType>() {
                duty_types.push(kind);
            } else {
                return Err(CliError::BreakType(name.clone()));
            }
        }
        Ok(BreakPolicy::new(self.min_break_mins, vehicle_types, duty_types))
    }
}

#[derive(Args, Clone, Debug)]
struct SubsetArgs {
    #[command(flatten)]
    input: InputArgs,

    #[arg(short = 'o', long, help = "The file to write the reduced dataset to.")]
    output: PathBuf,

    #[arg(short = 'd', long = "duty", required = true, help = "A duty to keep. Repeatable.")]
    duties: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Audit(#[from] AuditError),

    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Report(#[from] ReportError),

    #[error(transparent)]
    Subset(#[from] SubsetError),

    #[error("JSON output error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unknown break type: {0:?}")]
    BreakType(String),
}

#[tokio::main]
async fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match &cli.command {
        Commands::Validate(args) => main_validate(args).await,
        Commands::Breaks(args) => main_breaks(args).await,
        Commands::Report(args) => main_report(args).await,
        Commands::Subset(args) => main_subset(args).await,
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn main_validate(args: &AuditArgs) -> Result<ExitCode, CliError> {
    let dataset = Arc::new(load_dataset(&args.input.input).await?);
    let report = run_audit(dataset, &args.config()).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report.violations)?);
    } else {
        for violation in &report.violations {
            println!("{violation}");
        }
        println!("{} violation(s)", report.violations.len());
    }

    Ok(if report.is_clean() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

async fn main_breaks(args: &AuditArgs) -> Result<ExitCode, CliError> {
    let dataset = Arc::new(load_dataset(&args.input.input).await?);
    let report = run_audit(dataset, &args.config()).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report.breaks)?);
    } else {
        for inferred in &report.breaks {
            println!("{inferred}");
        }
        println!("{} break(s)", report.breaks.len());
    }

    if !report.is_clean() {
        info!(
            violations = report.violations.len(),
            "Dataset has violations; run validate for details"
        );
    }
    Ok(ExitCode::SUCCESS)
}

async fn main_report(args: &ReportArgs) -> Result<ExitCode, CliError> {
    let policy = args.policy()?;
    let dataset: Dataset = load_dataset(&args.input.input).await?;
    let index = ReferenceIndex::build(&dataset)?;
    let inferred = infer_breaks(&dataset, &index);

    let report = Report::build(args.kind, &dataset, &index, &inferred, &policy);
    let path = report.save(&args.output, args.format).await?;
    println!("Wrote {} row(s) to {}", report.len(), path.display());
    Ok(ExitCode::SUCCESS)
}

async fn main_subset(args: &SubsetArgs) -> Result<ExitCode, CliError> {
    let document = load_document(&args.input.input).await?;
    let duty_ids: Vec<DutyId> = args.duties.iter().map(DutyId::new).collect();
    let subset = subset_document(&document, &duty_ids)?;

    // The subset must still convert; catch that before writing it
    Dataset::from_document(&subset)?;

    write_document(&args.output, &subset).await?;
    println!(
        "Wrote {} duty(ies) to {}",
        duty_ids.len(),
        args.output.display()
    );
    Ok(ExitCode::SUCCESS)
}
