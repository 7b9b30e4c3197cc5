//! Cortex CLI - compute secondary features from raw sensor records
//!
//! Commands:
//! - compute: Run a registered feature for one participant and window
//! - features: List registered features and their dependencies
//! - validate: Validate raw sensor records
//! - doctor: Diagnose configuration and environment

use chrono::{DateTime, NaiveDate};
use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use cortex_secondary::encoder::{FeatureReport, ReportEncoder};
use cortex_secondary::registry::FeatureInfo;
use cortex_secondary::source::{RawRecord, RecordAdapter};
use cortex_secondary::{
    ComputeError, CortexConfig, FeatureContext, FeatureOptions, FeatureRegistry, FeatureRequest,
    LogSink, MemorySource, CORTEX_VERSION, PRODUCER_NAME,
};

/// Cortex - secondary behavioral-health features from raw sensor streams
#[derive(Parser)]
#[command(name = "cortex")]
#[command(version = CORTEX_VERSION)]
#[command(about = "Compute secondary features from raw sensor data", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a registered feature for one participant and window
    Compute {
        /// Feature name (e.g. cortex.feature.data_quality)
        #[arg(short, long)]
        feature: String,

        /// Raw records file (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Input format
        #[arg(long, default_value = "ndjson")]
        input_format: InputFormat,

        /// Participant id
        #[arg(short, long)]
        participant: String,

        /// Window start: epoch ms, RFC 3339, or YYYY-MM-DD
        #[arg(long)]
        start: String,

        /// Window end: epoch ms, RFC 3339, or YYYY-MM-DD
        #[arg(long)]
        end: String,

        /// Sensor to evaluate (data quality)
        #[arg(long)]
        sensor: Option<String>,

        /// Bin width in ms (data quality)
        #[arg(long, allow_hyphen_values = true)]
        bin_size: Option<i64>,

        /// Lookback in ms (Fréchet)
        #[arg(long, allow_hyphen_values = true)]
        lookback_ms: Option<i64>,

        /// Configuration file (JSON)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output format
        #[arg(long, default_value = "json-pretty")]
        output_format: OutputFormat,
    },

    /// List registered features and their dependencies
    Features {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate raw sensor records
    Validate {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Input format
        #[arg(long, default_value = "ndjson")]
        input_format: InputFormat,

        /// Output validation report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Diagnose configuration and environment
    Doctor {
        /// Check configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, ValueEnum)]
enum InputFormat {
    /// Newline-delimited JSON (one record per line)
    Ndjson,
    /// JSON array of records
    Json,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Single-line JSON
    Json,
    /// Pretty-printed JSON
    JsonPretty,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), CortexCliError> {
    match cli.command {
        Commands::Compute {
            feature,
            input,
            input_format,
            participant,
            start,
            end,
            sensor,
            bin_size,
            lookback_ms,
            config,
            output_format,
        } => {
            let request = FeatureRequest::new(participant, parse_time(&start)?, parse_time(&end)?);
            let options = FeatureOptions {
                sensor,
                bin_size,
                lookback_ms,
            };
            cmd_compute(
                &feature,
                &input,
                input_format,
                &request,
                &options,
                config.as_deref(),
                output_format,
            )
        }

        Commands::Features { json } => cmd_features(json),

        Commands::Validate {
            input,
            input_format,
            json,
        } => cmd_validate(&input, input_format, json),

        Commands::Doctor { config, json } => cmd_doctor(config.as_deref(), json),
    }
}

fn cmd_compute(
    feature: &str,
    input: &Path,
    input_format: InputFormat,
    request: &FeatureRequest,
    options: &FeatureOptions,
    config: Option<&Path>,
    output_format: OutputFormat,
) -> Result<(), CortexCliError> {
    let registry = FeatureRegistry::global();
    if !registry.contains(feature) {
        return Err(ComputeError::UnknownFeature(feature.to_string()).into());
    }

    let config = match config {
        Some(path) => CortexConfig::from_json(&fs::read_to_string(path)?)?,
        None => CortexConfig::default(),
    };

    let records = read_records(input, &input_format)?;
    let source = MemorySource::from_records(records)?;

    let sink = LogSink;
    let ctx = FeatureContext::new(&source, &sink, &config);
    let result = registry.compute(feature, &ctx, request, options)?;

    let report = ReportEncoder::new().encode(feature, request, result);
    println!("{}", format_report(&report, &output_format)?);

    Ok(())
}

fn cmd_features(json: bool) -> Result<(), CortexCliError> {
    let features: Vec<FeatureInfo> = FeatureRegistry::global()
        .iter()
        .map(|d| d.info())
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&features)?);
    } else {
        println!("Registered features");
        println!("===================");
        for feature in &features {
            println!("  {}", feature.name);
            println!("    depends on: {}", feature.dependencies.join(", "));
        }
    }

    Ok(())
}

fn cmd_validate(input: &Path, input_format: InputFormat, json: bool) -> Result<(), CortexCliError> {
    let records = read_records(input, &input_format)?;
    let failures = RecordAdapter::validate_records(&records);

    let report = ValidationReport {
        total_records: records.len(),
        valid_records: records.len() - failures.len(),
        invalid_records: failures.len(),
        errors: failures
            .iter()
            .map(|f| ValidationErrorDetail {
                index: f.index,
                participant: f.participant.clone(),
                error: f.error.to_string(),
            })
            .collect(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Validation Report");
        println!("=================");
        println!("Total records:   {}", report.total_records);
        println!("Valid records:   {}", report.valid_records);
        println!("Invalid records: {}", report.invalid_records);

        if !report.errors.is_empty() {
            println!("\nErrors:");
            for err in &report.errors {
                println!(
                    "  - Record {} (participant {}): {}",
                    err.index, err.participant, err.error
                );
            }
        }
    }

    if report.invalid_records > 0 {
        Err(CortexCliError::ValidationFailed(report.invalid_records))
    } else {
        Ok(())
    }
}

fn cmd_doctor(config: Option<&Path>, json: bool) -> Result<(), CortexCliError> {
    let mut checks: Vec<DoctorCheck> = Vec::new();

    checks.push(DoctorCheck {
        name: "version".to_string(),
        status: CheckStatus::Ok,
        message: format!("{} {}", PRODUCER_NAME, CORTEX_VERSION),
    });

    let registry = FeatureRegistry::global();
    checks.push(DoctorCheck {
        name: "registry".to_string(),
        status: if registry.is_empty() {
            CheckStatus::Warning
        } else {
            CheckStatus::Ok
        },
        message: format!(
            "{} features registered: {}",
            registry.len(),
            registry.names().join(", ")
        ),
    });

    if let Some(config_path) = config {
        let check = if !config_path.exists() {
            DoctorCheck {
                name: "config".to_string(),
                status: CheckStatus::Warning,
                message: "Configuration file does not exist".to_string(),
            }
        } else {
            match fs::read_to_string(config_path) {
                Ok(content) => match CortexConfig::from_json(&content) {
                    Ok(cfg) => DoctorCheck {
                        name: "config".to_string(),
                        status: CheckStatus::Ok,
                        message: format!(
                            "Configuration valid (accelerometer bin {}ms, gps bin {}ms, lookback {}ms)",
                            cfg.accelerometer_bin_ms, cfg.gps_bin_ms, cfg.frechet_lookback_ms
                        ),
                    },
                    Err(e) => DoctorCheck {
                        name: "config".to_string(),
                        status: CheckStatus::Error,
                        message: format!("Invalid configuration: {}", e),
                    },
                },
                Err(e) => DoctorCheck {
                    name: "config".to_string(),
                    status: CheckStatus::Error,
                    message: format!("Cannot read configuration file: {}", e),
                },
            }
        };
        checks.push(check);
    }

    let stdin_check = if atty::is(atty::Stream::Stdin) {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a TTY (pass records with --input <file>)".to_string(),
        }
    } else {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a pipe (--input - ready)".to_string(),
        }
    };
    checks.push(stdin_check);

    let report = DoctorReport {
        producer: PRODUCER_NAME.to_string(),
        version: CORTEX_VERSION.to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Cortex Doctor Report");
        println!("====================");
        println!("Producer: {}", report.producer);
        println!("Version:  {}", report.version);
        println!("\nChecks:");

        for check in &report.checks {
            let status_icon = match check.status {
                CheckStatus::Ok => "[OK]",
                CheckStatus::Warning => "[WARN]",
                CheckStatus::Error => "[ERR]",
            };
            println!("  {} {}: {}", status_icon, check.name, check.message);
        }
    }

    let has_errors = report
        .checks
        .iter()
        .any(|c| matches!(c.status, CheckStatus::Error));
    if has_errors {
        Err(CortexCliError::DoctorFailed)
    } else {
        Ok(())
    }
}

// Helper functions

fn read_records(input: &Path, format: &InputFormat) -> Result<Vec<RawRecord>, CortexCliError> {
    let input_data = if input.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else {
        fs::read_to_string(input)?
    };

    let records = match format {
        InputFormat::Ndjson => RecordAdapter::parse_ndjson(&input_data)?,
        InputFormat::Json => RecordAdapter::parse_array(&input_data)?,
    };
    Ok(records)
}

/// Accepts epoch milliseconds, RFC 3339, or a bare UTC date
fn parse_time(value: &str) -> Result<i64, CortexCliError> {
    let trimmed = value.trim();
    if let Ok(ms) = trimmed.parse::<i64>() {
        return Ok(ms);
    }
    if let Ok(t) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(t.timestamp_millis());
    }
    if let Some(t) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
    {
        return Ok(t.and_utc().timestamp_millis());
    }
    Err(CortexCliError::InvalidTime(value.to_string()))
}

fn format_report(report: &FeatureReport, format: &OutputFormat) -> Result<String, CortexCliError> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string(report)?),
        OutputFormat::JsonPretty => Ok(serde_json::to_string_pretty(report)?),
    }
}

// Error types

#[derive(Debug)]
enum CortexCliError {
    Io(io::Error),
    Compute(ComputeError),
    Json(serde_json::Error),
    InvalidTime(String),
    ValidationFailed(usize),
    DoctorFailed,
}

impl From<io::Error> for CortexCliError {
    fn from(e: io::Error) -> Self {
        CortexCliError::Io(e)
    }
}

impl From<ComputeError> for CortexCliError {
    fn from(e: ComputeError) -> Self {
        CortexCliError::Compute(e)
    }
}

impl From<serde_json::Error> for CortexCliError {
    fn from(e: serde_json::Error) -> Self {
        CortexCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<CortexCliError> for CliError {
    fn from(e: CortexCliError) -> Self {
        match e {
            CortexCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            CortexCliError::Compute(e) => {
                let (code, hint) = match &e {
                    ComputeError::InvalidWindow { .. } => (
                        "INVALID_WINDOW",
                        "Ensure end > start and a positive bin size",
                    ),
                    ComputeError::UnknownFeature(_) => (
                        "UNKNOWN_FEATURE",
                        "Run 'cortex features' to list registered features",
                    ),
                    ComputeError::InvalidRecord(_)
                    | ComputeError::ParseError(_)
                    | ComputeError::JsonError(_) => (
                        "PARSE_ERROR",
                        "Run 'cortex validate' for details",
                    ),
                    ComputeError::InvalidConfig(_) => (
                        "CONFIG_ERROR",
                        "Run 'cortex doctor --config <file>' for details",
                    ),
                    _ => ("COMPUTE_ERROR", "Check the input and retry"),
                };
                CliError {
                    code: code.to_string(),
                    message: e.to_string(),
                    hint: Some(hint.to_string()),
                }
            }
            CortexCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            CortexCliError::InvalidTime(value) => CliError {
                code: "INVALID_TIME".to_string(),
                message: format!("Cannot parse time '{}'", value),
                hint: Some("Use epoch milliseconds, RFC 3339, or YYYY-MM-DD".to_string()),
            },
            CortexCliError::ValidationFailed(count) => CliError {
                code: "VALIDATION_FAILED".to_string(),
                message: format!("{} records failed validation", count),
                hint: Some("Fix validation errors and retry".to_string()),
            },
            CortexCliError::DoctorFailed => CliError {
                code: "DOCTOR_FAILED".to_string(),
                message: "One or more health checks failed".to_string(),
                hint: Some("Review the doctor report for details".to_string()),
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct ValidationReport {
    total_records: usize,
    valid_records: usize,
    invalid_records: usize,
    errors: Vec<ValidationErrorDetail>,
}

#[derive(serde::Serialize)]
struct ValidationErrorDetail {
    index: usize,
    participant: String,
    error: String,
}

#[derive(serde::Serialize)]
struct DoctorReport {
    producer: String,
    version: String,
    checks: Vec<DoctorCheck>,
}

#[derive(serde::Serialize)]
struct DoctorCheck {
    name: String,
    status: CheckStatus,
    message: String,
}

#[derive(serde::Serialize)]
enum CheckStatus {
    Ok,
    Warning,
    Error,
}
