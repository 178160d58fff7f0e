//! vglm CLI - Command-line interface for violation-glm
//!
//! Commands:
//! - derive: Add history features to trial records
//! - design: Build per-animal design matrices
//! - summary: Print per-animal and per-column summary statistics
//! - validate: Validate trial records
//! - doctor: Diagnose data locations and configuration
//! - schema: Print input/output schema information

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use violation_glm::adapters::{
    DatasetSource, FileSource, InputFormat, MemorySource, RecordParser, TrialSource,
};
use violation_glm::config::{DataConfig, DataMode, DEFAULT_DATASET};
use violation_glm::exp_filter::{ExpFilterSpec, StimViolationInteraction};
use violation_glm::summary::{summarize_matrix, summarize_trials, AnimalSummary, ColumnSummary};
use violation_glm::types::{DesignPayload, TrialRecord};
use violation_glm::{
    DesignConfig, DesignError, DesignPipeline, FilterParams, LabelMode, PRODUCER_NAME,
    VGLM_VERSION,
};

/// vglm - Trial history features and design matrices for violation GLMs
#[derive(Parser)]
#[command(name = "vglm")]
#[command(version = VGLM_VERSION)]
#[command(about = "Build trial-history design matrices", long_about = None)]
struct Cli {
    /// Log level when RUST_LOG is not set (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add history features to trial records (NDJSON output)
    Derive {
        #[command(flatten)]
        source: SourceArgs,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,
    },

    /// Build one design matrix per animal
    Design {
        #[command(flatten)]
        source: SourceArgs,

        #[command(flatten)]
        design: DesignArgs,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// Output format
        #[arg(long, default_value = "ndjson")]
        output_format: OutputFormat,
    },

    /// Print per-animal and per-column summary statistics
    Summary {
        #[command(flatten)]
        source: SourceArgs,

        #[command(flatten)]
        design: DesignArgs,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate trial records
    Validate {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Input format (inferred from the extension when omitted)
        #[arg(long)]
        input_format: Option<InputFormatArg>,

        /// Output validation report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Diagnose data locations and configuration
    Doctor {
        /// Data root (overrides --mode and VGLM_DATA_ROOT)
        #[arg(long)]
        data_root: Option<PathBuf>,

        /// Where to look for data
        #[arg(long, default_value = "local")]
        mode: ModeArg,

        /// Dataset tag
        #[arg(long, default_value = DEFAULT_DATASET)]
        dataset: String,

        /// Design configuration file to check
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print schema information
    Schema {
        /// Schema to print (input or output)
        #[arg(value_enum)]
        schema_type: SchemaType,

        /// Output as JSON schema
        #[arg(long)]
        json_schema: bool,
    },
}

#[derive(Args)]
struct SourceArgs {
    /// Trial file (use - for stdin); when omitted the dataset under the data root is used
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Input format (inferred from the extension when omitted)
    #[arg(long)]
    input_format: Option<InputFormatArg>,

    /// Data root (overrides --mode and VGLM_DATA_ROOT)
    #[arg(long)]
    data_root: Option<PathBuf>,

    /// Where to look for data
    #[arg(long, default_value = "local")]
    mode: ModeArg,

    /// Dataset tag, resolved to processed/{dataset}_data.ndjson
    #[arg(long, default_value = DEFAULT_DATASET)]
    dataset: String,

    /// Animal to include (repeatable; all animals when omitted)
    #[arg(long = "animal")]
    animals: Vec<String>,
}

#[derive(Args)]
struct DesignArgs {
    /// Design configuration JSON file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Row filter as column=value (repeatable, combined with AND)
    #[arg(long = "filter")]
    filters: Vec<String>,

    /// Use prev_violation and prev_trial_not_started instead of prev_disengaged
    #[arg(long)]
    no_disengaged: bool,

    /// Label encoding
    #[arg(long)]
    labels: Option<LabelArg>,

    /// Exponential history filter as column:tau (repeatable)
    #[arg(long = "exp-filter")]
    exp_filters: Vec<String>,

    /// Stimulus x filtered prev_violation term as s_a:tau or s_b:tau (repeatable)
    #[arg(long = "stim-interaction")]
    stim_interactions: Vec<String>,
}

#[derive(Clone, Copy, ValueEnum)]
enum InputFormatArg {
    /// Newline-delimited JSON (one trial per line)
    Ndjson,
    /// JSON array of trials
    Json,
}

impl From<InputFormatArg> for InputFormat {
    fn from(arg: InputFormatArg) -> Self {
        match arg {
            InputFormatArg::Ndjson => InputFormat::Ndjson,
            InputFormatArg::Json => InputFormat::Json,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    /// Local checkout data directory
    Local,
    /// Shared cluster mount
    Cluster,
}

impl From<ModeArg> for DataMode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Local => DataMode::Local,
            ModeArg::Cluster => DataMode::Cluster,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum LabelArg {
    /// Left 0, right 1; violation trials dropped
    Binary,
    /// Left 0, right 1, violation 2
    Multi,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Newline-delimited JSON (one design per line)
    Ndjson,
    /// JSON array of designs
    Json,
    /// Pretty-printed JSON
    JsonPretty,
}

#[derive(Clone, ValueEnum)]
enum SchemaType {
    /// Input schema (trial records)
    Input,
    /// Output schema (design payloads)
    Output,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

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

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn run(cli: Cli) -> Result<(), VglmCliError> {
    match cli.command {
        Commands::Derive { source, output } => cmd_derive(&source, &output),

        Commands::Design {
            source,
            design,
            output,
            output_format,
        } => cmd_design(&source, &design, &output, &output_format),

        Commands::Summary {
            source,
            design,
            json,
        } => cmd_summary(&source, &design, json),

        Commands::Validate {
            input,
            input_format,
            json,
        } => cmd_validate(&input, input_format, json),

        Commands::Doctor {
            data_root,
            mode,
            dataset,
            config,
            json,
        } => cmd_doctor(data_root, mode, &dataset, config.as_deref(), json),

        Commands::Schema {
            schema_type,
            json_schema,
        } => cmd_schema(schema_type, json_schema),
    }
}

fn cmd_derive(source: &SourceArgs, output: &Path) -> Result<(), VglmCliError> {
    let records = load_records(source)?;
    if records.is_empty() {
        return Err(VglmCliError::NoTrials);
    }

    let derived = DesignPipeline::default().derive(records);

    let mut lines = Vec::with_capacity(derived.len());
    for trial in &derived {
        lines.push(serde_json::to_string(trial)?);
    }

    write_output(output, &(lines.join("\n") + "\n"))
}

fn cmd_design(
    source: &SourceArgs,
    args: &DesignArgs,
    output: &Path,
    output_format: &OutputFormat,
) -> Result<(), VglmCliError> {
    let config = build_design_config(args)?;
    let records = load_records(source)?;
    if records.is_empty() {
        return Err(VglmCliError::NoTrials);
    }

    let pipeline = DesignPipeline::new(config);
    let designs = pipeline.run(records)?;

    let mut payloads: Vec<DesignPayload> = Vec::with_capacity(designs.len());
    for design in &designs {
        payloads.push(pipeline.encode(design)?);
    }

    write_output(output, &format_output(&payloads, output_format)?)
}

fn cmd_summary(source: &SourceArgs, args: &DesignArgs, json: bool) -> Result<(), VglmCliError> {
    let config = build_design_config(args)?;
    let records = load_records(source)?;
    if records.is_empty() {
        return Err(VglmCliError::NoTrials);
    }

    let pipeline = DesignPipeline::new(config);
    let derived = pipeline.derive(records);
    let animals = summarize_trials(&derived);
    let designs = pipeline.run_derived(derived)?;

    let report = SummaryReport {
        animals,
        designs: designs
            .iter()
            .map(|d| DesignSummary {
                animal_id: d.animal_id.clone(),
                n_trials: d.matrix.n_rows(),
                columns: summarize_matrix(&d.matrix),
            })
            .collect(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Trial Summary");
    println!("=============");
    for animal in &report.animals {
        println!(
            "{}: {} trials, {} sessions, violation rate {:.3}, not-started rate {:.3}, disengaged rate {:.3}",
            animal.animal_id,
            animal.n_trials,
            animal.n_sessions,
            animal.violation_rate,
            animal.prev_trial_not_started_rate,
            animal.prev_disengaged_rate
        );
    }

    for design in &report.designs {
        println!("\nDesign Matrix: {} ({} rows)", design.animal_id, design.n_trials);
        println!(
            "  {:<28} {:>10} {:>10} {:>10} {:>10}",
            "column", "mean", "std", "min", "max"
        );
        for column in &design.columns {
            println!(
                "  {:<28} {:>10} {:>10} {:>10} {:>10}",
                column.column,
                fmt_stat(column.mean),
                fmt_stat(column.std),
                fmt_stat(column.min),
                fmt_stat(column.max)
            );
        }
    }

    Ok(())
}

fn cmd_validate(
    input: &Path,
    input_format: Option<InputFormatArg>,
    json: bool,
) -> Result<(), VglmCliError> {
    let input_data = read_input(input)?;
    let format = input_format
        .map(InputFormat::from)
        .unwrap_or_else(|| InputFormat::from_path(input));
    let records = format.parse(&input_data)?;

    let results = RecordParser::validate_records(&records);

    let report = ValidationReport {
        total_records: records.len(),
        valid_records: records.len() - results.len(),
        invalid_records: results.len(),
        errors: results
            .iter()
            .map(|r| ValidationErrorDetail {
                index: r.index,
                animal_id: r.animal_id.clone(),
                error: r.error.to_string(),
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
                    "  - Trial for {} (index {}): {}",
                    err.animal_id, err.index, err.error
                );
            }
        }
    }

    if report.invalid_records > 0 {
        Err(VglmCliError::ValidationFailed(report.invalid_records))
    } else {
        Ok(())
    }
}

fn cmd_doctor(
    data_root: Option<PathBuf>,
    mode: ModeArg,
    dataset: &str,
    config: Option<&Path>,
    json: bool,
) -> Result<(), VglmCliError> {
    let mut checks: Vec<DoctorCheck> = Vec::new();

    checks.push(DoctorCheck {
        name: "vglm_version".to_string(),
        status: CheckStatus::Ok,
        message: format!("vglm version {}", VGLM_VERSION),
    });

    let source = dataset_source(data_root, mode);
    let root = source.root();
    checks.push(if root.is_dir() {
        DoctorCheck {
            name: "data_root".to_string(),
            status: CheckStatus::Ok,
            message: format!("Data root {} exists", root.display()),
        }
    } else {
        DoctorCheck {
            name: "data_root".to_string(),
            status: CheckStatus::Warning,
            message: format!("Data root {} does not exist", root.display()),
        }
    });

    let dataset_path = source.dataset_path(dataset);
    checks.push(if dataset_path.is_file() {
        DoctorCheck {
            name: "dataset".to_string(),
            status: CheckStatus::Ok,
            message: format!("Dataset file {} found", dataset_path.display()),
        }
    } else {
        DoctorCheck {
            name: "dataset".to_string(),
            status: CheckStatus::Warning,
            message: format!("Dataset file {} not found", dataset_path.display()),
        }
    });

    if let Some(config_path) = config {
        checks.push(match DesignConfig::from_path(config_path) {
            Ok(config) => DoctorCheck {
                name: "config".to_string(),
                status: CheckStatus::Ok,
                message: format!(
                    "Design config valid ({} filters, {} exp filters)",
                    config.filter_params.len(),
                    config.exp_filters.len()
                ),
            },
            Err(e) => DoctorCheck {
                name: "config".to_string(),
                status: CheckStatus::Error,
                message: format!("Invalid design config: {}", e),
            },
        });
    }

    checks.push(DoctorCheck {
        name: "stdin".to_string(),
        status: CheckStatus::Ok,
        message: if atty::is(atty::Stream::Stdin) {
            "stdin is a TTY (pass --input to read a file)".to_string()
        } else {
            "stdin is a pipe (--input - ready)".to_string()
        },
    });

    let report = DoctorReport {
        producer: PRODUCER_NAME.to_string(),
        version: VGLM_VERSION.to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("vglm Doctor Report");
        println!("==================");
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
        Err(VglmCliError::DoctorFailed)
    } else {
        Ok(())
    }
}

fn cmd_schema(schema_type: SchemaType, json_schema: bool) -> Result<(), VglmCliError> {
    match schema_type {
        SchemaType::Input => {
            if json_schema {
                println!("{}", get_input_json_schema());
            } else {
                println!("Input Schema: trial record");
                println!();
                println!("One JSON object per trial, in chronological order within each animal:");
                println!();
                println!("- animal_id: subject identifier");
                println!("- session: session index (resets history features)");
                println!("- trial: trial index within the session");
                println!("- violation: 0 or 1");
                println!("- n_prev_trial_not_started: non-negative count (default 0)");
                println!("- s_a, s_b: stimulus loudness");
                println!("- correct_side: 0 (left) or 1 (right)");
                println!("- choice: 0 (left), 1 (right), 2 or null (violation)");
            }
        }
        SchemaType::Output => {
            if json_schema {
                println!("{}", get_output_json_schema());
            } else {
                println!("Output Schema: design payload");
                println!();
                println!("- format_version, producer {{ name, version, instance_id }}, generated_at_utc");
                println!("- animal_id, n_trials");
                println!("- columns: bias, s_a, s_b, prev_sound_avg, prev_correct, prev_choice,");
                println!("  prev_disengaged (or prev_violation, prev_trial_not_started),");
                println!("  then {{column}}_exp_{{tau}} filtered history columns,");
                println!("  then {{stimulus}}_x_prev_violation_exp_{{tau}} interaction columns");
                println!("- rows: one numeric row per kept trial");
                println!("- labels: class per row (left 0, right 1, violation 2)");
                println!("- label_mode, trial_keys, filter_params, include_prev_disengaged");
            }
        }
    }

    Ok(())
}

// Helper functions

fn build_design_config(args: &DesignArgs) -> Result<DesignConfig, VglmCliError> {
    let mut config = match &args.config {
        Some(path) => DesignConfig::from_path(path)?,
        None => DesignConfig::default(),
    };

    let mut filters = FilterParams::new();
    for expr in &args.filters {
        let (column, value) = FilterParams::parse_expression(expr).map_err(DesignError::from)?;
        filters.insert(column, value);
    }
    config.filter_params.extend(filters);

    if args.no_disengaged {
        config.include_prev_disengaged = false;
    }
    if let Some(labels) = args.labels {
        config.labels = match labels {
            LabelArg::Binary => LabelMode::Binary,
            LabelArg::Multi => LabelMode::Multi,
        };
    }
    for expr in &args.exp_filters {
        config
            .exp_filters
            .push(ExpFilterSpec::parse_expression(expr).map_err(DesignError::from)?);
    }
    for expr in &args.stim_interactions {
        config
            .stim_interactions
            .push(StimViolationInteraction::parse_expression(expr).map_err(DesignError::from)?);
    }

    config.validate().map_err(DesignError::from)?;
    Ok(config)
}

fn dataset_source(data_root: Option<PathBuf>, mode: ModeArg) -> DatasetSource {
    match data_root {
        Some(root) => DatasetSource::new(root),
        None => DatasetSource::from_config(&DataConfig::with_mode(mode.into())),
    }
}

fn load_records(args: &SourceArgs) -> Result<Vec<TrialRecord>, VglmCliError> {
    let records = match &args.input {
        Some(path) if path.to_string_lossy() == "-" => {
            let format = args
                .input_format
                .map(InputFormat::from)
                .unwrap_or_default();
            let records = format.parse(&read_input(path)?)?;
            MemorySource::new(records).load(&args.animals, &args.dataset)?
        }
        Some(path) => {
            let format = args
                .input_format
                .map(InputFormat::from)
                .unwrap_or_else(|| InputFormat::from_path(path));
            FileSource::new(path, format).load(&args.animals, &args.dataset)?
        }
        None => dataset_source(args.data_root.clone(), args.mode)
            .load(&args.animals, &args.dataset)?,
    };
    Ok(records)
}

fn read_input(input: &Path) -> Result<String, VglmCliError> {
    if input.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(input)?)
    }
}

fn write_output(output: &Path, data: &str) -> Result<(), VglmCliError> {
    if output.to_string_lossy() == "-" {
        print!("{}", data);
    } else {
        fs::write(output, data)?;
    }
    Ok(())
}

fn format_output(payloads: &[DesignPayload], format: &OutputFormat) -> Result<String, VglmCliError> {
    match format {
        OutputFormat::Ndjson => {
            let mut lines: Vec<String> = Vec::new();
            for payload in payloads {
                lines.push(serde_json::to_string(payload)?);
            }
            Ok(lines.join("\n") + "\n")
        }
        OutputFormat::Json => Ok(serde_json::to_string(payloads)?),
        OutputFormat::JsonPretty => Ok(serde_json::to_string_pretty(payloads)?),
    }
}

fn fmt_stat(value: Option<f64>) -> String {
    value
        .map(|v| format!("{:.4}", v))
        .unwrap_or_else(|| "-".to_string())
}

fn get_input_json_schema() -> String {
    serde_json::json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": "trial_record",
        "description": "Behavioral trial record",
        "type": "object",
        "required": ["animal_id", "session", "trial", "violation", "s_a", "s_b", "correct_side"],
        "properties": {
            "animal_id": { "type": "string" },
            "session": { "type": "integer" },
            "trial": { "type": "integer", "minimum": 0 },
            "violation": { "type": "integer", "enum": [0, 1] },
            "n_prev_trial_not_started": { "type": "integer", "minimum": 0, "default": 0 },
            "s_a": { "type": "number" },
            "s_b": { "type": "number" },
            "correct_side": { "type": "integer", "enum": [0, 1] },
            "choice": { "type": ["integer", "null"], "enum": [0, 1, 2, null] }
        }
    })
    .to_string()
}

fn get_output_json_schema() -> String {
    serde_json::json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": "design_payload",
        "description": "Design matrix and labels for one animal",
        "type": "object",
        "required": ["format_version", "producer", "generated_at_utc", "columns", "rows", "labels"],
        "properties": {
            "format_version": { "type": "string" },
            "producer": {
                "type": "object",
                "properties": {
                    "name": { "type": "string" },
                    "version": { "type": "string" },
                    "instance_id": { "type": "string" }
                }
            },
            "generated_at_utc": { "type": "string", "format": "date-time" },
            "animal_id": { "type": ["string", "null"] },
            "n_trials": { "type": "integer" },
            "columns": { "type": "array", "items": { "type": "string" } },
            "rows": { "type": "array", "items": { "type": "array", "items": { "type": "number" } } },
            "labels": { "type": "array", "items": { "type": "integer", "enum": [0, 1, 2] } },
            "label_mode": { "type": "string", "enum": ["binary", "multi"] },
            "trial_keys": { "type": "array", "items": { "type": "object" } },
            "filter_params": { "type": "object" },
            "include_prev_disengaged": { "type": "boolean" }
        }
    })
    .to_string()
}

// Error types

#[derive(Debug)]
enum VglmCliError {
    Io(io::Error),
    Design(DesignError),
    Json(serde_json::Error),
    NoTrials,
    ValidationFailed(usize),
    DoctorFailed,
}

impl From<io::Error> for VglmCliError {
    fn from(e: io::Error) -> Self {
        VglmCliError::Io(e)
    }
}

impl From<DesignError> for VglmCliError {
    fn from(e: DesignError) -> Self {
        VglmCliError::Design(e)
    }
}

impl From<serde_json::Error> for VglmCliError {
    fn from(e: serde_json::Error) -> Self {
        VglmCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<VglmCliError> for CliError {
    fn from(e: VglmCliError) -> Self {
        match e {
            VglmCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            VglmCliError::Design(DesignError::Configuration(e)) => CliError {
                code: "CONFIGURATION_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Run 'vglm schema input' for the available columns".to_string()),
            },
            VglmCliError::Design(DesignError::DatasetNotFound(path)) => CliError {
                code: "DATASET_NOT_FOUND".to_string(),
                message: format!("Dataset not found: {}", path.display()),
                hint: Some("Run 'vglm doctor' to check the data root".to_string()),
            },
            VglmCliError::Design(e) => CliError {
                code: "DESIGN_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Run 'vglm validate' on the input for details".to_string()),
            },
            VglmCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            VglmCliError::NoTrials => CliError {
                code: "NO_TRIALS".to_string(),
                message: "No trials found in input".to_string(),
                hint: Some("Check the input file and --animal selection".to_string()),
            },
            VglmCliError::ValidationFailed(count) => CliError {
                code: "VALIDATION_FAILED".to_string(),
                message: format!("{} records failed validation", count),
                hint: Some("Fix validation errors and retry".to_string()),
            },
            VglmCliError::DoctorFailed => CliError {
                code: "DOCTOR_FAILED".to_string(),
                message: "One or more health checks failed".to_string(),
                hint: Some("Review the doctor report for details".to_string()),
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct SummaryReport {
    animals: Vec<AnimalSummary>,
    designs: Vec<DesignSummary>,
}

#[derive(serde::Serialize)]
struct DesignSummary {
    animal_id: String,
    n_trials: usize,
    columns: Vec<ColumnSummary>,
}

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
    animal_id: String,
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
